//! Start-up wiring for the `carecms` binary.

pub mod bootstrap;
pub mod config;
pub mod logging;
