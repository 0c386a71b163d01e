//! Repository implementations for database operations.
//!
//! Every `save` runs in one transaction: the persisted row is locked with
//! `SELECT ... FOR UPDATE`, the save-time transform runs against it, and the
//! whole document is upserted.

pub mod media;
pub mod page;
pub mod seo;
pub mod settings;
pub mod tag;
pub mod user;

pub use media::MediaRepository;
pub use page::PageRepository;
pub use seo::SeoRepository;
pub use settings::SettingsRepository;
pub use tag::TagRepository;
pub use user::UserRepository;
