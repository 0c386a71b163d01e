//! Document schemas for CareCMS.

pub mod media;
pub mod page;
pub mod seo;
pub mod settings;
pub mod tag;
pub mod user;

pub use media::Media;
pub use page::{Page, PageStatus};
pub use seo::Seo;
pub use settings::{Settings, SETTINGS_ID};
pub use tag::Tag;
pub use user::{PublicProfile, User, UserRole};
