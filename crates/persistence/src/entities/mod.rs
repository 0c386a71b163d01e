//! Entity definitions (database row mappings).

pub mod media;
pub mod page;
pub mod seo;
pub mod settings;
pub mod tag;
pub mod user;

pub use media::{MediaEntity, ModerationStatusDb};
pub use page::{PageEntity, PageStatusDb};
pub use seo::SeoEntity;
pub use settings::SettingsEntity;
pub use tag::TagEntity;
pub use user::{UserEntity, UserRoleDb};
