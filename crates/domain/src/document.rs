//! The save-time transform shared by every document type.
//!
//! Write paths call [`prepare_for_save`] with the currently persisted version
//! of the document (if any) right before committing. The transform runs in
//! four fixed steps:
//!
//! 1. `normalize` fills derived fields (slugs, lower-cased tags, meta fields).
//! 2. `check` produces the field-level violation list.
//! 3. `enforce_rules` runs cross-field rules that fail with a single message.
//! 4. `finalize` applies effects that must only happen on a valid document
//!    (password hashing, version history, timestamps).

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{DomainError, Violations};

/// A persisted top-level record.
pub trait Document {
    /// Storage name, used for logging.
    const COLLECTION: &'static str;

    fn id(&self) -> Uuid;

    fn normalize(&mut self, _previous: Option<&Self>, _now: DateTime<Utc>) {}

    fn check(&self, previous: Option<&Self>) -> Violations;

    fn enforce_rules(&self) -> Result<(), DomainError> {
        Ok(())
    }

    fn finalize(&mut self, previous: Option<&Self>, now: DateTime<Utc>)
        -> Result<(), DomainError>;
}

/// Runs the full save-time transform. On error the document may have had
/// derived fields filled in, but `finalize` has not run.
pub fn prepare_for_save<D: Document>(
    doc: &mut D,
    previous: Option<&D>,
    now: DateTime<Utc>,
) -> Result<(), DomainError> {
    doc.normalize(previous, now);
    doc.check(previous).into_result()?;
    doc.enforce_rules()?;
    doc.finalize(previous, now)?;

    tracing::debug!(
        collection = D::COLLECTION,
        id = %doc.id(),
        is_new = previous.is_none(),
        "Document prepared for save"
    );
    Ok(())
}
