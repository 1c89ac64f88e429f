//! Message recipient record.
//!
//! # Invariants
//! - Recipients are unique within one batch by lower-cased email.
//! - Recipients only live for one compose session.

use serde::{Deserialize, Serialize};

/// Name used when a source provides an email without a name.
pub const PLACEHOLDER_NAME: &str = "Participant";

/// One addressee of a bulk message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub name: String,
    pub email: String,
}

impl Recipient {
    /// Builds a recipient from raw input, trimming both fields.
    ///
    /// A blank name falls back to [`PLACEHOLDER_NAME`].
    pub fn new(name: impl AsRef<str>, email: impl AsRef<str>) -> Self {
        let name = name.as_ref().trim();
        Self {
            name: if name.is_empty() {
                PLACEHOLDER_NAME.to_string()
            } else {
                name.to_string()
            },
            email: email.as_ref().trim().to_string(),
        }
    }

    /// Case-folded key used for batch deduplication.
    pub fn dedup_key(&self) -> String {
        self.email.to_lowercase()
    }

    pub fn has_plausible_email(&self) -> bool {
        is_plausible_email(&self.email)
    }
}

/// Loose address check: accepted when the value contains `@` and `.`.
pub fn is_plausible_email(value: &str) -> bool {
    value.contains('@') && value.contains('.')
}
