//! Recipient set assembly for one compose session.
//!
//! # Responsibility
//! - Parse pasted text and sheet exports into recipients.
//! - Merge all sources into one deduplicated, selectable set.
//!
//! # Invariants
//! - Sources merge in order: sheet rows, manual entries, pasted text.
//! - Dedup key is the lower-cased email; the first entry seen wins and
//!   later duplicates are dropped silently.
//! - A malformed line is recorded and skipped; it never aborts the batch.

use crate::model::recipient::{Recipient, PLACEHOLDER_NAME};
use log::info;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Where a recipient candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientSource {
    Sheet,
    Manual,
    Pasted,
}

impl Display for RecipientSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sheet => write!(f, "sheet"),
            Self::Manual => write!(f, "manual entry"),
            Self::Pasted => write!(f, "pasted text"),
        }
    }
}

/// Candidate rejected because it has no plausible email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientParseError {
    pub source: RecipientSource,
    /// 1-based line (pasted text), row (sheet) or entry number (manual).
    pub line: usize,
    /// Raw input as provided.
    pub input: String,
}

impl Display for RecipientParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} line {}: `{}` does not contain a valid email address",
            self.source, self.line, self.input
        )
    }
}

impl Error for RecipientParseError {}

/// Raw inputs for one compose session.
#[derive(Debug, Clone, Default)]
pub struct RecipientSources {
    pub sheet_rows: Vec<Recipient>,
    pub manual_entries: Vec<Recipient>,
    pub pasted_text: Option<String>,
}

/// Recipients accepted from one source plus the lines that were rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRecipients {
    pub recipients: Vec<Recipient>,
    pub errors: Vec<RecipientParseError>,
}

/// Parses pasted text, one recipient per line.
///
/// `name, email` lines split on the first comma only, so the email part
/// keeps any further commas. A line without a comma is an email with the
/// placeholder name. Blank lines are skipped.
pub fn parse_pasted(text: &str) -> ParsedRecipients {
    let mut parsed = ParsedRecipients::default();
    for (index, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let candidate = match trimmed.split_once(',') {
            Some((name, email)) => Recipient::new(name, email),
            None => Recipient::new(PLACEHOLDER_NAME, trimmed),
        };
        if candidate.has_plausible_email() {
            parsed.recipients.push(candidate);
        } else {
            parsed.errors.push(RecipientParseError {
                source: RecipientSource::Pasted,
                line: index + 1,
                input: trimmed.to_string(),
            });
        }
    }
    parsed
}

/// Outcome of offering one candidate to a [`RecipientSetBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    Duplicate,
    Rejected,
}

/// Accumulates recipients for one compose session.
///
/// The dedup set lives only as long as the builder.
#[derive(Debug, Default)]
pub struct RecipientSetBuilder {
    seen: HashSet<String>,
    recipients: Vec<Recipient>,
    errors: Vec<RecipientParseError>,
    duplicates: usize,
}

impl RecipientSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers one candidate. `line` is only used for error reporting.
    pub fn add(
        &mut self,
        source: RecipientSource,
        line: usize,
        recipient: Recipient,
    ) -> AddOutcome {
        if !recipient.has_plausible_email() {
            self.errors.push(RecipientParseError {
                source,
                line,
                input: format!("{}, {}", recipient.name, recipient.email),
            });
            return AddOutcome::Rejected;
        }
        if !self.seen.insert(recipient.dedup_key()) {
            self.duplicates += 1;
            return AddOutcome::Duplicate;
        }
        self.recipients.push(recipient);
        AddOutcome::Added
    }

    /// Parses and adds pasted text, keeping its line-level errors.
    pub fn add_pasted(&mut self, text: &str) {
        let parsed = parse_pasted(text);
        self.errors.extend(parsed.errors);
        for recipient in parsed.recipients {
            if self.seen.insert(recipient.dedup_key()) {
                self.recipients.push(recipient);
            } else {
                self.duplicates += 1;
            }
        }
    }

    pub fn build(self) -> RecipientSet {
        let selected = vec![true; self.recipients.len()];
        RecipientSet {
            recipients: self.recipients,
            selected,
            errors: self.errors,
            duplicates: self.duplicates,
        }
    }
}

/// Merges every source into one deduplicated recipient set.
pub fn build_recipient_set(sources: &RecipientSources) -> RecipientSet {
    let mut builder = RecipientSetBuilder::new();
    for (index, row) in sources.sheet_rows.iter().enumerate() {
        builder.add(RecipientSource::Sheet, index + 1, row.clone());
    }
    for (index, entry) in sources.manual_entries.iter().enumerate() {
        builder.add(RecipientSource::Manual, index + 1, entry.clone());
    }
    if let Some(text) = &sources.pasted_text {
        builder.add_pasted(text);
    }

    let set = builder.build();
    info!(
        "event=recipients_build module=dispatch status=ok recipients={} errors={} duplicates={}",
        set.len(),
        set.errors().len(),
        set.duplicates()
    );
    set
}

/// Deduplicated recipients with a per-recipient selection flag.
///
/// Everything starts selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientSet {
    recipients: Vec<Recipient>,
    selected: Vec<bool>,
    errors: Vec<RecipientParseError>,
    duplicates: usize,
}

impl RecipientSet {
    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }

    pub fn errors(&self) -> &[RecipientParseError] {
        &self.errors
    }

    /// Number of candidates dropped as duplicates.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn len(&self) -> usize {
        self.recipients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }

    /// Toggles one recipient by email (case-insensitive).
    ///
    /// Returns `false` when no recipient has that email.
    pub fn set_selected(&mut self, email: &str, selected: bool) -> bool {
        let key = email.trim().to_lowercase();
        match self
            .recipients
            .iter()
            .position(|recipient| recipient.dedup_key() == key)
        {
            Some(index) => {
                self.selected[index] = selected;
                true
            }
            None => false,
        }
    }

    pub fn select_all(&mut self, selected: bool) {
        self.selected.iter_mut().for_each(|flag| *flag = selected);
    }

    pub fn is_selected(&self, email: &str) -> bool {
        let key = email.trim().to_lowercase();
        self.recipients
            .iter()
            .zip(&self.selected)
            .any(|(recipient, selected)| *selected && recipient.dedup_key() == key)
    }

    /// Recipients that will receive the message, in set order.
    pub fn selected(&self) -> Vec<Recipient> {
        self.recipients
            .iter()
            .zip(&self.selected)
            .filter(|(_, selected)| **selected)
            .map(|(recipient, _)| recipient.clone())
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.iter().filter(|selected| **selected).count()
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_pasted, RecipientSource};

    #[test]
    fn pasted_email_keeps_commas_after_the_first() {
        let parsed = parse_pasted("Lee, lee,jr@x.com");
        assert_eq!(parsed.recipients.len(), 1);
        assert_eq!(parsed.recipients[0].name, "Lee");
        assert_eq!(parsed.recipients[0].email, "lee,jr@x.com");
    }

    #[test]
    fn blank_lines_do_not_shift_line_numbers() {
        let parsed = parse_pasted("\n\nnot-an-email\n");
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].line, 3);
        assert_eq!(parsed.errors[0].source, RecipientSource::Pasted);
    }

    #[test]
    fn empty_name_field_gets_placeholder() {
        let parsed = parse_pasted(" , sam@x.com");
        assert_eq!(parsed.recipients[0].name, "Participant");
    }
}
