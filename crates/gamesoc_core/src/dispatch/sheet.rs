//! Registration sheet import.
//!
//! Reads the CSV export of a registration form response sheet. The email
//! column is the first header containing `email`; the name column is the
//! first other header containing `name`. Header matching ignores case.

use crate::dispatch::recipients::{ParsedRecipients, RecipientParseError, RecipientSource};
use crate::model::recipient::{Recipient, PLACEHOLDER_NAME};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Sheet export cannot be read at all.
#[derive(Debug)]
pub enum SheetImportError {
    Csv(csv::Error),
    /// No header mentions `email`.
    MissingEmailColumn,
}

impl Display for SheetImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv(err) => write!(f, "failed to read sheet export: {err}"),
            Self::MissingEmailColumn => write!(f, "sheet export has no email column"),
        }
    }
}

impl Error for SheetImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Csv(err) => Some(err),
            Self::MissingEmailColumn => None,
        }
    }
}

impl From<csv::Error> for SheetImportError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

/// Parses a sheet CSV export into recipients.
///
/// Rows without a plausible email are reported with their sheet row number
/// (the header is row 1). Fully empty rows are skipped.
pub fn parse_sheet_csv(text: &str) -> Result<ParsedRecipients, SheetImportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let email_column =
        find_column(&headers, "email", None).ok_or(SheetImportError::MissingEmailColumn)?;
    let name_column = find_column(&headers, "name", Some(email_column));

    let mut parsed = ParsedRecipients::default();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let email = record.get(email_column).unwrap_or_default();
        let name = name_column
            .and_then(|column| record.get(column))
            .unwrap_or(PLACEHOLDER_NAME);
        let candidate = Recipient::new(name, email);
        if candidate.has_plausible_email() {
            parsed.recipients.push(candidate);
        } else {
            parsed.errors.push(RecipientParseError {
                source: RecipientSource::Sheet,
                line: index + 2,
                input: record.iter().collect::<Vec<_>>().join(","),
            });
        }
    }
    Ok(parsed)
}

fn find_column(headers: &StringRecord, needle: &str, skip: Option<usize>) -> Option<usize> {
    headers
        .iter()
        .enumerate()
        .filter(|(index, _)| Some(*index) != skip)
        .find(|(_, header)| header.to_lowercase().contains(needle))
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::{parse_sheet_csv, SheetImportError};

    #[test]
    fn reads_named_columns_in_any_order() {
        let csv = "Timestamp,Email Address,Full Name\n\
                   2024-01-01,ana@uni.ac.uk,Ana\n\
                   2024-01-02,,Ben\n";
        let parsed = parse_sheet_csv(csv).expect("sheet should parse");
        assert_eq!(parsed.recipients.len(), 1);
        assert_eq!(parsed.recipients[0].name, "Ana");
        assert_eq!(parsed.recipients[0].email, "ana@uni.ac.uk");
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].line, 3);
    }

    #[test]
    fn missing_email_header_is_rejected() {
        let err = parse_sheet_csv("Name,Discord\nAna,ana#1\n").expect_err("no email column");
        assert!(matches!(err, SheetImportError::MissingEmailColumn));
    }

    #[test]
    fn missing_name_column_uses_placeholder() {
        let parsed = parse_sheet_csv("email\nkai@uni.ac.uk\n").expect("sheet should parse");
        assert_eq!(parsed.recipients[0].name, "Participant");
    }
}
