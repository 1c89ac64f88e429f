//! Bulk message dispatch.
//!
//! # Responsibility
//! - Assemble recipient sets from sheet, manual and pasted input.
//! - Send one message to every recipient in a single outbound request.
//! - Track sent/failed/total counts for a progress indicator.
//!
//! # Invariants
//! - Validation failures are reported before any network call.
//! - Exactly one `send_batch` call per accepted dispatch; no retry.
//! - The sender is authoritative for the final counts, including a
//!   differing `total`, which is logged as a warning. An unknown outcome
//!   (transport error, non-success or inconsistent response) counts as the
//!   whole batch failing.

mod http;
pub mod recipients;
pub mod sheet;
pub mod template;

pub use http::{HttpBatchSender, SendError};

use crate::config::DispatchSettings;
use crate::model::dispatch::DispatchProgress;
use crate::model::recipient::Recipient;
use log::{error, info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Payload of one outbound batch request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchMessage {
    pub recipients: Vec<Recipient>,
    pub subject: String,
    /// May contain `{{name}}`/`{{email}}` for the sender to substitute.
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
}

/// External service that delivers one batch in a single request.
pub trait MessageSender {
    type Error: Error + 'static;

    /// Returns the sender's own tally for the batch.
    fn send_batch(&self, batch: &BatchMessage) -> Result<DispatchProgress, Self::Error>;
}

impl<S: MessageSender> MessageSender for &S {
    type Error = S::Error;

    fn send_batch(&self, batch: &BatchMessage) -> Result<DispatchProgress, Self::Error> {
        (**self).send_batch(batch)
    }
}

/// Caller errors caught before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    NoRecipients,
    EmptySubject,
    EmptyBody,
    /// Batch size does not fit the progress counters.
    TooManyRecipients(usize),
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoRecipients => write!(f, "select at least one recipient"),
            Self::EmptySubject => write!(f, "subject must not be blank"),
            Self::EmptyBody => write!(f, "message body must not be blank"),
            Self::TooManyRecipients(count) => write!(f, "too many recipients: {count}"),
        }
    }
}

impl Error for DispatchError {}

/// Sender-side extras attached to every batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOptions {
    pub reply_to: Option<String>,
    pub sender_name: Option<String>,
}

impl From<&DispatchSettings> for DispatchOptions {
    fn from(settings: &DispatchSettings) -> Self {
        Self {
            reply_to: settings.reply_to.clone(),
            sender_name: settings.sender_name.clone(),
        }
    }
}

/// Sends bulk messages and reports progress.
pub struct Dispatcher<S: MessageSender> {
    sender: S,
    options: DispatchOptions,
}

impl<S: MessageSender> Dispatcher<S> {
    pub fn new(sender: S) -> Self {
        Self::with_options(sender, DispatchOptions::default())
    }

    pub fn with_options(sender: S, options: DispatchOptions) -> Self {
        Self { sender, options }
    }

    /// Sends `subject`/`body` to every recipient in one request.
    pub fn dispatch(
        &self,
        recipients: &[Recipient],
        subject: &str,
        body: &str,
    ) -> Result<DispatchProgress, DispatchError> {
        self.dispatch_with_progress(recipients, subject, body, |_| {})
    }

    /// Like [`Dispatcher::dispatch`], publishing progress to `on_progress`.
    ///
    /// `on_progress` sees `{0, 0, total}` before the request is issued and
    /// the final tally once it resolves.
    ///
    /// # Errors
    /// Only validation errors. Delivery problems are reported through the
    /// returned progress, never as `Err`.
    pub fn dispatch_with_progress(
        &self,
        recipients: &[Recipient],
        subject: &str,
        body: &str,
        mut on_progress: impl FnMut(&DispatchProgress),
    ) -> Result<DispatchProgress, DispatchError> {
        if recipients.is_empty() {
            return Err(DispatchError::NoRecipients);
        }
        if subject.trim().is_empty() {
            return Err(DispatchError::EmptySubject);
        }
        if body.trim().is_empty() {
            return Err(DispatchError::EmptyBody);
        }
        let total = u32::try_from(recipients.len())
            .map_err(|_| DispatchError::TooManyRecipients(recipients.len()))?;

        let started = DispatchProgress::started(total);
        on_progress(&started);

        let unknown = template::unknown_placeholders(body);
        if !unknown.is_empty() {
            warn!(
                "event=dispatch_template module=dispatch status=warn unknown_placeholders={}",
                unknown.len()
            );
        }

        let batch = BatchMessage {
            recipients: recipients.to_vec(),
            subject: subject.to_string(),
            body: body.to_string(),
            reply_to: self.options.reply_to.clone(),
            sender_name: self.options.sender_name.clone(),
        };

        info!("event=dispatch_send module=dispatch status=start total={total}");
        let progress = match self.sender.send_batch(&batch) {
            Ok(report) if report.is_consistent() => {
                if report.total != total {
                    warn!(
                        "event=dispatch_send module=dispatch status=warn error_code=total_mismatch dispatched={} reported={}",
                        total, report.total
                    );
                }
                info!(
                    "event=dispatch_send module=dispatch status=ok total={} sent={} failed={}",
                    report.total, report.sent, report.failed
                );
                report
            }
            Ok(report) => {
                error!(
                    "event=dispatch_send module=dispatch status=error error_code=inconsistent_report total={} sent={} failed={}",
                    report.total, report.sent, report.failed
                );
                DispatchProgress::batch_failed(total)
            }
            Err(err) => {
                error!(
                    "event=dispatch_send module=dispatch status=error error_code=send_failed total={} error={}",
                    total, err
                );
                DispatchProgress::batch_failed(total)
            }
        };

        on_progress(&progress);
        Ok(progress)
    }
}
