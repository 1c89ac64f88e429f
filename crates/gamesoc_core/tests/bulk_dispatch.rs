use gamesoc_core::{
    BatchMessage, DispatchError, DispatchOptions, DispatchProgress, Dispatcher, MessageSender,
    Recipient,
};
use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
struct TransportDown;

impl Display for TransportDown {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "connection reset")
    }
}

impl Error for TransportDown {}

/// Sender that records batches and answers with a fixed result.
struct RecordingSender {
    reply: Result<DispatchProgress, ()>,
    batches: RefCell<Vec<BatchMessage>>,
}

impl RecordingSender {
    fn answering(reply: DispatchProgress) -> Self {
        Self {
            reply: Ok(reply),
            batches: RefCell::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            reply: Err(()),
            batches: RefCell::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.batches.borrow().len()
    }
}

impl MessageSender for RecordingSender {
    type Error = TransportDown;

    fn send_batch(&self, batch: &BatchMessage) -> Result<DispatchProgress, TransportDown> {
        self.batches.borrow_mut().push(batch.clone());
        self.reply.map_err(|()| TransportDown)
    }
}

fn recipients(count: usize) -> Vec<Recipient> {
    (0..count)
        .map(|index| Recipient::new(format!("Player {index}"), format!("p{index}@uni.ac.uk")))
        .collect()
}

#[test]
fn empty_inputs_are_rejected_before_any_network_call() {
    let sender = RecordingSender::answering(DispatchProgress::started(0));
    let dispatcher = Dispatcher::new(&sender);

    assert_eq!(
        dispatcher.dispatch(&[], "Subject", "Body"),
        Err(DispatchError::NoRecipients)
    );
    assert_eq!(
        dispatcher.dispatch(&recipients(1), "  ", "Body"),
        Err(DispatchError::EmptySubject)
    );
    assert_eq!(
        dispatcher.dispatch(&recipients(1), "Subject", "\n"),
        Err(DispatchError::EmptyBody)
    );
    assert_eq!(sender.calls(), 0);
}

#[test]
fn success_takes_counts_from_sender_verbatim() {
    let sender = RecordingSender::answering(DispatchProgress {
        sent: 2,
        failed: 1,
        total: 3,
    });
    let dispatcher = Dispatcher::new(&sender);

    let progress = dispatcher
        .dispatch(&recipients(3), "Tournament", "Hi {{name}}")
        .unwrap();

    assert_eq!(
        progress,
        DispatchProgress {
            sent: 2,
            failed: 1,
            total: 3
        }
    );
    assert_eq!(sender.calls(), 1);
    let batch = sender.batches.borrow()[0].clone();
    assert_eq!(batch.recipients.len(), 3);
    assert_eq!(batch.body, "Hi {{name}}", "body is sent untouched");
}

#[test]
fn transport_failure_marks_whole_batch_failed() {
    let sender = RecordingSender::failing();
    let dispatcher = Dispatcher::new(&sender);

    for total in [1usize, 5, 40] {
        let progress = dispatcher
            .dispatch(&recipients(total), "Subject", "Body")
            .unwrap();
        assert_eq!(progress, DispatchProgress::batch_failed(total as u32));
        assert_eq!(progress.sent, 0);
        assert_eq!(progress.failed, total as u32);
    }
    assert_eq!(sender.calls(), 3, "no automatic retry");
}

#[test]
fn inconsistent_report_is_treated_as_unknown_outcome() {
    let sender = RecordingSender::answering(DispatchProgress {
        sent: 4,
        failed: 1,
        total: 2,
    });
    let dispatcher = Dispatcher::new(&sender);

    let progress = dispatcher
        .dispatch(&recipients(2), "Subject", "Body")
        .unwrap();
    assert_eq!(progress, DispatchProgress::batch_failed(2));
}

#[test]
fn consistent_report_with_other_total_is_kept_as_reported() {
    let sender = RecordingSender::answering(DispatchProgress {
        sent: 2,
        failed: 0,
        total: 2,
    });
    let dispatcher = Dispatcher::new(&sender);

    let progress = dispatcher
        .dispatch(&recipients(3), "Subject", "Body")
        .unwrap();
    assert_eq!(
        progress,
        DispatchProgress {
            sent: 2,
            failed: 0,
            total: 2
        }
    );
    assert_eq!(sender.calls(), 1);
}

#[test]
fn progress_observer_sees_initial_value_before_send() {
    let sender = RecordingSender::answering(DispatchProgress {
        sent: 3,
        failed: 0,
        total: 3,
    });
    let dispatcher = Dispatcher::new(&sender);
    let mut seen = Vec::new();

    dispatcher
        .dispatch_with_progress(&recipients(3), "Subject", "Body", |progress| {
            seen.push((*progress, sender.calls()));
        })
        .unwrap();

    assert_eq!(
        seen,
        vec![
            (DispatchProgress::started(3), 0),
            (
                DispatchProgress {
                    sent: 3,
                    failed: 0,
                    total: 3
                },
                1
            ),
        ]
    );
}

#[test]
fn options_are_attached_and_serialized_in_camel_case() {
    let sender = RecordingSender::answering(DispatchProgress::started(1));
    let dispatcher = Dispatcher::with_options(
        &sender,
        DispatchOptions {
            reply_to: Some("committee@uni.ac.uk".to_string()),
            sender_name: None,
        },
    );

    dispatcher
        .dispatch(&recipients(1), "Subject", "Hello {{email}}")
        .unwrap();

    let batch = sender.batches.borrow()[0].clone();
    let payload = serde_json::to_value(&batch).unwrap();
    assert_eq!(payload["replyTo"], "committee@uni.ac.uk");
    assert!(payload.get("senderName").is_none());
    assert_eq!(payload["recipients"][0]["email"], "p0@uni.ac.uk");
    assert_eq!(payload["recipients"][0]["name"], "Player 0");
    assert_eq!(payload["subject"], "Subject");
}
