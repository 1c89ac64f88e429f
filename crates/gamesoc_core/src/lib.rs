//! Core logic for the gaming society admin dashboard.
//! This crate owns committee ordering and bulk message dispatch rules.

pub mod config;
pub mod db;
pub mod dispatch;
pub mod logging;
pub mod model;
pub mod reorder;
pub mod repo;
pub mod service;

pub use config::{AppConfig, ConfigError, DispatchSettings};
pub use dispatch::recipients::{
    build_recipient_set, parse_pasted, AddOutcome, ParsedRecipients, RecipientParseError,
    RecipientSet, RecipientSetBuilder, RecipientSource, RecipientSources,
};
pub use dispatch::sheet::{parse_sheet_csv, SheetImportError};
pub use dispatch::template::{render_preview, unknown_placeholders};
pub use dispatch::{
    BatchMessage, DispatchError, DispatchOptions, Dispatcher, HttpBatchSender, MessageSender,
    SendError,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::committee::{
    Committee, CommitteeId, CommitteeMember, MemberId, MemberPatch, NewMember,
};
pub use model::dispatch::DispatchProgress;
pub use model::ordered::OrderedItem;
pub use model::recipient::{Recipient, PLACEHOLDER_NAME};
pub use reorder::{
    persist_order, reindex, reorder, DropOutcome, OrderStore, PersistOrderError, PersistOutcome,
    ReorderError, ReorderPhase, ReorderSession,
};
pub use repo::committee_repo::{
    CommitteeRepository, RepoError, RepoResult, SqliteCommitteeRepository,
};
pub use service::committee_service::{CommitteeService, CommitteeServiceError};

/// Minimal health-check API for smoke tests.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
