//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`CommitteeNotFound`,
//!   `MemberNotFound`) in addition to DB transport errors.
//! - Member listings are deterministic: `order_index ASC, id ASC`.

pub mod committee_repo;
