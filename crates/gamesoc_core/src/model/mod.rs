//! Domain model for committees, ordered collections and message dispatch.
//!
//! # Responsibility
//! - Define canonical data structures used by services and repositories.
//! - Keep ordering semantics behind one trait shared by every ordered list.
//!
//! # Invariants
//! - Every persisted record is identified by a stable UUID.
//! - Recipients and dispatch progress are never persisted.

pub mod committee;
pub mod dispatch;
pub mod ordered;
pub mod recipient;
