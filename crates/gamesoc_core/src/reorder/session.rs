//! Drag-and-drop reorder session over one parent collection.
//!
//! Phase transitions:
//!
//! ```text
//! Idle --begin_drag--> Dragging --drop_on(invalid)/cancel_drag--> Idle
//!                      Dragging --drop_on(valid)--> Applied
//! Applied --persist ok--> Idle
//! Applied --persist failed--> refetch ok --> Idle
//! Applied --persist failed--> refetch failed --> Applied
//! ```
//!
//! `Applied` holds the optimistic order: callers render `items()` right
//! after `drop_on` and call `persist` afterwards.

use super::{persist_order, reindex, reorder, OrderStore, StoreItemId};
use crate::model::ordered::{sort_by_order, OrderedItem};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

const RECONCILED_NOTIFICATION: &str =
    "Could not save the new order. The list was reloaded from the server.";

/// Current step of one reorder gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderPhase<I> {
    Idle,
    Dragging { source: I },
    /// Optimistic order applied locally, not yet persisted.
    Applied { source: I, target: I },
}

/// Result of dropping the dragged item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// Dropped on itself, on nothing, or on an unknown item.
    Ignored,
    /// Local list now shows the new order.
    Applied,
}

/// Result of persisting an applied order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome<I> {
    Persisted { updated: usize },
    /// Persistence failed and the list was replaced by the stored state.
    Reconciled {
        /// User-facing error notification.
        notification: String,
        failed_item: I,
        committed: usize,
    },
}

/// Errors from reorder session transitions.
#[derive(Debug)]
pub enum ReorderError<E> {
    /// A gesture is already in progress or awaiting persistence.
    Busy,
    NotDragging,
    NothingToPersist,
    /// Reloading the authoritative list after a failed persist failed.
    Store(E),
}

impl<E: Display> Display for ReorderError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Busy => write!(f, "a reorder is already in progress"),
            Self::NotDragging => write!(f, "no item is being dragged"),
            Self::NothingToPersist => write!(f, "no reordered list is waiting to be saved"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl<E: Error + 'static> Error for ReorderError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

/// Reorder state for one parent collection.
pub struct ReorderSession<S: OrderStore> {
    store: S,
    parent_id: S::ParentId,
    items: Vec<S::Item>,
    phase: ReorderPhase<StoreItemId<S>>,
}

impl<S: OrderStore> ReorderSession<S> {
    /// Loads the authoritative list and starts in `Idle`.
    pub fn load(store: S, parent_id: S::ParentId) -> Result<Self, S::Error> {
        let items = fetch_sorted(&store, &parent_id)?;
        info!(
            "event=reorder_load module=reorder status=ok parent_id={} items={}",
            parent_id,
            items.len()
        );
        Ok(Self {
            store,
            parent_id,
            items,
            phase: ReorderPhase::Idle,
        })
    }

    /// Items in render order.
    pub fn items(&self) -> &[S::Item] {
        &self.items
    }

    pub fn phase(&self) -> &ReorderPhase<StoreItemId<S>> {
        &self.phase
    }

    pub fn parent_id(&self) -> &S::ParentId {
        &self.parent_id
    }

    /// Lifts one item.
    ///
    /// Any id is accepted here; unknown ids are rejected as an ignored drop.
    pub fn begin_drag(&mut self, source: StoreItemId<S>) -> Result<(), ReorderError<S::Error>> {
        if !matches!(self.phase, ReorderPhase::Idle) {
            return Err(ReorderError::Busy);
        }
        self.phase = ReorderPhase::Dragging { source };
        Ok(())
    }

    /// Abandons the current drag. Returns whether a drag was active.
    pub fn cancel_drag(&mut self) -> bool {
        if matches!(self.phase, ReorderPhase::Dragging { .. }) {
            self.phase = ReorderPhase::Idle;
            return true;
        }
        false
    }

    /// Drops the dragged item onto `target`, or onto nothing when `None`.
    pub fn drop_on(
        &mut self,
        target: Option<StoreItemId<S>>,
    ) -> Result<DropOutcome, ReorderError<S::Error>> {
        let source = match &self.phase {
            ReorderPhase::Dragging { source } => source.clone(),
            _ => return Err(ReorderError::NotDragging),
        };

        let Some(target) = target else {
            self.phase = ReorderPhase::Idle;
            return Ok(DropOutcome::Ignored);
        };

        let known = |id: &StoreItemId<S>| self.items.iter().any(|item| item.item_id() == *id);
        if source == target || !known(&source) || !known(&target) {
            self.phase = ReorderPhase::Idle;
            return Ok(DropOutcome::Ignored);
        }

        self.items = reindex(reorder(&self.items, &source, &target));
        self.phase = ReorderPhase::Applied { source, target };
        Ok(DropOutcome::Applied)
    }

    /// Persists the applied order; reloads from the store on failure.
    ///
    /// # Errors
    /// - `NothingToPersist` when no drop has been applied.
    /// - `Store` when the reload after a failed persist also fails; the
    ///   optimistic list is kept and the session stays `Applied`, so a
    ///   later `persist` reissues every update.
    pub fn persist(&mut self) -> Result<PersistOutcome<StoreItemId<S>>, ReorderError<S::Error>> {
        if !matches!(self.phase, ReorderPhase::Applied { .. }) {
            return Err(ReorderError::NothingToPersist);
        }
        let applied = std::mem::replace(&mut self.phase, ReorderPhase::Idle);

        let failure = match persist_order(&self.store, &self.items) {
            Ok(persisted) => {
                return Ok(PersistOutcome::Persisted {
                    updated: persisted.len(),
                })
            }
            Err(failure) => failure,
        };

        warn!(
            "event=reorder_reconcile module=reorder status=start parent_id={} committed={}",
            self.parent_id, failure.committed
        );
        match fetch_sorted(&self.store, &self.parent_id) {
            Ok(items) => {
                self.items = items;
                info!(
                    "event=reorder_reconcile module=reorder status=ok parent_id={} items={}",
                    self.parent_id,
                    self.items.len()
                );
                Ok(PersistOutcome::Reconciled {
                    notification: RECONCILED_NOTIFICATION.to_string(),
                    failed_item: failure.item_id,
                    committed: failure.committed,
                })
            }
            Err(err) => {
                error!(
                    "event=reorder_reconcile module=reorder status=error parent_id={} error={}",
                    self.parent_id, err
                );
                self.phase = applied;
                Err(ReorderError::Store(err))
            }
        }
    }
}

fn fetch_sorted<S: OrderStore>(
    store: &S,
    parent_id: &S::ParentId,
) -> Result<Vec<S::Item>, S::Error> {
    let mut items = store.list_items(parent_id)?;
    sort_by_order(&mut items);
    Ok(items)
}
