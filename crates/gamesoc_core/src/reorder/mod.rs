//! Ordered collection reconciliation.
//!
//! # Responsibility
//! - Translate a drop of item A onto item B into a new visual order.
//! - Persist a new order one item at a time through an [`OrderStore`].
//!
//! # Invariants
//! - `reorder` never creates or drops items.
//! - A self-drop or a drop involving an unknown id is a no-op.
//! - `persist_order` issues exactly one update per item, in ascending
//!   position order, each finishing before the next starts.
//! - Already-committed updates are never rolled back.

mod session;

pub use session::{DropOutcome, PersistOutcome, ReorderError, ReorderPhase, ReorderSession};

use crate::model::ordered::{sort_by_order, OrderedItem};
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Identifier type of the items held by a store.
pub type StoreItemId<S> = <<S as OrderStore>::Item as OrderedItem>::Id;

/// Backing store for one family of ordered collections.
pub trait OrderStore {
    type Item: OrderedItem;
    type ParentId: Clone + Display;
    type Error: Error + 'static;

    /// Writes the persisted position of one item and returns the stored row.
    fn update_order_index(
        &self,
        id: &<Self::Item as OrderedItem>::Id,
        order_index: u32,
    ) -> Result<Self::Item, Self::Error>;

    /// Loads the authoritative list for one parent collection.
    fn list_items(&self, parent_id: &Self::ParentId) -> Result<Vec<Self::Item>, Self::Error>;
}

impl<S: OrderStore> OrderStore for &S {
    type Item = S::Item;
    type ParentId = S::ParentId;
    type Error = S::Error;

    fn update_order_index(
        &self,
        id: &StoreItemId<S>,
        order_index: u32,
    ) -> Result<Self::Item, Self::Error> {
        (**self).update_order_index(id, order_index)
    }

    fn list_items(&self, parent_id: &Self::ParentId) -> Result<Vec<Self::Item>, Self::Error> {
        (**self).list_items(parent_id)
    }
}

/// Moves `source_id` into the slot currently held by `target_id`.
///
/// Positions are taken from the current render order (ascending
/// `order_index`). The item is removed and reinserted, so items between
/// the two slots shift by one; this is not a swap.
///
/// Returns `list` unchanged when `source_id == target_id` or either id is
/// missing. The result keeps the old `order_index` values; pass it through
/// [`reindex`] to get the values to persist.
pub fn reorder<T: OrderedItem>(list: &[T], source_id: &T::Id, target_id: &T::Id) -> Vec<T> {
    if source_id == target_id {
        return list.to_vec();
    }

    let mut ordered = list.to_vec();
    sort_by_order(&mut ordered);

    let source_index = ordered.iter().position(|item| item.item_id() == *source_id);
    let target_index = ordered.iter().position(|item| item.item_id() == *target_id);
    let (Some(source_index), Some(target_index)) = (source_index, target_index) else {
        return list.to_vec();
    };

    let moved = ordered.remove(source_index);
    ordered.insert(target_index, moved);
    ordered
}

/// Assigns `order_index = position + 1` to every item, in order.
pub fn reindex<T: OrderedItem>(mut items: Vec<T>) -> Vec<T> {
    for (position, item) in items.iter_mut().enumerate() {
        item.set_order_index(position_to_order_index(position));
    }
    items
}

/// Failure partway through [`persist_order`].
///
/// Updates before `order_index` were committed and stay committed.
#[derive(Debug)]
pub struct PersistOrderError<I, E> {
    /// Item whose update failed.
    pub item_id: I,
    /// Position the failed update tried to write.
    pub order_index: u32,
    /// Number of updates that completed before the failure.
    pub committed: usize,
    pub source: E,
}

impl<I: Display, E: Display> Display for PersistOrderError<I, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "failed to persist position {} for item {} after {} committed updates: {}",
            self.order_index, self.item_id, self.committed, self.source
        )
    }
}

impl<I, E> Error for PersistOrderError<I, E>
where
    I: Debug + Display,
    E: Error + 'static,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Persists the order of `ordered` item by item.
///
/// Every item gets its 1-based position in `ordered`, regardless of the
/// `order_index` it currently carries. Calls are strictly sequential. On
/// the first failure the loop stops and nothing is undone; callers recover
/// by reloading the authoritative list.
pub fn persist_order<S>(
    store: &S,
    ordered: &[S::Item],
) -> Result<Vec<S::Item>, PersistOrderError<StoreItemId<S>, S::Error>>
where
    S: OrderStore,
{
    info!(
        "event=order_persist module=reorder status=start items={}",
        ordered.len()
    );

    let mut persisted = Vec::with_capacity(ordered.len());
    for (position, item) in ordered.iter().enumerate() {
        let item_id = item.item_id();
        let order_index = position_to_order_index(position);
        match store.update_order_index(&item_id, order_index) {
            Ok(stored) => {
                debug!(
                    "event=order_update module=reorder status=ok item_id={} order_index={}",
                    item_id, order_index
                );
                persisted.push(stored);
            }
            Err(source) => {
                error!(
                    "event=order_persist module=reorder status=error item_id={} order_index={} committed={} error={}",
                    item_id, order_index, position, source
                );
                return Err(PersistOrderError {
                    item_id,
                    order_index,
                    committed: position,
                    source,
                });
            }
        }
    }

    info!(
        "event=order_persist module=reorder status=ok items={}",
        persisted.len()
    );
    Ok(persisted)
}

fn position_to_order_index(position: usize) -> u32 {
    u32::try_from(position + 1).unwrap_or(u32::MAX)
}
