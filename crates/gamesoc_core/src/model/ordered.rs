//! Ordered collection contract.
//!
//! # Invariants
//! - Within one parent collection all `order_index` values are distinct
//!   positive integers (1-based).
//! - Lists are rendered ascending by `order_index`, ties broken by id.

use std::fmt::Display;

/// Item that lives in a user-visible, persisted order.
pub trait OrderedItem: Clone {
    /// Identifier unique within the parent collection.
    type Id: Clone + Ord + Display;

    fn item_id(&self) -> Self::Id;

    /// 1-based persisted position.
    fn order_index(&self) -> u32;

    fn set_order_index(&mut self, order_index: u32);
}

/// Sorts items in render order: `order_index ASC, id ASC`.
pub fn sort_by_order<T: OrderedItem>(items: &mut [T]) {
    items.sort_by(|left, right| {
        left.order_index()
            .cmp(&right.order_index())
            .then_with(|| left.item_id().cmp(&right.item_id()))
    });
}

