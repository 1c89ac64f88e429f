//! Committee and committee member records.
//!
//! # Invariants
//! - `name` is trimmed and non-blank for both committees and members.
//! - `order_index` is 1-based within one committee.

use crate::model::ordered::OrderedItem;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CommitteeId = Uuid;
pub type MemberId = Uuid;

/// One society committee (e.g. "Executive", "Events").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Committee {
    pub id: CommitteeId,
    pub name: String,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

/// Member listed on a committee page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitteeMember {
    pub id: MemberId,
    pub committee_id: CommitteeId,
    pub name: String,
    /// Free-form title such as "President"; empty when unset.
    pub role: String,
    /// Public profile picture location in object storage.
    pub image_url: Option<String>,
    /// 1-based display position within the committee.
    pub order_index: u32,
    pub created_at: i64,
    pub updated_at: i64,
}

impl OrderedItem for CommitteeMember {
    type Id = MemberId;

    fn item_id(&self) -> MemberId {
        self.id
    }

    fn order_index(&self) -> u32 {
        self.order_index
    }

    fn set_order_index(&mut self, order_index: u32) {
        self.order_index = order_index;
    }
}

/// Input for adding a member to a committee.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewMember {
    pub name: String,
    pub role: String,
    pub image_url: Option<String>,
}

impl NewMember {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            image_url: None,
        }
    }
}

/// Partial update for an existing member. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberPatch {
    pub name: Option<String>,
    pub role: Option<String>,
    /// `Some(None)` clears the image.
    pub image_url: Option<Option<String>>,
    /// Manual position edit; siblings are not renumbered.
    pub order_index: Option<u32>,
}

impl MemberPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.role.is_none()
            && self.image_url.is_none()
            && self.order_index.is_none()
    }
}
