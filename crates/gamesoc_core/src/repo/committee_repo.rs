//! Committee repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist committees and their ordered member lists.
//! - Serve as the backing store for member reordering (`OrderStore`).
//!
//! # Invariants
//! - New members are appended with `MAX(order_index) + 1` (1 when empty).
//! - Deleting a member never renumbers its siblings.
//! - Member listing order is `order_index ASC, id ASC`.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::committee::{
    Committee, CommitteeId, CommitteeMember, MemberId, MemberPatch, NewMember,
};
use crate::reorder::OrderStore;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const MEMBER_SELECT_SQL: &str = "SELECT
    id,
    committee_id,
    name,
    role,
    image_url,
    order_index,
    created_at,
    updated_at
FROM committee_members";

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from committee repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    CommitteeNotFound(CommitteeId),
    MemberNotFound(MemberId),
    /// Another member of the committee already holds this position.
    OrderIndexTaken {
        committee_id: CommitteeId,
        order_index: u32,
    },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::CommitteeNotFound(id) => write!(f, "committee not found: {id}"),
            Self::MemberNotFound(id) => write!(f, "committee member not found: {id}"),
            Self::OrderIndexTaken {
                committee_id,
                order_index,
            } => write!(
                f,
                "order index {order_index} is already used in committee {committee_id}"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "committee repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid committee data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for committees and their members.
pub trait CommitteeRepository {
    fn create_committee(&self, name: &str) -> RepoResult<Committee>;
    fn get_committee(&self, id: CommitteeId) -> RepoResult<Option<Committee>>;
    /// Lists committees by creation time.
    fn list_committees(&self) -> RepoResult<Vec<Committee>>;
    fn rename_committee(&self, id: CommitteeId, name: &str) -> RepoResult<Committee>;
    /// Appends one member at the end of the committee order.
    fn create_member(&self, committee_id: CommitteeId, member: &NewMember)
        -> RepoResult<CommitteeMember>;
    fn get_member(&self, id: MemberId) -> RepoResult<Option<CommitteeMember>>;
    fn list_members(&self, committee_id: CommitteeId) -> RepoResult<Vec<CommitteeMember>>;
    fn update_member(&self, id: MemberId, patch: &MemberPatch) -> RepoResult<CommitteeMember>;
    /// Writes only the persisted position of one member.
    fn set_member_order(&self, id: MemberId, order_index: u32) -> RepoResult<CommitteeMember>;
    fn delete_member(&self, id: MemberId) -> RepoResult<()>;
}

/// SQLite-backed committee repository.
pub struct SqliteCommitteeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCommitteeRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version: u32 =
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl CommitteeRepository for SqliteCommitteeRepository<'_> {
    fn create_committee(&self, name: &str) -> RepoResult<Committee> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO committees (id, name) VALUES (?1, ?2);",
            params![id.to_string(), name],
        )?;
        self.get_committee(id)?
            .ok_or(RepoError::CommitteeNotFound(id))
    }

    fn get_committee(&self, id: CommitteeId) -> RepoResult<Option<Committee>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, created_at, updated_at
             FROM committees
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_committee_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_committees(&self) -> RepoResult<Vec<Committee>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, created_at, updated_at
             FROM committees
             ORDER BY created_at ASC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_committee_row(row)?);
        }
        Ok(items)
    }

    fn rename_committee(&self, id: CommitteeId, name: &str) -> RepoResult<Committee> {
        let changed = self.conn.execute(
            "UPDATE committees
             SET name = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id.to_string(), name],
        )?;
        if changed == 0 {
            return Err(RepoError::CommitteeNotFound(id));
        }
        self.get_committee(id)?
            .ok_or(RepoError::CommitteeNotFound(id))
    }

    fn create_member(
        &self,
        committee_id: CommitteeId,
        member: &NewMember,
    ) -> RepoResult<CommitteeMember> {
        let id = Uuid::new_v4();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let committee_exists: Option<String> = tx
            .query_row(
                "SELECT id FROM committees WHERE id = ?1;",
                [committee_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        if committee_exists.is_none() {
            return Err(RepoError::CommitteeNotFound(committee_id));
        }

        let order_index: i64 = tx.query_row(
            "SELECT COALESCE(MAX(order_index), 0) + 1
             FROM committee_members
             WHERE committee_id = ?1;",
            [committee_id.to_string()],
            |row| row.get(0),
        )?;
        tx.execute(
            "INSERT INTO committee_members (
                id,
                committee_id,
                name,
                role,
                image_url,
                order_index
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                id.to_string(),
                committee_id.to_string(),
                member.name.as_str(),
                member.role.as_str(),
                member.image_url.as_deref(),
                order_index,
            ],
        )?;
        tx.commit()?;

        load_required_member(self.conn, id)
    }

    fn get_member(&self, id: MemberId) -> RepoResult<Option<CommitteeMember>> {
        let sql = format!("{MEMBER_SELECT_SQL} WHERE id = ?1;");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_member_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_members(&self, committee_id: CommitteeId) -> RepoResult<Vec<CommitteeMember>> {
        if self.get_committee(committee_id)?.is_none() {
            return Err(RepoError::CommitteeNotFound(committee_id));
        }

        let sql = format!(
            "{MEMBER_SELECT_SQL}
             WHERE committee_id = ?1
             ORDER BY order_index ASC, id ASC;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([committee_id.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_member_row(row)?);
        }
        Ok(items)
    }

    fn update_member(&self, id: MemberId, patch: &MemberPatch) -> RepoResult<CommitteeMember> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut member = load_required_member(&tx, id)?;

        if let Some(name) = &patch.name {
            member.name = name.clone();
        }
        if let Some(role) = &patch.role {
            member.role = role.clone();
        }
        if let Some(image_url) = &patch.image_url {
            member.image_url = image_url.clone();
        }
        if let Some(order_index) = patch.order_index {
            if order_index != member.order_index {
                let taken: bool = tx.query_row(
                    "SELECT EXISTS(
                        SELECT 1 FROM committee_members
                        WHERE committee_id = ?1 AND order_index = ?2 AND id <> ?3
                     );",
                    params![
                        member.committee_id.to_string(),
                        i64::from(order_index),
                        id.to_string()
                    ],
                    |row| row.get(0),
                )?;
                if taken {
                    return Err(RepoError::OrderIndexTaken {
                        committee_id: member.committee_id,
                        order_index,
                    });
                }
            }
            member.order_index = order_index;
        }

        tx.execute(
            "UPDATE committee_members
             SET name = ?2,
                 role = ?3,
                 image_url = ?4,
                 order_index = ?5,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                id.to_string(),
                member.name.as_str(),
                member.role.as_str(),
                member.image_url.as_deref(),
                i64::from(member.order_index),
            ],
        )?;
        tx.commit()?;

        load_required_member(self.conn, id)
    }

    fn set_member_order(&self, id: MemberId, order_index: u32) -> RepoResult<CommitteeMember> {
        let changed = self.conn.execute(
            "UPDATE committee_members
             SET order_index = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id.to_string(), i64::from(order_index)],
        )?;
        if changed == 0 {
            return Err(RepoError::MemberNotFound(id));
        }
        load_required_member(self.conn, id)
    }

    fn delete_member(&self, id: MemberId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM committee_members WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::MemberNotFound(id));
        }
        Ok(())
    }
}

impl OrderStore for SqliteCommitteeRepository<'_> {
    type Item = CommitteeMember;
    type ParentId = CommitteeId;
    type Error = RepoError;

    fn update_order_index(&self, id: &MemberId, order_index: u32) -> RepoResult<CommitteeMember> {
        self.set_member_order(*id, order_index)
    }

    fn list_items(&self, parent_id: &CommitteeId) -> RepoResult<Vec<CommitteeMember>> {
        self.list_members(*parent_id)
    }
}

fn load_required_member(conn: &Connection, id: MemberId) -> RepoResult<CommitteeMember> {
    let sql = format!("{MEMBER_SELECT_SQL} WHERE id = ?1;");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([id.to_string()])?;
    match rows.next()? {
        Some(row) => parse_member_row(row),
        None => Err(RepoError::MemberNotFound(id)),
    }
}

fn parse_committee_row(row: &Row<'_>) -> RepoResult<Committee> {
    let id_text: String = row.get("id")?;
    Ok(Committee {
        id: parse_uuid(&id_text, "committees.id")?,
        name: row.get("name")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_member_row(row: &Row<'_>) -> RepoResult<CommitteeMember> {
    let id_text: String = row.get("id")?;
    let committee_text: String = row.get("committee_id")?;
    let raw_order: i64 = row.get("order_index")?;
    let order_index = u32::try_from(raw_order)
        .ok()
        .filter(|value| *value >= 1)
        .ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid order_index `{raw_order}` in committee_members.order_index"
            ))
        })?;

    Ok(CommitteeMember {
        id: parse_uuid(&id_text, "committee_members.id")?,
        committee_id: parse_uuid(&committee_text, "committee_members.committee_id")?,
        name: row.get("name")?,
        role: row.get("role")?,
        image_url: row.get("image_url")?,
        order_index,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}
