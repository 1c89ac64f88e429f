use gamesoc_core::db::open_db_in_memory;
use gamesoc_core::{
    CommitteeRepository, CommitteeService, CommitteeServiceError, MemberPatch, NewMember,
    SqliteCommitteeRepository,
};
use uuid::Uuid;

fn setup() -> rusqlite::Connection {
    open_db_in_memory().unwrap()
}

#[test]
fn new_members_are_appended_with_max_plus_one() {
    let conn = setup();
    let service = CommitteeService::new(SqliteCommitteeRepository::try_new(&conn).unwrap());

    let committee = service.create_committee("Executive").unwrap();
    let first = service
        .add_member(committee.id, NewMember::new("Ana", "President"))
        .unwrap();
    let second = service
        .add_member(committee.id, NewMember::new("Ben", "Treasurer"))
        .unwrap();

    assert_eq!(first.order_index, 1);
    assert_eq!(second.order_index, 2);

    service
        .update_member(
            first.id,
            MemberPatch {
                order_index: Some(10),
                ..MemberPatch::default()
            },
        )
        .unwrap();
    let third = service
        .add_member(committee.id, NewMember::new("Cat", "Secretary"))
        .unwrap();
    assert_eq!(third.order_index, 11);
}

#[test]
fn list_members_is_sorted_by_order_index() {
    let conn = setup();
    let repo = SqliteCommitteeRepository::try_new(&conn).unwrap();
    let committee = repo.create_committee("Events").unwrap();
    let a = repo
        .create_member(committee.id, &NewMember::new("A", ""))
        .unwrap();
    let b = repo
        .create_member(committee.id, &NewMember::new("B", ""))
        .unwrap();
    let c = repo
        .create_member(committee.id, &NewMember::new("C", ""))
        .unwrap();

    repo.set_member_order(a.id, 3).unwrap();
    repo.set_member_order(c.id, 1).unwrap();
    repo.set_member_order(b.id, 2).unwrap();

    let names: Vec<String> = repo
        .list_members(committee.id)
        .unwrap()
        .into_iter()
        .map(|member| member.name)
        .collect();
    assert_eq!(names, vec!["C", "B", "A"]);
}

#[test]
fn members_are_scoped_to_their_committee() {
    let conn = setup();
    let service = CommitteeService::new(SqliteCommitteeRepository::try_new(&conn).unwrap());

    let exec = service.create_committee("Executive").unwrap();
    let events = service.create_committee("Events").unwrap();
    service
        .add_member(exec.id, NewMember::new("Ana", "President"))
        .unwrap();
    let other = service
        .add_member(events.id, NewMember::new("Ben", "Lead"))
        .unwrap();

    assert_eq!(other.order_index, 1);
    assert_eq!(service.list_members(exec.id).unwrap().len(), 1);
    assert_eq!(service.list_committees().unwrap().len(), 2);
}

#[test]
fn delete_does_not_renumber_siblings() {
    let conn = setup();
    let service = CommitteeService::new(SqliteCommitteeRepository::try_new(&conn).unwrap());
    let committee = service.create_committee("Executive").unwrap();

    let ids: Vec<_> = ["A", "B", "C"]
        .into_iter()
        .map(|name| {
            service
                .add_member(committee.id, NewMember::new(name, ""))
                .unwrap()
                .id
        })
        .collect();
    service.delete_member(ids[1]).unwrap();

    let indexes: Vec<u32> = service
        .list_members(committee.id)
        .unwrap()
        .into_iter()
        .map(|member| member.order_index)
        .collect();
    assert_eq!(indexes, vec![1, 3]);

    let err = service.delete_member(ids[1]).unwrap_err();
    assert!(matches!(err, CommitteeServiceError::MemberNotFound(id) if id == ids[1]));
}

#[test]
fn blank_names_are_rejected_and_values_trimmed() {
    let conn = setup();
    let service = CommitteeService::new(SqliteCommitteeRepository::try_new(&conn).unwrap());

    let err = service.create_committee("   ").unwrap_err();
    assert!(matches!(err, CommitteeServiceError::InvalidName));

    let committee = service.create_committee("  Outreach ").unwrap();
    assert_eq!(committee.name, "Outreach");

    let err = service
        .add_member(committee.id, NewMember::new(" ", "Lead"))
        .unwrap_err();
    assert!(matches!(err, CommitteeServiceError::InvalidName));

    let mut draft = NewMember::new(" Dana ", " Lead ");
    draft.image_url = Some("   ".to_string());
    let member = service.add_member(committee.id, draft).unwrap();
    assert_eq!(member.name, "Dana");
    assert_eq!(member.role, "Lead");
    assert_eq!(member.image_url, None);
}

#[test]
fn update_member_applies_partial_patch() {
    let conn = setup();
    let service = CommitteeService::new(SqliteCommitteeRepository::try_new(&conn).unwrap());
    let committee = service.create_committee("Executive").unwrap();
    let member = service
        .add_member(committee.id, NewMember::new("Ana", "President"))
        .unwrap();

    let updated = service
        .update_member(
            member.id,
            MemberPatch {
                role: Some("Vice President".to_string()),
                image_url: Some(Some("members/ana.png".to_string())),
                ..MemberPatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.name, "Ana");
    assert_eq!(updated.role, "Vice President");
    assert_eq!(updated.image_url.as_deref(), Some("members/ana.png"));

    let cleared = service
        .update_member(
            member.id,
            MemberPatch {
                image_url: Some(None),
                ..MemberPatch::default()
            },
        )
        .unwrap();
    assert_eq!(cleared.image_url, None);

    let err = service
        .update_member(
            member.id,
            MemberPatch {
                order_index: Some(0),
                ..MemberPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, CommitteeServiceError::InvalidOrderIndex(0)));
}

#[test]
fn manual_order_edit_rejects_sibling_collision() {
    let conn = setup();
    let service = CommitteeService::new(SqliteCommitteeRepository::try_new(&conn).unwrap());
    let committee = service.create_committee("Executive").unwrap();
    let other = service.create_committee("Events").unwrap();
    let ana = service
        .add_member(committee.id, NewMember::new("Ana", "President"))
        .unwrap();
    service
        .add_member(committee.id, NewMember::new("Ben", "Treasurer"))
        .unwrap();
    service
        .add_member(other.id, NewMember::new("Kai", "Lead"))
        .unwrap();

    let move_to = |order_index| MemberPatch {
        order_index: Some(order_index),
        ..MemberPatch::default()
    };

    let err = service.update_member(ana.id, move_to(2)).unwrap_err();
    assert!(matches!(err, CommitteeServiceError::OrderIndexTaken(2)));
    let indexes: Vec<u32> = service
        .list_members(committee.id)
        .unwrap()
        .into_iter()
        .map(|member| member.order_index)
        .collect();
    assert_eq!(indexes, vec![1, 2], "rejected edit must not be written");

    // Own index, also used by the other committee, then a free one.
    assert_eq!(service.update_member(ana.id, move_to(1)).unwrap().order_index, 1);
    assert_eq!(service.update_member(ana.id, move_to(5)).unwrap().order_index, 5);
}

#[test]
fn unknown_ids_map_to_not_found_errors() {
    let conn = setup();
    let service = CommitteeService::new(SqliteCommitteeRepository::try_new(&conn).unwrap());
    let missing = Uuid::new_v4();

    let err = service
        .add_member(missing, NewMember::new("Ana", ""))
        .unwrap_err();
    assert!(matches!(err, CommitteeServiceError::CommitteeNotFound(id) if id == missing));

    let err = service.list_members(missing).unwrap_err();
    assert!(matches!(err, CommitteeServiceError::CommitteeNotFound(_)));

    let err = service
        .update_member(missing, MemberPatch::default())
        .unwrap_err();
    assert!(matches!(err, CommitteeServiceError::MemberNotFound(_)));

    let err = service.rename_committee(missing, "Ghost").unwrap_err();
    assert!(matches!(err, CommitteeServiceError::CommitteeNotFound(_)));
}
