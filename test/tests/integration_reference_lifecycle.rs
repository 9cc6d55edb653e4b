/// End-to-end tests for reference tracking: removal, identifier reuse and
/// resynchronization through full frames
use synchrony_replica::TargetEvent;
use synchrony_shared::{ReferenceId, SyncRef};
use synchrony_test::{assert_tracked, Item, TestSession, World};

fn world_featuring(item: &SyncRef<Item>) -> SyncRef<World> {
    SyncRef::new(World {
        featured: Some(item.clone()),
        ..World::default()
    })
}

#[test]
fn unreachable_reference_is_removed_on_both_sides() {
    let item = SyncRef::new(Item::new("axe", 4));
    let world = world_featuring(&item);
    let mut session = TestSession::new(&world);
    let id = session.authority_id(&item);
    assert_tracked!(session, 2);
    session.events();

    world.borrow_mut().featured = None;
    session.sync();

    assert_tracked!(session, 1);
    assert!(session.events().contains(&TargetEvent::Removed(id)));
    assert!(session.target.resolve::<Item>(id).is_none());
    assert!(session.replica_root::<World>().borrow().featured.is_none());
}

#[test]
fn reused_identifier_never_aliases() {
    let first = SyncRef::new(Item::new("first", 1));
    let world = world_featuring(&first);
    let mut session = TestSession::new(&world);
    let id = session.authority_id(&first);
    let first_replica = session.replica_of(&first);

    world.borrow_mut().featured = None;
    session.sync();

    let second = SyncRef::new(Item::new("second", 2));
    world.borrow_mut().featured = Some(second.clone());
    session.sync();

    // the identifier is handed out again, to a different object
    assert_eq!(session.authority_id(&second), id);
    let second_replica = session.replica_of(&second);
    assert!(!second_replica.ptr_eq(&first_replica));
    assert_eq!(second_replica.borrow().label(), "second");
    assert_eq!(first_replica.borrow().label(), "first");
}

#[test]
fn identifier_is_not_reused_within_the_removing_frame() {
    let first = SyncRef::new(Item::new("first", 1));
    let world = world_featuring(&first);
    let mut session = TestSession::new(&world);
    let id = session.authority_id(&first);

    // swapped in one step: the old identifier is still being reported
    let second = SyncRef::new(Item::new("second", 2));
    world.borrow_mut().featured = Some(second.clone());
    session.sync();

    assert_ne!(session.authority_id(&second), id);
    assert_eq!(
        session.replica_root::<World>().borrow().featured.as_ref().unwrap().borrow().label(),
        "second"
    );
    assert_tracked!(session, 2);
}

#[test]
fn full_frame_removes_references_it_does_not_carry() {
    let item = SyncRef::new(Item::new("lost", 9));
    let world = world_featuring(&item);
    let mut session = TestSession::new(&world);
    let id = session.authority_id(&item);

    world.borrow_mut().featured = None;
    session.drop_frame();
    assert_eq!(session.target.tracked_count(), 2);
    session.events();

    session.sync_full();

    assert_tracked!(session, 1);
    assert!(session.events().contains(&TargetEvent::Removed(id)));
}

#[test]
fn full_frame_restores_missed_changes() {
    let item = SyncRef::new(Item::new("old", 1));
    let world = world_featuring(&item);
    let mut session = TestSession::new(&world);

    world.borrow_mut().round = 8;
    item.borrow_mut().set_label("new");
    session.drop_frame();
    session.sync_full();

    assert_eq!(session.replica_root::<World>().borrow().round, 8);
    assert_eq!(session.replica_of(&item).borrow().label(), "new");
}

#[test]
fn root_is_never_removed() {
    let world = SyncRef::new(World::default());
    let mut session = TestSession::new(&world);

    session.sync_full();
    session.sync();

    assert!(session.target.resolve::<World>(ReferenceId::ROOT).is_some());
    assert!(session
        .events()
        .iter()
        .all(|event| !matches!(event, TargetEvent::Removed(_))));
}

#[test]
fn every_read_is_bracketed_by_events() {
    let world = SyncRef::new(World::default());
    let mut session = TestSession::new(&world);
    session.events();

    session.sync();
    let tick = session.source.tick();
    session.update_after(std::time::Duration::ZERO);

    assert_eq!(
        session.events(),
        vec![
            TargetEvent::BeginRead,
            TargetEvent::EndRead(tick),
            TargetEvent::Updated
        ]
    );
    assert_eq!(session.target.clock().other_tick(), tick);
    assert_eq!(session.target.clock().own_tick(), 1);
}
