/// End-to-end tests for incremental frames: only what changed is written
use synchrony_replica::TargetEvent;
use synchrony_shared::SyncRef;
use synchrony_test::{Item, Player, TestSession, World};

fn changed(events: &[TargetEvent]) -> Vec<TargetEvent> {
    events
        .iter()
        .copied()
        .filter(|event| matches!(event, TargetEvent::Changed(_)))
        .collect()
}

fn world_with_player() -> (SyncRef<World>, SyncRef<Player>, SyncRef<Item>) {
    let player = SyncRef::new(Player::new("carol"));
    let item = SyncRef::new(Item::new("shield", 30));
    let mut roster = synchrony_shared::SyncMap::new();
    roster.insert(7, player.clone());
    let world = SyncRef::new(World {
        round: 1,
        roster: Some(SyncRef::new(roster)),
        featured: Some(item.clone()),
        turret: None,
    });
    (world, player, item)
}

#[test]
fn unchanged_graph_writes_no_entries() {
    let (world, _, _) = world_with_player();
    let mut session = TestSession::new(&world);
    session.events();

    let first = session.sync();
    let second = session.sync();

    assert_eq!(first.len(), second.len());
    assert!(changed(&session.events()).is_empty());
}

#[test]
fn only_the_changed_object_is_reported() {
    let (world, player, _) = world_with_player();
    let mut session = TestSession::new(&world);
    session.events();

    player.borrow_mut().score = 99;
    session.sync();

    let player_id = session.authority_id(&player);
    assert_eq!(
        changed(&session.events()),
        vec![TargetEvent::Changed(player_id)]
    );
    assert_eq!(session.replica_of(&player).borrow().score, 99);
}

#[test]
fn diff_grows_with_changed_members() {
    let (world, player, _) = world_with_player();
    let mut session = TestSession::new(&world);
    let idle = session.sync();

    player.borrow_mut().score = 1;
    let one_member = session.sync();

    {
        let mut player = player.borrow_mut();
        player.score = 2;
        player.health = 50;
    }
    let two_members = session.sync();

    assert!(idle.len() < one_member.len());
    assert!(one_member.len() < two_members.len());
}

#[test]
fn diff_is_smaller_than_full_frame() {
    let (world, player, _) = world_with_player();
    let mut session = TestSession::new(&world);

    player.borrow_mut().score = 5;
    let diff = session.sync();
    let full = session.sync_full();

    assert!(diff.len() < full.len());
}

#[test]
fn flagged_members_are_written() {
    let (world, _, item) = world_with_player();
    let mut session = TestSession::new(&world);

    item.borrow_mut().set_weight(31);
    session.sync();

    assert_eq!(session.replica_of(&item).borrow().weight(), 31);
}

#[test]
fn unflagged_mutation_is_not_written() {
    let (world, _, item) = world_with_player();
    let mut session = TestSession::new(&world);
    session.events();

    item.borrow_mut().set_weight_silently(99);
    session.sync();

    assert!(changed(&session.events()).is_empty());
    assert_eq!(session.replica_of(&item).borrow().weight(), 30);

    // picked up once anything flags the member
    item.borrow_mut().set_weight(99);
    session.sync();
    assert_eq!(session.replica_of(&item).borrow().weight(), 99);
}

#[test]
fn full_frame_resends_unflagged_state() {
    let (world, _, item) = world_with_player();
    let mut session = TestSession::new(&world);

    item.borrow_mut().set_weight_silently(7);
    session.sync();
    session.sync_full();

    assert_eq!(session.replica_of(&item).borrow().weight(), 7);
}

#[test]
fn unchanged_value_written_again_is_not_sent() {
    let (world, player, _) = world_with_player();
    let mut session = TestSession::new(&world);
    session.events();

    player.borrow_mut().score = 0;
    session.sync();

    assert!(changed(&session.events()).is_empty());
}
