/// End-to-end tests for full snapshots: the replica graph mirrors the
/// authority graph, shared references stay shared, and late joiners can
/// start from any full frame
use synchrony_replica::{TargetConfig, TargetEvent, TargetRoot};
use synchrony_shared::{ReferenceId, SyncMap, SyncRef};
use synchrony_test::{
    assert_same_object, assert_tracked, protocol, replica_dependencies, Item, Player, Team,
    TestSession, Vec2, World,
};

fn populated_world() -> (SyncRef<World>, SyncRef<Player>, SyncRef<Player>, SyncRef<Team>) {
    let team = SyncRef::new(Team::new("blue"));

    let alice = SyncRef::new(Player::new("alice"));
    {
        let mut alice = alice.borrow_mut();
        alice.position = Vec2::new(1.0, 2.0);
        alice.score = 10;
        alice.team = Some(team.clone());
    }
    let bob = SyncRef::new(Player::new("bob"));
    {
        let mut bob = bob.borrow_mut();
        bob.health = 40;
        bob.motto = "onward".to_string();
        bob.team = Some(team.clone());
    }

    let mut roster = SyncMap::new();
    roster.insert(1, alice.clone());
    roster.insert(2, bob.clone());

    let world = SyncRef::new(World {
        round: 3,
        roster: Some(SyncRef::new(roster)),
        featured: Some(SyncRef::new(Item::new("sword", 12))),
        turret: None,
    });
    (world, alice, bob, team)
}

#[test]
fn full_snapshot_reproduces_graph() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (world, alice, bob, _team) = populated_world();

    let session = TestSession::new(&world);

    // world, roster, two players, team, item
    assert_tracked!(session, 6);

    let replica = session.replica_root::<World>();
    let replica = replica.borrow();
    assert_eq!(replica.round, 3);

    let featured = replica.featured.as_ref().expect("featured item replicated");
    assert_eq!(featured.borrow().label(), "sword");
    assert_eq!(featured.borrow().weight(), 12);

    let roster = replica.roster.as_ref().expect("roster replicated");
    let roster = roster.borrow();
    assert_eq!(roster.len(), 2);

    let replica_alice = roster.get(&1).expect("alice replicated");
    let replica_bob = roster.get(&2).expect("bob replicated");
    assert_eq!(replica_alice.borrow().name(), "alice");
    assert_eq!(replica_alice.borrow().position, Vec2::new(1.0, 2.0));
    assert_eq!(replica_alice.borrow().score, 10);
    assert_eq!(replica_bob.borrow().name(), "bob");
    assert_eq!(replica_bob.borrow().health, 40);
    assert_eq!(replica_bob.borrow().motto, "onward");

    assert_same_object!(session.replica_of(&alice), replica_alice.clone());
    assert_same_object!(session.replica_of(&bob), replica_bob.clone());
}

#[test]
fn shared_reference_is_one_replica_object() {
    let (world, alice, bob, team) = populated_world();
    let mut session = TestSession::new(&world);

    let alice_team = session.replica_of(&alice).borrow().team.clone().unwrap();
    let bob_team = session.replica_of(&bob).borrow().team.clone().unwrap();
    assert_same_object!(alice_team, bob_team);
    assert_same_object!(alice_team, session.replica_of(&team));

    team.borrow_mut().name = "red".to_string();
    session.sync();

    // identity survives updates
    let alice_team_after = session.replica_of(&alice).borrow().team.clone().unwrap();
    assert_same_object!(alice_team, alice_team_after);
    assert_eq!(alice_team_after.borrow().name, "red");
}

#[test]
fn initial_read_queues_construction_events() {
    let (world, _, _, _) = populated_world();
    let mut session = TestSession::new(&world);

    let events = session.events();

    assert_eq!(events.first(), Some(&TargetEvent::BeginRead));
    assert_eq!(events.last(), Some(&TargetEvent::EndRead(0)));
    let constructed = events
        .iter()
        .filter(|event| matches!(event, TargetEvent::Constructed(_)))
        .count();
    assert_eq!(constructed, 6);
    assert!(events.contains(&TargetEvent::Constructed(ReferenceId::ROOT)));
}

#[test]
fn fresh_replica_joins_from_later_full_frame() {
    let (world, alice, _, _) = populated_world();
    let mut session = TestSession::new(&world);

    // types announced long ago, by frames the late joiner never saw
    alice.borrow_mut().score = 11;
    session.sync();
    world.borrow_mut().round = 4;
    session.sync();

    session.source.advance_tick();
    let full = session.source.write_full().unwrap();
    let late = TargetRoot::new(
        protocol(),
        TargetConfig::default(),
        replica_dependencies(),
        &full,
    )
    .unwrap();

    assert_eq!(late.tracked_count(), session.source.tracked_count());
    assert_eq!(late.clock().other_tick(), session.source.tick());
    assert_eq!(late.root::<World>().unwrap().borrow().round, 4);
    let late_alice = late
        .resolve::<Player>(session.authority_id(&alice))
        .unwrap();
    assert_eq!(late_alice.borrow().score, 11);
}

#[test]
fn replicas_are_independent() {
    let (world, alice, _, _) = populated_world();
    let mut session = TestSession::new(&world);
    let full = {
        session.source.advance_tick();
        session.source.write_full().unwrap()
    };
    let other = TargetRoot::new(protocol(), TargetConfig::default(), replica_dependencies(), &full)
        .unwrap();

    let id = session.authority_id(&alice);
    let first = session.target.resolve::<Player>(id).unwrap();
    let second = other.resolve::<Player>(id).unwrap();

    assert!(!first.ptr_eq(&second));
    assert_eq!(first.borrow().name(), second.borrow().name());
}
