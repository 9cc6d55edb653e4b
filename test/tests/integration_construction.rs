/// End-to-end tests for replica-side construction: constructor arguments,
/// dependencies, cycles and synchronization callbacks
use synchrony_authority::SourceRoot;
use synchrony_replica::{TargetConfig, TargetError, TargetRoot};
use synchrony_shared::{DependencyMap, SchemaError, SyncMap, SyncRef};
use synchrony_test::{
    assert_same_object, protocol, replica_dependencies, Chicken, Egg, GetterOnly, Item, Nest,
    Player, Team, TestSession, Turret, World,
};

fn initial_read<T: 'static>(
    root: &SyncRef<T>,
    dependencies: DependencyMap,
) -> Result<TargetRoot, TargetError> {
    let mut source = SourceRoot::new(protocol(), root).unwrap();
    let frame = source.write_full().unwrap();
    TargetRoot::new(protocol(), TargetConfig::default(), dependencies, &frame)
}

fn armed_world() -> (SyncRef<World>, SyncRef<Turret>, SyncRef<Item>) {
    let mount = SyncRef::new(Item::new("tripod", 30));
    let turret = SyncRef::new(Turret::new(40, Some(mount.clone())));
    let world = SyncRef::new(World {
        turret: Some(turret.clone()),
        ..World::default()
    });
    (world, turret, mount)
}

#[test]
fn constructor_argument_is_constructed_first() {
    let (world, turret, mount) = armed_world();
    let session = TestSession::new(&world);

    // the turret is announced before its mount
    assert!(session.authority_id(&turret) < session.authority_id(&mount));

    let replica_turret = session.replica_of(&turret);
    let replica_mount = session.replica_of(&mount);
    let turret = replica_turret.borrow();
    assert_eq!(turret.caliber, 40);
    assert_same_object!(turret.mount().unwrap(), replica_mount);
    assert_eq!(replica_mount.borrow().label(), "tripod");
}

#[test]
fn constructor_receives_dependencies() {
    let (world, turret, _) = armed_world();
    let session = TestSession::new(&world);

    let replica_turret = session.replica_of(&turret);
    assert_eq!(
        replica_turret.borrow().spawner().unwrap().region,
        "north"
    );
    assert!(turret.borrow().spawner().is_none());
}

#[test]
fn missing_dependency_fails_construction() {
    let (world, _, _) = armed_world();

    match initial_read(&world, DependencyMap::new()) {
        Err(TargetError::DependencyNotFound { type_name, dependency }) => {
            assert_eq!(type_name, "Turret");
            assert!(dependency.ends_with("Spawner"));
        }
        _ => panic!("Expected DependencyNotFound error"),
    }
}

#[test]
fn constructor_cycle_is_reported() {
    let chicken = SyncRef::new(Chicken { egg: None });
    let egg = SyncRef::new(Egg {
        chicken: Some(chicken.clone()),
    });
    chicken.borrow_mut().egg = Some(egg.clone());
    let nest = SyncRef::new(Nest {
        egg: Some(egg.clone()),
    });

    match initial_read(&nest, replica_dependencies()) {
        Err(TargetError::ConstructorCycle { chain }) => {
            let names: Vec<&str> = chain.iter().map(|(_, name)| name.as_str()).collect();
            assert_eq!(names, vec!["Egg", "Chicken", "Egg"]);
            assert_eq!(chain.first().map(|(id, _)| *id), chain.last().map(|(id, _)| *id));
        }
        _ => panic!("Expected ConstructorCycle error"),
    }
}

#[test]
fn cycle_message_lists_the_chain() {
    let chicken = SyncRef::new(Chicken { egg: None });
    let egg = SyncRef::new(Egg {
        chicken: Some(chicken.clone()),
    });
    chicken.borrow_mut().egg = Some(egg.clone());
    let nest = SyncRef::new(Nest { egg: Some(egg) });

    let Err(error) = initial_read(&nest, replica_dependencies()) else {
        panic!("Expected ConstructorCycle error");
    };
    let message = error.to_string();
    assert!(message.contains("Egg"));
    assert!(message.contains("Chicken"));
}

#[test]
fn get_only_member_without_constructor_fails() {
    let root = SyncRef::new(GetterOnly { id: 7 });

    match initial_read(&root, replica_dependencies()) {
        Err(TargetError::Schema(SchemaError::SetterNotFound { type_name, member })) => {
            assert_eq!(type_name, "GetterOnly");
            assert_eq!(member, "id");
        }
        _ => panic!("Expected SetterNotFound error"),
    }
}

#[test]
fn get_only_member_is_filled_by_constructor() {
    let player = SyncRef::new(Player::new("ines"));
    let mut roster = SyncMap::new();
    roster.insert(4_u32, player.clone());
    let roster = SyncRef::new(roster);

    let mut session = TestSession::new(&roster);
    assert_eq!(session.replica_of(&player).borrow().name(), "ines");

    // later changes to a constructor member are not applied
    player.borrow_mut().rename("nobody");
    session.sync();
    assert_eq!(session.replica_of(&player).borrow().name(), "ines");
}

#[test]
fn constructed_callback_runs_once() {
    let team = SyncRef::new(Team::new("red"));
    let mut player = Player::new("ada");
    player.team = Some(team.clone());
    let player = SyncRef::new(player);
    let mut roster = SyncMap::new();
    roster.insert(1_u32, player.clone());
    let roster = SyncRef::new(roster);
    let mut session = TestSession::new(&roster);

    team.borrow_mut().name = "blue".to_string();
    session.sync();
    session.sync();

    let replica_team = session.replica_of(&team);
    assert_eq!(replica_team.borrow().name, "blue");
    assert_eq!(replica_team.borrow().constructed, 1);
    assert_eq!(team.borrow().constructed, 0);
}

#[test]
fn every_update_callback_follows_changes() {
    let player = SyncRef::new(Player::new("ada"));
    let mut roster = SyncMap::new();
    roster.insert(1_u32, player.clone());
    let roster = SyncRef::new(roster);
    let mut session = TestSession::new(&roster);
    assert_eq!(session.replica_of(&player).borrow().synchronized, 1);

    player.borrow_mut().score = 10;
    session.sync();
    assert_eq!(session.replica_of(&player).borrow().synchronized, 2);

    // nothing changed, nothing to report
    session.sync();
    assert_eq!(session.replica_of(&player).borrow().synchronized, 2);
}
