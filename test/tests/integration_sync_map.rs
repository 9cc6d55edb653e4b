/// End-to-end tests for tracked dictionaries
use synchrony_authority::SourceRoot;
use synchrony_replica::{TargetConfig, TargetRoot};
use synchrony_shared::{SyncMap, SyncRef};
use synchrony_test::{
    assert_tracked, protocol, replica_dependencies, Inventory, Item, Player, TestSession,
};

#[test]
fn dictionary_entries_are_tracked_references() {
    let inventory = SyncRef::new(Inventory::new());
    let mut session = TestSession::new(&inventory);
    assert_tracked!(session, 1);

    {
        let mut inventory = inventory.borrow_mut();
        inventory.insert("bow".to_string(), SyncRef::new(Item::new("bow", 3)));
        inventory.insert("rope".to_string(), SyncRef::new(Item::new("rope", 1)));
    }
    session.sync();

    assert_tracked!(session, 3);
    let replica = session.replica_root::<Inventory>();
    let replica = replica.borrow();
    assert_eq!(replica.len(), 2);
    assert_eq!(replica.get(&"bow".to_string()).unwrap().borrow().weight(), 3);
    assert_eq!(replica.get(&"rope".to_string()).unwrap().borrow().label(), "rope");
}

#[test]
fn dictionary_removal_and_replacement() {
    let bow = SyncRef::new(Item::new("bow", 3));
    let mut inventory = Inventory::new();
    inventory.insert("bow".to_string(), bow.clone());
    inventory.insert("rope".to_string(), SyncRef::new(Item::new("rope", 1)));
    let inventory = SyncRef::new(inventory);
    let mut session = TestSession::new(&inventory);

    {
        let mut inventory = inventory.borrow_mut();
        inventory.remove(&"bow".to_string());
        inventory.insert("rope".to_string(), SyncRef::new(Item::new("better rope", 2)));
    }
    session.sync();

    assert_tracked!(session, 2);
    let replica = session.replica_root::<Inventory>();
    let replica = replica.borrow();
    assert!(!replica.contains_key(&"bow".to_string()));
    assert_eq!(
        replica.get(&"rope".to_string()).unwrap().borrow().label(),
        "better rope"
    );
}

#[test]
fn same_object_under_two_keys_is_one_reference() {
    let item = SyncRef::new(Item::new("coin", 0));
    let mut inventory = Inventory::new();
    inventory.insert("left".to_string(), item.clone());
    inventory.insert("right".to_string(), item.clone());
    let inventory = SyncRef::new(inventory);

    let session = TestSession::new(&inventory);

    assert_tracked!(session, 2);
    let replica = session.replica_root::<Inventory>();
    let replica = replica.borrow();
    let left = replica.get(&"left".to_string()).unwrap();
    let right = replica.get(&"right".to_string()).unwrap();
    assert!(left.ptr_eq(right));
}

#[test]
fn nested_dictionary_on_a_player() {
    let player = SyncRef::new(Player::new("nora"));
    let mut roster = SyncMap::new();
    roster.insert(1_u32, player.clone());
    let roster = SyncRef::new(roster);
    let mut session = TestSession::new(&roster);

    let mut inventory = Inventory::new();
    inventory.insert("map".to_string(), SyncRef::new(Item::new("map", 1)));
    player.borrow_mut().inventory = Some(SyncRef::new(inventory));
    session.sync();

    // roster, player, inventory, item
    assert_tracked!(session, 4);
    let replica_player = session.replica_of(&player);
    let replica_inventory = replica_player.borrow().inventory.clone().unwrap();
    assert_eq!(replica_inventory.borrow().len(), 1);
}

#[test]
fn dictionary_snapshot_drops_stale_keys() {
    let mut inventory = Inventory::new();
    inventory.insert("a".to_string(), SyncRef::new(Item::new("a", 1)));
    inventory.insert("b".to_string(), SyncRef::new(Item::new("b", 1)));
    let inventory = SyncRef::new(inventory);

    let mut source = SourceRoot::new(protocol(), &inventory).unwrap();
    let full = source.write_full().unwrap();
    let mut target =
        TargetRoot::new(protocol(), TargetConfig::default(), replica_dependencies(), &full)
            .unwrap();

    inventory.borrow_mut().remove(&"a".to_string());
    source.advance_tick();
    // the diff reporting the removal is lost
    let _ = source.write_changes().unwrap();
    source.advance_tick();
    target.read(&source.write_full().unwrap()).unwrap();

    let replica = target.root::<Inventory>().unwrap();
    assert_eq!(replica.borrow().len(), 1);
    assert!(replica.borrow().contains_key(&"b".to_string()));
    assert_eq!(target.tracked_count(), 2);
}

#[test]
fn interleaved_key_changes_stay_in_step() {
    let mut inventory = Inventory::new();
    for index in 0..60 {
        let key = format!("k{:03}", index * 2);
        inventory.insert(key.clone(), SyncRef::new(Item::new(&key, index)));
    }
    let inventory = SyncRef::new(inventory);
    let mut session = TestSession::new(&inventory);

    {
        let mut inventory = inventory.borrow_mut();
        for index in 0..60 {
            match index % 3 {
                0 => {
                    inventory.remove(&format!("k{:03}", index * 2));
                }
                1 => {
                    let key = format!("k{:03}", index * 2 + 1);
                    inventory.insert(key.clone(), SyncRef::new(Item::new(&key, index)));
                }
                _ => {
                    let key = format!("k{:03}", index * 2);
                    inventory.insert(key.clone(), SyncRef::new(Item::new("swapped", index)));
                }
            }
        }
    }
    session.sync();

    let replica = session.replica_root::<Inventory>();
    let replica = replica.borrow();
    let authority = inventory.borrow();
    assert_eq!(replica.len(), authority.len());
    for (key, item) in authority.iter() {
        let copy = replica.get(key).unwrap().borrow();
        assert_eq!(copy.label(), item.borrow().label());
        assert_eq!(copy.weight(), item.borrow().weight());
    }
    assert!(!replica.contains_key(&"k000".to_string()));
    assert_eq!(replica.get(&"k003".to_string()).unwrap().borrow().label(), "k003");
    assert_eq!(replica.get(&"k004".to_string()).unwrap().borrow().label(), "swapped");
}
