use std::collections::BTreeSet;

use rand::{rngs::StdRng, Rng, SeedableRng};

use aquarium_core::{
    reconcile, Container, InventoryItemRef, ItemId, ItemKind, LayoutRecord, LayoutSnapshot, Point, UserId,
};
use aquarium_engine::{EngineConfig, EngineError, LoadOutcome, StaticIdentity};
use aquarium_harness::{creature, decoration, TestTank};

fn placed(id: &str, x: f64, y: f64, scale: f64, container: Container) -> LayoutRecord {
    LayoutRecord {
        id: ItemId::from(id),
        kind: ItemKind::Creature,
        x,
        y,
        scale,
        container,
        display_name: Some("stale name".into()),
        image_ref: Some("stale.png".into()),
    }
}

fn ids<'a>(records: impl IntoIterator<Item = &'a LayoutRecord>) -> BTreeSet<String> {
    records.into_iter().map(|r| r.id.to_string()).collect()
}

// ============================================================================
// Reconciliation properties
// ============================================================================

#[test]
fn reconcile_properties_hold_for_random_inputs() {
    let pool: Vec<String> = (0..12).map(|i| format!("item{i}")).collect();
    let mut rng = StdRng::seed_from_u64(2024);

    for _ in 0..200 {
        let mut inventory: Vec<InventoryItemRef> = Vec::new();
        let mut persisted: Vec<LayoutRecord> = Vec::new();
        for id in &pool {
            if rng.gen_bool(0.5) {
                inventory.push(if rng.gen_bool(0.5) { creature(id) } else { decoration(id) });
            }
            if rng.gen_bool(0.5) {
                let container = if rng.gen_bool(0.5) { Container::Tank } else { Container::Warehouse };
                let (x, y, scale) = (rng.gen_range(0.0..800.0), rng.gen_range(0.0..600.0), rng.gen_range(0.3..3.0));
                persisted.push(placed(id, x, y, scale, container));
            }
        }

        let merged = reconcile(&inventory, Some(persisted.as_slice()));

        // Completeness: ids(result) == ids(L) ∪ ids(I), one record each.
        let expected: BTreeSet<String> = ids(&persisted)
            .union(&inventory.iter().map(|i| i.id.to_string()).collect())
            .cloned()
            .collect();
        assert_eq!(ids(&merged), expected);
        assert_eq!(merged.len(), expected.len());

        for record in &merged {
            let saved = persisted.iter().find(|p| p.id == record.id);
            let owned = inventory.iter().find(|i| i.id == record.id);
            match (saved, owned) {
                // Spatial state preserved, metadata refreshed.
                (Some(saved), Some(owned)) => {
                    assert!(record.same_placement(saved));
                    assert_eq!(record.display_name.as_deref(), Some(owned.display_name.as_str()));
                }
                // Orphans untouched.
                (Some(saved), None) => assert_eq!(record, saved),
                // New items get the default placement.
                (None, Some(_)) => {
                    assert_eq!(record.container, Container::Warehouse);
                    assert_eq!((record.x, record.y, record.scale), (400.0, 300.0, 1.0));
                }
                (None, None) => panic!("{} came from nowhere", record.id),
            }
        }
    }
}

#[test]
fn scenario_a_first_visit_warehouses_the_octopus() -> Result<(), Box<dyn std::error::Error>> {
    let mut tank = TestTank::new();
    tank.owns(vec![creature("octopus")]);

    let outcome = tank.load();
    assert_eq!(outcome, LoadOutcome::Loaded { user_id: tank.user, items: 1, in_tank: 0 });

    let records = tank.engine.records();
    assert_eq!(records.len(), 1);
    let octopus = &records[0];
    assert_eq!(octopus.id.as_str(), "octopus");
    assert_eq!(octopus.container, Container::Warehouse);
    assert_eq!((octopus.x, octopus.y, octopus.scale), (400.0, 300.0, 1.0));

    // Reconciliation alone never writes.
    tank.frames(5);
    assert!(tank.puts().is_empty());
    assert!(!tank.engine.has_unflushed_writes());
    Ok(())
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn saved_layout_is_restored_with_fresh_metadata() -> Result<(), Box<dyn std::error::Error>> {
    let mut tank = TestTank::new();
    tank.owns(vec![creature("octopus"), decoration("coral_arch")]);
    tank.saved(LayoutSnapshot::from_records(&[
        placed("octopus", 120.0, 80.0, 1.5, Container::Tank),
        placed("sunken_ship", 600.0, 500.0, 2.0, Container::Tank),
    ]));

    let outcome = tank.load();
    assert_eq!(outcome, LoadOutcome::Loaded { user_id: tank.user, items: 3, in_tank: 2 });

    let octopus = tank.engine.record(&ItemId::from("octopus")).expect("octopus");
    assert_eq!((octopus.x, octopus.y, octopus.scale), (120.0, 80.0, 1.5));
    assert_eq!(octopus.display_name.as_deref(), Some("Octopus"));

    // The sunken ship left the catalog but stays where the user put it.
    let ship = tank.engine.record(&ItemId::from("sunken_ship")).expect("orphan kept");
    assert_eq!(ship.display_name.as_deref(), Some("stale name"));
    assert!(ship.in_tank());

    let arch = tank.engine.record(&ItemId::from("coral_arch")).expect("new item");
    assert_eq!(arch.container, Container::Warehouse);

    // Tank creatures start patrolling at their saved spot.
    let swim = tank.engine.swim_state(&ItemId::from("octopus")).expect("swimming");
    assert_eq!((swim.pos.x, swim.pos.y), (120.0, 80.0));
    Ok(())
}

#[test]
fn no_identity_means_no_reads_and_no_tank() -> Result<(), Box<dyn std::error::Error>> {
    let mut tank = TestTank::new();
    tank.owns(vec![creature("octopus")]);

    for identity in [StaticIdentity::signed_out(), StaticIdentity::expired(tank.user)] {
        assert_eq!(tank.engine.load(&identity), LoadOutcome::NoIdentity);
        assert!(!tank.engine.is_loaded());
        assert!(tank.engine.records().is_empty());
        assert!(tank.engine.tank_items().is_empty());
    }

    let octopus = ItemId::from("octopus");
    assert!(matches!(tank.engine.place_in_tank(&octopus, 1.0, 1.0), Err(EngineError::NotLoaded)));
    assert!(matches!(tank.engine.click(&octopus), Err(EngineError::NotLoaded)));
    assert!(matches!(tank.engine.refresh_inventory(), Err(EngineError::NotLoaded)));
    assert!(tank.puts().is_empty());
    Ok(())
}

#[test]
fn read_failures_fall_back_to_empty() -> Result<(), Box<dyn std::error::Error>> {
    let mut tank = TestTank::new();
    tank.owns(vec![creature("octopus")]);
    tank.saved(LayoutSnapshot::from_records(&[placed("octopus", 120.0, 80.0, 1.0, Container::Tank)]));
    tank.layouts.borrow_mut().fail_reads = true;

    // Layout unreadable: defaults from inventory.
    tank.load();
    let octopus = tank.engine.record(&ItemId::from("octopus")).expect("octopus");
    assert_eq!(octopus.container, Container::Warehouse);

    // Both unreadable: empty but loaded, never a crash.
    tank.inventory.borrow_mut().fail_reads = true;
    let outcome = tank.load();
    assert_eq!(outcome, LoadOutcome::Loaded { user_id: tank.user, items: 0, in_tank: 0 });
    assert!(tank.notifications().is_empty());
    Ok(())
}

#[test]
fn refresh_inventory_adds_purchases_only() -> Result<(), Box<dyn std::error::Error>> {
    let mut tank = TestTank::new();
    tank.owns(vec![creature("octopus")]);
    tank.load();
    tank.engine.place_in_tank(&ItemId::from("octopus"), 200.0, 200.0)?;

    {
        let mut inventory = tank.inventory.borrow_mut();
        inventory.grant(tank.user, decoration("treasure_chest"));
        inventory.revoke(tank.user, "octopus");
    }
    let added = tank.engine.refresh_inventory()?;
    assert_eq!(added, 1);

    // Revoked octopus keeps its tank spot; the chest lands in the warehouse.
    let octopus = tank.engine.record(&ItemId::from("octopus")).expect("kept");
    assert_eq!((octopus.x, octopus.y), (200.0, 200.0));
    assert!(octopus.in_tank());
    let chest = tank.engine.record(&ItemId::from("treasure_chest")).expect("added");
    assert_eq!(chest.container, Container::Warehouse);
    Ok(())
}

#[test]
fn reload_while_dirty_keeps_unsaved_changes() -> Result<(), Box<dyn std::error::Error>> {
    let mut tank = TestTank::new();
    tank.owns(vec![creature("octopus")]);
    tank.load();

    tank.layouts.borrow_mut().offline = true;
    tank.engine.place_in_tank(&ItemId::from("octopus"), 150.0, 150.0)?;
    tank.frames(1);
    assert!(tank.engine.has_unflushed_writes());

    // Reconciling against the stale store would put the octopus back in the
    // warehouse; the dirty flag prevents that.
    tank.load();
    let octopus = tank.engine.record(&ItemId::from("octopus")).expect("octopus");
    assert!(octopus.in_tank());
    assert_eq!((octopus.x, octopus.y), (150.0, 150.0));

    tank.layouts.borrow_mut().offline = false;
    tank.clock.advance(10_000);
    let report = tank.engine.flush_writes();
    assert_eq!(report.written, 1);
    assert!(tank.stored().expect("saved").tank_contains(&ItemId::from("octopus")));
    Ok(())
}

#[test]
fn switching_away_and_back_keeps_unsaved_changes() -> Result<(), Box<dyn std::error::Error>> {
    let mut tank = TestTank::new();
    tank.owns(vec![creature("octopus")]);
    tank.load();
    let octopus = ItemId::from("octopus");

    tank.layouts.borrow_mut().offline = true;
    tank.engine.place_in_tank(&octopus, 150.0, 150.0)?;
    tank.frames(1);

    let other = UserId::new();
    tank.inventory.borrow_mut().set(other, vec![decoration("sand_castle")]);
    tank.engine.load(&StaticIdentity::signed_in(other));
    assert!(tank.engine.record(&octopus).is_none());

    // Back to the first user: the store still has nothing for them, but the
    // queued placement does.
    tank.load();
    assert!(tank.engine.has_unflushed_writes());
    let record = tank.engine.record(&octopus).expect("octopus");
    assert!(record.in_tank());
    assert_eq!((record.x, record.y), (150.0, 150.0));
    assert!(tank.engine.swim_state(&octopus).is_some());
    Ok(())
}

#[test]
fn new_items_use_the_configured_default_spot() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = EngineConfig::default().with_seed(5);
    config.default_position = Point::new(111.0, 222.0);
    let mut tank = TestTank::with_config(config);
    tank.owns(vec![creature("octopus")]);
    tank.load();

    let octopus = tank.engine.record(&ItemId::from("octopus")).expect("octopus");
    assert_eq!(octopus.container, Container::Warehouse);
    assert_eq!((octopus.x, octopus.y), (111.0, 222.0));

    tank.inventory.borrow_mut().grant(tank.user, decoration("coral_arch"));
    tank.engine.refresh_inventory()?;
    let arch = tank.engine.record(&ItemId::from("coral_arch")).expect("arch");
    assert_eq!((arch.x, arch.y), (111.0, 222.0));
    Ok(())
}

#[test]
fn switching_users_loads_their_own_tank() -> Result<(), Box<dyn std::error::Error>> {
    let mut tank = TestTank::new();
    tank.owns(vec![creature("octopus")]);
    tank.load();
    tank.engine.place_in_tank(&ItemId::from("octopus"), 100.0, 100.0)?;

    let other = UserId::new();
    tank.inventory.borrow_mut().set(other, vec![decoration("sand_castle")]);
    let outcome = tank.engine.load(&StaticIdentity::signed_in(other));
    assert_eq!(outcome, LoadOutcome::Loaded { user_id: other, items: 1, in_tank: 0 });
    assert!(tank.engine.record(&ItemId::from("octopus")).is_none());

    // The first user's queued write still lands under their own key.
    tank.frames(1);
    let layouts = tank.layouts.borrow();
    assert!(layouts.stored(tank.user).expect("first user saved").tank_contains(&ItemId::from("octopus")));
    assert!(layouts.stored(other).is_none());
    Ok(())
}
