//! Integration tests for the character service

#[macro_use]
mod common;

use realmstore::prelude::*;

async fn ready(service: &CharacterService, id: Uuid) {
    service.set_breakthrough_flags(id, true, true).await.unwrap();
}

async fn equipped_in_slot(db: &common::TestDb, character_id: Uuid, slot: i32) -> i64 {
    TableStore::<CharacterItem>::new(db.pool.clone())
        .count(
            Conditions::new()
                .eq(CharacterItemColumn::CharacterId, character_id)
                .eq(CharacterItemColumn::Slot, slot)
                .eq(CharacterItemColumn::Equipped, true),
        )
        .await
        .unwrap()
}

// ===== create / read =====

#[tokio::test]
async fn test_create_with_some_satellites() {
    let db = test_db!();
    let service = db.service();

    let mut new = NewCharacter::named("Lin Feng");
    new.affinities = Some(CharacterAffinities {
        fire: 8,
        water: 3,
        ..Default::default()
    });
    new.wallet = Some(CharacterWallet {
        gold: 250,
        ..Default::default()
    });

    let created = service.create_character(new).await.unwrap();
    let id = created.base_info.id;
    assert_eq!(created.base_info.name, "Lin Feng");
    assert_eq!(created.base_info.realm_level, 1);
    assert_eq!(created.affinities.as_ref().unwrap().character_id, id);
    assert_eq!(created.wallet.as_ref().unwrap().character_id, id);

    let info = service.get_complete_character_info(id).await.unwrap();
    assert_eq!(info.base_info, created.base_info);
    assert_eq!(info.affinities.unwrap().fire, 8);
    assert_eq!(info.wallet.unwrap().gold, 250);
    assert!(info.strength.is_none());
    assert!(info.body_types.is_none());
    assert!(info.skills.is_none());
    assert!(info.weapons.is_none());
    assert!(info.items.is_empty());

    let json = serde_json::to_value(service.get_complete_character_info(id).await.unwrap()).unwrap();
    let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    assert!(keys.contains(&"affinities"));
    assert!(keys.contains(&"wallet"));
    assert!(!keys.contains(&"strength"));
    assert!(!keys.contains(&"weapons"));

    db.teardown().await;
}

#[tokio::test]
async fn test_created_ids_are_unique() {
    let db = test_db!();
    let service = db.service();
    let a = service.create_character(NewCharacter::named("A")).await.unwrap();
    let b = service.create_character(NewCharacter::named("B")).await.unwrap();
    assert_ne!(a.base_info.id, b.base_info.id);
    db.teardown().await;
}

#[tokio::test]
async fn test_failed_satellite_insert_rolls_back_everything() {
    let db = test_db!();
    let service = db.service();
    sqlx::query("DROP TABLE \"character_strength\"")
        .execute(&db.pool)
        .await
        .unwrap();

    let mut new = NewCharacter::named("Doomed");
    new.affinities = Some(CharacterAffinities::default());
    new.strength = Some(CharacterStrength::default());

    let err = service.create_character(new).await.unwrap_err();
    assert_eq!(err.status_code(), 500);

    let bases = TableStore::<CharacterBaseInfo>::new(db.pool.clone());
    let affinities = TableStore::<CharacterAffinities>::new(db.pool.clone());
    assert_eq!(bases.count(Conditions::new()).await.unwrap(), 0);
    assert_eq!(affinities.count(Conditions::new()).await.unwrap(), 0);

    db.teardown().await;
}

#[tokio::test]
async fn test_missing_character_is_not_found() {
    let db = test_db!();
    let service = db.service();
    let id = Uuid::new_v4();

    for err in [
        service.get_complete_character_info(id).await.unwrap_err(),
        service.get_character_snapshot(id).await.unwrap_err(),
        service.delete_character(id).await.unwrap_err(),
        service.update_cultivation(id, 5).await.unwrap_err(),
        service.get_inventory(id).await.unwrap_err(),
    ] {
        assert!(matches!(err, ServiceError::NotFound { .. }), "{:?}", err);
        assert_eq!(err.status_code(), 404);
    }

    db.teardown().await;
}

#[tokio::test]
async fn test_snapshot_matches_complete_info() {
    let db = test_db!();
    let service = db.service();
    let mut new = NewCharacter::named("Mei");
    new.skills = Some(CharacterSkills {
        skill_slot_1: Some(4),
        ..Default::default()
    });
    let id = service.create_character(new).await.unwrap().base_info.id;
    db.seed_item(1, true, 10).await;
    service.add_item_to_character(id, 1, 2, 1).await.unwrap();

    let info = service.get_complete_character_info(id).await.unwrap();
    let snapshot = service.get_character_snapshot(id).await.unwrap();
    assert_eq!(info, snapshot);
    assert_eq!(snapshot.items.len(), 1);

    db.teardown().await;
}

#[tokio::test]
async fn test_list_characters_uses_configured_page_sizes() {
    let db = test_db!();
    let service = db.service();
    for i in 0..7 {
        service
            .create_character(NewCharacter::named(format!("C{}", i)))
            .await
            .unwrap();
    }

    // default page size is 2
    let first = service.list_characters(1, None).await.unwrap();
    assert_eq!(first.data.len(), 2);
    assert_eq!(first.page_size, 2);
    assert_eq!(first.total, 7);
    assert_eq!(first.total_pages, 4);

    // capped at 5
    let capped = service.list_characters(1, Some(50)).await.unwrap();
    assert_eq!(capped.data.len(), 5);
    assert_eq!(capped.page_size, 5);

    db.teardown().await;
}

// ===== delete / update =====

#[tokio::test]
async fn test_delete_character_cascades() {
    let db = test_db!();
    let service = db.service();
    db.seed_item(1, false, 1).await;

    let mut new = NewCharacter::named("Gone");
    new.affinities = Some(CharacterAffinities::default());
    new.strength = Some(CharacterStrength::default());
    new.body_types = Some(CharacterBodyTypes::default());
    new.skills = Some(CharacterSkills::default());
    new.weapons = Some(CharacterWeapons::default());
    new.wallet = Some(CharacterWallet::default());
    let id = service.create_character(new).await.unwrap().base_info.id;
    service.add_item_to_character(id, 1, 1, 1).await.unwrap();

    let survivor = service
        .create_character(NewCharacter {
            name: "Stays".to_string(),
            wallet: Some(CharacterWallet::default()),
            ..Default::default()
        })
        .await
        .unwrap();

    service.delete_character(id).await.unwrap();

    let registry = db.registry();
    assert_eq!(registry.store::<CharacterBaseInfo>().count(Conditions::new()).await.unwrap(), 1);
    assert_eq!(registry.store::<CharacterAffinities>().count(Conditions::new()).await.unwrap(), 0);
    assert_eq!(registry.store::<CharacterStrength>().count(Conditions::new()).await.unwrap(), 0);
    assert_eq!(registry.store::<CharacterBodyTypes>().count(Conditions::new()).await.unwrap(), 0);
    assert_eq!(registry.store::<CharacterSkills>().count(Conditions::new()).await.unwrap(), 0);
    assert_eq!(registry.store::<CharacterWeapons>().count(Conditions::new()).await.unwrap(), 0);
    assert_eq!(registry.store::<CharacterWallet>().count(Conditions::new()).await.unwrap(), 1);
    assert_eq!(registry.store::<CharacterItem>().count(Conditions::new()).await.unwrap(), 0);

    assert!(service.get_complete_character_info(survivor.base_info.id).await.is_ok());
    assert!(matches!(
        service.delete_character(id).await,
        Err(ServiceError::NotFound { .. })
    ));

    db.teardown().await;
}

#[tokio::test]
async fn test_update_cultivation() {
    let db = test_db!();
    let service = db.service();
    let id = service
        .create_character(NewCharacter::named("Lin"))
        .await
        .unwrap()
        .base_info
        .id;

    let updated = service.update_cultivation(id, 1_500).await.unwrap();
    assert_eq!(updated.cultivation, 1_500);
    assert_eq!(updated.name, "Lin");

    assert!(matches!(
        service.update_cultivation(id, -1).await,
        Err(ServiceError::Validation(_))
    ));

    db.teardown().await;
}

// ===== breakthrough =====

#[tokio::test]
async fn test_breakthrough_requires_every_flag() {
    let db = test_db!();
    db.seed_realms(3).await;
    let service = db.service();
    let id = service
        .create_character(NewCharacter::named("Lin"))
        .await
        .unwrap()
        .base_info
        .id;

    let err = service.breakthrough(id).await.unwrap_err();
    assert_eq!(err.status_code(), 422);

    service.set_breakthrough_flags(id, true, false).await.unwrap();
    assert!(matches!(
        service.breakthrough(id).await,
        Err(ServiceError::RuleViolation(_))
    ));

    ready(&service, id).await;
    sqlx::query("UPDATE \"character_base_info\" SET \"breakthrough_in_progress\" = TRUE WHERE \"id\" = $1")
        .bind(id)
        .execute(&db.pool)
        .await
        .unwrap();
    assert!(matches!(
        service.breakthrough(id).await,
        Err(ServiceError::RuleViolation(_))
    ));

    db.teardown().await;
}

#[tokio::test]
async fn test_breakthrough_requires_next_realm() {
    let db = test_db!();
    db.seed_realms(1).await;
    let service = db.service();
    let id = service
        .create_character(NewCharacter::named("Lin"))
        .await
        .unwrap()
        .base_info
        .id;
    ready(&service, id).await;

    assert!(matches!(
        service.breakthrough(id).await,
        Err(ServiceError::RuleViolation(_))
    ));
    let unchanged = service.get_complete_character_info(id).await.unwrap();
    assert_eq!(unchanged.base_info.realm_level, 1);

    db.teardown().await;
}

#[tokio::test]
async fn test_breakthrough_at_highest_level_is_rejected() {
    let db = test_db!();
    db.seed_realms(1).await;
    let service = db.service();
    let id = service
        .create_character(NewCharacter::named("Lin"))
        .await
        .unwrap()
        .base_info
        .id;
    ready(&service, id).await;
    TableStore::<CharacterBaseInfo>::new(db.pool.clone())
        .update(
            &id,
            UpdateSet::new().set(CharacterBaseInfoColumn::RealmLevel, i32::MAX),
        )
        .await
        .unwrap()
        .unwrap();

    let err = service.breakthrough(id).await.unwrap_err();
    assert!(matches!(err, ServiceError::RuleViolation(_)));
    assert_eq!(err.status_code(), 422);
    let unchanged = service.get_complete_character_info(id).await.unwrap();
    assert_eq!(unchanged.base_info.realm_level, i32::MAX);
    assert!(unchanged.base_info.breakthrough_enabled);

    db.teardown().await;
}

#[tokio::test]
async fn test_breakthrough_advances_and_rebases_strength() {
    let db = test_db!();
    db.seed_realms(3).await;
    let service = db.service();
    let id = service
        .create_character(NewCharacter::named("Lin"))
        .await
        .unwrap()
        .base_info
        .id;
    service.update_cultivation(id, 999).await.unwrap();
    ready(&service, id).await;

    // no strength row yet: it is created
    let outcome = service.breakthrough(id).await.unwrap();
    assert_eq!(outcome.base_info.realm_level, 2);
    assert_eq!(outcome.base_info.cultivation, 0);
    assert!(!outcome.base_info.breakthrough_enabled);
    assert!(!outcome.base_info.breakthrough_items_enabled);
    assert_eq!(outcome.strength.character_id, id);
    assert_eq!(outcome.strength.health, 200);
    assert_eq!(outcome.strength.attack, 20);

    // flags were cleared
    assert!(matches!(
        service.breakthrough(id).await,
        Err(ServiceError::RuleViolation(_))
    ));

    // existing strength row is updated in place
    ready(&service, id).await;
    let again = service.breakthrough(id).await.unwrap();
    assert_eq!(again.base_info.realm_level, 3);
    assert_eq!(again.strength.id, outcome.strength.id);
    assert_eq!(again.strength.health, 300);
    assert_eq!(again.strength.speed, 15);

    db.teardown().await;
}

#[tokio::test]
async fn test_concurrent_breakthroughs_succeed_once() {
    let db = test_db!();
    db.seed_realms(5).await;
    let service = db.service();
    let id = service
        .create_character(NewCharacter::named("Lin"))
        .await
        .unwrap()
        .base_info
        .id;
    ready(&service, id).await;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.breakthrough(id).await })
        })
        .collect();

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(err) => assert!(matches!(err, ServiceError::RuleViolation(_)), "{:?}", err),
        }
    }
    assert_eq!(succeeded, 1);

    let info = service.get_complete_character_info(id).await.unwrap();
    assert_eq!(info.base_info.realm_level, 2);

    db.teardown().await;
}

// ===== inventory =====

#[tokio::test]
async fn test_stackable_items_merge_until_full() {
    let db = test_db!();
    db.seed_item(7, true, 10).await;
    let service = db.service();
    let id = service
        .create_character(NewCharacter::named("Lin"))
        .await
        .unwrap()
        .base_info
        .id;

    let first = service.add_item_to_character(id, 7, 4, 1).await.unwrap();
    let merged = service.add_item_to_character(id, 7, 4, 1).await.unwrap();
    assert_eq!(merged.instance_id, first.instance_id);
    assert_eq!(merged.count, 8);
    assert_eq!(service.get_inventory(id).await.unwrap().len(), 1);

    let overflow = service.add_item_to_character(id, 7, 5, 1).await.unwrap();
    assert_ne!(overflow.instance_id, first.instance_id);
    assert_eq!(overflow.count, 5);

    let mut counts: Vec<i32> = service
        .get_inventory(id)
        .await
        .unwrap()
        .iter()
        .map(|item| item.count)
        .collect();
    counts.sort();
    assert_eq!(counts, vec![5, 8]);

    db.teardown().await;
}

#[tokio::test]
async fn test_stack_limits_are_enforced() {
    let db = test_db!();
    db.seed_item(1, true, 10).await;
    db.seed_item(2, false, 10).await;
    let service = db.service();
    let id = service
        .create_character(NewCharacter::named("Lin"))
        .await
        .unwrap()
        .base_info
        .id;

    assert!(matches!(
        service.add_item_to_character(id, 1, 11, 1).await,
        Err(ServiceError::Validation(_))
    ));
    assert!(matches!(
        service.add_item_to_character(id, 2, 2, 1).await,
        Err(ServiceError::Validation(_))
    ));

    // non-stackable items never merge
    let a = service.add_item_to_character(id, 2, 1, 1).await.unwrap();
    let b = service.add_item_to_character(id, 2, 1, 1).await.unwrap();
    assert_ne!(a.instance_id, b.instance_id);

    assert!(matches!(
        service.add_item_to_character(id, 99, 1, 1).await,
        Err(ServiceError::NotFound { .. })
    ));
    assert!(matches!(
        service.add_item_to_character(Uuid::new_v4(), 1, 1, 1).await,
        Err(ServiceError::NotFound { .. })
    ));

    db.teardown().await;
}

#[tokio::test]
async fn test_equip_moves_slot_ownership() {
    let db = test_db!();
    db.seed_item(3, false, 1).await;
    let service = db.service();
    let id = service
        .create_character(NewCharacter::named("Lin"))
        .await
        .unwrap()
        .base_info
        .id;
    let a = service.add_item_to_character(id, 3, 1, 1).await.unwrap();
    let b = service.add_item_to_character(id, 3, 1, 1).await.unwrap();

    let equipped_a = service.equip_item(id, a.instance_id, 1).await.unwrap();
    assert!(equipped_a.equipped);
    assert_eq!(equipped_a.slot, Some(1));

    let equipped_b = service.equip_item(id, b.instance_id, 1).await.unwrap();
    assert!(equipped_b.equipped);
    assert_eq!(equipped_b.slot, Some(1));

    let items = TableStore::<CharacterItem>::new(db.pool.clone());
    let a_now = items.find_by_id(&a.instance_id).await.unwrap().unwrap();
    assert!(!a_now.equipped);
    assert_eq!(a_now.slot, None);
    assert_eq!(equipped_in_slot(&db, id, 1).await, 1);

    // re-equipping the holder keeps a single equipped row
    service.equip_item(id, b.instance_id, 1).await.unwrap();
    assert_eq!(equipped_in_slot(&db, id, 1).await, 1);

    db.teardown().await;
}

#[tokio::test]
async fn test_concurrent_equips_leave_one_item_per_slot() {
    let db = test_db!();
    db.seed_item(3, false, 1).await;
    let service = db.service();
    let id = service
        .create_character(NewCharacter::named("Lin"))
        .await
        .unwrap()
        .base_info
        .id;

    let mut instances = Vec::new();
    for _ in 0..4 {
        instances.push(service.add_item_to_character(id, 3, 1, 1).await.unwrap().instance_id);
    }

    let handles: Vec<_> = instances
        .into_iter()
        .map(|instance_id| {
            let service = service.clone();
            tokio::spawn(async move { service.equip_item(id, instance_id, 2).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(equipped_in_slot(&db, id, 2).await, 1);
    db.teardown().await;
}

#[tokio::test]
async fn test_equip_requires_ownership() {
    let db = test_db!();
    db.seed_item(3, false, 1).await;
    let service = db.service();
    let owner = service.create_character(NewCharacter::named("A")).await.unwrap().base_info.id;
    let other = service.create_character(NewCharacter::named("B")).await.unwrap().base_info.id;
    let item = service.add_item_to_character(owner, 3, 1, 1).await.unwrap();

    assert!(matches!(
        service.equip_item(other, item.instance_id, 1).await,
        Err(ServiceError::NotFound { .. })
    ));
    assert!(matches!(
        service.equip_item(owner, Uuid::new_v4(), 1).await,
        Err(ServiceError::NotFound { .. })
    ));
    assert!(matches!(
        service.unequip_item(other, item.instance_id).await,
        Err(ServiceError::NotFound { .. })
    ));

    db.teardown().await;
}

#[tokio::test]
async fn test_unequip_item() {
    let db = test_db!();
    db.seed_item(3, false, 1).await;
    let service = db.service();
    let id = service.create_character(NewCharacter::named("Lin")).await.unwrap().base_info.id;
    let item = service.add_item_to_character(id, 3, 1, 1).await.unwrap();
    service.equip_item(id, item.instance_id, 4).await.unwrap();

    let unequipped = service.unequip_item(id, item.instance_id).await.unwrap();
    assert!(!unequipped.equipped);
    assert_eq!(unequipped.slot, None);
    assert_eq!(equipped_in_slot(&db, id, 4).await, 0);

    db.teardown().await;
}

#[tokio::test]
async fn test_remove_item_decrements_then_deletes() {
    let db = test_db!();
    db.seed_item(5, true, 20).await;
    let service = db.service();
    let id = service.create_character(NewCharacter::named("Lin")).await.unwrap().base_info.id;
    let stack = service.add_item_to_character(id, 5, 6, 1).await.unwrap();

    let remaining = service
        .remove_item_from_character(id, stack.instance_id, 4)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(remaining.count, 2);

    assert!(matches!(
        service.remove_item_from_character(id, stack.instance_id, 3).await,
        Err(ServiceError::Validation(_))
    ));

    let gone = service
        .remove_item_from_character(id, stack.instance_id, 2)
        .await
        .unwrap();
    assert!(gone.is_none());
    assert!(service.get_inventory(id).await.unwrap().is_empty());

    db.teardown().await;
}

// ===== statistics =====

#[tokio::test]
async fn test_statistics_counts_every_table() {
    let db = test_db!();
    db.seed_realms(4).await;
    db.seed_item(1, true, 10).await;
    db.seed_item(2, false, 1).await;
    let registry = db.registry();
    registry
        .reference_store::<Skill>()
        .create(Skill {
            id: 1,
            name: "Flame Palm".to_string(),
            power: 30,
        })
        .await
        .unwrap();
    registry
        .reference_store::<Weapon>()
        .create_many(vec![
            Weapon {
                id: 1,
                name: "Iron Sword".to_string(),
                attack: 12,
            },
            Weapon {
                id: 2,
                name: "Jade Spear".to_string(),
                attack: 18,
            },
            Weapon {
                id: 3,
                name: "Bone Bow".to_string(),
                attack: 9,
            },
        ])
        .await
        .unwrap();

    let service = CharacterService::new(registry, ServiceConfig::default());
    service.create_character(NewCharacter::named("A")).await.unwrap();
    service.create_character(NewCharacter::named("B")).await.unwrap();

    assert_eq!(
        service.get_statistics().await.unwrap(),
        Statistics {
            character_count: 2,
            realm_count: 4,
            skill_count: 1,
            weapon_count: 3,
            item_count: 2,
        }
    );

    db.teardown().await;
}
