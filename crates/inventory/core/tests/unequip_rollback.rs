mod common;

use common::Adventurer;
use inventory_core::{
    EquipCommand, EquippedStateSnapshot, Equippable, InventoryCommand, InventoryContext,
    InventoryPipeline, InventoryTransaction, RestoreError, TransactionState, UnequipCommand,
    ValidationErrorCode,
};

#[test]
fn unequip_validation_blocks_items_that_were_never_worn() {
    let mut hero = Adventurer::new();
    let scarf = hero.give("scarf", Equippable::new("Face"));

    let ctx = InventoryContext::new(&mut hero.world, hero.actor);
    let err = UnequipCommand::new(scarf).validate(&ctx).unwrap_err();

    assert_eq!(err.code(), ValidationErrorCode::BlockedByRule);
}

#[test]
fn rollback_restores_the_captured_location_exactly() {
    let mut hero = Adventurer::new();
    let bardiche = hero.give(
        "bardiche",
        Equippable::new("Hand,Hand").with_bonus("Strength:3"),
    );
    let right = hero.hand(1);

    let mut ctx = InventoryContext::new(&mut hero.world, hero.actor);
    InventoryPipeline::new(&mut ctx)
        .execute_atomic(&EquipCommand::new(bardiche).on_part(right))
        .unwrap();
    let before = EquippedStateSnapshot::capture(&hero.world, hero.actor, bardiche);
    assert_eq!(before.parts[0], right);
    assert_eq!(hero.stat("Strength"), 13);

    let mut tx = InventoryTransaction::new();
    let mut ctx = InventoryContext::new(&mut hero.world, hero.actor);
    InventoryPipeline::new(&mut ctx)
        .execute(&UnequipCommand::new(bardiche), &mut tx)
        .unwrap();
    assert_eq!(hero.stat("Strength"), 10);
    assert_eq!(hero.pack(), &[bardiche]);

    tx.rollback(&mut hero.world).unwrap();
    assert_eq!(tx.state(), TransactionState::RolledBack);
    assert_eq!(
        EquippedStateSnapshot::capture(&hero.world, hero.actor, bardiche),
        before
    );
    assert_eq!(hero.stat("Strength"), 13);
    assert!(hero.pack().is_empty());
}

#[test]
fn rollback_refuses_to_evict_a_new_occupant() {
    let mut hero = Adventurer::new();
    let hood = hero.give("hood", Equippable::new("Head"));
    let helm = hero.give("helm", Equippable::new("Head"));

    let mut ctx = InventoryContext::new(&mut hero.world, hero.actor);
    InventoryPipeline::new(&mut ctx)
        .execute_atomic(&EquipCommand::new(hood))
        .unwrap();

    let mut tx = InventoryTransaction::new();
    let mut ctx = InventoryContext::new(&mut hero.world, hero.actor);
    InventoryPipeline::new(&mut ctx)
        .execute(&UnequipCommand::new(hood), &mut tx)
        .unwrap();

    let mut ctx = InventoryContext::new(&mut hero.world, hero.actor);
    InventoryPipeline::new(&mut ctx)
        .execute_atomic(&EquipCommand::new(helm))
        .unwrap();

    let err = tx.rollback(&mut hero.world).unwrap_err();
    assert_eq!(err.failures.len(), 1);
    assert_eq!(err.failures[0].op, "RestoreEquippedState");
    assert!(matches!(
        err.failures[0].error,
        RestoreError::SlotTaken { occupant, .. } if occupant == helm
    ));
    assert_eq!(hero.body().parts_occupied_by(helm).count(), 1);
    assert_eq!(hero.pack(), &[hood]);
}
