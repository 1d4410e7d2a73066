mod common;

use common::Adventurer;
use inventory_core::world::EventParam;
use inventory_core::{
    Body, CommandError, EntityId, Equippable, EventKind, GameEvent, InventoryContext,
    InventoryPipeline, InventoryTransaction, PerformInventoryActionCommand, World,
};

/// Mutates the drinker's stats but never reports the action as consumed.
fn sour_potion(world: &mut World, _owner: EntityId, event: &mut GameEvent) -> bool {
    if event.kind == EventKind::InventoryAction
        && let Some(actor) = event.entity("actor")
        && let Some(drinker) = world.entity_mut(actor)
        && let Some(agility) = drinker.stats.get_mut("Agility")
    {
        agility.penalty += 4;
    }
    true
}

/// Straps the item onto the actor's head as a side effect of "wear".
fn strap_on(world: &mut World, owner: EntityId, event: &mut GameEvent) -> bool {
    if event.kind != EventKind::InventoryAction {
        return true;
    }
    let Some(actor) = event.entity("actor") else {
        return true;
    };
    let head = world.get::<Body>(actor).and_then(|body| {
        body.parts()
            .iter()
            .find(|part| part.slot_type == "Head")
            .map(|part| part.id)
    });
    if let Some(head) = head
        && world.equip_to_body_part(actor, owner, head).is_ok()
    {
        event.handled = true;
    }
    true
}

#[test]
fn unhandled_action_fails_and_rollback_restores_stats() {
    let mut hero = Adventurer::new();
    let potion = hero.give("potion", Equippable::new("Hand"));
    hero.world.register_handler(potion, sour_potion);

    let mut tx = InventoryTransaction::new();
    let mut ctx = InventoryContext::new(&mut hero.world, hero.actor);
    let result = InventoryPipeline::new(&mut ctx)
        .execute(&PerformInventoryActionCommand::new(potion, "drink"), &mut tx);

    assert_eq!(
        result,
        Err(CommandError::ExecutionFailed(
            "Nothing happens when you drink potion.".into()
        ))
    );
    assert_eq!(hero.stat("Agility"), 6);

    tx.rollback(&mut hero.world).unwrap();
    assert_eq!(hero.stat("Agility"), 10);
}

#[test]
fn vetoed_action_fails_with_the_handler_reason() {
    let mut hero = Adventurer::new();
    let tome = hero.give("tome", Equippable::new("Hand"));
    hero.world.register_handler(
        hero.actor,
        |_: &mut World, _: EntityId, event: &mut GameEvent| {
            if event.kind != EventKind::BeforeInventoryAction {
                return true;
            }
            event
                .params
                .insert("reason".into(), EventParam::Text("You can't read in the dark.".into()));
            false
        },
    );

    let mut ctx = InventoryContext::new(&mut hero.world, hero.actor);
    let result = InventoryPipeline::new(&mut ctx)
        .execute_atomic(&PerformInventoryActionCommand::new(tome, "read"));

    assert_eq!(
        result,
        Err(CommandError::ExecutionFailed(
            "You can't read in the dark.".into()
        ))
    );
    assert_eq!(hero.pack(), &[tome]);
    assert_eq!(hero.stat("Strength"), 10);
}

#[test]
fn action_snapshot_undoes_an_equip_side_effect() {
    let mut hero = Adventurer::new();
    let mask = hero.give("mask", Equippable::new("Head"));
    let rope = hero.give("rope", Equippable::new("Hand"));
    hero.world.register_handler(mask, strap_on);

    let mut tx = InventoryTransaction::new();
    let mut ctx = InventoryContext::new(&mut hero.world, hero.actor);
    let outcome = InventoryPipeline::new(&mut ctx)
        .execute(&PerformInventoryActionCommand::new(mask, "wear"), &mut tx)
        .unwrap();
    assert_eq!(outcome.message, "You wear mask.");
    assert_eq!(hero.pack(), &[rope]);

    tx.rollback(&mut hero.world).unwrap();
    assert_eq!(hero.pack(), &[mask, rope]);
    assert!(hero.worn_on(mask).is_empty());
}
