//! Precondition checks shared by the concrete commands.

use super::InventoryContext;
use super::result::ValidationError;
use crate::world::{Entity, EntityId, Equippable, Tinkerer};

pub(crate) fn require_actor<'c>(
    ctx: &'c InventoryContext<'_>,
) -> Result<&'c Entity, ValidationError> {
    ctx.actor_entity().ok_or(ValidationError::InvalidActor)
}

pub(crate) fn require_inventory(ctx: &InventoryContext<'_>) -> Result<(), ValidationError> {
    let actor = require_actor(ctx)?;
    if ctx.inventory().is_none() {
        return Err(ValidationError::MissingInventory {
            actor: actor.name.clone(),
        });
    }
    Ok(())
}

pub(crate) fn require_item<'c>(
    ctx: &'c InventoryContext<'_>,
    item: EntityId,
) -> Result<&'c Entity, ValidationError> {
    ctx.world().entity(item).ok_or(ValidationError::InvalidItem)
}

pub(crate) fn require_equippable<'c>(
    ctx: &'c InventoryContext<'_>,
    item: EntityId,
) -> Result<&'c Equippable, ValidationError> {
    let entity = require_item(ctx, item)?;
    entity
        .get::<Equippable>()
        .ok_or_else(|| ValidationError::MissingEquippable {
            item: entity.name.clone(),
        })
}

/// The item must sit in the actor's carried list.
pub(crate) fn require_carried(
    ctx: &InventoryContext<'_>,
    item: EntityId,
) -> Result<(), ValidationError> {
    if ctx.carries(item) {
        Ok(())
    } else {
        Err(ValidationError::ItemNotOwned {
            item: ctx.name(item),
        })
    }
}

/// The item must be carried or worn by the actor.
pub(crate) fn require_owned(
    ctx: &InventoryContext<'_>,
    item: EntityId,
) -> Result<(), ValidationError> {
    if ctx.carries(item) || ctx.wears(item) {
        Ok(())
    } else {
        Err(ValidationError::ItemNotOwned {
            item: ctx.name(item),
        })
    }
}

pub(crate) fn require_tinkerer<'c>(
    ctx: &'c InventoryContext<'_>,
) -> Result<&'c Tinkerer, ValidationError> {
    let actor = require_actor(ctx)?;
    actor
        .get::<Tinkerer>()
        .ok_or_else(|| ValidationError::MissingTinkering {
            actor: actor.name.clone(),
        })
}

pub(crate) fn require_recipe<'r>(recipe: &'r str) -> Result<&'r str, ValidationError> {
    let recipe = recipe.trim();
    if recipe.is_empty() {
        Err(ValidationError::blocked("No recipe was chosen."))
    } else {
        Ok(recipe)
    }
}
