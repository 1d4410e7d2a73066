use super::unequip::detach_equipped;
use super::{applicable_bonus, fire_notice, fire_vetoable, report};
use crate::command::result::{CommandError, CommandOutcome, CommandResult, ValidationError};
use crate::command::snapshot::EquippedStateSnapshot;
use crate::command::transaction::{InventoryOp, InventoryTransaction};
use crate::command::validation::{
    require_actor, require_carried, require_equippable, require_inventory,
};
use crate::command::{InventoryCommand, InventoryContext};
use crate::equip::EquipPlan;
use crate::world::{Body, BodyPartId, EntityId, Equippable, EventKind, Inventory, StatDelta};

/// Puts a carried item on, following a fresh or pre-built equip plan.
///
/// Actors without anatomy use the item's first slot token as a legacy slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EquipCommand {
    pub item: EntityId,
    pub target_part: Option<BodyPartId>,
    pub allow_displacement: bool,
    pub plan: Option<EquipPlan>,
    pub quiet: bool,
}

impl EquipCommand {
    pub fn new(item: EntityId) -> Self {
        Self {
            item,
            target_part: None,
            allow_displacement: true,
            plan: None,
            quiet: false,
        }
    }

    pub fn on_part(mut self, part: BodyPartId) -> Self {
        self.target_part = Some(part);
        self
    }

    pub fn with_plan(mut self, plan: EquipPlan) -> Self {
        self.plan = Some(plan);
        self
    }

    pub fn allow_displacement(mut self, allow: bool) -> Self {
        self.allow_displacement = allow;
        self
    }

    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    fn run(&self, ctx: &mut InventoryContext<'_>, tx: &mut InventoryTransaction) -> CommandResult {
        let actor = ctx.actor;
        let item = self.item;
        let name = ctx.name(item);

        fire_vetoable(ctx.world, EventKind::BeginEquip, actor, item, || {
            format!("You can't equip {name} right now.")
        })?;

        let carried_index = ctx
            .inventory()
            .and_then(|inventory| inventory.index_of(item));
        let location = if ctx.body().is_some() {
            self.place_on_body(ctx, tx, &name)?
        } else {
            self.place_in_legacy_slot(ctx, tx, &name)?
        };
        tx.record_undo(InventoryOp::ClearEquipment {
            actor,
            item,
            carried_index,
        });

        let bonus = applicable_bonus(ctx.world, actor, item)?;
        if !bonus.is_empty() {
            let removal = bonus.iter().map(StatDelta::negated).collect();
            tx.apply(
                ctx.world,
                InventoryOp::AdjustStatBonuses {
                    actor,
                    deltas: bonus,
                },
                InventoryOp::AdjustStatBonuses {
                    actor,
                    deltas: removal,
                },
            )?;
        }

        fire_notice(ctx.world, EventKind::Equipped, actor, item);
        Ok(CommandOutcome::message(format!(
            "You equip {name} on your {location}."
        )))
    }

    /// Returns the names of the parts the item now occupies.
    fn place_on_body(
        &self,
        ctx: &mut InventoryContext<'_>,
        tx: &mut InventoryTransaction,
        name: &str,
    ) -> Result<String, CommandError> {
        let actor = ctx.actor;
        let plan = match &self.plan {
            Some(plan) => plan.clone(),
            None => ctx
                .planner()
                .build(ctx.world, actor, self.item, self.target_part),
        };
        if !plan.is_valid() {
            return Err(CommandError::ExecutionFailed(plan.failure_reason()));
        }

        let displaced = plan.displaced_items();
        if !displaced.is_empty() {
            if !self.allow_displacement {
                let names: Vec<String> = displaced.iter().map(|id| ctx.name(*id)).collect();
                return Err(CommandError::execution(format!(
                    "You'd have to take off {} first.",
                    names.join(" and ")
                )));
            }
            for other in displaced {
                let snapshot = EquippedStateSnapshot::capture(ctx.world, actor, other);
                detach_equipped(ctx, tx, &snapshot)?;
                fire_notice(ctx.world, EventKind::Unequipped, actor, other);
            }
        }

        ctx.world
            .equip_to_body_parts(actor, self.item, plan.claimed_parts())
            .map_err(|error| CommandError::execution(format!("You can't equip {name}: {error}")))?;

        let body = ctx.world.get::<Body>(actor);
        let parts: Vec<&str> = plan
            .claimed_parts()
            .iter()
            .filter_map(|id| body.and_then(|body| body.part(*id)))
            .map(|part| part.name.as_str())
            .collect();
        Ok(parts.join(" and "))
    }

    /// Returns the legacy slot name the item now occupies.
    fn place_in_legacy_slot(
        &self,
        ctx: &mut InventoryContext<'_>,
        tx: &mut InventoryTransaction,
        name: &str,
    ) -> Result<String, CommandError> {
        let actor = ctx.actor;
        let slot = ctx
            .world
            .get::<Equippable>(self.item)
            .and_then(Equippable::legacy_slot)
            .ok_or_else(|| CommandError::execution(format!("{name} has nowhere to go.")))?;

        let occupant = ctx
            .world
            .get::<Inventory>(actor)
            .and_then(|inventory| inventory.equipped(&slot));
        if let Some(occupant) = occupant
            && occupant != self.item
        {
            if !self.allow_displacement {
                return Err(CommandError::execution(format!(
                    "You'd have to take off {} first.",
                    ctx.name(occupant)
                )));
            }
            let snapshot = EquippedStateSnapshot::capture(ctx.world, actor, occupant);
            detach_equipped(ctx, tx, &snapshot)?;
            fire_notice(ctx.world, EventKind::Unequipped, actor, occupant);
        }

        ctx.world
            .equip_legacy(actor, self.item, &slot)
            .map_err(|error| CommandError::execution(format!("You can't equip {name}: {error}")))?;
        Ok(slot)
    }
}

impl InventoryCommand for EquipCommand {
    fn name(&self) -> &'static str {
        "equip"
    }

    fn validate(&self, ctx: &InventoryContext<'_>) -> Result<(), ValidationError> {
        require_actor(ctx)?;
        require_inventory(ctx)?;
        require_equippable(ctx, self.item)?;
        let name = ctx.name(self.item);
        if ctx.wears(self.item) {
            return Err(ValidationError::blocked(format!("{name} is already equipped.")));
        }
        require_carried(ctx, self.item)?;
        if ctx.world().stack_count(self.item) > 1 {
            return Err(ValidationError::blocked(format!(
                "You can only equip one {name} at a time."
            )));
        }
        if let Some(plan) = &self.plan
            && (plan.actor() != ctx.actor || plan.item() != self.item)
        {
            return Err(ValidationError::Unknown(
                "equip plan was built for a different actor or item".into(),
            ));
        }
        Ok(())
    }

    fn execute(
        &self,
        ctx: &mut InventoryContext<'_>,
        tx: &mut InventoryTransaction,
    ) -> CommandResult {
        let result = self.run(ctx, tx);
        report(self.name(), self.quiet, &result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::kinds::testing::Scene;
    use crate::command::result::{CommandErrorCode, ValidationErrorCode};
    use crate::config::RulesConfig;
    use crate::world::{EntityBuilder, Stacker, World};

    #[test]
    fn equip_places_item_and_applies_bonus() {
        let mut scene = Scene::new();
        let axe = scene.carried("axe", Equippable::new("Hand").with_bonus("Strength:2"));

        let mut tx = InventoryTransaction::new();
        let mut ctx = scene.ctx();
        let outcome = EquipCommand::new(axe).execute(&mut ctx, &mut tx).unwrap();

        assert_eq!(outcome.message, "You equip axe on your Left Hand.");
        assert!(scene.is_worn(axe));
        assert_eq!(scene.strength(), 12);
        assert!(scene.world.get::<Inventory>(scene.hero).unwrap().items.is_empty());
    }

    #[test]
    fn displacement_is_refused_without_touching_the_world() {
        let mut scene = Scene::new();
        let shield = scene.carried("shield", Equippable::new("Hand"));
        let glaive = scene.carried("glaive", Equippable::new("Hand,Hand"));
        let left = scene.hand(0);
        scene.wear(shield, &[left]);

        let mut tx = InventoryTransaction::new();
        let mut ctx = scene.ctx();
        let result = EquipCommand::new(glaive)
            .allow_displacement(false)
            .execute(&mut ctx, &mut tx);

        assert_eq!(
            result,
            Err(CommandError::execution("You'd have to take off shield first."))
        );
        assert!(tx.is_empty());
        assert!(scene.is_worn(shield));
        assert!(!scene.is_worn(glaive));
    }

    #[test]
    fn displaced_item_is_restored_on_rollback() {
        let mut scene = Scene::new();
        let shield = scene.carried("shield", Equippable::new("Hand").with_bonus("Agility:1"));
        let glaive = scene.carried("glaive", Equippable::new("Hand,Hand").with_bonus("Strength:4"));
        let left = scene.hand(0);
        scene.wear(shield, &[left]);

        let mut tx = InventoryTransaction::new();
        let mut ctx = scene.ctx();
        EquipCommand::new(glaive).execute(&mut ctx, &mut tx).unwrap();
        assert!(!scene.is_worn(shield));
        assert_eq!(scene.stat("Agility"), 10);
        assert_eq!(scene.strength(), 14);

        tx.rollback(&mut scene.world).unwrap();
        assert!(scene.is_worn(shield));
        assert!(!scene.is_worn(glaive));
        assert_eq!(scene.stat("Agility"), 11);
        assert_eq!(scene.strength(), 10);
        assert_eq!(
            scene.world.get::<Inventory>(scene.hero).unwrap().items,
            vec![glaive]
        );
    }

    #[test]
    fn equip_undo_returns_item_to_its_former_index() {
        let mut scene = Scene::new();
        let dagger = scene.carried("dagger", Equippable::new("Hand"));
        let lamp = scene.carried("lamp", Equippable::new("Hand"));

        let mut tx = InventoryTransaction::new();
        let mut ctx = scene.ctx();
        EquipCommand::new(dagger).execute(&mut ctx, &mut tx).unwrap();
        tx.rollback(&mut scene.world).unwrap();

        assert_eq!(
            scene.world.get::<Inventory>(scene.hero).unwrap().items,
            vec![dagger, lamp]
        );
    }

    #[test]
    fn validation_blocks_worn_and_stacked_items() {
        let mut scene = Scene::new();
        let hat = scene.carried("hat", Equippable::new("Head"));
        let head = scene.part("Head");
        scene.wear(hat, &[head]);
        let darts = scene.carried("darts", Equippable::new("Hand"));
        scene
            .world
            .entity_mut(darts)
            .unwrap()
            .capabilities
            .insert(Stacker::new(5));

        let ctx = scene.ctx();
        assert_eq!(
            EquipCommand::new(hat).validate(&ctx),
            Err(ValidationError::blocked("hat is already equipped."))
        );
        assert_eq!(
            EquipCommand::new(darts).validate(&ctx).unwrap_err().code(),
            ValidationErrorCode::BlockedByRule
        );
    }

    #[test]
    fn invalid_plan_fails_with_its_reason() {
        let mut scene = Scene::new();
        let boots = scene.carried("boots", Equippable::new("Feet"));
        let hand = scene.hand(1);

        let mut tx = InventoryTransaction::new();
        let mut ctx = scene.ctx();
        let result = EquipCommand::new(boots)
            .on_part(hand)
            .quiet()
            .execute(&mut ctx, &mut tx);

        assert_eq!(CommandErrorCode::of(&result), CommandErrorCode::ExecutionFailed);
        assert_eq!(
            result.unwrap_err().to_string(),
            "boots can't be equipped to your Right Hand"
        );
    }

    #[test]
    fn legacy_actor_uses_first_slot_token() {
        let mut world = World::new(RulesConfig::new());
        let golem = world
            .spawn(EntityBuilder::new("golem").with(Inventory::new()))
            .unwrap();
        let gauntlets = world
            .spawn(EntityBuilder::new("gauntlets").with(Equippable::new("Hand,Arm")))
            .unwrap();
        world.add_object(golem, gauntlets).unwrap();

        let mut tx = InventoryTransaction::new();
        let mut ctx = InventoryContext::new(&mut world, golem);
        EquipCommand::new(gauntlets).validate(&ctx).unwrap();
        EquipCommand::new(gauntlets).execute(&mut ctx, &mut tx).unwrap();

        let inventory = world.get::<Inventory>(golem).unwrap();
        assert_eq!(inventory.equipped("Hand"), Some(gauntlets));
        assert!(inventory.items.is_empty());
    }
}
