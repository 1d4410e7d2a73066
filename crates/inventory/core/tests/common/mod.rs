#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Mutex;

use inventory_core::{
    Body, BodyPartId, EntityBuilder, EntityId, Equippable, Inventory, Physics, RulesConfig,
    Stacker, Stat, TinkerRefusal, TinkeringService, Tinkerer, World,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A humanoid adventurer with Strength 10, Agility 10 and an empty pack.
pub struct Adventurer {
    pub world: World,
    pub actor: EntityId,
}

impl Adventurer {
    pub fn new() -> Self {
        init_tracing();
        let mut world = World::new(RulesConfig::new());
        let actor = world
            .spawn(
                EntityBuilder::new("adventurer")
                    .stat("Strength", Stat::attribute(10))
                    .stat("Agility", Stat::attribute(10))
                    .with(Body::humanoid())
                    .with(Inventory::new())
                    .with(Tinkerer::new().with_recipe("lantern").with_recipe("sharpen")),
            )
            .unwrap();
        Self { world, actor }
    }

    /// An actor without anatomy; gear goes into named legacy slots.
    pub fn golem() -> Self {
        init_tracing();
        let mut world = World::new(RulesConfig::new());
        let actor = world
            .spawn(
                EntityBuilder::new("golem")
                    .stat("Strength", Stat::attribute(10))
                    .with(Inventory::new()),
            )
            .unwrap();
        Self { world, actor }
    }

    /// Spawns an equippable item and puts it in the pack.
    pub fn give(&mut self, name: &str, equippable: Equippable) -> EntityId {
        let item = self
            .world
            .spawn(EntityBuilder::new(name).with(equippable).with(Physics::new(2)))
            .unwrap();
        self.world.add_object(self.actor, item).unwrap();
        item
    }

    /// Spawns a stack of `count` equippable items and puts it in the pack.
    pub fn give_stack(&mut self, name: &str, equippable: Equippable, count: u32) -> EntityId {
        let item = self
            .world
            .spawn(
                EntityBuilder::new(name)
                    .with(equippable)
                    .with(Stacker::new(count))
                    .with(Physics::new(1)),
            )
            .unwrap();
        self.world.add_object(self.actor, item).unwrap();
        item
    }

    pub fn hand(&self, index: usize) -> BodyPartId {
        self.body()
            .equippable_slots("Hand")
            .nth(index)
            .unwrap()
            .id
    }

    pub fn body(&self) -> &Body {
        self.world.get::<Body>(self.actor).unwrap()
    }

    pub fn pack(&self) -> &[EntityId] {
        &self.world.get::<Inventory>(self.actor).unwrap().items
    }

    pub fn legacy_slot(&self, slot: &str) -> Option<EntityId> {
        self.world.get::<Inventory>(self.actor).unwrap().equipped(slot)
    }

    pub fn stat(&self, name: &str) -> i32 {
        self.world
            .entity(self.actor)
            .unwrap()
            .stat(name)
            .unwrap()
            .value()
    }

    pub fn worn_on(&self, item: EntityId) -> Vec<BodyPartId> {
        self.body().parts_occupied_by(item).map(|part| part.id).collect()
    }
}

/// Tinkering service double that records calls and refuses on request.
#[derive(Default)]
pub struct Workshop {
    pub craft_yield: usize,
    pub refuse_disassembly: BTreeSet<EntityId>,
    pub calls: Mutex<Vec<String>>,
}

impl Workshop {
    pub fn yielding(craft_yield: usize) -> Self {
        Self {
            craft_yield,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl TinkeringService for Workshop {
    fn can_disassemble(
        &self,
        _world: &World,
        _actor: EntityId,
        item: EntityId,
    ) -> Result<(), TinkerRefusal> {
        if self.refuse_disassembly.contains(&item) {
            Err(TinkerRefusal::new("That can't be taken apart."))
        } else {
            Ok(())
        }
    }

    fn try_disassemble(
        &self,
        world: &mut World,
        actor: EntityId,
        item: EntityId,
    ) -> Result<(), TinkerRefusal> {
        self.record(format!("disassemble {item}"));
        world
            .remove_object(actor, item)
            .map_err(|error| TinkerRefusal::new(error.to_string()))?;
        world.despawn(item);
        Ok(())
    }

    fn can_apply_modification_target(
        &self,
        world: &World,
        recipe: &str,
        item: EntityId,
    ) -> Result<(), TinkerRefusal> {
        match world.get::<Equippable>(item) {
            Some(_) => Ok(()),
            None => Err(TinkerRefusal::new(format!("{recipe} only works on gear."))),
        }
    }

    fn try_apply_modification(
        &self,
        world: &mut World,
        _actor: EntityId,
        recipe: &str,
        item: EntityId,
    ) -> Result<(), TinkerRefusal> {
        self.record(format!("modify {item} with {recipe}"));
        if let Some(entity) = world.entity_mut(item) {
            entity.tags.insert(recipe.to_string());
        }
        Ok(())
    }

    fn try_craft(
        &self,
        world: &mut World,
        actor: EntityId,
        recipe: &str,
    ) -> Result<Vec<EntityId>, TinkerRefusal> {
        self.record(format!("craft {recipe}"));
        let mut produced = Vec::with_capacity(self.craft_yield);
        for _ in 0..self.craft_yield {
            let item = world
                .spawn(EntityBuilder::new(recipe).with(Physics::new(1)))
                .map_err(|error| TinkerRefusal::new(error.to_string()))?;
            world
                .add_object(actor, item)
                .map_err(|error| TinkerRefusal::new(error.to_string()))?;
            produced.push(item);
        }
        Ok(produced)
    }
}
