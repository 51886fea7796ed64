//! # ECS World
//!
//! The central container for all entities and components of one session.

use std::collections::BTreeSet;

use arena_shared::{EntityType, InitialData};

use super::component::{
    Collider, Component, ComponentMask, ComponentType, FromInitial, Health, Inventory,
    LaserSpawner, Lifetime, LocalPlayer, PlayerInput, RigidBody, Timer, Transform, TransformSync,
    TriggerCollider,
};
use super::entity::{Entity, EntityId, SimulationAuthority};
use super::storage::ComponentStorage;
use crate::error::{EcsError, EcsResult};

/// One column per component type.
#[derive(Clone, Debug, Default)]
pub struct ComponentTables {
    // =========================================================================
    // Component Storages - Add new component types here
    // =========================================================================
    pub(crate) transforms: ComponentStorage<Transform>,
    pub(crate) rigid_bodies: ComponentStorage<RigidBody>,
    pub(crate) colliders: ComponentStorage<Collider>,
    pub(crate) triggers: ComponentStorage<TriggerCollider>,
    pub(crate) inputs: ComponentStorage<PlayerInput>,
    pub(crate) local_players: ComponentStorage<LocalPlayer>,
    pub(crate) transform_syncs: ComponentStorage<TransformSync>,
    pub(crate) healths: ComponentStorage<Health>,
    pub(crate) inventories: ComponentStorage<Inventory>,
    pub(crate) lifetimes: ComponentStorage<Lifetime>,
    pub(crate) timers: ComponentStorage<Timer>,
    pub(crate) laser_spawners: ComponentStorage<LaserSpawner>,
}

impl ComponentTables {
    fn init<C: Component>(&mut self, index: usize, initial: &InitialData) {
        C::column_mut(self).set(index, C::from_initial(initial));
    }

    fn init_from(&mut self, index: usize, kind: ComponentType, initial: &InitialData) {
        match kind {
            ComponentType::Transform => self.init::<Transform>(index, initial),
            ComponentType::RigidBody => self.init::<RigidBody>(index, initial),
            ComponentType::Collider => self.init::<Collider>(index, initial),
            ComponentType::TriggerCollider => self.init::<TriggerCollider>(index, initial),
            ComponentType::PlayerInput => self.init::<PlayerInput>(index, initial),
            ComponentType::LocalPlayer => self.init::<LocalPlayer>(index, initial),
            ComponentType::TransformSync => self.init::<TransformSync>(index, initial),
            ComponentType::Health => self.init::<Health>(index, initial),
            ComponentType::Inventory => self.init::<Inventory>(index, initial),
            ComponentType::Lifetime => self.init::<Lifetime>(index, initial),
            ComponentType::Timer => self.init::<Timer>(index, initial),
            ComponentType::LaserSpawner => self.init::<LaserSpawner>(index, initial),
        }
    }

    fn ensure<C: Component>(&mut self, index: usize) {
        let column = C::column_mut(self);
        if column.get(index).is_none() {
            column.set(index, C::default());
        }
    }

    /// Allocates a default slot for `kind` at `index` if the column is short.
    fn ensure_from(&mut self, index: usize, kind: ComponentType) {
        match kind {
            ComponentType::Transform => self.ensure::<Transform>(index),
            ComponentType::RigidBody => self.ensure::<RigidBody>(index),
            ComponentType::Collider => self.ensure::<Collider>(index),
            ComponentType::TriggerCollider => self.ensure::<TriggerCollider>(index),
            ComponentType::PlayerInput => self.ensure::<PlayerInput>(index),
            ComponentType::LocalPlayer => self.ensure::<LocalPlayer>(index),
            ComponentType::TransformSync => self.ensure::<TransformSync>(index),
            ComponentType::Health => self.ensure::<Health>(index),
            ComponentType::Inventory => self.ensure::<Inventory>(index),
            ComponentType::Lifetime => self.ensure::<Lifetime>(index),
            ComponentType::Timer => self.ensure::<Timer>(index),
            ComponentType::LaserSpawner => self.ensure::<LaserSpawner>(index),
        }
    }

    fn reset(&mut self, index: usize) {
        self.transforms.reset(index);
        self.rigid_bodies.reset(index);
        self.colliders.reset(index);
        self.triggers.reset(index);
        self.inputs.reset(index);
        self.local_players.reset(index);
        self.transform_syncs.reset(index);
        self.healths.reset(index);
        self.inventories.reset(index);
        self.lifetimes.reset(index);
        self.timers.reset(index);
        self.laser_spawners.reset(index);
    }
}

/// The ECS World - container for all game state of one session.
///
/// # Id Recycling
///
/// Destroyed ids go to a free list and the lowest one is handed out next.
/// Anything that may hold a stale id (late packets, buffered events) must
/// treat a missing entity as a no-op.
///
/// # Example
///
/// ```rust,ignore
/// let mut world = World::new(SimulationAuthority::Authoritative);
/// let rock = world.create_entity(EntityType::Asteroid, &initial, ASTEROID_COMPONENTS)?;
/// world.destroy_entity(rock)?;
/// ```
#[derive(Clone, Debug, Default)]
pub struct World {
    /// Entity slots, `None` when free.
    entities: Vec<Option<Entity>>,
    /// Free ids below `entities.len()`.
    free_ids: BTreeSet<u32>,
    /// Number of currently alive entities.
    alive_count: usize,
    /// Authority given to newly created entities.
    default_authority: SimulationAuthority,
    /// Component columns.
    components: ComponentTables,
}

impl World {
    /// Creates an empty world. New entities get `default_authority`.
    #[must_use]
    pub fn new(default_authority: SimulationAuthority) -> Self {
        Self {
            default_authority,
            ..Self::default()
        }
    }

    /// Returns the number of currently alive entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Number of slots, live or free. Every live id is below this.
    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.entities.len()
    }

    /// Authority assigned to new entities.
    #[inline]
    #[must_use]
    pub const fn default_authority(&self) -> SimulationAuthority {
        self.default_authority
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Creates an entity with the lowest free id.
    ///
    /// Every component in `components` is built from `initial`.
    ///
    /// # Errors
    ///
    /// [`EcsError::IdSpaceExhausted`] if no id is free and every `u32` slot
    /// is allocated.
    pub fn create_entity(
        &mut self,
        kind: EntityType,
        initial: &InitialData,
        components: ComponentMask,
    ) -> EcsResult<Entity> {
        let raw = match self.free_ids.pop_first() {
            Some(raw) => raw,
            None => {
                let raw = slot_id(self.entities.len())?;
                self.entities.push(None);
                raw
            }
        };
        Ok(self.install(EntityId(raw), kind, initial, components))
    }

    /// Creates an entity under an id chosen elsewhere (mirroring the server).
    ///
    /// # Errors
    ///
    /// [`EcsError::IdInUse`] if the slot is occupied.
    pub fn spawn_with_id(
        &mut self,
        id: EntityId,
        kind: EntityType,
        initial: &InitialData,
        components: ComponentMask,
    ) -> EcsResult<Entity> {
        if !self.is_entity_id_free(id) {
            return Err(EcsError::IdInUse(id));
        }

        let index = id.index();
        while self.entities.len() <= index {
            self.free_ids.insert(self.entities.len() as u32);
            self.entities.push(None);
        }
        self.free_ids.remove(&id.raw());

        Ok(self.install(id, kind, initial, components))
    }

    fn install(
        &mut self,
        id: EntityId,
        kind: EntityType,
        initial: &InitialData,
        components: ComponentMask,
    ) -> Entity {
        let entity = Entity {
            id,
            mask: components,
            kind,
            authority: self.default_authority,
        };

        let index = id.index();
        for component in components.iter() {
            self.components.init_from(index, component, initial);
        }
        self.entities[index] = Some(entity);
        self.alive_count += 1;

        entity
    }

    /// Destroys an entity.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityNotFound`] if the entity is already gone.
    pub fn destroy_entity(&mut self, entity: Entity) -> EcsResult<Entity> {
        self.destroy_entity_by_id(entity.id)
    }

    /// Destroys the entity in slot `id`, clearing its components and
    /// returning the id to the free list.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityNotFound`] if `id` is out of range or free.
    pub fn destroy_entity_by_id(&mut self, id: EntityId) -> EcsResult<Entity> {
        let entity = self
            .entities
            .get_mut(id.index())
            .and_then(Option::take)
            .ok_or(EcsError::EntityNotFound(id))?;

        self.components.reset(id.index());
        self.free_ids.insert(id.raw());
        self.alive_count -= 1;

        Ok(entity)
    }

    /// True if the slot is empty or was never allocated.
    #[inline]
    #[must_use]
    pub fn is_entity_id_free(&self, id: EntityId) -> bool {
        !matches!(self.entities.get(id.index()), Some(Some(_)))
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Gets a live entity by id.
    #[inline]
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<Entity> {
        self.entities.get(id.index()).copied().flatten()
    }

    /// Iterates over all live entities in id order.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter().filter_map(|e| *e)
    }

    /// Checks whether a live entity carries `component`.
    #[inline]
    #[must_use]
    pub fn has_component(&self, id: EntityId, component: ComponentType) -> bool {
        self.entity(id).is_some_and(|e| e.has(component))
    }

    /// Reads a component. `None` if the entity is gone or lacks it.
    #[inline]
    #[must_use]
    pub fn get<C: Component>(&self, id: EntityId) -> Option<&C> {
        if !self.has_component(id, C::TYPE) {
            return None;
        }
        C::column(&self.components).get(id.index())
    }

    /// Mutable access to a component. `None` if the entity is gone or lacks it.
    #[inline]
    pub fn get_mut<C: Component>(&mut self, id: EntityId) -> Option<&mut C> {
        if !self.has_component(id, C::TYPE) {
            return None;
        }
        C::column_mut(&mut self.components).get_mut(id.index())
    }

    // =========================================================================
    // MUTATION
    // =========================================================================

    /// Attaches `component`, overwriting any previous value.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityNotFound`] if the entity is gone.
    pub fn insert<C: Component>(&mut self, id: EntityId, component: C) -> EcsResult<()> {
        let slot = self.slot_mut(id)?;
        slot.mask = slot.mask.with(C::TYPE);
        C::column_mut(&mut self.components).set(id.index(), component);
        Ok(())
    }

    /// Sets the mask bit of `component`, exposing whatever the column holds.
    ///
    /// A component never written for this entity starts at its default, so
    /// `get` agrees with `has_component` afterwards.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityNotFound`] if the entity is gone.
    pub fn enable_component(&mut self, id: EntityId, component: ComponentType) -> EcsResult<()> {
        let slot = self.slot_mut(id)?;
        slot.mask = slot.mask.with(component);
        self.components.ensure_from(id.index(), component);
        Ok(())
    }

    /// Clears the mask bit of `component`. The data is kept.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityNotFound`] if the entity is gone.
    pub fn disable_component(&mut self, id: EntityId, component: ComponentType) -> EcsResult<()> {
        let slot = self.slot_mut(id)?;
        slot.mask = slot.mask.without(component);
        Ok(())
    }

    /// Changes who simulates an entity.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityNotFound`] if the entity is gone.
    pub fn set_authority(&mut self, id: EntityId, authority: SimulationAuthority) -> EcsResult<()> {
        self.slot_mut(id)?.authority = authority;
        Ok(())
    }

    fn slot_mut(&mut self, id: EntityId) -> EcsResult<&mut Entity> {
        self.entities
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(EcsError::EntityNotFound(id))
    }
}

/// Id of the slot appended at `len`.
fn slot_id(len: usize) -> EcsResult<u32> {
    u32::try_from(len).map_err(|_| EcsError::IdSpaceExhausted)
}
