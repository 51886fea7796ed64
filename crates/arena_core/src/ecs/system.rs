//! # Systems & Scheduling
//!
//! A tick runs in three phases:
//!
//! ```text
//! pre_update   every system         (accumulate timers)
//! update       system-major, entity-minor, construction order
//! post_update  every system         (reset fired gates)
//! ```
//!
//! There is no double buffering. A mutation made while a system visits
//! entity 3 is visible when the same system visits entity 4, and an
//! entity destroyed earlier in a pass is skipped.

use arena_shared::Millis;
use tracing::trace;

use super::entity::{Entity, EntityId};
use super::world::World;

/// Per-tick values handed to every system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickContext {
    /// Seconds since the previous tick (wall clock, not a fixed step).
    pub dt: f32,
    /// Current time in milliseconds.
    pub now: Millis,
    end_game_requested: bool,
}

impl TickContext {
    /// Creates a context for one tick.
    #[must_use]
    pub const fn new(dt: f32, now: Millis) -> Self {
        Self {
            dt,
            now,
            end_game_requested: false,
        }
    }

    /// Asks the session to end after this tick.
    pub fn request_end_game(&mut self) {
        self.end_game_requested = true;
    }

    /// True if any system asked for the session to end.
    #[must_use]
    pub const fn end_game_requested(&self) -> bool {
        self.end_game_requested
    }
}

/// Outcome of one [`Ecs::update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickReport {
    /// Ticks executed so far, including this one.
    pub tick: u64,
    /// Live entities after the tick.
    pub alive: usize,
    /// A system asked for the session to end.
    pub end_game_requested: bool,
}

/// A per-entity transformation pass.
///
/// `Send` so a whole [`Ecs`] can move onto a runtime task.
pub trait System: Send {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Called once per tick before any `update`.
    fn pre_update(&mut self, _ctx: &TickContext) {}

    /// Called once per live entity.
    fn update(&mut self, world: &mut World, ctx: &mut TickContext, entity: Entity);

    /// Called once per tick after every `update`.
    fn post_update(&mut self, _ctx: &TickContext) {}
}

/// Fixed-rate gate for sync systems.
///
/// Accumulates dt in `pre_update`, is open for the whole pass once the
/// interval elapsed, and resets in `post_update`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SyncGate {
    interval: f32,
    accumulated: f32,
    open: bool,
}

impl SyncGate {
    /// Gate firing every `interval` seconds.
    #[must_use]
    pub const fn new(interval: f32) -> Self {
        Self {
            interval,
            accumulated: 0.0,
            open: false,
        }
    }

    /// Gate firing `hz` times per second.
    #[must_use]
    pub fn per_second(hz: f32) -> Self {
        Self::new(1.0 / hz)
    }

    /// Adds elapsed time.
    pub fn accumulate(&mut self, dt: f32) {
        self.accumulated += dt;
        self.open = self.accumulated >= self.interval;
    }

    /// True during a pass in which the gate fired.
    #[inline]
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Closes a fired gate and restarts accumulation.
    pub fn reset(&mut self) {
        if self.open {
            self.accumulated = 0.0;
            self.open = false;
        }
    }
}

/// A world plus its ordered systems.
pub struct Ecs {
    world: World,
    systems: Vec<Box<dyn System>>,
    tick: u64,
}

impl Ecs {
    /// Wraps `world` with no systems.
    #[must_use]
    pub fn new(world: World) -> Self {
        Self {
            world,
            systems: Vec::new(),
            tick: 0,
        }
    }

    /// Appends a system. Order of registration is order of execution.
    #[must_use]
    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.add_system(system);
        self
    }

    /// Appends a system.
    pub fn add_system(&mut self, system: impl System + 'static) {
        self.systems.push(Box::new(system));
    }

    /// Registered system names, in execution order.
    #[must_use]
    pub fn system_names(&self) -> Vec<&'static str> {
        self.systems.iter().map(|s| s.name()).collect()
    }

    /// The world.
    #[inline]
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// The world, mutably. Network handlers use this between ticks.
    #[inline]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Runs one tick.
    pub fn update(&mut self, dt: f32, now: Millis) -> TickReport {
        let mut ctx = TickContext::new(dt, now);

        for system in &mut self.systems {
            system.pre_update(&ctx);
        }

        for system in &mut self.systems {
            // Entities created during the pass are visited too
            let mut index = 0;
            while index < self.world.slot_count() {
                if let Some(entity) = self.world.entity(EntityId(index as u32)) {
                    system.update(&mut self.world, &mut ctx, entity);
                }
                index += 1;
            }
        }

        for system in &mut self.systems {
            system.post_update(&ctx);
        }

        self.tick += 1;
        let report = TickReport {
            tick: self.tick,
            alive: self.world.alive_count(),
            end_game_requested: ctx.end_game_requested(),
        };
        trace!(tick = report.tick, alive = report.alive, dt, "ecs tick");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::{ComponentMask, ComponentType, Health, Transform};
    use arena_shared::{EntityType, InitialData, Vector2};
    use std::sync::{Arc, Mutex};

    struct Mover;

    impl System for Mover {
        fn name(&self) -> &'static str {
            "mover"
        }

        fn update(&mut self, world: &mut World, ctx: &mut TickContext, entity: Entity) {
            if let Some(t) = world.get_mut::<Transform>(entity.id) {
                t.position.x += ctx.dt;
            }
        }
    }

    /// Destroys entity 1 when visiting entity 0 and records who it saw.
    struct Reaper {
        seen: Arc<Mutex<Vec<u32>>>,
    }

    impl System for Reaper {
        fn name(&self) -> &'static str {
            "reaper"
        }

        fn update(&mut self, world: &mut World, _ctx: &mut TickContext, entity: Entity) {
            self.seen.lock().unwrap().push(entity.id.raw());
            if entity.id == EntityId(0) {
                let _ = world.destroy_entity_by_id(EntityId(1));
            }
        }
    }

    struct Ender;

    impl System for Ender {
        fn name(&self) -> &'static str {
            "ender"
        }

        fn update(&mut self, world: &mut World, ctx: &mut TickContext, entity: Entity) {
            if world.get::<Health>(entity.id).is_some() {
                ctx.request_end_game();
            }
        }
    }

    fn world_with(count: usize) -> World {
        let mut world = World::default();
        for _ in 0..count {
            world.create_entity(
                EntityType::Asteroid,
                &InitialData::default(),
                ComponentMask::of(&[ComponentType::Transform]),
            )
            .unwrap();
        }
        world
    }

    #[test]
    fn test_systems_run_in_order() {
        let ecs = Ecs::new(World::default())
            .with_system(Mover)
            .with_system(Ender);
        assert_eq!(ecs.system_names(), vec!["mover", "ender"]);
    }

    #[test]
    fn test_update_visits_every_entity() {
        let mut ecs = Ecs::new(world_with(3)).with_system(Mover);
        let report = ecs.update(0.5, 0);

        assert_eq!(report.tick, 1);
        assert_eq!(report.alive, 3);
        for id in 0..3 {
            let t = ecs.world().get::<Transform>(EntityId(id)).unwrap();
            assert_eq!(t.position, Vector2::new(0.5, 0.0));
        }
    }

    #[test]
    fn test_destroyed_entity_skipped_within_pass() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut ecs = Ecs::new(world_with(3)).with_system(Reaper { seen: Arc::clone(&seen) });

        let report = ecs.update(0.0, 0);
        assert_eq!(*seen.lock().unwrap(), vec![0, 2]);
        assert_eq!(report.alive, 2);
    }

    #[test]
    fn test_end_game_request_reported() {
        let mut world = world_with(1);
        let mut ecs = Ecs::new(world.clone()).with_system(Ender);
        assert!(!ecs.update(0.1, 0).end_game_requested);

        world
            .insert(EntityId(0), Health { current: 1.0, max: 1.0 })
            .unwrap();
        let mut ecs = Ecs::new(world).with_system(Ender);
        assert!(ecs.update(0.1, 0).end_game_requested);
    }

    #[test]
    fn test_sync_gate() {
        let mut gate = SyncGate::new(0.5);

        gate.accumulate(0.3);
        assert!(!gate.is_open());
        gate.reset();

        gate.accumulate(0.3);
        assert!(gate.is_open());
        gate.reset();
        assert!(!gate.is_open());

        gate.accumulate(0.3);
        assert!(!gate.is_open());
    }
}
