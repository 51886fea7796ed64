//! # Remote Entity Interpolation
//!
//! Remote entities are drawn slightly in the past so that two server
//! snapshots usually bracket the render time:
//!
//! ```text
//! server snapshots:   [s0]------[s1]------[s2]------[s3]
//!                                  ▲
//!                     render_time = now - network_delay
//!                     lerp(s1, s2, fraction)
//! ```
//!
//! A bracket whose endpoints are further apart than the teleport distance
//! is a wrap or correction, not motion, so the later snapshot is applied
//! as is. Without a bracket the transform is left untouched.

use arena_core::{
    Entity, LocalPlayer, SimulationAuthority, System, TickContext, TimedBuffer, Transform,
    TransformSnapshot, TransformSync, World,
};
use arena_shared::{lerp_angle, Millis};

/// Default buffering delay behind the newest server time.
pub const NETWORK_DELAY_MS: Millis = 200;

/// Bracket jumps longer than this are applied without blending.
pub const TELEPORT_DISTANCE: f32 = 100.0;

/// Result of sampling a snapshot buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interpolated {
    /// Transform at the render time.
    pub transform: Transform,
    /// Time of the older bracket snapshot; everything before it is consumed.
    pub consumed_before: Millis,
}

/// Samples `buffer` at `render_time`.
///
/// Returns `None` when no pair of snapshots brackets the render time.
#[must_use]
pub fn interpolate(
    buffer: &TimedBuffer<TransformSnapshot>,
    render_time: Millis,
    teleport_distance: f32,
) -> Option<Interpolated> {
    let (last, next) = buffer.bracket(render_time)?;

    let transform = if last.position.distance(next.position) > teleport_distance {
        next.transform()
    } else {
        let span = next.time - last.time;
        let fraction = if span == 0 {
            1.0
        } else {
            (render_time - last.time) as f32 / span as f32
        };
        Transform {
            position: last.position.lerp(next.position, fraction),
            rotation: lerp_angle(last.rotation, next.rotation, fraction),
        }
    };

    Some(Interpolated {
        transform,
        consumed_before: last.time,
    })
}

/// Moves interpolated entities along their buffered server snapshots.
#[derive(Debug)]
pub struct TransformSmoothingSystem {
    delay: Millis,
    teleport_distance: f32,
}

impl TransformSmoothingSystem {
    /// Renders `delay` milliseconds behind the current time.
    #[must_use]
    pub const fn new(delay: Millis) -> Self {
        Self {
            delay,
            teleport_distance: TELEPORT_DISTANCE,
        }
    }

    /// Overrides the teleport distance.
    #[must_use]
    pub const fn with_teleport_distance(mut self, distance: f32) -> Self {
        self.teleport_distance = distance;
        self
    }
}

impl Default for TransformSmoothingSystem {
    fn default() -> Self {
        Self::new(NETWORK_DELAY_MS)
    }
}

impl System for TransformSmoothingSystem {
    fn name(&self) -> &'static str {
        "transform_smoothing"
    }

    fn update(&mut self, world: &mut World, ctx: &mut TickContext, entity: Entity) {
        if entity.authority != SimulationAuthority::Interpolated {
            return;
        }
        if world.get::<LocalPlayer>(entity.id).is_some_and(|l| l.is_local) {
            return;
        }

        let render_time = ctx.now.saturating_sub(self.delay);
        let Some(sync) = world.get_mut::<TransformSync>(entity.id) else {
            return;
        };
        let Some(sample) = interpolate(&sync.transform_buffer, render_time, self.teleport_distance) else {
            return;
        };
        sync.transform_buffer.prune_before(sample.consumed_before);

        if let Some(t) = world.get_mut::<Transform>(entity.id) {
            *t = sample.transform;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::{ComponentMask, ComponentType, Ecs, EntityId};
    use arena_shared::{EntityType, InitialData, Vector2};

    fn snapshot(time: Millis, x: f32) -> TransformSnapshot {
        TransformSnapshot {
            time,
            position: Vector2::new(x, 0.0),
            rotation: 0.0,
        }
    }

    fn two_snapshots() -> TimedBuffer<TransformSnapshot> {
        let mut buffer = TimedBuffer::new(8);
        buffer.push(snapshot(0, 0.0));
        buffer.push(snapshot(100, 100.0));
        buffer
    }

    #[test]
    fn test_midpoint() {
        let sample = interpolate(&two_snapshots(), 50, 1_000.0).unwrap();
        assert_eq!(sample.transform.position, Vector2::new(50.0, 0.0));
        assert_eq!(sample.consumed_before, 0);
    }

    #[test]
    fn test_past_buffer_is_unchanged() {
        assert!(interpolate(&two_snapshots(), 150, 1_000.0).is_none());
    }

    #[test]
    fn test_teleport_applies_next() {
        let sample = interpolate(&two_snapshots(), 10, 50.0).unwrap();
        assert_eq!(sample.transform.position, Vector2::new(100.0, 0.0));
    }

    #[test]
    fn test_rotation_takes_short_arc() {
        let mut buffer = TimedBuffer::new(4);
        buffer.push(TransformSnapshot {
            time: 0,
            position: Vector2::ZERO,
            rotation: 3.0,
        });
        buffer.push(TransformSnapshot {
            time: 100,
            position: Vector2::ZERO,
            rotation: -3.0,
        });

        let sample = interpolate(&buffer, 50, TELEPORT_DISTANCE).unwrap();
        assert!(sample.transform.rotation.abs() > 3.0);
    }

    fn remote(world: &mut World) -> EntityId {
        let mask = ComponentMask::of(&[ComponentType::Transform, ComponentType::TransformSync]);
        world
            .create_entity(EntityType::Asteroid, &InitialData::default(), mask)
            .unwrap()
            .id
    }

    #[test]
    fn test_system_moves_interpolated_and_prunes() {
        let mut world = World::new(SimulationAuthority::Interpolated);
        let id = remote(&mut world);
        {
            let sync = world.get_mut::<TransformSync>(id).unwrap();
            sync.receive(snapshot(0, 0.0));
            sync.receive(snapshot(100, 10.0));
            sync.receive(snapshot(200, 20.0));
        }

        let mut ecs = Ecs::new(world).with_system(TransformSmoothingSystem::new(200));
        ecs.update(0.016, 350);

        let t = ecs.world().get::<Transform>(id).unwrap();
        assert_eq!(t.position, Vector2::new(15.0, 0.0));
        let sync = ecs.world().get::<TransformSync>(id).unwrap();
        assert_eq!(sync.transform_buffer.len(), 2);
    }

    #[test]
    fn test_system_ignores_authoritative_entities() {
        let mut world = World::new(SimulationAuthority::Authoritative);
        let id = remote(&mut world);
        {
            let sync = world.get_mut::<TransformSync>(id).unwrap();
            sync.receive(snapshot(0, 0.0));
            sync.receive(snapshot(100, 10.0));
        }

        let mut ecs = Ecs::new(world).with_system(TransformSmoothingSystem::default());
        ecs.update(0.016, 250);

        assert_eq!(ecs.world().get::<Transform>(id).unwrap().position, Vector2::ZERO);
    }
}
