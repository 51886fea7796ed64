//! # Physics Integration
//!
//! Semi-implicit Euler with optional exponential drag:
//!
//! ```text
//! v += a·dt
//! v -= v·min(k·dt, 1)      (drag only)
//! |v.x|, |v.y| < ε → 0
//! p += v·dt
//! ```

use arena_core::{Entity, EntityId, RigidBody, System, TickContext, Transform, World};

/// Fraction of velocity shed per second by drag.
pub const DRAG_COEFFICIENT: f32 = 1.5;

/// Velocity components below this snap to zero.
pub const VELOCITY_EPSILON: f32 = 0.04;

/// Advances one body by `dt` seconds.
pub fn integrate(transform: &mut Transform, body: &mut RigidBody, dt: f32) {
    if !dt.is_finite() || dt <= 0.0 {
        return;
    }

    body.velocity += body.acceleration * dt;

    if body.has_drag {
        let damping = (DRAG_COEFFICIENT * dt).min(1.0);
        body.velocity = body.velocity - body.velocity * damping;
    }

    if body.velocity.x.abs() < VELOCITY_EPSILON {
        body.velocity.x = 0.0;
    }
    if body.velocity.y.abs() < VELOCITY_EPSILON {
        body.velocity.y = 0.0;
    }

    transform.position += body.velocity * dt;
}

/// Integrates the entity `id` in place. No-op without Transform and RigidBody.
pub fn step_entity(world: &mut World, id: EntityId, dt: f32) {
    let (Some(mut transform), Some(mut body)) = (
        world.get::<Transform>(id).copied(),
        world.get::<RigidBody>(id).copied(),
    ) else {
        return;
    };

    integrate(&mut transform, &mut body, dt);

    if let Some(t) = world.get_mut::<Transform>(id) {
        *t = transform;
    }
    if let Some(b) = world.get_mut::<RigidBody>(id) {
        *b = body;
    }
}

/// Moves every simulated body.
#[derive(Debug, Default)]
pub struct PhysicsSystem;

impl System for PhysicsSystem {
    fn name(&self) -> &'static str {
        "physics"
    }

    fn update(&mut self, world: &mut World, ctx: &mut TickContext, entity: Entity) {
        if entity.simulated() {
            step_entity(world, entity.id, ctx.dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_shared::Vector2;

    fn body(velocity: Vector2, acceleration: Vector2, has_drag: bool) -> RigidBody {
        RigidBody {
            velocity,
            acceleration,
            has_drag,
            max_acceleration: 0.0,
        }
    }

    #[test]
    fn test_integration_without_drag() {
        let mut t = Transform::default();
        let mut b = body(Vector2::new(10.0, 0.0), Vector2::new(0.0, 20.0), false);

        integrate(&mut t, &mut b, 0.5);

        assert_eq!(b.velocity, Vector2::new(10.0, 10.0));
        assert_eq!(t.position, Vector2::new(5.0, 5.0));
    }

    #[test]
    fn test_drag_decays_towards_zero() {
        let mut t = Transform::default();
        let mut b = body(Vector2::new(100.0, -100.0), Vector2::ZERO, true);

        let mut previous = b.velocity.length();
        for _ in 0..60 {
            integrate(&mut t, &mut b, 1.0 / 60.0);
            let speed = b.velocity.length();
            assert!(speed < previous);
            assert!(b.velocity.is_finite());
            previous = speed;
        }
    }

    #[test]
    fn test_drag_never_reverses_velocity() {
        let mut t = Transform::default();
        let mut b = body(Vector2::new(50.0, 0.0), Vector2::ZERO, true);

        // A huge dt clamps the damping factor to 1
        integrate(&mut t, &mut b, 10.0);
        assert_eq!(b.velocity, Vector2::ZERO);
    }

    #[test]
    fn test_small_velocity_snaps_to_zero() {
        let mut t = Transform::default();
        let mut b = body(Vector2::new(0.03, 5.0), Vector2::ZERO, false);

        integrate(&mut t, &mut b, 0.1);
        assert_eq!(b.velocity.x, 0.0);
        assert_eq!(b.velocity.y, 5.0);
    }

    #[test]
    fn test_invalid_dt_is_ignored() {
        let mut t = Transform::default();
        let mut b = body(Vector2::new(1.0, 1.0), Vector2::ZERO, false);

        integrate(&mut t, &mut b, f32::NAN);
        integrate(&mut t, &mut b, -1.0);
        assert_eq!(t.position, Vector2::ZERO);
    }
}
