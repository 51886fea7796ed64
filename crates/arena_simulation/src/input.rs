//! Player input → acceleration and facing.

use arena_core::{Entity, EntityId, PlayerInput, RigidBody, System, TickContext, TimedInput, Transform, World};
use arena_shared::Vector2;

/// Applies move intent and look rotation to a body.
///
/// Intent longer than 1 is clamped, so diagonal input is not faster.
pub fn apply_input(move_input: Vector2, look_rotation: f32, transform: &mut Transform, body: &mut RigidBody) {
    body.acceleration = move_input.clamp_length(1.0) * body.max_acceleration;
    transform.rotation = look_rotation;
}

/// Applies the entity's current [`PlayerInput`] in place.
pub fn handle_entity_input(world: &mut World, id: EntityId) {
    let Some((move_input, look)) = world
        .get::<PlayerInput>(id)
        .map(|input| (input.move_input, input.look_rotation))
    else {
        return;
    };
    let (Some(mut transform), Some(mut body)) = (
        world.get::<Transform>(id).copied(),
        world.get::<RigidBody>(id).copied(),
    ) else {
        return;
    };

    apply_input(move_input, look, &mut transform, &mut body);

    if let Some(t) = world.get_mut::<Transform>(id) {
        *t = transform;
    }
    if let Some(b) = world.get_mut::<RigidBody>(id) {
        *b = body;
    }
}

/// Loads a recorded sample into the entity's input, then applies it.
pub fn apply_sample(world: &mut World, id: EntityId, sample: &TimedInput) {
    if let Some(input) = world.get_mut::<PlayerInput>(id) {
        input.apply(sample);
    }
    handle_entity_input(world, id);
}

/// Turns player intent into acceleration every tick.
#[derive(Debug, Default)]
pub struct PlayerInputHandlerSystem;

impl System for PlayerInputHandlerSystem {
    fn name(&self) -> &'static str {
        "player_input"
    }

    fn update(&mut self, world: &mut World, _ctx: &mut TickContext, entity: Entity) {
        if entity.simulated() {
            handle_entity_input(world, entity.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_scales_by_max_acceleration() {
        let mut t = Transform::default();
        let mut b = RigidBody {
            max_acceleration: 1000.0,
            ..RigidBody::default()
        };

        apply_input(Vector2::new(0.5, 0.0), 1.25, &mut t, &mut b);
        assert_eq!(b.acceleration, Vector2::new(500.0, 0.0));
        assert_eq!(t.rotation, 1.25);
    }

    #[test]
    fn test_oversized_input_is_clamped() {
        let mut t = Transform::default();
        let mut b = RigidBody {
            max_acceleration: 100.0,
            ..RigidBody::default()
        };

        apply_input(Vector2::new(1.0, 1.0), 0.0, &mut t, &mut b);
        assert!((b.acceleration.length() - 100.0).abs() < 1e-3);
    }
}
