//! Toroidal arena wrap.

use arena_core::{Entity, System, TickContext, Transform, World};
use arena_shared::{Bounds, Vector2};

/// Wraps a position strictly past an edge to the opposite side.
///
/// The overshoot is preserved modulo the arena size, so a position several
/// widths out lands inside in one step. A position exactly on an edge is
/// untouched.
#[must_use]
pub fn wrap(mut position: Vector2, bounds: &Bounds) -> Vector2 {
    if position.x < bounds.x || position.x > bounds.max_x() {
        position.x = bounds.x + (position.x - bounds.x).rem_euclid(bounds.w);
    }
    if position.y < bounds.y || position.y > bounds.max_y() {
        position.y = bounds.y + (position.y - bounds.y).rem_euclid(bounds.h);
    }
    position
}

/// Keeps simulated entities inside the arena.
#[derive(Debug)]
pub struct BoundsSystem {
    bounds: Bounds,
}

impl BoundsSystem {
    /// Wraps at `bounds`.
    #[must_use]
    pub const fn new(bounds: Bounds) -> Self {
        Self { bounds }
    }
}

impl System for BoundsSystem {
    fn name(&self) -> &'static str {
        "bounds"
    }

    fn update(&mut self, world: &mut World, _ctx: &mut TickContext, entity: Entity) {
        if !entity.simulated() {
            return;
        }
        if let Some(t) = world.get_mut::<Transform>(entity.id) {
            t.position = wrap(t.position, &self.bounds);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARENA: Bounds = Bounds::new(0.0, 0.0, 1440.0, 1080.0);

    #[test]
    fn test_on_edge_is_untouched() {
        for p in [
            Vector2::new(0.0, 0.0),
            Vector2::new(1440.0, 1080.0),
            Vector2::new(1440.0, 500.0),
        ] {
            assert_eq!(wrap(p, &ARENA), p);
        }
    }

    #[test]
    fn test_past_edge_wraps_with_overshoot() {
        assert_eq!(wrap(Vector2::new(1442.0, 10.0), &ARENA), Vector2::new(2.0, 10.0));
        assert_eq!(wrap(Vector2::new(-3.0, 10.0), &ARENA), Vector2::new(1437.0, 10.0));
        assert_eq!(wrap(Vector2::new(10.0, 1081.0), &ARENA), Vector2::new(10.0, 1.0));
        assert_eq!(wrap(Vector2::new(10.0, -0.5), &ARENA), Vector2::new(10.0, 1079.5));
    }

    #[test]
    fn test_far_overshoot_wraps_in_one_step() {
        assert_eq!(wrap(Vector2::new(3.0 * 1440.0 + 7.0, 10.0), &ARENA), Vector2::new(7.0, 10.0));
        assert_eq!(wrap(Vector2::new(-2890.0, 10.0), &ARENA), Vector2::new(1430.0, 10.0));
        assert_eq!(wrap(Vector2::new(10.0, 2165.0), &ARENA), Vector2::new(10.0, 5.0));
    }

    #[test]
    fn test_offset_arena_wraps_relative_to_origin() {
        let arena = Bounds::new(100.0, -50.0, 200.0, 100.0);
        assert_eq!(wrap(Vector2::new(305.0, 0.0), &arena), Vector2::new(105.0, 0.0));
        assert_eq!(wrap(Vector2::new(150.0, -60.0), &arena), Vector2::new(150.0, 40.0));
    }
}
