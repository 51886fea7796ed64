//! # Collision Geometry & Resolution
//!
//! Shapes are centred on the entity position. Circles use `size.x` as the
//! radius; rectangles use `size` as half extents.
//!
//! Resolution is asymmetric. The acting entity is pushed out of every
//! obstacle whose priority is not strictly lower than its own; static
//! obstacles count as infinitely heavy. A static acting entity never moves.
//!
//! All "inside" tests are strict, so touching shapes do not collide.

use arena_core::{Collider, Entity, EntityId, System, TickContext, Transform, World};
use arena_shared::{ColliderShape, Vector2};

/// Distances below this are treated as coincident centres.
pub const DISTANCE_EPSILON: f32 = 1e-4;

// =============================================================================
// PREDICATES
// =============================================================================

/// Strict circle-circle overlap.
#[must_use]
pub fn circles_overlap(a: Vector2, radius_a: f32, b: Vector2, radius_b: f32) -> bool {
    let reach = radius_a + radius_b;
    a.distance(b) < reach
}

/// Point of the rectangle closest to `point`.
#[must_use]
pub fn closest_point_on_rect(point: Vector2, center: Vector2, half: Vector2) -> Vector2 {
    Vector2::new(
        point.x.clamp(center.x - half.x, center.x + half.x),
        point.y.clamp(center.y - half.y, center.y + half.y),
    )
}

/// Strict circle-rectangle overlap.
#[must_use]
pub fn circle_rect_overlap(circle: Vector2, radius: f32, rect: Vector2, half: Vector2) -> bool {
    circle.distance(closest_point_on_rect(circle, rect, half)) < radius
}

/// Strict rectangle-rectangle overlap.
#[must_use]
pub fn rects_overlap(a: Vector2, half_a: Vector2, b: Vector2, half_b: Vector2) -> bool {
    (a.x - b.x).abs() < half_a.x + half_b.x && (a.y - b.y).abs() < half_a.y + half_b.y
}

/// Overlap test for any pair of shapes.
#[must_use]
pub fn shapes_overlap(
    shape_a: ColliderShape,
    pos_a: Vector2,
    size_a: Vector2,
    shape_b: ColliderShape,
    pos_b: Vector2,
    size_b: Vector2,
) -> bool {
    match (shape_a, shape_b) {
        (ColliderShape::Circle, ColliderShape::Circle) => {
            circles_overlap(pos_a, size_a.x, pos_b, size_b.x)
        }
        (ColliderShape::Circle, ColliderShape::Rectangle) => {
            circle_rect_overlap(pos_a, size_a.x, pos_b, size_b)
        }
        (ColliderShape::Rectangle, ColliderShape::Circle) => {
            circle_rect_overlap(pos_b, size_b.x, pos_a, size_a)
        }
        (ColliderShape::Rectangle, ColliderShape::Rectangle) => {
            rects_overlap(pos_a, size_a, pos_b, size_b)
        }
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Unit vector from `from` to `to`, or +X when they coincide.
fn direction_or_x(from: Vector2, to: Vector2) -> (Vector2, f32) {
    let delta = to - from;
    let distance = delta.length();
    if distance < DISTANCE_EPSILON {
        (Vector2::X, 0.0)
    } else {
        (delta * (1.0 / distance), distance)
    }
}

/// Moves circle `a` to the contact boundary of circle `b` along their axis.
#[must_use]
pub fn push_circle_from_circle(a: Vector2, radius_a: f32, b: Vector2, radius_b: f32) -> Vector2 {
    let (normal, _) = direction_or_x(b, a);
    b + normal * (radius_a + radius_b)
}

/// Moves a circle out of a rectangle along the contact normal.
#[must_use]
pub fn push_circle_from_rect(circle: Vector2, radius: f32, rect: Vector2, half: Vector2) -> Vector2 {
    let closest = closest_point_on_rect(circle, rect, half);
    let (normal, distance) = direction_or_x(closest, circle);

    if distance > 0.0 {
        return circle + normal * (radius - distance);
    }

    // Centre inside the rectangle: leave through the nearest face
    let to_left = circle.x - (rect.x - half.x);
    let to_right = (rect.x + half.x) - circle.x;
    let to_top = circle.y - (rect.y - half.y);
    let to_bottom = (rect.y + half.y) - circle.y;
    let nearest = to_left.min(to_right).min(to_top).min(to_bottom);

    if nearest == to_right {
        Vector2::new(rect.x + half.x + radius, circle.y)
    } else if nearest == to_left {
        Vector2::new(rect.x - half.x - radius, circle.y)
    } else if nearest == to_bottom {
        Vector2::new(circle.x, rect.y + half.y + radius)
    } else {
        Vector2::new(circle.x, rect.y - half.y - radius)
    }
}

/// Moves a rectangle away from a circle by the circle's push-out distance.
#[must_use]
pub fn push_rect_from_circle(rect: Vector2, half: Vector2, circle: Vector2, radius: f32) -> Vector2 {
    let pushed = push_circle_from_rect(circle, radius, rect, half);
    rect - (pushed - circle)
}

/// Resolves the acting entity `id` against every other solid collider.
///
/// Exposed for client-side replay, which re-runs collision for the local
/// player only.
pub fn resolve_collisions(world: &mut World, id: EntityId) {
    let (Some(collider), Some(transform)) = (
        world.get::<Collider>(id).copied(),
        world.get::<Transform>(id).copied(),
    ) else {
        return;
    };

    if collider.is_static {
        return;
    }

    let obstacles: Vec<(Collider, Vector2)> = world
        .iter()
        .filter(|other| other.id != id)
        .filter_map(|other| {
            let c = world.get::<Collider>(other.id)?;
            let t = world.get::<Transform>(other.id)?;
            Some((*c, t.position))
        })
        .collect();

    let mut position = transform.position;
    for (other, other_pos) in obstacles {
        if other.effective_priority() < collider.priority {
            continue;
        }

        position = match (collider.shape, other.shape) {
            (ColliderShape::Circle, ColliderShape::Circle)
                if circles_overlap(position, collider.radius(), other_pos, other.radius()) =>
            {
                push_circle_from_circle(position, collider.radius(), other_pos, other.radius())
            }
            (ColliderShape::Circle, ColliderShape::Rectangle)
                if circle_rect_overlap(position, collider.radius(), other_pos, other.size) =>
            {
                push_circle_from_rect(position, collider.radius(), other_pos, other.size)
            }
            (ColliderShape::Rectangle, ColliderShape::Circle)
                if circle_rect_overlap(other_pos, other.radius(), position, collider.size) =>
            {
                push_rect_from_circle(position, collider.size, other_pos, other.radius())
            }
            _ => position,
        };
    }

    if let Some(t) = world.get_mut::<Transform>(id) {
        t.position = position;
    }
}

/// Pushes simulated bodies out of each other.
#[derive(Debug, Default)]
pub struct CollisionSystem;

impl System for CollisionSystem {
    fn name(&self) -> &'static str {
        "collision"
    }

    fn update(&mut self, world: &mut World, _ctx: &mut TickContext, entity: Entity) {
        if entity.simulated() {
            resolve_collisions(world, entity.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::{ComponentMask, ComponentType};
    use arena_shared::{EntityType, InitialData};

    const SOLID: ComponentMask = ComponentMask::of(&[ComponentType::Transform, ComponentType::Collider]);

    fn circle(world: &mut World, x: f32, radius: f32, priority: f32, is_static: bool) -> EntityId {
        let initial = InitialData {
            position: Some(Vector2::new(x, 0.0)),
            size: Some(Vector2::new(radius, radius)),
            priority: Some(priority),
            is_static: Some(is_static),
            ..InitialData::default()
        };
        world.create_entity(EntityType::Asteroid, &initial, SOLID).unwrap().id
    }

    fn position(world: &World, id: EntityId) -> Vector2 {
        world.get::<Transform>(id).unwrap().position
    }

    #[test]
    fn test_touching_circles_do_not_collide() {
        let a = Vector2::ZERO;
        let b = Vector2::new(20.0, 0.0);
        assert!(!circles_overlap(a, 10.0, b, 10.0));
        assert!(circles_overlap(a, 10.0, b, 10.1));
    }

    #[test]
    fn test_priority_asymmetry() {
        let mut world = World::default();
        let a = circle(&mut world, 0.0, 10.0, 10.0, false);
        let b = circle(&mut world, 15.0, 10.0, 30.0, false);

        // Lower priority A yields to B
        resolve_collisions(&mut world, a);
        assert_eq!(position(&world, a), Vector2::new(-5.0, 0.0));
        assert_eq!(position(&world, b), Vector2::new(15.0, 0.0));

        // Reset overlap, then act as B: A is strictly lower, so B stays put
        world.get_mut::<Transform>(a).unwrap().position = Vector2::ZERO;
        resolve_collisions(&mut world, b);
        assert_eq!(position(&world, b), Vector2::new(15.0, 0.0));
        assert_eq!(position(&world, a), Vector2::ZERO);
    }

    #[test]
    fn test_static_actor_never_moves() {
        let mut world = World::default();
        let wall = circle(&mut world, 0.0, 10.0, 0.0, true);
        circle(&mut world, 5.0, 10.0, 100.0, false);

        resolve_collisions(&mut world, wall);
        assert_eq!(position(&world, wall), Vector2::ZERO);
    }

    #[test]
    fn test_static_obstacle_always_pushes() {
        let mut world = World::default();
        let ship = circle(&mut world, 5.0, 10.0, 1_000.0, false);
        circle(&mut world, 0.0, 10.0, 0.0, true);

        resolve_collisions(&mut world, ship);
        assert_eq!(position(&world, ship), Vector2::new(20.0, 0.0));
    }

    #[test]
    fn test_coincident_centres_resolve_along_x() {
        let pushed = push_circle_from_circle(Vector2::ZERO, 5.0, Vector2::ZERO, 5.0);
        assert_eq!(pushed, Vector2::new(10.0, 0.0));
        assert!(pushed.is_finite());
    }

    #[test]
    fn test_circle_pushed_out_of_rect() {
        let rect = Vector2::ZERO;
        let half = Vector2::new(10.0, 10.0);

        // Overlapping the right face by 2
        let pushed = push_circle_from_rect(Vector2::new(13.0, 0.0), 5.0, rect, half);
        assert!((pushed.x - 15.0).abs() < 1e-5);
        assert!(!circle_rect_overlap(pushed, 5.0, rect, half));

        // Centre inside, nearest face is the top
        let pushed = push_circle_from_rect(Vector2::new(0.0, -9.0), 5.0, rect, half);
        assert_eq!(pushed, Vector2::new(0.0, -15.0));
    }

    #[test]
    fn test_rect_moves_away_from_circle() {
        let rect = Vector2::ZERO;
        let half = Vector2::new(10.0, 10.0);
        let moved = push_rect_from_circle(rect, half, Vector2::new(13.0, 0.0), 5.0);
        assert!((moved.x + 2.0).abs() < 1e-5);
        assert!(!circle_rect_overlap(Vector2::new(13.0, 0.0), 5.0, moved, half));
    }

    #[test]
    fn test_shapes_overlap_rectangles() {
        let half = Vector2::new(5.0, 5.0);
        assert!(rects_overlap(Vector2::ZERO, half, Vector2::new(9.0, 0.0), half));
        assert!(!rects_overlap(Vector2::ZERO, half, Vector2::new(10.0, 0.0), half));
        assert!(shapes_overlap(
            ColliderShape::Rectangle,
            Vector2::ZERO,
            half,
            ColliderShape::Circle,
            Vector2::new(7.0, 0.0),
            Vector2::new(3.0, 3.0),
        ));
    }
}
