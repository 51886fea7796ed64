//! # ECS Benchmark
//!
//! Entity churn and a full three-phase tick over a session-sized world.
//!
//! Run with: `cargo bench --package arena_core`

#![allow(missing_docs)]

use arena_core::{
    ComponentMask, ComponentType, Ecs, Entity, EntityId, RigidBody, SimulationAuthority, System,
    TickContext, Transform, World,
};
use arena_shared::{EntityType, InitialData, Vector2};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const BODY: ComponentMask = ComponentMask::of(&[
    ComponentType::Transform,
    ComponentType::RigidBody,
    ComponentType::Collider,
]);

struct Integrate;

impl System for Integrate {
    fn name(&self) -> &'static str {
        "integrate"
    }

    fn update(&mut self, world: &mut World, ctx: &mut TickContext, entity: Entity) {
        let Some(velocity) = world.get::<RigidBody>(entity.id).map(|b| b.velocity) else {
            return;
        };
        if let Some(transform) = world.get_mut::<Transform>(entity.id) {
            transform.position += velocity * ctx.dt;
        }
    }
}

fn populated_world(count: usize) -> World {
    let mut world = World::new(SimulationAuthority::Authoritative);
    let initial = InitialData {
        velocity: Some(Vector2::new(1.0, -1.0)),
        ..InitialData::default()
    };
    for _ in 0..count {
        world.create_entity(EntityType::Asteroid, &initial, BODY).unwrap();
    }
    world
}

fn bench_entity_churn(c: &mut Criterion) {
    c.bench_function("create_destroy_churn_1k", |b| {
        let mut world = populated_world(1_000);
        b.iter(|| {
            for raw in (0..1_000).step_by(3) {
                let _ = world.destroy_entity_by_id(EntityId(raw));
            }
            for _ in (0..1_000).step_by(3) {
                black_box(world.create_entity(EntityType::Projectile, &InitialData::default(), BODY).unwrap());
            }
        });
    });
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("ecs_tick");

    for count in [16, 256, 4_096] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut ecs = Ecs::new(populated_world(count)).with_system(Integrate);
            let mut now = 0;
            b.iter(|| {
                now += 16;
                black_box(ecs.update(1.0 / 60.0, now))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_entity_churn, bench_tick);
criterion_main!(benches);
