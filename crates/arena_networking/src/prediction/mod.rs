//! # Client-Side Prediction
//!
//! The local player is simulated immediately and corrected when the server
//! disagrees.
//!
//! ## How It Works
//!
//! 1. Every tick the local transform and input are recorded with a timestamp
//! 2. The server sends authoritative transforms at its own rate
//! 3. On a fresh snapshot the closest local snapshot is compared with it
//! 4. Small divergence is ignored; large divergence rewinds and replays
//!
//! ```text
//! Inputs:     [i1] [i2] [i3] [i4] [i5]
//!                   │
//! Server:     ─────[S]──────────────────
//!                   │
//! Reconcile:  compare local@S with S
//!             if far: transform = S, replay [i3, i4, i5]
//! ```
//!
//! Replay re-runs input handling, physics and collision for the local
//! entity only. dt for each replayed input is the gap to the previous
//! timestamp, so the replay covers exactly the time the server has not
//! acknowledged yet.

use arena_core::{
    Entity, EntityId, LocalPlayer, PlayerInput, SimulationAuthority, System, TickContext,
    TimedInput, Transform, TransformSnapshot, TransformSync, World,
};
use arena_shared::Millis;
use arena_simulation::{collision::resolve_collisions, input::apply_sample, physics::step_entity};
use tracing::debug;

/// Divergence below this is treated as an accurate prediction.
pub const RECONCILE_THRESHOLD: f32 = 5.0;

/// Outcome of comparing a prediction with an authoritative snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ReconciliationResult {
    /// Prediction was close enough.
    NoCorrection,
    /// The transform was reset and inputs replayed.
    Corrected {
        /// Distance between prediction and server.
        error: f32,
        /// Inputs replayed after the reset.
        replayed: usize,
    },
}

/// Replays `inputs` on `id`, starting from the state at `from`.
///
/// Inputs at or before `from` are skipped. Returns the number replayed.
/// Pure: no clock reads, so equal inputs give bit-identical results.
pub fn replay(world: &mut World, id: EntityId, from: Millis, inputs: &[TimedInput]) -> usize {
    let mut previous = from;
    let mut replayed = 0;

    for sample in inputs.iter().filter(|s| s.time > from) {
        let dt = (sample.time - previous) as f32 / 1000.0;
        apply_sample(world, id, sample);
        step_entity(world, id, dt);
        resolve_collisions(world, id);
        previous = sample.time;
        replayed += 1;
    }

    replayed
}

/// Compares the newest unreconciled server snapshot of `id` with the
/// local history and corrects on divergence.
///
/// Returns `None` when there is nothing new to reconcile.
pub fn reconcile(world: &mut World, id: EntityId, threshold: f32) -> Option<ReconciliationResult> {
    let sync = world.get_mut::<TransformSync>(id)?;
    let server = *sync.transform_buffer.latest()?;
    if sync.last_reconciled.is_some_and(|t| t >= server.time) {
        return None;
    }
    sync.last_reconciled = Some(server.time);
    sync.transform_buffer.prune_before(server.time);

    let Some(local) = sync.local_transform_buffer.closest(server.time).copied() else {
        return Some(ReconciliationResult::NoCorrection);
    };
    let error = local.position.distance(server.position);

    if error < threshold {
        sync.local_transform_buffer.prune_before(local.time);
        trim_inputs(world, id, server.time);
        return Some(ReconciliationResult::NoCorrection);
    }
    sync.local_transform_buffer.clear();

    let (inputs, current) = match world.get::<PlayerInput>(id) {
        Some(input) => {
            let pending: Vec<TimedInput> = input.history.newer_than(server.time).copied().collect();
            (pending, input.sample(server.time))
        }
        None => (Vec::new(), TimedInput::default()),
    };

    if let Some(t) = world.get_mut::<Transform>(id) {
        *t = server.transform();
    }
    let replayed = replay(world, id, server.time, &inputs);

    // Replay leaves the last replayed sample loaded; restore live intent
    if let Some(input) = world.get_mut::<PlayerInput>(id) {
        input.apply(&current);
    }
    trim_inputs(world, id, server.time);

    debug!(entity = %id, error, replayed, "prediction corrected");
    Some(ReconciliationResult::Corrected { error, replayed })
}

fn trim_inputs(world: &mut World, id: EntityId, through: Millis) {
    if let Some(input) = world.get_mut::<PlayerInput>(id) {
        input.history.prune_through(through);
    }
}

/// Records local history and reconciles the locally predicted player.
#[derive(Debug)]
pub struct ClientPredictionSystem {
    threshold: f32,
    last_result: Option<ReconciliationResult>,
}

impl ClientPredictionSystem {
    /// Corrects when divergence reaches `threshold`.
    #[must_use]
    pub const fn new(threshold: f32) -> Self {
        Self {
            threshold,
            last_result: None,
        }
    }

    /// Outcome of the most recent reconciliation.
    #[must_use]
    pub const fn last_result(&self) -> Option<ReconciliationResult> {
        self.last_result
    }
}

impl Default for ClientPredictionSystem {
    fn default() -> Self {
        Self::new(RECONCILE_THRESHOLD)
    }
}

impl System for ClientPredictionSystem {
    fn name(&self) -> &'static str {
        "client_prediction"
    }

    fn update(&mut self, world: &mut World, ctx: &mut TickContext, entity: Entity) {
        if entity.authority != SimulationAuthority::PredictedLocal {
            return;
        }
        if !world.get::<LocalPlayer>(entity.id).is_some_and(|l| l.is_local) {
            return;
        }

        if let Some(result) = reconcile(world, entity.id, self.threshold) {
            self.last_result = Some(result);
        }

        let Some(transform) = world.get::<Transform>(entity.id).copied() else {
            return;
        };
        if let Some(sync) = world.get_mut::<TransformSync>(entity.id) {
            sync.local_transform_buffer
                .push(TransformSnapshot::capture(&transform, ctx.now));
        }
        if let Some(input) = world.get_mut::<PlayerInput>(entity.id) {
            let sample = input.sample(ctx.now);
            input.history.push(sample);
        }
    }
}
