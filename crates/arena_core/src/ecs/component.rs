//! # Component System
//!
//! Components are plain data records. Which of them an entity carries is
//! recorded in its [`ComponentMask`]; the data itself lives in one column
//! per type inside the [`World`](super::World).
//!
//! Every component can be built from the partial [`InitialData`] record
//! that travels with a `spawnEntity` message, so server and client
//! construct identical state from identical input.

use arena_shared::{ColliderShape, InitialData, Millis, Vector2};

use super::storage::ComponentStorage;
use super::world::ComponentTables;
use crate::timed_buffer::{Timed, TimedBuffer};

/// Buffered server snapshots per entity.
pub const SNAPSHOT_CAPACITY: usize = 64;

/// Buffered inputs per player.
pub const INPUT_HISTORY_CAPACITY: usize = 64;

// =============================================================================
// COMPONENT TYPES & MASK
// =============================================================================

/// Component kinds, one bit each in a [`ComponentMask`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ComponentType {
    /// [`Transform`]
    Transform = 0,
    /// [`RigidBody`]
    RigidBody = 1,
    /// [`Collider`]
    Collider = 2,
    /// [`TriggerCollider`]
    TriggerCollider = 3,
    /// [`PlayerInput`]
    PlayerInput = 4,
    /// [`LocalPlayer`]
    LocalPlayer = 5,
    /// [`TransformSync`]
    TransformSync = 6,
    /// [`Health`]
    Health = 7,
    /// [`Inventory`]
    Inventory = 8,
    /// [`Lifetime`]
    Lifetime = 9,
    /// [`Timer`]
    Timer = 10,
    /// [`LaserSpawner`]
    LaserSpawner = 11,
}

impl ComponentType {
    /// Every component type, in bit order.
    pub const ALL: [Self; 12] = [
        Self::Transform,
        Self::RigidBody,
        Self::Collider,
        Self::TriggerCollider,
        Self::PlayerInput,
        Self::LocalPlayer,
        Self::TransformSync,
        Self::Health,
        Self::Inventory,
        Self::Lifetime,
        Self::Timer,
        Self::LaserSpawner,
    ];

    /// The mask bit for this type.
    #[inline]
    #[must_use]
    pub const fn bit(self) -> u32 {
        1 << self as u8
    }
}

/// Set of component types attached to an entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ComponentMask(u32);

impl ComponentMask {
    /// The empty mask.
    pub const EMPTY: Self = Self(0);

    /// Builds a mask by OR-ing each listed type.
    #[must_use]
    pub const fn of(types: &[ComponentType]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < types.len() {
            bits |= types[i].bit();
            i += 1;
        }
        Self(bits)
    }

    /// Returns the raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Checks a single type.
    #[inline]
    #[must_use]
    pub const fn contains(self, component: ComponentType) -> bool {
        self.0 & component.bit() != 0
    }

    /// Checks that every type in `other` is present.
    #[inline]
    #[must_use]
    pub const fn contains_all(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the mask with `component` added.
    #[inline]
    #[must_use]
    pub const fn with(self, component: ComponentType) -> Self {
        Self(self.0 | component.bit())
    }

    /// Returns the mask with `component` removed.
    #[inline]
    #[must_use]
    pub const fn without(self, component: ComponentType) -> Self {
        Self(self.0 & !component.bit())
    }

    /// Iterates over the contained types.
    pub fn iter(self) -> impl Iterator<Item = ComponentType> {
        ComponentType::ALL
            .into_iter()
            .filter(move |c| self.contains(*c))
    }
}

// =============================================================================
// COMPONENT TRAIT
// =============================================================================

/// Construction from a spawn record.
pub trait FromInitial {
    /// Builds the component, defaulting every absent field.
    fn from_initial(initial: &InitialData) -> Self;
}

/// A typed column in the world.
///
/// # Example
///
/// ```rust,ignore
/// if let Some(health) = world.get_mut::<Health>(id) {
///     health.current -= 10.0;
/// }
/// ```
pub trait Component: FromInitial + Clone + Default + 'static {
    /// Mask bit of this component.
    const TYPE: ComponentType;

    /// The column holding this component.
    fn column(tables: &ComponentTables) -> &ComponentStorage<Self>;

    /// The column holding this component, mutably.
    fn column_mut(tables: &mut ComponentTables) -> &mut ComponentStorage<Self>;
}

macro_rules! component {
    ($ty:ty, $kind:ident, $field:ident) => {
        impl Component for $ty {
            const TYPE: ComponentType = ComponentType::$kind;

            #[inline]
            fn column(tables: &ComponentTables) -> &ComponentStorage<Self> {
                &tables.$field
            }

            #[inline]
            fn column_mut(tables: &mut ComponentTables) -> &mut ComponentStorage<Self> {
                &mut tables.$field
            }
        }
    };
}

component!(Transform, Transform, transforms);
component!(RigidBody, RigidBody, rigid_bodies);
component!(Collider, Collider, colliders);
component!(TriggerCollider, TriggerCollider, triggers);
component!(PlayerInput, PlayerInput, inputs);
component!(LocalPlayer, LocalPlayer, local_players);
component!(TransformSync, TransformSync, transform_syncs);
component!(Health, Health, healths);
component!(Inventory, Inventory, inventories);
component!(Lifetime, Lifetime, lifetimes);
component!(Timer, Timer, timers);
component!(LaserSpawner, LaserSpawner, laser_spawners);

// =============================================================================
// PHYSICAL COMPONENTS
// =============================================================================

/// Position and facing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    /// World position.
    pub position: Vector2,
    /// Facing in radians.
    pub rotation: f32,
}

impl FromInitial for Transform {
    fn from_initial(initial: &InitialData) -> Self {
        Self {
            position: initial.position.unwrap_or_default(),
            rotation: initial.rotation.unwrap_or_default(),
        }
    }
}

/// Kinematic state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RigidBody {
    /// Units per second.
    pub velocity: Vector2,
    /// Units per second squared.
    pub acceleration: Vector2,
    /// Whether velocity decays each step.
    pub has_drag: bool,
    /// Acceleration at full input.
    pub max_acceleration: f32,
}

impl FromInitial for RigidBody {
    fn from_initial(initial: &InitialData) -> Self {
        Self {
            velocity: initial.velocity.unwrap_or_default(),
            acceleration: initial.acceleration.unwrap_or_default(),
            has_drag: initial.drag_or_default(),
            max_acceleration: initial.max_acceleration.unwrap_or_default(),
        }
    }
}

/// Solid collision volume.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Collider {
    /// Radius in `x` for circles, half extents for rectangles.
    pub size: Vector2,
    /// Geometry tag.
    pub shape: ColliderShape,
    /// Static colliders never move and always win resolution.
    pub is_static: bool,
    /// Higher priority bodies are not displaced by lower ones.
    pub priority: f32,
}

impl Collider {
    /// Radius when treated as a circle.
    #[inline]
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.size.x
    }

    /// Priority used when this collider is the obstacle.
    #[inline]
    #[must_use]
    pub fn effective_priority(&self) -> f32 {
        if self.is_static {
            f32::INFINITY
        } else {
            self.priority
        }
    }
}

impl FromInitial for Collider {
    fn from_initial(initial: &InitialData) -> Self {
        Self {
            size: initial.size_or_default(),
            shape: initial.shape_or_default(),
            is_static: initial.static_or_default(),
            priority: initial.priority_or_default(),
        }
    }
}

/// Overlap-only detection volume.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TriggerCollider {
    /// Geometry tag.
    pub shape: ColliderShape,
    /// Radius in `x` for circles, half extents for rectangles.
    pub size: Vector2,
}

impl FromInitial for TriggerCollider {
    fn from_initial(initial: &InitialData) -> Self {
        Self {
            shape: initial.trigger_shape.unwrap_or_default(),
            size: initial.trigger_size.unwrap_or_default(),
        }
    }
}

// =============================================================================
// CONTROL COMPONENTS
// =============================================================================

/// One recorded input sample.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TimedInput {
    /// Client timestamp of the sample.
    pub time: Millis,
    /// Move intent, length at most 1.
    pub move_input: Vector2,
    /// Look rotation in radians.
    pub look_rotation: f32,
    /// Fire held.
    pub is_fire: bool,
}

impl Timed for TimedInput {
    fn time(&self) -> Millis {
        self.time
    }
}

/// Current player intent plus recent history for replay.
#[derive(Clone, Debug)]
pub struct PlayerInput {
    /// Move intent, length at most 1.
    pub move_input: Vector2,
    /// Look rotation in radians.
    pub look_rotation: f32,
    /// Fire held.
    pub is_fire: bool,
    /// Recorded samples, oldest first.
    pub history: TimedBuffer<TimedInput>,
}

impl PlayerInput {
    /// Snapshot of the current intent at `time`.
    #[must_use]
    pub fn sample(&self, time: Millis) -> TimedInput {
        TimedInput {
            time,
            move_input: self.move_input,
            look_rotation: self.look_rotation,
            is_fire: self.is_fire,
        }
    }

    /// Overwrites the current intent from a sample.
    pub fn apply(&mut self, sample: &TimedInput) {
        self.move_input = sample.move_input;
        self.look_rotation = sample.look_rotation;
        self.is_fire = sample.is_fire;
    }
}

impl Default for PlayerInput {
    fn default() -> Self {
        Self {
            move_input: Vector2::ZERO,
            look_rotation: 0.0,
            is_fire: false,
            history: TimedBuffer::new(INPUT_HISTORY_CAPACITY),
        }
    }
}

impl FromInitial for PlayerInput {
    fn from_initial(initial: &InitialData) -> Self {
        Self {
            move_input: initial.move_input.unwrap_or_default(),
            look_rotation: initial.look_rotation.unwrap_or_default(),
            ..Self::default()
        }
    }
}

/// Marks the entity controlled by this client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LocalPlayer {
    /// True only on the owning client.
    pub is_local: bool,
}

impl FromInitial for LocalPlayer {
    fn from_initial(initial: &InitialData) -> Self {
        Self {
            is_local: initial.is_local_player.unwrap_or(false),
        }
    }
}

// =============================================================================
// NETWORK COMPONENTS
// =============================================================================

/// A transform at a point in time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TransformSnapshot {
    /// When the transform was observed.
    pub time: Millis,
    /// Position.
    pub position: Vector2,
    /// Rotation in radians.
    pub rotation: f32,
}

impl TransformSnapshot {
    /// Captures `transform` at `time`.
    #[must_use]
    pub const fn capture(transform: &Transform, time: Millis) -> Self {
        Self {
            time,
            position: transform.position,
            rotation: transform.rotation,
        }
    }

    /// The snapshot as a transform.
    #[must_use]
    pub const fn transform(&self) -> Transform {
        Transform {
            position: self.position,
            rotation: self.rotation,
        }
    }
}

impl Timed for TransformSnapshot {
    fn time(&self) -> Millis {
        self.time
    }
}

/// Authoritative and locally predicted transform history.
#[derive(Clone, Debug)]
pub struct TransformSync {
    /// Snapshots received from the server.
    pub transform_buffer: TimedBuffer<TransformSnapshot>,
    /// Snapshots of the local simulation, one per tick.
    pub local_transform_buffer: TimedBuffer<TransformSnapshot>,
    /// Server time of the newest snapshot received.
    pub last_server_sync: Option<Millis>,
    /// Server time of the newest snapshot already reconciled against.
    pub last_reconciled: Option<Millis>,
}

impl TransformSync {
    /// Buffers an authoritative snapshot, whatever its arrival order.
    pub fn receive(&mut self, snapshot: TransformSnapshot) {
        self.last_server_sync = Some(
            self.last_server_sync
                .map_or(snapshot.time, |t| t.max(snapshot.time)),
        );
        self.transform_buffer.push(snapshot);
    }
}

impl Default for TransformSync {
    fn default() -> Self {
        Self {
            transform_buffer: TimedBuffer::new(SNAPSHOT_CAPACITY),
            local_transform_buffer: TimedBuffer::new(SNAPSHOT_CAPACITY),
            last_server_sync: None,
            last_reconciled: None,
        }
    }
}

impl FromInitial for TransformSync {
    fn from_initial(_initial: &InitialData) -> Self {
        Self::default()
    }
}

// =============================================================================
// GAMEPLAY COMPONENTS
// =============================================================================

/// Hit points.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Health {
    /// Remaining health.
    pub current: f32,
    /// Starting health.
    pub max: f32,
}

impl Health {
    /// True once health reached zero.
    #[inline]
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }
}

impl FromInitial for Health {
    fn from_initial(initial: &InitialData) -> Self {
        let current = initial.health.unwrap_or_default();
        Self {
            current,
            max: initial.max_health.unwrap_or(current),
        }
    }
}

/// Collected materials.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Inventory {
    /// Materials held, also the player's score.
    pub material_count: u32,
}

impl FromInitial for Inventory {
    fn from_initial(initial: &InitialData) -> Self {
        Self {
            material_count: initial.material_count.unwrap_or_default(),
        }
    }
}

/// Despawn after a fixed time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Lifetime {
    /// When the entity was spawned.
    pub spawn_time: Millis,
    /// Time to live in milliseconds.
    pub lifetime: Millis,
    /// Length of the blinking phase before expiry.
    pub flash_window: Option<Millis>,
}

impl Lifetime {
    /// Sets the pre-expiry flash window.
    #[must_use]
    pub const fn with_flash_window(mut self, window: Millis) -> Self {
        self.flash_window = Some(window);
        self
    }

    /// True once `now - spawn_time > lifetime`.
    #[inline]
    #[must_use]
    pub fn is_expired(&self, now: Millis) -> bool {
        now.saturating_sub(self.spawn_time) > self.lifetime
    }

    /// True inside the flash window, before expiry.
    #[must_use]
    pub fn is_flashing(&self, now: Millis) -> bool {
        let Some(window) = self.flash_window else {
            return false;
        };
        let age = now.saturating_sub(self.spawn_time);
        age <= self.lifetime && age + window > self.lifetime
    }
}

impl FromInitial for Lifetime {
    fn from_initial(initial: &InitialData) -> Self {
        Self {
            spawn_time: initial.spawn_time.unwrap_or_default(),
            lifetime: initial.lifetime.unwrap_or_default(),
            flash_window: None,
        }
    }
}

/// Session countdown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timer {
    /// When the countdown started.
    pub start: Millis,
    /// Countdown length in milliseconds.
    pub duration: Millis,
}

impl Timer {
    /// True once `now - start > duration`.
    #[inline]
    #[must_use]
    pub fn is_expired(&self, now: Millis) -> bool {
        now.saturating_sub(self.start) > self.duration
    }

    /// Milliseconds left, zero once expired.
    #[must_use]
    pub fn remaining(&self, now: Millis) -> Millis {
        (self.start + self.duration).saturating_sub(now)
    }
}

impl FromInitial for Timer {
    fn from_initial(initial: &InitialData) -> Self {
        Self {
            start: initial.timer_start.unwrap_or_default(),
            duration: initial.timer_duration.unwrap_or_default(),
        }
    }
}

/// Laser cooldown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LaserSpawner {
    /// Minimum milliseconds between shots.
    pub fire_rate: Millis,
    /// When the last shot was fired.
    pub last_fire_time: Millis,
}

impl LaserSpawner {
    /// True once `last_fire_time + fire_rate < now`. The sum saturates.
    #[inline]
    #[must_use]
    pub const fn is_ready(&self, now: Millis) -> bool {
        self.last_fire_time.saturating_add(self.fire_rate) < now
    }
}

impl FromInitial for LaserSpawner {
    fn from_initial(initial: &InitialData) -> Self {
        Self {
            fire_rate: initial.fire_rate.unwrap_or_default(),
            last_fire_time: initial.last_fire_time.unwrap_or_default(),
        }
    }
}
