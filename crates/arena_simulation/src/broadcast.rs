//! Spawn/despawn announcements.
//!
//! Every entity created or destroyed on the server is announced so that
//! clients can mirror it without further queries.

use arena_core::{Entity, EntityId, World};
use arena_shared::{
    EntityPacket, InitialData, Millis, OtherData, Outbox, ServerCommand, ServerMessage,
    SpawnEntityPacket,
};
use tracing::{debug, trace};

/// Broadcasts `spawnEntity` for a freshly created entity.
pub fn announce_spawn(
    outbox: &Outbox<ServerCommand>,
    entity: Entity,
    initial: InitialData,
    other_data: Option<OtherData>,
    now: Millis,
) {
    debug!(entity = %entity.id, kind = ?entity.kind, "spawn");
    outbox.broadcast(ServerMessage::SpawnEntity(SpawnEntityPacket {
        entity_id: entity.id.raw(),
        entity_type: entity.kind,
        time: now,
        initial,
        other_data,
    }));
}

/// Destroys `id` and broadcasts `despawnEntity`.
///
/// Returns `false` (and sends nothing) if the entity was already gone.
pub fn despawn(world: &mut World, outbox: &Outbox<ServerCommand>, id: EntityId, now: Millis) -> bool {
    match world.destroy_entity_by_id(id) {
        Ok(entity) => {
            debug!(entity = %id, kind = ?entity.kind, "despawn");
            outbox.broadcast(ServerMessage::DespawnEntity(EntityPacket {
                entity_id: id.raw(),
                time: now,
            }));
            true
        }
        Err(err) => {
            trace!(%err, "despawn ignored");
            false
        }
    }
}
