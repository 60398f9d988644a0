//! Process-wide collection of active rooms.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rand::Rng;
use tracing::{debug, info, instrument};

use super::room::{Room, RoomStatus};

/// Alphabet for room ids; ambiguous characters are left out.
const ID_ALPHABET: &[u8] = b"abcdefghjkmnpqrstuvwxyz23456789";
const ID_LENGTH: usize = 6;

/// Maps room ids to live rooms.
///
/// The registry is constructed explicitly and handed to whatever accepts
/// connections; there is no process-global instance, so tests can run
/// several registries side by side. Every operation is safe under
/// concurrent access from any number of connection handlers.
pub struct RoomRegistry {
    rooms: Mutex<HashMap<String, Arc<Room>>>,
}

impl RoomRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
        }
    }

    /// Creates, stores and returns a new waiting room with a fresh id.
    #[instrument(skip(self))]
    pub fn create_room(&self) -> Arc<Room> {
        let mut rooms = self.rooms.lock().unwrap();
        let id = loop {
            let candidate = random_id();
            if !rooms.contains_key(&candidate) {
                break candidate;
            }
        };
        let room = Arc::new(Room::new(id.clone()));
        rooms.insert(id.clone(), room.clone());
        info!(room = %id, total = rooms.len(), "room created");
        room
    }

    /// Returns any waiting room with a free seat, if one exists.
    pub fn find_joinable_room(&self) -> Option<Arc<Room>> {
        let rooms = self.rooms.lock().unwrap();
        rooms
            .values()
            .find(|room| room.status() == RoomStatus::Waiting && room.is_joinable())
            .cloned()
    }

    /// Looks a room up by id.
    pub fn get_room(&self, id: &str) -> Option<Arc<Room>> {
        self.rooms.lock().unwrap().get(id).cloned()
    }

    /// Drops a room from the registry.
    #[instrument(skip(self))]
    pub fn remove_room(&self, id: &str) {
        let mut rooms = self.rooms.lock().unwrap();
        if rooms.remove(id).is_some() {
            debug!(room = %id, total = rooms.len(), "room removed");
        }
    }

    /// Number of live rooms.
    pub fn len(&self) -> usize {
        self.rooms.lock().unwrap().len()
    }

    /// True when no rooms exist.
    pub fn is_empty(&self) -> bool {
        self.rooms.lock().unwrap().is_empty()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn random_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LENGTH)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_create_and_lookup() {
        let registry = RoomRegistry::new();
        let room = registry.create_room();
        assert_eq!(room.id().len(), ID_LENGTH);
        let found = registry.get_room(room.id()).unwrap();
        assert_eq!(found.id(), room.id());
    }

    #[test]
    fn test_find_joinable_skips_full_rooms() {
        let registry = RoomRegistry::new();
        let room = registry.create_room();
        let (tx, _rx_a) = mpsc::unbounded_channel();
        room.add_participant(1, "alice".into(), tx).unwrap();
        let (tx, _rx_b) = mpsc::unbounded_channel();
        room.add_participant(2, "bob".into(), tx).unwrap();

        assert!(registry.find_joinable_room().is_none());

        let open = registry.create_room();
        let found = registry.find_joinable_room().unwrap();
        assert_eq!(found.id(), open.id());
    }

    #[test]
    fn test_remove_room() {
        let registry = RoomRegistry::new();
        let room = registry.create_room();
        registry.remove_room(room.id());
        assert!(registry.get_room(room.id()).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let registry = RoomRegistry::new();
        let a = registry.create_room();
        let b = registry.create_room();
        assert_ne!(a.id(), b.id());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_unknown_id_is_none() {
        let registry = RoomRegistry::new();
        assert!(registry.get_room("missing").is_none());
    }
}
