use tracing::error;

use crate::types::{Campus, PianoType, Room};

lazy_static::lazy_static! {
    static ref ROOMS: Vec<Room> = serde_json::from_str(include_str!("rooms.json"))
        .unwrap_or_else(|e| {
            error!("Failed to load embedded room catalog: {}", e);
            Vec::new()
        });
}

/// The full static room catalog
pub fn rooms() -> &'static [Room] {
    &ROOMS
}

/// Criteria for narrowing the room catalog.
/// Unset options and empty lists do not constrain; set criteria combine with AND.
#[derive(Debug, Clone, Default)]
pub struct RoomFilter {
    /// Exact room identifier
    pub id: Option<String>,
    /// Substring of the room name
    pub name: Option<String>,
    /// Accepted piano types
    pub piano_types: Vec<PianoType>,
    /// Accepted piano counts
    pub piano_numbers: Vec<u32>,
    /// Accepted floors
    pub floors: Vec<i32>,
    /// Required basement flag
    pub is_basement: Option<bool>,
    /// Required classroom flag
    pub is_classroom: Option<bool>,
    /// Accepted campuses
    pub campuses: Vec<Campus>,
}

impl RoomFilter {
    /// Whether a room satisfies every set criterion
    pub fn matches(&self, room: &Room) -> bool {
        if let Some(ref id) = self.id {
            if &room.id != id {
                return false;
            }
        }
        if let Some(ref name) = self.name {
            if !room.name.contains(name.as_str()) {
                return false;
            }
        }

        accepts(&self.piano_types, &room.piano_type)
            && accepts(&self.piano_numbers, &room.piano_number)
            && accepts(&self.floors, &room.floor)
            && accepts(&self.campuses, &room.campus)
            && self.is_basement.is_none_or(|b| b == room.is_basement)
            && self.is_classroom.is_none_or(|c| c == room.is_classroom)
    }
}

fn accepts<T: PartialEq>(allowed: &[T], value: &T) -> bool {
    allowed.is_empty() || allowed.contains(value)
}

/// Catalog entries matching `filter`, in catalog order
pub fn rooms_filtered(filter: &RoomFilter) -> Vec<Room> {
    rooms().iter().filter(|r| filter.matches(r)).cloned().collect()
}

/// Resolve a room name printed by the site to its catalog entry.
/// Rooms on `campus` win over same-named rooms elsewhere.
pub fn find_by_name(name: &str, campus: Campus) -> Option<&'static Room> {
    let mut fallback = None;
    for room in rooms().iter().filter(|r| r.name == name) {
        if room.campus == campus {
            return Some(room);
        }
        fallback.get_or_insert(room);
    }
    fallback
}

/// Look up a room by its identifier
pub fn find_by_id(id: &str) -> Option<&'static Room> {
    rooms().iter().find(|r| r.id == id)
}
