//! The room table: phases, slots and the matchmaking queue.
//!
//! This mirrors the teacher's `lobby.rs`: a `Room` holding per-session state
//! and an `AppState` singleton holding every live room plus the queue. The
//! difference from a relay is that this coordinator is authoritative — it
//! owns the board and registry for both slots, not just a pipe between them.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use rule_oracle::{Board, Orientation, Registry, ShipKind};

use crate::config::Config;

/// Which of the two seats in a room a request refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    One,
    Two,
}

impl Slot {
    pub fn from_number(n: u8) -> Option<Slot> {
        match n {
            1 => Some(Slot::One),
            2 => Some(Slot::Two),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Slot::One => 1,
            Slot::Two => 2,
        }
    }

    pub fn other(self) -> Slot {
        match self {
            Slot::One => Slot::Two,
            Slot::Two => Slot::One,
        }
    }
}

/// The coarse lifecycle state of a room. `Reaped` rooms are never stored —
/// reaping removes the room from the table outright — so it has no variant
/// here; deletion itself is the terminal transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Lobby,
    Placing,
    Playing,
    Paused,
    Over,
}

/// One ship placement as submitted by a client, kept verbatim so a
/// reconnecting client can rebuild its own overlay without replaying history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipPlacement {
    pub name: ShipKind,
    pub start_row: usize,
    pub start_col: usize,
    pub orientation: Orientation,
}

/// Per-seat state: who's sitting there, whether they're still around, and
/// their board.
#[derive(Debug)]
pub struct SlotState {
    pub name: String,
    pub connected: bool,
    pub last_activity: Instant,
    pub ships_placed: bool,
    pub board: Board,
    pub registry: Registry,
    pub sunk: Vec<ShipKind>,
    pub placement: Vec<ShipPlacement>,
}

impl SlotState {
    pub fn new(name: String) -> Self {
        SlotState {
            name,
            connected: true,
            last_activity: Instant::now(),
            ships_placed: false,
            board: Board::new(),
            registry: Registry::new(),
            sunk: Vec::new(),
            placement: Vec::new(),
        }
    }
}

/// A two-seat game session.
pub struct Room {
    pub id: String,
    pub phase: Phase,
    pub slot_one: Option<SlotState>,
    pub slot_two: Option<SlotState>,
    pub turn: Option<Slot>,
    pub turn_start: Instant,
    pub pause_start: Option<Instant>,
    pub disconnected_slot: Option<Slot>,
    pub winner: Option<String>,
    pub game_end: Option<Instant>,
    pub is_quick_match: bool,
    pub status_message: String,
}

impl Room {
    pub fn new_lobby(id: String, host_name: String) -> Self {
        Room {
            id,
            phase: Phase::Lobby,
            slot_one: Some(SlotState::new(host_name)),
            slot_two: None,
            turn: None,
            turn_start: Instant::now(),
            pause_start: None,
            disconnected_slot: None,
            winner: None,
            game_end: None,
            is_quick_match: false,
            status_message: "Waiting for opponent to join...".to_string(),
        }
    }

    pub fn new_quick_match(id: String, first_name: String, second_name: String) -> Self {
        Room {
            id,
            phase: Phase::Placing,
            slot_one: Some(SlotState::new(first_name)),
            slot_two: Some(SlotState::new(second_name)),
            turn: None,
            turn_start: Instant::now(),
            pause_start: None,
            disconnected_slot: None,
            winner: None,
            game_end: None,
            is_quick_match: true,
            status_message: "Quick match found! Place your ships.".to_string(),
        }
    }

    pub fn slot(&self, slot: Slot) -> Option<&SlotState> {
        match slot {
            Slot::One => self.slot_one.as_ref(),
            Slot::Two => self.slot_two.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, slot: Slot) -> Option<&mut SlotState> {
        match slot {
            Slot::One => self.slot_one.as_mut(),
            Slot::Two => self.slot_two.as_mut(),
        }
    }

    pub fn occupant_count(&self) -> usize {
        self.slot_one.is_some() as usize + self.slot_two.is_some() as usize
    }

    /// Finds which slot (if any) carries this display name.
    pub fn find_by_name(&self, name: &str) -> Option<Slot> {
        if self.slot_one.as_ref().is_some_and(|s| s.name == name) {
            Some(Slot::One)
        } else if self.slot_two.as_ref().is_some_and(|s| s.name == name) {
            Some(Slot::Two)
        } else {
            None
        }
    }
}

/// One waiting quick-match entry.
pub struct QueueEntry {
    pub name: String,
    pub enqueued_at: Instant,
}

/// The process-wide singleton: every live room, the matchmaking queue, and
/// the tunable timeouts that drive the housekeeper.
pub struct AppState {
    pub rooms: RwLock<HashMap<String, Arc<Mutex<Room>>>>,
    pub queue: Mutex<VecDeque<QueueEntry>>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        AppState {
            rooms: RwLock::new(HashMap::new()),
            queue: Mutex::new(VecDeque::new()),
            config,
        }
    }

    /// Generates a fresh 8-character opaque room id, re-rolling on the
    /// vanishingly unlikely collision with a live room.
    pub async fn fresh_room_id(&self) -> String {
        use rand::Rng;
        const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
        loop {
            let id: String = {
                let mut rng = rand::thread_rng();
                (0..8)
                    .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
                    .collect()
            };
            if !self.rooms.read().await.contains_key(&id) {
                return id;
            }
        }
    }
}
