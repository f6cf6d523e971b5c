//! Builds the tailored, read-only views handed back by `state`/`gamestate`
//! and the housekeeper's own status-string bookkeeping.

use std::time::Instant;

use serde::Serialize;

use rule_oracle::{Board, Cell};

use crate::model::{Phase, Room, ShipPlacement, Slot};

fn cell_char(cell: Cell) -> String {
    match cell {
        Cell::Empty => ".".to_string(),
        Cell::Miss => "O".to_string(),
        Cell::Hit => "X".to_string(),
        Cell::Ship(kind) => kind.marker().to_string(),
    }
}

/// Renders a full board (own board, or a spectator's view of either board)
/// as rows of single-character strings.
pub fn board_to_wire(board: &Board) -> Vec<Vec<String>> {
    (0..rule_oracle::BOARD_SIZE)
        .map(|row| {
            (0..rule_oracle::BOARD_SIZE)
                .map(|col| cell_char(board.get(row, col)))
                .collect()
        })
        .collect()
}

/// The paused countdown is recomputed on every read, never stored, so two
/// reads a second apart show different remaining-second counts even though
/// nothing else about the room changed.
pub fn status_message(room: &Room, reconnect_window: std::time::Duration, now: Instant) -> String {
    if room.phase == Phase::Paused {
        if let Some(pause_start) = room.pause_start {
            let elapsed = now.saturating_duration_since(pause_start);
            let remaining = reconnect_window.saturating_sub(elapsed).as_secs();
            return format!(
                "Game Paused. Waiting {} seconds for the other player to reconnect.",
                remaining
            );
        }
    }
    room.status_message.clone()
}

#[derive(Debug, Serialize)]
pub struct PlayerSnapshot {
    pub game_phase: String,
    pub your_turn: bool,
    pub own_board: Vec<Vec<String>>,
    pub opponent_board: Vec<Vec<String>>,
    pub player_name: Option<String>,
    pub opponent_name: Option<String>,
    pub current_turn_player_name: Option<String>,
    pub status_message: String,
    pub game_over: bool,
    pub winner: Option<String>,
    pub turn_time_remaining: Option<f64>,
    pub opponent_connected: bool,
    pub own_sunk_ships: Vec<String>,
    pub opponent_sunk_ships: Vec<String>,
    pub placed_ships: Vec<ShipPlacement>,
}

pub fn player_snapshot(
    room: &Room,
    slot: Slot,
    turn_timeout: std::time::Duration,
    reconnect_window: std::time::Duration,
    now: Instant,
) -> PlayerSnapshot {
    let opponent = slot.other();
    let own = room.slot(slot);
    let opp = room.slot(opponent);

    let empty_board = Board::new();
    let own_board = own.map(|s| &s.board).unwrap_or(&empty_board);
    let opponent_board = opp.map(|s| s.board.opponent_view()).unwrap_or_else(Board::new);

    let turn_time_remaining = if room.phase == Phase::Playing {
        let elapsed = now.saturating_duration_since(room.turn_start);
        Some(turn_timeout.saturating_sub(elapsed).as_secs_f64().max(0.0))
    } else {
        None
    };

    PlayerSnapshot {
        game_phase: phase_str(room.phase),
        your_turn: room.phase == Phase::Playing && room.turn == Some(slot),
        own_board: board_to_wire(own_board),
        opponent_board: board_to_wire(&opponent_board),
        player_name: own.map(|s| s.name.clone()),
        opponent_name: opp.map(|s| s.name.clone()),
        current_turn_player_name: room.turn.and_then(|t| room.slot(t)).map(|s| s.name.clone()),
        status_message: status_message(room, reconnect_window, now),
        game_over: room.phase == Phase::Over,
        winner: room.winner.clone(),
        turn_time_remaining,
        opponent_connected: opp.map(|s| s.connected).unwrap_or(false),
        own_sunk_ships: own
            .map(|s| s.sunk.iter().map(|k| format!("{:?}", k)).collect())
            .unwrap_or_default(),
        opponent_sunk_ships: opp
            .map(|s| s.sunk.iter().map(|k| format!("{:?}", k)).collect())
            .unwrap_or_default(),
        placed_ships: own.map(|s| s.placement.clone()).unwrap_or_default(),
    }
}

#[derive(Debug, Serialize)]
pub struct SpectatorSnapshot {
    pub game_phase: String,
    pub player1_name: Option<String>,
    pub player2_name: Option<String>,
    pub player1_board: Vec<Vec<String>>,
    pub player2_board: Vec<Vec<String>>,
    pub current_turn_player_name: Option<String>,
    pub status_message: String,
    pub game_over: bool,
    pub winner: Option<String>,
    pub turn_time_remaining: Option<f64>,
    pub player1_connected: bool,
    pub player2_connected: bool,
    pub player1_sunk_ships: Vec<String>,
    pub player2_sunk_ships: Vec<String>,
}

pub fn spectator_snapshot(
    room: &Room,
    turn_timeout: std::time::Duration,
    reconnect_window: std::time::Duration,
    now: Instant,
) -> SpectatorSnapshot {
    let empty_board = Board::new();
    let p1 = room.slot(Slot::One);
    let p2 = room.slot(Slot::Two);

    let turn_time_remaining = if room.phase == Phase::Playing {
        let elapsed = now.saturating_duration_since(room.turn_start);
        Some(turn_timeout.saturating_sub(elapsed).as_secs_f64().max(0.0))
    } else {
        None
    };

    SpectatorSnapshot {
        game_phase: phase_str(room.phase),
        player1_name: p1.map(|s| s.name.clone()),
        player2_name: p2.map(|s| s.name.clone()),
        player1_board: board_to_wire(p1.map(|s| &s.board).unwrap_or(&empty_board)),
        player2_board: board_to_wire(p2.map(|s| &s.board).unwrap_or(&empty_board)),
        current_turn_player_name: room.turn.and_then(|t| room.slot(t)).map(|s| s.name.clone()),
        status_message: status_message(room, reconnect_window, now),
        game_over: room.phase == Phase::Over,
        winner: room.winner.clone(),
        turn_time_remaining,
        player1_connected: p1.map(|s| s.connected).unwrap_or(false),
        player2_connected: p2.map(|s| s.connected).unwrap_or(false),
        player1_sunk_ships: p1
            .map(|s| s.sunk.iter().map(|k| format!("{:?}", k)).collect())
            .unwrap_or_default(),
        player2_sunk_ships: p2
            .map(|s| s.sunk.iter().map(|k| format!("{:?}", k)).collect())
            .unwrap_or_default(),
    }
}

pub fn phase_str(phase: Phase) -> String {
    match phase {
        Phase::Lobby => "lobby",
        Phase::Placing => "placing_ships",
        Phase::Playing => "playing",
        Phase::Paused => "paused",
        Phase::Over => "game_over",
    }
    .to_string()
}
