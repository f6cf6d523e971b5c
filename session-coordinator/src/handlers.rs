//! The axum handlers behind every `/api/*` route.
//!
//! Every handler follows the same shape: acquire the table lock just long
//! enough to find (or build) an `Arc<Mutex<Room>>`, then acquire that room's
//! own lock to validate and mutate it, then drop both locks before the
//! response is serialized. No handler ever holds the table lock while
//! waiting on a room lock it does not already have.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use rule_oracle::{AttackOutcome, Registry};

use crate::error::CoordinatorError;
use crate::model::{AppState, Phase, QueueEntry, Room, ShipPlacement, Slot, SlotState};
use crate::snapshot::{self, PlayerSnapshot, SpectatorSnapshot};

type AppResult<T> = Result<Json<T>, CoordinatorError>;

fn slot_from_number(n: u8) -> Result<Slot, CoordinatorError> {
    Slot::from_number(n).ok_or_else(|| CoordinatorError::BadRequest("player_number must be 1 or 2".to_string()))
}

async fn find_room(state: &AppState, game_id: &str) -> Result<Arc<tokio::sync::Mutex<Room>>, CoordinatorError> {
    state
        .rooms
        .read()
        .await
        .get(game_id)
        .cloned()
        .ok_or(CoordinatorError::RoomNotFound)
}

// ---------------------------------------------------------------------
// host
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct HostRequest {
    pub player_name: String,
}

#[derive(Debug, Serialize)]
pub struct HostResponse {
    pub game_id: String,
    pub player_number: u8,
}

pub async fn host(
    State(state): State<Arc<AppState>>,
    Json(req): Json<HostRequest>,
) -> AppResult<HostResponse> {
    if req.player_name.trim().is_empty() {
        return Err(CoordinatorError::BadRequest("player_name must not be empty".to_string()));
    }

    let game_id = state.fresh_room_id().await;
    let room = Room::new_lobby(game_id.clone(), req.player_name.clone());
    state
        .rooms
        .write()
        .await
        .insert(game_id.clone(), Arc::new(tokio::sync::Mutex::new(room)));

    tracing::info!(game_id = %game_id, player_name = %req.player_name, "Room hosted.");
    Ok(Json(HostResponse { game_id, player_number: 1 }))
}

// ---------------------------------------------------------------------
// join / reconnect (consolidated, per spec §6.1)
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub player_name: String,
    pub game_id: String,
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub game_id: String,
    pub player_number: u8,
    #[serde(skip_serializing_if = "is_false")]
    pub reconnected: bool,
}

pub async fn join(
    State(state): State<Arc<AppState>>,
    Json(req): Json<JoinRequest>,
) -> AppResult<JoinResponse> {
    let room_handle = find_room(&state, &req.game_id).await?;
    let mut room = room_handle.lock().await;

    if let Some(slot) = room.find_by_name(&req.player_name) {
        let reconnected = {
            let was_paused = room.phase == Phase::Paused && room.disconnected_slot == Some(slot);
            let was_disconnected = room
                .slot(slot)
                .map(|s| !s.connected)
                .unwrap_or(false);

            if !was_disconnected && !was_paused {
                return Err(CoordinatorError::Forbidden("already connected".to_string()));
            }

            if let Some(slot_state) = room.slot_mut(slot) {
                slot_state.connected = true;
                slot_state.last_activity = Instant::now();
            }
            if was_paused {
                room.phase = Phase::Playing;
                room.turn_start = Instant::now();
                room.pause_start = None;
                room.disconnected_slot = None;
                room.status_message = "Game resumed.".to_string();
            }
            true
        };

        tracing::info!(game_id = %req.game_id, player_name = %req.player_name, "Player reconnected.");
        return Ok(Json(JoinResponse {
            game_id: req.game_id,
            player_number: slot.number(),
            reconnected,
        }));
    }

    if room.phase != Phase::Lobby || room.occupant_count() >= 2 {
        return Err(CoordinatorError::Forbidden("game is full".to_string()));
    }

    room.slot_two = Some(SlotState::new(req.player_name.clone()));
    room.phase = Phase::Placing;
    room.status_message = "Both players present. Place your ships.".to_string();

    tracing::info!(game_id = %req.game_id, player_name = %req.player_name, "Player joined.");
    Ok(Json(JoinResponse {
        game_id: req.game_id,
        player_number: 2,
        reconnected: false,
    }))
}

// ---------------------------------------------------------------------
// place_ships
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PlaceShipsRequest {
    pub game_id: String,
    pub player_number: u8,
    pub ships: Vec<ShipPlacement>,
}

#[derive(Debug, Serialize)]
pub struct PlaceShipsResponse {
    pub ok: bool,
}

pub async fn place_ships(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PlaceShipsRequest>,
) -> AppResult<PlaceShipsResponse> {
    let slot = slot_from_number(req.player_number)?;
    let room_handle = find_room(&state, &req.game_id).await?;
    let mut room = room_handle.lock().await;

    if room.phase != Phase::Placing {
        return Err(CoordinatorError::Forbidden("room is not accepting placements".to_string()));
    }

    let mut board = rule_oracle::Board::new();
    let mut registry = Registry::new();
    for placement in &req.ships {
        let placed = rule_oracle::place(
            &mut board,
            &mut registry,
            placement.name,
            placement.start_row,
            placement.start_col,
            placement.orientation,
        );
        if !placed {
            return Err(CoordinatorError::BadRequest(format!(
                "could not place {:?} at ({}, {})",
                placement.name, placement.start_row, placement.start_col
            )));
        }
    }

    {
        let slot_state = room
            .slot_mut(slot)
            .ok_or_else(|| CoordinatorError::Internal)?;
        slot_state.board = board;
        slot_state.registry = registry;
        slot_state.placement = req.ships.clone();
        slot_state.ships_placed = true;
        slot_state.last_activity = Instant::now();
    }

    let both_placed = room.slot_one.as_ref().is_some_and(|s| s.ships_placed)
        && room.slot_two.as_ref().is_some_and(|s| s.ships_placed);
    if both_placed {
        room.phase = Phase::Playing;
        room.turn = Some(Slot::One);
        room.turn_start = Instant::now();
        room.status_message = "The game has begun.".to_string();
        tracing::info!(game_id = %req.game_id, "Both fleets placed, game starting.");
    }

    Ok(Json(PlaceShipsResponse { ok: true }))
}

// ---------------------------------------------------------------------
// attack
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AttackRequest {
    pub game_id: String,
    pub player_number: u8,
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Serialize)]
pub struct AttackResponse {
    pub result: String,
}

fn outcome_to_result_string(outcome: AttackOutcome) -> String {
    match outcome {
        AttackOutcome::Invalid => "invalid".to_string(),
        AttackOutcome::Already => "already".to_string(),
        AttackOutcome::Miss => "miss".to_string(),
        AttackOutcome::Hit => "hit".to_string(),
        AttackOutcome::Sunk(kind) => format!("sunk {:?}", kind),
    }
}

pub async fn attack(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AttackRequest>,
) -> AppResult<AttackResponse> {
    let slot = slot_from_number(req.player_number)?;
    let room_handle = find_room(&state, &req.game_id).await?;
    let mut room = room_handle.lock().await;

    if room.phase != Phase::Playing {
        return Err(CoordinatorError::Forbidden("game is not in progress".to_string()));
    }
    if room.turn != Some(slot) {
        return Err(CoordinatorError::Forbidden("not your turn".to_string()));
    }

    let opponent = slot.other();
    let outcome = {
        let opponent_state = room
            .slot_mut(opponent)
            .ok_or(CoordinatorError::Internal)?;
        let outcome = rule_oracle::attack(&mut opponent_state.board, &mut opponent_state.registry, req.row, req.col);
        if let AttackOutcome::Sunk(kind) = outcome {
            opponent_state.sunk.push(kind);
        }
        outcome
    };

    if matches!(outcome, AttackOutcome::Invalid) {
        return Err(CoordinatorError::BadRequest("attack coordinates out of bounds".to_string()));
    }

    if let Some(attacker_state) = room.slot_mut(slot) {
        attacker_state.last_activity = Instant::now();
    }

    let opponent_registry_over = room
        .slot(opponent)
        .map(|s| rule_oracle::is_over(&s.registry))
        .unwrap_or(false);

    if opponent_registry_over {
        let winner_name = room.slot(slot).map(|s| s.name.clone());
        room.phase = Phase::Over;
        room.winner = winner_name.clone();
        room.game_end = Some(Instant::now());
        room.status_message = winner_name
            .map(|name| format!("{} wins!", name))
            .unwrap_or_else(|| "Game over.".to_string());
        tracing::info!(game_id = %req.game_id, winner = ?room.winner, "Game over.");
    } else {
        room.turn = Some(opponent);
        room.turn_start = Instant::now();
    }

    Ok(Json(AttackResponse {
        result: outcome_to_result_string(outcome),
    }))
}

// ---------------------------------------------------------------------
// gamestate
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GamestateQuery {
    pub game_id: String,
    pub player_number: Option<u8>,
    pub is_spectator: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum GamestateResponse {
    Player(PlayerSnapshot),
    Spectator(SpectatorSnapshot),
}

pub async fn gamestate(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GamestateQuery>,
) -> AppResult<GamestateResponse> {
    let room_handle = find_room(&state, &query.game_id).await?;
    let mut room = room_handle.lock().await;
    let now = Instant::now();

    if query.is_spectator.unwrap_or(false) {
        let snapshot = snapshot::spectator_snapshot(
            &room,
            state.config.turn_timeout(),
            state.config.reconnect_window(),
            now,
        );
        return Ok(Json(GamestateResponse::Spectator(snapshot)));
    }

    let slot = slot_from_number(query.player_number.ok_or_else(|| {
        CoordinatorError::BadRequest("player_number is required unless is_spectator is set".to_string())
    })?)?;

    if let Some(slot_state) = room.slot_mut(slot) {
        slot_state.last_activity = Instant::now();
    }

    let snapshot = snapshot::player_snapshot(
        &room,
        slot,
        state.config.turn_timeout(),
        state.config.reconnect_window(),
        now,
    );
    Ok(Json(GamestateResponse::Player(snapshot)))
}

// ---------------------------------------------------------------------
// quick_match
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct QuickMatchRequest {
    pub player_name: String,
}

#[derive(Debug, Serialize)]
pub struct QuickMatchResponse {
    pub matched: bool,
    pub waiting: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_number: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent_name: Option<String>,
}

/// Drops any of `name`'s rooms that have already finished, so a player who
/// just won or lost can immediately requeue under the same name.
async fn reap_finished_rooms_for(state: &AppState, name: &str) {
    let mut rooms = state.rooms.write().await;
    let mut to_remove = Vec::new();
    for (id, handle) in rooms.iter() {
        let room = handle.lock().await;
        if room.phase == Phase::Over && room.find_by_name(name).is_some() {
            to_remove.push(id.clone());
        }
    }
    for id in to_remove {
        rooms.remove(&id);
    }
}

/// True iff `name` currently occupies a slot in some non-terminal room — the
/// per-spec invariant that a name cannot be both queued and in an active
/// match relies on this being checked before every enqueue/pair.
async fn already_in_active_match(state: &AppState, name: &str) -> bool {
    let rooms = state.rooms.read().await;
    for handle in rooms.values() {
        let room = handle.lock().await;
        if room.phase != Phase::Over && room.find_by_name(name).is_some() {
            return true;
        }
    }
    false
}

pub async fn quick_match(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QuickMatchRequest>,
) -> AppResult<QuickMatchResponse> {
    if req.player_name.trim().is_empty() {
        return Err(CoordinatorError::BadRequest("player_name must not be empty".to_string()));
    }

    reap_finished_rooms_for(&state, &req.player_name).await;

    if already_in_active_match(&state, &req.player_name).await {
        return Err(CoordinatorError::Forbidden("already in a match".to_string()));
    }

    let mut queue = state.queue.lock().await;
    if queue.iter().any(|entry| entry.name == req.player_name) {
        return Err(CoordinatorError::Forbidden("already queued for a quick match".to_string()));
    }

    if let Some(waiting) = queue.pop_front() {
        drop(queue);
        let game_id = state.fresh_room_id().await;
        let room = Room::new_quick_match(game_id.clone(), waiting.name.clone(), req.player_name.clone());
        state
            .rooms
            .write()
            .await
            .insert(game_id.clone(), Arc::new(tokio::sync::Mutex::new(room)));

        tracing::info!(game_id = %game_id, first = %waiting.name, second = %req.player_name, "Quick match paired.");
        return Ok(Json(QuickMatchResponse {
            matched: true,
            waiting: false,
            game_id: Some(game_id),
            player_number: Some(2),
            opponent_name: Some(waiting.name),
        }));
    }

    queue.push_back(QueueEntry {
        name: req.player_name.clone(),
        enqueued_at: Instant::now(),
    });
    tracing::info!(player_name = %req.player_name, "Enqueued for quick match.");
    Ok(Json(QuickMatchResponse {
        matched: false,
        waiting: true,
        game_id: None,
        player_number: None,
        opponent_name: None,
    }))
}

// ---------------------------------------------------------------------
// cancel_quick_match
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CancelQuickMatchRequest {
    pub player_name: String,
}

#[derive(Debug, Serialize)]
pub struct CancelQuickMatchResponse {
    pub cancelled: bool,
}

pub async fn cancel_quick_match(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CancelQuickMatchRequest>,
) -> AppResult<CancelQuickMatchResponse> {
    let mut queue = state.queue.lock().await;
    let before = queue.len();
    queue.retain(|entry| entry.name != req.player_name);
    Ok(Json(CancelQuickMatchResponse {
        cancelled: queue.len() < before,
    }))
}

// ---------------------------------------------------------------------
// check_quick_match
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CheckQuickMatchRequest {
    pub player_name: String,
}

#[derive(Debug, Serialize)]
pub struct CheckQuickMatchResponse {
    pub matched: bool,
    pub waiting: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_number: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent_name: Option<String>,
}

pub async fn check_quick_match(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckQuickMatchRequest>,
) -> AppResult<CheckQuickMatchResponse> {
    if state.queue.lock().await.iter().any(|entry| entry.name == req.player_name) {
        return Ok(Json(CheckQuickMatchResponse {
            matched: false,
            waiting: true,
            game_id: None,
            player_number: None,
            opponent_name: None,
        }));
    }

    let rooms = state.rooms.read().await;
    for (id, handle) in rooms.iter() {
        let room = handle.lock().await;
        if !room.is_quick_match || room.phase == Phase::Over {
            continue;
        }
        if let Some(slot) = room.find_by_name(&req.player_name) {
            let opponent_name = room.slot(slot.other()).map(|s| s.name.clone());
            return Ok(Json(CheckQuickMatchResponse {
                matched: true,
                waiting: false,
                game_id: Some(id.clone()),
                player_number: Some(slot.number()),
                opponent_name,
            }));
        }
    }

    Ok(Json(CheckQuickMatchResponse {
        matched: false,
        waiting: false,
        game_id: None,
        player_number: None,
        opponent_name: None,
    }))
}

// ---------------------------------------------------------------------
// quick_matches (list)
// ---------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct MatchSummary {
    pub game_id: String,
    pub player1_name: Option<String>,
    pub player2_name: Option<String>,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ListMatchesResponse {
    pub matches: Vec<MatchSummary>,
}

pub async fn quick_matches(State(state): State<Arc<AppState>>) -> AppResult<ListMatchesResponse> {
    let rooms = state.rooms.read().await;
    let mut matches = Vec::new();
    for (id, handle) in rooms.iter() {
        let room = handle.lock().await;
        if !room.is_quick_match || room.phase == Phase::Over {
            continue;
        }
        matches.push(MatchSummary {
            game_id: id.clone(),
            player1_name: room.slot(Slot::One).map(|s| s.name.clone()),
            player2_name: room.slot(Slot::Two).map(|s| s.name.clone()),
            status: snapshot::phase_str(room.phase),
        });
    }
    Ok(Json(ListMatchesResponse { matches }))
}

// ---------------------------------------------------------------------
// spectate
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SpectateRequest {
    pub game_id: String,
}

#[derive(Debug, Serialize)]
pub struct SpectateResponse {
    pub success: bool,
    pub game_id: String,
}

pub async fn spectate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SpectateRequest>,
) -> AppResult<SpectateResponse> {
    let room_handle = find_room(&state, &req.game_id).await?;
    let room = room_handle.lock().await;

    if !room.is_quick_match || room.phase == Phase::Over {
        return Err(CoordinatorError::Forbidden("room is not spectatable".to_string()));
    }

    Ok(Json(SpectateResponse {
        success: true,
        game_id: req.game_id,
    }))
}
