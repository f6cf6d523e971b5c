//! The background sweep described in spec §4.2.5: turn timeouts, inactivity
//! detection, pause expiry and terminal-room reaping. Runs on its own task,
//! independent of any request, at roughly 1 Hz.

use std::sync::Arc;
use std::time::Instant;

use tokio::time::{interval, Duration};

use crate::model::{AppState, Phase};

pub async fn run(state: Arc<AppState>) {
    let mut ticker = interval(Duration::from_secs(1));
    loop {
        ticker.tick().await;
        sweep(&state).await;
    }
}

async fn sweep(state: &AppState) {
    let now = Instant::now();
    let room_ids: Vec<String> = state.rooms.read().await.keys().cloned().collect();
    let mut reaped = Vec::new();

    for id in room_ids {
        let handle = match state.rooms.read().await.get(&id).cloned() {
            Some(handle) => handle,
            None => continue,
        };
        let mut room = handle.lock().await;

        if room.phase == Phase::Playing {
            if now.saturating_duration_since(room.turn_start) > state.config.turn_timeout() {
                if let Some(turn) = room.turn {
                    room.turn = Some(turn.other());
                    room.turn_start = now;
                    tracing::info!(game_id = %room.id, "Turn timed out, swapping turn.");
                }
            }
        }

        if room.phase == Phase::Playing {
            let stale_slot = [crate::model::Slot::One, crate::model::Slot::Two]
                .into_iter()
                .find(|&slot| {
                    room.slot(slot)
                        .is_some_and(|s| s.connected && now.saturating_duration_since(s.last_activity) > state.config.inactivity_timeout())
                });
            if let Some(slot) = stale_slot {
                if let Some(slot_state) = room.slot_mut(slot) {
                    slot_state.connected = false;
                }
                room.phase = Phase::Paused;
                room.pause_start = Some(now);
                room.disconnected_slot = Some(slot);
                room.status_message = "Game Paused. Waiting for the other player to reconnect.".to_string();
                tracing::info!(game_id = %room.id, slot = slot.number(), "Player went inactive, pausing room.");
            }
        }

        if room.phase == Phase::Paused {
            if let Some(pause_start) = room.pause_start {
                if now.saturating_duration_since(pause_start) > state.config.reconnect_window() {
                    let winner = room
                        .disconnected_slot
                        .map(|slot| slot.other())
                        .and_then(|slot| room.slot(slot))
                        .map(|s| s.name.clone());
                    room.phase = Phase::Over;
                    room.winner = winner.clone();
                    room.game_end = Some(now);
                    room.status_message = winner
                        .map(|name| format!("{} wins! Opponent did not reconnect in time.", name))
                        .unwrap_or_else(|| "Game over.".to_string());
                    tracing::info!(game_id = %room.id, winner = ?room.winner, "Reconnect window elapsed.");
                }
            }
        }

        if room.phase == Phase::Over {
            if let Some(game_end) = room.game_end {
                if now.saturating_duration_since(game_end) > state.config.terminal_grace() {
                    reaped.push(id.clone());
                }
            }
        }
    }

    if !reaped.is_empty() {
        let mut rooms = state.rooms.write().await;
        for id in &reaped {
            rooms.remove(id);
            tracing::info!(game_id = %id, "Room reaped.");
        }
    }

    let mut queue = state.queue.lock().await;
    let before = queue.len();
    queue.retain(|entry| now.saturating_duration_since(entry.enqueued_at) <= state.config.quick_match_timeout());
    if queue.len() < before {
        tracing::info!(dropped = before - queue.len(), "Dropped stale quick-match queue entries.");
    }
}
