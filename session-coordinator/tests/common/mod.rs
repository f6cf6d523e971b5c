use std::sync::Arc;

use session_coordinator::config::Config;
use session_coordinator::model::AppState;
use session_coordinator::{build_router, housekeeper};

/// Spins up a real server on an ephemeral port and returns its base URL.
/// The server and its housekeeper run for the remainder of the test process.
pub async fn spawn_server(config: Config) -> String {
    let state = Arc::new(AppState::new(config));

    let keeper_state = state.clone();
    tokio::spawn(async move {
        housekeeper::run(keeper_state).await;
    });

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

pub fn default_fleet() -> serde_json::Value {
    serde_json::json!([
        {"name": "AircraftCarrier", "start_row": 0, "start_col": 0, "orientation": "H"},
        {"name": "Battleship", "start_row": 1, "start_col": 0, "orientation": "H"},
        {"name": "Cruiser", "start_row": 2, "start_col": 0, "orientation": "H"},
        {"name": "Submarine", "start_row": 3, "start_col": 0, "orientation": "H"},
        {"name": "PatrolBoat", "start_row": 4, "start_col": 0, "orientation": "H"},
    ])
}

/// Every occupied cell of `default_fleet`, in attack order, matching the
/// literal scenario: exactly 17 hits sink the whole fleet.
pub fn default_fleet_cells() -> Vec<(usize, usize)> {
    let mut cells = Vec::new();
    for row in 0..5usize {
        let len = match row {
            0 => 5,
            1 => 4,
            2 => 3,
            3 => 3,
            4 => 2,
            _ => unreachable!(),
        };
        for col in 0..len {
            cells.push((row, col));
        }
    }
    cells
}
