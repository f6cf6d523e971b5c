mod common;

use common::{default_fleet, default_fleet_cells, spawn_server};
use session_coordinator::config::Config;

#[tokio::test]
async fn happy_path_private_match_has_exactly_seventeen_winning_hits() {
    let base = spawn_server(Config::default()).await;
    let client = reqwest::Client::new();

    let host: serde_json::Value = client
        .post(format!("{base}/api/host"))
        .json(&serde_json::json!({"player_name": "Alice"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let game_id = host["game_id"].as_str().unwrap().to_string();
    assert_eq!(host["player_number"], 1);

    let join: serde_json::Value = client
        .post(format!("{base}/api/join"))
        .json(&serde_json::json!({"player_name": "Bob", "game_id": game_id}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(join["player_number"], 2);

    for player_number in [1, 2] {
        let resp = client
            .post(format!("{base}/api/place_ships"))
            .json(&serde_json::json!({
                "game_id": game_id,
                "player_number": player_number,
                "ships": default_fleet(),
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    let cells = default_fleet_cells();
    assert_eq!(cells.len(), 17);

    for (i, (row, col)) in cells.iter().enumerate() {
        let resp: serde_json::Value = client
            .post(format!("{base}/api/attack"))
            .json(&serde_json::json!({"game_id": game_id, "player_number": 1, "row": row, "col": col}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        let is_last = i == cells.len() - 1;
        if is_last {
            assert_eq!(resp["result"], "sunk PatrolBoat");
        } else {
            assert!(resp["result"] == "hit" || resp["result"].as_str().unwrap().starts_with("sunk"));
        }

        if !is_last {
            // Bob's turn: attack a cell far from Alice's fleet, always a miss.
            let bob_resp: serde_json::Value = client
                .post(format!("{base}/api/attack"))
                .json(&serde_json::json!({"game_id": game_id, "player_number": 2, "row": 9, "col": 9}))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            assert!(bob_resp["result"] == "miss" || bob_resp["result"] == "already");
        }
    }

    let state: serde_json::Value = client
        .get(format!("{base}/api/gamestate?game_id={game_id}&player_number=1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(state["game_over"], true);
    assert_eq!(state["winner"], "Alice");
}

#[tokio::test]
async fn turn_swaps_on_every_resolved_attack_hit_or_miss() {
    let base = spawn_server(Config::default()).await;
    let client = reqwest::Client::new();

    let host: serde_json::Value = client
        .post(format!("{base}/api/host"))
        .json(&serde_json::json!({"player_name": "Alice"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let game_id = host["game_id"].as_str().unwrap().to_string();

    client
        .post(format!("{base}/api/join"))
        .json(&serde_json::json!({"player_name": "Bob", "game_id": game_id}))
        .send()
        .await
        .unwrap();

    for player_number in [1, 2] {
        client
            .post(format!("{base}/api/place_ships"))
            .json(&serde_json::json!({
                "game_id": game_id,
                "player_number": player_number,
                "ships": default_fleet(),
            }))
            .send()
            .await
            .unwrap();
    }

    let hit: serde_json::Value = client
        .post(format!("{base}/api/attack"))
        .json(&serde_json::json!({"game_id": game_id, "player_number": 1, "row": 0, "col": 0}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(hit["result"], "hit");

    // It's now Bob's turn; Alice attacking again must be rejected.
    let rejected = client
        .post(format!("{base}/api/attack"))
        .json(&serde_json::json!({"game_id": game_id, "player_number": 1, "row": 9, "col": 9}))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), 403);

    let bob_miss: serde_json::Value = client
        .post(format!("{base}/api/attack"))
        .json(&serde_json::json!({"game_id": game_id, "player_number": 2, "row": 9, "col": 9}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(bob_miss["result"], "miss");

    let alice_state: serde_json::Value = client
        .get(format!("{base}/api/gamestate?game_id={game_id}&player_number=1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(alice_state["your_turn"], true);

    let bob_state: serde_json::Value = client
        .get(format!("{base}/api/gamestate?game_id={game_id}&player_number=2"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(bob_state["your_turn"], false);
}

#[tokio::test]
async fn opponent_board_never_leaks_ship_markers() {
    let base = spawn_server(Config::default()).await;
    let client = reqwest::Client::new();

    let host: serde_json::Value = client
        .post(format!("{base}/api/host"))
        .json(&serde_json::json!({"player_name": "Alice"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let game_id = host["game_id"].as_str().unwrap().to_string();

    client
        .post(format!("{base}/api/join"))
        .json(&serde_json::json!({"player_name": "Bob", "game_id": game_id}))
        .send()
        .await
        .unwrap();

    for player_number in [1, 2] {
        client
            .post(format!("{base}/api/place_ships"))
            .json(&serde_json::json!({
                "game_id": game_id,
                "player_number": player_number,
                "ships": default_fleet(),
            }))
            .send()
            .await
            .unwrap();
    }

    client
        .post(format!("{base}/api/attack"))
        .json(&serde_json::json!({"game_id": game_id, "player_number": 1, "row": 0, "col": 0}))
        .send()
        .await
        .unwrap();

    let alice_state: serde_json::Value = client
        .get(format!("{base}/api/gamestate?game_id={game_id}&player_number=1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    for row in alice_state["opponent_board"].as_array().unwrap() {
        for cell in row.as_array().unwrap() {
            let cell = cell.as_str().unwrap();
            assert!(cell == "." || cell == "X" || cell == "O", "leaked cell: {cell}");
        }
    }
}

#[tokio::test]
async fn pause_and_resume_within_reconnect_window() {
    let mut config = Config::default();
    config.inactivity_timeout_secs = 1;
    config.reconnect_window_secs = 5;
    let base = spawn_server(config).await;
    let client = reqwest::Client::new();

    let host: serde_json::Value = client
        .post(format!("{base}/api/host"))
        .json(&serde_json::json!({"player_name": "Alice"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let game_id = host["game_id"].as_str().unwrap().to_string();

    client
        .post(format!("{base}/api/join"))
        .json(&serde_json::json!({"player_name": "Bob", "game_id": game_id}))
        .send()
        .await
        .unwrap();

    for player_number in [1, 2] {
        client
            .post(format!("{base}/api/place_ships"))
            .json(&serde_json::json!({
                "game_id": game_id,
                "player_number": player_number,
                "ships": default_fleet(),
            }))
            .send()
            .await
            .unwrap();
    }

    // Alice keeps polling to stay active; Bob goes silent.
    for _ in 0..4 {
        tokio::time::sleep(std::time::Duration::from_millis(600)).await;
        client
            .get(format!("{base}/api/gamestate?game_id={game_id}&player_number=1"))
            .send()
            .await
            .unwrap();
    }

    let alice_state: serde_json::Value = client
        .get(format!("{base}/api/gamestate?game_id={game_id}&player_number=1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(alice_state["opponent_connected"], false);
    assert_eq!(alice_state["game_phase"], "paused");

    let rejoin: serde_json::Value = client
        .post(format!("{base}/api/join"))
        .json(&serde_json::json!({"player_name": "Bob", "game_id": game_id}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(rejoin["reconnected"], true);

    let resumed: serde_json::Value = client
        .get(format!("{base}/api/gamestate?game_id={game_id}&player_number=1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resumed["game_phase"], "playing");
}

#[tokio::test]
async fn pause_expiry_ends_game_and_terminal_grace_reaps_the_room() {
    let mut config = Config::default();
    config.inactivity_timeout_secs = 1;
    config.reconnect_window_secs = 1;
    config.terminal_grace_secs = 1;
    let base = spawn_server(config).await;
    let client = reqwest::Client::new();

    let host: serde_json::Value = client
        .post(format!("{base}/api/host"))
        .json(&serde_json::json!({"player_name": "Alice"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let game_id = host["game_id"].as_str().unwrap().to_string();

    client
        .post(format!("{base}/api/join"))
        .json(&serde_json::json!({"player_name": "Bob", "game_id": game_id}))
        .send()
        .await
        .unwrap();

    for player_number in [1, 2] {
        client
            .post(format!("{base}/api/place_ships"))
            .json(&serde_json::json!({
                "game_id": game_id,
                "player_number": player_number,
                "ships": default_fleet(),
            }))
            .send()
            .await
            .unwrap();
    }

    // Neither player polls; both go inactive, but only the first offender
    // pauses the room. Wait past inactivity + reconnect window, with margin
    // for the housekeeper's ~1s sweep granularity.
    tokio::time::sleep(std::time::Duration::from_millis(4500)).await;

    let over_state: serde_json::Value = client
        .get(format!("{base}/api/gamestate?game_id={game_id}&player_number=1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(over_state["game_phase"], "game_over");

    tokio::time::sleep(std::time::Duration::from_millis(2500)).await;

    let resp = client
        .get(format!("{base}/api/gamestate?game_id={game_id}&player_number=1"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn quick_match_pairs_two_waiting_players() {
    let base = spawn_server(Config::default()).await;
    let client = reqwest::Client::new();

    let carol: serde_json::Value = client
        .post(format!("{base}/api/quick_match"))
        .json(&serde_json::json!({"player_name": "Carol"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(carol["waiting"], true);
    assert_eq!(carol["matched"], false);

    let dave: serde_json::Value = client
        .post(format!("{base}/api/quick_match"))
        .json(&serde_json::json!({"player_name": "Dave"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(dave["matched"], true);
    assert_eq!(dave["player_number"], 2);
    assert_eq!(dave["opponent_name"], "Carol");
    let game_id = dave["game_id"].as_str().unwrap().to_string();

    let carol_check: serde_json::Value = client
        .post(format!("{base}/api/check_quick_match"))
        .json(&serde_json::json!({"player_name": "Carol"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(carol_check["matched"], true);
    assert_eq!(carol_check["player_number"], 1);
    assert_eq!(carol_check["game_id"], game_id);

    let listed: serde_json::Value = client
        .get(format!("{base}/api/quick_matches"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let matches = listed["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["game_id"], game_id);
    assert_eq!(matches[0]["status"], "placing_ships");
}

#[tokio::test]
async fn quick_match_rejects_a_name_already_seated_in_a_live_room() {
    let base = spawn_server(Config::default()).await;
    let client = reqwest::Client::new();

    client
        .post(format!("{base}/api/quick_match"))
        .json(&serde_json::json!({"player_name": "Frank"}))
        .send()
        .await
        .unwrap();
    client
        .post(format!("{base}/api/quick_match"))
        .json(&serde_json::json!({"player_name": "Grace"}))
        .send()
        .await
        .unwrap();

    // Frank is now seated (phase=placing) in a live quick-match room; a
    // second quick_match call for the same name must not re-enqueue or pair
    // him into a second room.
    let resp = client
        .post(format!("{base}/api/quick_match"))
        .json(&serde_json::json!({"player_name": "Frank"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let check: serde_json::Value = client
        .post(format!("{base}/api/check_quick_match"))
        .json(&serde_json::json!({"player_name": "Frank"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(check["matched"], true);

    let listed: serde_json::Value = client
        .get(format!("{base}/api/quick_matches"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed["matches"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn cancel_quick_match_is_idempotent() {
    let base = spawn_server(Config::default()).await;
    let client = reqwest::Client::new();

    client
        .post(format!("{base}/api/quick_match"))
        .json(&serde_json::json!({"player_name": "Erin"}))
        .send()
        .await
        .unwrap();

    let first: serde_json::Value = client
        .post(format!("{base}/api/cancel_quick_match"))
        .json(&serde_json::json!({"player_name": "Erin"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first["cancelled"], true);

    let second: serde_json::Value = client
        .post(format!("{base}/api/cancel_quick_match"))
        .json(&serde_json::json!({"player_name": "Erin"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(second["cancelled"], false);
}
