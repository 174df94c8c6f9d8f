//! 浏览器环境下的边界层测试（wasm-pack test 运行）。

#![cfg(target_arch = "wasm32")]

use fungame_core::{MemoryGame, ScoreCounter, ROUND_SECONDS};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn seeded_game_resets_into_playing_round() {
    let mut game = MemoryGame::seeded(7);
    game.reset().expect("reset should produce a resolution");

    assert_eq!(game.seconds_remaining(), ROUND_SECONDS);
    assert_eq!(game.score(), 0);
    assert!(!game.is_over());
}

#[wasm_bindgen_test]
fn flip_marks_the_slot_revealed() {
    let mut game = MemoryGame::seeded(7);
    game.reset().expect("reset should succeed");

    game.flip(0).expect("flip in range should succeed");
    assert!(game.is_revealed(0));
    assert!(!game.is_revealed(1));
}

#[wasm_bindgen_test]
fn out_of_board_flip_is_rejected() {
    let mut game = MemoryGame::seeded(7);
    game.reset().expect("reset should succeed");

    assert!(game.flip(12).is_err(), "positions beyond the board are misuse");
}

#[wasm_bindgen_test]
fn state_round_trips_through_json() {
    let mut game = MemoryGame::seeded(7);
    game.reset().expect("reset should succeed");

    let json = game.state_json().expect("state should serialize");
    game.set_state_json(&json)
        .expect("a snapshot of a live round must pass validation");
}

#[wasm_bindgen_test]
fn counter_tracks_taps() {
    let mut counter = ScoreCounter::new();
    assert_eq!(counter.tap(), 1);
    assert_eq!(counter.tap(), 2);
    counter.reset();
    assert_eq!(counter.taps(), 0);
}
