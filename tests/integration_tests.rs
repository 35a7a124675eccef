//! Protocol-level tests for threat-brain.
//!
//! Each test drives an [`Engine`] line by line, as a tournament manager
//! would, and inspects the captured response lines and the board.

use std::io::Cursor;
use std::time::Duration;

use threat_brain::board::{Cell, Point};
use threat_brain::constants::MAX_BOARD;
use threat_brain::genome::Genome;
use threat_brain::output::{Captured, Output};
use threat_brain::protocol::{Engine, EngineOptions, EngineState, Flow};
use threat_brain::threat::{Evaluator, Strategy};

// =============================================================================
// Helper functions
// =============================================================================

fn engine_with(evaluator: Evaluator, options: EngineOptions) -> (Engine, Captured) {
    let (out, captured) = Output::capture();
    (Engine::new(evaluator, options, out).unwrap(), captured)
}

fn engine() -> (Engine, Captured) {
    engine_with(
        Evaluator::default(),
        EngineOptions {
            seed: Some(5),
            ..EngineOptions::default()
        },
    )
}

/// Send lines, let any computation finish, and return the responses.
fn send(engine: &mut Engine, captured: &Captured, lines: &[&str]) -> Vec<String> {
    for line in lines {
        engine.handle_line(line).unwrap();
    }
    engine.settle();
    captured.take_lines()
}

fn parse_move(line: &str) -> Point {
    let (x, y) = line
        .split_once(',')
        .unwrap_or_else(|| panic!("not a move: {line:?}"));
    Point::new(x.parse().unwrap(), y.parse().unwrap())
}

// =============================================================================
// Match setup
// =============================================================================

#[test]
fn test_start_then_turn_commits_a_move() {
    let (mut engine, captured) = engine();
    assert_eq!(send(&mut engine, &captured, &["START 20"]), ["OK"]);

    let lines = send(&mut engine, &captured, &["TURN 10,10"]);
    assert_eq!(lines.len(), 1, "{lines:?}");
    let p = parse_move(&lines[0]);
    assert!(p.x < 20 && p.y < 20);
    assert_ne!(p, Point::new(10, 10));
    assert_eq!(engine.board().get(p), Some(Cell::Mine));
    assert_eq!(engine.board().get(Point::new(10, 10)), Some(Cell::Opponent));
    assert_eq!(engine.state(), EngineState::Idle);
}

#[test]
fn test_rectstart_too_narrow_stays_uninitialized() {
    let (mut engine, captured) = engine();
    let lines = send(&mut engine, &captured, &["RECTSTART 4,20"]);
    assert_eq!(lines, ["ERROR bad RECTSTART parameters"]);
    assert_eq!(engine.state(), EngineState::Uninitialized);
}

#[test]
fn test_rectstart_sets_rectangle() {
    let (mut engine, captured) = engine();
    assert_eq!(send(&mut engine, &captured, &["RECTSTART 30,12"]), ["OK"]);
    assert_eq!((engine.board().width(), engine.board().height()), (30, 12));
    assert_eq!(send(&mut engine, &captured, &["BEGIN"]), ["15,6"]);
}

#[test]
fn test_rectstart_malformed() {
    let (mut engine, captured) = engine();
    assert_eq!(
        send(&mut engine, &captured, &["RECTSTART 20"]),
        ["ERROR bad RECTSTART parameters"]
    );
    assert_eq!(engine.state(), EngineState::Uninitialized);
}

#[test]
fn test_start_too_small_invalidates_previous_board() {
    let (mut engine, captured) = engine();
    send(&mut engine, &captured, &["START 20"]);
    let lines = send(&mut engine, &captured, &["START 4"]);
    assert_eq!(lines, ["ERROR bad START parameter"]);
    assert_eq!(engine.state(), EngineState::Uninitialized);
}

#[test]
fn test_start_too_large() {
    let (mut engine, captured) = engine();
    let lines = send(&mut engine, &captured, &["START 1000"]);
    assert!(lines[0].starts_with("ERROR Maximal board size is"), "{lines:?}");
    assert_eq!(engine.state(), EngineState::Uninitialized);
}

#[test]
fn test_begin_on_empty_board_plays_center() {
    for _ in 0..10 {
        let (mut engine, captured) = engine_with(Evaluator::default(), EngineOptions::default());
        send(&mut engine, &captured, &["START 20"]);
        assert_eq!(send(&mut engine, &captured, &["BEGIN"]), ["10,10"]);
        assert_eq!(engine.board().get(Point::new(10, 10)), Some(Cell::Mine));
    }
}

#[test]
fn test_commands_are_case_insensitive() {
    let (mut engine, captured) = engine();
    assert_eq!(send(&mut engine, &captured, &["start 15"]), ["OK"]);
    assert_eq!(send(&mut engine, &captured, &["play 1,1"]), ["1,1"]);
    let lines = send(&mut engine, &captured, &["tUrN 7,7"]);
    assert_eq!(lines.len(), 1);
    parse_move(&lines[0]);
}

#[test]
fn test_restart_clears_board() {
    let (mut engine, captured) = engine();
    send(&mut engine, &captured, &["START 20", "TURN 5,5"]);
    assert_eq!(engine.board().stones(), 2);
    assert_eq!(send(&mut engine, &captured, &["RESTART"]), ["OK"]);
    assert_eq!(engine.board().stones(), 0);
    assert_eq!(engine.state(), EngineState::Idle);
}

#[test]
fn test_turn_without_start_assumes_default_board() {
    let (mut engine, captured) = engine();
    let lines = send(&mut engine, &captured, &["TURN 3,3"]);
    assert_eq!(lines.len(), 1);
    parse_move(&lines[0]);
    assert_eq!(engine.board().width(), 20);
    assert_eq!(engine.state(), EngineState::Idle);
}

// =============================================================================
// Moves and corrections
// =============================================================================

#[test]
fn test_play_echoes_and_places() {
    let (mut engine, captured) = engine();
    send(&mut engine, &captured, &["START 20"]);
    assert_eq!(send(&mut engine, &captured, &["PLAY 4,9"]), ["4,9"]);
    assert_eq!(engine.board().get(Point::new(4, 9)), Some(Cell::Mine));
    assert_eq!(engine.state(), EngineState::Idle);

    let lines = send(&mut engine, &captured, &["PLAY 4,9"]);
    assert_eq!(lines, ["ERROR my move 4,9 is already occupied"]);
}

#[test]
fn test_bad_coordinates_leave_board_unchanged() {
    let (mut engine, captured) = engine();
    send(&mut engine, &captured, &["START 20"]);
    for bad in ["TURN 10", "TURN a,b", "TURN 20,3", "TURN 1,2,3", "TURN -1,4", "TURN"] {
        assert_eq!(
            send(&mut engine, &captured, &[bad]),
            ["ERROR bad coordinates"],
            "{bad}"
        );
        assert_eq!(engine.board().stones(), 0);
        assert_eq!(engine.state(), EngineState::Idle);
    }
}

#[test]
fn test_turn_on_occupied_cell_reports_and_still_moves() {
    let (mut engine, captured) = engine();
    send(&mut engine, &captured, &["START 20", "PLAY 5,5"]);
    let lines = send(&mut engine, &captured, &["TURN 5,5"]);
    assert_eq!(lines.len(), 2, "{lines:?}");
    assert_eq!(lines[0], "ERROR opponent's move 5,5 is already occupied");
    let p = parse_move(&lines[1]);
    assert_eq!(engine.board().get(p), Some(Cell::Mine));
    assert_eq!(engine.board().get(Point::new(5, 5)), Some(Cell::Mine));
}

#[test]
fn test_takeback_twice() {
    let (mut engine, captured) = engine();
    send(&mut engine, &captured, &["START 20", "PLAY 3,3"]);
    assert_eq!(send(&mut engine, &captured, &["TAKEBACK 3,3"]), ["OK"]);
    assert!(engine.board().is_free(Point::new(3, 3)));
    let lines = send(&mut engine, &captured, &["TAKEBACK 3,3"]);
    assert_eq!(lines, ["ERROR 3,3 is empty"]);
    assert_eq!(
        send(&mut engine, &captured, &["TAKEBACK 30,3"]),
        ["ERROR bad coordinates"]
    );
}

#[test]
fn test_takeback_of_engine_move() {
    let (mut engine, captured) = engine();
    send(&mut engine, &captured, &["START 20"]);
    let lines = send(&mut engine, &captured, &["TURN 10,10"]);
    let takeback = format!("TAKEBACK {}", lines[0]);
    assert_eq!(
        send(&mut engine, &captured, &[takeback.as_str(), "TAKEBACK 10,10"]),
        ["OK", "OK"]
    );
    assert_eq!(engine.board().stones(), 0);
}

// =============================================================================
// BOARD loading
// =============================================================================

#[test]
fn test_board_block_loads_position_and_moves() {
    let (mut engine, captured) = engine();
    send(&mut engine, &captured, &["START 20"]);
    let lines = send(
        &mut engine,
        &captured,
        &["BOARD", "6,10,1", "7,10,1", "8,10,1", "9,10,1", "5,10,2", "0,0,3", "DONE"],
    );
    // Completing the five is the only winning move.
    assert_eq!(lines, ["10,10"]);
    assert_eq!(engine.board().get(Point::new(5, 10)), Some(Cell::Opponent));
    assert_eq!(engine.board().get(Point::new(0, 0)), Some(Cell::WinningBlock));
    assert_eq!(engine.board().get(Point::new(10, 10)), Some(Cell::Mine));
}

#[test]
fn test_board_block_replaces_previous_position() {
    let (mut engine, captured) = engine();
    send(&mut engine, &captured, &["START 20", "PLAY 1,1"]);
    send(&mut engine, &captured, &["BOARD", "10,10,2", "done"]);
    assert!(engine.board().is_free(Point::new(1, 1)));
    assert_eq!(engine.board().stones(), 2);
}

#[test]
fn test_board_block_bad_line_ends_loading() {
    let (mut engine, captured) = engine();
    send(&mut engine, &captured, &["START 20"]);
    let lines = send(&mut engine, &captured, &["BOARD", "10,10,2", "garbage"]);
    assert_eq!(lines.len(), 2, "{lines:?}");
    assert_eq!(lines[0], "ERROR x,y,who or DONE expected after BOARD");
    parse_move(&lines[1]);
    // The next line is a normal command again.
    assert_eq!(send(&mut engine, &captured, &["RESTART"]), ["OK"]);
}

#[test]
fn test_board_block_reports_bad_placements() {
    let (mut engine, captured) = engine();
    send(&mut engine, &captured, &["START 20"]);
    let lines = send(
        &mut engine,
        &captured,
        &["BOARD", "10,10,2", "10,10,1", "25,25,2", "3,3,7", "DONE"],
    );
    assert_eq!(lines[0], "ERROR my move 10,10 is already occupied");
    assert_eq!(lines[1], "ERROR opponent's move 25,25 is outside the board");
    assert_eq!(lines.len(), 3, "{lines:?}");
    assert!(engine.board().is_free(Point::new(3, 3)));
}

// =============================================================================
// INFO, ABOUT, unknown commands
// =============================================================================

#[test]
fn test_info_updates_config_silently() {
    let (mut engine, captured) = engine();
    let lines = send(
        &mut engine,
        &captured,
        &[
            "INFO timeout_turn 5000",
            "INFO rule 2",
            "INFO folder /tmp/brain data",
            "INFO some_future_key 3",
        ],
    );
    assert!(lines.is_empty(), "{lines:?}");
    let config = engine.config();
    assert_eq!(config.timeout_turn.as_millis(), 5000);
    assert!(config.rules.continuous);
    assert_eq!(
        config.folder.as_deref(),
        Some(std::path::Path::new("/tmp/brain data"))
    );
}

#[test]
fn test_info_bad_value() {
    let (mut engine, captured) = engine();
    assert_eq!(
        send(&mut engine, &captured, &["INFO time_left soon"]),
        ["ERROR bad value for INFO time_left: soon"]
    );
}

#[test]
fn test_about() {
    let (mut engine, captured) = engine();
    let lines = send(&mut engine, &captured, &["ABOUT"]);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("name=\"pbrain-threat\""));
    assert!(lines[0].contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_unknown_command() {
    let (mut engine, captured) = engine();
    assert_eq!(
        send(&mut engine, &captured, &["SWAP2BOARD 1,2"]),
        ["UNKNOWN command SWAP2BOARD 1,2"]
    );
    assert_eq!(send(&mut engine, &captured, &["", "   "]), Vec::<String>::new());
}

#[test]
fn test_debug_evaluate() {
    let (mut engine, captured) = engine_with(
        Evaluator::default(),
        EngineOptions {
            debug_eval: true,
            ..EngineOptions::default()
        },
    );
    send(&mut engine, &captured, &["START 20"]);
    let lines = send(&mut engine, &captured, &["INFO evaluate 10,10"]);
    assert_eq!(lines, ["DEBUG 10,10 offense=64 defense=64 combined=64"]);
}

#[test]
fn test_debug_evaluate_after_engine_move() {
    let (mut engine, captured) = engine_with(
        Evaluator::default(),
        EngineOptions {
            debug_eval: true,
            seed: Some(3),
            ..EngineOptions::default()
        },
    );
    engine.handle_line("START 20").unwrap();
    engine.handle_line("TURN 10,10").unwrap();
    // Let the worker finish on its own; nothing collects its outcome yet.
    let mut lines = Vec::new();
    while lines.len() < 2 {
        std::thread::sleep(Duration::from_millis(5));
        lines.extend(captured.take_lines());
    }
    std::thread::sleep(Duration::from_millis(100));

    engine.handle_line("INFO evaluate 4,4").unwrap();
    assert_eq!(
        captured.take_lines(),
        ["DEBUG 4,4 offense=64 defense=64 combined=64"]
    );
    assert_eq!(engine.board().stones(), 2);
}

// =============================================================================
// Engine variants
// =============================================================================

#[test]
fn test_suggest_on_tie() {
    let (mut engine, captured) = engine_with(
        Evaluator::default(),
        EngineOptions {
            suggest_on_tie: true,
            ..EngineOptions::default()
        },
    );
    send(&mut engine, &captured, &["START 20"]);
    assert_eq!(send(&mut engine, &captured, &["BEGIN"]), ["SUGGEST 10,10"]);
    assert_eq!(engine.board().stones(), 0);
    assert_eq!(send(&mut engine, &captured, &["PLAY 10,10"]), ["10,10"]);
}

#[test]
fn test_lookahead_engine_blocks_open_four() {
    let (mut engine, captured) = engine_with(
        Evaluator::new(Genome::default(), Strategy::Lookahead),
        EngineOptions {
            seed: Some(9),
            ..EngineOptions::default()
        },
    );
    send(&mut engine, &captured, &["START 20"]);
    let lines = send(
        &mut engine,
        &captured,
        &["BOARD", "5,5,2", "6,5,2", "7,5,2", "8,5,2", "4,5,1", "12,12,1", "DONE"],
    );
    assert_eq!(lines, ["9,5"]);
}

#[test]
fn test_seeded_engines_agree() {
    let play = || {
        let (mut engine, captured) = engine();
        send(&mut engine, &captured, &["START 20"]);
        let mut moves = Vec::new();
        for turn in ["10,10", "3,17", "15,2"] {
            let command = format!("TURN {turn}");
            moves.extend(send(&mut engine, &captured, &[command.as_str()]));
        }
        moves
    };
    assert_eq!(play(), play());
}

// =============================================================================
// Shutdown and the command loop
// =============================================================================

#[test]
fn test_end_while_thinking() {
    let (mut engine, captured) = engine();
    let start = format!("START {MAX_BOARD}");
    send(&mut engine, &captured, &[start.as_str()]);
    engine.handle_line("BOARD").unwrap();
    for x in (0..MAX_BOARD).step_by(2) {
        engine.handle_line(&format!("{x},{},2", x / 2)).unwrap();
    }
    engine.handle_line("DONE").unwrap();
    assert_eq!(engine.handle_line("END").unwrap(), Flow::Exit);
    assert_eq!(engine.state(), EngineState::Shutdown);
    // Either the move made it out before the cancel or nothing did.
    assert!(captured.take_lines().len() <= 1);
}

#[test]
fn test_run_until_end() {
    let (mut engine, captured) = engine();
    let input = Cursor::new("START 20\nINFO timeout_turn 1000\nABOUT\nEND\nSTART 15\n");
    engine.run(input).unwrap();
    let lines = captured.take_lines();
    assert_eq!(lines.len(), 2, "{lines:?}");
    assert_eq!(lines[0], "OK");
    assert!(lines[1].starts_with("name="));
    assert_eq!(engine.state(), EngineState::Shutdown);
    // Nothing after END was processed.
    assert_eq!(engine.board().width(), 20);
}

#[test]
fn test_run_until_eof() {
    let (mut engine, captured) = engine();
    engine.run(Cursor::new("START 20\nPLAY 0,0\n")).unwrap();
    assert_eq!(captured.take_lines(), ["OK", "0,0"]);
    assert_eq!(engine.state(), EngineState::Shutdown);
}
