//! Worked scenarios: reachability, the victory lock, penalty losers.

use run_run_rabbit::board::{BoardState, Cell, Grid};
use run_run_rabbit::core::{LoadedDice, MatchConfig, MatchError, PlayerId, Role};
use run_run_rabbit::game::{Input, Match, MatchEvent};
use run_run_rabbit::movement::{reachable, Mover, Occupancy};
use run_run_rabbit::rules::{MatchOutcome, ScoreReason, Scoreboard};
use run_run_rabbit::turns::{low_roll, LowRollResult, TurnPhase};

fn open_board() -> BoardState {
    BoardState::with_impassable(Grid::new(8), [])
}

/// Roll 3 plus the rabbit's bonus from the top-left corner.
#[test]
fn test_scenario_a_four_steps_from_corner() {
    let board = open_board();
    let rabbit = PlayerId::new(0);
    let occupancy = Occupancy::new(Cell::new(7, 7), [(rabbit, Cell::new(0, 0))]);

    let cells = reachable(Cell::new(0, 0), 3 + 1, &board, &occupancy, Mover::Evader(rabbit));
    let expected = [(0, 2), (1, 1), (2, 0), (0, 4), (1, 3), (2, 2), (3, 1), (4, 0)];
    assert_eq!(cells.len(), expected.len());
    for (row, col) in expected {
        assert!(cells.contains(&Cell::new(row, col)), "missing ({row}, {col})");
    }
    assert!(!cells.contains(&Cell::new(7, 7)));
}

/// With the wolf in the gap next to the rabbit, the cell beyond it is only
/// reachable by a detour.
#[test]
fn test_scenario_a_no_squeezing_past_the_wolf() {
    let board = BoardState::with_impassable(Grid::new(8), [Cell::new(1, 1)]);
    let rabbit = PlayerId::new(0);
    let occupancy = Occupancy::new(Cell::new(0, 1), [(rabbit, Cell::new(0, 0))]);

    let cells = reachable(Cell::new(0, 0), 4, &board, &occupancy, Mover::Evader(rabbit));
    assert!(!cells.contains(&Cell::new(0, 1)));
    assert!(!cells.contains(&Cell::new(0, 2)));
    assert!(cells.contains(&Cell::new(2, 2)));
    assert!(cells.contains(&Cell::new(4, 0)));

    // Six steps is enough to walk round.
    let cells = reachable(Cell::new(0, 0), 6, &board, &occupancy, Mover::Evader(rabbit));
    assert!(cells.contains(&Cell::new(0, 2)));
}

#[test]
fn test_scenario_b_victory_locks_scores() {
    let rabbit = PlayerId::new(0);
    let wolf = PlayerId::new(1);
    let mut scores = Scoreboard::new(2, 5);

    scores.award(wolf, ScoreReason::Capture).unwrap();
    for _ in 0..4 {
        assert_eq!(scores.award(rabbit, ScoreReason::Goal).unwrap(), None);
    }
    let outcome = scores.award(rabbit, ScoreReason::Goal).unwrap();
    assert_eq!(outcome, Some(MatchOutcome::Winner { player: rabbit, points: 5 }));

    // Locked: nothing else moves.
    assert_eq!(scores.award(wolf, ScoreReason::Capture), Err(MatchError::MatchOver));
    assert_eq!(scores.award(rabbit, ScoreReason::Goal), Err(MatchError::MatchOver));
    assert_eq!(scores.score(rabbit), 5);
    assert_eq!(scores.score(wolf), 1);
}

#[test]
fn test_scenario_c_lowest_roll_answers() {
    // Seat order is the rabbits, then the wolf.
    let (a, b, c, wolf) = (PlayerId::new(0), PlayerId::new(1), PlayerId::new(2), PlayerId::new(3));

    let result = low_roll(&[(wolf, 2), (a, 5), (b, 5), (c, 3)]);
    assert_eq!(result, LowRollResult::Losers([wolf].into_iter().collect()));

    let result = low_roll(&[(wolf, 4), (a, 2), (b, 2), (c, 6)]);
    assert_eq!(result, LowRollResult::Losers([a, b].into_iter().collect()));

    assert_eq!(low_roll(&[(wolf, 3), (a, 3), (b, 3), (c, 3)]), LowRollResult::Reroll);
}

/// Scenario C played through a match: the human wolf triggers the roll and
/// ends up answering.
#[test]
fn test_scenario_c_in_a_match() {
    // Opening roll, wolf's roll, three rabbit rolls, then the penalty roll
    // in seat order [Red, Blue, Black, Wolf].
    let script = [6, 5, 4, 3, 1, 1, 1, 1, 5, 5, 3, 2];
    let config = MatchConfig::new(4).with_human(Role::Chaser);
    let mut game = Match::with_parts(config, open_board(), Box::new(LoadedDice::new(script, 11))).unwrap();
    let wolf = game.state().roster.chaser();

    game.handle(Input::StartMatch);
    game.handle(Input::RollDice);
    game.handle(Input::CellClicked(Cell::new(6, 7)));
    game.advance_time(60_000);
    assert_eq!(game.state().phase, TurnPhase::PenaltySelection);

    let events = game.handle(Input::RollDice);
    assert!(events.contains(&MatchEvent::PenaltyRolls {
        rolls: vec![(PlayerId::new(0), 5), (PlayerId::new(1), 5), (PlayerId::new(2), 3), (wolf, 2)],
        losers: vec![wolf],
    }));
    assert!(events
        .iter()
        .any(|e| matches!(e, MatchEvent::QuestionPresented { player, .. } if *player == wolf)));
    assert_eq!(game.state().phase, TurnPhase::PenaltyResolution);
}
