//! Action tokens, dialog callbacks and cancellation.

use run_run_rabbit::ai::{AiIntent, AiScheduler, ModalState};
use run_run_rabbit::board::{BoardState, Cell, Grid};
use run_run_rabbit::core::{LoadedDice, MatchConfig, PlayerId, Role};
use run_run_rabbit::game::{Input, Match, MatchEvent, PromptId};
use run_run_rabbit::turns::TurnPhase;

fn prompts(events: &[MatchEvent]) -> Vec<(PromptId, PlayerId)> {
    events
        .iter()
        .filter_map(|e| match e {
            MatchEvent::QuestionPresented { prompt, player, .. } => Some((*prompt, *player)),
            _ => None,
        })
        .collect()
}

fn count_dismissed(events: &[MatchEvent]) -> usize {
    events.iter().filter(|e| matches!(e, MatchEvent::QuestionDismissed { .. })).count()
}

/// Four players with a human wolf, played up to the penalty roll.
///
/// `penalty` is the low roll in seat order [Red, Blue, Black, Wolf].
fn wolf_at_penalty(penalty: [u8; 4]) -> Match {
    let mut script = vec![6, 5, 4, 3, 1, 1, 1, 1];
    script.extend(penalty);
    let config = MatchConfig::new(4).with_human(Role::Chaser);
    let board = BoardState::with_impassable(Grid::new(8), []);
    let mut game = Match::with_parts(config, board, Box::new(LoadedDice::new(script, 17))).unwrap();
    game.handle(Input::StartMatch);
    game.handle(Input::RollDice);
    game.handle(Input::CellClicked(Cell::new(6, 7)));
    game.advance_time(60_000);
    assert_eq!(game.state().phase, TurnPhase::PenaltySelection);
    game
}

#[test]
fn test_duplicate_close_does_not_skip_a_loser() {
    // Red and the wolf both rolled the 2.
    let mut game = wolf_at_penalty([2, 5, 5, 2]);
    let wolf = game.state().roster.chaser();
    let red = PlayerId::new(0);

    let events = game.handle(Input::RollDice);
    let (red_prompt, player) = prompts(&events)[0];
    assert_eq!(player, red);

    // The computer answers and dismisses on its own.
    game.handle(Input::ModalOpening);
    game.handle(Input::ModalOpened);
    let events = game.advance_time(70_000);
    assert_eq!(count_dismissed(&events), 1);
    let (wolf_prompt, player) = prompts(&events)[0];
    assert_eq!(player, wolf);

    // A late close for Red's dialog must not dismiss the wolf's.
    assert!(game.handle(Input::ModalClosed { prompt: red_prompt }).is_empty());
    assert_eq!(game.state().penalty.cursor, 1);
    assert_eq!(game.state().phase, TurnPhase::PenaltyResolution);

    game.handle(Input::OptionSelected(0));
    let events = game.handle(Input::ModalClosed { prompt: wolf_prompt });
    assert_eq!(count_dismissed(&events), 1);
    assert_eq!(game.state().phase, TurnPhase::Movement);

    assert!(game.handle(Input::ModalClosed { prompt: wolf_prompt }).is_empty());
    assert_eq!(game.state().phase, TurnPhase::Movement);
}

#[test]
fn test_close_before_answer_forced_after_grace() {
    let mut game = wolf_at_penalty([5, 5, 3, 2]);
    let events = game.handle(Input::RollDice);
    let (prompt, _) = prompts(&events)[0];

    assert!(game.handle(Input::ModalClosed { prompt }).is_empty());
    let deadline = game.next_wakeup().unwrap();
    assert_eq!(deadline, game.clock_ms() + game.state().config.stall_grace_ms);

    assert!(game.advance_time(deadline - 1).is_empty());
    let events = game.advance_time(deadline);
    assert!(events.iter().any(|e| matches!(
        e,
        MatchEvent::AnswerRevealed { selected: None, .. }
    )));
    assert_eq!(count_dismissed(&events), 1);
    assert_eq!(game.state().phase, TurnPhase::Movement);
}

#[test]
fn test_late_selection_within_grace() {
    let mut game = wolf_at_penalty([5, 5, 3, 2]);
    let events = game.handle(Input::RollDice);
    let (prompt, _) = prompts(&events)[0];

    game.handle(Input::ModalClosed { prompt });
    let events = game.handle(Input::OptionSelected(1));
    assert!(events.iter().any(|e| matches!(e, MatchEvent::AnswerRevealed { .. })));
    assert_eq!(count_dismissed(&events), 1);
    assert!(game.next_wakeup().is_none());
}

#[test]
fn test_computer_waits_for_dialog_animation() {
    let mut game = Match::new(MatchConfig::new(2).with_seed(4)).unwrap();
    game.handle(Input::StartMatch);
    let due = game.next_wakeup().unwrap();

    game.handle(Input::ModalOpening);
    assert!(game.advance_time(due).is_empty());
    let retry_at = game.next_wakeup().unwrap();
    assert!(retry_at > due);

    game.handle(Input::ModalClosed { prompt: PromptId(u32::MAX) });
    let events = game.advance_time(retry_at);
    assert!(events.iter().any(|e| matches!(e, MatchEvent::DiceRolled { .. })));
}

#[test]
fn test_stuck_animation_forces_progress() {
    let mut game = Match::new(MatchConfig::new(2).with_seed(4)).unwrap();
    game.handle(Input::StartMatch);
    game.handle(Input::ModalOpening);

    let events = game.advance_time(60_000);
    assert!(events.iter().any(|e| matches!(e, MatchEvent::DiceRolled { .. })));
}

#[test]
fn test_restart_cancels_pending_actions() {
    let mut game = Match::new(MatchConfig::new(3).with_seed(12)).unwrap();
    game.handle(Input::StartMatch);
    game.advance_time(5_000);
    assert!(game.next_wakeup().is_some());

    let events = game.restart().unwrap();
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], MatchEvent::PhaseChanged { to: TurnPhase::RollOrder, .. }));
    assert!(game.next_wakeup().is_none());
    assert!(game.advance_time(10_000_000).is_empty());

    let state = game.state();
    assert_eq!(state.phase, TurnPhase::RollOrder);
    assert_eq!(state.round, 0);
    assert!(state.history.is_empty());
    for player in state.roster.iter() {
        assert_eq!(state.scores.score(player.id), 0);
        assert_eq!(player.position, player.role.start_cell(state.board.grid()));
    }

    // And the match plays again.
    assert!(!game.handle(Input::StartMatch).is_empty());
    assert!(game.next_wakeup().is_some());
}

#[test]
fn test_restart_orphans_open_dialog() {
    let mut game = wolf_at_penalty([5, 5, 3, 2]);
    let events = game.handle(Input::RollDice);
    let (prompt, _) = prompts(&events)[0];

    game.restart().unwrap();
    assert!(game.handle(Input::ModalClosed { prompt }).is_empty());
    assert!(game.handle(Input::OptionSelected(0)).is_empty());
    assert!(game.state().penalty.prompt.is_none());
}

#[test]
fn test_newer_request_supersedes() {
    let (p0, p1) = (PlayerId::new(0), PlayerId::new(1));
    let mut scheduler = AiScheduler::default();

    let first = scheduler.schedule(p0, AiIntent::Roll, 0, 100).unwrap();
    let second = scheduler.schedule(p1, AiIntent::Move, 0, 50).unwrap();
    assert!(!scheduler.is_current(first));
    assert!(scheduler.is_current(second));

    let due = scheduler.poll(50, ModalState::Closed).unwrap();
    assert_eq!((due.player, due.intent), (p1, AiIntent::Move));
    assert!(!scheduler.complete(first, 50));
    assert!(scheduler.complete(second, 50));
    assert!(scheduler.is_idle());
}

#[test]
fn test_repeat_request_coalesces() {
    let p0 = PlayerId::new(0);
    let mut scheduler = AiScheduler::default();
    let first = scheduler.schedule(p0, AiIntent::Roll, 0, 100).unwrap();
    let again = scheduler.schedule(p0, AiIntent::Roll, 40, 100).unwrap();
    assert_eq!(first, again);
    assert_eq!(scheduler.next_due(), Some(100));
}

#[test]
fn test_one_action_in_flight() {
    let (p0, p1) = (PlayerId::new(0), PlayerId::new(1));
    let mut scheduler = AiScheduler::default();
    let token = scheduler.schedule(p0, AiIntent::Roll, 0, 100).unwrap();
    let running = scheduler.poll(100, ModalState::Closed).unwrap();

    // Requests made while an action runs wait their turn.
    assert_eq!(scheduler.schedule(p1, AiIntent::Roll, 100, 300), None);
    assert!(scheduler.poll(10_000, ModalState::Closed).is_none());
    assert_eq!(scheduler.queued_len(), 1);

    assert!(scheduler.complete(running.token, 120));
    assert!(!scheduler.is_current(token));
    assert_eq!(scheduler.next_due(), Some(420));
    let next = scheduler.poll(420, ModalState::Closed).unwrap();
    assert_eq!(next.player, p1);
}

#[test]
fn test_cancel_all_invalidates_tokens() {
    let p0 = PlayerId::new(0);
    let mut scheduler = AiScheduler::default();
    let token = scheduler.schedule(p0, AiIntent::Roll, 0, 100).unwrap();
    scheduler.cancel_all();
    assert!(!scheduler.is_current(token));
    assert!(scheduler.poll(1_000, ModalState::Closed).is_none());
    assert!(!scheduler.complete(token, 1_000));
}
