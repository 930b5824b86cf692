//! Penalty phase: picking who answers, then asking them in turn.

use tracing::{debug, info};

use super::controller::Match;
use super::events::{MatchEvent, PromptId};
use super::state::{OpenPrompt, TurnRecord};
use crate::ai::AiIntent;
use crate::core::PlayerId;
use crate::turns::{low_roll, rps_losers, LowRollResult, Throw, TurnPhase};

impl Match {
    /// Open a penalty round: a throw in two-player matches, a low roll
    /// otherwise.
    pub(super) fn begin_penalty(&mut self, events: &mut Vec<MatchEvent>) {
        self.state.penalty.clear_round();
        if let Some(actor) = self.state.rps_actor() {
            self.request_throw(actor, events);
            return;
        }
        events.push(MatchEvent::Message("Everybody rolls. Lowest roll answers a question.".into()));
        if !self.state.roster.has_human() {
            let chaser = self.state.roster.chaser();
            self.schedule(chaser, AiIntent::PenaltyRoll);
        }
    }

    fn request_throw(&mut self, actor: PlayerId, events: &mut Vec<MatchEvent>) {
        events.push(MatchEvent::ThrowRequested { player: actor });
        if !self.state.roster.is_human(actor) {
            self.schedule(actor, AiIntent::Throw);
        }
    }

    /// `actor` throws; the other player answers with a random throw.
    pub(super) fn throw(&mut self, actor: PlayerId, throw: Throw, events: &mut Vec<MatchEvent>) {
        let Some(opponent) = self.state.roster.iter().map(|p| p.id).find(|&id| id != actor) else {
            return;
        };
        let answer = Throw::random(&mut self.ai_rng);
        let throws = vec![(actor, throw), (opponent, answer)];
        let losers = rps_losers(&throws);
        debug!(?throws, ?losers, "rock paper scissors");
        events.push(MatchEvent::PenaltyThrows {
            throws,
            losers: losers.to_vec(),
        });

        if losers.is_empty() {
            events.push(MatchEvent::Message("Tie! Throw again.".into()));
            self.request_throw(actor, events);
            return;
        }
        self.begin_resolution(losers.to_vec(), events);
    }

    /// Everyone rolls; the lowest roll answers. A full tie rolls again.
    pub(super) fn low_roll_round(&mut self, events: &mut Vec<MatchEvent>) {
        let dice = &mut self.dice;
        let rolls: Vec<(PlayerId, u8)> = self.state.roster.iter().map(|p| (p.id, dice.roll())).collect();
        match low_roll(&rolls) {
            LowRollResult::Reroll => {
                debug!(?rolls, "everybody tied, rolling again");
                events.push(MatchEvent::PenaltyRolls { rolls, losers: Vec::new() });
                events.push(MatchEvent::Message("Everybody tied! Roll again.".into()));
                if !self.state.roster.has_human() {
                    let chaser = self.state.roster.chaser();
                    self.schedule(chaser, AiIntent::PenaltyRoll);
                }
            }
            LowRollResult::Losers(losers) => {
                debug!(?rolls, ?losers, "low roll");
                events.push(MatchEvent::PenaltyRolls {
                    rolls,
                    losers: losers.to_vec(),
                });
                self.begin_resolution(losers.to_vec(), events);
            }
        }
    }

    fn begin_resolution(&mut self, losers: Vec<PlayerId>, events: &mut Vec<MatchEvent>) {
        info!(?losers, "penalty losers");
        let round = self.state.round;
        self.state.record(TurnRecord::Penalized { round, losers: losers.clone() });
        self.state.penalty.losers = losers;
        self.state.penalty.cursor = 0;
        if self.enter(TurnPhase::PenaltyResolution, events) {
            self.present_next(events);
        }
    }

    /// Ask the next loser, or close the round when none are left.
    fn present_next(&mut self, events: &mut Vec<MatchEvent>) {
        let penalty = &self.state.penalty;
        let Some(&player) = penalty.losers.get(penalty.cursor) else {
            self.finish_penalty(events);
            return;
        };
        let question = self.deck.next().clone();
        let id = PromptId(self.next_prompt);
        self.next_prompt = self.next_prompt.wrapping_add(1);
        debug!(%player, prompt = %id, "question presented");

        events.push(MatchEvent::QuestionPresented {
            prompt: id,
            player,
            question: question.clone(),
        });
        self.state.penalty.prompt = Some(OpenPrompt {
            id,
            player,
            question,
            revealed: false,
        });
        if !self.state.roster.is_human(player) {
            self.schedule(player, AiIntent::RevealAnswer);
        }
    }

    /// Show the answer of the open question. Does nothing once shown.
    pub(super) fn reveal(&mut self, selected: Option<usize>, events: &mut Vec<MatchEvent>) {
        let Some(prompt) = self.state.penalty.prompt.as_mut().filter(|p| !p.revealed) else {
            return;
        };
        prompt.revealed = true;
        let question = &prompt.question;
        let selected = selected.filter(|_| question.is_multiple_choice());
        let correct = selected.map(|i| question.is_correct_option(i));
        debug!(prompt = %prompt.id, ?selected, ?correct, "answer revealed");
        events.push(MatchEvent::AnswerRevealed {
            prompt: prompt.id,
            answer: question.answer.clone(),
            selected,
            correct,
        });
    }

    /// Close the open question and move to the next loser.
    ///
    /// Without an open question this is a no-op, so a repeated close never
    /// skips anybody.
    pub(super) fn dismiss(&mut self, events: &mut Vec<MatchEvent>) {
        let Some(prompt) = self.state.penalty.prompt.take() else {
            return;
        };
        self.stall_deadline = None;
        debug!(prompt = %prompt.id, "question dismissed");
        events.push(MatchEvent::QuestionDismissed { prompt: prompt.id });
        self.state.penalty.cursor += 1;
        self.present_next(events);
    }

    fn finish_penalty(&mut self, events: &mut Vec<MatchEvent>) {
        self.state.penalty.clear_round();
        self.state.penalty.actor = (self.state.penalty.actor + 1) % self.state.roster.len().max(1);
        self.begin_movement(events);
    }
}

#[cfg(test)]
mod tests {
    use crate::board::{BoardState, Grid};
    use crate::core::{LoadedDice, MatchConfig, PlayerId, Role};
    use crate::game::{Input, Match, MatchEvent};
    use crate::questions::{Question, QuestionDeck};
    use crate::turns::TurnPhase;

    fn deck() -> QuestionDeck {
        QuestionDeck::new(vec![
            Question::open("Q1", "A1"),
            Question::choice("Q2", &["x", "y"], &[1]),
        ])
        .unwrap()
    }

    /// Four players, the wolf human; the rabbits are computer players.
    fn four_player(script: &[u8]) -> Match {
        let config = MatchConfig::new(4).with_human(Role::Chaser);
        let board = BoardState::with_impassable(Grid::new(8), []);
        Match::with_parts(config, board, Box::new(LoadedDice::new(script.iter().copied(), 5)))
            .unwrap()
            .with_questions(deck())
    }

    #[test]
    fn test_low_roll_tie_rerolls() {
        let mut m = four_player(&[4, 4, 4, 4, 1, 2, 3, 4]);
        m.state.phase = TurnPhase::PenaltySelection;
        let events = m.handle(Input::RollDice);
        assert!(events.contains(&MatchEvent::PenaltyRolls {
            rolls: vec![(PlayerId::new(0), 4), (PlayerId::new(1), 4), (PlayerId::new(2), 4), (PlayerId::new(3), 4)],
            losers: Vec::new(),
        }));
        assert_eq!(m.state().phase, TurnPhase::PenaltySelection);

        let events = m.handle(Input::RollDice);
        assert!(events.iter().any(|e| matches!(e, MatchEvent::QuestionPresented { player, .. } if *player == PlayerId::new(0))));
        assert_eq!(m.state().phase, TurnPhase::PenaltyResolution);
    }

    #[test]
    fn test_human_answer_then_close() {
        // Wolf rolls the 1 and answers.
        let mut m = four_player(&[3, 5, 6, 1]);
        m.state.phase = TurnPhase::PenaltySelection;
        let events = m.handle(Input::RollDice);
        let prompt = events
            .iter()
            .find_map(|e| match e {
                MatchEvent::QuestionPresented { prompt, .. } => Some(*prompt),
                _ => None,
            })
            .unwrap();

        let events = m.handle(Input::OptionSelected(0));
        assert!(events.iter().any(|e| matches!(e, MatchEvent::AnswerRevealed { answer, .. } if answer == "A1")));
        let events = m.handle(Input::ModalClosed { prompt });
        assert!(events.contains(&MatchEvent::QuestionDismissed { prompt }));
        assert_eq!(m.state().phase, TurnPhase::Movement);
        assert_eq!(m.state().penalty.actor, 0);

        // A second close for the same dialog does nothing.
        assert!(m.handle(Input::ModalClosed { prompt }).is_empty());
    }
}
