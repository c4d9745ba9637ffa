//! This module contains the state of a single game and every transition it can go through.
//!
//! The session never talks to the remote service itself. Whenever it needs something from it, it
//! moves into one of the loading phases and waits for the result to be handed back through one of
//! the `record_*` functions, or for the failure to be handed back through `fail()`. Every function
//! checks the current phase first and leaves the session untouched when the action is not allowed.

use crate::challenge::{self, NAME_FALLBACK, TOTAL_ROUNDS};
use crate::evaluation::EvaluationResult;
use crate::timer::{Countdown, Tick};

/// This enum holds the phases a game goes through.
#[expect(
    clippy::arbitrary_source_item_ordering,
    reason = "The variants follow the order in which a game goes through them."
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    /// No game is running; a mode is being picked.
    Welcome,
    /// A round is open and the player is typing their answer.
    Playing,
    /// The player's answer is in and the opponent is answering.
    Submitting,
    /// A battle game is over and the judge is scoring it.
    Evaluating,
    /// A fusion game is over and the plans are being merged.
    Fusing,
    /// The scorecard of a battle game is shown.
    Results,
    /// The answers of a battle game are shown side by side.
    Review,
    /// The merged pitch of a fusion game is shown.
    FusionResult,
    /// A request failed and the game cannot go on.
    Error,
}

impl Phase {
    /// This function tells whether the phase waits on the remote service.
    pub(crate) const fn is_loading(self) -> bool {
        matches!(self, Self::Submitting | Self::Evaluating | Self::Fusing)
    }
}

/// This enum holds the two ways of playing the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    /// Ten unrelated challenges, then a scorecard.
    Battle,
    /// Ten questions building a business plan, then a merged pitch.
    Fusion,
}

impl Mode {
    /// This function returns the name of the mode.
    pub(crate) const fn label(self) -> &'static str {
        match self {
            Self::Battle => "Battle",
            Self::Fusion => "Fusion",
        }
    }
}

/// This struct is the error returned when an action is attempted in a phase that doesn't allow it.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cannot {action} while the game is in the {phase:?} phase")]
pub(crate) struct TransitionError {
    /// The attempted action.
    action: &'static str,
    /// The phase the game was in.
    phase: Phase,
}

impl TransitionError {
    /// This function creates the error for `action` being attempted in `phase`.
    pub(crate) const fn new(action: &'static str, phase: Phase) -> Self {
        Self { action, phase }
    }
}

/// This struct holds one round of a finished game, as shown in the review screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RoundRecord<'game> {
    /// The opponent's answer.
    pub(crate) ai_answer: &'game str,
    /// The challenge as it was shown to the player.
    pub(crate) challenge: String,
    /// The player's answer, empty if the round timed out with nothing typed.
    pub(crate) user_answer: &'game str,
}

/// This struct holds the whole state of a game.
#[derive(Debug, Clone)]
pub(crate) struct Session {
    /// The opponent's answers, one slot per round.
    ai_answers: Vec<String>,
    /// The concept fusion templates are built around; empty in battle mode.
    base_concept: String,
    /// The challenges of the game, in play order. Fusion challenges are unrendered templates.
    challenges: Vec<String>,
    /// The countdown of the open round.
    countdown: Countdown,
    /// The text typed so far in the open round.
    draft: String,
    /// The message explaining why the game failed.
    error: Option<String>,
    /// The scorecard of a finished battle game.
    evaluation: Option<EvaluationResult>,
    /// The merged pitch of a finished fusion game.
    fused: Option<String>,
    /// The mode of the running game.
    mode: Option<Mode>,
    /// The current phase.
    phase: Phase,
    /// The index of the open round.
    round: usize,
    /// The player's answers, one slot per round.
    user_answers: Vec<String>,
}

impl Session {
    /// This function creates a session in the welcome phase, with rounds lasting `round_seconds`.
    pub(crate) const fn new(round_seconds: u32) -> Self {
        Self {
            ai_answers: Vec::new(),
            base_concept: String::new(),
            challenges: Vec::new(),
            countdown: Countdown::new(round_seconds),
            draft: String::new(),
            error: None,
            evaluation: None,
            fused: None,
            mode: None,
            phase: Phase::Welcome,
            round: 0,
            user_answers: Vec::new(),
        }
    }

    /// This function returns the opponent's answers.
    pub(crate) fn ai_answers(&self) -> &[String] {
        &self.ai_answers
    }

    /// This function returns the base concept of a fusion game.
    pub(crate) fn base_concept(&self) -> &str {
        &self.base_concept
    }

    /// This function returns the challenges of the game.
    pub(crate) fn challenges(&self) -> &[String] {
        &self.challenges
    }

    /// This function returns the countdown of the open round.
    pub(crate) const fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    /// This function returns the text typed so far in the open round.
    pub(crate) fn draft(&self) -> &str {
        &self.draft
    }

    /// This function returns the message explaining why the game failed.
    pub(crate) fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// This function returns the scorecard of a finished battle game.
    pub(crate) const fn evaluation(&self) -> Option<&EvaluationResult> {
        self.evaluation.as_ref()
    }

    /// This function returns the merged pitch of a finished fusion game.
    pub(crate) fn fused(&self) -> Option<&str> {
        self.fused.as_deref()
    }

    /// This function returns the mode of the running game.
    pub(crate) const fn mode(&self) -> Option<Mode> {
        self.mode
    }

    /// This function returns the current phase.
    pub(crate) const fn phase(&self) -> Phase {
        self.phase
    }

    /// This function returns the index of the open round.
    pub(crate) const fn round(&self) -> usize {
        self.round
    }

    /// This function returns the player's answers.
    pub(crate) fn user_answers(&self) -> &[String] {
        &self.user_answers
    }

    /// This function fails with a `TransitionError` unless the session is in one of `allowed`.
    fn expect_phase(&self, action: &'static str, allowed: &[Phase]) -> Result<(), TransitionError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(TransitionError::new(action, self.phase))
        }
    }

    /// This function starts a new game in `mode` over the given challenges, wiping whatever the
    /// previous game left behind.
    ///
    /// # Errors
    ///
    /// Fails unless the session is in the welcome phase.
    pub(crate) fn start(
        &mut self,
        mode: Mode,
        challenges: Vec<String>,
        base_concept: String,
    ) -> Result<(), TransitionError> {
        self.expect_phase("start a game", &[Phase::Welcome])?;

        *self = Self {
            ai_answers: vec![String::new(); TOTAL_ROUNDS],
            base_concept,
            challenges,
            mode: Some(mode),
            phase: Phase::Playing,
            user_answers: vec![String::new(); TOTAL_ROUNDS],
            ..Self::new(self.countdown.duration())
        };
        log::debug!("started a {} game", mode.label());

        Ok(())
    }

    /// This function replaces the text typed so far in the open round.
    ///
    /// # Errors
    ///
    /// Fails unless a round is open.
    pub(crate) fn set_draft(&mut self, draft: String) -> Result<(), TransitionError> {
        self.expect_phase("type an answer", &[Phase::Playing])?;
        self.draft = draft;

        Ok(())
    }

    /// This function records `answer` as the player's answer to the open round and closes it.
    ///
    /// # Errors
    ///
    /// Fails unless a round is open.
    pub(crate) fn submit_round(&mut self, answer: String) -> Result<(), TransitionError> {
        self.expect_phase("submit an answer", &[Phase::Playing])?;

        if let Some(slot) = self.user_answers.get_mut(self.round) {
            *slot = answer;
        }
        self.draft.clear();
        self.phase = Phase::Submitting;

        Ok(())
    }

    /// This function submits the current draft as it stands, the way the countdown does when it
    /// runs out. A draft holding only whitespace is not submitted, and `false` is returned.
    ///
    /// # Errors
    ///
    /// Fails unless a round is open.
    pub(crate) fn submit_draft(&mut self) -> Result<bool, TransitionError> {
        self.expect_phase("submit an answer", &[Phase::Playing])?;
        if self.draft.trim().is_empty() {
            return Ok(false);
        }

        let draft = std::mem::take(&mut self.draft);
        self.submit_round(draft)?;

        Ok(true)
    }

    /// This function advances the countdown of the open round by one second. When it runs out, the
    /// current draft is submitted exactly as `submit_round()` would, even if it is empty. Outside of
    /// an open round the countdown is frozen and nothing happens.
    pub(crate) fn tick(&mut self) -> Tick {
        if self.phase != Phase::Playing {
            return Tick::Running(self.countdown.remaining());
        }

        let tick = self.countdown.tick();
        if tick == Tick::Expired {
            let draft = std::mem::take(&mut self.draft);
            if let Err(err) = self.submit_round(draft) {
                log::error!("the round could not be closed on timeout: {err}");
            }
        }

        tick
    }

    /// This function renders the challenge of round `index`. In fusion mode the base concept is
    /// filled in, as well as the company name once the first round is over, taken from `answers`.
    fn rendered(&self, index: usize, answers: &[String]) -> String {
        let template = self.challenges.get(index).map_or("", String::as_str);

        if self.mode != Some(Mode::Fusion) {
            return template.to_owned();
        }

        let name = (index > 0).then(|| {
            answers
                .first()
                .map(String::as_str)
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(NAME_FALLBACK)
        });

        challenge::render(template, &self.base_concept, name)
    }

    /// This function returns the question of the open round as shown to the player, with the
    /// player's own company name filled in.
    pub(crate) fn question(&self) -> String {
        self.rendered(self.round, &self.user_answers)
    }

    /// This function returns the challenge of the open round as sent to the opponent, with the
    /// opponent's own company name filled in.
    pub(crate) fn opponent_prompt(&self) -> String {
        self.rendered(self.round, &self.ai_answers)
    }

    /// This function records the opponent's answer to the open round, then opens the next round or,
    /// after the last one, moves on to judging or fusing depending on the mode.
    ///
    /// # Errors
    ///
    /// Fails unless the session is waiting on the opponent.
    pub(crate) fn record_opponent_answer(&mut self, answer: String) -> Result<(), TransitionError> {
        self.expect_phase("record the opponent's answer", &[Phase::Submitting])?;

        if let Some(slot) = self.ai_answers.get_mut(self.round) {
            *slot = answer;
        }

        if self.round + 1 < TOTAL_ROUNDS {
            self.round += 1;
            self.draft.clear();
            self.countdown.reset();
            self.phase = Phase::Playing;
        } else {
            self.phase = match self.mode {
                Some(Mode::Fusion) => Phase::Fusing,
                Some(Mode::Battle) | None => Phase::Evaluating,
            };
        }

        Ok(())
    }

    /// This function stores the scorecard of the game and shows it.
    ///
    /// # Errors
    ///
    /// Fails unless the session is waiting on the judge.
    pub(crate) fn record_evaluation(
        &mut self,
        evaluation: EvaluationResult,
    ) -> Result<(), TransitionError> {
        self.expect_phase("record the scorecard", &[Phase::Evaluating])?;
        self.evaluation = Some(evaluation);
        self.phase = Phase::Results;

        Ok(())
    }

    /// This function stores the merged pitch of the game and shows it.
    ///
    /// # Errors
    ///
    /// Fails unless the session is waiting on the fusion.
    pub(crate) fn record_fusion(&mut self, pitch: String) -> Result<(), TransitionError> {
        self.expect_phase("record the fused pitch", &[Phase::Fusing])?;
        self.fused = Some(pitch);
        self.phase = Phase::FusionResult;

        Ok(())
    }

    /// This function ends the game with an error message, in place of the result the session was
    /// waiting on.
    ///
    /// # Errors
    ///
    /// Fails unless the session is waiting on the remote service.
    pub(crate) fn fail(&mut self, message: String) -> Result<(), TransitionError> {
        if !self.phase.is_loading() {
            return Err(TransitionError::new("report a failure", self.phase));
        }

        self.error = Some(if message.trim().is_empty() {
            "An unexpected error occurred.".to_owned()
        } else {
            message
        });
        self.phase = Phase::Error;

        Ok(())
    }

    /// This function switches from the scorecard to the side-by-side review of the answers.
    ///
    /// # Errors
    ///
    /// Fails unless the scorecard is shown.
    pub(crate) fn review(&mut self) -> Result<(), TransitionError> {
        self.expect_phase("review the answers", &[Phase::Results])?;
        self.phase = Phase::Review;

        Ok(())
    }

    /// This function switches from the review back to the scorecard.
    ///
    /// # Errors
    ///
    /// Fails unless the review is shown.
    pub(crate) fn back_to_results(&mut self) -> Result<(), TransitionError> {
        self.expect_phase("go back to the results", &[Phase::Review])?;
        self.phase = Phase::Results;

        Ok(())
    }

    /// This function throws the finished game away and goes back to the welcome phase.
    ///
    /// # Errors
    ///
    /// Fails unless the game has ended, successfully or not.
    pub(crate) fn reset(&mut self) -> Result<(), TransitionError> {
        self.expect_phase(
            "start over",
            &[Phase::Results, Phase::FusionResult, Phase::Error],
        )?;
        *self = Self::new(self.countdown.duration());

        Ok(())
    }

    /// This function lists every round of the game with both answers.
    pub(crate) fn rounds(&self) -> Vec<RoundRecord<'_>> {
        (0..self.challenges.len())
            .map(|index| RoundRecord {
                ai_answer: self.ai_answers.get(index).map_or("", String::as_str),
                challenge: self.rendered(index, &self.user_answers),
                user_answer: self.user_answers.get(index).map_or("", String::as_str),
            })
            .collect()
    }
}
