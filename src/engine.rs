//! This module ties a game session to the remote service, the seen-set and the random number
//! generator. It is the only place where requests to the service are issued, always one at a time
//! and only from a loading phase.

use fastrand::Rng;
use log::{info, warn};

use crate::challenge::{self, BATTLE_CHALLENGES};
use crate::seen::SeenStore;
use crate::service::Service;
use crate::session::{Mode, Phase, Session, TransitionError};
use crate::timer::Tick;

/// The message shown when the plans could not be fused.
const FUSION_FAILURE: &str = "Failed to fuse ideas.";

/// The message shown when the judge could not score the game.
const JUDGE_FAILURE: &str =
    "The judges are deliberating... rather slowly. There might have been an error.";

/// The message shown when the opponent's answer could not be fetched.
const OPPONENT_FAILURE: &str = "An unexpected error occurred while fetching the AI response.";

/// This struct drives a game session, serving its requests to the remote service.
pub(crate) struct Engine<S, T> {
    /// The random number generator used to pick challenges.
    rng: Rng,
    /// The remote service.
    service: S,
    /// The state of the game.
    session: Session,
    /// The record of the challenges already shown.
    store: T,
}

impl<S: Service, T: SeenStore> Engine<S, T> {
    /// This function creates an engine sitting in the welcome phase.
    pub(crate) const fn new(service: S, store: T, rng: Rng, round_seconds: u32) -> Self {
        Self {
            rng,
            service,
            session: Session::new(round_seconds),
            store,
        }
    }

    /// This function returns the state of the game.
    pub(crate) const fn session(&self) -> &Session {
        &self.session
    }

    /// This function starts a new game in `mode`.
    ///
    /// Battle games record their challenges in the seen-set right away. A seen-set that can't be
    /// read or written only costs the deduplication across games, so such failures are logged and
    /// the game starts anyway.
    ///
    /// # Errors
    ///
    /// Fails unless the game is in the welcome phase.
    pub(crate) fn start_game(&mut self, mode: Mode) -> Result<(), TransitionError> {
        if self.session.phase() != Phase::Welcome {
            return Err(TransitionError::new("start a game", self.session.phase()));
        }

        let (challenges, base_concept) = match mode {
            Mode::Battle => (self.battle_challenges(), String::new()),
            Mode::Fusion => (
                challenge::fusion_challenges(),
                challenge::pick_base_concept(&mut self.rng),
            ),
        };
        info!("starting a {} game", mode.label());

        self.session.start(mode, challenges, base_concept)
    }

    /// This function picks the challenges of a battle game and records them in the seen-set.
    fn battle_challenges(&mut self) -> Vec<String> {
        let seen = self.store.load().unwrap_or_else(|err| {
            warn!("ignoring the seen challenges: {err}");
            Vec::new()
        });
        let selection = challenge::select_battle(BATTLE_CHALLENGES, &seen, &mut self.rng);

        let mut updated = if selection.recycled {
            info!("every challenge has been seen; starting over from the full pool");
            if let Err(err) = self.store.clear() {
                warn!("could not clear the seen challenges: {err}");
            }
            Vec::new()
        } else {
            seen
        };
        for picked in &selection.challenges {
            if !updated.contains(picked) {
                updated.push(picked.clone());
            }
        }
        if let Err(err) = self.store.save(&updated) {
            warn!("could not record the seen challenges: {err}");
        }

        selection.challenges
    }

    /// This function replaces the text typed so far in the open round.
    ///
    /// # Errors
    ///
    /// Fails unless a round is open.
    pub(crate) fn set_draft(&mut self, draft: String) -> Result<(), TransitionError> {
        self.session.set_draft(draft)
    }

    /// This function submits the draft of the open round as typed, unless it is blank. The opponent
    /// is asked for its own answer on the next call to `resolve()`.
    ///
    /// # Errors
    ///
    /// Fails unless a round is open.
    pub(crate) fn submit_draft(&mut self) -> Result<bool, TransitionError> {
        self.session.submit_draft()
    }

    /// This function advances the countdown of the open round by one second, submitting the draft
    /// when it runs out.
    pub(crate) fn tick(&mut self) -> Tick {
        let tick = self.session.tick();
        if tick == Tick::Expired {
            info!("round {} ran out of time", self.session.round() + 1);
        }

        tick
    }

    /// This function issues the request the current loading phase is waiting on and feeds its
    /// outcome back into the session. Any error returned by the service ends the game in the error
    /// phase.
    ///
    /// # Errors
    ///
    /// Fails unless the game is in a loading phase.
    pub(crate) fn resolve(&mut self) -> Result<(), TransitionError> {
        match self.session.phase() {
            Phase::Submitting => {
                let prompt = self.session.opponent_prompt();
                match self.service.opponent_answer(&prompt) {
                    Ok(answer) => self.session.record_opponent_answer(answer),
                    Err(err) => self.session.fail(format!("{OPPONENT_FAILURE} ({err})")),
                }
            }
            Phase::Evaluating => {
                let outcome = self.service.evaluate(
                    self.session.challenges(),
                    self.session.user_answers(),
                    self.session.ai_answers(),
                );
                match outcome {
                    Ok(evaluation) => self.session.record_evaluation(evaluation),
                    Err(err) => {
                        warn!("the game could not be scored: {err}");
                        self.session.fail(format!("{JUDGE_FAILURE} ({err})"))
                    }
                }
            }
            Phase::Fusing => {
                let outcome = self
                    .service
                    .fuse(self.session.user_answers(), self.session.ai_answers());
                match outcome {
                    Ok(pitch) => self.session.record_fusion(pitch),
                    Err(err) => self.session.fail(format!("{FUSION_FAILURE} ({err})")),
                }
            }
            phase => Err(TransitionError::new("contact the AI", phase)),
        }
    }

    /// This function switches from the scorecard to the review of the answers.
    ///
    /// # Errors
    ///
    /// Fails unless the scorecard is shown.
    pub(crate) fn review(&mut self) -> Result<(), TransitionError> {
        self.session.review()
    }

    /// This function switches from the review back to the scorecard.
    ///
    /// # Errors
    ///
    /// Fails unless the review is shown.
    pub(crate) fn back_to_results(&mut self) -> Result<(), TransitionError> {
        self.session.back_to_results()
    }

    /// This function goes back to the welcome phase after a game has ended.
    ///
    /// # Errors
    ///
    /// Fails unless the game has ended.
    pub(crate) fn reset(&mut self) -> Result<(), TransitionError> {
        self.session.reset()
    }
}
