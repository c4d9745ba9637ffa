//! This module defines the boundary between the game and the generative-text service it plays
//! against. The game only ever needs three things from the service, and only ever one at a time.

use console::style;

use crate::evaluation::{EvaluationError, EvaluationResult};

/// This trait holds the three requests the game makes to the remote service. Each one is a single
/// blocking request with no retry.
pub(crate) trait Service {
    /// This function asks the judge to score both players over the whole game.
    ///
    /// # Errors
    ///
    /// Any transport failure, as well as a reply that does not hold a valid scorecard, is returned
    /// as an error. A scorecard is never made up.
    fn evaluate(
        &self,
        challenges: &[String],
        user_answers: &[String],
        ai_answers: &[String],
    ) -> Result<EvaluationResult, ServiceError>;

    /// This function asks for a single pitch merging both business plans of a fusion game.
    ///
    /// # Errors
    ///
    /// Implementations may return an error, though the OpenRouter one answers failures with a
    /// fallback pitch instead.
    fn fuse(&self, user_answers: &[String], ai_answers: &[String]) -> Result<String, ServiceError>;

    /// This function asks the AI opponent for its answer to a single challenge.
    ///
    /// # Errors
    ///
    /// Implementations may return an error, though the OpenRouter one answers failures with a
    /// filler answer instead so that a round never stalls.
    fn opponent_answer(&self, prompt: &str) -> Result<String, ServiceError>;
}

#[expect(
    clippy::arbitrary_source_item_ordering,
    reason = "It's easier to maintain if the status errors are in the same order as the ones specified in the OpenRouter docs."
)]
/// This enum holds the errors that the remote service may produce.
#[derive(thiserror::Error, Debug)]
pub(crate) enum ServiceError {
    /// HTTP 400.
    #[error("{}", style("bad request").bold().underlined())]
    BadRequest,
    /// HTTP 401.
    #[error("{}", style("invalid credentials").bold().underlined())]
    InvalidCredentials,
    /// HTTP 402.
    #[error("{}", style("insufficient credits").bold().underlined())]
    InsufficientCredits,
    /// HTTP 403.
    #[error("{}", style("flagged input").bold().underlined())]
    FlaggedInput,
    /// HTTP 408, or the request ran past the configured timeout.
    #[error("{}", style("timed out").bold().underlined())]
    TimedOut,
    /// HTTP 429.
    #[error("{}", style("rate limited").bold().underlined())]
    RateLimited,
    /// HTTP 502.
    #[error("{}", style("model down or invalid response").bold().underlined())]
    DownOrInvalid,
    /// HTTP 503.
    #[error("{}", style("no available providers").bold().underlined())]
    NoProviders,
    /// Any other HTTP status.
    #[error("{} ({})", style("unknown error").bold().underlined(), .0)]
    Unknown(u16),
    /// The request never got a response.
    #[error("{}: {}", style("transport failure").bold().underlined(), .0)]
    Transport(#[source] ureq::Error),
    /// The response held no text.
    #[error("{}", style("empty response").bold().underlined())]
    EmptyResponse,
    /// The judge's reply was not a valid scorecard.
    #[error("{}: {}", style("malformed scorecard").bold().underlined(), .0)]
    Malformed(#[from] EvaluationError),
}

impl From<ureq::Error> for ServiceError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(status) => match status {
                400 => Self::BadRequest,
                401 => Self::InvalidCredentials,
                402 => Self::InsufficientCredits,
                403 => Self::FlaggedInput,
                408 => Self::TimedOut,
                429 => Self::RateLimited,
                502 => Self::DownOrInvalid,
                503 => Self::NoProviders,
                _ => Self::Unknown(status),
            },
            ureq::Error::Timeout(_) => Self::TimedOut,
            other => Self::Transport(other),
        }
    }
}

/// This module holds a scripted stand-in for the remote service, used by the tests of the game
/// flow.
#[cfg(test)]
pub(crate) mod fake {
    use std::cell::RefCell;

    use super::{Service, ServiceError};
    use crate::evaluation::{self, EvaluationResult};

    /// This struct answers every request from a script and records the prompts it was sent.
    #[derive(Debug, Default)]
    pub(crate) struct FakeService {
        /// The raw judge reply, parsed the same way a real one would be. `None` fails the request.
        pub(crate) evaluation: Option<String>,
        /// The fused pitch. `None` fails the request.
        pub(crate) fused: Option<String>,
        /// Whether opponent requests fail.
        pub(crate) opponent_fails: bool,
        /// Every opponent prompt received so far.
        pub(crate) prompts: RefCell<Vec<String>>,
        /// The number of judge and fusion requests received so far.
        pub(crate) final_calls: RefCell<usize>,
    }

    impl Service for FakeService {
        fn evaluate(
            &self,
            _challenges: &[String],
            _user_answers: &[String],
            _ai_answers: &[String],
        ) -> Result<EvaluationResult, ServiceError> {
            *self.final_calls.borrow_mut() += 1;
            let reply = self.evaluation.as_deref().ok_or(ServiceError::EmptyResponse)?;
            Ok(evaluation::parse(reply)?)
        }

        fn fuse(
            &self,
            _user_answers: &[String],
            _ai_answers: &[String],
        ) -> Result<String, ServiceError> {
            *self.final_calls.borrow_mut() += 1;
            self.fused.clone().ok_or(ServiceError::EmptyResponse)
        }

        fn opponent_answer(&self, prompt: &str) -> Result<String, ServiceError> {
            self.prompts.borrow_mut().push(prompt.to_owned());
            if self.opponent_fails {
                return Err(ServiceError::EmptyResponse);
            }
            Ok(format!("answer {}", self.prompts.borrow().len()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_status_codes() {
        assert!(matches!(
            ServiceError::from(ureq::Error::StatusCode(401)),
            ServiceError::InvalidCredentials
        ));
        assert!(matches!(
            ServiceError::from(ureq::Error::StatusCode(429)),
            ServiceError::RateLimited
        ));
        assert!(matches!(
            ServiceError::from(ureq::Error::StatusCode(418)),
            ServiceError::Unknown(418)
        ));
    }

    #[test]
    fn errors_have_messages() {
        assert!(!ServiceError::EmptyResponse.to_string().is_empty());
        assert!(ServiceError::Unknown(500).to_string().contains("(500)"));
    }

    #[test]
    fn wrapped_errors_keep_their_cause() {
        let malformed = ServiceError::from(EvaluationError::WrongCount(3));
        assert!(matches!(malformed, ServiceError::Malformed(_)));
        assert!(malformed.to_string().contains("3 categories"));

        let transport = ServiceError::from(ureq::Error::BadUri("nowhere".to_owned()));
        assert!(matches!(transport, ServiceError::Transport(_)));
        assert!(transport.to_string().contains("nowhere"));
    }
}
