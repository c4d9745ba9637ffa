//! This module contains the scorecard produced by the judge at the end of a battle game, as well as
//! the parser that turns the judge's raw JSON reply into it.
//!
//! The judge is asked for exactly five categories in a fixed order, but its reply is never trusted
//! as-is: categories are matched by name and put back in order, scores are rounded to one decimal
//! and the winner of each category is recomputed from the scores.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

/// This regular expression matches a reply wrapped in a markdown code fence, capturing the fenced
/// contents in its second group.
static FENCE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)\A```(\w*)?\s*\n?(.*?)\n?\s*```\z").ok());

/// This enum lists the five categories every game is scored on, in the order they are displayed.
#[expect(
    clippy::arbitrary_source_item_ordering,
    reason = "The variants follow the order in which the scorecard lists them."
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Category {
    /// Critical thinking.
    CriticalThinking,
    /// Reasoning and logic.
    ReasoningLogic,
    /// Interpretation of the challenge.
    Interpretation,
    /// Creativity and humor.
    CreativityHumor,
    /// Emotional intelligence.
    EmotionalIntelligence,
}

impl Category {
    /// All the categories in scorecard order.
    pub(crate) const ALL: [Self; 5] = [
        Self::CriticalThinking,
        Self::ReasoningLogic,
        Self::Interpretation,
        Self::CreativityHumor,
        Self::EmotionalIntelligence,
    ];

    /// This function returns the position of the category in the scorecard.
    const fn index(self) -> usize {
        match self {
            Self::CriticalThinking => 0,
            Self::ReasoningLogic => 1,
            Self::Interpretation => 2,
            Self::CreativityHumor => 3,
            Self::EmotionalIntelligence => 4,
        }
    }

    /// This function returns the display name of the category, emoji included. It is also the name
    /// the judge is asked to use in its reply.
    pub(crate) const fn label(self) -> &'static str {
        match self {
            Self::CriticalThinking => "\u{1f9e0} Critical Thinking",
            Self::ReasoningLogic => "\u{1f3af} Reasoning & Logic",
            Self::Interpretation => "\u{1f3ad} Interpretation",
            Self::CreativityHumor => "\u{1f9c3} Creativity & Humor",
            Self::EmotionalIntelligence => "\u{1f497} Emotional Intelligence",
        }
    }

    /// This function finds the category a name returned by the judge refers to. Only letters and
    /// digits are compared, case-insensitively, so a dropped emoji or a changed casing still
    /// matches.
    fn from_label(label: &str) -> Option<Self> {
        let wanted = normalize(label);

        Self::ALL
            .into_iter()
            .find(|category| normalize(category.label()) == wanted)
    }
}

/// This function reduces a category name to its lowercase alphanumeric characters.
fn normalize(label: &str) -> String {
    label
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

/// This enum holds the side that won a category, or the game as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Winner {
    /// The AI opponent scored higher.
    IdeaGpt,
    /// Both sides scored the same.
    Tie,
    /// The human player scored higher.
    You,
}

impl Winner {
    /// This function decides the winner out of two scores: the player wins only with a strictly
    /// higher score, equal scores tie and anything else goes to the AI.
    pub(crate) fn decide(user: f64, ai: f64) -> Self {
        match user.partial_cmp(&ai) {
            Some(Ordering::Greater) => Self::You,
            Some(Ordering::Equal) => Self::Tie,
            Some(Ordering::Less) | None => Self::IdeaGpt,
        }
    }

    /// This function returns the name the winner is displayed with.
    pub(crate) const fn label(self) -> &'static str {
        match self {
            Self::IdeaGpt => "IdeaGPT",
            Self::Tie => "TIE",
            Self::You => "YOU",
        }
    }
}

/// This struct holds the averaged scores of both sides in a single category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ScoredCategory {
    /// The averaged score of the AI, rounded to one decimal.
    pub(crate) ai_score: f64,
    /// The category the scores belong to.
    pub(crate) category: Category,
    /// The averaged score of the player, rounded to one decimal.
    pub(crate) user_score: f64,
    /// The side with the higher score.
    pub(crate) winner: Winner,
}

impl ScoredCategory {
    /// This function builds a scored category, deriving the winner from the rounded scores.
    pub(crate) fn new(category: Category, user_score: f64, ai_score: f64) -> Self {
        let user_score = round_tenth(user_score);
        let ai_score = round_tenth(ai_score);

        Self {
            ai_score,
            category,
            user_score,
            winner: Winner::decide(user_score, ai_score),
        }
    }
}

/// This struct holds the whole outcome of the judging step.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EvaluationResult {
    /// This field contains exactly one entry per category, in `Category::ALL` order.
    pub(crate) scorecard: Vec<ScoredCategory>,
    /// This field contains the judge's closing remark about the game.
    pub(crate) verdict: String,
}

impl EvaluationResult {
    /// This function returns the sum of the player's scores across all categories.
    pub(crate) fn user_total(&self) -> f64 {
        self.scorecard.iter().map(|entry| entry.user_score).sum()
    }

    /// This function returns the sum of the AI's scores across all categories.
    pub(crate) fn ai_total(&self) -> f64 {
        self.scorecard.iter().map(|entry| entry.ai_score).sum()
    }

    /// This function returns the winner of the game as a whole, decided on the summed scores.
    pub(crate) fn overall_winner(&self) -> Winner {
        Winner::decide(round_tenth(self.user_total()), round_tenth(self.ai_total()))
    }
}

/// This enum holds everything that can be wrong with the judge's reply. Any of these is fatal to
/// the evaluation; no partial scorecard is ever produced.
#[derive(thiserror::Error, Debug)]
pub(crate) enum EvaluationError {
    /// A category appeared more than once.
    #[error("the category \"{0}\" was scored twice")]
    DuplicateCategory(String),
    /// The verdict was blank.
    #[error("the verdict is empty")]
    EmptyVerdict,
    /// The reply was not JSON of the expected shape.
    #[error("the scorecard is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A score was not a number between 0 and 10.
    #[error("the score {score} in \"{category}\" is outside 0.0..=10.0")]
    ScoreOutOfRange {
        /// The category holding the bad score.
        category: String,
        /// The bad score.
        score: f64,
    },
    /// A category name matched none of the known ones.
    #[error("the category \"{0}\" is not one of the scored categories")]
    UnknownCategory(String),
    /// The scorecard did not hold exactly five entries.
    #[error("the scorecard holds {0} categories instead of 5")]
    WrongCount(usize),
}

/// This struct mirrors one entry of the scorecard as the judge writes it.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCategory {
    /// The score of the AI.
    ai_score: f64,
    /// The category name.
    category: String,
    /// The score of the player.
    user_score: f64,
}

/// This struct mirrors the judge's reply as a whole.
#[derive(Deserialize)]
struct RawEvaluation {
    /// The unordered and unchecked scorecard.
    scorecard: Vec<RawCategory>,
    /// The closing remark.
    verdict: String,
}

/// This function rounds a score to one decimal.
fn round_tenth(score: f64) -> f64 {
    (score * 10.0).round() / 10.0
}

/// This function removes a markdown code fence around the reply, if there is one.
pub(crate) fn strip_fence(text: &str) -> &str {
    let trimmed = text.trim();

    FENCE
        .as_ref()
        .and_then(|re| re.captures(trimmed))
        .and_then(|caps| caps.get(2))
        .map_or(trimmed, |inner| inner.as_str().trim())
}

/// This function parses and validates the judge's reply.
///
/// # Errors
///
/// Returns an `EvaluationError` when the reply is not the expected JSON object, when the scorecard
/// does not hold each of the five categories exactly once, when a score is out of range or when the
/// verdict is empty.
pub(crate) fn parse(text: &str) -> Result<EvaluationResult, EvaluationError> {
    let raw: RawEvaluation = serde_json::from_str(strip_fence(text))?;

    if raw.scorecard.len() != Category::ALL.len() {
        return Err(EvaluationError::WrongCount(raw.scorecard.len()));
    }

    let verdict = raw.verdict.trim();
    if verdict.is_empty() {
        return Err(EvaluationError::EmptyVerdict);
    }

    let mut slots: [Option<ScoredCategory>; 5] = [None; 5];
    for entry in raw.scorecard {
        let Some(category) = Category::from_label(&entry.category) else {
            return Err(EvaluationError::UnknownCategory(entry.category));
        };

        for score in [entry.user_score, entry.ai_score] {
            if !(0.0..=10.0).contains(&score) {
                return Err(EvaluationError::ScoreOutOfRange {
                    category: entry.category,
                    score,
                });
            }
        }

        match slots.get_mut(category.index()) {
            Some(slot) if slot.is_none() => {
                *slot = Some(ScoredCategory::new(
                    category,
                    entry.user_score,
                    entry.ai_score,
                ));
            }
            _ => return Err(EvaluationError::DuplicateCategory(entry.category)),
        }
    }

    Ok(EvaluationResult {
        scorecard: slots.into_iter().flatten().collect(),
        verdict: verdict.to_owned(),
    })
}
