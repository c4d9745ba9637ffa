//! This module draws the contents of every screen of the game. The functions only write lines to
//! the terminal; clearing the screen, drawing the menus and reading keys is left to the caller.

use std::borrow::Borrow as _;

use anyhow::Result;
use console::{pad_str, style, Alignment, Term};

use crate::challenge::TOTAL_ROUNDS;
use crate::evaluation::{EvaluationResult, Winner};
use crate::fusion::FusedPitch;
use crate::session::{Phase, RoundRecord, Session};

/// The width of the progress bar on the playing screen.
const BAR_WIDTH: usize = 30;

/// The width of the category column of the scorecard.
const CATEGORY_WIDTH: usize = 28;

/// The text shown in the review for a round the player left empty.
const NO_ANSWER_GIVEN: &str = "No answer given.";

/// The width of each score column of the scorecard.
const SCORE_WIDTH: usize = 8;

/// This function writes the error screen.
pub(crate) fn error(term: &Term, message: &str) -> Result<()> {
    title(term, "Something went wrong")?;
    term.write_line(&format!("{}", style(message).red()))?;

    Ok(())
}

/// This function writes the pitch produced by a fusion game.
pub(crate) fn fusion(term: &Term, pitch: &FusedPitch) -> Result<()> {
    title(term, &pitch.title)?;
    if !pitch.slogan.is_empty() {
        centered(term, &format!("{}", style(&pitch.slogan).italic()))?;
    }

    for (heading, body) in [
        ("The Big Idea", &pitch.big_idea),
        ("Business Brief", &pitch.brief),
        ("Final Pitch", &pitch.final_pitch),
    ] {
        if body.is_empty() {
            continue;
        }
        term.write_line("")?;
        term.write_line(&format!("{}", style(heading).bold().cyan()))?;
        term.write_line(body)?;
    }

    Ok(())
}

/// This function returns the text shown next to the spinner while the game waits on the service.
pub(crate) const fn loading_message(phase: Phase) -> &'static str {
    match phase {
        Phase::Evaluating => "The judges are deliberating...",
        Phase::Fusing => "The Merger Maestro is fusing your ideas...",
        _ => "IdeaGPT is thinking...",
    }
}

/// This function writes the screen of an open round: the progress header, the challenge, the
/// countdown and the answer typed so far.
pub(crate) fn playing(term: &Term, session: &Session) -> Result<()> {
    let mode = session.mode().map_or("", |mode| mode.label());

    centered(
        term,
        &format!(
            "{}",
            style(format!(
                "Round {} of {TOTAL_ROUNDS} | {mode} Mode",
                session.round() + 1
            ))
            .bold()
        ),
    )?;
    centered(term, &progress_bar(session.round()))?;
    term.write_line("")?;

    if let Some(concept) = base_concept_line(session) {
        term.write_line(&concept)?;
        term.write_line("")?;
    }
    term.write_line(&format!("{}", style(session.question()).bold()))?;
    term.write_line("")?;

    let remaining = session.countdown().remaining();
    let timer = if remaining <= 10 {
        style(clock(remaining)).red().bold()
    } else {
        style(clock(remaining)).bold()
    };
    term.write_line(&format!("Time left: {timer}"))?;
    term.write_line("")?;

    term.write_line(&format!("> {}{}", session.draft(), style("_").blink()))?;
    term.write_line("")?;
    term.write_line(&format!(
        "{}",
        style("Type your answer and press Enter to submit.").dim()
    ))?;

    Ok(())
}

/// This function writes the scorecard of a battle game, followed by the totals, the overall winner
/// and the judge's verdict.
pub(crate) fn results(term: &Term, evaluation: &EvaluationResult) -> Result<()> {
    title(term, "The Verdict")?;

    term.write_line(&format!(
        "{}",
        style(score_row("Category", "You", "IdeaGPT", "Winner")).bold()
    ))?;
    for scored in &evaluation.scorecard {
        term.write_line(&score_row(
            scored.category.label(),
            &format!("{:.1}", scored.user_score),
            &format!("{:.1}", scored.ai_score),
            scored.winner.label(),
        ))?;
    }
    term.write_line(&format!(
        "{}",
        style(score_row(
            "Total",
            &format!("{:.1}", evaluation.user_total()),
            &format!("{:.1}", evaluation.ai_total()),
            evaluation.overall_winner().label(),
        ))
        .bold()
    ))?;
    term.write_line("")?;

    let overall = match evaluation.overall_winner() {
        Winner::You => style("You beat IdeaGPT!".to_owned()).green(),
        Winner::Tie => style("It's a tie!".to_owned()).yellow(),
        Winner::IdeaGpt => style("IdeaGPT wins this time.".to_owned()).red(),
    };
    centered(term, &format!("{}", overall.bold()))?;
    term.write_line("")?;
    term.write_line(&evaluation.verdict)?;

    Ok(())
}

/// This function writes every challenge of the game next to both answers.
pub(crate) fn review(term: &Term, rounds: &[RoundRecord<'_>]) -> Result<()> {
    title(term, "Answer Review")?;

    for (index, round) in rounds.iter().enumerate() {
        term.write_line(&format!(
            "{}",
            style(format!("{}. {}", index + 1, round.challenge)).bold()
        ))?;
        term.write_line(&format!(
            "   {} {}",
            style("You:").cyan(),
            shown(round.user_answer)
        ))?;
        term.write_line(&format!(
            "   {} {}",
            style("IdeaGPT:").magenta(),
            round.ai_answer
        ))?;
        term.write_line("")?;
    }

    Ok(())
}

/// This function writes the welcome screen.
pub(crate) fn welcome(term: &Term) -> Result<()> {
    title(term, "IdeaGPT")?;
    centered(term, "Out-think the AI, or team up with it.")?;
    term.write_line("")?;
    term.write_line(&format!(
        "{} {TOTAL_ROUNDS} creative challenges against an AI opponent, scored by an AI judge.",
        style("Battle:").bold()
    ))?;
    term.write_line(&format!(
        "{} build a business over {TOTAL_ROUNDS} rounds while the AI builds its own, then \
         merge both into one pitch.",
        style("Fusion:").bold()
    ))?;
    term.write_line(&format!(
        "{}",
        style("Use the arrow keys to pick a mode and Enter to confirm.").dim()
    ))?;

    Ok(())
}

/// This function returns the line reminding the player of the business being built in fusion mode,
/// or `None` when there is no base concept.
fn base_concept_line(session: &Session) -> Option<String> {
    let concept = session.base_concept();
    (!concept.is_empty()).then(|| {
        format!(
            "{} {}",
            style("Base concept:").dim(),
            style(concept).italic()
        )
    })
}

/// This function writes a line centered on the terminal.
fn centered(term: &Term, line: &str) -> Result<()> {
    let cols = usize::from(term.size().1);
    let output = pad_str(line, cols, Alignment::Center, None);
    term.write_line(output.borrow())?;

    Ok(())
}

/// This function formats a number of seconds as minutes and seconds.
fn clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// This function draws how far into the game the player is, counting the open round as done.
fn progress_bar(round: usize) -> String {
    let filled = (round + 1).min(TOTAL_ROUNDS) * BAR_WIDTH / TOTAL_ROUNDS;

    format!(
        "{}{}",
        style("\u{2588}".repeat(filled)).cyan(),
        style("\u{2591}".repeat(BAR_WIDTH - filled)).dim()
    )
}

/// This function lays out a row of the scorecard in fixed-width columns.
fn score_row(category: &str, user: &str, ai: &str, winner: &str) -> String {
    format!(
        "{}{}{}{}",
        pad_str(category, CATEGORY_WIDTH, Alignment::Left, None),
        pad_str(user, SCORE_WIDTH, Alignment::Right, None),
        pad_str(ai, SCORE_WIDTH, Alignment::Right, None),
        pad_str(&format!("  {winner}"), SCORE_WIDTH + 2, Alignment::Left, None),
    )
}

/// This function returns the answer as displayed in the review.
fn shown(answer: &str) -> &str {
    if answer.trim().is_empty() {
        NO_ANSWER_GIVEN
    } else {
        answer
    }
}

/// This function writes the bold, centered title of a screen followed by a blank line.
fn title(term: &Term, text: &str) -> Result<()> {
    centered(term, &format!("{}", style(text).bold().on_cyan()))?;
    term.write_line("")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::fusion_challenges;
    use crate::session::Mode;

    #[test]
    fn base_concept_only_shows_in_fusion() {
        let mut fusion = Session::new(30);
        fusion
            .start(Mode::Fusion, fusion_challenges(), "robot dog walkers".to_owned())
            .unwrap();
        let line = base_concept_line(&fusion).unwrap();
        assert_eq!(
            console::strip_ansi_codes(&line),
            "Base concept: robot dog walkers"
        );

        let mut battle = Session::new(30);
        battle
            .start(Mode::Battle, vec!["Name a colour.".to_owned()], String::new())
            .unwrap();
        assert_eq!(base_concept_line(&battle), None);
    }

    #[test]
    fn clock_pads_seconds() {
        assert_eq!(clock(60), "1:00");
        assert_eq!(clock(9), "0:09");
        assert_eq!(clock(0), "0:00");
    }

    #[test]
    fn progress_bar_fills_up() {
        let plain = |round| console::strip_ansi_codes(&progress_bar(round)).into_owned();

        assert_eq!(plain(0).chars().filter(|ch| *ch == '\u{2588}').count(), 3);
        assert_eq!(plain(9).chars().filter(|ch| *ch == '\u{2588}').count(), BAR_WIDTH);
        assert_eq!(plain(4).chars().count(), BAR_WIDTH);
    }

    #[test]
    fn empty_answers_are_spelled_out() {
        assert_eq!(shown(""), NO_ANSWER_GIVEN);
        assert_eq!(shown("  \n"), NO_ANSWER_GIVEN);
        assert_eq!(shown("RockBox"), "RockBox");
    }

    #[test]
    fn score_rows_line_up() {
        let header = score_row("Category", "You", "IdeaGPT", "Winner");
        let row = score_row("Critical Thinking", "7.5", "6.0", "YOU");

        assert_eq!(
            console::measure_text_width(&header),
            console::measure_text_width(&row)
        );
    }

    #[test]
    fn loading_messages_follow_the_phase() {
        assert_ne!(
            loading_message(Phase::Evaluating),
            loading_message(Phase::Fusing)
        );
        assert_eq!(
            loading_message(Phase::Submitting),
            "IdeaGPT is thinking..."
        );
    }
}
