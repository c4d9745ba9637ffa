//! This module holds the menus shown between screens. Every menu is an enum whose variants are its
//! entries, drawn centered at the bottom of the screen with the selected one highlighted.

use std::borrow::Borrow as _;

use anyhow::Result;
use console::{pad_str, style, Alignment, Key, Term};

use crate::input::KeyPump;

/// This enum holds the entries shown after a game ended, either with a fused pitch or an error.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum EndMenu {
    /// This variant goes back to the welcome screen.
    Again,
    /// This variant quits the game.
    Exit,
}

impl Selected for EndMenu {
    fn list() -> &'static [Self] {
        &[Self::Again, Self::Exit]
    }

    fn repr(self) -> &'static str {
        match self {
            Self::Again => "Play Again",
            Self::Exit => "Exit",
        }
    }
}

/// This enum holds the entries of the scorecard screen.
#[expect(
    clippy::arbitrary_source_item_ordering,
    reason = "It's best if the items reflect the actual order they are displayed in the menu."
)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum ResultsMenu {
    /// This variant goes back to the welcome screen.
    PlayAgain,
    /// This variant shows every challenge side by side with both answers.
    Review,
    /// This variant quits the game.
    Exit,
}

impl Selected for ResultsMenu {
    fn list() -> &'static [Self] {
        &[Self::PlayAgain, Self::Review, Self::Exit]
    }

    fn repr(self) -> &'static str {
        match self {
            Self::PlayAgain => "Play Again",
            Self::Review => "Review Answers",
            Self::Exit => "Exit",
        }
    }
}

/// This enum holds the single entry of the review screen.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum ReviewMenu {
    /// This variant goes back to the scorecard.
    Back,
}

impl Selected for ReviewMenu {
    fn list() -> &'static [Self] {
        &[Self::Back]
    }

    fn repr(self) -> &'static str {
        "Back to Results"
    }
}

/// This trait is implemented by the enums listing the entries of a menu.
pub(crate) trait Selected: Copy + PartialEq + 'static {
    /// This function returns all the entries of the menu, in the order they are displayed.
    fn list() -> &'static [Self];

    /// This function moves the selection one entry up or down, wrapping around the ends of the
    /// menu. Keys other than the arrows and tab leave the selection untouched.
    fn next(&mut self, key: &Key) {
        let list = Self::list();
        let Some(position) = list.iter().position(|item| *item == *self) else {
            return;
        };
        let position = match *key {
            Key::ArrowUp | Key::BackTab => position.checked_sub(1).unwrap_or(list.len() - 1),
            Key::ArrowDown | Key::Tab => (position + 1) % list.len(),
            _ => return,
        };

        if let Some(item) = list.get(position) {
            *self = *item;
        }
    }

    /// This function returns the text of the entry.
    fn repr(self) -> &'static str;
}

/// This enum holds the entries of the welcome screen.
#[expect(
    clippy::arbitrary_source_item_ordering,
    reason = "It's best if the items reflect the actual order they are displayed in the menu."
)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum WelcomeMenu {
    /// This variant starts a battle game.
    Battle,
    /// This variant starts a fusion game.
    Fusion,
    /// This variant quits the game.
    Exit,
}

impl Selected for WelcomeMenu {
    fn list() -> &'static [Self] {
        &[Self::Battle, Self::Fusion, Self::Exit]
    }

    fn repr(self) -> &'static str {
        match self {
            Self::Battle => "IdeaGPT Battle",
            Self::Fusion => "Fusion Mode",
            Self::Exit => "Exit",
        }
    }
}

/// This function redraws the screen with `draw` followed by the menu until an entry is picked with
/// the return key, and returns that entry.
pub(crate) fn choose<M, F>(term: &Term, keys: &KeyPump, initial: M, draw: F) -> Result<M>
where
    M: Selected,
    F: Fn(&Term) -> Result<()>,
{
    let mut selected = initial;

    loop {
        term.clear_screen()?;
        draw(term)?;
        draw_menu(term, selected)?;

        match keys.recv()? {
            Key::Enter => break Ok(selected),
            key => selected.next(&key),
        }
    }
}

/// This function draws every entry of the menu on its own centered line, highlighting the selected
/// one.
fn draw_menu<M: Selected>(term: &Term, selected: M) -> Result<()> {
    let cols = usize::from(term.size().1);

    term.write_line("")?;
    for item in M::list() {
        let entry = if *item == selected {
            format!("{}", style(format!("   {}   ", item.repr())).bold().on_cyan())
        } else {
            format!("   {}   ", item.repr())
        };
        let line = pad_str(&entry, cols, Alignment::Center, None);
        term.write_line(line.borrow())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_wrap_around() {
        let mut selected = WelcomeMenu::Battle;

        selected.next(&Key::ArrowUp);
        assert_eq!(selected, WelcomeMenu::Exit);
        selected.next(&Key::ArrowDown);
        assert_eq!(selected, WelcomeMenu::Battle);
        selected.next(&Key::Tab);
        assert_eq!(selected, WelcomeMenu::Fusion);
    }

    #[test]
    fn other_keys_are_ignored() {
        let mut selected = ResultsMenu::Review;

        selected.next(&Key::Char('x'));
        selected.next(&Key::Backspace);

        assert_eq!(selected, ResultsMenu::Review);
    }

    #[test]
    fn single_entry_menu_stays_put() {
        let mut selected = ReviewMenu::Back;

        selected.next(&Key::ArrowDown);
        selected.next(&Key::ArrowUp);

        assert_eq!(selected, ReviewMenu::Back);
    }
}
