//! The library components of the game. They allow initializing the game, taking input, running the
//! rounds of a game against the AI opponent and fetching its answers, scores and pitches from the
//! OpenRouter API.
//!
//! The starting point of the library is the game.rs file, which contains the main game loop. The
//! state of a game lives in session.rs and is driven by engine.rs, which is the only part of the
//! game talking to the remote service.

#![expect(
    clippy::cargo_common_metadata,
    reason = "The package has not yet been pushed to a remote."
)]

mod challenge;
mod engine;
mod evaluation;
mod fusion;
mod game;
mod input;
mod menu;
mod openrouter;
mod screen;
mod seen;
mod service;
mod session;
mod timer;

pub use game::init;
