//! # ideagpt
//!
//! This crate is a terminal game about out-thinking an AI. It only runs on Linux because that's
//! where it has been played.
//!
//! In battle mode, you answer ten creative challenges against the clock while an AI opponent
//! answers the same ones, and an AI judge scores both of you across five categories. In fusion
//! mode, you and the AI each build a business over ten rounds, and both plans are merged into a
//! single pitch at the end.
//!
//! Every AI answer is retrieved through the OpenRouter API by means of request calls and simple
//! deserialization and serialization code. Only the parts of the platform's API the game needs are
//! covered.

#![cfg(target_os = "linux")]
#![expect(
    unused_crate_dependencies,
    reason = "The dependencies are used in the library crate."
)]

use anyhow::Result;
use ideagpt::init;

fn main() -> Result<()> {
    init()
}
