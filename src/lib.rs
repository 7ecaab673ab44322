//! Grub Trainer core crate.
//!
//! A timed arithmetic quiz played in the browser. `start_game()` mounts the quiz
//! onto the page markup; the rules (problem generation, the round state machine,
//! results) live under [`quiz`] and run natively as well, which is what the test
//! suite relies on.

use wasm_bindgen::prelude::*;

pub mod error;
mod logging;
pub mod quiz;

pub use error::QuizError;
pub use quiz::config::{Milestones, QuizConfig, WINNING_TIME_THRESHOLD_MS};
pub use quiz::problem::{Operation, Problem, generate_problems};
pub use quiz::results::{BreakdownRow, Outcome, QuizSummary, format_clock, format_time};
pub use quiz::session::{Advance, AnswerRecord, Milestone, Mode, Phase, ProgressMarker, Session, Verdict, parse_answer};
pub use quiz::sound::{SoundCue, feedback_cue};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    // Mounting narrows this to the config's `log_level`.
    logging::init(log::LevelFilter::Info);
}

// -----------------------------------------------------------------------------
// Unified entrypoints
// -----------------------------------------------------------------------------

/// Mount with the built-in round configuration.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    quiz::mount(QuizConfig::default())?;
    Ok(())
}

/// Mount with page-supplied JSON config; omitted fields keep their defaults.
#[wasm_bindgen]
pub fn start_game_with_config(json: &str) -> Result<(), JsValue> {
    quiz::mount(QuizConfig::from_json(json)?)?;
    Ok(())
}
