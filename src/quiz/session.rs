//! Round state machine.
//!
//! A [`Session`] walks a fixed problem sequence, timing each answer against the
//! caller-supplied clock (`performance.now()` in the browser, plain numbers in
//! tests). Practice rounds always run to the end; Steel-Grub rounds stop at the
//! first wrong answer.

use super::config::{Milestones, QuizConfig};
use super::problem::{Problem, generate_problems};
use super::results::{BreakdownRow, Outcome, QuizSummary};
use super::sound::{SoundCue, feedback_cue};
use crate::error::{QuizError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const GRUB_ICON: &str = "assets/images/grub_icon.png";
pub const GRUBSONG_CHARM: &str = "assets/images/grubsong_charm.png";
pub const GRUBBERFLY_CHARM: &str = "assets/images/grubberfly_charm.png";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    Practice,
    SteelGrub,
}

impl FromStr for Mode {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "practice" => Ok(Mode::Practice),
            "steel-grub" => Ok(Mode::SteelGrub),
            other => Err(QuizError::UnknownMode(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Answering,
    Completed,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Milestone {
    Checkpoint1,
    Checkpoint2,
    Checkpoint3,
    Final,
}

impl Milestone {
    /// Milestone reached by answering the 1-based `number`th problem, if any.
    pub fn at(milestones: &Milestones, number: usize) -> Option<Milestone> {
        if number == milestones.checkpoint1 {
            Some(Milestone::Checkpoint1)
        } else if number == milestones.checkpoint2 {
            Some(Milestone::Checkpoint2)
        } else if number == milestones.checkpoint3 {
            Some(Milestone::Checkpoint3)
        } else if number == milestones.finish {
            Some(Milestone::Final)
        } else {
            None
        }
    }
}

/// How a submitted answer shows up on the progress bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressMarker {
    Correct,
    Incorrect,
    /// Steel-Grub: freed grub (or charm at milestones).
    Icon(&'static str),
    Unmarked,
}

impl ProgressMarker {
    fn for_answer(mode: Mode, correct: bool, milestone: Option<Milestone>) -> Self {
        match (mode, correct) {
            (Mode::Practice, true) => ProgressMarker::Correct,
            (Mode::Practice, false) => ProgressMarker::Incorrect,
            (Mode::SteelGrub, false) => ProgressMarker::Unmarked,
            (Mode::SteelGrub, true) => ProgressMarker::Icon(match milestone {
                Some(Milestone::Checkpoint2) => GRUBSONG_CHARM,
                Some(Milestone::Final) => GRUBBERFLY_CHARM,
                _ => GRUB_ICON,
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnswerRecord {
    pub given: i64,
    pub expected: i64,
    pub correct: bool,
    pub elapsed_ms: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// Index of the problem now being asked.
    Next(usize),
    Completed,
    Failed,
}

/// Result of one submission: what the view should show and where the round goes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Verdict {
    pub index: usize,
    pub number: usize,
    pub correct: bool,
    pub record: AnswerRecord,
    pub milestone: Option<Milestone>,
    pub marker: ProgressMarker,
    pub cue: SoundCue,
    pub advance: Advance,
}

/// Parse an answer the way a lenient number field would: skip leading
/// whitespace, accept one sign, read the leading digits, ignore the rest.
/// Digit runs too long for `i64` saturate, so they still count as (wrong) answers.
pub fn parse_answer(raw: &str) -> Result<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return Err(QuizError::InvalidAnswer(raw.to_string()));
    }
    let magnitude = rest.as_bytes()[..digits]
        .iter()
        .fold(0i64, |acc, d| acc.saturating_mul(10).saturating_add(i64::from(d - b'0')));
    Ok(if negative { -magnitude } else { magnitude })
}

#[derive(Clone, Debug)]
pub struct Session {
    mode: Mode,
    milestones: Milestones,
    winning_time_ms: f64,
    problems: Vec<Problem>,
    answers: Vec<AnswerRecord>,
    current: usize,
    phase: Phase,
    started_ms: f64,
    problem_started_ms: f64,
    finished_ms: Option<f64>,
}

impl Session {
    /// Generate a fresh round and start its clocks at `now_ms`.
    pub fn start<R: Rng + ?Sized>(mode: Mode, config: &QuizConfig, rng: &mut R, now_ms: f64) -> Result<Self> {
        let problems = generate_problems(config.total_problems, rng);
        Self::with_problems(mode, config, problems, now_ms)
    }

    pub fn with_problems(mode: Mode, config: &QuizConfig, problems: Vec<Problem>, now_ms: f64) -> Result<Self> {
        config.validate()?;
        if problems.len() != config.total_problems {
            return Err(QuizError::ProblemCountMismatch { expected: config.total_problems, actual: problems.len() });
        }
        log::info!("starting {mode:?} round of {} problems", problems.len());
        Ok(Self {
            mode,
            milestones: config.milestones,
            winning_time_ms: config.winning_time_ms,
            problems,
            answers: Vec::new(),
            current: 0,
            phase: Phase::Answering,
            started_ms: now_ms,
            problem_started_ms: now_ms,
            finished_ms: None,
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase != Phase::Answering
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn total_problems(&self) -> usize {
        self.problems.len()
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    /// Problem awaiting an answer; `None` once the round is over.
    pub fn current_problem(&self) -> Option<&Problem> {
        match self.phase {
            Phase::Answering => self.problems.get(self.current),
            _ => None,
        }
    }

    pub fn submit(&mut self, raw: &str, now_ms: f64) -> Result<Verdict> {
        if self.is_finished() {
            return Err(QuizError::RoundOver);
        }
        let value = parse_answer(raw)?;
        self.submit_value(value, now_ms)
    }

    pub fn submit_value(&mut self, given: i64, now_ms: f64) -> Result<Verdict> {
        if self.is_finished() {
            return Err(QuizError::RoundOver);
        }
        let index = self.current;
        let expected = self.problems[index].answer;
        let correct = given == expected;
        let record = AnswerRecord { given, expected, correct, elapsed_ms: now_ms - self.problem_started_ms };
        self.answers.push(record);

        let number = index + 1;
        let milestone = Milestone::at(&self.milestones, number);
        let advance = if self.mode == Mode::SteelGrub && !correct {
            self.finish(Phase::Failed, now_ms);
            Advance::Failed
        } else if number == self.problems.len() {
            self.finish(Phase::Completed, now_ms);
            Advance::Completed
        } else {
            self.current += 1;
            self.problem_started_ms = now_ms;
            Advance::Next(self.current)
        };
        log::debug!("problem {number}: given {given}, expected {expected}, {advance:?}");

        Ok(Verdict {
            index,
            number,
            correct,
            record,
            milestone,
            marker: ProgressMarker::for_answer(self.mode, correct, milestone),
            cue: feedback_cue(self.mode, correct, milestone),
            advance,
        })
    }

    fn finish(&mut self, phase: Phase, now_ms: f64) {
        self.phase = phase;
        self.finished_ms = Some(now_ms);
        log::info!("{:?} round ended {phase:?} after {:.0} ms", self.mode, now_ms - self.started_ms);
    }

    /// Round time so far; frozen once the round ends.
    pub fn elapsed_ms(&self, now_ms: f64) -> f64 {
        self.finished_ms.unwrap_or(now_ms) - self.started_ms
    }

    pub fn incorrect_count(&self) -> usize {
        self.answers.iter().filter(|a| !a.correct).count()
    }

    /// Practice counts every answer, Steel-Grub only the correct ones.
    pub fn problems_completed(&self) -> usize {
        match self.mode {
            Mode::Practice => self.answers.len(),
            Mode::SteelGrub => self.answers.iter().filter(|a| a.correct).count(),
        }
    }

    pub fn summary(&self, now_ms: f64) -> QuizSummary {
        let total_ms = self.elapsed_ms(now_ms);
        let incorrect = self.incorrect_count();
        QuizSummary {
            mode: self.mode,
            outcome: Outcome::decide(self.mode, incorrect, total_ms, self.winning_time_ms),
            problems_completed: self.problems_completed(),
            total_problems: self.problems.len(),
            incorrect,
            total_ms,
        }
    }

    /// One row per problem reached, answered or not.
    pub fn breakdown(&self) -> Vec<BreakdownRow> {
        let reached = (self.current + 1).min(self.problems.len());
        self.problems[..reached]
            .iter()
            .enumerate()
            .map(|(i, p)| BreakdownRow {
                number: i + 1,
                question: p.question(),
                expected: p.answer,
                answer: self.answers.get(i).copied(),
            })
            .collect()
    }
}
