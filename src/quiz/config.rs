// Round configuration: length, milestone checkpoints, win threshold.
use crate::error::{QuizError, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

/// Five minutes; a perfect Steel-Grub run at or under this earns the certificate.
pub const WINNING_TIME_THRESHOLD_MS: f64 = 300_000.0;

/// 1-based problem numbers that trigger checkpoint feedback in Steel-Grub mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestones {
    pub checkpoint1: usize,
    pub checkpoint2: usize,
    pub checkpoint3: usize,
    #[serde(rename = "final")]
    pub finish: usize,
}

impl Milestones {
    pub const FULL: Milestones = Milestones { checkpoint1: 11, checkpoint2: 23, checkpoint3: 35, finish: 46 };
    pub const SHORT: Milestones = Milestones { checkpoint1: 2, checkpoint2: 4, checkpoint3: 6, finish: 8 };

    fn as_array(&self) -> [usize; 4] {
        [self.checkpoint1, self.checkpoint2, self.checkpoint3, self.finish]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuizConfig {
    pub total_problems: usize,
    pub milestones: Milestones,
    pub winning_time_ms: f64,
    /// Audio volume in `[0, 1]`.
    pub volume: f64,
    pub log_level: String,
}

impl QuizConfig {
    /// Full 46-problem round.
    pub fn full() -> Self {
        Self {
            total_problems: 46,
            milestones: Milestones::FULL,
            winning_time_ms: WINNING_TIME_THRESHOLD_MS,
            volume: 0.4,
            log_level: default_log_level().to_string(),
        }
    }

    /// Eight-problem round used for playtesting.
    pub fn short() -> Self {
        Self { total_problems: 8, milestones: Milestones::SHORT, ..Self::full() }
    }

    /// Parse from page-supplied JSON; absent fields fall back to `Default`.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: QuizConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.total_problems == 0 {
            return Err(QuizError::InvalidConfig("total_problems must be at least 1".into()));
        }
        let m = self.milestones.as_array();
        if m[0] == 0 || m.windows(2).any(|w| w[0] >= w[1]) {
            return Err(QuizError::InvalidConfig(format!(
                "milestones must be strictly increasing and start at 1 or later, got {m:?}"
            )));
        }
        if self.milestones.finish != self.total_problems {
            return Err(QuizError::InvalidConfig(format!(
                "final milestone {} must equal total_problems {}",
                self.milestones.finish, self.total_problems
            )));
        }
        if !self.winning_time_ms.is_finite() || self.winning_time_ms <= 0.0 {
            return Err(QuizError::InvalidConfig("winning_time_ms must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(QuizError::InvalidConfig(format!("volume {} outside [0, 1]", self.volume)));
        }
        self.log_filter()?;
        Ok(())
    }

    pub fn log_filter(&self) -> Result<LevelFilter> {
        self.log_level
            .parse()
            .map_err(|_| QuizError::InvalidConfig(format!("unknown log level '{}'", self.log_level)))
    }
}

/// Debug builds log round traffic; release builds stay at info.
fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) { "debug" } else { "info" }
}

impl Default for QuizConfig {
    fn default() -> Self {
        if cfg!(feature = "short_round") { Self::short() } else { Self::full() }
    }
}
