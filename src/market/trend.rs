/// Trend classification over recent price history

use crate::config::Config;
use crate::market::history::{TrendDirection, TrendState};

/// Tunables for both classifiers, lifted out of the live config once per
/// evaluation pass.
#[derive(Debug, Clone, Copy)]
pub struct TrendTunables {
    /// Per-step percent change that counts toward a streak.
    pub step_threshold_pct: f64,
    /// Window for the coarse monotonic label.
    pub trend_window: usize,
    /// Window for the percent-change streak test.
    pub streak_window: usize,
    /// Up-streak count at which the rising signal escalates.
    pub escalation_streak: u32,
}

impl TrendTunables {
    pub fn from_config(config: &Config) -> Self {
        Self {
            step_threshold_pct: config.percent_step_threshold,
            trend_window: config.trend_window.max(2),
            streak_window: config.streak_window.max(2),
            escalation_streak: config.streak_escalation.max(1),
        }
    }
}

impl Default for TrendTunables {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Coarse label derived from the last few samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum TrendLabel {
    Stable,
    Warning,
    Riser,
}

impl std::fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TrendLabel::Stable => write!(f, "Stable"),
            TrendLabel::Warning => write!(f, "WARNING"),
            TrendLabel::Riser => write!(f, "RISER"),
        }
    }
}

/// Fine-grained streak outcome for one evaluation of one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakSignal {
    /// Every step in the window rose past the threshold.
    Rising { streak: u32 },
    /// Rising, and the streak reached the escalation count. Supersedes the
    /// plain rising signal for the cycle.
    MajorRise { streak: u32 },
    /// Every step in the window fell past the threshold. Never escalates.
    Dipping,
}

pub fn percent_change(from: f64, to: f64) -> f64 {
    if from == 0.0 {
        return 0.0;
    }
    (to - from) / from * 100.0
}

/// Monotonic direction test over the last `trend_window` samples. Strictly
/// decreasing is `Warning`, strictly increasing is `Riser`, anything else
/// (including too little history) is `Stable`.
pub fn classify_monotonic(values: &[f64], tunables: &TrendTunables) -> TrendLabel {
    let window = tunables.trend_window;
    if values.len() < window {
        return TrendLabel::Stable;
    }
    let tail = &values[values.len() - window..];
    if tail.windows(2).all(|w| w[0] > w[1]) {
        TrendLabel::Warning
    } else if tail.windows(2).all(|w| w[0] < w[1]) {
        TrendLabel::Riser
    } else {
        TrendLabel::Stable
    }
}

/// Percent-change streak test over the last `streak_window` samples,
/// updating `state` as a side effect.
///
/// A qualifying up window extends the streak (or starts it at 1); down
/// windows force the streak to 0 and anything else resets the state
/// entirely. Too little history yields no signal and leaves the state
/// alone.
pub fn evaluate_streak(
    values: &[f64],
    state: &mut TrendState,
    tunables: &TrendTunables,
) -> Option<StreakSignal> {
    let window = tunables.streak_window;
    if values.len() < window {
        return None;
    }
    let tail = &values[values.len() - window..];
    let steps: Vec<f64> = tail.windows(2).map(|w| percent_change(w[0], w[1])).collect();

    let threshold = tunables.step_threshold_pct;
    if steps.iter().all(|&c| c > threshold) {
        if state.last_direction == TrendDirection::Up {
            state.streak += 1;
        } else {
            state.last_direction = TrendDirection::Up;
            state.streak = 1;
        }
        if state.streak >= tunables.escalation_streak {
            Some(StreakSignal::MajorRise {
                streak: state.streak,
            })
        } else {
            Some(StreakSignal::Rising {
                streak: state.streak,
            })
        }
    } else if steps.iter().all(|&c| c < -threshold) {
        state.last_direction = TrendDirection::Down;
        state.streak = 0;
        Some(StreakSignal::Dipping)
    } else {
        state.last_direction = TrendDirection::Neutral;
        state.streak = 0;
        None
    }
}
