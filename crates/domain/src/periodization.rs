use derive_more::Display;

use crate::{Weight, formula::round_to_increment};

pub const DELOAD_MULTIPLIER: f64 = 0.70;

/// Outcomes considered by auto-deload detection.
const AUTO_DELOAD_WINDOW: usize = 4;
const CONSECUTIVE_FAILURE_LIMIT: usize = 3;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    #[display("normal")]
    Normal,
    #[display("deload")]
    Deload,
    #[display("wave light")]
    WaveLight,
    #[display("wave medium")]
    WaveMedium,
    #[display("wave heavy")]
    WaveHeavy,
}

impl Phase {
    #[must_use]
    pub fn multiplier(self) -> f64 {
        match self {
            Phase::Normal => 1.0,
            Phase::Deload => DELOAD_MULTIPLIER,
            Phase::WaveLight => 0.85,
            Phase::WaveMedium => 0.90,
            Phase::WaveHeavy => 0.95,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodizationSettings {
    /// Fraction of the true max used as the working training max.
    pub training_max_fraction: f64,
    /// Scheduled deload every this many weeks.
    pub deload_frequency: u32,
    pub auto_deload: bool,
    pub intensity_waves: bool,
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[display("conservative")]
    Conservative,
    #[display("moderate")]
    Moderate,
    #[display("aggressive")]
    Aggressive,
}

impl Mode {
    #[must_use]
    pub fn settings(self) -> PeriodizationSettings {
        match self {
            Mode::Conservative => PeriodizationSettings {
                training_max_fraction: 0.90,
                deload_frequency: 4,
                auto_deload: true,
                intensity_waves: true,
            },
            Mode::Moderate => PeriodizationSettings {
                training_max_fraction: 0.95,
                deload_frequency: 5,
                auto_deload: true,
                intensity_waves: true,
            },
            Mode::Aggressive => PeriodizationSettings {
                training_max_fraction: 1.0,
                deload_frequency: 6,
                auto_deload: false,
                intensity_waves: false,
            },
        }
    }
}

impl Default for PeriodizationSettings {
    fn default() -> Self {
        Mode::Moderate.settings()
    }
}

/// Pure function of the week number and history; no hidden counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodizationPlan {
    pub week: u32,
    pub phase: Phase,
    pub intensity_multiplier: f64,
    pub next_deload_week: u32,
}

#[must_use]
pub fn training_max(true_max: Weight, settings: &PeriodizationSettings) -> Weight {
    Weight::raw(round_to_increment(
        f64::from(true_max) * settings.training_max_fraction,
        5.0,
    ))
}

/// Whether `week` is a deload week. Evaluated in priority order:
/// schedule, failure-rate detection, consecutive-failure detection.
/// `recent_outcomes` is ordered oldest first.
#[must_use]
pub fn should_deload(
    week: u32,
    last_deload_week: u32,
    recent_outcomes: &[bool],
    settings: &PeriodizationSettings,
) -> bool {
    if week.saturating_sub(last_deload_week) >= settings.deload_frequency {
        return true;
    }

    if settings.auto_deload {
        let window = &recent_outcomes[recent_outcomes.len().saturating_sub(AUTO_DELOAD_WINDOW)..];
        if !window.is_empty() {
            let failures = window.iter().filter(|success| !**success).count();
            if failures * 2 >= window.len() {
                return true;
            }
        }

        let tail = &recent_outcomes
            [recent_outcomes.len().saturating_sub(CONSECUTIVE_FAILURE_LIMIT)..];
        if tail.len() == CONSECUTIVE_FAILURE_LIMIT && tail.iter().all(|success| !*success) {
            return true;
        }
    }

    false
}

/// Position on the repeating 3-week intensity wave, or `None` when waves
/// are disabled or no training week has elapsed since the last deload.
#[must_use]
pub fn intensity_wave(week: u32, last_deload_week: u32, enabled: bool) -> Option<Phase> {
    if !enabled || week <= last_deload_week {
        return None;
    }

    match (week - last_deload_week - 1) % 3 + 1 {
        1 => Some(Phase::WaveLight),
        2 => Some(Phase::WaveMedium),
        _ => Some(Phase::WaveHeavy),
    }
}

#[must_use]
pub fn plan(
    week: u32,
    last_deload_week: u32,
    recent_outcomes: &[bool],
    settings: &PeriodizationSettings,
) -> PeriodizationPlan {
    let (phase, next_deload_week) =
        if should_deload(week, last_deload_week, recent_outcomes, settings) {
            (Phase::Deload, week + settings.deload_frequency)
        } else {
            (
                intensity_wave(week, last_deload_week, settings.intensity_waves)
                    .unwrap_or(Phase::Normal),
                last_deload_week + settings.deload_frequency,
            )
        };

    PeriodizationPlan {
        week,
        phase,
        intensity_multiplier: phase.multiplier(),
        next_deload_week,
    }
}

/// Composes training-max percentage, set-specific target fraction, and the
/// week's multiplier, rounding once at the end.
#[must_use]
pub fn periodized_weight(
    true_max: Weight,
    target_fraction: f64,
    plan: &PeriodizationPlan,
    settings: &PeriodizationSettings,
) -> Weight {
    Weight::raw(round_to_increment(
        f64::from(true_max)
            * settings.training_max_fraction
            * target_fraction
            * plan.intensity_multiplier,
        5.0,
    ))
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceLevel {
    #[display("beginner")]
    Beginner,
    #[display("intermediate")]
    Intermediate,
    #[display("advanced")]
    Advanced,
}

/// Best verified weight observed in one calendar week.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeeklyMax {
    pub week: u32,
    pub weight: Weight,
}

const RECOMMENDATION_WINDOW: usize = 8;
const REGRESSION_LIMIT: usize = 3;
const PROGRESSION_LIMIT: usize = 6;

/// Advisory mode recommendation. Beginners always get the conservative
/// bundle, advanced lifters the aggressive one; intermediates are judged
/// on their trailing eight weekly-max records.
#[must_use]
pub fn recommend_mode(level: ExperienceLevel, weekly_maxes: &[WeeklyMax]) -> Mode {
    match level {
        ExperienceLevel::Beginner => Mode::Conservative,
        ExperienceLevel::Advanced => Mode::Aggressive,
        ExperienceLevel::Intermediate => {
            let window =
                &weekly_maxes[weekly_maxes.len().saturating_sub(RECOMMENDATION_WINDOW)..];
            let regressions = window
                .windows(2)
                .filter(|pair| pair[1].weight < pair[0].weight)
                .count();
            let progressions = window
                .windows(2)
                .filter(|pair| pair[1].weight > pair[0].weight)
                .count();

            if regressions >= REGRESSION_LIMIT {
                Mode::Conservative
            } else if progressions >= PROGRESSION_LIMIT {
                Mode::Aggressive
            } else {
                Mode::Moderate
            }
        }
    }
}
