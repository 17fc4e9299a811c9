use chrono::{Duration, NaiveDateTime};
use derive_more::{Display, Into};

use crate::{
    EquipmentClass, SetCondition, Weight, weight_for_percentage,
    formula::{DEFAULT_INCREMENT, round_to_increment},
};

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reps(u32);

impl Reps {
    pub const ONE: Reps = Reps(1);

    pub fn new(value: u32) -> Result<Self, RepsError> {
        if !(0..1000).contains(&value) {
            return Err(RepsError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Reps {
    type Error = RepsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<u32>() {
            Ok(parsed_value) => Reps::new(parsed_value),
            Err(_) => Err(RepsError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RepsError {
    #[error("Reps must be in the range 0 to 999")]
    OutOfRange,
    #[error("Reps must be an integer")]
    ParseError,
}

/// Planned rep prescription for a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepTarget {
    Fixed(Reps),
    Range { min: Reps, max: Reps },
    ToFailure,
}

impl RepTarget {
    /// Minimum rep count that satisfies the prescription. A rep-out set
    /// counts as satisfied with a single rep.
    #[must_use]
    pub fn min_reps(&self) -> Reps {
        match self {
            RepTarget::Fixed(reps) => *reps,
            RepTarget::Range { min, .. } => *min,
            RepTarget::ToFailure => Reps::ONE,
        }
    }
}

impl std::fmt::Display for RepTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepTarget::Fixed(reps) => write!(f, "{reps}"),
            RepTarget::Range { min, max } => write!(f, "{min}-{max}"),
            RepTarget::ToFailure => write!(f, "to failure"),
        }
    }
}

#[derive(Debug, Clone, Copy, Display, PartialEq, Eq)]
pub enum RestGuidance {
    #[display("short")]
    Short,
    #[display("medium")]
    Medium,
    #[display("long")]
    Long,
}

impl RestGuidance {
    /// Advisory rest duration; the lifter is free to deviate.
    #[must_use]
    pub fn duration(self) -> Duration {
        match self {
            RestGuidance::Short => Duration::seconds(60),
            RestGuidance::Medium => Duration::seconds(180),
            RestGuidance::Long => Duration::seconds(300),
        }
    }
}

/// A planned set. Immutable once generated; adaptive behavior appends new
/// templates instead of mutating existing ones.
#[derive(Debug, Clone, PartialEq)]
pub struct SetTemplate {
    pub set_number: u32,
    pub weight: Weight,
    pub target: RepTarget,
    pub rest: RestGuidance,
    /// Fraction of the strength baseline this set is planned at.
    pub intensity: f64,
    pub condition: SetCondition,
}

impl SetTemplate {
    #[must_use]
    pub fn is_conditional(&self) -> bool {
        self.condition != SetCondition::Always
    }
}

/// A logged set. The per-exercise log is append-only; corrections are
/// appended with a note, never edited in place.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedSet {
    pub set_number: u32,
    pub weight: Weight,
    pub reps: Reps,
    pub completed_at: NaiveDateTime,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorOptions {
    pub round_increment: f64,
    pub attempt_increment: f64,
    /// Maximum same-session progression above the starting baseline.
    pub ceiling_fraction: f64,
}

impl GeneratorOptions {
    #[must_use]
    pub fn for_equipment(equipment: EquipmentClass) -> Self {
        Self {
            round_increment: equipment.round_increment(),
            attempt_increment: equipment.attempt_increment(),
            ..Self::default()
        }
    }
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            round_increment: DEFAULT_INCREMENT,
            attempt_increment: DEFAULT_INCREMENT,
            ceiling_fraction: 0.20,
        }
    }
}

const WARM_UP_FRACTION: f64 = 0.35;
const RAMP_FRACTIONS: [f64; 2] = [0.80, 0.90];

/// Builds the set pyramid for one exercise: warm-up, two ramp singles, the
/// max attempt, and conditional progressive attempts up to the progression
/// ceiling. Down-sets are not part of the pyramid; they exist only after a
/// failed attempt.
#[must_use]
pub fn pyramid(baseline: Weight, options: &GeneratorOptions) -> Vec<SetTemplate> {
    let base = f64::from(baseline);
    if base <= 0.0 {
        return vec![];
    }

    let mut sets = vec![SetTemplate {
        set_number: 1,
        weight: weight_for_percentage(baseline, WARM_UP_FRACTION, options.round_increment),
        target: RepTarget::Fixed(Reps(6)),
        rest: RestGuidance::Short,
        intensity: WARM_UP_FRACTION,
        condition: SetCondition::Always,
    }];

    for (i, fraction) in RAMP_FRACTIONS.iter().enumerate() {
        sets.push(SetTemplate {
            set_number: u32::try_from(i).unwrap_or_default() + 2,
            weight: weight_for_percentage(baseline, *fraction, options.round_increment),
            target: RepTarget::Fixed(Reps::ONE),
            rest: RestGuidance::Medium,
            intensity: *fraction,
            condition: SetCondition::Always,
        });
    }

    sets.push(SetTemplate {
        set_number: 4,
        weight: weight_for_percentage(baseline, 1.0, options.round_increment),
        target: RepTarget::Fixed(Reps::ONE),
        rest: RestGuidance::Long,
        intensity: 1.0,
        condition: SetCondition::Always,
    });

    let start = round_to_increment(base, options.round_increment);
    let ceiling = base * (1.0 + options.ceiling_fraction) + 1e-9;
    let mut set_number = 5;
    loop {
        let value = start + f64::from(set_number - 4) * options.attempt_increment;
        if value > ceiling {
            break;
        }
        // A baseline near the top of the weight range reaches the
        // representable limit before the progression ceiling.
        let Ok(weight) = Weight::new(value) else {
            break;
        };
        sets.push(SetTemplate {
            set_number,
            weight,
            target: RepTarget::Fixed(Reps::ONE),
            rest: RestGuidance::Long,
            intensity: value / base,
            condition: SetCondition::RepsAchievedInSet {
                set_number: set_number - 1,
                min_reps: Reps::ONE,
            },
        });
        set_number += 1;
    }

    sets
}
