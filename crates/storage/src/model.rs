use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use overload_domain::{
    CompletedSet, ExerciseLog, GeneratorOptions, PeriodizationSettings, RepTarget, Reps,
    RepsError, RestGuidance, Session, SetCondition, SetTemplate, StrengthBaseline, Weight,
    WeightError, WeeklyMax,
};

/// Decoding can fail when a persisted record no longer satisfies the
/// domain's validation rules.
#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    #[error(transparent)]
    Weight(#[from] WeightError),
    #[error(transparent)]
    Reps(#[from] RepsError),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StrengthBaselineModel {
    pub exercise_id: Uuid,
    pub weight: f64,
    pub achieved_at: NaiveDateTime,
    pub verified: bool,
    pub verification_session_id: Option<Uuid>,
}

impl From<&StrengthBaseline> for StrengthBaselineModel {
    fn from(value: &StrengthBaseline) -> Self {
        Self {
            exercise_id: *value.exercise_id,
            weight: value.weight.into(),
            achieved_at: value.achieved_at,
            verified: value.verified,
            verification_session_id: value.verification_session_id.map(|id| *id),
        }
    }
}

impl TryFrom<StrengthBaselineModel> for StrengthBaseline {
    type Error = ModelError;

    fn try_from(value: StrengthBaselineModel) -> Result<Self, Self::Error> {
        Ok(Self {
            exercise_id: value.exercise_id.into(),
            weight: Weight::new(value.weight)?,
            achieved_at: value.achieved_at,
            verified: value.verified,
            verification_session_id: value.verification_session_id.map(Into::into),
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RepTargetModel {
    Fixed { reps: u32 },
    Range { min: u32, max: u32 },
    ToFailure,
}

impl From<RepTarget> for RepTargetModel {
    fn from(value: RepTarget) -> Self {
        match value {
            RepTarget::Fixed(reps) => RepTargetModel::Fixed { reps: reps.into() },
            RepTarget::Range { min, max } => RepTargetModel::Range {
                min: min.into(),
                max: max.into(),
            },
            RepTarget::ToFailure => RepTargetModel::ToFailure,
        }
    }
}

impl TryFrom<RepTargetModel> for RepTarget {
    type Error = ModelError;

    fn try_from(value: RepTargetModel) -> Result<Self, Self::Error> {
        Ok(match value {
            RepTargetModel::Fixed { reps } => RepTarget::Fixed(Reps::new(reps)?),
            RepTargetModel::Range { min, max } => RepTarget::Range {
                min: Reps::new(min)?,
                max: Reps::new(max)?,
            },
            RepTargetModel::ToFailure => RepTarget::ToFailure,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RestGuidanceModel {
    Short,
    Medium,
    Long,
}

impl From<RestGuidance> for RestGuidanceModel {
    fn from(value: RestGuidance) -> Self {
        match value {
            RestGuidance::Short => RestGuidanceModel::Short,
            RestGuidance::Medium => RestGuidanceModel::Medium,
            RestGuidance::Long => RestGuidanceModel::Long,
        }
    }
}

impl From<RestGuidanceModel> for RestGuidance {
    fn from(value: RestGuidanceModel) -> Self {
        match value {
            RestGuidanceModel::Short => RestGuidance::Short,
            RestGuidanceModel::Medium => RestGuidance::Medium,
            RestGuidanceModel::Long => RestGuidance::Long,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SetConditionModel {
    Always,
    PriorSetsComplete { count: u32 },
    RepsAchievedInSet { set_number: u32, min_reps: u32 },
    WeightAchievedInSet { set_number: u32, min_weight: f64 },
}

impl From<SetCondition> for SetConditionModel {
    fn from(value: SetCondition) -> Self {
        match value {
            SetCondition::Always => SetConditionModel::Always,
            SetCondition::PriorSetsComplete { count } => {
                SetConditionModel::PriorSetsComplete { count }
            }
            SetCondition::RepsAchievedInSet {
                set_number,
                min_reps,
            } => SetConditionModel::RepsAchievedInSet {
                set_number,
                min_reps: min_reps.into(),
            },
            SetCondition::WeightAchievedInSet {
                set_number,
                min_weight,
            } => SetConditionModel::WeightAchievedInSet {
                set_number,
                min_weight: min_weight.into(),
            },
        }
    }
}

impl TryFrom<SetConditionModel> for SetCondition {
    type Error = ModelError;

    fn try_from(value: SetConditionModel) -> Result<Self, Self::Error> {
        Ok(match value {
            SetConditionModel::Always => SetCondition::Always,
            SetConditionModel::PriorSetsComplete { count } => {
                SetCondition::PriorSetsComplete { count }
            }
            SetConditionModel::RepsAchievedInSet {
                set_number,
                min_reps,
            } => SetCondition::RepsAchievedInSet {
                set_number,
                min_reps: Reps::new(min_reps)?,
            },
            SetConditionModel::WeightAchievedInSet {
                set_number,
                min_weight,
            } => SetCondition::WeightAchievedInSet {
                set_number,
                min_weight: Weight::new(min_weight)?,
            },
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SetTemplateModel {
    pub set_number: u32,
    pub weight: f64,
    pub target: RepTargetModel,
    pub rest: RestGuidanceModel,
    pub intensity: f64,
    pub condition: SetConditionModel,
}

impl From<&SetTemplate> for SetTemplateModel {
    fn from(value: &SetTemplate) -> Self {
        Self {
            set_number: value.set_number,
            weight: value.weight.into(),
            target: value.target.into(),
            rest: value.rest.into(),
            intensity: value.intensity,
            condition: value.condition.into(),
        }
    }
}

impl TryFrom<SetTemplateModel> for SetTemplate {
    type Error = ModelError;

    fn try_from(value: SetTemplateModel) -> Result<Self, Self::Error> {
        Ok(Self {
            set_number: value.set_number,
            weight: Weight::new(value.weight)?,
            target: value.target.try_into()?,
            rest: value.rest.into(),
            intensity: value.intensity,
            condition: value.condition.try_into()?,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CompletedSetModel {
    pub set_number: u32,
    pub weight: f64,
    pub reps: u32,
    pub completed_at: NaiveDateTime,
    pub note: Option<String>,
}

impl From<&CompletedSet> for CompletedSetModel {
    fn from(value: &CompletedSet) -> Self {
        Self {
            set_number: value.set_number,
            weight: value.weight.into(),
            reps: value.reps.into(),
            completed_at: value.completed_at,
            note: value.note.clone(),
        }
    }
}

impl TryFrom<CompletedSetModel> for CompletedSet {
    type Error = ModelError;

    fn try_from(value: CompletedSetModel) -> Result<Self, Self::Error> {
        Ok(Self {
            set_number: value.set_number,
            weight: Weight::new(value.weight)?,
            reps: Reps::new(value.reps)?,
            completed_at: value.completed_at,
            note: value.note,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PeriodizationSettingsModel {
    pub training_max_fraction: f64,
    pub deload_frequency: u32,
    pub auto_deload: bool,
    pub intensity_waves: bool,
}

impl From<&PeriodizationSettings> for PeriodizationSettingsModel {
    fn from(value: &PeriodizationSettings) -> Self {
        Self {
            training_max_fraction: value.training_max_fraction,
            deload_frequency: value.deload_frequency,
            auto_deload: value.auto_deload,
            intensity_waves: value.intensity_waves,
        }
    }
}

impl From<PeriodizationSettingsModel> for PeriodizationSettings {
    fn from(value: PeriodizationSettingsModel) -> Self {
        Self {
            training_max_fraction: value.training_max_fraction,
            deload_frequency: value.deload_frequency,
            auto_deload: value.auto_deload,
            intensity_waves: value.intensity_waves,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct WeeklyMaxModel {
    pub week: u32,
    pub weight: f64,
}

impl From<&WeeklyMax> for WeeklyMaxModel {
    fn from(value: &WeeklyMax) -> Self {
        Self {
            week: value.week,
            weight: value.weight.into(),
        }
    }
}

impl TryFrom<WeeklyMaxModel> for WeeklyMax {
    type Error = ModelError;

    fn try_from(value: WeeklyMaxModel) -> Result<Self, Self::Error> {
        Ok(Self {
            week: value.week,
            weight: Weight::new(value.weight)?,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExerciseLogModel {
    pub exercise_id: Uuid,
    pub starting_baseline: f64,
    pub round_increment: f64,
    pub attempt_increment: f64,
    pub ceiling_fraction: f64,
    pub templates: Vec<SetTemplateModel>,
    pub completed: Vec<CompletedSetModel>,
}

impl From<&ExerciseLog> for ExerciseLogModel {
    fn from(value: &ExerciseLog) -> Self {
        Self {
            exercise_id: *value.exercise_id,
            starting_baseline: value.starting_baseline.into(),
            round_increment: value.options.round_increment,
            attempt_increment: value.options.attempt_increment,
            ceiling_fraction: value.options.ceiling_fraction,
            templates: value.templates.iter().map(Into::into).collect(),
            completed: value.completed.iter().map(Into::into).collect(),
        }
    }
}

impl TryFrom<ExerciseLogModel> for ExerciseLog {
    type Error = ModelError;

    fn try_from(value: ExerciseLogModel) -> Result<Self, Self::Error> {
        Ok(Self {
            exercise_id: value.exercise_id.into(),
            starting_baseline: Weight::new(value.starting_baseline)?,
            options: GeneratorOptions {
                round_increment: value.round_increment,
                attempt_increment: value.attempt_increment,
                ceiling_fraction: value.ceiling_fraction,
            },
            templates: value
                .templates
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<_, _>>()?,
            completed: value
                .completed
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<_, _>>()?,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionModel {
    pub id: Uuid,
    pub date: NaiveDate,
    pub exercises: Vec<ExerciseLogModel>,
}

impl From<&Session> for SessionModel {
    fn from(value: &Session) -> Self {
        Self {
            id: *value.id,
            date: value.date,
            exercises: value.exercises.iter().map(Into::into).collect(),
        }
    }
}

impl TryFrom<SessionModel> for Session {
    type Error = ModelError;

    fn try_from(value: SessionModel) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            date: value.date,
            exercises: value
                .exercises
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<_, _>>()?,
        })
    }
}
