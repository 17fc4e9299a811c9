#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod condition;
pub mod error;
pub mod exercise;
pub mod formula;
pub mod ledger;
pub mod periodization;
pub mod protocol;
pub mod service;
pub mod session;
pub mod template;

pub use condition::{Evaluation, SetCondition, SetStatus, evaluate, evaluate_all};
pub use error::{ReadError, StorageError, UpdateError};
pub use exercise::{
    EquipmentClass, ExerciseID, ExerciseLookup, ExerciseMetadata, MuscleGroup, Name, NameError,
};
pub use formula::{
    Unit, Weight, WeightError, accessory_weight, convert_units, weight_for_percentage,
};
pub use ledger::{ReadinessSignal, SafetyGuard, Severity, StrengthBaseline, VerifyError};
pub use periodization::{
    ExperienceLevel, Mode, PeriodizationPlan, PeriodizationSettings, Phase, WeeklyMax,
};
pub use protocol::{MaxAttemptOutcome, NextAction};
pub use service::{
    BaselineRepository, Clock, Service, SessionOpError, SessionRepository, SettingsRepository,
    StartExerciseError, WeeklyMaxRepository,
};
pub use session::{
    ExerciseLog, LogOutcome, LogSetError, ProposedBaseline, Session, SessionID, SessionStats,
    SessionSummary, complete_session, generate_sets, max_testing_advisable,
};
pub use template::{
    CompletedSet, GeneratorOptions, RepTarget, Reps, RepsError, RestGuidance, SetTemplate,
};
