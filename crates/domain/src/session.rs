use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use derive_more::Deref;
use uuid::Uuid;

use crate::{
    CompletedSet, ExerciseID, ExerciseMetadata, GeneratorOptions, MaxAttemptOutcome,
    PeriodizationPlan, PeriodizationSettings, Phase, Reps, SetStatus, SetTemplate, Weight,
    condition, protocol, template::pyramid,
};

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SessionID(Uuid);

impl SessionID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for SessionID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for SessionID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

/// Per-exercise state within one workout: the generated templates and the
/// append-only completed-set log. Templates are appended (unlock,
/// down-sets), never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseLog {
    pub exercise_id: ExerciseID,
    pub starting_baseline: Weight,
    pub options: GeneratorOptions,
    pub templates: Vec<SetTemplate>,
    pub completed: Vec<CompletedSet>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: SessionID,
    pub date: NaiveDate,
    pub exercises: Vec<ExerciseLog>,
}

/// Result of logging one set.
#[derive(Debug, Clone, PartialEq)]
pub struct LogOutcome {
    pub completed_set: CompletedSet,
    pub max_outcome: Option<MaxAttemptOutcome>,
    /// Templates that became visible because of this set.
    pub unlocked: Vec<SetTemplate>,
    /// Back-off templates appended after a failed max attempt.
    pub down_sets: Vec<SetTemplate>,
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum LogSetError {
    #[error("no set {0} in this exercise")]
    UnknownSet(u32),
    #[error("set {0} was already logged; use an amendment")]
    DuplicateSet(u32),
    #[error("set {0} is not unlocked yet")]
    SetNotVisible(u32),
    #[error("set {0} has no entry to amend")]
    NothingToAmend(u32),
}

impl ExerciseLog {
    #[must_use]
    pub fn start(exercise: &ExerciseMetadata, baseline: Weight) -> Self {
        let options = GeneratorOptions::for_equipment(exercise.equipment);
        Self {
            exercise_id: exercise.id,
            starting_baseline: baseline,
            options,
            templates: pyramid(baseline, &options),
            completed: vec![],
        }
    }

    /// Starts an exercise from the week's periodized working max: the
    /// training-max fraction and the deload/wave multiplier scale the
    /// baseline before per-set rounding, so every exposed weight is still
    /// rounded exactly once. The true max stays the progression reference,
    /// which keeps reduced-intensity weeks from proposing a lower baseline.
    #[must_use]
    pub fn start_periodized(
        exercise: &ExerciseMetadata,
        true_max: Weight,
        plan: &PeriodizationPlan,
        settings: &PeriodizationSettings,
    ) -> Self {
        let options = GeneratorOptions::for_equipment(exercise.equipment);
        let effective = Weight::raw(
            f64::from(true_max) * settings.training_max_fraction * plan.intensity_multiplier,
        );
        Self {
            exercise_id: exercise.id,
            starting_baseline: true_max,
            options,
            templates: pyramid(effective, &options),
            completed: vec![],
        }
    }

    #[must_use]
    pub fn visible_sets(&self) -> Vec<&SetTemplate> {
        condition::evaluate_all(&self.templates, &self.completed)
            .into_iter()
            .filter(|(_, evaluation)| evaluation.status.should_display())
            .map(|(template, _)| template)
            .collect()
    }

    /// Logs a set, re-evaluates visibility, and runs the max-attempt
    /// protocol when the logged set was a max-effort slot.
    pub fn log_set(
        &mut self,
        set_number: u32,
        weight: Weight,
        reps: Reps,
        now: NaiveDateTime,
    ) -> Result<LogOutcome, LogSetError> {
        let template = self
            .templates
            .iter()
            .find(|t| t.set_number == set_number)
            .cloned()
            .ok_or(LogSetError::UnknownSet(set_number))?;

        if self.completed.iter().any(|c| c.set_number == set_number) {
            return Err(LogSetError::DuplicateSet(set_number));
        }

        if condition::evaluate(&template, &self.completed).status != SetStatus::Unlocked {
            return Err(LogSetError::SetNotVisible(set_number));
        }

        let visible_before = self.unlocked_set_numbers();

        let completed_set = CompletedSet {
            set_number,
            weight,
            reps,
            completed_at: now,
            note: None,
        };
        self.completed.push(completed_set.clone());

        let max_outcome = protocol::is_max_attempt(&template).then(|| {
            protocol::evaluate_max_attempt(
                weight,
                reps,
                template.target.min_reps(),
                self.starting_baseline,
                &self.completed,
                self.options.attempt_increment,
            )
        });

        let mut down_sets = vec![];
        if let Some(outcome) = &max_outcome
            && outcome.next_action == protocol::NextAction::DownSets
        {
            let effective_max = outcome
                .proposed_baseline
                .unwrap_or(self.starting_baseline);
            down_sets = protocol::down_sets(
                effective_max,
                self.next_set_number(),
                self.options.round_increment,
            );
            self.templates.extend(down_sets.iter().cloned());
        }

        let unlocked = self
            .templates
            .iter()
            .filter(|t| {
                !visible_before.contains(&t.set_number)
                    && !down_sets.iter().any(|d| d.set_number == t.set_number)
                    && condition::evaluate(t, &self.completed).status == SetStatus::Unlocked
            })
            .cloned()
            .collect();

        Ok(LogOutcome {
            completed_set,
            max_outcome,
            unlocked,
            down_sets,
        })
    }

    /// Appends a correcting entry for an already-logged set. The original
    /// entry is kept; the log stays append-only.
    pub fn amend_set(
        &mut self,
        set_number: u32,
        weight: Weight,
        reps: Reps,
        note: &str,
        now: NaiveDateTime,
    ) -> Result<CompletedSet, LogSetError> {
        if !self.completed.iter().any(|c| c.set_number == set_number) {
            return Err(LogSetError::NothingToAmend(set_number));
        }

        let entry = CompletedSet {
            set_number,
            weight,
            reps,
            completed_at: now,
            note: Some(note.to_string()),
        };
        self.completed.push(entry.clone());
        Ok(entry)
    }

    fn unlocked_set_numbers(&self) -> Vec<u32> {
        condition::evaluate_all(&self.templates, &self.completed)
            .into_iter()
            .filter(|(_, evaluation)| evaluation.status == SetStatus::Unlocked)
            .map(|(template, _)| template.set_number)
            .collect()
    }

    fn next_set_number(&self) -> u32 {
        self.templates
            .iter()
            .map(|t| t.set_number)
            .max()
            .unwrap_or_default()
            + 1
    }
}

#[must_use]
pub fn generate_sets(exercise: &ExerciseMetadata, baseline: Weight) -> Vec<SetTemplate> {
    pyramid(baseline, &GeneratorOptions::for_equipment(exercise.equipment))
}

/// Max testing during a deload week is discouraged but not blocked.
#[must_use]
pub fn max_testing_advisable(plan: &PeriodizationPlan) -> bool {
    plan.phase != Phase::Deload
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    pub total_sets: usize,
    /// Sum of weight x reps over all completed sets.
    pub total_volume: f64,
    pub avg_reps: Option<f64>,
    pub top_weights: BTreeMap<ExerciseID, Weight>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProposedBaseline {
    pub exercise_id: ExerciseID,
    pub weight: Weight,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub proposed_baselines: Vec<ProposedBaseline>,
    pub stats: SessionStats,
}

/// Aggregates a finished session and proposes baseline increases for the
/// ledger to verify. Proposals use the authoritative post-hoc rule.
#[must_use]
pub fn complete_session(session: &Session) -> SessionSummary {
    let proposed_baselines = session
        .exercises
        .iter()
        .filter_map(|log| {
            protocol::calculate_new_max(&log.completed)
                .filter(|new_max| *new_max > log.starting_baseline)
                .map(|weight| ProposedBaseline {
                    exercise_id: log.exercise_id,
                    weight,
                })
        })
        .collect();

    let all_sets = session
        .exercises
        .iter()
        .flat_map(|log| log.completed.iter())
        .collect::<Vec<_>>();

    #[allow(clippy::cast_precision_loss)]
    let avg_reps = if all_sets.is_empty() {
        None
    } else {
        Some(
            all_sets
                .iter()
                .map(|c| f64::from(u32::from(c.reps)))
                .sum::<f64>()
                / all_sets.len() as f64,
        )
    };

    let top_weights = session
        .exercises
        .iter()
        .filter_map(|log| {
            log.completed
                .iter()
                .map(|c| f64::from(c.weight))
                .max_by(f64::total_cmp)
                .map(|w| (log.exercise_id, Weight::raw(w)))
        })
        .collect();

    SessionSummary {
        proposed_baselines,
        stats: SessionStats {
            total_sets: all_sets.len(),
            total_volume: all_sets
                .iter()
                .map(|c| f64::from(c.weight) * f64::from(u32::from(c.reps)))
                .sum(),
            avg_reps,
            top_weights,
        },
    }
}
