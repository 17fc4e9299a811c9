use derive_more::Display;

use crate::{CompletedSet, Reps, SetTemplate, Weight};

/// Visibility condition of a planned set, evaluated against the
/// completed-set history. A closed sum type so the evaluator is checked
/// exhaustively.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SetCondition {
    Always,
    PriorSetsComplete { count: u32 },
    RepsAchievedInSet { set_number: u32, min_reps: Reps },
    WeightAchievedInSet { set_number: u32, min_weight: Weight },
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum SetStatus {
    #[display("locked")]
    Locked,
    #[display("pending")]
    Pending,
    #[display("unlocked")]
    Unlocked,
    #[display("completed")]
    Completed,
}

impl SetStatus {
    /// Locked and pending sets are hidden from the lifter; pending exists
    /// only for "next up" hinting.
    #[must_use]
    pub fn should_display(self) -> bool {
        matches!(self, SetStatus::Unlocked | SetStatus::Completed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub status: SetStatus,
    pub reason: String,
    pub progress: Option<String>,
}

/// Evaluates one template against the current history. Pure: identical
/// inputs always produce the identical evaluation.
#[must_use]
pub fn evaluate(template: &SetTemplate, history: &[CompletedSet]) -> Evaluation {
    if history.iter().any(|c| c.set_number == template.set_number) {
        return Evaluation {
            status: SetStatus::Completed,
            reason: "logged".to_string(),
            progress: None,
        };
    }

    let (satisfied, reason, progress) = match template.condition {
        SetCondition::Always => (true, "always visible".to_string(), None),
        SetCondition::PriorSetsComplete { count } => {
            let done = u32::try_from(history.iter().filter(|c| c.reps > Reps::default()).count())
                .unwrap_or(u32::MAX);
            if done >= count {
                (true, format!("{count} prior sets complete"), None)
            } else {
                (
                    false,
                    format!("waiting for {count} completed sets"),
                    Some(format!("{done}/{count} sets")),
                )
            }
        }
        SetCondition::RepsAchievedInSet {
            set_number,
            min_reps,
        } => {
            let best = history
                .iter()
                .filter(|c| c.set_number == set_number)
                .map(|c| c.reps)
                .max();
            match best {
                Some(reps) if reps >= min_reps => {
                    (true, format!("set {set_number} reached {min_reps} reps"), None)
                }
                Some(reps) => (
                    false,
                    format!("waiting for {min_reps} reps in set {set_number}"),
                    Some(format!("{reps}/{min_reps} reps")),
                ),
                None => (false, format!("waiting for set {set_number}"), None),
            }
        }
        SetCondition::WeightAchievedInSet {
            set_number,
            min_weight,
        } => {
            let best = history
                .iter()
                .filter(|c| c.set_number == set_number)
                .map(|c| f64::from(c.weight))
                .max_by(f64::total_cmp)
                .map(Weight::raw);
            match best {
                Some(weight) if weight >= min_weight => (
                    true,
                    format!("set {set_number} reached {min_weight}"),
                    None,
                ),
                Some(weight) => (
                    false,
                    format!("waiting for {min_weight} in set {set_number}"),
                    Some(format!("{weight}/{min_weight}")),
                ),
                None => (false, format!("waiting for set {set_number}"), None),
            }
        }
    };

    if satisfied {
        return Evaluation {
            status: SetStatus::Unlocked,
            reason,
            progress,
        };
    }

    // The set right before this one has been logged, so this one is next up.
    let prior_logged = template.set_number > 1
        && history
            .iter()
            .any(|c| c.set_number == template.set_number - 1);

    Evaluation {
        status: if prior_logged {
            SetStatus::Pending
        } else {
            SetStatus::Locked
        },
        reason,
        progress,
    }
}

#[must_use]
pub fn evaluate_all<'a>(
    templates: &'a [SetTemplate],
    history: &[CompletedSet],
) -> Vec<(&'a SetTemplate, Evaluation)> {
    templates
        .iter()
        .map(|template| (template, evaluate(template, history)))
        .collect()
}
