use derive_more::Display;

use crate::{
    CompletedSet, RepTarget, Reps, RestGuidance, SetCondition, SetTemplate, Weight,
    formula::round_to_increment, weight_for_percentage,
};

/// Intensity fraction at and above which a logged set counts as a max
/// attempt.
pub const MAX_ATTEMPT_INTENSITY: f64 = 0.90;

/// First set number that can be a max-effort slot.
pub const FIRST_MAX_ATTEMPT_SET: u32 = 4;

/// A retry weight never exceeds the session's starting baseline by more
/// than this fraction.
pub const PROGRESSION_CEILING: f64 = 0.20;

const DOWN_SET_FRACTION: f64 = 0.80;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    #[display("retry higher")]
    RetryHigher,
    #[display("down sets")]
    DownSets,
    #[display("session complete")]
    SessionComplete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaxAttemptOutcome {
    pub attempted_weight: Weight,
    pub reps_completed: Reps,
    pub success: bool,
    pub next_action: NextAction,
    /// Weight of the next attempt, when `next_action` is `RetryHigher`.
    pub next_weight: Option<Weight>,
    pub proposed_baseline: Option<Weight>,
}

#[must_use]
pub fn is_max_attempt(template: &SetTemplate) -> bool {
    template.intensity >= MAX_ATTEMPT_INTENSITY && template.set_number >= FIRST_MAX_ATTEMPT_SET
}

/// Evaluates a 1RM-style max attempt.
///
/// Success proposes the next attempt one equipment increment higher unless
/// that would exceed the progression ceiling, in which case the session is
/// complete at the attempted weight. Failure redirects to down-sets, and
/// any earlier successful attempt above the starting baseline becomes the
/// proposed baseline.
#[must_use]
pub fn evaluate_max_attempt(
    attempted_weight: Weight,
    reps_completed: Reps,
    target_reps: Reps,
    starting_baseline: Weight,
    history: &[CompletedSet],
    increment: f64,
) -> MaxAttemptOutcome {
    let success = reps_completed >= target_reps;
    let ceiling = f64::from(starting_baseline) * (1.0 + PROGRESSION_CEILING) + 1e-9;

    if success {
        // The lifter may have logged an off-increment weight; the retry
        // suggestion still has to land on a loadable multiple.
        let next = round_to_increment(f64::from(attempted_weight) + increment, increment);
        let next_weight = Weight::new(next).ok().filter(|_| next <= ceiling);
        if let Some(next_weight) = next_weight {
            MaxAttemptOutcome {
                attempted_weight,
                reps_completed,
                success,
                next_action: NextAction::RetryHigher,
                next_weight: Some(next_weight),
                proposed_baseline: Some(attempted_weight),
            }
        } else {
            MaxAttemptOutcome {
                attempted_weight,
                reps_completed,
                success,
                next_action: NextAction::SessionComplete,
                next_weight: None,
                proposed_baseline: Some(attempted_weight),
            }
        }
    } else {
        MaxAttemptOutcome {
            attempted_weight,
            reps_completed,
            success,
            next_action: NextAction::DownSets,
            next_weight: None,
            proposed_baseline: highest_successful_attempt(history, starting_baseline),
        }
    }
}

/// Moderate-rep variant: the attempt succeeds by completing two reps more
/// than the target at the target weight, instead of a binary single.
#[must_use]
pub fn evaluate_rep_based_progression(
    attempted_weight: Weight,
    target_weight: Weight,
    reps_completed: Reps,
    target_reps: Reps,
    starting_baseline: Weight,
    history: &[CompletedSet],
    increment: f64,
) -> MaxAttemptOutcome {
    let overshoot =
        Reps::new(u32::from(target_reps).saturating_add(2)).unwrap_or(Reps::ONE);
    let success = attempted_weight >= target_weight && reps_completed >= overshoot;

    let mut outcome = evaluate_max_attempt(
        attempted_weight,
        if success { overshoot } else { Reps::default() },
        overshoot,
        starting_baseline,
        history,
        increment,
    );
    outcome.reps_completed = reps_completed;
    outcome
}

/// Back-off volume work after a failed attempt: three sets at 80% of the
/// effective max, 8 / 8 / to-failure.
#[must_use]
pub fn down_sets(effective_max: Weight, first_set_number: u32, increment: f64) -> Vec<SetTemplate> {
    let weight = weight_for_percentage(effective_max, DOWN_SET_FRACTION, increment);
    let plan: [(RepTarget, RestGuidance); 3] = [
        (RepTarget::Fixed(Reps::new(8).unwrap_or(Reps::ONE)), RestGuidance::Medium),
        (RepTarget::Fixed(Reps::new(8).unwrap_or(Reps::ONE)), RestGuidance::Medium),
        (RepTarget::ToFailure, RestGuidance::Short),
    ];
    plan.into_iter()
        .enumerate()
        .map(|(i, (target, rest))| SetTemplate {
            set_number: first_set_number + u32::try_from(i).unwrap_or_default(),
            weight,
            target,
            rest,
            intensity: DOWN_SET_FRACTION,
            condition: SetCondition::Always,
        })
        .collect()
}

/// Authoritative post-hoc rule: the new max is the highest weight among
/// completed sets with at least one rep, independent of set order.
#[must_use]
pub fn calculate_new_max(history: &[CompletedSet]) -> Option<Weight> {
    history
        .iter()
        .filter(|c| c.reps >= Reps::ONE)
        .map(|c| f64::from(c.weight))
        .max_by(f64::total_cmp)
        .map(Weight::raw)
}

fn highest_successful_attempt(
    history: &[CompletedSet],
    starting_baseline: Weight,
) -> Option<Weight> {
    history
        .iter()
        .filter(|c| {
            c.set_number >= FIRST_MAX_ATTEMPT_SET
                && c.reps >= Reps::ONE
                && c.weight > starting_baseline
        })
        .map(|c| f64::from(c.weight))
        .max_by(f64::total_cmp)
        .map(Weight::raw)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn completed(set_number: u32, weight: f64, reps: u32) -> CompletedSet {
        CompletedSet {
            set_number,
            weight: Weight::new(weight).unwrap(),
            reps: Reps::new(reps).unwrap(),
            completed_at: NaiveDateTime::default(),
            note: None,
        }
    }

    fn template(set_number: u32, intensity: f64) -> SetTemplate {
        SetTemplate {
            set_number,
            weight: Weight::new(225.0).unwrap(),
            target: RepTarget::Fixed(Reps::ONE),
            rest: RestGuidance::Long,
            intensity,
            condition: SetCondition::Always,
        }
    }

    #[rstest]
    #[case::max_attempt_slot(4, 1.0, true)]
    #[case::ramp_intensity_counts(4, 0.90, true)]
    #[case::progressive_attempt(5, 1.02, true)]
    #[case::too_early(3, 0.90, false)]
    #[case::too_light(4, 0.80, false)]
    fn test_is_max_attempt(#[case] set_number: u32, #[case] intensity: f64, #[case] expected: bool) {
        assert_eq!(is_max_attempt(&template(set_number, intensity)), expected);
    }

    #[test]
    fn test_successful_attempt_proposes_retry() {
        let outcome = evaluate_max_attempt(
            Weight::new(225.0).unwrap(),
            Reps::ONE,
            Reps::ONE,
            Weight::new(225.0).unwrap(),
            &[],
            5.0,
        );

        assert!(outcome.success);
        assert_eq!(outcome.next_action, NextAction::RetryHigher);
        assert_eq!(outcome.next_weight, Some(Weight::new(230.0).unwrap()));
        assert_eq!(outcome.proposed_baseline, Some(Weight::new(225.0).unwrap()));
    }

    #[rstest]
    #[case::on_increment(225.0, 230.0)]
    #[case::just_above_increment(227.0, 230.0)]
    #[case::just_below_increment(229.0, 235.0)]
    fn test_retry_weight_is_a_loadable_multiple(#[case] attempted: f64, #[case] next: f64) {
        let outcome = evaluate_max_attempt(
            Weight::new(attempted).unwrap(),
            Reps::ONE,
            Reps::ONE,
            Weight::new(225.0).unwrap(),
            &[],
            5.0,
        );

        assert_eq!(outcome.next_weight, Some(Weight::new(next).unwrap()));
        assert_eq!(f64::from(outcome.next_weight.unwrap()) % 5.0, 0.0);
    }

    #[test]
    fn test_ceiling_completes_session() {
        // 270 is the ceiling for a 225 baseline; 270 + 5 would exceed it
        let outcome = evaluate_max_attempt(
            Weight::new(270.0).unwrap(),
            Reps::ONE,
            Reps::ONE,
            Weight::new(225.0).unwrap(),
            &[],
            5.0,
        );

        assert!(outcome.success);
        assert_eq!(outcome.next_action, NextAction::SessionComplete);
        assert_eq!(outcome.next_weight, None);
        assert_eq!(outcome.proposed_baseline, Some(Weight::new(270.0).unwrap()));
    }

    #[test]
    fn test_failed_attempt_redirects_to_down_sets() {
        let outcome = evaluate_max_attempt(
            Weight::new(225.0).unwrap(),
            Reps::default(),
            Reps::ONE,
            Weight::new(225.0).unwrap(),
            &[],
            5.0,
        );

        assert!(!outcome.success);
        assert_eq!(outcome.next_action, NextAction::DownSets);
        assert_eq!(outcome.proposed_baseline, None);
    }

    #[test]
    fn test_failed_attempt_keeps_earlier_earned_increase() {
        let history = [
            completed(4, 225.0, 1),
            completed(5, 230.0, 1),
            completed(6, 235.0, 0),
        ];
        let outcome = evaluate_max_attempt(
            Weight::new(235.0).unwrap(),
            Reps::default(),
            Reps::ONE,
            Weight::new(225.0).unwrap(),
            &history,
            5.0,
        );

        assert_eq!(outcome.next_action, NextAction::DownSets);
        assert_eq!(outcome.proposed_baseline, Some(Weight::new(230.0).unwrap()));
    }

    #[rstest]
    #[case::overshoot_succeeds(185.0, 6, true, NextAction::RetryHigher)]
    #[case::target_reps_only_fails(185.0, 4, false, NextAction::DownSets)]
    #[case::light_weight_fails(180.0, 6, false, NextAction::DownSets)]
    fn test_rep_based_progression(
        #[case] attempted: f64,
        #[case] reps: u32,
        #[case] success: bool,
        #[case] action: NextAction,
    ) {
        let outcome = evaluate_rep_based_progression(
            Weight::new(attempted).unwrap(),
            Weight::new(185.0).unwrap(),
            Reps::new(reps).unwrap(),
            Reps::new(4).unwrap(),
            Weight::new(185.0).unwrap(),
            &[],
            5.0,
        );

        assert_eq!(outcome.success, success);
        assert_eq!(outcome.next_action, action);
        assert_eq!(outcome.reps_completed, Reps::new(reps).unwrap());
    }

    #[test]
    fn test_down_sets() {
        let sets = down_sets(Weight::new(225.0).unwrap(), 5, 5.0);

        assert_eq!(sets.len(), 3);
        assert!(sets.iter().all(|s| f64::from(s.weight) == 180.0));
        assert_eq!(
            sets.iter().map(|s| s.target).collect::<Vec<_>>(),
            vec![
                RepTarget::Fixed(Reps::new(8).unwrap()),
                RepTarget::Fixed(Reps::new(8).unwrap()),
                RepTarget::ToFailure,
            ]
        );
        assert_eq!(
            sets.iter().map(|s| s.rest).collect::<Vec<_>>(),
            vec![RestGuidance::Medium, RestGuidance::Medium, RestGuidance::Short]
        );
        assert_eq!(
            sets.iter().map(|s| s.set_number).collect::<Vec<_>>(),
            vec![5, 6, 7]
        );
        assert!(sets.iter().all(|s| !s.is_conditional()));
    }

    #[rstest]
    #[case::empty(&[], None)]
    #[case::ignores_zero_rep_sets(&[(4, 235.0, 0), (5, 225.0, 1)], Some(225.0))]
    #[case::order_independent(&[(5, 230.0, 1), (4, 225.0, 1)], Some(230.0))]
    fn test_calculate_new_max(
        #[case] history: &[(u32, f64, u32)],
        #[case] expected: Option<f64>,
    ) {
        let history = history
            .iter()
            .map(|(n, w, r)| completed(*n, *w, *r))
            .collect::<Vec<_>>();
        assert_eq!(
            calculate_new_max(&history),
            expected.map(|w| Weight::new(w).unwrap())
        );
    }

    #[test]
    fn test_live_evaluation_agrees_with_post_hoc_rule() {
        // A successful 230 attempt followed by a failure at 235: the live
        // evaluation and calculate_new_max must propose the same baseline.
        let history = [
            completed(4, 225.0, 1),
            completed(5, 230.0, 1),
            completed(6, 235.0, 0),
        ];
        let outcome = evaluate_max_attempt(
            Weight::new(235.0).unwrap(),
            Reps::default(),
            Reps::ONE,
            Weight::new(225.0).unwrap(),
            &history,
            5.0,
        );

        assert_eq!(outcome.proposed_baseline, calculate_new_max(&history));
    }
}
