use chrono::{Duration, NaiveDateTime};
use derive_more::Display;

use crate::{CompletedSet, ExerciseID, Reps, SessionID, Weight};

pub const DEFAULT_COOLDOWN_WEEKS: u32 = 2;

const READINESS_THRESHOLD: f64 = 0.6;
const STRONG_AVG_REPS: f64 = 10.0;
const RESERVE_REPS: u32 = 13;
const LOW_VARIANCE_LIMIT: f64 = 1.5;

const REP_DROP_FRACTION: f64 = 0.70;
const IDEAL_REP_BAND_MIN: u32 = 7;
const BELOW_BAND_LIMIT: usize = 3;
const OVERTRAINING_DECLINE: f64 = 0.30;

/// One entry in the append-only baseline history. Entries are never
/// mutated; a new baseline supersedes older ones. `verified` entries are
/// produced exclusively by [`verify`].
#[derive(Debug, Clone, PartialEq)]
pub struct StrengthBaseline {
    pub exercise_id: ExerciseID,
    pub weight: Weight,
    pub achieved_at: NaiveDateTime,
    pub verified: bool,
    pub verification_session_id: Option<SessionID>,
}

impl StrengthBaseline {
    /// An unverified entry, e.g. derived from a coarser estimate or a unit
    /// conversion.
    #[must_use]
    pub fn unverified(exercise_id: ExerciseID, weight: Weight, achieved_at: NaiveDateTime) -> Self {
        Self {
            exercise_id,
            weight,
            achieved_at,
            verified: false,
            verification_session_id: None,
        }
    }
}

/// The baseline in effect: the most recent verified entry, or the most
/// recent of any if none is verified.
#[must_use]
pub fn current(history: &[StrengthBaseline]) -> Option<&StrengthBaseline> {
    history
        .iter()
        .filter(|b| b.verified)
        .max_by_key(|b| b.achieved_at)
        .or_else(|| history.iter().max_by_key(|b| b.achieved_at))
}

/// Whether a new verification attempt is allowed: true unless a verified
/// baseline was achieved within the cooldown window.
#[must_use]
pub fn can_verify(history: &[StrengthBaseline], now: NaiveDateTime, cooldown_weeks: u32) -> bool {
    let Some(last) = history
        .iter()
        .filter(|b| b.verified)
        .max_by_key(|b| b.achieved_at)
    else {
        return true;
    };

    now - last.achieved_at >= Duration::days(i64::from(cooldown_weeks) * 7)
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum VerifyError {
    #[error("cooldown active for another {days_remaining} days")]
    CooldownActive { days_remaining: i64 },
    #[error("weight was not demonstrated in the session")]
    NotDemonstrated,
}

/// The only operation producing a verified baseline entry. The session's
/// completed sets serve as evidence that the weight was actually lifted;
/// the ledger records the protocol's outcome but does not run it.
pub fn verify(
    exercise_id: ExerciseID,
    weight: Weight,
    session_id: SessionID,
    evidence: &[CompletedSet],
    history: &[StrengthBaseline],
    now: NaiveDateTime,
    cooldown_weeks: u32,
) -> Result<StrengthBaseline, VerifyError> {
    if !can_verify(history, now, cooldown_weeks) {
        let last = history
            .iter()
            .filter(|b| b.verified)
            .max_by_key(|b| b.achieved_at)
            .map_or(now, |b| b.achieved_at);
        let days_remaining =
            i64::from(cooldown_weeks) * 7 - (now - last).num_days();
        return Err(VerifyError::CooldownActive { days_remaining });
    }

    if !evidence
        .iter()
        .any(|c| c.reps >= Reps::ONE && c.weight >= weight)
    {
        return Err(VerifyError::NotDemonstrated);
    }

    Ok(StrengthBaseline {
        exercise_id,
        weight,
        achieved_at: now,
        verified: true,
        verification_session_id: Some(session_id),
    })
}

/// Advisory signal that the lifter could test a new baseline. Never
/// mutates the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadinessSignal {
    pub exercise_id: ExerciseID,
    pub ready: bool,
    pub confidence: f64,
    pub reasoning: Vec<String>,
}

#[must_use]
pub fn readiness(
    exercise_id: ExerciseID,
    recent_sets: &[CompletedSet],
    history: &[StrengthBaseline],
    now: NaiveDateTime,
    cooldown_weeks: u32,
) -> ReadinessSignal {
    if !can_verify(history, now, cooldown_weeks) {
        return ReadinessSignal {
            exercise_id,
            ready: false,
            confidence: 0.0,
            reasoning: vec!["verification cooldown is active".to_string()],
        };
    }

    if recent_sets.is_empty() {
        return ReadinessSignal {
            exercise_id,
            ready: false,
            confidence: 0.0,
            reasoning: vec!["no recent sets to judge readiness from".to_string()],
        };
    }

    let mut score = 0.0;
    let mut reasoning = vec![];

    #[allow(clippy::cast_precision_loss)]
    let reps = recent_sets
        .iter()
        .map(|c| u32::from(c.reps) as f64)
        .collect::<Vec<_>>();
    let avg = reps.iter().sum::<f64>() / reps.len() as f64;

    if avg >= STRONG_AVG_REPS {
        score += 0.4;
        reasoning.push(format!("average of {avg:.1} reps per set"));
    }

    #[allow(clippy::cast_precision_loss)]
    let std_dev =
        (reps.iter().map(|r| (r - avg).powi(2)).sum::<f64>() / reps.len() as f64).sqrt();
    if std_dev <= LOW_VARIANCE_LIMIT {
        score += 0.25;
        reasoning.push("consistent rep counts across sessions".to_string());
    }

    if recent_sets.iter().any(|c| u32::from(c.reps) >= RESERVE_REPS) {
        score += 0.35;
        reasoning.push(format!("a set of {RESERVE_REPS}+ reps shows reserve capacity"));
    }

    ReadinessSignal {
        exercise_id,
        ready: score >= READINESS_THRESHOLD,
        confidence: score.min(1.0),
        reasoning,
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    #[display("high")]
    High,
    #[display("critical")]
    Critical,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SafetyGuard {
    RepDrop { percentage: f64 },
    MultipleFailures { count: u32 },
    Overtraining { decline_percent: f64 },
}

impl SafetyGuard {
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            SafetyGuard::RepDrop { .. } => Severity::Critical,
            SafetyGuard::MultipleFailures { .. } => Severity::High,
            SafetyGuard::Overtraining { .. } => Severity::High,
        }
    }

    #[must_use]
    pub fn mitigation(&self) -> &'static str {
        match self {
            SafetyGuard::RepDrop { .. } => "reduce the load by about 10%",
            SafetyGuard::MultipleFailures { .. } => "suppress progression",
            SafetyGuard::Overtraining { .. } => "insert an extra rest day or deload",
        }
    }
}

/// Triggers when reps fall below 70% of the immediately prior comparable
/// (same-weight) set.
#[must_use]
pub fn rep_drop(previous: &CompletedSet, current: &CompletedSet) -> Option<SafetyGuard> {
    let prev = f64::from(u32::from(previous.reps));
    let curr = f64::from(u32::from(current.reps));
    if prev <= 0.0 || previous.weight != current.weight {
        return None;
    }

    if curr < prev * REP_DROP_FRACTION {
        Some(SafetyGuard::RepDrop {
            percentage: (1.0 - curr / prev) * 100.0,
        })
    } else {
        None
    }
}

/// Scans recent rep-out work for guard conditions: rep drops between
/// consecutive comparable sets and repeated sets below the ideal rep band.
#[must_use]
pub fn scan_guards(recent_sets: &[CompletedSet]) -> Vec<SafetyGuard> {
    let mut guards = recent_sets
        .windows(2)
        .filter_map(|pair| rep_drop(&pair[0], &pair[1]))
        .collect::<Vec<_>>();

    let below_band = recent_sets
        .iter()
        .filter(|c| u32::from(c.reps) < IDEAL_REP_BAND_MIN)
        .count();
    if below_band >= BELOW_BAND_LIMIT {
        guards.push(SafetyGuard::MultipleFailures {
            count: u32::try_from(below_band).unwrap_or(u32::MAX),
        });
    }

    guards
}

/// Detects a session-over-session decline in total rep volume.
#[must_use]
pub fn overtraining(session_totals: &[u32]) -> Option<SafetyGuard> {
    let first = f64::from(*session_totals.first()?);
    let last = f64::from(*session_totals.last()?);
    if first <= 0.0 || session_totals.len() < 2 {
        return None;
    }

    let decline = (first - last) / first;
    if decline >= OVERTRAINING_DECLINE {
        Some(SafetyGuard::Overtraining {
            decline_percent: decline * 100.0,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn at_day(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .checked_add_days(chrono::Days::new(u64::from(day)))
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn baseline(weight: f64, day: u32, verified: bool) -> StrengthBaseline {
        StrengthBaseline {
            exercise_id: 1.into(),
            weight: Weight::new(weight).unwrap(),
            achieved_at: at_day(day),
            verified,
            verification_session_id: verified.then(|| 9.into()),
        }
    }

    fn completed(set_number: u32, weight: f64, reps: u32) -> CompletedSet {
        CompletedSet {
            set_number,
            weight: Weight::new(weight).unwrap(),
            reps: Reps::new(reps).unwrap(),
            completed_at: at_day(0),
            note: None,
        }
    }

    #[test]
    fn test_current_prefers_verified() {
        let history = [
            baseline(225.0, 0, true),
            baseline(235.0, 5, false),
            baseline(220.0, 3, true),
        ];
        assert_eq!(current(&history), Some(&history[0]));
    }

    #[test]
    fn test_current_falls_back_to_most_recent() {
        let history = [baseline(225.0, 0, false), baseline(235.0, 5, false)];
        assert_eq!(current(&history), Some(&history[1]));
        assert_eq!(current(&[]), None);
    }

    #[rstest]
    #[case::one_day_ago(1, false)]
    #[case::thirteen_days_ago(13, false)]
    #[case::fourteen_days_ago(14, true)]
    fn test_can_verify_cooldown(#[case] days_elapsed: u32, #[case] expected: bool) {
        let history = [baseline(225.0, 0, true)];
        assert_eq!(
            can_verify(&history, at_day(days_elapsed), DEFAULT_COOLDOWN_WEEKS),
            expected
        );
    }

    #[test]
    fn test_can_verify_without_baseline() {
        assert!(can_verify(&[], at_day(0), DEFAULT_COOLDOWN_WEEKS));
        assert!(can_verify(
            &[baseline(225.0, 0, false)],
            at_day(0),
            DEFAULT_COOLDOWN_WEEKS
        ));
    }

    #[test]
    fn test_verify_creates_verified_entry() {
        let evidence = [completed(4, 230.0, 1)];
        let result = verify(
            1.into(),
            Weight::new(230.0).unwrap(),
            9.into(),
            &evidence,
            &[baseline(225.0, 0, true)],
            at_day(15),
            DEFAULT_COOLDOWN_WEEKS,
        )
        .unwrap();

        assert!(result.verified);
        assert_eq!(result.verification_session_id, Some(9.into()));
        assert_eq!(result.weight, Weight::new(230.0).unwrap());
        assert_eq!(result.achieved_at, at_day(15));
    }

    #[test]
    fn test_verify_rejects_during_cooldown() {
        let evidence = [completed(4, 230.0, 1)];
        assert_eq!(
            verify(
                1.into(),
                Weight::new(230.0).unwrap(),
                9.into(),
                &evidence,
                &[baseline(225.0, 0, true)],
                at_day(1),
                DEFAULT_COOLDOWN_WEEKS,
            ),
            Err(VerifyError::CooldownActive { days_remaining: 13 })
        );
    }

    #[rstest]
    #[case::never_lifted(&[(4, 225.0, 1)])]
    #[case::zero_reps(&[(4, 230.0, 0)])]
    fn test_verify_requires_evidence(#[case] evidence: &[(u32, f64, u32)]) {
        let evidence = evidence
            .iter()
            .map(|(n, w, r)| completed(*n, *w, *r))
            .collect::<Vec<_>>();
        assert_eq!(
            verify(
                1.into(),
                Weight::new(230.0).unwrap(),
                9.into(),
                &evidence,
                &[],
                at_day(0),
                DEFAULT_COOLDOWN_WEEKS,
            ),
            Err(VerifyError::NotDemonstrated)
        );
    }

    #[test]
    fn test_readiness_blocked_by_cooldown() {
        let signal = readiness(
            1.into(),
            &[completed(1, 185.0, 12)],
            &[baseline(225.0, 0, true)],
            at_day(1),
            DEFAULT_COOLDOWN_WEEKS,
        );

        assert!(!signal.ready);
        assert_eq!(signal.confidence, 0.0);
    }

    #[test]
    fn test_readiness_strong_performance() {
        let sets = [
            completed(1, 185.0, 12),
            completed(2, 185.0, 13),
            completed(3, 185.0, 12),
        ];
        let signal = readiness(1.into(), &sets, &[], at_day(0), DEFAULT_COOLDOWN_WEEKS);

        assert!(signal.ready);
        assert!(signal.confidence >= 0.6);
        assert_eq!(signal.reasoning.len(), 3);
    }

    #[test]
    fn test_readiness_weak_performance() {
        let sets = [completed(1, 185.0, 6), completed(2, 185.0, 5)];
        let signal = readiness(1.into(), &sets, &[], at_day(0), DEFAULT_COOLDOWN_WEEKS);

        assert!(!signal.ready);
        assert!(signal.confidence < 0.6);
    }

    #[test]
    fn test_readiness_never_verifies() {
        let sets = [completed(1, 185.0, 14)];
        let signal = readiness(1.into(), &sets, &[], at_day(0), DEFAULT_COOLDOWN_WEEKS);
        // readiness is advisory; the signal carries no baseline entry
        assert!(signal.confidence <= 1.0);
    }

    #[rstest]
    #[case::drop(10, 6, Some(40.0))]
    #[case::exactly_at_limit(10, 7, None)]
    #[case::no_drop(10, 10, None)]
    fn test_rep_drop(#[case] previous: u32, #[case] current: u32, #[case] expected: Option<f64>) {
        let guard = rep_drop(&completed(1, 185.0, previous), &completed(2, 185.0, current));
        match expected {
            Some(percentage) => {
                let Some(SafetyGuard::RepDrop { percentage: p }) = guard else {
                    panic!("expected rep drop guard");
                };
                assert!((p - percentage).abs() < 1e-9);
            }
            None => assert_eq!(guard, None),
        }
    }

    #[test]
    fn test_rep_drop_requires_comparable_sets() {
        assert_eq!(
            rep_drop(&completed(1, 225.0, 10), &completed(2, 185.0, 2)),
            None
        );
    }

    #[test]
    fn test_scan_guards_below_band() {
        let sets = [
            completed(1, 185.0, 6),
            completed(2, 185.0, 5),
            completed(3, 185.0, 6),
        ];
        assert_eq!(
            scan_guards(&sets),
            vec![SafetyGuard::MultipleFailures { count: 3 }]
        );
    }

    #[test]
    fn test_scan_guards_clean_history() {
        let sets = [completed(1, 185.0, 8), completed(2, 185.0, 8)];
        assert_eq!(scan_guards(&sets), vec![]);
    }

    #[rstest]
    #[case::decline(&[30, 24, 20], Some(33.333_333_333_333_336))]
    #[case::stable(&[30, 29, 28], None)]
    #[case::too_short(&[30], None)]
    #[case::empty(&[], None)]
    fn test_overtraining(#[case] totals: &[u32], #[case] expected: Option<f64>) {
        match (overtraining(totals), expected) {
            (Some(SafetyGuard::Overtraining { decline_percent }), Some(e)) => {
                assert!((decline_percent - e).abs() < 1e-9);
            }
            (None, None) => {}
            (actual, _) => panic!("unexpected guard: {actual:?}"),
        }
    }

    #[test]
    fn test_guard_severity_and_mitigation() {
        assert_eq!(
            SafetyGuard::RepDrop { percentage: 40.0 }.severity(),
            Severity::Critical
        );
        assert_eq!(
            SafetyGuard::MultipleFailures { count: 3 }.severity(),
            Severity::High
        );
        assert_eq!(
            SafetyGuard::RepDrop { percentage: 40.0 }.mitigation(),
            "reduce the load by about 10%"
        );
        assert_eq!(
            SafetyGuard::MultipleFailures { count: 3 }.mitigation(),
            "suppress progression"
        );
        assert!(Severity::High < Severity::Critical);
    }
}
