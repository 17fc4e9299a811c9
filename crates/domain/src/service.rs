use chrono::NaiveDateTime;
use log::{debug, error};

use crate::{
    ExerciseID, ExerciseLookup, LogOutcome, LogSetError, Mode, PeriodizationPlan,
    PeriodizationSettings, ReadError, ReadinessSignal, Reps, Session, SessionID, SessionSummary,
    SetTemplate, StrengthBaseline, UpdateError, Weight, WeeklyMax,
    ledger::{self, DEFAULT_COOLDOWN_WEEKS},
    periodization::{self, ExperienceLevel},
    session::{self, ExerciseLog},
};

/// Injectable time source for cooldown and deload math.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

pub trait BaselineRepository {
    fn read_baselines(&self, exercise_id: ExerciseID) -> Result<Vec<StrengthBaseline>, ReadError>;
    fn append_baseline(&self, baseline: StrengthBaseline)
    -> Result<StrengthBaseline, UpdateError>;
}

pub trait SessionRepository {
    fn read_session(&self, id: SessionID) -> Result<Option<Session>, ReadError>;
    fn save_session(&self, session: &Session) -> Result<(), UpdateError>;
}

pub trait WeeklyMaxRepository {
    fn read_weekly_maxes(&self, exercise_id: ExerciseID) -> Result<Vec<WeeklyMax>, ReadError>;
    fn append_weekly_max(
        &self,
        exercise_id: ExerciseID,
        weekly_max: WeeklyMax,
    ) -> Result<(), UpdateError>;
}

pub trait SettingsRepository {
    fn read_settings(&self) -> Result<Option<PeriodizationSettings>, ReadError>;
    fn save_settings(&self, settings: &PeriodizationSettings) -> Result<(), UpdateError>;
}

#[derive(thiserror::Error, Debug)]
pub enum StartExerciseError {
    #[error("unknown exercise")]
    UnknownExercise,
    #[error("no strength baseline exists for the exercise")]
    MissingBaseline,
    #[error(transparent)]
    Read(ReadError),
    #[error(transparent)]
    Update(UpdateError),
}

impl From<ReadError> for StartExerciseError {
    fn from(value: ReadError) -> Self {
        StartExerciseError::Read(value)
    }
}

impl From<UpdateError> for StartExerciseError {
    fn from(value: UpdateError) -> Self {
        StartExerciseError::Update(value)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SessionOpError {
    #[error("unknown session")]
    UnknownSession,
    #[error("exercise was not started in this session")]
    ExerciseNotStarted,
    #[error(transparent)]
    Log(#[from] LogSetError),
    #[error(transparent)]
    Read(ReadError),
    #[error(transparent)]
    Update(UpdateError),
}

impl From<ReadError> for SessionOpError {
    fn from(value: ReadError) -> Self {
        SessionOpError::Read(value)
    }
}

impl From<UpdateError> for SessionOpError {
    fn from(value: UpdateError) -> Self {
        SessionOpError::Update(value)
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(crate::StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

/// Synchronous facade over the engine: loads a consistent snapshot from
/// the repository, applies one pure operation, and persists the result.
pub struct Service<R, L, C> {
    repository: R,
    lookup: L,
    clock: C,
}

impl<R, L, C> Service<R, L, C>
where
    R: BaselineRepository + SessionRepository + WeeklyMaxRepository + SettingsRepository,
    L: ExerciseLookup,
    C: Clock,
{
    pub fn new(repository: R, lookup: L, clock: C) -> Self {
        Self {
            repository,
            lookup,
            clock,
        }
    }

    /// Generates the set pyramid for an exercise and adds it to the
    /// session. An exercise without any baseline cannot enter the
    /// percentage pathways; the caller routes to initial testing instead.
    pub fn start_exercise(
        &self,
        session_id: SessionID,
        exercise_id: ExerciseID,
    ) -> Result<Vec<SetTemplate>, StartExerciseError> {
        let exercise = self
            .lookup
            .metadata(exercise_id)
            .ok_or(StartExerciseError::UnknownExercise)?;
        let baselines = log_on_error!(
            self.repository.read_baselines(exercise_id),
            ReadError,
            "read",
            "baselines"
        )?;
        let baseline = ledger::current(&baselines)
            .ok_or(StartExerciseError::MissingBaseline)?
            .weight;

        self.install_exercise(session_id, ExerciseLog::start(&exercise, baseline))
    }

    /// Like [`Self::start_exercise`], but generates the pyramid from the
    /// week's periodized working max (training-max fraction composed with
    /// the deload or wave multiplier) instead of the true max.
    pub fn start_exercise_for_week(
        &self,
        session_id: SessionID,
        exercise_id: ExerciseID,
        week: u32,
        last_deload_week: u32,
        recent_outcomes: &[bool],
    ) -> Result<Vec<SetTemplate>, StartExerciseError> {
        let exercise = self
            .lookup
            .metadata(exercise_id)
            .ok_or(StartExerciseError::UnknownExercise)?;
        let baselines = log_on_error!(
            self.repository.read_baselines(exercise_id),
            ReadError,
            "read",
            "baselines"
        )?;
        let true_max = ledger::current(&baselines)
            .ok_or(StartExerciseError::MissingBaseline)?
            .weight;
        let settings = log_on_error!(
            self.repository.read_settings(),
            ReadError,
            "read",
            "settings"
        )?
        .unwrap_or_default();
        let plan = periodization::plan(week, last_deload_week, recent_outcomes, &settings);

        self.install_exercise(
            session_id,
            ExerciseLog::start_periodized(&exercise, true_max, &plan, &settings),
        )
    }

    fn install_exercise(
        &self,
        session_id: SessionID,
        exercise_log: ExerciseLog,
    ) -> Result<Vec<SetTemplate>, StartExerciseError> {
        let mut session = log_on_error!(
            self.repository.read_session(session_id),
            ReadError,
            "read",
            "session"
        )?
        .unwrap_or_else(|| Session {
            id: session_id,
            date: self.clock.now().date(),
            exercises: vec![],
        });

        if let Some(existing) = session
            .exercises
            .iter()
            .find(|l| l.exercise_id == exercise_log.exercise_id)
        {
            return Ok(existing.templates.clone());
        }

        let templates = exercise_log.templates.clone();
        session.exercises.push(exercise_log);
        log_on_error!(
            self.repository.save_session(&session),
            UpdateError,
            "save",
            "session"
        )?;

        Ok(templates)
    }

    pub fn log_set(
        &self,
        session_id: SessionID,
        exercise_id: ExerciseID,
        set_number: u32,
        weight: Weight,
        reps: Reps,
    ) -> Result<LogOutcome, SessionOpError> {
        let mut session = log_on_error!(
            self.repository.read_session(session_id),
            ReadError,
            "read",
            "session"
        )?
        .ok_or(SessionOpError::UnknownSession)?;
        let exercise_log = session
            .exercises
            .iter_mut()
            .find(|l| l.exercise_id == exercise_id)
            .ok_or(SessionOpError::ExerciseNotStarted)?;

        let outcome = exercise_log.log_set(set_number, weight, reps, self.clock.now())?;
        log_on_error!(
            self.repository.save_session(&session),
            UpdateError,
            "save",
            "session"
        )?;

        Ok(outcome)
    }

    /// Aggregates the session and records verified baselines for every
    /// proposal whose exercise is out of cooldown. Proposals blocked by
    /// cooldown are kept in the summary but not recorded.
    pub fn complete_session(&self, session_id: SessionID) -> Result<SessionSummary, SessionOpError> {
        let session = log_on_error!(
            self.repository.read_session(session_id),
            ReadError,
            "read",
            "session"
        )?
        .ok_or(SessionOpError::UnknownSession)?;

        let summary = session::complete_session(&session);

        for proposal in &summary.proposed_baselines {
            let history = log_on_error!(
                self.repository.read_baselines(proposal.exercise_id),
                ReadError,
                "read",
                "baselines"
            )?;
            let evidence = session
                .exercises
                .iter()
                .find(|l| l.exercise_id == proposal.exercise_id)
                .map(|l| l.completed.as_slice())
                .unwrap_or_default();

            match ledger::verify(
                proposal.exercise_id,
                proposal.weight,
                session.id,
                evidence,
                &history,
                self.clock.now(),
                DEFAULT_COOLDOWN_WEEKS,
            ) {
                Ok(baseline) => {
                    log_on_error!(
                        self.repository.append_baseline(baseline),
                        UpdateError,
                        "append",
                        "baseline"
                    )?;
                }
                Err(err) => {
                    debug!("baseline proposal not recorded: {err}");
                }
            }
        }

        Ok(summary)
    }

    pub fn periodization_plan(
        &self,
        week: u32,
        last_deload_week: u32,
        recent_outcomes: &[bool],
    ) -> Result<PeriodizationPlan, ReadError> {
        let settings = log_on_error!(
            self.repository.read_settings(),
            ReadError,
            "read",
            "settings"
        )?
        .unwrap_or_default();
        Ok(periodization::plan(
            week,
            last_deload_week,
            recent_outcomes,
            &settings,
        ))
    }

    pub fn readiness_signal(
        &self,
        exercise_id: ExerciseID,
        recent_sets: &[crate::CompletedSet],
    ) -> Result<ReadinessSignal, ReadError> {
        let history = log_on_error!(
            self.repository.read_baselines(exercise_id),
            ReadError,
            "read",
            "baselines"
        )?;
        Ok(ledger::readiness(
            exercise_id,
            recent_sets,
            &history,
            self.clock.now(),
            DEFAULT_COOLDOWN_WEEKS,
        ))
    }

    /// Records the current baseline as this week's max for the trailing
    /// progression record.
    pub fn record_weekly_max(
        &self,
        exercise_id: ExerciseID,
        week: u32,
    ) -> Result<(), SessionOpError> {
        let baselines = log_on_error!(
            self.repository.read_baselines(exercise_id),
            ReadError,
            "read",
            "baselines"
        )?;
        let Some(current) = ledger::current(&baselines) else {
            return Ok(());
        };
        log_on_error!(
            self.repository.append_weekly_max(
                exercise_id,
                WeeklyMax {
                    week,
                    weight: current.weight,
                },
            ),
            UpdateError,
            "append",
            "weekly max"
        )?;
        Ok(())
    }

    pub fn recommended_mode(
        &self,
        exercise_id: ExerciseID,
        level: ExperienceLevel,
    ) -> Result<Mode, ReadError> {
        let weekly_maxes = log_on_error!(
            self.repository.read_weekly_maxes(exercise_id),
            ReadError,
            "read",
            "weekly maxes"
        )?;
        Ok(periodization::recommend_mode(level, &weekly_maxes))
    }
}
