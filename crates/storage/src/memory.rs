use std::{cell::RefCell, collections::BTreeMap};

use chrono::{Local, NaiveDateTime};
use serde::{Serialize, de::DeserializeOwned};

use overload_domain::{
    BaselineRepository, Clock, ExerciseID, PeriodizationSettings, ReadError, Session,
    SessionID, SessionRepository, SettingsRepository, StorageError, StrengthBaseline,
    UpdateError, WeeklyMax, WeeklyMaxRepository,
};

use crate::model::{
    PeriodizationSettingsModel, SessionModel, StrengthBaselineModel, WeeklyMaxModel,
};

const KEY_SETTINGS: &str = "settings";

/// Keyed JSON storage held in memory, for tests and embedding. Values go
/// through the model layer so the persisted format matches the other
/// backends.
#[derive(Default)]
pub struct InMemoryStorage {
    entries: RefCell<BTreeMap<String, String>>,
}

impl InMemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.borrow().clone()
    }

    pub(crate) fn restore(&self, entries: BTreeMap<String, String>) {
        *self.entries.borrow_mut() = entries;
    }

    fn read_value<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        self.entries
            .borrow()
            .get(key)
            .map(|json| serde_json::from_str(json))
            .transpose()
            .map_err(|err| StorageError::Corrupted(err.to_string()))
    }

    fn write_value<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value)
            .map_err(|err| StorageError::Corrupted(err.to_string()))?;
        self.entries.borrow_mut().insert(key.to_string(), json);
        Ok(())
    }
}

fn baselines_key(exercise_id: ExerciseID) -> String {
    format!("baselines/{}", *exercise_id)
}

fn session_key(id: SessionID) -> String {
    format!("sessions/{}", *id)
}

fn weekly_maxes_key(exercise_id: ExerciseID) -> String {
    format!("weekly_maxes/{}", *exercise_id)
}

impl BaselineRepository for InMemoryStorage {
    fn read_baselines(&self, exercise_id: ExerciseID) -> Result<Vec<StrengthBaseline>, ReadError> {
        let models: Vec<StrengthBaselineModel> = self
            .read_value(&baselines_key(exercise_id))?
            .unwrap_or_default();
        models
            .into_iter()
            .map(|m| {
                StrengthBaseline::try_from(m)
                    .map_err(|err| ReadError::Storage(StorageError::Corrupted(err.to_string())))
            })
            .collect()
    }

    fn append_baseline(
        &self,
        baseline: StrengthBaseline,
    ) -> Result<StrengthBaseline, UpdateError> {
        let key = baselines_key(baseline.exercise_id);
        let mut models: Vec<StrengthBaselineModel> = self.read_value(&key)?.unwrap_or_default();
        models.push(StrengthBaselineModel::from(&baseline));
        self.write_value(&key, &models)?;
        Ok(baseline)
    }
}

impl SessionRepository for InMemoryStorage {
    fn read_session(&self, id: SessionID) -> Result<Option<Session>, ReadError> {
        self.read_value::<SessionModel>(&session_key(id))?
            .map(|m| {
                Session::try_from(m)
                    .map_err(|err| ReadError::Storage(StorageError::Corrupted(err.to_string())))
            })
            .transpose()
    }

    fn save_session(&self, session: &Session) -> Result<(), UpdateError> {
        self.write_value(&session_key(session.id), &SessionModel::from(session))?;
        Ok(())
    }
}

impl WeeklyMaxRepository for InMemoryStorage {
    fn read_weekly_maxes(&self, exercise_id: ExerciseID) -> Result<Vec<WeeklyMax>, ReadError> {
        let models: Vec<WeeklyMaxModel> = self
            .read_value(&weekly_maxes_key(exercise_id))?
            .unwrap_or_default();
        models
            .into_iter()
            .map(|m| {
                WeeklyMax::try_from(m)
                    .map_err(|err| ReadError::Storage(StorageError::Corrupted(err.to_string())))
            })
            .collect()
    }

    fn append_weekly_max(
        &self,
        exercise_id: ExerciseID,
        weekly_max: WeeklyMax,
    ) -> Result<(), UpdateError> {
        let key = weekly_maxes_key(exercise_id);
        let mut models: Vec<WeeklyMaxModel> = self.read_value(&key)?.unwrap_or_default();
        models.push(WeeklyMaxModel::from(&weekly_max));
        self.write_value(&key, &models)?;
        Ok(())
    }
}

impl SettingsRepository for InMemoryStorage {
    fn read_settings(&self) -> Result<Option<PeriodizationSettings>, ReadError> {
        Ok(self
            .read_value::<PeriodizationSettingsModel>(KEY_SETTINGS)?
            .map(Into::into))
    }

    fn save_settings(&self, settings: &PeriodizationSettings) -> Result<(), UpdateError> {
        self.write_value(KEY_SETTINGS, &PeriodizationSettingsModel::from(settings))?;
        Ok(())
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Frozen clock for deterministic cooldown and deload math in tests.
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
