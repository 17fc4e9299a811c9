use std::{collections::BTreeMap, fs, path::PathBuf};

use anyhow::Context;
use log::debug;

use overload_domain::{
    BaselineRepository, ExerciseID, PeriodizationSettings, ReadError, Session, SessionID,
    SessionRepository, SettingsRepository, StorageError, StrengthBaseline, UpdateError, WeeklyMax,
    WeeklyMaxRepository,
};

use crate::memory::InMemoryStorage;

/// Single-file JSON storage. The whole key space is held in memory and
/// rewritten on every mutation, which is adequate for the per-user data
/// volumes involved.
pub struct FileStorage {
    path: PathBuf,
    cache: InMemoryStorage,
}

impl FileStorage {
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let cache = InMemoryStorage::new();

        if path.exists() {
            let json = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let entries: BTreeMap<String, String> = serde_json::from_str(&json)
                .with_context(|| format!("failed to parse {}", path.display()))?;
            debug!("loaded {} records from {}", entries.len(), path.display());
            cache.restore(entries);
        }

        Ok(Self { path, cache })
    }

    fn persist(&self) -> Result<(), StorageError> {
        self.write_file()
            .map_err(|err| StorageError::Other(err.into()))
    }

    fn write_file(&self) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&self.cache.snapshot())?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }
}

impl BaselineRepository for FileStorage {
    fn read_baselines(&self, exercise_id: ExerciseID) -> Result<Vec<StrengthBaseline>, ReadError> {
        self.cache.read_baselines(exercise_id)
    }

    fn append_baseline(
        &self,
        baseline: StrengthBaseline,
    ) -> Result<StrengthBaseline, UpdateError> {
        let baseline = self.cache.append_baseline(baseline)?;
        self.persist()?;
        Ok(baseline)
    }
}

impl SessionRepository for FileStorage {
    fn read_session(&self, id: SessionID) -> Result<Option<Session>, ReadError> {
        self.cache.read_session(id)
    }

    fn save_session(&self, session: &Session) -> Result<(), UpdateError> {
        self.cache.save_session(session)?;
        self.persist()?;
        Ok(())
    }
}

impl WeeklyMaxRepository for FileStorage {
    fn read_weekly_maxes(&self, exercise_id: ExerciseID) -> Result<Vec<WeeklyMax>, ReadError> {
        self.cache.read_weekly_maxes(exercise_id)
    }

    fn append_weekly_max(
        &self,
        exercise_id: ExerciseID,
        weekly_max: WeeklyMax,
    ) -> Result<(), UpdateError> {
        self.cache.append_weekly_max(exercise_id, weekly_max)?;
        self.persist()?;
        Ok(())
    }
}

impl SettingsRepository for FileStorage {
    fn read_settings(&self) -> Result<Option<PeriodizationSettings>, ReadError> {
        self.cache.read_settings()
    }

    fn save_settings(&self, settings: &PeriodizationSettings) -> Result<(), UpdateError> {
        self.cache.save_settings(settings)?;
        self.persist()?;
        Ok(())
    }
}
