use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use schedulewise_core::{Course, store, types::STORAGE_KEY};

/// File-backed course store.
///
/// The whole collection lives in one JSON file; every operation reads or
/// replaces it wholesale, so a command always works on a consistent snapshot.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn with_default_dir() -> Result<Self> {
        let dir = Self::default_data_dir("schedulewise")?;
        Ok(Self::new(dir.join(format!("{STORAGE_KEY}.json"))))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn default_data_dir(app_name: &str) -> Result<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            if let Some(home) = std::env::var_os("HOME") {
                Ok(PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join(app_name))
            } else {
                anyhow::bail!("Cannot determine data directory")
            }
        }

        #[cfg(target_os = "linux")]
        {
            if let Some(data_dir) = std::env::var_os("XDG_DATA_HOME") {
                Ok(PathBuf::from(data_dir).join(app_name))
            } else if let Some(home) = std::env::var_os("HOME") {
                Ok(PathBuf::from(home)
                    .join(".local")
                    .join("share")
                    .join(app_name))
            } else {
                anyhow::bail!("Cannot determine data directory")
            }
        }

        #[cfg(target_os = "windows")]
        {
            if let Some(app_data) = std::env::var_os("APPDATA") {
                Ok(PathBuf::from(app_data).join(app_name))
            } else {
                anyhow::bail!("Cannot determine data directory")
            }
        }

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            let _ = app_name;
            anyhow::bail!("Unsupported operating system for data directory detection")
        }
    }

    /// Loads the current collection; a missing file is an empty schedule.
    pub async fn load(&self) -> Result<Vec<Course>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read schedule file {}", self.path.display()))?;

        Ok(store::decode_courses(&raw, Local::now().date_naive()))
    }

    /// Replaces the stored collection with `courses`.
    pub async fn save(&self, courses: &[Course]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create data directory {}", parent.display()))?;
        }

        let raw = store::encode_courses(courses)?;
        tokio::fs::write(&self.path, raw)
            .await
            .with_context(|| format!("Failed to write schedule file {}", self.path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use schedulewise_core::Weekday;

    use super::*;

    fn course(id: &str) -> Course {
        Course {
            id: id.to_string(),
            title: "Algorithms".to_string(),
            weekday: Weekday::Monday,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            start_time: "09:00".to_string(),
            duration: 1.5,
            location: String::new(),
            description: String::new(),
            excluded_dates: vec![],
        }
    }

    #[tokio::test]
    async fn missing_file_is_an_empty_schedule() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("schedule.json"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("schedule.json"));

        store.save(&[course("c1"), course("c2")]).await.unwrap();
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, "c1");
        assert_eq!(loaded[1].id, "c2");
    }

    #[tokio::test]
    async fn corrupt_file_resets_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedule.json");
        tokio::fs::write(&path, "{ definitely not an array")
            .await
            .unwrap();

        let store = FileStore::new(path);
        assert!(store.load().await.unwrap().is_empty());
    }
}
