use std::{future::Future, io::ErrorKind, path::PathBuf};

use anyhow::Result;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::warn;

use super::tally::DailyTally;

/// Interface for abstracting persistence of the daily tally.
///
/// Both operations are best effort. Several daemon instances pointed at the
/// same file race last-writer-wins; the file locks below only guard against
/// torn reads, not lost increments.
pub trait TallyStore {
    /// Reads the stored tally. Absence is not an error.
    fn load(&self) -> impl Future<Output = Result<Option<DailyTally>>>;

    /// Replaces the stored tally.
    fn save(&self, tally: &DailyTally) -> impl Future<Output = Result<()>>;
}

/// The main realization of [TallyStore]. Keeps the tally as a one-line json
/// file.
pub struct TallyStoreImpl {
    path: PathBuf,
}

impl TallyStoreImpl {
    pub fn new(path: PathBuf) -> Result<Self, std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        Ok(Self { path })
    }

    async fn load_inner(&self) -> Result<Option<DailyTally>> {
        let mut file = match File::open(&self.path).await {
            Ok(v) => v,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e)?,
        };

        // Semi-safe acquire-release for a file
        file.lock_shared()?;
        let result = Self::read_with_file(&mut file).await;
        file.unlock_async().await?;
        let contents = result?;

        match serde_json::from_str::<DailyTally>(&contents) {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                // Might happen after shutdown cutting off a write.
                warn!(
                    "Tally file {:?} held an illegal json string {}: {e}",
                    self.path, contents
                );
                Ok(None)
            }
        }
    }

    async fn read_with_file(file: &mut File) -> Result<String> {
        let mut contents = String::new();
        file.read_to_string(&mut contents).await?;
        Ok(contents)
    }

    async fn save_inner(&self, tally: &DailyTally) -> Result<()> {
        let mut file = File::options()
            .write(true)
            .create(true)
            .read(true)
            .truncate(false)
            .open(&self.path)
            .await?;

        file.lock_exclusive()?;
        let result = Self::write_with_file(&mut file, tally).await;
        file.unlock_async().await?;
        result
    }

    async fn write_with_file(file: &mut File, tally: &DailyTally) -> Result<()> {
        // Truncate under the lock so a concurrent reader never sees half a
        // record.
        file.set_len(0).await?;

        let mut buffer = serde_json::to_vec(tally)?;
        buffer.push(b'\n');

        file.write_all(&buffer).await?;
        file.flush().await?;
        Ok(())
    }
}

impl TallyStore for TallyStoreImpl {
    async fn load(&self) -> Result<Option<DailyTally>> {
        self.load_inner().await
    }

    async fn save(&self, tally: &DailyTally) -> Result<()> {
        self.save_inner(tally).await
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use anyhow::Result;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use crate::daemon::storage::{
        tally::DailyTally,
        tally_store::{TallyStore, TallyStoreImpl},
    };

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2018, 7, 4).unwrap();

    #[tokio::test]
    async fn test_load_missing_file() -> Result<()> {
        let dir = tempdir()?;
        let store = TallyStoreImpl::new(dir.path().join("tally.json"))?;

        assert_eq!(store.load().await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_save_then_load() -> Result<()> {
        let dir = tempdir()?;
        let store = TallyStoreImpl::new(dir.path().join("tally.json"))?;

        let tally = DailyTally {
            date: TEST_DATE,
            seconds: 17,
        };
        store.save(&tally).await?;

        assert_eq!(store.load().await?, Some(tally));
        Ok(())
    }

    #[tokio::test]
    async fn test_save_replaces_previous_record() -> Result<()> {
        let dir = tempdir()?;
        let store = TallyStoreImpl::new(dir.path().join("tally.json"))?;

        store
            .save(&DailyTally {
                date: TEST_DATE,
                seconds: 100,
            })
            .await?;
        let next = DailyTally {
            date: TEST_DATE.succ_opt().unwrap(),
            seconds: 1,
        };
        store.save(&next).await?;

        assert_eq!(store.load().await?, Some(next));

        // A shorter record fully replaces a longer one, no trailing garbage.
        let contents = std::fs::read_to_string(dir.path().join("tally.json"))?;
        assert_eq!(contents.lines().count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupted_file_reads_as_absent() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("tally.json");
        let mut file = std::fs::File::create(&path)?;
        file.write_all(b"{\"date\":\"2018-07-")?;
        drop(file);

        let store = TallyStoreImpl::new(path)?;
        assert_eq!(store.load().await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_new_creates_parent_directories() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("state").join("tally.json");
        let store = TallyStoreImpl::new(path)?;

        store.save(&DailyTally::fresh(TEST_DATE)).await?;
        assert_eq!(store.load().await?, Some(DailyTally::fresh(TEST_DATE)));
        Ok(())
    }
}
