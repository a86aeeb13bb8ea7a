use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use super::model::{Question, QuestionDraft, UserProgress};
use crate::BotError;

pub(crate) type StoreResult<T> = Result<T, BotError>;

pub(crate) trait RetrieveBank {
    async fn retrieve_bank(&self) -> StoreResult<Vec<Question>>;
}

pub(crate) trait AppendQuestions {
    // One read-modify-write of the whole bank document; returns the batch size.
    async fn append_questions(&self, drafts: Vec<QuestionDraft>) -> StoreResult<usize>;
}

pub(crate) trait ClearBank {
    async fn clear_bank(&self) -> StoreResult<()>;
}

pub(crate) trait TrackProgress {
    async fn retrieve_progress(&self, user: i64) -> StoreResult<Option<UserProgress>>;

    async fn store_progress(&self, user: i64, progress: UserProgress) -> StoreResult<()>;

    async fn delete_progress(&self, user: i64) -> StoreResult<()>;

    /// Serializes the read-modify-write of one user's progress. Concurrent
    /// answer events for the same user must not both pass the index guard.
    async fn lock_user(&self, user: i64) -> OwnedMutexGuard<()>;
}

/// The bank document. `next_id` survives a delete-all so question ids are
/// never handed out twice.
#[derive(Debug, Default, Serialize, Deserialize)]
struct BankFile {
    next_id: u64,
    questions: Vec<Question>,
}

/// Document store over a data directory: `bank.json` for the whole bank,
/// `users/<id>.json` per progress record. Writes replace the whole document
/// atomically (temp file + rename).
#[derive(Debug)]
pub struct JsonStore {
    dir: PathBuf,
    bank_lock: RwLock<()>,
    user_locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl JsonStore {
    pub async fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(dir.join("users")).await?;
        Ok(Self {
            dir,
            bank_lock: RwLock::new(()),
            user_locks: Mutex::new(HashMap::new()),
        })
    }

    fn bank_path(&self) -> PathBuf {
        self.dir.join("bank.json")
    }

    fn progress_path(&self, user: i64) -> PathBuf {
        self.dir.join("users").join(format!("{user}.json"))
    }

    async fn read_bank_file(&self) -> StoreResult<BankFile> {
        match tokio::fs::read(self.bank_path()).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BankFile::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_bank_file(&self, bank: &BankFile) -> StoreResult<()> {
        write_atomic(&self.bank_path(), serde_json::to_vec_pretty(bank)?).await
    }
}

async fn write_atomic(path: &Path, bytes: Vec<u8>) -> StoreResult<()> {
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

impl RetrieveBank for JsonStore {
    async fn retrieve_bank(&self) -> StoreResult<Vec<Question>> {
        let _guard = self.bank_lock.read().await;
        Ok(self.read_bank_file().await?.questions)
    }
}

impl AppendQuestions for JsonStore {
    async fn append_questions(&self, drafts: Vec<QuestionDraft>) -> StoreResult<usize> {
        let _guard = self.bank_lock.write().await;
        let mut bank = self.read_bank_file().await?;
        let added = drafts.len();
        for draft in drafts {
            let id = bank.next_id;
            bank.next_id += 1;
            bank.questions.push(Question::assign(id, draft));
        }
        self.write_bank_file(&bank).await?;
        log::debug!("appended {added} questions, bank now holds {}", bank.questions.len());
        Ok(added)
    }
}

impl ClearBank for JsonStore {
    async fn clear_bank(&self) -> StoreResult<()> {
        let _guard = self.bank_lock.write().await;
        let mut bank = self.read_bank_file().await?;
        bank.questions.clear();
        self.write_bank_file(&bank).await
    }
}

impl TrackProgress for JsonStore {
    async fn retrieve_progress(&self, user: i64) -> StoreResult<Option<UserProgress>> {
        match tokio::fs::read(self.progress_path(user)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn store_progress(&self, user: i64, progress: UserProgress) -> StoreResult<()> {
        write_atomic(&self.progress_path(user), serde_json::to_vec_pretty(&progress)?).await
    }

    async fn delete_progress(&self, user: i64) -> StoreResult<()> {
        match tokio::fs::remove_file(self.progress_path(user)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn lock_user(&self, user: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.user_locks.lock().await;
            locks
                .entry(user)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

// Same contract as JsonStore, in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MemStore {
    bank: RwLock<BankFile>,
    progress: Mutex<HashMap<i64, UserProgress>>,
    user_locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

#[cfg(test)]
impl RetrieveBank for MemStore {
    async fn retrieve_bank(&self) -> StoreResult<Vec<Question>> {
        Ok(self.bank.read().await.questions.clone())
    }
}

#[cfg(test)]
impl AppendQuestions for MemStore {
    async fn append_questions(&self, drafts: Vec<QuestionDraft>) -> StoreResult<usize> {
        let mut bank = self.bank.write().await;
        let added = drafts.len();
        for draft in drafts {
            let id = bank.next_id;
            bank.next_id += 1;
            bank.questions.push(Question::assign(id, draft));
        }
        Ok(added)
    }
}

#[cfg(test)]
impl ClearBank for MemStore {
    async fn clear_bank(&self) -> StoreResult<()> {
        self.bank.write().await.questions.clear();
        Ok(())
    }
}

#[cfg(test)]
impl TrackProgress for MemStore {
    async fn retrieve_progress(&self, user: i64) -> StoreResult<Option<UserProgress>> {
        Ok(self.progress.lock().await.get(&user).copied())
    }

    async fn store_progress(&self, user: i64, progress: UserProgress) -> StoreResult<()> {
        self.progress.lock().await.insert(user, progress);
        Ok(())
    }

    async fn delete_progress(&self, user: i64) -> StoreResult<()> {
        self.progress.lock().await.remove(&user);
        Ok(())
    }

    async fn lock_user(&self, user: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.user_locks.lock().await;
            locks
                .entry(user)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}
