//! Shared test helpers: scripted console, temporary store and source file,
//! and builders for stored provider records.

use std::{
    collections::VecDeque,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use chrono::Utc;
use kdbxsync_core::{
    domain::SourceFile,
    ports::{Console, LogLevel},
    store::{PersistentStore, StoreHandle},
};
use serde_json::{json, Value};

/// Console replaying queued answers and recording every log line
#[derive(Default)]
pub struct ScriptedConsole {
    answers: Mutex<VecDeque<String>>,
    logs: Mutex<Vec<(LogLevel, String)>>,
}

impl ScriptedConsole {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(|a| a.to_string()).collect()),
            logs: Mutex::new(Vec::new()),
        }
    }

    pub fn logs(&self) -> Vec<(LogLevel, String)> {
        self.logs.lock().unwrap().clone()
    }

    /// Whether any line at `level` contains `needle`
    pub fn logged(&self, level: LogLevel, needle: &str) -> bool {
        self.logs()
            .iter()
            .any(|(l, text)| *l == level && text.contains(needle))
    }

    pub fn remaining_answers(&self) -> usize {
        self.answers.lock().unwrap().len()
    }
}

impl Console for ScriptedConsole {
    fn prompt(&self, text: &str) -> String {
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected prompt: {text}"))
    }

    fn log(&self, level: LogLevel, text: &str) {
        self.logs.lock().unwrap().push((level, text.to_string()));
    }

    fn welcome(&self, _name: &str, _version: &str) {}

    fn confirm_and_exit(&self, text: &str) -> ! {
        panic!("confirm_and_exit: {text}");
    }
}

/// A temporary state file, a `.kdbx` source file and a console
pub struct TestEnv {
    _dir: tempfile::TempDir,
    pub store: StoreHandle,
    pub source: SourceFile,
    pub console: Arc<ScriptedConsole>,
}

impl TestEnv {
    pub fn new(answers: &[&str]) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let state = dir.path().join("state.json");
        Self::with_state_path(dir, state, answers)
    }

    /// An environment whose store can never be saved: the state path sits
    /// under a regular file
    pub fn with_unwritable_store(answers: &[&str]) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").expect("Failed to write blocker");
        let state = blocker.join("state.json");
        Self::with_state_path(dir, state, answers)
    }

    fn with_state_path(dir: tempfile::TempDir, state: PathBuf, answers: &[&str]) -> Self {
        let db = dir.path().join("passwords.kdbx");
        std::fs::write(&db, b"KDBX test database").expect("Failed to write source");

        Self {
            store: StoreHandle::new(PersistentStore::new(state)),
            source: SourceFile::new(db).expect("valid source"),
            console: Arc::new(ScriptedConsole::new(answers)),
            _dir: dir,
        }
    }

    pub fn console(&self) -> Arc<dyn Console> {
        self.console.clone()
    }

    pub async fn seed(&self, key: &str, record: Value) {
        self.store
            .put_record(key, record)
            .await
            .expect("Failed to seed record");
    }

    /// Puts a record into the in-memory store without saving it
    pub async fn seed_in_memory(&self, key: &str, record: Value) {
        self.store.lock().await.set_record(key, record);
    }

    pub async fn record(&self, key: &str) -> Value {
        self.store.record(key).await.expect("record present")
    }

    /// A store handle reading the state file from disk, as a new process would
    pub async fn reopened_store(&self) -> StoreHandle {
        let path = self.store.lock().await.path().to_path_buf();
        let mut store = PersistentStore::new(path);
        store.load().expect("Failed to reload store");
        StoreHandle::new(store)
    }
}

pub fn future_expiry() -> i64 {
    Utc::now().timestamp() + 3600
}

pub fn past_expiry() -> i64 {
    Utc::now().timestamp() - 60
}

pub fn yandex_record(access_token: &str, token_expiry: i64) -> Value {
    json!({
        "clientId": "yandex-client",
        "clientSecret": "yandex-secret",
        "targetLocation": "disk:/KeePass",
        "accessToken": access_token,
        "refreshToken": "yandex-refresh",
        "tokenExpiry": token_expiry,
        "enabled": true
    })
}

pub fn google_record(access_token: &str, token_expiry: i64, known: Value) -> Value {
    json!({
        "clientId": "google-client",
        "clientSecret": "google-secret",
        "targetLocation": "folder-1",
        "accessToken": access_token,
        "refreshToken": "google-refresh",
        "tokenExpiry": token_expiry,
        "enabled": true,
        "knownRemoteFiles": known
    })
}
