// src/testing.rs
// Test doubles shared by the workflow tests.
use crate::error::{RepositoryError, RepositoryResult};
use crate::interact::{ClipboardWriter, Confirm};
use crate::models::{Credential, CredentialPatch, NewCredential};
use crate::repository::CredentialRepository;

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

pub fn credential(id: u64, category: &str, app: &str, user_name: &str, encoded_secret: &str) -> Credential {
    Credential {
        id,
        category: category.to_string(),
        app: app.to_string(),
        user_name: user_name.to_string(),
        encoded_secret: encoded_secret.to_string(),
        created_at: None,
        updated_at: None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListAll,
    GetById(u64),
    Create(NewCredential),
    Update(u64, CredentialPatch),
    Delete(u64),
}

#[derive(Default)]
struct Inner {
    records: Vec<Credential>,
    calls: Vec<Call>,
    fail_list: bool,
    fail_writes: bool,
    next_id: u64,
}

/// In-memory repository that records every call it receives.
#[derive(Clone, Default)]
pub struct RecordingRepository {
    inner: Arc<Mutex<Inner>>,
}

impl RecordingRepository {
    pub fn new(records: Vec<Credential>) -> Self {
        let next_id = records.iter().map(|c| c.id).max().unwrap_or(0);
        RecordingRepository {
            inner: Arc::new(Mutex::new(Inner { records, next_id, ..Inner::default() })),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn write_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::ListAll | Call::GetById(_)))
            .collect()
    }

    pub fn records(&self) -> Vec<Credential> {
        self.inner.lock().unwrap().records.clone()
    }

    pub fn fail_list(&self, fail: bool) {
        self.inner.lock().unwrap().fail_list = fail;
    }

    pub fn fail_writes(&self, fail: bool) {
        self.inner.lock().unwrap().fail_writes = fail;
    }
}

#[async_trait]
impl CredentialRepository for RecordingRepository {
    async fn list_all(&self) -> RepositoryResult<Vec<Credential>> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::ListAll);
        if inner.fail_list {
            return Err(RepositoryError::Other("listing unavailable".to_string()));
        }
        Ok(inner.records.clone())
    }

    async fn get_by_id(&self, id: u64) -> RepositoryResult<Credential> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::GetById(id));
        inner.records.iter().find(|c| c.id == id).cloned().ok_or(RepositoryError::NotFound(id))
    }

    async fn create(&self, data: NewCredential) -> RepositoryResult<Credential> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Create(data.clone()));
        if inner.fail_writes {
            return Err(RepositoryError::Other("write rejected".to_string()));
        }
        inner.next_id += 1;
        let now = chrono::Utc::now();
        let created = Credential {
            id: inner.next_id,
            category: data.category,
            app: data.app,
            user_name: data.user_name,
            encoded_secret: data.encoded_secret,
            created_at: Some(now),
            updated_at: Some(now),
        };
        inner.records.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: u64, patch: CredentialPatch) -> RepositoryResult<Credential> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Update(id, patch.clone()));
        if inner.fail_writes {
            return Err(RepositoryError::Other("write rejected".to_string()));
        }
        let record = inner.records.iter_mut().find(|c| c.id == id).ok_or(RepositoryError::NotFound(id))?;
        if let Some(category) = patch.category {
            record.category = category;
        }
        if let Some(app) = patch.app {
            record.app = app;
        }
        if let Some(user_name) = patch.user_name {
            record.user_name = user_name;
        }
        if let Some(encoded_secret) = patch.encoded_secret {
            record.encoded_secret = encoded_secret;
        }
        record.updated_at = Some(chrono::Utc::now());
        Ok(record.clone())
    }

    async fn delete(&self, id: u64) -> RepositoryResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Delete(id));
        if inner.fail_writes {
            return Err(RepositoryError::Other("write rejected".to_string()));
        }
        let before = inner.records.len();
        inner.records.retain(|c| c.id != id);
        if inner.records.len() == before {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }
}

/// Answers every prompt the same way and remembers what it was asked.
pub struct ScriptedConfirm {
    answer: bool,
    asked: Mutex<Vec<(String, String)>>,
}

impl ScriptedConfirm {
    pub fn new(answer: bool) -> Self {
        ScriptedConfirm { answer, asked: Mutex::new(Vec::new()) }
    }

    pub fn asked(&self) -> Vec<(String, String)> {
        self.asked.lock().unwrap().clone()
    }
}

#[async_trait]
impl Confirm for ScriptedConfirm {
    async fn confirm(&self, title: &str, message: &str) -> bool {
        self.asked.lock().unwrap().push((title.to_string(), message.to_string()));
        self.answer
    }
}

#[derive(Default)]
pub struct MemoryClipboard {
    pub writes: Mutex<Vec<String>>,
}

impl ClipboardWriter for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), String> {
        self.writes.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
