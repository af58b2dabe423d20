// src/repository.rs
use crate::error::{RepositoryError, RepositoryResult};
use crate::models::{CreateBody, Credential, CredentialPatch, NewCredential, UpdateBody};

use async_trait::async_trait;
use chrono::Utc;
use log;
use std::time::Duration;

const COLLECTION_PATH: &str = "passwords";

/// CRUD access to the remote credential collection.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Fetches the whole collection.
    async fn list_all(&self) -> RepositoryResult<Vec<Credential>>;

    async fn get_by_id(&self, id: u64) -> RepositoryResult<Credential>;

    /// Stamps `createdAt`/`updatedAt` and stores a new record.
    async fn create(&self, data: NewCredential) -> RepositoryResult<Credential>;

    /// Stamps `updatedAt` and submits a partial replacement.
    async fn update(&self, id: u64, patch: CredentialPatch) -> RepositoryResult<Credential>;

    async fn delete(&self, id: u64) -> RepositoryResult<()>;

    /// Case-insensitive substring match on app, category or user name.
    /// Failures degrade to an empty result.
    async fn search(&self, query: &str) -> Vec<Credential> {
        log::debug!("Searching credentials with query {:?}", query);
        match self.list_all().await {
            Ok(credentials) => {
                let matches = filter_credentials(credentials, query);
                log::info!("Search matched {} credentials.", matches.len());
                matches
            }
            Err(e) => {
                log::warn!("Search failed, returning no results: {}", e);
                Vec::new()
            }
        }
    }
}

pub fn filter_credentials(credentials: Vec<Credential>, query: &str) -> Vec<Credential> {
    let needle = query.to_lowercase();
    credentials
        .into_iter()
        .filter(|c| {
            c.app.to_lowercase().contains(&needle)
                || c.category.to_lowercase().contains(&needle)
                || c.user_name.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Keeps every record that parses. Malformed ones are logged and skipped.
fn parse_records(items: Vec<serde_json::Value>) -> Vec<Credential> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Credential>(item) {
            Ok(credential) => Some(credential),
            Err(e) => {
                log::warn!("Skipping malformed credential record: {}", e);
                None
            }
        })
        .collect()
}

/// Talks to a REST collection at `{base_url}/passwords`.
#[derive(Debug, Clone)]
pub struct HttpCredentialRepository {
    client: reqwest::Client,
    collection_url: String,
}

impl HttpCredentialRepository {
    pub fn new(base_url: &str, timeout: Duration) -> RepositoryResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let collection_url = format!("{}/{}", base_url.trim_end_matches('/'), COLLECTION_PATH);
        log::info!("Credential repository initialized with URL: {}", collection_url);
        Ok(HttpCredentialRepository { client, collection_url })
    }

    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    fn item_url(&self, id: u64) -> String {
        format!("{}/{}", self.collection_url, id)
    }

    fn check_status(response: reqwest::Response) -> RepositoryResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(RepositoryError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            })
        }
    }

    async fn fetch_all(&self) -> RepositoryResult<Vec<Credential>> {
        let response = self.client.get(&self.collection_url).send().await?;
        let items = Self::check_status(response)?.json::<Vec<serde_json::Value>>().await?;
        Ok(parse_records(items))
    }
}

#[async_trait]
impl CredentialRepository for HttpCredentialRepository {
    async fn list_all(&self) -> RepositoryResult<Vec<Credential>> {
        log::info!("Fetching all credentials from: {}", self.collection_url);
        match self.fetch_all().await {
            Ok(credentials) => {
                log::debug!("Fetched {} credentials.", credentials.len());
                Ok(credentials)
            }
            Err(e) => {
                log::error!("Error fetching credentials, returning empty list: {}", e);
                Ok(Vec::new())
            }
        }
    }

    async fn get_by_id(&self, id: u64) -> RepositoryResult<Credential> {
        log::info!("Fetching credential with id: {}", id);
        let response = self.client.get(self.item_url(id)).send().await.map_err(|e| {
            log::error!("Error fetching credential with id {}: {}", id, e);
            RepositoryError::Transport(e)
        })?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            log::warn!("Credential with id {} not found.", id);
            return Err(RepositoryError::NotFound(id));
        }
        let credential = Self::check_status(response)?.json::<Credential>().await?;
        Ok(credential)
    }

    async fn create(&self, data: NewCredential) -> RepositoryResult<Credential> {
        log::info!("Creating credential for app '{}'", data.app);
        let timestamp = Utc::now();
        let body = CreateBody { data: &data, created_at: timestamp, updated_at: timestamp };

        let response = self.client.post(&self.collection_url).json(&body).send().await.map_err(|e| {
            log::error!("Error creating credential: {}", e);
            RepositoryError::Transport(e)
        })?;
        let created = Self::check_status(response)?.json::<Credential>().await?;
        log::info!("Credential created with id {}", created.id);
        Ok(created)
    }

    async fn update(&self, id: u64, patch: CredentialPatch) -> RepositoryResult<Credential> {
        log::info!("Updating credential with id {}", id);
        let body = UpdateBody { patch: &patch, updated_at: Utc::now() };

        let response = self.client.put(self.item_url(id)).json(&body).send().await.map_err(|e| {
            log::error!("Error updating credential with id {}: {}", id, e);
            RepositoryError::Transport(e)
        })?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(RepositoryError::NotFound(id));
        }
        let updated = Self::check_status(response)?.json::<Credential>().await?;
        log::info!("Credential {} updated.", id);
        Ok(updated)
    }

    async fn delete(&self, id: u64) -> RepositoryResult<()> {
        log::info!("Deleting credential with id: {}", id);
        let response = self.client.delete(self.item_url(id)).send().await.map_err(|e| {
            log::error!("Error deleting credential with id {}: {}", id, e);
            RepositoryError::Transport(e)
        })?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(RepositoryError::NotFound(id));
        }
        Self::check_status(response)?;
        log::info!("Credential with id {} deleted successfully", id);
        Ok(())
    }
}
