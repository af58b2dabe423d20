// src/listing.rs
use crate::edit::{EditOutcome, EditRequest};
use crate::encoding::SecretCodec;
use crate::error::{EncodingError, RepositoryResult, WorkflowResult};
use crate::interact::{ClipboardWriter, Confirm, EditPresenter};
use crate::models::Credential;
use crate::repository::CredentialRepository;

use log;
use std::sync::Arc;

pub const DELETE_TITLE: &str = "Delete Password";
pub const DELETE_FAILED: &str = "Failed to delete password";

pub fn delete_prompt(credential: &Credential) -> String {
    format!("Are you sure you want to delete the password for {}?", credential.app)
}

/// Identifies one issued list request. Later tickets compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListQuery {
    All,
    Search(String),
}

#[derive(Debug, Clone)]
pub struct ListRequest {
    pub ticket: Ticket,
    pub query: ListQuery,
}

#[derive(Debug)]
pub struct ListResponse {
    pub ticket: Ticket,
    pub query: ListQuery,
    pub result: RepositoryResult<Vec<Credential>>,
}

impl ListRequest {
    /// Performs the I/O for this request without touching the listing.
    pub async fn run(self, repository: &dyn CredentialRepository) -> ListResponse {
        let result = match &self.query {
            ListQuery::All => repository.list_all().await,
            ListQuery::Search(query) => Ok(repository.search(query).await),
        };
        ListResponse { ticket: self.ticket, query: self.query, result }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingState {
    pub credentials: Vec<Credential>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Declined,
    Deleted,
    Failed,
}

/// The credential list shown to the user.
///
/// Every load or search is tagged with a ticket and only the response to the
/// most recently issued request may replace the visible collection.
pub struct ListingWorkflow {
    repository: Arc<dyn CredentialRepository>,
    state: ListingState,
    issued: u64,
    pending_load: Option<Ticket>,
}

impl ListingWorkflow {
    pub fn new(repository: Arc<dyn CredentialRepository>) -> Self {
        ListingWorkflow {
            repository,
            state: ListingState::default(),
            issued: 0,
            pending_load: None,
        }
    }

    pub fn state(&self) -> &ListingState {
        &self.state
    }

    pub fn repository(&self) -> Arc<dyn CredentialRepository> {
        self.repository.clone()
    }

    fn next_ticket(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    pub fn begin_load(&mut self) -> ListRequest {
        let ticket = self.next_ticket();
        self.state.loading = true;
        self.pending_load = Some(ticket);
        log::debug!("Issued load request {:?}", ticket);
        ListRequest { ticket, query: ListQuery::All }
    }

    /// Searching leaves `loading` and `error` alone.
    pub fn begin_search(&mut self, query: &str) -> ListRequest {
        let ticket = self.next_ticket();
        log::debug!("Issued search request {:?} for {:?}", ticket, query);
        ListRequest { ticket, query: ListQuery::Search(query.to_string()) }
    }

    /// Installs a response. Returns whether it replaced the visible list.
    pub fn apply(&mut self, response: ListResponse) -> bool {
        let is_latest = response.ticket == Ticket(self.issued);

        if response.query == ListQuery::All && self.pending_load == Some(response.ticket) {
            self.pending_load = None;
            self.state.loading = false;
            if is_latest {
                match &response.result {
                    Ok(_) => self.state.error = None,
                    Err(e) => self.state.error = Some(e.to_string()),
                }
            }
        }

        if !is_latest {
            log::debug!("Discarding stale response {:?} (latest is {})", response.ticket, self.issued);
            return false;
        }

        match response.result {
            Ok(credentials) => {
                log::info!("Showing {} credentials.", credentials.len());
                self.state.credentials = credentials;
            }
            Err(e) => {
                log::error!("Error loading credentials: {}", e);
                self.state.credentials.clear();
            }
        }
        true
    }

    pub async fn load(&mut self) {
        let request = self.begin_load();
        let response = request.run(self.repository.as_ref()).await;
        self.apply(response);
    }

    pub async fn search(&mut self, query: &str) {
        let request = self.begin_search(query);
        let response = request.run(self.repository.as_ref()).await;
        self.apply(response);
    }

    /// Records the result of a delete. On success the returned request
    /// reloads the list.
    pub fn finish_delete(&mut self, credential: &Credential, result: RepositoryResult<()>) -> Option<ListRequest> {
        match result {
            Ok(()) => {
                log::info!("Credential {} ({}) deleted.", credential.id, credential.app);
                Some(self.begin_load())
            }
            Err(e) => {
                log::error!("Error deleting credential {}: {}", credential.id, e);
                self.state.error = Some(DELETE_FAILED.to_string());
                None
            }
        }
    }

    pub async fn delete(&mut self, credential: &Credential, confirm: &dyn Confirm) -> DeleteOutcome {
        if !confirm.confirm(DELETE_TITLE, &delete_prompt(credential)).await {
            log::info!("Deletion of credential {} declined.", credential.id);
            return DeleteOutcome::Declined;
        }
        let result = self.repository.delete(credential.id).await;
        match self.finish_delete(credential, result) {
            Some(reload) => {
                let response = reload.run(self.repository.as_ref()).await;
                self.apply(response);
                DeleteOutcome::Deleted
            }
            None => DeleteOutcome::Failed,
        }
    }

    pub fn request_create(&self) -> EditRequest {
        EditRequest::Create
    }

    pub fn request_edit(&self, credential: &Credential) -> EditRequest {
        EditRequest::Edit(credential.clone())
    }

    pub fn request_view(&self, credential: &Credential, codec: &dyn SecretCodec) -> DetailView {
        DetailView::new(credential.clone(), codec)
    }

    /// A saved edit triggers a reload; a cancelled one changes nothing.
    pub fn complete_edit(&mut self, outcome: &EditOutcome) -> Option<ListRequest> {
        match outcome {
            EditOutcome::Saved(credential) => {
                log::info!("Credential {} saved, reloading list.", credential.id);
                Some(self.begin_load())
            }
            EditOutcome::Cancelled => None,
        }
    }

    pub async fn open_editor(&mut self, presenter: &dyn EditPresenter, request: EditRequest) -> WorkflowResult<EditOutcome> {
        let outcome = presenter.present(request).await?;
        if let Some(reload) = self.complete_edit(&outcome) {
            let response = reload.run(self.repository.as_ref()).await;
            self.apply(response);
        }
        Ok(outcome)
    }
}

/// Read-only view of one credential with its secret decoded.
#[derive(Debug)]
pub struct DetailView {
    pub credential: Credential,
    secret: Result<String, EncodingError>,
    show_secret: bool,
}

impl DetailView {
    pub fn new(credential: Credential, codec: &dyn SecretCodec) -> Self {
        let secret = codec.decode(&credential.encoded_secret);
        if let Err(e) = &secret {
            log::warn!("Credential {} has an undecodable secret: {}", credential.id, e);
        }
        DetailView { credential, secret, show_secret: false }
    }

    pub fn toggle_secret(&mut self) {
        self.show_secret = !self.show_secret;
    }

    pub fn is_secret_shown(&self) -> bool {
        self.show_secret
    }

    pub fn decode_error(&self) -> Option<&EncodingError> {
        self.secret.as_ref().err()
    }

    /// Masked unless visibility was toggled on.
    pub fn secret_display(&self) -> String {
        match &self.secret {
            Ok(secret) if self.show_secret => secret.clone(),
            Ok(secret) => "•".repeat(secret.chars().count().max(8)),
            Err(_) => "<unreadable>".to_string(),
        }
    }

    pub fn copy_user_name(&self, clipboard: &dyn ClipboardWriter) -> Result<(), String> {
        clipboard.write_text(&self.credential.user_name)
    }

    pub fn copy_secret(&self, clipboard: &dyn ClipboardWriter) -> Result<(), String> {
        match &self.secret {
            Ok(secret) => clipboard.write_text(secret),
            Err(e) => Err(e.to_string()),
        }
    }
}
