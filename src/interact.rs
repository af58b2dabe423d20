// src/interact.rs
// Collaborators the workflows talk to: prompts, clipboard, and the editor.
use crate::edit::{EditOutcome, EditRequest, EditWorkflow, Field};
use crate::encoding::SecretCodec;
use crate::error::{WorkflowError, WorkflowResult};
use crate::repository::CredentialRepository;

use async_trait::async_trait;
use log;
use std::io::{self, Write};
use std::sync::Arc;

#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, title: &str, message: &str) -> bool;
}

/// Fire-and-forget text write to the system clipboard.
pub trait ClipboardWriter: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), String>;
}

/// Opens the credential form for a request and reports how it was closed.
#[async_trait]
pub trait EditPresenter: Send + Sync {
    async fn present(&self, request: EditRequest) -> WorkflowResult<EditOutcome>;
}

fn read_line(prompt: &str) -> io::Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
}

/// `y/N` prompt on the terminal. Anything but `y` is a no.
pub struct StdinConfirm;

#[async_trait]
impl Confirm for StdinConfirm {
    async fn confirm(&self, title: &str, message: &str) -> bool {
        let prompt = format!("{}\n{} (y/N): ", title, message);
        let answer = tokio::task::spawn_blocking(move || read_line(&prompt)).await;
        match answer {
            Ok(Ok(line)) => line.trim().eq_ignore_ascii_case("y"),
            Ok(Err(e)) => {
                log::error!("Failed to read confirmation: {}", e);
                false
            }
            Err(e) => {
                log::error!("Confirmation prompt task failed: {}", e);
                false
            }
        }
    }
}

pub struct SystemClipboard;

impl ClipboardWriter for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), String> {
        let mut clipboard = arboard::Clipboard::new().map_err(|e| {
            log::error!("Error initializing clipboard: {}", e);
            format!("Error initializing clipboard: {}", e)
        })?;
        clipboard.set_text(text.to_string()).map_err(|e| {
            log::error!("Error setting clipboard text: {}", e);
            format!("Error copying to clipboard: {}", e)
        })
    }
}

/// Line-based editor for the command line front-end.
///
/// Each field is prompted with its current value as the default; the secret
/// is read without echo. After a rejected form the user may try again.
pub struct PromptEditor {
    repository: Arc<dyn CredentialRepository>,
    codec: Arc<dyn SecretCodec>,
    retry: Arc<dyn Confirm>,
}

impl PromptEditor {
    pub fn new(
        repository: Arc<dyn CredentialRepository>,
        codec: Arc<dyn SecretCodec>,
        retry: Arc<dyn Confirm>,
    ) -> Self {
        PromptEditor { repository, codec, retry }
    }

    fn prompt_fields(workflow: &mut EditWorkflow) -> io::Result<()> {
        for field in Field::ALL {
            let current = workflow.form().get(field).to_string();
            let error = workflow
                .field_error(field)
                .map(|e| format!(" ({})", e))
                .unwrap_or_default();
            let value = if field == Field::Secret {
                let hint = if current.is_empty() { "" } else { " [unchanged]" };
                rpassword::prompt_password(format!("{}{}{}: ", field, hint, error))?
            } else if current.is_empty() {
                read_line(&format!("{}{}: ", field, error))?
            } else {
                read_line(&format!("{} [{}]{}: ", field, current, error))?
            };
            if !value.is_empty() {
                workflow.set_field(field, value);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EditPresenter for PromptEditor {
    async fn present(&self, request: EditRequest) -> WorkflowResult<EditOutcome> {
        let mut workflow = EditWorkflow::from_request(self.repository.clone(), self.codec.clone(), &request);
        if let Some(e) = workflow.load_error() {
            println!("Stored password could not be decoded ({}). Enter a new one.", e);
        }

        loop {
            // Prompts block on stdin; keep them off the async workers.
            let (returned, input) = tokio::task::spawn_blocking(move || {
                let input = Self::prompt_fields(&mut workflow);
                (workflow, input)
            })
            .await
            .map_err(|e| WorkflowError::Input(format!("prompt task failed: {}", e)))?;
            workflow = returned;
            input.map_err(|e| {
                log::error!("Failed to read form input: {}", e);
                WorkflowError::Input(e.to_string())
            })?;

            match workflow.submit().await {
                Ok(saved) => return Ok(EditOutcome::Saved(saved)),
                Err(WorkflowError::Validation(errors)) => {
                    for (field, error) in &errors.errors {
                        println!("  {}: {}", field, error);
                    }
                    if !self.retry.confirm("Form is invalid", "Edit the fields again?").await {
                        return Ok(EditOutcome::Cancelled);
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}
