// src/cli.rs
use clap::{Parser, Subcommand};
use crate::config::{self, Config, EncodingScheme};
use crate::edit::EditOutcome;
use crate::encoding::{self, Base64Codec, SealedCodec, SecretCodec};
use crate::error::{AppError, AppResult, EncodingError};
use crate::interact::{Confirm, PromptEditor, StdinConfirm, SystemClipboard};
use crate::listing::{DeleteOutcome, ListingWorkflow};
use crate::models::Credential;
use crate::repository::{CredentialRepository, HttpCredentialRepository};
use async_trait::async_trait;
use log;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

/// Manage credentials stored behind a remote password API.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(arg_required_else_help = false)] // No subcommand starts the TUI
pub struct Cli {
    /// Base URL of the credential API, overriding the config file
    #[clap(long, global = true, env = "PASSMAN_API_URL")]
    pub api_url: Option<String>,

    #[clap(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all stored credentials
    List,
    /// Search credentials by app, category or user name
    Search {
        /// Case-insensitive text to look for
        query: String,
    },
    /// Show one credential
    Show {
        id: u64,
        /// Print the decoded password
        #[clap(long)]
        reveal: bool,
        /// Copy the decoded password to the clipboard
        #[clap(long)]
        copy: bool,
    },
    /// Add a new credential
    Add,
    /// Edit an existing credential
    Edit {
        id: u64,
    },
    /// Delete a credential
    Delete {
        id: u64,
        /// Do not ask for confirmation
        #[clap(short, long)]
        yes: bool,
    },
    /// Launch the Terminal User Interface (TUI)
    Tui,
}

/// Explicitly constructed dependencies shared by every front-end.
pub struct Services {
    pub config: Config,
    pub repository: Arc<dyn CredentialRepository>,
    pub codec: Arc<dyn SecretCodec>,
}

pub fn build_services(api_url: Option<String>) -> AppResult<Services> {
    let (mut config, config_path) = config::load_config();
    if let Some(url) = api_url {
        log::info!("Using API base URL from command line: {}", url);
        config.api.base_url = url;
    }

    let repository = HttpCredentialRepository::new(
        &config.api.base_url,
        Duration::from_secs(config.api.timeout_seconds),
    )?;
    let codec = build_codec(&mut config, config_path.as_deref())?;

    Ok(Services {
        config,
        repository: Arc::new(repository),
        codec,
    })
}

fn build_codec(config: &mut Config, config_path: Option<&Path>) -> AppResult<Arc<dyn SecretCodec>> {
    match config.encoding.scheme {
        EncodingScheme::Base64 => {
            log::info!("Using base64 secret encoding.");
            Ok(Arc::new(Base64Codec))
        }
        EncodingScheme::Sealed => {
            log::info!("Using sealed secret encoding.");
            let passphrase = rpassword::prompt_password("Enter vault passphrase: ")
                .map_err(|e| AppError::Cli(format!("Failed to read passphrase: {}", e)))?;
            if passphrase.is_empty() {
                return Err(AppError::Cli("Passphrase cannot be empty.".to_string()));
            }

            let salt = match &config.encoding.salt {
                Some(salt_hex) => {
                    let salt = hex::decode(salt_hex)
                        .map_err(|e| AppError::Config(format!("Invalid salt in config: {}", e)))?;
                    if let Some(verifier) = &config.encoding.verifier {
                        if !encoding::verify_passphrase(verifier, &passphrase)? {
                            return Err(EncodingError::WrongPassphrase.into());
                        }
                    }
                    salt
                }
                None => {
                    let confirmation = rpassword::prompt_password("Confirm new vault passphrase: ")
                        .map_err(|e| AppError::Cli(format!("Failed to read passphrase confirmation: {}", e)))?;
                    if confirmation != passphrase {
                        log::warn!("Passphrase confirmation failed: passphrases do not match.");
                        return Err(AppError::Cli("Passphrases do not match.".to_string()));
                    }
                    let salt = encoding::generate_salt().to_vec();
                    config.encoding.salt = Some(hex::encode(&salt));
                    config.encoding.verifier = Some(encoding::hash_passphrase(
                        &passphrase,
                        &salt,
                        &config.encoding.argon2_params,
                    )?);
                    match config_path {
                        Some(path) => config::save_config(path, config).map_err(AppError::Config)?,
                        None => log::warn!("No config path; the new salt will not be persisted."),
                    }
                    salt
                }
            };

            let codec = SealedCodec::from_passphrase(&passphrase, &salt, &config.encoding.argon2_params)?;
            Ok(Arc::new(codec))
        }
    }
}

/// Confirmation already given on the command line.
struct AssumeYes;

#[async_trait]
impl Confirm for AssumeYes {
    async fn confirm(&self, _title: &str, _message: &str) -> bool {
        true
    }
}

fn print_credentials(credentials: &[Credential]) {
    if credentials.is_empty() {
        println!("No credentials found.");
        return;
    }
    for credential in credentials {
        println!(
            "  [{}] {} ({}) - {}",
            credential.id, credential.app, credential.category, credential.user_name
        );
    }
}

fn print_listing(listing: &ListingWorkflow) {
    if let Some(error) = &listing.state().error {
        eprintln!("Error: {}", error);
    }
    print_credentials(&listing.state().credentials);
}

/// Handles the parsed CLI command.
/// Returns `Ok(true)` if the TUI should run, `Ok(false)` if a CLI command was handled and TUI should not run.
pub fn handle_cli_command(command: Option<Commands>, services: &Services, runtime: &Runtime) -> AppResult<bool> {
    log::debug!("Handling CLI command: {:?}", command);
    let mut listing = ListingWorkflow::new(services.repository.clone());

    match command {
        Some(Commands::List) => {
            log::info!("Executing 'list' command.");
            runtime.block_on(listing.load());
            print_listing(&listing);
            log::info!("Listed {} credentials.", listing.state().credentials.len());
            Ok(false)
        }
        Some(Commands::Search { query }) => {
            log::info!("Executing 'search' command.");
            runtime.block_on(listing.search(&query));
            print_listing(&listing);
            Ok(false)
        }
        Some(Commands::Show { id, reveal, copy }) => {
            log::info!("Executing 'show' command for id {}", id);
            let credential = runtime.block_on(services.repository.get_by_id(id))?;
            let mut view = listing.request_view(&credential, services.codec.as_ref());
            if reveal {
                view.toggle_secret();
            }
            println!("Category: {}", credential.category);
            println!("App:      {}", credential.app);
            println!("User:     {}", credential.user_name);
            println!("Password: {}", view.secret_display());
            if let Some(created_at) = credential.created_at {
                println!("Created:  {}", created_at.to_rfc3339());
            }
            if let Some(updated_at) = credential.updated_at {
                println!("Updated:  {}", updated_at.to_rfc3339());
            }
            if let Some(e) = view.decode_error() {
                eprintln!("Warning: {}", e);
            }
            if copy {
                view.copy_secret(&SystemClipboard).map_err(AppError::Cli)?;
                println!("Password copied to clipboard.");
            }
            Ok(false)
        }
        Some(Commands::Add) => {
            log::info!("Executing 'add' command.");
            let editor = PromptEditor::new(services.repository.clone(), services.codec.clone(), Arc::new(StdinConfirm));
            let request = listing.request_create();
            match runtime.block_on(listing.open_editor(&editor, request))? {
                EditOutcome::Saved(saved) => println!("Credential for '{}' added with id {}.", saved.app, saved.id),
                EditOutcome::Cancelled => println!("Add cancelled."),
            }
            Ok(false)
        }
        Some(Commands::Edit { id }) => {
            log::info!("Executing 'edit' command for id {}", id);
            let credential = runtime.block_on(services.repository.get_by_id(id))?;
            let editor = PromptEditor::new(services.repository.clone(), services.codec.clone(), Arc::new(StdinConfirm));
            let request = listing.request_edit(&credential);
            match runtime.block_on(listing.open_editor(&editor, request))? {
                EditOutcome::Saved(saved) => println!("Credential '{}' updated.", saved.app),
                EditOutcome::Cancelled => println!("Edit cancelled."),
            }
            Ok(false)
        }
        Some(Commands::Delete { id, yes }) => {
            log::info!("Executing 'delete' command for id {}", id);
            let credential = runtime.block_on(services.repository.get_by_id(id))?;
            let confirm: &dyn Confirm = if yes { &AssumeYes } else { &StdinConfirm };
            match runtime.block_on(listing.delete(&credential, confirm)) {
                DeleteOutcome::Deleted => println!("Credential '{}' deleted.", credential.app),
                DeleteOutcome::Declined => println!("Deletion cancelled."),
                DeleteOutcome::Failed => {
                    let message = listing.state().error.clone().unwrap_or_default();
                    return Err(AppError::Cli(message));
                }
            }
            Ok(false)
        }
        Some(Commands::Tui) => {
            log::info!("'tui' command given, preparing to launch TUI.");
            Ok(true)
        }
        None => {
            log::info!("No CLI command given, preparing to launch TUI by default.");
            Ok(true)
        }
    }
}
