// src/edit.rs
use crate::encoding::SecretCodec;
use crate::error::{EncodingError, EncodingResult, WorkflowResult};
use crate::models::{Credential, CredentialPatch, NewCredential};
use crate::repository::CredentialRepository;

use log;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

const MIN_LABEL_LEN: usize = 2;
const MIN_SECRET_LEN: usize = 6;

/// What the listing asks the editor to open.
#[derive(Debug, Clone, PartialEq)]
pub enum EditRequest {
    Create,
    Edit(Credential),
}

/// What the editor hands back when it closes.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    Cancelled,
    Saved(Credential),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Category,
    App,
    UserName,
    Secret,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Category, Field::App, Field::UserName, Field::Secret];

    pub fn label(self) -> &'static str {
        match self {
            Field::Category => "Category",
            Field::App => "App",
            Field::UserName => "User name",
            Field::Secret => "Password",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("This field is required")]
    Required,
    #[error("Minimum length is {0} characters")]
    MinLength(usize),
    #[error("Please enter a valid email")]
    Email,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Error)]
#[error("{} field(s) invalid", .errors.len())]
pub struct ValidationErrors {
    pub errors: Vec<(Field, FieldError)>,
}

impl ValidationErrors {
    pub fn get(&self, field: Field) -> Option<&FieldError> {
        self.errors.iter().find(|(f, _)| *f == field).map(|(_, e)| e)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialForm {
    pub category: String,
    pub app: String,
    pub user_name: String,
    pub secret: String,
}

impl CredentialForm {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Category => &self.category,
            Field::App => &self.app,
            Field::UserName => &self.user_name,
            Field::Secret => &self.secret,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Category => self.category = value,
            Field::App => self.app = value,
            Field::UserName => self.user_name = value,
            Field::Secret => self.secret = value,
        }
    }

    /// Label fields trimmed; the secret is kept exactly as typed.
    pub fn trimmed(&self) -> CredentialForm {
        CredentialForm {
            category: self.category.trim().to_string(),
            app: self.app.trim().to_string(),
            user_name: self.user_name.trim().to_string(),
            secret: self.secret.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let errors: Vec<(Field, FieldError)> = Field::ALL
            .iter()
            .filter_map(|&field| validate_field(field, self.get(field)).map(|e| (field, e)))
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors { errors })
        }
    }
}

fn validate_field(field: Field, value: &str) -> Option<FieldError> {
    if value.is_empty() {
        return Some(FieldError::Required);
    }
    let min_len = match field {
        Field::Category | Field::App => MIN_LABEL_LEN,
        Field::Secret => MIN_SECRET_LEN,
        Field::UserName => {
            return if is_valid_email(value) { None } else { Some(FieldError::Email) };
        }
    };
    if value.chars().count() < min_len {
        Some(FieldError::MinLength(min_len))
    } else {
        None
    }
}

fn is_local_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+/=?^_`{|}~-".contains(c)
}

fn is_domain_label(label: &str) -> bool {
    let bytes = label.as_bytes();
    !bytes.is_empty()
        && bytes.len() <= 63
        && bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'-')
        && bytes[0] != b'-'
        && bytes[bytes.len() - 1] != b'-'
}

/// Same acceptance rule as the usual HTML form email check: dot-separated
/// atoms, `@`, dot-separated DNS labels. A bare host such as `a@localhost`
/// is accepted.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().count() > 254 {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.chars().count() > 64 {
        return false;
    }
    let local_ok = local
        .split('.')
        .all(|atom| !atom.is_empty() && atom.chars().all(is_local_char));
    local_ok && domain.split('.').all(is_domain_label)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditMode {
    Create,
    Edit { id: u64, original_secret: String },
}

/// Loads a credential into an editable form and saves it back.
///
/// In edit mode the stored secret is decoded for display and the original
/// encoded value is kept. On save, an unchanged secret is sent back exactly
/// as it was stored; only a changed secret is encoded again.
pub struct EditWorkflow {
    repository: Arc<dyn CredentialRepository>,
    codec: Arc<dyn SecretCodec>,
    mode: EditMode,
    form: CredentialForm,
    touched: bool,
    load_error: Option<EncodingError>,
}

impl EditWorkflow {
    pub fn for_create(repository: Arc<dyn CredentialRepository>, codec: Arc<dyn SecretCodec>) -> Self {
        EditWorkflow {
            repository,
            codec,
            mode: EditMode::Create,
            form: CredentialForm::default(),
            touched: false,
            load_error: None,
        }
    }

    pub fn for_edit(
        repository: Arc<dyn CredentialRepository>,
        codec: Arc<dyn SecretCodec>,
        credential: &Credential,
    ) -> Self {
        let (secret, load_error) = match codec.decode(&credential.encoded_secret) {
            Ok(secret) => (secret, None),
            Err(e) => {
                log::error!("Error decoding secret of credential {}: {}", credential.id, e);
                (String::new(), Some(e))
            }
        };
        EditWorkflow {
            repository,
            codec,
            mode: EditMode::Edit {
                id: credential.id,
                original_secret: credential.encoded_secret.clone(),
            },
            form: CredentialForm {
                category: credential.category.clone(),
                app: credential.app.clone(),
                user_name: credential.user_name.clone(),
                secret,
            },
            touched: false,
            load_error,
        }
    }

    pub fn from_request(
        repository: Arc<dyn CredentialRepository>,
        codec: Arc<dyn SecretCodec>,
        request: &EditRequest,
    ) -> Self {
        match request {
            EditRequest::Create => Self::for_create(repository, codec),
            EditRequest::Edit(credential) => Self::for_edit(repository, codec, credential),
        }
    }

    pub fn mode(&self) -> &EditMode {
        &self.mode
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, EditMode::Edit { .. })
    }

    pub fn form(&self) -> &CredentialForm {
        &self.form
    }

    pub fn set_field(&mut self, field: Field, value: String) {
        self.form.set(field, value);
    }

    /// Set when the stored secret could not be decoded on load.
    pub fn load_error(&self) -> Option<&EncodingError> {
        self.load_error.as_ref()
    }

    /// Errors are only reported once a submit has been attempted.
    pub fn field_error(&self, field: Field) -> Option<FieldError> {
        if !self.touched {
            return None;
        }
        validate_field(field, self.form.trimmed().get(field))
    }

    fn resolve_encoded_secret(&self, secret: &str) -> EncodingResult<String> {
        match &self.mode {
            EditMode::Edit { original_secret, .. } => match self.codec.decode(original_secret) {
                Ok(decoded) if decoded == secret => {
                    log::debug!("Secret unchanged, keeping the stored value.");
                    Ok(original_secret.clone())
                }
                Ok(_) => self.codec.encode(secret),
                Err(e) => {
                    log::warn!("Stored secret is not decodable ({}); encoding the submitted one.", e);
                    self.codec.encode(secret)
                }
            },
            EditMode::Create => self.codec.encode(secret),
        }
    }

    /// Validates, encodes and dispatches create or update.
    pub async fn submit(&mut self) -> WorkflowResult<Credential> {
        let values = self.form.trimmed();
        if let Err(errors) = values.validate() {
            self.touched = true;
            log::warn!("Credential form rejected: {}", errors);
            return Err(errors.into());
        }

        let data = NewCredential {
            encoded_secret: self.resolve_encoded_secret(&values.secret)?,
            category: values.category,
            app: values.app,
            user_name: values.user_name,
        };

        let saved = match &self.mode {
            EditMode::Edit { id, .. } => {
                let saved = self.repository.update(*id, CredentialPatch::from(data)).await?;
                log::info!("Credential {} updated successfully", saved.id);
                saved
            }
            EditMode::Create => {
                let saved = self.repository.create(data).await?;
                log::info!("Credential {} created successfully", saved.id);
                saved
            }
        };
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{Base64Codec, SealedCodec};
    use crate::error::WorkflowError;
    use crate::testing::{credential, Call, RecordingRepository};

    fn base64(plaintext: &str) -> String {
        Base64Codec.encode(plaintext).unwrap()
    }

    fn edit_workflow(repository: &RecordingRepository, codec: Arc<dyn SecretCodec>, record: &Credential) -> EditWorkflow {
        EditWorkflow::for_edit(Arc::new(repository.clone()), codec, record)
    }

    fn fill(workflow: &mut EditWorkflow, category: &str, app: &str, user_name: &str, secret: &str) {
        workflow.set_field(Field::Category, category.to_string());
        workflow.set_field(Field::App, app.to_string());
        workflow.set_field(Field::UserName, user_name.to_string());
        workflow.set_field(Field::Secret, secret.to_string());
    }

    #[tokio::test]
    async fn test_create_encodes_secret_and_dispatches_create() {
        let repository = RecordingRepository::new(Vec::new());
        let mut workflow = EditWorkflow::for_create(Arc::new(repository.clone()), Arc::new(Base64Codec));
        fill(&mut workflow, "Work", "VPN", "a@x.com", "secret1");

        let saved = workflow.submit().await.unwrap();
        assert_eq!(saved.encoded_secret, base64("secret1"));
        assert!(saved.created_at.is_some());
        assert_eq!(
            repository.write_calls(),
            vec![Call::Create(NewCredential {
                category: "Work".to_string(),
                app: "VPN".to_string(),
                user_name: "a@x.com".to_string(),
                encoded_secret: base64("secret1"),
            })]
        );
    }

    #[tokio::test]
    async fn test_edit_with_unchanged_secret_preserves_stored_value() {
        let original = base64("oldpass");
        let record = credential(3, "Email", "Mail", "a@x.com", &original);
        let repository = RecordingRepository::new(vec![record.clone()]);
        let mut workflow = edit_workflow(&repository, Arc::new(Base64Codec), &record);
        assert_eq!(workflow.form().secret, "oldpass");

        workflow.set_field(Field::App, "Webmail".to_string());
        let saved = workflow.submit().await.unwrap();

        assert_eq!(saved.encoded_secret, original);
        match &repository.write_calls()[..] {
            [Call::Update(3, patch)] => {
                assert_eq!(patch.encoded_secret.as_deref(), Some(original.as_str()));
                assert_eq!(patch.app.as_deref(), Some("Webmail"));
            }
            other => panic!("Expected a single update, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unchanged_secret_is_byte_identical_with_randomized_codec() {
        let codec: Arc<dyn SecretCodec> = Arc::new(SealedCodec::new([9u8; 32]));
        let original = codec.encode("hunter22").unwrap();
        let record = credential(1, "Email", "Mail", "a@x.com", &original);
        let repository = RecordingRepository::new(vec![record.clone()]);

        let mut workflow = edit_workflow(&repository, codec.clone(), &record);
        workflow.submit().await.unwrap();
        assert_eq!(repository.records()[0].encoded_secret, original);
    }

    #[tokio::test]
    async fn test_edit_with_changed_secret_reencodes() {
        let original = base64("oldpass");
        let record = credential(3, "Email", "Mail", "a@x.com", &original);
        let repository = RecordingRepository::new(vec![record.clone()]);
        let mut workflow = edit_workflow(&repository, Arc::new(Base64Codec), &record);

        workflow.set_field(Field::Secret, "newpass1".to_string());
        let saved = workflow.submit().await.unwrap();

        assert_ne!(saved.encoded_secret, original);
        assert_eq!(Base64Codec.decode(&saved.encoded_secret).unwrap(), "newpass1");
    }

    #[tokio::test]
    async fn test_invalid_form_marks_fields_and_skips_repository() {
        let repository = RecordingRepository::new(Vec::new());
        let mut workflow = EditWorkflow::for_create(Arc::new(repository.clone()), Arc::new(Base64Codec));
        fill(&mut workflow, "W", "", "not-an-email", "12345");
        assert_eq!(workflow.field_error(Field::App), None);

        match workflow.submit().await {
            Err(WorkflowError::Validation(errors)) => {
                assert_eq!(errors.errors.len(), 4);
                assert_eq!(errors.get(Field::App), Some(&FieldError::Required));
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
        assert_eq!(workflow.field_error(Field::Category), Some(FieldError::MinLength(2)));
        assert_eq!(workflow.field_error(Field::UserName), Some(FieldError::Email));
        assert_eq!(workflow.field_error(Field::Secret), Some(FieldError::MinLength(6)));
        assert!(repository.calls().is_empty());
    }

    #[tokio::test]
    async fn test_labels_are_trimmed_before_validation_and_dispatch() {
        let repository = RecordingRepository::new(Vec::new());
        let mut workflow = EditWorkflow::for_create(Arc::new(repository.clone()), Arc::new(Base64Codec));
        fill(&mut workflow, "  Work ", " VPN", " a@x.com  ", " spaced ");

        let saved = workflow.submit().await.unwrap();
        assert_eq!(saved.category, "Work");
        assert_eq!(saved.app, "VPN");
        assert_eq!(saved.user_name, "a@x.com");
        assert_eq!(Base64Codec.decode(&saved.encoded_secret).unwrap(), " spaced ");
    }

    #[tokio::test]
    async fn test_undecodable_secret_on_load_is_recoverable() {
        let record = credential(5, "Email", "Mail", "a@x.com", "%%not-encoded%%");
        let repository = RecordingRepository::new(vec![record.clone()]);
        let mut workflow = edit_workflow(&repository, Arc::new(Base64Codec), &record);

        assert!(matches!(workflow.load_error(), Some(EncodingError::Decode(_))));
        assert_eq!(workflow.form().app, "Mail");
        assert_eq!(workflow.form().user_name, "a@x.com");
        assert_eq!(workflow.form().secret, "");

        workflow.set_field(Field::Secret, "replacement".to_string());
        let saved = workflow.submit().await.unwrap();
        assert_eq!(Base64Codec.decode(&saved.encoded_secret).unwrap(), "replacement");
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_surfaced_without_retry() {
        let repository = RecordingRepository::new(Vec::new());
        repository.fail_writes(true);
        let mut workflow = EditWorkflow::for_create(Arc::new(repository.clone()), Arc::new(Base64Codec));
        fill(&mut workflow, "Work", "VPN", "a@x.com", "secret1");

        assert!(matches!(workflow.submit().await, Err(WorkflowError::Repository(_))));
        assert_eq!(repository.write_calls().len(), 1);
    }

    #[test]
    fn test_from_request_selects_mode() {
        let repository: Arc<dyn CredentialRepository> = Arc::new(RecordingRepository::new(Vec::new()));
        let codec: Arc<dyn SecretCodec> = Arc::new(Base64Codec);
        let create = EditWorkflow::from_request(repository.clone(), codec.clone(), &EditRequest::Create);
        assert_eq!(create.mode(), &EditMode::Create);

        let record = credential(8, "Work", "VPN", "a@x.com", &base64("secret1"));
        let edit = EditWorkflow::from_request(repository, codec, &EditRequest::Edit(record.clone()));
        assert!(edit.is_edit());
        assert_eq!(edit.mode(), &EditMode::Edit { id: 8, original_secret: record.encoded_secret });
    }

    #[test]
    fn test_email_rule() {
        for ok in ["a@x.com", "first.last+tag@sub.example.org", "a@localhost", "o'neil@x-y.io"] {
            assert!(is_valid_email(ok), "{} should be accepted", ok);
        }
        for bad in ["", "plain", "@x.com", "a@", "a..b@x.com", ".a@x.com", "a@-x.com", "a@x-.com", "a b@x.com", "a@x..com"] {
            assert!(!is_valid_email(bad), "{} should be rejected", bad);
        }
        let long_local = format!("{}@x.com", "a".repeat(65));
        assert!(!is_valid_email(&long_local));
    }
}
