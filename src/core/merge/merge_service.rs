use async_trait::async_trait;
use indexmap::IndexMap;
use thiserror::Error;

/// Errors that can be raised while producing one merged document.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("template copy failed: {0}")]
    Copy(String),
    #[error("text replacement failed: {0}")]
    Replace(String),
    #[error("ownership transfer failed: {0}")]
    Permission(String),
}

/// One replace-all instruction sent to the document store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub find: String,
    pub replace: String,
    pub case_sensitive: bool,
}

/// Token -> value map active when substitutions are computed for one
/// document. Static fields are seeded once; per-row fields overwrite them
/// between documents. Insertion order is preserved so the outgoing batch
/// mirrors the configured column order.
#[derive(Debug, Clone, Default)]
pub struct MergeContext {
    fields: IndexMap<String, Option<String>>,
}

impl MergeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite one field. `None` renders as an empty string at
    /// substitution time.
    pub fn set(&mut self, token: impl Into<String>, value: Option<String>) {
        self.fields.insert(token.into(), value);
    }

    /// Overwrite this context with one row's mapped fields. Fields the row
    /// does not name (the static ones) keep their current values.
    pub fn apply_fields(&mut self, fields: &[(String, Option<String>)]) {
        for (token, value) in fields {
            self.fields.insert(token.clone(), value.clone());
        }
    }

    /// Build the replace-all batch for the current field values.
    ///
    /// Placeholders are spelled `{{TOKEN}}` with the token upper-cased, and
    /// matching is exact-case, so a lower-case `{{date}}` in the template is
    /// left alone. Tokens the template does not contain are a no-op on the
    /// provider side; tokens missing from this context get no instruction at
    /// all and their placeholders survive unreplaced.
    pub fn substitutions(&self) -> Vec<Substitution> {
        self.fields
            .iter()
            .map(|(token, value)| Substitution {
                find: format!("{{{{{}}}}}", token.to_uppercase()),
                replace: value.clone().unwrap_or_default(),
                case_sensitive: true,
            })
            .collect()
    }
}

/// Trait describing the file store operations the merge needs.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Copy `file_id` into `folder_id` under `new_name` and return the id of
    /// the copy.
    async fn copy_file(
        &self,
        file_id: &str,
        folder_id: &str,
        new_name: &str,
    ) -> Result<String, MergeError>;

    /// Transfer ownership of `file_id` to `email`.
    async fn set_permissions(&self, file_id: &str, email: &str) -> Result<(), MergeError>;
}

/// Trait describing the document store batch replacement.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn batch_replace_text(
        &self,
        document_id: &str,
        substitutions: &[Substitution],
    ) -> Result<(), MergeError>;
}

/// Copies the template document and merges one context into the copy.
pub struct MergeService<F: FileStore, D: DocumentStore> {
    files: F,
    documents: D,
    transfer_owner: Option<String>,
}

impl<F, D> MergeService<F, D>
where
    F: FileStore,
    D: DocumentStore,
{
    pub fn new(files: F, documents: D) -> Self {
        Self {
            files,
            documents,
            transfer_owner: None,
        }
    }

    /// Transfer ownership of every produced document to `email`.
    pub fn with_transfer_owner(mut self, email: impl Into<String>) -> Self {
        self.transfer_owner = Some(email.into());
        self
    }

    /// Copy the template into `folder_id` as `doc_name`, substitute the
    /// context into the copy, and return the copy's id.
    ///
    /// The substitutions go out as one batched request, so a row either gets
    /// a fully merged document or an error, never a half-replaced one.
    pub async fn merge(
        &self,
        template_id: &str,
        folder_id: &str,
        doc_name: &str,
        context: &MergeContext,
    ) -> Result<String, MergeError> {
        let copy_id = self
            .files
            .copy_file(template_id, folder_id, doc_name)
            .await?;

        let substitutions = context.substitutions();
        self.documents
            .batch_replace_text(&copy_id, &substitutions)
            .await?;

        if let Some(email) = &self.transfer_owner {
            self.files.set_permissions(&copy_id, email).await?;
        }

        tracing::debug!(name = %doc_name, id = %copy_id, "merged document");
        Ok(copy_id)
    }
}
