use chrono::Local;
use thiserror::Error;

use crate::core::datasource::{
    DataSourceAdapter, Row, SourceError, SourceKind, SpreadsheetRows, TextRows,
};
use crate::core::merge::{DocumentStore, FileStore, MergeContext, MergeError, MergeService};

/// Errors that abort the whole batch. Remote trouble while producing a
/// single document is not one of these; it lands in that row's outcome.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("row {row}: missing '{field}' value needed for the output document name")]
    MissingField { row: usize, field: String },
    #[error("no merge columns configured")]
    NoColumns,
}

/// Static configuration for one merge run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub template_doc_id: String,
    pub folder_id: String,
    pub base_name: String,
    pub columns: Vec<String>,
    pub source: SourceKind,
}

/// Result of one row: the derived document name, the mapped fields and the
/// produced document id (or the failure that row hit).
#[derive(Debug)]
pub struct RowOutcome {
    pub index: usize,
    pub doc_name: String,
    pub fields: Vec<(String, Option<String>)>,
    pub result: Result<String, MergeError>,
}

/// Drives the whole run: fetch rows once, then produce one document per row
/// in source order. Strictly sequential; row N completes or fails before
/// row N+1 starts.
pub struct BatchRunner<S, T, F, D>
where
    S: SpreadsheetRows,
    T: TextRows,
    F: FileStore,
    D: DocumentStore,
{
    config: BatchConfig,
    source: DataSourceAdapter<S, T>,
    merger: MergeService<F, D>,
}

impl<S, T, F, D> BatchRunner<S, T, F, D>
where
    S: SpreadsheetRows,
    T: TextRows,
    F: FileStore,
    D: DocumentStore,
{
    pub fn new(
        config: BatchConfig,
        source: DataSourceAdapter<S, T>,
        merger: MergeService<F, D>,
    ) -> Self {
        Self {
            config,
            source,
            merger,
        }
    }

    /// Map one row's cells onto the configured column tokens. Short rows are
    /// padded with nulls so the mapping always has one entry per column, in
    /// configured order; extra cells are ignored.
    fn map_row_fields(&self, row: &Row) -> Vec<(String, Option<String>)> {
        self.config
            .columns
            .iter()
            .enumerate()
            .map(|(i, token)| (token.clone(), row.get(i).cloned()))
            .collect()
    }

    /// Derive the output document name from the first mapped field, spaces
    /// replaced with underscores. A row without that field cannot be named,
    /// which is a structural problem with the source table.
    fn derive_doc_name(
        &self,
        index: usize,
        fields: &[(String, Option<String>)],
    ) -> Result<String, BatchError> {
        let (token, value) = &fields[0];
        match value {
            Some(v) if !v.trim().is_empty() => {
                Ok(format!("{}_{}", self.config.base_name, v.replace(' ', "_")))
            }
            _ => Err(BatchError::MissingField {
                row: index,
                field: token.clone(),
            }),
        }
    }

    pub async fn run(&self) -> Result<Vec<RowOutcome>, BatchError> {
        if self.config.columns.is_empty() {
            return Err(BatchError::NoColumns);
        }

        // Static fields live for the whole run; per-row fields overwrite
        // them between documents.
        let mut context = MergeContext::new();
        for token in &self.config.columns {
            context.set(token.clone(), None);
        }
        context.set("date", Some(Local::now().format("%Y %B %d").to_string()));

        let rows = self.source.fetch(self.config.source).await?;
        tracing::info!(rows = rows.len(), source = %self.config.source, "starting merge run");

        let mut outcomes = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let index = i + 1;
            let fields = self.map_row_fields(row);
            let doc_name = self.derive_doc_name(index, &fields)?;

            context.apply_fields(&fields);

            let result = self
                .merger
                .merge(
                    &self.config.template_doc_id,
                    &self.config.folder_id,
                    &doc_name,
                    &context,
                )
                .await;

            match &result {
                Ok(id) => tracing::info!(row = index, name = %doc_name, id = %id, "merged row"),
                Err(err) => {
                    tracing::error!(row = index, name = %doc_name, error = %err, "row merge failed")
                }
            }

            outcomes.push(RowOutcome {
                index,
                doc_name,
                fields,
                result,
            });
        }

        Ok(outcomes)
    }
}
