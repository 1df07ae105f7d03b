// This is the entry point of the mail merge tool.
//
// **Architecture Overview:**
// - `core/` = Business logic (merge rules, batch orchestration)
// - `infra/` = Implementations of core traits (Google APIs, row files)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize the credential handle and service clients (dependency injection)
// 3. Run the batch
// 4. Print the per-row report

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;

use std::sync::Arc;

use anyhow::Context;

use crate::core::batch::{BatchConfig, BatchRunner, RowOutcome};
use crate::core::datasource::{DataSourceAdapter, SourceKind};
use crate::core::merge::MergeService;
use crate::infra::google::auth::GoogleAuth;
use crate::infra::google::docs_client::DocsApiClient;
use crate::infra::google::drive_client::DriveApiClient;
use crate::infra::google::sheets_client::SheetsApiClient;
use crate::infra::text::TextFileRows;

const DEFAULT_BASE_NAME: &str = "Name_Of_Doc";
const DEFAULT_COLUMNS: &str = "NAME,ADDRESS,CITY,STATE,ZIP";

fn render_fields(fields: &[(String, Option<String>)]) -> String {
    let rendered: Vec<String> = fields
        .iter()
        .map(|(token, value)| match value {
            Some(v) => format!("{}: \"{}\"", token, v),
            None => format!("{}: -", token),
        })
        .collect();
    format!("{{{}}}", rendered.join(", "))
}

fn report(outcome: &RowOutcome) {
    println!("{}", render_fields(&outcome.fields));
    match &outcome.result {
        Ok(id) => println!(
            "Merged letter {}: docs.google.com/document/d/{}/edit",
            outcome.index, id
        ),
        Err(err) => println!(
            "Merged letter {} ({}): FAILED ({})",
            outcome.index, outcome.doc_name, err
        ),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // Run configuration. The template, spreadsheet and folder ids have no
    // sane defaults and must be provided.
    let template_doc_id = std::env::var("MERGE_TEMPLATE_DOC_ID")
        .context("MERGE_TEMPLATE_DOC_ID must be set to the Docs template id")?;
    let folder_id = std::env::var("MERGE_DRIVE_FOLDER_ID")
        .context("MERGE_DRIVE_FOLDER_ID must be set to the destination folder id")?;

    let source: SourceKind = std::env::var("MERGE_SOURCE")
        .unwrap_or_else(|_| "sheets".to_string())
        .parse()?;
    let spreadsheet_id = match source {
        SourceKind::Sheets => std::env::var("MERGE_SPREADSHEET_ID")
            .context("MERGE_SPREADSHEET_ID must be set when MERGE_SOURCE=sheets")?,
        SourceKind::Text => std::env::var("MERGE_SPREADSHEET_ID").unwrap_or_default(),
    };

    let range = std::env::var("MERGE_SHEET_RANGE").unwrap_or_else(|_| "Sheet1".to_string());
    let text_file =
        std::env::var("MERGE_TEXT_FILE").unwrap_or_else(|_| "merge_data.tsv".to_string());
    let base_name =
        std::env::var("MERGE_OUTPUT_BASENAME").unwrap_or_else(|_| DEFAULT_BASE_NAME.to_string());
    let columns: Vec<String> = std::env::var("MERGE_COLUMNS")
        .unwrap_or_else(|_| DEFAULT_COLUMNS.to_string())
        .split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    let transfer_owner = std::env::var("MERGE_TRANSFER_OWNER").ok();
    let token_cache = std::env::var("MERGE_TOKEN_CACHE").ok();

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // One credential handle is built here and shared by all three clients;
    // nothing else in the process touches auth state.

    let mut auth = GoogleAuth::from_env()
        .await
        .context("failed to load Google service account credentials")?;
    if let Some(path) = token_cache {
        auth = auth.with_token_cache(path);
    }
    let auth = Arc::new(auth);

    let sheets = SheetsApiClient::new(Arc::clone(&auth));
    let drive = DriveApiClient::new(Arc::clone(&auth));
    let docs = DocsApiClient::new(Arc::clone(&auth));

    let adapter =
        DataSourceAdapter::new(sheets, TextFileRows::new(&text_file), spreadsheet_id, range);

    let mut merger = MergeService::new(drive, docs);
    if let Some(email) = transfer_owner {
        merger = merger.with_transfer_owner(email);
    }

    let config = BatchConfig {
        template_doc_id,
        folder_id,
        base_name,
        columns,
        source,
    };
    let runner = BatchRunner::new(config, adapter, merger);

    // ========================================================================
    // RUN
    // ========================================================================

    let outcomes = runner.run().await?;
    for outcome in &outcomes {
        report(outcome);
    }

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    if failed > 0 {
        anyhow::bail!("{} of {} letters failed to merge", failed, outcomes.len());
    }

    Ok(())
}
