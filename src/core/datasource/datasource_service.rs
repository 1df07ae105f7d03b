use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can be raised while fetching merge rows.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("unsupported data source '{0}'; choose from: sheets, text")]
    InvalidSource(String),
    #[error("data source request failed: {0}")]
    Remote(String),
    #[error("failed to read row file: {0}")]
    File(String),
}

/// One record from the data source, positionally aligned with the configured
/// column tokens.
pub type Row = Vec<String>;

/// Tag selecting which data source backs a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Sheets,
    Text,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Sheets => write!(f, "sheets"),
            SourceKind::Text => write!(f, "text"),
        }
    }
}

impl FromStr for SourceKind {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sheets" => Ok(SourceKind::Sheets),
            "text" => Ok(SourceKind::Text),
            other => Err(SourceError::InvalidSource(other.to_string())),
        }
    }
}

/// Trait describing the single spreadsheet read the adapter needs.
#[async_trait]
pub trait SpreadsheetRows: Send + Sync {
    async fn read_rows(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Row>, SourceError>;
}

/// Trait describing a plain-text row source (one row per line).
#[async_trait]
pub trait TextRows: Send + Sync {
    async fn read_rows(&self) -> Result<Vec<Row>, SourceError>;
}

/// Fetches the merge table from whichever source the run selects.
///
/// Both handlers treat the first row as a header and drop it, so the rows
/// handed to the batch driver are data rows only. Dispatch is a match over
/// the enumerated tag; an out-of-set tag never reaches this point because
/// `SourceKind` parsing already rejected it.
pub struct DataSourceAdapter<S: SpreadsheetRows, T: TextRows> {
    sheets: S,
    text: T,
    spreadsheet_id: String,
    range: String,
}

impl<S, T> DataSourceAdapter<S, T>
where
    S: SpreadsheetRows,
    T: TextRows,
{
    pub fn new(
        sheets: S,
        text: T,
        spreadsheet_id: impl Into<String>,
        range: impl Into<String>,
    ) -> Self {
        Self {
            sheets,
            text,
            spreadsheet_id: spreadsheet_id.into(),
            range: range.into(),
        }
    }

    /// Fetch all data rows for the run.
    pub async fn fetch(&self, kind: SourceKind) -> Result<Vec<Row>, SourceError> {
        let rows = match kind {
            SourceKind::Sheets => {
                self.sheets
                    .read_rows(&self.spreadsheet_id, &self.range)
                    .await?
            }
            SourceKind::Text => self.text.read_rows().await?,
        };

        tracing::debug!(source = %kind, rows = rows.len(), "fetched raw rows");

        // First row is the header.
        Ok(rows.into_iter().skip(1).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSheet(Vec<Row>);

    #[async_trait]
    impl SpreadsheetRows for FixedSheet {
        async fn read_rows(&self, _: &str, _: &str) -> Result<Vec<Row>, SourceError> {
            Ok(self.0.clone())
        }
    }

    struct FailingSheet;

    #[async_trait]
    impl SpreadsheetRows for FailingSheet {
        async fn read_rows(&self, _: &str, _: &str) -> Result<Vec<Row>, SourceError> {
            Err(SourceError::Remote("Sheets returned 403".to_string()))
        }
    }

    struct FixedText(Vec<Row>);

    #[async_trait]
    impl TextRows for FixedText {
        async fn read_rows(&self) -> Result<Vec<Row>, SourceError> {
            Ok(self.0.clone())
        }
    }

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn parses_known_source_tags() {
        assert_eq!("sheets".parse::<SourceKind>().unwrap(), SourceKind::Sheets);
        assert_eq!("text".parse::<SourceKind>().unwrap(), SourceKind::Text);
        assert_eq!(" Sheets ".parse::<SourceKind>().unwrap(), SourceKind::Sheets);
    }

    #[test]
    fn unknown_source_tag_is_rejected_before_any_fetch() {
        let err = "csv".parse::<SourceKind>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("csv"));
        assert!(message.contains("sheets"));
        assert!(message.contains("text"));
    }

    #[tokio::test]
    async fn sheet_fetch_drops_the_header_row() {
        let adapter = DataSourceAdapter::new(
            FixedSheet(vec![
                row(&["NAME", "ADDRESS", "CITY", "STATE", "ZIP"]),
                row(&["Jane Doe", "1 Main St", "Springfield", "IL", "62701"]),
            ]),
            FixedText(Vec::new()),
            "sheet-id",
            "Sheet1",
        );

        let rows = adapter.fetch(SourceKind::Sheets).await.unwrap();
        assert_eq!(
            rows,
            vec![row(&["Jane Doe", "1 Main St", "Springfield", "IL", "62701"])]
        );
    }

    #[tokio::test]
    async fn text_fetch_drops_the_header_row() {
        let adapter = DataSourceAdapter::new(
            FixedSheet(Vec::new()),
            FixedText(vec![row(&["NAME"]), row(&["Jane Doe"])]),
            "sheet-id",
            "Sheet1",
        );

        let rows = adapter.fetch(SourceKind::Text).await.unwrap();
        assert_eq!(rows, vec![row(&["Jane Doe"])]);
    }

    #[tokio::test]
    async fn header_only_table_yields_no_rows() {
        let adapter = DataSourceAdapter::new(
            FixedSheet(vec![row(&["NAME"])]),
            FixedText(Vec::new()),
            "sheet-id",
            "Sheet1",
        );

        assert!(adapter.fetch(SourceKind::Sheets).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remote_failure_propagates_as_source_error() {
        let adapter =
            DataSourceAdapter::new(FailingSheet, FixedText(Vec::new()), "sheet-id", "Sheet1");

        let err = adapter.fetch(SourceKind::Sheets).await.unwrap_err();
        assert!(matches!(err, SourceError::Remote(_)));
    }
}
