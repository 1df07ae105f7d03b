use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::core::datasource::{Row, SourceError, TextRows};

/// Tab-separated row file backing the `text` data source. The first line is
/// a header, same as a sheet; dropping it is the adapter's job.
pub struct TextFileRows {
    path: PathBuf,
}

impl TextFileRows {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl TextRows for TextFileRows {
    async fn read_rows(&self) -> Result<Vec<Row>, SourceError> {
        let text = fs::read_to_string(&self.path)
            .await
            .map_err(|e| SourceError::File(format!("{}: {}", self.path.display(), e)))?;

        let rows = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.split('\t').map(|cell| cell.to_string()).collect())
            .collect();

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_tab_separated_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.tsv");
        tokio::fs::write(&path, "NAME\tCITY\nJane Doe\tSpringfield\n\n")
            .await
            .unwrap();

        let rows = TextFileRows::new(&path).read_rows().await.unwrap();
        assert_eq!(
            rows,
            vec![vec!["NAME", "CITY"], vec!["Jane Doe", "Springfield"]]
        );
    }

    #[tokio::test]
    async fn missing_file_is_reported_with_its_path() {
        let err = TextFileRows::new("does_not_exist.tsv")
            .read_rows()
            .await
            .unwrap_err();

        assert!(matches!(err, SourceError::File(_)));
        assert!(err.to_string().contains("does_not_exist.tsv"));
    }
}
