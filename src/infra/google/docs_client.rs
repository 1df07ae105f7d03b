use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::core::merge::{DocumentStore, MergeError, Substitution};
use crate::infra::google::auth::GoogleAuth;

/// Minimal Docs REST client. Only the batched text replacement is needed.
pub struct DocsApiClient {
    client: Client,
    auth: Arc<GoogleAuth>,
    base_url: String,
}

impl DocsApiClient {
    pub fn new(auth: Arc<GoogleAuth>) -> Self {
        Self {
            client: Client::new(),
            auth,
            base_url: "https://docs.googleapis.com".to_string(),
        }
    }

    fn build_requests(substitutions: &[Substitution]) -> Vec<DocsRequest> {
        substitutions
            .iter()
            .map(|sub| DocsRequest {
                replace_all_text: ReplaceAllText {
                    contains_text: ContainsText {
                        text: sub.find.clone(),
                        match_case: sub.case_sensitive,
                    },
                    replace_text: sub.replace.clone(),
                },
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
struct BatchUpdateRequest {
    requests: Vec<DocsRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DocsRequest {
    replace_all_text: ReplaceAllText,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplaceAllText {
    contains_text: ContainsText,
    replace_text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContainsText {
    text: String,
    match_case: bool,
}

#[async_trait]
impl DocumentStore for DocsApiClient {
    async fn batch_replace_text(
        &self,
        document_id: &str,
        substitutions: &[Substitution],
    ) -> Result<(), MergeError> {
        let token = self
            .auth
            .access_token()
            .await
            .map_err(|e| MergeError::Replace(e.to_string()))?;

        let url = format!("{}/v1/documents/{}:batchUpdate", self.base_url, document_id);
        let body = BatchUpdateRequest {
            requests: Self::build_requests(substitutions),
        };

        tracing::debug!(
            document_id,
            replacements = substitutions.len(),
            "sending batch update"
        );

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .json(&body)
            .send()
            .await
            .map_err(|e| MergeError::Replace(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp
                .text()
                .await
                .map_err(|e| MergeError::Replace(e.to_string()))?;
            return Err(MergeError::Replace(format!(
                "Docs returned {} updating {}: {}",
                status, document_id, text
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_replace_all_text_requests() {
        let substitutions = vec![Substitution {
            find: "{{NAME}}".to_string(),
            replace: "Jane Doe".to_string(),
            case_sensitive: true,
        }];

        let body = BatchUpdateRequest {
            requests: DocsApiClient::build_requests(&substitutions),
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "requests": [{
                    "replaceAllText": {
                        "containsText": {
                            "text": "{{NAME}}",
                            "matchCase": true
                        },
                        "replaceText": "Jane Doe"
                    }
                }]
            })
        );
    }

    #[test]
    fn empty_context_builds_an_empty_batch() {
        assert!(DocsApiClient::build_requests(&[]).is_empty());
    }
}
