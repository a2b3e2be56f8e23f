//! Shared GraphQL POST plumbing used by the v2 and v3 clients.

use serde_json::{Value, json};

use goszakup_types::{BackoffConfig, GoszakupError};

use crate::http::{map_reqwest_error, retry_with_backoff};
use crate::mapping::GqlEnvelope;

/// POST a GraphQL document, retrying transient failures, and return the
/// parsed `data` payload. GraphQL-level `errors` (malformed query, bad
/// filter) are reported as [`GoszakupError::Protocol`] and never retried.
pub async fn post_graphql(
    http: &reqwest::Client,
    url: &str,
    token: &str,
    label: &'static str,
    query_doc: &str,
    variables: Value,
    backoff: &BackoffConfig,
) -> Result<GqlEnvelope, GoszakupError> {
    let body = json!({ "query": query_doc, "variables": variables });
    let envelope = retry_with_backoff(backoff, || async {
        let resp = http
            .post(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_reqwest_error(&e, label))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(map_reqwest_error(
                &resp.error_for_status().unwrap_err(),
                label,
            ));
        }

        resp.json::<GqlEnvelope>()
            .await
            .map_err(|e| GoszakupError::protocol(format!("{label}: {e}")))
    })
    .await?;

    if let Some(errors) = &envelope.errors
        && !errors.is_empty()
    {
        let joined = errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(GoszakupError::protocol(format!("{label}: {joined}")));
    }

    Ok(envelope)
}
