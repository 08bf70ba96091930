pub mod chat;
pub mod embeddings;

use anyhow::{Context, Result};

/// Send `request` and decode a JSON body, turning non-2xx replies into
/// errors that carry the response text.
pub(crate) async fn post_json<T: serde::de::DeserializeOwned>(
    request: reqwest::RequestBuilder,
    api: &str,
) -> Result<T> {
    let resp = request
        .send()
        .await
        .with_context(|| format!("Failed to call {api}"))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("{api} returned {status}: {body}");
    }

    resp.json()
        .await
        .with_context(|| format!("Failed to parse {api} response"))
}
