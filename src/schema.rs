//! `schema download`: fetch the backend's OpenAPI document.

#[cfg(test)]
#[path = "schema_test.rs"]
mod schema_test;

use std::path::Path;

use hashpost_client::net::api::{ApiClient, SchemaApi, openapi_path_count};

use crate::CliError;

/// Fetch `/openapi.json`, write it pretty-printed to `output`, and return the
/// number of documented paths.
pub(crate) async fn download(client: &ApiClient, output: &Path) -> Result<usize, CliError> {
    let schema = client.api::<SchemaApi>().fetch_openapi().await?;
    let count = openapi_path_count(&schema);

    let mut body = serde_json::to_string_pretty(&schema)?;
    body.push('\n');
    std::fs::write(output, body).map_err(|source| CliError::Write { path: output.to_path_buf(), source })?;

    tracing::info!(path = %output.display(), paths = count, "schema written");
    Ok(count)
}
