//! ID resolver module
//!
//! Resolves UUID prefixes to full UUIDs by listing resources from the
//! collector, so users can type short, unambiguous prefixes.

use anyhow::{Context, Result, anyhow};
use buildlog_client::CollectorClient;
use uuid::Uuid;

use crate::types::IdOrPrefix;

/// Pick the single id matching `id_or_prefix` from `candidates`
fn pick(kind: &str, id_or_prefix: &IdOrPrefix, candidates: &[Uuid]) -> Result<Uuid> {
    let matches: Vec<&Uuid> = candidates
        .iter()
        .filter(|id| id_or_prefix.matches(id))
        .collect();

    match matches.as_slice() {
        [] => Err(anyhow!(
            "No {} found with ID starting with '{}'",
            kind,
            id_or_prefix
        )),
        [only] => Ok(**only),
        _ => {
            let ids: Vec<String> = matches.iter().map(|id| id.to_string()).collect();
            Err(anyhow!(
                "Ambiguous prefix '{}' matches multiple {}s: {}",
                id_or_prefix,
                kind,
                ids.join(", ")
            ))
        }
    }
}

/// Resolve a pipeline ID or prefix to a full UUID
pub async fn resolve_pipeline_id(
    client: &CollectorClient,
    id_or_prefix: &IdOrPrefix,
) -> Result<Uuid> {
    if let Some(uuid) = id_or_prefix.as_uuid() {
        return Ok(uuid);
    }

    let pipelines = client
        .list_pipelines()
        .await
        .context("Failed to fetch pipelines for ID resolution")?;
    let ids: Vec<Uuid> = pipelines.iter().map(|p| p.id).collect();

    pick("pipeline", id_or_prefix, &ids)
}

/// Resolve a build ID or prefix to a full UUID
pub async fn resolve_build_id(client: &CollectorClient, id_or_prefix: &IdOrPrefix) -> Result<Uuid> {
    if let Some(uuid) = id_or_prefix.as_uuid() {
        return Ok(uuid);
    }

    let builds = client
        .all_builds(Some("no_logs"))
        .await
        .context("Failed to fetch builds for ID resolution")?;
    let ids: Vec<Uuid> = builds.iter().map(|b| b.id).collect();

    pick("build", id_or_prefix, &ids)
}
