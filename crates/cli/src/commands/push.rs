use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use herald_core::{Credential, Notification, PushOutcome, PushResult};
use herald_executor::execute_batch;
use herald_provider::{PushContext, PushServiceRegistry};
use serde::Serialize;
use tracing::{info, warn};

use crate::OutputFormat;
use crate::config::HeraldConfig;

#[derive(Args, Debug)]
pub struct PushArgs {
    /// Path to the TOML configuration file.
    #[arg(long, short, env = "HERALD_CONFIG")]
    pub config: PathBuf,
    /// Notification data (key=value). `msggroup` and `ttl` are control keys.
    #[arg(long = "data", short = 'd', value_parser = parse_key_val)]
    pub data: Vec<(String, String)>,
    /// JSON file holding the provider's cached access token. Read before the
    /// push and rewritten when the token is refreshed.
    #[arg(long, env = "HERALD_STATE")]
    pub state: Option<PathBuf>,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{s}`"))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

/// One result, flattened for printing.
#[derive(Debug, Serialize)]
struct ResultRow<'a> {
    provider: &'a str,
    destination: Option<String>,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> From<&'a PushResult> for ResultRow<'a> {
    fn from(result: &'a PushResult) -> Self {
        let status = match &result.outcome {
            PushOutcome::Delivered { .. } => "delivered",
            PushOutcome::ProviderUpdated(_) => "token-refreshed",
            PushOutcome::Failed(_) => "failed",
        };
        Self {
            provider: &result.provider,
            destination: result.destination.as_ref().map(ToString::to_string),
            status,
            message_id: result.message_id(),
            error: result.error().map(ToString::to_string),
        }
    }
}

fn load_state(path: &Path) -> anyhow::Result<Option<Credential>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read state at {}", path.display()))?;
    let credential = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse state at {}", path.display()))?;
    Ok(Some(credential))
}

fn save_state(path: &Path, credential: &Credential) -> anyhow::Result<()> {
    let contents = serde_json::to_string_pretty(credential)?;
    std::fs::write(path, contents)
        .with_context(|| format!("failed to write state at {}", path.display()))
}

pub async fn run(
    registry: &PushServiceRegistry,
    config: &HeraldConfig,
    args: &PushArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let service = registry.resolve(&config.provider)?;
    let mut provider = service.build_provider(&config.provider)?;
    if let Some(path) = &args.state
        && let Some(credential) = load_state(path)?
    {
        provider = provider.with_credential(credential);
    }

    let destinations = config
        .destinations
        .iter()
        .map(|kv| service.build_destination(kv))
        .collect::<Result<Vec<_>, _>>()?;
    let notification: Notification = args.data.iter().cloned().collect();

    let ctx = PushContext::new();
    let on_interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling push");
            on_interrupt.cancel();
        }
    });

    info!(
        provider = %provider.name(),
        destinations = destinations.len(),
        "starting push"
    );
    let results = execute_batch(service.as_ref(), &provider, destinations, &notification, &ctx).await;

    for result in &results {
        if let (PushOutcome::ProviderUpdated(credential), Some(path)) =
            (&result.outcome, &args.state)
        {
            save_state(path, credential)?;
            info!(path = %path.display(), "saved refreshed credential");
        }
    }

    let rows: Vec<ResultRow<'_>> = results.iter().map(ResultRow::from).collect();
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Text => {
            for row in &rows {
                let target = row.destination.as_deref().unwrap_or("(provider)");
                let detail = row
                    .message_id
                    .map(ToOwned::to_owned)
                    .or_else(|| row.error.clone())
                    .unwrap_or_default();
                println!("[{:<15}] {target} {detail}", row.status);
            }
        }
    }

    let failed = rows.iter().filter(|r| r.status == "failed").count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} results failed", rows.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use herald_core::{DeliveryPoint, PushError};

    use super::*;

    #[test]
    fn parse_key_val_splits_on_first_equals() {
        assert_eq!(
            parse_key_val("title=a=b").unwrap(),
            ("title".to_owned(), "a=b".to_owned())
        );
        assert!(parse_key_val("title").is_err());
    }

    #[test]
    fn missing_state_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_state(&dir.path().join("state.json")).unwrap().is_none());
    }

    #[test]
    fn state_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let credential = Credential {
            token: Some("tok".into()),
            token_type: Some("bearer".into()),
            expires_at: None,
        };
        save_state(&path, &credential).unwrap();
        assert_eq!(load_state(&path).unwrap(), Some(credential));
    }

    #[test]
    fn corrupt_state_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(load_state(&path).is_err());
    }

    #[test]
    fn rows_from_results() {
        let dp = DeliveryPoint::new(
            "adm",
            BTreeMap::from([
                ("service".to_owned(), "app".to_owned()),
                ("subscriber".to_owned(), "bob".to_owned()),
            ]),
        );
        let delivered = PushResult::for_destination("adm:app:id", dp.clone(), Ok("req-1".into()));
        let row = ResultRow::from(&delivered);
        assert_eq!(row.status, "delivered");
        assert_eq!(row.destination.as_deref(), Some("adm:app:bob"));
        assert_eq!(row.message_id, Some("req-1"));

        let failed = PushResult::for_destination("adm:app:id", dp, Err(PushError::NoToken));
        let row = ResultRow::from(&failed);
        assert_eq!(row.status, "failed");
        assert_eq!(row.error.as_deref(), Some("no bearer token available"));

        let updated = PushResult::provider_level(
            "adm:app:id",
            PushOutcome::ProviderUpdated(Credential::default()),
        );
        let json = serde_json::to_value(ResultRow::from(&updated)).unwrap();
        assert_eq!(json["status"], "token-refreshed");
        assert!(json["destination"].is_null());
        assert!(json.get("error").is_none());
    }
}
