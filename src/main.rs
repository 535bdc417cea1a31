mod config;
mod gitlab;
mod report;

use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, error, info, info_span};
use tracing_subscriber::EnvFilter;

/// mr-approve: approve a GitLab merge request and print the validated record.
#[derive(Parser, Debug)]
#[command(name = "mr-approve", version, about)]
struct Cli {
    /// Project ID or URL path (e.g., 123 or my-group/my-project)
    project_id: String,

    /// Merge request IID within the project (e.g., 42)
    merge_request_iid: String,

    /// Config file to use instead of ./.mr-approve.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// GitLab instance or API address; overrides config and GITLAB_API_URL
    #[arg(long)]
    base_url: Option<String>,

    /// Print the merge request as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let _main_span = info_span!(
        "mr_approve",
        project = %cli.project_id,
        iid = %cli.merge_request_iid
    )
    .entered();

    info!("loading configuration");
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = config::Config::load_from(path)?;
            config.apply_env(|key| std::env::var(key).ok());
            config
        }
        None => config::Config::load()?,
    };
    if let Some(base_url) = cli.base_url {
        config.gitlab.base_url = Some(base_url);
    }
    if config.gitlab.token.is_none() {
        return Err(
            "GitLab token not found. Set GITLAB_PERSONAL_ACCESS_TOKEN or [gitlab] token in .mr-approve.toml"
                .into(),
        );
    }

    let client = gitlab::GitLabClient::new(&config.gitlab)?;
    debug!(api_root = %client.api_root(), "built GitLab client");

    let args = cli_arguments(&cli.project_id, &cli.merge_request_iid);
    info!("approving merge request");
    let merge_request = match client.approve_merge_request_with_args(&args).await {
        Ok(merge_request) => merge_request,
        Err(e) => {
            error!(status = ?e.status(), "approval failed");
            return Err(e.into());
        }
    };
    info!(id = merge_request.id, state = %merge_request.state, "approved");

    if cli.json {
        report::print_json(&merge_request)?;
    } else {
        report::print_summary(&merge_request);
    }

    Ok(())
}

/// Shape positional arguments like a tool call so they go through the same
/// validation as any other caller. Numeric text becomes a JSON number; anything
/// else stays a string and is judged by the schema.
fn cli_arguments(project_id: &str, merge_request_iid: &str) -> serde_json::Value {
    let iid = match merge_request_iid.trim().parse::<i64>() {
        Ok(n) => serde_json::Value::from(n),
        Err(_) => serde_json::Value::from(merge_request_iid),
    };
    serde_json::json!({
        "project_id": project_id,
        "merge_request_iid": iid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gitlab::ApproveMergeRequestArgs;

    #[test]
    fn test_cli_parses_positionals() {
        let cli = Cli::try_parse_from(["mr-approve", "group/app", "7", "--json"]).unwrap();
        assert_eq!(cli.project_id, "group/app");
        assert_eq!(cli.merge_request_iid, "7");
        assert!(cli.json);
        assert!(cli.base_url.is_none());
    }

    #[test]
    fn test_cli_arguments_validate() {
        let args = cli_arguments("123", "1");
        let parsed = ApproveMergeRequestArgs::from_value(&args).unwrap();
        assert_eq!(parsed.merge_request_iid.to_string(), "1");
    }

    #[test]
    fn test_cli_arguments_reject_bad_iid() {
        for iid in ["not-a-number", "0", "-4", "1.5"] {
            let args = cli_arguments("123", iid);
            assert!(
                ApproveMergeRequestArgs::from_value(&args).is_err(),
                "iid {:?} should be rejected",
                iid
            );
        }
    }
}
