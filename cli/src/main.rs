use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use yourls_core::{
    ActionRequest, CustomRequest, DbStatsRequest, ExpandRequest, Filter, ShortUrlRequest,
    StatsRequest, UreqTransport, Url, UrlStatsRequest, YourlsClient,
};

#[derive(Parser, Debug)]
#[command(name = "yourls")]
#[command(about = "Command line client for the YOURLS API", version)]
struct Cli {
    #[command(flatten)]
    connection: Connection,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct Connection {
    /// Base URL of the YOURLS installation
    #[arg(long = "url", env = "YOURLS_URL", global = true)]
    base_url: Option<Url>,
    /// Signature token
    #[arg(long, env = "YOURLS_SIGNATURE", default_value = "", hide_env_values = true, global = true)]
    signature: String,
    #[arg(long, env = "YOURLS_USERNAME", default_value = "", global = true)]
    username: String,
    #[arg(long, env = "YOURLS_PASSWORD", default_value = "", hide_env_values = true, global = true)]
    password: String,
    /// Whole-request timeout in seconds
    #[arg(long, default_value_t = 30, global = true)]
    timeout: u64,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a short URL
    Shorten {
        url: String,
        #[arg(long)]
        keyword: Option<String>,
        #[arg(long)]
        title: Option<String>,
    },
    /// Show the long URL behind a short URL or keyword
    Expand { short_url: String },
    /// Show click statistics for one short URL
    UrlStats { short_url: String },
    /// Show link and click totals
    DbStats,
    /// Show aggregate statistics, optionally listing links
    Stats {
        #[arg(long)]
        filter: Option<Filter>,
        #[arg(long, default_value_t = 0)]
        limit: u32,
    },
    /// Call any action with raw key=value parameters
    Call {
        action: String,
        #[arg(value_parser = parse_param)]
        params: Vec<(String, String)>,
        /// Do not add format and credentials
        #[arg(long)]
        raw: bool,
    },
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{s}`"))
}

impl Connection {
    fn client(&self) -> Result<YourlsClient> {
        let base_url = self
            .base_url
            .clone()
            .ok_or_else(|| anyhow!("no YOURLS URL given (use --url or YOURLS_URL)"))?;
        Ok(YourlsClient::builder()
            .transport(UreqTransport::with_timeout(Duration::from_secs(self.timeout)))
            .base_url(base_url)
            .token(&self.signature)
            .username(&self.username)
            .password(&self.password)
            .build())
    }
}

impl Commands {
    fn into_request(self, connection: &Connection) -> ActionRequest {
        match self {
            Commands::Shorten {
                url,
                keyword,
                title,
            } => ShortUrlRequest { url, keyword, title }.into(),
            Commands::Expand { short_url } => ExpandRequest::new(short_url).into(),
            Commands::UrlStats { short_url } => UrlStatsRequest::new(short_url).into(),
            Commands::DbStats => DbStatsRequest.into(),
            Commands::Stats { filter, limit } => StatsRequest::new(filter, limit).into(),
            Commands::Call {
                action,
                params,
                raw,
            } => {
                let mut req = CustomRequest::new(action);
                if !raw {
                    for (key, value) in [
                        ("format", "json"),
                        ("signature", connection.signature.as_str()),
                        ("username", connection.username.as_str()),
                        ("password", connection.password.as_str()),
                    ] {
                        if !value.is_empty() {
                            req = req.param(key, value);
                        }
                    }
                }
                params
                    .into_iter()
                    .fold(req, |req, (key, value)| req.param(key, value))
                    .into()
            }
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = cli.connection.client()?;
    let request = cli.command.into_request(&cli.connection);
    debug!(action = request.action(), "running command");

    let (data, error, response) = client.send_action(&request).into_result()?;
    let output = json!({
        "status": response.status,
        "data": data,
        "error": error,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("yourls").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn shorten_maps_to_shorturl_request() {
        let cli = parse(&["--url", "http://kb.in", "shorten", "https://x.io", "--keyword", "x"]);
        let req = cli.command.into_request(&cli.connection);
        assert_eq!(
            req,
            ActionRequest::ShortUrl(ShortUrlRequest::new("https://x.io").keyword("x"))
        );
    }

    #[test]
    fn stats_filter_is_parsed() {
        let cli = parse(&["stats", "--filter", "last", "--limit", "3"]);
        let req = cli.command.into_request(&cli.connection);
        assert_eq!(
            req,
            ActionRequest::Stats(StatsRequest::new(Some(Filter::Last), 3))
        );
    }

    #[test]
    fn call_adds_credentials_unless_raw() {
        let cli = parse(&["--signature", "abc", "call", "version", "x=1"]);
        let ActionRequest::Custom(req) = cli.command.into_request(&cli.connection) else {
            panic!("expected custom request");
        };
        assert_eq!(req.action, "version");
        assert!(req.params().contains(&("signature".to_string(), "abc".to_string())));
        assert!(req.params().contains(&("x".to_string(), "1".to_string())));

        let cli = parse(&["--signature", "abc", "call", "version", "--raw"]);
        let ActionRequest::Custom(req) = cli.command.into_request(&cli.connection) else {
            panic!("expected custom request");
        };
        assert!(req.params().is_empty());
    }

    #[test]
    fn malformed_param_is_rejected() {
        let err = Cli::try_parse_from(["yourls", "call", "version", "novalue"]).unwrap_err();
        assert!(err.to_string().contains("key=value"));
    }

    #[test]
    fn missing_url_is_reported() {
        let cli = parse(&["db-stats"]);
        let err = cli.connection.client().unwrap_err();
        assert!(err.to_string().contains("YOURLS_URL"));
    }
}
