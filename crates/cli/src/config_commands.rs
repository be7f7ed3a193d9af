use {anyhow::Result, clap::Subcommand};

use relaybot_config::{Error, RelaybotConfig};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Load configuration from the environment and report problems.
    Check,
    /// Print the effective configuration with secrets redacted.
    Show,
}

pub fn handle_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Check => check(),
        ConfigAction::Show => {
            let config = relaybot_config::load_from_env()?;
            println!("{}", render(&config));
            Ok(())
        },
    }
}

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn check() -> Result<()> {
    let config = match relaybot_config::load_from_env() {
        Ok(config) => config,
        Err(Error::Missing { keys }) => {
            for key in &keys {
                eprintln!("  {RED}{BOLD}error{RESET}: {key} is not set");
            }
            anyhow::bail!("{} required variable(s) missing", keys.len());
        },
        Err(e) => {
            eprintln!("  {RED}{BOLD}error{RESET}: {e}");
            anyhow::bail!("configuration is invalid");
        },
    };

    for warning in warnings(&config) {
        eprintln!("  {YELLOW}{BOLD}warning{RESET}: {warning}");
    }
    eprintln!("{GREEN}configuration OK{RESET}");
    Ok(())
}

/// Optional settings that change runtime behavior when left unset.
fn warnings(config: &RelaybotConfig) -> Vec<&'static str> {
    let mut out = Vec::new();
    if config.slack.signing_secret.is_none() {
        out.push("SLACK_SIGNING_SECRET is not set; Slack requests will not be verified");
    }
    if !config.diagnostic_endpoint_enabled() {
        out.push("RELAYBOT_API_KEY is not set; /gemini will reject every request");
    }
    out
}

fn render(config: &RelaybotConfig) -> String {
    format!(
        "bind         = {}:{}\n\
         http_timeout = {}s\n\
         {:#?}\n\
         {:#?}",
        config.server.bind,
        config.server.port,
        config.http_timeout.as_secs(),
        config.slack,
        config.gemini,
    )
}
