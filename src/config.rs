use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Config {
    pub gmail: GmailConfig,
    /// Where `<identifier>/<category>` folders are created. Always absolute.
    pub attachments_root: PathBuf,
    /// Label whose messages are scanned (matched case-insensitively).
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct GmailConfig {
    pub credentials_path: String,
    pub token_cache_path: String,
    pub user_id: String,
}

const REQUIRED_VARS: [&str; 1] = ["GMAIL_CREDENTIALS_PATH"];

impl Config {
    /// Configuration loaded from the process environment (and `.env`, once loaded by `main`).
    pub fn new() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::check_required_vars(&lookup)?;

        let credentials_path = lookup("GMAIL_CREDENTIALS_PATH")
            .context("GMAIL_CREDENTIALS_PATH must be set")?;

        let attachments_root = lookup("ATTACHMENTS_ROOT")
            .unwrap_or_else(|| "./attachments".to_string());

        Ok(Config {
            gmail: GmailConfig {
                credentials_path,
                token_cache_path: lookup("GMAIL_TOKEN_CACHE_PATH")
                    .unwrap_or_else(|| "./gmail-token-cache.json".to_string()),
                user_id: lookup("GMAIL_USER_ID")
                    .unwrap_or_else(|| "me".to_string()),
            },
            attachments_root: absolute_root(&attachments_root)?,
            label: lookup("MAIL_LABEL")
                .unwrap_or_else(|| "INBOX".to_string()),
        })
    }

    /// Replaces the attachments root, e.g. from a command-line flag.
    pub fn set_attachments_root(&mut self, root: &str) -> Result<()> {
        self.attachments_root = absolute_root(root)?;
        Ok(())
    }

    fn check_required_vars<F>(lookup: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let missing_vars: Vec<&str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|var| lookup(var).map_or(true, |v| v.trim().is_empty()))
            .collect();

        if !missing_vars.is_empty() {
            anyhow::bail!(
                "Missing environment variables: {}\n\
                 \n\
                 💡 Solutions:\n\
                 1. Create a .env file with your settings:\n\
                    GMAIL_CREDENTIALS_PATH=/path/to/client_secret.json\n\
                    ATTACHMENTS_ROOT=/path/to/biopsies\n\
                 \n\
                 2. Or export them manually:\n\
                    export GMAIL_CREDENTIALS_PATH=/path/to/client_secret.json\n\
                    export GMAIL_TOKEN_CACHE_PATH=./gmail-token-cache.json\n\
                    cargo run -- --dry-run",
                missing_vars.join(", ")
            );
        }

        Ok(())
    }
}

fn absolute_root(root: &str) -> Result<PathBuf> {
    std::path::absolute(Path::new(root))
        .with_context(|| format!("Unable to resolve attachments root '{}'", root))
}
