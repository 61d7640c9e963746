use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};

use crate::models::ScanConfig;
use crate::wordlist::{WordlistSource, merge_wordlists};

#[derive(Parser)]
#[command(name = "dirhound")]
#[command(version, about = "Recursive web path discovery engine")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Scan(ScanArgs),
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    #[arg(short, long)]
    pub url: String,

    /// Wordlist file or comma-separated words; repeat to merge several
    #[arg(short, long, required = true)]
    pub wordlist: Vec<String>,

    #[arg(short, long)]
    pub extensions: Option<String>,

    #[arg(long)]
    pub exclude_extensions: Option<String>,

    #[arg(long)]
    pub prefixes: Option<String>,

    #[arg(long)]
    pub suffixes: Option<String>,

    #[arg(long)]
    pub subdirs: Option<String>,

    #[arg(long)]
    pub uppercase: bool,

    #[arg(long)]
    pub lowercase: bool,

    #[arg(long)]
    pub capitalization: bool,

    #[arg(long)]
    pub status_codes: Option<String>,

    #[arg(long)]
    pub exclude_status: Option<String>,

    #[arg(long)]
    pub include_status: Option<String>,

    #[arg(long)]
    pub exclude_sizes: Option<String>,

    #[arg(long)]
    pub exclude_text: Vec<String>,

    #[arg(long)]
    pub exclude_regex: Option<String>,

    /// Directory holding {status}_blacklist.txt files
    #[arg(long)]
    pub blacklists: Option<PathBuf>,

    #[arg(short, long, default_value = "30")]
    pub threads: usize,

    #[arg(long, default_value = "7")]
    pub timeout: u64,

    /// Milliseconds to wait before each request
    #[arg(long, default_value = "0")]
    pub delay: u64,

    #[arg(long, default_value = "3")]
    pub retries: u32,

    /// Base backoff in milliseconds, doubled on every retry
    #[arg(long, default_value = "1000")]
    pub retry_backoff: u64,

    #[arg(short, long)]
    pub recursive: bool,

    /// Maximum recursion rounds, 0 for unlimited
    #[arg(long, default_value = "0")]
    pub depth: usize,

    #[arg(short, long)]
    pub crawl: bool,

    #[arg(long)]
    pub no_wildcard: bool,

    #[arg(long)]
    pub no_dynamic_wordlist: bool,

    /// Extra header as "Name: value"; repeatable
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Cookie as "name=value"; repeatable
    #[arg(long = "cookie")]
    pub cookies: Vec<String>,

    #[arg(long)]
    pub user_agent: Option<String>,

    /// Basic auth as "user:password"
    #[arg(long)]
    pub auth: Option<String>,

    #[arg(long)]
    pub proxy: Option<String>,

    #[arg(long)]
    pub follow_redirects: bool,

    #[arg(long)]
    pub verify_tls: bool,

    #[arg(short, long)]
    pub verbose: bool,
}

impl ScanArgs {
    pub fn to_config(&self) -> Result<ScanConfig> {
        let defaults = ScanConfig::default();

        let mut config = ScanConfig {
            extensions: split_list(self.extensions.as_deref()),
            exclude_extensions: split_list(self.exclude_extensions.as_deref()),
            prefixes: split_list(self.prefixes.as_deref()),
            suffixes: split_list(self.suffixes.as_deref()),
            subdirs: split_list(self.subdirs.as_deref()),
            uppercase: self.uppercase,
            lowercase: self.lowercase,
            capitalization: self.capitalization,
            status_codes: match &self.status_codes {
                Some(codes) => parse_numbers(codes).context("Invalid --status-codes")?,
                None => defaults.status_codes.clone(),
            },
            exclude_status_codes: match &self.exclude_status {
                Some(codes) => parse_numbers(codes).context("Invalid --exclude-status")?,
                None => defaults.exclude_status_codes.clone(),
            },
            include_status_codes: self
                .include_status
                .as_deref()
                .map(parse_numbers)
                .transpose()
                .context("Invalid --include-status")?,
            exclude_sizes: self
                .exclude_sizes
                .as_deref()
                .map(parse_numbers)
                .transpose()
                .context("Invalid --exclude-sizes")?
                .unwrap_or_default(),
            exclude_texts: self.exclude_text.clone(),
            exclude_regex: self.exclude_regex.clone(),
            threads: self.threads,
            timeout_secs: self.timeout,
            delay_ms: self.delay,
            max_retries: self.retries,
            retry_backoff_ms: self.retry_backoff,
            recursive: self.recursive,
            recursion_depth: self.depth,
            crawl: self.crawl,
            detect_wildcards: !self.no_wildcard,
            dynamic_wordlist: !self.no_dynamic_wordlist,
            headers: parse_pairs(&self.headers, ':').context("Invalid --header")?,
            cookies: parse_pairs(&self.cookies, '=').context("Invalid --cookie")?,
            user_agent: self
                .user_agent
                .clone()
                .unwrap_or_else(|| defaults.user_agent.clone()),
            auth: self.auth.as_deref().map(parse_auth).transpose()?,
            proxy: self.proxy.clone(),
            follow_redirects: self.follow_redirects,
            verify_tls: self.verify_tls,
            ..defaults
        };

        if let Some(dir) = &self.blacklists {
            config = config
                .with_blacklist_dir(dir)
                .with_context(|| format!("Failed to load blacklists from {}", dir.display()))?;
        }

        Ok(config)
    }

    pub fn load_words(&self) -> Result<Vec<String>> {
        let sources: Vec<WordlistSource> =
            self.wordlist.iter().map(|w| WordlistSource::parse(w)).collect();
        let words = merge_wordlists(&sources).context("Failed to load wordlist")?;
        if words.is_empty() {
            bail!("Wordlist is empty");
        }
        Ok(words)
    }
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn parse_numbers<T: std::str::FromStr>(value: &str) -> Result<Vec<T>> {
    split_list(Some(value))
        .iter()
        .map(|s| {
            s.parse::<T>()
                .map_err(|_| anyhow::anyhow!("'{}' is not a number", s))
        })
        .collect()
}

fn parse_pairs(values: &[String], sep: char) -> Result<HashMap<String, String>> {
    values
        .iter()
        .map(|v| match v.split_once(sep) {
            Some((k, val)) => Ok((k.trim().to_string(), val.trim().to_string())),
            None => bail!("expected '{}' in '{}'", sep, v),
        })
        .collect()
}

fn parse_auth(value: &str) -> Result<(String, String)> {
    match value.split_once(':') {
        Some((user, pass)) => Ok((user.to_string(), pass.to_string())),
        None => bail!("Invalid --auth, expected user:password"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> ScanArgs {
        let mut argv = vec!["dirhound", "scan", "-u", "http://x/", "-w", "admin,login"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Scan(args) => args,
        }
    }

    #[test]
    fn test_defaults_match_config() {
        let config = args(&[]).to_config().unwrap();
        let defaults = ScanConfig::default();
        assert_eq!(config.threads, defaults.threads);
        assert_eq!(config.timeout_secs, defaults.timeout_secs);
        assert_eq!(config.status_codes, defaults.status_codes);
        assert!(config.detect_wildcards);
        assert!(!config.recursive);
    }

    #[test]
    fn test_lists_and_pairs() {
        let config = args(&[
            "-e",
            "php, asp",
            "--exclude-status",
            "404,500",
            "-H",
            "X-Token: abc",
            "--cookie",
            "session=1",
            "--auth",
            "bob:secret",
            "-r",
            "--depth",
            "2",
        ])
        .to_config()
        .unwrap();

        assert_eq!(config.extensions, vec!["php", "asp"]);
        assert_eq!(config.exclude_status_codes, vec![404, 500]);
        assert_eq!(config.headers["X-Token"], "abc");
        assert_eq!(config.cookies["session"], "1");
        assert_eq!(config.auth, Some(("bob".into(), "secret".into())));
        assert!(config.recursive);
        assert_eq!(config.recursion_depth, 2);
    }

    #[test]
    fn test_bad_numbers_rejected() {
        assert!(args(&["--status-codes", "200,abc"]).to_config().is_err());
        assert!(args(&["-H", "no-colon"]).to_config().is_err());
    }

    #[test]
    fn test_inline_wordlist() {
        assert_eq!(args(&[]).load_words().unwrap(), vec!["admin", "login"]);
    }
}
