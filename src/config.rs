use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::data_models::RankKey;
use crate::error::{Error, Result};
use crate::youtube::{DEFAULT_BASE_URL, MAX_IDS_PER_CALL, MAX_SEARCH_PAGE_SIZE};

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub api_base_url: String,
    pub search_page_size: u32,
    pub stats_batch_size: usize,
    pub stats_concurrency: usize,
    pub request_timeout: Duration,
    /// `None` keeps cache entries for the process lifetime.
    pub cache_ttl: Option<Duration>,
    pub rank_key: RankKey,
    pub bind_addr: String,
}

impl Config {
    /// Reads the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Config> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("YOUTUBE_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                Error::Config("missing required environment variable: YOUTUBE_API_KEY".into())
            })?;

        let search_page_size: u32 =
            get_parsed_or_default(&lookup, "TUBESTATS_SEARCH_PAGE_SIZE", MAX_SEARCH_PAGE_SIZE)?;
        check_range(
            "TUBESTATS_SEARCH_PAGE_SIZE",
            search_page_size as usize,
            1,
            MAX_SEARCH_PAGE_SIZE as usize,
        )?;

        let stats_batch_size: usize =
            get_parsed_or_default(&lookup, "TUBESTATS_STATS_BATCH_SIZE", MAX_IDS_PER_CALL)?;
        check_range("TUBESTATS_STATS_BATCH_SIZE", stats_batch_size, 1, MAX_IDS_PER_CALL)?;

        let stats_concurrency: usize =
            get_parsed_or_default(&lookup, "TUBESTATS_STATS_CONCURRENCY", 1)?;
        check_range("TUBESTATS_STATS_CONCURRENCY", stats_concurrency, 1, usize::MAX)?;

        let timeout_secs: u64 =
            get_parsed_or_default(&lookup, "TUBESTATS_REQUEST_TIMEOUT_SECS", 10)?;
        check_range("TUBESTATS_REQUEST_TIMEOUT_SECS", timeout_secs as usize, 1, usize::MAX)?;

        let cache_ttl = match lookup("TUBESTATS_CACHE_TTL_SECS") {
            Some(raw) if !raw.trim().is_empty() => Some(Duration::from_secs(parse_value(
                "TUBESTATS_CACHE_TTL_SECS",
                &raw,
            )?)),
            _ => None,
        };

        Ok(Config {
            api_key,
            api_base_url: lookup("YOUTUBE_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            search_page_size,
            stats_batch_size,
            stats_concurrency,
            request_timeout: Duration::from_secs(timeout_secs),
            cache_ttl,
            rank_key: get_parsed_or_default(&lookup, "TUBESTATS_RANK_KEY", RankKey::Views)?,
            bind_addr: lookup("TUBESTATS_BIND_ADDR")
                .unwrap_or_else(|| "127.0.0.1:3000".to_string()),
        })
    }
}

fn get_parsed_or_default<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => parse_value(key, &raw),
        _ => Ok(default),
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("invalid value for {key}: {raw:?}")))
}

fn check_range(key: &str, value: usize, min: usize, max: usize) -> Result<()> {
    if value < min || value > max {
        return Err(Error::Config(format!(
            "{key} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(())
}
