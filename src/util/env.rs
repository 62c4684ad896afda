//! Environment helpers: centralized dotenv loading and ergonomic getters.
//! Call `init_env()` once early in each binary (or rely on lazy Once).
use std::str::FromStr;
use std::sync::Once;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use url::Url;

static INIT: Once = Once::new();

/// Primary endpoint variable, shared with the web frontend.
pub const CONVEX_URL_PRIMARY: &str = "NEXT_PUBLIC_CONVEX_URL";
/// Alternate endpoint variable used by standalone scripts.
pub const CONVEX_URL_ALTERNATE: &str = "CONVEX_URL";
/// Deployment the importers talk to when nothing is configured.
pub const CONVEX_URL_FALLBACK: &str = "https://brainy-tiger-452.convex.cloud";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Load .env/.env.local exactly once. Safe to call many times.
pub fn init_env() {
    INIT.call_once(crate::env_boot::ensure_dotenv);
}

/// Common bootstrap for CLI binaries: initialize dotenv/env once and log which
/// endpoint variables are visible.
pub fn bootstrap_cli(bin_name: &str) {
    init_env();

    let configured = [CONVEX_URL_PRIMARY, CONVEX_URL_ALTERNATE]
        .into_iter()
        .find(|key| env_opt(key).is_some());
    match configured {
        Some(key) => info!(target = "bootstrap", bin = bin_name, var = key, "endpoint configured"),
        None => info!(
            target = "bootstrap",
            bin = bin_name,
            "no endpoint variable set; relying on CLI override or fallback"
        ),
    }
}

/// Get optional env var (None if unset or empty).
pub fn env_opt(key: &str) -> Option<String> {
    init_env();
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

/// Get parsed value with default fallback.
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Clone,
{
    init_env();
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Where the resolved endpoint came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlSource {
    Override,
    Primary,
    Alternate,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrl {
    pub url: Url,
    pub source: UrlSource,
}

/// Resolve the remote endpoint: explicit override, then `NEXT_PUBLIC_CONVEX_URL`,
/// then `CONVEX_URL`, then the fixed fallback (with a warning).
///
/// With `allow_fallback == false` a missing configuration is a fatal error.
pub fn convex_url(override_url: Option<&str>, allow_fallback: bool) -> Result<ResolvedUrl> {
    let primary = env_opt(CONVEX_URL_PRIMARY);
    let alternate = env_opt(CONVEX_URL_ALTERNATE);
    resolve_convex_url(
        override_url,
        primary.as_deref(),
        alternate.as_deref(),
        allow_fallback,
    )
}

/// Pure precedence logic behind [`convex_url`].
pub fn resolve_convex_url(
    override_url: Option<&str>,
    primary: Option<&str>,
    alternate: Option<&str>,
    allow_fallback: bool,
) -> Result<ResolvedUrl> {
    let (raw, source) = if let Some(v) = nonblank(override_url) {
        (v.to_string(), UrlSource::Override)
    } else if let Some(v) = nonblank(primary) {
        (v.to_string(), UrlSource::Primary)
    } else if let Some(v) = nonblank(alternate) {
        (v.to_string(), UrlSource::Alternate)
    } else if allow_fallback {
        warn!(
            target = "env",
            url = CONVEX_URL_FALLBACK,
            "{CONVEX_URL_PRIMARY} / {CONVEX_URL_ALTERNATE} not set; using hardcoded endpoint"
        );
        (CONVEX_URL_FALLBACK.to_string(), UrlSource::Fallback)
    } else {
        bail!(
            "remote endpoint not configured; set {CONVEX_URL_PRIMARY} (or {CONVEX_URL_ALTERNATE}) or pass --convex-url"
        );
    };

    let url = Url::parse(&raw).with_context(|| format!("invalid endpoint URL: {raw}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("endpoint URL must be http(s): {raw}");
    }
    Ok(ResolvedUrl { url, source })
}

fn nonblank(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

/// Optional admin/deploy key forwarded as `Authorization: Convex <key>`.
pub fn convex_deploy_key() -> Option<String> {
    env_opt("CONVEX_DEPLOY_KEY")
}

/// Per-request timeout for remote calls.
pub fn convex_timeout() -> Duration {
    Duration::from_secs(env_parse("CONVEX_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS).max(1))
}
