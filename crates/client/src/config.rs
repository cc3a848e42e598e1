//! # アップロードクライアント設定
//!
//! 環境変数からの設定読み込み。接続先・APIキー・デフォルトバケットは
//! プロセス起動時に一度だけ解決し、クライアントに注入する。

use std::time::Duration;

use crate::error::ConfigError;
use crate::request::validate_bucket;
use crate::retry::RetryPolicy;

/// バケット未指定時のデフォルト
pub const DEFAULT_BUCKET: &str = "avatars";

/// Content-Type未指定時のデフォルト
pub const DEFAULT_CONTENT_TYPE: &str = "image/png";

/// ストアへのリクエストタイムアウトのデフォルト（秒）
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// ストレージ接続設定。
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// ストレージAPIのベースURL（例: "https://xyz.supabase.co"）
    pub base_url: String,
    /// バケット未指定時に使用するバケット
    pub default_bucket: String,
    /// `apikey` ヘッダーに載せるプロジェクトキー（anon key等）
    pub api_key: Option<String>,
    /// Content-Type未指定時に使用するMIMEタイプ
    pub default_content_type: String,
    /// 1リクエストあたりのタイムアウト
    pub request_timeout: Duration,
    /// 同名オブジェクトを上書きするか（`x-upsert` ヘッダー）
    pub upsert: bool,
    /// 通信失敗時のリトライ設定
    pub retry: RetryPolicy,
}

impl StorageConfig {
    /// ベースURLのみ指定し、他はデフォルト値で構築する。
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            default_bucket: DEFAULT_BUCKET.to_string(),
            api_key: None,
            default_content_type: DEFAULT_CONTENT_TYPE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            upsert: true,
            retry: RetryPolicy::none(),
        }
    }

    /// 環境変数から構築する。
    ///
    /// - `STORAGE_URL`（必須）
    /// - `STORAGE_BUCKET` / `STORAGE_API_KEY` / `STORAGE_CONTENT_TYPE`
    /// - `STORAGE_TIMEOUT_SECS` / `STORAGE_UPSERT`
    /// - `STORAGE_RETRY_MAX_ATTEMPTS` / `STORAGE_RETRY_BACKOFF_MS`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意の変数ソースから構築する。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("STORAGE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("STORAGE_URL"))?;
        parse_base_url(&base_url)?;
        let mut config = Self::new(base_url.trim());

        if let Some(bucket) = lookup("STORAGE_BUCKET").filter(|v| !v.is_empty()) {
            validate_bucket(&bucket).map_err(|_| ConfigError::Invalid {
                name: "STORAGE_BUCKET",
                value: bucket.clone(),
            })?;
            config.default_bucket = bucket;
        }
        config.api_key = lookup("STORAGE_API_KEY").filter(|v| !v.is_empty());
        if let Some(content_type) = lookup("STORAGE_CONTENT_TYPE").filter(|v| !v.is_empty()) {
            config.default_content_type = content_type;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "STORAGE_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = lookup("STORAGE_UPSERT") {
            config.upsert = parse_bool("STORAGE_UPSERT", &raw)?;
        }

        let max_attempts = parse_var::<u32, _>(&lookup, "STORAGE_RETRY_MAX_ATTEMPTS")?;
        let backoff_ms = parse_var::<u64, _>(&lookup, "STORAGE_RETRY_BACKOFF_MS")?;
        match (max_attempts, backoff_ms) {
            (Some(max_attempts), backoff_ms) => {
                let initial = Duration::from_millis(backoff_ms.unwrap_or(200));
                config.retry = RetryPolicy::exponential(max_attempts, initial);
            }
            (None, Some(backoff_ms)) => tracing::warn!(
                backoff_ms,
                "STORAGE_RETRY_MAX_ATTEMPTS が未設定のため STORAGE_RETRY_BACKOFF_MS は無視されます"
            ),
            (None, None) => {}
        }

        Ok(config)
    }
}

/// `STORAGE_URL` の値をhttp(s)のベースURLとして検証する。
pub(crate) fn parse_base_url(raw: &str) -> Result<reqwest::Url, ConfigError> {
    let invalid = || ConfigError::Invalid {
        name: "STORAGE_URL",
        value: raw.to_string(),
    };
    let url = reqwest::Url::parse(raw.trim()).map_err(|_| invalid())?;
    let http = matches!(url.scheme(), "http" | "https");
    if !http || url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(invalid());
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid());
    }
    Ok(url)
}

fn parse_var<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_only_url_is_set() {
        let config =
            StorageConfig::from_lookup(lookup_from(&[("STORAGE_URL", "https://x.supabase.co")]))
                .unwrap();
        assert_eq!(config.base_url, "https://x.supabase.co");
        assert_eq!(config.default_bucket, DEFAULT_BUCKET);
        assert_eq!(config.default_content_type, DEFAULT_CONTENT_TYPE);
        assert_eq!(config.api_key, None);
        assert!(config.upsert);
        assert_eq!(config.retry, RetryPolicy::none());
    }

    #[test]
    fn test_missing_url_is_rejected() {
        let result = StorageConfig::from_lookup(lookup_from(&[("STORAGE_BUCKET", "b")]));
        assert!(matches!(result, Err(ConfigError::Missing("STORAGE_URL"))));
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = StorageConfig::from_lookup(lookup_from(&[
            ("STORAGE_URL", "http://localhost:54321"),
            ("STORAGE_BUCKET", "covers"),
            ("STORAGE_API_KEY", "anon"),
            ("STORAGE_CONTENT_TYPE", "image/webp"),
            ("STORAGE_TIMEOUT_SECS", "5"),
            ("STORAGE_UPSERT", "false"),
            ("STORAGE_RETRY_MAX_ATTEMPTS", "4"),
            ("STORAGE_RETRY_BACKOFF_MS", "50"),
        ]))
        .unwrap();
        assert_eq!(config.default_bucket, "covers");
        assert_eq!(config.api_key.as_deref(), Some("anon"));
        assert_eq!(config.default_content_type, "image/webp");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert!(!config.upsert);
        assert_eq!(config.retry.max_attempts, 4);
        assert_eq!(config.retry.initial_backoff, Duration::from_millis(50));
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let result = StorageConfig::from_lookup(lookup_from(&[
            ("STORAGE_URL", "http://localhost:54321"),
            ("STORAGE_TIMEOUT_SECS", "soon"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { name: "STORAGE_TIMEOUT_SECS", .. })
        ));
    }

    /// URLとして解釈できない STORAGE_URL が読み込み時点で拒否されることを確認
    #[test]
    fn test_unparsable_url_is_rejected() {
        for raw in [
            "not a url",
            "ftp://files.example.com",
            "mailto:ops@example.com",
            "https://x.supabase.co/?a=1",
        ] {
            let result = StorageConfig::from_lookup(lookup_from(&[
                ("STORAGE_URL", raw),
                ("STORAGE_RETRY_MAX_ATTEMPTS", "3"),
            ]));
            assert!(
                matches!(result, Err(ConfigError::Invalid { name: "STORAGE_URL", .. })),
                "{raw:?} should be rejected"
            );
        }
        assert!(parse_base_url("http://localhost:54321/").is_ok());
    }

    #[test]
    fn test_invalid_default_bucket_is_rejected() {
        for bucket in ["..", "a/b", "a#b"] {
            let result = StorageConfig::from_lookup(lookup_from(&[
                ("STORAGE_URL", "http://localhost:54321"),
                ("STORAGE_BUCKET", bucket),
            ]));
            assert!(matches!(
                result,
                Err(ConfigError::Invalid { name: "STORAGE_BUCKET", .. })
            ));
        }
    }

    /// 試行回数なしのバックオフ指定ではリトライが有効にならないことを確認
    #[test]
    fn test_backoff_without_attempts_keeps_retry_off() {
        let config = StorageConfig::from_lookup(lookup_from(&[
            ("STORAGE_URL", "http://localhost:54321"),
            ("STORAGE_RETRY_BACKOFF_MS", "50"),
        ]))
        .unwrap();
        assert_eq!(config.retry, RetryPolicy::none());
    }
}
