//! # HTTP Object Store 実装
//!
//! Supabase Storage互換のREST APIに対する書き込みと公開URL解決。
//!
//! ## ワイヤ形式
//! ```text
//! POST {base_url}/storage/v1/object/{bucket}/{object_name}
//! Authorization: Bearer {access_token}
//! Content-Type: {content_type}
//! apikey: {api_key}          (設定時のみ)
//! x-upsert: true             (上書き有効時のみ)
//!
//! 公開URL: {base_url}/storage/v1/object/public/{bucket}/{object_name}
//! ```

use super::ObjectStore;
use crate::config::{parse_base_url, StorageConfig};
use crate::error::{ConfigError, StoreError};
use crate::request::ObjectName;
use crate::session::Credential;

/// Supabase Storage互換のHTTP APIを使うObject Store。
pub struct HttpObjectStore {
    /// HTTPクライアント（タイムアウト設定済み）
    http_client: reqwest::Client,
    /// パース済みのベースURL
    base_url: reqwest::Url,
    /// `apikey` ヘッダー値
    api_key: Option<String>,
    /// `x-upsert: true` を送るか
    upsert: bool,
}

impl HttpObjectStore {
    /// 設定からHTTPクライアントを構築する。
    pub fn new(config: &StorageConfig) -> Result<Self, ConfigError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Self::with_client(http_client, config)
    }

    /// 既存のHTTPクライアントを使って構築する。
    pub fn with_client(
        http_client: reqwest::Client,
        config: &StorageConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            http_client,
            base_url: parse_base_url(&config.base_url)?,
            api_key: config.api_key.clone(),
            upsert: config.upsert,
        })
    }

    /// ベースURLの後ろにパスセグメントを1つずつ追加してURLを組み立てる。
    ///
    /// バケット名とオブジェクト名の各セグメントはパーセントエンコードされるため、
    /// `#` や `?` を含む名前でも書き込み先と公開URLが同じオブジェクトを指す。
    fn build_url(&self, prefix: &[&str], bucket: &str, object_name: &ObjectName) -> String {
        let mut url = self.base_url.clone();
        // parse_base_url で cannot-be-a-base なURLは除外済み
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(prefix)
                .push(bucket)
                .extend(object_name.as_str().split('/'));
        }
        url.to_string()
    }

    fn object_url(&self, bucket: &str, object_name: &ObjectName) -> String {
        self.build_url(&["storage", "v1", "object"], bucket, object_name)
    }
}

#[async_trait::async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        object_name: &ObjectName,
        payload: &[u8],
        content_type: &str,
        credential: &Credential,
    ) -> Result<(), StoreError> {
        let url = self.object_url(bucket, object_name);

        let mut request = self
            .http_client
            .post(&url)
            .bearer_auth(credential.token())
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(payload.to_vec());
        if let Some(api_key) = &self.api_key {
            request = request.header("apikey", api_key);
        }
        if self.upsert {
            request = request.header("x-upsert", "true");
        }

        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Transport(format!("HTTP送信失敗 ({url}): {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Transport(format!("レスポンス読み取り失敗 ({url}): {e}")))?;
        Err(StoreError::Rejected {
            status: status.as_u16(),
            body,
        })
    }

    fn public_url_for(&self, bucket: &str, object_name: &ObjectName) -> String {
        self.build_url(&["storage", "v1", "object", "public"], bucket, object_name)
    }
}
