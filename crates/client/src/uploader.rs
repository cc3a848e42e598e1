//! # Upload Client
//!
//! 現在のセッションの資格情報でオブジェクトストレージにペイロードを書き込み、
//! 書き込んだオブジェクトの公開URLを返す。
//!
//! ## 処理の流れ
//! 1. Session Providerからアクセストークンを取得（なければ通信せずに `Unauthenticated`）
//! 2. `(bucket, object_name)` への書き込み（Bearer認証）
//! 3. 通信失敗のみリトライポリシーに従って再試行。ストアの拒否は再試行しない
//! 4. 成功時は公開URLをローカルで計算して返す
//!
//! 全ての失敗は `tracing` でログに残した上で値として返す。

use std::future::Future;

use tokio_util::sync::CancellationToken;
use upload_types::FailureKind;

use crate::config::StorageConfig;
use crate::error::{ConfigError, StoreError, UploadError};
use crate::request::{validate_bucket, ObjectName, UploadRequest};
use crate::retry::RetryPolicy;
use crate::session::{Credential, SessionProvider};
use crate::store::{HttpObjectStore, ObjectStore};

/// アップロードクライアント。
///
/// 呼び出し間で共有する可変状態を持たないため、同時に複数のアップロードを実行できる。
pub struct Uploader {
    /// 現在のセッション資格情報の取得元
    session: Box<dyn SessionProvider>,
    /// 書き込み先ストア
    store: Box<dyn ObjectStore>,
    /// バケット未指定時のバケット
    default_bucket: String,
    /// Content-Type未指定時のMIMEタイプ
    default_content_type: String,
    /// 通信失敗時のリトライ設定
    retry: RetryPolicy,
}

impl Uploader {
    pub fn new(
        session: Box<dyn SessionProvider>,
        store: Box<dyn ObjectStore>,
        config: &StorageConfig,
    ) -> Self {
        Self {
            session,
            store,
            default_bucket: config.default_bucket.clone(),
            default_content_type: config.default_content_type.clone(),
            retry: config.retry.clone(),
        }
    }

    /// 設定からHTTP Object Storeを構築してクライアントを作る。
    pub fn from_config(
        config: &StorageConfig,
        session: Box<dyn SessionProvider>,
    ) -> Result<Self, ConfigError> {
        let store = HttpObjectStore::new(config)?;
        Ok(Self::new(session, Box::new(store), config))
    }

    pub fn default_bucket(&self) -> &str {
        &self.default_bucket
    }

    /// ペイロードをアップロードし、公開URLを返す。
    pub async fn upload(&self, request: UploadRequest) -> Result<String, UploadError> {
        self.upload_logged(&request, None).await
    }

    /// キャンセル可能なアップロード。
    ///
    /// トークンがキャンセルされるとセッション取得・書き込み・リトライ待機のいずれの
    /// 段階でも中断し、`UploadError::Cancelled` を返す。
    pub async fn upload_with_cancel(
        &self,
        request: UploadRequest,
        cancel: &CancellationToken,
    ) -> Result<String, UploadError> {
        self.upload_logged(&request, Some(cancel)).await
    }

    /// 失敗を全て `None` に畳み込む簡易インターフェース。
    ///
    /// 失敗の詳細はログにのみ残る。呼び出し側で種別を区別したい場合は `upload` を使う。
    pub async fn upload_or_none(
        &self,
        payload: Vec<u8>,
        object_name: &str,
        bucket: Option<&str>,
    ) -> Option<String> {
        let request = match UploadRequest::new(payload, object_name) {
            Ok(request) => request,
            Err(e) => {
                log_failure(&e, bucket.unwrap_or(&self.default_bucket), object_name);
                return None;
            }
        };
        let request = match bucket {
            Some(bucket) => match request.with_bucket(bucket) {
                Ok(request) => request,
                Err(e) => {
                    log_failure(&e, bucket, object_name);
                    return None;
                }
            },
            None => request,
        };
        self.upload(request).await.ok()
    }

    /// `(bucket, object_name)` の公開URLを返す。通信は行わない。
    ///
    /// バケット名はアップロード時と同じ規則で検証する。
    pub fn public_url_for(
        &self,
        bucket: Option<&str>,
        object_name: &ObjectName,
    ) -> Result<String, UploadError> {
        let bucket = bucket.unwrap_or(&self.default_bucket);
        validate_bucket(bucket)?;
        Ok(self.store.public_url_for(bucket, object_name))
    }

    async fn upload_logged(
        &self,
        request: &UploadRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<String, UploadError> {
        let bucket = request.bucket().unwrap_or(&self.default_bucket);
        let result = self.run(request, bucket, cancel).await;
        match &result {
            Ok(public_url) => tracing::info!(
                bucket,
                object_name = %request.object_name(),
                size = request.payload().len(),
                public_url = %public_url,
                "アップロード完了"
            ),
            Err(e) => log_failure(e, bucket, request.object_name().as_str()),
        }
        result
    }

    async fn run(
        &self,
        request: &UploadRequest,
        bucket: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<String, UploadError> {
        // 設定由来のデフォルトバケットもここで検証する
        validate_bucket(bucket)?;

        let credential: Credential = cancellable(cancel, self.session.current_credential())
            .await?
            .filter(|c| !c.is_empty())
            .ok_or(UploadError::Unauthenticated)?;

        let content_type = request
            .content_type()
            .unwrap_or(&self.default_content_type);

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let put = self.store.put_object(
                bucket,
                request.object_name(),
                request.payload(),
                content_type,
                &credential,
            );
            match cancellable(cancel, put).await? {
                Ok(()) => break,
                Err(StoreError::Transport(detail)) if self.retry.should_retry(attempt) => {
                    let delay = self.retry.backoff(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        detail = %detail,
                        "ストアとの通信に失敗。リトライします"
                    );
                    cancellable(cancel, tokio::time::sleep(delay)).await?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(self.store.public_url_for(bucket, request.object_name()))
    }
}

/// キャンセルトークンとfutureを競争させる。トークンなしならそのまま待つ。
async fn cancellable<F: Future>(
    cancel: Option<&CancellationToken>,
    fut: F,
) -> Result<F::Output, UploadError> {
    match cancel {
        None => Ok(fut.await),
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => Err(UploadError::Cancelled),
            out = fut => Ok(out),
        },
    }
}

fn log_failure(e: &UploadError, bucket: &str, object_name: &str) {
    let kind = e.kind();
    let detail = e.detail();
    if kind == FailureKind::Cancelled {
        tracing::info!(bucket, object_name, "アップロードがキャンセルされました");
    } else {
        tracing::error!(kind = %kind, detail = %detail, bucket, object_name, "アップロード失敗");
    }
}
