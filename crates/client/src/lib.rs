//! # Asset Upload Client
//!
//! 認証済みユーザーのセッションでバイナリアセット（生成画像等）を
//! オブジェクトストレージにアップロードし、公開URLを解決するクライアント。
//!
//! ## 構成
//! - `uploader`: アップロード処理本体（`Uploader`）
//! - `session`: 現在のセッション資格情報の取得（`SessionProvider`）
//! - `store`: Remote Object Storeの抽象化とHTTP実装（`ObjectStore`）
//! - `config`: 環境変数からの設定読み込み
//! - `retry`: 通信失敗時のリトライポリシー
//! - `error`: エラー型

pub mod config;
pub mod error;
pub mod request;
pub mod retry;
pub mod session;
pub mod store;
pub mod uploader;

#[cfg(test)]
mod test_helpers;

pub use config::StorageConfig;
pub use error::{ConfigError, StoreError, UploadError};
pub use request::{ObjectName, UploadRequest};
pub use retry::RetryPolicy;
pub use session::{Credential, NoSession, SessionProvider, StaticSession};
pub use store::{HttpObjectStore, ObjectStore};
pub use uploader::Uploader;

pub use tokio_util::sync::CancellationToken;
pub use upload_types::{FailureKind, UploadReport};
