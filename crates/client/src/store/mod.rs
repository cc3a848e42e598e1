//! # Remote Object Store
//!
//! オブジェクトストレージへの書き込みと公開URL解決の抽象インターフェース。
//! HTTP実装は `http` サブモジュールを参照。

pub mod http;

pub use http::HttpObjectStore;

use crate::error::StoreError;
use crate::request::ObjectName;
use crate::session::Credential;

/// Remote Object Storeの抽象インターフェース。
///
/// Supabase Storage互換のHTTP APIや、テスト用のインメモリ実装を差し替えられる。
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// `(bucket, object_name)` にペイロードを書き込む。
    ///
    /// 1回の呼び出しにつき書き込みリクエストは1回だけ送る。
    async fn put_object(
        &self,
        bucket: &str,
        object_name: &ObjectName,
        payload: &[u8],
        content_type: &str,
        credential: &Credential,
    ) -> Result<(), StoreError>;

    /// `(bucket, object_name)` の公開URLを返す。
    ///
    /// ネットワーク通信を伴わない決定的な計算。
    fn public_url_for(&self, bucket: &str, object_name: &ObjectName) -> String;
}
