//! # アップロードクライアント エラー型
//!
//! クライアント境界で返す全ての失敗は `UploadError` に集約され、値として呼び出し側に渡る。

use upload_types::{FailureKind, UploadReport};

/// アップロードエラー型。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    /// セッション資格情報なし（ネットワーク通信は未実施）
    #[error("セッションがありません。ユーザーがサインインしていない可能性があります")]
    Unauthenticated,
    /// ストアが非2xxステータスを返した
    #[error("ストアがアップロードを拒否しました: HTTP {status} - {detail}")]
    RemoteRejected {
        /// HTTPステータスコード
        status: u16,
        /// レスポンス本文
        detail: String,
    },
    /// 通信失敗（接続拒否、タイムアウト、DNS解決失敗等）
    #[error("ストアとの通信に失敗: {0}")]
    Transport(String),
    /// キャンセルトークンによる中断
    #[error("アップロードがキャンセルされました")]
    Cancelled,
    /// 不正なリクエスト（空ペイロード、不正なオブジェクト名）
    #[error("不正なリクエスト: {0}")]
    InvalidRequest(String),
}

impl UploadError {
    /// 失敗種別を返す。
    pub fn kind(&self) -> FailureKind {
        match self {
            UploadError::Unauthenticated => FailureKind::Unauthenticated,
            UploadError::RemoteRejected { .. } => FailureKind::RemoteRejected,
            UploadError::Transport(_) => FailureKind::TransportError,
            UploadError::Cancelled => FailureKind::Cancelled,
            UploadError::InvalidRequest(_) => FailureKind::InvalidRequest,
        }
    }

    /// 診断用の詳細文字列を返す。
    ///
    /// `RemoteRejected` の場合はストアのレスポンス本文そのもの。
    pub fn detail(&self) -> String {
        match self {
            UploadError::RemoteRejected { detail, .. } => detail.clone(),
            UploadError::Transport(msg) | UploadError::InvalidRequest(msg) => msg.clone(),
            UploadError::Unauthenticated | UploadError::Cancelled => self.to_string(),
        }
    }

    pub fn to_report(&self) -> UploadReport {
        UploadReport::Failure {
            kind: self.kind(),
            detail: self.detail(),
        }
    }
}

/// Remote Object Storeへの書き込みエラー。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// 非2xxステータス
    #[error("HTTP {status} - {body}")]
    Rejected {
        /// HTTPステータスコード
        status: u16,
        /// レスポンス本文
        body: String,
    },
    /// 送信・受信の失敗
    #[error("{0}")]
    Transport(String),
}

impl From<StoreError> for UploadError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Rejected { status, body } => UploadError::RemoteRejected {
                status,
                detail: body,
            },
            StoreError::Transport(msg) => UploadError::Transport(msg),
        }
    }
}

/// 設定読み込みエラー。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 必須の環境変数が未設定
    #[error("環境変数 {0} が未設定です")]
    Missing(&'static str),
    /// 値のパースに失敗
    #[error("環境変数 {name} の値が不正です: {value}")]
    Invalid {
        /// 環境変数名
        name: &'static str,
        /// 設定されていた値
        value: String,
    },
    /// HTTPクライアントの構築に失敗
    #[error("HTTPクライアントの構築に失敗: {0}")]
    HttpClient(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_detail_is_body_text() {
        let err: UploadError = StoreError::Rejected {
            status: 403,
            body: "forbidden".to_string(),
        }
        .into();
        assert_eq!(err.kind(), FailureKind::RemoteRejected);
        assert_eq!(err.detail(), "forbidden");
    }

    #[test]
    fn test_report_carries_kind_and_detail() {
        let report = UploadError::Transport("connection refused".to_string()).to_report();
        assert_eq!(
            report,
            UploadReport::Failure {
                kind: FailureKind::TransportError,
                detail: "connection refused".to_string(),
            }
        );
    }
}
