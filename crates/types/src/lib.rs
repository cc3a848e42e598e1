//! # Asset Upload 共有型定義
//!
//! アップロードクライアントとCLIの間で共有する結果型を提供する。
//!
//! ## エンコーディング規則
//! - JSON: `snake_case`。結果は `status` フィールドでタグ付けする。

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// 失敗種別
// ---------------------------------------------------------------------------

/// アップロード失敗の分類。
///
/// 呼び出し側はこの種別で「未サインイン」「ストア側の拒否」「通信断」を区別できる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// 有効なセッション資格情報がない。ネットワーク通信は行われていない。
    Unauthenticated,
    /// ストアが非2xxステータスを返した
    RemoteRejected,
    /// 通信自体の失敗（接続拒否、タイムアウト、DNS解決失敗等）
    TransportError,
    /// 呼び出し側によるキャンセル
    Cancelled,
    /// リクエストの構築に失敗（空ペイロード、不正なオブジェクト名）
    InvalidRequest,
}

impl FailureKind {
    /// ログ・JSON出力用の識別子。
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Unauthenticated => "unauthenticated",
            FailureKind::RemoteRejected => "remote_rejected",
            FailureKind::TransportError => "transport_error",
            FailureKind::Cancelled => "cancelled",
            FailureKind::InvalidRequest => "invalid_request",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// アップロード結果
// ---------------------------------------------------------------------------

/// 1回のアップロード呼び出しの結果をシリアライズ可能な形で表したもの。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadReport {
    /// アップロード成功
    Success {
        /// `(bucket, object_name)` に対応する公開URL
        public_url: String,
    },
    /// アップロード失敗
    Failure {
        /// 失敗種別
        kind: FailureKind,
        /// 診断用の詳細（ストアのレスポンス本文等）
        detail: String,
    },
}

impl UploadReport {
    /// 成功時の公開URLを返す。失敗時は `None`。
    pub fn public_url(&self) -> Option<&str> {
        match self {
            UploadReport::Success { public_url } => Some(public_url.as_str()),
            UploadReport::Failure { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UploadReport::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 成功結果がstatusタグ付きでシリアライズされることを確認
    #[test]
    fn test_success_report_json() {
        let report = UploadReport::Success {
            public_url: "https://example.supabase.co/storage/v1/object/public/avatars/a.png"
                .to_string(),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(
            value["public_url"],
            "https://example.supabase.co/storage/v1/object/public/avatars/a.png"
        );
        assert_eq!(report.public_url(), Some(value["public_url"].as_str().unwrap()));
    }

    /// 失敗結果の種別がsnake_caseで出力されることを確認
    #[test]
    fn test_failure_report_json() {
        let report = UploadReport::Failure {
            kind: FailureKind::RemoteRejected,
            detail: "forbidden".to_string(),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"], "failure");
        assert_eq!(value["kind"], "remote_rejected");
        assert_eq!(value["detail"], "forbidden");
        assert!(!report.is_success());
        assert_eq!(report.public_url(), None);
    }

    #[test]
    fn test_failure_kind_display_matches_serde() {
        for kind in [
            FailureKind::Unauthenticated,
            FailureKind::RemoteRejected,
            FailureKind::TransportError,
            FailureKind::Cancelled,
            FailureKind::InvalidRequest,
        ] {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json.as_str().unwrap(), kind.to_string());
        }
    }
}
