//! # Session Provider
//!
//! 現在のセッションのアクセストークンを取得する抽象インターフェース。
//! セッションの確立方法（サインインフロー等）はこのクレートの責務外。

/// Bearer認証に使う不透明なアクセストークン。
///
/// クライアントは1リクエストの間だけ参照し、キャッシュ・永続化しない。
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// トークン文字列を返す。
    pub fn token(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

// トークンをログに出さない
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// 現在のセッション資格情報を返すトレイト。
#[async_trait::async_trait]
pub trait SessionProvider: Send + Sync {
    /// 現在のアクセストークンを返す。サインインしていなければ `None`。
    async fn current_credential(&self) -> Option<Credential>;
}

/// 固定トークンを返すSession Provider。
/// ホストプロセスが確立済みのセッションを渡す場合に使用する。
pub struct StaticSession {
    credential: Credential,
}

impl StaticSession {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            credential: Credential::new(token),
        }
    }
}

#[async_trait::async_trait]
impl SessionProvider for StaticSession {
    async fn current_credential(&self) -> Option<Credential> {
        Some(self.credential.clone())
    }
}

/// 常に未サインインを返すSession Provider。
pub struct NoSession;

#[async_trait::async_trait]
impl SessionProvider for NoSession {
    async fn current_credential(&self) -> Option<Credential> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_session_returns_token() {
        let session = StaticSession::new("jwt-token");
        let credential = session.current_credential().await.unwrap();
        assert_eq!(credential.token(), "jwt-token");
        assert!(!credential.is_empty());
    }

    #[tokio::test]
    async fn test_no_session_returns_none() {
        assert!(NoSession.current_credential().await.is_none());
    }

    #[test]
    fn test_debug_hides_token() {
        let credential = Credential::new("secret");
        assert!(!format!("{credential:?}").contains("secret"));
        assert!(Credential::new("  ").is_empty());
    }
}
