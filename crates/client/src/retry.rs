//! # リトライポリシー
//!
//! 通信失敗（`StoreError::Transport`）にのみ適用する有限回リトライと指数バックオフ。
//! ストアの拒否（非2xx）は決してリトライしない。

use std::time::Duration;

/// 通信失敗時のリトライ設定。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 最大試行回数（初回を含む）。1ならリトライなし。
    pub max_attempts: u32,
    /// 初回リトライ前の待機時間
    pub initial_backoff: Duration,
    /// 待機時間の上限
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// リトライしないポリシー。
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// 指数バックオフ付きのポリシー。上限は初期値の32倍。
    pub fn exponential(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            max_backoff: initial_backoff.saturating_mul(32),
        }
    }

    /// `attempt` 回目（1始まり）の失敗後にリトライすべきか。
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// `attempt` 回目（1始まり）の失敗後の待機時間。
    pub fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(1u32 << shift)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}
