//! # テスト用共通ヘルパー
//!
//! store, uploaderテストで共有するモックサーバー群。

/// テスト用モックストアを起動し、待ち受けポートを返す。
pub async fn start_mock_store(app: axum::Router) -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    port
}

/// 誰も待ち受けていないポートを返す（接続拒否のテスト用）。
pub async fn closed_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}
