//! # Asset Upload CLI
//!
//! ローカルファイルをオブジェクトストレージにアップロードし、公開URLを表示する。
//!
//! ## コマンド
//! - `upload <FILE>` — アップロードして結果をJSONで標準出力に書く
//! - `public-url <OBJECT>` — アップロードせずに公開URLだけを表示する
//!
//! 接続設定は `STORAGE_*` 環境変数から読み込む。ログは標準エラーに出力する。

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use upload_client::{
    CancellationToken, NoSession, ObjectName, SessionProvider, StaticSession, StorageConfig,
    UploadRequest, Uploader,
};
use upload_types::UploadReport;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// ファイルをアップロードし、公開URLを表示する
    Upload {
        /// アップロードするファイル
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// オブジェクト名（省略時は `{uuid}.{拡張子}`）
        #[arg(short, long)]
        name: Option<String>,
        /// アップロード先バケット（省略時は STORAGE_BUCKET）
        #[arg(short, long)]
        bucket: Option<String>,
        /// Content-Type（省略時は STORAGE_CONTENT_TYPE）
        #[arg(long)]
        content_type: Option<String>,
        /// セッションのアクセストークン
        #[arg(long, env = "STORAGE_ACCESS_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },
    /// オブジェクトの公開URLを表示する
    PublicUrl {
        /// オブジェクト名
        #[arg(value_name = "OBJECT")]
        name: String,
        /// バケット（省略時は STORAGE_BUCKET）
        #[arg(short, long)]
        bucket: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let config = StorageConfig::from_env()?;

    match args.command {
        Command::Upload {
            file,
            name,
            bucket,
            content_type,
            token,
        } => {
            let payload = tokio::fs::read(&file)
                .await
                .map_err(|e| anyhow::anyhow!("ファイル読み込みに失敗 ({}): {e}", file.display()))?;
            let object_name = name.unwrap_or_else(|| default_object_name(&file));

            let uploader = Uploader::from_config(&config, session_for(token))?;
            let report = match build_request(payload, object_name, bucket, content_type) {
                Ok(request) => run_upload(&uploader, request).await,
                Err(e) => e.to_report(),
            };

            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.is_success() {
                std::process::exit(1);
            }
        }
        Command::PublicUrl { name, bucket } => {
            let object_name = ObjectName::new(name)?;
            let uploader = Uploader::from_config(&config, Box::new(NoSession))?;
            let public_url = uploader.public_url_for(bucket.as_deref(), &object_name)?;
            println!("{public_url}");
        }
    }

    Ok(())
}

/// Ctrl-Cでキャンセルできるアップロードを実行する。
async fn run_upload(uploader: &Uploader, request: UploadRequest) -> UploadReport {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("中断要求を受信しました");
            trigger.cancel();
        }
    });

    match uploader.upload_with_cancel(request, &cancel).await {
        Ok(public_url) => UploadReport::Success { public_url },
        Err(e) => e.to_report(),
    }
}

fn session_for(token: Option<String>) -> Box<dyn SessionProvider> {
    match token.filter(|t| !t.trim().is_empty()) {
        Some(token) => Box::new(StaticSession::new(token)),
        None => {
            tracing::warn!("STORAGE_ACCESS_TOKENが未設定です。未サインインとして扱います");
            Box::new(NoSession)
        }
    }
}

fn build_request(
    payload: Vec<u8>,
    object_name: String,
    bucket: Option<String>,
    content_type: Option<String>,
) -> Result<UploadRequest, upload_client::UploadError> {
    let mut request = UploadRequest::new(payload, object_name)?;
    if let Some(bucket) = bucket {
        request = request.with_bucket(bucket)?;
    }
    if let Some(content_type) = content_type {
        request = request.with_content_type(content_type)?;
    }
    Ok(request)
}

/// ファイルの拡張子を引き継いだユニークなオブジェクト名を生成する。
fn default_object_name(file: &Path) -> String {
    let id = uuid::Uuid::new_v4();
    match file.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if !ext.is_empty() => format!("{id}.{}", ext.to_ascii_lowercase()),
        _ => id.to_string(),
    }
}
