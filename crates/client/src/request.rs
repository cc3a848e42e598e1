//! # アップロードリクエスト
//!
//! ペイロード・オブジェクト名・バケットをまとめた不変のリクエスト。
//! 構築時に入力を検証し、不正な値ではアップロードを開始しない。

use crate::error::UploadError;

/// バケット内のオブジェクトを識別するキー。
///
/// 空文字列、先頭の `/`、空セグメント、`.` / `..` セグメント、
/// バックスラッシュ、制御文字を含むキーは受け付けない。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectName(String);

impl ObjectName {
    pub fn new(name: impl Into<String>) -> Result<Self, UploadError> {
        let name = name.into();
        if name.is_empty() {
            return Err(UploadError::InvalidRequest(
                "オブジェクト名が空です".to_string(),
            ));
        }
        if name.starts_with('/') {
            return Err(UploadError::InvalidRequest(format!(
                "オブジェクト名は '/' で始められません: {name}"
            )));
        }
        if name.contains('\\') || name.chars().any(char::is_control) {
            return Err(UploadError::InvalidRequest(format!(
                "オブジェクト名に使用できない文字が含まれています: {name:?}"
            )));
        }
        if name
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(UploadError::InvalidRequest(format!(
                "オブジェクト名に不正なパスセグメントが含まれています: {name}"
            )));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// バケット名を検証する。
///
/// URLの1パスセグメントに収まらない名前（空、`.` / `..`、`/`、`\`、
/// `#` / `?` / `%`、制御文字を含むもの）は受け付けない。
pub fn validate_bucket(bucket: &str) -> Result<(), UploadError> {
    let invalid = bucket.is_empty()
        || bucket == "."
        || bucket == ".."
        || bucket.contains(&['/', '\\', '#', '?', '%'][..])
        || bucket.chars().any(char::is_control);
    if invalid {
        return Err(UploadError::InvalidRequest(format!(
            "バケット名が不正です: {bucket:?}"
        )));
    }
    Ok(())
}

/// 1回のアップロード呼び出しの入力。
#[derive(Debug, Clone)]
pub struct UploadRequest {
    payload: Vec<u8>,
    object_name: ObjectName,
    bucket: Option<String>,
    content_type: Option<String>,
}

impl UploadRequest {
    /// デフォルトバケット・デフォルトContent-Typeでリクエストを構築する。
    pub fn new(payload: Vec<u8>, object_name: impl Into<String>) -> Result<Self, UploadError> {
        if payload.is_empty() {
            return Err(UploadError::InvalidRequest(
                "ペイロードが空です".to_string(),
            ));
        }
        Ok(Self {
            payload,
            object_name: ObjectName::new(object_name)?,
            bucket: None,
            content_type: None,
        })
    }

    /// アップロード先バケットを指定する。
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Result<Self, UploadError> {
        let bucket = bucket.into();
        validate_bucket(&bucket)?;
        self.bucket = Some(bucket);
        Ok(self)
    }

    /// Content-Typeを指定する。
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Result<Self, UploadError> {
        let content_type = content_type.into();
        if !content_type.contains('/') {
            return Err(UploadError::InvalidRequest(format!(
                "Content-Typeが不正です: {content_type:?}"
            )));
        }
        self.content_type = Some(content_type);
        Ok(self)
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn object_name(&self) -> &ObjectName {
        &self.object_name
    }

    pub fn bucket(&self) -> Option<&str> {
        self.bucket.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}
