//! External object storage of uploaded files.

mod cloudinary;
mod memory;

pub use cloudinary::CloudinaryStorage;
pub use memory::MemoryStorage;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_util::stream::BoxStream;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upload rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("object storage not configured")]
    NotConfigured,
}

/// Folder of uploads that don't name one.
pub const DEFAULT_FOLDER: &str = "general";
/// Folder of profile pictures.
pub const PROFILE_PICTURE_FOLDER: &str = "profile_pictures";
/// Extensions accepted for profile pictures.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// How an uploaded object is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    /// Any file, stored as is and overwriting an object of the same key.
    File,
    /// An image cropped to a square around the face.
    ProfilePicture,
}

/// A file to store.
#[derive(Debug, Clone)]
pub struct Upload {
    pub folder: String,
    pub public_id: String,
    /// Name of the file on the client.
    pub file_name: String,
    pub data: Bytes,
    pub kind: UploadKind,
}

/// A stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stored {
    /// Public HTTPS url of the object.
    pub url: String,
    pub public_id: String,
    pub format: String,
    pub size: u64,
}

/// Bytes fetched from a url.
pub struct Fetched {
    pub status: u16,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub body: BoxStream<'static, Result<Bytes, Error>>,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync + 'static {
    async fn upload(&self, upload: Upload) -> Result<Stored, Error>;

    /// Fetches the bytes behind a url.
    async fn fetch(&self, url: &str) -> Result<Fetched, Error>;
}

/// Turns a client file name into an object key fragment.
///
/// Strips the extension, turns spaces into underscores and drops everything
/// but ASCII alphanumerics, `_` and `-`.
pub fn sanitize_file_stem(file_name: &str) -> String {
    let stem = file_name
        .rfind('.')
        .map_or(file_name, |dot| &file_name[..dot]);
    stem.chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Object key of an uploaded file.
#[inline]
pub fn file_key(now: DateTime<Utc>, file_name: &str) -> String {
    format!("{}_{}", now.timestamp(), sanitize_file_stem(file_name))
}

/// Object key of a profile picture.
#[inline]
pub fn profile_picture_key(now: DateTime<Utc>) -> String {
    format!("profile_{}", now.timestamp())
}

/// Lowercased extension of a file name, if any.
pub fn extension(file_name: &str) -> Option<String> {
    let dot = file_name.rfind('.')?;
    Some(file_name[dot + 1..].to_ascii_lowercase()).filter(|ext| !ext.is_empty())
}
