use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures_util::{StreamExt, TryStreamExt};
use reqwest::{
    header::{CONTENT_LENGTH, CONTENT_TYPE},
    multipart::{Form, Part},
};
use serde::Deserialize;
use tracing::{debug, info};

use super::{Error, Fetched, ObjectStorage, Stored, Upload, UploadKind};
use crate::config;

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Bound of a proxied fetch, body included.
const FETCH_TIMEOUT: Duration = Duration::from_secs(120);

/// Transformation applied to profile pictures.
const PROFILE_PICTURE_TRANSFORMATION: &str = "c_fill,g_face,h_400,w_400";

/// Cloudinary upload API client.
///
/// Requests are signed with SHA-256.
pub struct CloudinaryStorage {
    client: reqwest::Client,
    credentials: Option<config::Cloudinary>,
    fetch_timeout: Duration,
}

#[derive(Deserialize)]
struct UploadRes {
    secure_url: String,
    public_id: String,
    #[serde(default)]
    format: String,
    #[serde(default)]
    bytes: u64,
}

#[derive(Deserialize)]
struct ErrorRes {
    error: ErrorMessage,
}

#[derive(Deserialize)]
struct ErrorMessage {
    message: String,
}

impl CloudinaryStorage {
    /// Creates a client, uploads fail without credentials.
    pub fn new(credentials: Option<config::Cloudinary>) -> Result<Self, Error> {
        if credentials.is_none() {
            info!("object storage not configured, uploads are disabled");
        }
        Ok(Self {
            client: reqwest::Client::builder()
                .connect_timeout(CONNECT_TIMEOUT)
                .build()?,
            credentials,
            fetch_timeout: FETCH_TIMEOUT,
        })
    }
}

/// Signs upload parameters, which must be sorted by key.
fn sign(params: &[(&str, String)], secret: &str) -> String {
    let joined = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    sha256::digest(format!("{joined}{secret}"))
}

#[async_trait]
impl ObjectStorage for CloudinaryStorage {
    async fn upload(&self, upload: Upload) -> Result<Stored, Error> {
        let credentials = self.credentials.as_ref().ok_or(Error::NotConfigured)?;

        let (resource_type, mut params) = match upload.kind {
            UploadKind::File => (
                "auto",
                vec![
                    ("folder", upload.folder),
                    ("overwrite", "true".to_owned()),
                    ("public_id", upload.public_id),
                    ("unique_filename", "false".to_owned()),
                    ("use_filename", "false".to_owned()),
                ],
            ),
            UploadKind::ProfilePicture => (
                "image",
                vec![
                    ("folder", upload.folder),
                    ("public_id", upload.public_id),
                    (
                        "transformation",
                        PROFILE_PICTURE_TRANSFORMATION.to_owned(),
                    ),
                ],
            ),
        };
        params.push(("timestamp", Utc::now().timestamp().to_string()));
        params.sort_by_key(|(k, _)| *k);
        let signature = sign(&params, &credentials.api_secret);

        let mut form = Form::new()
            .text("api_key", credentials.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        for (key, value) in params {
            form = form.text(key, value);
        }
        let len = upload.data.len() as u64;
        form = form.part(
            "file",
            Part::stream_with_length(upload.data, len).file_name(upload.file_name),
        );

        let res = self
            .client
            .post(format!(
                "https://api.cloudinary.com/v1_1/{}/{resource_type}/upload",
                credentials.cloud_name
            ))
            .timeout(UPLOAD_TIMEOUT)
            .multipart(form)
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            let message = res
                .json::<ErrorRes>()
                .await
                .map_or_else(|_| status.to_string(), |res| res.error.message);
            return Err(Error::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let res: UploadRes = res.json().await?;
        debug!("stored object {} at {}", res.public_id, res.secure_url);
        Ok(Stored {
            url: res.secure_url,
            public_id: res.public_id,
            format: res.format,
            size: res.bytes,
        })
    }

    async fn fetch(&self, url: &str) -> Result<Fetched, Error> {
        let res = self
            .client
            .get(url)
            .timeout(self.fetch_timeout)
            .send()
            .await?;
        let header = |name: reqwest::header::HeaderName| {
            res.headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned)
        };
        Ok(Fetched {
            status: res.status().as_u16(),
            content_type: header(CONTENT_TYPE),
            content_length: header(CONTENT_LENGTH).and_then(|len| len.parse().ok()),
            body: res.bytes_stream().map_err(Error::from).boxed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature() {
        let params = [
            ("folder", "notes".to_owned()),
            ("public_id", "1700000000_intro".to_owned()),
            ("timestamp", "1700000000".to_owned()),
        ];
        assert_eq!(
            sign(&params, "secret"),
            sha256::digest(
                "folder=notes&public_id=1700000000_intro&timestamp=1700000000secret"
            )
        );
    }

    #[tokio::test]
    async fn fetch_is_bounded() {
        // accepted by the backlog, never answered
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let storage = CloudinaryStorage {
            fetch_timeout: Duration::from_millis(200),
            ..CloudinaryStorage::new(None).unwrap()
        };

        let result = storage.fetch(&format!("http://{addr}/notes.pdf")).await;
        match result {
            Err(Error::Http(err)) => assert!(err.is_timeout(), "{err}"),
            Err(err) => panic!("unexpected error {err}"),
            Ok(fetched) => panic!("unexpected status {}", fetched.status),
        }
        drop(listener);
    }
}
