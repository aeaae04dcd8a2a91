use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use futures_util::{stream, StreamExt};

use super::{extension, Error, Fetched, ObjectStorage, Stored, Upload};

/// Base url of objects kept in memory.
pub const BASE_URL: &str = "http://objects.localhost";

/// Object storage kept in process, serving its objects by url.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    objects: DashMap<String, (String, Bytes)>,
}

impl MemoryStorage {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn upload(&self, upload: Upload) -> Result<Stored, Error> {
        let format = extension(&upload.file_name).unwrap_or_default();
        let public_id = format!("{}/{}", upload.folder, upload.public_id);
        let url = if format.is_empty() {
            format!("{BASE_URL}/{public_id}")
        } else {
            format!("{BASE_URL}/{public_id}.{format}")
        };
        let content_type = mime_of(&format);
        let size = upload.data.len() as u64;
        self.objects
            .insert(url.clone(), (content_type, upload.data));
        Ok(Stored {
            url,
            public_id,
            format,
            size,
        })
    }

    async fn fetch(&self, url: &str) -> Result<Fetched, Error> {
        let Some(object) = self.objects.get(url) else {
            return Ok(Fetched {
                status: 404,
                content_type: None,
                content_length: None,
                body: stream::empty().boxed(),
            });
        };
        let (content_type, data) = object.value().clone();
        Ok(Fetched {
            status: 200,
            content_type: Some(content_type),
            content_length: Some(data.len() as u64),
            body: stream::once(async move { Ok(data) }).boxed(),
        })
    }
}

fn mime_of(format: &str) -> String {
    match format {
        "pdf" => mime::APPLICATION_PDF.to_string(),
        "png" => mime::IMAGE_PNG.to_string(),
        "jpg" | "jpeg" => mime::IMAGE_JPEG.to_string(),
        "gif" => mime::IMAGE_GIF.to_string(),
        "webp" => "image/webp".to_owned(),
        _ => mime::APPLICATION_OCTET_STREAM.to_string(),
    }
}
