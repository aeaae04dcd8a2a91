//! File uploads and the storage proxy.

use axum::{
    body::StreamBody,
    extract::{Multipart, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use portal_shared::upload::{ProfilePictureRes, ProxyQuery, UploadQuery, UploadRes};
use tracing::{info, warn};

use crate::{
    auth::Auth,
    storage::{self, Upload, UploadKind},
    store::Store,
    Error, Global, Params,
};

/// Multipart field carrying the file.
const FILE_FIELD: &str = "file";

/// Reads the file field of a multipart body.
async fn read_file(multipart: &mut Multipart) -> Result<(String, Bytes), Error> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            let file_name = field.file_name().unwrap_or_default().to_owned();
            let data = field.bytes().await?;
            if data.is_empty() {
                break;
            }
            return Ok((file_name, data));
        }
    }
    Err(Error::NoFile)
}

pub async fn file<S: Store>(
    auth: Auth,
    State(Global { storage, .. }): State<Global<S>>,
    Params(UploadQuery { folder }): Params<UploadQuery>,
    mut multipart: Multipart,
) -> Result<Json<UploadRes>, Error> {
    let (file_name, data) = read_file(&mut multipart).await?;
    let folder = folder
        .filter(|folder| !folder.trim().is_empty())
        .unwrap_or_else(|| storage::DEFAULT_FOLDER.to_owned());

    let stored = storage
        .upload(Upload {
            folder,
            public_id: storage::file_key(Utc::now(), &file_name),
            file_name,
            data,
            kind: UploadKind::File,
        })
        .await?;
    info!("{} uploaded {} ({} bytes)", auth.user, stored.public_id, stored.size);
    Ok(Json(UploadRes {
        url: stored.url,
        public_id: stored.public_id,
        format: stored.format,
        size: stored.size,
    }))
}

pub async fn profile_picture<S: Store>(
    auth: Auth,
    State(Global { storage, .. }): State<Global<S>>,
    mut multipart: Multipart,
) -> Result<Json<ProfilePictureRes>, Error> {
    let (file_name, data) = read_file(&mut multipart).await?;
    let allowed = storage::extension(&file_name)
        .map_or(false, |ext| storage::IMAGE_EXTENSIONS.contains(&ext.as_str()));
    if !allowed || image::guess_format(&data).is_err() {
        return Err(Error::NotAnImage);
    }

    let stored = storage
        .upload(Upload {
            folder: storage::PROFILE_PICTURE_FOLDER.to_owned(),
            public_id: storage::profile_picture_key(Utc::now()),
            file_name,
            data,
            kind: UploadKind::ProfilePicture,
        })
        .await?;
    info!("{} uploaded profile picture {}", auth.user, stored.public_id);
    Ok(Json(ProfilePictureRes {
        url: stored.url,
        public_id: stored.public_id,
    }))
}

/// Streams the bytes behind a storage url back to the client.
pub async fn proxy<S: Store>(
    State(Global { storage, .. }): State<Global<S>>,
    Params(ProxyQuery { url }): Params<ProxyQuery>,
) -> Result<Response, Error> {
    let url = url.filter(|url| !url.is_empty()).ok_or(Error::MissingUrl)?;
    let url = reqwest::Url::parse(&url).map_err(|_| Error::InvalidUrl)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::InvalidUrl);
    }

    let fetched = storage.fetch(url.as_str()).await?;
    if fetched.status != StatusCode::OK.as_u16() {
        warn!("storage returned status {} for {url}", fetched.status);
        return Err(Error::Upstream(
            StatusCode::from_u16(fetched.status).unwrap_or(StatusCode::BAD_GATEWAY),
        ));
    }

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        fetched
            .content_type
            .and_then(|ty| HeaderValue::from_str(&ty).ok())
            .unwrap_or_else(|| HeaderValue::from_static("application/pdf")),
    );
    if let Some(len) = fetched.content_length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    }
    headers.insert(header::CONTENT_DISPOSITION, HeaderValue::from_static("inline"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    Ok((headers, StreamBody::new(fetched.body)).into_response())
}
