//! Notes, past questions and announcements.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use portal_shared::{
    content::{
        handle::{ContentQuery, CreateAnnouncementReq, CreateNoteReq, CreatePastQuestionReq},
        Announcement, Note, NoteDownload, PastQuestion,
    },
    Message,
};

use super::require;
use crate::{
    auth::{Admin, Auth},
    store::{self, Content, Store},
    Error, Global, Params, PathParam, Payload,
};

/// Lists content matching the query, `[]` when nothing does.
pub async fn list<S: Store, T: Content>(
    State(Global { store, .. }): State<Global<S>>,
    Params(query): Params<ContentQuery>,
) -> Result<Json<Vec<T>>, Error> {
    Ok(Json(store.list::<T>(&query).await?))
}

pub async fn get<S: Store, T: Content>(
    State(Global { store, .. }): State<Global<S>>,
    PathParam(id): PathParam<String>,
) -> Result<Json<T>, Error> {
    store
        .get::<T>(&id)
        .await?
        .map(Json)
        .ok_or(Error::NotFound(T::NAME))
}

pub async fn delete<S: Store, T: Content>(
    _: Admin,
    State(Global { store, .. }): State<Global<S>>,
    PathParam(id): PathParam<String>,
) -> Result<Json<Message>, Error> {
    if store.delete::<T>(&id).await? {
        Ok(Json(Message::new(format!("{} deleted successfully", T::NAME))))
    } else {
        Err(Error::NotFound(T::NAME))
    }
}

pub async fn create_note<S: Store>(
    Admin(auth): Admin,
    State(Global { store, .. }): State<Global<S>>,
    Payload(req): Payload<CreateNoteReq>,
) -> Result<(StatusCode, Json<Note>), Error> {
    require(&[
        ("title", req.title.as_str()),
        ("course", req.course.as_str()),
        ("courseCode", req.course_code.as_str()),
        ("semester", req.semester.as_str()),
    ])?;
    let now = Utc::now();
    let note = Note {
        id: store::new_id(),
        title: req.title,
        description: req.description,
        course: req.course,
        course_code: req.course_code,
        level: req.level,
        semester: req.semester,
        lecturer: req.lecturer,
        file_type: req.file_type,
        file_url: req.file_url,
        thumbnail_url: req.thumbnail_url,
        uploaded_by: auth.user,
        uploader_name: req.uploader_name,
        download_count: 0,
        created_at: now,
        updated_at: now,
    };
    store.insert(&note).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn create_past_question<S: Store>(
    Admin(auth): Admin,
    State(Global { store, .. }): State<Global<S>>,
    Payload(req): Payload<CreatePastQuestionReq>,
) -> Result<(StatusCode, Json<PastQuestion>), Error> {
    require(&[
        ("title", req.title.as_str()),
        ("course", req.course.as_str()),
        ("courseCode", req.course_code.as_str()),
        ("semester", req.semester.as_str()),
        ("fileUrl", req.file_url.as_str()),
        ("fileName", req.file_name.as_str()),
    ])?;
    let now = Utc::now();
    let question = PastQuestion {
        id: store::new_id(),
        title: req.title,
        description: req.description,
        course: req.course,
        course_code: req.course_code,
        level: req.level,
        semester: req.semester,
        year: req.year,
        file_url: req.file_url,
        file_name: req.file_name,
        uploaded_by: auth.user,
        created_at: now,
        updated_at: now,
    };
    store.insert(&question).await?;
    Ok((StatusCode::CREATED, Json(question)))
}

pub async fn create_announcement<S: Store>(
    Admin(auth): Admin,
    State(Global { store, .. }): State<Global<S>>,
    Payload(CreateAnnouncementReq { title, content }): Payload<CreateAnnouncementReq>,
) -> Result<(StatusCode, Json<Announcement>), Error> {
    require(&[("title", title.as_str()), ("content", content.as_str())])?;
    let now = Utc::now();
    let announcement = Announcement {
        id: store::new_id(),
        title,
        content,
        created_by: auth.user,
        created_at: now,
        updated_at: now,
    };
    store.insert(&announcement).await?;
    Ok((StatusCode::CREATED, Json(announcement)))
}

/// Counts a download of a note by the caller.
pub async fn download_note<S: Store>(
    auth: Auth,
    State(Global { store, .. }): State<Global<S>>,
    PathParam(id): PathParam<String>,
) -> Result<Json<Message>, Error> {
    let download = NoteDownload {
        id: store::new_id(),
        note_id: id,
        user_id: auth.user,
        download_at: Utc::now(),
    };
    if store.record_download(&download).await? {
        Ok(Json(Message::new("Download recorded")))
    } else {
        Err(Error::NotFound(Note::NAME))
    }
}
