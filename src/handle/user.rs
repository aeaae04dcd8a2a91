use axum::{extract::State, Json};
use chrono::Utc;
use portal_shared::{
    account::{
        handle::{ProfilePictureReq, StudentsQuery},
        User,
    },
    content::NoteDownload,
    Message,
};

use crate::{
    account::Account,
    auth::{Admin, Auth},
    store::Store,
    Error, Global, Params, Payload,
};

pub async fn profile<S: Store>(
    auth: Auth,
    State(Global { store, .. }): State<Global<S>>,
) -> Result<Json<User>, Error> {
    store
        .get::<Account>(&auth.user)
        .await?
        .map(|account| Json(account.view()))
        .ok_or(Error::NotFound("User"))
}

/// Download history of the caller, newest first.
pub async fn downloads<S: Store>(
    auth: Auth,
    State(Global { store, .. }): State<Global<S>>,
) -> Result<Json<Vec<NoteDownload>>, Error> {
    Ok(Json(store.downloads_of(&auth.user).await?))
}

pub async fn students<S: Store>(
    _: Admin,
    State(Global { store, .. }): State<Global<S>>,
    Params(StudentsQuery { level }): Params<StudentsQuery>,
) -> Result<Json<Vec<User>>, Error> {
    Ok(Json(
        store
            .students(level)
            .await?
            .iter()
            .map(Account::view)
            .collect(),
    ))
}

pub async fn set_profile_picture<S: Store>(
    auth: Auth,
    State(Global { store, .. }): State<Global<S>>,
    Payload(ProfilePictureReq { profile_picture }): Payload<ProfilePictureReq>,
) -> Result<Json<Message>, Error> {
    if profile_picture.trim().is_empty() {
        return Err(Error::MalformedRequest(
            "profilePicture is required".to_owned(),
        ));
    }
    if store
        .set_profile_picture(&auth.user, &profile_picture, Utc::now())
        .await?
    {
        Ok(Json(Message::new("Profile picture updated successfully")))
    } else {
        Err(Error::NotFound("User"))
    }
}
