use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use portal_shared::{
    election::{
        handle::{DeclareWinnerReq, ElectionDescriptor, ToggleReq, VoteReq},
        Election, Vote, VoteTally,
    },
    Message,
};
use tracing::info;

use super::require;
use crate::{
    auth::{Admin, Auth},
    election::assemble,
    store::{self, Store},
    Error, Global, PathParam, Payload,
};

const NOT_FOUND: Error = Error::NotFound("Election");

pub async fn list<S: Store>(
    State(Global { store, .. }): State<Global<S>>,
) -> Result<Json<Vec<Election>>, Error> {
    Ok(Json(store.elections().await?))
}

pub async fn get<S: Store>(
    State(Global { store, .. }): State<Global<S>>,
    PathParam(id): PathParam<String>,
) -> Result<Json<Election>, Error> {
    store
        .get::<Election>(&id)
        .await?
        .map(Json)
        .ok_or(NOT_FOUND)
}

pub async fn create<S: Store>(
    _: Admin,
    State(Global { store, .. }): State<Global<S>>,
    Payload(desc): Payload<ElectionDescriptor>,
) -> Result<(StatusCode, Json<Election>), Error> {
    let now = Utc::now();
    let election = assemble(desc, store::new_id(), now, now)?;
    store.insert(&election).await?;
    info!("election {} created", election.id);
    Ok((StatusCode::CREATED, Json(election)))
}

/// Replaces every editable field of an election.
pub async fn update<S: Store>(
    _: Admin,
    State(Global { store, .. }): State<Global<S>>,
    PathParam(id): PathParam<String>,
    Payload(desc): Payload<ElectionDescriptor>,
) -> Result<Json<Election>, Error> {
    let current = store.get::<Election>(&id).await?.ok_or(NOT_FOUND)?;
    let election = assemble(desc, current.id, current.created_at, Utc::now())?;
    if store.replace(&election).await? {
        Ok(Json(election))
    } else {
        Err(NOT_FOUND)
    }
}

/// Removes an election and every vote cast in it.
pub async fn delete<S: Store>(
    _: Admin,
    State(Global { store, .. }): State<Global<S>>,
    PathParam(id): PathParam<String>,
) -> Result<Json<Message>, Error> {
    if !store.delete::<Election>(&id).await? {
        return Err(NOT_FOUND);
    }
    let votes = store.delete_votes(&id).await?;
    info!("election {id} deleted with {votes} votes");
    Ok(Json(Message::new("Election deleted successfully")))
}

pub async fn toggle<S: Store>(
    _: Admin,
    State(Global { store, .. }): State<Global<S>>,
    PathParam(id): PathParam<String>,
    Payload(ToggleReq { is_open }): Payload<ToggleReq>,
) -> Result<Json<Message>, Error> {
    if !store.set_election_open(&id, is_open, Utc::now()).await? {
        return Err(NOT_FOUND);
    }
    Ok(Json(Message::new(if is_open {
        "Election opened successfully"
    } else {
        "Election closed successfully"
    })))
}

pub async fn vote<S: Store>(
    auth: Auth,
    State(Global { store, .. }): State<Global<S>>,
    Payload(VoteReq {
        election_id,
        position_id,
        candidate_id,
    }): Payload<VoteReq>,
) -> Result<Json<Message>, Error> {
    require(&[
        ("electionId", election_id.as_str()),
        ("positionId", position_id.as_str()),
        ("candidateId", candidate_id.as_str()),
    ])?;
    let election = store
        .get::<Election>(&election_id)
        .await?
        .ok_or(NOT_FOUND)?;
    if !election.is_open {
        return Err(Error::ElectionClosed);
    }

    let vote = Vote {
        id: store::new_id(),
        election_id,
        position_id,
        candidate_id,
        user_id: auth.user,
        voted_at: Utc::now(),
    };
    if store.insert_vote(&vote).await? {
        Ok(Json(Message::new("Vote recorded successfully")))
    } else {
        Err(Error::AlreadyVoted)
    }
}

pub async fn my_votes<S: Store>(
    auth: Auth,
    State(Global { store, .. }): State<Global<S>>,
) -> Result<Json<Vec<Vote>>, Error> {
    Ok(Json(store.votes_of(&auth.user).await?))
}

/// Vote counts per position and candidate.
pub async fn results<S: Store>(
    State(Global { store, .. }): State<Global<S>>,
    PathParam(id): PathParam<String>,
) -> Result<Json<Vec<VoteTally>>, Error> {
    Ok(Json(store.tally(&id).await?))
}

pub async fn declare_winner<S: Store>(
    _: Admin,
    State(Global { store, .. }): State<Global<S>>,
    PathParam(id): PathParam<String>,
    Payload(DeclareWinnerReq {
        position_id,
        candidate_id,
    }): Payload<DeclareWinnerReq>,
) -> Result<Json<Message>, Error> {
    let election = store.get::<Election>(&id).await?.ok_or(NOT_FOUND)?;
    if election.candidate(&position_id, &candidate_id).is_none() {
        return Err(Error::NotFound("Candidate"));
    }
    if !store
        .declare_winner(&id, &position_id, &candidate_id, Utc::now())
        .await?
    {
        return Err(NOT_FOUND);
    }
    Ok(Json(Message::new("Winner declared successfully")))
}
