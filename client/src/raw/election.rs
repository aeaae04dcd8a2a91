use portal_shared::{
    election::{
        handle::{DeclareWinnerReq, ElectionDescriptor, ToggleReq, VoteReq},
        Election, Vote, VoteTally,
    },
    Message,
};

use super::request;

pub struct ListElections;

request!(ListElections => Vec<Election>, GET "/api/elections");

pub struct GetElection {
    pub id: String,
}

request!(
    GetElection => Election, GET "/api/elections",
    path(req) = format!("/api/elections/{}", req.id)
);

pub struct CreateElection(pub ElectionDescriptor);

request!(CreateElection => Election, POST "/api/elections", json(req) = &req.0);

/// Replaces an election, keeping its id and creation time.
pub struct UpdateElection {
    pub id: String,
    pub election: ElectionDescriptor,
}

request!(
    UpdateElection => Election, PUT "/api/elections",
    path(req) = format!("/api/elections/{}", req.id),
    json(req) = &req.election
);

pub struct Toggle {
    pub id: String,
    pub is_open: bool,
}

request!(
    Toggle => Message, PUT "/api/elections",
    path(req) = format!("/api/elections/{}/toggle", req.id),
    json(req) = &ToggleReq { is_open: req.is_open }
);

pub struct CastVote(pub VoteReq);

request!(CastVote => Message, POST "/api/elections/vote", json(req) = &req.0);

pub struct MyVotes;

request!(MyVotes => Vec<Vote>, GET "/api/elections/my-votes");

pub struct Results {
    pub id: String,
}

request!(
    Results => Vec<VoteTally>, GET "/api/elections",
    path(req) = format!("/api/elections/{}/results", req.id)
);

pub struct DeclareWinner {
    pub id: String,
    pub winner: DeclareWinnerReq,
}

request!(
    DeclareWinner => Message, PUT "/api/elections",
    path(req) = format!("/api/elections/{}/declare-winner", req.id),
    json(req) = &req.winner
);
