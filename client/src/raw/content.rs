use portal_shared::{
    content::{
        handle::{ContentQuery, CreateAnnouncementReq, CreateNoteReq, CreatePastQuestionReq},
        Announcement, Note, PastQuestion,
    },
    Message,
};

use super::request;

pub struct ListNotes(pub ContentQuery);

request!(ListNotes => Vec<Note>, GET "/api/notes", query(req) = &req.0);

pub struct GetNote {
    pub id: String,
}

request!(GetNote => Note, GET "/api/notes", path(req) = format!("/api/notes/{}", req.id));

pub struct CreateNote(pub CreateNoteReq);

request!(CreateNote => Note, POST "/api/notes", json(req) = &req.0);

/// Records a download of a note by the signed in user.
pub struct DownloadNote {
    pub id: String,
}

request!(
    DownloadNote => Message, POST "/api/notes",
    path(req) = format!("/api/notes/{}/download", req.id)
);

pub struct DeleteNote {
    pub id: String,
}

request!(
    DeleteNote => Message, DELETE "/api/notes",
    path(req) = format!("/api/notes/{}", req.id)
);

pub struct ListPastQuestions(pub ContentQuery);

request!(
    ListPastQuestions => Vec<PastQuestion>, GET "/api/past-questions",
    query(req) = &req.0
);

pub struct CreatePastQuestion(pub CreatePastQuestionReq);

request!(
    CreatePastQuestion => PastQuestion, POST "/api/past-questions",
    json(req) = &req.0
);

pub struct ListAnnouncements;

request!(ListAnnouncements => Vec<Announcement>, GET "/api/announcements");

pub struct CreateAnnouncement(pub CreateAnnouncementReq);

request!(
    CreateAnnouncement => Announcement, POST "/api/announcements",
    json(req) = &req.0
);
