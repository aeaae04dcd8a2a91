use portal_shared::content::{
    handle::{CreateAnnouncementReq, CreateNoteReq, CreatePastQuestionReq},
    Note, NoteDownload,
};
use serde_json::json;

use super::*;
use crate::store::Store;

fn note_req(title: &str, course_code: &str, level: u16, semester: &str) -> CreateNoteReq {
    CreateNoteReq {
        title: title.to_owned(),
        description: format!("Lecture notes of {course_code}"),
        course: "Financial Accounting".to_owned(),
        course_code: course_code.to_owned(),
        level: Level::try_from(level).unwrap(),
        semester: semester.to_owned(),
        lecturer: "Dr. Bello".to_owned(),
        file_type: "pdf".to_owned(),
        file_url: "https://files.example.com/notes.pdf".to_owned(),
        thumbnail_url: String::new(),
        uploader_name: "Admin".to_owned(),
    }
}

async fn create_note(app: &TestApp, token: &str, req: &CreateNoteReq) -> Note {
    let (status, body) = app.send(json("POST", "/api/notes", Some(token), req)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    serde_json::from_value(body).unwrap()
}

fn titles(body: &serde_json::Value) -> Vec<&str> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn notes() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let student = app.student("ada@bowen.edu.ng").await;

    let (status, body) = app.send(empty("GET", "/api/notes", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    // students can't create
    let (status, _) = app
        .send(json(
            "POST",
            "/api/notes",
            Some(&student),
            &note_req("Intro", "ACC 301", 300, "first"),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let intro = create_note(&app, &admin, &note_req("Intro", "ACC 301", 300, "first")).await;
    assert_eq!(intro.download_count, 0);
    let uploader = app
        .store
        .account_by_email("admin@bowen.edu.ng")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(intro.uploaded_by, uploader.id);
    create_note(&app, &admin, &note_req("Costing", "ACC 303", 300, "second")).await;
    create_note(&app, &admin, &note_req("Basics (part 1)", "ACC 101", 100, "first")).await;

    let (_, body) = app.send(empty("GET", "/api/notes?level=300", None)).await;
    assert_eq!(titles(&body).len(), 2);

    let (_, body) = app
        .send(empty("GET", "/api/notes?level=300&semester=second", None))
        .await;
    assert_eq!(titles(&body), ["Costing"]);

    let (_, body) = app
        .send(empty("GET", "/api/notes?courseCode=ACC%20101", None))
        .await;
    assert_eq!(titles(&body), ["Basics (part 1)"]);

    // search is case-insensitive and literal
    let (_, body) = app.send(empty("GET", "/api/notes?search=COST", None)).await;
    assert_eq!(titles(&body), ["Costing"]);
    let (_, body) = app
        .send(empty("GET", "/api/notes?search=%28part", None))
        .await;
    assert_eq!(titles(&body), ["Basics (part 1)"]);
    let (_, body) = app.send(empty("GET", "/api/notes?search=.%2A", None)).await;
    assert_eq!(body, json!([]));

    let (_, body) = app
        .send(empty("GET", "/api/notes?sortBy=title&sortOrder=asc", None))
        .await;
    assert_eq!(titles(&body), ["Basics (part 1)", "Costing", "Intro"]);

    let (status, _) = app.send(empty("GET", "/api/notes?sortBy=size", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(empty("GET", &format!("/api/notes/{}", intro.id), None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["courseCode"], "ACC 301");

    let (status, body) = app
        .send(empty("DELETE", &format!("/api/notes/{}", intro.id), Some(&admin)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    for method in ["GET", "DELETE"] {
        let (status, body) = app
            .send(empty(method, &format!("/api/notes/{}", intro.id), Some(&admin)))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Note not found");
    }
}

#[tokio::test]
async fn empty_filters() {
    let app = TestApp::new();
    let admin = app.admin().await;
    create_note(&app, &admin, &note_req("Intro", "ACC 301", 300, "first")).await;
    create_note(&app, &admin, &note_req("Basics", "ACC 101", 100, "second")).await;

    for uri in [
        "/api/notes?course=&courseCode=&semester=",
        "/api/notes?level=",
        "/api/notes?search=",
        "/api/notes?course=&courseCode=&level=&semester=&search=",
    ] {
        let (status, body) = app.send(empty("GET", uri, None)).await;
        assert_eq!(status, StatusCode::OK, "{uri}: {body}");
        assert_eq!(titles(&body).len(), 2, "{uri}");
    }

    // empty values don't hide the others
    let (_, body) = app
        .send(empty("GET", "/api/notes?level=&semester=second", None))
        .await;
    assert_eq!(titles(&body), ["Basics"]);

    let (status, _) = app.send(empty("GET", "/api/notes?level=abc", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn download_counts() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let student = app.student("ada@bowen.edu.ng").await;
    let note = create_note(&app, &admin, &note_req("Intro", "ACC 301", 300, "first")).await;
    let other = create_note(&app, &admin, &note_req("Costing", "ACC 303", 300, "second")).await;

    let uri = format!("/api/notes/{}/download", note.id);
    let (status, _) = app.send(empty("POST", &uri, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    for expected in 1..=2 {
        let (status, _) = app.send(empty("POST", &uri, Some(&student))).await;
        assert_eq!(status, StatusCode::OK);
        let stored: Note = app.store.get(&note.id).await.unwrap().unwrap();
        assert_eq!(stored.download_count, expected);
        assert_eq!(app.store.all::<NoteDownload>().unwrap().len() as u64, expected);
    }
    let untouched: Note = app.store.get(&other.id).await.unwrap().unwrap();
    assert_eq!(untouched.download_count, 0);

    let (status, _) = app
        .send(empty("POST", "/api/notes/000000000000000000000000/download", Some(&student)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.store.all::<NoteDownload>().unwrap().len(), 2);

    let (_, body) = app
        .send(empty("GET", "/api/users/downloads", Some(&student)))
        .await;
    let downloads = body.as_array().unwrap();
    assert_eq!(downloads.len(), 2);
    assert!(downloads.iter().all(|d| d["noteId"] == note.id.as_str()));

    let (_, body) = app
        .send(empty("GET", "/api/notes?sortBy=downloadCount", None))
        .await;
    assert_eq!(titles(&body), ["Intro", "Costing"]);
}

#[tokio::test]
async fn past_questions() {
    let app = TestApp::new();
    let admin = app.admin().await;

    let mut req = CreatePastQuestionReq {
        title: "ACC 301 exam".to_owned(),
        description: String::new(),
        course: "Financial Accounting".to_owned(),
        course_code: "ACC 301".to_owned(),
        level: Level::try_from(300).unwrap(),
        semester: "first".to_owned(),
        year: 2022,
        file_url: "https://files.example.com/acc301-2022.pdf".to_owned(),
        file_name: "acc301-2022.pdf".to_owned(),
    };
    for year in [2022, 2023] {
        req.year = year;
        let (status, _) = app
            .send(json("POST", "/api/past-questions", Some(&admin), &req))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    req.file_url = String::new();
    let (status, _) = app
        .send(json("POST", "/api/past-questions", Some(&admin), &req))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app
        .send(empty("GET", "/api/past-questions?sortBy=year&sortOrder=asc", None))
        .await;
    let years: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["year"].as_u64().unwrap())
        .collect();
    assert_eq!(years, [2022, 2023]);

    let (status, _) = app
        .send(empty("GET", "/api/past-questions/missing", None))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn announcements() {
    let app = TestApp::new();
    let admin = app.admin().await;

    let req = CreateAnnouncementReq {
        title: "Exams".to_owned(),
        content: "Timetable is out".to_owned(),
    };
    let (status, created) = app
        .send(json("POST", "/api/announcements", Some(&admin), &req))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = app
        .send(empty("GET", "/api/announcements?search=timetable", None))
        .await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], created["id"]);

    let (status, _) = app
        .send(json(
            "POST",
            "/api/announcements",
            Some(&admin),
            &json!({ "title": "Missing content" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(empty(
            "DELETE",
            &format!("/api/announcements/{}", created["id"].as_str().unwrap()),
            Some(&admin),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.send(empty("GET", "/api/announcements", None)).await;
    assert_eq!(body, json!([]));
}
