use portal_shared::course::Course;

use super::*;

#[tokio::test]
async fn catalog() {
    let app = TestApp::new();

    let (status, body) = app.send(empty("GET", "/api/courses", None)).await;
    assert_eq!(status, StatusCode::OK);
    let all: Vec<Course> = serde_json::from_value(body).unwrap();
    assert_eq!(all.len(), portal_shared::course::COURSES.len());

    let (_, body) = app.send(empty("GET", "/api/courses/level/300", None)).await;
    let level: Vec<Course> = serde_json::from_value(body).unwrap();
    assert_eq!(level.len(), 17);
    assert!(level.iter().all(|c| c.level.get() == 300));

    let (_, body) = app
        .send(empty("GET", "/api/courses/level/300/semester/first", None))
        .await;
    let first: Vec<Course> = serde_json::from_value(body).unwrap();
    assert_eq!(first.len(), 10);
    assert_eq!(first[0].code, "ACC 301");

    // unknown levels and semesters are just empty
    let (status, body) = app.send(empty("GET", "/api/courses/level/500", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));
    let (_, body) = app
        .send(empty("GET", "/api/courses/level/100/semester/third", None))
        .await;
    assert_eq!(body, serde_json::json!([]));

    let (status, body) = app.send(empty("GET", "/api/courses/level/abc", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid level");
}
