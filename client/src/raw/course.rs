use portal_shared::course::Course;

use super::request;

pub struct AllCourses;

request!(AllCourses => Vec<Course>, GET "/api/courses");

/// Courses of a level, optionally of a single semester.
pub struct Courses {
    pub level: u16,
    pub semester: Option<String>,
}

request!(
    Courses => Vec<Course>, GET "/api/courses/level",
    path(req) = match req.semester {
        Some(ref semester) => format!("/api/courses/level/{}/semester/{semester}", req.level),
        None => format!("/api/courses/level/{}", req.level),
    }
);
