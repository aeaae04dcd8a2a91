use axum::Json;
use portal_shared::course::{self, Course, COURSES};

use crate::{Error, PathParam};

fn parse_level(level: &str) -> Result<u16, Error> {
    level.parse().map_err(|_| Error::InvalidLevel)
}

pub async fn all() -> Json<&'static [Course]> {
    Json(COURSES)
}

pub async fn by_level(PathParam(level): PathParam<String>) -> Result<Json<Vec<Course>>, Error> {
    Ok(Json(
        course::by_level(parse_level(&level)?).cloned().collect(),
    ))
}

pub async fn by_level_and_semester(
    PathParam((level, semester)): PathParam<(String, String)>,
) -> Result<Json<Vec<Course>>, Error> {
    Ok(Json(
        course::by_level_and_semester(parse_level(&level)?, &semester)
            .cloned()
            .collect(),
    ))
}
