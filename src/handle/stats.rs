use axum::{extract::State, Json};
use portal_shared::stats::Stats;

use crate::{auth::Admin, stats::gather, store::Store, Global};

pub async fn get<S: Store>(
    _: Admin,
    State(Global { store, .. }): State<Global<S>>,
) -> Json<Stats> {
    Json(gather(store.as_ref()).await)
}
