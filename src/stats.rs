//! Admin dashboard figures.

use std::fmt::Display;

use portal_shared::{
    content::{Note, NoteDownload},
    stats::Stats,
};
use tracing::warn;

use crate::{account::Account, store::Store};

/// Number of notes listed as most downloaded.
pub const TOP_NOTES: usize = 3;

/// Falls back to the default value when a figure couldn't be queried.
fn or_default<T: Default, E: Display>(figure: &str, result: Result<T, E>) -> T {
    result.unwrap_or_else(|err| {
        warn!("failed to query {figure}: {err}");
        T::default()
    })
}

/// Gathers every figure of the dashboard, queried concurrently.
///
/// Never fails: a figure whose query failed is zero or empty.
pub async fn gather<S: Store>(store: &S) -> Stats {
    let (total_notes, total_downloads, total_users, active_elections, recent_notes, open) =
        tokio::join!(
            store.count::<Note>(),
            store.count::<NoteDownload>(),
            store.count::<Account>(),
            store.count_open_elections(),
            store.top_notes(TOP_NOTES),
            store.open_elections(),
        );
    Stats {
        total_notes: or_default("total notes", total_notes),
        total_downloads: or_default("total downloads", total_downloads),
        total_users: or_default("total users", total_users),
        active_elections: or_default("active elections", active_elections),
        recent_notes: or_default("most downloaded notes", recent_notes),
        active_elections_list: or_default("open elections", open),
    }
}

