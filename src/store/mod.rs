//! Persistence gateway.
//!
//! [`Store`] is the only place durable state is read or written. Handlers get
//! a store through [`crate::Global`], there is no process-wide handle.

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson;
use portal_shared::{
    account::Level,
    content::{
        handle::{ContentQuery, SortField},
        Announcement, Note, NoteDownload, PastQuestion,
    },
    election::{Election, Vote, VoteTally},
    stats::{ActiveElection, PopularNote},
};
use serde::{de::DeserializeOwned, Serialize};

use crate::account::{Account, PasscodeRecord};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("database error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("document encoding error: {0}")]
    Encode(#[from] bson::ser::Error),
    #[error("document decoding error: {0}")]
    Decode(#[from] bson::de::Error),
    #[error("database operation timed out")]
    Timeout,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Generates a new unique document identifier.
#[inline]
pub fn new_id() -> String {
    bson::oid::ObjectId::new().to_hex()
}

/// A record kept in its own collection, keyed by a unique `id` field.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

/// Course metadata a content listing filters on.
pub struct Facets<'a> {
    pub course: &'a str,
    pub course_code: &'a str,
    pub level: Level,
    pub semester: &'a str,
}

/// A value content is ordered by.
///
/// Missing values order first, as they do in the document store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey<'a> {
    Missing,
    Int(i64),
    Text(&'a str),
}

/// A listable kind of content.
pub trait Content: Document {
    /// Human readable name of the kind.
    const NAME: &'static str;

    /// Stored fields the free-text search looks into.
    const SEARCH_FIELDS: &'static [&'static str];

    fn facets(&self) -> Option<Facets<'_>>;

    /// Values of [`Self::SEARCH_FIELDS`], in the same order.
    fn searchable(&self) -> Vec<&str>;

    fn sort_key(&self, field: SortField) -> SortKey<'_>;

    /// Whether this document passes the filters of `query`.
    fn matches(&self, query: &ContentQuery) -> bool {
        let facets = self.facets();
        let equal = |want: &Option<String>, get: for<'f> fn(&'f Facets<'f>) -> &'f str| match want {
            None => true,
            Some(want) => facets.as_ref().map_or(false, |f| get(f) == want),
        };
        if !(equal(&query.course, |f| f.course)
            && equal(&query.course_code, |f| f.course_code)
            && equal(&query.semester, |f| f.semester))
        {
            return false;
        }
        if let Some(level) = query.level {
            if facets.as_ref().map_or(true, |f| f.level != level) {
                return false;
            }
        }
        match query.search.as_deref() {
            None | Some("") => true,
            Some(search) => {
                let search = search.to_lowercase();
                self.searchable()
                    .into_iter()
                    .any(|text| text.to_lowercase().contains(&search))
            }
        }
    }
}

/// Operations of the document store.
///
/// Every write that guards an invariant is a single atomic operation of the
/// backend: inserting an account fails on a taken email, inserting a vote
/// fails on an existing `(election, position, voter)` tuple.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Checks the store is reachable.
    async fn ping(&self) -> Result<()>;

    async fn get<T: Document>(&self, id: &str) -> Result<Option<T>>;

    async fn insert<T: Document>(&self, doc: &T) -> Result<()>;

    /// Replaces the document with the same id, returns whether one was found.
    async fn replace<T: Document>(&self, doc: &T) -> Result<bool>;

    /// Removes a document, returns whether one was removed.
    async fn delete<T: Document>(&self, id: &str) -> Result<bool>;

    async fn count<T: Document>(&self) -> Result<u64>;

    /// Lists content matching `query`, sorted as it asks.
    async fn list<T: Content>(&self, query: &ContentQuery) -> Result<Vec<T>>;

    // accounts

    /// Inserts an account unless its email is taken, returns whether it was inserted.
    async fn insert_account(&self, account: &Account) -> Result<bool>;

    async fn account_by_email(&self, email: &str) -> Result<Option<Account>>;

    async fn set_password(&self, account: &Account, at: DateTime<Utc>) -> Result<bool>;

    async fn set_profile_picture(&self, id: &str, url: &str, at: DateTime<Utc>) -> Result<bool>;

    /// Accounts with the student role, optionally of one level.
    async fn students(&self, level: Option<Level>) -> Result<Vec<Account>>;

    // passcodes

    /// Stores a passcode, dropping every earlier one of the same email.
    async fn replace_passcode(&self, record: &PasscodeRecord) -> Result<()>;

    /// Finds an unexpired passcode of the email with the given code.
    async fn find_passcode(
        &self,
        email: &str,
        otp: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<PasscodeRecord>>;

    // notes

    /// Increments the download counter of a note and appends the audit record.
    ///
    /// Returns `false` without recording anything if the note doesn't exist.
    async fn record_download(&self, download: &NoteDownload) -> Result<bool>;

    async fn downloads_of(&self, user: &str) -> Result<Vec<NoteDownload>>;

    async fn top_notes(&self, limit: usize) -> Result<Vec<PopularNote>>;

    // elections

    /// Every election, newest first.
    async fn elections(&self) -> Result<Vec<Election>>;

    async fn set_election_open(&self, id: &str, open: bool, at: DateTime<Utc>) -> Result<bool>;

    /// Marks a candidate of a position as a winner.
    async fn declare_winner(
        &self,
        election: &str,
        position: &str,
        candidate: &str,
        at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Inserts a vote unless the voter already voted for the position.
    async fn insert_vote(&self, vote: &Vote) -> Result<bool>;

    async fn delete_votes(&self, election: &str) -> Result<u64>;

    async fn votes_of(&self, user: &str) -> Result<Vec<Vote>>;

    /// Vote counts grouped by position and candidate.
    async fn tally(&self, election: &str) -> Result<Vec<VoteTally>>;

    async fn count_open_elections(&self) -> Result<u64>;

    async fn open_elections(&self) -> Result<Vec<ActiveElection>>;
}

impl Document for Account {
    const COLLECTION: &'static str = "users";

    #[inline]
    fn id(&self) -> &str {
        &self.id
    }
}

impl Document for PasscodeRecord {
    const COLLECTION: &'static str = "otps";

    #[inline]
    fn id(&self) -> &str {
        &self.id
    }
}

impl Document for NoteDownload {
    const COLLECTION: &'static str = "note_downloads";

    #[inline]
    fn id(&self) -> &str {
        &self.id
    }
}

impl Document for Election {
    const COLLECTION: &'static str = "elections";

    #[inline]
    fn id(&self) -> &str {
        &self.id
    }
}

impl Document for Vote {
    const COLLECTION: &'static str = "votes";

    #[inline]
    fn id(&self) -> &str {
        &self.id
    }
}

impl Document for Note {
    const COLLECTION: &'static str = "notes";

    #[inline]
    fn id(&self) -> &str {
        &self.id
    }
}

impl Content for Note {
    const NAME: &'static str = "Note";
    const SEARCH_FIELDS: &'static [&'static str] = &["title", "description", "course"];

    fn facets(&self) -> Option<Facets<'_>> {
        Some(Facets {
            course: &self.course,
            course_code: &self.course_code,
            level: self.level,
            semester: &self.semester,
        })
    }

    fn searchable(&self) -> Vec<&str> {
        vec![&self.title, &self.description, &self.course]
    }

    fn sort_key(&self, field: SortField) -> SortKey<'_> {
        match field {
            SortField::CreatedAt => SortKey::Int(self.created_at.timestamp_millis()),
            SortField::UpdatedAt => SortKey::Int(self.updated_at.timestamp_millis()),
            SortField::Title => SortKey::Text(&self.title),
            SortField::CourseCode => SortKey::Text(&self.course_code),
            SortField::Level => SortKey::Int(self.level.get().into()),
            SortField::DownloadCount => SortKey::Int(self.download_count as i64),
            SortField::Year => SortKey::Missing,
        }
    }
}

impl Document for PastQuestion {
    const COLLECTION: &'static str = "pastquestions";

    #[inline]
    fn id(&self) -> &str {
        &self.id
    }
}

impl Content for PastQuestion {
    const NAME: &'static str = "Past question";
    const SEARCH_FIELDS: &'static [&'static str] = &["title", "description", "course"];

    fn facets(&self) -> Option<Facets<'_>> {
        Some(Facets {
            course: &self.course,
            course_code: &self.course_code,
            level: self.level,
            semester: &self.semester,
        })
    }

    fn searchable(&self) -> Vec<&str> {
        vec![&self.title, &self.description, &self.course]
    }

    fn sort_key(&self, field: SortField) -> SortKey<'_> {
        match field {
            SortField::CreatedAt => SortKey::Int(self.created_at.timestamp_millis()),
            SortField::UpdatedAt => SortKey::Int(self.updated_at.timestamp_millis()),
            SortField::Title => SortKey::Text(&self.title),
            SortField::CourseCode => SortKey::Text(&self.course_code),
            SortField::Level => SortKey::Int(self.level.get().into()),
            SortField::Year => SortKey::Int(self.year.into()),
            SortField::DownloadCount => SortKey::Missing,
        }
    }
}

impl Document for Announcement {
    const COLLECTION: &'static str = "announcements";

    #[inline]
    fn id(&self) -> &str {
        &self.id
    }
}

impl Content for Announcement {
    const NAME: &'static str = "Announcement";
    const SEARCH_FIELDS: &'static [&'static str] = &["title", "content"];

    #[inline]
    fn facets(&self) -> Option<Facets<'_>> {
        None
    }

    fn searchable(&self) -> Vec<&str> {
        vec![&self.title, &self.content]
    }

    fn sort_key(&self, field: SortField) -> SortKey<'_> {
        match field {
            SortField::CreatedAt => SortKey::Int(self.created_at.timestamp_millis()),
            SortField::UpdatedAt => SortKey::Int(self.updated_at.timestamp_millis()),
            SortField::Title => SortKey::Text(&self.title),
            _ => SortKey::Missing,
        }
    }
}
