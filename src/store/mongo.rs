use std::{future::Future, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::{
    bson::{self, doc, Bson},
    error::{ErrorKind, WriteFailure},
    options::{FindOptions, IndexOptions, UpdateOptions},
    Collection, Database, IndexModel,
};
use portal_shared::{
    account::{Level, Role},
    content::{
        handle::{ContentQuery, SortOrder},
        Announcement, Note, NoteDownload, PastQuestion,
    },
    election::{Election, ElectionStatus, Vote, VoteTally},
    stats::{ActiveElection, PopularNote},
};
use serde::Deserialize;
use tracing::info;

use super::{Content, Document, Error, Result, Store};
use crate::account::{Account, PasscodeRecord};

const SINGLE_TIMEOUT: Duration = Duration::from_secs(5);
const LIST_TIMEOUT: Duration = Duration::from_secs(10);

/// Code of a duplicate key write error.
const DUPLICATE_KEY: i32 = 11000;

/// Bounds a database operation by a timeout.
async fn timed<T>(
    limit: Duration,
    fut: impl Future<Output = mongodb::error::Result<T>>,
) -> Result<T> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| Error::Timeout)?
        .map_err(From::from)
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        *err.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref e)) if e.code == DUPLICATE_KEY
    )
}

/// A store backed by a MongoDB database.
#[derive(Debug, Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// Connects to the database and checks it answers.
    pub async fn connect(uri: &str, db: &str) -> Result<Self> {
        let client = timed(LIST_TIMEOUT, mongodb::Client::with_uri_str(uri)).await?;
        let this = Self {
            db: client.database(db),
        };
        this.ping().await?;
        info!("connected to database {db}");
        Ok(this)
    }

    #[inline]
    fn collection<T: Document>(&self) -> Collection<T> {
        self.db.collection(T::COLLECTION)
    }

    /// Creates the indexes the store relies on for uniqueness.
    pub async fn ensure_indexes(&self) -> Result<()> {
        async fn unique_id<T: Document>(this: &MongoStore) -> Result<()> {
            timed(
                LIST_TIMEOUT,
                this.collection::<T>().create_index(
                    IndexModel::builder()
                        .keys(doc! { "id": 1 })
                        .options(IndexOptions::builder().unique(true).build())
                        .build(),
                    None,
                ),
            )
            .await
            .map(drop)
        }

        unique_id::<Account>(self).await?;
        unique_id::<PasscodeRecord>(self).await?;
        unique_id::<Note>(self).await?;
        unique_id::<NoteDownload>(self).await?;
        unique_id::<PastQuestion>(self).await?;
        unique_id::<Announcement>(self).await?;
        unique_id::<Election>(self).await?;
        unique_id::<Vote>(self).await?;

        timed(
            LIST_TIMEOUT,
            self.collection::<Account>().create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
                None,
            ),
        )
        .await?;
        timed(
            LIST_TIMEOUT,
            self.collection::<Vote>().create_index(
                IndexModel::builder()
                    .keys(doc! { "electionId": 1, "positionId": 1, "userId": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
                None,
            ),
        )
        .await?;
        timed(
            LIST_TIMEOUT,
            self.collection::<PasscodeRecord>().create_index(
                IndexModel::builder().keys(doc! { "email": 1 }).build(),
                None,
            ),
        )
        .await?;

        info!("database indexes ensured");
        Ok(())
    }

    async fn find<T: Document>(
        &self,
        filter: bson::Document,
        options: impl Into<Option<FindOptions>>,
    ) -> Result<Vec<T>> {
        let options = options.into();
        timed(LIST_TIMEOUT, async move {
            let cursor = self.collection::<T>().find(filter, options).await?;
            cursor.try_collect::<Vec<T>>().await
        })
        .await
    }

    async fn aggregate<T: serde::de::DeserializeOwned>(
        &self,
        collection: &str,
        pipeline: Vec<bson::Document>,
    ) -> Result<Vec<T>> {
        let docs: Vec<bson::Document> = timed(LIST_TIMEOUT, async move {
            let cursor = self
                .db
                .collection::<bson::Document>(collection)
                .aggregate(pipeline, None)
                .await?;
            cursor.try_collect::<Vec<_>>().await
        })
        .await?;
        docs.into_iter()
            .map(|doc| bson::from_document(doc).map_err(From::from))
            .collect()
    }

    async fn set(&self, collection: &str, id: &str, fields: bson::Document) -> Result<bool> {
        let res = timed(
            SINGLE_TIMEOUT,
            self.db
                .collection::<bson::Document>(collection)
                .update_one(doc! { "id": id }, doc! { "$set": fields }, None),
        )
        .await?;
        Ok(res.matched_count > 0)
    }

    /// Inserts a document, `false` when a unique index rejected it.
    async fn insert_unique<T: Document>(&self, doc: &T) -> Result<bool> {
        match tokio::time::timeout(SINGLE_TIMEOUT, self.collection::<T>().insert_one(doc, None))
            .await
            .map_err(|_| Error::Timeout)?
        {
            Ok(_) => Ok(true),
            Err(err) if is_duplicate_key(&err) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

/// Builds the filter document of a content query.
fn content_filter<T: Content>(query: &ContentQuery) -> bson::Document {
    let mut filter = bson::Document::new();
    for (key, value) in [
        ("course", &query.course),
        ("courseCode", &query.course_code),
        ("semester", &query.semester),
    ] {
        if let Some(value) = value {
            filter.insert(key, value.as_str());
        }
    }
    if let Some(level) = query.level {
        filter.insert("level", i32::from(level.get()));
    }
    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = regex::escape(search);
        let any: Vec<Bson> = T::SEARCH_FIELDS
            .iter()
            .map(|field| {
                let mut clause = bson::Document::new();
                clause.insert(*field, doc! { "$regex": pattern.as_str(), "$options": "i" });
                Bson::Document(clause)
            })
            .collect();
        filter.insert("$or", any);
    }
    filter
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TallyKey {
    position_id: String,
    candidate_id: String,
}

#[derive(Deserialize)]
struct TallyRow {
    #[serde(rename = "_id")]
    key: TallyKey,
    count: i64,
}

#[async_trait]
impl Store for MongoStore {
    async fn ping(&self) -> Result<()> {
        timed(SINGLE_TIMEOUT, self.db.run_command(doc! { "ping": 1 }, None))
            .await
            .map(drop)
    }

    async fn get<T: Document>(&self, id: &str) -> Result<Option<T>> {
        timed(
            SINGLE_TIMEOUT,
            self.collection::<T>().find_one(doc! { "id": id }, None),
        )
        .await
    }

    async fn insert<T: Document>(&self, doc: &T) -> Result<()> {
        timed(SINGLE_TIMEOUT, self.collection::<T>().insert_one(doc, None))
            .await
            .map(drop)
    }

    async fn replace<T: Document>(&self, doc: &T) -> Result<bool> {
        let res = timed(
            SINGLE_TIMEOUT,
            self.collection::<T>()
                .replace_one(doc! { "id": doc.id() }, doc, None),
        )
        .await?;
        Ok(res.matched_count > 0)
    }

    async fn delete<T: Document>(&self, id: &str) -> Result<bool> {
        let res = timed(
            SINGLE_TIMEOUT,
            self.collection::<T>().delete_one(doc! { "id": id }, None),
        )
        .await?;
        Ok(res.deleted_count > 0)
    }

    async fn count<T: Document>(&self) -> Result<u64> {
        timed(
            LIST_TIMEOUT,
            self.collection::<T>().count_documents(None, None),
        )
        .await
    }

    async fn list<T: Content>(&self, query: &ContentQuery) -> Result<Vec<T>> {
        let mut sort = bson::Document::new();
        sort.insert(
            query.sort_by.as_str(),
            match query.sort_order {
                SortOrder::Asc => 1,
                SortOrder::Desc => -1,
            },
        );
        self.find(
            content_filter::<T>(query),
            FindOptions::builder().sort(sort).build(),
        )
        .await
    }

    async fn insert_account(&self, account: &Account) -> Result<bool> {
        self.insert_unique(account).await
    }

    async fn account_by_email(&self, email: &str) -> Result<Option<Account>> {
        timed(
            SINGLE_TIMEOUT,
            self.collection::<Account>()
                .find_one(doc! { "email": email }, None),
        )
        .await
    }

    async fn set_password(&self, account: &Account, at: DateTime<Utc>) -> Result<bool> {
        self.set(
            Account::COLLECTION,
            &account.id,
            doc! {
                "password": bson::to_bson(&account.password)?,
                "updatedAt": at.timestamp_millis(),
            },
        )
        .await
    }

    async fn set_profile_picture(&self, id: &str, url: &str, at: DateTime<Utc>) -> Result<bool> {
        self.set(
            Account::COLLECTION,
            id,
            doc! { "profilePicture": url, "updatedAt": at.timestamp_millis() },
        )
        .await
    }

    async fn students(&self, level: Option<Level>) -> Result<Vec<Account>> {
        let mut filter = doc! { "role": Role::Student.as_str() };
        if let Some(level) = level {
            filter.insert("level", i32::from(level.get()));
        }
        self.find(filter, None).await
    }

    async fn replace_passcode(&self, record: &PasscodeRecord) -> Result<()> {
        timed(
            SINGLE_TIMEOUT,
            self.collection::<PasscodeRecord>()
                .delete_many(doc! { "email": &record.email }, None),
        )
        .await?;
        self.insert(record).await
    }

    async fn find_passcode(
        &self,
        email: &str,
        otp: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<PasscodeRecord>> {
        timed(
            SINGLE_TIMEOUT,
            self.collection::<PasscodeRecord>().find_one(
                doc! {
                    "email": email,
                    "otp": otp,
                    "expiresAt": { "$gt": now.timestamp_millis() },
                },
                None,
            ),
        )
        .await
    }

    async fn record_download(&self, download: &NoteDownload) -> Result<bool> {
        let res = timed(
            SINGLE_TIMEOUT,
            self.collection::<Note>().update_one(
                doc! { "id": &download.note_id },
                doc! { "$inc": { "downloadCount": 1_i64 } },
                None,
            ),
        )
        .await?;
        if res.matched_count == 0 {
            return Ok(false);
        }
        self.insert(download).await?;
        Ok(true)
    }

    async fn downloads_of(&self, user: &str) -> Result<Vec<NoteDownload>> {
        self.find(
            doc! { "userId": user },
            FindOptions::builder().sort(doc! { "downloadAt": -1 }).build(),
        )
        .await
    }

    async fn top_notes(&self, limit: usize) -> Result<Vec<PopularNote>> {
        self.aggregate(
            Note::COLLECTION,
            vec![
                doc! { "$sort": { "downloadCount": -1 } },
                doc! { "$limit": limit as i64 },
                doc! { "$project": {
                    "_id": 0,
                    "id": 1,
                    "title": 1,
                    "courseCode": 1,
                    "downloadCount": 1,
                } },
            ],
        )
        .await
    }

    async fn elections(&self) -> Result<Vec<Election>> {
        self.find(
            doc! {},
            FindOptions::builder().sort(doc! { "createdAt": -1 }).build(),
        )
        .await
    }

    async fn set_election_open(&self, id: &str, open: bool, at: DateTime<Utc>) -> Result<bool> {
        let status = if open {
            ElectionStatus::Open
        } else {
            ElectionStatus::Closed
        };
        self.set(
            Election::COLLECTION,
            id,
            doc! {
                "isOpen": open,
                "status": status.as_str(),
                "updatedAt": at.timestamp_millis(),
            },
        )
        .await
    }

    async fn declare_winner(
        &self,
        election: &str,
        position: &str,
        candidate: &str,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let res = timed(
            SINGLE_TIMEOUT,
            self.collection::<Election>().update_one(
                doc! {
                    "id": election,
                    "positions": { "$elemMatch": {
                        "id": position,
                        "candidates.id": candidate,
                    } },
                },
                doc! { "$set": {
                    "positions.$[p].candidates.$[c].isWinner": true,
                    "updatedAt": at.timestamp_millis(),
                } },
                UpdateOptions::builder()
                    .array_filters(vec![doc! { "p.id": position }, doc! { "c.id": candidate }])
                    .build(),
            ),
        )
        .await?;
        Ok(res.matched_count > 0)
    }

    async fn insert_vote(&self, vote: &Vote) -> Result<bool> {
        self.insert_unique(vote).await
    }

    async fn delete_votes(&self, election: &str) -> Result<u64> {
        let res = timed(
            LIST_TIMEOUT,
            self.collection::<Vote>()
                .delete_many(doc! { "electionId": election }, None),
        )
        .await?;
        Ok(res.deleted_count)
    }

    async fn votes_of(&self, user: &str) -> Result<Vec<Vote>> {
        self.find(
            doc! { "userId": user },
            FindOptions::builder().sort(doc! { "votedAt": -1 }).build(),
        )
        .await
    }

    async fn tally(&self, election: &str) -> Result<Vec<VoteTally>> {
        let rows: Vec<TallyRow> = self
            .aggregate(
                Vote::COLLECTION,
                vec![
                    doc! { "$match": { "electionId": election } },
                    doc! { "$group": {
                        "_id": { "positionId": "$positionId", "candidateId": "$candidateId" },
                        "count": { "$sum": 1 },
                    } },
                    doc! { "$sort": { "_id.positionId": 1, "_id.candidateId": 1 } },
                ],
            )
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| VoteTally {
                position_id: row.key.position_id,
                candidate_id: row.key.candidate_id,
                count: row.count.max(0) as u64,
            })
            .collect())
    }

    async fn count_open_elections(&self) -> Result<u64> {
        timed(
            LIST_TIMEOUT,
            self.collection::<Election>().count_documents(
                doc! { "status": ElectionStatus::Open.as_str() },
                None,
            ),
        )
        .await
    }

    async fn open_elections(&self) -> Result<Vec<ActiveElection>> {
        self.aggregate(
            Election::COLLECTION,
            vec![
                doc! { "$match": { "status": ElectionStatus::Open.as_str() } },
                doc! { "$lookup": {
                    "from": Vote::COLLECTION,
                    "localField": "id",
                    "foreignField": "electionId",
                    "as": "votes",
                } },
                doc! { "$project": {
                    "_id": 0,
                    "id": 1,
                    "title": 1,
                    "positions": 1,
                    "voteCount": { "$size": "$votes" },
                } },
            ],
        )
        .await
    }
}
