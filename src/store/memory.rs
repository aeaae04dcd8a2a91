use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use mongodb::bson;
use portal_shared::{
    account::{Level, Role},
    content::{
        handle::{ContentQuery, SortOrder},
        Note, NoteDownload,
    },
    election::{Election, ElectionStatus, Vote, VoteTally},
    stats::{ActiveElection, PopularNote},
};

use super::{Content, Document, Result, Store};
use crate::account::{Account, PasscodeRecord};

/// A process-local store.
///
/// Documents go through the same BSON encoding as in [`super::MongoStore`],
/// keyed by collection name.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: DashMap<&'static str, Vec<bson::Document>>,
}

impl MemoryStore {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every document of a collection, in insertion order.
    pub fn all<T: Document>(&self) -> Result<Vec<T>> {
        self.collections.get(T::COLLECTION).map_or(Ok(vec![]), |docs| {
            docs.iter()
                .map(|doc| bson::from_document(doc.clone()).map_err(From::from))
                .collect()
        })
    }

    /// Runs `f` over a whole collection with it locked, then writes it back.
    fn write<T: Document, R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> Result<R> {
        let mut entry = self.collections.entry(T::COLLECTION).or_default();
        let mut docs = entry
            .iter()
            .map(|doc| bson::from_document(doc.clone()))
            .collect::<std::result::Result<Vec<T>, _>>()?;
        let ret = f(&mut docs);
        *entry = docs
            .iter()
            .map(bson::to_document)
            .collect::<std::result::Result<_, _>>()?;
        Ok(ret)
    }
}

#[async_trait]
impl Store for MemoryStore {
    #[inline]
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn get<T: Document>(&self, id: &str) -> Result<Option<T>> {
        Ok(self.all::<T>()?.into_iter().find(|doc| doc.id() == id))
    }

    async fn insert<T: Document>(&self, doc: &T) -> Result<()> {
        let doc = bson::to_document(doc)?;
        self.collections.entry(T::COLLECTION).or_default().push(doc);
        Ok(())
    }

    async fn replace<T: Document>(&self, doc: &T) -> Result<bool> {
        let encoded = bson::to_document(doc)?;
        self.write::<T, _>(|docs| -> Result<bool> {
            let Some(pos) = docs.iter().position(|d| d.id() == doc.id()) else {
                return Ok(false);
            };
            docs[pos] = bson::from_document(encoded)?;
            Ok(true)
        })?
    }

    async fn delete<T: Document>(&self, id: &str) -> Result<bool> {
        self.write::<T, _>(|docs| {
            let len = docs.len();
            docs.retain(|doc| doc.id() != id);
            docs.len() != len
        })
    }

    async fn count<T: Document>(&self) -> Result<u64> {
        Ok(self
            .collections
            .get(T::COLLECTION)
            .map_or(0, |docs| docs.len() as u64))
    }

    async fn list<T: Content>(&self, query: &ContentQuery) -> Result<Vec<T>> {
        let mut docs: Vec<T> = self
            .all::<T>()?
            .into_iter()
            .filter(|doc| doc.matches(query))
            .collect();
        docs.sort_by(|a, b| {
            let ord = a.sort_key(query.sort_by).cmp(&b.sort_key(query.sort_by));
            match query.sort_order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
        Ok(docs)
    }

    async fn insert_account(&self, account: &Account) -> Result<bool> {
        let encoded = bson::to_document(account)?;
        self.write::<Account, _>(|docs| -> Result<bool> {
            if docs.iter().any(|a| a.email == account.email) {
                return Ok(false);
            }
            docs.push(bson::from_document(encoded)?);
            Ok(true)
        })?
    }

    async fn account_by_email(&self, email: &str) -> Result<Option<Account>> {
        Ok(self
            .all::<Account>()?
            .into_iter()
            .find(|account| account.email == email))
    }

    async fn set_password(&self, account: &Account, at: DateTime<Utc>) -> Result<bool> {
        self.write::<Account, _>(|docs| {
            docs.iter_mut()
                .find(|a| a.id == account.id)
                .map(|a| {
                    a.password = account.password.clone();
                    a.updated_at = at;
                })
                .is_some()
        })
    }

    async fn set_profile_picture(&self, id: &str, url: &str, at: DateTime<Utc>) -> Result<bool> {
        self.write::<Account, _>(|docs| {
            docs.iter_mut()
                .find(|a| a.id == id)
                .map(|a| {
                    a.profile_picture = url.to_owned();
                    a.updated_at = at;
                })
                .is_some()
        })
    }

    async fn students(&self, level: Option<Level>) -> Result<Vec<Account>> {
        Ok(self
            .all::<Account>()?
            .into_iter()
            .filter(|a| a.role == Role::Student && level.map_or(true, |l| a.level == l))
            .collect())
    }

    async fn replace_passcode(&self, record: &PasscodeRecord) -> Result<()> {
        let encoded = bson::to_document(record)?;
        self.write::<PasscodeRecord, _>(|docs| -> Result<()> {
            docs.retain(|r| r.email != record.email);
            docs.push(bson::from_document(encoded)?);
            Ok(())
        })?
    }

    async fn find_passcode(
        &self,
        email: &str,
        otp: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<PasscodeRecord>> {
        Ok(self.all::<PasscodeRecord>()?.into_iter().find(|r| {
            r.email == email && r.otp.to_string() == otp && !r.is_expired(now)
        }))
    }

    async fn record_download(&self, download: &NoteDownload) -> Result<bool> {
        let found = self.write::<Note, _>(|notes| {
            notes
                .iter_mut()
                .find(|n| n.id == download.note_id)
                .map(|n| n.download_count += 1)
                .is_some()
        })?;
        if found {
            self.insert(download).await?;
        }
        Ok(found)
    }

    async fn downloads_of(&self, user: &str) -> Result<Vec<NoteDownload>> {
        let mut downloads: Vec<NoteDownload> = self
            .all::<NoteDownload>()?
            .into_iter()
            .filter(|d| d.user_id == user)
            .collect();
        downloads.sort_by(|a, b| b.download_at.cmp(&a.download_at));
        Ok(downloads)
    }

    async fn top_notes(&self, limit: usize) -> Result<Vec<PopularNote>> {
        let mut notes = self.all::<Note>()?;
        notes.sort_by(|a, b| b.download_count.cmp(&a.download_count));
        Ok(notes
            .into_iter()
            .take(limit)
            .map(|n| PopularNote {
                id: n.id,
                title: n.title,
                course_code: n.course_code,
                download_count: n.download_count,
            })
            .collect())
    }

    async fn elections(&self) -> Result<Vec<Election>> {
        let mut elections = self.all::<Election>()?;
        elections.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(elections)
    }

    async fn set_election_open(&self, id: &str, open: bool, at: DateTime<Utc>) -> Result<bool> {
        self.write::<Election, _>(|docs| {
            docs.iter_mut()
                .find(|e| e.id == id)
                .map(|e| {
                    e.is_open = open;
                    e.status = if open {
                        ElectionStatus::Open
                    } else {
                        ElectionStatus::Closed
                    };
                    e.updated_at = at;
                })
                .is_some()
        })
    }

    async fn declare_winner(
        &self,
        election: &str,
        position: &str,
        candidate: &str,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        self.write::<Election, _>(|docs| {
            let Some(e) = docs.iter_mut().find(|e| e.id == election) else {
                return false;
            };
            let Some(c) = e
                .positions
                .iter_mut()
                .filter(|p| p.id == position)
                .flat_map(|p| p.candidates.iter_mut())
                .find(|c| c.id == candidate)
            else {
                return false;
            };
            c.is_winner = true;
            e.updated_at = at;
            true
        })
    }

    async fn insert_vote(&self, vote: &Vote) -> Result<bool> {
        let encoded = bson::to_document(vote)?;
        self.write::<Vote, _>(|docs| -> Result<bool> {
            if docs.iter().any(|v| {
                v.election_id == vote.election_id
                    && v.position_id == vote.position_id
                    && v.user_id == vote.user_id
            }) {
                return Ok(false);
            }
            docs.push(bson::from_document(encoded)?);
            Ok(true)
        })?
    }

    async fn delete_votes(&self, election: &str) -> Result<u64> {
        self.write::<Vote, _>(|docs| {
            let len = docs.len();
            docs.retain(|v| v.election_id != election);
            (len - docs.len()) as u64
        })
    }

    async fn votes_of(&self, user: &str) -> Result<Vec<Vote>> {
        Ok(self
            .all::<Vote>()?
            .into_iter()
            .filter(|v| v.user_id == user)
            .collect())
    }

    async fn tally(&self, election: &str) -> Result<Vec<VoteTally>> {
        let mut counts = BTreeMap::<(String, String), u64>::new();
        for vote in self
            .all::<Vote>()?
            .into_iter()
            .filter(|v| v.election_id == election)
        {
            *counts
                .entry((vote.position_id, vote.candidate_id))
                .or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|((position_id, candidate_id), count)| VoteTally {
                position_id,
                candidate_id,
                count,
            })
            .collect())
    }

    async fn count_open_elections(&self) -> Result<u64> {
        Ok(self
            .all::<Election>()?
            .iter()
            .filter(|e| e.status == ElectionStatus::Open)
            .count() as u64)
    }

    async fn open_elections(&self) -> Result<Vec<ActiveElection>> {
        let votes = self.all::<Vote>()?;
        Ok(self
            .all::<Election>()?
            .into_iter()
            .filter(|e| e.status == ElectionStatus::Open)
            .map(|e| ActiveElection {
                vote_count: votes.iter().filter(|v| v.election_id == e.id).count() as u64,
                id: e.id,
                title: e.title,
                positions: e.positions,
            })
            .collect())
    }
}
