//! Election assembly and validation.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use portal_shared::{
    account::Level,
    election::{handle::ElectionDescriptor, Election, ElectionKind, ElectionStatus, Position},
};

use crate::{store, Error};

/// Builds the stored form of an election from what an admin sent.
///
/// Positions and candidates without an id are given one, duplicated ids
/// are rejected.
pub fn assemble(
    desc: ElectionDescriptor,
    id: String,
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<Election, Error> {
    if desc.title.trim().is_empty() {
        return Err(Error::MalformedRequest("title is required".to_owned()));
    }
    match desc.election_type {
        ElectionKind::General if desc.target_level != 0 => {
            return Err(Error::InvalidElection(
                "general elections have no target level".to_owned(),
            ))
        }
        ElectionKind::LevelBased if Level::try_from(desc.target_level).is_err() => {
            return Err(Error::InvalidElection(format!(
                "invalid target level {}",
                desc.target_level
            )))
        }
        _ => (),
    }
    if (desc.status == ElectionStatus::Open) != desc.is_open {
        return Err(Error::InvalidElection(format!(
            "status {} disagrees with isOpen {}",
            desc.status.as_str(),
            desc.is_open
        )));
    }
    if let (Some(start), Some(end)) = (desc.start_date, desc.end_date) {
        if end < start {
            return Err(Error::InvalidElection(
                "end date precedes start date".to_owned(),
            ));
        }
    }

    let mut positions = desc.positions;
    assign_ids(&mut positions)?;

    Ok(Election {
        id,
        title: desc.title,
        description: desc.description,
        status: desc.status,
        is_open: desc.is_open,
        election_type: desc.election_type,
        target_level: desc.target_level,
        start_date: desc.start_date,
        end_date: desc.end_date,
        positions,
        created_at,
        updated_at: now,
    })
}

fn assign_ids(positions: &mut [Position]) -> Result<(), Error> {
    let mut position_ids = HashSet::new();
    let mut candidate_ids = HashSet::new();
    for position in positions {
        if position.title.trim().is_empty() {
            return Err(Error::InvalidElection("position title is required".to_owned()));
        }
        if position.id.is_empty() {
            position.id = store::new_id();
        }
        if !position_ids.insert(position.id.clone()) {
            return Err(Error::InvalidElection(format!(
                "duplicated position id {}",
                position.id
            )));
        }
        for candidate in &mut position.candidates {
            if candidate.id.is_empty() {
                candidate.id = store::new_id();
            }
            if !candidate_ids.insert(candidate.id.clone()) {
                return Err(Error::InvalidElection(format!(
                    "duplicated candidate id {}",
                    candidate.id
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use portal_shared::election::Candidate;

    use super::*;

    fn desc(positions: Vec<Position>) -> ElectionDescriptor {
        ElectionDescriptor {
            title: "SRC 2024".to_owned(),
            positions,
            ..Default::default()
        }
    }

    fn position(id: &str, candidates: &[&str]) -> Position {
        Position {
            id: id.to_owned(),
            title: "President".to_owned(),
            candidates: candidates
                .iter()
                .map(|id| Candidate {
                    id: (*id).to_owned(),
                    name: "Candidate".to_owned(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn generated_ids() {
        let now = Utc::now();
        let election = assemble(
            desc(vec![position("", &["", ""]), position("vp", &["c1"])]),
            "e1".to_owned(),
            now,
            now,
        )
        .unwrap();
        let first = &election.positions[0];
        assert_eq!(first.id.len(), 24);
        assert_ne!(first.candidates[0].id, first.candidates[1].id);
        assert_eq!(election.positions[1].id, "vp");
        assert_eq!(election.positions[1].candidates[0].id, "c1");
    }

    #[test]
    fn duplicated_ids() {
        let now = Utc::now();
        assert!(matches!(
            assemble(
                desc(vec![position("p", &[]), position("p", &[])]),
                "e1".to_owned(),
                now,
                now
            ),
            Err(Error::InvalidElection(_))
        ));
        assert!(matches!(
            assemble(
                desc(vec![position("p1", &["c"]), position("p2", &["c"])]),
                "e1".to_owned(),
                now,
                now
            ),
            Err(Error::InvalidElection(_))
        ));
    }

    #[test]
    fn target_level() {
        let now = Utc::now();
        let mut d = desc(vec![]);
        d.election_type = ElectionKind::LevelBased;
        d.target_level = 250;
        assert!(assemble(d.clone(), "e".to_owned(), now, now).is_err());
        d.target_level = 300;
        assert!(assemble(d, "e".to_owned(), now, now).is_ok());
    }

    #[test]
    fn open_flag_matches_status() {
        let now = Utc::now();
        let mut d = desc(vec![]);
        d.status = ElectionStatus::Open;
        assert!(matches!(
            assemble(d.clone(), "e".to_owned(), now, now),
            Err(Error::InvalidElection(_))
        ));
        d.is_open = true;
        let election = assemble(d.clone(), "e".to_owned(), now, now).unwrap();
        assert!(election.is_open);
        assert_eq!(election.status, ElectionStatus::Open);

        d.status = ElectionStatus::Closed;
        assert!(assemble(d.clone(), "e".to_owned(), now, now).is_err());
        d.is_open = false;
        assert!(assemble(d, "e".to_owned(), now, now).is_ok());
    }
}
