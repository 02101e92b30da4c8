//! The in-memory entity store.
//!
//! All collections live in one `Store` value with an explicit lifecycle:
//! constructed empty for tests, seeded from the bundled fixtures at process
//! start, optionally restored from / written to a JSON snapshot file. There
//! is no ambient module state; every caller holds the store it mutates.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::models::{Certificate, Chapter, College, Meeting, Membership, Point, User};

/// Last id handed out per collection. Ids are sequential decimal strings,
/// allocated monotonically; nothing is ever deleted, so they never collide.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct NextIds {
    college: u64,
    user: u64,
    chapter: u64,
    meeting: u64,
    membership: u64,
    point: u64,
    certificate: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Store {
    pub colleges: Vec<College>,
    pub users: Vec<User>,
    pub chapters: Vec<Chapter>,
    pub meetings: Vec<Meeting>,
    pub memberships: Vec<Membership>,
    pub points: Vec<Point>,
    pub certificates: Vec<Certificate>,
    #[serde(default)]
    next_ids: NextIds,
}

impl Store {
    /// An empty store. Used by tests and by deployments that start with no
    /// seed data.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded from the fixture files bundled with the binary.
    pub fn seed() -> anyhow::Result<Self> {
        let mut store = Store {
            colleges: serde_json::from_str(include_str!("../data/colleges.json"))?,
            users: serde_json::from_str(include_str!("../data/users.json"))?,
            chapters: serde_json::from_str(include_str!("../data/chapters.json"))?,
            meetings: serde_json::from_str(include_str!("../data/meetings.json"))?,
            memberships: serde_json::from_str(include_str!("../data/memberships.json"))?,
            points: serde_json::from_str(include_str!("../data/points.json"))?,
            certificates: serde_json::from_str(include_str!("../data/certificates.json"))?,
            next_ids: NextIds::default(),
        };
        store.next_ids = NextIds {
            college: max_id(store.colleges.iter().map(|c| c.id.as_str())),
            user: max_id(store.users.iter().map(|u| u.id.as_str())),
            chapter: max_id(store.chapters.iter().map(|c| c.id.as_str())),
            meeting: max_id(store.meetings.iter().map(|m| m.id.as_str())),
            membership: max_id(store.memberships.iter().map(|m| m.id.as_str())),
            point: max_id(store.points.iter().map(|p| p.id.as_str())),
            certificate: max_id(store.certificates.iter().map(|c| c.id.as_str())),
        };
        Ok(store)
    }

    /// Restore a store from a snapshot written by [`Store::save_snapshot`].
    pub fn load_snapshot(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Write the entire store to `path` as JSON. Best effort only; the
    /// snapshot carries no durability guarantee.
    pub fn save_snapshot(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn next_college_id(&mut self) -> String {
        self.next_ids.college += 1;
        self.next_ids.college.to_string()
    }

    pub fn next_user_id(&mut self) -> String {
        self.next_ids.user += 1;
        self.next_ids.user.to_string()
    }

    pub fn next_chapter_id(&mut self) -> String {
        self.next_ids.chapter += 1;
        self.next_ids.chapter.to_string()
    }

    pub fn next_meeting_id(&mut self) -> String {
        self.next_ids.meeting += 1;
        self.next_ids.meeting.to_string()
    }

    pub fn next_membership_id(&mut self) -> String {
        self.next_ids.membership += 1;
        self.next_ids.membership.to_string()
    }

    pub fn next_point_id(&mut self) -> String {
        self.next_ids.point += 1;
        self.next_ids.point.to_string()
    }

    pub fn next_certificate_id(&mut self) -> String {
        self.next_ids.certificate += 1;
        self.next_ids.certificate.to_string()
    }
}

fn max_id<'a>(ids: impl Iterator<Item = &'a str>) -> u64 {
    ids.filter_map(|id| id.parse::<u64>().ok()).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MembershipStatus;

    #[test]
    fn test_seed_parses_fixtures() {
        let store = Store::seed().unwrap();
        assert!(!store.colleges.is_empty());
        assert!(!store.users.is_empty());
        assert!(!store.chapters.is_empty());
    }

    #[test]
    fn test_seed_caches_match_ledger() {
        let store = Store::seed().unwrap();
        for membership in &store.memberships {
            let ledger_sum: i64 = store
                .points
                .iter()
                .filter(|p| p.user_id == membership.user_id && p.chapter_id == membership.chapter_id)
                .map(|p| p.points)
                .sum();
            assert_eq!(
                membership.points, ledger_sum,
                "membership {} cache drifted from ledger",
                membership.id
            );
        }
        for chapter in &store.chapters {
            let approved = store
                .memberships
                .iter()
                .filter(|m| {
                    m.chapter_id == chapter.id
                        && m.status == MembershipStatus::Approved
                        && m.is_active
                })
                .count() as u32;
            assert_eq!(
                chapter.total_members, approved,
                "chapter {} member count cache drifted",
                chapter.id
            );
        }
    }

    #[test]
    fn test_id_allocation_continues_after_seed() {
        let mut store = Store::seed().unwrap();
        let seeded = store.colleges.len() as u64;
        let id = store.next_college_id();
        assert_eq!(id, (seeded + 1).to_string());
        assert!(store.colleges.iter().all(|c| c.id != id));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let store = Store::seed().unwrap();
        let path = std::env::temp_dir().join("chapter-hub-snapshot-test.json");
        store.save_snapshot(&path).unwrap();
        let restored = Store::load_snapshot(&path).unwrap();
        assert_eq!(restored.colleges.len(), store.colleges.len());
        assert_eq!(restored.memberships.len(), store.memberships.len());
        let _ = std::fs::remove_file(&path);
    }
}
