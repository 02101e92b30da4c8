//! Read-only derived views over the [`Store`].
//!
//! Filters preserve the insertion order of the underlying collection; no
//! sorting is applied anywhere in this layer.

use serde::Serialize;

use crate::models::{
    CERTIFICATE_LADDER, Certificate, CertificateType, Chapter, ChapterStatus, College, Meeting,
    MeetingStatus, Membership, MembershipStatus, Point, User,
};
use crate::store::Store;

impl Store {
    pub fn college_by_id(&self, id: &str) -> Option<&College> {
        self.colleges.iter().find(|c| c.id == id)
    }

    pub fn user_by_id(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email == email)
    }

    pub fn chapter_by_id(&self, id: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == id)
    }

    pub fn meeting_by_id(&self, id: &str) -> Option<&Meeting> {
        self.meetings.iter().find(|m| m.id == id)
    }

    pub fn membership_by_id(&self, id: &str) -> Option<&Membership> {
        self.memberships.iter().find(|m| m.id == id)
    }

    pub fn chapters_by_college(&self, college_id: &str) -> Vec<Chapter> {
        self.chapters
            .iter()
            .filter(|c| c.college_id == college_id)
            .cloned()
            .collect()
    }

    pub fn meetings_by_chapter(&self, chapter_id: &str) -> Vec<Meeting> {
        self.meetings
            .iter()
            .filter(|m| m.chapter_id == chapter_id)
            .cloned()
            .collect()
    }

    pub fn upcoming_meetings(&self) -> Vec<Meeting> {
        self.meetings
            .iter()
            .filter(|m| m.status == MeetingStatus::Upcoming)
            .cloned()
            .collect()
    }

    pub fn completed_meetings(&self) -> Vec<Meeting> {
        self.meetings
            .iter()
            .filter(|m| m.status == MeetingStatus::Completed)
            .cloned()
            .collect()
    }

    pub fn memberships_by_user(&self, user_id: &str) -> Vec<Membership> {
        self.memberships
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn memberships_by_chapter(&self, chapter_id: &str) -> Vec<Membership> {
        self.memberships
            .iter()
            .filter(|m| m.chapter_id == chapter_id)
            .cloned()
            .collect()
    }

    pub fn pending_memberships(&self) -> Vec<Membership> {
        self.memberships
            .iter()
            .filter(|m| m.status == MembershipStatus::Pending)
            .cloned()
            .collect()
    }

    /// Case-insensitive substring search over name, short name, city and
    /// district. An empty query matches every college; callers that want
    /// "first N" behavior truncate the result themselves.
    pub fn search_colleges(&self, query: &str) -> Vec<College> {
        let needle = query.to_lowercase();
        self.colleges
            .iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&needle)
                    || c.short_name.to_lowercase().contains(&needle)
                    || c.city.to_lowercase().contains(&needle)
                    || c.district.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    pub fn points_by_user(&self, user_id: &str) -> Vec<Point> {
        self.points
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Ledger sum across all chapters, as the member dashboard shows it.
    pub fn total_points_for_user(&self, user_id: &str) -> i64 {
        self.points
            .iter()
            .filter(|p| p.user_id == user_id)
            .map(|p| p.points)
            .sum()
    }

    /// Ledger sum scoped to one chapter. Certificate evaluation uses this,
    /// matching the chapter scope of the certificates themselves.
    pub fn chapter_points_for_user(&self, user_id: &str, chapter_id: &str) -> i64 {
        self.points
            .iter()
            .filter(|p| p.user_id == user_id && p.chapter_id == chapter_id)
            .map(|p| p.points)
            .sum()
    }

    pub fn certificates_by_user(&self, user_id: &str) -> Vec<Certificate> {
        self.certificates
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn active_certificates_by_user(&self, user_id: &str) -> Vec<Certificate> {
        self.certificates
            .iter()
            .filter(|c| c.user_id == user_id && c.is_active)
            .cloned()
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct MemberDashboard {
    pub user_id: String,
    pub total_points: i64,
    pub next_certificate_level: Option<CertificateType>,
    pub points_to_next_certificate: i64,
    pub certificates: Vec<Certificate>,
    pub memberships: Vec<Membership>,
}

#[derive(Debug, Serialize)]
pub struct ChapterDashboard {
    pub chapter_id: String,
    pub total_members: u32,
    pub pending_requests: usize,
    pub total_points: i64,
    pub upcoming_meetings: usize,
    pub completed_meetings: usize,
}

#[derive(Debug, Serialize)]
pub struct DistrictStats {
    pub district: String,
    pub colleges: usize,
    pub active: usize,
    pub pending: usize,
}

#[derive(Debug, Serialize)]
pub struct NetworkDashboard {
    pub total_chapters: usize,
    pub active_chapters: usize,
    pub pending_chapters: usize,
    pub deactivated_chapters: usize,
    pub total_members: u32,
    pub districts: Vec<DistrictStats>,
}

impl Store {
    /// Progress view for one member: points total across chapters, the next
    /// certificate tier still out of reach, and everything already earned.
    pub fn member_dashboard(&self, user_id: &str) -> MemberDashboard {
        let total_points = self.total_points_for_user(user_id);
        let next = CERTIFICATE_LADDER
            .iter()
            .copied()
            .find(|t| total_points < t.threshold());
        MemberDashboard {
            user_id: user_id.to_string(),
            total_points,
            next_certificate_level: next,
            points_to_next_certificate: next.map(|t| t.threshold() - total_points).unwrap_or(0),
            certificates: self.active_certificates_by_user(user_id),
            memberships: self.memberships_by_user(user_id),
        }
    }

    pub fn chapter_dashboard(&self, chapter_id: &str) -> ChapterDashboard {
        let members = self.memberships_by_chapter(chapter_id);
        let meetings = self.meetings_by_chapter(chapter_id);
        ChapterDashboard {
            chapter_id: chapter_id.to_string(),
            total_members: members
                .iter()
                .filter(|m| m.status == MembershipStatus::Approved && m.is_active)
                .count() as u32,
            pending_requests: members
                .iter()
                .filter(|m| m.status == MembershipStatus::Pending)
                .count(),
            total_points: members.iter().map(|m| m.points).sum(),
            upcoming_meetings: meetings
                .iter()
                .filter(|m| m.status == MeetingStatus::Upcoming)
                .count(),
            completed_meetings: meetings
                .iter()
                .filter(|m| m.status == MeetingStatus::Completed)
                .count(),
        }
    }

    /// Network-wide view for the super admin: chapter totals by status and
    /// per-district college and chapter counts, in college insertion order.
    pub fn network_dashboard(&self) -> NetworkDashboard {
        let mut districts: Vec<DistrictStats> = Vec::new();
        for college in &self.colleges {
            match districts.iter_mut().find(|d| d.district == college.district) {
                Some(entry) => entry.colleges += 1,
                None => districts.push(DistrictStats {
                    district: college.district.clone(),
                    colleges: 1,
                    active: 0,
                    pending: 0,
                }),
            }
        }
        for chapter in &self.chapters {
            let Some(college) = self.college_by_id(&chapter.college_id) else {
                continue;
            };
            let Some(entry) = districts.iter_mut().find(|d| d.district == college.district)
            else {
                continue;
            };
            match chapter.status {
                ChapterStatus::Active => entry.active += 1,
                ChapterStatus::Pending => entry.pending += 1,
                ChapterStatus::Deactivated => {}
            }
        }

        NetworkDashboard {
            total_chapters: self.chapters.len(),
            active_chapters: self
                .chapters
                .iter()
                .filter(|c| c.status == ChapterStatus::Active)
                .count(),
            pending_chapters: self
                .chapters
                .iter()
                .filter(|c| c.status == ChapterStatus::Pending)
                .count(),
            deactivated_chapters: self
                .chapters
                .iter()
                .filter(|c| c.status == ChapterStatus::Deactivated)
                .count(),
            total_members: self.chapters.iter().map(|c| c.total_members).sum(),
            districts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_matches_name_case_insensitive() {
        let store = Store::seed().unwrap();
        let results = store.search_colleges("calicut");
        assert!(
            results.iter().any(|c| c.name == "National Institute of Technology Calicut"),
            "substring match on name should be case-insensitive"
        );
    }

    #[test]
    fn test_search_matches_district() {
        let store = Store::seed().unwrap();
        let results = store.search_colleges("ernakulam");
        assert!(results.len() >= 2);
        assert!(results.iter().all(|c| c.district == "Ernakulam"));
    }

    #[test]
    fn test_search_preserves_insertion_order() {
        let store = Store::seed().unwrap();
        let results = store.search_colleges("");
        let ids: Vec<&str> = results.iter().map(|c| c.id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort_by_key(|id| id.parse::<u64>().unwrap());
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_chapters_by_college() {
        let store = Store::seed().unwrap();
        for chapter in store.chapters_by_college("1") {
            assert_eq!(chapter.college_id, "1");
        }
    }

    #[test]
    fn test_total_points_sums_all_chapters() {
        let store = Store::seed().unwrap();
        for user in &store.users {
            let expected: i64 = store
                .points
                .iter()
                .filter(|p| p.user_id == user.id)
                .map(|p| p.points)
                .sum();
            assert_eq!(store.total_points_for_user(&user.id), expected);
        }
    }

    #[test]
    fn test_member_dashboard_progress() {
        let store = Store::seed().unwrap();
        // Seeded user 1 has 35 points, so bronze is next at 100.
        let dashboard = store.member_dashboard("1");
        assert_eq!(dashboard.total_points, 35);
        assert_eq!(
            dashboard.next_certificate_level,
            Some(CertificateType::Bronze)
        );
        assert_eq!(dashboard.points_to_next_certificate, 65);
    }

    #[test]
    fn test_network_dashboard_district_counts() {
        let store = Store::seed().unwrap();
        let dashboard = store.network_dashboard();
        let total_colleges: usize = dashboard.districts.iter().map(|d| d.colleges).sum();
        assert_eq!(total_colleges, store.colleges.len());
        let counted_active: usize = dashboard.districts.iter().map(|d| d.active).sum();
        assert_eq!(counted_active, dashboard.active_chapters);
    }
}
