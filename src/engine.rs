//! Lifecycle engine: state transitions and their side effects.
//!
//! Every operation mutates the store synchronously and returns a typed
//! result. A failed precondition (wrong starting state, stale version,
//! duplicate, missing entity) leaves the store untouched. Side effects that
//! must move together, such as a ledger append and its membership cache
//! update, happen inside the same call, so callers holding the store lock
//! get them atomically.

use chrono::{Datelike, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::password;
use crate::error::{EngineError, Result};
use crate::models::{
    CERTIFICATE_LADDER, Certificate, Chapter, ChapterStatus, College, Feedback, Meeting,
    MeetingRoles, MeetingStatus, Membership, MembershipRole, MembershipStatus, Point, PointType,
    User, UserRole,
};
use crate::store::Store;

#[derive(Debug, Deserialize)]
pub struct NewCollege {
    pub name: String,
    pub city: String,
    pub district: String,
    pub short_name: Option<String>,
    pub website: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub established: Option<i32>,
    pub affiliation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<UserRole>,
    pub college_id: String,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub semester: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewChapter {
    pub name: String,
    pub college_id: String,
    pub description: Option<String>,
    pub admin_id: Option<String>,
    pub meeting_day: Option<String>,
    pub meeting_time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewMeeting {
    pub chapter_id: String,
    pub title: String,
    pub agenda: Option<String>,
    pub description: Option<String>,
    pub date_time: chrono::DateTime<Utc>,
    pub duration_minutes: Option<u32>,
    pub roles: Option<MeetingRoles>,
}

#[derive(Debug, Deserialize)]
pub struct AwardPoints {
    pub user_id: String,
    pub chapter_id: String,
    #[serde(rename = "type")]
    pub point_type: PointType,
    /// Required for the bonus types, must match the table for fixed types
    /// when given.
    pub amount: Option<i64>,
    pub awarded_by: String,
    pub meeting_id: Option<String>,
    pub description: Option<String>,
}

fn ensure_version(
    entity: &'static str,
    id: &str,
    actual: u64,
    expected: Option<u64>,
) -> Result<()> {
    match expected {
        Some(expected) if expected != actual => Err(EngineError::Conflict {
            entity,
            id: id.to_string(),
            expected,
            actual,
        }),
        _ => Ok(()),
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EngineError::ValidationError(format!("{field} is required")));
    }
    Ok(())
}

impl Store {
    pub fn create_college(&mut self, req: NewCollege) -> Result<College> {
        require("name", &req.name)?;
        require("city", &req.city)?;
        require("district", &req.district)?;

        let now = Utc::now();
        let college = College {
            id: self.next_college_id(),
            // Initials of the name when no short name was given.
            short_name: req.short_name.unwrap_or_else(|| {
                req.name
                    .split_whitespace()
                    .filter_map(|word| word.chars().next())
                    .collect::<String>()
                    .to_uppercase()
            }),
            name: req.name,
            city: req.city,
            district: req.district,
            website: req.website,
            kind: req.kind.unwrap_or_else(|| "Unknown".to_string()),
            established: req.established.unwrap_or_else(|| now.year()),
            affiliation: req.affiliation.unwrap_or_else(|| "Unknown".to_string()),
        };
        self.colleges.push(college.clone());
        Ok(college)
    }

    pub fn register_user(&mut self, req: NewUser) -> Result<User> {
        require("name", &req.name)?;
        require("email", &req.email)?;
        require("password", &req.password)?;
        if self.college_by_id(&req.college_id).is_none() {
            return Err(EngineError::not_found("college", &req.college_id));
        }
        if self.user_by_email(&req.email).is_some() {
            return Err(EngineError::DuplicateEntity(format!(
                "user with email {} already exists",
                req.email
            )));
        }

        let now = Utc::now();
        let user = User {
            id: self.next_user_id(),
            name: req.name,
            email: req.email,
            password_hash: password::hash_password(&req.password),
            role: req.role.unwrap_or(UserRole::Member),
            college_id: req.college_id,
            bio: req.bio,
            phone: req.phone,
            semester: req.semester,
            department: req.department,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.users.push(user.clone());
        Ok(user)
    }

    // ------------------------------------------------------------------
    // Chapter lifecycle: pending -> active | deactivated
    // ------------------------------------------------------------------

    pub fn create_chapter(&mut self, req: NewChapter) -> Result<Chapter> {
        require("name", &req.name)?;
        if self.college_by_id(&req.college_id).is_none() {
            return Err(EngineError::not_found("college", &req.college_id));
        }
        if let Some(admin_id) = &req.admin_id {
            if self.user_by_id(admin_id).is_none() {
                return Err(EngineError::not_found("user", admin_id));
            }
        }

        let now = Utc::now();
        let chapter = Chapter {
            id: self.next_chapter_id(),
            name: req.name,
            college_id: req.college_id,
            description: req.description,
            status: ChapterStatus::Pending,
            admin_id: req.admin_id,
            founded_date: None,
            meeting_day: req.meeting_day,
            meeting_time: req.meeting_time,
            total_members: 0,
            rejection_reason: None,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        self.chapters.push(chapter.clone());
        Ok(chapter)
    }

    pub fn approve_chapter(&mut self, id: &str, expected_version: Option<u64>) -> Result<Chapter> {
        let chapter = self
            .chapters
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| EngineError::not_found("chapter", id))?;
        ensure_version("chapter", id, chapter.version, expected_version)?;
        if chapter.status != ChapterStatus::Pending {
            return Err(EngineError::InvalidStateTransition(format!(
                "chapter {id} cannot be approved from {:?} state",
                chapter.status
            )));
        }

        let now = Utc::now();
        chapter.status = ChapterStatus::Active;
        chapter.founded_date = Some(now);
        chapter.version += 1;
        chapter.updated_at = now;
        Ok(chapter.clone())
    }

    pub fn reject_chapter(
        &mut self,
        id: &str,
        reason: Option<String>,
        expected_version: Option<u64>,
    ) -> Result<Chapter> {
        let chapter = self
            .chapters
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| EngineError::not_found("chapter", id))?;
        ensure_version("chapter", id, chapter.version, expected_version)?;
        if chapter.status != ChapterStatus::Pending {
            return Err(EngineError::InvalidStateTransition(format!(
                "chapter {id} cannot be rejected from {:?} state",
                chapter.status
            )));
        }

        chapter.status = ChapterStatus::Deactivated;
        chapter.rejection_reason = reason;
        chapter.version += 1;
        chapter.updated_at = Utc::now();
        Ok(chapter.clone())
    }

    // ------------------------------------------------------------------
    // Membership lifecycle: pending -> approved | rejected
    // ------------------------------------------------------------------

    pub fn request_membership(&mut self, user_id: &str, chapter_id: &str) -> Result<Membership> {
        if self.user_by_id(user_id).is_none() {
            return Err(EngineError::not_found("user", user_id));
        }
        let chapter = self
            .chapter_by_id(chapter_id)
            .ok_or_else(|| EngineError::not_found("chapter", chapter_id))?;
        if chapter.status != ChapterStatus::Active {
            return Err(EngineError::InvalidStateTransition(format!(
                "chapter {chapter_id} is not accepting members in {:?} state",
                chapter.status
            )));
        }
        // One membership per (user, chapter), whatever its state. Rejected
        // memberships are not resubmittable.
        if self
            .memberships
            .iter()
            .any(|m| m.user_id == user_id && m.chapter_id == chapter_id)
        {
            return Err(EngineError::DuplicateEntity(format!(
                "membership already exists for user {user_id} in chapter {chapter_id}"
            )));
        }

        let now = Utc::now();
        let membership = Membership {
            id: self.next_membership_id(),
            user_id: user_id.to_string(),
            chapter_id: chapter_id.to_string(),
            status: MembershipStatus::Pending,
            role: MembershipRole::Member,
            joined_at: None,
            approved_by: None,
            approved_at: None,
            is_active: false,
            points: 0,
            attendance_rate: 0.0,
            last_meeting_attended: None,
            rejection_reason: None,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        self.memberships.push(membership.clone());
        Ok(membership)
    }

    pub fn approve_membership(
        &mut self,
        id: &str,
        approved_by: &str,
        expected_version: Option<u64>,
    ) -> Result<Membership> {
        let idx = self
            .memberships
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| EngineError::not_found("membership", id))?;
        ensure_version("membership", id, self.memberships[idx].version, expected_version)?;
        if self.memberships[idx].status != MembershipStatus::Pending {
            return Err(EngineError::InvalidStateTransition(format!(
                "membership {id} cannot be approved from {:?} state",
                self.memberships[idx].status
            )));
        }

        let now = Utc::now();
        let membership = &mut self.memberships[idx];
        membership.status = MembershipStatus::Approved;
        membership.approved_by = Some(approved_by.to_string());
        membership.approved_at = Some(now);
        membership.joined_at = Some(now);
        membership.is_active = true;
        membership.version += 1;
        membership.updated_at = now;
        let chapter_id = membership.chapter_id.clone();

        // Keep the chapter's member count in step within the same mutation.
        if let Some(chapter) = self.chapters.iter_mut().find(|c| c.id == chapter_id) {
            chapter.total_members += 1;
            chapter.updated_at = now;
        }
        Ok(self.memberships[idx].clone())
    }

    pub fn reject_membership(
        &mut self,
        id: &str,
        approved_by: &str,
        reason: Option<String>,
        expected_version: Option<u64>,
    ) -> Result<Membership> {
        let membership = self
            .memberships
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| EngineError::not_found("membership", id))?;
        ensure_version("membership", id, membership.version, expected_version)?;
        if membership.status != MembershipStatus::Pending {
            return Err(EngineError::InvalidStateTransition(format!(
                "membership {id} cannot be rejected from {:?} state",
                membership.status
            )));
        }

        let now = Utc::now();
        membership.status = MembershipStatus::Rejected;
        membership.approved_by = Some(approved_by.to_string());
        membership.approved_at = Some(now);
        membership.rejection_reason = reason;
        membership.version += 1;
        membership.updated_at = now;
        Ok(membership.clone())
    }

    // ------------------------------------------------------------------
    // Points ledger
    // ------------------------------------------------------------------

    /// Append a ledger entry and bring the membership points cache back in
    /// step with the ledger in the same call.
    pub fn award_points(&mut self, req: AwardPoints) -> Result<Point> {
        if self.user_by_id(&req.user_id).is_none() {
            return Err(EngineError::not_found("user", &req.user_id));
        }
        if self.chapter_by_id(&req.chapter_id).is_none() {
            return Err(EngineError::not_found("chapter", &req.chapter_id));
        }
        if let Some(meeting_id) = &req.meeting_id {
            if self.meeting_by_id(meeting_id).is_none() {
                return Err(EngineError::not_found("meeting", meeting_id));
            }
        }
        let membership_idx = self
            .memberships
            .iter()
            .position(|m| {
                m.user_id == req.user_id
                    && m.chapter_id == req.chapter_id
                    && m.status == MembershipStatus::Approved
                    && m.is_active
            })
            .ok_or_else(|| {
                EngineError::ValidationError(format!(
                    "user {} has no active membership in chapter {}",
                    req.user_id, req.chapter_id
                ))
            })?;

        let amount = match (req.point_type.fixed_amount(), req.amount) {
            (Some(fixed), None) => fixed,
            (Some(fixed), Some(given)) if given == fixed => fixed,
            (Some(fixed), Some(given)) => {
                return Err(EngineError::ValidationError(format!(
                    "amount {given} does not match the fixed amount {fixed} for this point type"
                )));
            }
            (None, Some(given)) if given > 0 => given,
            (None, _) => {
                return Err(EngineError::ValidationError(
                    "this point type requires an explicit positive amount".to_string(),
                ));
            }
        };

        let now = Utc::now();
        let point = Point {
            id: self.next_point_id(),
            user_id: req.user_id.clone(),
            chapter_id: req.chapter_id.clone(),
            points: amount,
            point_type: req.point_type,
            description: req.description,
            meeting_id: req.meeting_id.clone(),
            awarded_by: req.awarded_by,
            awarded_at: now,
            created_at: now,
        };
        self.points.push(point.clone());

        let total = self.chapter_points_for_user(&req.user_id, &req.chapter_id);
        let membership = &mut self.memberships[membership_idx];
        membership.points = total;
        membership.updated_at = now;
        if req.point_type == PointType::MeetingAttendance {
            if let Some(meeting_id) = req.meeting_id {
                membership.last_meeting_attended = Some(meeting_id);
            }
        }
        Ok(point)
    }

    // ------------------------------------------------------------------
    // Certificates
    // ------------------------------------------------------------------

    /// Issue every certificate tier whose threshold the user's chapter-scoped
    /// points total has crossed and which is not already held. Idempotent:
    /// re-evaluating with unchanged points issues nothing.
    pub fn evaluate_certificates(
        &mut self,
        user_id: &str,
        chapter_id: &str,
        issued_by: &str,
    ) -> Result<Vec<Certificate>> {
        if self.user_by_id(user_id).is_none() {
            return Err(EngineError::not_found("user", user_id));
        }
        if self.chapter_by_id(chapter_id).is_none() {
            return Err(EngineError::not_found("chapter", chapter_id));
        }

        let total = self.chapter_points_for_user(user_id, chapter_id);
        let mut issued = Vec::new();
        for tier in CERTIFICATE_LADDER {
            if total < tier.threshold() {
                break;
            }
            let already_held = self.certificates.iter().any(|c| {
                c.user_id == user_id
                    && c.chapter_id == chapter_id
                    && c.cert_type == tier
                    && c.is_active
            });
            if already_held {
                continue;
            }

            let now = Utc::now();
            let tag = Uuid::new_v4().simple().to_string();
            let certificate = Certificate {
                id: self.next_certificate_id(),
                user_id: user_id.to_string(),
                chapter_id: chapter_id.to_string(),
                cert_type: tier,
                title: tier.title().to_string(),
                description: format!(
                    "Awarded for achieving {}+ participation points",
                    tier.threshold()
                ),
                points_threshold: tier.threshold(),
                points_earned: total,
                certificate_number: format!(
                    "CH-{}-{}",
                    now.year(),
                    tag[..8].to_uppercase()
                ),
                issued_date: now,
                issued_by: issued_by.to_string(),
                is_active: true,
                created_at: now,
            };
            self.certificates.push(certificate.clone());
            issued.push(certificate);
        }
        Ok(issued)
    }

    // ------------------------------------------------------------------
    // Meetings
    // ------------------------------------------------------------------

    pub fn create_meeting(&mut self, req: NewMeeting) -> Result<Meeting> {
        require("title", &req.title)?;
        let chapter = self
            .chapter_by_id(&req.chapter_id)
            .ok_or_else(|| EngineError::not_found("chapter", &req.chapter_id))?;
        if chapter.status != ChapterStatus::Active {
            return Err(EngineError::InvalidStateTransition(format!(
                "chapter {} cannot schedule meetings in {:?} state",
                req.chapter_id, chapter.status
            )));
        }

        let now = Utc::now();
        let meeting = Meeting {
            id: self.next_meeting_id(),
            chapter_id: req.chapter_id,
            title: req.title,
            agenda: req.agenda,
            description: req.description,
            date_time: req.date_time,
            duration_minutes: req.duration_minutes.unwrap_or(60),
            status: MeetingStatus::Upcoming,
            roles: req.roles.unwrap_or_default(),
            feedback: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.meetings.push(meeting.clone());
        Ok(meeting)
    }

    pub fn submit_feedback(
        &mut self,
        meeting_id: &str,
        user_id: &str,
        rating: u8,
        comment: String,
    ) -> Result<Meeting> {
        if self.user_by_id(user_id).is_none() {
            return Err(EngineError::not_found("user", user_id));
        }
        if !(1..=5).contains(&rating) {
            return Err(EngineError::ValidationError(
                "rating must be between 1 and 5".to_string(),
            ));
        }
        let meeting = self
            .meetings
            .iter_mut()
            .find(|m| m.id == meeting_id)
            .ok_or_else(|| EngineError::not_found("meeting", meeting_id))?;
        if meeting.status == MeetingStatus::Cancelled {
            return Err(EngineError::InvalidStateTransition(format!(
                "meeting {meeting_id} is cancelled and does not accept feedback"
            )));
        }
        if meeting.feedback.iter().any(|f| f.user_id == user_id) {
            return Err(EngineError::DuplicateEntity(format!(
                "user {user_id} has already submitted feedback for meeting {meeting_id}"
            )));
        }

        let now = Utc::now();
        meeting.feedback.push(Feedback {
            user_id: user_id.to_string(),
            rating,
            comment,
            submitted_at: now,
        });
        meeting.updated_at = now;
        Ok(meeting.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CertificateType;

    fn college(store: &mut Store) -> String {
        store
            .create_college(NewCollege {
                name: "Test Engineering College".to_string(),
                city: "Kochi".to_string(),
                district: "Ernakulam".to_string(),
                short_name: None,
                website: None,
                kind: None,
                established: Some(1990),
                affiliation: None,
            })
            .unwrap()
            .id
    }

    fn user(store: &mut Store, email: &str, college_id: &str) -> String {
        store
            .register_user(NewUser {
                name: "Test User".to_string(),
                email: email.to_string(),
                password: "secret123".to_string(),
                role: None,
                college_id: college_id.to_string(),
                bio: None,
                phone: None,
                semester: None,
                department: None,
            })
            .unwrap()
            .id
    }

    fn pending_chapter(store: &mut Store, college_id: &str) -> String {
        store
            .create_chapter(NewChapter {
                name: "Test Chapter".to_string(),
                college_id: college_id.to_string(),
                description: None,
                admin_id: None,
                meeting_day: Some("Saturday".to_string()),
                meeting_time: None,
            })
            .unwrap()
            .id
    }

    /// Store with one active chapter and one approved member in it.
    fn store_with_member() -> (Store, String, String) {
        let mut store = Store::new();
        let college_id = college(&mut store);
        let user_id = user(&mut store, "member@test.edu", &college_id);
        let chapter_id = pending_chapter(&mut store, &college_id);
        store.approve_chapter(&chapter_id, None).unwrap();
        let membership = store.request_membership(&user_id, &chapter_id).unwrap();
        store.approve_membership(&membership.id, "admin", None).unwrap();
        (store, user_id, chapter_id)
    }

    fn award(store: &mut Store, user_id: &str, chapter_id: &str, point_type: PointType) {
        store
            .award_points(AwardPoints {
                user_id: user_id.to_string(),
                chapter_id: chapter_id.to_string(),
                point_type,
                amount: None,
                awarded_by: "admin".to_string(),
                meeting_id: None,
                description: None,
            })
            .unwrap();
    }

    #[test]
    fn test_approve_chapter_sets_active_and_founded_date() {
        let mut store = Store::new();
        let college_id = college(&mut store);
        let chapter_id = pending_chapter(&mut store, &college_id);

        let chapter = store.approve_chapter(&chapter_id, None).unwrap();
        assert_eq!(chapter.status, ChapterStatus::Active);
        assert!(chapter.founded_date.is_some());
        assert_eq!(chapter.version, 2);
    }

    #[test]
    fn test_approve_chapter_twice_fails_without_change() {
        let mut store = Store::new();
        let college_id = college(&mut store);
        let chapter_id = pending_chapter(&mut store, &college_id);
        store.approve_chapter(&chapter_id, None).unwrap();

        let err = store.approve_chapter(&chapter_id, None).unwrap_err();
        assert!(matches!(err, EngineError::InvalidStateTransition(_)));
        assert_eq!(
            store.chapter_by_id(&chapter_id).unwrap().status,
            ChapterStatus::Active
        );
    }

    #[test]
    fn test_reject_after_approve_fails() {
        let mut store = Store::new();
        let college_id = college(&mut store);
        let chapter_id = pending_chapter(&mut store, &college_id);
        store.approve_chapter(&chapter_id, None).unwrap();

        let err = store.reject_chapter(&chapter_id, None, None).unwrap_err();
        assert!(matches!(err, EngineError::InvalidStateTransition(_)));
    }

    #[test]
    fn test_reject_chapter_records_reason() {
        let mut store = Store::new();
        let college_id = college(&mut store);
        let chapter_id = pending_chapter(&mut store, &college_id);

        let chapter = store
            .reject_chapter(&chapter_id, Some("No faculty advisor".to_string()), None)
            .unwrap();
        assert_eq!(chapter.status, ChapterStatus::Deactivated);
        assert_eq!(chapter.rejection_reason.as_deref(), Some("No faculty advisor"));
    }

    #[test]
    fn test_stale_version_is_rejected_before_transition() {
        let mut store = Store::new();
        let college_id = college(&mut store);
        let chapter_id = pending_chapter(&mut store, &college_id);

        let err = store.approve_chapter(&chapter_id, Some(99)).unwrap_err();
        assert!(matches!(err, EngineError::Conflict { .. }));
        assert_eq!(
            store.chapter_by_id(&chapter_id).unwrap().status,
            ChapterStatus::Pending
        );
    }

    #[test]
    fn test_concurrent_membership_decisions_exclude_each_other() {
        let mut store = Store::new();
        let college_id = college(&mut store);
        let user_id = user(&mut store, "a@test.edu", &college_id);
        let chapter_id = pending_chapter(&mut store, &college_id);
        store.approve_chapter(&chapter_id, None).unwrap();
        let membership = store.request_membership(&user_id, &chapter_id).unwrap();

        // Two admins read version 1; the second decision must lose.
        store
            .approve_membership(&membership.id, "admin-a", Some(1))
            .unwrap();
        let err = store
            .reject_membership(&membership.id, "admin-b", None, Some(1))
            .unwrap_err();
        assert!(matches!(err, EngineError::Conflict { .. }));
        assert_eq!(
            store.membership_by_id(&membership.id).unwrap().status,
            MembershipStatus::Approved
        );
    }

    #[test]
    fn test_membership_approval_sets_fields_and_member_count() {
        let (store, user_id, chapter_id) = store_with_member();
        let memberships = store.memberships_by_user(&user_id);
        let membership = &memberships[0];
        assert_eq!(membership.status, MembershipStatus::Approved);
        assert!(membership.is_active);
        assert!(membership.joined_at.is_some());
        assert_eq!(membership.approved_by.as_deref(), Some("admin"));
        assert_eq!(store.chapter_by_id(&chapter_id).unwrap().total_members, 1);
    }

    #[test]
    fn test_membership_reject_records_reason() {
        let mut store = Store::new();
        let college_id = college(&mut store);
        let user_id = user(&mut store, "b@test.edu", &college_id);
        let chapter_id = pending_chapter(&mut store, &college_id);
        store.approve_chapter(&chapter_id, None).unwrap();
        let membership = store.request_membership(&user_id, &chapter_id).unwrap();

        let rejected = store
            .reject_membership(
                &membership.id,
                "admin",
                Some("Chapter capacity reached".to_string()),
                None,
            )
            .unwrap();
        assert_eq!(rejected.status, MembershipStatus::Rejected);
        assert_eq!(
            rejected.rejection_reason.as_deref(),
            Some("Chapter capacity reached")
        );
        assert!(!rejected.is_active);
        assert_eq!(store.chapter_by_id(&chapter_id).unwrap().total_members, 0);
    }

    #[test]
    fn test_duplicate_membership_is_rejected() {
        let (mut store, user_id, chapter_id) = store_with_member();
        let err = store.request_membership(&user_id, &chapter_id).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateEntity(_)));
        assert_eq!(store.memberships_by_user(&user_id).len(), 1);
    }

    #[test]
    fn test_membership_requires_active_chapter() {
        let mut store = Store::new();
        let college_id = college(&mut store);
        let user_id = user(&mut store, "c@test.edu", &college_id);
        let chapter_id = pending_chapter(&mut store, &college_id);

        let err = store.request_membership(&user_id, &chapter_id).unwrap_err();
        assert!(matches!(err, EngineError::InvalidStateTransition(_)));
    }

    #[test]
    fn test_award_points_updates_ledger_and_cache() {
        let (mut store, user_id, chapter_id) = store_with_member();
        award(&mut store, &user_id, &chapter_id, PointType::MeetingAttendance);
        award(&mut store, &user_id, &chapter_id, PointType::SpeakerRole);
        award(&mut store, &user_id, &chapter_id, PointType::AnchorRole);

        assert_eq!(store.total_points_for_user(&user_id), 50);
        assert_eq!(store.chapter_points_for_user(&user_id, &chapter_id), 50);
        assert_eq!(store.memberships_by_user(&user_id)[0].points, 50);
        assert_eq!(store.points_by_user(&user_id).len(), 3);
    }

    #[test]
    fn test_award_rejects_mismatched_fixed_amount() {
        let (mut store, user_id, chapter_id) = store_with_member();
        let err = store
            .award_points(AwardPoints {
                user_id: user_id.clone(),
                chapter_id: chapter_id.clone(),
                point_type: PointType::MeetingAttendance,
                amount: Some(500),
                awarded_by: "admin".to_string(),
                meeting_id: None,
                description: None,
            })
            .unwrap_err();
        assert!(matches!(err, EngineError::ValidationError(_)));
        assert!(store.points_by_user(&user_id).is_empty());
    }

    #[test]
    fn test_bonus_award_requires_explicit_amount() {
        let (mut store, user_id, chapter_id) = store_with_member();
        let err = store
            .award_points(AwardPoints {
                user_id: user_id.clone(),
                chapter_id: chapter_id.clone(),
                point_type: PointType::AdminBonus,
                amount: None,
                awarded_by: "admin".to_string(),
                meeting_id: None,
                description: None,
            })
            .unwrap_err();
        assert!(matches!(err, EngineError::ValidationError(_)));

        let point = store
            .award_points(AwardPoints {
                user_id: user_id.clone(),
                chapter_id,
                point_type: PointType::AdminBonus,
                amount: Some(30),
                awarded_by: "admin".to_string(),
                meeting_id: None,
                description: Some("Organized the district meetup".to_string()),
            })
            .unwrap();
        assert_eq!(point.points, 30);
        assert_eq!(point.awarded_by, "admin");
    }

    #[test]
    fn test_award_requires_active_membership() {
        let mut store = Store::new();
        let college_id = college(&mut store);
        let user_id = user(&mut store, "d@test.edu", &college_id);
        let chapter_id = pending_chapter(&mut store, &college_id);
        store.approve_chapter(&chapter_id, None).unwrap();

        let err = store
            .award_points(AwardPoints {
                user_id,
                chapter_id,
                point_type: PointType::MeetingAttendance,
                amount: None,
                awarded_by: "admin".to_string(),
                meeting_id: None,
                description: None,
            })
            .unwrap_err();
        assert!(matches!(err, EngineError::ValidationError(_)));
    }

    #[test]
    fn test_attendance_award_tracks_last_meeting() {
        let (mut store, user_id, chapter_id) = store_with_member();
        let meeting = store
            .create_meeting(NewMeeting {
                chapter_id: chapter_id.clone(),
                title: "Weekly Circle".to_string(),
                agenda: None,
                description: None,
                date_time: Utc::now(),
                duration_minutes: None,
                roles: None,
            })
            .unwrap();

        store
            .award_points(AwardPoints {
                user_id: user_id.clone(),
                chapter_id,
                point_type: PointType::MeetingAttendance,
                amount: None,
                awarded_by: "admin".to_string(),
                meeting_id: Some(meeting.id.clone()),
                description: None,
            })
            .unwrap();
        assert_eq!(
            store.memberships_by_user(&user_id)[0]
                .last_meeting_attended
                .as_deref(),
            Some(meeting.id.as_str())
        );
    }

    #[test]
    fn test_certificate_threshold_walkthrough() {
        let (mut store, user_id, chapter_id) = store_with_member();

        // 60 points: below the bronze threshold, nothing is issued.
        for _ in 0..6 {
            award(&mut store, &user_id, &chapter_id, PointType::MeetingAttendance);
        }
        let issued = store
            .evaluate_certificates(&user_id, &chapter_id, "admin")
            .unwrap();
        assert!(issued.is_empty());

        // 110 points: exactly one bronze.
        for _ in 0..5 {
            award(&mut store, &user_id, &chapter_id, PointType::MeetingAttendance);
        }
        let issued = store
            .evaluate_certificates(&user_id, &chapter_id, "admin")
            .unwrap();
        assert_eq!(issued.len(), 1);
        assert_eq!(issued[0].cert_type, CertificateType::Bronze);
        assert_eq!(issued[0].points_threshold, 100);
        assert_eq!(issued[0].points_earned, 110);

        // Re-evaluating with unchanged points issues nothing.
        let issued = store
            .evaluate_certificates(&user_id, &chapter_id, "admin")
            .unwrap();
        assert!(issued.is_empty());
        assert_eq!(store.certificates_by_user(&user_id).len(), 1);
    }

    #[test]
    fn test_certificate_jump_issues_every_crossed_tier() {
        let (mut store, user_id, chapter_id) = store_with_member();
        store
            .award_points(AwardPoints {
                user_id: user_id.clone(),
                chapter_id: chapter_id.clone(),
                point_type: PointType::AdminBonus,
                amount: Some(250),
                awarded_by: "admin".to_string(),
                meeting_id: None,
                description: Some("Retroactive transfer from previous system".to_string()),
            })
            .unwrap();

        let issued = store
            .evaluate_certificates(&user_id, &chapter_id, "admin")
            .unwrap();
        let tiers: Vec<CertificateType> = issued.iter().map(|c| c.cert_type).collect();
        assert_eq!(tiers, vec![CertificateType::Bronze, CertificateType::Silver]);
    }

    #[test]
    fn test_certificates_are_chapter_scoped() {
        let (mut store, user_id, chapter_a) = store_with_member();
        let college_id = store.chapters[0].college_id.clone();
        let chapter_b = pending_chapter(&mut store, &college_id);
        store.approve_chapter(&chapter_b, None).unwrap();
        let membership = store.request_membership(&user_id, &chapter_b).unwrap();
        store.approve_membership(&membership.id, "admin", None).unwrap();

        // 120 points in chapter A, 20 in chapter B.
        store
            .award_points(AwardPoints {
                user_id: user_id.clone(),
                chapter_id: chapter_a.clone(),
                point_type: PointType::AdminBonus,
                amount: Some(120),
                awarded_by: "admin".to_string(),
                meeting_id: None,
                description: None,
            })
            .unwrap();
        award(&mut store, &user_id, &chapter_b, PointType::JudgeRole);

        let issued_a = store
            .evaluate_certificates(&user_id, &chapter_a, "admin")
            .unwrap();
        assert_eq!(issued_a.len(), 1);
        let issued_b = store
            .evaluate_certificates(&user_id, &chapter_b, "admin")
            .unwrap();
        assert!(
            issued_b.is_empty(),
            "points earned in another chapter must not count here"
        );
    }

    #[test]
    fn test_feedback_rules() {
        let (mut store, user_id, chapter_id) = store_with_member();
        let meeting = store
            .create_meeting(NewMeeting {
                chapter_id,
                title: "Debate Night".to_string(),
                agenda: None,
                description: None,
                date_time: Utc::now(),
                duration_minutes: Some(90),
                roles: None,
            })
            .unwrap();

        let err = store
            .submit_feedback(&meeting.id, &user_id, 6, "great".to_string())
            .unwrap_err();
        assert!(matches!(err, EngineError::ValidationError(_)));

        store
            .submit_feedback(&meeting.id, &user_id, 5, "Great session".to_string())
            .unwrap();
        let err = store
            .submit_feedback(&meeting.id, &user_id, 4, "again".to_string())
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateEntity(_)));
        assert_eq!(store.meeting_by_id(&meeting.id).unwrap().feedback.len(), 1);
    }

    #[test]
    fn test_duplicate_email_registration_fails() {
        let mut store = Store::new();
        let college_id = college(&mut store);
        user(&mut store, "dup@test.edu", &college_id);
        let err = store
            .register_user(NewUser {
                name: "Second".to_string(),
                email: "dup@test.edu".to_string(),
                password: "other456".to_string(),
                role: None,
                college_id,
                bio: None,
                phone: None,
                semester: None,
                department: None,
            })
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateEntity(_)));
    }

    #[test]
    fn test_college_short_name_derived_from_initials() {
        let mut store = Store::new();
        let created = store
            .create_college(NewCollege {
                name: "Government Engineering College Thrissur".to_string(),
                city: "Thrissur".to_string(),
                district: "Thrissur".to_string(),
                short_name: None,
                website: None,
                kind: None,
                established: None,
                affiliation: None,
            })
            .unwrap();
        assert_eq!(created.short_name, "GECT");
    }
}
