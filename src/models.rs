use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct College {
    pub id: String,
    pub name: String,
    pub short_name: String,
    pub city: String,
    pub district: String,
    pub website: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub established: i32,
    pub affiliation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Member,
    Admin,
    SuperAdmin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Salted SHA-256 hash in `salt$digest` hex form. Never plaintext.
    pub password_hash: String,
    pub role: UserRole,
    pub college_id: String,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub semester: Option<String>,
    pub department: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChapterStatus {
    Pending,
    Active,
    Deactivated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    pub name: String,
    pub college_id: String,
    pub description: Option<String>,
    pub status: ChapterStatus,
    pub admin_id: Option<String>,
    pub founded_date: Option<DateTime<Utc>>,
    pub meeting_day: Option<String>,
    pub meeting_time: Option<String>,
    /// Count of approved, active memberships. Maintained by the engine
    /// inside the same mutation that changes membership state.
    pub total_members: u32,
    pub rejection_reason: Option<String>,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipRole {
    Member,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub id: String,
    pub user_id: String,
    pub chapter_id: String,
    pub status: MembershipStatus,
    pub role: MembershipRole,
    pub joined_at: Option<DateTime<Utc>>,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    /// Ledger sum for (user_id, chapter_id). Recomputed on every award.
    pub points: i64,
    pub attendance_rate: f32,
    pub last_meeting_attended: Option<String>,
    pub rejection_reason: Option<String>,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    Upcoming,
    Completed,
    Cancelled,
}

/// Role assignment for one meeting. Anchor and topic provider are single
/// slots; judges, speakers and listeners may be any number of members.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeetingRoles {
    pub anchor: Option<String>,
    pub topic_provider: Option<String>,
    #[serde(default)]
    pub judges: Vec<String>,
    #[serde(default)]
    pub speakers: Vec<String>,
    #[serde(default)]
    pub listeners: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub user_id: String,
    pub rating: u8,
    pub comment: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
    pub id: String,
    pub chapter_id: String,
    pub title: String,
    pub agenda: Option<String>,
    pub description: Option<String>,
    pub date_time: DateTime<Utc>,
    pub duration_minutes: u32,
    pub status: MeetingStatus,
    pub roles: MeetingRoles,
    #[serde(default)]
    pub feedback: Vec<Feedback>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointType {
    MeetingAttendance,
    SpeakerRole,
    AnchorRole,
    TopicProvider,
    JudgeRole,
    AdminBonus,
    FeedbackBonus,
    CertificateMilestone,
}

impl PointType {
    /// The fixed award amount for this type, or `None` for the bonus types
    /// that take an explicit, audited amount.
    pub fn fixed_amount(self) -> Option<i64> {
        match self {
            PointType::MeetingAttendance => Some(10),
            PointType::SpeakerRole => Some(15),
            PointType::AnchorRole => Some(25),
            PointType::TopicProvider => Some(20),
            PointType::JudgeRole => Some(20),
            PointType::FeedbackBonus => Some(5),
            PointType::AdminBonus | PointType::CertificateMilestone => None,
        }
    }
}

/// One append-only ledger entry. Ledger rows are never edited or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    pub id: String,
    pub user_id: String,
    pub chapter_id: String,
    pub points: i64,
    #[serde(rename = "type")]
    pub point_type: PointType,
    pub description: Option<String>,
    pub meeting_id: Option<String>,
    pub awarded_by: String,
    pub awarded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateType {
    Bronze,
    Silver,
    Gold,
}

/// Certificate tiers in ascending threshold order. Evaluation walks this
/// ladder and issues every crossed tier that is not already held.
pub const CERTIFICATE_LADDER: [CertificateType; 3] = [
    CertificateType::Bronze,
    CertificateType::Silver,
    CertificateType::Gold,
];

impl CertificateType {
    pub fn threshold(self) -> i64 {
        match self {
            CertificateType::Bronze => 100,
            CertificateType::Silver => 200,
            CertificateType::Gold => 300,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            CertificateType::Bronze => "Bronze Communicator",
            CertificateType::Silver => "Silver Communicator",
            CertificateType::Gold => "Gold Communicator",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certificate {
    pub id: String,
    pub user_id: String,
    pub chapter_id: String,
    #[serde(rename = "type")]
    pub cert_type: CertificateType,
    pub title: String,
    pub description: String,
    pub points_threshold: i64,
    pub points_earned: i64,
    pub certificate_number: String,
    pub issued_date: DateTime<Utc>,
    pub issued_by: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_amounts() {
        assert_eq!(PointType::MeetingAttendance.fixed_amount(), Some(10));
        assert_eq!(PointType::SpeakerRole.fixed_amount(), Some(15));
        assert_eq!(PointType::AnchorRole.fixed_amount(), Some(25));
        assert_eq!(PointType::JudgeRole.fixed_amount(), Some(20));
        assert_eq!(PointType::AdminBonus.fixed_amount(), None);
    }

    #[test]
    fn test_ladder_is_ascending() {
        let thresholds: Vec<i64> = CERTIFICATE_LADDER.iter().map(|t| t.threshold()).collect();
        assert_eq!(thresholds, vec![100, 200, 300]);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&ChapterStatus::Deactivated).unwrap(),
            "\"deactivated\""
        );
        assert_eq!(
            serde_json::to_string(&PointType::MeetingAttendance).unwrap(),
            "\"meeting_attendance\""
        );
    }
}
