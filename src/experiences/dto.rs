use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::experiences::repo::{
    Experience, ExperienceDetailRow, ExperienceProfile, ExperienceUserRow, PiQuestion,
};

/// Submission body for POST /experiences/submit.
#[derive(Debug, Deserialize)]
pub struct SubmitExperienceRequest {
    pub college_id: Uuid,
    pub year: i32,
    pub profile: ExperienceProfile,
    pub wat_summary: Option<String>,
    pub pi_questions: Vec<PiQuestion>,
    pub final_remarks: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
}

/// Filter body for POST /experiences.
#[derive(Debug, Deserialize)]
pub struct ExperienceFilter {
    pub college: Option<String>,
    pub year: Option<i32>,
    pub percentile_range: Option<String>,
    pub background: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    10
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct SubmitterInfo {
    pub name: String,
    pub email: String,
}

/// Experience plus its submitter, as listed publicly.
#[derive(Debug, Serialize)]
pub struct ExperienceWithUser {
    #[serde(flatten)]
    pub experience: Experience,
    pub user: SubmitterInfo,
}

impl From<ExperienceUserRow> for ExperienceWithUser {
    fn from(r: ExperienceUserRow) -> Self {
        Self {
            experience: r.experience,
            user: SubmitterInfo {
                name: r.user_name,
                email: r.user_email,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserRef {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct CollegeRef {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

/// Moderation view: experience with both its submitter and college.
#[derive(Debug, Serialize)]
pub struct ExperienceDetails {
    #[serde(flatten)]
    pub experience: Experience,
    pub user: UserRef,
    pub college: CollegeRef,
}

impl From<ExperienceDetailRow> for ExperienceDetails {
    fn from(r: ExperienceDetailRow) -> Self {
        let user = UserRef {
            id: r.experience.user_id,
            name: r.user_name,
            email: r.user_email,
        };
        let college = CollegeRef {
            id: r.experience.college_id,
            name: r.college_name,
            slug: r.college_slug,
        };
        Self {
            experience: r.experience,
            user,
            college,
        }
    }
}

/// Vote-toggle outcome.
#[derive(Debug, Serialize)]
pub struct HelpfulResponse {
    pub is_helpful: bool,
    pub upvotes: i32,
}
