use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::repo::UserSummary;
use crate::colleges::repo::CollegeStatus;
use crate::experiences::repo::{ExperienceProfile, ExperienceSummary, PiQuestion};

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_experiences: i64,
    pub total_colleges: i64,
    pub total_verified_experiences: i64,
    pub pending_experiences: i64,
}

#[derive(Debug, Deserialize)]
pub struct UsersListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub search: String,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub total: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

#[derive(Debug, Serialize)]
pub struct UsersListResponse {
    pub users: Vec<UserSummary>,
    pub pagination: Pagination,
}

/// All three fields are required; absences fail validation rather than
/// partially updating.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: UserSummary,
    pub experiences: Vec<ExperienceSummary>,
}

#[derive(Debug, Deserialize)]
pub struct UserExperiencesQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCollegeRequest {
    pub name: String,
    pub status: Option<CollegeStatus>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCollegeRequest {
    pub name: Option<String>,
    pub status: Option<CollegeStatus>,
}

#[derive(Debug, Deserialize)]
pub struct CreateExperienceRequest {
    pub user_id: Uuid,
    pub college_id: Uuid,
    pub year: i32,
    pub profile: ExperienceProfile,
    pub wat_summary: Option<String>,
    pub pi_questions: Vec<PiQuestion>,
    pub final_remarks: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateExperienceRequest {
    pub college_id: Option<Uuid>,
    pub year: Option<i32>,
    pub profile: Option<ExperienceProfile>,
    pub wat_summary: Option<String>,
    pub pi_questions: Option<Vec<PiQuestion>>,
    pub final_remarks: Option<String>,
    pub is_verified: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: &'static str,
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct VerifiedResponse {
    pub message: &'static str,
    pub id: Uuid,
    pub is_verified: bool,
}
