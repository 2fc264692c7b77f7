use crate::models::{MemberResponse, StaffResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterMemberRequest {
    #[schema(example = "Jane")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[schema(example = "Password123")]
    pub password: String,
    #[schema(example = "+12345678901")]
    pub phone: String,
    pub emergency_contact: Option<String>,
    #[schema(example = "1990-01-01")]
    pub dob: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterTrainerRequest {
    pub first_name: String,
    pub last_name: String,
    #[schema(example = "coach@example.com")]
    pub email: String,
    pub password: String,
    #[schema(example = "Strength")]
    pub specialization: Option<String>,
    pub short_description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[schema(example = "Password123")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub email: String,
    /// member，或员工的 role (admin / frontdesk / manager / trainer)
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "account_type", rename_all = "snake_case")]
pub enum UserDetailsResponse {
    Member(MemberResponse),
    Staff(StaffResponse),
}
