use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::model::{attendance::AttendanceRecord, role::Role};

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "admin")]
    pub username: String,
    #[schema(example = "adminpass")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
    #[schema(example = "admin")]
    pub username: String,
    #[schema(example = 1)]
    pub id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: u64,
    pub username: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
}

/// Body of a check-in / check-out submission.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSubmission {
    #[schema(example = "admin")]
    pub user_name: Option<String>,
    #[schema(example = "2024-01-01T09:00:00Z")]
    pub check_in: Option<String>,
    #[schema(example = "2024-01-01T17:00:00Z")]
    pub check_out: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordUpdate {
    pub check_in: Option<String>,
    pub check_out: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UserAttendanceQuery {
    /// User whose record is wanted
    pub user_id: u64,
    /// Day to look up (YYYY-MM-DD); the first record of the user when omitted
    pub date: Option<chrono::NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AttendanceResponse {
    #[schema(example = "Check-in recorded")]
    pub message: String,
    pub record: AttendanceRecord,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Logout successful")]
    pub message: String,
}
