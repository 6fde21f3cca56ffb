use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::attendance::AttendanceRecord,
    models::{
        AttendanceResponse, AttendanceSubmission, MessageResponse, RecordUpdate,
        UserAttendanceQuery,
    },
    service::attendance::{AttendancePatch, AttendanceService, ReconcileStatus, ShiftStatus},
};
use actix_web::{HttpResponse, web};
use chrono::{Local, NaiveDate, Utc};
use tracing::instrument;

/// "Today" is the calendar date of the server process.
fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Submit a check-in or check-out
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = AttendanceSubmission,
    responses(
        (status = 200, description = "Attendance recorded", body = AttendanceResponse),
        (status = 400, description = "Invalid data or already checked in today", body = MessageResponse, example = json!({
            "message": "You have already checked in today."
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Invalid token"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(name = "attendance_submit", skip_all, fields(user_id = auth.user_id))]
pub async fn submit_attendance(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    body: web::Json<AttendanceSubmission>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let patch = AttendancePatch {
        check_in: body.check_in,
        check_out: body.check_out,
        user_name: body
            .user_name
            .filter(|name| !name.trim().is_empty())
            .or(Some(auth.username)),
    };
    let user_id = auth.user_id;

    let reconciled = web::block(move || service.reconcile(user_id, today(), patch)).await??;

    Ok(HttpResponse::Ok().json(AttendanceResponse {
        message: reconciled.status.to_string(),
        record: reconciled.record,
    }))
}

/// List every attendance record (admin only)
#[utoipa::path(
    get,
    path = "/api/attendance",
    responses(
        (status = 200, description = "All attendance records", body = [AttendanceRecord]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admins only", body = MessageResponse, example = json!({
            "message": "Access denied. Admins only."
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let records = web::block(move || service.list_all()).await?;
    Ok(HttpResponse::Ok().json(records))
}

/// Shift status of the caller for today
#[utoipa::path(
    get,
    path = "/api/attendance/status",
    responses(
        (status = 200, description = "Current shift status", body = ShiftStatus),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Invalid token")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn attendance_status(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
) -> Result<HttpResponse, AppError> {
    let status = web::block(move || service.status(auth.user_id, today(), Utc::now())).await?;
    Ok(HttpResponse::Ok().json(status))
}

/// Attendance record of one user (admin only)
#[utoipa::path(
    get,
    path = "/api/attendance/user",
    params(UserAttendanceQuery),
    responses(
        (status = 200, description = "Attendance record", body = AttendanceRecord),
        (status = 403, description = "Admins only", body = MessageResponse),
        (status = 404, description = "No record", body = MessageResponse, example = json!({
            "message": "No attendance record found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn user_attendance(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    query: web::Query<UserAttendanceQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let UserAttendanceQuery { user_id, date } = query.into_inner();
    let record = web::block(move || service.find_by_user(user_id, date)).await?;

    match record {
        Some(record) => Ok(HttpResponse::Ok().json(record)),
        None => Err(AppError::NotFound("No attendance record found".into())),
    }
}

/// Edit an attendance record (admin only)
#[utoipa::path(
    put,
    path = "/api/attendance/{record_id}",
    params(
        ("record_id", Path, description = "Attendance record ID")
    ),
    request_body = RecordUpdate,
    responses(
        (status = 200, description = "Record updated", body = AttendanceResponse),
        (status = 400, description = "Neither checkIn nor checkOut given", body = MessageResponse),
        (status = 403, description = "Admins only", body = MessageResponse),
        (status = 404, description = "Record not found", body = MessageResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(name = "attendance_edit", skip_all, fields(admin_id = auth.user_id))]
pub async fn update_attendance(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    path: web::Path<String>,
    body: web::Json<RecordUpdate>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let record_id = path.into_inner();
    let RecordUpdate {
        check_in,
        check_out,
    } = body.into_inner();
    let patch = AttendancePatch {
        check_in,
        check_out,
        user_name: None,
    };

    let record = web::block(move || service.update_record(&record_id, patch)).await??;

    Ok(HttpResponse::Ok().json(AttendanceResponse {
        message: ReconcileStatus::Updated.to_string(),
        record,
    }))
}
