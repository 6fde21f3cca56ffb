use crate::model::{attendance::AttendanceRecord, role::Role};
use crate::models::{
    AttendanceResponse, AttendanceSubmission, LoginReqDto, LoginResponse, MessageResponse,
    RecordUpdate,
};
use crate::service::attendance::ShiftStatus;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Tracker API",
        version = "1.0.0",
        description = r#"
## Employee Attendance Tracker

Employees log in, check in when their shift starts and check out when it ends.
Administrators review every record and correct check-in / check-out times.

### Security
All attendance endpoints require a **JWT Bearer** token from `/api/auth/login`.
Listing, per-user lookup and editing are restricted to the **admin** role.

### Records
There is at most one record per user per day. A second submission on the same
day updates that record; a second check-in while the shift is still open is
refused.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::logout,

        crate::api::attendance::submit_attendance,
        crate::api::attendance::list_attendance,
        crate::api::attendance::attendance_status,
        crate::api::attendance::user_attendance,
        crate::api::attendance::update_attendance
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            MessageResponse,
            Role,
            AttendanceRecord,
            AttendanceSubmission,
            AttendanceResponse,
            RecordUpdate,
            ShiftStatus
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login and logout"),
        (name = "Attendance", description = "Check-in, check-out and record management"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
