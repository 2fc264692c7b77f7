use super::credential_from_request;
use crate::models::*;
use crate::services::AttendanceService;
use crate::utils::{PaginatedAttendanceResponse, PaginationParams};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/attendance/check-in",
    tag = "attendance",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "入场成功", body = AttendanceLogResponse),
        (status = 403, description = "没有有效订阅"),
        (status = 409, description = "已在场内")
    )
)]
pub async fn check_in(
    attendance_service: web::Data<AttendanceService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match attendance_service.check_in(&credential).await {
        Ok(log) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": log
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/attendance/check-out",
    tag = "attendance",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "离场成功", body = AttendanceLogResponse),
        (status = 400, description = "没有未结束的入场记录")
    )
)]
pub async fn check_out(
    attendance_service: web::Data<AttendanceService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match attendance_service.check_out(&credential).await {
        Ok(log) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": log
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/attendance/history",
    tag = "attendance",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "我的入场记录", body = [AttendanceLogResponse])
    )
)]
pub async fn history(
    attendance_service: web::Data<AttendanceService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match attendance_service.history(&credential).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/attendance/all",
    tag = "attendance",
    params(PaginationParams),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "全部入场记录 (分页)", body = PaginatedAttendanceResponse),
        (status = 403, description = "仅管理员")
    )
)]
pub async fn all_logs(
    attendance_service: web::Data<AttendanceService>,
    req: HttpRequest,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match attendance_service.all_logs(&credential, &query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn attendance_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/attendance")
            .route("/check-in", web::post().to(check_in))
            .route("/check-out", web::post().to(check_out))
            .route("/history", web::get().to(history))
            .route("/all", web::get().to(all_logs)),
    );
}
