use super::credential_from_request;
use crate::models::*;
use crate::services::ClassService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/classes/schedule",
    tag = "class",
    request_body = CreateScheduleRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "排课成功", body = ScheduleResponse),
        (status = 400, description = "时间或课程名无效"),
        (status = 403, description = "仅管理员可排课"),
        (status = 404, description = "教练或房间不存在"),
        (status = 409, description = "房间或教练时间冲突")
    )
)]
pub async fn create_schedule(
    class_service: web::Data<ClassService>,
    req: HttpRequest,
    request: web::Json<CreateScheduleRequest>,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match class_service
        .create_schedule(&credential, request.into_inner())
        .await
    {
        Ok(schedule) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": schedule
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/classes/schedule",
    tag = "class",
    responses(
        (status = 200, description = "课程表，按星期与开始时间排序", body = [ScheduleResponse])
    )
)]
pub async fn list_schedules(class_service: web::Data<ClassService>) -> Result<HttpResponse> {
    match class_service.list_schedules().await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/classes/{id}/book",
    tag = "class",
    params(
        ("id" = i64, Path, description = "课程表 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "预约成功 (confirmed 或 waitlist)", body = BookingResponse),
        (status = 404, description = "课程不存在"),
        (status = 409, description = "已预约")
    )
)]
pub async fn book(
    class_service: web::Data<ClassService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match class_service.book(&credential, path.into_inner()).await {
        Ok(booking) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": booking
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/classes/bookings/{id}",
    tag = "class",
    params(
        ("id" = i64, Path, description = "预约 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "预约已取消", body = BookingResponse),
        (status = 403, description = "不是自己的预约"),
        (status = 404, description = "预约不存在")
    )
)]
pub async fn cancel_booking(
    class_service: web::Data<ClassService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match class_service
        .cancel_booking(&credential, path.into_inner())
        .await
    {
        Ok(booking) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": booking
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/classes/my-bookings",
    tag = "class",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "我的预约", body = [BookingResponse])
    )
)]
pub async fn my_bookings(
    class_service: web::Data<ClassService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match class_service.my_bookings(&credential).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/classes/bookings/{id}/attendance",
    tag = "class",
    params(
        ("id" = i64, Path, description = "预约 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已登记到场", body = AttendanceLogResponse),
        (status = 400, description = "预约已取消"),
        (status = 403, description = "仅员工可登记"),
        (status = 409, description = "会员已在场内")
    )
)]
pub async fn mark_attendance(
    class_service: web::Data<ClassService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match class_service
        .mark_attendance(&credential, path.into_inner())
        .await
    {
        Ok(log) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": log
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn class_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/classes")
            .route("/schedule", web::post().to(create_schedule))
            .route("/schedule", web::get().to(list_schedules))
            .route("/my-bookings", web::get().to(my_bookings))
            .route("/{id}/book", web::post().to(book))
            .route("/bookings/{id}", web::delete().to(cancel_booking))
            .route("/bookings/{id}/attendance", web::put().to(mark_attendance)),
    );
}
