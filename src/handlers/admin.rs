use super::credential_from_request;
use crate::models::*;
use crate::services::StaffService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/admin/pending-request",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "待审核会员", body = [MemberResponse]),
        (status = 403, description = "仅管理员")
    )
)]
pub async fn pending_members(
    staff_service: web::Data<StaffService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match staff_service.pending_members(&credential).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/pending-request/grant/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "会员 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "会员已激活", body = MemberResponse),
        (status = 404, description = "会员不存在")
    )
)]
pub async fn grant_member(
    staff_service: web::Data<StaffService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match staff_service.grant_member(&credential, path.into_inner()).await {
        Ok(member) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": member
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/request/ban/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "会员 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "会员已封禁", body = MemberResponse),
        (status = 404, description = "会员不存在")
    )
)]
pub async fn ban_member(
    staff_service: web::Data<StaffService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match staff_service.ban_member(&credential, path.into_inner()).await {
        Ok(member) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": member
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/trainers/pending",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "待审核教练", body = [TrainerResponse])
    )
)]
pub async fn pending_trainers(
    staff_service: web::Data<StaffService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match staff_service.pending_trainers(&credential).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/trainers/{id}/hire",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "教练 ID")
    ),
    request_body = HireTrainerRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "教练已录用", body = TrainerResponse),
        (status = 400, description = "提成比例无效"),
        (status = 404, description = "教练不存在")
    )
)]
pub async fn hire_trainer(
    staff_service: web::Data<StaffService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: Option<web::Json<HireTrainerRequest>>,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    let request = request.map(|r| r.into_inner()).unwrap_or_default();
    match staff_service
        .hire_trainer(&credential, path.into_inner(), request)
        .await
    {
        Ok(trainer) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": trainer
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/trainers/{id}/reject",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "教练 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "教练申请已拒绝", body = TrainerResponse),
        (status = 404, description = "教练不存在")
    )
)]
pub async fn reject_trainer(
    staff_service: web::Data<StaffService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match staff_service
        .reject_trainer(&credential, path.into_inner())
        .await
    {
        Ok(trainer) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": trainer
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/admin")
            .route("/pending-request", web::get().to(pending_members))
            .route("/pending-request/grant/{id}", web::post().to(grant_member))
            .route("/request/ban/{id}", web::post().to(ban_member))
            .route("/trainers/pending", web::get().to(pending_trainers))
            .route("/trainers/{id}/hire", web::post().to(hire_trainer))
            .route("/trainers/{id}/reject", web::post().to(reject_trainer)),
    );
}
