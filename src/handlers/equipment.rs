use super::credential_from_request;
use crate::models::*;
use crate::services::EquipmentService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/equipment",
    tag = "equipment",
    request_body = CreateEquipmentRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "设备已添加", body = EquipmentResponse),
        (status = 403, description = "仅管理员")
    )
)]
pub async fn add_equipment(
    equipment_service: web::Data<EquipmentService>,
    req: HttpRequest,
    request: web::Json<CreateEquipmentRequest>,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match equipment_service.add(&credential, request.into_inner()).await {
        Ok(item) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": item
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/equipment",
    tag = "equipment",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "设备列表", body = [EquipmentResponse])
    )
)]
pub async fn list_equipment(
    equipment_service: web::Data<EquipmentService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match equipment_service.list(&credential).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/api/equipment/{id}/status",
    tag = "equipment",
    params(
        ("id" = i64, Path, description = "设备 ID"),
        EquipmentStatusQuery
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "状态已更新", body = EquipmentResponse),
        (status = 404, description = "设备不存在")
    )
)]
pub async fn update_status(
    equipment_service: web::Data<EquipmentService>,
    req: HttpRequest,
    path: web::Path<i64>,
    query: web::Query<EquipmentStatusQuery>,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match equipment_service
        .update_status(&credential, path.into_inner(), query.status)
        .await
    {
        Ok(item) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": item
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/equipment/{id}",
    tag = "equipment",
    params(
        ("id" = i64, Path, description = "设备 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "设备已删除"),
        (status = 404, description = "设备不存在")
    )
)]
pub async fn delete_equipment(
    equipment_service: web::Data<EquipmentService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match equipment_service
        .delete(&credential, path.into_inner())
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Equipment deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/equipment/{id}/maintenance",
    tag = "equipment",
    params(
        ("id" = i64, Path, description = "设备 ID")
    ),
    request_body = MaintenanceRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "维护已记录，设备进入 maintenance", body = MaintenanceLogResponse),
        (status = 404, description = "设备不存在")
    )
)]
pub async fn log_maintenance(
    equipment_service: web::Data<EquipmentService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<MaintenanceRequest>,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match equipment_service
        .log_maintenance(&credential, path.into_inner(), request.into_inner())
        .await
    {
        Ok(entry) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": entry
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/equipment/{id}/maintenance",
    tag = "equipment",
    params(
        ("id" = i64, Path, description = "设备 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "维护记录", body = [MaintenanceLogResponse]),
        (status = 404, description = "设备不存在")
    )
)]
pub async fn maintenance_history(
    equipment_service: web::Data<EquipmentService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match equipment_service
        .maintenance_history(&credential, path.into_inner())
        .await
    {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn equipment_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/equipment")
            .route("", web::post().to(add_equipment))
            .route("", web::get().to(list_equipment))
            .route("/{id}", web::delete().to(delete_equipment))
            .route("/{id}/status", web::patch().to(update_status))
            .route("/{id}/maintenance", web::post().to(log_maintenance))
            .route("/{id}/maintenance", web::get().to(maintenance_history)),
    );
}
