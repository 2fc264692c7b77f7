use super::credential_from_request;
use crate::models::*;
use crate::services::FacilityService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/facilities",
    tag = "facility",
    request_body = CreateRoomRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "房间已添加", body = RoomResponse),
        (status = 400, description = "容量必须大于 0")
    )
)]
pub async fn add_room(
    facility_service: web::Data<FacilityService>,
    req: HttpRequest,
    request: web::Json<CreateRoomRequest>,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match facility_service
        .add_room(&credential, request.into_inner())
        .await
    {
        Ok(room) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": room
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/facilities",
    tag = "facility",
    responses(
        (status = 200, description = "房间列表", body = [RoomResponse])
    )
)]
pub async fn list_rooms(facility_service: web::Data<FacilityService>) -> Result<HttpResponse> {
    match facility_service.list_rooms().await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/facilities/{id}",
    tag = "facility",
    params(
        ("id" = i64, Path, description = "房间 ID")
    ),
    request_body = UpdateRoomRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "房间已更新", body = RoomResponse),
        (status = 404, description = "房间不存在")
    )
)]
pub async fn update_room(
    facility_service: web::Data<FacilityService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateRoomRequest>,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match facility_service
        .update_room(&credential, path.into_inner(), request.into_inner())
        .await
    {
        Ok(room) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": room
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/facilities/{id}",
    tag = "facility",
    params(
        ("id" = i64, Path, description = "房间 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "房间已删除"),
        (status = 404, description = "房间不存在"),
        (status = 409, description = "仍有课程使用该房间")
    )
)]
pub async fn delete_room(
    facility_service: web::Data<FacilityService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match facility_service
        .delete_room(&credential, path.into_inner())
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Room deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn facility_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/facilities")
            .route("", web::post().to(add_room))
            .route("", web::get().to(list_rooms))
            .route("/{id}", web::put().to(update_room))
            .route("/{id}", web::delete().to(delete_room)),
    );
}
