use super::credential_from_request;
use crate::models::*;
use crate::services::AuthService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/auth/register/member",
    tag = "auth",
    request_body = RegisterMemberRequest,
    responses(
        (status = 200, description = "会员注册成功", body = AuthApiResponse),
        (status = 400, description = "请求参数错误"),
        (status = 409, description = "邮箱或手机号已注册")
    )
)]
pub async fn register_member(
    auth_service: web::Data<AuthService>,
    request: web::Json<RegisterMemberRequest>,
) -> Result<HttpResponse> {
    match auth_service.register_member(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/register/trainer",
    tag = "auth",
    request_body = RegisterTrainerRequest,
    responses(
        (status = 200, description = "教练注册成功，等待审核", body = AuthApiResponse),
        (status = 400, description = "请求参数错误"),
        (status = 409, description = "邮箱已注册")
    )
)]
pub async fn register_trainer(
    auth_service: web::Data<AuthService>,
    request: web::Json<RegisterTrainerRequest>,
) -> Result<HttpResponse> {
    match auth_service.register_trainer(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "登录成功", body = AuthApiResponse),
        (status = 401, description = "邮箱或密码错误")
    )
)]
pub async fn login(
    auth_service: web::Data<AuthService>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    match auth_service.login(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "auth",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "刷新令牌成功", body = AuthApiResponse),
        (status = 401, description = "刷新令牌无效")
    )
)]
pub async fn refresh(
    auth_service: web::Data<AuthService>,
    request: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse> {
    match auth_service.refresh(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/auth/userdetails",
    tag = "auth",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "当前账号资料", body = UserDetailsResponse),
        (status = 401, description = "未授权")
    )
)]
pub async fn user_details(
    auth_service: web::Data<AuthService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match auth_service.user_details(&credential).await {
        Ok(details) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": details
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register/member", web::post().to(register_member))
            .route("/register/trainer", web::post().to(register_trainer))
            .route("/login", web::post().to(login))
            .route("/refresh", web::post().to(refresh))
            .route("/userdetails", web::get().to(user_details)),
    );
}
