use super::credential_from_request;
use crate::models::*;
use crate::services::{DashboardService, ReportService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/dashboard/admin-stats",
    tag = "report",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "会员数与收入统计", body = AdminStats),
        (status = 403, description = "仅管理员")
    )
)]
pub async fn admin_stats(
    dashboard_service: web::Data<DashboardService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match dashboard_service.admin_stats(&credential).await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": stats
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/reports/churn-risk",
    tag = "report",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "30 天未入场的活跃会员", body = [ChurnRiskEntry]),
        (status = 403, description = "仅管理员")
    )
)]
pub async fn churn_risk(
    report_service: web::Data<ReportService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match report_service.churn_risk(&credential).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/reports/trainer-performance",
    tag = "report",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "教练排课与得分", body = [TrainerPerformance]),
        (status = 403, description = "仅管理员")
    )
)]
pub async fn trainer_performance(
    report_service: web::Data<ReportService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match report_service.trainer_performance(&credential).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn report_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/dashboard/admin-stats", web::get().to(admin_stats))
        .service(
            web::scope("/api/reports")
                .route("/churn-risk", web::get().to(churn_risk))
                .route("/trainer-performance", web::get().to(trainer_performance)),
        );
}
