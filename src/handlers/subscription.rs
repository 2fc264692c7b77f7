use super::credential_from_request;
use crate::models::*;
use crate::services::{PlanService, SubscriptionService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/plans",
    tag = "subscription",
    responses(
        (status = 200, description = "套餐列表", body = [PlanResponse])
    )
)]
pub async fn list_plans(plan_service: web::Data<PlanService>) -> Result<HttpResponse> {
    match plan_service.list().await {
        Ok(plans) => {
            let data: Vec<PlanResponse> = plans.into_iter().map(PlanResponse::from).collect();
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": data
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/subscriptions/apply",
    tag = "subscription",
    params(ApplyQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "申请成功，已生成发票", body = ApplyApiResponse),
        (status = 404, description = "套餐不存在"),
        (status = 409, description = "已有未结束的订阅")
    )
)]
pub async fn apply(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
    query: web::Query<ApplyQuery>,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match subscription_service.apply(&credential, &query.plan).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/subscriptions/pay",
    tag = "subscription",
    request_body = PayRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "付款成功，订阅已激活", body = PaymentApiResponse),
        (status = 403, description = "发票不属于当前会员"),
        (status = 404, description = "发票不存在"),
        (status = 409, description = "已付款或金额不足")
    )
)]
pub async fn pay(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
    request: web::Json<PayRequest>,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match subscription_service.pay(&credential, request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/subscriptions/cancel",
    tag = "subscription",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "订阅已取消", body = SubscriptionApiResponse),
        (status = 404, description = "没有可取消的订阅")
    )
)]
pub async fn cancel(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match subscription_service.cancel(&credential).await {
        Ok(view) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            view,
            "Subscription canceled",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/subscriptions/current",
    tag = "subscription",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "当前订阅", body = CurrentSubscriptionResponse)
    )
)]
pub async fn current(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match subscription_service.current(&credential).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/subscriptions/history",
    tag = "subscription",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "历史订阅，新的在前", body = [SubscriptionView])
    )
)]
pub async fn history(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match subscription_service.history(&credential).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/subscriptions/invoices/pending",
    tag = "subscription",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "待付发票，没有则 data 为 null", body = InvoiceResponse)
    )
)]
pub async fn pending_invoice(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let credential = credential_from_request(&req);
    match subscription_service.pending_invoice(&credential).await {
        Ok(invoice) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": invoice
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn plan_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/plans", web::get().to(list_plans));
}

pub fn subscription_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/subscriptions")
            .route("/apply", web::post().to(apply))
            .route("/pay", web::post().to(pay))
            .route("/cancel", web::post().to(cancel))
            .route("/current", web::get().to(current))
            .route("/history", web::get().to(history))
            .route("/invoices/pending", web::get().to(pending_invoice)),
    );
}
