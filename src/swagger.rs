use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{
    BookingStatus, DayOfWeek, EquipmentStatus, InvoiceStatus, MemberStatus, StaffRole,
    SubscriptionStatus, TrainerStatus,
};
use crate::handlers;
use crate::models::*;
use crate::utils::{PaginatedAttendanceResponse, PaginationInfo};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register_member,
        handlers::auth::register_trainer,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::user_details,
        handlers::subscription::list_plans,
        handlers::subscription::apply,
        handlers::subscription::pay,
        handlers::subscription::cancel,
        handlers::subscription::current,
        handlers::subscription::history,
        handlers::subscription::pending_invoice,
        handlers::class::create_schedule,
        handlers::class::list_schedules,
        handlers::class::book,
        handlers::class::cancel_booking,
        handlers::class::my_bookings,
        handlers::class::mark_attendance,
        handlers::attendance::check_in,
        handlers::attendance::check_out,
        handlers::attendance::history,
        handlers::attendance::all_logs,
        handlers::report::admin_stats,
        handlers::report::churn_risk,
        handlers::report::trainer_performance,
        handlers::admin::pending_members,
        handlers::admin::grant_member,
        handlers::admin::ban_member,
        handlers::admin::pending_trainers,
        handlers::admin::hire_trainer,
        handlers::admin::reject_trainer,
        handlers::facility::add_room,
        handlers::facility::list_rooms,
        handlers::facility::update_room,
        handlers::facility::delete_room,
        handlers::equipment::add_equipment,
        handlers::equipment::list_equipment,
        handlers::equipment::update_status,
        handlers::equipment::delete_equipment,
        handlers::equipment::log_maintenance,
        handlers::equipment::maintenance_history,
    ),
    components(
        schemas(
            RegisterMemberRequest,
            RegisterTrainerRequest,
            LoginRequest,
            RefreshTokenRequest,
            AuthResponse,
            UserDetailsResponse,
            MemberResponse,
            StaffResponse,
            TrainerResponse,
            HireTrainerRequest,
            PlanResponse,
            ApplyResponse,
            PayRequest,
            PaymentResponse,
            SubscriptionView,
            CurrentSubscriptionResponse,
            InvoiceResponse,
            CreateScheduleRequest,
            ScheduleResponse,
            BookingResponse,
            AttendanceLogResponse,
            ChurnRiskEntry,
            TrainerPerformance,
            AdminStats,
            CreateRoomRequest,
            UpdateRoomRequest,
            RoomResponse,
            CreateEquipmentRequest,
            EquipmentResponse,
            MaintenanceRequest,
            MaintenanceLogResponse,
            MemberStatus,
            StaffRole,
            TrainerStatus,
            SubscriptionStatus,
            InvoiceStatus,
            BookingStatus,
            DayOfWeek,
            EquipmentStatus,
            PaginationInfo,
            PaginatedAttendanceResponse,
            ApiError,
            AuthApiResponse,
            ApplyApiResponse,
            PaymentApiResponse,
            SubscriptionApiResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration and login API"),
        (name = "subscription", description = "Plans, subscriptions and billing API"),
        (name = "class", description = "Class scheduling and booking API"),
        (name = "attendance", description = "Gym check-in API"),
        (name = "report", description = "Dashboard and report API"),
        (name = "admin", description = "Member and trainer approval API"),
        (name = "facility", description = "Facility room API"),
        (name = "equipment", description = "Equipment and maintenance API"),
    ),
    info(
        title = "Gym Backend API",
        version = "1.0.0",
        description = "Gym management REST API documentation"
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_lists_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/auth/login"));
        assert!(paths.contains_key("/api/subscriptions/pay"));
        assert!(paths.contains_key("/api/equipment/{id}/maintenance"));
        assert!(paths.contains_key("/api/admin/trainers/{id}/hire"));
    }
}
