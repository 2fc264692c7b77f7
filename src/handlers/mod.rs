pub mod admin;
pub mod attendance;
pub mod auth;
pub mod class;
pub mod equipment;
pub mod facility;
pub mod report;
pub mod subscription;

pub use admin::admin_config;
pub use attendance::attendance_config;
pub use auth::auth_config;
pub use class::class_config;
pub use equipment::equipment_config;
pub use facility::facility_config;
pub use report::report_config;
pub use subscription::{plan_config, subscription_config};

use crate::services::Credential;
use actix_web::{HttpMessage, HttpRequest};

/// 认证中间件放入 extensions 的凭据；公开路径上没有，交给身份校验返回 401
fn credential_from_request(req: &HttpRequest) -> Credential {
    req.extensions()
        .get::<Credential>()
        .cloned()
        .unwrap_or_else(|| Credential::new(""))
}
