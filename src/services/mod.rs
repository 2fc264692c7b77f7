pub mod attendance_service;
pub mod auth_service;
pub mod class_service;
pub mod dashboard_service;
pub mod equipment_service;
pub mod facility_service;
pub mod identity_service;
pub mod plan_service;
pub mod report_service;
pub mod staff_service;
pub mod subscription_service;

pub use attendance_service::*;
pub use auth_service::*;
pub use class_service::*;
pub use dashboard_service::*;
pub use equipment_service::*;
pub use facility_service::*;
pub use identity_service::*;
pub use plan_service::*;
pub use report_service::*;
pub use staff_service::*;
pub use subscription_service::*;
