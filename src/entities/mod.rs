pub mod attendance_logs;
pub mod class_bookings;
pub mod class_schedules;
pub mod equipment;
pub mod facility_rooms;
pub mod invoices;
pub mod maintenance_logs;
pub mod members;
pub mod membership_plans;
pub mod payments;
pub mod staff;
pub mod subscriptions;
pub mod trainers;
pub mod user_credentials;

pub use attendance_logs as attendance_log_entity;
pub use class_bookings as class_booking_entity;
pub use class_schedules as class_schedule_entity;
pub use equipment as equipment_entity;
pub use facility_rooms as facility_room_entity;
pub use invoices as invoice_entity;
pub use maintenance_logs as maintenance_log_entity;
pub use members as member_entity;
pub use membership_plans as membership_plan_entity;
pub use payments as payment_entity;
pub use staff as staff_entity;
pub use subscriptions as subscription_entity;
pub use trainers as trainer_entity;
pub use user_credentials as user_credential_entity;

pub use class_bookings::BookingStatus;
pub use class_schedules::DayOfWeek;
pub use equipment::EquipmentStatus;
pub use invoices::InvoiceStatus;
pub use members::MemberStatus;
pub use staff::StaffRole;
pub use subscriptions::SubscriptionStatus;
pub use trainers::TrainerStatus;
pub use user_credentials::AccountKind;
