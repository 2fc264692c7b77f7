pub mod attendance;
pub mod auth;
pub mod class;
pub mod common;
pub mod equipment;
pub mod facility;
pub mod member;
pub mod report;
pub mod staff;
pub mod subscription;

pub use attendance::*;
pub use auth::*;
pub use class::*;
pub use common::*;
pub use equipment::*;
pub use facility::*;
pub use member::*;
pub use report::*;
pub use staff::*;
pub use subscription::*;
