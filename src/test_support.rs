//! 测试公用：内存 SQLite + 真实迁移，以及常用数据构造

use crate::entities::{
    AccountKind, MemberStatus, StaffRole, TrainerStatus, facility_room_entity as room,
    member_entity as member, staff_entity as staff, trainer_entity as trainer,
    user_credential_entity as credential,
};
use crate::services::{Credential, IdentityService};
use crate::utils::JwtService;
use chrono::{NaiveDate, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use std::sync::atomic::{AtomicU32, Ordering};

static PHONE_SEQ: AtomicU32 = AtomicU32::new(1);

pub const TEST_BCRYPT_COST: u32 = 4;

pub struct TestContext {
    pub db: DatabaseConnection,
    pub jwt: JwtService,
    pub identity: IdentityService,
}

impl TestContext {
    pub async fn new() -> Self {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(opt).await.expect("connect sqlite");
        Migrator::up(&db, None).await.expect("run migrations");

        let jwt = JwtService::new("test-secret", 3600, 7200);
        let identity = IdentityService::new(db.clone(), jwt.clone());
        Self { db, jwt, identity }
    }

    pub fn credential(&self, email: &str, kind: AccountKind) -> Credential {
        Credential::new(self.jwt.generate_access_token(email, kind).expect("token"))
    }

    async fn insert_credential(&self, email: &str, kind: AccountKind) {
        credential::ActiveModel {
            email: Set(email.to_string()),
            account_kind: Set(kind),
            password_hash: Set("not-a-real-hash".to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("insert credential");
    }

    pub async fn member(&self, email: &str, status: MemberStatus) -> (member::Model, Credential) {
        self.insert_credential(email, AccountKind::Member).await;
        let seq = PHONE_SEQ.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let m = member::ActiveModel {
            first_name: Set("Test".to_string()),
            last_name: Set(email.split('@').next().unwrap_or("member").to_string()),
            email: Set(email.to_string()),
            phone: Set(format!("+1555{seq:07}")),
            dob: Set(NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()),
            status: Set(status),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("insert member");
        (m, self.credential(email, AccountKind::Member))
    }

    pub async fn staff(&self, email: &str, role: StaffRole) -> (staff::Model, Credential) {
        self.insert_credential(email, AccountKind::Staff).await;
        let s = staff::ActiveModel {
            first_name: Set("Staff".to_string()),
            last_name: Set(email.split('@').next().unwrap_or("staff").to_string()),
            email: Set(email.to_string()),
            role: Set(role),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("insert staff");
        (s, self.credential(email, AccountKind::Staff))
    }

    pub async fn admin(&self) -> Credential {
        self.staff("admin@gym.io", StaffRole::Admin).await.1
    }

    pub async fn trainer(&self, email: &str, status: TrainerStatus) -> trainer::Model {
        let (s, _) = self.staff(email, StaffRole::Trainer).await;
        trainer::ActiveModel {
            staff_id: Set(s.id),
            specialization: Set(Some("Strength".to_string())),
            status: Set(status),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("insert trainer")
    }

    pub async fn room(&self, name: &str, capacity: i32) -> room::Model {
        room::ActiveModel {
            name: Set(name.to_string()),
            capacity: Set(capacity),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("insert room")
    }
}
