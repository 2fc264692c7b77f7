use crate::entities::{
    AccountKind, MemberStatus, StaffRole, TrainerStatus, member_entity as member,
    staff_entity as staff, trainer_entity as trainer, user_credential_entity as credential,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::{Credential, IdentityService};
use crate::utils::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set, TransactionTrait,
};

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
    identity: IdentityService,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(
        pool: DatabaseConnection,
        jwt_service: JwtService,
        identity: IdentityService,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            pool,
            jwt_service,
            identity,
            bcrypt_cost,
        }
    }

    pub async fn register_member(&self, request: RegisterMemberRequest) -> AppResult<AuthResponse> {
        let email = normalize_email(&request.email);
        let phone = normalize_phone(&request.phone);
        validate_email(&email)?;
        validate_phone(&phone)?;
        validate_password(&request.password)?;
        validate_names(&request.first_name, &request.last_name)?;

        self.ensure_email_free(&email).await?;
        if member::Entity::find()
            .filter(member::Column::Phone.eq(phone.as_str()))
            .one(&self.pool)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Phone number already registered".to_string()));
        }

        let password_hash = hash_password(&request.password, self.bcrypt_cost)?;
        let now = Utc::now();

        let txn = self.pool.begin().await?;
        credential::ActiveModel {
            email: Set(email.clone()),
            account_kind: Set(AccountKind::Member),
            password_hash: Set(password_hash),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "Email already registered"))?;

        let m = member::ActiveModel {
            first_name: Set(request.first_name.trim().to_string()),
            last_name: Set(request.last_name.trim().to_string()),
            email: Set(email.clone()),
            phone: Set(phone),
            emergency_contact: Set(request.emergency_contact),
            dob: Set(request.dob),
            status: Set(MemberStatus::Pending),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "Email or phone already registered"))?;
        txn.commit().await?;

        log::info!("Registered member {} ({})", m.id, email);
        self.issue_tokens(&email, AccountKind::Member, "member".to_string())
    }

    pub async fn register_trainer(
        &self,
        request: RegisterTrainerRequest,
    ) -> AppResult<AuthResponse> {
        let email = normalize_email(&request.email);
        validate_email(&email)?;
        validate_password(&request.password)?;
        validate_names(&request.first_name, &request.last_name)?;

        self.ensure_email_free(&email).await?;

        let password_hash = hash_password(&request.password, self.bcrypt_cost)?;
        let now = Utc::now();

        let txn = self.pool.begin().await?;
        credential::ActiveModel {
            email: Set(email.clone()),
            account_kind: Set(AccountKind::Staff),
            password_hash: Set(password_hash),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "Email already registered"))?;

        let s = staff::ActiveModel {
            first_name: Set(request.first_name.trim().to_string()),
            last_name: Set(request.last_name.trim().to_string()),
            email: Set(email.clone()),
            role: Set(StaffRole::Trainer),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "Email already registered"))?;

        trainer::ActiveModel {
            staff_id: Set(s.id),
            specialization: Set(request.specialization),
            short_description: Set(request.short_description),
            status: Set(TrainerStatus::Pending),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        log::info!("Registered trainer {} ({}), awaiting approval", s.id, email);
        self.issue_tokens(&email, AccountKind::Staff, StaffRole::Trainer.to_string())
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let email = normalize_email(&request.email);
        let account = credential::Entity::find()
            .filter(credential::Column::Email.eq(email.as_str()))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid email or password".to_string()))?;

        if !verify_password(&request.password, &account.password_hash)? {
            log::warn!("Failed login for {email}");
            return Err(AppError::AuthError("Invalid email or password".to_string()));
        }

        let kind = account.account_kind;
        let mut am = account.into_active_model();
        am.last_login = Set(Some(Utc::now()));
        am.update(&self.pool).await?;

        let role = self.role_of(&email, kind).await?;
        self.issue_tokens(&email, kind, role)
    }

    pub async fn refresh(&self, request: RefreshTokenRequest) -> AppResult<AuthResponse> {
        let claims = self
            .jwt_service
            .verify_refresh_token(&request.refresh_token)
            .map_err(|_| AppError::AuthError("Invalid refresh token".to_string()))?;

        let account = credential::Entity::find()
            .filter(credential::Column::Email.eq(claims.sub.as_str()))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("Account no longer exists".to_string()))?;

        let role = self.role_of(&account.email, account.account_kind).await?;
        self.issue_tokens(&account.email, account.account_kind, role)
    }

    pub async fn user_details(&self, credential: &Credential) -> AppResult<UserDetailsResponse> {
        let identity = self.identity.authenticate(credential).await?;
        match identity.kind {
            AccountKind::Member => {
                let m = member::Entity::find()
                    .filter(member::Column::Email.eq(identity.email.as_str()))
                    .one(&self.pool)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Member profile not found".to_string()))?;
                Ok(UserDetailsResponse::Member(MemberResponse::from(m)))
            }
            AccountKind::Staff => {
                let s = staff::Entity::find()
                    .filter(staff::Column::Email.eq(identity.email.as_str()))
                    .one(&self.pool)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Staff profile not found".to_string()))?;
                let t = trainer::Entity::find()
                    .filter(trainer::Column::StaffId.eq(s.id))
                    .one(&self.pool)
                    .await?;
                let trainer = t.map(|t| TrainerResponse::new(t, &s));
                let mut resp = StaffResponse::from(s);
                resp.trainer = trainer;
                Ok(UserDetailsResponse::Staff(resp))
            }
        }
    }

    /// 启动时创建管理员账号，已存在则跳过。返回是否新建
    pub async fn seed_admin(&self, email: &str, password: &str) -> AppResult<bool> {
        let email = normalize_email(email);
        if credential::Entity::find()
            .filter(credential::Column::Email.eq(email.as_str()))
            .one(&self.pool)
            .await?
            .is_some()
        {
            return Ok(false);
        }

        let password_hash = hash_password(password, self.bcrypt_cost)?;
        let now = Utc::now();
        let txn = self.pool.begin().await?;
        credential::ActiveModel {
            email: Set(email.clone()),
            account_kind: Set(AccountKind::Staff),
            password_hash: Set(password_hash),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        staff::ActiveModel {
            first_name: Set("System".to_string()),
            last_name: Set("Admin".to_string()),
            email: Set(email.clone()),
            role: Set(StaffRole::Admin),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        log::info!("Seeded admin account {email}");
        Ok(true)
    }

    async fn ensure_email_free(&self, email: &str) -> AppResult<()> {
        let taken = credential::Entity::find()
            .filter(credential::Column::Email.eq(email))
            .one(&self.pool)
            .await?
            .is_some();
        if taken {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        Ok(())
    }

    async fn role_of(&self, email: &str, kind: AccountKind) -> AppResult<String> {
        match kind {
            AccountKind::Member => Ok("member".to_string()),
            AccountKind::Staff => {
                let s = staff::Entity::find()
                    .filter(staff::Column::Email.eq(email))
                    .one(&self.pool)
                    .await?
                    .ok_or_else(|| AppError::AuthError("Staff profile not found".to_string()))?;
                Ok(s.role.to_string())
            }
        }
    }

    fn issue_tokens(
        &self,
        email: &str,
        kind: AccountKind,
        role: String,
    ) -> AppResult<AuthResponse> {
        Ok(AuthResponse {
            access_token: self.jwt_service.generate_access_token(email, kind)?,
            refresh_token: self.jwt_service.generate_refresh_token(email, kind)?,
            expires_in: self.jwt_service.get_access_token_expires_in(),
            email: email.to_string(),
            role,
        })
    }
}

fn validate_names(first: &str, last: &str) -> AppResult<()> {
    if first.trim().is_empty() || last.trim().is_empty() {
        return Err(AppError::ValidationError(
            "First and last name are required".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TEST_BCRYPT_COST, TestContext};
    use chrono::NaiveDate;

    fn service(ctx: &TestContext) -> AuthService {
        AuthService::new(
            ctx.db.clone(),
            ctx.jwt.clone(),
            ctx.identity.clone(),
            TEST_BCRYPT_COST,
        )
    }

    fn member_request(email: &str, phone: &str) -> RegisterMemberRequest {
        RegisterMemberRequest {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: email.to_string(),
            password: "Password123".to_string(),
            phone: phone.to_string(),
            emergency_contact: None,
            dob: NaiveDate::from_ymd_opt(1992, 5, 17).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_register_member_then_login() {
        let ctx = TestContext::new().await;
        let auth = service(&ctx);

        let resp = auth
            .register_member(member_request("Jane@Gym.io", "+12345678901"))
            .await
            .unwrap();
        assert_eq!(resp.email, "jane@gym.io");
        assert_eq!(resp.role, "member");

        let m = member::Entity::find()
            .filter(member::Column::Email.eq("jane@gym.io"))
            .one(&ctx.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(m.status, MemberStatus::Pending);

        let login = auth
            .login(LoginRequest {
                email: "jane@gym.io".to_string(),
                password: "Password123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(login.role, "member");

        let claims = ctx.jwt.verify_access_token(&login.access_token).unwrap();
        assert_eq!(claims.sub, "jane@gym.io");
    }

    #[tokio::test]
    async fn test_register_member_duplicates_conflict() {
        let ctx = TestContext::new().await;
        let auth = service(&ctx);
        auth.register_member(member_request("a@gym.io", "+12345678901"))
            .await
            .unwrap();

        let dup_email = auth
            .register_member(member_request("a@gym.io", "+12345678902"))
            .await;
        assert!(matches!(dup_email, Err(AppError::Conflict(_))));

        let dup_phone = auth
            .register_member(member_request("b@gym.io", "+12345678901"))
            .await;
        assert!(matches!(dup_phone, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_member_validation() {
        let ctx = TestContext::new().await;
        let auth = service(&ctx);

        let bad_email = auth
            .register_member(member_request("nope", "+12345678901"))
            .await;
        assert!(matches!(bad_email, Err(AppError::ValidationError(_))));

        let mut weak = member_request("c@gym.io", "+12345678901");
        weak.password = "short".to_string();
        assert!(matches!(
            auth.register_member(weak).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_wrong_password_unauthorized() {
        let ctx = TestContext::new().await;
        let auth = service(&ctx);
        auth.register_member(member_request("a@gym.io", "+12345678901"))
            .await
            .unwrap();

        let result = auth
            .login(LoginRequest {
                email: "a@gym.io".to_string(),
                password: "Password999".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AppError::AuthError(_))));

        let unknown = auth
            .login(LoginRequest {
                email: "nobody@gym.io".to_string(),
                password: "Password123".to_string(),
            })
            .await;
        assert!(matches!(unknown, Err(AppError::AuthError(_))));
    }

    #[tokio::test]
    async fn test_register_trainer_is_pending_staff() {
        let ctx = TestContext::new().await;
        let auth = service(&ctx);

        let resp = auth
            .register_trainer(RegisterTrainerRequest {
                first_name: "Tom".to_string(),
                last_name: "Coach".to_string(),
                email: "tom@gym.io".to_string(),
                password: "Password123".to_string(),
                specialization: Some("HIIT".to_string()),
                short_description: None,
            })
            .await
            .unwrap();
        assert_eq!(resp.role, "trainer");

        let cred = Credential::new(resp.access_token);
        match auth.user_details(&cred).await.unwrap() {
            UserDetailsResponse::Staff(s) => {
                assert_eq!(s.role, StaffRole::Trainer);
                let t = s.trainer.unwrap();
                assert_eq!(t.status, TrainerStatus::Pending);
                assert_eq!(t.specialization.as_deref(), Some("HIIT"));
            }
            other => panic!("expected staff details, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_refresh_issues_new_pair() {
        let ctx = TestContext::new().await;
        let auth = service(&ctx);
        let resp = auth
            .register_member(member_request("r@gym.io", "+12345678901"))
            .await
            .unwrap();

        let refreshed = auth
            .refresh(RefreshTokenRequest {
                refresh_token: resp.refresh_token,
            })
            .await
            .unwrap();
        assert_eq!(refreshed.email, "r@gym.io");

        // access token 不能当 refresh token 用
        let misuse = auth
            .refresh(RefreshTokenRequest {
                refresh_token: refreshed.access_token,
            })
            .await;
        assert!(matches!(misuse, Err(AppError::AuthError(_))));
    }

    #[tokio::test]
    async fn test_seed_admin_once() {
        let ctx = TestContext::new().await;
        let auth = service(&ctx);

        assert!(auth.seed_admin("admin@gym.io", "admin").await.unwrap());
        assert!(!auth.seed_admin("ADMIN@gym.io", "admin").await.unwrap());

        let login = auth
            .login(LoginRequest {
                email: "admin@gym.io".to_string(),
                password: "admin".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(login.role, "admin");
    }
}
