use crate::entities::{
    AccountKind, MemberStatus, StaffRole, member_entity as member, staff_entity as staff,
    user_credential_entity as credential,
};
use crate::error::AppError;
use crate::utils::JwtService;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use thiserror::Error;

/// 请求携带的不透明凭据 (Bearer token 原文)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    pub kind: AccountKind,
}

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Unauthorized(msg) => AppError::AuthError(msg),
            AccessError::Forbidden(msg) => AppError::Forbidden(msg),
            AccessError::Database(e) => AppError::DatabaseError(e),
        }
    }
}

/// 身份与角色校验，所有变更操作之前调用，本身不修改任何数据
#[derive(Clone)]
pub struct IdentityService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
}

impl IdentityService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    /// 校验 token 并确认账号仍然存在，账号类型以库中记录为准
    pub async fn authenticate(&self, credential: &Credential) -> Result<Identity, AccessError> {
        let claims = self
            .jwt_service
            .verify_access_token(credential.as_str())
            .map_err(|_| AccessError::Unauthorized("Invalid or expired access token".into()))?;

        let account = credential::Entity::find()
            .filter(credential::Column::Email.eq(claims.sub.as_str()))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AccessError::Unauthorized("Account no longer exists".into()))?;

        Ok(Identity {
            email: account.email,
            kind: account.account_kind,
        })
    }

    pub async fn require_role(
        &self,
        credential: &Credential,
        kind: AccountKind,
    ) -> Result<Identity, AccessError> {
        let identity = self.authenticate(credential).await?;
        if identity.kind != kind {
            log::warn!(
                "Account {} ({}) rejected, {} required",
                identity.email,
                identity.kind,
                kind
            );
            return Err(AccessError::Forbidden(format!("{kind} account required")));
        }
        Ok(identity)
    }

    pub async fn require_staff_role(
        &self,
        credential: &Credential,
        role: StaffRole,
    ) -> Result<Identity, AccessError> {
        let identity = self.require_role(credential, AccountKind::Staff).await?;
        let staff = self.find_staff(&identity.email).await?;
        if staff.role != role {
            log::warn!("Staff {} has role {}, {} required", staff.email, staff.role, role);
            return Err(AccessError::Forbidden(format!("{role} role required")));
        }
        Ok(identity)
    }

    pub async fn require_staff(
        &self,
        credential: &Credential,
    ) -> Result<staff::Model, AccessError> {
        let identity = self.require_role(credential, AccountKind::Staff).await?;
        self.find_staff(&identity.email).await
    }

    pub async fn require_member_status(
        &self,
        credential: &Credential,
        status: MemberStatus,
    ) -> Result<member::Model, AccessError> {
        let member = self.find_member(credential).await?;
        if member.status != status {
            return Err(AccessError::Forbidden(format!(
                "Member status must be {status}, current status is {}",
                member.status
            )));
        }
        Ok(member)
    }

    /// 会员账号且未被封禁
    pub async fn require_member(
        &self,
        credential: &Credential,
    ) -> Result<member::Model, AccessError> {
        let member = self.find_member(credential).await?;
        if member.status == MemberStatus::Banned {
            log::warn!("Banned member {} attempted access", member.email);
            return Err(AccessError::Forbidden("Member is banned".into()));
        }
        Ok(member)
    }

    async fn find_member(&self, credential: &Credential) -> Result<member::Model, AccessError> {
        let identity = self.require_role(credential, AccountKind::Member).await?;
        member::Entity::find()
            .filter(member::Column::Email.eq(identity.email.as_str()))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AccessError::Forbidden("Member profile not found".into()))
    }

    async fn find_staff(&self, email: &str) -> Result<staff::Model, AccessError> {
        staff::Entity::find()
            .filter(staff::Column::Email.eq(email))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AccessError::Forbidden("Staff profile not found".into()))
    }
}
