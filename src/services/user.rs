use uuid::Uuid;

use crate::cache::SessionStore;
use crate::config::Config;
use crate::database::{
    DbConn, DbError, NewUser, ProfileUpdate, UserEntity, UserRepository, finish_transaction,
};
use crate::error::AppError;
use crate::utils::{generate_session_token, hash_password, verify_password};

/// 登录成功后需要下发给客户端的凭证
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user_id: String,
    pub token: String,
}

/// 注册参数，字段格式由调用方校验
#[derive(Debug, Clone)]
pub struct Registration<'a> {
    pub name: &'a str,
    pub phone: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
}

#[derive(Debug, Clone)]
pub struct PasswordChange<'a> {
    pub user_id: &'a str,
    pub old_password: &'a str,
    pub new_password: &'a str,
    pub confirm_password: &'a str,
}

/// 用户账号与登录会话
#[derive(Clone)]
pub struct UserService {
    sessions: SessionStore,
    bcrypt_cost: u32,
    session_ttl_secs: u64,
}

impl UserService {
    pub fn new(sessions: SessionStore, config: &Config) -> Self {
        Self {
            sessions,
            bcrypt_cost: config.bcrypt_cost,
            session_ttl_secs: config.session_ttl_secs,
        }
    }

    pub fn session_ttl_secs(&self) -> u64 {
        self.session_ttl_secs
    }

    pub async fn register(
        &self,
        conn: &mut dyn DbConn,
        registration: Registration<'_>,
    ) -> Result<String, AppError> {
        conn.begin().await?;
        let result = self.register_in_tx(conn, registration).await;
        finish_transaction(conn, result).await
    }

    async fn register_in_tx(
        &self,
        conn: &mut dyn DbConn,
        registration: Registration<'_>,
    ) -> Result<String, AppError> {
        if conn.find_user_by_phone(registration.phone).await?.is_some() {
            return Err(AppError::UserPhoneExists);
        }
        if registration.password != registration.confirm_password {
            return Err(AppError::UserConfirmPasswordIncorrect);
        }

        let user = NewUser {
            id: Uuid::new_v4().to_string(),
            name: registration.name.to_string(),
            phone: registration.phone.to_string(),
            password_hash: self.hash(registration.password)?,
        };
        match conn.insert_user(&user).await {
            Ok(()) => {}
            // 并发注册同一手机号
            Err(DbError::Duplicate(_)) => return Err(AppError::UserPhoneExists),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user.id)
    }

    /// 校验手机号和密码，事务提交成功后替换该用户的会话
    ///
    /// 会话写入失败只记录日志，登录本身仍然成功，下发的 token 在下次登录前无法通过校验。
    pub async fn login(
        &self,
        conn: &mut dyn DbConn,
        phone: &str,
        password: &str,
    ) -> Result<LoginOutcome, AppError> {
        conn.begin().await?;
        let result = self.verify_login(conn, phone, password).await;
        let user = finish_transaction(conn, result).await?;

        let token = generate_session_token()?;
        if let Err(e) = self.sessions.clear_session(&user.id).await {
            tracing::warn!(error = %e, user_id = %user.id, "clear previous session failed");
        }
        if let Err(e) = self
            .sessions
            .set_session(&user.id, &token, self.session_ttl_secs)
            .await
        {
            tracing::warn!(error = %e, user_id = %user.id, "session write failed after login");
        }

        tracing::info!(user_id = %user.id, "user logged in");
        Ok(LoginOutcome {
            user_id: user.id,
            token,
        })
    }

    async fn verify_login(
        &self,
        conn: &mut dyn DbConn,
        phone: &str,
        password: &str,
    ) -> Result<UserEntity, AppError> {
        let user = conn
            .find_user_by_phone(phone)
            .await?
            .ok_or(AppError::UserLoginFailed)?;

        if !self.password_matches(password, &user) {
            return Err(AppError::UserLoginFailed);
        }
        Ok(user)
    }

    pub async fn logout(&self, user_id: &str) -> Result<(), AppError> {
        self.sessions.clear_session(user_id).await?;
        tracing::info!(user_id, "user logged out");
        Ok(())
    }

    /// 修改密码，成功后清理该用户的会话
    pub async fn modify_password(
        &self,
        conn: &mut dyn DbConn,
        change: PasswordChange<'_>,
    ) -> Result<(), AppError> {
        conn.begin().await?;
        let result = self.modify_password_in_tx(conn, &change).await;
        finish_transaction(conn, result).await?;

        self.sessions.clear_session(change.user_id).await?;
        tracing::info!(user_id = change.user_id, "password modified");
        Ok(())
    }

    async fn modify_password_in_tx(
        &self,
        conn: &mut dyn DbConn,
        change: &PasswordChange<'_>,
    ) -> Result<(), AppError> {
        let user = conn
            .find_user_by_id(change.user_id)
            .await?
            .ok_or(AppError::UserNotExists)?;

        if !self.password_matches(change.old_password, &user) {
            return Err(AppError::UserModifyPasswordFailed);
        }
        if change.new_password != change.confirm_password {
            return Err(AppError::UserModifyPasswordFailed);
        }

        let password_hash = self.hash(change.new_password)?;
        conn.update_password(&user.id, &password_hash).await?;
        Ok(())
    }

    pub async fn profile(
        &self,
        conn: &mut dyn DbConn,
        user_id: &str,
    ) -> Result<UserEntity, AppError> {
        conn.find_user_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotExists)
    }

    pub async fn save_profile(
        &self,
        conn: &mut dyn DbConn,
        user_id: &str,
        profile: &ProfileUpdate,
    ) -> Result<(), AppError> {
        conn.begin().await?;
        let result = Self::save_profile_in_tx(conn, user_id, profile).await;
        finish_transaction(conn, result).await
    }

    async fn save_profile_in_tx(
        conn: &mut dyn DbConn,
        user_id: &str,
        profile: &ProfileUpdate,
    ) -> Result<(), AppError> {
        if conn.find_user_by_id(user_id).await?.is_none() {
            return Err(AppError::UserNotExists);
        }
        if let Some(owner) = conn.find_user_by_phone(&profile.phone).await? {
            if owner.id != user_id {
                return Err(AppError::UserPhoneExists);
            }
        }

        match conn.update_profile(user_id, profile).await {
            Ok(()) => Ok(()),
            Err(DbError::Duplicate(_)) => Err(AppError::UserPhoneExists),
            Err(e) => Err(e.into()),
        }
    }

    fn hash(&self, password: &str) -> Result<String, AppError> {
        hash_password(password, self.bcrypt_cost).map_err(|e| {
            tracing::error!(error = %e, "password hashing failed");
            AppError::Internal
        })
    }

    fn password_matches(&self, password: &str, user: &UserEntity) -> bool {
        match verify_password(password, &user.password_hash) {
            Ok(matched) => matched,
            Err(e) => {
                tracing::warn!(error = %e, user_id = %user.id, "stored password hash unreadable");
                false
            }
        }
    }
}
