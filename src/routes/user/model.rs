use serde::{Deserialize, Serialize};

use crate::database::{ProfileUpdate, UserEntity};
use crate::error::AppError;
use crate::services::{PasswordChange, Registration};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        FieldErrors::default()
            .length("name", &self.name, 3, 30)
            .required("phone", &self.phone)
            .length("password", &self.password, 6, 16)
            .length("confirm_password", &self.confirm_password, 6, 16)
            .finish()
    }

    pub fn as_registration(&self) -> Registration<'_> {
        Registration {
            name: &self.name,
            phone: &self.phone,
            password: &self.password,
            confirm_password: &self.confirm_password,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        FieldErrors::default()
            .required("phone", &self.phone)
            .required("password", &self.password)
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ModifyPasswordRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
}

impl ModifyPasswordRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        FieldErrors::default()
            .required("user_id", &self.user_id)
            .length("old_password", &self.old_password, 6, 16)
            .length("new_password", &self.new_password, 6, 16)
            .length("confirm_password", &self.confirm_password, 6, 16)
            .finish()
    }

    pub fn as_change(&self) -> PasswordChange<'_> {
        PasswordChange {
            user_id: &self.user_id,
            old_password: &self.old_password,
            new_password: &self.new_password,
            confirm_password: &self.confirm_password,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserProfile {
    pub avatar_image_url: String,
    pub user_name: String,
    pub email: String,
    pub phone: String,
    pub user_id: String,
    pub is_admin: bool,
}

impl From<UserEntity> for UserProfile {
    fn from(user: UserEntity) -> Self {
        Self {
            avatar_image_url: user.avatar_url,
            user_name: user.name,
            email: user.email,
            phone: user.phone,
            user_id: user.id,
            is_admin: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SaveProfileRequest {
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub avatar_image_url: String,
}

impl SaveProfileRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        FieldErrors::default()
            .length("user_name", &self.user_name, 3, 30)
            .required("phone", &self.phone)
            .finish()
    }
}

impl From<SaveProfileRequest> for ProfileUpdate {
    fn from(req: SaveProfileRequest) -> Self {
        Self {
            name: req.user_name,
            email: req.email,
            phone: req.phone,
            avatar_url: req.avatar_image_url,
        }
    }
}

/// 累积字段校验失败信息，格式为 `"<field> entered incorrectly; "`
#[derive(Debug, Default)]
struct FieldErrors(String);

impl FieldErrors {
    fn required(self, field: &str, value: &str) -> Self {
        self.check(field, !value.trim().is_empty())
    }

    /// 按字符数计算长度
    fn length(self, field: &str, value: &str, min: usize, max: usize) -> Self {
        let len = value.chars().count();
        self.check(field, (min..=max).contains(&len))
    }

    fn check(mut self, field: &str, ok: bool) -> Self {
        if !ok {
            self.0.push_str(field);
            self.0.push_str(" entered incorrectly; ");
        }
        self
    }

    fn finish(self) -> Result<(), AppError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::ReqParam(self.0))
        }
    }
}
