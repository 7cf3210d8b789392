//! Authentication and profile service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateProfile, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new user with role `user`
    pub async fn register(&self, request: &CreateUser) -> AppResult<User> {
        if self
            .repository
            .users
            .get_by_email(&request.email)
            .await?
            .is_some()
        {
            return Err(AppError::Validation(
                "User with this email already exists".to_string(),
            ));
        }

        let hash = self.hash_password(&request.password)?;
        self.repository
            .users
            .create(&request.name, &request.email, &hash)
            .await
    }

    /// Authenticate by email and password, returning a JWT token
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication(
                "Invalid email or password".to_string(),
            ));
        }

        let token = self.create_token(&user)?;
        Ok((token, user))
    }

    /// Get user by ID
    pub async fn get_user(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Update the caller's own profile. Changing the password requires the
    /// current one.
    pub async fn update_profile(&self, user_id: i32, update: &UpdateProfile) -> AppResult<User> {
        let password_hash = match &update.new_password {
            Some(new_password) => {
                let user = self.repository.users.get_by_id(user_id).await?;
                let current = update.current_password.as_deref().ok_or_else(|| {
                    AppError::Validation(
                        "Current password is required to change password".to_string(),
                    )
                })?;
                if !self.verify_password(&user, current)? {
                    return Err(AppError::Authentication(
                        "Current password is incorrect".to_string(),
                    ));
                }
                Some(self.hash_password(new_password)?)
            }
            None => None,
        };

        self.repository
            .users
            .update_profile(
                user_id,
                update.name.as_deref(),
                update.avatar_url.as_deref(),
                password_hash.as_deref(),
            )
            .await
    }

    fn create_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            name: user.name.clone(),
            role: user.role,
            avatar_url: user.avatar_url.clone(),
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(&user.password)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}
