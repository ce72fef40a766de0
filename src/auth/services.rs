//! Login and registration flows.
//!
//! Failed attempts are counted with a read-modify-write through the user
//! repository. Two concurrent attempts on one account can therefore lose an
//! increment, or a success can race a failure for the final counter value.
//! This is accepted; the lockout is a throttle, not an exact budget.

use lazy_static::lazy_static;
use regex::Regex;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{error, info, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest},
        jwt::TokenService,
        password::PasswordHasher,
        repo_types::{User, UserChanges},
    },
    config::LockoutConfig,
    error::ApiError,
    store::UserRepository,
};

/// Counter value written after a successful login. Non-zero on purpose so
/// "just succeeded" differs from "never attempted".
pub const COUNTER_AFTER_SUCCESS: i32 = 1;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Sliding lockout: `max_failed_attempts` failures with the last one inside
/// `window` block the account.
#[derive(Debug, Clone, Copy)]
pub struct LockoutPolicy {
    pub max_failed_attempts: i32,
    pub window: TimeDuration,
}

impl From<&LockoutConfig> for LockoutPolicy {
    fn from(cfg: &LockoutConfig) -> Self {
        Self {
            max_failed_attempts: cfg.max_failed_attempts,
            window: TimeDuration::minutes(cfg.window_minutes),
        }
    }
}

impl LockoutPolicy {
    pub fn is_locked(&self, user: &User, now: OffsetDateTime) -> bool {
        user.failed_login_attempts >= self.max_failed_attempts
            && now - user.updated_at < self.window
    }
}

/// Checks credentials and lockout, records the outcome and issues a token.
pub async fn login(
    users: &dyn UserRepository,
    passwords: &PasswordHasher,
    tokens: &TokenService,
    lockout: &LockoutPolicy,
    req: LoginRequest,
) -> Result<String, ApiError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation("email and password are required".into()));
    }
    let email = normalize_email(&req.email);

    let Some(user) = users.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    if user.is_deleted {
        warn!(user_id = %user.id, "login on deleted user");
        return Err(ApiError::InvalidCredentials);
    }

    let now = OffsetDateTime::now_utc();
    if lockout.is_locked(&user, now) {
        warn!(user_id = %user.id, attempts = user.failed_login_attempts, "login on locked account");
        return Err(ApiError::AccountLocked);
    }

    if !passwords.verify(&user.hashed_password, &req.password).await {
        let mut changes = UserChanges::at(now);
        changes.failed_login_attempts = Some(user.failed_login_attempts.saturating_add(1));
        users.update(user.id, &changes).await.map_err(|e| {
            error!(error = %e, user_id = %user.id, "record failed login");
            ApiError::from(e)
        })?;
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let mut changes = UserChanges::at(now);
    changes.failed_login_attempts = Some(COUNTER_AFTER_SUCCESS);
    changes.last_login = Some(now);
    let user = users.update(user.id, &changes).await?;

    let token = tokens.issue(user.id).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        ApiError::internal(e)
    })?;

    info!(user_id = %user.id, "user logged in");
    Ok(token)
}

/// Builds and persists a new user. The returned record still holds the hash;
/// it is skipped when serialized.
pub async fn register(
    users: &dyn UserRepository,
    passwords: &PasswordHasher,
    req: RegisterRequest,
) -> Result<User, ApiError> {
    let email = normalize_email(&req.email);
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if req.password.is_empty() {
        return Err(ApiError::Validation("password is required".into()));
    }

    if users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let hash = passwords
        .hash(&req.password)
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let user = User::register(email, hash, OffsetDateTime::now_utc());
    let user = users.create(&user).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}
