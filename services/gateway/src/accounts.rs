//! Account operations: registration, login, profile lookup and deletion

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::{
    error::{ApiError, ApiResult},
    jwt::{AuthUser, JwtService},
    models::{LoginRequest, NewUser, RegisterRequest, UserView},
    repositories::UserStore,
    validation::{normalize_email, profile_image_url, require, validate_email},
};

const MISSING_FIELDS: &str = "All fields are required";

/// A freshly authenticated session: the token for the client to hold and
/// the public view of its user
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: UserView,
}

/// Account service
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn UserStore>,
    jwt_service: JwtService,
    /// Hash checked when the email is unknown, so both login failures cost one verification
    dummy_hash: Arc<OnceCell<String>>,
}

impl AccountService {
    pub fn new(store: Arc<dyn UserStore>, jwt_service: JwtService) -> Self {
        Self {
            store,
            jwt_service,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Create an account and sign it in
    pub async fn register(&self, request: RegisterRequest) -> ApiResult<Session> {
        let fullname = require(&request.fullname, "Full name")
            .map_err(|_| ApiError::Validation(MISSING_FIELDS.to_string()))?;
        require(&request.email, "Email")
            .map_err(|_| ApiError::Validation(MISSING_FIELDS.to_string()))?;
        if request.password.is_empty() {
            return Err(ApiError::Validation(MISSING_FIELDS.to_string()));
        }

        let email = normalize_email(&request.email);
        validate_email(&email).map_err(ApiError::Validation)?;

        if self.store.find_by_email(&email).await?.is_some() {
            info!("Registration rejected, email already registered: {}", email);
            return Err(ApiError::DuplicateEmail);
        }

        let password_hash = hash_password(request.password).await?;

        // The unique index still catches a registration racing this one.
        let user = self
            .store
            .create(NewUser {
                profile_image_url: profile_image_url(&email),
                email,
                fullname: fullname.to_string(),
                password_hash,
            })
            .await?;

        let token = self.jwt_service.issue(user.id, &user.email)?;
        info!("Registered user: {}", user.id);

        Ok(Session {
            token,
            user: UserView::profile(&user),
        })
    }

    /// Sign in with email and password
    pub async fn login(&self, request: LoginRequest) -> ApiResult<Session> {
        if request.email.trim().is_empty() || request.password.is_empty() {
            return Err(ApiError::Validation(MISSING_FIELDS.to_string()));
        }

        let email = normalize_email(&request.email);

        let Some(user) = self.store.find_by_email(&email).await? else {
            verify_password(self.dummy_hash().await?, request.password).await?;
            warn!("Login failed for {}", email);
            return Err(ApiError::InvalidCredentials);
        };

        if !verify_password(user.password_hash.clone(), request.password).await? {
            warn!("Login failed for {}", email);
            return Err(ApiError::InvalidCredentials);
        }

        let token = self.jwt_service.issue(user.id, &user.email)?;
        info!("User logged in: {}", user.id);

        Ok(Session {
            token,
            user: UserView::with_favorites(user),
        })
    }

    async fn dummy_hash(&self) -> ApiResult<String> {
        self.dummy_hash
            .get_or_try_init(|| hash_password("unused-login-password".to_string()))
            .await
            .cloned()
    }

    /// Current view of the authenticated user, read fresh from the store
    pub async fn current_user(&self, auth: &AuthUser) -> ApiResult<UserView> {
        let user = self
            .store
            .find_by_id(auth.id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(UserView::with_favorites(user))
    }

    /// Remove the authenticated user's account and everything it owns
    pub async fn delete_account(&self, auth: &AuthUser) -> ApiResult<()> {
        if !self.store.delete(auth.id).await? {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        info!("Deleted user: {}", auth.id);
        Ok(())
    }
}

/// Hash a password with Argon2id and a random salt, off the async runtime
async fn hash_password(password: String) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut rand::thread_rng());
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?
}

async fn verify_password(password_hash: String, password: String) -> ApiResult<bool> {
    tokio::task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| ApiError::Internal(format!("Failed to parse password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?
}
