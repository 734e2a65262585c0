//! Bearer-token login and verification.
//!
//! `POST /login` exchanges a configured username and password for an HS256
//! token carrying `sub`, `role` and `exp`. Protected handlers take an
//! [`AuthenticatedUser`] argument, which rejects the request unless the
//! `Authorization: Bearer <token>` header holds an unexpired token for a
//! user that is still configured.

use std::collections::BTreeMap;
use std::future::{Ready, ready};

use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::config::{AuthConfig, UserRecord};
use crate::error::ApiError;

/// Token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username.
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub role: String,
    /// Expiry as Unix seconds.
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Username and password required")]
    MissingFields,

    #[error("Invalid username or password")]
    BadCredentials,

    #[error("Not authenticated")]
    MissingBearer,

    #[error("Invalid authentication credentials")]
    WrongScheme,

    #[error("Invalid token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("Invalid credentials")]
    UnknownSubject,

    #[error("Failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl AuthError {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingFields => StatusCode::BAD_REQUEST,
            Self::BadCredentials | Self::InvalidToken(_) | Self::UnknownSubject => {
                StatusCode::UNAUTHORIZED
            }
            Self::MissingBearer | Self::WrongScheme => StatusCode::FORBIDDEN,
            Self::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Issues and checks tokens against the configured accounts.
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl_minutes: i64,
    users: BTreeMap<String, UserRecord>,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field("users", &self.users.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl AuthService {
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            token_ttl_minutes: config.token_ttl_minutes,
            users: config.users.clone(),
        }
    }

    /// Checks a username and password and issues a token on success.
    ///
    /// # Errors
    ///
    /// * [`AuthError::MissingFields`] if either value is absent or empty
    /// * [`AuthError::BadCredentials`] if the pair does not match an account
    pub fn login(&self, username: Option<&str>, password: Option<&str>) -> Result<String, AuthError> {
        let (Some(username), Some(password)) = (
            username.filter(|u| !u.is_empty()),
            password.filter(|p| !p.is_empty()),
        ) else {
            return Err(AuthError::MissingFields);
        };

        let user = self
            .users
            .get(username)
            .filter(|user| user.password == password)
            .ok_or(AuthError::BadCredentials)?;

        log::info!("Issued token for {username}");
        self.issue_token(username, &user.role)
    }

    /// Signs a token for `username` expiring after the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Signing`] if encoding fails.
    pub fn issue_token(&self, username: &str, role: &str) -> Result<String, AuthError> {
        let claims = Claims {
            sub: username.to_owned(),
            role: role.to_owned(),
            exp: chrono::Utc::now().timestamp() + self.token_ttl_minutes * 60,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(AuthError::Signing)
    }

    /// Decodes `token` and checks that it names a configured user.
    ///
    /// # Errors
    ///
    /// * [`AuthError::InvalidToken`] for a bad signature, malformed token or
    ///   past expiry
    /// * [`AuthError::UnknownSubject`] if `sub` is not a configured user
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(AuthError::InvalidToken)?;

        if !self.users.contains_key(&data.claims.sub) {
            return Err(AuthError::UnknownSubject);
        }
        Ok(data.claims)
    }

    /// Verifies the raw `Authorization` header value.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingBearer`] when there is no header and
    /// [`AuthError::WrongScheme`] when it is not a bearer credential, plus
    /// anything [`Self::verify`] returns.
    pub fn verify_header(&self, authorization: Option<&str>) -> Result<Claims, AuthError> {
        let value = authorization.ok_or(AuthError::MissingBearer)?;
        let (scheme, token) = value.split_once(' ').ok_or(AuthError::MissingBearer)?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(AuthError::WrongScheme);
        }
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MissingBearer);
        }
        self.verify(token)
    }
}

/// Claims of the verified caller.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            log::error!("AppState missing from app data");
            return ready(Err(ApiError::internal("Server misconfigured")));
        };

        let authorization = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        ready(
            state
                .auth
                .verify_header(authorization)
                .map(Self)
                .map_err(ApiError::from),
        )
    }
}
