use crate::{
    config::Config,
    error::{AppError, Result},
    models::user::{AuthResponse, LoginRequest, SignupRequest, User},
    services::Database,
    utils::validation,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Clone)]
pub struct AuthService {
    db: Arc<Database>,
    config: Config,
}

impl AuthService {
    pub fn new(db: Arc<Database>, config: &Config) -> Self {
        Self {
            db,
            config: config.clone(),
        }
    }

    pub async fn signup(&self, request: SignupRequest) -> Result<AuthResponse> {
        validation::validate_username(&request.username)?;
        validation::validate_email_format(&request.email)?;
        validation::validate_password(&request.password)?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            username: request.username,
            email: request.email,
            password_hash: self.hash_password(&request.password)?,
            created_at: Utc::now(),
        };

        let insert = sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(self.db.pool())
        .await;

        match insert {
            Ok(_) => {}
            // Username uniqueness is a storage-layer constraint
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(AppError::Conflict("Username is already taken".to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        info!("New user registered: {}", user.username);
        let token = self.issue_token(&user)?;
        Ok(AuthResponse { token, user })
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(&request.username)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !self.verify_password(&request.password, &user.password_hash)? {
            // Same message as the unknown-user case, deliberately
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }

        debug!("User logged in: {}", user.username);
        let token = self.issue_token(&user)?;
        Ok(AuthResponse { token, user })
    }

    pub fn issue_token(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.config.jwt_expiry_hours)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_ref()),
        )?;
        Ok(token)
    }

    pub fn verify_jwt(&self, token: &str) -> Result<Claims> {
        let decoding_key = DecodingKey::from_secret(self.config.jwt_secret.as_ref());
        let validation = Validation::new(Algorithm::HS256);

        match decode::<Claims>(token, &decoding_key, &validation) {
            Ok(token_data) => {
                debug!("JWT token verified for user: {}", token_data.claims.sub);
                Ok(token_data.claims)
            }
            Err(e) => {
                warn!("JWT verification failed: {}", e);
                Err(AppError::Authentication("Invalid token".to_string()))
            }
        }
    }

    fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Stored password hash is invalid: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::database::test_support::test_database;

    fn signup_request(username: &str) -> SignupRequest {
        SignupRequest {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password: "correct-horse".to_string(),
        }
    }

    async fn service() -> AuthService {
        let db = Arc::new(test_database().await);
        AuthService::new(db, &Config::default())
    }

    #[tokio::test]
    async fn signup_then_login_round_trip() {
        let auth = service().await;
        let signed_up = auth.signup(signup_request("tester")).await.unwrap();
        assert_eq!(signed_up.user.username, "tester");

        let logged_in = auth
            .login(LoginRequest {
                username: "tester".to_string(),
                password: "correct-horse".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.user.id, signed_up.user.id);

        let claims = auth.verify_jwt(&logged_in.token).unwrap();
        assert_eq!(claims.sub, signed_up.user.id);
        assert_eq!(claims.username, "tester");
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_rejected() {
        let auth = service().await;
        auth.signup(signup_request("tester")).await.unwrap();

        let err = auth
            .login(LoginRequest {
                username: "tester".to_string(),
                password: "wrong-password".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let auth = service().await;
        auth.signup(signup_request("tester")).await.unwrap();

        let err = auth.signup(signup_request("tester")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let auth = service().await;
        let err = auth.verify_jwt("not-a-token").unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));
    }
}
