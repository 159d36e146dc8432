use std::collections::HashMap;

use anyhow::{anyhow, Result};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use parking_lot::RwLock;
use password_hash::{PasswordHash, SaltString};
use thiserror::Error;
use tracing::info;

/// Opaque reference to an authenticated principal, as minted by the
/// identity provider. Doubles as the `users` document id.
pub type IdentityRef = String;

/// Credential-verification failures, with the messages the login screen
/// shows verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid email or password. Please try again.")]
    InvalidCredentials,
    #[error("This account has been disabled. Please contact support.")]
    AccountDisabled,
    #[error("Too many unsuccessful login attempts. Please try again later.")]
    RateLimited,
    #[error("Failed to login. Please check your credentials and try again.")]
    Unavailable,
}

/// External identity authority. Verification yields an identity
/// reference; `sign_out` terminates the assertion so a denied resolution
/// never leaves a half-authenticated principal behind.
pub trait IdentityProvider: Send + Sync {
    fn verify_credentials(&self, email: &str, password: &str) -> Result<IdentityRef, AuthError>;

    fn sign_out(&self, identity_ref: &str);
}

struct Credential {
    identity_ref: IdentityRef,
    password_phc: String,
    disabled: bool,
}

/// Consecutive failed verifications after which an account is
/// rate-limited until the next successful sign-in.
const MAX_FAILED_ATTEMPTS: u32 = 5;

/// Provider backed by an in-process credential table with Argon2 PHC
/// hashes. Stands in for the hosted identity service in tests and demos.
#[derive(Default)]
pub struct LocalIdentityProvider {
    credentials: RwLock<HashMap<String, Credential>>,
    sign_outs: RwLock<Vec<IdentityRef>>,
    failed_attempts: RwLock<HashMap<String, u32>>,
    offline: RwLock<bool>,
}

impl LocalIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a credential pair under a fixed identity reference.
    pub fn register(&self, email: &str, password: &str, identity_ref: &str) -> Result<()> {
        let phc = hash_password(password)?;
        self.credentials.write().insert(
            email.to_string(),
            Credential {
                identity_ref: identity_ref.to_string(),
                password_phc: phc,
                disabled: false,
            },
        );
        Ok(())
    }

    pub fn disable(&self, email: &str) {
        if let Some(cred) = self.credentials.write().get_mut(email) {
            cred.disabled = true;
        }
    }

    /// Simulate an outage of the identity service: every verification
    /// fails with the retryable message.
    pub fn set_offline(&self, offline: bool) {
        *self.offline.write() = offline;
    }

    /// Whether `sign_out` has been invoked for this reference. Used by
    /// tests asserting that denials terminate the assertion.
    pub fn signed_out(&self, identity_ref: &str) -> bool {
        self.sign_outs
            .read()
            .iter()
            .any(|r| r == identity_ref)
    }
}

impl IdentityProvider for LocalIdentityProvider {
    fn verify_credentials(&self, email: &str, password: &str) -> Result<IdentityRef, AuthError> {
        if *self.offline.read() {
            return Err(AuthError::Unavailable);
        }
        let credentials = self.credentials.read();
        let Some(cred) = credentials.get(email) else {
            return Err(AuthError::InvalidCredentials);
        };
        if cred.disabled {
            return Err(AuthError::AccountDisabled);
        }
        if self
            .failed_attempts
            .read()
            .get(email)
            .is_some_and(|n| *n >= MAX_FAILED_ATTEMPTS)
        {
            return Err(AuthError::RateLimited);
        }
        if !verify_password(&cred.password_phc, password) {
            *self
                .failed_attempts
                .write()
                .entry(email.to_string())
                .or_insert(0) += 1;
            return Err(AuthError::InvalidCredentials);
        }
        self.failed_attempts.write().remove(email);
        info!(email = %email, "credentials verified");
        Ok(cred.identity_ref.clone())
    }

    fn sign_out(&self, identity_ref: &str) {
        info!(identity = %identity_ref, "assertion terminated");
        self.sign_outs.write().push(identity_ref.to_string());
    }
}

fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let argon2 = Argon2::default();
    let phc = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!(e.to_string()))?
        .to_string();
    Ok(phc)
}

fn verify_password(hash: &str, password: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        let argon2 = Argon2::default();
        argon2.verify_password(password.as_bytes(), &parsed).is_ok()
    } else {
        false
    }
}
