use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use uuid::Uuid;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Failed logins in a row before an account is throttled.
const MAX_FAILED_LOGINS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    pub display_name: String,
}

/// Structured failure reported by an identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthErrorCode {
    InvalidEmail,
    UserNotFound,
    WrongPassword,
    EmailAlreadyInUse,
    WeakPassword,
    TooManyRequests,
    NetworkUnavailable,
    UserDisabled,
    /// A required field was left empty; raised before the provider is called.
    MissingField,
    Unknown,
}

impl AuthErrorCode {
    /// User-facing text for this failure.
    pub const fn message(self) -> &'static str {
        match self {
            AuthErrorCode::InvalidEmail => "Please enter a valid email address.",
            AuthErrorCode::UserNotFound => "No account found with this email.",
            AuthErrorCode::WrongPassword => "Incorrect password. Please try again.",
            AuthErrorCode::EmailAlreadyInUse => "An account with this email already exists.",
            AuthErrorCode::WeakPassword => "Password must be at least 6 characters.",
            AuthErrorCode::TooManyRequests => "Too many attempts. Please try again later.",
            AuthErrorCode::NetworkUnavailable => "Network error. Check your connection.",
            AuthErrorCode::UserDisabled => "This account has been disabled.",
            AuthErrorCode::MissingField => "Please fill in all fields.",
            AuthErrorCode::Unknown => "Something went wrong. Please try again.",
        }
    }

    /// Maps a provider wire code such as `auth/user-not-found`.
    pub fn from_code(code: &str) -> Self {
        let code = code.strip_prefix("auth/").unwrap_or(code);
        match code {
            "invalid-email" => AuthErrorCode::InvalidEmail,
            "user-not-found" => AuthErrorCode::UserNotFound,
            "wrong-password" | "invalid-credential" => AuthErrorCode::WrongPassword,
            "email-already-in-use" => AuthErrorCode::EmailAlreadyInUse,
            "weak-password" => AuthErrorCode::WeakPassword,
            "too-many-requests" => AuthErrorCode::TooManyRequests,
            "network-request-failed" => AuthErrorCode::NetworkUnavailable,
            "user-disabled" => AuthErrorCode::UserDisabled,
            _ => AuthErrorCode::Unknown,
        }
    }
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for AuthErrorCode {}

/// Boundary to whatever service owns user accounts.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<UserProfile, AuthErrorCode>;

    async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<UserProfile, AuthErrorCode>;

    async fn reset_password(&self, email: &str) -> Result<(), AuthErrorCode>;
}

pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

/// Validates credentials locally before they reach the provider and tracks
/// the signed-in user.
pub struct AuthService<P> {
    provider: P,
    current: watch::Sender<Option<UserProfile>>,
}

impl<P: IdentityProvider> AuthService<P> {
    pub fn new(provider: P) -> Self {
        let (current, _) = watch::channel(None);
        Self { provider, current }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<UserProfile>> {
        self.current.subscribe()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, AuthErrorCode> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthErrorCode::MissingField);
        }
        if !is_valid_email(email) {
            return Err(AuthErrorCode::InvalidEmail);
        }
        let result = self.provider.login(email, password).await;
        self.finish("login", email, result)
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<UserProfile, AuthErrorCode> {
        let email = email.trim();
        let display_name = display_name.trim();
        if email.is_empty() || password.is_empty() || display_name.is_empty() {
            return Err(AuthErrorCode::MissingField);
        }
        if !is_valid_email(email) {
            return Err(AuthErrorCode::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthErrorCode::WeakPassword);
        }
        let result = self.provider.register(email, password, display_name).await;
        self.finish("register", email, result)
    }

    pub async fn reset_password(&self, email: &str) -> Result<(), AuthErrorCode> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthErrorCode::MissingField);
        }
        if !is_valid_email(email) {
            return Err(AuthErrorCode::InvalidEmail);
        }
        let result = self.provider.reset_password(email).await;
        if let Err(code) = result {
            tracing::info!(email = %email, error = ?code, "password reset failed");
        }
        result
    }

    pub fn logout(&self) {
        if let Some(user) = self.current.send_replace(None) {
            tracing::info!(uid = %user.uid, "signed out");
        }
    }

    fn finish(
        &self,
        action: &'static str,
        email: &str,
        result: Result<UserProfile, AuthErrorCode>,
    ) -> Result<UserProfile, AuthErrorCode> {
        match &result {
            Ok(user) => {
                tracing::info!(action, uid = %user.uid, "signed in");
                self.current.send_replace(Some(user.clone()));
            }
            Err(code) => {
                tracing::info!(action, email = %email, error = ?code, "authentication failed");
            }
        }
        result
    }
}

#[derive(Debug)]
struct Account {
    profile: UserProfile,
    digest: Vec<u8>,
    disabled: bool,
    failed_logins: u32,
}

#[derive(Debug, Default)]
struct Directory {
    accounts: HashMap<String, Account>,
    reset_requests: Vec<String>,
    offline: bool,
}

/// Account store kept in process memory. Passwords are held only as salted
/// SHA-256 digests.
#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    directory: Mutex<Directory>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates losing the connection to the backend.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    pub fn disable(&self, email: &str) -> bool {
        match self.lock().accounts.get_mut(&normalize(email)) {
            Some(account) => {
                account.disabled = true;
                true
            }
            None => false,
        }
    }

    /// Emails a reset link was sent to, oldest first.
    pub fn reset_requests(&self) -> Vec<String> {
        self.lock().reset_requests.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Directory> {
        self.directory.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn login(&self, email: &str, password: &str) -> Result<UserProfile, AuthErrorCode> {
        let mut dir = self.lock();
        if dir.offline {
            return Err(AuthErrorCode::NetworkUnavailable);
        }
        let account = dir
            .accounts
            .get_mut(&normalize(email))
            .ok_or(AuthErrorCode::UserNotFound)?;
        if account.disabled {
            return Err(AuthErrorCode::UserDisabled);
        }
        if account.failed_logins >= MAX_FAILED_LOGINS {
            return Err(AuthErrorCode::TooManyRequests);
        }
        if digest(&account.profile.uid, password) != account.digest {
            account.failed_logins += 1;
            return Err(AuthErrorCode::WrongPassword);
        }
        account.failed_logins = 0;
        Ok(account.profile.clone())
    }

    async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<UserProfile, AuthErrorCode> {
        let mut dir = self.lock();
        if dir.offline {
            return Err(AuthErrorCode::NetworkUnavailable);
        }
        if !is_valid_email(email) {
            return Err(AuthErrorCode::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthErrorCode::WeakPassword);
        }
        let key = normalize(email);
        if dir.accounts.contains_key(&key) {
            return Err(AuthErrorCode::EmailAlreadyInUse);
        }
        let uid = Uuid::new_v4().to_string();
        let profile = UserProfile {
            uid: uid.clone(),
            email: email.to_string(),
            display_name: display_name.to_string(),
        };
        dir.accounts.insert(
            key,
            Account {
                profile: profile.clone(),
                digest: digest(&uid, password),
                disabled: false,
                failed_logins: 0,
            },
        );
        Ok(profile)
    }

    async fn reset_password(&self, email: &str) -> Result<(), AuthErrorCode> {
        let mut dir = self.lock();
        if dir.offline {
            return Err(AuthErrorCode::NetworkUnavailable);
        }
        let key = normalize(email);
        if !dir.accounts.contains_key(&key) {
            return Err(AuthErrorCode::UserNotFound);
        }
        dir.reset_requests.push(key);
        Ok(())
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn digest(salt: &str, password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("ann@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.org"));
        assert!(!is_valid_email("ann"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ann@example"));
        assert!(!is_valid_email("ann@@example.com"));
        assert!(!is_valid_email("ann@example..com"));
        assert!(!is_valid_email("an n@example.com"));
    }

    #[test]
    fn provider_codes_map_to_catalog() {
        assert_eq!(
            AuthErrorCode::from_code("auth/user-not-found"),
            AuthErrorCode::UserNotFound
        );
        assert_eq!(
            AuthErrorCode::from_code("network-request-failed"),
            AuthErrorCode::NetworkUnavailable
        );
        assert_eq!(AuthErrorCode::from_code("auth/quota"), AuthErrorCode::Unknown);
        assert_eq!(
            AuthErrorCode::WeakPassword.to_string(),
            "Password must be at least 6 characters."
        );
    }

    #[test]
    fn digests_are_salted() {
        assert_ne!(digest("a", "secret"), digest("b", "secret"));
        assert_eq!(digest("a", "secret").len(), 32);
    }
}
