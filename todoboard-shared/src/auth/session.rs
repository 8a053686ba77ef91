/// Server-side login sessions
///
/// A successful login creates a session and hands the client an opaque token
/// to keep in the `sid` cookie. The store never holds the token itself, only
/// its SHA-256 digest, so a dump of the session map cannot be replayed.
///
/// # Token Format
///
/// 48 random base62 characters (`[A-Za-z0-9]`), about 285 bits of entropy.
///
/// # Expiry
///
/// Sessions live for a fixed TTL (8 hours by default). Expired sessions are
/// rejected and dropped when they are looked up, and swept on every new login.
///
/// # Example
///
/// ```
/// use chrono::{Duration, Utc};
/// use todoboard_shared::auth::session::SessionStore;
/// use uuid::Uuid;
///
/// # async fn example() {
/// let sessions = SessionStore::new(Duration::hours(8));
/// let user_id = Uuid::new_v4();
///
/// let token = sessions.create(user_id, "alice").await;
/// let session = sessions.resolve(&token).await.unwrap();
/// assert_eq!(session.user_id, user_id);
///
/// sessions.destroy(&token).await;
/// assert!(sessions.resolve(&token).await.is_none());
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "sid";

/// Default session lifetime in seconds (8 hours)
pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 8 * 60 * 60;

/// Longest accepted session lifetime in seconds (365 days)
pub const MAX_SESSION_TTL_SECONDS: i64 = 365 * 24 * 60 * 60;

/// Length of a session token (characters)
pub const TOKEN_LENGTH: usize = 48;

/// An authenticated session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// In-process session store keyed by token digest
#[derive(Debug)]
pub struct SessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a store from a lifetime in seconds, clamped to
    /// `0..=MAX_SESSION_TTL_SECONDS`
    pub fn from_seconds(ttl_seconds: i64) -> Self {
        Self::new(Duration::seconds(ttl_seconds.clamp(0, MAX_SESSION_TTL_SECONDS)))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Starts a session for `user_id` and returns its plaintext token
    pub async fn create(&self, user_id: Uuid, username: &str) -> String {
        let now = Utc::now();
        let token = generate_token();

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        if sessions.len() < before {
            debug!(swept = before - sessions.len(), "Swept expired sessions");
        }

        sessions.insert(
            hash_token(&token),
            Session {
                user_id,
                username: username.to_string(),
                expires_at: now + self.ttl,
            },
        );

        token
    }

    /// Looks up a live session by token
    ///
    /// Returns `None` for unknown or expired tokens; expired ones are removed.
    pub async fn resolve(&self, token: &str) -> Option<Session> {
        let key = hash_token(token);
        let now = Utc::now();

        {
            let sessions = self.sessions.read().await;
            match sessions.get(&key) {
                None => return None,
                Some(session) if !session.is_expired(now) => return Some(session.clone()),
                Some(_) => {}
            }
        }

        self.sessions.write().await.remove(&key);
        None
    }

    /// Ends a session; returns whether one existed
    pub async fn destroy(&self, token: &str) -> bool {
        self.sessions.write().await.remove(&hash_token(token)).is_some()
    }

    /// Number of stored sessions, including not-yet-swept expired ones
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_SESSION_TTL_SECONDS))
    }
}

fn generate_token() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..TOKEN_LENGTH)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

/// Hex-encoded SHA-256 of a token
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
