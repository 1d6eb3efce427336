//! Persistence for the access/refresh token pair

use super::error::ClientError;
use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Bearer credentials held between requests
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokens {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl Tokens {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

impl std::fmt::Debug for Tokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokens")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Storage backing the client's credentials
pub trait TokenStore: Send + Sync {
    /// Current snapshot of the stored tokens
    fn tokens(&self) -> Tokens;

    /// Replace both tokens
    ///
    /// # Errors
    ///
    /// Returns an error if the tokens cannot be persisted
    fn store(&self, tokens: Tokens) -> Result<(), ClientError>;

    /// Forget both tokens
    ///
    /// # Errors
    ///
    /// Returns an error if persisted tokens cannot be removed
    fn clear(&self) -> Result<(), ClientError>;

    fn access_token(&self) -> Option<String> {
        self.tokens().access_token
    }

    fn refresh_token(&self) -> Option<String> {
        self.tokens().refresh_token
    }

    /// Replace the access token, keeping the refresh token
    ///
    /// # Errors
    ///
    /// Returns an error if the tokens cannot be persisted
    fn set_access_token(&self, token: &str) -> Result<(), ClientError> {
        let mut tokens = self.tokens();
        tokens.access_token = Some(token.to_string());
        self.store(tokens)
    }
}

/// Tokens kept in process memory only
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: ArcSwap<Tokens>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_tokens(tokens: Tokens) -> Self {
        Self {
            tokens: ArcSwap::from_pointee(tokens),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn tokens(&self) -> Tokens {
        self.tokens.load().as_ref().clone()
    }

    fn store(&self, tokens: Tokens) -> Result<(), ClientError> {
        self.tokens.store(Arc::new(tokens));
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        self.tokens.store(Arc::default());
        Ok(())
    }
}

/// Tokens persisted as JSON so a session survives between CLI invocations
///
/// Reads are served from memory; every change is written through to disk.
pub struct FileTokenStore {
    path: PathBuf,
    cache: MemoryTokenStore,
}

impl FileTokenStore {
    /// Open the store at `path`, loading any session saved there
    ///
    /// A missing file is an empty session. An unreadable or corrupt file is
    /// logged and treated as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let path = path.into();
        let tokens = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Ignoring corrupt session file");
                Tokens::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Tokens::default(),
            Err(e) => return Err(ClientError::storage(path, e)),
        };

        Ok(Self {
            path,
            cache: MemoryTokenStore::with_tokens(tokens),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, tokens: &Tokens) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ClientError::storage(parent, e))?;
        }
        let content = serde_json::to_vec_pretty(tokens)?;
        write_private(&self.path, &content).map_err(|e| ClientError::storage(&self.path, e))?;
        debug!(path = %self.path.display(), "Saved session tokens");
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn tokens(&self) -> Tokens {
        self.cache.tokens()
    }

    fn store(&self, tokens: Tokens) -> Result<(), ClientError> {
        self.persist(&tokens)?;
        self.cache.store(tokens)
    }

    fn clear(&self) -> Result<(), ClientError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed session file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(ClientError::storage(&self.path, e)),
        }
        self.cache.clear()
    }
}

#[cfg(unix)]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(content)
}

#[cfg(not(unix))]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, content)
}
