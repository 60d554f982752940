use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};

/// Default session file, relative to the working directory.
pub const DEFAULT_SESSION_FILE: &str = ".qrz_session";

/// Where the session token lives between runs.
pub trait TokenStore {
    /// The stored token, or `None` if nothing (or only whitespace) is stored.
    fn read_token(&self) -> Result<Option<String>>;

    /// Replace the stored token.
    fn write_token(&self, token: &str) -> Result<()>;

    /// Time since the token was last written, or `None` if nothing is stored.
    fn age(&self) -> Result<Option<Duration>>;

    /// Forget the stored token.
    fn clear(&self) -> Result<()>;
}

/// Plain-text token file; its age is the file's modification time.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileTokenStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_FILE)
    }
}

impl TokenStore for FileTokenStore {
    fn read_token(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session file {}", self.path.display()))?;
        let token = contents.trim();
        Ok((!token.is_empty()).then(|| token.to_string()))
    }

    fn write_token(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, token)
            .with_context(|| format!("Failed to write session file {}", self.path.display()))
    }

    fn age(&self) -> Result<Option<Duration>> {
        let metadata = match std::fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to stat session file {}", self.path.display())
                })
            }
        };
        let modified = metadata
            .modified()
            .context("Session file modification time unavailable")?;
        // A timestamp in the future (clock skew) counts as brand new
        Ok(Some(modified.elapsed().unwrap_or(Duration::ZERO)))
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove session file {}", self.path.display()))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct StoredToken {
    token: String,
    written_at: SystemTime,
}

/// Token store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entry: RefCell<Option<StoredToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a token written `age` ago.
    pub fn with_token(token: &str, age: Duration) -> Self {
        let written_at = SystemTime::now()
            .checked_sub(age)
            .unwrap_or(SystemTime::UNIX_EPOCH);
        Self {
            entry: RefCell::new(Some(StoredToken {
                token: token.to_string(),
                written_at,
            })),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn read_token(&self) -> Result<Option<String>> {
        Ok(self
            .entry
            .borrow()
            .as_ref()
            .map(|e| e.token.trim().to_string())
            .filter(|t| !t.is_empty()))
    }

    fn write_token(&self, token: &str) -> Result<()> {
        *self.entry.borrow_mut() = Some(StoredToken {
            token: token.to_string(),
            written_at: SystemTime::now(),
        });
        Ok(())
    }

    fn age(&self) -> Result<Option<Duration>> {
        Ok(self
            .entry
            .borrow()
            .as_ref()
            .map(|e| e.written_at.elapsed().unwrap_or(Duration::ZERO)))
    }

    fn clear(&self) -> Result<()> {
        self.entry.borrow_mut().take();
        Ok(())
    }
}
