use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

use crate::Config;

/// Authenticated role. Anything the server sends that is not `admin` is
/// treated as a regular user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    #[serde(other)]
    User,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s.eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::User
        })
    }
}

/// The client's record of an authenticated identity: an opaque bearer token,
/// the role, and a display name. Persisted at ~/.evx/session.toml.
///
/// Single-writer policy: only `store` (login) and `clear` (logout, or an
/// authentication rejection from the API) touch the file. Every other
/// component reads through `current`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub role: Role,
    pub name: String,
}

impl Session {
    /// Session file path: ~/.evx/session.toml
    pub fn file_path() -> PathBuf {
        Config::dir().join("session.toml")
    }

    /// The stored session, if one exists.
    pub fn current() -> Option<Session> {
        Self::read_from(&Self::file_path())
    }

    /// Persist a freshly authenticated session.
    pub fn store(&self) -> io::Result<()> {
        Self::write_to(&Self::file_path(), self)
    }

    /// Destroy the stored session. Succeeds when no session exists.
    pub fn clear() -> io::Result<()> {
        Self::remove_at(&Self::file_path())
    }

    // --- Path-parameterized internals (shared with tests) ---

    fn read_from(path: &Path) -> Option<Session> {
        let contents = std::fs::read_to_string(path).ok()?;
        toml::from_str(&contents).ok()
    }

    fn write_to(path: &Path, session: &Session) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string(session).map_err(io::Error::other)?;
        std::fs::write(path, contents)
    }

    fn remove_at(path: &Path) -> io::Result<()> {
        match std::fs::remove_file(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

/// Outcome of a route-level capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Allow,
    RedirectLogin,
}

/// Decide whether the current session may reach a view. Evaluated once
/// before a command runs rather than branching inline in each view.
pub fn authorize(session: Option<&Session>, admin_required: bool) -> Gate {
    match session {
        None => Gate::RedirectLogin,
        Some(s) if admin_required && !s.role.is_admin() => Gate::RedirectLogin,
        Some(_) => Gate::Allow,
    }
}
