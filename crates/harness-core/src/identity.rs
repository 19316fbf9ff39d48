//! Identity resolution
//!
//! Determines which role/user a scenario authenticates as. Precedence:
//! a process-level override always wins; otherwise the first scenario tag
//! matching the `role_` prefix convention; neither source is a fatal
//! configuration error for that scenario.

use crate::error::IdentityError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

/// Tag prefix marking a scenario's role, e.g. `role_admin`
pub const ROLE_TAG_PREFIX: &str = "role_";

/// Environment variable carrying the process-level role override
pub const ROLE_VAR: &str = "HARNESS_ROLE";

/// The (role, username) pair a scenario authenticates as.
///
/// Immutable; recreated per scenario from resolution inputs. Multiple
/// scenarios may share one identity, which is exactly what makes the
/// session artifact reusable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    role: String,
    username: String,
}

impl Identity {
    /// Create an identity.
    #[inline]
    #[must_use]
    pub fn new(role: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            username: username.into(),
        }
    }

    /// Role name
    #[inline]
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Username
    #[inline]
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Cache key deriving the session artifact name: `<role>_<username>`
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!("{}_{}", self.role, self.username)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.role, self.username)
    }
}

/// Login credentials for a role. `Debug` redacts the password so it never
/// leaks into logs or failure reports.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account username
    pub username: String,
    /// Account password
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Maps a role to its credentials. External collaborator; typically backed
/// by a secrets file or environment in real suites and by
/// `StaticCredentials` in tests.
pub trait CredentialProvider: Send + Sync {
    /// Look up credentials for `role`.
    ///
    /// # Errors
    /// [`IdentityError::UnknownRole`] when the role is not configured.
    fn credentials(&self, role: &str) -> Result<Credentials, IdentityError>;
}

/// Resolve the role a scenario runs as.
///
/// A non-blank `override_role` wins unconditionally (trimmed, lowercased).
/// Otherwise the first tag in declaration order matching
/// [`ROLE_TAG_PREFIX`] yields the role; a leading `@` on tags is tolerated.
///
/// Pure function of its inputs.
///
/// # Errors
/// [`IdentityError::RoleUnresolved`] when neither source yields a role.
pub fn resolve_role<S: AsRef<str>>(
    tags: &[S],
    override_role: Option<&str>,
) -> Result<String, IdentityError> {
    if let Some(overridden) = override_role {
        let overridden = overridden.trim();
        if !overridden.is_empty() {
            return Ok(overridden.to_lowercase());
        }
    }

    for tag in tags {
        let tag = tag.as_ref().trim();
        let tag = tag.strip_prefix('@').unwrap_or(tag);
        if let Some(role) = tag.strip_prefix(ROLE_TAG_PREFIX) {
            if !role.is_empty() {
                return Ok(role.to_string());
            }
        }
    }

    Err(IdentityError::RoleUnresolved)
}

/// Role override from the process environment (`HARNESS_ROLE`), if any.
#[must_use]
pub fn role_override_from_env() -> Option<String> {
    env::var(ROLE_VAR).ok().filter(|v| !v.trim().is_empty())
}
