//! OAuth2 identity keys.

use std::fmt;

/// Attribute holding the provider-supplied email.
pub const OAUTH2_EMAIL: &str = "email";
/// Attribute holding the provider-scoped user id.
pub const OAUTH2_UID: &str = "uid";
/// Attribute holding the provider-supplied display name.
pub const OAUTH2_NAME: &str = "name";

const PREFIX: &str = "oauth2";
const SEPARATOR: &str = ";;";

/// Composite identity key `oauth2;;<provider>;;<uid>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OAuth2Pid {
    pub provider: String,
    pub uid: String,
}

impl OAuth2Pid {
    pub fn new(provider: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            uid: uid.into(),
        }
    }

    /// Decodes an identity key.
    ///
    /// Returns `None` when the key is a plain PID.
    pub fn parse(key: &str) -> Option<Self> {
        let mut parts = key.split(SEPARATOR);

        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(PREFIX), Some(provider), Some(uid), None)
                if !provider.is_empty() && !uid.is_empty() =>
            {
                Some(Self::new(provider, uid))
            },
            _ => None,
        }
    }
}

impl fmt::Display for OAuth2Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{PREFIX}{SEPARATOR}{}{SEPARATOR}{}",
            self.provider, self.uid
        )
    }
}
