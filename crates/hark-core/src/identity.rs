//! Bot self-identity.

use serde::{Deserialize, Serialize};

/// Who the bot is on the platform.
///
/// Both fields stay empty until the first [`ConnectedEvent`](crate::ConnectedEvent)
/// arrives. The platform may report a message sender by either ID or name, so
/// self-detection compares against both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub user_name: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
        }
    }

    /// Returns `true` once the platform has told us who we are.
    pub fn is_known(&self) -> bool {
        !self.user_id.is_empty() || !self.user_name.is_empty()
    }

    /// Returns `true` if `sender` refers to the bot itself.
    ///
    /// Empty fields never match, otherwise an anonymous sender would be
    /// mistaken for the bot before the connection is established.
    pub fn is_self(&self, sender: &str) -> bool {
        (!self.user_id.is_empty() && self.user_id == sender)
            || (!self.user_name.is_empty() && self.user_name == sender)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_self_matches_id_or_name() {
        let identity = Identity::new("U123", "bot1");
        assert!(identity.is_self("U123"));
        assert!(identity.is_self("bot1"));
        assert!(!identity.is_self("U999"));
    }

    #[test]
    fn test_unknown_identity_never_matches() {
        let identity = Identity::default();
        assert!(!identity.is_known());
        assert!(!identity.is_self(""));
        assert!(!identity.is_self("U123"));
    }
}
