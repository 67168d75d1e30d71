use std::fmt;

/// The signed-in caller, as resolved by the auth collaborator.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub access_token: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            access_token: access_token.into(),
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("user_id", &self.user_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_output_never_contains_access_token() {
        let identity = Identity::new("user-1", "secret-token-value");

        let rendered = format!("{:?}", identity);

        assert!(rendered.contains("user-1"));
        assert!(!rendered.contains("secret-token-value"));
    }
}
