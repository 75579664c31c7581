use secrecy::SecretString;

/// Read-only source of the bearer token attached to every backend request.
pub trait AuthContext: Send + Sync {
    fn access_token(&self) -> Option<SecretString>;
}

#[derive(Clone, Debug)]
pub struct StaticToken {
    token: SecretString,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        let token: String = token.into();
        Self { token: token.into() }
    }
}

impl From<SecretString> for StaticToken {
    fn from(token: SecretString) -> Self {
        Self { token }
    }
}

impl AuthContext for StaticToken {
    fn access_token(&self) -> Option<SecretString> {
        Some(self.token.clone())
    }
}

/// Sends requests without an `Authorization` header.
#[derive(Clone, Copy, Debug, Default)]
pub struct Anonymous;

impl AuthContext for Anonymous {
    fn access_token(&self) -> Option<SecretString> {
        None
    }
}
