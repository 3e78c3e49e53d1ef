use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;

/// Whether an authentication attempt signs in or creates an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

impl AuthMode {
    /// API path for this mode, relative to the base URL.
    pub fn path(&self) -> &'static str {
        match self {
            AuthMode::Login => "/auth/login",
            AuthMode::Register => "/auth/register",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AuthMode::Login => "Login",
            AuthMode::Register => "Register",
        }
    }
}

/// Username and password as sent to the auth endpoints.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Value for the `Authorization` header: `Basic base64(username:password)`.
    pub fn authorization_header(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(raw))
    }
}

// Never print the password.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_header() {
        let creds = Credentials::new("ash", "pikachu");
        assert_eq!(creds.authorization_header(), "Basic YXNoOnBpa2FjaHU=");
    }

    #[test]
    fn test_authorization_header_keeps_colons_in_password() {
        let creds = Credentials::new("misty", "a:b");
        // base64("misty:a:b")
        assert_eq!(creds.authorization_header(), "Basic bWlzdHk6YTpi");
    }

    #[test]
    fn test_debug_hides_password() {
        let creds = Credentials::new("brock", "onix");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("brock"));
        assert!(!debug.contains("onix"));
    }

    #[test]
    fn test_auth_mode_paths() {
        assert_eq!(AuthMode::Login.path(), "/auth/login");
        assert_eq!(AuthMode::Register.path(), "/auth/register");
        assert_eq!(AuthMode::Login.toggle(), AuthMode::Register);
        assert_eq!(AuthMode::Register.toggle(), AuthMode::Login);
    }
}
