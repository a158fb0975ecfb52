/// Google OAuth2 authorization endpoint.
pub const AUTHORIZATION_URL: &str = "https://accounts.google.com/o/oauth2/auth";
/// Google OAuth2 token endpoint.
pub const TOKEN_URL: &str = "https://www.googleapis.com/oauth2/v3/token";
/// Out-of-band redirect URI for installed applications.
pub const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// Endpoint set used by the authorization flow and token refresh.
///
/// Defaults to the Google endpoints; override for tests or other deployments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthEndpoints {
    pub authorization_url: String,
    pub token_url: String,
    pub redirect_uri: String,
}

impl Default for OAuthEndpoints {
    fn default() -> Self {
        Self {
            authorization_url: AUTHORIZATION_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            redirect_uri: OOB_REDIRECT_URI.to_string(),
        }
    }
}

impl OAuthEndpoints {
    pub fn with_authorization_url(mut self, url: impl Into<String>) -> Self {
        self.authorization_url = url.into();
        self
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }
}
