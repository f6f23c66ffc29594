/// Base URL of the public Corsign service.
pub const DEFAULT_API_URL: &str = "https://corsign.de/v1";

/// URL that QR codes point to, followed by `/{token}`.
pub const DEFAULT_VALIDATION_URL: &str = "https://corsign.de/v1/validate";

/// Where the remote signing service and the QR validation page live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsignConfig {
    pub api_url: String,
    pub validation_url: String,
}

impl Default for CorsignConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            validation_url: DEFAULT_VALIDATION_URL.to_string(),
        }
    }
}

impl CorsignConfig {
    /// Point the API at another deployment. Trailing slashes are dropped.
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_validation_url(mut self, validation_url: &str) -> Self {
        self.validation_url = validation_url.trim_end_matches('/').to_string();
        self
    }
}
