use crate::config::CorsignConfig;

/// URL of the remote signing endpoint.
pub fn sign_url(config: &CorsignConfig) -> String {
    format!("{}/sign", config.api_url)
}

/// URL of the remote validation endpoint for an encoded token.
pub fn validate_url(config: &CorsignConfig, token: &str) -> String {
    format!("{}/validate/{}", config.api_url, token)
}

/// Link a QR code should encode so a scanner lands on the validation page.
///
/// Rendering the QR image itself is left to the caller.
pub fn qr_validation_link(config: &CorsignConfig, token: &str) -> String {
    format!("{}/{}", config.validation_url, token)
}
