//! Client for the remote Corsign signing and validation service.
//!
//! Calls are single-shot: no retries and no timeout policy beyond what the
//! underlying `reqwest` client is configured with.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::CorsignConfig;
use crate::endpoints::{sign_url, validate_url};
use crate::error::Error;
use crate::schema::validate_payload;
use crate::structure::has_format_of_token;
use crate::types::payload::Payload;
use crate::types::token::Token;

/// Successful answer of the remote signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignResponse {
    /// Encoded, signed token
    pub token: String,
    /// Data URI of a QR code pointing at the validation page
    pub qr_code: String,
}

/// Remote signing and validation of Corsign tokens.
#[async_trait::async_trait]
pub trait CredentialService: Send + Sync {
    /// Have the service sign `payload`.
    async fn sign(
        &self,
        payload: &Payload,
        signer_token: &str,
        token_id: &str,
    ) -> Result<SignResponse, Error>;

    /// Have the service verify an encoded token and return its claims.
    async fn validate(&self, token: &str) -> Result<Token, Error>;
}

/// [`CredentialService`] over HTTPS.
pub struct HttpCredentialClient {
    config: CorsignConfig,
    http: reqwest::Client,
}

impl HttpCredentialClient {
    pub fn new(config: CorsignConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &CorsignConfig {
        &self.config
    }
}

/// Split the `{ data, errors }` envelope by HTTP status.
///
/// Error responses keep their status even when the body is not JSON.
async fn read_envelope(resp: reqwest::Response) -> Result<Value, Error> {
    let status = resp.status();
    let bytes = resp.bytes().await?;

    if !status.is_success() {
        let errors = serde_json::from_slice::<Value>(&bytes)
            .ok()
            .and_then(|mut body| body.get_mut("errors").map(Value::take))
            .unwrap_or(Value::Null);
        tracing::warn!(status = status.as_u16(), %errors, "remote call failed");
        return Err(Error::Remote {
            status: status.as_u16(),
            errors,
        });
    }

    let mut body: Value = serde_json::from_slice(&bytes)?;
    Ok(body.get_mut("data").map(Value::take).unwrap_or(Value::Null))
}

#[async_trait::async_trait]
impl CredentialService for HttpCredentialClient {
    async fn sign(
        &self,
        payload: &Payload,
        signer_token: &str,
        token_id: &str,
    ) -> Result<SignResponse, Error> {
        validate_payload(payload).into_result()?;

        let url = sign_url(&self.config);
        tracing::debug!(%url, token_id, "requesting remote signature");

        let resp = self
            .http
            .post(&url)
            .header("X-SIGNER-TOKEN", signer_token)
            .header("X-TOKEN-ID", token_id)
            .header("content-type", "application/json;charset=UTF-8")
            .body(serde_json::to_vec(payload)?)
            .send()
            .await?;

        let data = read_envelope(resp).await?;
        Ok(serde_json::from_value(data)?)
    }

    async fn validate(&self, token: &str) -> Result<Token, Error> {
        let url = validate_url(&self.config, token);
        tracing::debug!("requesting remote validation");

        let resp = self.http.get(&url).send().await?;
        let data = read_envelope(resp).await?;

        if !has_format_of_token(&data) {
            tracing::warn!("remote validation returned a value that is not a token");
            return Err(Error::MalformedCredential(
                "validation response does not match the token format".to_string(),
            ));
        }
        Ok(serde_json::from_value(data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::information::Information;
    use crate::types::person::Person;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn payload() -> Payload {
        let person = Person {
            phone_number: Some("+49 123 456 78".to_string()),
            ..Person::new("Max", "Mustermann")
        };
        Payload::with_information(person, Information::test_result(true, "pcr"))
    }

    fn client_for(server: &MockServer) -> HttpCredentialClient {
        let config = CorsignConfig::default().with_api_url(&format!("{}/v1", server.uri()));
        HttpCredentialClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_sign_sends_headers_and_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/sign"))
            .and(header("X-SIGNER-TOKEN", "signer-secret"))
            .and(header("X-TOKEN-ID", "token-1"))
            .and(body_json(serde_json::to_value(payload()).unwrap()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "token": "aaa.bbb.ccc", "qrCode": "data:image/png;base64,AAAA" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let resp = client
            .sign(&payload(), "signer-secret", "token-1")
            .await
            .unwrap();
        assert_eq!(resp.token, "aaa.bbb.ccc");
        assert_eq!(resp.qr_code, "data:image/png;base64,AAAA");
    }

    #[tokio::test]
    async fn test_sign_rejects_invalid_payload_locally() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let invalid = Payload::new(Person::new("Max", "Mustermann"));
        let result = client.sign(&invalid, "signer-secret", "token-1").await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_sign_surfaces_remote_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/sign"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "errors": [{ "message": "unknown signer" }]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        match client.sign(&payload(), "wrong", "token-1").await {
            Err(Error::Remote { status, errors }) => {
                assert_eq!(status, 401);
                assert_eq!(errors[0]["message"], "unknown signer");
            }
            other => panic!("expected remote error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_validate_returns_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/validate/aaa.bbb.ccc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "iss": "corsign.de",
                    "aud": "self",
                    "iat": 1618963200,
                    "pld": { "person": { "firstname": "Max", "lastname": "Mustermann" } }
                }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let token = client.validate("aaa.bbb.ccc").await.unwrap();
        assert_eq!(token.iss, "corsign.de");
        assert_eq!(token.iat, Some(1618963200));
        assert_eq!(token.pld.person.firstname, "Max");
    }

    #[tokio::test]
    async fn test_validate_rejects_malformed_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/validate/aaa.bbb.ccc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "iss": "corsign.de" }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.validate("aaa.bbb.ccc").await;
        assert!(matches!(result, Err(Error::MalformedCredential(_))));
    }

    #[test]
    fn test_client_keeps_config() {
        let config = CorsignConfig::default().with_api_url("https://signer.example/v1/");
        let client = HttpCredentialClient::new(config.clone()).unwrap();
        assert_eq!(client.config(), &config);
        assert_eq!(client.config().api_url, "https://signer.example/v1");
    }

    #[tokio::test]
    async fn test_remote_error_without_json_body_keeps_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/sign"))
            .respond_with(
                ResponseTemplate::new(502)
                    .set_body_string("<html><body>Bad Gateway</body></html>")
                    .insert_header("content-type", "text/html"),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        match client.sign(&payload(), "signer-secret", "token-1").await {
            Err(Error::Remote { status, errors }) => {
                assert_eq!(status, 502);
                assert_eq!(errors, Value::Null);
            }
            other => panic!("expected remote error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_success_without_json_body_is_json_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.validate("aaa.bbb.ccc").await;
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[tokio::test]
    async fn test_validate_surfaces_remote_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "errors": ["invalid signature"]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.validate("aaa.bbb.ccc").await;
        assert!(matches!(result, Err(Error::Remote { status: 400, .. })));
    }
}
