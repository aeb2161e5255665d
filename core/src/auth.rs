//! Authentication endpoints: login, two-factor setup, current user.
//!
//! Nothing here hashes passwords or checks 2FA codes locally. The server
//! decides; the client only carries values across.

use crate::client::{AlistClient, Endpoint};
use crate::error::ApiError;
use crate::transport::NO_BODY;
use crate::types::{Credentials, LoginData, TwoFactorSecret, UserProfile, VerifyTwoFactor};

pub const LOGIN: Endpoint = Endpoint::post("/api/auth/login");
pub const LOGIN_HASH: Endpoint = Endpoint::post("/api/auth/login/hash");
pub const GENERATE_2FA: Endpoint = Endpoint::post("/api/auth/2fa/generate");
pub const VERIFY_2FA: Endpoint = Endpoint::post("/api/auth/2fa/verify");
pub const ME: Endpoint = Endpoint::get("/api/me");

impl AlistClient {
    /// Log in with a plaintext password and return the access token.
    ///
    /// `opt_code` is the current one-time code for accounts with 2FA enabled
    /// and is left out of the request when `None`.
    pub fn login(
        &self,
        username: &str,
        password: &str,
        opt_code: Option<&str>,
    ) -> Result<String, ApiError> {
        self.login_at(LOGIN, username, password, opt_code)
    }

    /// Log in with a password the caller has already hashed.
    pub fn login_with_hash(
        &self,
        username: &str,
        hashed_password: &str,
        opt_code: Option<&str>,
    ) -> Result<String, ApiError> {
        self.login_at(LOGIN_HASH, username, hashed_password, opt_code)
    }

    fn login_at(
        &self,
        endpoint: Endpoint,
        username: &str,
        password: &str,
        opt_code: Option<&str>,
    ) -> Result<String, ApiError> {
        let body = Credentials {
            username: username.to_string(),
            password: password.to_string(),
            opt_code: opt_code.map(str::to_string),
        };
        let data: LoginData = self.call(endpoint, None, Some(&body))?;
        Ok(data.token)
    }

    /// Start 2FA enrolment. The returned secret is what `verify_2fa` expects.
    pub fn generate_2fa(&self, token: &str) -> Result<TwoFactorSecret, ApiError> {
        self.call(GENERATE_2FA, Some(token), NO_BODY)
    }

    /// Confirm 2FA enrolment with a code derived from `secret`.
    pub fn verify_2fa(&self, token: &str, code: &str, secret: &str) -> Result<(), ApiError> {
        let body = VerifyTwoFactor {
            code: code.to_string(),
            secret: secret.to_string(),
        };
        self.call_unit(VERIFY_2FA, Some(token), Some(&body))
    }

    pub fn user_info(&self, token: &str) -> Result<UserProfile, ApiError> {
        self.call(ME, Some(token), NO_BODY)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::client::testing::{body_json, client, BASE_URL};
    use crate::error::{ApiError, TransportError};
    use crate::http::HttpMethod;
    use crate::transport::testing::FakeExecutor;

    #[test]
    fn login_returns_token() {
        let fake = FakeExecutor::replying(200, r#"{"code":200,"message":"ok","data":{"token":"abc123"}}"#);
        let token = client(&fake).login("testuser", "testpassword", None).unwrap();
        assert_eq!(token, "abc123");

        let req = fake.last_request();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, format!("{BASE_URL}/api/auth/login"));
        assert_eq!(req.header("authorization"), None);
        assert_eq!(
            body_json(&fake),
            json!({"username": "testuser", "password": "testpassword"})
        );
    }

    #[test]
    fn login_wrong_password_is_api_error() {
        let fake = FakeExecutor::replying(200, r#"{"code":400,"message":"wrong password","data":null}"#);
        let err = client(&fake).login("testuser", "nope", None).unwrap_err();
        assert_eq!(
            err,
            ApiError::Api {
                code: 400,
                message: "wrong password".to_string()
            }
        );
    }

    #[test]
    fn login_sends_opt_code_when_given() {
        let fake = FakeExecutor::replying(200, r#"{"code":200,"message":"ok","data":{"token":"t"}}"#);
        client(&fake).login("testuser", "testpassword", Some("123456")).unwrap();
        assert_eq!(body_json(&fake)["opt_code"], "123456");
    }

    #[test]
    fn login_with_hash_passes_hash_through() {
        let fake = FakeExecutor::replying(200, r#"{"code":200,"message":"ok","data":{"token":"h1"}}"#);
        let token = client(&fake)
            .login_with_hash("testuser", "hashedpassword", None)
            .unwrap();
        assert_eq!(token, "h1");
        assert_eq!(fake.last_request().url, format!("{BASE_URL}/api/auth/login/hash"));
        assert_eq!(body_json(&fake)["password"], "hashedpassword");
    }

    #[test]
    fn login_gateway_error_is_protocol_error() {
        let fake = FakeExecutor::replying(502, "Bad Gateway");
        let err = client(&fake).login("testuser", "testpassword", None).unwrap_err();
        assert_eq!(
            err,
            ApiError::Protocol {
                status: 502,
                body: "Bad Gateway".to_string()
            }
        );
    }

    #[test]
    fn login_transport_failure_is_surfaced() {
        let fake = FakeExecutor::failing(TransportError::Connection("refused".to_string()));
        let err = client(&fake).login("testuser", "testpassword", None).unwrap_err();
        assert_eq!(err, ApiError::Transport(TransportError::Connection("refused".to_string())));
    }

    #[test]
    fn generate_2fa_sends_no_body() {
        let fake = FakeExecutor::replying(
            200,
            r#"{"code":200,"message":"success","data":{"qr":"data:image/png;base64,AAAA","secret":"JBSWY3DP"}}"#,
        );
        let secret = client(&fake).generate_2fa("abc123").unwrap();
        assert_eq!(secret.secret, "JBSWY3DP");

        let req = fake.last_request();
        assert_eq!(req.url, format!("{BASE_URL}/api/auth/2fa/generate"));
        assert_eq!(req.header("Authorization"), Some("Bearer abc123"));
        assert!(req.body.is_none());
    }

    #[test]
    fn verify_2fa_sends_code_and_secret() {
        let fake = FakeExecutor::replying(200, r#"{"code":200,"message":"success","data":null}"#);
        client(&fake).verify_2fa("abc123", "123456", "JBSWY3DP").unwrap();
        assert_eq!(body_json(&fake), json!({"code": "123456", "secret": "JBSWY3DP"}));
    }

    #[test]
    fn verify_2fa_bad_code_is_api_error() {
        let fake = FakeExecutor::replying(200, r#"{"code":400,"message":"Invalid 2FA code","data":null}"#);
        let err = client(&fake).verify_2fa("abc123", "000000", "JBSWY3DP").unwrap_err();
        assert_eq!(err.api_code(), Some(400));
    }

    #[test]
    fn user_info_uses_get() {
        let fake = FakeExecutor::replying(
            200,
            r#"{"code":200,"message":"success","data":{"id":1,"username":"testuser","password":"","base_path":"/","role":0,"disabled":false,"permission":0,"sso_id":"","opt":false}}"#,
        );
        let user = client(&fake).user_info("abc123").unwrap();
        assert_eq!(user.username, "testuser");

        let req = fake.last_request();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, format!("{BASE_URL}/api/me"));
    }

    #[test]
    fn user_info_with_bad_token_never_succeeds() {
        let fake = FakeExecutor::replying(200, r#"{"code":401,"message":"that token is invalid","data":null}"#);
        let err = client(&fake).user_info("").unwrap_err();
        assert_eq!(err.api_code(), Some(401));
    }

    #[test]
    fn user_info_shape_mismatch_is_decode_error() {
        let fake = FakeExecutor::replying(200, r#"{"code":200,"message":"success","data":{"id":"one"}}"#);
        let err = client(&fake).user_info("abc123").unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
