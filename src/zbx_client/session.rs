use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::Result;
use crate::error::{Error, ProtocolError, ZbxError};
use crate::types::LoginMethod;

use super::rpc::json_kind;

/// Login name and password used for the session's single login call.
#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<SecretString>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Authentication state shared by every clone of a client.
///
/// The token is written once per successful login and read by every call.
/// `login_gate` serialises the login transition only, so concurrent callers
/// that find no token wait for the one login in flight and take its outcome
/// instead of issuing their own. `attempts` counts finished logins; a waiter
/// that sees it move while queued joined that attempt.
pub(crate) struct Session {
    credentials: Credentials,
    login_method: LoginMethod,
    token: RwLock<Option<SecretString>>,
    login_gate: Mutex<Option<LoginFailure>>,
    attempts: AtomicU64,
}

/// Outcome of the last failed login, replayed to callers that waited on it.
#[derive(Clone, Debug)]
struct LoginFailure {
    code: Option<i64>,
    message: String,
    data: Option<String>,
}

impl LoginFailure {
    fn from_error(err: &Error) -> Self {
        match err {
            Error::Zabbix(ZbxError::Auth {
                code,
                message,
                data,
                ..
            }) => Self {
                code: *code,
                message: message.clone(),
                data: data.clone(),
            },
            other => Self {
                code: None,
                message: other.to_string(),
                data: None,
            },
        }
    }

    fn to_error(&self) -> Error {
        Error::Zabbix(ZbxError::Auth {
            code: self.code,
            message: self.message.clone(),
            data: self.data.clone(),
            source: None,
        })
    }
}

impl Session {
    pub(crate) fn new(credentials: Credentials, login_method: LoginMethod) -> Self {
        Self {
            credentials,
            login_method,
            token: RwLock::new(None),
            login_gate: Mutex::new(None),
            attempts: AtomicU64::new(0),
        }
    }

    pub(crate) const fn login_method(&self) -> LoginMethod {
        self.login_method
    }

    pub(crate) fn user(&self) -> &str {
        &self.credentials.user
    }

    pub(crate) fn login_params(&self) -> Value {
        json!({
            "user": self.credentials.user,
            "password": self.credentials.password.expose_secret(),
        })
    }

    pub(crate) async fn token(&self) -> Option<SecretString> {
        self.token.read().await.clone()
    }

    pub(crate) async fn clear(&self) -> bool {
        self.token.write().await.take().is_some()
    }

    /// Return the held token, running `login` first if there is none.
    ///
    /// `login` performs the raw login round trip and yields its `result`
    /// payload. Any failure it reports, and any payload that is not a
    /// non-empty string, becomes [`ZbxError::Auth`]; the token stays unset.
    /// Callers that queued behind a failed login get the same `Auth` error
    /// without another round trip. Callers arriving later try again.
    pub(crate) async fn ensure_authenticated<F, Fut>(&self, login: F) -> Result<SecretString>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        if let Some(token) = self.token().await {
            return Ok(token);
        }

        let seen = self.attempts.load(Ordering::Acquire);
        let mut last_failure = self.login_gate.lock().await;
        // Another caller may have finished logging in while we waited.
        if let Some(token) = self.token().await {
            debug!(user = %self.credentials.user, "reusing token from concurrent login");
            return Ok(token);
        }
        if self.attempts.load(Ordering::Acquire) != seen {
            if let Some(failure) = last_failure.as_ref() {
                debug!(user = %self.credentials.user, "sharing result of concurrent failed login");
                return Err(failure.to_error());
            }
        }

        let outcome = match login().await {
            Ok(result) => token_from_result(result),
            Err(err) => Err(auth_error(err)),
        };

        let token = match outcome {
            Ok(token) => token,
            Err(err) => {
                warn!(
                    user = %self.credentials.user,
                    method = self.login_method.as_str(),
                    error = %err,
                    "zabbix login failed"
                );
                *last_failure = Some(LoginFailure::from_error(&err));
                self.attempts.fetch_add(1, Ordering::Release);
                return Err(err);
            }
        };

        *self.token.write().await = Some(token.clone());
        *last_failure = None;
        self.attempts.fetch_add(1, Ordering::Release);
        info!(
            user = %self.credentials.user,
            method = self.login_method.as_str(),
            "zabbix session established"
        );
        Ok(token)
    }
}

fn token_from_result(result: Value) -> Result<SecretString> {
    match result {
        Value::String(token) if !token.trim().is_empty() => Ok(SecretString::from(token)),
        other => {
            let cause = ProtocolError::UnexpectedShape {
                expected: "non-empty string token",
                found: json_kind(&other),
            };
            Err(Error::Zabbix(ZbxError::Auth {
                code: None,
                message: "login response did not contain a session token".to_string(),
                data: None,
                source: Some(Box::new(ZbxError::Protocol(cause))),
            }))
        }
    }
}

fn auth_error(err: Error) -> Error {
    match err {
        Error::Zabbix(ZbxError::Api {
            code,
            message,
            data,
        }) => Error::Zabbix(ZbxError::Auth {
            code: Some(code),
            message,
            data,
            source: None,
        }),
        Error::Zabbix(auth @ ZbxError::Auth { .. }) => Error::Zabbix(auth),
        Error::Zabbix(other) => Error::Zabbix(ZbxError::Auth {
            code: None,
            message: other.to_string(),
            data: None,
            source: Some(Box::new(other)),
        }),
        other => other,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use secrecy::ExposeSecret;
    use serde_json::{Value, json};

    use super::{Credentials, Session};
    use crate::error::{Error, TransportError, ZbxError};
    use crate::types::LoginMethod;

    fn session() -> Session {
        Session::new(
            Credentials::new("api_user", "api_user"),
            LoginMethod::UserAuthenticate,
        )
    }

    #[tokio::test]
    async fn login_runs_once_and_token_is_reused() {
        let session = session();
        let logins = AtomicUsize::new(0);

        for _ in 0..3 {
            let token = session
                .ensure_authenticated(|| async {
                    logins.fetch_add(1, Ordering::SeqCst);
                    Ok(json!("abcdef123"))
                })
                .await
                .expect("login");
            assert_eq!(token.expose_secret(), "abcdef123");
        }

        assert_eq!(logins.load(Ordering::SeqCst), 1);
        assert_eq!(
            session.token().await.expect("token").expose_secret(),
            "abcdef123"
        );
    }

    #[tokio::test]
    async fn rejected_login_maps_to_auth_error_and_leaves_no_token() {
        let session = session();
        let err = session
            .ensure_authenticated(|| async {
                Err(Error::Zabbix(ZbxError::Api {
                    code: -32602,
                    message: "Login name or password is incorrect".to_string(),
                    data: None,
                }))
            })
            .await
            .expect_err("login must fail");

        match err {
            Error::Zabbix(ZbxError::Auth { code, message, .. }) => {
                assert_eq!(code, Some(-32602));
                assert_eq!(message, "Login name or password is incorrect");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(session.token().await.is_none());
    }

    #[tokio::test]
    async fn transport_failure_during_login_is_an_auth_error_with_cause() {
        let session = session();
        let err = session
            .ensure_authenticated(|| async {
                Err(Error::from(TransportError::Other {
                    message: "connection refused".to_string(),
                }))
            })
            .await
            .expect_err("login must fail");

        match err {
            Error::Zabbix(ZbxError::Auth { code, source, .. }) => {
                assert_eq!(code, None);
                assert!(matches!(
                    source.as_deref(),
                    Some(ZbxError::Transport(TransportError::Other { .. }))
                ));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn empty_or_non_string_token_is_rejected() {
        let session = session();
        for payload in [json!(""), json!([]), Value::Null, json!({"sessionid": "x"})] {
            let err = session
                .ensure_authenticated(|| async move { Ok(payload) })
                .await
                .expect_err("malformed token");
            assert!(err.is_auth());
        }
        assert!(session.token().await.is_none());
    }

    #[tokio::test]
    async fn failed_login_can_be_retried() {
        let session = session();
        let _ = session
            .ensure_authenticated(|| async {
                Err(Error::from(TransportError::Other {
                    message: "down".to_string(),
                }))
            })
            .await;
        let token = session
            .ensure_authenticated(|| async { Ok(json!("fresh")) })
            .await
            .expect("second attempt");
        assert_eq!(token.expose_secret(), "fresh");
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_login() {
        let session = Arc::new(session());
        let logins = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let session = Arc::clone(&session);
            let logins = Arc::clone(&logins);
            handles.push(tokio::spawn(async move {
                session
                    .ensure_authenticated(|| async move {
                        logins.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(json!("shared"))
                    })
                    .await
                    .map(|token| token.expose_secret().to_string())
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.expect("join").expect("token"), "shared");
        }
        assert_eq!(logins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_failed_login() {
        let session = Arc::new(session());
        let logins = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let session = Arc::clone(&session);
            let logins = Arc::clone(&logins);
            handles.push(tokio::spawn(async move {
                session
                    .ensure_authenticated(|| async move {
                        logins.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Err(Error::Zabbix(ZbxError::Api {
                            code: -32602,
                            message: "Login name or password is incorrect".to_string(),
                            data: None,
                        }))
                    })
                    .await
            }));
        }

        for handle in handles {
            match handle.await.expect("join") {
                Err(Error::Zabbix(ZbxError::Auth { code, message, .. })) => {
                    assert_eq!(code, Some(-32602));
                    assert_eq!(message, "Login name or password is incorrect");
                }
                other => panic!("unexpected outcome: {other:?}"),
            }
        }
        assert_eq!(logins.load(Ordering::SeqCst), 1);
        assert!(session.token().await.is_none());

        // A caller arriving after the failure gets a fresh attempt.
        let token = session
            .ensure_authenticated(|| async {
                logins.fetch_add(1, Ordering::SeqCst);
                Ok(json!("fresh"))
            })
            .await
            .expect("retry");
        assert_eq!(token.expose_secret(), "fresh");
        assert_eq!(logins.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn clear_forgets_the_token() {
        let session = session();
        assert!(!session.clear().await);
        session
            .ensure_authenticated(|| async { Ok(json!("abc")) })
            .await
            .expect("login");
        assert!(session.clear().await);
        assert!(session.token().await.is_none());
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let creds = Credentials::new("api_user", "hunter2");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("api_user"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn login_params_carry_user_and_password() {
        let params = session().login_params();
        assert_eq!(params, json!({"user": "api_user", "password": "api_user"}));
    }
}
