use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::Result;
use crate::config::Config;
use crate::error::{Error, ProtocolError, ZbxError};
use crate::types::LoginMethod;

use super::rpc::{self, RpcOutcome};
use super::session::{Credentials, Session};
use super::transport::{HttpOptions, HttpTransport, Transport};

const API_VERSION_METHOD: &str = "apiinfo.version";
const LOGOUT_METHOD: &str = "user.logout";

/// Session-holding client for the Zabbix JSON-RPC API.
///
/// Construction performs no I/O. The first call that needs a token logs in
/// with the stored credentials; every later call reuses that token. Clones
/// share the same session and request counter.
pub struct ZbxClient<T = HttpTransport> {
    transport: Arc<T>,
    session: Arc<Session>,
    next_id: Arc<AtomicU64>,
}

impl<T> Clone for ZbxClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            session: Arc::clone(&self.session),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl ZbxClient<HttpTransport> {
    /// Build a client for `endpoint` with default HTTP settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not `https` or the HTTP client
    /// fails to build.
    pub fn new(
        endpoint: Url,
        user: impl Into<String>,
        password: impl Into<SecretString>,
    ) -> Result<Self> {
        Self::with_options(endpoint, user, password, &HttpOptions::default())
    }

    /// Build a client with explicit timeouts and scheme policy.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTPS is required but the URL uses HTTP, or if the
    /// underlying HTTP client fails to build.
    pub fn with_options(
        endpoint: Url,
        user: impl Into<String>,
        password: impl Into<SecretString>,
        options: &HttpOptions,
    ) -> Result<Self> {
        let transport = HttpTransport::new(endpoint, options)?;
        Ok(Self::with_transport(
            transport,
            Credentials::new(user, password),
            LoginMethod::default(),
        ))
    }

    /// Build a client from loaded configuration.
    ///
    /// # Errors
    ///
    /// Same as [`ZbxClient::with_options`].
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = HttpTransport::new(config.url.clone(), &config.http)?;
        Ok(Self::with_transport(
            transport,
            Credentials {
                user: config.user.clone(),
                password: config.password.clone(),
            },
            config.login_method,
        ))
    }
}

impl<T: Transport> ZbxClient<T> {
    pub fn with_transport(
        transport: T,
        credentials: Credentials,
        login_method: LoginMethod,
    ) -> Self {
        Self {
            transport: Arc::new(transport),
            session: Arc::new(Session::new(credentials, login_method)),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn endpoint(&self) -> &Url {
        self.transport.endpoint()
    }

    /// The session token, if a login has succeeded.
    pub async fn token(&self) -> Option<SecretString> {
        self.session.token().await
    }

    /// Log in now instead of on the first call. A no-op once a token is held.
    ///
    /// # Errors
    ///
    /// Returns [`ZbxError::Auth`] when the login is rejected or cannot be
    /// completed.
    pub async fn login(&self) -> Result<SecretString> {
        self.ensure_authenticated().await
    }

    /// Forget the session token so the next call logs in again.
    ///
    /// Tokens are never refreshed automatically; callers that hit an expired
    /// session reset it and retry.
    pub async fn reset_session(&self) {
        if self.session.clear().await {
            info!(user = self.session.user(), "zabbix session reset");
        }
    }

    /// End the session server-side with `user.logout` and drop the token.
    ///
    /// Returns `false` without any round trip when no session is held.
    ///
    /// # Errors
    ///
    /// Returns an error when the logout call fails; the local token is
    /// dropped regardless.
    pub async fn logout(&self) -> Result<bool> {
        let Some(token) = self.session.token().await else {
            return Ok(false);
        };
        self.session.clear().await;
        let result = self
            .round_trip(LOGOUT_METHOD, &json!([]), Some(token.expose_secret()))
            .await?;
        Ok(super::policy::succeeded(&result))
    }

    /// Server API version via `apiinfo.version`, which takes no token.
    ///
    /// # Errors
    ///
    /// Returns an error when the call fails or the result is not a string.
    pub async fn api_version(&self) -> Result<String> {
        self.call_as(API_VERSION_METHOD, json!([])).await
    }

    /// Issue one RPC call and return its `result` payload untouched.
    ///
    /// Logs in first when no token is held, unless `method` is itself a
    /// login method or `apiinfo.version`.
    ///
    /// # Errors
    ///
    /// - [`ZbxError::Auth`] when the implicit login fails.
    /// - [`ZbxError::Transport`] when the exchange fails or times out.
    /// - [`ZbxError::Protocol`] when the body is not a valid envelope.
    /// - [`ZbxError::Api`] when the API answers with an `error` object.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value> {
        if !requires_auth(method) {
            return self.round_trip(method, &params, None).await;
        }
        let token = self.ensure_authenticated().await?;
        self.round_trip(method, &params, Some(token.expose_secret()))
            .await
    }

    /// Like [`ZbxClient::call`], deserializing the result into `R`.
    ///
    /// # Errors
    ///
    /// Same as [`ZbxClient::call`], plus [`ZbxError::Protocol`] when the result
    /// does not fit `R`.
    pub async fn call_as<R>(&self, method: &str, params: Value) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let result = self.call(method, params).await?;
        serde_json::from_value(result).map_err(|err| {
            Error::from(ProtocolError::Json {
                message: format!("unexpected result for {method}: {err}"),
            })
        })
    }

    async fn ensure_authenticated(&self) -> Result<SecretString> {
        self.session
            .ensure_authenticated(|| async move {
                let params = self.session.login_params();
                let method = self.session.login_method();
                self.round_trip(method.as_str(), &params, None).await
            })
            .await
    }

    async fn round_trip(&self, method: &str, params: &Value, auth: Option<&str>) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let correlation_id = Uuid::now_v7().to_string();
        let started = Instant::now();

        let body = rpc::encode(method, params, auth, id)?;
        let response = match self.transport.post(&correlation_id, body).await {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    method,
                    %correlation_id,
                    request_id = id,
                    latency_ms = started.elapsed().as_millis(),
                    error = %err,
                    "zabbix transport failure"
                );
                return Err(ZbxError::Transport(err).into());
            }
        };

        match rpc::decode(&response)? {
            RpcOutcome::Error(err) => {
                debug!(
                    method,
                    %correlation_id,
                    request_id = id,
                    code = err.code,
                    message = %err.message,
                    "zabbix call returned an error"
                );
                Err(ZbxError::Api {
                    code: err.code,
                    message: err.message,
                    data: err.data,
                }
                .into())
            }
            RpcOutcome::Result(result) => {
                debug!(
                    method,
                    %correlation_id,
                    request_id = id,
                    latency_ms = started.elapsed().as_millis(),
                    "zabbix call succeeded"
                );
                Ok(result)
            }
        }
    }
}

fn requires_auth(method: &str) -> bool {
    !LoginMethod::is_login(method) && method != API_VERSION_METHOD
}
