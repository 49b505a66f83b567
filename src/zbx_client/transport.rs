use std::future::Future;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::trace;
use url::Url;

use crate::Result;
use crate::error::{ConfigError, Error, TransportError};

const CORRELATION_HEADER: &str = "x-correlation-id";
pub(crate) const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);
pub(crate) const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Sends one encoded request to the API endpoint and hands back the raw body.
///
/// Implementations must surface every failure (connection, timeout,
/// non-success status) as a [`TransportError`] and must not retry.
pub trait Transport: Send + Sync {
    fn endpoint(&self) -> &Url;

    fn post(
        &self,
        correlation_id: &str,
        body: Vec<u8>,
    ) -> impl Future<Output = std::result::Result<Vec<u8>, TransportError>> + Send;
}

#[derive(Clone, Debug)]
pub struct HttpOptions {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Accept plain `http` endpoints.
    pub insecure_http: bool,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_HTTP_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            insecure_http: false,
        }
    }
}

/// `reqwest`-backed transport posting to a single endpoint.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Build a transport for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL uses HTTP while `insecure_http` is off, or
    /// if the underlying HTTP client fails to build.
    pub fn new(endpoint: Url, options: &HttpOptions) -> Result<Self> {
        if endpoint.scheme() != "https" && !options.insecure_http {
            return Err(Error::Config(ConfigError::InvalidField {
                field: "zabbix.url",
                message: "only https URLs are accepted without --insecure".to_string(),
            }));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json-rpc"),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(options.connect_timeout)
            .timeout(options.timeout)
            .user_agent(concat!("zbxapi/", env!("CARGO_PKG_VERSION")))
            .pool_idle_timeout(Duration::from_secs(30));

        if !options.insecure_http {
            builder = builder.https_only(true);
        }

        let http = builder
            .build()
            .map_err(|err| TransportError::Client { source: err })?;

        Ok(Self { http, endpoint })
    }
}

impl Transport for HttpTransport {
    fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn post(
        &self,
        correlation_id: &str,
        body: Vec<u8>,
    ) -> std::result::Result<Vec<u8>, TransportError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(CORRELATION_HEADER, correlation_id)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::HttpStatus { status });
        }

        let body = response.bytes().await?;
        trace!(%correlation_id, %status, bytes = body.len(), "response received");
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::{HttpOptions, HttpTransport, Transport};
    use crate::error::{ConfigError, Error};
    use url::Url;

    #[test]
    fn plain_http_is_refused_by_default() {
        let url = match Url::parse("http://zabbix.example.com/api_jsonrpc.php") {
            Ok(url) => url,
            Err(err) => panic!("bad url: {err}"),
        };
        let err = HttpTransport::new(url, &HttpOptions::default());
        assert!(matches!(
            err,
            Err(Error::Config(ConfigError::InvalidField {
                field: "zabbix.url",
                ..
            }))
        ));
    }

    #[test]
    fn plain_http_is_allowed_when_insecure() {
        let url = match Url::parse("http://192.168.1.29/zabbix/api_jsonrpc.php") {
            Ok(url) => url,
            Err(err) => panic!("bad url: {err}"),
        };
        let options = HttpOptions {
            insecure_http: true,
            ..HttpOptions::default()
        };
        match HttpTransport::new(url.clone(), &options) {
            Ok(transport) => assert_eq!(transport.endpoint(), &url),
            Err(err) => panic!("transport should build: {err}"),
        }
    }
}
