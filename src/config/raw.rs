use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use serde_with::serde_as;
use url::Url;

use crate::Result;
use crate::error::ConfigError;
use crate::types::LoginMethod;
use crate::zbx_client::HttpOptions;

use super::defaults::{default_connect_timeout, default_login_method, default_timeout};
use super::env::{env_bool, env_duration, env_string};
use super::{Config, HumantimeDuration};

pub(super) fn load(path: impl AsRef<Path>) -> std::result::Result<RawConfig, ConfigError> {
    let mut builder = ::config::Config::builder();
    let path = path.as_ref();
    builder = builder.add_source(::config::File::from(path).required(false));
    builder = builder.add_source(
        ::config::Environment::with_prefix("ZBXAPI")
            .separator("__")
            .try_parsing(true),
    );

    builder
        .build()
        .map_err(|err| ConfigError::Other(err.to_string()))?
        .try_deserialize()
        .map_err(|err| ConfigError::Parse(err.to_string()))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub(super) zabbix: RawZabbix,
    #[serde(default)]
    pub(super) http: RawHttp,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawZabbix {
    pub(super) url: Option<String>,
    pub(super) user: Option<String>,
    pub(super) password: Option<String>,
    #[serde(default = "default_login_method")]
    pub(super) login_method: String,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct RawHttp {
    #[serde(default = "default_timeout")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) timeout: Duration,
    #[serde(default = "default_connect_timeout")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) connect_timeout: Duration,
    #[serde(default)]
    pub(super) insecure: bool,
}

impl RawConfig {
    pub(super) fn apply_env_overrides(&mut self) -> std::result::Result<(), ConfigError> {
        if let Some(url) = env_string("ZBX_URL")? {
            self.zabbix.url = Some(url);
        }
        if let Some(user) = env_string("ZBX_USER")? {
            self.zabbix.user = Some(user);
        }
        if let Some(password) = env_string("ZBX_PASSWORD")? {
            self.zabbix.password = Some(password);
        }
        if let Some(method) = env_string("ZBX_LOGIN_METHOD")? {
            self.zabbix.login_method = method;
        }
        if let Some(timeout) = env_duration("ZBX_TIMEOUT")? {
            self.http.timeout = timeout;
        }
        if let Some(timeout) = env_duration("ZBX_CONNECT_TIMEOUT")? {
            self.http.connect_timeout = timeout;
        }
        if let Some(insecure) = env_bool("ZBX_INSECURE")? {
            self.http.insecure = insecure;
        }
        Ok(())
    }

    pub(super) fn validate_and_build(self) -> Result<Config> {
        let url_str = self.zabbix.url.ok_or(ConfigError::MissingField {
            field: "zabbix.url",
        })?;
        let url = Url::parse(url_str.trim()).map_err(|err| ConfigError::InvalidField {
            field: "zabbix.url",
            message: err.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidField {
                field: "zabbix.url",
                message: format!("unsupported scheme {}", url.scheme()),
            }
            .into());
        }

        let user = self.zabbix.user.ok_or(ConfigError::MissingField {
            field: "zabbix.user",
        })?;
        if user.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "zabbix.user",
                message: "user cannot be empty".to_string(),
            }
            .into());
        }
        let password = self.zabbix.password.ok_or(ConfigError::MissingField {
            field: "zabbix.password",
        })?;

        let login_method = LoginMethod::from_str(&self.zabbix.login_method).map_err(|err| {
            ConfigError::InvalidField {
                field: "zabbix.login_method",
                message: err,
            }
        })?;

        if self.http.timeout.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "http.timeout",
                message: "timeout must be greater than zero".to_string(),
            }
            .into());
        }
        if self.http.connect_timeout.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "http.connect_timeout",
                message: "connect timeout must be greater than zero".to_string(),
            }
            .into());
        }

        Ok(Config {
            url,
            user,
            password: password.into(),
            login_method,
            http: HttpOptions {
                timeout: self.http.timeout,
                connect_timeout: self.http.connect_timeout,
                insecure_http: self.http.insecure,
            },
        })
    }
}

impl Default for RawZabbix {
    fn default() -> Self {
        Self {
            url: None,
            user: None,
            password: None,
            login_method: default_login_method(),
        }
    }
}

impl Default for RawHttp {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            insecure: false,
        }
    }
}
