use std::path::Path;

use secrecy::SecretString;
use url::Url;

use crate::Result;
use crate::error::Error as ZbxApiError;
use crate::types::LoginMethod;
use crate::zbx_client::HttpOptions;

mod defaults;
mod env;
mod raw;
mod serde;

pub(crate) use serde::HumantimeDuration;

/// Everything needed to open a Zabbix API session.
#[derive(Debug, Clone)]
pub struct Config {
    pub url: Url,
    pub user: String,
    pub password: SecretString,
    pub login_method: LoginMethod,
    pub http: HttpOptions,
}

impl Config {
    /// Load configuration from a file and the environment.
    ///
    /// The file is optional. `ZBXAPI__SECTION__KEY` variables are merged over
    /// it, then the `ZBX_*` shortcuts override both.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration file cannot be parsed, when
    /// environment overrides are invalid, or when the resulting values fail
    /// validation.
    pub fn from_env_and_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut raw = raw::load(path).map_err(ZbxApiError::from)?;
        raw.apply_env_overrides().map_err(ZbxApiError::from)?;
        raw.validate_and_build()
    }
}
