use std::time::Duration;

use crate::zbx_client::transport::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_HTTP_TIMEOUT};

pub(super) fn default_login_method() -> String {
    "user.authenticate".to_string()
}

pub(super) const fn default_timeout() -> Duration {
    DEFAULT_HTTP_TIMEOUT
}

pub(super) const fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}
