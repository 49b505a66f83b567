use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// RPC method used to obtain a session token.
///
/// Zabbix 1.8 servers only know `user.authenticate`; later releases renamed it
/// to `user.login`.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum LoginMethod {
    #[default]
    #[serde(rename = "user.authenticate")]
    UserAuthenticate,
    #[serde(rename = "user.login")]
    UserLogin,
}

impl LoginMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserAuthenticate => "user.authenticate",
            Self::UserLogin => "user.login",
        }
    }

    /// True when `method` names any login method, whichever one is configured.
    pub fn is_login(method: &str) -> bool {
        method == Self::UserAuthenticate.as_str() || method == Self::UserLogin.as_str()
    }
}

impl Display for LoginMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoginMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user.authenticate" | "authenticate" => Ok(Self::UserAuthenticate),
            "user.login" | "login" => Ok(Self::UserLogin),
            other => Err(format!("unknown login method: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LoginMethod;
    use std::str::FromStr;

    #[test]
    fn login_method_from_str_accepts_variants() {
        assert_eq!(
            LoginMethod::from_str("user.authenticate"),
            Ok(LoginMethod::UserAuthenticate)
        );
        assert_eq!(LoginMethod::from_str("LOGIN"), Ok(LoginMethod::UserLogin));
        assert!(LoginMethod::from_str("user.get").is_err());
    }

    #[test]
    fn both_login_methods_are_recognised() {
        assert!(LoginMethod::is_login("user.authenticate"));
        assert!(LoginMethod::is_login("user.login"));
        assert!(!LoginMethod::is_login("hostgroup.get"));
        assert_eq!(LoginMethod::default().to_string(), "user.authenticate");
    }
}
