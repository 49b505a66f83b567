use std::time::Duration;

use humantime::parse_duration;
use serde::Deserialize;
use serde_with::DeserializeAs;

/// Reads durations written as `"10s"`, `"1m 30s"` and the like.
pub(crate) struct HumantimeDuration;

impl<'de> DeserializeAs<'de, Duration> for HumantimeDuration {
    fn deserialize_as<D>(deserializer: D) -> std::result::Result<Duration, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_duration(raw.trim()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::HumantimeDuration;
    use serde::Deserialize;
    use serde_with::serde_as;
    use std::time::Duration;

    #[serde_as]
    #[derive(Deserialize)]
    struct Timeouts {
        #[serde_as(as = "HumantimeDuration")]
        request: Duration,
        #[serde(default)]
        #[serde_as(as = "Option<HumantimeDuration>")]
        connect: Option<Duration>,
    }

    #[test]
    fn humantime_duration_parses_compound_strings() {
        let parsed: Timeouts = match serde_json::from_str(r#"{"request":"1m 30s"}"#) {
            Ok(value) => value,
            Err(err) => panic!("failed to parse sample json: {err}"),
        };
        assert_eq!(parsed.request, Duration::from_secs(90));
        assert_eq!(parsed.connect, None);
    }

    #[test]
    fn humantime_duration_rejects_bare_numbers() {
        let parsed = serde_json::from_str::<Timeouts>(r#"{"request":"10"}"#);
        assert!(parsed.is_err());
    }
}
