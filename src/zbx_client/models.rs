use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ProtocolError;

use super::rpc::json_kind;

/// One monitoring object as returned by a `*.get` method.
///
/// No schema is enforced; callers pick the fields they know about and get a
/// [`ProtocolError`] when one is missing or has the wrong shape.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EntityRecord(Map<String, Value>);

impl EntityRecord {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// # Errors
    ///
    /// Returns [`ProtocolError::MissingField`] when `field` is absent.
    pub fn field(&self, field: &str) -> Result<&Value, ProtocolError> {
        self.0.get(field).ok_or_else(|| ProtocolError::MissingField {
            field: field.to_string(),
        })
    }

    /// Read an identifier. Zabbix sends ids as strings, but numbers are
    /// accepted too.
    ///
    /// # Errors
    ///
    /// Returns a [`ProtocolError`] when `field` is absent or not a string or
    /// integer.
    pub fn id(&self, field: &str) -> Result<String, ProtocolError> {
        id_value(field, self.field(field)?)
    }

    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl TryFrom<Value> for EntityRecord {
    type Error = ProtocolError;

    fn try_from(value: Value) -> Result<Self, ProtocolError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ProtocolError::UnexpectedShape {
                expected: "object",
                found: json_kind(&other),
            }),
        }
    }
}

pub(crate) fn id_value(field: &str, value: &Value) -> Result<String, ProtocolError> {
    match value {
        Value::String(id) => Ok(id.clone()),
        Value::Number(n) if n.is_u64() || n.is_i64() => Ok(n.to_string()),
        other => Err(ProtocolError::InvalidField {
            field: field.to_string(),
            message: format!("expected identifier, got {}", json_kind(other)),
        }),
    }
}

/// Parameters for `host.create`.
#[derive(Clone, Debug, Serialize)]
pub struct NewHost {
    pub host: String,
    pub ip: String,
    pub port: String,
    #[serde(serialize_with = "serialize_flag")]
    pub useip: bool,
    pub dns: String,
    #[serde(serialize_with = "serialize_group_refs")]
    pub groups: Vec<String>,
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "serialize_template_refs"
    )]
    pub templates: Vec<String>,
}

impl NewHost {
    /// A host reached by IP on the default agent port.
    pub fn new(host: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ip: ip.into(),
            port: "10050".to_string(),
            useip: true,
            dns: String::new(),
            groups: Vec::new(),
            templates: Vec::new(),
        }
    }
}

/// A graph cell added to a screen by `screen.addItems`.
#[derive(Clone, Debug, Serialize)]
pub(crate) struct ScreenItem {
    resourcetype: &'static str,
    resourceid: String,
    width: &'static str,
    height: &'static str,
    x: u32,
    y: u32,
    valign: &'static str,
    halign: &'static str,
    colspan: &'static str,
    rowspan: &'static str,
    elements: &'static str,
    dynamic: &'static str,
    url: &'static str,
    style: &'static str,
}

impl ScreenItem {
    pub(crate) fn graph(graph_id: &str, x: u32, y: u32) -> Self {
        Self {
            resourcetype: "graph",
            resourceid: graph_id.to_string(),
            width: "800",
            height: "200",
            x,
            y,
            valign: "Middle",
            halign: "Centre",
            colspan: "0",
            rowspan: "0",
            elements: "0",
            dynamic: "0",
            url: "0",
            style: "0",
        }
    }
}

/// Row of a screen's `screenitems` list, narrowed to what graph lookup needs.
#[derive(Debug, Deserialize)]
pub(crate) struct ScreenItemRow {
    #[serde(deserialize_with = "deserialize_i64")]
    pub(crate) resourcetype: i64,
    #[serde(deserialize_with = "deserialize_id")]
    pub(crate) resourceid: String,
}

fn serialize_flag<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u8(u8::from(*value))
}

#[allow(clippy::ptr_arg)]
fn serialize_group_refs<S>(ids: &Vec<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serialize_refs(ids, "groupid", serializer)
}

#[allow(clippy::ptr_arg)]
fn serialize_template_refs<S>(ids: &Vec<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serialize_refs(ids, "templateid", serializer)
}

fn serialize_refs<S>(ids: &[String], key: &str, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeSeq;

    let mut seq = serializer.serialize_seq(Some(ids.len()))?;
    for id in ids {
        let mut entry = Map::new();
        entry.insert(key.to_string(), Value::String(id.clone()));
        seq.serialize_element(&entry)?;
    }
    seq.end()
}

fn deserialize_i64<'de, D>(de: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaybeI64 {
        Int(i64),
        Str(String),
    }

    match MaybeI64::deserialize(de)? {
        MaybeI64::Int(value) => Ok(value),
        MaybeI64::Str(value) => value.parse::<i64>().map_err(serde::de::Error::custom),
    }
}

fn deserialize_id<'de, D>(de: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaybeId {
        Int(u64),
        Str(String),
    }

    Ok(match MaybeId::deserialize(de)? {
        MaybeId::Int(value) => value.to_string(),
        MaybeId::Str(value) => value,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{EntityRecord, NewHost, ScreenItemRow};
    use crate::error::ProtocolError;

    fn record(value: serde_json::Value) -> EntityRecord {
        match EntityRecord::try_from(value) {
            Ok(record) => record,
            Err(err) => panic!("not a record: {err}"),
        }
    }

    #[test]
    fn id_accepts_strings_and_integers() {
        let rec = record(json!({"groupid": "2", "hostid": 10105, "name": "Linux servers"}));
        assert_eq!(rec.id("groupid").ok().as_deref(), Some("2"));
        assert_eq!(rec.id("hostid").ok().as_deref(), Some("10105"));
    }

    #[test]
    fn id_reports_missing_and_malformed_fields() {
        let rec = record(json!({"groupid": ["2"]}));
        assert!(matches!(
            rec.id("screenid"),
            Err(ProtocolError::MissingField { field }) if field == "screenid"
        ));
        assert!(matches!(
            rec.id("groupid"),
            Err(ProtocolError::InvalidField { field, .. }) if field == "groupid"
        ));
    }

    #[test]
    fn non_object_is_not_a_record() {
        assert!(EntityRecord::try_from(json!("2")).is_err());
    }

    #[test]
    fn new_host_serializes_group_and_template_refs() {
        let mut host = NewHost::new("new host", "10.10.10.10");
        host.port = "10055".to_string();
        host.dns = "myhost.com".to_string();
        host.groups = vec!["2".to_string()];
        host.templates = vec!["10001".to_string(), "10049".to_string()];

        let value = match serde_json::to_value(&host) {
            Ok(value) => value,
            Err(err) => panic!("serialize: {err}"),
        };
        assert_eq!(
            value,
            json!({
                "host": "new host",
                "ip": "10.10.10.10",
                "port": "10055",
                "useip": 1,
                "dns": "myhost.com",
                "groups": [{"groupid": "2"}],
                "templates": [{"templateid": "10001"}, {"templateid": "10049"}]
            })
        );
    }

    #[test]
    fn screen_item_row_accepts_string_or_numeric_codes() {
        let row: ScreenItemRow =
            match serde_json::from_value(json!({"resourcetype": "0", "resourceid": 524})) {
                Ok(row) => row,
                Err(err) => panic!("deserialize: {err}"),
            };
        assert_eq!(row.resourcetype, 0);
        assert_eq!(row.resourceid, "524");
    }
}
