use serde_json::{Value, json};

use crate::Result;
use crate::error::ProtocolError;
use crate::zbx_client::policy::{created_id, first_record, succeeded};
use crate::zbx_client::{EntityRecord, NewHost, Transport, ZbxClient};

impl<T: Transport> ZbxClient<T> {
    /// First host matching caller-supplied `host.get` parameters.
    ///
    /// `params` is passed through unchanged, e.g.
    /// `{"filter": {"dns": "vagrantup.com"}}`.
    pub async fn get_host(&self, params: Value) -> Result<Option<EntityRecord>> {
        let result = self.call("host.get", params).await?;
        Ok(first_record(result)?)
    }

    pub async fn get_host_id(&self, name: &str) -> Result<Option<String>> {
        let params = json!({
            "filter": { "host": name },
        });
        Ok(self
            .get_host(params)
            .await?
            .map(|host| host.id("hostid"))
            .transpose()?)
    }

    pub async fn host_exists(&self, name: &str) -> Result<bool> {
        Ok(self.get_host_id(name).await?.is_some())
    }

    /// Create a host and return its id.
    pub async fn add_host(&self, host: &NewHost) -> Result<Option<String>> {
        let params = serde_json::to_value(host).map_err(|err| ProtocolError::Json {
            message: format!("error encoding host {}: {err}", host.host),
        })?;
        let result = self.call("host.create", params).await?;
        Ok(created_id(result, "hostids")?)
    }

    pub async fn delete_host(&self, host_id: &str) -> Result<bool> {
        let result = self
            .call("host.delete", json!([{ "hostid": host_id }]))
            .await?;
        Ok(succeeded(&result))
    }
}
