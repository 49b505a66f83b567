use serde_json::json;

use crate::Result;
use crate::zbx_client::policy::{created_id, first_record, succeeded};
use crate::zbx_client::{Transport, ZbxClient};

impl<T: Transport> ZbxClient<T> {
    /// Id of the host group named exactly `name`, or `None` if there is none.
    pub async fn get_group_id(&self, name: &str) -> Result<Option<String>> {
        let params = json!({
            "filter": { "name": name },
        });
        let result = self.call("hostgroup.get", params).await?;
        Ok(first_record(result)?
            .map(|group| group.id("groupid"))
            .transpose()?)
    }

    pub async fn group_exists(&self, name: &str) -> Result<bool> {
        Ok(self.get_group_id(name).await?.is_some())
    }

    /// Create a host group and return its id.
    ///
    /// One name is sent per call, so `groupids` holds at most one entry.
    pub async fn add_group(&self, name: &str) -> Result<Option<String>> {
        let result = self
            .call("hostgroup.create", json!({ "name": name }))
            .await?;
        Ok(created_id(result, "groupids")?)
    }

    pub async fn add_host_to_group(&self, host_id: &str, group_id: &str) -> Result<bool> {
        let params = json!({
            "groups": [group_id],
            "hosts": [host_id],
        });
        let result = self.call("hostgroup.massAdd", params).await?;
        Ok(succeeded(&result))
    }

    pub async fn delete_group(&self, group_id: &str) -> Result<bool> {
        let result = self.call("hostgroup.delete", json!([group_id])).await?;
        Ok(succeeded(&result))
    }
}
