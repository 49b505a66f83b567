use serde_json::{Map, Value, json};

use crate::Result;
use crate::error::ProtocolError;
use crate::zbx_client::models::{ScreenItem, ScreenItemRow};
use crate::zbx_client::policy::{created_id, first_record, succeeded};
use crate::zbx_client::{Transport, ZbxClient};

/// `resourcetype` code of graph cells.
const GRAPH_RESOURCE: i64 = 0;

impl<T: Transport> ZbxClient<T> {
    pub async fn get_screen_id(&self, name: &str) -> Result<Option<String>> {
        let params = json!({
            "filter": { "name": name },
        });
        let result = self.call("screen.get", params).await?;
        Ok(first_record(result)?
            .map(|screen| screen.id("screenid"))
            .transpose()?)
    }

    /// One attribute of the screen named `name`, or `None` if no such screen.
    ///
    /// A screen that exists but lacks `param` is a protocol error.
    pub async fn get_screen_parameter(&self, name: &str, param: &str) -> Result<Option<Value>> {
        let params = json!({
            "extendoutput": "1",
            "filter": { "name": name },
        });
        let result = self.call("screen.get", params).await?;
        Ok(first_record(result)?
            .map(|screen| screen.field(param).cloned())
            .transpose()?)
    }

    /// Resource ids of the graph cells on a screen, or `None` if the screen
    /// does not exist.
    pub async fn get_screen_graph_ids(&self, screen_id: &str) -> Result<Option<Vec<String>>> {
        let params = json!({
            "extendoutput": "1",
            "select_screenitems": "1",
            "screenids": [screen_id],
        });
        let result = self.call("screen.get", params).await?;
        let Some(screen) = first_record(result)? else {
            return Ok(None);
        };

        let items: Vec<ScreenItemRow> = serde_json::from_value(screen.field("screenitems")?.clone())
            .map_err(|err| ProtocolError::InvalidField {
                field: "screenitems".to_string(),
                message: err.to_string(),
            })?;
        Ok(Some(
            items
                .into_iter()
                .filter(|item| item.resourcetype == GRAPH_RESOURCE)
                .map(|item| item.resourceid)
                .collect(),
        ))
    }

    pub async fn set_screen_parameter(
        &self,
        screen_id: &str,
        param: &str,
        value: Value,
    ) -> Result<bool> {
        let mut params = Map::new();
        params.insert(param.to_string(), value);
        params.insert("screenid".to_string(), json!(screen_id));
        let result = self.call("screen.update", Value::Object(params)).await?;
        Ok(succeeded(&result))
    }

    pub async fn delete_all_graphs_from_screen(&self, screen_id: &str) -> Result<bool> {
        let params = json!({
            "screenids": [screen_id],
        });
        let result = self.call("screen.deleteItems", params).await?;
        Ok(succeeded(&result))
    }

    /// Place an 800x200 graph cell at (`x`, `y`).
    pub async fn add_graph_to_screen(
        &self,
        screen_id: &str,
        graph_id: &str,
        x: u32,
        y: u32,
    ) -> Result<bool> {
        let params = json!({
            "screenids": [screen_id],
            "screenitems": [ScreenItem::graph(graph_id, x, y)],
        });
        let result = self.call("screen.addItems", params).await?;
        Ok(succeeded(&result))
    }

    /// Create a screen of `hsize` columns by `vsize` rows and return its id.
    pub async fn add_screen(&self, name: &str, hsize: u32, vsize: u32) -> Result<Option<String>> {
        let params = json!({
            "name": name,
            "hsize": hsize,
            "vsize": vsize,
        });
        let result = self.call("screen.create", params).await?;
        Ok(created_id(result, "screenids")?)
    }
}
