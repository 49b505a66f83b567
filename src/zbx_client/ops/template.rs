use serde_json::json;

use crate::Result;
use crate::zbx_client::policy::{first_record, succeeded};
use crate::zbx_client::{Transport, ZbxClient};

impl<T: Transport> ZbxClient<T> {
    /// Id of the template whose technical name is `name`.
    pub async fn get_template_id(&self, name: &str) -> Result<Option<String>> {
        let params = json!({
            "filter": { "host": name },
        });
        let result = self.call("template.get", params).await?;
        Ok(first_record(result)?
            .map(|template| template.id("templateid"))
            .transpose()?)
    }

    pub async fn template_exists(&self, name: &str) -> Result<bool> {
        Ok(self.get_template_id(name).await?.is_some())
    }

    pub async fn link_templates_to_hosts(
        &self,
        template_ids: &[String],
        host_ids: &[String],
    ) -> Result<bool> {
        let params = json!({
            "templates": template_ids,
            "hosts": host_ids,
        });
        let result = self.call("template.massAdd", params).await?;
        Ok(succeeded(&result))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use crate::zbx_client::client::tests::{client, ok};

    #[tokio::test]
    async fn template_lookup() {
        let zbx = client(vec![
            ok(json!("abcdef123")),
            ok(json!([{"templateid": "10001", "host": "Template_Linux"}])),
            ok(json!([])),
        ]);
        assert_eq!(
            zbx.get_template_id("Template_Linux").await.unwrap().as_deref(),
            Some("10001")
        );
        assert!(!zbx.template_exists("not there").await.unwrap());
    }

    #[tokio::test]
    async fn linking_reports_success() {
        let zbx = client(vec![ok(json!("abcdef123")), ok(json!({"templateids": ["10001"]}))]);
        let linked = zbx
            .link_templates_to_hosts(&["10001".to_string()], &["10105".to_string()])
            .await
            .unwrap();
        assert!(linked);
    }
}
