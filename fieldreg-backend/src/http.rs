//! HTTP client for a field registry server.

use async_trait::async_trait;
use fieldreg_fields::{EntityConfiguration, EntityKey, SelectOption};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::BackendConfig;
use crate::error::{BackendError, Result};
use crate::traits::{ConfigSource, OptionSource, PipelineSource};
use crate::types::{KanbanEnvelope, KanbanView, PipelineItem};

/// REST client implementing every backend trait.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        Url::parse(&config.base_url)?;
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone().filter(|t| !t.is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join encoded path segments onto the base URL.
    fn url(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        for segment in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Map a non-success response to [`BackendError::Api`].
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let err = BackendError::from_response(status.as_u16(), &body);
        warn!(status = status.as_u16(), detail = ?err.detail(), "backend request failed");
        Err(err)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<String> {
        let response = builder.send().await?;
        let response = Self::check_response(response).await?;
        Ok(response.text().await?)
    }

    fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T> {
        serde_json::from_str(body).map_err(|source| BackendError::Decode {
            endpoint: url.to_string(),
            source,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(%url, "GET");
        let body = self.send(self.request(Method::GET, url)).await?;
        Self::decode(url, &body)
    }

    async fn post_json<B: Serialize + Sync>(&self, url: &str, payload: &B) -> Result<String> {
        debug!(%url, "POST");
        self.send(self.request(Method::POST, url).json(payload)).await
    }
}

#[async_trait]
impl ConfigSource for HttpBackend {
    async fn fetch_config(&self, key: &EntityKey) -> Result<EntityConfiguration> {
        let url = self.url(&["field-registry", "config", &key.module, &key.entity]);
        self.get_json(&url).await
    }
}

#[async_trait]
impl PipelineSource for HttpBackend {
    async fn kanban_view(&self, key: &EntityKey) -> Result<KanbanView> {
        let url = self.url(&[&key.module, &key.entity, "kanban", "view"]);
        let envelope: KanbanEnvelope = self.get_json(&url).await?;
        Ok(envelope.into_view())
    }

    async fn move_item(
        &self,
        key: &EntityKey,
        item_id: &str,
        stage: &str,
    ) -> Result<PipelineItem> {
        let url = format!(
            "{}?new_status={}",
            self.url(&[&key.module, &key.entity, item_id, "move"]),
            urlencoding::encode(stage)
        );
        debug!(%url, "PUT");
        let body = self.send(self.request(Method::PUT, &url)).await?;

        // Some servers answer with the updated record, others with a bare
        // acknowledgement.
        Ok(serde_json::from_str::<PipelineItem>(&body)
            .unwrap_or_else(|_| PipelineItem::new(item_id, stage)))
    }
}

#[async_trait]
impl OptionSource for HttpBackend {
    async fn list_options(&self, category: &str) -> Result<Vec<SelectOption>> {
        let url = self.url(&["master-data", "category", category]);
        self.get_json(&url).await
    }

    async fn add_option(&self, category: &str, option: &SelectOption) -> Result<SelectOption> {
        let url = self.url(&["master-data", "category", category]);
        let body = self.post_json(&url, option).await?;
        Ok(serde_json::from_str::<SelectOption>(&body).unwrap_or_else(|_| option.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend_for(server: &MockServer) -> HttpBackend {
        HttpBackend::new(&BackendConfig {
            base_url: format!("{}/api/", server.uri()),
            ..BackendConfig::default()
        })
        .unwrap()
    }

    fn leads() -> EntityKey {
        EntityKey::new("crm", "leads")
    }

    #[tokio::test]
    async fn test_fetch_config() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/field-registry/config/crm/leads"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "module": "crm",
                "entity": "leads",
                "entity_label": "Leads",
                "fields": [
                    {"field_name": "company_name", "field_label": "Company Name",
                     "field_type": "text", "section": "basic", "is_required": true},
                    {"field_name": "email", "field_label": "Email",
                     "field_type": "email", "section": null}
                ],
                "kanban_stages": null
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = backend_for(&server).fetch_config(&leads()).await.unwrap();
        assert_eq!(config.fields.len(), 2);
        assert!(config.fields[0].is_required);
        assert_eq!(config.fields[1].section_key(), "default");
        assert!(config.kanban_stages.is_empty());
    }

    #[tokio::test]
    async fn test_error_detail_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/field-registry/config/crm/leads"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({"detail": "Not permitted"})),
            )
            .mount(&server)
            .await;

        let err = backend_for(&server).fetch_config(&leads()).await.unwrap_err();
        assert_eq!(err.status(), Some(403));
        assert_eq!(err.detail(), Some("Not permitted"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/field-registry/config/crm/leads"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = backend_for(&server).fetch_config(&leads()).await.unwrap_err();
        assert!(matches!(err, BackendError::Decode { .. }));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_kanban_view_both_shapes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/crm/leads/kanban/view"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "new": [{"id": 1, "status": "new", "company_name": "Acme"}],
                "contacted": []
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/crm/samples/kanban/view"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"requested": [{"id": "s1", "status": "requested"}]}
            })))
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let view = backend.kanban_view(&leads()).await.unwrap();
        assert_eq!(view["new"][0].id, "1");
        assert!(view["contacted"].is_empty());

        let view = backend
            .kanban_view(&EntityKey::new("crm", "samples"))
            .await
            .unwrap();
        assert_eq!(view["requested"][0].id, "s1");
    }

    #[tokio::test]
    async fn test_move_item_sends_new_status() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/crm/leads/L1/move"))
            .and(query_param("new_status", "qualified"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "moved"})))
            .expect(1)
            .mount(&server)
            .await;

        let item = backend_for(&server)
            .move_item(&leads(), "L1", "qualified")
            .await
            .unwrap();
        assert_eq!(item.id, "L1");
        assert_eq!(item.status, "qualified");
    }

    #[tokio::test]
    async fn test_move_item_failure() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/crm/leads/L1/move"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = backend_for(&server)
            .move_item(&leads(), "L1", "won")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(err.is_retryable());
        assert_eq!(err.message_or("Failed to move lead"), "Failed to move lead");
    }

    #[tokio::test]
    async fn test_options_round_trip_with_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/master-data/category/industry"))
            .and(header("authorization", "Bearer t0ken"))
            .and(body_json(json!({"value": "Pharma", "label": "Pharma", "order": 0, "is_default": false})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/master-data/category/industry"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"value": "Automotive", "label": "Automotive"},
                {"value": "Pharma", "label": "Pharma"}
            ])))
            .mount(&server)
            .await;

        let backend = HttpBackend::new(&BackendConfig {
            base_url: format!("{}/api", server.uri()),
            token: Some("t0ken".into()),
            ..BackendConfig::default()
        })
        .unwrap();

        let added = backend
            .add_option("industry", &SelectOption::new("Pharma", "Pharma"))
            .await
            .unwrap();
        assert_eq!(added.value, "Pharma");

        let options = backend.list_options("industry").await.unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[1].value, "Pharma");
    }

    #[test]
    fn test_path_segments_encoded() {
        let backend = HttpBackend::new(&BackendConfig::default()).unwrap();
        assert_eq!(
            backend.url(&["master-data", "category", "lead source"]),
            "http://localhost:8000/api/master-data/category/lead%20source"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpBackend::new(&BackendConfig {
            base_url: "::not a url".into(),
            ..BackendConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, BackendError::InvalidUrl(_)));
    }
}
