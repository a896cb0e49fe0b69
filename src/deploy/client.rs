//! Orchestration platform API.
//!
//! [`RancherApi`] is the seam the orchestrator talks through; [`RancherClient`]
//! implements it over the platform's REST API with basic authentication.

use super::{ApiError, Error, RancherCredentials, Result};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::future::Future;
use std::time::Duration;

/// A grouping of services.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stack {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A deployed service as reported by the platform.
///
/// Launch configurations are kept as raw JSON so that everything except the
/// image reference is sent back unchanged.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub stack_id: Option<String>,
    #[serde(default)]
    pub launch_config: Option<Map<String, Value>>,
    #[serde(default)]
    pub secondary_launch_configs: Option<Vec<Value>>,
}

/// Rolling-upgrade strategy applied in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InServiceStrategy {
    pub launch_config: Map<String, Value>,
    pub secondary_launch_configs: Vec<Value>,
    pub start_first: bool,
    pub interval_millis: u64,
    pub batch_size: u64,
}

/// Body of the `upgrade` action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceUpgrade {
    pub in_service_strategy: InServiceStrategy,
    pub to_service_strategy: Map<String, Value>,
}

#[derive(Deserialize)]
struct Collection<T> {
    data: Vec<T>,
}

/// Operations the deployment orchestrator needs from the platform.
pub trait RancherApi {
    /// Stacks whose name equals `name`.
    fn find_stacks(&self, name: &str) -> impl Future<Output = Result<Vec<Stack>, ApiError>> + Send;

    /// Services whose name equals `name`, optionally within one stack.
    fn find_services(
        &self,
        name: &str,
        stack_id: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Service>, ApiError>> + Send;

    /// Current state of a service.
    fn service(&self, id: &str) -> impl Future<Output = Result<Service, ApiError>> + Send;

    /// Submits a rolling upgrade.
    fn upgrade(
        &self,
        id: &str,
        upgrade: &ServiceUpgrade,
    ) -> impl Future<Output = Result<Service, ApiError>> + Send;

    /// Commits a completed upgrade.
    fn finish_upgrade(&self, id: &str) -> impl Future<Output = Result<Service, ApiError>> + Send;

    /// Reverts an upgrade to the previous launch configuration.
    fn rollback(&self, id: &str) -> impl Future<Output = Result<Service, ApiError>> + Send;
}

/// Request timeout for individual API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// REST client for the platform API.
#[derive(Debug, Clone)]
pub struct RancherClient {
    http: reqwest::Client,
    base: String,
    access_key: String,
    secret_key: String,
}

impl RancherClient {
    /// Creates a client for the API rooted at `credentials.url`.
    pub fn new(credentials: &RancherCredentials) -> Result<Self> {
        let url = url::Url::parse(&credentials.url)
            .map_err(|e| Error::Config(format!("invalid RANCHER_URL '{}': {e}", credentials.url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "invalid RANCHER_URL '{}': expected an http(s) URL",
                credentials.url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("release_pipeline/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base: credentials.url.trim_end_matches('/').to_string(),
            access_key: credentials.access_key.clone(),
            secret_key: credentials.secret_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let response = request
            .basic_auth(&self.access_key, Some(&self.secret_key))
            .send()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError {
                status: Some(status.as_u16()),
                message: body.trim().to_string(),
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError {
            status: Some(status.as_u16()),
            message: format!("unexpected response: {e}"),
        })
    }

    async fn action<B: Serialize>(&self, id: &str, action: &str, body: &B) -> Result<Service, ApiError> {
        log::debug!("POST services/{} action={}", id, action);
        let request = self
            .http
            .post(self.endpoint(&format!("services/{id}")))
            .query(&[("action", action)])
            .json(body);
        self.send(request).await
    }
}

impl RancherApi for RancherClient {
    async fn find_stacks(&self, name: &str) -> Result<Vec<Stack>, ApiError> {
        let request = self.http.get(self.endpoint("stacks")).query(&[("name", name)]);
        let collection: Collection<Stack> = self.send(request).await?;
        Ok(collection.data)
    }

    async fn find_services(&self, name: &str, stack_id: Option<&str>) -> Result<Vec<Service>, ApiError> {
        let mut query = vec![("name", name)];
        if let Some(stack_id) = stack_id {
            query.push(("stackId", stack_id));
        }
        let request = self.http.get(self.endpoint("services")).query(&query);
        let collection: Collection<Service> = self.send(request).await?;
        Ok(collection.data)
    }

    async fn service(&self, id: &str) -> Result<Service, ApiError> {
        let request = self.http.get(self.endpoint(&format!("services/{id}")));
        self.send(request).await
    }

    async fn upgrade(&self, id: &str, upgrade: &ServiceUpgrade) -> Result<Service, ApiError> {
        self.action(id, "upgrade", upgrade).await
    }

    async fn finish_upgrade(&self, id: &str) -> Result<Service, ApiError> {
        self.action(id, "finishupgrade", &Map::new()).await
    }

    async fn rollback(&self, id: &str) -> Result<Service, ApiError> {
        self.action(id, "rollback", &Map::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    const AUTH: &str = "Basic a2V5OnNlY3JldA==";

    fn client(server: &Server) -> RancherClient {
        RancherClient::new(&RancherCredentials {
            url: format!("{}/v2-beta/", server.url()),
            access_key: "key".into(),
            secret_key: "secret".into(),
        })
        .unwrap()
    }

    #[test]
    fn invalid_url_is_a_configuration_error() {
        let err = RancherClient::new(&RancherCredentials {
            url: "not a url".into(),
            access_key: "key".into(),
            secret_key: "secret".into(),
        })
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = RancherClient::new(&RancherCredentials {
            url: "ftp://rancher".into(),
            access_key: "key".into(),
            secret_key: "secret".into(),
        })
        .unwrap_err();
        assert!(err.to_string().contains("http(s)"));
    }

    #[tokio::test]
    async fn stacks_and_services_are_filtered_by_name() {
        let mut server = Server::new_async().await;
        let _stacks = server
            .mock("GET", "/v2-beta/stacks")
            .match_query(Matcher::UrlEncoded("name".into(), "stack-a".into()))
            .match_header("authorization", AUTH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[{"id":"1st5","name":"stack-a"}]}"#)
            .create_async()
            .await;
        let _services = server
            .mock("GET", "/v2-beta/services")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("name".into(), "service-b".into()),
                Matcher::UrlEncoded("stackId".into(), "1st5".into()),
            ]))
            .match_header("authorization", AUTH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data":[{"id":"1s9","name":"service-b","state":"active","stackId":"1st5",
                    "launchConfig":{"imageUuid":"docker:org/app:1","ports":["80:80/tcp"]}}]}"#,
            )
            .create_async()
            .await;

        let client = client(&server);
        let stacks = client.find_stacks("stack-a").await.unwrap();
        assert_eq!(stacks[0].id, "1st5");

        let services = client.find_services("service-b", Some("1st5")).await.unwrap();
        assert_eq!(services.len(), 1);
        let service = &services[0];
        assert_eq!(service.state, "active");
        assert_eq!(
            service.launch_config.as_ref().unwrap()["ports"],
            json!(["80:80/tcp"])
        );
        assert!(service.secondary_launch_configs.is_none());
    }

    #[tokio::test]
    async fn upgrade_posts_strategy_to_action_endpoint() {
        let mut server = Server::new_async().await;
        let upgrade = server
            .mock("POST", "/v2-beta/services/1s9")
            .match_query(Matcher::UrlEncoded("action".into(), "upgrade".into()))
            .match_body(Matcher::PartialJson(json!({
                "inServiceStrategy": {
                    "launchConfig": {"imageUuid": "docker:org/app:2"},
                    "startFirst": true,
                    "batchSize": 1,
                    "intervalMillis": 2000
                },
                "toServiceStrategy": {}
            })))
            .with_status(202)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"1s9","state":"upgrading"}"#)
            .create_async()
            .await;

        let mut launch_config = Map::new();
        launch_config.insert("imageUuid".into(), json!("docker:org/app:2"));
        let body = ServiceUpgrade {
            in_service_strategy: InServiceStrategy {
                launch_config,
                secondary_launch_configs: Vec::new(),
                start_first: true,
                interval_millis: 2000,
                batch_size: 1,
            },
            to_service_strategy: Map::new(),
        };

        let service = client(&server).upgrade("1s9", &body).await.unwrap();
        assert_eq!(service.state, "upgrading");
        upgrade.assert_async().await;
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v2-beta/services/1s9")
            .with_status(401)
            .with_body("Unauthorized")
            .create_async()
            .await;

        let err = client(&server).service("1s9").await.unwrap_err();
        assert_eq!(err.status, Some(401));
        assert!(err.is_auth_rejection());
        assert_eq!(err.to_string(), "HTTP 401: Unauthorized");
    }
}
