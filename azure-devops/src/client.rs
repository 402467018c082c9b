use crate::auth::basic_auth_header;
use crate::config::Timeouts;
use crate::settings::ConnectionSettings;
use crate::shape::child_ids;
use crate::types::{Comment, CommentList, Relation, WiqlResult, WorkItem, WorkItemId, WorkItemList};
use crate::wiql::Wiql;
use http::StatusCode;
use http::header::AUTHORIZATION;
use std::fmt::Display;
use url::Url;

const API_VERSION: &str = "7.0";

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// The upstream answered with a non-success status.
    #[error("Azure DevOps API error: {body}")]
    Status { status: StatusCode, body: String },
    #[error("invalid base URL: {0}")]
    InvalidUrl(String),
    #[error("HTTP client error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Azure DevOps work item tracking client.
///
/// Holds no connection settings of its own, every call takes the settings
/// resolved for the request being served. Cloning is cheap and shares the
/// connection pool.
#[derive(Clone)]
pub struct Client {
    client: reqwest::Client,
}

impl Client {
    pub fn new(timeouts: &Timeouts) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeouts.connect())
            .timeout(timeouts.request())
            .build()?;

        Ok(Client { client })
    }

    /// Runs a WIQL query for the work items assigned to `assignee` and returns
    /// their IDs.
    pub async fn query_by_assignee(
        &self,
        settings: &ConnectionSettings,
        fields: &[&str],
        assignee: &str,
    ) -> Result<Vec<WorkItemId>, ClientError> {
        let response = self.send_query(settings, fields, assignee).await?;
        let result = error_for_status(response)
            .await?
            .json::<WiqlResult>()
            .await?;

        Ok(result.work_items.into_iter().map(|w| w.id).collect())
    }

    /// Runs the same query as [`Client::query_by_assignee`] but only checks
    /// the answer's status. The body is never decoded.
    pub async fn probe(
        &self,
        settings: &ConnectionSettings,
        fields: &[&str],
        assignee: &str,
    ) -> Result<(), ClientError> {
        let response = self.send_query(settings, fields, assignee).await?;
        error_for_status(response).await?;
        Ok(())
    }

    /// Batch fetches work items, optionally restricted to `fields`.
    pub async fn fetch_details<T: Display>(
        &self,
        settings: &ConnectionSettings,
        ids: &[T],
        fields: Option<&[&str]>,
    ) -> Result<Vec<WorkItem>, ClientError> {
        let response = self.send_details(settings, ids, fields).await?;
        let list = error_for_status(response)
            .await?
            .json::<WorkItemList>()
            .await?;

        Ok(list.value)
    }

    /// Fetches a single work item with all of its relations expanded.
    pub async fn fetch_work_item(
        &self,
        settings: &ConnectionSettings,
        id: &str,
    ) -> Result<WorkItem, ClientError> {
        let url = api_url(settings, &["workitems", id])?;

        let response = self
            .client
            .get(url)
            .query(&[("$expand", "all"), ("api-version", API_VERSION)])
            .header(AUTHORIZATION, basic_auth_header(&settings.access_token))
            .send()
            .await?;

        Ok(error_for_status(response).await?.json::<WorkItem>().await?)
    }

    /// Fetches the discussion of a work item. Any non-200 answer counts as no
    /// comments.
    pub async fn fetch_comments(
        &self,
        settings: &ConnectionSettings,
        id: &str,
    ) -> Result<Vec<Comment>, ClientError> {
        let url = api_url(settings, &["workitems", id, "comments"])?;

        let response = self
            .client
            .get(url)
            .query(&[("api-version", API_VERSION)])
            .header(AUTHORIZATION, basic_auth_header(&settings.access_token))
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            tracing::debug!(id, status = %response.status(), "Comments unavailable");
            return Ok(Vec::new());
        }

        Ok(response.json::<CommentList>().await?.comments)
    }

    /// Fetches the children linked from `relations`. Any non-200 answer counts
    /// as no children.
    pub async fn fetch_children(
        &self,
        settings: &ConnectionSettings,
        relations: &[Relation],
    ) -> Result<Vec<WorkItem>, ClientError> {
        let ids = child_ids(relations);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let response = self.send_details(settings, &ids, None).await?;
        if response.status() != StatusCode::OK {
            tracing::debug!(status = %response.status(), "Child work items unavailable");
            return Ok(Vec::new());
        }

        Ok(response.json::<WorkItemList>().await?.value)
    }

    async fn send_query(
        &self,
        settings: &ConnectionSettings,
        fields: &[&str],
        assignee: &str,
    ) -> Result<reqwest::Response, ClientError> {
        let url = api_url(settings, &["wiql"])?;
        let wiql = Wiql::assigned_to(fields, assignee);
        tracing::debug!(query = %wiql.query, "Running WIQL query");

        Ok(self
            .client
            .post(url)
            .query(&[("api-version", API_VERSION)])
            .header(AUTHORIZATION, basic_auth_header(&settings.access_token))
            .json(&wiql)
            .send()
            .await?)
    }

    async fn send_details<T: Display>(
        &self,
        settings: &ConnectionSettings,
        ids: &[T],
        fields: Option<&[&str]>,
    ) -> Result<reqwest::Response, ClientError> {
        let url = api_url(settings, &["workitems"])?;

        let mut query = vec![("ids", join(ids))];
        if let Some(fields) = fields {
            query.push(("fields", fields.join(",")));
        }
        query.push(("api-version", API_VERSION.to_string()));

        Ok(self
            .client
            .get(url)
            .query(&query)
            .header(AUTHORIZATION, basic_auth_header(&settings.access_token))
            .send()
            .await?)
    }
}

/// `{base_url}/{project}/_apis/wit/{segments..}`
fn api_url(settings: &ConnectionSettings, segments: &[&str]) -> Result<Url, ClientError> {
    let mut url =
        Url::parse(&settings.base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

    url.path_segments_mut()
        .map_err(|_| ClientError::InvalidUrl(settings.base_url.clone()))?
        .pop_if_empty()
        .push(&settings.project)
        .extend(["_apis", "wit"])
        .extend(segments);

    Ok(url)
}

async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::error!(%status, %body, "Azure DevOps API error");
    Err(ClientError::Status { status, body })
}

fn join<T: Display>(ids: &[T]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HIERARCHY_FORWARD;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(server: &MockServer) -> ConnectionSettings {
        ConnectionSettings {
            organization: "contoso".into(),
            project: "Fabrikam".into(),
            base_url: server.uri(),
            access_token: "secret".into(),
        }
    }

    fn client() -> Client {
        Client::new(&Timeouts::default()).unwrap()
    }

    #[test]
    fn test_api_url() {
        let mut settings = ConnectionSettings {
            organization: "contoso".into(),
            project: "Fabrikam Fiber".into(),
            base_url: "https://contoso.visualstudio.com/".into(),
            access_token: "t".into(),
        };
        let url = api_url(&settings, &["workitems", "42", "comments"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://contoso.visualstudio.com/Fabrikam%20Fiber/_apis/wit/workitems/42/comments"
        );

        settings.base_url = "https://dev.azure.com/contoso".into();
        settings.project = "Fabrikam".into();
        let url = api_url(&settings, &["wiql"]).unwrap();
        assert_eq!(url.as_str(), "https://dev.azure.com/contoso/Fabrikam/_apis/wit/wiql");

        settings.base_url = "contoso.visualstudio.com".into();
        assert!(matches!(
            api_url(&settings, &["wiql"]),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_query_by_assignee() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/Fabrikam/_apis/wit/wiql"))
            .and(query_param("api-version", "7.0"))
            .and(header("authorization", "Basic OnNlY3JldA=="))
            .and(body_json(json!({
                "query": "SELECT [System.Id] FROM WorkItems WHERE [System.AssignedTo] = 'jane@contoso.com'"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "queryType": "flat",
                "workItems": [{"id": 11, "url": "u"}, {"id": 12, "url": "u"}]
            })))
            .mount(&mock_server)
            .await;

        let ids = client()
            .query_by_assignee(&settings(&mock_server), &["System.Id"], "jane@contoso.com")
            .await
            .unwrap();
        assert_eq!(ids, vec![11, 12]);
    }

    #[tokio::test]
    async fn test_query_error_carries_status_and_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/Fabrikam/_apis/wit/wiql"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Access denied"))
            .mount(&mock_server)
            .await;

        let err = client()
            .query_by_assignee(&settings(&mock_server), &["System.Id"], "jane@contoso.com")
            .await
            .unwrap_err();

        match err {
            ClientError::Status { status, body } => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(body, "Access denied");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_probe_ignores_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/Fabrikam/_apis/wit/wiql"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        client()
            .probe(&settings(&mock_server), &["System.Id"], "test@example.com")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_fetch_details_with_fields() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/Fabrikam/_apis/wit/workitems"))
            .and(query_param("ids", "1,2"))
            .and(query_param("fields", "System.IterationPath"))
            .and(query_param("api-version", "7.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 2,
                "value": [
                    {"id": 1, "fields": {"System.IterationPath": "Fabrikam\\Sprint 1"}},
                    {"id": 2, "fields": {}}
                ]
            })))
            .mount(&mock_server)
            .await;

        let items = client()
            .fetch_details(&settings(&mock_server), &[1, 2], Some(&["System.IterationPath"][..]))
            .await
            .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0].fields.iteration_path.as_deref(),
            Some("Fabrikam\\Sprint 1")
        );
        assert!(items[1].fields.iteration_path.is_none());
    }

    #[tokio::test]
    async fn test_fetch_work_item_expands_relations() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/Fabrikam/_apis/wit/workitems/42"))
            .and(query_param("$expand", "all"))
            .and(query_param("api-version", "7.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 42,
                "fields": {"System.Title": "Parent"},
                "relations": [{"rel": HIERARCHY_FORWARD, "url": "https://x/_apis/wit/workItems/43"}]
            })))
            .mount(&mock_server)
            .await;

        let item = client()
            .fetch_work_item(&settings(&mock_server), "42")
            .await
            .unwrap();
        assert_eq!(item.id, 42);
        assert_eq!(item.relations.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_work_item_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/Fabrikam/_apis/wit/workitems/404"))
            .respond_with(ResponseTemplate::new(404).set_body_string("TF401232: not found"))
            .mount(&mock_server)
            .await;

        let err = client()
            .fetch_work_item(&settings(&mock_server), "404")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Status { status, .. } if status == StatusCode::NOT_FOUND));
        assert_eq!(err.to_string(), "Azure DevOps API error: TF401232: not found");
    }

    #[tokio::test]
    async fn test_fetch_comments() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/Fabrikam/_apis/wit/workitems/42/comments"))
            .and(query_param("api-version", "7.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "totalCount": 1,
                "comments": [{
                    "id": 5,
                    "text": "Looks good",
                    "createdBy": {"displayName": "Jane"},
                    "createdDate": "2024-03-01T10:00:00Z"
                }]
            })))
            .mount(&mock_server)
            .await;

        let comments = client()
            .fetch_comments(&settings(&mock_server), "42")
            .await
            .unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].text, "Looks good");
    }

    #[tokio::test]
    async fn test_fetch_comments_non_200_is_empty() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/Fabrikam/_apis/wit/workitems/42/comments"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&mock_server)
            .await;

        let comments = client()
            .fetch_comments(&settings(&mock_server), "42")
            .await
            .unwrap();
        assert!(comments.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_children() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/Fabrikam/_apis/wit/workitems"))
            .and(query_param("ids", "101,102"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{"id": 101, "fields": {}}, {"id": 102, "fields": {}}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let relations = vec![
            Relation {
                rel: HIERARCHY_FORWARD.into(),
                url: "https://x/_apis/wit/workItems/101".into(),
            },
            Relation {
                rel: "System.LinkTypes.Hierarchy-Reverse".into(),
                url: "https://x/_apis/wit/workItems/1".into(),
            },
            Relation {
                rel: HIERARCHY_FORWARD.into(),
                url: "https://x/_apis/wit/workItems/102".into(),
            },
        ];

        let children = client()
            .fetch_children(&settings(&mock_server), &relations)
            .await
            .unwrap();
        let ids: Vec<_> = children.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![101, 102]);
    }

    #[tokio::test]
    async fn test_fetch_children_non_200_is_empty() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/Fabrikam/_apis/wit/workitems"))
            .and(query_param("ids", "101"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let relations = vec![Relation {
            rel: HIERARCHY_FORWARD.into(),
            url: "https://x/_apis/wit/workItems/101".into(),
        }];

        let children = client()
            .fetch_children(&settings(&mock_server), &relations)
            .await
            .unwrap();
        assert!(children.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_children_without_links_skips_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let relations = vec![Relation {
            rel: "System.LinkTypes.Related".into(),
            url: "https://x/_apis/wit/workItems/9".into(),
        }];

        let children = client()
            .fetch_children(&settings(&mock_server), &relations)
            .await
            .unwrap();
        assert!(children.is_empty());
    }

    #[tokio::test]
    async fn test_transport_error() {
        // Nothing listens on the discard port
        let settings = ConnectionSettings {
            organization: "o".into(),
            project: "p".into(),
            base_url: "http://127.0.0.1:9".into(),
            access_token: "t".into(),
        };

        let err = client()
            .query_by_assignee(&settings, &["System.Id"], "a")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }
}
