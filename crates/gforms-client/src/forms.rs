//! Forms API operations
//!
//! One method per REST verb. Every operation checks the credential gate
//! first — no bytes reach the transport without a ready token — then runs
//! session bootstrap → request composition → response resolution.

use gforms_domain::{ApiResponse, CreateFormOutcome, HostKind, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::client::GFormsClient;

/// Query parameters for [`GFormsClient::list_responses`]
///
/// Segments are emitted in the fixed order filter → pageSize → pageToken,
/// and only for non-empty / non-zero values; the values travel verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponsesQuery {
    /// Response filter, e.g. `timestamp > 2023-01-01T00:00:00Z`
    pub filter: String,
    /// Maximum number of responses to return; `0` omits the parameter
    pub page_size: u32,
    /// Continuation token from a previous list response
    pub page_token: String,
}

impl ListResponsesQuery {
    pub(crate) fn to_query_string(&self) -> String {
        let mut query = String::new();
        let mut push = |key: &str, value: &str| {
            query.push(if query.is_empty() { '?' } else { '&' });
            query.push_str(key);
            query.push('=');
            query.push_str(value);
        };

        if !self.filter.is_empty() {
            push("filter", &self.filter);
        }
        if self.page_size > 0 {
            push("pageSize", &self.page_size.to_string());
        }
        if !self.page_token.is_empty() {
            push("pageToken", &self.page_token);
        }
        query
    }
}

impl GFormsClient {
    /// Create a new form and grant the supplied user write access
    ///
    /// Two-phase: `POST /v1/forms` on the Forms host, then a dependent
    /// permission grant on the Drive host for the created form. The grant
    /// is skipped when the creation response carries no `formId`; a grant
    /// failure is reported through [`CreateFormOutcome::permission_error`]
    /// without masking the successful creation.
    pub async fn create_form(
        &mut self,
        title: &str,
        doc_title: &str,
        shared_user_email: &str,
    ) -> Result<CreateFormOutcome> {
        self.check_credential()?;

        let document_title = if doc_title.is_empty() { title } else { doc_title };
        let body = json!({
            "info": {
                "title": title,
                "document_title": document_title,
            }
        })
        .to_string();

        let response =
            self.execute(HostKind::Forms, "POST", "/v1/forms", Some(body)).await?;

        let form_id = serde_json::from_str::<serde_json::Value>(&response.body)
            .ok()
            .and_then(|v| v.get("formId").and_then(|id| id.as_str().map(str::to_owned)));

        let mut permission_error = None;
        if let Some(form_id) = form_id.as_deref() {
            debug!(form_id, "granting writer access");
            if let Err(err) =
                self.create_permission(form_id, "writer", "user", shared_user_email).await
            {
                warn!(form_id, error = %err, "permission grant failed after creation");
                permission_error = Some(err);
            }
        } else {
            warn!("creation response carried no formId; skipping permission grant");
        }

        Ok(CreateFormOutcome { response, form_id, permission_error })
    }

    /// Apply a batch of updates to a form
    pub async fn batch_update(
        &mut self,
        form_id: &str,
        request: &serde_json::Value,
    ) -> Result<ApiResponse> {
        self.check_credential()?;
        let path = format!("/v1/forms/{form_id}:batchUpdate");
        self.execute(HostKind::Forms, "POST", &path, Some(request.to_string())).await
    }

    /// Fetch a form
    pub async fn get_form(&mut self, form_id: &str) -> Result<ApiResponse> {
        self.check_credential()?;
        let path = format!("/v1/forms/{form_id}");
        self.execute(HostKind::Forms, "GET", &path, None).await
    }

    /// List a form's responses
    pub async fn list_responses(
        &mut self,
        form_id: &str,
        query: &ListResponsesQuery,
    ) -> Result<ApiResponse> {
        self.check_credential()?;
        let path = format!("/v1/forms/{form_id}/responses{}", query.to_query_string());
        self.execute(HostKind::Forms, "GET", &path, None).await
    }

    /// Fetch one response from a form
    pub async fn get_response(
        &mut self,
        form_id: &str,
        response_id: &str,
    ) -> Result<ApiResponse> {
        self.check_credential()?;
        let path = format!("/v1/forms/{form_id}/responses/{response_id}");
        self.execute(HostKind::Forms, "GET", &path, None).await
    }

    /// Collect the response IDs of a form
    pub async fn response_id_list(&mut self, form_id: &str) -> Result<Vec<String>> {
        let response = self.list_responses(form_id, &ListResponsesQuery::default()).await?;
        Ok(collect_ids(&response, "responses", "responseId"))
    }

    /// Create a watch on a form
    pub async fn create_watch(
        &mut self,
        form_id: &str,
        request: &serde_json::Value,
    ) -> Result<ApiResponse> {
        self.check_credential()?;
        let path = format!("/v1/forms/{form_id}/watches");
        self.execute(HostKind::Forms, "POST", &path, Some(request.to_string())).await
    }

    /// List the watches owned by the invoking project
    pub async fn list_watches(&mut self, form_id: &str) -> Result<ApiResponse> {
        self.check_credential()?;
        let path = format!("/v1/forms/{form_id}/watches");
        self.execute(HostKind::Forms, "GET", &path, None).await
    }

    /// Collect the watch IDs of a form
    pub async fn watch_id_list(&mut self, form_id: &str) -> Result<Vec<String>> {
        let response = self.list_watches(form_id).await?;
        Ok(collect_ids(&response, "watches", "id"))
    }

    /// Delete a watch
    pub async fn delete_watch(&mut self, form_id: &str, watch_id: &str) -> Result<ApiResponse> {
        self.check_credential()?;
        let path = format!("/v1/forms/{form_id}/watches/{watch_id}");
        self.execute(HostKind::Forms, "DELETE", &path, None).await
    }

    /// Renew an existing watch for another seven days
    pub async fn renew_watch(&mut self, form_id: &str, watch_id: &str) -> Result<ApiResponse> {
        self.check_credential()?;
        let path = format!("/v1/forms/{form_id}/watches/{watch_id}:renew");
        // bodyless POST: Content-Length 0 still goes on the wire
        self.execute(HostKind::Forms, "POST", &path, Some(String::new())).await
    }
}

/// Pull `list_field[].id_field` string values out of a list response body
fn collect_ids(response: &ApiResponse, list_field: &str, id_field: &str) -> Vec<String> {
    serde_json::from_str::<serde_json::Value>(&response.body)
        .ok()
        .and_then(|v| {
            v.get(list_field).and_then(|list| {
                list.as_array().map(|entries| {
                    entries
                        .iter()
                        .filter_map(|entry| {
                            entry.get(id_field).and_then(|id| id.as_str().map(str::to_owned))
                        })
                        .collect()
                })
            })
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use gforms_domain::{GFormsError, LastStatus};

    use super::*;
    use crate::auth::SharedTokenState;
    use crate::transport::testing::{ScriptHandle, ScriptedTransport};

    fn ready_token() -> Arc<SharedTokenState> {
        let token = Arc::new(SharedTokenState::new());
        token.set_token("ya29.test", chrono::Utc::now());
        token
    }

    fn scripted_client(token: Arc<SharedTokenState>) -> (GFormsClient, ScriptHandle) {
        let transport = ScriptedTransport::new();
        let handle = transport.handle();
        let client =
            GFormsClient::builder().token(token).transport(Box::new(transport)).build();
        (client, handle)
    }

    fn http_response(status: u16, body: &str) -> String {
        format!(
            "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        )
    }

    #[test]
    fn query_string_has_fixed_order_and_skips_empty_segments() {
        let query = ListResponsesQuery {
            filter: "ts>0".into(),
            page_size: 10,
            page_token: String::new(),
        };
        assert_eq!(query.to_query_string(), "?filter=ts>0&pageSize=10");

        let all = ListResponsesQuery {
            filter: "f".into(),
            page_size: 5,
            page_token: "tok".into(),
        };
        assert_eq!(all.to_query_string(), "?filter=f&pageSize=5&pageToken=tok");

        assert_eq!(ListResponsesQuery::default().to_query_string(), "");

        let token_only = ListResponsesQuery { page_token: "t2".into(), ..Default::default() };
        assert_eq!(token_only.to_query_string(), "?pageToken=t2");
    }

    #[tokio::test]
    async fn operations_fail_fast_without_a_ready_credential() {
        let token = Arc::new(SharedTokenState::new()); // uninitialized
        let (mut client, handle) = scripted_client(token);

        let err = client.get_form("f").await.unwrap_err();
        assert_eq!(err, GFormsError::CredentialNotReady);
        // zero bytes written, no connection opened
        assert!(handle.state().written.is_empty());
        assert!(handle.connects().is_empty());
    }

    #[tokio::test]
    async fn get_form_composes_path_and_bearer_token() {
        let (mut client, handle) = scripted_client(ready_token());
        handle.script(http_response(200, r#"{"formId":"f1"}"#));

        let response = client.get_form("f1").await.unwrap();
        assert_eq!(response.status, 200);

        let wire = handle.written_str();
        assert!(wire.starts_with("GET /v1/forms/f1 HTTP/1.1\r\n"));
        assert!(wire.contains("Host: forms.googleapis.com\r\n"));
        assert!(wire.contains("Authorization: Bearer ya29.test\r\n"));
        assert_eq!(client.last_status(), Some(LastStatus::Http(200)));
    }

    #[tokio::test]
    async fn list_responses_appends_the_query_string() {
        let (mut client, handle) = scripted_client(ready_token());
        handle.script(http_response(200, r#"{"responses":[]}"#));

        let query = ListResponsesQuery {
            filter: "ts>0".into(),
            page_size: 10,
            page_token: String::new(),
        };
        client.list_responses("f1", &query).await.unwrap();

        assert!(handle
            .written_str()
            .starts_with("GET /v1/forms/f1/responses?filter=ts>0&pageSize=10 HTTP/1.1\r\n"));
    }

    #[tokio::test]
    async fn server_failure_extracts_the_error_message_and_closes() {
        let (mut client, handle) = scripted_client(ready_token());
        handle.script(http_response(400, r#"{"error":{"message":"Invalid argument"}}"#));

        let err = client.get_form("bad").await.unwrap_err();
        assert_eq!(
            err,
            GFormsError::Server { status: 400, message: "Invalid argument".into() }
        );
        assert_eq!(client.last_status(), Some(LastStatus::Http(400)));
        assert_eq!(client.last_error(), Some("Invalid argument"));
        assert_eq!(handle.closes(), 1);
    }

    #[tokio::test]
    async fn write_failure_closes_and_reports_transport_status() {
        let (mut client, handle) = scripted_client(ready_token());
        handle.fail_write();

        let err = client.get_form("f").await.unwrap_err();
        assert!(matches!(err, GFormsError::WriteFailed(_)));
        assert!(matches!(client.last_status(), Some(LastStatus::Transport(code)) if code < 0));
        assert_eq!(handle.closes(), 1);
    }

    #[tokio::test]
    async fn renew_watch_posts_an_explicit_empty_body() {
        let (mut client, handle) = scripted_client(ready_token());
        handle.script(http_response(200, "{}"));

        client.renew_watch("f1", "w1").await.unwrap();

        let wire = handle.written_str();
        assert!(wire.starts_with("POST /v1/forms/f1/watches/w1:renew HTTP/1.1\r\n"));
        assert!(wire.contains("Content-Length: 0\r\n"));
        assert!(wire.contains("Content-Type: application/json\r\n"));
    }

    #[tokio::test]
    async fn get_response_addresses_a_single_response() {
        let (mut client, handle) = scripted_client(ready_token());
        handle.script(http_response(200, r#"{"responseId":"r7"}"#));

        client.get_response("f1", "r7").await.unwrap();
        assert!(handle.written_str().starts_with("GET /v1/forms/f1/responses/r7 HTTP/1.1\r\n"));
    }

    #[tokio::test]
    async fn delete_watch_uses_the_delete_method() {
        let (mut client, handle) = scripted_client(ready_token());
        handle.script(http_response(200, "{}"));

        client.delete_watch("f1", "w9").await.unwrap();
        assert!(handle.written_str().starts_with("DELETE /v1/forms/f1/watches/w9 HTTP/1.1\r\n"));
    }

    #[tokio::test]
    async fn create_form_grants_permission_after_creation() {
        let (mut client, handle) = scripted_client(ready_token());
        handle.script(http_response(200, r#"{"formId":"new-form"}"#));
        handle.script(http_response(200, r#"{"id":"perm1"}"#));

        let outcome = client.create_form("Survey", "", "user@example.com").await.unwrap();
        assert_eq!(outcome.form_id.as_deref(), Some("new-form"));
        assert!(outcome.permission_error.is_none());

        let wire = handle.written_str();
        // phase 1: create on the Forms host, doc title falling back to title
        assert!(wire.contains("POST /v1/forms HTTP/1.1\r\n"));
        assert!(wire.contains(r#""document_title":"Survey""#));
        // phase 2: grant on the Drive host
        assert!(wire.contains(
            "POST /drive/v3/files/new-form/permissions?supportsAllDrives=true HTTP/1.1\r\n"
        ));
        assert!(wire.contains("Host: www.googleapis.com\r\n"));
        assert!(wire.contains(r#""emailAddress":"user@example.com""#));
    }

    #[tokio::test]
    async fn create_form_without_form_id_skips_the_grant() {
        let (mut client, handle) = scripted_client(ready_token());
        handle.script(http_response(200, r#"{"info":{"title":"T"}}"#));

        let outcome = client.create_form("T", "D", "user@example.com").await.unwrap();
        assert!(outcome.form_id.is_none());
        assert!(outcome.permission_error.is_none());
        // only the creation request went out
        assert_eq!(handle.written_str().matches("POST ").count(), 1);
    }

    #[tokio::test]
    async fn create_form_reports_grant_failure_without_masking_success() {
        let (mut client, handle) = scripted_client(ready_token());
        handle.script(http_response(200, r#"{"formId":"new-form"}"#));
        handle.script(http_response(403, r#"{"error":{"message":"Drive API disabled"}}"#));

        let outcome = client.create_form("T", "D", "user@example.com").await.unwrap();
        assert_eq!(outcome.form_id.as_deref(), Some("new-form"));
        assert_eq!(outcome.response.status, 200);
        assert_eq!(
            outcome.permission_error,
            Some(GFormsError::Server { status: 403, message: "Drive API disabled".into() })
        );
    }

    #[tokio::test]
    async fn response_id_list_collects_ids() {
        let (mut client, handle) = scripted_client(ready_token());
        handle.script(http_response(
            200,
            r#"{"responses":[{"responseId":"r1"},{"responseId":"r2"},{"other":true}]}"#,
        ));

        let ids = client.response_id_list("f1").await.unwrap();
        assert_eq!(ids, vec!["r1".to_string(), "r2".to_string()]);
    }

    #[tokio::test]
    async fn watch_id_list_collects_ids() {
        let (mut client, handle) = scripted_client(ready_token());
        handle.script(http_response(200, r#"{"watches":[{"id":"w1"},{"id":"w2"}]}"#));

        let ids = client.watch_id_list("f1").await.unwrap();
        assert_eq!(ids, vec!["w1".to_string(), "w2".to_string()]);
    }

    #[tokio::test]
    async fn batch_update_posts_the_request_body() {
        let (mut client, handle) = scripted_client(ready_token());
        handle.script(http_response(200, "{}"));

        let request = serde_json::json!({"requests":[{"createItem":{}}]});
        client.batch_update("f1", &request).await.unwrap();

        let wire = handle.written_str();
        assert!(wire.starts_with("POST /v1/forms/f1:batchUpdate HTTP/1.1\r\n"));
        assert!(wire.ends_with(&request.to_string()));
    }
}
