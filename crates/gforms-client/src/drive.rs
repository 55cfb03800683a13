//! Drive API operations
//!
//! The Forms API leans on Drive for sharing: a freshly created form is a
//! Drive file, and access is granted through the Drive permissions
//! endpoint.

use gforms_domain::{ApiResponse, HostKind, Result};
use serde_json::json;

use crate::client::GFormsClient;

impl GFormsClient {
    /// Grant a user access to a Drive file (e.g. a created form)
    ///
    /// Role `owner` implies an ownership transfer, which the Drive API
    /// requires to be flagged explicitly in the query string.
    pub async fn create_permission(
        &mut self,
        file_id: &str,
        role: &str,
        grantee_type: &str,
        email: &str,
    ) -> Result<ApiResponse> {
        self.check_credential()?;

        let mut path =
            format!("/drive/v3/files/{file_id}/permissions?supportsAllDrives=true");
        if role == "owner" {
            path.push_str("&transferOwnership=true");
        }

        let body = json!({
            "role": role,
            "type": grantee_type,
            "emailAddress": email,
        })
        .to_string();

        self.execute(HostKind::Drive, "POST", &path, Some(body)).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::SharedTokenState;
    use crate::transport::testing::{ScriptHandle, ScriptedTransport};

    fn scripted_client() -> (GFormsClient, ScriptHandle) {
        let token = Arc::new(SharedTokenState::new());
        token.set_token("tok", chrono::Utc::now());
        let transport = ScriptedTransport::new();
        let handle = transport.handle();
        let client =
            GFormsClient::builder().token(token).transport(Box::new(transport)).build();
        (client, handle)
    }

    fn ok_response(body: &str) -> String {
        format!("HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n{body}", body.len())
    }

    #[tokio::test]
    async fn writer_grant_targets_the_drive_host() {
        let (mut client, handle) = scripted_client();
        handle.script(ok_response("{}"));

        client.create_permission("file1", "writer", "user", "a@b.com").await.unwrap();

        assert_eq!(handle.connects(), vec![("www.googleapis.com".to_string(), 443)]);
        let wire = handle.written_str();
        assert!(wire
            .starts_with("POST /drive/v3/files/file1/permissions?supportsAllDrives=true HTTP/1.1\r\n"));
        assert!(!wire.contains("transferOwnership"));
        assert!(wire.contains(r#""role":"writer""#));
        assert!(wire.contains(r#""type":"user""#));
        assert!(wire.contains(r#""emailAddress":"a@b.com""#));
    }

    #[tokio::test]
    async fn owner_grant_flags_the_ownership_transfer() {
        let (mut client, handle) = scripted_client();
        handle.script(ok_response("{}"));

        client.create_permission("file1", "owner", "user", "a@b.com").await.unwrap();

        assert!(handle.written_str().starts_with(
            "POST /drive/v3/files/file1/permissions?supportsAllDrives=true&transferOwnership=true HTTP/1.1\r\n"
        ));
    }
}
