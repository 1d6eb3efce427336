//! Integration tests for the OmniDesk HTTP client

use omnidesk_core::{ReferenceNumber, TicketStatus};
use omnidesk_http::types::{NewTicket, PortalTicket, TicketUpdate};
use omnidesk_http::{
    Attachment, ClientError, MemoryTokenStore, OmnideskClient, TokenStore, Tokens,
};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{
    body_json, body_string_contains, header, header_regex, method, path,
};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

struct NoAuthorization;

impl Match for NoAuthorization {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

fn tickets_body() -> serde_json::Value {
    json!({
        "tickets": [{
            "id": 1,
            "title": "Printer jammed",
            "description": "Third floor",
            "status": "Open",
            "priority": "Low",
            "created_at": "2024-03-01T09:30:15.123456",
            "created_by": {"id": 1, "username": "alice"},
            "assigned_to": null
        }]
    })
}

fn client_with(server: &MockServer, tokens: Tokens) -> (OmnideskClient, Arc<MemoryTokenStore>) {
    let store = Arc::new(MemoryTokenStore::with_tokens(tokens));
    let client = OmnideskClient::builder()
        .base_url(format!("{}/api", server.uri()))
        .token_store(store.clone())
        .build()
        .unwrap();
    (client, store)
}

#[tokio::test]
async fn test_client_builder() {
    let client = OmnideskClient::builder()
        .base_url("http://localhost:5000/api/")
        .build()
        .unwrap();

    assert_eq!(client.base_url(), "http://localhost:5000/api");
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_client_builder_requires_base_url() {
    let result = OmnideskClient::builder().build();
    assert!(matches!(result, Err(ClientError::Configuration(_))));
}

#[tokio::test]
async fn test_attaches_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tickets"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tickets_body()))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_with(&server, Tokens::new("access-1", "refresh-1"));
    let tickets = client.list_tickets().await.unwrap();

    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].created_by.as_ref().unwrap().username, "alice");
}

#[tokio::test]
async fn test_refreshes_once_and_replays_with_new_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tickets"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"msg": "Token has expired"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(header("authorization", "Bearer refresh-1"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "fresh"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/tickets"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tickets_body()))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_with(&server, Tokens::new("stale", "refresh-1"));
    let tickets = client.list_tickets().await.unwrap();

    assert_eq!(tickets.len(), 1);
    assert_eq!(store.access_token().as_deref(), Some("fresh"));
    assert_eq!(store.refresh_token().as_deref(), Some("refresh-1"));
}

#[tokio::test]
async fn test_replays_request_body() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/tickets/7"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "fresh"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/tickets/7"))
        .and(header("authorization", "Bearer fresh"))
        .and(body_json(json!({"status": "Closed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Ticket updated successfully",
            "ticket": {
                "id": 7,
                "title": "VPN down",
                "description": "Cannot connect",
                "status": "Closed",
                "priority": "High",
                "assigned_to": null
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_with(&server, Tokens::new("stale", "refresh-1"));
    let update = TicketUpdate {
        status: Some(TicketStatus::Closed),
        ..TicketUpdate::default()
    };
    let envelope = client.update_ticket(7, &update).await.unwrap();

    assert_eq!(envelope.ticket.status, TicketStatus::Closed);
}

#[tokio::test]
async fn test_second_unauthorized_does_not_refresh_again() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tickets"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Still no"})))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "fresh"})))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_with(&server, Tokens::new("stale", "refresh-1"));
    let result = client.list_tickets().await;

    assert!(matches!(result, Err(ClientError::AuthenticationFailed(msg)) if msg == "Still no"));
}

#[tokio::test]
async fn test_missing_refresh_token_expires_session_without_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tickets"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let tokens = Tokens {
        access_token: Some("stale".into()),
        refresh_token: None,
    };
    let (client, store) = client_with(&server, tokens);
    let result = client.list_tickets().await;

    assert!(matches!(result, Err(ClientError::SessionExpired)));
    assert_eq!(store.access_token().as_deref(), Some("stale"));
}

#[tokio::test]
async fn test_failed_refresh_clears_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users/profile"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"msg": "Token has expired"})))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_with(&server, Tokens::new("stale", "expired-refresh"));
    let result = client.profile().await;

    assert!(result.unwrap_err().is_session_expired());
    assert!(store.tokens().is_empty());
}

/// Store whose tokens cannot be removed, like a session file on a read-only disk
struct StickyTokenStore(MemoryTokenStore);

impl TokenStore for StickyTokenStore {
    fn tokens(&self) -> Tokens {
        self.0.tokens()
    }

    fn store(&self, tokens: Tokens) -> Result<(), ClientError> {
        self.0.store(tokens)
    }

    fn clear(&self) -> Result<(), ClientError> {
        Err(ClientError::storage(
            "session.json",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        ))
    }
}

#[tokio::test]
async fn test_failed_refresh_reports_expiry_even_if_clear_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tickets"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(StickyTokenStore(MemoryTokenStore::with_tokens(Tokens::new(
        "stale", "expired-refresh",
    ))));
    let client = OmnideskClient::builder()
        .base_url(format!("{}/api", server.uri()))
        .token_store(store)
        .build()
        .unwrap();

    let result = client.list_tickets().await;

    assert!(result.unwrap_err().is_session_expired());
}

#[tokio::test]
async fn test_login_stores_tokens_and_skips_refresh_on_bad_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"username": "alice", "password": "wrong"})))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"username": "alice", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "a-1",
            "refresh_token": "r-1",
            "user": {"id": 1, "username": "alice", "email": "alice@example.com", "is_admin": true}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (client, store) = client_with(&server, Tokens::new("old", "old-refresh"));

    let failed = client.login("alice", "wrong").await;
    assert!(matches!(failed, Err(ClientError::AuthenticationFailed(msg)) if msg == "Invalid credentials"));
    assert_eq!(store.access_token().as_deref(), Some("old"));

    let response = client.login("alice", "secret").await.unwrap();
    assert!(response.user.is_admin());
    assert_eq!(store.tokens(), Tokens::new("a-1", "r-1"));
}

#[tokio::test]
async fn test_logout_clears_tokens_even_when_backend_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_with(&server, Tokens::new("a", "r"));
    client.logout().await.unwrap();

    assert!(store.tokens().is_empty());
}

#[tokio::test]
async fn test_error_message_from_backend() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/tickets"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"message": "Title and description are required"})),
        )
        .mount(&server)
        .await;

    let (client, _) = client_with(&server, Tokens::new("a", "r"));
    let result = client.create_ticket(&NewTicket::new("", "")).await;

    match result {
        Err(e @ ClientError::BadRequest(_)) => {
            assert_eq!(e.user_message(), "Title and description are required");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_user_lookup_escapes_username() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users/jane%20doe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 4,
            "username": "jane doe",
            "email": "jane@example.com",
            "about_me": "",
            "last_seen": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_with(&server, Tokens::new("a", "r"));
    let user = client.user_by_username("jane doe").await.unwrap();

    assert_eq!(user.id, 4);
    assert!(user.last_seen.is_none());

    for name in [".", ".."] {
        assert!(matches!(
            client.user_by_username(name).await,
            Err(ClientError::BadRequest(_))
        ));
    }
}

#[tokio::test]
async fn test_user_lookup_escapes_slashes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users/a%2Fb"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "User not found"})))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_with(&server, Tokens::new("a", "r"));
    let result = client.user_by_username("a/b").await;

    assert!(matches!(result, Err(ClientError::NotFound(msg)) if msg == "User not found"));
}

#[tokio::test]
async fn test_portal_submit_is_multipart_and_unauthenticated() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/client/submit-ticket"))
        .and(NoAuthorization)
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("name=\"surname\""))
        .and(body_string_contains("name=\"file_0\"; filename=\"screen.png\""))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "message": "Ticket submitted successfully",
            "ticket_id": 17,
            "reference_number": "CT000005"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_with(&server, Tokens::new("a", "r"));
    let ticket = PortalTicket {
        name: "Jane".into(),
        surname: "Doe".into(),
        phone: "+1 555 0100 200".into(),
        email: "jane@example.com".into(),
        description: "My invoice for March never arrived.".into(),
    };
    let attachment = Attachment::new("screen.png", b"fake png bytes".to_vec()).unwrap();

    let response = client
        .portal()
        .submit_ticket(ticket, vec![attachment])
        .await
        .unwrap();

    assert_eq!(response.ticket_id, 17);
    assert_eq!(response.reference_number, ReferenceNumber::from_id(5));
}

#[tokio::test]
async fn test_portal_status_lookup() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/client/ticket-status/CT000042"))
        .and(NoAuthorization)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reference_number": "CT000042",
            "status": "In Progress",
            "submitted_at": "2024-03-01T09:30:15.5",
            "description": "Printer is on fire"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/client/ticket-status/CT000043"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Ticket not found"})))
        .mount(&server)
        .await;

    let portal = omnidesk_http::PortalClient::new(format!("{}/api", server.uri())).unwrap();

    let status = portal
        .ticket_status("ct42".parse().unwrap())
        .await
        .unwrap();
    assert_eq!(status.status, TicketStatus::InProgress);

    let missing = portal.ticket_status(ReferenceNumber::from_id(43)).await;
    assert!(matches!(missing, Err(ClientError::NotFound(msg)) if msg == "Ticket not found"));
}
