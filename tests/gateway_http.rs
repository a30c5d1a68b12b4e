use designmart::models::{Session, UserRole, UserSummary};
use designmart::session::{MemorySessionStore, SessionStore};
use designmart::{ApiRequest, GatewayError, ReqwestTransport, SessionGateway};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MY_PURCHASES: &str = "/api/v1/purchase/get-all-my-purchase";
const ACCESS_TOKEN: &str = "/api/v1/auth/access-token";
const LOGIN: &str = "/api/v1/auth/login";

fn customer() -> UserSummary {
    UserSummary {
        id: "c-1".to_string(),
        name: "Lin".to_string(),
        email: "lin@example.com".to_string(),
        role: UserRole::Customer,
        created_at: None,
        updated_at: None,
    }
}

fn setup(server: &MockServer, token: Option<&str>) -> (SessionGateway, Arc<MemorySessionStore>) {
    let session = match token {
        Some(token) => Session::new(customer(), token),
        None => Session::default(),
    };
    let store = Arc::new(MemorySessionStore::with_session(session));
    let transport = Arc::new(ReqwestTransport::new(server.uri()).unwrap());
    let gateway = SessionGateway::new(transport, store.clone());
    (gateway, store)
}

fn unauthorized() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({
        "success": false,
        "statusCode": 401,
        "message": "You are not authorized"
    }))
}

fn issued(token: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "success": true,
        "statusCode": 200,
        "message": "Access token retrieved",
        "data": { "accessToken": token }
    }))
}

#[tokio::test]
async fn test_expired_token_is_renewed_and_request_replayed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(MY_PURCHASES))
        .and(header("authorization", "A1"))
        .respond_with(unauthorized())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ACCESS_TOKEN))
        .respond_with(issued("A2"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(MY_PURCHASES))
        .and(header("authorization", "A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "statusCode": 200,
            "message": "ok",
            "data": [{ "_id": "p-1" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (gateway, store) = setup(&server, Some("A1"));
    let response = gateway.send(&ApiRequest::get(MY_PURCHASES)).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body["data"][0]["_id"], "p-1");
    assert_eq!(store.access_token().as_deref(), Some("A2"));
    assert_eq!(store.snapshot().current_user, Some(customer()));
}

#[tokio::test]
async fn test_refresh_request_carries_no_access_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(MY_PURCHASES))
        .respond_with(unauthorized())
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ACCESS_TOKEN))
        .respond_with(issued("A2"))
        .mount(&server)
        .await;

    let (gateway, _store) = setup(&server, Some("A1"));
    let _ = gateway.send(&ApiRequest::get(MY_PURCHASES)).await;

    let requests = server.received_requests().await.unwrap();
    let refresh = requests
        .iter()
        .find(|r| r.url.path() == ACCESS_TOKEN)
        .expect("refresh call");
    assert!(refresh.headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_second_unauthorized_is_returned_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(MY_PURCHASES))
        .respond_with(unauthorized())
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ACCESS_TOKEN))
        .respond_with(issued("A2"))
        .expect(1)
        .mount(&server)
        .await;

    let (gateway, _store) = setup(&server, Some("A1"));
    let error = gateway.send(&ApiRequest::get(MY_PURCHASES)).await.unwrap_err();

    assert!(error.is_unauthorized());
}

#[tokio::test]
async fn test_bad_login_never_refreshes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "statusCode": 401,
            "message": "Password is incorrect"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ACCESS_TOKEN))
        .respond_with(issued("never"))
        .expect(0)
        .mount(&server)
        .await;

    let (gateway, store) = setup(&server, None);
    let request = ApiRequest::post(LOGIN).with_body(json!({ "email": "lin@example.com", "password": "nope" }));
    let error = gateway.send(&request).await.unwrap_err();

    assert_eq!(error.status(), Some(401));
    assert!(error.to_string().contains("Password is incorrect"));
    assert_eq!(store.snapshot(), Session::default());
}

#[tokio::test]
async fn test_failed_refresh_clears_session_and_keeps_original_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(MY_PURCHASES))
        .respond_with(unauthorized())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ACCESS_TOKEN))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "statusCode": 401,
            "message": "Refresh token expired"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (gateway, store) = setup(&server, Some("A1"));
    let error = gateway.send(&ApiRequest::get(MY_PURCHASES)).await.unwrap_err();

    assert_eq!(error.to_string(), "API error (status 401): You are not authorized");
    assert!(store.access_token().is_none());
    assert!(store.snapshot().current_user.is_none());
}

#[tokio::test]
async fn test_concurrent_expiry_triggers_one_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("authorization", "A1"))
        .respond_with(unauthorized().set_delay(Duration::from_millis(50)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ACCESS_TOKEN))
        .respond_with(issued("A2").set_delay(Duration::from_millis(50)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(header("authorization", "A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    let (gateway, store) = setup(&server, Some("A1"));
    let paths = [MY_PURCHASES, "/api/v1/users/me", "/api/v1/reviews/design-reviews/d-1"];
    let requests: Vec<ApiRequest> = paths.iter().map(|p| ApiRequest::get(*p)).collect();

    let results = futures::future::join_all(requests.iter().map(|r| gateway.send(r))).await;

    for result in results {
        assert_eq!(result.unwrap().status, 200);
    }
    assert_eq!(store.access_token().as_deref(), Some("A2"));
}

#[tokio::test]
async fn test_timeout_does_not_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(MY_PURCHASES))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ACCESS_TOKEN))
        .respond_with(issued("A2"))
        .expect(0)
        .mount(&server)
        .await;

    let (gateway, store) = setup(&server, Some("A1"));
    let gateway = gateway.with_timeout(Duration::from_millis(200));
    let error = gateway.send(&ApiRequest::get(MY_PURCHASES)).await.unwrap_err();

    assert!(matches!(error, GatewayError::Timeout));
    assert_eq!(store.access_token().as_deref(), Some("A1"));
}

#[tokio::test]
async fn test_unreachable_server_is_a_network_error() {
    // Nothing listens on the discard port
    let store = Arc::new(MemorySessionStore::with_session(Session::new(customer(), "A1")));
    let transport = Arc::new(ReqwestTransport::new("http://127.0.0.1:9").unwrap());
    let gateway = SessionGateway::new(transport, store.clone());

    let error = gateway.send(&ApiRequest::get(MY_PURCHASES)).await.unwrap_err();
    assert!(matches!(error, GatewayError::NetworkError(_)));
    assert_eq!(store.access_token().as_deref(), Some("A1"));
}

#[tokio::test]
async fn test_absolute_login_url_is_still_exempt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGIN))
        .respond_with(unauthorized())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ACCESS_TOKEN))
        .respond_with(issued("never"))
        .expect(0)
        .mount(&server)
        .await;

    let (gateway, store) = setup(&server, Some("A1"));
    let request = ApiRequest::post(format!("{}{}", server.uri(), LOGIN))
        .with_body(json!({ "email": "lin@example.com", "password": "nope" }));
    let error = gateway.send(&request).await.unwrap_err();

    assert_eq!(error.status(), Some(401));
    assert_eq!(store.access_token().as_deref(), Some("A1"));
}

#[tokio::test]
async fn test_foreign_host_never_receives_the_token() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&other)
        .await;
    Mock::given(method("GET"))
        .and(path(ACCESS_TOKEN))
        .respond_with(issued("A2"))
        .expect(0)
        .mount(&server)
        .await;

    let (gateway, store) = setup(&server, Some("A1"));
    let request = ApiRequest::get(format!("{}{}", other.uri(), MY_PURCHASES));
    let error = gateway.send(&request).await.unwrap_err();

    assert!(matches!(error, GatewayError::InvalidUrl(_)));
    assert_eq!(store.access_token().as_deref(), Some("A1"));
}
