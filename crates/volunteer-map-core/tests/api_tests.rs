use httpmock::prelude::*;
use serde_json::json;
use volunteer_map_core::api::{ApiClient, ApiError};
use volunteer_map_core::auth::{Session, ACCESS_TOKEN_KEY, USER_INFO_KEY};
use volunteer_map_core::models::{NewEvent, Position};
use volunteer_map_core::store::{KeyValueStore, MemoryStore};

fn sample_event_json() -> serde_json::Value {
    json!({
        "id": "1",
        "name": "Beach cleanup",
        "description": "Bring gloves",
        "dateTime": "2030-01-01T00:00:00Z",
        "position": { "latitude": -3.73, "longitude": -38.52 },
        "volunteersNeeded": 5,
        "volunteersIds": ["a"],
        "imageUrl": null,
        "organizerId": "org-1"
    })
}

#[tokio::test]
async fn test_authenticate_success() {
    // Arrange
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/login")
                .json_body(json!({ "email": "ana@example.com", "password": "pw" }));
            then.status(200)
                .json_body(json!({ "accessToken": "tok-123", "user": { "id": 7, "email": "ana@example.com" } }));
        })
        .await;
    let api = ApiClient::new(server.base_url()).unwrap();

    // Act
    let data = api.authenticate("ana@example.com", "pw").await.unwrap();

    // Assert
    mock.assert_async().await;
    assert_eq!(data.access_token, "tok-123");
    assert_eq!(data.user.id, "7");
}

#[tokio::test]
async fn test_authenticate_wrong_password() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/login");
            then.status(401).body("Incorrect password");
        })
        .await;
    let api = ApiClient::new(server.base_url()).unwrap();

    let err = api.authenticate("ana@example.com", "nope").await.unwrap_err();

    assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::Unauthorized)));
}

#[tokio::test]
async fn test_login_persists_session() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/login");
            then.status(200)
                .json_body(json!({ "accessToken": "tok-123", "user": { "id": "u1", "email": "ana@example.com" } }));
        })
        .await;
    let api = ApiClient::new(server.base_url()).unwrap();
    let store = MemoryStore::new();

    let session = Session::login(&api, &store, "ana@example.com", "pw").await.unwrap();

    assert_eq!(session.user_id(), "u1");
    assert!(store.get(USER_INFO_KEY).unwrap().is_some());
    assert!(store.get(ACCESS_TOKEN_KEY).unwrap().is_some());

    let restored = Session::restore(&store).unwrap().expect("restored session");
    assert_eq!(restored.token(), "tok-123");

    restored.logout(&store).unwrap();
    assert!(Session::restore(&store).unwrap().is_none());
}

#[tokio::test]
async fn test_list_events_sends_bearer_token() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/eventsData")
                .header("authorization", "Bearer tok-123");
            then.status(200).json_body(json!([sample_event_json()]));
        })
        .await;
    let api = ApiClient::new(server.base_url()).unwrap().with_token("tok-123".to_string());

    let events = api.list_events().await.unwrap();

    mock.assert_async().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, "Beach cleanup");
    assert_eq!(events[0].volunteers_ids, vec!["a"]);
}

#[tokio::test]
async fn test_list_events_server_error_is_not_retried() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/eventsData");
            then.status(503).body("maintenance");
        })
        .await;
    let api = ApiClient::new(server.base_url()).unwrap();

    let err = api.list_events().await.unwrap_err();

    // Exactly one call
    mock.assert_async().await;
    assert!(matches!(
        err.downcast_ref::<ApiError>(),
        Some(ApiError::ServerError(body)) if body == "maintenance"
    ));
}

#[tokio::test]
async fn test_list_events_malformed_body() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/eventsData");
            then.status(200).body("{\"not\": \"a list\"}");
        })
        .await;
    let api = ApiClient::new(server.base_url()).unwrap();

    let err = api.list_events().await.unwrap_err();

    assert!(err.to_string().contains("Failed to parse events response"));
}

#[tokio::test]
async fn test_create_event() {
    let server = MockServer::start_async().await;
    let new_event = NewEvent {
        name: "Beach cleanup".to_string(),
        description: "Bring gloves".to_string(),
        date_time: "2030-01-01T09:30:00.000Z".to_string(),
        position: Position::new(-3.73, -38.52),
        volunteers_needed: 5,
        volunteers_ids: Vec::new(),
        image_url: Some("https://x/y.jpg".to_string()),
        organizer_id: "u1".to_string(),
    };
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/eventsData").json_body(json!({
                "name": "Beach cleanup",
                "description": "Bring gloves",
                "dateTime": "2030-01-01T09:30:00.000Z",
                "position": { "latitude": -3.73, "longitude": -38.52 },
                "volunteersNeeded": 5,
                "volunteersIds": [],
                "imageUrl": "https://x/y.jpg",
                "organizerId": "u1"
            }));
            then.status(201).json_body(json!({
                "id": "42",
                "name": "Beach cleanup",
                "description": "Bring gloves",
                "dateTime": "2030-01-01T09:30:00.000Z",
                "position": { "latitude": -3.73, "longitude": -38.52 },
                "volunteersNeeded": 5,
                "volunteersIds": [],
                "imageUrl": "https://x/y.jpg",
                "organizerId": "u1"
            }));
        })
        .await;
    let api = ApiClient::new(server.base_url()).unwrap();

    let created = api.create_event(&new_event).await.unwrap();

    mock.assert_async().await;
    assert_eq!(created.id.as_deref(), Some("42"));
    assert_eq!(created.organizer_id, "u1");
}

#[tokio::test]
async fn test_create_event_rejected() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/eventsData");
            then.status(403).body("forbidden");
        })
        .await;
    let api = ApiClient::new(server.base_url()).unwrap();
    let new_event = NewEvent {
        name: "x".to_string(),
        description: "y".to_string(),
        date_time: "2030-01-01T09:30:00.000Z".to_string(),
        position: Position::new(0.0, 0.0),
        volunteers_needed: 1,
        volunteers_ids: Vec::new(),
        image_url: None,
        organizer_id: "u1".to_string(),
    };

    let err = api.create_event(&new_event).await.unwrap_err();

    assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::AccessDenied(_))));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    // Port 9 (discard) is closed on test machines
    let api = ApiClient::new("http://127.0.0.1:9").unwrap();

    let err = api.list_events().await.unwrap_err();

    let api_err = err.downcast_ref::<ApiError>().expect("ApiError");
    assert!(matches!(api_err, ApiError::NetworkError(_)));
    assert!(api_err.is_connectivity());
}
