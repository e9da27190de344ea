use std::sync::{Arc, Mutex};

use innova_fancoil::{DeviceIdentity, DiscoveryRecord, Error, PairingCoordinator};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn status_body(uid: &str) -> serde_json::Value {
    json!({
        "success": true,
        "UID": uid,
        "RESULT": { "sp": 220, "wm": 3, "fn": 1, "ta": 210, "tw": 280, "ps": 1, "cm": 0, "a": [] }
    })
}

fn server_ip(server: &MockServer) -> String {
    let addr = server.address();
    format!("{}:{}", addr.ip(), addr.port())
}

#[tokio::test]
async fn manual_entry_verifies_and_stages_by_appliance_uid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v/1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("IN-7F3A")))
        .expect(1)
        .mount(&server)
        .await;

    let found: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(vec![]));
    let found_clone = found.clone();
    let mut coordinator = PairingCoordinator::new(vec![])
        .on_found(move |c| found_clone.lock().unwrap().push(c.id.clone()));

    let ip = server_ip(&server);
    coordinator.stage_manual("Living room", &ip).await.unwrap();

    let staged = coordinator.candidates();
    assert_eq!(staged.len(), 1);
    assert_eq!(staged[0].id, "IN-7F3A");
    assert_eq!(staged[0].name, "Living room");
    assert_eq!(staged[0].ip, ip);
    assert_eq!(*found.lock().unwrap(), vec!["IN-7F3A"]);
}

#[tokio::test]
async fn manual_entry_matching_registered_ip_is_rejected() {
    let server = MockServer::start().await;
    let ip = server_ip(&server);
    let registered = vec![DeviceIdentity::new("existing", ip.clone())];
    let mut coordinator = PairingCoordinator::new(registered);

    let err = coordinator.stage_manual("Again", &ip).await.unwrap_err();
    assert!(matches!(err, Error::AlreadyAdded(_)), "got {err:?}");
    assert!(coordinator.candidates().is_empty());
    // Rejection happens before any verification call.
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn manual_entry_refused_by_appliance_stages_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v/1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
        .mount(&server)
        .await;

    let mut coordinator = PairingCoordinator::new(vec![]);
    let err = coordinator
        .stage_manual("Broken", &server_ip(&server))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Rejected { .. }), "got {err:?}");
    assert!(coordinator.candidates().is_empty());
}

#[tokio::test]
async fn manual_entry_transport_failure_propagates_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v/1/status"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut coordinator = PairingCoordinator::new(vec![]);
    let err = coordinator
        .stage_manual("Unreachable", &server_ip(&server))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Http(_)), "got {err:?}");
    assert!(coordinator.candidates().is_empty());
}

#[tokio::test]
async fn repeated_manual_entry_same_appliance_not_restaged() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v/1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("IN-7F3A")))
        .mount(&server)
        .await;

    let mut coordinator = PairingCoordinator::new(vec![]);
    let ip = server_ip(&server);
    coordinator.stage_manual("First", &ip).await.unwrap();
    coordinator.stage_manual("Second", &ip).await.unwrap();

    let staged = coordinator.candidates();
    assert_eq!(staged.len(), 1);
    assert_eq!(staged[0].name, "First");
}

#[tokio::test]
async fn discovery_and_manual_candidates_coexist() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v/1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("IN-MANUAL")))
        .mount(&server)
        .await;

    let mut coordinator = PairingCoordinator::new(vec![]);
    coordinator.stage_discovered(&[DiscoveryRecord {
        id: "IN-AUTO".to_string(),
        address: "192.0.2.40".to_string(),
        name: Some("Bedroom".to_string()),
    }]);
    coordinator
        .stage_manual("Office", &server_ip(&server))
        .await
        .unwrap();

    let ids: Vec<_> = coordinator.candidates().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["IN-AUTO", "IN-MANUAL"]);
}

#[tokio::test]
async fn mock_mode_verifies_without_network() {
    let mut coordinator = PairingCoordinator::new(vec![]).mock(true);
    coordinator.stage_manual("Dev unit", "192.0.2.99").await.unwrap();
    assert_eq!(coordinator.candidates().len(), 1);
}
