use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use maintflow_client::{
    Anonymous, ApiRequest, Backend, FetchError, HttpBackend, ListAdapter, StaticToken,
    TransportError, WorkflowExecutor,
};
use maintflow_core::{Action, EntityType, Piece, Resource, Role};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend(server: &MockServer, timeout: Duration) -> Arc<dyn Backend> {
    let backend = HttpBackend::new(
        format!("{}/api", server.uri()),
        timeout,
        Arc::new(StaticToken::new("token-123")),
    )
    .expect("http backend");
    Arc::new(backend)
}

#[tokio::test]
async fn attaches_bearer_token_and_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/piece"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "5"))
        .and(query_param("etat", "Disponible"))
        .and(header("authorization", "Bearer token-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"_id": "p-6", "nom": "Roulement 6", "quantite": 6, "etat": "Disponible"}],
            "totalPages": 3,
            "totalPieces": 12,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = ListAdapter::new(backend(&server, Duration::from_secs(5)));
    let filters = BTreeMap::from([("etat".to_string(), "Disponible".to_string())]);
    let page = adapter.fetch_page::<Piece>(Resource::Piece, 2, 5, &filters).await.expect("page");

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, "p-6");
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.total_count, 12);
}

#[tokio::test]
async fn anonymous_requests_carry_no_authorization_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/machine/m-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_id": "m-1"})))
        .mount(&server)
        .await;

    let backend = HttpBackend::new(server.uri(), Duration::from_secs(5), Arc::new(Anonymous))
        .expect("http backend");
    let response = backend.send(ApiRequest::get("/api/machine/m-1")).await.expect("response");
    assert_eq!(response.status, 200);

    let received = server.received_requests().await.expect("recording enabled");
    assert_eq!(received.len(), 1);
    assert!(!received[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn slow_backend_surfaces_as_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/piece"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"results": [], "totalPages": 0, "totalPieces": 0}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let timeout = Duration::from_millis(100);
    let raw = backend(&server, timeout).send(ApiRequest::get("piece")).await;
    assert_eq!(raw, Err(TransportError::Timeout(timeout)));

    let error = ListAdapter::new(backend(&server, timeout))
        .fetch_page::<Piece>(Resource::Piece, 1, 5, &BTreeMap::new())
        .await
        .expect_err("timeout");
    assert_eq!(error, FetchError::Timeout);
}

#[tokio::test]
async fn validation_is_a_put_on_the_action_route() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/commande/c-1/valider"))
        .and(header("authorization", "Bearer token-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Commande validée"})))
        .expect(1)
        .mount(&server)
        .await;

    let receipt = WorkflowExecutor::new(backend(&server, Duration::from_secs(5)))
        .execute(EntityType::Commande, "c-1", Action::Valider, Role::Magasinier, "En attente")
        .await
        .expect("transition");

    assert_eq!(receipt.http_status, 200);
    assert_eq!(receipt.to.label(), "Validée");
}

#[tokio::test]
async fn backend_rejection_message_reaches_the_caller() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/demande/d-1/valider"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"message": "Stock insuffisant"})),
        )
        .mount(&server)
        .await;

    let error = WorkflowExecutor::new(backend(&server, Duration::from_secs(5)))
        .execute(EntityType::Demande, "d-1", Action::Valider, Role::Responsable, "En attente")
        .await
        .expect_err("rejected");

    assert_eq!(error.user_message(), "Stock insuffisant");
}

#[tokio::test]
async fn unreachable_backend_is_a_network_failure() {
    let backend = HttpBackend::new(
        "http://127.0.0.1:9/api",
        Duration::from_secs(2),
        Arc::new(Anonymous),
    )
    .expect("http backend");

    let error = backend.send(ApiRequest::get("piece")).await.expect_err("unreachable");
    assert!(matches!(error, TransportError::Network(_) | TransportError::Timeout(_)));
}

#[tokio::test]
async fn transition_ids_cannot_escape_their_resource() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/intervention/..%2Fuser%2Fu-9"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "introuvable"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/user/u-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .expect(0)
        .mount(&server)
        .await;

    let executor = WorkflowExecutor::new(backend(&server, Duration::from_secs(5)));
    let error = executor
        .execute(
            EntityType::Intervention,
            "../user/u-9",
            Action::Completer,
            Role::Technicien,
            "En cours",
        )
        .await
        .expect_err("no such intervention");
    assert_eq!(error.class(), "not_found");

    let error = executor
        .execute(EntityType::Intervention, "..", Action::Completer, Role::Technicien, "En cours")
        .await
        .expect_err("dot segment id");
    assert_eq!(error.class(), "invalid_id");

    let received = server.received_requests().await.expect("recording enabled");
    assert_eq!(received.len(), 1);
}
