//! HTTP contract tests for the backend client against a mock server.

#![allow(clippy::unwrap_used)] // Tests can unwrap

use checkin_api::{
    ApiClient, ApiError, Backend, Credentials, Evento, Gateway, NewUser, Participante,
    ResourceKind,
};
use checkin_auth::mocks::InMemorySessionStore;
use checkin_auth::SessionStore;
use chrono::{TimeZone, Utc};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway(server: &MockServer) -> Gateway {
    Gateway::new(Arc::new(ApiClient::new(server.uri())))
}

fn evento() -> Evento {
    Evento {
        id: 3,
        nome: "Semana Acadêmica".to_string(),
        data_evento: Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap(),
        capacidade_total: 50,
        local: "Auditório".to_string(),
        tickets: None,
    }
}

#[tokio::test]
async fn test_create_succeeds_only_on_201() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/eventos"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let result = gateway(&server).create_one(&evento()).await;

    assert!(result.success);
    assert_eq!(result.message(), "Evento criado com sucesso!");
}

#[tokio::test]
async fn test_create_with_200_is_failure_with_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/eventos"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let result = gateway(&server).create_one(&evento()).await;

    assert!(!result.success);
    assert_eq!(result.message(), "Erro ao criar evento");
}

#[tokio::test]
async fn test_create_error_prefers_body_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/participantes"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "E-mail já cadastrado"})),
        )
        .mount(&server)
        .await;

    let participante = Participante {
        nome_completo: "Ana Lima".to_string(),
        email: "ana@example.com".to_string(),
        telefone: "(11) 98765-4321".to_string(),
        ..Participante::default()
    };
    let result = gateway(&server).create_one(&participante).await;

    assert!(!result.success);
    assert_eq!(result.message(), "E-mail já cadastrado");
}

#[tokio::test]
async fn test_error_without_body_uses_status_message() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/lanches/9"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = gateway(&server).delete_by_id(9, ResourceKind::Lanche).await;

    assert!(!result.success);
    assert_eq!(result.message(), "Request failed with status code 500");
}

#[tokio::test]
async fn test_delete_succeeds_only_on_204() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/eventos/3"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/eventos/4"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    let deleted = gateway.delete_by_id(3, ResourceKind::Evento).await;
    assert!(deleted.success);
    assert_eq!(deleted.message(), "Evento excluido com sucesso!");

    let unexpected = gateway.delete_by_id(4, ResourceKind::Evento).await;
    assert!(!unexpected.success);
    assert_eq!(unexpected.message(), "Erro ao excluir evento");
}

#[tokio::test]
async fn test_update_puts_to_member_path_and_succeeds_on_200() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/eventos/3"))
        .and(body_json(serde_json::to_value(evento()).unwrap()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let result = gateway(&server).update(&evento()).await;

    assert!(result.success);
    assert_eq!(result.message(), "Evento editado com sucesso!");
}

#[tokio::test]
async fn test_write_status_contract_holds_for_every_collection() {
    let server = MockServer::start().await;
    for kind in ResourceKind::ALL {
        Mock::given(method("POST"))
            .and(path(kind.collection_path()))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(kind.member_path(7)))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(kind.member_path(7)))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        // Wrong success codes for each write
        Mock::given(method("POST"))
            .and(path(kind.collection_path()))
            .and(body_json(json!({"id": 8})))
            .respond_with(ResponseTemplate::new(200))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(kind.member_path(8)))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(kind.member_path(8)))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
    }
    let client = ApiClient::new(server.uri());

    for kind in ResourceKind::ALL {
        let name = kind.capitalized();

        let created = client.create_one(kind, json!({"id": 7})).await;
        assert!(created.success, "{kind} create");
        assert_eq!(created.message(), format!("{name} criado com sucesso!"));

        let updated = client.update(kind, 7, json!({"id": 7})).await;
        assert!(updated.success, "{kind} update");
        assert_eq!(updated.message(), format!("{name} editado com sucesso!"));

        let deleted = client.delete_by_id(kind, 7).await;
        assert!(deleted.success, "{kind} delete");
        assert_eq!(deleted.message(), format!("{name} excluido com sucesso!"));

        let created = client.create_one(kind, json!({"id": 8})).await;
        assert!(!created.success, "{kind} create with 200");
        assert_eq!(created.message(), format!("Erro ao criar {}", kind.name()));

        let updated = client.update(kind, 8, json!({"id": 8})).await;
        assert!(!updated.success, "{kind} update with 204");
        assert_eq!(updated.message(), format!("Erro ao editar {}", kind.name()));

        let deleted = client.delete_by_id(kind, 8).await;
        assert!(!deleted.success, "{kind} delete with 200");
        assert_eq!(deleted.message(), format!("Erro ao excluir {}", kind.name()));
    }
}

#[tokio::test]
async fn test_find_all_success_on_any_2xx() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/eventos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 3,
            "nome": "Semana Acadêmica",
            "dataEvento": "2025-03-10",
            "capacidadeTotal": 50,
            "local": "Auditório",
            "tickets": []
        }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/lanches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    let eventos = gateway.find_all::<Evento>().await;
    assert!(eventos.success);
    assert_eq!(eventos.data.len(), 1);
    assert_eq!(eventos.data[0].capacidade_total, 50);

    let lanches = gateway.find_all::<checkin_api::Lanche>().await;
    assert!(lanches.success);
    assert!(lanches.data.is_empty());
}

#[tokio::test]
async fn test_find_all_transport_error_is_empty_failure() {
    // Nothing listens on the reserved port 9 locally
    let gateway = Gateway::new(Arc::new(ApiClient::new("http://127.0.0.1:9")));

    let result = gateway.find_all::<Participante>().await;

    assert!(!result.success);
    assert!(result.data.is_empty());
}

#[tokio::test]
async fn test_find_all_non_2xx_is_empty_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tickets"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = gateway(&server).find_all::<checkin_api::Ticket>().await;

    assert!(!result.success);
    assert!(result.data.is_empty());
}

#[tokio::test]
async fn test_workflow_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/eventos/generateTickets/3"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/eventos/finalizeTickets/3"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tickets/reedemLanche"))
        .and(query_param("ticket", "7"))
        .and(query_param("lanche", "2"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    assert!(gateway.generate_tickets(3).await.success);

    let sweep = gateway.sweep_tickets(3).await;
    assert!(!sweep.success);
    assert_eq!(sweep.message(), "Erro ao finalizar tickets");

    let redeem = gateway.redeem_lanche(7, 2).await;
    assert!(redeem.success);
    assert_eq!(redeem.message(), "Lanche resgatado com sucesso!");
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/eventos/hoje"))
        .and(header("authorization", "Bearer backend-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri()).with_access_token("backend-token");
    let result = client.find_today_events().await;

    assert!(result.success);
}

#[tokio::test]
async fn test_401_terminates_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/participantes"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = InMemorySessionStore::with_token("session");
    let client = ApiClient::new(server.uri())
        .with_access_token("expired")
        .with_session_store(Arc::new(store.clone()));

    let result = Gateway::new(Arc::new(client)).find_all::<Participante>().await;

    assert!(!result.success);
    assert_eq!(store.termination_count(), 1);
    assert_eq!(store.load().unwrap(), None);
}

#[tokio::test]
async fn test_login_returns_user_and_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/usuarios/login"))
        .and(body_json(json!({"usuario": "ana.lima", "senha": "Segredo1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "backend-token",
            "user": {"id": 5, "nome": "Ana Lima", "usuario": "ana.lima"}
        })))
        .mount(&server)
        .await;

    let user = ApiClient::new(server.uri())
        .login(&Credentials {
            usuario: "ana.lima".to_string(),
            senha: "Segredo1".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(user.token, "backend-token");
    assert_eq!(user.id, "5");
    assert_eq!(user.nome, "Ana Lima");
}

#[tokio::test]
async fn test_login_without_token_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/usuarios/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"user": {"id": 5, "nome": "Ana"}})),
        )
        .mount(&server)
        .await;

    let result = ApiClient::new(server.uri())
        .login(&Credentials {
            usuario: "ana.lima".to_string(),
            senha: "Segredo1".to_string(),
        })
        .await;

    assert_eq!(result, Err(ApiError::InvalidCredentials));
}

#[tokio::test]
async fn test_create_user_message_is_body_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/usuarios/create"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Usuário cadastrado"))
        .mount(&server)
        .await;

    let result = ApiClient::new(server.uri())
        .create_user(&NewUser {
            nome: "Ana Lima".to_string(),
            usuario: "ana.lima".to_string(),
            senha: "Segredo1".to_string(),
        })
        .await;

    assert!(result.success);
    assert_eq!(result.message(), "Usuário cadastrado");
}
