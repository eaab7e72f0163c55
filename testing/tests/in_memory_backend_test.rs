//! The fake backend must honour the same contract as the HTTP one.

#![allow(clippy::unwrap_used)] // Tests can unwrap

use checkin_api::{Evento, Gateway, Lanche, Participante, ResourceKind, StatusTicket, Ticket};
use checkin_testing::{FixedClock, InMemoryBackend};
use chrono::NaiveDate;
use std::sync::Arc;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

fn setup() -> (InMemoryBackend, Gateway) {
    let backend = InMemoryBackend::with_clock(FixedClock::at_noon(today()));
    let gateway = Gateway::new(Arc::new(backend.clone()));
    (backend, gateway)
}

fn evento(capacity: u32) -> Evento {
    Evento {
        id: 0,
        nome: "Semana Acadêmica".to_string(),
        data_evento: today().and_hms_opt(19, 0, 0).unwrap().and_utc(),
        capacidade_total: capacity,
        local: "Auditório".to_string(),
        tickets: None,
    }
}

fn participante(nome: &str) -> Participante {
    Participante {
        nome_completo: nome.to_string(),
        email: "ana@example.com".to_string(),
        telefone: "(11) 98765-4321".to_string(),
        ..Participante::default()
    }
}

#[tokio::test]
async fn test_crud_round() {
    let (_, gateway) = setup();

    let created = gateway.create_one(&evento(5)).await;
    assert!(created.success);
    assert_eq!(created.message(), "Evento criado com sucesso!");

    let mut eventos = gateway.find_all::<Evento>().await.data;
    assert_eq!(eventos.len(), 1);
    assert_eq!(eventos[0].tickets.as_deref(), Some(&[][..]));

    eventos[0].local = "Ginásio".to_string();
    assert!(gateway.update(&eventos[0]).await.success);
    assert_eq!(gateway.find_all::<Evento>().await.data[0].local, "Ginásio");

    let deleted = gateway.delete_by_id(eventos[0].id, ResourceKind::Evento).await;
    assert!(deleted.success);
    assert!(gateway.find_all::<Evento>().await.data.is_empty());
}

#[tokio::test]
async fn test_missing_entity_rejections_carry_backend_message() {
    let (_, gateway) = setup();

    let result = gateway.delete_by_id(99, ResourceKind::Lanche).await;

    assert!(!result.success);
    assert_eq!(result.message(), "Lanche não encontrado");
}

#[tokio::test]
async fn test_generate_materializes_capacity() {
    let (backend, gateway) = setup();
    let id = backend.seed_evento(evento(50));

    assert!(gateway.generate_tickets(id).await.success);

    let tickets = backend.tickets_of(id);
    assert_eq!(tickets.len(), 50);
    assert!(tickets.iter().all(|t| t.status == StatusTicket::Disponivel));
    assert!(tickets.iter().all(|t| t.participante.is_none()));

    let again = gateway.generate_tickets(id).await;
    assert!(!again.success);
    assert_eq!(again.message(), "Evento já possui tickets");
    assert_eq!(backend.tickets_of(id).len(), 50);
}

#[tokio::test]
async fn test_sweep_uses_participant_linked_and_cancels_the_rest() {
    let (backend, gateway) = setup();
    let evento_id = backend.seed_evento(evento(0));
    let ana = backend.seed_participante(participante("Ana Lima"));
    let ana = gateway
        .find_all::<Participante>()
        .await
        .data
        .into_iter()
        .find(|p| p.id == ana)
        .unwrap();

    let held = backend.seed_ticket(
        evento_id,
        Ticket {
            id: 0,
            status: StatusTicket::Reservado,
            data_emissao: None,
            data_uso: None,
            participante: Some(ana),
            evento: None,
            resgate_lanche: None,
        },
    );
    let free = backend.seed_ticket(
        evento_id,
        Ticket {
            id: 0,
            status: StatusTicket::Disponivel,
            data_emissao: None,
            data_uso: None,
            participante: None,
            evento: None,
            resgate_lanche: None,
        },
    );

    assert!(gateway.sweep_tickets(evento_id).await.success);

    let held = backend.ticket(held).unwrap();
    assert_eq!(held.status, StatusTicket::Usado);
    assert!(held.data_uso.is_some());
    assert_eq!(backend.ticket(free).unwrap().status, StatusTicket::Cancelado);
}

#[tokio::test]
async fn test_redeem_once_per_used_ticket() {
    let (backend, gateway) = setup();
    let evento_id = backend.seed_evento(evento(0));
    let lanche = backend.seed_lanche(Lanche {
        nome: "Pão de queijo".to_string(),
        descricao: "Porção".to_string(),
        quantidade_disponivel: 10,
        ..Lanche::default()
    });
    let ticket = backend.seed_ticket(
        evento_id,
        Ticket {
            id: 0,
            status: StatusTicket::Usado,
            data_emissao: None,
            data_uso: None,
            participante: None,
            evento: None,
            resgate_lanche: None,
        },
    );

    assert!(gateway.redeem_lanche(ticket, lanche).await.success);
    assert_eq!(backend.lanche(lanche).unwrap().quantidade_disponivel, 9);
    assert!(backend.ticket(ticket).unwrap().resgate_lanche.is_some());

    let twice = gateway.redeem_lanche(ticket, lanche).await;
    assert!(!twice.success);
    assert_eq!(twice.message(), "Lanche já resgatado para este ticket");
}

#[tokio::test]
async fn test_today_events_filter_by_date() {
    let (backend, gateway) = setup();
    backend.seed_evento(evento(1));
    backend.seed_evento(Evento {
        data_evento: NaiveDate::from_ymd_opt(2025, 4, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
            .and_utc(),
        ..evento(1)
    });

    let today = gateway.find_today_events().await;

    assert!(today.success);
    assert_eq!(today.data.len(), 1);
}

#[tokio::test]
async fn test_injected_failure() {
    let (backend, gateway) = setup();
    backend.fail_with(500, "");

    let created = gateway.create_one(&participante("Ana Lima")).await;
    assert!(!created.success);
    assert_eq!(created.message(), "Request failed with status code 500");

    let listed = gateway.find_all::<Participante>().await;
    assert!(!listed.success);
    assert!(listed.data.is_empty());

    backend.recover();
    assert!(gateway.find_all::<Participante>().await.success);
    assert_eq!(
        backend.calls(),
        vec!["POST /participantes", "GET /participantes", "GET /participantes"]
    );
}
