//! Plain-text tables for the terminal.

use crate::policy::{self, StatusFilter};
use checkin_api::{Evento, Lanche, Participante, Ticket};
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt::Write as _;

/// Left-aligned text table.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Table with these column headers.
    #[must_use]
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(ToString::to_string).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; missing cells render empty.
    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    /// Render with two spaces between columns and no trailing blanks.
    #[must_use]
    pub fn render(&self) -> String {
        let widths: Vec<usize> = (0..self.headers.len())
            .map(|col| {
                std::iter::once(&self.headers)
                    .chain(&self.rows)
                    .filter_map(|row| row.get(col))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        for row in std::iter::once(&self.headers).chain(&self.rows) {
            let mut line = String::new();
            for (col, width) in widths.iter().enumerate() {
                let cell = row.get(col).map_or("", String::as_str);
                let _ = write!(line, "{cell:<width$}  ");
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

fn date(value: DateTime<Utc>) -> String {
    value.format("%d/%m/%Y").to_string()
}

fn optional_date(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(|| "-".to_string(), date)
}

/// Events with ticket counts and the actions currently offered.
#[must_use]
pub fn eventos(eventos: &[Evento], today: NaiveDate) -> String {
    let mut table = Table::new(&["ID", "NOME", "DATA", "CAPACIDADE", "LOCAL", "TICKETS", "AÇÕES"]);
    for evento in eventos {
        let mut actions = Vec::new();
        if policy::can_generate_tickets(evento, today) {
            actions.push("gerar");
        }
        if policy::can_sweep_tickets(evento, today) {
            actions.push("finalizar");
        }
        table.row(vec![
            evento.id.to_string(),
            evento.nome.clone(),
            date(evento.data_evento),
            evento.capacidade_total.to_string(),
            evento.local.clone(),
            evento.tickets().len().to_string(),
            actions.join(","),
        ]);
    }
    table.render()
}

/// Tickets passing `filter`.
#[must_use]
pub fn tickets(tickets: &[Ticket], filter: StatusFilter) -> String {
    let mut table = Table::new(&["ID", "STATUS", "EMISSÃO", "USO", "PARTICIPANTE", "LANCHE"]);
    for ticket in filter.apply(tickets) {
        table.row(vec![
            ticket.id.to_string(),
            ticket.status.to_string(),
            optional_date(ticket.data_emissao),
            optional_date(ticket.data_uso),
            ticket
                .participante
                .as_ref()
                .map_or_else(|| "-".to_string(), |p| p.nome_completo.clone()),
            ticket
                .resgate_lanche
                .as_ref()
                .and_then(|r| r.lanche.as_ref())
                .map_or_else(|| "-".to_string(), |l| l.nome.clone()),
        ]);
    }
    table.render()
}

/// Participants.
#[must_use]
pub fn participantes<'a>(participantes: impl IntoIterator<Item = &'a Participante>) -> String {
    let mut table = Table::new(&["ID", "NOME", "E-MAIL", "TELEFONE"]);
    for p in participantes {
        table.row(vec![
            p.id.to_string(),
            p.nome_completo.clone(),
            p.email.clone(),
            p.telefone.clone(),
        ]);
    }
    table.render()
}

/// Snacks.
#[must_use]
pub fn lanches(lanches: &[Lanche]) -> String {
    let mut table = Table::new(&["ID", "NOME", "DESCRIÇÃO", "DISPONÍVEL"]);
    for l in lanches {
        table.row(vec![
            l.id.to_string(),
            l.nome.clone(),
            l.descricao.clone(),
            l.quantidade_disponivel.to_string(),
        ]);
    }
    table.render()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use checkin_api::StatusTicket;
    use chrono::TimeZone;

    #[test]
    fn test_table_alignment() {
        let mut table = Table::new(&["ID", "NOME"]);
        table.row(vec!["1".to_string(), "Ana".to_string()]);
        table.row(vec!["10".to_string(), "João".to_string()]);

        assert_eq!(table.render(), "ID  NOME\n1   Ana\n10  João\n");
    }

    #[test]
    fn test_eventos_lists_offered_actions() {
        let evento = Evento {
            id: 1,
            nome: "Feira".to_string(),
            data_evento: Utc.with_ymd_and_hms(2025, 3, 10, 19, 0, 0).unwrap(),
            capacidade_total: 2,
            local: "Praça".to_string(),
            tickets: None,
        };
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();

        let rendered = eventos(&[evento], today);

        assert!(rendered.contains("10/03/2025"));
        assert!(rendered.lines().nth(1).unwrap().ends_with("gerar"));
    }

    #[test]
    fn test_tickets_filter() {
        let make = |id, status| Ticket {
            id,
            status,
            data_emissao: None,
            data_uso: None,
            participante: None,
            evento: None,
            resgate_lanche: None,
        };
        let all = vec![make(1, StatusTicket::Disponivel), make(2, StatusTicket::Cancelado)];

        let rendered = tickets(&all, StatusFilter::Only(StatusTicket::Cancelado));

        assert_eq!(rendered.lines().count(), 2);
        assert!(rendered.contains("Cancelado"));
        assert!(!rendered.contains("Disponivel"));
    }
}
