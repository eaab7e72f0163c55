//! Form validation. Nothing reaches the backend until its form validates.

use checkin_api::types::wire_date;
use checkin_api::{Credentials, Evento, Id, Lanche, NewUser, Participante};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

#[allow(clippy::expect_used)] // Literal pattern
fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("literal pattern compiles")
}

static NOME_PARTICIPANTE: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"^([A-ZÁÉÍÓÚÃÕÂÊÎÔÛ][a-záéíóúãõâêîôûç]+)(\s[A-ZÁÉÍÓÚÃÕÂÊÎÔÛ][a-záéíóúãõâêîôûç]+)*$")
});
static NOME_COMPLETO: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^[A-ZÀ-Ÿ][a-zà-ÿ]+(\s[A-ZÀ-Ÿ][a-zà-ÿ]+)+$"));
static EMAIL: LazyLock<Regex> = LazyLock::new(|| pattern(r"^[^\s@]+@[^\s@]+\.[^\s@]+$"));
static TELEFONE: LazyLock<Regex> = LazyLock::new(|| pattern(r"^\(\d{2}\)\s?\d{4,5}-\d{4}$"));

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field name as shown in the form
    pub field: &'static str,
    /// What is wrong
    pub message: &'static str,
}

/// Every rejected field of a form, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(pub Vec<FieldError>);

impl FieldErrors {
    fn check(&mut self, ok: bool, field: &'static str, message: &'static str) -> bool {
        if !ok {
            self.0.push(FieldError { field, message });
        }
        ok
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.0.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }

    /// Messages of `field`.
    #[must_use]
    pub fn messages(&self, field: &str) -> Vec<&'static str> {
        self.0
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message)
            .collect()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

/// Format a phone number as the user types: `(DD) DDDD-DDDD` for up to ten
/// digits, `(DD) DDDDD-DDDD` beyond that. Non-digits are dropped and extra
/// digits truncated.
#[must_use]
pub fn mask_telefone(value: &str) -> String {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 3 {
        return digits;
    }

    let (split, limit) = if digits.len() <= 10 { (4, 14) } else { (5, 15) };
    let (ddd, rest) = digits.split_at(2);
    let mut masked = format!("({ddd}) ");
    if rest.len() > split {
        masked.push_str(&rest[..split]);
        masked.push('-');
        masked.push_str(&rest[split..]);
    } else {
        masked.push_str(rest);
    }
    masked.chars().take(limit).collect()
}

/// Raw participant form.
#[derive(Debug, Clone, Default)]
pub struct ParticipanteForm {
    /// Full name
    pub nome_completo: String,
    /// E-mail
    pub email: String,
    /// Phone, masked before validation
    pub telefone: String,
}

impl ParticipanteForm {
    /// Validate into a participant with `id`.
    ///
    /// # Errors
    ///
    /// Every field that fails its rule.
    pub fn validate(self, id: Id) -> Result<Participante, FieldErrors> {
        let mut errors = FieldErrors::default();
        let nome = self.nome_completo.trim().to_string();
        let email = self.email.trim().to_string();
        let telefone = mask_telefone(&self.telefone);

        if errors.check(!nome.is_empty(), "nome", "Nome obrigatório") {
            errors.check(
                NOME_PARTICIPANTE.is_match(&nome),
                "nome",
                "O nome deve começar com letra maiúscula e conter apenas letras válidas",
            );
        }
        if errors.check(!email.is_empty(), "email", "E-mail obrigatório") {
            errors.check(EMAIL.is_match(&email), "email", "E-mail inválido");
        }
        errors.check(TELEFONE.is_match(&telefone), "telefone", "Telefone inválido");

        errors.finish(|| Participante {
            id,
            nome_completo: nome,
            email,
            telefone,
            tickets: None,
        })
    }
}

/// Raw event form.
#[derive(Debug, Clone, Default)]
pub struct EventoForm {
    /// Name
    pub nome: String,
    /// Date, `YYYY-MM-DD` or RFC 3339
    pub data_evento: Option<String>,
    /// Capacity
    pub capacidade_total: Option<i64>,
    /// Venue
    pub local: String,
}

impl EventoForm {
    /// Validate into an event with `id`.
    ///
    /// # Errors
    ///
    /// Every field that fails its rule.
    pub fn validate(self, id: Id) -> Result<Evento, FieldErrors> {
        let mut errors = FieldErrors::default();
        let nome = self.nome.trim().to_string();
        let local = self.local.trim().to_string();
        let data_evento = self.data_evento.as_deref().and_then(wire_date::parse);
        let capacidade = self.capacidade_total.map(u32::try_from);

        errors.check(!nome.is_empty(), "nome", "Nome obrigatório");
        errors.check(data_evento.is_some(), "dataEvento", "Data obrigatória");
        match capacidade {
            None => {
                errors.check(false, "capacidadeTotal", "Capacidade deve ser número");
            },
            Some(capacity) => {
                errors.check(
                    capacity.is_ok_and(|c| c >= 1),
                    "capacidadeTotal",
                    "Capacidade obrigatória",
                );
            },
        }
        errors.check(!local.is_empty(), "local", "Local obrigatório");

        match (data_evento, capacidade) {
            (Some(data_evento), Some(Ok(capacidade_total))) => errors.finish(|| Evento {
                id,
                nome,
                data_evento,
                capacidade_total,
                local,
                tickets: None,
            }),
            _ => Err(errors),
        }
    }
}

/// Raw snack form.
#[derive(Debug, Clone, Default)]
pub struct LancheForm {
    /// Name
    pub nome: String,
    /// Description
    pub descricao: String,
    /// Stock
    pub quantidade_disponivel: i64,
}

impl LancheForm {
    /// Validate into a snack with `id`.
    ///
    /// # Errors
    ///
    /// Every field that fails its rule.
    pub fn validate(self, id: Id) -> Result<Lanche, FieldErrors> {
        let mut errors = FieldErrors::default();
        let nome = self.nome.trim().to_string();
        let descricao = self.descricao.trim().to_string();

        errors.check(!nome.is_empty(), "nome", "Nome obrigatório");
        errors.check(!descricao.is_empty(), "descricao", "Descrição obrigatória");
        errors.check(
            self.quantidade_disponivel >= 0,
            "quantidadeDisponivel",
            "Quantidade não pode ser negativa",
        );

        errors.finish(|| Lanche {
            id,
            nome,
            descricao,
            quantidade_disponivel: self.quantidade_disponivel,
            resgates: None,
        })
    }
}

/// Raw signup form.
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    /// Full name, at least two capitalised words
    pub nome: String,
    /// Login
    pub usuario: String,
    /// Password
    pub senha: String,
    /// Password again
    pub repetir_senha: String,
}

impl SignupForm {
    /// Validate into a signup payload.
    ///
    /// # Errors
    ///
    /// Every field that fails its rule.
    pub fn validate(self) -> Result<NewUser, FieldErrors> {
        let mut errors = FieldErrors::default();
        let nome = self.nome.trim().to_string();

        if errors.check(!nome.is_empty(), "nome", "Nome obrigatório!") {
            errors.check(
                NOME_COMPLETO.is_match(&nome),
                "nome",
                "Informe o nome completo com iniciais maiúsculas (ex: João Silva)",
            );
        }
        errors.check(
            self.usuario.chars().count() >= 5,
            "usuario",
            "Usuário deve ter ao menos 5 letras!",
        );
        errors.check(
            self.senha.chars().count() >= 6,
            "senha",
            "A senha deve ter pelo menos 6 caracteres!",
        );
        errors.check(
            self.senha.chars().any(|c| c.is_ascii_uppercase()),
            "senha",
            "A senha deve conter pelo menos uma letra maiúscula!",
        );
        errors.check(
            self.senha.chars().any(|c| c.is_ascii_digit()),
            "senha",
            "A senha deve conter pelo menos um número!",
        );
        if errors.check(
            !self.repetir_senha.is_empty(),
            "repetirSenha",
            "Repita a senha corretamente!",
        ) {
            errors.check(
                self.senha == self.repetir_senha,
                "repetirSenha",
                "As senhas não coincidem!",
            );
        }

        errors.finish(|| NewUser {
            nome,
            usuario: self.usuario,
            senha: self.senha,
        })
    }
}

/// Validate login input.
///
/// # Errors
///
/// Empty user or password.
pub fn validate_login(usuario: &str, senha: &str) -> Result<Credentials, FieldErrors> {
    let mut errors = FieldErrors::default();
    errors.check(!usuario.is_empty(), "usuario", "Usuario obrigatório!");
    errors.check(!senha.is_empty(), "senha", "Senha obrigatória!");
    errors.finish(|| Credentials {
        usuario: usuario.to_string(),
        senha: senha.to_string(),
    })
}
