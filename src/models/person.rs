// src/models/person.rs
//
// Funcionários e clientes têm exatamente o mesmo formato; o que muda é a
// tabela, a pasta dos documentos e as regras de login/autoexclusão.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::common::validation::validate_digits;
use crate::models::company::Company;
use crate::models::link::{Association, EntityKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonKind {
    Employee,
    Customer,
}

impl PersonKind {
    pub fn entity(self) -> EntityKind {
        match self {
            PersonKind::Employee => EntityKind::Employee,
            PersonKind::Customer => EntityKind::Customer,
        }
    }

    pub fn table(self) -> &'static str {
        self.entity().table()
    }

    /// Pasta (escopo) dos documentos no DocumentStore.
    pub fn document_scope(self) -> &'static str {
        match self {
            PersonKind::Employee => "documents/employees",
            PersonKind::Customer => "documents/customers",
        }
    }

    pub fn association(self) -> Association {
        match self {
            PersonKind::Employee => Association::CompanyEmployee,
            PersonKind::Customer => Association::CompanyCustomer,
        }
    }

    /// Só funcionários fazem login, então só eles podem tentar se autoexcluir.
    pub fn guards_self_deletion(self) -> bool {
        matches!(self, PersonKind::Employee)
    }
}

/// Linha crua da tabela. Nunca sai da crate serializada: o hash fica aqui.
#[derive(Debug, Clone, FromRow)]
pub struct PersonRow {
    pub id: i64,
    pub login: String,
    pub name: String,
    pub cpf: String,
    pub email: String,
    pub address: String,
    pub password_hash: String,
    pub document_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PersonRow {
    /// Descarta o hash e resolve a URL do documento.
    pub fn into_record(self, url_for: impl Fn(&str) -> String) -> PersonRecord {
        let document_url = self.document_path.as_deref().map(&url_for);
        PersonRecord {
            id: self.id,
            login: self.login,
            name: self.name,
            cpf: self.cpf,
            email: self.email,
            address: self.address,
            document_path: self.document_path,
            document_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Representação pública de um funcionário/cliente (sem senha).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonRecord {
    pub id: i64,
    pub login: String,
    pub name: String,
    pub cpf: String,
    pub email: String,
    pub address: String,
    pub document_path: Option<String>,
    pub document_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Funcionário/cliente com as empresas a que está vinculado.
#[derive(Debug, Clone, Serialize)]
pub struct PersonDetail {
    #[serde(flatten)]
    pub person: PersonRecord,
    pub companies: Vec<Company>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewPerson {
    #[validate(length(min = 1, max = 255, message = "O login é obrigatório (máx. 255 caracteres)."))]
    pub login: String,

    #[validate(length(min = 1, max = 255, message = "O nome é obrigatório (máx. 255 caracteres)."))]
    pub name: String,

    #[validate(
        length(equal = 11, message = "O CPF deve ter 11 dígitos."),
        custom(function = "validate_digits")
    )]
    pub cpf: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    #[validate(length(min = 1, max = 255, message = "O endereço é obrigatório (máx. 255 caracteres)."))]
    pub address: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,

    pub company_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PersonChanges {
    #[validate(length(min = 1, max = 255, message = "O login é obrigatório (máx. 255 caracteres)."))]
    pub login: Option<String>,

    #[validate(length(min = 1, max = 255, message = "O nome é obrigatório (máx. 255 caracteres)."))]
    pub name: Option<String>,

    #[validate(
        length(equal = 11, message = "O CPF deve ter 11 dígitos."),
        custom(function = "validate_digits")
    )]
    pub cpf: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    #[validate(length(min = 1, max = 255, message = "O endereço é obrigatório (máx. 255 caracteres)."))]
    pub address: Option<String>,

    // Vazio ou ausente: o hash atual é mantido.
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: Option<String>,

    pub company_ids: Option<Vec<i64>>,
}

impl PersonChanges {
    /// Senha vazia é tratada como "não informada".
    pub fn normalized(mut self) -> Self {
        if self.password.as_deref().is_some_and(str::is_empty) {
            self.password = None;
        }
        self
    }
}

/// Campos únicos por tabela, na ordem em que são checados.
pub(crate) fn unique_fields<'a>(
    login: Option<&'a str>,
    cpf: Option<&'a str>,
    email: Option<&'a str>,
) -> impl Iterator<Item = (&'static str, &'a str)> {
    [("login", login), ("cpf", cpf), ("email", email)]
        .into_iter()
        .filter_map(|(column, value)| value.map(|v| (column, v)))
}
