// src/common/error.rs

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// Mapa campo -> motivos. É o formato de erro de validação devolvido ao chamador.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(reason.into());
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, reasons) in other.0 {
            self.0.entry(field).or_default().extend(reasons);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Ok(()) se não há erros acumulados.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }

    pub fn single(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, reason);
        errors
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details = FieldErrors::new();
        for (field, field_errors) in errors.field_errors() {
            for e in field_errors {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                details.add(field.to_string(), message);
            }
        }
        details
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    Validation(FieldErrors),

    #[error("{entity} {id} não encontrado")]
    NotFound { entity: &'static str, id: i64 },

    // A mensagem é genérica de propósito: não revela se o login existe.
    #[error("Login ou senha incorretos")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("Falha no armazenamento de documentos: {0}")]
    Storage(String),

    #[error("Erro de banco de dados")]
    Database(#[from] sqlx::Error),

    #[error("Erro de Bcrypt: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("Erro interno do servidor")]
    Internal(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.into())
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl AppError {
    /// Erros de validação podem ser corrigidos pelo chamador; o resto não.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            AppError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Traduz uma violação de UNIQUE do SQLite ("UNIQUE constraint failed: employees.login")
/// no nome da coluna, para virar o mesmo erro de campo da verificação prévia.
pub(crate) fn unique_violation_column(error: &sqlx::Error) -> Option<String> {
    let sqlx::Error::Database(db_err) = error else {
        return None;
    };
    if !db_err.is_unique_violation() {
        return None;
    }
    let columns = db_err
        .message()
        .split_once("constraint failed:")
        .map(|(_, rest)| rest.trim())?;
    // Índices compostos listam várias colunas; usamos a primeira.
    let first = columns.split(',').next()?.trim();
    first.rsplit('.').next().map(str::to_string)
}
