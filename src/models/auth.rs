// src/models/auth.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::common::validation::validate_digits;
use crate::models::person::{NewPerson, PersonDetail};

// Dados para registro de um novo funcionário (sem documento nem empresas)
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RegisterPayload {
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
}

impl From<RegisterPayload> for NewPerson {
    fn from(payload: RegisterPayload) -> Self {
        NewPerson {
            login: payload.login,
            name: payload.name,
            cpf: payload.cpf,
            email: payload.email,
            address: payload.address,
            password: payload.password,
            company_ids: None,
        }
    }
}

// Dados para login
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "O login é obrigatório."))]
    pub login: String,
    #[validate(length(min = 1, message = "A senha é obrigatória."))]
    pub password: String,
}

// Resposta de autenticação: o funcionário hidratado, sem senha
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub employee: PersonDetail,
}
