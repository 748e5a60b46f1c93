// src/services/auth.rs

use std::sync::Arc;

use tokio::sync::OnceCell;
use validator::Validate;

use crate::{
    common::error::AppError,
    models::{
        auth::{AuthResponse, LoginPayload, RegisterPayload},
        person::PersonKind,
    },
    services::{credentials::CredentialStore, person_service::PersonService},
};

/// Login e cadastro de funcionários. Clientes não fazem login.
#[derive(Clone)]
pub struct AuthService {
    employees: PersonService,
    credentials: Arc<dyn CredentialStore>,
    // Hash descartável com o custo configurado
    dummy_hash: Arc<OnceCell<String>>,
}

impl AuthService {
    pub fn new(employees: PersonService, credentials: Arc<dyn CredentialStore>) -> Result<Self, AppError> {
        if employees.kind() != PersonKind::Employee {
            return Err(anyhow::anyhow!("AuthService exige o cadastro de funcionários").into());
        }
        Ok(Self {
            employees,
            credentials,
            dummy_hash: Arc::new(OnceCell::new()),
        })
    }

    /// Mesmo caminho de criação do cadastro de funcionários (unicidade de login, CPF e e-mail).
    pub async fn register(&self, payload: RegisterPayload) -> Result<AuthResponse, AppError> {
        let employee = self.employees.create(payload.into(), None).await?;

        Ok(AuthResponse {
            message: "Cadastro realizado com sucesso".into(),
            employee,
        })
    }

    pub async fn login(&self, payload: &LoginPayload) -> Result<AuthResponse, AppError> {
        payload.validate()?;

        let Some(employee) = self.employees.find_by_login(&payload.login).await? else {
            // Mesmo trabalho de bcrypt do caminho normal: o tempo não entrega se o login existe
            let dummy = self
                .dummy_hash
                .get_or_try_init(|| self.credentials.hash("senha-inexistente"))
                .await?;
            self.credentials.verify(&payload.password, dummy).await?;
            return Err(AppError::Unauthorized);
        };

        let is_password_valid = self
            .credentials
            .verify(&payload.password, &employee.password_hash)
            .await?;

        if !is_password_valid {
            return Err(AppError::Unauthorized);
        }

        tracing::info!("🔑 Login de '{}'", employee.login);
        Ok(AuthResponse {
            message: "Login realizado com sucesso".into(),
            employee: self.employees.hydrate(employee).await?,
        })
    }
}
