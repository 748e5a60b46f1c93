// src/config.rs

use std::{env, path::PathBuf, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

use crate::{
    db::{self, LinkRepository},
    models::person::PersonKind,
    services::{
        association_service::AssociationManager,
        auth::AuthService,
        company_service::CompanyService,
        credentials::{BcryptCredentials, CredentialStore},
        document_store::{DocumentStore, LocalDocumentStore},
        person_service::PersonService,
    },
};

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub storage_root: PathBuf,
    pub public_url: String,
    pub bcrypt_cost: u32,
    pub seed_demo_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://registry.db".into(),
            max_connections: 5,
            storage_root: PathBuf::from("storage/public"),
            public_url: "http://localhost:8000".into(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            seed_demo_data: false,
        }
    }
}

fn parse_var<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} inválida: '{raw}'")),
        Err(_) => Ok(None),
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS")?.unwrap_or(defaults.max_connections),
            storage_root: env::var("STORAGE_ROOT").map(PathBuf::from).unwrap_or(defaults.storage_root),
            public_url: env::var("PUBLIC_URL").unwrap_or(defaults.public_url),
            bcrypt_cost: parse_var("BCRYPT_COST")?.unwrap_or(defaults.bcrypt_cost),
            seed_demo_data: parse_var("SEED_DEMO_DATA")?.unwrap_or(defaults.seed_demo_data),
        })
    }

    fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:")
    }

    /// Abre a pool. Banco em memória vive numa conexão só, que nunca é reciclada.
    pub async fn connect(&self) -> anyhow::Result<SqlitePool> {
        let options = SqliteConnectOptions::from_str(&self.database_url)
            .with_context(|| format!("DATABASE_URL inválida: '{}'", self.database_url))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if self.is_in_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(self.max_connections)
        };

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        Ok(pool)
    }
}

// O estado compartilhado: a pool e todos os serviços já montados
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub config: AppConfig,
    pub documents: Arc<dyn DocumentStore>,
    pub associations: AssociationManager,
    pub companies: CompanyService,
    pub employees: PersonService,
    pub customers: PersonService,
    pub auth_service: AuthService,
}

impl AppState {
    /// Conecta, roda as migrações e monta o gráfico de dependências.
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let db_pool = config.connect().await?;
        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        db::run_migrations(&db_pool)
            .await
            .context("Falha ao rodar as migrações do banco de dados")?;
        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

        let documents: Arc<dyn DocumentStore> = Arc::new(LocalDocumentStore::new(
            config.storage_root.clone(),
            config.public_url.clone(),
        ));
        let credentials: Arc<dyn CredentialStore> = Arc::new(BcryptCredentials::new(config.bcrypt_cost));

        Self::with_collaborators(db_pool, config, documents, credentials)
    }

    /// Monta o estado com armazenamento e credenciais injetados (os testes trocam ambos).
    pub fn with_collaborators(
        db_pool: SqlitePool,
        config: AppConfig,
        documents: Arc<dyn DocumentStore>,
        credentials: Arc<dyn CredentialStore>,
    ) -> anyhow::Result<Self> {
        let associations = AssociationManager::new(LinkRepository::new());

        let person_service = |kind| {
            PersonService::new(
                kind,
                db_pool.clone(),
                associations.clone(),
                documents.clone(),
                credentials.clone(),
            )
        };
        let employees = person_service(PersonKind::Employee);
        let customers = person_service(PersonKind::Customer);

        let companies = CompanyService::new(db_pool.clone(), associations.clone(), documents.clone());
        let auth_service = AuthService::new(employees.clone(), credentials.clone())?;

        Ok(Self {
            db_pool,
            config,
            documents,
            associations,
            companies,
            employees,
            customers,
            auth_service,
        })
    }
}
