//! Utilitários compartilhados pelos testes de integração.
//!
//! Cada teste ganha um banco SQLite em memória com as migrações aplicadas e uma
//! pasta temporária para os documentos.

#![allow(dead_code)]

use std::{
    path::Path,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use registry::{
    config::{AppConfig, AppState},
    db,
    models::{
        company::NewCompany,
        document::{StoredDocument, Upload},
        person::NewPerson,
    },
    services::{
        credentials::{BcryptCredentials, CredentialStore},
        document_store::{DocumentStore, LocalDocumentStore},
    },
    AppError,
};
use tempfile::TempDir;

pub struct TestApp {
    pub state: AppState,
    pub storage: TempDir,
}

impl TestApp {
    pub fn file_exists(&self, reference: &str) -> bool {
        self.storage.path().join(reference).is_file()
    }

    /// Quantos arquivos existem no escopo (ex.: "documents/employees").
    pub fn files_in(&self, scope: &str) -> usize {
        std::fs::read_dir(self.storage.path().join(scope))
            .map(|entries| entries.filter_map(Result::ok).count())
            .unwrap_or(0)
    }

    pub async fn link_rows(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.state.db_pool)
            .await
            .unwrap()
    }
}

fn test_config(storage: &Path) -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        storage_root: storage.to_path_buf(),
        bcrypt_cost: 4,
        ..AppConfig::default()
    }
}

/// Estado completo com armazenamento em disco (pasta temporária) e bcrypt barato.
pub async fn spawn_app() -> TestApp {
    let storage = tempfile::tempdir().unwrap();
    let state = AppState::new(test_config(storage.path())).await.unwrap();
    TestApp { state, storage }
}

/// Mesmo que `spawn_app`, mas com um armazenamento de documentos que pode ser
/// instruído a falhar.
pub async fn spawn_app_with_flaky_documents() -> (TestApp, Arc<FlakyDocumentStore>) {
    let storage = tempfile::tempdir().unwrap();
    let config = test_config(storage.path());

    let pool = config.connect().await.unwrap();
    db::run_migrations(&pool).await.unwrap();

    let documents = Arc::new(FlakyDocumentStore::new(storage.path()));
    let state = AppState::with_collaborators(
        pool,
        config,
        documents.clone(),
        Arc::new(BcryptCredentials::new(4)),
    )
    .unwrap();
    (TestApp { state, storage }, documents)
}

/// Estado com um `CredentialStore` injetado (e armazenamento em disco normal).
pub async fn spawn_app_with_credentials(credentials: Arc<dyn CredentialStore>) -> TestApp {
    let storage = tempfile::tempdir().unwrap();
    let config = test_config(storage.path());

    let pool = config.connect().await.unwrap();
    db::run_migrations(&pool).await.unwrap();

    let documents = Arc::new(LocalDocumentStore::new(storage.path(), "http://localhost:8000"));
    let state = AppState::with_collaborators(pool, config, documents, credentials).unwrap();
    TestApp { state, storage }
}

/// Armazenamento em disco que pode ser instruído a falhar na gravação ou na remoção.
pub struct FlakyDocumentStore {
    inner: LocalDocumentStore,
    pub fail_store: AtomicBool,
    pub fail_delete: AtomicBool,
}

impl FlakyDocumentStore {
    pub fn new(root: &Path) -> Self {
        Self {
            inner: LocalDocumentStore::new(root, "http://localhost:8000"),
            fail_store: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl DocumentStore for FlakyDocumentStore {
    async fn store(&self, scope: &str, upload: &Upload) -> Result<StoredDocument, AppError> {
        if self.fail_store.load(Ordering::SeqCst) {
            return Err(AppError::Storage("disco cheio".into()));
        }
        self.inner.store(scope, upload).await
    }

    async fn delete(&self, reference: &str) -> Result<(), AppError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(AppError::Storage("permissão negada".into()));
        }
        self.inner.delete(reference).await
    }

    async fn load(&self, reference: &str) -> Result<Option<Vec<u8>>, AppError> {
        self.inner.load(reference).await
    }

    fn url_for(&self, reference: &str) -> String {
        self.inner.url_for(reference)
    }
}

pub fn pdf(content: &[u8]) -> Upload {
    Upload::new(content.to_vec(), "application/pdf")
}

pub fn new_company(name: &str, cnpj: &str) -> NewCompany {
    NewCompany {
        name: name.into(),
        cnpj: cnpj.into(),
        address: "X".into(),
        ..Default::default()
    }
}

pub fn new_person(login: &str, cpf: &str, email: &str) -> NewPerson {
    NewPerson {
        login: login.into(),
        name: format!("Pessoa {login}"),
        cpf: cpf.into(),
        email: email.into(),
        address: "Rua A, 123".into(),
        password: "secret".into(),
        company_ids: None,
    }
}
