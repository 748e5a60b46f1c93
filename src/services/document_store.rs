// src/services/document_store.rs

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::{fs, io::AsyncWriteExt};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::document::{StoredDocument, Upload},
};

/// Armazenamento dos documentos enviados. Uma referência é um caminho relativo
/// opaco ("documents/employees/<nome>.pdf") dentro de um escopo por tipo de registro.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Grava `upload` dentro de `scope`. Rejeita tipo ou tamanho inválidos.
    async fn store(&self, scope: &str, upload: &Upload) -> Result<StoredDocument, AppError>;

    /// Remoção idempotente: referência inexistente não é erro.
    async fn delete(&self, reference: &str) -> Result<(), AppError>;

    /// Bytes do arquivo, ou `None` se a referência não existe mais.
    async fn load(&self, reference: &str) -> Result<Option<Vec<u8>>, AppError>;

    /// URL pública; função pura da referência.
    fn url_for(&self, reference: &str) -> String;

    /// Grava o novo antes de apagar o antigo. O cadastro de pessoas não passa por aqui:
    /// lá o arquivo antigo só sai depois do commit da transação. Se a gravação falha, o antigo fica intacto;
    /// se a remoção do antigo falha, só registramos no log.
    async fn replace(
        &self,
        old_reference: Option<&str>,
        scope: &str,
        upload: &Upload,
    ) -> Result<StoredDocument, AppError> {
        let stored = self.store(scope, upload).await?;
        if let Some(old) = old_reference {
            self.discard(old).await;
        }
        Ok(stored)
    }

    /// Remoção "best effort", usada em limpezas que não podem falhar a operação.
    async fn discard(&self, reference: &str) {
        if let Err(e) = self.delete(reference).await {
            tracing::warn!("⚠️ Não foi possível remover o documento {}: {}", reference, e);
        }
    }
}

/// Implementação em disco: `<root>/<scope>/<uuid>.<ext>`.
#[derive(Debug, Clone)]
pub struct LocalDocumentStore {
    root: PathBuf,
    public_url: String,
}

impl LocalDocumentStore {
    pub fn new(root: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.into(),
        }
    }

    /// Resolve uma referência dentro da raiz, recusando qualquer coisa que escape dela.
    fn resolve(&self, reference: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(reference);
        let is_safe = !reference.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        if !is_safe {
            return Err(AppError::Storage(format!("Referência inválida: '{reference}'")));
        }
        Ok(self.root.join(relative))
    }
}

fn storage_error(action: &str, reference: &str, e: &std::io::Error) -> AppError {
    AppError::Storage(format!("{action} '{reference}': {e}"))
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn store(&self, scope: &str, upload: &Upload) -> Result<StoredDocument, AppError> {
        upload.check()?;
        let extension = upload
            .extension()
            .ok_or_else(|| AppError::Storage("Tipo de documento não suportado".into()))?;

        let reference = format!("{}/{}.{}", scope.trim_matches('/'), Uuid::new_v4().simple(), extension);
        let path = self.resolve(&reference)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error("Falha ao criar a pasta de", &reference, &e))?;
        }

        let written = async {
            let mut file = fs::File::create(&path).await?;
            file.write_all(&upload.bytes).await?;
            // Só reportamos sucesso depois do arquivo estar no disco
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            let _ = fs::remove_file(&path).await;
            return Err(storage_error("Falha ao gravar", &reference, &e));
        }

        tracing::info!("📄 Documento gravado: {}", reference);
        Ok(StoredDocument {
            url: self.url_for(&reference),
            reference,
        })
    }

    async fn delete(&self, reference: &str) -> Result<(), AppError> {
        let path = self.resolve(reference)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!("🗑️ Documento removido: {}", reference);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error("Falha ao remover", reference, &e)),
        }
    }

    async fn load(&self, reference: &str) -> Result<Option<Vec<u8>>, AppError> {
        let path = self.resolve(reference)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error("Falha ao ler", reference, &e)),
        }
    }

    fn url_for(&self, reference: &str) -> String {
        format!("{}/storage/{}", self.public_url.trim_end_matches('/'), reference)
    }
}
