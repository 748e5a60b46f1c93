// src/services/person_service.rs

use std::{collections::HashMap, sync::Arc};

use sqlx::{SqliteConnection, SqlitePool};
use validator::Validate;

use crate::{
    common::{
        db_utils::TAKEN_MESSAGE,
        error::{AppError, FieldErrors},
        validation::dedup_ids,
    },
    db::{CompanyRepository, PersonRepository},
    models::{
        company::Company,
        document::{StoredDocument, Upload},
        person::{unique_fields, NewPerson, PersonChanges, PersonDetail, PersonKind, PersonRecord, PersonRow},
    },
    services::{
        association_service::AssociationManager,
        credentials::CredentialStore,
        document_store::DocumentStore,
    },
};

/// Cadastro de funcionários ou clientes (um serviço por tipo).
///
/// Toda escrita de linha + vínculos roda numa transação. Documentos seguem a ordem
/// "grava o novo, confirma a transação, apaga o antigo": se a transação falha o arquivo
/// recém-gravado é descartado e o antigo continua valendo.
#[derive(Clone)]
pub struct PersonService {
    kind: PersonKind,
    repo: PersonRepository,
    companies: CompanyRepository,
    associations: AssociationManager,
    documents: Arc<dyn DocumentStore>,
    credentials: Arc<dyn CredentialStore>,
    pool: SqlitePool,
}

impl PersonService {
    pub fn new(
        kind: PersonKind,
        pool: SqlitePool,
        associations: AssociationManager,
        documents: Arc<dyn DocumentStore>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            kind,
            repo: PersonRepository::new(pool.clone(), kind),
            companies: CompanyRepository::new(pool.clone()),
            associations,
            documents,
            credentials,
            pool,
        }
    }

    pub fn kind(&self) -> PersonKind {
        self.kind
    }

    fn not_found(&self, id: i64) -> AppError {
        AppError::NotFound {
            entity: self.kind.entity().label(),
            id,
        }
    }

    fn to_record(&self, row: PersonRow) -> PersonRecord {
        row.into_record(|path| self.documents.url_for(path))
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    /// Todos os registros com suas empresas (três queries, independente do tamanho).
    pub async fn list(&self) -> Result<Vec<PersonDetail>, AppError> {
        let rows = self.repo.list_all().await?;
        let companies: HashMap<i64, Company> = self
            .companies
            .list_all()
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let links = self
            .associations
            .link_map(&self.pool, self.kind.association(), self.kind.entity())
            .await?;

        let details = rows
            .into_iter()
            .map(|row| {
                let linked = links
                    .get(&row.id)
                    .map(|ids| ids.iter().filter_map(|id| companies.get(id).cloned()).collect())
                    .unwrap_or_default();
                PersonDetail {
                    person: self.to_record(row),
                    companies: linked,
                }
            })
            .collect();
        Ok(details)
    }

    pub async fn get(&self, id: i64) -> Result<PersonDetail, AppError> {
        let row = self
            .repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| self.not_found(id))?;
        self.hydrate(row).await
    }

    pub(crate) async fn hydrate(&self, row: PersonRow) -> Result<PersonDetail, AppError> {
        let companies = self
            .associations
            .companies_for(&self.pool, self.kind.association(), row.id)
            .await?;
        Ok(PersonDetail {
            person: self.to_record(row),
            companies,
        })
    }

    pub(crate) async fn find_by_login(&self, login: &str) -> Result<Option<PersonRow>, AppError> {
        self.repo.find_by_login(login).await
    }

    // =========================================================================
    //  VALIDAÇÃO
    // =========================================================================

    /// Unicidade por tabela. Campos que já falharam no formato não são consultados.
    async fn uniqueness_errors<'a>(
        &self,
        conn: &mut SqliteConnection,
        fields: impl Iterator<Item = (&'static str, &'a str)>,
        exclude_id: Option<i64>,
        already: &FieldErrors,
    ) -> Result<FieldErrors, AppError> {
        let mut errors = FieldErrors::new();
        for (column, value) in fields.filter(|(column, _)| !already.contains(column)) {
            if self.repo.value_taken(&mut *conn, column, value, exclude_id).await? {
                errors.add(column, TAKEN_MESSAGE);
            }
        }
        Ok(errors)
    }

    fn shape_errors(validation: Result<(), validator::ValidationErrors>, document: Option<&Upload>) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if let Err(e) = validation {
            errors.merge(e.into());
        }
        if let Some(Err(e)) = document.map(Upload::check) {
            errors.merge(e);
        }
        errors
    }

    async fn store_document(&self, document: Option<&Upload>) -> Result<Option<StoredDocument>, AppError> {
        match document {
            Some(upload) => Ok(Some(self.documents.store(self.kind.document_scope(), upload).await?)),
            None => Ok(None),
        }
    }

    // =========================================================================
    //  ESCRITA
    // =========================================================================

    pub async fn create(&self, payload: NewPerson, document: Option<Upload>) -> Result<PersonDetail, AppError> {
        let mut errors = Self::shape_errors(payload.validate(), document.as_ref());
        let company_ids = payload.company_ids.as_deref().map(dedup_ids);

        {
            let mut conn = self.pool.acquire().await?;
            let fields = unique_fields(
                Some(payload.login.as_str()),
                Some(payload.cpf.as_str()),
                Some(payload.email.as_str()),
            );
            let taken = self.uniqueness_errors(&mut conn, fields, None, &errors).await?;
            errors.merge(taken);

            if let Some(ids) = &company_ids {
                let unknown = self
                    .associations
                    .unknown_id_errors(&mut conn, self.kind.association(), self.kind.entity(), ids)
                    .await?;
                errors.merge(unknown);
            }
        }
        errors.into_result()?;

        // Hashing fica fora da transação: não toca no banco
        let password_hash = self.credentials.hash(&payload.password).await?;
        let stored = self.store_document(document.as_ref()).await?;

        let outcome = self
            .insert_with_links(&payload, &password_hash, stored.as_ref(), company_ids.as_deref())
            .await;

        let row = match outcome {
            Ok(row) => row,
            Err(e) => {
                tracing::error!("❌ Falha ao criar {}: {}", self.kind.entity().label(), e);
                if let Some(doc) = &stored {
                    self.documents.discard(&doc.reference).await;
                }
                return Err(e);
            }
        };

        tracing::info!("✅ {} {} criado (login '{}')", self.kind.entity().label(), row.id, row.login);
        self.hydrate(row).await
    }

    async fn insert_with_links(
        &self,
        payload: &NewPerson,
        password_hash: &str,
        document: Option<&StoredDocument>,
        company_ids: Option<&[i64]>,
    ) -> Result<PersonRow, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = self
            .repo
            .insert(&mut *tx, payload, password_hash, document.map(|d| d.reference.as_str()))
            .await?;

        if let Some(ids) = company_ids {
            self.associations
                .set_links(&mut tx, self.kind.association(), self.kind.entity(), row.id, ids)
                .await?;
        }

        tx.commit().await?;
        Ok(row)
    }

    pub async fn update(
        &self,
        id: i64,
        changes: PersonChanges,
        document: Option<Upload>,
    ) -> Result<PersonDetail, AppError> {
        let changes = changes.normalized();
        let company_ids = changes.company_ids.as_deref().map(dedup_ids);

        let existing = {
            let mut conn = self.pool.acquire().await?;
            let existing = self
                .repo
                .find_by_id(&mut *conn, id)
                .await?
                .ok_or_else(|| self.not_found(id))?;

            let mut errors = Self::shape_errors(changes.validate(), document.as_ref());
            let fields = unique_fields(changes.login.as_deref(), changes.cpf.as_deref(), changes.email.as_deref());
            let taken = self.uniqueness_errors(&mut conn, fields, Some(id), &errors).await?;
            errors.merge(taken);

            if let Some(ids) = &company_ids {
                let unknown = self
                    .associations
                    .unknown_id_errors(&mut conn, self.kind.association(), self.kind.entity(), ids)
                    .await?;
                errors.merge(unknown);
            }
            errors.into_result()?;
            existing
        };

        let password_hash = match &changes.password {
            Some(password) => Some(self.credentials.hash(password).await?),
            None => None,
        };
        let stored = self.store_document(document.as_ref()).await?;

        let outcome = self
            .update_with_links(id, &changes, password_hash.as_deref(), stored.as_ref(), company_ids.as_deref())
            .await;

        let row = match outcome {
            Ok(row) => row,
            Err(e) => {
                tracing::error!("❌ Falha ao atualizar {} {}: {}", self.kind.entity().label(), id, e);
                if let Some(doc) = &stored {
                    self.documents.discard(&doc.reference).await;
                }
                return Err(e);
            }
        };

        // Só agora, com a nova referência confirmada, o arquivo antigo pode sair
        if let (Some(_), Some(old)) = (&stored, &existing.document_path) {
            self.documents.discard(old).await;
        }

        tracing::info!("✏️ {} {} atualizado", self.kind.entity().label(), id);
        self.hydrate(row).await
    }

    async fn update_with_links(
        &self,
        id: i64,
        changes: &PersonChanges,
        password_hash: Option<&str>,
        document: Option<&StoredDocument>,
        company_ids: Option<&[i64]>,
    ) -> Result<PersonRow, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = self
            .repo
            .update(&mut *tx, id, changes, password_hash, document.map(|d| d.reference.as_str()))
            .await?
            .ok_or_else(|| self.not_found(id))?;

        if let Some(ids) = company_ids {
            self.associations
                .set_links(&mut tx, self.kind.association(), self.kind.entity(), id, ids)
                .await?;
        }

        tx.commit().await?;
        Ok(row)
    }

    /// Remove o documento do registro, mantendo o resto.
    /// Se o arquivo não puder ser apagado, a referência continua no registro.
    pub async fn clear_document(&self, id: i64) -> Result<PersonDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| self.not_found(id))?;

        let Some(old) = row.document_path.clone() else {
            tx.commit().await?;
            return self.hydrate(row).await;
        };

        self.repo.set_document_path(&mut *tx, id, None).await?;
        self.documents.delete(&old).await?;
        tx.commit().await?;

        tracing::info!("🗑️ Documento de {} {} removido", self.kind.entity().label(), id);
        self.get(id).await
    }

    /// Exclui o registro, seus vínculos e seu documento.
    /// `requester_id` é quem está pedindo; funcionários não podem se autoexcluir.
    pub async fn delete(&self, id: i64, requester_id: Option<i64>) -> Result<(), AppError> {
        if self.kind.guards_self_deletion() && requester_id == Some(id) {
            return Err(AppError::Forbidden(
                "Você não pode excluir a si mesmo. Contate um administrador.".into(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let row = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| self.not_found(id))?;

        let links = self
            .associations
            .remove_all_links_for(&mut tx, self.kind.entity(), id)
            .await?;
        self.repo.delete(&mut *tx, id).await?;

        // Falha no armazenamento desfaz a transação: registro, vínculos e arquivo ficam
        if let Some(path) = &row.document_path {
            self.documents.delete(path).await?;
        }

        tx.commit().await?;

        tracing::info!(
            "🗑️ {} {} excluído ({} vínculos removidos)",
            self.kind.entity().label(),
            id,
            links
        );
        Ok(())
    }
}
