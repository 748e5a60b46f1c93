// src/services/company_service.rs

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
        company::{Company, CompanyChanges, CompanyDetail, NewCompany},
        link::{Association, EntityKind},
        person::{PersonKind, PersonRecord, PersonRow},
    },
    services::{association_service::AssociationManager, document_store::DocumentStore},
};

#[derive(Clone)]
pub struct CompanyService {
    repo: CompanyRepository,
    employees: PersonRepository,
    customers: PersonRepository,
    associations: AssociationManager,
    // Só para resolver a URL do documento das pessoas embutidas
    documents: Arc<dyn DocumentStore>,
    pool: SqlitePool,
}

/// Ids de vínculo pedidos no payload, já sem duplicatas.
struct RequestedLinks {
    employees: Option<Vec<i64>>,
    customers: Option<Vec<i64>>,
}

impl RequestedLinks {
    fn new(employee_ids: Option<&[i64]>, customer_ids: Option<&[i64]>) -> Self {
        Self {
            employees: employee_ids.map(dedup_ids),
            customers: customer_ids.map(dedup_ids),
        }
    }

    fn iter(&self) -> impl Iterator<Item = (Association, &[i64])> {
        [
            (Association::CompanyEmployee, self.employees.as_deref()),
            (Association::CompanyCustomer, self.customers.as_deref()),
        ]
        .into_iter()
        .filter_map(|(assoc, ids)| ids.map(|ids| (assoc, ids)))
    }
}

impl CompanyService {
    pub fn new(pool: SqlitePool, associations: AssociationManager, documents: Arc<dyn DocumentStore>) -> Self {
        Self {
            repo: CompanyRepository::new(pool.clone()),
            employees: PersonRepository::new(pool.clone(), PersonKind::Employee),
            customers: PersonRepository::new(pool.clone(), PersonKind::Customer),
            associations,
            documents,
            pool,
        }
    }

    fn not_found(id: i64) -> AppError {
        AppError::NotFound {
            entity: EntityKind::Company.label(),
            id,
        }
    }

    fn to_records(&self, rows: Vec<PersonRow>) -> Vec<PersonRecord> {
        rows.into_iter()
            .map(|row| row.into_record(|path| self.documents.url_for(path)))
            .collect()
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        self.repo.count().await
    }

    /// Todas as empresas com funcionários e clientes.
    pub async fn list(&self) -> Result<Vec<CompanyDetail>, AppError> {
        let companies = self.repo.list_all().await?;

        let employees: HashMap<i64, PersonRecord> = self
            .to_records(self.employees.list_all().await?)
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        let customers: HashMap<i64, PersonRecord> = self
            .to_records(self.customers.list_all().await?)
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let employee_links = self
            .associations
            .link_map(&self.pool, Association::CompanyEmployee, EntityKind::Company)
            .await?;
        let customer_links = self
            .associations
            .link_map(&self.pool, Association::CompanyCustomer, EntityKind::Company)
            .await?;

        let pick = |links: &HashMap<i64, Vec<i64>>, people: &HashMap<i64, PersonRecord>, id: i64| -> Vec<PersonRecord> {
            links
                .get(&id)
                .map(|ids| ids.iter().filter_map(|pid| people.get(pid).cloned()).collect())
                .unwrap_or_default()
        };

        let details = companies
            .into_iter()
            .map(|company| CompanyDetail {
                employees: pick(&employee_links, &employees, company.id),
                customers: pick(&customer_links, &customers, company.id),
                company,
            })
            .collect();
        Ok(details)
    }

    pub async fn get(&self, id: i64) -> Result<CompanyDetail, AppError> {
        let company = self
            .repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| Self::not_found(id))?;
        self.hydrate(company).await
    }

    async fn hydrate(&self, company: Company) -> Result<CompanyDetail, AppError> {
        let employees = self
            .associations
            .people_for(&self.pool, Association::CompanyEmployee, company.id)
            .await?;
        let customers = self
            .associations
            .people_for(&self.pool, Association::CompanyCustomer, company.id)
            .await?;

        Ok(CompanyDetail {
            employees: self.to_records(employees),
            customers: self.to_records(customers),
            company,
        })
    }

    async fn reference_errors(
        &self,
        conn: &mut SqliteConnection,
        cnpj: Option<&str>,
        exclude_id: Option<i64>,
        links: &RequestedLinks,
        already: &FieldErrors,
    ) -> Result<FieldErrors, AppError> {
        let mut errors = FieldErrors::new();

        if let Some(cnpj) = cnpj.filter(|_| !already.contains("cnpj")) {
            if self.repo.cnpj_taken(&mut *conn, cnpj, exclude_id).await? {
                errors.add("cnpj", TAKEN_MESSAGE);
            }
        }

        for (assoc, ids) in links.iter() {
            let unknown = self
                .associations
                .unknown_id_errors(&mut *conn, assoc, EntityKind::Company, ids)
                .await?;
            errors.merge(unknown);
        }
        Ok(errors)
    }

    async fn apply_links(
        &self,
        conn: &mut SqliteConnection,
        company_id: i64,
        links: &RequestedLinks,
    ) -> Result<(), AppError> {
        for (assoc, ids) in links.iter() {
            self.associations
                .set_links(&mut *conn, assoc, EntityKind::Company, company_id, ids)
                .await?;
        }
        Ok(())
    }

    pub async fn create(&self, payload: NewCompany) -> Result<CompanyDetail, AppError> {
        let links = RequestedLinks::new(payload.employee_ids.as_deref(), payload.customer_ids.as_deref());

        let mut errors = FieldErrors::new();
        if let Err(e) = payload.validate() {
            errors.merge(e.into());
        }
        {
            let mut conn = self.pool.acquire().await?;
            let found = self
                .reference_errors(&mut conn, Some(payload.cnpj.as_str()), None, &links, &errors)
                .await?;
            errors.merge(found);
        }
        errors.into_result()?;

        let mut tx = self.pool.begin().await?;
        let company = self.repo.insert(&mut *tx, &payload).await?;
        self.apply_links(&mut tx, company.id, &links).await?;
        tx.commit().await?;

        tracing::info!("✅ Empresa {} criada ({})", company.id, company.name);
        self.hydrate(company).await
    }

    pub async fn update(&self, id: i64, changes: CompanyChanges) -> Result<CompanyDetail, AppError> {
        let links = RequestedLinks::new(changes.employee_ids.as_deref(), changes.customer_ids.as_deref());

        {
            let mut conn = self.pool.acquire().await?;
            self.repo
                .find_by_id(&mut *conn, id)
                .await?
                .ok_or_else(|| Self::not_found(id))?;

            let mut errors = FieldErrors::new();
            if let Err(e) = changes.validate() {
                errors.merge(e.into());
            }
            let found = self
                .reference_errors(&mut conn, changes.cnpj.as_deref(), Some(id), &links, &errors)
                .await?;
            errors.merge(found);
            errors.into_result()?;
        }

        let mut tx = self.pool.begin().await?;
        let company = self
            .repo
            .update(&mut *tx, id, &changes)
            .await?
            .ok_or_else(|| Self::not_found(id))?;
        self.apply_links(&mut tx, id, &links).await?;
        tx.commit().await?;

        tracing::info!("✏️ Empresa {} atualizada", id);
        self.hydrate(company).await
    }

    /// Exclui a empresa e todos os vínculos dela (funcionários e clientes ficam).
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        self.repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| Self::not_found(id))?;

        let links = self
            .associations
            .remove_all_links_for(&mut tx, EntityKind::Company, id)
            .await?;
        self.repo.delete(&mut *tx, id).await?;

        tx.commit().await?;

        tracing::info!("🗑️ Empresa {} excluída ({} vínculos removidos)", id, links);
        Ok(())
    }
}
