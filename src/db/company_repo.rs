// src/db/company_repo.rs

use chrono::Utc;
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};

use crate::{
    common::{
        db_utils::{map_unique_violation, value_taken},
        error::AppError,
    },
    models::company::{Company, CompanyChanges, NewCompany},
};

const COMPANY_COLUMNS: &str = "id, name, cnpj, address, created_at, updated_at";

// O repositório de empresas, responsável por todas as interações com a tabela 'companies'
#[derive(Clone)]
pub struct CompanyRepository {
    pool: SqlitePool,
}

impl CompanyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<Company>, AppError> {
        let sql = format!("SELECT {COMPANY_COLUMNS} FROM companies ORDER BY id");
        let companies = sqlx::query_as::<_, Company>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(companies)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM companies")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i64) -> Result<Option<Company>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE id = ?");
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(company)
    }

    pub async fn cnpj_taken<'e, E>(
        &self,
        executor: E,
        cnpj: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        value_taken(executor, "companies", "cnpj", cnpj, exclude_id).await
    }

    pub async fn insert<'e, E>(&self, executor: E, company: &NewCompany) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO companies (name, cnpj, address, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING {COMPANY_COLUMNS}"
        );
        sqlx::query_as::<_, Company>(&sql)
            .bind(&company.name)
            .bind(&company.cnpj)
            .bind(&company.address)
            .bind(now)
            .bind(now)
            .fetch_one(executor)
            .await
            .map_err(map_unique_violation)
    }

    /// Atualiza só os campos presentes. `None` se a empresa não existe.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: i64,
        changes: &CompanyChanges,
    ) -> Result<Option<Company>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE companies SET updated_at = ");
        qb.push_bind(Utc::now());
        if let Some(name) = &changes.name {
            qb.push(", name = ").push_bind(name.clone());
        }
        if let Some(cnpj) = &changes.cnpj {
            qb.push(", cnpj = ").push_bind(cnpj.clone());
        }
        if let Some(address) = &changes.address {
            qb.push(", address = ").push_bind(address.clone());
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(format!(" RETURNING {COMPANY_COLUMNS}"));

        qb.build_query_as::<Company>()
            .fetch_optional(executor)
            .await
            .map_err(map_unique_violation)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: i64) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM companies WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
