// src/db/person_repo.rs

use chrono::Utc;
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};

use crate::{
    common::{
        db_utils::{map_unique_violation, value_taken},
        error::AppError,
    },
    models::person::{NewPerson, PersonChanges, PersonKind, PersonRow},
};

pub(crate) const PERSON_COLUMNS: &str =
    "id, login, name, cpf, email, address, password_hash, document_path, created_at, updated_at";

// Um repositório por tabela ('employees' ou 'customers'); as queries são as mesmas.
#[derive(Clone)]
pub struct PersonRepository {
    pool: SqlitePool,
    kind: PersonKind,
}

impl PersonRepository {
    pub fn new(pool: SqlitePool, kind: PersonKind) -> Self {
        Self { pool, kind }
    }

    fn table(&self) -> &'static str {
        self.kind.table()
    }

    pub async fn list_all(&self) -> Result<Vec<PersonRow>, AppError> {
        let sql = format!("SELECT {PERSON_COLUMNS} FROM {} ORDER BY id", self.table());
        let rows = sqlx::query_as::<_, PersonRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i64) -> Result<Option<PersonRow>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("SELECT {PERSON_COLUMNS} FROM {} WHERE id = ?", self.table());
        let row = sqlx::query_as::<_, PersonRow>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    // Busca exata, usada pelo login
    pub async fn find_by_login(&self, login: &str) -> Result<Option<PersonRow>, AppError> {
        let sql = format!("SELECT {PERSON_COLUMNS} FROM {} WHERE login = ?", self.table());
        let row = sqlx::query_as::<_, PersonRow>(&sql)
            .bind(login)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn value_taken<'e, E>(
        &self,
        executor: E,
        column: &str,
        value: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        value_taken(executor, self.table(), column, value, exclude_id).await
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        person: &NewPerson,
        password_hash: &str,
        document_path: Option<&str>,
    ) -> Result<PersonRow, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO {} (login, name, cpf, email, address, password_hash, document_path, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {PERSON_COLUMNS}",
            self.table()
        );
        sqlx::query_as::<_, PersonRow>(&sql)
            .bind(&person.login)
            .bind(&person.name)
            .bind(&person.cpf)
            .bind(&person.email)
            .bind(&person.address)
            .bind(password_hash)
            .bind(document_path)
            .bind(now)
            .bind(now)
            .fetch_one(executor)
            .await
            .map_err(map_unique_violation)
    }

    /// Atualização parcial. O hash e o documento só mudam quando informados.
    /// Devolve `None` se a linha não existe.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: i64,
        changes: &PersonChanges,
        password_hash: Option<&str>,
        document_path: Option<&str>,
    ) -> Result<Option<PersonRow>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let mut qb = QueryBuilder::<Sqlite>::new(format!("UPDATE {} SET updated_at = ", self.table()));
        qb.push_bind(Utc::now());

        let scalars = [
            ("login", &changes.login),
            ("name", &changes.name),
            ("cpf", &changes.cpf),
            ("email", &changes.email),
            ("address", &changes.address),
        ];
        for (column, value) in scalars {
            if let Some(value) = value {
                qb.push(format!(", {column} = ")).push_bind(value.clone());
            }
        }
        if let Some(hash) = password_hash {
            qb.push(", password_hash = ").push_bind(hash.to_string());
        }
        if let Some(path) = document_path {
            qb.push(", document_path = ").push_bind(path.to_string());
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(format!(" RETURNING {PERSON_COLUMNS}"));

        qb.build_query_as::<PersonRow>()
            .fetch_optional(executor)
            .await
            .map_err(map_unique_violation)
    }

    /// Grava ou limpa a referência do documento.
    pub async fn set_document_path<'e, E>(
        &self,
        executor: E,
        id: i64,
        document_path: Option<&str>,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!(
            "UPDATE {} SET document_path = ?, updated_at = ? WHERE id = ?",
            self.table()
        );
        let result = sqlx::query(&sql)
            .bind(document_path)
            .bind(Utc::now())
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete<'e, E>(&self, executor: E, id: i64) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("DELETE FROM {} WHERE id = ?", self.table());
        let result = sqlx::query(&sql).bind(id).execute(executor).await?;
        Ok(result.rows_affected())
    }
}
