// src/db/link_repo.rs

use std::collections::BTreeSet;

use sqlx::{Executor, QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    common::error::AppError,
    db::person_repo::PERSON_COLUMNS,
    models::{
        company::Company,
        link::{Association, EntityKind},
        person::PersonRow,
    },
};

// Acesso cru às tabelas-ponte. A regra de "substituir o conjunto" fica no AssociationManager.
#[derive(Clone, Default)]
pub struct LinkRepository;

/// Colunas (dono, outro lado) de uma associação vista a partir de `owner`.
fn columns(assoc: Association, owner: EntityKind) -> Result<(&'static str, &'static str), AppError> {
    let other = assoc.other_side(owner).and_then(|other| assoc.column_for(other));
    match (assoc.column_for(owner), other) {
        (Some(owner_col), Some(other_col)) => Ok((owner_col, other_col)),
        _ => Err(anyhow::anyhow!("{owner:?} não participa de {}", assoc.table()).into()),
    }
}

impl LinkRepository {
    pub fn new() -> Self {
        Self
    }

    /// Ids do outro lado atualmente vinculados a `owner_id`.
    pub async fn ids_for<'e, E>(
        &self,
        executor: E,
        assoc: Association,
        owner: EntityKind,
        owner_id: i64,
    ) -> Result<BTreeSet<i64>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let (owner_col, other_col) = columns(assoc, owner)?;
        let sql = format!("SELECT {other_col} FROM {} WHERE {owner_col} = ?", assoc.table());
        let ids = sqlx::query_scalar::<_, i64>(&sql)
            .bind(owner_id)
            .fetch_all(executor)
            .await?;
        Ok(ids.into_iter().collect())
    }

    pub async fn insert_pairs(
        &self,
        conn: &mut SqliteConnection,
        assoc: Association,
        owner: EntityKind,
        owner_id: i64,
        other_ids: &[i64],
    ) -> Result<u64, AppError> {
        if other_ids.is_empty() {
            return Ok(0);
        }
        let (owner_col, other_col) = columns(assoc, owner)?;

        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "INSERT INTO {} ({owner_col}, {other_col}) ",
            assoc.table()
        ));
        qb.push_values(other_ids, |mut row, other_id| {
            row.push_bind(owner_id).push_bind(*other_id);
        });

        let result = qb.build().execute(&mut *conn).await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_pairs(
        &self,
        conn: &mut SqliteConnection,
        assoc: Association,
        owner: EntityKind,
        owner_id: i64,
        other_ids: &[i64],
    ) -> Result<u64, AppError> {
        if other_ids.is_empty() {
            return Ok(0);
        }
        let (owner_col, other_col) = columns(assoc, owner)?;

        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "DELETE FROM {} WHERE {owner_col} = ",
            assoc.table()
        ));
        qb.push_bind(owner_id);
        qb.push(format!(" AND {other_col} IN ("));
        let mut separated = qb.separated(", ");
        for other_id in other_ids {
            separated.push_bind(*other_id);
        }
        separated.push_unseparated(")");

        let result = qb.build().execute(&mut *conn).await?;
        Ok(result.rows_affected())
    }

    /// Remove todos os pares em que `id` aparece do lado de `kind`.
    pub async fn delete_all_for<'e, E>(
        &self,
        executor: E,
        assoc: Association,
        kind: EntityKind,
        id: i64,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let (column, _) = columns(assoc, kind)?;
        let sql = format!("DELETE FROM {} WHERE {column} = ?", assoc.table());
        let result = sqlx::query(&sql).bind(id).execute(executor).await?;
        Ok(result.rows_affected())
    }

    /// Todos os pares (company_id, pessoa_id) da associação.
    pub async fn all_pairs<'e, E>(&self, executor: E, assoc: Association) -> Result<Vec<(i64, i64)>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let person_col = assoc
            .column_for(assoc.person_kind())
            .ok_or_else(|| anyhow::anyhow!("associação sem coluna de pessoa"))?;
        let sql = format!(
            "SELECT company_id, {person_col} FROM {} ORDER BY company_id, {person_col}",
            assoc.table()
        );
        let pairs = sqlx::query_as::<_, (i64, i64)>(&sql).fetch_all(executor).await?;
        Ok(pairs)
    }

    /// Empresas vinculadas a uma pessoa (JOIN explícito, sem carregamento preguiçoso).
    pub async fn companies_for<'e, E>(
        &self,
        executor: E,
        assoc: Association,
        person_id: i64,
    ) -> Result<Vec<Company>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let (person_col, _) = columns(assoc, assoc.person_kind())?;
        let sql = format!(
            "SELECT c.id, c.name, c.cnpj, c.address, c.created_at, c.updated_at \
             FROM companies c \
             INNER JOIN {link} l ON l.company_id = c.id \
             WHERE l.{person_col} = ? \
             ORDER BY c.id",
            link = assoc.table()
        );
        let companies = sqlx::query_as::<_, Company>(&sql)
            .bind(person_id)
            .fetch_all(executor)
            .await?;
        Ok(companies)
    }

    /// Pessoas (funcionários ou clientes) vinculadas a uma empresa.
    pub async fn people_for<'e, E>(
        &self,
        executor: E,
        assoc: Association,
        company_id: i64,
    ) -> Result<Vec<PersonRow>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let (person_col, _) = columns(assoc, assoc.person_kind())?;
        let columns = PERSON_COLUMNS
            .split(", ")
            .map(|c| format!("p.{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {columns} \
             FROM {people} p \
             INNER JOIN {link} l ON l.{person_col} = p.id \
             WHERE l.company_id = ? \
             ORDER BY p.id",
            people = assoc.person_kind().table(),
            link = assoc.table()
        );
        let rows = sqlx::query_as::<_, PersonRow>(&sql)
            .bind(company_id)
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }
}
