// src/services/association_service.rs

use std::collections::{BTreeSet, HashMap};

use sqlx::{Executor, Sqlite, SqliteConnection};

use crate::{
    common::{
        db_utils::existing_ids,
        error::{AppError, FieldErrors},
    },
    db::LinkRepository,
    models::{
        company::Company,
        link::{Association, EntityKind, LinkDiff},
        person::PersonRow,
    },
};

/// Diferença entre o conjunto atual e o desejado. Pares em comum não são tocados.
pub fn diff_links(current: &BTreeSet<i64>, desired: &BTreeSet<i64>) -> LinkDiff {
    LinkDiff {
        added: desired.difference(current).copied().collect(),
        removed: current.difference(desired).copied().collect(),
    }
}

/// Dono dos vínculos N:N empresa↔funcionário e empresa↔cliente.
#[derive(Clone, Default)]
pub struct AssociationManager {
    links: LinkRepository,
}

impl AssociationManager {
    pub fn new(links: LinkRepository) -> Self {
        Self { links }
    }

    /// Erros de campo para ids que não existem do outro lado. Vazio se todos existem.
    pub async fn unknown_id_errors(
        &self,
        conn: &mut SqliteConnection,
        assoc: Association,
        owner: EntityKind,
        ids: &[i64],
    ) -> Result<FieldErrors, AppError> {
        let other = assoc
            .other_side(owner)
            .ok_or_else(|| anyhow::anyhow!("{owner:?} não participa de {}", assoc.table()))?;

        let found = existing_ids(conn, other.table(), ids).await?;
        let mut errors = FieldErrors::new();
        for id in ids.iter().filter(|id| !found.contains(*id)) {
            errors.add(other.ids_field(), format!("{} {id} não existe.", other.label()));
        }
        Ok(errors)
    }

    /// Substitui o conjunto de vínculos de `owner_id` por exatamente `ids`.
    /// Ids desconhecidos falham antes de qualquer escrita.
    pub async fn set_links(
        &self,
        conn: &mut SqliteConnection,
        assoc: Association,
        owner: EntityKind,
        owner_id: i64,
        ids: &[i64],
    ) -> Result<LinkDiff, AppError> {
        let desired: BTreeSet<i64> = ids.iter().copied().collect();
        let desired_vec: Vec<i64> = desired.iter().copied().collect();

        self.unknown_id_errors(&mut *conn, assoc, owner, &desired_vec)
            .await?
            .into_result()?;

        let current = self.links.ids_for(&mut *conn, assoc, owner, owner_id).await?;
        let diff = diff_links(&current, &desired);

        self.links
            .delete_pairs(&mut *conn, assoc, owner, owner_id, &diff.removed)
            .await?;
        self.links
            .insert_pairs(&mut *conn, assoc, owner, owner_id, &diff.added)
            .await?;

        if !diff.is_empty() {
            tracing::info!(
                "🔗 {} {}: +{:?} -{:?} em {}",
                owner.label(),
                owner_id,
                diff.added,
                diff.removed,
                assoc.table()
            );
        }
        Ok(diff)
    }

    pub async fn links_for<'e, E>(
        &self,
        executor: E,
        assoc: Association,
        owner: EntityKind,
        owner_id: i64,
    ) -> Result<BTreeSet<i64>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        self.links.ids_for(executor, assoc, owner, owner_id).await
    }

    /// Tira `id` de todas as tabelas-ponte de que `kind` participa.
    pub async fn remove_all_links_for(
        &self,
        conn: &mut SqliteConnection,
        kind: EntityKind,
        id: i64,
    ) -> Result<u64, AppError> {
        let mut removed = 0;
        for assoc in kind.associations() {
            removed += self.links.delete_all_for(&mut *conn, *assoc, kind, id).await?;
        }
        Ok(removed)
    }

    pub async fn companies_for<'e, E>(
        &self,
        executor: E,
        assoc: Association,
        person_id: i64,
    ) -> Result<Vec<Company>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        self.links.companies_for(executor, assoc, person_id).await
    }

    pub async fn people_for<'e, E>(
        &self,
        executor: E,
        assoc: Association,
        company_id: i64,
    ) -> Result<Vec<PersonRow>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        self.links.people_for(executor, assoc, company_id).await
    }

    /// Mapa dono -> ids do outro lado, para hidratar listas com uma query só.
    pub async fn link_map<'e, E>(
        &self,
        executor: E,
        assoc: Association,
        owner: EntityKind,
    ) -> Result<HashMap<i64, Vec<i64>>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let pairs = self.links.all_pairs(executor, assoc).await?;
        let mut map: HashMap<i64, Vec<i64>> = HashMap::new();
        for (company_id, person_id) in pairs {
            let (key, value) = if owner == EntityKind::Company {
                (company_id, person_id)
            } else {
                (person_id, company_id)
            };
            map.entry(key).or_default().push(value);
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[i64]) -> BTreeSet<i64> {
        ids.iter().copied().collect()
    }

    #[test]
    fn diff_only_touches_changed_pairs() {
        let diff = diff_links(&set(&[1, 2, 3]), &set(&[2, 3, 4]));
        assert_eq!(diff.added, vec![4]);
        assert_eq!(diff.removed, vec![1]);
    }

    #[test]
    fn same_set_is_a_noop() {
        assert!(diff_links(&set(&[1, 2]), &set(&[2, 1])).is_empty());
    }

    #[test]
    fn empty_desired_set_removes_everything() {
        let diff = diff_links(&set(&[5, 6]), &set(&[]));
        assert!(diff.added.is_empty());
        assert_eq!(diff.removed, vec![5, 6]);
    }
}
