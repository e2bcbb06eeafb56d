//! Repository for the `taxa` table.
//!
//! Taxa form a tree via `parent_id`. Every write that touches the tree
//! shape goes through this repository so the cached `parents` array (and
//! the display name) stay consistent with the actual links. Tree checks
//! run against a preloaded parent map using the pure helpers in
//! `ambi_core::taxonomy`.

use std::collections::HashMap;
use std::str::FromStr;

use ambi_core::error::CoreError;
use ambi_core::taxonomy::{self, TaxonRank};
use ambi_core::types::DbId;
use sqlx::PgPool;
use thiserror::Error;

use crate::models::taxon::{CreateTaxon, Taxon};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, display_name, rank, parent_id, parents, active, created_at, updated_at";

/// Errors from tree-shape operations.
#[derive(Debug, Error)]
pub enum TaxonTreeError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Provides read/write operations for taxa.
pub struct TaxonRepo;

impl TaxonRepo {
    /// Insert a new taxon with its display name and ancestor cache computed.
    pub async fn create(pool: &PgPool, input: &CreateTaxon) -> Result<Taxon, TaxonTreeError> {
        let rank = TaxonRank::from_str(&input.rank)?;
        let display_name = taxonomy::display_name(&input.name, rank);

        let parents = match input.parent_id {
            Some(parent_id) => {
                let links = Self::parent_links(pool).await?;
                let mut chain =
                    taxonomy::ancestor_chain(parent_id, |id| links.get(&id).copied())?;
                // Stored cache is root-first; the chain comes nearest-first.
                chain.reverse();
                chain.push(parent_id);
                chain
            }
            None => Vec::new(),
        };

        let query = format!(
            "INSERT INTO taxa (name, display_name, rank, parent_id, parents)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let taxon = sqlx::query_as::<_, Taxon>(&query)
            .bind(&input.name)
            .bind(&display_name)
            .bind(rank.as_str())
            .bind(input.parent_id)
            .bind(&parents)
            .fetch_one(pool)
            .await?;
        Ok(taxon)
    }

    /// Find a taxon by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Taxon>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM taxa WHERE id = $1");
        sqlx::query_as::<_, Taxon>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a taxon by its unique name.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Taxon>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM taxa WHERE name = $1");
        sqlx::query_as::<_, Taxon>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List direct children of a taxon, ordered by name.
    pub async fn list_children(pool: &PgPool, id: DbId) -> Result<Vec<Taxon>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM taxa WHERE parent_id = $1 ORDER BY name");
        sqlx::query_as::<_, Taxon>(&query)
            .bind(id)
            .fetch_all(pool)
            .await
    }

    /// Re-parent a taxon, rejecting links that would close a cycle.
    ///
    /// The moved taxon's ancestor cache is rebuilt, and so are the caches of
    /// its entire subtree (their chains all pass through the moved node).
    pub async fn set_parent(
        pool: &PgPool,
        id: DbId,
        parent_id: Option<DbId>,
    ) -> Result<Taxon, TaxonTreeError> {
        if let Some(parent_id) = parent_id {
            let links = Self::parent_links(pool).await?;
            if taxonomy::would_create_cycle(id, parent_id, |t| links.get(&t).copied())? {
                return Err(CoreError::Conflict(format!(
                    "linking taxon {id} under {parent_id} would create a cycle"
                ))
                .into());
            }
        }

        let query = format!("UPDATE taxa SET parent_id = $2 WHERE id = $1 RETURNING {COLUMNS}");
        let taxon = sqlx::query_as::<_, Taxon>(&query)
            .bind(id)
            .bind(parent_id)
            .fetch_optional(pool)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "taxon",
                id,
            })?;

        Self::rebuild_parents(pool, id).await?;
        Ok(taxon)
    }

    /// Rebuild the cached `parents` array for a taxon and all its descendants.
    ///
    /// Re-derives each chain from the live `parent_id` links, root-first.
    pub async fn rebuild_parents(pool: &PgPool, id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "WITH RECURSIVE subtree AS (
                SELECT id FROM taxa WHERE id = $1
                UNION ALL
                SELECT t.id FROM taxa t JOIN subtree s ON t.parent_id = s.id
             ),
             chains AS (
                SELECT id, ARRAY[]::BIGINT[] AS chain
                FROM taxa WHERE parent_id IS NULL
                UNION ALL
                SELECT t.id, c.chain || t.parent_id
                FROM taxa t JOIN chains c ON t.parent_id = c.id
             )
             UPDATE taxa SET parents = chains.chain
             FROM chains
             WHERE taxa.id = chains.id
               AND taxa.id IN (SELECT id FROM subtree)
               AND taxa.parents IS DISTINCT FROM chains.chain",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Mark a taxon active or inactive.
    pub async fn set_active(pool: &PgPool, id: DbId, active: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE taxa SET active = $2 WHERE id = $1")
            .bind(id)
            .bind(active)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Preload the full (taxon, parent) link map for tree checks.
    async fn parent_links(pool: &PgPool) -> Result<HashMap<DbId, DbId>, sqlx::Error> {
        let rows: Vec<(DbId, DbId)> =
            sqlx::query_as("SELECT id, parent_id FROM taxa WHERE parent_id IS NOT NULL")
                .fetch_all(pool)
                .await?;
        Ok(rows.into_iter().collect())
    }
}
