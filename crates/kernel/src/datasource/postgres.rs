//! PostgreSQL data source.
//!
//! Builds SQL with [`ListingQueryBuilder`] and runs the count and page
//! queries in one short transaction so both see the same snapshot.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::{DataSource, Page, PageRequest};
use crate::listing::{FilterValue, ListingQueryBuilder, PageWindow, Predicate};

/// Data source backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgDataSource {
    pool: PgPool,
}

impl PgDataSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DataSource for PgDataSource {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn fetch_page(&self, request: PageRequest<'_>) -> Result<Page> {
        let builder =
            ListingQueryBuilder::new(request.collection, request.predicates, request.sorts);

        // Use a transaction so SET LOCAL applies correctly and resets on commit/rollback.
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin transaction")?;

        sqlx::query("SET LOCAL statement_timeout = '10s'")
            .execute(&mut *tx)
            .await
            .context("failed to set statement timeout")?;

        let count_sql = builder.build_count();
        let total: i64 = sqlx::query_scalar(&count_sql)
            .fetch_one(&mut *tx)
            .await
            .context("failed to execute count query")?;

        let main_sql = builder.build(request.window);
        let rows: Vec<serde_json::Value> =
            sqlx::query_scalar(&format!("SELECT row_to_json(t) FROM ({main_sql}) t"))
                .fetch_all(&mut *tx)
                .await
                .context("failed to execute page query")?;

        tx.commit()
            .await
            .context("failed to commit query transaction")?;

        debug!(
            collection = request.collection,
            total,
            returned = rows.len(),
            "postgres page fetched"
        );

        Ok(Page {
            rows,
            total: u64::try_from(total).unwrap_or(0),
        })
    }

    async fn fetch_one(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<serde_json::Value>> {
        let predicates = [Predicate::Equals {
            field: field.to_string(),
            value: FilterValue::from(value),
        }];
        let builder = ListingQueryBuilder::new(collection, &predicates, &[]);
        let sql = builder.build(PageWindow::for_page(1, 1));

        let row: Option<serde_json::Value> =
            sqlx::query_scalar(&format!("SELECT row_to_json(t) FROM ({sql}) t"))
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("failed to fetch {collection} by {field}"))?;

        Ok(row)
    }

    async fn healthy(&self) -> bool {
        crate::db::check_health(&self.pool).await
    }
}
