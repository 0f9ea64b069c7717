use crate::DbError;
use chrono::NaiveDate;
use core_types::{
    DashboardSnapshot, DeliveryLocation, DeliveryStatus, InventoryToSales, LoadingTimeWeight,
    OrderAccuracy, SalesRecord, Table, TableName,
};
use futures::future::try_join_all;
use sqlx::sqlite::{SqliteConnection, SqlitePool};

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
///
/// It is cheap to clone; clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: SqlitePool,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Fetches every row of one table, in insertion order (date order for sales).
    pub async fn fetch_all(&self, table: TableName) -> Result<Table, DbError> {
        let rows = match table {
            TableName::SalesData => Table::SalesData(
                sqlx::query_as::<_, SalesRecord>(
                    "SELECT date, sales, deliveries, net_profit, expenses, delivery_time
                     FROM sales_data ORDER BY date ASC, id ASC",
                )
                .fetch_all(&self.pool)
                .await?,
            ),
            TableName::OrderAccuracy => Table::OrderAccuracy(
                sqlx::query_as::<_, OrderAccuracy>(
                    "SELECT month, accuracy FROM order_accuracy ORDER BY id ASC",
                )
                .fetch_all(&self.pool)
                .await?,
            ),
            TableName::InventoryToSales => Table::InventoryToSales(
                sqlx::query_as::<_, InventoryToSales>(
                    "SELECT month, inventory, sales FROM inventory_to_sales ORDER BY id ASC",
                )
                .fetch_all(&self.pool)
                .await?,
            ),
            TableName::DeliveryStatus => Table::DeliveryStatus(self.fetch_delivery_status().await?),
            TableName::LoadingTimeWeight => Table::LoadingTimeWeight(
                sqlx::query_as::<_, LoadingTimeWeight>(
                    "SELECT month, loading_time, weight FROM loading_time_weight ORDER BY id ASC",
                )
                .fetch_all(&self.pool)
                .await?,
            ),
            TableName::DeliveryLocations => Table::DeliveryLocations(
                sqlx::query_as::<_, DeliveryLocation>(
                    "SELECT location, latitude, longitude, deliveries
                     FROM delivery_locations ORDER BY id ASC",
                )
                .fetch_all(&self.pool)
                .await?,
            ),
        };

        tracing::debug!(table = %table, rows = rows.len(), "Fetched table");
        Ok(rows)
    }

    /// Fetches the delivery status rows in the order they were recorded.
    pub async fn fetch_delivery_status(&self) -> Result<Vec<DeliveryStatus>, DbError> {
        let rows = sqlx::query_as::<_, DeliveryStatus>(
            "SELECT status, orders FROM delivery_status ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Fetches the daily sales records within an inclusive date range, oldest first.
    pub async fn get_sales_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SalesRecord>, DbError> {
        let records = sqlx::query_as::<_, SalesRecord>(
            r#"
            SELECT date, sales, deliveries, net_profit, expenses, delivery_time
            FROM sales_data
            WHERE date >= ?1 AND date <= ?2
            ORDER BY date ASC, id ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Loads every table concurrently into one snapshot.
    pub async fn load_snapshot(&self) -> Result<DashboardSnapshot, DbError> {
        let tables = try_join_all(TableName::ALL.into_iter().map(|t| self.fetch_all(t))).await?;
        let snapshot = DashboardSnapshot::from_tables(tables);
        if snapshot.total_rows() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(snapshot)
    }

    /// Writes a whole snapshot in a single transaction.
    ///
    /// With `replace`, existing rows are deleted first so the database holds exactly
    /// this snapshot. Returns the number of rows inserted.
    pub async fn save_snapshot(
        &self,
        snapshot: &DashboardSnapshot,
        replace: bool,
    ) -> Result<usize, DbError> {
        self.save_snapshot_with_progress(snapshot, replace, |_, _| {})
            .await
    }

    /// Like `save_snapshot`, calling `on_table` after each table is written.
    ///
    /// The callback runs inside the transaction: a later failure still rolls
    /// back every table it has already been told about.
    pub async fn save_snapshot_with_progress<F>(
        &self,
        snapshot: &DashboardSnapshot,
        replace: bool,
        mut on_table: F,
    ) -> Result<usize, DbError>
    where
        F: FnMut(TableName, usize),
    {
        let mut tx = self.pool.begin().await?;
        if replace {
            for table in TableName::ALL {
                delete_rows(&mut tx, table).await?;
            }
        }

        let mut inserted = 0;
        for table in TableName::ALL {
            let rows = insert_rows(&mut tx, &snapshot.table(table)).await?;
            on_table(table, rows);
            inserted += rows;
        }
        tx.commit().await?;

        tracing::info!(rows = inserted, replace, "Saved snapshot");
        Ok(inserted)
    }

    /// Appends the rows of one table in its own transaction.
    pub async fn save_table(&self, table: &Table) -> Result<usize, DbError> {
        let mut tx = self.pool.begin().await?;
        let inserted = insert_rows(&mut tx, table).await?;
        tx.commit().await?;
        Ok(inserted)
    }

    /// Deletes every row from every table.
    pub async fn clear_all(&self) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;
        for table in TableName::ALL {
            delete_rows(&mut tx, table).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn count_rows(&self, table: TableName) -> Result<i64, DbError> {
        // Table names come from a closed enum, never from user input.
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table.as_str()))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

async fn delete_rows(conn: &mut SqliteConnection, table: TableName) -> Result<(), DbError> {
    sqlx::query(&format!("DELETE FROM {}", table.as_str()))
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn insert_rows(conn: &mut SqliteConnection, table: &Table) -> Result<usize, DbError> {
    match table {
        Table::SalesData(rows) => {
            for r in rows {
                sqlx::query(
                    "INSERT INTO sales_data (date, sales, deliveries, net_profit, expenses, delivery_time)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )
                .bind(r.date)
                .bind(r.sales)
                .bind(r.deliveries)
                .bind(r.net_profit)
                .bind(r.expenses)
                .bind(r.delivery_time)
                .execute(&mut *conn)
                .await?;
            }
        }
        Table::OrderAccuracy(rows) => {
            for r in rows {
                sqlx::query("INSERT INTO order_accuracy (month, accuracy) VALUES (?1, ?2)")
                    .bind(&r.month)
                    .bind(r.accuracy)
                    .execute(&mut *conn)
                    .await?;
            }
        }
        Table::InventoryToSales(rows) => {
            for r in rows {
                sqlx::query(
                    "INSERT INTO inventory_to_sales (month, inventory, sales) VALUES (?1, ?2, ?3)",
                )
                .bind(&r.month)
                .bind(r.inventory)
                .bind(r.sales)
                .execute(&mut *conn)
                .await?;
            }
        }
        Table::DeliveryStatus(rows) => {
            for r in rows {
                sqlx::query("INSERT INTO delivery_status (status, orders) VALUES (?1, ?2)")
                    .bind(&r.status)
                    .bind(r.orders)
                    .execute(&mut *conn)
                    .await?;
            }
        }
        Table::LoadingTimeWeight(rows) => {
            for r in rows {
                sqlx::query(
                    "INSERT INTO loading_time_weight (month, loading_time, weight) VALUES (?1, ?2, ?3)",
                )
                .bind(&r.month)
                .bind(r.loading_time)
                .bind(r.weight)
                .execute(&mut *conn)
                .await?;
            }
        }
        Table::DeliveryLocations(rows) => {
            for r in rows {
                sqlx::query(
                    "INSERT INTO delivery_locations (location, latitude, longitude, deliveries)
                     VALUES (?1, ?2, ?3, ?4)",
                )
                .bind(&r.location)
                .bind(r.latitude)
                .bind(r.longitude)
                .bind(r.deliveries)
                .execute(&mut *conn)
                .await?;
            }
        }
    }

    tracing::debug!(table = %table.name(), rows = table.len(), "Inserted rows");
    Ok(table.len())
}
