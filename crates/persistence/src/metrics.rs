//! Database metrics collection.

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Records the duration of one repository query.
pub fn record_query_duration(collection: &'static str, operation: &'static str, secs: f64) {
    histogram!(
        "database_query_duration_seconds",
        "collection" => collection,
        "operation" => operation
    )
    .record(secs);
}

pub fn record_query_error(collection: &'static str, operation: &'static str) {
    counter!(
        "database_query_errors_total",
        "collection" => collection,
        "operation" => operation
    )
    .increment(1);
}

/// Records connection pool gauges.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("database_connections_active").set(active as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Times a repository operation.
///
/// ```ignore
/// let timer = QueryTimer::new("pages", "find_by_slug");
/// let result = sqlx::query_as::<_, PageEntity>(...).fetch_optional(&pool).await;
/// timer.observe(&result);
/// ```
pub struct QueryTimer {
    collection: &'static str,
    operation: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(collection: &'static str, operation: &'static str) -> Self {
        Self {
            collection,
            operation,
            start: Instant::now(),
        }
    }

    /// Label used in logs, e.g. `pages.find_by_slug`.
    pub fn query_name(&self) -> String {
        format!("{}.{}", self.collection, self.operation)
    }

    pub fn record(self) {
        record_query_duration(
            self.collection,
            self.operation,
            self.start.elapsed().as_secs_f64(),
        );
    }

    /// Records the duration and, on failure, bumps the error counter.
    pub fn observe<T, E>(self, result: &Result<T, E>) {
        if result.is_err() {
            record_query_error(self.collection, self.operation);
        }
        self.record();
    }
}
