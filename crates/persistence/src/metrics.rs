//! Database metrics: query latency histograms and pool gauges.

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Publishes pool gauges. Called before each Prometheus scrape.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();

    gauge!("database_connections_active").set(size.saturating_sub(idle) as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Times one repository call.
///
/// ```ignore
/// let timer = QueryTimer::new("find_job_in_business");
/// let result = sqlx::query_as::<_, JobEntity>(...).fetch_optional(&pool).await;
/// timer.finish(result)
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    /// Records the elapsed time as a successful query.
    pub fn record(self) {
        self.observe("ok");
    }

    /// Records the elapsed time labelled with the query outcome and passes
    /// the result through.
    pub fn finish<T>(self, result: Result<T, sqlx::Error>) -> Result<T, sqlx::Error> {
        match &result {
            Ok(_) => self.observe("ok"),
            Err(_) => {
                counter!("database_query_errors_total", "query" => self.query_name).increment(1);
                self.observe("error");
            }
        }
        result
    }

    fn observe(self, outcome: &'static str) {
        histogram!(
            "database_query_duration_seconds",
            "query" => self.query_name,
            "outcome" => outcome
        )
        .record(self.start.elapsed().as_secs_f64());
    }
}
