//! Landing-page overview: entity counts plus the latest bookings.

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::warn;

use crate::db::{Database, RowSet};
use crate::error::FleetError;

/// Tables surfaced as headline metrics. A fixed program-owned list, so the
/// names may be written straight into statement text.
const METRIC_TABLES: [&str; 4] = ["DRIVERS", "CARS", "CLIENTS", "BOOKINGS"];

#[derive(Debug, Serialize)]
pub struct Overview {
    pub counts: Vec<TableCount>,
    pub recent_bookings: RowSet,
}

#[derive(Debug, Serialize)]
pub struct TableCount {
    pub table: String,
    /// None when the table could not be counted; the rest of the overview
    /// still renders.
    pub rows: Option<u64>,
}

pub async fn overview(db: &Database) -> Result<Overview, FleetError> {
    let mut counts = Vec::with_capacity(METRIC_TABLES.len());
    for table in METRIC_TABLES {
        let statement = format!("SELECT COUNT(*) AS count FROM {table}");
        let rows = match db.query(&statement, Vec::new()).await {
            Ok(set) => set.single_value().and_then(JsonValue::as_u64),
            Err(e) => {
                warn!(table, error = %e, "dashboard count unavailable");
                None
            }
        };
        counts.push(TableCount {
            table: table.to_owned(),
            rows,
        });
    }
    let recent_bookings = super::bookings::recent(db, 10).await?;
    Ok(Overview {
        counts,
        recent_bookings,
    })
}
