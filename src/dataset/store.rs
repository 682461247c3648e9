use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tracing::{info, warn};

use crate::dataset::migrations::BASE_MIGRATION;
use crate::dataset::{Dataset, NewDataset};
use crate::scenario::ScenarioId;

pub struct DatasetStore {
    conn: Connection,
}

impl DatasetStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed creating data directory: {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed opening dataset store: {}", path.display()))?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.migrate()?;
        Ok(store)
    }

    pub fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(BASE_MIGRATION)?;
        Ok(())
    }

    /// Validates and persists a dataset, returning the stored record.
    pub fn create(&self, dataset: &NewDataset) -> Result<Dataset> {
        dataset.validate()?;
        let created_at = Utc::now();
        self.conn.execute(
            r#"
INSERT INTO datasets(
    name, scenario, baseline_value, cost_per_unit, total_volume,
    clinician_hours_per_unit, file_url, created_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
"#,
            params![
                dataset.name,
                dataset.scenario.as_slug(),
                dataset.baseline_value,
                dataset.cost_per_unit,
                dataset.total_volume,
                dataset.clinician_hours_per_unit,
                dataset.file_url,
                created_at.to_rfc3339()
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!("saved dataset {id} ({}) for {}", dataset.name, dataset.scenario);
        Ok(Dataset {
            id,
            name: dataset.name.clone(),
            scenario: dataset.scenario,
            baseline_value: dataset.baseline_value,
            cost_per_unit: dataset.cost_per_unit,
            total_volume: dataset.total_volume,
            clinician_hours_per_unit: dataset.clinician_hours_per_unit,
            file_url: dataset.file_url.clone(),
            created_at,
        })
    }

    /// All datasets, newest first.
    pub fn list(&self) -> Result<Vec<Dataset>> {
        let mut stmt = self.conn.prepare(
            r#"
SELECT id, name, scenario, baseline_value, cost_per_unit, total_volume,
       clinician_hours_per_unit, file_url, created_at
FROM datasets
ORDER BY id DESC
"#,
        )?;
        let rows = stmt
            .query_map([], |row| row_to_dataset(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows.into_iter().flatten().collect())
    }

    pub fn list_for(&self, scenario: ScenarioId) -> Result<Vec<Dataset>> {
        let mut stmt = self.conn.prepare(
            r#"
SELECT id, name, scenario, baseline_value, cost_per_unit, total_volume,
       clinician_hours_per_unit, file_url, created_at
FROM datasets
WHERE scenario = ?1
ORDER BY id DESC
"#,
        )?;
        let rows = stmt
            .query_map(params![scenario.as_slug()], |row| row_to_dataset(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows.into_iter().flatten().collect())
    }
}

/// Rows with an unrecognised scenario slug or an unreadable timestamp are
/// skipped rather than guessed.
fn row_to_dataset(row: &rusqlite::Row<'_>) -> rusqlite::Result<Option<Dataset>> {
    let scenario_raw: String = row.get(2)?;
    let Ok(scenario) = scenario_raw.parse::<ScenarioId>() else {
        warn!("skipping dataset row with unknown scenario {scenario_raw:?}");
        return Ok(None);
    };
    let created_at_raw: String = row.get(8)?;
    let created_at = match DateTime::parse_from_rfc3339(&created_at_raw) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(e) => {
            warn!("skipping dataset row with bad created_at {created_at_raw:?}: {e}");
            return Ok(None);
        }
    };
    Ok(Some(Dataset {
        id: row.get(0)?,
        name: row.get(1)?,
        scenario,
        baseline_value: row.get(3)?,
        cost_per_unit: row.get(4)?,
        total_volume: row.get(5)?,
        clinician_hours_per_unit: row.get(6)?,
        file_url: row.get(7)?,
        created_at,
    }))
}
