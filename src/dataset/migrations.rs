pub const BASE_MIGRATION: &str = r#"
CREATE TABLE IF NOT EXISTS datasets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    scenario TEXT NOT NULL,
    baseline_value REAL NOT NULL,
    cost_per_unit REAL NOT NULL,
    total_volume REAL NOT NULL,
    clinician_hours_per_unit REAL NOT NULL,
    file_url TEXT,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_datasets_scenario_id
    ON datasets(scenario, id DESC);
"#;
