use std::path::Path;

use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::{ConnectOptions, Connection, Executor};
use tracing::info;

use crate::query::QueryError;

const SCHEMA: &str = "
DROP TABLE IF EXISTS notes;
DROP TABLE IF EXISTS employee_events;
DROP TABLE IF EXISTS employee;
DROP TABLE IF EXISTS team;

CREATE TABLE team (
    team_id INTEGER PRIMARY KEY,
    team_name TEXT NOT NULL,
    shift TEXT,
    manager_name TEXT
);

CREATE TABLE employee (
    employee_id INTEGER PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    team_id INTEGER REFERENCES team (team_id)
);

CREATE TABLE employee_events (
    event_date TEXT NOT NULL,
    employee_id INTEGER REFERENCES employee (employee_id),
    team_id INTEGER REFERENCES team (team_id),
    positive_events INTEGER,
    negative_events INTEGER
);

CREATE TABLE notes (
    employee_id INTEGER REFERENCES employee (employee_id),
    team_id INTEGER REFERENCES team (team_id),
    note TEXT NOT NULL,
    note_date TEXT NOT NULL
);
";

const TEAMS: &[(i64, &str, &str, &str)] = &[
    (1, "Team Alpha", "Day", "Morgan Reyes"),
    (2, "Team Beta", "Night", "Priya Shah"),
    (3, "Team Gamma", "Day", "Lee Okafor"),
];

const EMPLOYEES: &[(i64, &str, &str, i64)] = &[
    (1, "Ada", "Lovelace", 1),
    (2, "Grace", "Hopper", 1),
    (3, "Alan", "Turing", 2),
    (4, "Edsger", "Dijkstra", 2),
];

// (event_date, employee_id, team_id, positive_events, negative_events)
const EVENTS: &[(&str, i64, i64, i64, i64)] = &[
    ("2023-01-01", 1, 1, 2, 0),
    ("2023-01-03", 1, 1, 0, 1),
    ("2023-01-01", 2, 1, 1, 1),
    ("2023-01-02", 2, 1, 3, 0),
    ("2023-01-02", 3, 2, 0, 2),
];

// (employee_id, team_id, note, note_date)
const NOTES: &[(i64, i64, &str, &str)] = &[
    (1, 1, "Led onboarding for two new hires", "2023-01-02"),
    (3, 2, "Asked to move to the day shift", "2023-01-05"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub teams: usize,
    pub employees: usize,
    pub events: usize,
    pub notes: usize,
}

/// Creates (or recreates) the demo tables at `path` inside one transaction.
pub async fn seed_demo_database(path: &Path) -> Result<SeedSummary, QueryError> {
    let mut conn = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Delete)
        .connect()
        .await
        .map_err(|source| QueryError::Connect {
            path: path.to_path_buf(),
            source,
        })?;

    let mut tx = conn.begin().await?;
    (&mut *tx).execute(SCHEMA).await?;

    for &(team_id, team_name, shift, manager_name) in TEAMS {
        sqlx::query(
            "INSERT INTO team (team_id, team_name, shift, manager_name) VALUES (?, ?, ?, ?)",
        )
        .bind(team_id)
        .bind(team_name)
        .bind(shift)
        .bind(manager_name)
        .execute(&mut *tx)
        .await?;
    }

    for &(employee_id, first_name, last_name, team_id) in EMPLOYEES {
        sqlx::query(
            "INSERT INTO employee (employee_id, first_name, last_name, team_id) VALUES (?, ?, ?, ?)",
        )
        .bind(employee_id)
        .bind(first_name)
        .bind(last_name)
        .bind(team_id)
        .execute(&mut *tx)
        .await?;
    }

    for &(event_date, employee_id, team_id, positive, negative) in EVENTS {
        sqlx::query(
            "INSERT INTO employee_events \
             (event_date, employee_id, team_id, positive_events, negative_events) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(event_date)
        .bind(employee_id)
        .bind(team_id)
        .bind(positive)
        .bind(negative)
        .execute(&mut *tx)
        .await?;
    }

    for &(employee_id, team_id, note, note_date) in NOTES {
        sqlx::query("INSERT INTO notes (employee_id, team_id, note, note_date) VALUES (?, ?, ?, ?)")
            .bind(employee_id)
            .bind(team_id)
            .bind(note)
            .bind(note_date)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    conn.close().await?;

    let summary = SeedSummary {
        teams: TEAMS.len(),
        employees: EMPLOYEES.len(),
        events: EVENTS.len(),
        notes: NOTES.len(),
    };
    info!(path = %path.display(), ?summary, "demo event store seeded");
    Ok(summary)
}
