use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use crate::query::{QueryEngine, QueryError, SqlParam, Table};

pub const NOT_FOUND: &str = "not found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Employee,
    Team,
}

impl EntityKind {
    pub const ALL: [EntityKind; 2] = [EntityKind::Employee, EntityKind::Team];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Team => "team",
        }
    }

    /// Title-cased name, also the value submitted by the profile radio.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Employee => "Employee",
            Self::Team => "Team",
        }
    }

    pub const fn model(self) -> EntityModel {
        match self {
            Self::Employee => EntityModel::EMPLOYEE,
            Self::Team => EntityModel::TEAM,
        }
    }

    /// Parses the `profile_type` form value. Only the exact labels are accepted.
    pub fn from_profile_type(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == value)
    }

    /// Canonical report path, e.g. `/team/3`.
    pub fn report_path(self, id: i64) -> String {
        format!("/{}/{id}", self.name())
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entity kind '{0}', expected 'employee' or 'team'")]
pub struct UnknownEntityKind(pub String);

impl FromStr for EntityKind {
    type Err = UnknownEntityKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownEntityKind(value.to_string()))
    }
}

/// Summed event counts for one employee, the classifier's input row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, sqlx::FromRow)]
pub struct FeatureRow {
    pub positive_events: i64,
    pub negative_events: i64,
}

impl FeatureRow {
    pub fn new(positive_events: i64, negative_events: i64) -> Self {
        Self {
            positive_events,
            negative_events,
        }
    }

    /// Values in the order of [`FeatureRow::COLUMNS`].
    pub fn values(&self) -> [f64; 2] {
        [self.positive_events as f64, self.negative_events as f64]
    }

    pub const COLUMNS: [&'static str; 2] = ["positive_events", "negative_events"];
}

/// Per-day event totals. Sums over all-null days come back as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct EventCount {
    pub event_date: NaiveDate,
    pub positive_events: Option<i64>,
    pub negative_events: Option<i64>,
}

/// Query configuration for one entity. Identifiers here are compile-time
/// constants; every per-call value is bound as a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityModel {
    pub kind: EntityKind,
    table: &'static str,
    id_column: &'static str,
    display_name: &'static str,
    feature_grain: Option<&'static str>,
}

impl EntityModel {
    pub const EMPLOYEE: EntityModel = EntityModel {
        kind: EntityKind::Employee,
        table: "employee",
        id_column: "employee_id",
        display_name: "first_name || ' ' || last_name",
        feature_grain: None,
    };

    /// Team features are summed per member so scoring can average them.
    pub const TEAM: EntityModel = EntityModel {
        kind: EntityKind::Team,
        table: "team",
        id_column: "team_id",
        display_name: "team_name",
        feature_grain: Some("employee_id"),
    };

    pub const fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub const fn table(&self) -> &'static str {
        self.table
    }

    pub const fn id_column(&self) -> &'static str {
        self.id_column
    }

    fn names_sql(&self) -> String {
        format!(
            "SELECT {display} AS display_name, {id} FROM {table}",
            display = self.display_name,
            id = self.id_column,
            table = self.table,
        )
    }

    fn username_sql(&self) -> String {
        format!(
            "SELECT {display} AS display_name FROM {table} WHERE {id} = ?",
            display = self.display_name,
            id = self.id_column,
            table = self.table,
        )
    }

    fn model_data_sql(&self) -> String {
        let grouping = self
            .feature_grain
            .map(|column| format!(" GROUP BY {column} ORDER BY {column}"))
            .unwrap_or_default();
        format!(
            "SELECT COALESCE(SUM(positive_events), 0) AS positive_events, \
                    COALESCE(SUM(negative_events), 0) AS negative_events \
             FROM {table} JOIN employee_events USING({id}) \
             WHERE {table}.{id} = ?{grouping}",
            table = self.table,
            id = self.id_column,
        )
    }

    fn event_counts_sql(&self) -> String {
        format!(
            "SELECT event_date, \
                    SUM(positive_events) AS positive_events, \
                    SUM(negative_events) AS negative_events \
             FROM {table} JOIN employee_events USING({id}) \
             WHERE {table}.{id} = ? \
             GROUP BY event_date ORDER BY event_date",
            table = self.table,
            id = self.id_column,
        )
    }

    fn notes_sql(&self) -> String {
        format!(
            "SELECT note_date, note FROM notes JOIN {table} USING({id}) \
             WHERE {table}.{id} = ? ORDER BY note_date",
            table = self.table,
            id = self.id_column,
        )
    }

    /// `(display_name, id)` for every entity, in store row order.
    pub async fn names(&self, engine: &QueryEngine) -> Result<Vec<(String, i64)>, QueryError> {
        engine.rows(&self.names_sql(), &[]).await
    }

    /// Display name for `id`, or `None` when no such entity exists.
    pub async fn username(
        &self,
        engine: &QueryEngine,
        id: i64,
    ) -> Result<Option<String>, QueryError> {
        let rows: Vec<(String,)> = engine
            .rows(&self.username_sql(), &[SqlParam::from(id)])
            .await?;
        Ok(rows.into_iter().next().map(|(name,)| name))
    }

    /// Like [`EntityModel::username`] but falls back to `"not found"`.
    pub async fn display_username(
        &self,
        engine: &QueryEngine,
        id: i64,
    ) -> Result<String, QueryError> {
        Ok(self
            .username(engine, id)
            .await?
            .unwrap_or_else(|| NOT_FOUND.to_string()))
    }

    /// Feature rows for scoring. One row for an employee (zeros when there are
    /// no events); one row per member with events for a team.
    pub async fn model_data(
        &self,
        engine: &QueryEngine,
        id: i64,
    ) -> Result<Vec<FeatureRow>, QueryError> {
        engine
            .rows(&self.model_data_sql(), &[SqlParam::from(id)])
            .await
    }

    /// Per-day totals, ascending by date. Days without events are absent.
    pub async fn event_counts(
        &self,
        engine: &QueryEngine,
        id: i64,
    ) -> Result<Vec<EventCount>, QueryError> {
        engine
            .rows(&self.event_counts_sql(), &[SqlParam::from(id)])
            .await
    }

    /// Manager notes as a `note_date`/`note` table, oldest first.
    pub async fn notes(&self, engine: &QueryEngine, id: i64) -> Result<Table, QueryError> {
        engine.table(&self.notes_sql(), &[SqlParam::from(id)]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_column_follows_entity_name() {
        for kind in EntityKind::ALL {
            let model = kind.model();
            assert_eq!(model.id_column(), format!("{}_id", model.name()));
            assert_eq!(model.table(), kind.name());
        }
    }

    #[test]
    fn profile_type_requires_exact_label() {
        assert_eq!(
            EntityKind::from_profile_type("Employee"),
            Some(EntityKind::Employee)
        );
        assert_eq!(EntityKind::from_profile_type("Team"), Some(EntityKind::Team));
        assert_eq!(EntityKind::from_profile_type("team"), None);
        assert_eq!(EntityKind::from_profile_type(""), None);
    }

    #[test]
    fn cli_kind_parsing_is_case_insensitive() {
        assert_eq!("TEAM".parse::<EntityKind>(), Ok(EntityKind::Team));
        assert_eq!(" employee ".parse::<EntityKind>(), Ok(EntityKind::Employee));
        assert!("manager".parse::<EntityKind>().is_err());
    }

    #[test]
    fn report_path_is_canonical() {
        assert_eq!(EntityKind::Employee.report_path(42), "/employee/42");
        assert_eq!(EntityKind::Team.report_path(3), "/team/3");
    }

    #[test]
    fn queries_bind_ids_instead_of_interpolating() {
        let model = EntityModel::EMPLOYEE;
        for sql in [
            model.username_sql(),
            model.model_data_sql(),
            model.event_counts_sql(),
            model.notes_sql(),
        ] {
            assert!(sql.contains("= ?"), "missing placeholder in {sql}");
        }
    }

    #[test]
    fn only_team_features_group_by_member() {
        assert!(!EntityModel::EMPLOYEE.model_data_sql().contains("GROUP BY"));
        assert!(EntityModel::TEAM
            .model_data_sql()
            .contains("GROUP BY employee_id"));
    }
}
