use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tracing::{info, warn};

use super::dashboard::{Dashboard, DEFAULT_EMPLOYEE_ID};
use crate::entity::EntityKind;
use crate::error::AppError;

/// Query string of the selector refresh triggered by the profile radio.
#[derive(Debug, Default, Deserialize)]
pub struct DropdownQuery {
    pub profile_type: Option<String>,
}

/// Body posted by the filter form.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileSelection {
    pub profile_type: Option<String>,
    #[serde(rename = "user-selection")]
    pub user_selection: Option<String>,
}

/// Page routes plus the two htmx/form endpoints behind the filters.
pub fn dashboard_router(dashboard: Arc<Dashboard>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/employee/:id", get(employee_report))
        .route("/team/:id", get(team_report))
        .route("/update_dropdown", get(update_dropdown))
        .route("/update_data", post(update_data))
        .with_state(dashboard)
}

fn profile_kind(profile_type: Option<&str>) -> Result<EntityKind, AppError> {
    let raw = profile_type
        .ok_or_else(|| AppError::BadRequest("profile_type is required".to_string()))?;
    EntityKind::from_profile_type(raw).ok_or_else(|| {
        AppError::BadRequest(format!(
            "profile_type must be 'Employee' or 'Team', got '{raw}'"
        ))
    })
}

async fn render(
    dashboard: &Dashboard,
    kind: EntityKind,
    id: i64,
) -> Result<Html<String>, AppError> {
    info!(entity = kind.name(), id, "rendering report");
    Ok(Html(dashboard.render_report(kind, id).await?))
}

pub(crate) async fn index(
    State(dashboard): State<Arc<Dashboard>>,
) -> Result<Html<String>, AppError> {
    render(&dashboard, EntityKind::Employee, DEFAULT_EMPLOYEE_ID).await
}

pub(crate) async fn employee_report(
    State(dashboard): State<Arc<Dashboard>>,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    render(&dashboard, EntityKind::Employee, id).await
}

pub(crate) async fn team_report(
    State(dashboard): State<Arc<Dashboard>>,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    render(&dashboard, EntityKind::Team, id).await
}

pub(crate) async fn update_dropdown(
    State(dashboard): State<Arc<Dashboard>>,
    Query(query): Query<DropdownQuery>,
) -> Result<Html<String>, AppError> {
    let kind = profile_kind(query.profile_type.as_deref()).map_err(|err| {
        warn!(profile_type = ?query.profile_type, "rejected selector refresh");
        err
    })?;
    Ok(Html(dashboard.render_selector(kind).await?))
}

pub(crate) async fn update_data(
    Form(selection): Form<ProfileSelection>,
) -> Result<Redirect, AppError> {
    let kind = profile_kind(selection.profile_type.as_deref())?;
    let raw_id = selection
        .user_selection
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("user-selection is required".to_string()))?;
    let id = raw_id.trim().parse::<i64>().map_err(|_| {
        AppError::BadRequest(format!("user-selection must be an integer id, got '{raw_id}'"))
    })?;

    let target = kind.report_path(id);
    info!(entity = kind.name(), id, %target, "redirecting filter submission");
    Ok(Redirect::to(&target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn update_data_redirects_with_see_other() {
        let response = update_data(Form(ProfileSelection {
            profile_type: Some("Employee".to_string()),
            user_selection: Some("42".to_string()),
        }))
        .await
        .expect("valid selection redirects")
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(axum::http::header::LOCATION).unwrap(),
            "/employee/42"
        );
    }

    #[tokio::test]
    async fn update_data_rejects_unknown_profile_type() {
        let err = update_data(Form(ProfileSelection {
            profile_type: Some("Manager".to_string()),
            user_selection: Some("1".to_string()),
        }))
        .await
        .expect_err("unknown profile type");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn update_data_rejects_non_numeric_selection() {
        let err = update_data(Form(ProfileSelection {
            profile_type: Some("Team".to_string()),
            user_selection: Some("abc".to_string()),
        }))
        .await
        .expect_err("non-numeric id");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn profile_kind_requires_a_value() {
        assert!(matches!(profile_kind(None), Err(AppError::BadRequest(_))));
        assert_eq!(profile_kind(Some("Team")).ok(), Some(EntityKind::Team));
    }
}
