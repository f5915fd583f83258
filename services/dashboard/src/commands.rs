use crate::cli::{DataArgs, RenderArgs, ScoreArgs, SeedArgs};
use crate::infra::load_dashboard;
use employee_events::config::AppConfig;
use employee_events::entity::EntityKind;
use employee_events::error::AppError;
use employee_events::report::Dashboard;
use employee_events::seed::seed_demo_database;
use employee_events::telemetry;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

fn prepare(mut data: DataArgs) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load()?;
    data.apply(&mut config);
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

fn dashboard(data: DataArgs) -> Result<Dashboard, AppError> {
    let config = prepare(data)?;
    load_dashboard(&config.data)
}

pub(crate) async fn run_render(args: RenderArgs) -> Result<(), AppError> {
    let RenderArgs {
        kind,
        id,
        output,
        data,
    } = args;

    let dashboard = dashboard(data)?;
    match output {
        Some(path) => write_report(&dashboard, kind, id, &path).await,
        None => {
            let page = dashboard.render_report(kind, id).await?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(page.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}

pub(crate) async fn write_report(
    dashboard: &Dashboard,
    kind: EntityKind,
    id: i64,
    path: &Path,
) -> Result<(), AppError> {
    let page = dashboard.render_report(kind, id).await?;
    fs::write(path, &page)?;
    info!(entity = kind.name(), id, path = %path.display(), "report written");
    Ok(())
}

pub(crate) async fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs { kind, id, data } = args;

    let rendered = score_json(&dashboard(data)?, kind, id).await?;
    println!("{rendered}");
    Ok(())
}

pub(crate) async fn score_json(
    dashboard: &Dashboard,
    kind: EntityKind,
    id: i64,
) -> Result<String, AppError> {
    let assessment = dashboard.assess(kind, id).await?;
    Ok(serde_json::to_string_pretty(&assessment).map_err(std::io::Error::from)?)
}

pub(crate) async fn run_seed(args: SeedArgs) -> Result<(), AppError> {
    let config = prepare(DataArgs {
        database: args.database,
        model: None,
    })?;

    println!("{}", seed_json(&config.data.database_path).await?);
    Ok(())
}

pub(crate) async fn seed_json(path: &Path) -> Result<String, AppError> {
    let summary = seed_demo_database(path).await?;
    Ok(serde_json::to_string_pretty(&summary).map_err(std::io::Error::from)?)
}
