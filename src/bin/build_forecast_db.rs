// Recreate an empty Forecast table.
//
// Usage:
//   build_forecast_db [db_path]
//
// db_path defaults to SHIPMENT_FORECAST_FORECAST_DB or the user data directory.
// Saved records are dropped; config_kv overrides and snapshot files are kept.

use anyhow::Context;
use shipment_forecast::config::ForecastPaths;
use shipment_forecast::logging;
use shipment_forecast::repository::ForecastRepository;

fn main() -> anyhow::Result<()> {
    logging::init_from_env();

    let db_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| ForecastPaths::resolve().forecast_db.to_string_lossy().into_owned());

    let repo = ForecastRepository::new(&db_path)
        .with_context(|| format!("无法打开数据库 {}", db_path))?;
    repo.reset()?;

    println!("Forecast table ready: {}", db_path);
    Ok(())
}
