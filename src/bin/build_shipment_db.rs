// Rebuild the Shipments table from a shipment export JSON file.
//
// Usage:
//   build_shipment_db <json_path> [db_path]
//
// db_path defaults to SHIPMENT_FORECAST_SHIPMENTS_DB or the user data directory.
// Existing rows are dropped.

use anyhow::Context;
use shipment_forecast::config::ForecastPaths;
use shipment_forecast::importer::ShipmentJsonLoader;
use shipment_forecast::logging;
use shipment_forecast::repository::ShipmentRepository;

fn main() -> anyhow::Result<()> {
    logging::init_from_env();

    let mut args = std::env::args().skip(1);
    let json_path = args
        .next()
        .context("usage: build_shipment_db <json_path> [db_path]")?;
    let db_path = args
        .next()
        .unwrap_or_else(|| ForecastPaths::resolve().shipments_db.to_string_lossy().into_owned());

    println!("Building database...");

    let rows = ShipmentJsonLoader::load(&json_path)
        .with_context(|| format!("无法读取出货文件 {}", json_path))?;

    let repo = ShipmentRepository::new(&db_path)
        .with_context(|| format!("无法打开数据库 {}", db_path))?;
    repo.reset()?;
    let inserted = repo.insert_batch(&rows)?;

    println!("******** Completed building {} ({} rows) ********", db_path, inserted);
    Ok(())
}
