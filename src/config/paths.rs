// ==========================================
// 出货量预测系统 - 数据文件路径
// ==========================================
// 优先读取环境变量（便于调试/测试/CI），否则使用用户数据目录
// ==========================================

use std::path::{Path, PathBuf};

pub const ENV_SHIPMENTS_DB: &str = "SHIPMENT_FORECAST_SHIPMENTS_DB";
pub const ENV_FORECAST_DB: &str = "SHIPMENT_FORECAST_FORECAST_DB";
pub const ENV_SNAPSHOT_DIR: &str = "SHIPMENT_FORECAST_SNAPSHOT_DIR";

const SHIPMENTS_DB_FILE: &str = "Shipments.db";
const FORECAST_DB_FILE: &str = "Forecast.db";
const SNAPSHOT_DIR_NAME: &str = "snapshots";

/// 三类存储的位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastPaths {
    pub shipments_db: PathBuf,
    pub forecast_db: PathBuf,
    pub snapshot_dir: PathBuf,
}

impl ForecastPaths {
    /// 全部放在同一目录下
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            shipments_db: dir.join(SHIPMENTS_DB_FILE),
            forecast_db: dir.join(FORECAST_DB_FILE),
            snapshot_dir: dir.join(SNAPSHOT_DIR_NAME),
        }
    }

    /// 环境变量 > 用户数据目录 > 当前目录
    pub fn resolve() -> Self {
        let base = default_data_dir();
        let defaults = Self::in_dir(&base);

        Self {
            shipments_db: env_path(ENV_SHIPMENTS_DB).unwrap_or(defaults.shipments_db),
            forecast_db: env_path(ENV_FORECAST_DB).unwrap_or(defaults.forecast_db),
            snapshot_dir: env_path(ENV_SNAPSHOT_DIR).unwrap_or(defaults.snapshot_dir),
        }
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn default_data_dir() -> PathBuf {
    match dirs::data_dir() {
        Some(data_dir) => {
            let dir = data_dir.join("shipment-forecast");
            // best-effort: 目录创建失败时后续打开数据库会报出具体错误
            if let Err(e) = std::fs::create_dir_all(&dir) {
                tracing::warn!("数据目录创建失败，回退到当前目录: {}", e);
                return PathBuf::from(".");
            }
            dir
        }
        None => PathBuf::from("."),
    }
}
