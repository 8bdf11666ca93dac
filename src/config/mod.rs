// ==========================================
// 出货量预测系统 - 配置层
// ==========================================
// 职责: 引擎参数管理（默认值 + config_kv 覆写）、数据文件路径
// ==========================================

pub mod config_manager;
pub mod forecast_config;
pub mod paths;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigManager};
pub use forecast_config::ForecastConfig;
pub use paths::ForecastPaths;
