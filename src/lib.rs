// ==========================================
// 出货量预测系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + nalgebra
// 系统定位: 按产品的月度出货量多项式回归预测
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 建模与预测
pub mod engine;

// 导入层 - 出货导出文件
pub mod importer;

// 导出层 - CSV
pub mod exporter;

// 配置层 - 引擎参数与路径
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// API 层 - 业务接口
pub mod api;

// 日志系统
pub mod logging;

// ==========================================
// 重导出常用类型
// ==========================================

// 领域类型
pub use domain::{
    ForecastOutput, ForecastRecord, ForecastRequest, Horizon, MonthlySeries, ProductSeries,
    SavedForecast, ShipmentRecord,
};

// 引擎
pub use engine::{EngineError, Forecaster, ModelSelector, SelectedModel, SeriesBuilder};

// API
pub use api::{ApiError, ForecastApi, ForecastView, SaveReceipt};

// 配置
pub use config::{ForecastConfig, ForecastPaths};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "出货量预测系统";
