// ==========================================
// 出货量预测系统 - 领域模型层
// ==========================================
// 职责: 定义出货记录、月度序列、预测结果等领域实体
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod forecast;
pub mod series;
pub mod shipment;
pub mod types;

// 重导出核心类型
pub use forecast::{
    expiration_for, snapshot_key, ForecastOutput, ForecastRecord, ForecastRequest, SavedForecast,
};
pub use series::{MonthlySeries, ProductSeries, MONTHS_PER_YEAR};
pub use shipment::{RawShipment, ShipmentRecord};
pub use types::Horizon;
