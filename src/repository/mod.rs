// ==========================================
// 出货量预测系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 出货历史、预测记录、预测快照的持久化
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod forecast_repo;
pub mod shipment_repo;
pub mod snapshot_store;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use forecast_repo::ForecastRepository;
pub use shipment_repo::ShipmentRepository;
pub use snapshot_store::SnapshotStore;
