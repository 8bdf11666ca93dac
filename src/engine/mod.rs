// ==========================================
// 出货量预测系统 - 引擎层
// ==========================================
// 流程: 出货记录 → 月度序列 → 模型选择 → 预测 → 快照
// ==========================================
// 职责: 纯计算，不拼 SQL、不读写文件
// ==========================================

pub mod error;
pub mod forecaster;
pub mod metrics;
pub mod model_selector;
pub mod polynomial;
pub mod series_builder;
pub mod snapshot;

// 重导出核心引擎
pub use error::{EngineError, EngineResult};
pub use forecaster::Forecaster;
pub use model_selector::{FitResult, ModelSelector, SelectedModel};
pub use polynomial::PolynomialModel;
pub use series_builder::SeriesBuilder;
pub use snapshot::{decode as decode_snapshot, encode as encode_snapshot, SNAPSHOT_MAGIC};
