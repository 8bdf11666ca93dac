// ==========================================
// 出货量预测系统 - 数据导入层
// ==========================================
// 职责: 读取出货导出文件，供建库工具写入 Shipments 表
// ==========================================

pub mod error;
pub mod json_loader;

pub use error::{ImportError, ImportResult};
pub use json_loader::ShipmentJsonLoader;
