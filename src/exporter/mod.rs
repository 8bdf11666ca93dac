// ==========================================
// 出货量预测系统 - 导出层
// ==========================================

pub mod csv_exporter;

pub use csv_exporter::CsvExporter;
