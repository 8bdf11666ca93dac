// ==========================================
// 出货量预测系统 - CSV 导出
// ==========================================
// 文件名: forecast_{product_id}_{YYYY-MM-DD}.csv
// 内容: 表头 x,y；每个历史点与预测点一行（x_axis / extended_series）
// ==========================================

use crate::domain::forecast::ForecastOutput;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use csv::WriterBuilder;
use std::fs;
use std::path::{Path, PathBuf};

pub struct CsvExporter;

impl CsvExporter {
    /// 导出文件名
    pub fn file_name(product_id: i64, today: NaiveDate) -> String {
        format!("forecast_{}_{}.csv", product_id, today.format("%Y-%m-%d"))
    }

    /// 写出预测结果
    ///
    /// # 返回
    /// 导出文件路径
    pub fn export<P: AsRef<Path>>(
        dir: P,
        product_id: i64,
        today: NaiveDate,
        output: &ForecastOutput,
    ) -> RepositoryResult<PathBuf> {
        if output.x_axis.len() != output.extended_series.len() {
            return Err(RepositoryError::CsvWriteError(format!(
                "x 轴 {} 个点, 序列 {} 个点",
                output.x_axis.len(),
                output.extended_series.len()
            )));
        }

        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(Self::file_name(product_id, today));

        let mut writer = WriterBuilder::new().from_path(&path)?;
        writer.write_record(["x", "y"])?;
        for (x, y) in output.x_axis.iter().zip(&output.extended_series) {
            writer.write_record([x.to_string(), y.to_string()])?;
        }
        writer.flush()?;

        tracing::info!(path = %path.display(), rows = output.x_axis.len(), "预测结果已导出");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_export_writes_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let output = ForecastOutput {
            x_values: vec![1.0],
            y_fitted: vec![2.0],
            horizon_months: 1,
            x_axis: vec![1, 2, 3],
            extended_series: vec![2.0, 0.0, 0.05],
            year_labels: vec![2018],
            year_tick_positions: vec![8],
        };
        let today = NaiveDate::from_ymd_opt(2018, 11, 20).unwrap();

        let path = CsvExporter::export(dir.path(), 7, today, &output).unwrap();
        assert!(path.ends_with("forecast_7_2018-11-20.csv"));

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["x,y", "1,2", "2,0", "3,0.05"]);
    }
}
