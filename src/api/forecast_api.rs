// ==========================================
// 出货量预测系统 - 预测 API
// ==========================================
// 职责: 串联出货仓储、引擎与结果存储
// 流程:
// - create_forecast: 序列 → 模型选择 → 预测（不落盘）
// - save_forecast:   快照 → Forecast 记录 → 可选 CSV
// - replay_forecast: 仅读快照，不重新拟合
// ==========================================

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, ForecastConfig, ForecastPaths};
use crate::domain::forecast::{ForecastOutput, ForecastRecord, ForecastRequest, SavedForecast};
use crate::domain::series::MonthlySeries;
use crate::domain::types::Horizon;
use crate::engine::{Forecaster, ModelSelector, SeriesBuilder};
use crate::exporter::CsvExporter;
use crate::repository::{ForecastRepository, ShipmentRepository, SnapshotStore};

// ==========================================
// ForecastView - 单次预测结果（未保存）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastView {
    pub product_id: i64,
    pub horizon: Horizon,
    pub start_date: NaiveDate,
    pub degree: usize,
    pub max_r2: f64,
    pub mae: f64,
    pub output: ForecastOutput,
}

impl ForecastView {
    /// 最终数量（拟合曲线最后一个值）
    pub fn final_quantity(&self) -> f64 {
        self.output.y_fitted.last().copied().unwrap_or(0.0)
    }

    /// 精度（MAE × 100）
    pub fn accuracy_percent(&self) -> f64 {
        self.mae * 100.0
    }
}

// ==========================================
// SaveReceipt - 保存回执
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveReceipt {
    pub record: ForecastRecord,
    pub snapshot_path: PathBuf,
    pub export_path: Option<PathBuf>,
}

// ==========================================
// ForecastApi - 预测 API
// ==========================================
pub struct ForecastApi {
    config: ForecastConfig,
    shipment_repo: Arc<ShipmentRepository>,
    forecast_repo: Arc<ForecastRepository>,
    snapshot_store: Arc<SnapshotStore>,
    series: Arc<MonthlySeries>,
}

impl ForecastApi {
    /// 创建 ForecastApi（立即加载出货历史并构建月度序列）
    pub fn new(
        config: ForecastConfig,
        shipment_repo: Arc<ShipmentRepository>,
        forecast_repo: Arc<ForecastRepository>,
        snapshot_store: Arc<SnapshotStore>,
    ) -> ApiResult<Self> {
        let series = Arc::new(Self::build_series(&config, &shipment_repo)?);
        Ok(Self {
            config,
            shipment_repo,
            forecast_repo,
            snapshot_store,
            series,
        })
    }

    /// 按路径打开全部存储；引擎参数从 Forecast 库的 config_kv 读取
    pub fn open(paths: &ForecastPaths) -> ApiResult<Self> {
        let shipment_repo = Arc::new(ShipmentRepository::new(&path_str(&paths.shipments_db))?);
        let forecast_repo = Arc::new(ForecastRepository::new(&path_str(&paths.forecast_db))?);
        let snapshot_store = Arc::new(SnapshotStore::new(&paths.snapshot_dir)?);

        let config = ConfigManager::from_connection(forecast_repo.connection())
            .and_then(|manager| manager.load_forecast_config())
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        tracing::info!(
            shipments_db = %paths.shipments_db.display(),
            forecast_db = %paths.forecast_db.display(),
            snapshot_dir = %paths.snapshot_dir.display(),
            "预测存储已打开"
        );

        Self::new(config, shipment_repo, forecast_repo, snapshot_store)
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn series(&self) -> &MonthlySeries {
        &self.series
    }

    /// 重新加载出货历史（Shipments 表重建后调用）
    pub fn reload_series(&mut self) -> ApiResult<()> {
        self.series = Arc::new(Self::build_series(&self.config, &self.shipment_repo)?);
        Ok(())
    }

    fn build_series(
        config: &ForecastConfig,
        shipment_repo: &ShipmentRepository,
    ) -> ApiResult<MonthlySeries> {
        let records = shipment_repo.load_all()?;
        let series = SeriesBuilder::from_config(config).build(&records);
        tracing::info!(records = records.len(), products = series.len(), "出货历史已加载");
        Ok(series)
    }

    /// 校验并解析起始日期
    ///
    /// 接受 `20YY-MM-DD`，分隔符可为 `-` `/` `.` 或空格，两处必须一致
    pub fn parse_start_date(input: &str) -> ApiResult<NaiveDate> {
        let invalid = || ApiError::InvalidInput(format!("起始日期格式应为 20YY-MM-DD: {}", input));

        let s = input.trim();
        let bytes = s.as_bytes();
        if bytes.len() != 10 || !s.is_ascii() || !s.starts_with("20") {
            return Err(invalid());
        }

        let sep = bytes[4];
        if !matches!(sep, b'-' | b'/' | b'.' | b' ') || bytes[7] != sep {
            return Err(invalid());
        }

        let digits_ok = [0, 1, 2, 3, 5, 6, 8, 9]
            .iter()
            .all(|&i| bytes[i].is_ascii_digit());
        if !digits_ok {
            return Err(invalid());
        }

        let year: i32 = s[0..4].parse().map_err(|_| invalid())?;
        let month: u32 = s[5..7].parse().map_err(|_| invalid())?;
        let day: u32 = s[8..10].parse().map_err(|_| invalid())?;

        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
    }

    /// 具备建模条件的产品（升序）
    pub fn list_qualifying_products(&self) -> Vec<i64> {
        ModelSelector::new(self.config.clone())
            .qualifying_products(&self.series)
            .into_iter()
            .collect()
    }

    /// 生成预测（不保存）
    ///
    /// # 参数
    /// - `product_id`: 产品ID
    /// - `horizon`: 预测周期
    /// - `start_date`: 起始日期（仅使用年、月）
    pub fn create_forecast(
        &self,
        product_id: i64,
        horizon: Horizon,
        start_date: NaiveDate,
    ) -> ApiResult<ForecastView> {
        let product = self
            .series
            .get(product_id)
            .ok_or_else(|| ApiError::NotFound(format!("产品 {} 无出货记录", product_id)))?;

        let selected = ModelSelector::new(self.config.clone()).select(product_id, &self.series)?;

        let request =
            ForecastRequest::new(product_id, horizon, start_date.year(), start_date.month());
        let output = Forecaster::new(self.config.clone()).forecast(&request, &selected, product)?;

        tracing::info!(
            product_id,
            horizon = %horizon,
            start_date = %start_date,
            degree = selected.degree,
            max_r2 = selected.max_r2,
            mae = selected.mae,
            "预测完成"
        );

        Ok(ForecastView {
            product_id,
            horizon,
            start_date,
            degree: selected.degree,
            max_r2: selected.max_r2,
            mae: selected.mae,
            output,
        })
    }

    /// 保存预测
    ///
    /// # 参数
    /// - `view`: create_forecast 的结果
    /// - `run_date`: 运行日期（记录与快照的键）
    /// - `export_dir`: 指定时额外导出 CSV
    pub fn save_forecast(
        &self,
        view: &ForecastView,
        run_date: NaiveDate,
        export_dir: Option<&Path>,
    ) -> ApiResult<SaveReceipt> {
        // 写入顺序: CSV → 快照 → 记录行；任一步失败回滚已写部分
        let export_path = match export_dir {
            Some(dir) => Some(CsvExporter::export(dir, view.product_id, run_date, &view.output)?),
            None => None,
        };

        let snapshot = SavedForecast {
            product_id: view.product_id,
            output: view.output.clone(),
        };
        let snapshot_path = match self.snapshot_store.save(run_date, &snapshot) {
            Ok(path) => path,
            Err(e) => {
                discard_export(export_path.as_deref());
                return Err(e.into());
            }
        };

        let mut record = ForecastRecord::new(
            view.product_id,
            view.horizon,
            run_date,
            view.final_quantity(),
            view.accuracy_percent(),
        );
        match self.forecast_repo.insert(&record) {
            Ok(id) => record.id = Some(id),
            Err(e) => {
                discard_export(export_path.as_deref());
                if let Err(cleanup) = self.snapshot_store.remove(view.product_id, run_date) {
                    tracing::warn!(error = %cleanup, "快照回滚失败");
                }
                return Err(e.into());
            }
        }

        tracing::info!(
            product_id = view.product_id,
            run_date = %run_date,
            record_id = ?record.id,
            exported = export_path.is_some(),
            "预测已保存"
        );

        Ok(SaveReceipt {
            record,
            snapshot_path,
            export_path,
        })
    }

    /// 仍在有效期内的预测记录
    pub fn list_current_forecasts(&self, today: NaiveDate) -> ApiResult<Vec<ForecastRecord>> {
        Ok(self.forecast_repo.list_current(today)?)
    }

    /// 回放已保存的预测（只读快照）
    pub fn replay_forecast(
        &self,
        product_id: i64,
        run_date: NaiveDate,
    ) -> ApiResult<SavedForecast> {
        let saved = self.snapshot_store.load(product_id, run_date)?;
        tracing::info!(product_id, run_date = %run_date, "预测快照已回放");
        Ok(saved)
    }
}

fn discard_export(path: Option<&Path>) {
    if let Some(path) = path {
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "导出文件回滚失败");
        }
    }
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
