// ==========================================
// 出货量预测系统 - 预测结果与预测记录
// ==========================================
// ForecastOutput: 重绘图表所需的全部数据（持久化的就是它）
// ForecastRecord: Forecast 表中的摘要行，保存后不可变
// ==========================================

use crate::domain::types::Horizon;
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// 预测记录固定有效期（与预测周期无关）
pub const EXPIRATION_MONTHS: u32 = 1;

// ==========================================
// ForecastRequest - 预测请求
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastRequest {
    pub product_id: i64,
    pub horizon: Horizon,
    pub start_year: i32,
    pub start_month: u32,
}

impl ForecastRequest {
    pub fn new(product_id: i64, horizon: Horizon, start_year: i32, start_month: u32) -> Self {
        Self {
            product_id,
            horizon,
            start_year,
            start_month,
        }
    }
}

// ==========================================
// ForecastOutput - 图表数据
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastOutput {
    /// 建模使用的月序号（非零月份）
    pub x_values: Vec<f64>,
    /// 模型在 x_values 上的拟合值
    pub y_fitted: Vec<f64>,
    /// 预测月数（1/3/12）
    pub horizon_months: usize,
    /// 主 x 轴：历史月序号 + 预测月序号
    pub x_axis: Vec<i64>,
    /// 历史数量 + 预测数量（与 x_axis 一一对应）
    pub extended_series: Vec<f64>,
    /// 第二 x 轴年份标签
    pub year_labels: Vec<i32>,
    /// 年份刻度位置（8 + 12k，近似年中）
    pub year_tick_positions: Vec<i64>,
}

impl ForecastOutput {
    /// 主 x 轴的月份标签（1..12）
    pub fn month_labels(&self) -> Vec<u32> {
        self.x_axis
            .iter()
            .map(|x| match x.rem_euclid(12) {
                0 => 12,
                m => m as u32,
            })
            .collect()
    }

    /// 末尾的预测点（图表中以不同颜色绘制）
    pub fn forecast_points(&self) -> &[f64] {
        let n = self.extended_series.len();
        &self.extended_series[n.saturating_sub(self.horizon_months)..]
    }

    /// 历史部分长度
    pub fn history_len(&self) -> usize {
        self.extended_series.len().saturating_sub(self.horizon_months)
    }
}

// ==========================================
// ForecastRecord - 预测摘要记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    /// 数据库自增ID（未入库时为 None）
    pub id: Option<i64>,
    pub product_id: i64,
    pub forecast_run: NaiveDate,
    pub period: String,
    pub expiration_date: NaiveDate,
    pub final_quantity: f64,
    pub accuracy_percent: f64,
}

impl ForecastRecord {
    /// 构造预测记录
    ///
    /// # 说明
    /// - period 取周期显示名称去掉 " Forecast" 后缀
    /// - expiration_date 固定为运行日期后 1 个月
    pub fn new(
        product_id: i64,
        horizon: Horizon,
        forecast_run: NaiveDate,
        final_quantity: f64,
        accuracy_percent: f64,
    ) -> Self {
        Self {
            id: None,
            product_id,
            forecast_run,
            period: horizon.period_label().to_string(),
            expiration_date: expiration_for(forecast_run),
            final_quantity,
            accuracy_percent,
        }
    }

    /// 是否仍在有效期内（expirationDate > today）
    pub fn is_current(&self, today: NaiveDate) -> bool {
        self.expiration_date > today
    }

    /// 快照存储键
    pub fn snapshot_key(&self) -> String {
        snapshot_key(self.product_id, self.forecast_run)
    }
}

/// 运行日期对应的失效日期
pub fn expiration_for(forecast_run: NaiveDate) -> NaiveDate {
    forecast_run
        .checked_add_months(Months::new(EXPIRATION_MONTHS))
        .unwrap_or(NaiveDate::MAX)
}

/// 快照键: `{product_id}_{YYYY-MM-DD}`
pub fn snapshot_key(product_id: i64, forecast_run: NaiveDate) -> String {
    format!("{}_{}", product_id, forecast_run.format("%Y-%m-%d"))
}

// ==========================================
// SavedForecast - 快照内容
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedForecast {
    pub product_id: i64,
    pub output: ForecastOutput,
}
