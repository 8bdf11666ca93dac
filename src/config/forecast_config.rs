// ==========================================
// 出货量预测系统 - 引擎参数
// ==========================================
// 默认值与历史工具保持一致，可由 config_kv 覆写
// ==========================================

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// 建模所需最少非零月份数（严格大于）
pub const DEFAULT_MIN_DATA_PTS: usize = 10;
/// 可信模型的最低 R²
pub const DEFAULT_MIN_R2: f64 = 0.20;
/// 低置信度判定的 MAE 上限
pub const DEFAULT_LOW_CONFIDENCE_MAE: f64 = 100.0;
/// 负预测值替换值（柱状图上保留一小段）
pub const DEFAULT_NEGATIVE_STUB: f64 = 0.05;
/// 脏数据哨兵年份
pub const DEFAULT_SENTINEL_YEAR: i32 = 2050;
pub const DEFAULT_MIN_DEGREE: usize = 2;
pub const DEFAULT_MAX_DEGREE: usize = 8;
pub const DEFAULT_TEST_RATIO: f64 = 0.2;
pub const DEFAULT_SPLIT_SEED: u64 = 42;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    pub min_data_pts: usize,
    pub min_r2: f64,
    pub low_confidence_mae: f64,
    pub negative_stub: f64,
    pub sentinel_year: i32,
    pub min_degree: usize,
    pub max_degree: usize,
    pub test_ratio: f64,
    pub split_seed: u64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            min_data_pts: DEFAULT_MIN_DATA_PTS,
            min_r2: DEFAULT_MIN_R2,
            low_confidence_mae: DEFAULT_LOW_CONFIDENCE_MAE,
            negative_stub: DEFAULT_NEGATIVE_STUB,
            sentinel_year: DEFAULT_SENTINEL_YEAR,
            min_degree: DEFAULT_MIN_DEGREE,
            max_degree: DEFAULT_MAX_DEGREE,
            test_ratio: DEFAULT_TEST_RATIO,
            split_seed: DEFAULT_SPLIT_SEED,
        }
    }
}

impl ForecastConfig {
    /// 候选多项式次数（含首尾）
    pub fn degree_range(&self) -> RangeInclusive<usize> {
        self.min_degree..=self.max_degree
    }

    /// 是否判定为低置信度模型（整段预测置零）
    pub fn is_low_confidence(&self, max_r2: f64, mae: f64) -> bool {
        max_r2 < self.min_r2 && mae > self.low_confidence_mae
    }

    /// 替换指定划分种子
    pub fn with_split_seed(mut self, seed: u64) -> Self {
        self.split_seed = seed;
        self
    }
}
