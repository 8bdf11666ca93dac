// ==========================================
// 出货量预测系统 - 月度序列
// ==========================================
// 约束:
// - 每个产品覆盖 [首年, 末年] 的全部月份，缺失月份为 0
// - 下标 i ⇔ 第 i+1 个月（自首年 1 月起），下游全部索引运算依赖此顺序
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MONTHS_PER_YEAR: usize = 12;

/// 单个产品的月度出货序列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSeries {
    pub product_id: i64,
    pub first_year: i32,
    pub last_year: i32,
    pub quantities: Vec<f64>,
}

impl ProductSeries {
    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    /// 覆盖的年份（升序，含首尾）
    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.first_year..=self.last_year
    }

    /// 非零月份数量
    pub fn non_zero_count(&self) -> usize {
        self.quantities.iter().filter(|q| **q > 0.0).count()
    }

    /// 非零月份的 (月序号, 数量)，月序号从 1 开始
    ///
    /// 零值月份不参与建模（无法区分"无需求"与"无记录"），但仍保留在展示序列中
    pub fn non_zero_points(&self) -> Vec<(f64, f64)> {
        self.quantities
            .iter()
            .enumerate()
            .filter(|(_, q)| **q != 0.0)
            .map(|(i, q)| ((i + 1) as f64, *q))
            .collect()
    }

    /// 指定年月的数量（超出范围返回 None）
    pub fn quantity_at(&self, year: i32, month: u32) -> Option<f64> {
        if year < self.first_year || !(1..=12).contains(&month) {
            return None;
        }
        let idx = (year - self.first_year) as usize * MONTHS_PER_YEAR + (month as usize - 1);
        self.quantities.get(idx).copied()
    }
}

/// 产品ID → 月度序列
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlySeries {
    products: BTreeMap<i64, ProductSeries>,
}

impl MonthlySeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, series: ProductSeries) {
        self.products.insert(series.product_id, series);
    }

    pub fn get(&self, product_id: i64) -> Option<&ProductSeries> {
        self.products.get(&product_id)
    }

    pub fn product_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.products.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductSeries> {
        self.products.values()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
