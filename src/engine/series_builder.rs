// ==========================================
// 出货量预测系统 - 月度序列构建器
// ==========================================
// 输入: 出货记录（产品, 发货日期, 数量）
// 输出: 每个产品的稠密月度序列
// ==========================================
// 规则:
// - 按 产品 → 年 → 月 汇总数量
// - 哨兵年份（默认 2050）的记录视为脏数据，整条丢弃
// - [首年, 末年] 内每个月都会出现，无出货记为 0
// - 顺序: 年升序，年内 1..12 月
// ==========================================

use crate::config::ForecastConfig;
use crate::domain::series::{MonthlySeries, ProductSeries, MONTHS_PER_YEAR};
use crate::domain::shipment::ShipmentRecord;
use chrono::Datelike;
use std::collections::BTreeMap;

// ==========================================
// SeriesBuilder - 月度序列构建器
// ==========================================
pub struct SeriesBuilder {
    sentinel_year: i32,
}

impl SeriesBuilder {
    pub fn new(sentinel_year: i32) -> Self {
        Self { sentinel_year }
    }

    pub fn from_config(config: &ForecastConfig) -> Self {
        Self::new(config.sentinel_year)
    }

    /// 汇总出货记录为月度序列（纯函数，无副作用）
    pub fn build<'a, I>(&self, records: I) -> MonthlySeries
    where
        I: IntoIterator<Item = &'a ShipmentRecord>,
    {
        // product_id -> year -> [12 个月]
        let mut grouped: BTreeMap<i64, BTreeMap<i32, [f64; MONTHS_PER_YEAR]>> = BTreeMap::new();
        let mut dropped = 0usize;

        for record in records {
            let year = record.ship_date.year();
            if year == self.sentinel_year {
                dropped += 1;
                continue;
            }
            let month_idx = record.ship_date.month0() as usize;
            grouped
                .entry(record.product_id)
                .or_default()
                .entry(year)
                .or_insert([0.0; MONTHS_PER_YEAR])[month_idx] += record.quantity;
        }

        let mut series = MonthlySeries::new();
        for (product_id, years) in grouped {
            // BTreeMap 有序，首尾即最小/最大年份
            let (first_year, last_year) = match (years.keys().next(), years.keys().next_back()) {
                (Some(first), Some(last)) => (*first, *last),
                _ => continue,
            };

            let mut quantities =
                Vec::with_capacity((last_year - first_year + 1) as usize * MONTHS_PER_YEAR);
            for year in first_year..=last_year {
                match years.get(&year) {
                    Some(months) => quantities.extend_from_slice(months),
                    None => quantities.extend_from_slice(&[0.0; MONTHS_PER_YEAR]),
                }
            }

            series.insert(ProductSeries {
                product_id,
                first_year,
                last_year,
                quantities,
            });
        }

        tracing::debug!(
            products = series.len(),
            dropped_sentinel = dropped,
            sentinel_year = self.sentinel_year,
            "月度序列构建完成"
        );

        series
    }
}

impl Default for SeriesBuilder {
    fn default() -> Self {
        Self::from_config(&ForecastConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(product_id: i64, y: i32, m: u32, d: u32, q: f64) -> ShipmentRecord {
        ShipmentRecord::new(product_id, NaiveDate::from_ymd_opt(y, m, d).unwrap(), q)
    }

    #[test]
    fn test_sums_within_month() {
        let records = vec![rec(1, 2016, 3, 1, 2.0), rec(1, 2016, 3, 28, 5.0)];
        let series = SeriesBuilder::default().build(&records);
        let s = series.get(1).unwrap();
        assert_eq!(s.len(), 12);
        assert_eq!(s.quantities[2], 7.0);
        assert_eq!(s.quantities.iter().sum::<f64>(), 7.0);
    }

    #[test]
    fn test_gap_years_are_zero_filled() {
        let records = vec![rec(1, 2015, 12, 1, 1.0), rec(1, 2018, 1, 1, 3.0)];
        let series = SeriesBuilder::default().build(&records);
        let s = series.get(1).unwrap();

        assert_eq!((s.first_year, s.last_year), (2015, 2018));
        assert_eq!(s.len(), 48);
        assert_eq!(s.quantities[11], 1.0);
        assert_eq!(s.quantities[36], 3.0);
        assert_eq!(s.non_zero_count(), 2);
    }

    #[test]
    fn test_sentinel_year_is_dropped() {
        let records = vec![
            rec(1, 2017, 5, 1, 4.0),
            rec(1, 2050, 1, 1, 99.0),
            rec(2, 2050, 6, 1, 10.0),
        ];
        let series = SeriesBuilder::default().build(&records);

        let s = series.get(1).unwrap();
        assert_eq!((s.first_year, s.last_year), (2017, 2017));
        assert_eq!(s.len(), 12);
        // 仅有哨兵年份记录的产品不产生序列
        assert!(series.get(2).is_none());
    }

    #[test]
    fn test_products_are_independent() {
        let records = vec![rec(1, 2016, 1, 1, 1.0), rec(2, 2017, 2, 1, 2.0)];
        let series = SeriesBuilder::default().build(&records);
        assert_eq!(series.product_ids().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(series.get(2).unwrap().first_year, 2017);
    }

    #[test]
    fn test_empty_input() {
        let series = SeriesBuilder::default().build(&Vec::<ShipmentRecord>::new());
        assert!(series.is_empty());
    }
}
