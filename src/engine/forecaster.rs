// ==========================================
// 出货量预测系统 - 预测器
// ==========================================
// 输入: 预测请求（周期 + 起始年月）+ 选定模型 + 历史序列
// 输出: ForecastOutput（延长序列 + 图表坐标数据）
// ==========================================
// 预测值处理（逐点，按顺序）:
// 1. 负值替换为 negative_stub（默认 0.05）
// 2. max_r2 < min_r2 且 mae > low_confidence_mae 时，本次全部预测点置 0
// 3. 否则保留（可能已替换的）预测值
// ==========================================
// 给定相同的 SelectedModel 与输入，输出完全确定
// ==========================================

use crate::config::ForecastConfig;
use crate::domain::forecast::{ForecastOutput, ForecastRequest};
use crate::domain::series::{ProductSeries, MONTHS_PER_YEAR};
use crate::domain::types::Horizon;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::model_selector::SelectedModel;

/// 年份刻度首个位置（近似落在年中）
pub const YEAR_TICK_OFFSET: i64 = 8;

// ==========================================
// Forecaster - 预测器
// ==========================================
pub struct Forecaster {
    config: ForecastConfig,
}

impl Forecaster {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    /// 生成预测
    ///
    /// # 参数
    /// - `request`: 产品、周期、起始年月
    /// - `selected`: 模型选择结果
    /// - `series`: 该产品的历史月度序列
    ///
    /// # 返回
    /// ForecastOutput；起始年月非法时返回 InvalidInput
    pub fn forecast(
        &self,
        request: &ForecastRequest,
        selected: &SelectedModel,
        series: &ProductSeries,
    ) -> EngineResult<ForecastOutput> {
        self.validate(request, series)?;

        let horizon_months = request.horizon.months();

        // 1. 起始点月序号
        let curr_x = (request.start_year - series.first_year) as i64 * MONTHS_PER_YEAR as i64
            + request.start_month as i64;
        let forecast_x: Vec<i64> = (1..=horizon_months as i64).map(|i| curr_x + i).collect();

        // 2. 预测值处理
        let low_confidence = self.config.is_low_confidence(selected.max_r2, selected.mae);
        if low_confidence {
            tracing::warn!(
                product_id = request.product_id,
                max_r2 = selected.max_r2,
                mae = selected.mae,
                "模型置信度过低，预测值全部置零"
            );
        }
        let forecast_values: Vec<f64> = forecast_x
            .iter()
            .map(|x| self.apply_value_policy(selected.model.predict(*x as f64), low_confidence))
            .collect();

        // 3. 拟合曲线
        let x_values: Vec<f64> = series.non_zero_points().into_iter().map(|(x, _)| x).collect();
        let y_fitted = selected.model.predict_many(&x_values);

        // 4. 主 x 轴与延长序列
        let mut x_axis: Vec<i64> = (1..=series.len() as i64).collect();
        x_axis.extend_from_slice(&forecast_x);

        let mut extended_series = series.quantities.clone();
        extended_series.extend_from_slice(&forecast_values);

        // 5. 年份轴
        let year_labels = Self::year_labels(series, request.start_year, request.horizon);
        let year_tick_positions = Self::year_tick_positions(year_labels.len());

        tracing::debug!(
            product_id = request.product_id,
            horizon_months,
            curr_x,
            forecast = ?forecast_values,
            "预测生成完成"
        );

        Ok(ForecastOutput {
            x_values,
            y_fitted,
            horizon_months,
            x_axis,
            extended_series,
            year_labels,
            year_tick_positions,
        })
    }

    fn validate(&self, request: &ForecastRequest, series: &ProductSeries) -> EngineResult<()> {
        if request.product_id != series.product_id {
            return Err(EngineError::InvalidInput(format!(
                "请求产品 {} 与序列产品 {} 不一致",
                request.product_id, series.product_id
            )));
        }
        if !(1..=12).contains(&request.start_month) {
            return Err(EngineError::InvalidInput(format!(
                "起始月份超出范围: {}",
                request.start_month
            )));
        }
        if request.start_year < series.first_year {
            return Err(EngineError::InvalidInput(format!(
                "起始年份 {} 早于序列首年 {}",
                request.start_year, series.first_year
            )));
        }
        Ok(())
    }

    fn apply_value_policy(&self, raw: f64, low_confidence: bool) -> f64 {
        let clamped = if raw < 0.0 {
            self.config.negative_stub
        } else {
            raw
        };
        if low_confidence {
            0.0
        } else {
            clamped
        }
    }

    /// 年份标签
    ///
    /// 取序列覆盖年份中不晚于起始年的部分；一年期预测时标签延伸到下一年；
    /// 标签不足时逐年补齐
    fn year_labels(series: &ProductSeries, start_year: i32, horizon: Horizon) -> Vec<i32> {
        let mut labels: Vec<i32> = series.years().filter(|y| *y <= start_year).collect();

        let label_year = if horizon == Horizon::OneYear {
            start_year + 1
        } else {
            start_year
        };

        let mut next = labels.last().map(|y| y + 1).unwrap_or(series.first_year);
        while next <= label_year {
            labels.push(next);
            next += 1;
        }
        labels
    }

    fn year_tick_positions(count: usize) -> Vec<i64> {
        (0..count as i64)
            .map(|k| YEAR_TICK_OFFSET + k * MONTHS_PER_YEAR as i64)
            .collect()
    }
}

impl Default for Forecaster {
    fn default() -> Self {
        Self::new(ForecastConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::polynomial::PolynomialModel;

    fn series(first_year: i32, last_year: i32) -> ProductSeries {
        let months = (last_year - first_year + 1) as usize * 12;
        ProductSeries {
            product_id: 5,
            first_year,
            last_year,
            quantities: (0..months).map(|i| (i % 4) as f64).collect(),
        }
    }

    fn line_model(slope: f64, intercept: f64, max_r2: f64, mae: f64) -> SelectedModel {
        let points: Vec<(f64, f64)> = (1..=12)
            .map(|m| (m as f64, slope * m as f64 + intercept))
            .collect();
        SelectedModel::new(5, PolynomialModel::fit(&points, 2).unwrap(), max_r2, mae)
    }

    #[test]
    fn test_forecast_indices_follow_start_month() {
        let s = series(2016, 2017);
        let model = line_model(1.0, 0.0, 0.9, 1.0);
        let req = ForecastRequest::new(5, Horizon::OneQuarter, 2017, 6);

        let out = Forecaster::default().forecast(&req, &model, &s).unwrap();

        // curr_x = 12 + 6 = 18 → 19, 20, 21
        assert_eq!(&out.x_axis[24..], &[19, 20, 21]);
        assert_eq!(out.extended_series.len(), 27);
        for (got, want) in out.forecast_points().iter().zip([19.0, 20.0, 21.0]) {
            assert!((got - want).abs() < 1e-8);
        }
    }

    #[test]
    fn test_negative_prediction_clamped_to_stub() {
        let s = series(2016, 2016);
        let model = line_model(-10.0, 50.0, 0.9, 1.0);
        let req = ForecastRequest::new(5, Horizon::OneMonth, 2016, 12);

        let out = Forecaster::default().forecast(&req, &model, &s).unwrap();
        assert_eq!(out.forecast_points(), &[0.05]);
    }

    #[test]
    fn test_low_confidence_zeroes_everything() {
        let s = series(2016, 2016);
        let model = line_model(3.0, 10.0, 0.1, 150.0);
        let req = ForecastRequest::new(5, Horizon::OneYear, 2016, 12);

        let out = Forecaster::default().forecast(&req, &model, &s).unwrap();
        assert_eq!(out.forecast_points(), &[0.0; 12]);
        // 历史部分不受影响
        assert_eq!(&out.extended_series[..12], &s.quantities[..]);
    }

    #[test]
    fn test_year_labels_extend_for_one_year_horizon() {
        let s = series(2015, 2018);
        assert_eq!(
            Forecaster::year_labels(&s, 2018, Horizon::OneMonth),
            vec![2015, 2016, 2017, 2018]
        );
        assert_eq!(
            Forecaster::year_labels(&s, 2018, Horizon::OneYear),
            vec![2015, 2016, 2017, 2018, 2019]
        );
        assert_eq!(
            Forecaster::year_labels(&s, 2016, Horizon::OneQuarter),
            vec![2015, 2016]
        );
        assert_eq!(
            Forecaster::year_labels(&s, 2020, Horizon::OneQuarter),
            vec![2015, 2016, 2017, 2018, 2019, 2020]
        );
    }

    #[test]
    fn test_year_tick_positions() {
        assert_eq!(Forecaster::year_tick_positions(3), vec![8, 20, 32]);
        assert!(Forecaster::year_tick_positions(0).is_empty());
    }

    #[test]
    fn test_invalid_start_rejected() {
        let s = series(2016, 2017);
        let model = line_model(1.0, 0.0, 0.9, 1.0);
        let f = Forecaster::default();

        let bad_month = ForecastRequest::new(5, Horizon::OneMonth, 2017, 13);
        assert!(matches!(
            f.forecast(&bad_month, &model, &s),
            Err(EngineError::InvalidInput(_))
        ));

        let too_early = ForecastRequest::new(5, Horizon::OneMonth, 2015, 3);
        assert!(matches!(
            f.forecast(&too_early, &model, &s),
            Err(EngineError::InvalidInput(_))
        ));

        let wrong_product = ForecastRequest::new(6, Horizon::OneMonth, 2017, 3);
        assert!(f.forecast(&wrong_product, &model, &s).is_err());
    }
}
