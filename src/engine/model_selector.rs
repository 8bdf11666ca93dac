// ==========================================
// 出货量预测系统 - 模型选择器
// ==========================================
// 输入: 单个产品的月度序列
// 输出: SelectedModel（最优次数 + 全量重拟合模型 + max_r2 + mae）
// ==========================================
// 流程:
// 1. 取非零月份 (月序号, 数量)
// 2. 非零点数不足 → InsufficientData
// 3. 按种子打乱并 80/20 划分训练/测试集
// 4. 各候选次数并行评估（互不共享可变状态）
// 5. 取测试集 R² 最大者；并列时保留较小次数
// 6. 以最优次数在全部非零点上重新拟合
// ==========================================
// 结果按值返回，不在引擎实例上缓存任何拟合状态
// ==========================================

use crate::config::ForecastConfig;
use crate::domain::series::{MonthlySeries, ProductSeries};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::metrics::{mean_absolute_error, r2_score, root_mean_squared_error};
use crate::engine::polynomial::PolynomialModel;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 单个候选次数的评估结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub degree: usize,
    pub train_rmse: f64,
    pub train_r2: f64,
    pub test_rmse: f64,
    pub test_r2: f64,
    pub test_mae: f64,
}

/// 选定模型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedModel {
    pub product_id: i64,
    pub degree: usize,
    /// 全部非零点上重拟合的模型
    pub model: PolynomialModel,
    /// 最优次数的测试集 R²
    pub max_r2: f64,
    /// 最优次数的测试集 MAE
    pub mae: f64,
    /// 各候选次数评估明细（次数升序）
    pub evaluations: Vec<FitResult>,
}

impl SelectedModel {
    /// 直接由已拟合模型构造（评估明细为空）
    pub fn new(product_id: i64, model: PolynomialModel, max_r2: f64, mae: f64) -> Self {
        Self {
            product_id,
            degree: model.degree(),
            model,
            max_r2,
            mae,
            evaluations: Vec::new(),
        }
    }
}

// ==========================================
// ModelSelector - 模型选择器
// ==========================================
pub struct ModelSelector {
    config: ForecastConfig,
}

impl ModelSelector {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// 产品是否具备建模条件（非零月份数严格大于门槛）
    pub fn is_qualifying(&self, series: &ProductSeries) -> bool {
        series.non_zero_count() > self.config.min_data_pts
    }

    /// 具备建模条件的产品集合
    pub fn qualifying_products(&self, series: &MonthlySeries) -> BTreeSet<i64> {
        series
            .iter()
            .filter(|s| self.is_qualifying(s))
            .map(|s| s.product_id)
            .collect()
    }

    /// 使用配置中的划分种子选择模型
    pub fn select(&self, product_id: i64, series: &MonthlySeries) -> EngineResult<SelectedModel> {
        self.select_with_seed(product_id, series, self.config.split_seed)
    }

    /// 使用指定划分种子选择模型
    pub fn select_with_seed(
        &self,
        product_id: i64,
        series: &MonthlySeries,
        seed: u64,
    ) -> EngineResult<SelectedModel> {
        let product = series
            .get(product_id)
            .ok_or(EngineError::ProductNotFound(product_id))?;

        // 1. 非零点
        let points = product.non_zero_points();

        // 2. 数据量校验
        if points.len() <= self.config.min_data_pts {
            return Err(EngineError::InsufficientData {
                product_id,
                required: self.config.min_data_pts,
                actual: points.len(),
            });
        }

        // 3. 训练/测试划分
        let (train, test) = self.split(&points, seed);

        // 4. 并行评估各候选次数
        let evaluations: Vec<FitResult> = self
            .config
            .degree_range()
            .into_par_iter()
            .map(|degree| (degree, Self::evaluate_degree(&train, &test, degree)))
            .collect::<Vec<_>>()
            .into_iter()
            .filter_map(|(degree, result)| match result {
                Ok(fit) => {
                    tracing::debug!(
                        product_id,
                        degree,
                        train_rmse = fit.train_rmse,
                        train_r2 = fit.train_r2,
                        test_rmse = fit.test_rmse,
                        test_r2 = fit.test_r2,
                        test_mae = fit.test_mae,
                        "候选次数评估完成"
                    );
                    Some(fit)
                }
                Err(e) => {
                    tracing::warn!(product_id, degree, error = %e, "候选次数评估失败，跳过");
                    None
                }
            })
            .collect();

        // 5. 选择最优次数（默认为最小候选次数）
        let best = Self::choose_best(&evaluations, self.config.min_degree).map_err(|e| {
            tracing::error!(product_id, error = %e, "模型选择失败");
            e
        })?;
        let (degree, max_r2, mae) = (best.degree, best.test_r2, best.test_mae);

        // 6. 全量重拟合
        let model = PolynomialModel::fit(&points, degree)?;

        tracing::info!(
            product_id,
            degree,
            max_r2,
            mae,
            points = points.len(),
            train = train.len(),
            test = test.len(),
            "模型选择完成"
        );

        Ok(SelectedModel {
            product_id,
            degree,
            model,
            max_r2,
            mae,
            evaluations,
        })
    }

    /// 打乱后按比例划分，测试集大小向上取整
    fn split(&self, points: &[(f64, f64)], seed: u64) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
        let n = points.len();
        let test_count = ((n as f64) * self.config.test_ratio).ceil() as usize;
        let test_count = test_count.clamp(1, n.saturating_sub(1).max(1));

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let test = indices[..test_count].iter().map(|&i| points[i]).collect();
        let train = indices[test_count..].iter().map(|&i| points[i]).collect();
        (train, test)
    }

    /// 评估单个候选次数（纯函数）
    fn evaluate_degree(
        train: &[(f64, f64)],
        test: &[(f64, f64)],
        degree: usize,
    ) -> EngineResult<FitResult> {
        let model = PolynomialModel::fit(train, degree)?;

        let (train_x, train_y): (Vec<f64>, Vec<f64>) = train.iter().copied().unzip();
        let (test_x, test_y): (Vec<f64>, Vec<f64>) = test.iter().copied().unzip();

        let train_pred = model.predict_many(&train_x);
        let test_pred = model.predict_many(&test_x);

        Ok(FitResult {
            degree,
            train_rmse: root_mean_squared_error(&train_y, &train_pred)?,
            train_r2: r2_score(&train_y, &train_pred)?,
            test_rmse: root_mean_squared_error(&test_y, &test_pred)?,
            test_r2: r2_score(&test_y, &test_pred)?,
            test_mae: mean_absolute_error(&test_y, &test_pred)?,
        })
    }

    /// 以次数升序扫描，只有严格更大的测试集 R² 才替换
    ///
    /// 默认次数的评估必须成功，否则返回 NumericalError（不静默改用更高次数）
    pub fn choose_best(
        evaluations: &[FitResult],
        default_degree: usize,
    ) -> EngineResult<&FitResult> {
        let mut best = evaluations
            .iter()
            .find(|fit| fit.degree == default_degree)
            .ok_or_else(|| {
                EngineError::NumericalError(format!("默认次数 {} 拟合失败", default_degree))
            })?;
        for fit in evaluations.iter().filter(|fit| fit.degree > default_degree) {
            if fit.test_r2 > best.test_r2 {
                best = fit;
            }
        }
        Ok(best)
    }
}

impl Default for ModelSelector {
    fn default() -> Self {
        Self::new(ForecastConfig::default())
    }
}
