// ==========================================
// 出货量预测系统 - 多项式回归
// ==========================================
// 单变量多项式最小二乘拟合:
// - x 先归一化到 [-1, 1]，避免高次幂导致的病态矩阵
// - 使用 SVD 求解，样本数少于系数个数时给出最小范数解
// ==========================================

use crate::engine::error::{EngineError, EngineResult};
use nalgebra::{DMatrix, DVector, SVD};
use serde::{Deserialize, Serialize};

/// 已拟合的多项式模型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolynomialModel {
    degree: usize,
    /// 归一化坐标下的系数，按幂次升序
    coefficients: Vec<f64>,
    x_center: f64,
    x_scale: f64,
}

impl PolynomialModel {
    /// 以指定次数拟合 (x, y) 点集
    pub fn fit(points: &[(f64, f64)], degree: usize) -> EngineResult<Self> {
        if points.is_empty() {
            return Err(EngineError::NumericalError("拟合点集为空".to_string()));
        }

        let (x_min, x_max) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (x, _)| {
                (lo.min(*x), hi.max(*x))
            });
        let x_center = (x_min + x_max) / 2.0;
        let half_range = (x_max - x_min) / 2.0;
        let x_scale = if half_range > 0.0 { half_range } else { 1.0 };

        let rows = points.len();
        let cols = degree + 1;
        let mut matrix = DMatrix::<f64>::zeros(rows, cols);
        for (i, (x, _)) in points.iter().enumerate() {
            let t = (x - x_center) / x_scale;
            let mut power = 1.0;
            for j in 0..cols {
                matrix[(i, j)] = power;
                power *= t;
            }
        }
        let b = DVector::from_iterator(rows, points.iter().map(|(_, y)| *y));

        let decomp = SVD::new(matrix, true, true);
        // 截断阈值 ≈ 机器精度 × 维度 × 最大奇异值
        let sigma_max = decomp.singular_values.max();
        let eps = f64::EPSILON * rows.max(cols) as f64 * sigma_max;
        let solution = decomp
            .solve(&b, eps)
            .map_err(|e| EngineError::NumericalError(e.to_string()))?;

        let coefficients: Vec<f64> = solution.iter().copied().collect();
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(EngineError::NumericalError(format!(
                "{} 次多项式系数非有限值",
                degree
            )));
        }

        Ok(Self {
            degree,
            coefficients,
            x_center,
            x_scale,
        })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// 在 x 处求值（Horner）
    pub fn predict(&self, x: f64) -> f64 {
        let t = (x - self.x_center) / self.x_scale;
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, c| acc * t + c)
    }

    pub fn predict_many(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|x| self.predict(*x)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_fit_exact_quadratic() {
        let points: Vec<(f64, f64)> = (1..=20)
            .map(|m| {
                let x = m as f64;
                (x, 0.5 * x * x - 3.0 * x + 10.0)
            })
            .collect();
        let model = PolynomialModel::fit(&points, 2).unwrap();

        for (x, y) in &points {
            assert!(approx(model.predict(*x), *y, 1e-8));
        }
        // 外推
        assert!(approx(model.predict(25.0), 0.5 * 625.0 - 75.0 + 10.0, 1e-6));
    }

    #[test]
    fn test_high_degree_on_linear_data_is_stable() {
        let points: Vec<(f64, f64)> = (1..=60)
            .map(|m| (m as f64, 2.0 * m as f64 + 3.0))
            .collect();
        let model = PolynomialModel::fit(&points, 8).unwrap();
        for (x, y) in &points {
            assert!(approx(model.predict(*x), *y, 1e-6));
        }
    }

    #[test]
    fn test_underdetermined_fit_interpolates() {
        // 5 个点、9 个系数：最小范数解仍穿过全部样本
        let points = vec![(1.0, 4.0), (2.0, 1.0), (4.0, 7.0), (7.0, 2.0), (9.0, 5.0)];
        let model = PolynomialModel::fit(&points, 8).unwrap();
        for (x, y) in &points {
            assert!(approx(model.predict(*x), *y, 1e-6));
        }
    }

    #[test]
    fn test_single_point() {
        let model = PolynomialModel::fit(&[(3.0, 6.0)], 2).unwrap();
        assert!(approx(model.predict(3.0), 6.0, 1e-9));
    }

    #[test]
    fn test_empty_points_rejected() {
        assert!(PolynomialModel::fit(&[], 2).is_err());
    }
}
