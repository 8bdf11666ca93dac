// ==========================================
// 出货量预测系统 - 回归评价指标
// ==========================================
// RMSE / R² / MAE，口径与常见机器学习库一致
// ==========================================

use crate::engine::error::{EngineError, EngineResult};

fn check_lengths(y_true: &[f64], y_pred: &[f64]) -> EngineResult<()> {
    if y_true.len() != y_pred.len() {
        return Err(EngineError::DimensionMismatch {
            expected: y_true.len(),
            actual: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Err(EngineError::NumericalError("空数据无法计算指标".to_string()));
    }
    Ok(())
}

/// 均方误差
pub fn mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> EngineResult<f64> {
    check_lengths(y_true, y_pred)?;
    let sum: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p) * (t - p))
        .sum();
    Ok(sum / y_true.len() as f64)
}

/// 均方根误差
pub fn root_mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> EngineResult<f64> {
    Ok(mean_squared_error(y_true, y_pred)?.sqrt())
}

/// 平均绝对误差
pub fn mean_absolute_error(y_true: &[f64], y_pred: &[f64]) -> EngineResult<f64> {
    check_lengths(y_true, y_pred)?;
    let sum: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).abs()).sum();
    Ok(sum / y_true.len() as f64)
}

/// 决定系数 R²（可为负）
///
/// 真实值全部相同时：完全命中返回 1.0，否则返回 0.0
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> EngineResult<f64> {
    check_lengths(y_true, y_pred)?;

    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean) * (t - mean)).sum();
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p) * (t - p))
        .sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}
