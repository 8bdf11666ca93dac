// ==========================================
// 出货量预测系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 低置信度模型不是错误，而是预测值置零的策略分支
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    // ===== 数据不足 =====
    #[error("数据不足: product_id={product_id}, 非零月份 {actual} 个，需多于 {required} 个")]
    InsufficientData {
        product_id: i64,
        required: usize,
        actual: usize,
    },

    #[error("产品不存在: product_id={0}")]
    ProductNotFound(i64),

    // ===== 输入错误 =====
    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ===== 数值计算错误 =====
    #[error("长度不一致: 真实值 {expected} 个, 预测值 {actual} 个")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("数值计算失败: {0}")]
    NumericalError(String),

    // ===== 快照编解码错误 =====
    #[error("快照编码失败: {0}")]
    SnapshotEncodeError(String),

    #[error("快照已损坏: {0}")]
    CorruptSnapshot(String),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
