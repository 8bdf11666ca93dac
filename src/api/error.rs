// ==========================================
// 出货量预测系统 - API层错误类型
// ==========================================
// 职责: 将引擎、仓储、导入层的错误转换为面向调用方的错误
// ==========================================

use crate::engine::error::EngineError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 请求错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 建模错误
    // ==========================================
    #[error("数据不足: product_id={product_id}, 非零月份 {actual} 个，需多于 {required} 个")]
    InsufficientData {
        product_id: i64,
        required: usize,
        actual: usize,
    },

    #[error("模型计算失败: {0}")]
    ModelError(String),

    // ==========================================
    // 存储错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("存储读写失败: {0}")]
    StorageError(String),

    #[error("快照已损坏: {0}")]
    CorruptSnapshot(String),

    // ==========================================
    // 导入与配置错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("配置加载失败: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::DatabaseError(format!("唯一约束违反: {}", msg))
            }

            RepositoryError::StorageIo(e) => ApiError::StorageError(e.to_string()),
            RepositoryError::CsvWriteError(msg) => ApiError::StorageError(msg),
            RepositoryError::CorruptSnapshot(msg) => ApiError::CorruptSnapshot(msg),

            RepositoryError::FieldValueError { field, message } => {
                ApiError::DatabaseError(format!("字段{}错误: {}", field, message))
            }

            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InsufficientData {
                product_id,
                required,
                actual,
            } => ApiError::InsufficientData {
                product_id,
                required,
                actual,
            },
            EngineError::ProductNotFound(id) => ApiError::NotFound(format!("产品 {} 无出货记录", id)),
            EngineError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            EngineError::CorruptSnapshot(msg) => ApiError::CorruptSnapshot(msg),
            other @ (EngineError::DimensionMismatch { .. }
            | EngineError::NumericalError(_)
            | EngineError::SnapshotEncodeError(_)) => ApiError::ModelError(other.to_string()),
            EngineError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::FileNotFound(path) => ApiError::NotFound(format!("文件 {}", path)),
            ImportError::Other(err) => ApiError::Other(err),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
