use thiserror::Error;

/// 解码失败
/// 字段路径使用点号分隔，列表元素写作 `[n]`，例如 `expeditions[0].status`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("缺少必需字段: {field}")]
    MissingField { field: String },

    #[error("字段类型不匹配: {field}, 期望 {expected}, 实际 {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: String,
    },

    #[error("未知的枚举值: {field} = {token:?}, 允许的值: {allowed:?}")]
    UnknownEnumToken {
        field: String,
        token: String,
        allowed: &'static [&'static str],
    },
}

impl DecodeError {
    /// 出错字段的完整路径
    pub fn field(&self) -> &str {
        match self {
            DecodeError::MissingField { field }
            | DecodeError::TypeMismatch { field, .. }
            | DecodeError::UnknownEnumToken { field, .. } => field,
        }
    }

    /// 错误类别，用于日志和命令行输出
    pub fn kind(&self) -> &'static str {
        match self {
            DecodeError::MissingField { .. } => "missing_field",
            DecodeError::TypeMismatch { .. } => "type_mismatch",
            DecodeError::UnknownEnumToken { .. } => "unknown_enum_token",
        }
    }
}

pub type DecodeResult<T> = Result<T, DecodeError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("便笺解码失败: {0}")]
    DecodeError(#[from] DecodeError),

    #[error("IO错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serde JSON错误: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("米游社API错误 (retcode {retcode}): {message}")]
    ApiError { retcode: i64, message: String },

    #[error("错误的响应: {0}")]
    BadResponse(String),

    #[error("配置错误: {0}")]
    ConfigError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::DecodeError(e) => e.kind(),
            AppError::IoError(_) => "io_error",
            AppError::SerdeJsonError(_) => "serialization_error",
            AppError::ApiError { .. } => "api_error",
            AppError::BadResponse(_) => "bad_response",
            AppError::ConfigError(_) => "configuration_error",
        }
    }
}
