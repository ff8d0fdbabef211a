use serde::Deserialize;
use serde_json::Value;

use crate::utils::error::{AppError, AppResult};

/// 米游社/HoYoLAB 接口的统一响应外壳
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    pub retcode: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl ApiEnvelope {
    /// 带 `retcode` 字段的对象视为响应外壳，否则视为已经取出的 `data`
    pub fn is_envelope(payload: &Value) -> bool {
        payload.get("retcode").is_some()
    }

    /// 取出 `data`，`retcode` 非 0 时返回接口错误
    pub fn into_data(self) -> AppResult<Value> {
        if self.retcode != 0 {
            return Err(AppError::ApiError {
                retcode: self.retcode,
                message: self.message,
            });
        }

        match self.data {
            Some(Value::Null) | None => Err(AppError::BadResponse("响应中缺少 data 字段".to_string())),
            Some(data) => Ok(data),
        }
    }
}
