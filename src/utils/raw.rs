use chrono::Duration;
use serde::Serializer;
use serde_json::{Map, Value};
use std::borrow::Cow;

use crate::utils::error::{DecodeError, DecodeResult};

/// 从原始 JSON 对象解码出的记录
///
/// 每种记录类型实现自己的 `decode`：先整理原始字段（展开嵌套对象、补全合成字段），
/// 再按声明逐个读取并校验字段。子记录通过 [`RawObject::record`] 显式递归解码。
pub trait Decode: Sized {
    fn decode(raw: RawObject<'_>) -> DecodeResult<Self>;
}

/// 固定取值的字符串字段（枚举）
pub trait WireToken: Sized {
    /// 允许的原始取值
    const TOKENS: &'static [&'static str];

    fn from_token(token: &str) -> Option<Self>;

    fn token(&self) -> &'static str;
}

/// 解码任意 JSON 值为记录
pub fn decode_value<T: Decode>(value: &Value) -> DecodeResult<T> {
    T::decode(RawObject::root(value)?)
}

const ROOT_PATH: &str = "<root>";

/// 带路径信息的原始 JSON 对象
///
/// 字段查找接受多个候选键名：先是接口返回的原始字段名，再是语义字段名，
/// 第一个存在且不为 null 的键生效。缺失时错误里报告第一个键名。
///
/// 字段借用自原始 JSON，只有整理阶段写入时才拷贝当前这一层。
#[derive(Debug, Clone, PartialEq)]
pub struct RawObject<'a> {
    path: String,
    fields: Cow<'a, Map<String, Value>>,
}

impl<'a> RawObject<'a> {
    pub fn root(value: &'a Value) -> DecodeResult<Self> {
        Self::at(String::new(), value)
    }

    fn at(path: String, value: &'a Value) -> DecodeResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self {
                path,
                fields: Cow::Borrowed(fields),
            }),
            other => {
                let field = if path.is_empty() {
                    ROOT_PATH.to_string()
                } else {
                    path
                };
                Err(type_mismatch(field, "object", other))
            }
        }
    }

    /// 字段的完整路径
    pub fn path_of(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.path, key)
        }
    }

    /// 字段存在且不为 null
    pub fn contains(&self, key: &str) -> bool {
        self.fields.get(key).is_some_and(|v| !v.is_null())
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.fields.to_mut().insert(key.to_string(), value);
    }

    fn lookup(&self, keys: &[&str]) -> Option<(String, &Value)> {
        keys.iter().find_map(|key| match self.fields.get(*key) {
            Some(Value::Null) | None => None,
            Some(value) => Some((self.path_of(key), value)),
        })
    }

    fn require(&self, keys: &[&str]) -> DecodeResult<(String, &Value)> {
        self.lookup(keys).ok_or_else(|| DecodeError::MissingField {
            field: self.path_of(keys.first().copied().unwrap_or_default()),
        })
    }

    /// 把嵌套对象的键合并到当前层，嵌套对象中的键优先
    pub fn unnest(&mut self, key: &str) -> DecodeResult<()> {
        if !self.fields.contains_key(key) {
            return Ok(());
        }
        let fields = self.fields.to_mut();
        match fields.remove(key) {
            None | Some(Value::Null) => Ok(()),
            Some(Value::Object(inner)) => {
                fields.extend(inner);
                Ok(())
            }
            Some(other) => Err(type_mismatch(self.path_of(key), "object", &other)),
        }
    }

    /// 读取 `outer.inner` 处的原始值
    pub fn nested(&self, outer: &str, inner: &str) -> DecodeResult<Value> {
        let (outer_path, outer_value) = self.require(&[outer])?;
        let outer_obj = outer_value
            .as_object()
            .ok_or_else(|| type_mismatch(outer_path.clone(), "object", outer_value))?;
        match outer_obj.get(inner) {
            Some(value) if !value.is_null() => Ok(value.clone()),
            _ => Err(DecodeError::MissingField {
                field: format!("{outer_path}.{inner}"),
            }),
        }
    }

    /// 原始值的拷贝，缺失或为 null 时返回 `Value::Null`
    pub fn raw(&self, key: &str) -> Value {
        self.fields.get(key).cloned().unwrap_or(Value::Null)
    }

    pub fn int(&self, keys: &[&str]) -> DecodeResult<i64> {
        let (field, value) = self.require(keys)?;
        value
            .as_i64()
            .ok_or_else(|| type_mismatch(field, "integer", value))
    }

    /// 有限数字，也接受数字字符串（如 `"0.00"`），`"NaN"`、`"inf"` 不接受
    pub fn lenient_float(&self, keys: &[&str]) -> DecodeResult<f64> {
        let (field, value) = self.require(keys)?;
        let number = match value {
            Value::String(s) => s.trim().parse::<f64>().ok(),
            other => other.as_f64(),
        };
        number
            .filter(|n| n.is_finite())
            .ok_or_else(|| type_mismatch(field, "number", value))
    }

    pub fn boolean(&self, keys: &[&str]) -> DecodeResult<bool> {
        let (field, value) = self.require(keys)?;
        value
            .as_bool()
            .ok_or_else(|| type_mismatch(field, "boolean", value))
    }

    pub fn string(&self, keys: &[&str]) -> DecodeResult<String> {
        let (field, value) = self.require(keys)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| type_mismatch(field, "string", value))
    }

    /// 整数秒表示的时长
    pub fn seconds(&self, keys: &[&str]) -> DecodeResult<Duration> {
        let (field, value) = self.require(keys)?;
        value
            .as_i64()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| type_mismatch(field, "duration in seconds", value))
    }

    /// 整数秒表示的时长，也接受数字字符串（如 `"3600"`）
    pub fn lenient_seconds(&self, keys: &[&str]) -> DecodeResult<Duration> {
        let (field, value) = self.require(keys)?;
        let secs = match value {
            Value::String(s) => s.trim().parse::<i64>().ok(),
            other => other.as_i64(),
        };
        secs.and_then(Duration::try_seconds)
            .ok_or_else(|| type_mismatch(field, "duration in seconds", value))
    }

    pub fn token<T: WireToken>(&self, keys: &[&str]) -> DecodeResult<T> {
        let (field, value) = self.require(keys)?;
        let token = value
            .as_str()
            .ok_or_else(|| type_mismatch(field.clone(), "string", value))?;
        T::from_token(token).ok_or_else(|| DecodeError::UnknownEnumToken {
            field,
            token: token.to_string(),
            allowed: T::TOKENS,
        })
    }

    /// 子对象（不解码），用于整理阶段读取嵌套的原始字段
    pub fn object(&self, keys: &[&str]) -> DecodeResult<RawObject<'_>> {
        let (field, value) = self.require(keys)?;
        RawObject::at(field, value)
    }

    pub fn record<T: Decode>(&self, keys: &[&str]) -> DecodeResult<T> {
        let (field, value) = self.require(keys)?;
        T::decode(RawObject::at(field, value)?)
    }

    pub fn list<T: Decode>(&self, keys: &[&str]) -> DecodeResult<Vec<T>> {
        let (field, value) = self.require(keys)?;
        let items = value
            .as_array()
            .ok_or_else(|| type_mismatch(field.clone(), "array", value))?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| T::decode(RawObject::at(format!("{field}[{i}]"), item)?))
            .collect()
    }

    /// 可选字段：缺失或为 null 时为 `None`，否则按 `read` 解码
    pub fn optional<T>(
        &self,
        keys: &[&str],
        read: impl FnOnce(&Self, &[&str]) -> DecodeResult<T>,
    ) -> DecodeResult<Option<T>> {
        match self.lookup(keys) {
            None => Ok(None),
            Some(_) => read(self, keys).map(Some),
        }
    }
}

pub(crate) fn type_mismatch(field: String, expected: &'static str, value: &Value) -> DecodeError {
    DecodeError::TypeMismatch {
        field,
        expected,
        found: describe(value),
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => format!("string {s:?}"),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

// 序列化辅助：时长写回整数秒，与解码时的格式一致

pub fn serialize_seconds<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(value.num_seconds())
}

pub fn serialize_optional_seconds<S: Serializer>(
    value: &Option<Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(d) => serializer.serialize_some(&d.num_seconds()),
        None => serializer.serialize_none(),
    }
}

pub fn serialize_token<T: WireToken, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.token())
}
