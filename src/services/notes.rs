use serde_json::Value;
use std::io::Read;
use std::path::Path;

use crate::models::{ApiEnvelope, DecodedNotes, Game, GenshinNotes, ZzzNotes};
use crate::utils::error::{AppError, AppResult};
use crate::utils::raw::decode_value;

// 便笺服务，负责读取原始数据、拆响应外壳并解码
#[derive(Debug, Clone, Default)]
pub struct NotesService;

impl NotesService {
    pub fn new() -> Self {
        Self
    }

    /// 读取原始 JSON，`None` 或 `-` 表示标准输入
    pub fn read_payload(&self, path: Option<&Path>) -> AppResult<Value> {
        let mut contents = String::new();
        match path {
            Some(p) if p != Path::new("-") => {
                log::debug!("从文件读取便笺数据: {}", p.display());
                contents = std::fs::read_to_string(p)?;
            }
            _ => {
                log::debug!("从标准输入读取便笺数据");
                std::io::stdin().read_to_string(&mut contents)?;
            }
        }

        if contents.trim().is_empty() {
            return Err(AppError::BadResponse("输入为空".to_string()));
        }

        Ok(serde_json::from_str(&contents)?)
    }

    /// 如果是完整的接口响应，取出其中的 `data`
    pub fn unwrap_envelope(&self, payload: Value) -> AppResult<Value> {
        if !ApiEnvelope::is_envelope(&payload) {
            return Ok(payload);
        }

        let envelope: ApiEnvelope = serde_json::from_value(payload)?;
        log::debug!("检测到响应外壳: retcode={}, message={}", envelope.retcode, envelope.message);
        envelope.into_data().inspect_err(|e| {
            log::warn!("接口返回错误，无法解码便笺: {e}");
        })
    }

    pub fn decode_zzz(&self, payload: Value) -> AppResult<ZzzNotes> {
        let data = self.unwrap_envelope(payload)?;
        let notes = decode_value::<ZzzNotes>(&data)?;
        log::debug!(
            "绝区零便笺解码完成: 电量 {}/{}",
            notes.battery_charge.current,
            notes.battery_charge.max
        );
        Ok(notes)
    }

    pub fn decode_genshin(&self, payload: Value) -> AppResult<GenshinNotes> {
        let data = self.unwrap_envelope(payload)?;
        let notes = decode_value::<GenshinNotes>(&data)?;
        log::debug!(
            "原神便笺解码完成: 树脂 {}/{}, 派遣 {} 个",
            notes.current_resin,
            notes.max_resin,
            notes.expeditions.len()
        );
        Ok(notes)
    }

    pub fn decode(&self, game: Game, payload: Value) -> AppResult<DecodedNotes> {
        log::debug!("开始解码 {game} 便笺");
        let decoded = match game {
            Game::Zzz => self.decode_zzz(payload).map(DecodedNotes::Zzz),
            Game::Genshin => self.decode_genshin(payload).map(DecodedNotes::Genshin),
        };

        if let Err(AppError::DecodeError(e)) = &decoded {
            log::error!("{game} 便笺解码失败 [{}] 字段 {}: {e}", e.kind(), e.field());
        }
        decoded
    }
}
