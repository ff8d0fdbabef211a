use chrono::{FixedOffset, Local, Offset};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use crate::models::Game;
use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub log_level: String,
    /// 未指定 `--game` 时使用的游戏
    pub default_game: Game,
    /// 展示派生时间时使用的时区偏移（分钟），为空时使用本机时区
    pub utc_offset_minutes: Option<i32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            default_game: Game::Zzz,
            utc_offset_minutes: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 按变量名取值构造配置，无效的值回退到默认值
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let log_level = lookup("RUST_LOG").unwrap_or(defaults.log_level);

        let default_game = match lookup("NOTES_DEFAULT_GAME") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                log::warn!("NOTES_DEFAULT_GAME 无效，使用默认值 {}: {e}", defaults.default_game);
                defaults.default_game
            }),
            None => defaults.default_game,
        };

        let utc_offset_minutes = lookup("NOTES_UTC_OFFSET_MINUTES").and_then(|raw| {
            match raw.trim().parse::<i32>() {
                Ok(minutes) if offset_from_minutes(minutes).is_some() => Some(minutes),
                _ => {
                    log::warn!("NOTES_UTC_OFFSET_MINUTES 无效，使用本机时区: {raw}");
                    None
                }
            }
        });

        Self {
            log_level,
            default_game,
            utc_offset_minutes,
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let mut file = File::open(path)
            .map_err(|e| AppError::ConfigError(format!("无法打开配置文件: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| AppError::ConfigError(format!("读取配置文件失败: {e}")))?;

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| AppError::ConfigError(format!("解析配置文件失败: {e}")))?;

        if let Some(minutes) = config.utc_offset_minutes {
            if offset_from_minutes(minutes).is_none() {
                return Err(AppError::ConfigError(format!(
                    "时区偏移超出范围: {minutes} 分钟"
                )));
            }
        }

        Ok(config)
    }

    /// 展示用的时区偏移
    pub fn display_offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .and_then(offset_from_minutes)
            .unwrap_or_else(|| Local::now().offset().fix())
    }
}

fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    minutes.checked_mul(60).and_then(FixedOffset::east_opt)
}

lazy_static! {
    pub static ref CONFIG: Arc<AppConfig> = Arc::new(AppConfig::from_env());
}
