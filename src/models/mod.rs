pub mod envelope;
pub mod genshin_notes;
pub mod zzz_notes;

pub use envelope::*;
pub use genshin_notes::*;
pub use zzz_notes::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 便笺所属的游戏
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Game {
    /// 绝区零
    Zzz,
    /// 原神
    Genshin,
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Game::Zzz => write!(f, "zzz"),
            Game::Genshin => write!(f, "genshin"),
        }
    }
}

impl FromStr for Game {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zzz" | "zenless" => Ok(Game::Zzz),
            "genshin" | "gi" => Ok(Game::Genshin),
            other => Err(format!("未知的游戏: {other}，可选值: zzz, genshin")),
        }
    }
}

/// 解码后的便笺
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DecodedNotes {
    Zzz(ZzzNotes),
    Genshin(GenshinNotes),
}

impl DecodedNotes {
    pub fn game(&self) -> Game {
        match self {
            DecodedNotes::Zzz(_) => Game::Zzz,
            DecodedNotes::Genshin(_) => Game::Genshin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_from_str() {
        assert_eq!("zzz".parse::<Game>().unwrap(), Game::Zzz);
        assert_eq!(" Genshin ".parse::<Game>().unwrap(), Game::Genshin);
        assert!("starrail".parse::<Game>().is_err());
        assert_eq!(Game::Genshin.to_string(), "genshin");
    }

    #[test]
    fn test_decoded_notes_serializes_inner_record() {
        let notes: ZzzNotes = crate::utils::raw::decode_value(&serde_json::json!({
            "energy": {"progress": {"max": 240, "current": 10}, "restore": 60},
            "vitality": {"max": 400, "current": 0},
            "vhs_sale": {"sale_state": "SaleStateNo"},
            "card_sign": "CardSignNotDone"
        }))
        .unwrap();
        let decoded = DecodedNotes::Zzz(notes);
        assert_eq!(decoded.game(), Game::Zzz);

        let encoded = serde_json::to_value(&decoded).unwrap();
        assert_eq!(encoded["video_store_state"], serde_json::json!("SaleStateNo"));
        assert!(encoded["weekly_task"].is_null());
    }
}
