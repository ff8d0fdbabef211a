use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use env_logger::Env;
use std::path::PathBuf;

use hoyo_notes::config::{AppConfig, CONFIG};
use hoyo_notes::models::Game;
use hoyo_notes::services::NotesService;
use hoyo_notes::utils::clock::SystemClock;
use hoyo_notes::utils::notes_formatter::format_notes;

#[derive(Parser)]
#[command(name = "hoyo-notes", version, about = "解析米游社/HoYoLAB 实时便笺数据")]
struct Cli {
    #[arg(long, global = true, help = "JSON 配置文件路径，未指定时读取环境变量")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 输出便笺摘要，回满/刷新时间按当前时间计算
    Show {
        #[arg(long, help = "游戏: zzz | genshin")]
        game: Option<Game>,
        #[arg(help = "便笺 JSON 文件，省略或为 - 时读取标准输入")]
        path: Option<PathBuf>,
    },
    /// 输出规范化后的 JSON
    Normalize {
        #[arg(long, help = "游戏: zzz | genshin")]
        game: Option<Game>,
        #[arg(long, help = "输出单行 JSON")]
        compact: bool,
        #[arg(help = "便笺 JSON 文件，省略或为 - 时读取标准输入")]
        path: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 加载.env文件
    dotenv().ok();

    // 配置文件在日志初始化之前读取，以便使用其中的日志级别
    let file_config = cli
        .config
        .as_ref()
        .map(AppConfig::from_file)
        .transpose()?;
    let log_level = file_config
        .as_ref()
        .map(|c| c.log_level.clone())
        .unwrap_or_else(|| "info".to_string());

    // 初始化日志
    env_logger::init_from_env(Env::default().default_filter_or(log_level));

    let config = file_config.unwrap_or_else(|| CONFIG.as_ref().clone());
    log::debug!("当前配置: {:?}", config);

    let service = NotesService::new();

    match cli.command {
        Command::Show { game, path } => {
            let game = game.unwrap_or(config.default_game);
            let payload = service.read_payload(path.as_deref())?;
            let notes = service
                .decode(game, payload)
                .with_context(|| format!("无法解码 {game} 便笺"))?;
            println!(
                "{}",
                format_notes(&notes, &SystemClock, &config.display_offset())
            );
        }
        Command::Normalize {
            game,
            compact,
            path,
        } => {
            let game: Game = game.unwrap_or(config.default_game);
            let payload = service.read_payload(path.as_deref())?;
            let notes = service
                .decode(game, payload)
                .with_context(|| format!("无法解码 {game} 便笺"))?;
            let output = if compact {
                serde_json::to_string(&notes)?
            } else {
                serde_json::to_string_pretty(&notes)?
            };
            println!("{output}");
        }
    }

    Ok(())
}
