use clap::Parser;
use env_logger::Env;

use raster_lsb::{
    cli::{Cli, Commands},
    handler::{handle_check, handle_decrypt, handle_encrypt, handle_info},
};

/// 程序的主入口点
///
/// 负责初始化日志、解析命令行参数，并根据指定的子命令
/// 将执行分派到相应的处理函数
fn main() -> anyhow::Result<()> {
    // 默认只输出警告，可通过 RUST_LOG 调整
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    // 解析命令行参数
    let cli = Cli::parse();

    // 根据子命令调用相应的处理函数
    match cli.command {
        Commands::Info(args) => handle_info(args),
        Commands::Encrypt(args) => handle_encrypt(args),
        Commands::Decrypt(args) => handle_decrypt(args),
        Commands::Check(args) => handle_check(args),
    }
}
