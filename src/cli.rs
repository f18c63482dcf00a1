//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 每个子命令同时可以通过单字母旗标调用，例如 `raster_lsb -e image.bmp "Hi"`。

use crate::codec::{CodecOptions, Termination};
use crate::constants::DEFAULT_MARKER_FILE;
use crate::format::RowPadding;
use crate::marker::MarkerRecord;
use clap::{Args, Parser, ValueEnum};
use std::path::PathBuf;

/// 一款基于 LSB (最低有效位) 隐写术的命令行工具，用于在 24 位 BMP 和二进制 PPM 图像中隐藏或恢复文本。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款基于 LSB (最低有效位) 隐写术的命令行工具，用于在 24 位 BMP 和二进制 PPM 图像中隐藏或恢复文本。"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：info (信息)、encrypt (隐藏)、decrypt (恢复) 和 check (容量检查)。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 显示图像头部信息与隐写容量。
    #[command(short_flag = 'i', long_flag = "info")]
    Info(InfoArgs),

    /// 把文本隐藏到图像中。
    #[command(short_flag = 'e', long_flag = "encrypt")]
    Encrypt(EncryptArgs),

    /// 从经过隐写的图像中恢复隐藏的文本。
    #[command(short_flag = 'd', long_flag = "decrypt")]
    Decrypt(DecryptArgs),

    /// 检查文本能否放入图像。
    #[command(short_flag = 'c', long_flag = "check")]
    Check(CheckArgs),
}

/// 'info' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// 图像文件路径 (.bmp 或 .ppm)。
    pub image: PathBuf,
}

/// 'encrypt' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct EncryptArgs {
    /// 用于隐写的输入图像文件路径 (.bmp 或 .ppm)。
    pub image: PathBuf,

    /// 要隐藏的文本。
    #[arg(required_unless_present = "text")]
    pub message: Option<String>,

    /// 从文件读取要隐藏的文本，代替命令行中的文本。
    #[arg(short, long, conflicts_with = "message")]
    pub text: Option<PathBuf>,

    /// 结果图像的输出路径。默认为输入文件旁的 `doctored_<文件名>`。
    #[arg(long)]
    pub dest: Option<PathBuf>,

    /// 输出文件已存在时直接覆盖。
    #[arg(short, long)]
    pub force: bool,

    #[command(flatten)]
    pub codec: CodecArgs,
}

/// 'decrypt' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct DecryptArgs {
    /// 已隐藏文本数据的图像文件路径。
    pub image: PathBuf,

    /// 把恢复的文本另存到该文件。
    #[arg(short, long)]
    pub text: Option<PathBuf>,

    /// 输出文件已存在时直接覆盖。
    #[arg(short, long)]
    pub force: bool,

    #[command(flatten)]
    pub codec: CodecArgs,
}

/// 'check' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// 图像文件路径 (.bmp 或 .ppm)。
    pub image: PathBuf,

    /// 待检查的文本。
    pub message: String,

    #[command(flatten)]
    pub codec: CodecArgs,
}

/// 负载结束位置的记录方式。
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TerminationArg {
    /// 在图像中写入 32 位长度前缀。
    #[default]
    Embedded,
    /// 把停止位置写入外部标记文件。
    Marker,
}

/// BMP 行填充方式。
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PaddingArg {
    /// 每行对齐到 4 字节 (标准 BMP)。
    #[default]
    Aligned,
    /// 行之间没有填充。
    Packed,
}

/// 编码与解码共用的参数。
#[derive(Args, Debug, Clone)]
pub struct CodecArgs {
    /// 负载结束位置的记录方式，编码与解码必须一致。
    #[arg(long, value_enum, default_value_t = TerminationArg::Embedded)]
    pub termination: TerminationArg,

    /// 终止标记文件路径 (仅用于 marker 模式)。
    #[arg(long, env = "RASTER_LSB_MARKER", default_value = DEFAULT_MARKER_FILE)]
    pub marker: PathBuf,

    /// BMP 像素行的填充方式。
    #[arg(long, value_enum, default_value_t = PaddingArg::Aligned)]
    pub row_padding: PaddingArg,
}

impl Default for CodecArgs {
    fn default() -> Self {
        CodecArgs {
            termination: TerminationArg::default(),
            marker: PathBuf::from(DEFAULT_MARKER_FILE),
            row_padding: PaddingArg::default(),
        }
    }
}

impl From<TerminationArg> for Termination {
    fn from(arg: TerminationArg) -> Self {
        match arg {
            TerminationArg::Embedded => Termination::Embedded,
            TerminationArg::Marker => Termination::Marker,
        }
    }
}

impl From<PaddingArg> for RowPadding {
    fn from(arg: PaddingArg) -> Self {
        match arg {
            PaddingArg::Aligned => RowPadding::Aligned,
            PaddingArg::Packed => RowPadding::Packed,
        }
    }
}

impl From<&CodecArgs> for CodecOptions {
    fn from(args: &CodecArgs) -> Self {
        CodecOptions {
            termination: args.termination.into(),
            padding: args.row_padding.into(),
            marker: MarkerRecord::new(&args.marker),
        }
    }
}
