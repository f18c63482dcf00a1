//! # 命令处理逻辑模块
//!
//! 包含处理 `info`、`encrypt`、`decrypt` 和 `check` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、调用编解码流程以及向用户报告结果。

use crate::capacity::{capacity_bytes, usable_bits};
use crate::cli::{CheckArgs, DecryptArgs, EncryptArgs, InfoArgs};
use crate::codec::{CodecOptions, Termination, check_file, decode_file, encode_file, inspect_file};
use crate::constants::DOCTORED_PREFIX;
use crate::container::RasterHeader;
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// 未指定输出路径时，在输入文件旁生成 `doctored_<文件名>`。
fn default_dest(image: &Path) -> PathBuf {
    let name = image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    image.with_file_name(format!("{DOCTORED_PREFIX}{name}"))
}

/// 输出文件已存在且未指定 `--force` 时拒绝继续。
fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

/// 处理 'Info' 命令的执行逻辑。
///
/// 只解析头部，打印尺寸、偏移以及两种终止策略下的容量。
pub fn handle_info(args: InfoArgs) -> Result<()> {
    let info = inspect_file(&args.image).with_context(|| {
        format!(
            "Unable to read image header: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;
    let header = &info.header;

    println!("Format: {}", header.format().name().green().bold());
    println!("File Size: {} bytes", info.file_size);
    println!("Image Width: {}", header.width());
    println!("Image Height: {}", header.height());
    println!("Pixel Data Offset: {}", header.pixel_offset());
    match header {
        RasterHeader::Bmp(bmp) => {
            println!("Header File Size: {} bytes", bmp.file_size);
            println!("Image Header Size: {}", bmp.info_size);
            println!("Size of the image data: {} bytes", bmp.image_size);
        }
        RasterHeader::Ppm(ppm) => {
            println!("Max color value: {}", ppm.max_color_value);
        }
    }
    println!(
        "Capacity: {} bytes ({} bytes with an embedded length prefix)",
        capacity_bytes(header).to_string().green().bold(),
        (usable_bits(header, Termination::Embedded) / 8).to_string().green()
    );

    Ok(())
}

/// 处理 'Encrypt' 命令的执行逻辑。
///
/// 负责读取待隐藏的文本、确定输出路径、调用编码流程，
/// 最后报告结果图像的位置与遍历停止的位置。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像或文本文件。
/// * 图像格式不受支持或已损坏。
/// * 图像没有足够的空间来隐藏文本。
/// * 输出文件已存在且未指定 `--force`，或无法写入。
pub fn handle_encrypt(args: EncryptArgs) -> Result<()> {
    let payload = match (&args.text, &args.message) {
        (Some(path), _) => fs::read(path).with_context(|| {
            format!(
                "Unable to read text file: {}",
                path.to_string_lossy().red().bold()
            )
        })?,
        (None, Some(message)) => message.clone().into_bytes(),
        (None, None) => anyhow::bail!("No message given. Pass it inline or with --text."),
    };

    let dest = args.dest.clone().unwrap_or_else(|| default_dest(&args.image));
    ensure_writable(&dest, args.force)?;

    let options = CodecOptions::from(&args.codec);
    let outcome = encode_file(&args.image, &dest, &payload, &options).with_context(|| {
        format!(
            "Failed to hide the message in {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The message has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );
    println!(
        "Used {} of {} bits, stopped after pixel {}",
        outcome.report.requested_bits.to_string().green(),
        outcome.report.available_bits.to_string().green(),
        outcome.position.to_string().green()
    );
    if options.termination == Termination::Marker {
        println!(
            "Termination marker recorded in: {}",
            options.marker.path().to_string_lossy().green().bold()
        );
    }

    Ok(())
}

/// 处理 'Decrypt' 命令的执行逻辑。
///
/// 负责调用解码流程，打印恢复的文本，并在指定时写入目标文本文件。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像文件，或格式不受支持。
/// * 终止标记缺失或无效。
/// * 无法写入到目标文本文件。
pub fn handle_decrypt(args: DecryptArgs) -> Result<()> {
    if let Some(path) = &args.text {
        ensure_writable(path, args.force)?;
    }

    let options = CodecOptions::from(&args.codec);
    let payload = decode_file(&args.image, &options).with_context(|| {
        format!(
            "Failed to recover the message from '{}'. \nThe image may not contain a hidden message or is corrupted.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "Decrypted message: {}",
        String::from_utf8_lossy(&payload).green().bold()
    );

    if let Some(path) = &args.text {
        fs::write(path, &payload).with_context(|| {
            format!(
                "Unable to write to target text file: {}",
                path.to_string_lossy().red().bold()
            )
        })?;
        println!(
            "The message has been successfully recovered and saved: {}",
            path.to_string_lossy().green().bold()
        );
    }

    Ok(())
}

/// 处理 'Check' 命令的执行逻辑。
///
/// # Errors
///
/// 图像无法读取，或文本超出容量时返回错误。
pub fn handle_check(args: CheckArgs) -> Result<()> {
    println!(
        "Message \"{}\" size is {} bytes.",
        args.message,
        args.message.len().to_string().green().bold()
    );

    let options = CodecOptions::from(&args.codec);
    let report = check_file(&args.image, args.message.len(), &options).with_context(|| {
        format!(
            "Message does not fit into {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "Size file can store - {} bits, message needs {} bits.",
        report.available_bits.to_string().green().bold(),
        report.requested_bits.to_string().green()
    );
    println!("Message can be encrypted into the file(image)");

    Ok(())
}
