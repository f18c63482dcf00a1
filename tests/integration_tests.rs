use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use rand::{Rng, RngCore};
use raster_lsb::{
    CodecOptions, RasterFormat, RowPadding, StegoError, Termination,
    cli::{CheckArgs, CodecArgs, DecryptArgs, EncryptArgs, PaddingArg, TerminationArg},
    codec::{decode_file, decode_marked, encode_file, encode_raster, inspect_file},
    container::{Raster, read_container},
    handler::{handle_check, handle_decrypt, handle_encrypt},
    marker::MarkerRecord,
    pixels::PixelBuffer,
};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// 一个辅助函数，用于生成随机像素
fn random_pixels(width: u32, height: u32) -> RgbImage {
    let mut raw_pixels = vec![0u8; (width * height * 3) as usize];
    rand::rng().fill_bytes(&mut raw_pixels);
    RgbImage::from_raw(width, height, raw_pixels).expect("Pixel buffer size mismatch.")
}

/// 用 `image` 写出一张带随机像素的 24 位 BMP
fn create_test_bmp(path: &Path, width: u32, height: u32) -> RgbImage {
    let img = random_pixels(width, height);
    img.save(path).expect("Failed to create test BMP.");
    img
}

/// 用 `image` 写出一张带随机像素的二进制 PPM (P6)
fn create_test_ppm(path: &Path, width: u32, height: u32) -> RgbImage {
    let img = random_pixels(width, height);
    let file = fs::File::create(path).expect("Failed to create test PPM.");
    PnmEncoder::new(file)
        .with_subtype(PnmSubtype::Pixmap(SampleEncoding::Binary))
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .expect("Failed to encode test PPM.");
    img
}

fn random_ascii(len: usize) -> Vec<u8> {
    let mut rng = rand::rng();
    (0..len).map(|_| rng.random_range(b' '..=b'~')).collect()
}

fn options(termination: Termination, marker: &Path) -> CodecOptions {
    CodecOptions {
        termination,
        padding: RowPadding::Aligned,
        marker: MarkerRecord::new(marker),
    }
}

/// 验证 BMP 4x4 中隐藏 "Hi" 后标记落在第一行，并能完整恢复
#[test]
fn test_bmp_hi_scenario() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let cover = dir.path().join("cover.bmp");
    let doctored = dir.path().join("doctored.bmp");
    let opts = options(Termination::Marker, &dir.path().join("message_log.txt"));

    create_test_bmp(&cover, 4, 4);
    let outcome = encode_file(&cover, &doctored, b"Hi", &opts)?;

    // 16 bits / 6 bits 每像素 = 3 个像素
    assert_eq!(outcome.position, 3);
    assert_eq!(outcome.report.available_bits, 96);
    assert_eq!(opts.marker.read()?, 3);

    assert_eq!(decode_file(&doctored, &opts)?, b"Hi");
    Ok(())
}

/// 验证 PPM 2x2 放不下两个字节
#[test]
fn test_ppm_capacity_scenario() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let cover = dir.path().join("tiny.ppm");
    let doctored = dir.path().join("out.ppm");
    let opts = options(Termination::Marker, &dir.path().join("message_log.txt"));

    create_test_ppm(&cover, 2, 2);
    let result = encode_file(&cover, &doctored, b"Hi", &opts);

    assert!(matches!(
        result,
        Err(StegoError::Capacity {
            requested: 16,
            available: 12
        })
    ));
    assert!(!doctored.exists(), "Nothing may be written after a failure.");
    assert!(opts.marker.read().is_err());
    Ok(())
}

/// 验证两种格式、两种终止策略下随机文本都能往返
#[test]
fn test_round_trip_all_modes() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let marker = dir.path().join("message_log.txt");

    for termination in [Termination::Embedded, Termination::Marker] {
        for (name, width, height) in [("a.bmp", 13, 7), ("a.ppm", 13, 7)] {
            let cover = dir.path().join(name);
            let doctored = dir.path().join(format!("doctored_{name}"));
            if name.ends_with("bmp") {
                create_test_bmp(&cover, width, height);
            } else {
                create_test_ppm(&cover, width, height);
            }

            let opts = options(termination, &marker);
            let info = inspect_file(&cover)?;
            let fits = raster_lsb::capacity::usable_bits(&info.header, termination) / 8;
            let payload = random_ascii(fits as usize);

            encode_file(&cover, &doctored, &payload, &opts)?;
            assert_eq!(
                decode_file(&doctored, &opts)?,
                payload,
                "{name} with {termination:?}"
            );
        }
    }
    Ok(())
}

/// 验证容量边界：恰好放满成功，多一个字节失败
#[test]
fn test_capacity_is_exact() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let cover = dir.path().join("cover.ppm");
    let doctored = dir.path().join("doctored.ppm");
    let opts = options(Termination::Marker, &dir.path().join("message_log.txt"));

    // 8x8 PPM: 192 bits = 24 bytes
    create_test_ppm(&cover, 8, 8);
    let payload = random_ascii(24);
    encode_file(&cover, &doctored, &payload, &opts)?;
    assert_eq!(decode_file(&doctored, &opts)?, payload);

    let result = encode_file(&cover, &doctored, &random_ascii(25), &opts);
    assert!(matches!(
        result,
        Err(StegoError::Capacity {
            requested: 200,
            available: 192
        })
    ));
    Ok(())
}

/// 验证通道顺序是有意义的：用 PPM 的顺序读取 BMP 的结果无法得到原文
#[test]
fn test_channel_order_is_load_bearing() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let cover = dir.path().join("cover.bmp");
    create_test_bmp(&cover, 8, 8);

    let mut raster = read_container(&cover, RowPadding::Aligned)?;
    let message = b"order matters";
    let position = encode_raster(&mut raster, message, Termination::Marker)?.position;
    assert_eq!(decode_marked(&raster, position)?, message);

    let (width, height) = (raster.header.width(), raster.header.height());
    let as_ppm = Raster {
        header: raster.header.clone(),
        pixels: PixelBuffer::new(
            RasterFormat::Ppm,
            width,
            height,
            raster.pixels.as_bytes().to_vec(),
        )?,
    };
    assert_ne!(decode_marked(&as_ppm, position)?, message);
    Ok(())
}

/// 验证空文本：像素不变，标记为 0，解码得到空文本
#[test]
fn test_empty_payload() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let cover = dir.path().join("cover.bmp");
    let doctored = dir.path().join("doctored.bmp");
    let opts = options(Termination::Marker, &dir.path().join("message_log.txt"));

    create_test_bmp(&cover, 4, 4);
    let outcome = encode_file(&cover, &doctored, b"", &opts)?;
    assert_eq!(outcome.position, 0);

    let before = read_container(&cover, RowPadding::Aligned)?;
    let after = read_container(&doctored, RowPadding::Aligned)?;
    assert_eq!(before.pixels, after.pixels);

    assert!(decode_file(&doctored, &opts)?.is_empty());
    Ok(())
}

/// 验证恰好填满第一行时，标记等于图像宽度
#[test]
fn test_payload_filling_first_row_marks_width() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let cover = dir.path().join("cover.bmp");
    let doctored = dir.path().join("doctored.bmp");
    let opts = options(Termination::Marker, &dir.path().join("message_log.txt"));

    // 宽 4：每行 24 bits = 3 字节
    create_test_bmp(&cover, 4, 3);
    let outcome = encode_file(&cover, &doctored, b"abc", &opts)?;
    assert_eq!(outcome.position, 4);

    // 只有第一行 (缓冲区最后一行) 被修改
    let before = read_container(&cover, RowPadding::Aligned)?;
    let after = read_container(&doctored, RowPadding::Aligned)?;
    let row = 4 * 3;
    assert_eq!(
        &before.pixels.as_bytes()[..2 * row],
        &after.pixels.as_bytes()[..2 * row]
    );

    assert_eq!(decode_file(&doctored, &opts)?, b"abc");
    Ok(())
}

/// 验证标记模式下负载可以跨越多行
#[test]
fn test_marker_spans_multiple_rows() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let cover = dir.path().join("cover.ppm");
    let doctored = dir.path().join("doctored.ppm");
    let opts = options(Termination::Marker, &dir.path().join("message_log.txt"));

    create_test_ppm(&cover, 5, 20);
    let message = b"longer than one row";
    let outcome = encode_file(&cover, &doctored, message, &opts)?;
    assert!(outcome.position > 5);

    assert_eq!(decode_file(&doctored, &opts)?, message);
    Ok(())
}

/// 验证标记只能被消费一次
#[test]
fn test_marker_is_consumed_by_decode() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let cover = dir.path().join("cover.ppm");
    let doctored = dir.path().join("doctored.ppm");
    let opts = options(Termination::Marker, &dir.path().join("message_log.txt"));

    create_test_ppm(&cover, 10, 10);
    encode_file(&cover, &doctored, b"once", &opts)?;
    assert_eq!(decode_file(&doctored, &opts)?, b"once");

    let second = decode_file(&doctored, &opts);
    assert!(matches!(second, Err(StegoError::Marker(_))));
    Ok(())
}

/// 验证带行填充的 BMP (宽度不是 4 的倍数) 结果仍是合法图像，且像素只在低位变化
#[test]
fn test_padded_bmp_stays_a_valid_image() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let cover = dir.path().join("odd.bmp");
    let doctored = dir.path().join("doctored_odd.bmp");
    let opts = options(Termination::Embedded, &dir.path().join("message_log.txt"));

    let original = create_test_bmp(&cover, 7, 5);
    encode_file(&cover, &doctored, b"padding", &opts)?;
    assert_eq!(decode_file(&doctored, &opts)?, b"padding");

    let reopened = image::open(&doctored)?.to_rgb8();
    assert_eq!(reopened.dimensions(), (7, 5));
    for (a, b) in original.as_raw().iter().zip(reopened.as_raw()) {
        assert_eq!(a & 0xFC, b & 0xFC);
    }
    Ok(())
}

/// 验证 PPM 结果仍能被 `image` 正常读取，且只改动最低位
#[test]
fn test_ppm_output_stays_a_valid_image() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let cover = dir.path().join("cover.ppm");
    let doctored = dir.path().join("doctored.ppm");
    let opts = options(Termination::Embedded, &dir.path().join("message_log.txt"));

    let original = create_test_ppm(&cover, 16, 16);
    encode_file(&cover, &doctored, b"portable pixmap", &opts)?;

    let reopened = image::open(&doctored)?.to_rgb8();
    assert_eq!(reopened.dimensions(), (16, 16));
    for (a, b) in original.as_raw().iter().zip(reopened.as_raw()) {
        assert_eq!(a & 0xFE, b & 0xFE);
    }
    Ok(())
}

/// 验证宽度为 4 的倍数时，对齐与紧凑两种行模式写出相同的文件
#[test]
fn test_packed_rows_match_aligned_when_no_padding_needed() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let cover = dir.path().join("cover.bmp");
    create_test_bmp(&cover, 8, 3);

    let mut aligned = read_container(&cover, RowPadding::Aligned)?;
    let mut packed = read_container(&cover, RowPadding::Packed)?;
    assert_eq!(aligned, packed);

    encode_raster(&mut aligned, b"same", Termination::Embedded)?;
    encode_raster(&mut packed, b"same", Termination::Embedded)?;
    assert_eq!(
        aligned.to_bytes(RowPadding::Aligned),
        packed.to_bytes(RowPadding::Packed)
    );
    Ok(())
}

/// 验证从隐藏到恢复的完整命令流程
#[test]
fn test_handle_encrypt_and_decrypt_integration() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let original_image_path = dir.path().join("original.bmp");
    let hidden_image_path = dir.path().join("hidden.bmp");
    let source_text_path = dir.path().join("source.txt");
    let recovered_text_path = dir.path().join("recovered.txt");

    create_test_bmp(&original_image_path, 100, 100);
    let original_text = "This is a test message for the handler! 这是一个给处理器的测试信息！";
    fs::write(&source_text_path, original_text)?;

    // 2. 测试 handle_encrypt
    handle_encrypt(EncryptArgs {
        image: original_image_path.clone(),
        message: None,
        text: Some(source_text_path.clone()),
        dest: Some(hidden_image_path.clone()),
        force: false,
        codec: CodecArgs::default(),
    })?;
    assert!(hidden_image_path.exists(), "Hidden image should be created.");

    // 3. 测试 handle_decrypt
    handle_decrypt(DecryptArgs {
        image: hidden_image_path.clone(),
        text: Some(recovered_text_path.clone()),
        force: false,
        codec: CodecArgs::default(),
    })?;
    assert!(
        recovered_text_path.exists(),
        "Recovered text file should be created."
    );

    // 4. 验证结果
    let recovered_text = fs::read_to_string(&recovered_text_path)?;
    assert_eq!(
        original_text, recovered_text,
        "Recovered text must match the original."
    );

    Ok(())
}

/// 验证标记模式下不提供输出路径时生成默认路径
#[test]
fn test_handle_encrypt_with_defaults_and_marker() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let original_image_path = dir.path().join("original.ppm");
    let recovered_text_path = dir.path().join("recovered.txt");
    let codec = CodecArgs {
        termination: TerminationArg::Marker,
        marker: dir.path().join("message_log.txt"),
        row_padding: PaddingArg::Aligned,
    };

    create_test_ppm(&original_image_path, 40, 40);

    handle_encrypt(EncryptArgs {
        image: original_image_path.clone(),
        message: Some("Testing default path generation.".to_string()),
        text: None,
        dest: None,
        force: false,
        codec: codec.clone(),
    })?;

    let expected_hidden_path = dir.path().join("doctored_original.ppm");
    assert!(
        expected_hidden_path.exists(),
        "Default hidden image should be created at: {:?}",
        expected_hidden_path
    );

    handle_decrypt(DecryptArgs {
        image: expected_hidden_path,
        text: Some(recovered_text_path.clone()),
        force: false,
        codec,
    })?;
    assert_eq!(
        fs::read_to_string(&recovered_text_path)?,
        "Testing default path generation."
    );

    Ok(())
}

/// 验证覆盖保护机制以及 `--force` 标志是否按预期工作
#[test]
fn test_overwrite_protection_and_force_flag() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("image.bmp");
    let dest_path = dir.path().join("dest.bmp");

    create_test_bmp(&image_path, 20, 20);
    fs::write(&dest_path, "this is a dummy file to be overwritten")?;

    let args = |force| EncryptArgs {
        image: image_path.clone(),
        message: Some("some text".to_string()),
        text: None,
        dest: Some(dest_path.clone()),
        force,
        codec: CodecArgs::default(),
    };

    let result = handle_encrypt(args(false));
    assert!(result.is_err(), "Execution should fail without --force when file exists.");
    if let Err(e) = result {
        assert!(e.to_string().contains("Output file already exists"));
    }

    let result = handle_encrypt(args(true));
    assert!(result.is_ok(), "Execution should succeed with --force when file exists.");

    let dummy_content = fs::read(&dest_path)?;
    assert_ne!(dummy_content, b"this is a dummy file to be overwritten");

    Ok(())
}

/// 验证空间不足时的错误处理
#[test]
fn test_handle_encrypt_not_enough_space() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("small.bmp");
    let dest_path = dir.path().join("dest.bmp");

    create_test_bmp(&image_path, 10, 10);

    let result = handle_encrypt(EncryptArgs {
        image: image_path.clone(),
        message: Some("a".repeat(5000)),
        text: None,
        dest: Some(dest_path.clone()),
        force: false,
        codec: CodecArgs::default(),
    });

    assert!(result.is_err());
    if let Err(e) = result {
        assert!(format!("{e:#}").contains("Not enough space"));
    }
    assert!(!dest_path.exists());

    let check = handle_check(CheckArgs {
        image: image_path,
        message: "a".repeat(5000),
        codec: CodecArgs::default(),
    });
    assert!(check.is_err());

    Ok(())
}

/// 验证不支持的扩展名与格式
#[test]
fn test_unsupported_inputs_are_rejected() -> anyhow::Result<()> {
    let dir = tempdir()?;

    let jpg = dir.path().join("photo.jpg");
    fs::write(&jpg, b"not really a jpeg")?;
    assert!(matches!(
        inspect_file(&jpg),
        Err(StegoError::UnsupportedFormat { .. })
    ));

    let plain = dir.path().join("plain.ppm");
    fs::write(&plain, b"P3\n1 1\n255\n0 0 0\n")?;
    assert!(matches!(
        inspect_file(&plain),
        Err(StegoError::UnsupportedFormat { .. })
    ));

    let fake = dir.path().join("fake.bmp");
    fs::write(&fake, vec![0u8; 64])?;
    assert!(matches!(
        inspect_file(&fake),
        Err(StegoError::Format { .. })
    ));

    let missing = dir.path().join("missing.bmp");
    assert!(matches!(inspect_file(&missing), Err(StegoError::Io { .. })));

    Ok(())
}
