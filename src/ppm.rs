//! # PPM 头部编解码模块
//!
//! 文本头部 `P6 <width> <height> <maxval>`，之后恰好一个空白字节，随后是二进制像素。

use crate::constants::{BYTES_PER_PIXEL, PPM_MAGIC};
use crate::error::{Result, StegoError};

const NAME: &str = "PPM";

/// PPM 头部。`data_offset` 是像素数据在文件中的起始位置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PpmHeader {
    pub width: u32,
    pub height: u32,
    pub max_color_value: u32,
    pub data_offset: usize,
}

/// 在头部字节上逐个读取以空白分隔的记号，跳过 `#` 注释。
struct Tokens<'a> {
    raw: &'a [u8],
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn skip_separators(&mut self) {
        while let Some(&byte) = self.raw.get(self.pos) {
            if byte == b'#' {
                while self.raw.get(self.pos).is_some_and(|&b| b != b'\n') {
                    self.pos += 1;
                }
            } else if byte.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> Option<&'a [u8]> {
        self.skip_separators();
        let raw = self.raw;
        let start = self.pos;
        while raw
            .get(self.pos)
            .is_some_and(|b| !b.is_ascii_whitespace() && *b != b'#')
        {
            self.pos += 1;
        }
        let end = self.pos;
        (end > start).then(|| &raw[start..end])
    }

    fn next_number(&mut self, field: &str) -> Result<u32> {
        let token = self
            .next_token()
            .ok_or_else(|| StegoError::format(NAME, format!("header ends before {field}")))?;
        // `str::parse` 也接受 `+` 前缀，头部只允许十进制数字
        token
            .iter()
            .all(u8::is_ascii_digit)
            .then(|| std::str::from_utf8(token).ok())
            .flatten()
            .and_then(|text| text.parse::<u32>().ok())
            .ok_or_else(|| {
                StegoError::format(
                    NAME,
                    format!("{field} '{}' is not a decimal number", String::from_utf8_lossy(token)),
                )
            })
    }
}

impl PpmHeader {
    /// 解析文本头部。
    ///
    /// # Errors
    ///
    /// * 魔数是其他 netpbm 变体 (如 `P3`) 或最大颜色值超过 255 时返回 `UnsupportedFormat` 错误。
    /// * 其余结构问题返回 `Format` 错误。
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let mut tokens = Tokens { raw, pos: 0 };

        let magic = tokens
            .next_token()
            .ok_or_else(|| StegoError::format(NAME, "file is empty"))?;
        if magic != PPM_MAGIC.as_bytes() {
            let shown = String::from_utf8_lossy(magic).into_owned();
            return Err(if is_netpbm_magic(magic) {
                StegoError::unsupported(NAME, format!("magic '{shown}' is not supported, only P6"))
            } else {
                StegoError::format(NAME, format!("magic '{shown}' is not a PPM signature"))
            });
        }

        let width = tokens.next_number("width")?;
        let height = tokens.next_number("height")?;
        let max_color_value = tokens.next_number("max color value")?;

        if width == 0 || height == 0 {
            return Err(StegoError::unsupported(
                NAME,
                format!("dimensions {width}x{height} are not supported, width and height must be positive"),
            ));
        }
        if !(1..=255).contains(&max_color_value) {
            return Err(StegoError::unsupported(
                NAME,
                format!("max color value {max_color_value} is not supported, expected 1..=255"),
            ));
        }

        match raw.get(tokens.pos) {
            Some(byte) if byte.is_ascii_whitespace() => {}
            _ => {
                return Err(StegoError::format(
                    NAME,
                    "missing whitespace byte between header and pixel data",
                ));
            }
        }

        Ok(PpmHeader {
            width,
            height,
            max_color_value,
            data_offset: tokens.pos + 1,
        })
    }

    /// 取出紧跟头部的 `width * height * 3` 个像素字节。
    pub fn read_pixels(&self, raw: &[u8]) -> Result<Vec<u8>> {
        let len = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
            .ok_or_else(|| {
                StegoError::format(
                    NAME,
                    format!("dimensions {}x{} are too large", self.width, self.height),
                )
            })?;
        let end = self.data_offset.checked_add(len).ok_or_else(|| {
            StegoError::format(NAME, format!("pixel data of {len} bytes exceeds the address space"))
        })?;
        raw.get(self.data_offset..end)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| {
                StegoError::format(
                    NAME,
                    format!(
                        "pixel data is truncated: expected {} bytes after the header, found {}",
                        len,
                        raw.len().saturating_sub(self.data_offset)
                    ),
                )
            })
    }

    /// 写出 `P6\n{width} {height}\n{maxval}\n` 与像素字节。
    pub fn serialize(&self, pixels: &[u8]) -> Vec<u8> {
        let head = format!(
            "{PPM_MAGIC}\n{} {}\n{}\n",
            self.width, self.height, self.max_color_value
        );
        let mut out = Vec::with_capacity(head.len() + pixels.len());
        out.extend_from_slice(head.as_bytes());
        out.extend_from_slice(pixels);
        out
    }
}

fn is_netpbm_magic(magic: &[u8]) -> bool {
    matches!(magic, [b'P', b'1'..=b'7'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_header() {
        let mut raw = b"P6\n2 1\n255\n".to_vec();
        raw.extend_from_slice(&[1, 2, 3, 4, 5, 6]);

        let header = PpmHeader::parse(&raw).unwrap();
        assert_eq!(header.width, 2);
        assert_eq!(header.height, 1);
        assert_eq!(header.max_color_value, 255);
        assert_eq!(header.data_offset, 11);
        assert_eq!(header.read_pixels(&raw).unwrap(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn skips_comments_and_extra_whitespace() {
        let mut raw = b"P6 # made by hand\n  3\t1 # width height\n255 ".to_vec();
        raw.extend_from_slice(&[9; 9]);

        let header = PpmHeader::parse(&raw).unwrap();
        assert_eq!((header.width, header.height), (3, 1));
        assert_eq!(header.read_pixels(&raw).unwrap(), vec![9; 9]);
    }

    #[test]
    fn exactly_one_separator_byte_is_consumed() {
        // 第一个像素字节恰好是空白 (0x0A)
        let mut raw = b"P6\n1 1\n255\n".to_vec();
        raw.extend_from_slice(&[b'\n', 7, 8]);

        let header = PpmHeader::parse(&raw).unwrap();
        assert_eq!(header.read_pixels(&raw).unwrap(), vec![b'\n', 7, 8]);
    }

    #[test]
    fn plain_text_variant_is_unsupported() {
        let raw = b"P3\n1 1\n255\n0 0 0\n";
        assert!(matches!(
            PpmHeader::parse(raw),
            Err(StegoError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn foreign_magic_is_a_format_error() {
        assert!(matches!(
            PpmHeader::parse(b"BM\x00\x00"),
            Err(StegoError::Format { .. })
        ));
    }

    #[test]
    fn sixteen_bit_samples_are_unsupported() {
        let raw = b"P6\n1 1\n65535\n\0\0\0\0\0\0";
        assert!(matches!(
            PpmHeader::parse(raw),
            Err(StegoError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn truncated_pixels_are_a_format_error() {
        let raw = b"P6\n2 2\n255\n\0\0\0";
        let header = PpmHeader::parse(raw).unwrap();
        assert!(matches!(
            header.read_pixels(raw),
            Err(StegoError::Format { .. })
        ));
    }

    #[test]
    fn huge_dimensions_are_a_format_error() {
        let raw = b"P6\n4294967295 4294967295\n255\n\0\0\0";
        let header = PpmHeader::parse(raw).unwrap();
        assert!(matches!(
            header.read_pixels(raw),
            Err(StegoError::Format { .. })
        ));
    }

    #[test]
    fn signed_numbers_are_rejected() {
        let raw = b"P6\n+2 +2\n255\n\0\0\0\0\0\0\0\0\0\0\0\0";
        assert!(matches!(
            PpmHeader::parse(raw),
            Err(StegoError::Format { .. })
        ));
        assert!(matches!(
            PpmHeader::parse(b"P6\n2 2\n+255\n"),
            Err(StegoError::Format { .. })
        ));
    }

    #[test]
    fn serialize_writes_canonical_header() {
        let header = PpmHeader {
            width: 1,
            height: 1,
            max_color_value: 255,
            data_offset: 0,
        };
        assert_eq!(header.serialize(&[1, 2, 3]), b"P6\n1 1\n255\n\x01\x02\x03");
    }
}
