/// BMP 文件头 (BITMAPFILEHEADER) 的大小 (字节)。
pub const BMP_FILE_HEADER_SIZE: usize = 14;

/// BMP 信息头 (BITMAPINFOHEADER) 的大小 (字节)。
pub const BMP_INFO_HEADER_SIZE: usize = 40;

/// BMP 文件的标准头部大小 (字节)。
/// 写出时像素数据总是紧跟在这个头部之后。
pub const BMP_HEADER_SIZE: usize = BMP_FILE_HEADER_SIZE + BMP_INFO_HEADER_SIZE;

/// BMP 文件签名 `BM` (小端序读取为 `0x4D42`)。
pub const BMP_SIGNATURE: u16 = 0x4D42;

/// 唯一支持的位深度：24 位真彩色。
pub const BMP_BIT_COUNT: u16 = 24;

/// `BI_RGB`，即无压缩。
pub const BMP_COMPRESSION_RGB: u32 = 0;

/// BMP 每行在磁盘上按该字节数对齐。
pub const BMP_ROW_ALIGNMENT: usize = 4;

/// 唯一支持的 PPM 魔数 (二进制像素)。
pub const PPM_MAGIC: &str = "P6";

/// 每个像素占用的字节数 (三个 8 位颜色通道)。
pub const BYTES_PER_PIXEL: usize = 3;

/// 嵌入式长度前缀的位数。
/// 负载字节数以 `u32` 大端序写在负载之前，占用 32 bits。
pub const LENGTH_PREFIX_BITS: usize = 32;

/// 终止标记记录文件的默认路径。
pub const DEFAULT_MARKER_FILE: &str = "message_log.txt";

/// 未指定输出路径时，隐写结果文件名的前缀。
pub const DOCTORED_PREFIX: &str = "doctored_";
