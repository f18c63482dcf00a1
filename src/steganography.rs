use crate::error::{Result, StegoError};
use crate::pixels::PixelBuffer;

/// 按格式规定的遍历顺序把比特流写入像素的低位。
///
/// 返回遍历停止的位置，即被写入过的像素个数。比特流在某个像素中途耗尽时，
/// 该像素剩余的位保持不变。遍历完整幅图像后仍有剩余比特则返回容量错误。
pub fn embed<I>(pix: &mut PixelBuffer, bits: I) -> Result<usize>
where
    I: Iterator<Item = u8>,
{
    let format = pix.format();
    let mut bits = bits.peekable();
    let mut position = 0;

    for (x, y) in format.traversal(pix.width(), pix.height()) {
        if bits.peek().is_none() {
            break;
        }

        for &(channel, bit_pos) in format.embed_order() {
            let Some(bit) = bits.next() else { break };
            let byte = pix.channel_mut(x, y, channel).ok_or_else(|| {
                StegoError::format(
                    format.name(),
                    format!("pixel ({x}, {y}) lies outside the image data boundary"),
                )
            })?;
            *byte = (*byte & !(1 << bit_pos)) | ((bit & 1) << bit_pos);
        }
        position += 1;
    }

    let leftover = bits.count();
    if leftover > 0 {
        let available = (pix.pixel_count() * format.bits_per_pixel()) as u64;
        return Err(StegoError::Capacity {
            requested: available + leftover as u64,
            available,
        });
    }

    Ok(position)
}

/// 按写入时的顺序惰性读出全部像素低位。
pub fn lsb_bits(pix: &PixelBuffer) -> impl Iterator<Item = u8> + '_ {
    let format = pix.format();
    format
        .traversal(pix.width(), pix.height())
        .flat_map(move |(x, y)| {
            format.embed_order().iter().map(move |&(channel, bit_pos)| {
                pix.channel(x, y, channel)
                    .map_or(0, |byte| (byte >> bit_pos) & 1)
            })
        })
}

/// 读出遍历顺序中前 `pixels` 个像素携带的比特。
pub fn extract(pix: &PixelBuffer, pixels: usize) -> Result<Vec<u8>> {
    if pixels > pix.pixel_count() {
        return Err(StegoError::Marker(format!(
            "termination position {} exceeds the {} pixels of the image",
            pixels,
            pix.pixel_count()
        )));
    }

    Ok(lsb_bits(pix)
        .take(pixels * pix.format().bits_per_pixel())
        .collect())
}
