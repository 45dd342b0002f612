//! Uncompressed 24-bit RGB DirectDraw Surface files.
//!
//! Layout: `"DDS "` magic, a 124 byte header holding a 32 byte pixel format
//! block, then tightly packed rows of B, G, R bytes.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use image::RgbImage;
use std::io::{Read, Write};

use crate::error::{AppError, Result};

const MAGIC: &[u8; 4] = b"DDS ";
const HEADER_SIZE: u32 = 124;
const PIXEL_FORMAT_SIZE: u32 = 32;

const DDSD_CAPS: u32 = 0x1;
const DDSD_HEIGHT: u32 = 0x2;
const DDSD_WIDTH: u32 = 0x4;
const DDSD_PITCH: u32 = 0x8;
const DDSD_PIXELFORMAT: u32 = 0x1000;
const DDPF_RGB: u32 = 0x40;
const DDSCAPS_TEXTURE: u32 = 0x1000;

const BIT_COUNT: u32 = 24;
const RED_MASK: u32 = 0x00FF_0000;
const GREEN_MASK: u32 = 0x0000_FF00;
const BLUE_MASK: u32 = 0x0000_00FF;

/// Surfaces are written unpadded; readers accept up to 4-byte row alignment.
const MAX_ROW_PADDING: u32 = 3;

fn row_pitch(width: u32) -> Result<u32> {
    width
        .checked_mul(BIT_COUNT / 8)
        .ok_or_else(|| AppError::Dds(format!("width {} too large", width)))
}

/// Write `image` as an uncompressed DDS surface.
pub fn encode_dds<W: Write>(image: &RgbImage, mut writer: W) -> Result<()> {
    let (width, height) = image.dimensions();
    let pitch = row_pitch(width)?;

    writer.write_all(MAGIC)?;
    writer.write_u32::<LittleEndian>(HEADER_SIZE)?;
    writer.write_u32::<LittleEndian>(
        DDSD_CAPS | DDSD_HEIGHT | DDSD_WIDTH | DDSD_PITCH | DDSD_PIXELFORMAT,
    )?;
    writer.write_u32::<LittleEndian>(height)?;
    writer.write_u32::<LittleEndian>(width)?;
    writer.write_u32::<LittleEndian>(pitch)?;
    // depth, mipmap count, reserved[11]
    for _ in 0..13 {
        writer.write_u32::<LittleEndian>(0)?;
    }

    writer.write_u32::<LittleEndian>(PIXEL_FORMAT_SIZE)?;
    writer.write_u32::<LittleEndian>(DDPF_RGB)?;
    writer.write_u32::<LittleEndian>(0)?;
    writer.write_u32::<LittleEndian>(BIT_COUNT)?;
    writer.write_u32::<LittleEndian>(RED_MASK)?;
    writer.write_u32::<LittleEndian>(GREEN_MASK)?;
    writer.write_u32::<LittleEndian>(BLUE_MASK)?;
    writer.write_u32::<LittleEndian>(0)?;

    writer.write_u32::<LittleEndian>(DDSCAPS_TEXTURE)?;
    // caps2..4, reserved2
    for _ in 0..4 {
        writer.write_u32::<LittleEndian>(0)?;
    }

    let mut row = Vec::with_capacity(pitch as usize);
    for pixels in image.rows() {
        row.clear();
        for p in pixels {
            row.extend_from_slice(&[p[2], p[1], p[0]]);
        }
        writer.write_all(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a surface written by [`encode_dds`].
///
/// # Errors
///
/// Returns `AppError::Dds` for anything other than uncompressed 24-bit RGB.
pub fn decode_dds<R: Read>(mut reader: R) -> Result<RgbImage> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(AppError::Dds("missing DDS magic".to_string()));
    }

    let header_size = reader.read_u32::<LittleEndian>()?;
    if header_size != HEADER_SIZE {
        return Err(AppError::Dds(format!("unexpected header size {}", header_size)));
    }
    let _flags = reader.read_u32::<LittleEndian>()?;
    let height = reader.read_u32::<LittleEndian>()?;
    let width = reader.read_u32::<LittleEndian>()?;
    let pitch = reader.read_u32::<LittleEndian>()?;
    for _ in 0..13 {
        reader.read_u32::<LittleEndian>()?;
    }

    let format_size = reader.read_u32::<LittleEndian>()?;
    let format_flags = reader.read_u32::<LittleEndian>()?;
    let _four_cc = reader.read_u32::<LittleEndian>()?;
    let bit_count = reader.read_u32::<LittleEndian>()?;
    let masks = [
        reader.read_u32::<LittleEndian>()?,
        reader.read_u32::<LittleEndian>()?,
        reader.read_u32::<LittleEndian>()?,
    ];
    let _alpha_mask = reader.read_u32::<LittleEndian>()?;
    if format_size != PIXEL_FORMAT_SIZE
        || format_flags & DDPF_RGB == 0
        || bit_count != BIT_COUNT
        || masks != [RED_MASK, GREEN_MASK, BLUE_MASK]
    {
        return Err(AppError::Dds(
            "only uncompressed 24-bit RGB surfaces are supported".to_string(),
        ));
    }
    for _ in 0..5 {
        reader.read_u32::<LittleEndian>()?;
    }

    let packed = row_pitch(width)?;
    if pitch < packed || pitch - packed > MAX_ROW_PADDING {
        return Err(AppError::Dds(format!(
            "pitch {} does not fit width {}",
            pitch, width
        )));
    }
    let expected_len = (packed as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| AppError::Dds(format!("surface {}x{} too large", width, height)))?;

    // buffers grow with the data actually present, never with the header's claims
    let mut raw = Vec::new();
    let mut row = Vec::new();
    if pitch > 0 {
        for _ in 0..height {
            row.clear();
            reader
                .by_ref()
                .take(u64::from(pitch))
                .read_to_end(&mut row)?;
            if row.len() != pitch as usize {
                return Err(AppError::Dds("truncated pixel data".to_string()));
            }
            for bgr in row[..packed as usize].chunks_exact(3) {
                raw.extend_from_slice(&[bgr[2], bgr[1], bgr[0]]);
            }
        }
    }
    if raw.len() != expected_len {
        return Err(AppError::Dds("pixel data does not match dimensions".to_string()));
    }

    RgbImage::from_raw(width, height, raw)
        .ok_or_else(|| AppError::Dds("pixel data does not match dimensions".to_string()))
}
