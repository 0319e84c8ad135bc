use jpeg_encoder::{ColorType, Encoder};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::error::{Error, Result};

const JPEG_QUALITY: u8 = 95;

pub fn write_rgb_jpeg(output: &Path, cols: usize, rows: usize, rgb_data: &[u8]) -> Result<()> {
    if cols > u16::MAX as usize || rows > u16::MAX as usize {
        return Err(Error::InvalidArgument {
            arg: "jpeg_dimensions",
            value: format!("{}x{}", cols, rows),
        });
    }
    let file = File::create(output)?;
    let mut writer = BufWriter::new(file);
    let encoder = Encoder::new(&mut writer, JPEG_QUALITY);
    encoder
        .encode(rgb_data, cols as u16, rows as u16, ColorType::Rgb)
        .map_err(Error::external)?;
    Ok(())
}
