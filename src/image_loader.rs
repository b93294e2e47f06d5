use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, ImageFormat, ImageReader};

use crate::layout::Size;

/// Intrinsic pixel size of an image file, read from its header where possible.
pub fn read_dimensions(path: &Path) -> Result<Size> {
    let format = ImageFormat::from_path(path).ok();

    if format == Some(ImageFormat::Gif) {
        // Some GIFs carry a bogus logical screen size; trust the first frame.
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read image: {:?}", path))?;
        let decoder = GifDecoder::new(Cursor::new(bytes))
            .with_context(|| format!("Failed to decode GIF: {:?}", path))?;
        let mut frames = decoder.into_frames();
        if let Some(frame) = frames.next() {
            let frame = frame.context("Failed to decode GIF frame")?;
            let buf = frame.into_buffer();
            return Ok(Size::from_pixels(buf.width(), buf.height()));
        }
        return Err(anyhow!("GIF has no frames: {:?}", path));
    }

    let file = File::open(path).with_context(|| format!("Failed to read image: {:?}", path))?;
    let reader = ImageReader::new(BufReader::new(file))
        .with_guessed_format()
        .context("Failed to guess image format")?;
    let (width, height) = reader
        .into_dimensions()
        .with_context(|| format!("Failed to read dimensions: {:?}", path))?;
    Ok(Size::from_pixels(width, height))
}
