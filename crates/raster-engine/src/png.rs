//! PNG encoding for rendered buffers.
//!
//! Supports two encoding modes:
//! - **Indexed PNG (color type 3)**: Used when the image has ≤256 unique
//!   colors. Smaller output for flat or quantized images.
//! - **RGBA PNG (color type 6)**: Full color, always available.
//!
//! The encoder runs after a render pass, on the filled buffer. It is not
//! called by the engine.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use raster_common::{RenderError, RenderResult, Rgba};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::buffer::RgbaBuffer;

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Maximum colors for indexed PNG (PNG8)
const MAX_PALETTE_SIZE: usize = 256;

/// Minimum pixels to benefit from parallel palette extraction
const PARALLEL_THRESHOLD: usize = 4096; // 64x64 or larger

/// Output color type selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PngMode {
    /// Indexed when the palette fits, RGBA otherwise.
    #[default]
    Auto,
    /// Always RGBA.
    Rgba,
}

impl std::str::FromStr for PngMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(PngMode::Auto),
            "rgba" => Ok(PngMode::Rgba),
            other => Err(format!("unknown PNG mode '{}' (expected auto or rgba)", other)),
        }
    }
}

fn check_dimensions(pixels: &[u8], width: usize, height: usize) -> RenderResult<()> {
    if width == 0 || height == 0 {
        return Err(RenderError::Encode(format!(
            "cannot encode an empty {}x{} image",
            width, height
        )));
    }
    if width > u32::MAX as usize || height > u32::MAX as usize {
        return Err(RenderError::Encode(format!(
            "{}x{} exceeds PNG dimension limits",
            width, height
        )));
    }
    let expected = width * height * 4;
    if pixels.len() != expected {
        return Err(RenderError::Encode(format!(
            "pixel data is {} bytes, expected {} for {}x{} RGBA",
            pixels.len(),
            expected,
            width,
            height
        )));
    }
    Ok(())
}

/// Encode RGBA pixel data (4 bytes per pixel, row-major) as an RGBA PNG.
pub fn encode_png(pixels: &[u8], width: usize, height: usize) -> RenderResult<Vec<u8>> {
    check_dimensions(pixels, width, height)?;

    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 6));

    let idat = deflate_scanlines(pixels, width * 4, height)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Encode with automatic format selection.
///
/// Uses indexed PNG when the image has ≤256 unique colors, RGBA otherwise.
pub fn encode_png_auto(pixels: &[u8], width: usize, height: usize) -> RenderResult<Vec<u8>> {
    check_dimensions(pixels, width, height)?;

    let num_pixels = pixels.len() / 4;
    let palette = if num_pixels >= PARALLEL_THRESHOLD {
        extract_palette_parallel(pixels)
    } else {
        extract_palette_sequential(pixels)
    };

    match palette {
        Some((palette, indices)) => {
            debug!(colors = palette.len(), "Encoding indexed PNG");
            encode_png_indexed(width, height, &palette, &indices)
        }
        None => {
            debug!("More than {} colors, encoding RGBA PNG", MAX_PALETTE_SIZE);
            encode_png(pixels, width, height)
        }
    }
}

/// Encode a buffer in the requested mode.
pub fn encode_buffer(buffer: &RgbaBuffer, mode: PngMode) -> RenderResult<Vec<u8>> {
    let pixels = buffer.to_rgba_bytes();
    match mode {
        PngMode::Auto => encode_png_auto(&pixels, buffer.width(), buffer.height()),
        PngMode::Rgba => encode_png(&pixels, buffer.width(), buffer.height()),
    }
}

/// Encode `buffer` and write it to `path`. Returns the number of bytes written.
///
/// The image is encoded in memory before the file is created, so an encoding
/// failure leaves no file behind. If the file cannot be created (for example
/// its parent directory does not exist) nothing is written; a failed write
/// removes the partial file.
pub fn save_png(path: impl AsRef<Path>, buffer: &RgbaBuffer, mode: PngMode) -> RenderResult<u64> {
    let path = path.as_ref();
    let data = encode_buffer(buffer, mode)?;

    let mut file = fs::File::create(path).map_err(|e| RenderError::io(path, e))?;
    let written = file.write_all(&data).and_then(|_| file.sync_all());
    if let Err(e) = written {
        drop(file);
        if let Err(rm) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %rm, "Failed to remove partial PNG");
        }
        return Err(RenderError::io(path, e));
    }

    info!(path = %path.display(), bytes = data.len(), "Saved {}", path.display());
    Ok(data.len() as u64)
}

/// Sequential palette extraction for small images.
fn extract_palette_sequential(pixels: &[u8]) -> Option<(Vec<Rgba>, Vec<u8>)> {
    let mut color_to_index: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Vec<Rgba> = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices: Vec<u8> = Vec::with_capacity(pixels.len() / 4);

    for chunk in pixels.chunks_exact(4) {
        let color = Rgba::new(chunk[0], chunk[1], chunk[2], chunk[3]);
        let index = match color_to_index.get(&color.pack()) {
            Some(&idx) => idx,
            None => {
                if palette.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let idx = palette.len() as u8;
                palette.push(color);
                color_to_index.insert(color.pack(), idx);
                idx
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

/// Parallel palette extraction for larger images.
///
/// 1. Collect unique colors per chunk in parallel, bailing out early once a
///    chunk alone exceeds the palette size
/// 2. Merge into one palette, giving up past 256 colors
/// 3. Map every pixel to its palette index in parallel
fn extract_palette_parallel(pixels: &[u8]) -> Option<(Vec<Rgba>, Vec<u8>)> {
    let chunk_pixels = (pixels.len() / 4 / rayon::current_num_threads()).max(256);
    let chunk_size = chunk_pixels * 4;

    let chunk_colors: Vec<Option<Vec<u32>>> = pixels
        .par_chunks(chunk_size)
        .map(|chunk| {
            let mut local: HashMap<u32, ()> = HashMap::with_capacity(MAX_PALETTE_SIZE);
            for px in chunk.chunks_exact(4) {
                local.insert(Rgba::new(px[0], px[1], px[2], px[3]).pack(), ());
                if local.len() > MAX_PALETTE_SIZE {
                    return None;
                }
            }
            Some(local.into_keys().collect())
        })
        .collect();

    let mut color_to_index: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Vec<Rgba> = Vec::with_capacity(MAX_PALETTE_SIZE);
    for colors in chunk_colors {
        for packed in colors? {
            if color_to_index.contains_key(&packed) {
                continue;
            }
            if palette.len() >= MAX_PALETTE_SIZE {
                return None;
            }
            color_to_index.insert(packed, palette.len() as u8);
            palette.push(Rgba::unpack(packed));
        }
    }

    let mut indices = vec![0u8; pixels.len() / 4];
    indices
        .par_chunks_mut(chunk_pixels)
        .zip(pixels.par_chunks(chunk_size))
        .for_each(|(idx_chunk, px_chunk)| {
            for (idx, px) in idx_chunk.iter_mut().zip(px_chunk.chunks_exact(4)) {
                let packed = Rgba::new(px[0], px[1], px[2], px[3]).pack();
                *idx = color_to_index.get(&packed).copied().unwrap_or(0);
            }
        });

    Some((palette, indices))
}

/// Encode an indexed PNG (color type 3) from a palette and per-pixel indices.
fn encode_png_indexed(
    width: usize,
    height: usize,
    palette: &[Rgba],
    indices: &[u8],
) -> RenderResult<Vec<u8>> {
    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 3));

    let plte: Vec<u8> = palette.iter().flat_map(|c| [c.r, c.g, c.b]).collect();
    write_chunk(&mut png, b"PLTE", &plte);

    // tRNS only when some entry is not fully opaque
    if palette.iter().any(|c| c.a < 255) {
        let trns: Vec<u8> = palette.iter().map(|c| c.a).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    let idat = deflate_scanlines(indices, width, height)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// IHDR payload: 8-bit depth, no interlace.
fn ihdr(width: usize, height: usize, color_type: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity(13);
    data.extend_from_slice(&(width as u32).to_be_bytes());
    data.extend_from_slice(&(height as u32).to_be_bytes());
    data.push(8); // bit depth
    data.push(color_type);
    data.push(0); // compression method
    data.push(0); // filter method
    data.push(0); // interlace method
    data
}

/// Prefix each scanline with filter type 0 and zlib-compress.
fn deflate_scanlines(data: &[u8], stride: usize, height: usize) -> RenderResult<Vec<u8>> {
    let mut raw = Vec::with_capacity(height * (1 + stride));
    for row in data.chunks_exact(stride).take(height) {
        raw.push(0);
        raw.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder
        .write_all(&raw)
        .map_err(|e| RenderError::Encode(format!("IDAT compression failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| RenderError::Encode(format!("IDAT compression failed: {}", e)))
}

fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}
