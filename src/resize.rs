//! Nearest-neighbor resampling that avoids sampling transparent pixels.
//!
//! Icons often have wide fully-transparent margins, and a plain
//! nearest-neighbor downscale picks up those transparent pixels along the
//! edges of the artwork.  Whenever the sampled pixel is fully transparent,
//! the resampler substitutes a nearby visible pixel instead.

use log::{debug, warn};

use super::image::{Pixel, PixelBuffer};

/// How far (in source pixels) to look around a transparent sample.
const NEIGHBORHOOD_RADIUS: i64 = 2;

/// The coarse whole-image scan visits roughly this many columns and rows.
const COARSE_SCAN_DIVISIONS: u32 = 10;

/// Resizes `source` to `width` x `height` using truncating nearest-neighbor
/// mapping.
///
/// A fully transparent sample is replaced by the first visible pixel in the
/// 5x5 neighborhood around it (row-major), else by the first visible pixel
/// of a coarse grid over the whole source, else by opaque white.  This never
/// fails; fallback to white is only reported through the log.
pub fn resize(source: &PixelBuffer, width: u32, height: u32) -> PixelBuffer {
    debug!("resizing {}x{} to {}x{}",
           source.width(),
           source.height(),
           width,
           height);
    let mut output = PixelBuffer::new(width, height);
    let mut num_fallbacks: usize = 0;
    let dest = output.pixels_mut();
    for y in 0..height {
        let sy = scale(y, source.height(), height);
        for x in 0..width {
            let sx = scale(x, source.width(), width);
            let sample = match source.get(sx, sy) {
                Some(px) if !px.is_transparent() => px,
                _ => {
                    find_visible_near(source, sx, sy)
                        .or_else(|| find_visible_coarse(source))
                        .unwrap_or_else(|| {
                            num_fallbacks += 1;
                            Pixel::WHITE
                        })
                }
            };
            dest[(y as usize) * (width as usize) + (x as usize)] = sample;
        }
    }
    if num_fallbacks > 0 {
        warn!("no visible source pixel found for {} of {} pixels in \
               {}x{} output; used opaque white",
              num_fallbacks,
              dest.len(),
              width,
              height);
    }
    output
}

/// Maps a destination coordinate to a source coordinate, truncating.
fn scale(coord: u32, source_len: u32, dest_len: u32) -> u32 {
    (u64::from(coord) * u64::from(source_len) / u64::from(dest_len)) as u32
}

fn find_visible_near(source: &PixelBuffer, sx: u32, sy: u32) -> Option<Pixel> {
    let radius = NEIGHBORHOOD_RADIUS;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let nx = i64::from(sx) + dx;
            let ny = i64::from(sy) + dy;
            if nx < 0 || ny < 0 {
                continue;
            }
            match source.get(nx as u32, ny as u32) {
                Some(px) if !px.is_transparent() => return Some(px),
                _ => {}
            }
        }
    }
    None
}

fn find_visible_coarse(source: &PixelBuffer) -> Option<Pixel> {
    let step_x = (source.width() / COARSE_SCAN_DIVISIONS).max(1) as usize;
    let step_y = (source.height() / COARSE_SCAN_DIVISIONS).max(1) as usize;
    for y in (0..source.height()).step_by(step_y) {
        for x in (0..source.width()).step_by(step_x) {
            match source.get(x, y) {
                Some(px) if !px.is_transparent() => return Some(px),
                _ => {}
            }
        }
    }
    None
}
