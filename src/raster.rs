//! Image to raster line conversion.
//!
//! An arbitrary picture is turned portrait, resampled to the printable width
//! of the installed media, adjusted, reduced to luma and dithered to pure
//! black and white. The monochrome result is then packed into the 90 byte
//! raster lines the print head expects.

use std::io::Cursor;

use image::{imageops::FilterType, DynamicImage, GrayImage, ImageFormat, Luma, RgbaImage};
use log::debug;

use crate::{Error, PRINTER_WIDTH, RASTER_LINE_BYTES};

/// Default brightness applied before dithering, 100 is neutral.
pub const DEFAULT_BRIGHTNESS: u32 = 150;
/// Default contrast applied before dithering, 100 is neutral.
pub const DEFAULT_CONTRAST: u32 = 80;

const NEUTRAL: u32 = 100;
const DITHER_THRESHOLD: i32 = 128;
// Mono pixels above this value are left blank.
const INK_THRESHOLD: u8 = 127;

// Each neighbour gets 1/8 of the error, 6/8 in total.
const ATKINSON_NEIGHBOURS: [(isize, isize); 6] = [(1, 0), (2, 0), (-1, 1), (0, 1), (1, 1), (0, 2)];

/// One row of print head actuation bits, MSB first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterLine([u8; RASTER_LINE_BYTES]);

impl RasterLine {
    pub fn blank() -> Self {
        RasterLine([0x00; RASTER_LINE_BYTES])
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != RASTER_LINE_BYTES {
            return Err(Error::InvalidLineLength(bytes.len()));
        }
        let mut line = Self::blank();
        line.0.copy_from_slice(bytes);
        Ok(line)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Whether dot `bit` is printed dark.
    pub fn is_set(&self, bit: u32) -> bool {
        let byte = (bit >> 3) as usize;
        byte < RASTER_LINE_BYTES && self.0[byte] & (1 << (7 - (bit & 7))) != 0
    }

    fn set(&mut self, bit: u32) {
        self.0[(bit >> 3) as usize] |= 1 << (7 - (bit & 7));
    }
}

impl From<[u8; RASTER_LINE_BYTES]> for RasterLine {
    fn from(bytes: [u8; RASTER_LINE_BYTES]) -> Self {
        RasterLine(bytes)
    }
}

pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, Error> {
    Ok(image::load_from_memory(bytes)?)
}

/// Always print with the longest side as the height.
pub fn ensure_portrait(image: &DynamicImage) -> DynamicImage {
    if image.width() > image.height() {
        image.rotate90()
    } else {
        image.clone()
    }
}

/// Resample to `width` keeping the aspect ratio.
pub fn resize_to_width(image: &DynamicImage, width: u32) -> RgbaImage {
    let scale = width as f64 / image.width() as f64;
    let height = ((image.height() as f64 * scale).round() as u32).max(1);
    image::imageops::resize(&image.to_rgba8(), width, height, FilterType::Lanczos3)
}

/// Per channel `((v - 0.5) * contrast + 0.5) * brightness` on normalized values.
pub fn adjust_brightness_contrast(image: &mut RgbaImage, brightness: u32, contrast: u32) {
    if brightness == NEUTRAL && contrast == NEUTRAL {
        return;
    }
    let b = brightness as f32 / 100.0;
    let c = contrast as f32 / 100.0;

    for pixel in image.pixels_mut() {
        for channel in pixel.0.iter_mut().take(3) {
            let v = *channel as f32 / 255.0;
            let v = ((v - 0.5) * c + 0.5) * b;
            *channel = (v * 255.0).round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Rec. 601 luma. Alpha is ignored.
pub fn to_grayscale(image: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, _] = image.get_pixel(x, y).0;
        let l = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
        Luma([l.round().clamp(0.0, 255.0) as u8])
    })
}

/// Atkinson error diffusion in place, leaving only 0 and 255.
///
/// Pixels are visited row by row, left to right. Only 6/8 of the error is
/// passed on, the rest is dropped which gives a crisper print.
pub fn dither_atkinson(gray: &mut GrayImage) {
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    let data: &mut [u8] = gray;

    for y in 0..h {
        for x in 0..w {
            let old = data[y * w + x] as i32;
            let new = if old < DITHER_THRESHOLD { 0 } else { 255 };
            data[y * w + x] = new as u8;

            let share = (old - new) >> 3;
            if share == 0 {
                continue;
            }
            for (dx, dy) in ATKINSON_NEIGHBOURS.iter() {
                let nx = x as isize + dx;
                let ny = y + *dy as usize;
                if nx < 0 || nx as usize >= w || ny >= h {
                    continue;
                }
                let p = &mut data[ny * w + nx as usize];
                *p = (*p as i32 + share).clamp(0, 255) as u8;
            }
        }
    }
}

/// Dither `source` at the printable width.
///
/// Returns the monochrome bitmap and an RGBA preview of it. The source is
/// not modified and the same input always gives the same output.
pub fn build_mono_at_width(
    source: &DynamicImage,
    target_width: u32,
    brightness: u32,
    contrast: u32,
) -> Result<(GrayImage, RgbaImage), Error> {
    if target_width == 0 || source.width() == 0 || source.height() == 0 {
        return Err(Error::WidthMismatch {
            image_width: source.width(),
            printable_dots: target_width,
        });
    }

    let portrait = ensure_portrait(source);
    let mut resized = resize_to_width(&portrait, target_width);
    adjust_brightness_contrast(&mut resized, brightness, contrast);

    let mut mono = to_grayscale(&resized);
    dither_atkinson(&mut mono);
    debug!("Dithered image to {}x{}", mono.width(), mono.height());

    let preview = render_preview(&mono);
    Ok((mono, preview))
}

/// Pack the monochrome bitmap into raster lines, one per row.
///
/// The head is mirrored relative to the image, so visual column `px` lands
/// on dot `margin + printable_dots - 1 - px`. `flip_margins` makes the right
/// margin lead instead of the left one.
pub fn pack_raster_lines(
    mono: &GrayImage,
    printable_dots: u32,
    left_margin: u32,
    right_margin: u32,
    flip_margins: bool,
) -> Result<Vec<RasterLine>, Error> {
    if mono.width() != printable_dots {
        return Err(Error::WidthMismatch {
            image_width: mono.width(),
            printable_dots,
        });
    }

    let margin = if flip_margins { right_margin } else { left_margin };
    if margin
        .checked_add(printable_dots)
        .map_or(true, |end| end > PRINTER_WIDTH)
    {
        return Err(Error::MarginOverflow {
            margin,
            printable_dots,
        });
    }

    let lines = (0..mono.height())
        .map(|y| {
            let mut line = RasterLine::blank();
            for px in 0..printable_dots {
                if mono.get_pixel(px, y)[0] > INK_THRESHOLD {
                    continue;
                }
                line.set(margin + printable_dots - 1 - px);
            }
            line
        })
        .collect();

    Ok(lines)
}

pub fn render_preview(mono: &GrayImage) -> RgbaImage {
    DynamicImage::ImageLuma8(mono.clone()).to_rgba8()
}

/// PNG encoded preview of the monochrome bitmap.
pub fn preview_png(mono: &GrayImage) -> Result<Vec<u8>, Error> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(mono.clone()).write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}
