//! # Photo Loading and Normalization
//!
//! Resolves a photo reference (URL or data URI) into bytes the PDF writer
//! can embed. Camera JPEGs routinely arrive rotated with an EXIF
//! orientation tag, so fetched images are decoded, transformed upright,
//! and re-encoded as JPEG quality 90. Data URIs come from the app's own
//! crop/compress step and embed as-is, which also preserves the alpha
//! channel of circular cover crops.
//!
//! JPEG output passes through to the PDF without another decode
//! (DCTDecode); PNG decodes to RGB pixels plus a separate alpha channel
//! for SMask transparency.

use std::io::Cursor;
use std::time::Duration;

use crate::error::BookletError;

/// Byte source for non-data-URI photo references.
///
/// The bundled implementation speaks HTTP; tests substitute a map lookup.
/// Errors are plain strings because every failure on this path is
/// recoverable: the caller logs and drops that one photo.
pub trait PhotoFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, String>;
}

/// Blocking HTTP fetcher with a bounded per-request timeout, so one dead
/// photo host cannot stall the whole booklet.
pub struct HttpPhotoFetcher {
    client: reqwest::blocking::Client,
}

const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

impl HttpPhotoFetcher {
    pub fn new() -> Result<Self, BookletError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| BookletError::FetchError(e.to_string()))?;
        Ok(Self { client })
    }
}

impl PhotoFetcher for HttpPhotoFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, String> {
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| format!("GET {} failed: {}", url, e))?;
        let bytes = response
            .bytes()
            .map_err(|e| format!("Reading body of {} failed: {}", url, e))?;
        Ok(bytes.to_vec())
    }
}

/// A photo ready for PDF embedding.
#[derive(Debug, Clone)]
pub struct NormalizedPhoto {
    pub image: EmbeddableImage,
    /// True when the EXIF orientation was 5..=8 (the camera was held
    /// upright). The pixels are already rotated; this only informs layout.
    pub portrait_by_orientation: bool,
}

/// Decoded/classified image data in a form the PDF serializer consumes.
#[derive(Debug, Clone)]
pub struct EmbeddableImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

#[derive(Debug, Clone)]
pub enum ImagePixelData {
    /// Raw JPEG bytes, embedded directly with DCTDecode.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// Decoded RGB pixels + optional alpha channel.
    Decoded {
        /// width * height * 3 bytes (RGB)
        rgb: Vec<u8>,
        /// width * height bytes (grayscale alpha). None if fully opaque.
        alpha: Option<Vec<u8>>,
    },
}

/// JPEG color space for the PDF /ColorSpace entry.
#[derive(Debug, Clone, Copy)]
pub enum JpegColorSpace {
    DeviceRGB,
    DeviceGray,
}

/// Resolve one photo reference into embeddable form.
///
/// Data URIs decode directly and count as already upright. Anything else
/// goes through the fetcher, the EXIF orientation scan, and the
/// normalizing re-encode; if that re-encode fails the original bytes are
/// embedded unmodified rather than losing the photo.
pub fn load_photo(fetcher: &dyn PhotoFetcher, src: &str) -> Result<NormalizedPhoto, String> {
    if src.starts_with("data:") {
        let bytes = data_url_bytes(src)?;
        let image = decode_image_bytes(&bytes)?;
        return Ok(NormalizedPhoto {
            image,
            portrait_by_orientation: false,
        });
    }

    let bytes = fetcher.fetch(src)?;
    let orientation = exif_orientation(&bytes);
    let portrait_by_orientation = (5..=8).contains(&orientation);

    let upright = match normalize_orientation(&bytes, orientation) {
        Some(re_encoded) => re_encoded,
        None => {
            log::debug!("Re-encode of {} failed, embedding original bytes", src);
            bytes
        }
    };

    let image = decode_image_bytes(&upright)?;
    Ok(NormalizedPhoto {
        image,
        portrait_by_orientation,
    })
}

/// Extract the base64 payload of a data URI.
fn data_url_bytes(src: &str) -> Result<Vec<u8>, String> {
    let comma_pos = src
        .find(',')
        .ok_or_else(|| "Invalid data URI: missing comma".to_string())?;
    base64_decode(&src[comma_pos + 1..])
}

fn base64_decode(input: &str) -> Result<Vec<u8>, String> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(input)
        .map_err(|e| format!("Base64 decode error: {}", e))
}

/// Read the EXIF orientation tag (1..=8) from JPEG bytes; 1 when absent.
///
/// Walks the JPEG segment chain for APP1, checks the `Exif\0\0` signature,
/// then walks IFD0 of the embedded TIFF for tag 0x0112. Endianness comes
/// from the TIFF header (`II` little, `MM` big). Stops at SOS; EXIF never
/// follows entropy-coded data.
pub fn exif_orientation(bytes: &[u8]) -> u8 {
    if bytes.len() < 2 || bytes[0] != 0xFF || bytes[1] != 0xD8 {
        return 1;
    }

    let mut offset = 2usize;
    while offset + 4 <= bytes.len() {
        if bytes[offset] != 0xFF {
            break;
        }
        let marker = bytes[offset + 1];
        if marker == 0xD9 || marker == 0xDA {
            break; // EOI or SOS
        }
        let length = u16::from_be_bytes([bytes[offset + 2], bytes[offset + 3]]) as usize;
        if length < 2 || offset + 2 + length > bytes.len() {
            break;
        }
        if marker == 0xE1 {
            let payload = &bytes[offset + 4..offset + 2 + length];
            if let Some(value) = orientation_from_exif_payload(payload) {
                return value;
            }
        }
        offset += 2 + length;
    }

    1
}

fn orientation_from_exif_payload(payload: &[u8]) -> Option<u8> {
    let tiff = payload.strip_prefix(b"Exif\0\0")?;
    let little_endian = match tiff.get(0..2)? {
        b"II" => true,
        b"MM" => false,
        _ => return None,
    };

    let ifd_offset = read_u32(tiff, 4, little_endian)? as usize;
    let entry_count = read_u16(tiff, ifd_offset, little_endian)? as usize;

    for i in 0..entry_count {
        let entry = ifd_offset + 2 + i * 12;
        let tag = read_u16(tiff, entry, little_endian)?;
        if tag == 0x0112 {
            // Orientation is a SHORT; the value sits in the first two
            // bytes of the entry's inline value field.
            let value = read_u16(tiff, entry + 8, little_endian)?;
            return if (1..=8).contains(&value) {
                Some(value as u8)
            } else {
                None
            };
        }
    }

    None
}

fn read_u16(data: &[u8], at: usize, little_endian: bool) -> Option<u16> {
    let b = data.get(at..at + 2)?;
    Some(if little_endian {
        u16::from_le_bytes([b[0], b[1]])
    } else {
        u16::from_be_bytes([b[0], b[1]])
    })
}

fn read_u32(data: &[u8], at: usize, little_endian: bool) -> Option<u32> {
    let b = data.get(at..at + 4)?;
    Some(if little_endian {
        u32::from_le_bytes([b[0], b[1], b[2], b[3]])
    } else {
        u32::from_be_bytes([b[0], b[1], b[2], b[3]])
    })
}

/// Decode, rotate/flip upright, re-encode as JPEG quality 90.
/// None on any failure; the caller falls back to the original bytes.
fn normalize_orientation(data: &[u8], orientation: u8) -> Option<Vec<u8>> {
    let img = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()?
        .decode()
        .ok()?;

    let img = apply_orientation(img, orientation);
    let rgb = img.to_rgb8();
    let (width, height) = (rgb.width(), rgb.height());

    let mut buf = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, 90);
    image::ImageEncoder::write_image(encoder, rgb.as_raw(), width, height, image::ColorType::Rgb8)
        .ok()?;
    Some(buf)
}

/// The standard transform for each EXIF orientation value.
fn apply_orientation(img: image::DynamicImage, orientation: u8) -> image::DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

/// Detect image format from magic bytes and classify for embedding.
fn decode_image_bytes(data: &[u8]) -> Result<EmbeddableImage, String> {
    if data.len() < 4 {
        return Err("Image data too short".to_string());
    }

    if is_jpeg(data) {
        classify_jpeg(data)
    } else if is_png(data) {
        decode_png(data)
    } else {
        Err("Unsupported image format (expected JPEG or PNG)".to_string())
    }
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

fn is_png(data: &[u8]) -> bool {
    data.len() >= 4 && data[0] == 0x89 && data[1] == 0x50 && data[2] == 0x4E && data[3] == 0x47
}

/// JPEG: read dimensions and color space without decoding pixels.
/// The raw bytes pass through to the PDF (DCTDecode).
fn classify_jpeg(data: &[u8]) -> Result<EmbeddableImage, String> {
    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("JPEG format detection error: {}", e))?;

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| format!("Failed to read JPEG dimensions: {}", e))?;

    let color_space = detect_jpeg_color_space(data);

    Ok(EmbeddableImage {
        pixel_data: ImagePixelData::Jpeg {
            data: data.to_vec(),
            color_space,
        },
        width_px: width,
        height_px: height,
    })
}

/// Scan JPEG markers for the SOF segment and read the component count.
fn detect_jpeg_color_space(data: &[u8]) -> JpegColorSpace {
    let mut i = 2; // skip SOI marker (FF D8)
    while i + 1 < data.len() {
        if data[i] != 0xFF {
            break;
        }
        let marker = data[i + 1];
        // SOF markers: C0-C3, C5-C7, C9-CB, CD-CF
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof {
            // SOF segment: length(2) + precision(1) + height(2) + width(2) + num_components(1)
            if i + 9 < data.len() {
                let num_components = data[i + 9];
                return if num_components == 1 {
                    JpegColorSpace::DeviceGray
                } else {
                    JpegColorSpace::DeviceRGB
                };
            }
        }
        if i + 3 < data.len() {
            let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
            i += 2 + seg_len;
        } else {
            break;
        }
    }
    JpegColorSpace::DeviceRGB
}

/// PNG: decode to RGBA, split into RGB + alpha.
fn decode_png(data: &[u8]) -> Result<EmbeddableImage, String> {
    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("PNG format detection error: {}", e))?;

    let img = reader
        .decode()
        .map_err(|e| format!("Failed to decode PNG: {}", e))?;

    let rgba = img.to_rgba8();
    let width = rgba.width();
    let height = rgba.height();

    let pixel_count = (width * height) as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    let mut has_transparency = false;

    for pixel in rgba.pixels() {
        rgb.push(pixel[0]);
        rgb.push(pixel[1]);
        rgb.push(pixel[2]);
        let a = pixel[3];
        alpha.push(a);
        if a != 255 {
            has_transparency = true;
        }
    }

    Ok(EmbeddableImage {
        pixel_data: ImagePixelData::Decoded {
            rgb,
            alpha: if has_transparency { Some(alpha) } else { None },
        },
        width_px: width,
        height_px: height,
    })
}
