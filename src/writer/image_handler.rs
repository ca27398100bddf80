//! Image decoding and Image XObject construction.
//!
//! JPEG files are embedded as-is with the DCTDecode filter. Every other
//! format the `image` crate can read is decoded to 8-bit samples and stored
//! with FlateDecode; an alpha channel becomes a separate soft mask.

use std::io::Write;
use std::path::Path;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

/// Color space of the primary image samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// One component per pixel
    DeviceGray,
    /// Three components per pixel
    DeviceRGB,
    /// Four components per pixel
    DeviceCMYK,
}

impl ColorSpace {
    /// PDF name for this color space.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceRGB => "DeviceRGB",
            ColorSpace::DeviceCMYK => "DeviceCMYK",
        }
    }
}

/// Stream filter the encoded samples need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEncoding {
    /// JPEG bytes, passed through untouched
    Dct,
    /// Zlib-compressed raw samples
    Flate,
}

/// Image ready to be written as an XObject.
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Color space of `data`
    pub color_space: ColorSpace,
    /// Filter applied to `data`
    pub encoding: ImageEncoding,
    /// Encoded sample bytes
    pub data: Vec<u8>,
    /// Compressed alpha channel, when the source had one
    pub soft_mask: Option<Vec<u8>>,
}

impl ImageData {
    /// Load an image file, detecting the format from its contents.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| ImageError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(data)
    }

    /// Decode raw file bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, ImageError> {
        if data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8 {
            return Self::from_jpeg(data);
        }
        Self::decode(&data)
    }

    /// Wrap JPEG bytes without transcoding.
    ///
    /// Size and component count come from the frame header, so CMYK
    /// JPEGs keep their four channels.
    pub fn from_jpeg(data: Vec<u8>) -> Result<Self, ImageError> {
        let (width, height, color_space) = parse_jpeg_header(&data)?;

        Ok(Self {
            width,
            height,
            color_space,
            encoding: ImageEncoding::Dct,
            data,
            soft_mask: None,
        })
    }

    fn decode(data: &[u8]) -> Result<Self, ImageError> {
        use image::GenericImageView;

        let format = image::guess_format(data).map_err(|_| ImageError::UnsupportedFormat)?;
        let img = image::load_from_memory_with_format(data, format)
            .map_err(|e| ImageError::DecodeError(e.to_string()))?;
        let (width, height) = img.dimensions();
        let has_alpha = img.color().has_alpha();

        let (color_space, samples, alpha) = if img.color().has_color() {
            let rgba = img.to_rgba8();
            let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
            let mut alpha = Vec::with_capacity(width as usize * height as usize);
            for pixel in rgba.pixels() {
                rgb.extend_from_slice(&pixel.0[..3]);
                alpha.push(pixel.0[3]);
            }
            (ColorSpace::DeviceRGB, rgb, has_alpha.then_some(alpha))
        } else {
            let la = img.to_luma_alpha8();
            let mut gray = Vec::with_capacity(width as usize * height as usize);
            let mut alpha = Vec::with_capacity(width as usize * height as usize);
            for pixel in la.pixels() {
                gray.push(pixel.0[0]);
                alpha.push(pixel.0[1]);
            }
            (ColorSpace::DeviceGray, gray, has_alpha.then_some(alpha))
        };

        Ok(Self {
            width,
            height,
            color_space,
            encoding: ImageEncoding::Flate,
            data: deflate(&samples)?,
            soft_mask: alpha.map(|a| deflate(&a)).transpose()?,
        })
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }

    /// Largest size with the image's aspect ratio that fits the box.
    ///
    /// The image is scaled up as well as down.
    pub fn fit_to_box(&self, max_width: f32, max_height: f32) -> (f32, f32) {
        if max_width <= 0.0 || max_height <= 0.0 {
            return (0.0, 0.0);
        }
        let aspect = self.aspect_ratio();
        if aspect > max_width / max_height {
            (max_width, max_width / aspect)
        } else {
            (max_height * aspect, max_height)
        }
    }

    /// Add the image (and its soft mask) to `doc`, returning the XObject id.
    pub fn add_to_document(&self, doc: &mut Document) -> ObjectId {
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => self.width as i64,
            "Height" => self.height as i64,
            "ColorSpace" => self.color_space.pdf_name(),
            "BitsPerComponent" => 8,
            "Filter" => match self.encoding {
                ImageEncoding::Dct => "DCTDecode",
                ImageEncoding::Flate => "FlateDecode",
            },
        };

        if let Some(mask) = &self.soft_mask {
            let smask_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => self.width as i64,
                    "Height" => self.height as i64,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                    "Filter" => "FlateDecode",
                },
                mask.clone(),
            ));
            dict.set("SMask", Object::Reference(smask_id));
        }

        // Already encoded; keep lopdf from compressing it again.
        let stream = Stream::new(dict, self.data.clone()).with_compression(false);
        doc.add_object(stream)
    }
}

/// Image decoding error.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// Bytes are not an image format the decoder knows
    #[error("Unsupported image format")]
    UnsupportedFormat,

    /// Failed to decode image
    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    /// Failed to compress image data
    #[error("Compression error: {0}")]
    CompressionError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// Invalid image data
    #[error("Invalid image data: {0}")]
    InvalidData(String),
}

/// Dimensions and color space from a JPEG frame header.
fn parse_jpeg_header(data: &[u8]) -> Result<(u32, u32, ColorSpace), ImageError> {
    if data.len() < 2 || data[0] != 0xFF || data[1] != 0xD8 {
        return Err(ImageError::InvalidData("not a JPEG stream".to_string()));
    }

    let mut pos = 2;
    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }
        let marker = data[pos + 1];
        pos += 2;

        // Fill bytes and standalone markers carry no length.
        if marker == 0xFF || marker == 0x00 || marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            continue;
        }

        // SOF0..SOF15 except DHT (C4), JPG (C8) and DAC (CC)
        if (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC) {
            let header = data
                .get(pos..pos + 8)
                .ok_or_else(|| ImageError::InvalidData("truncated JPEG frame header".to_string()))?;
            let height = u16::from_be_bytes([header[3], header[4]]) as u32;
            let width = u16::from_be_bytes([header[5], header[6]]) as u32;
            let color_space = match header[7] {
                1 => ColorSpace::DeviceGray,
                3 => ColorSpace::DeviceRGB,
                4 => ColorSpace::DeviceCMYK,
                n => {
                    return Err(ImageError::InvalidData(format!("unsupported JPEG component count {}", n)));
                },
            };
            return Ok((width, height, color_space));
        }

        let Some(length) = data.get(pos..pos + 2).map(|b| u16::from_be_bytes([b[0], b[1]]) as usize) else {
            break;
        };
        pos += length;
    }

    Err(ImageError::InvalidData("JPEG has no frame header".to_string()))
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, ImageError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| ImageError::CompressionError(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| ImageError::CompressionError(e.to_string()))
}

/// Where an image is drawn on a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    /// Left edge
    pub x: f32,
    /// Bottom edge
    pub y: f32,
    /// Display width
    pub width: f32,
    /// Display height
    pub height: f32,
}

impl ImagePlacement {
    /// Create a new image placement.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Operands of the `cm` operator that maps the unit square onto the placement.
    pub fn transform_matrix(&self) -> [f32; 6] {
        [self.width, 0.0, 0.0, self.height, self.x, self.y]
    }
}
