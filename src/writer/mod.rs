//! PDF output plumbing.
//!
//! - [`image_handler`]: image decoding and image XObjects
//! - [`page_content`]: page resources, content streams, annotations and blank pages
//! - [`threed`]: 3D annotations and views

pub mod image_handler;
pub mod page_content;
pub mod threed;

pub use image_handler::{ImageData, ImageError, ImagePlacement};
pub use threed::{ThreeDAnnotation, ThreeDFormat, ThreeDView};
