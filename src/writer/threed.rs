//! 3D annotations (PDF spec Section 13.6).
//!
//! A 3D annotation references a 3D stream holding U3D or PRC data and a
//! default view that fixes render mode, lighting and background. The
//! annotation activates according to its `/3DA` dictionary.

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use serde::Deserialize;

use crate::geometry::Rect;

/// 3D artwork encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreeDFormat {
    /// Universal 3D (ECMA-363)
    U3D,
    /// Product Representation Compact (ISO 14739-1)
    PRC,
}

impl ThreeDFormat {
    /// Detect the format from leading bytes, falling back to the file extension.
    pub fn detect(data: &[u8], extension: Option<&str>) -> Self {
        if data.starts_with(b"PRC") {
            return ThreeDFormat::PRC;
        }
        if data.starts_with(b"U3D\0") {
            return ThreeDFormat::U3D;
        }
        match extension {
            Some(ext) if ext.eq_ignore_ascii_case("prc") => ThreeDFormat::PRC,
            _ => ThreeDFormat::U3D,
        }
    }

    /// `/Subtype` of the 3D stream.
    pub fn subtype(&self) -> &'static str {
        match self {
            ThreeDFormat::U3D => "U3D",
            ThreeDFormat::PRC => "PRC",
        }
    }
}

/// Lighting scheme (`/LS /Subtype`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum ThreeDLighting {
    /// Lights stored in the artwork
    Artwork,
    /// No lights
    None,
    /// Three white lights
    White,
    /// Daylight
    Day,
    /// Night
    Night,
    /// CAD-style lights
    CAD,
    /// Single light attached to the camera
    #[default]
    Headlamp,
}

impl ThreeDLighting {
    /// PDF name.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ThreeDLighting::Artwork => "Artwork",
            ThreeDLighting::None => "None",
            ThreeDLighting::White => "White",
            ThreeDLighting::Day => "Day",
            ThreeDLighting::Night => "Night",
            ThreeDLighting::CAD => "CAD",
            ThreeDLighting::Headlamp => "Headlamp",
        }
    }
}

/// Render mode (`/RM /Subtype`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum ThreeDRenderMode {
    /// Opaque faces
    #[default]
    Solid,
    /// Opaque faces with edges
    SolidWireframe,
    /// See-through faces
    Transparent,
    /// Edges only
    Wireframe,
    /// Line-art illustration
    Illustration,
}

impl ThreeDRenderMode {
    /// PDF name.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ThreeDRenderMode::Solid => "Solid",
            ThreeDRenderMode::SolidWireframe => "SolidWireframe",
            ThreeDRenderMode::Transparent => "Transparent",
            ThreeDRenderMode::Wireframe => "Wireframe",
            ThreeDRenderMode::Illustration => "Illustration",
        }
    }
}

/// When the annotation becomes live (`/3DA /A`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum ThreeDActivation {
    /// As soon as the page opens
    #[default]
    PageOpen,
    /// When the page becomes visible
    PageVisible,
    /// When the user clicks it
    Explicit,
}

impl ThreeDActivation {
    /// PDF name.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ThreeDActivation::PageOpen => "PO",
            ThreeDActivation::PageVisible => "PV",
            ThreeDActivation::Explicit => "XA",
        }
    }
}

/// Background color of the 3D view, DeviceRGB.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ThreeDBackground(pub [f32; 3]);

impl Default for ThreeDBackground {
    fn default() -> Self {
        Self::white()
    }
}

impl ThreeDBackground {
    /// White.
    pub fn white() -> Self {
        Self([1.0, 1.0, 1.0])
    }

    fn build(&self) -> Dictionary {
        dictionary! {
            "Type" => "3DBG",
            "Subtype" => "SC",
            "CS" => "DeviceRGB",
            "C" => self.0.iter().map(|c| Object::Real(*c)).collect::<Vec<_>>(),
        }
    }
}

/// A named 3D view using the artwork's own camera node.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreeDView {
    /// External and internal view name
    pub name: String,
    /// Render mode
    pub render_mode: ThreeDRenderMode,
    /// Lighting
    pub lighting: ThreeDLighting,
    /// Background
    pub background: ThreeDBackground,
}

impl ThreeDView {
    /// View named `name` with solid rendering, headlamp lighting and a white background.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            render_mode: ThreeDRenderMode::default(),
            lighting: ThreeDLighting::default(),
            background: ThreeDBackground::default(),
        }
    }

    /// Set the render mode.
    pub fn with_render_mode(mut self, mode: ThreeDRenderMode) -> Self {
        self.render_mode = mode;
        self
    }

    /// Set the lighting.
    pub fn with_lighting(mut self, lighting: ThreeDLighting) -> Self {
        self.lighting = lighting;
        self
    }

    /// Set the background.
    pub fn with_background(mut self, background: ThreeDBackground) -> Self {
        self.background = background;
        self
    }

    /// `/3DView` dictionary.
    pub fn build(&self) -> Dictionary {
        let name = Object::string_literal(self.name.as_str());
        dictionary! {
            "Type" => "3DView",
            "XN" => name.clone(),
            "IN" => name.clone(),
            // Camera comes from the artwork node with the view's name.
            "MS" => "U3D",
            "U3DPath" => name,
            "RM" => dictionary! { "Type" => "3DRenderMode", "Subtype" => self.render_mode.pdf_name() },
            "LS" => dictionary! { "Type" => "3DLightingScheme", "Subtype" => self.lighting.pdf_name() },
            "BG" => self.background.build(),
        }
    }
}

/// A 3D annotation ready to be written.
#[derive(Debug, Clone)]
pub struct ThreeDAnnotation {
    /// Annotation rectangle
    pub rect: Rect,
    /// Encoded artwork
    pub data: Vec<u8>,
    /// Artwork format
    pub format: ThreeDFormat,
    /// Default view
    pub view: ThreeDView,
    /// Activation trigger
    pub activation: ThreeDActivation,
}

impl ThreeDAnnotation {
    /// Annotation over `rect` showing `data`.
    pub fn new(rect: Rect, data: Vec<u8>, format: ThreeDFormat, view: ThreeDView) -> Self {
        Self {
            rect,
            data,
            format,
            view,
            activation: ThreeDActivation::default(),
        }
    }

    /// Set the activation trigger.
    pub fn with_activation(mut self, activation: ThreeDActivation) -> Self {
        self.activation = activation;
        self
    }

    /// Write the stream, view, appearance and annotation objects; returns the annotation id.
    ///
    /// The annotation is not attached to the page's `/Annots`.
    pub fn add_to_document(&self, doc: &mut Document, page_id: ObjectId) -> ObjectId {
        let view_id = doc.add_object(self.view.build());

        let stream_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "3D",
                "Subtype" => self.format.subtype(),
                "VA" => vec![Object::Reference(view_id)],
                "DV" => 0,
            },
            self.data.clone(),
        ));

        // Poster shown while inactive: the background color filling the box.
        let [r, g, b] = self.view.background.0;
        let poster = format!("q {} {} {} rg 0 0 {} {} re f Q", r, g, b, self.rect.width, self.rect.height);
        let appearance_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => vec![0.into(), 0.into(), Object::Real(self.rect.width), Object::Real(self.rect.height)],
            },
            poster.into_bytes(),
        ));

        let rect: Vec<Object> = self.rect.to_pdf_array().iter().map(|v| Object::Real(*v)).collect();
        doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "3D",
            "Rect" => rect,
            "P" => page_id,
            // Print
            "F" => 4,
            "Contents" => Object::string_literal(self.view.name.as_str()),
            "3DD" => stream_id,
            "3DV" => view_id,
            "3DA" => dictionary! {
                "A" => self.activation.pdf_name(),
                "D" => "PI",
                "AIS" => "I",
                "DIS" => "U",
                "TB" => true,
                "NP" => false,
            },
            "AP" => dictionary! { "N" => appearance_id },
        })
    }
}
