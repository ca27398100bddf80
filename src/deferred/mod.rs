//! Second-phase placement of embedded 3D assets.
//!
//! 3D fields are not filled during population. Their widget geometry is
//! recorded as [`DeferredAsset`]s, the fields are removed, and once the
//! populated document has been written this pass reopens it and stamps one
//! 3D annotation per asset.

use std::path::{Path, PathBuf};

use lopdf::{Document, ObjectId};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::writer::page_content;
use crate::writer::threed::{
    ThreeDActivation, ThreeDAnnotation, ThreeDBackground, ThreeDFormat, ThreeDLighting, ThreeDRenderMode, ThreeDView,
};

/// A 3D asset waiting for the second pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DeferredAsset {
    /// Geometry of the removed widget
    pub rect: Rect,
    /// 1-based page number; 0 is treated as 1
    pub page: u32,
    /// U3D or PRC file
    pub asset_path: PathBuf,
}

impl DeferredAsset {
    /// Create a deferred asset.
    pub fn new(rect: Rect, page: u32, asset_path: impl Into<PathBuf>) -> Self {
        Self {
            rect,
            page,
            asset_path: asset_path.into(),
        }
    }

    /// Annotation rectangle `[x, y - h, x + w, y]`.
    pub fn annotation_rect(&self) -> Rect {
        let Rect { x, y, width, height } = self.rect;
        Rect::from_points(x, y - height, x + width, y)
    }

    /// Page the annotation goes on.
    pub fn target_page(&self) -> u32 {
        self.page.max(1)
    }

    /// View name: the asset's file stem.
    pub fn view_name(&self) -> String {
        self.asset_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Default".to_string())
    }

    fn failure(&self, reason: impl Into<String>) -> Error {
        Error::AssetPlacement {
            asset: self.asset_path.clone(),
            reason: reason.into(),
        }
    }
}

/// Appearance of stamped 3D annotations.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ThreeDDefaults {
    /// When the annotation activates
    pub activation: ThreeDActivation,
    /// Render mode of the default view
    pub render_mode: ThreeDRenderMode,
    /// Lighting of the default view
    pub lighting: ThreeDLighting,
    /// Background of the default view
    pub background: ThreeDBackground,
}

impl ThreeDDefaults {
    /// Default view named `name`.
    pub fn view(&self, name: impl Into<String>) -> ThreeDView {
        ThreeDView::new(name)
            .with_render_mode(self.render_mode)
            .with_lighting(self.lighting)
            .with_background(self.background)
    }
}

/// Outcome of a deferred pass.
#[derive(Debug, Default)]
pub struct DeferredPassReport {
    /// Assets stamped, in order
    pub placed: Vec<PathBuf>,
    /// Assets that failed, as `AssetPlacement` errors
    pub skipped: Vec<Error>,
    /// Blank pages appended to reach target pages
    pub pages_added: u32,
}

/// Stamps deferred 3D assets into a document.
#[derive(Debug, Clone)]
pub struct DeferredAssetPass {
    assets: Vec<DeferredAsset>,
    defaults: ThreeDDefaults,
}

impl DeferredAssetPass {
    /// Pass over `assets`.
    pub fn new(assets: Vec<DeferredAsset>, defaults: ThreeDDefaults) -> Self {
        Self { assets, defaults }
    }

    /// Assets in the pass.
    pub fn assets(&self) -> &[DeferredAsset] {
        &self.assets
    }

    /// True if there is nothing to stamp.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Load `path`, stamp every asset and save it back.
    pub fn run(&self, path: impl AsRef<Path>) -> Result<DeferredPassReport> {
        let path = path.as_ref();
        let mut doc = Document::load(path)?;
        let report = self.stamp(&mut doc);
        doc.save(path)?;
        Ok(report)
    }

    /// Stamp every asset into `doc`.
    ///
    /// A failing asset is logged and recorded in the report; the rest still
    /// get placed.
    pub fn stamp(&self, doc: &mut Document) -> DeferredPassReport {
        let mut report = DeferredPassReport::default();
        for asset in &self.assets {
            match self.stamp_one(doc, asset, &mut report.pages_added) {
                Ok(_) => report.placed.push(asset.asset_path.clone()),
                Err(e) => {
                    log::warn!("Skipping 3D asset: {}", e);
                    report.skipped.push(e);
                },
            }
        }
        log::info!(
            "Deferred pass placed {} of {} 3D assets ({} pages added)",
            report.placed.len(),
            self.assets.len(),
            report.pages_added
        );
        report
    }

    fn stamp_one(&self, doc: &mut Document, asset: &DeferredAsset, pages_added: &mut u32) -> Result<ObjectId> {
        let target = asset.target_page();
        while (doc.get_pages().len() as u32) < target {
            page_content::add_blank_page(doc).map_err(|e| asset.failure(format!("cannot add page: {}", e)))?;
            *pages_added += 1;
        }
        let page_id = page_content::page_id(doc, target).map_err(|e| asset.failure(e.to_string()))?;

        let data = std::fs::read(&asset.asset_path).map_err(|e| asset.failure(e.to_string()))?;
        if data.is_empty() {
            return Err(asset.failure("asset file is empty"));
        }
        let extension = asset.asset_path.extension().and_then(|e| e.to_str());
        let format = ThreeDFormat::detect(&data, extension);

        let annotation = ThreeDAnnotation::new(
            asset.annotation_rect(),
            data,
            format,
            self.defaults.view(asset.view_name()),
        )
        .with_activation(self.defaults.activation);
        let annotation_id = annotation.add_to_document(doc, page_id);
        page_content::add_annotation(doc, page_id, annotation_id).map_err(|e| asset.failure(e.to_string()))?;

        log::debug!(
            "Placed {} 3D asset {} on page {}",
            format.subtype(),
            asset.asset_path.display(),
            target
        );
        Ok(annotation_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Object, Stream};

    fn two_page_doc() -> Document {
        let mut doc = Document::with_version("1.6");
        let pages_id = doc.new_object_id();
        let mut kids = Vec::new();
        for _ in 0..2 {
            let content = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
            kids.push(
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "Contents" => content,
                    "MediaBox" => vec![0.into(), 0.into(), 400.into(), 300.into()],
                })
                .into(),
            );
        }
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! { "Type" => "Pages", "Kids" => kids, "Count" => 2 }),
        );
        let catalog = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog);
        doc
    }

    #[test]
    fn test_annotation_rect_hangs_below_origin() {
        let asset = DeferredAsset::new(Rect::new(50.0, 400.0, 200.0, 100.0), 1, "model.u3d");
        assert_eq!(asset.annotation_rect(), Rect::new(50.0, 300.0, 200.0, 100.0));
        assert_eq!(asset.view_name(), "model");
    }

    #[test]
    fn test_page_zero_means_first_page() {
        let asset = DeferredAsset::new(Rect::new(0.0, 0.0, 1.0, 1.0), 0, "a.u3d");
        assert_eq!(asset.target_page(), 1);
    }

    #[test]
    fn test_stamp_extends_pages_and_skips_bad_assets() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("bracket.u3d");
        std::fs::write(&good, b"U3D\0payload").unwrap();
        let missing = dir.path().join("missing.prc");

        let pass = DeferredAssetPass::new(
            vec![
                DeferredAsset::new(Rect::new(10.0, 200.0, 100.0, 50.0), 5, &missing),
                DeferredAsset::new(Rect::new(10.0, 200.0, 100.0, 50.0), 5, &good),
            ],
            ThreeDDefaults::default(),
        );
        let mut doc = two_page_doc();
        let report = pass.stamp(&mut doc);

        assert_eq!(doc.get_pages().len(), 5);
        assert_eq!(report.pages_added, 3);
        assert_eq!(report.placed, vec![good]);
        assert_eq!(report.skipped.len(), 1);
        assert!(!report.skipped[0].is_fatal());

        let page = page_content::page_id(&doc, 5).unwrap();
        let page_dict = doc.get_object(page).unwrap().as_dict().unwrap();
        let annots = page_dict.get(b"Annots").unwrap().as_array().unwrap();
        assert_eq!(annots.len(), 1);
        let annot = doc.get_object(annots[0].as_reference().unwrap()).unwrap().as_dict().unwrap();
        let rect: Vec<f32> = annot
            .get(b"Rect")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .filter_map(page_content::number)
            .collect();
        assert_eq!(rect, vec![10.0, 150.0, 110.0, 200.0]);
    }

    #[test]
    fn test_defaults_drive_view() {
        let defaults = ThreeDDefaults {
            lighting: ThreeDLighting::Night,
            ..ThreeDDefaults::default()
        };
        let view = defaults.view("x");
        assert_eq!(view.lighting, ThreeDLighting::Night);
        assert_eq!(view.render_mode, ThreeDRenderMode::Solid);
    }
}
