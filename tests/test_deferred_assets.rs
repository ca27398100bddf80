//! Two-phase 3D placement through the builder and the standalone pass.

mod common;

use common::FieldSpec;
use lopdf::Document;
use pdf_filler::deferred::{DeferredAsset, DeferredAssetPass, ThreeDDefaults};
use pdf_filler::form::AcroFormDocument;
use pdf_filler::geometry::Rect;
use pdf_filler::record::RecordField;
use pdf_filler::{Error, FieldOutcome, FieldPolicy, FillConfig, PdfBuilder, SessionState};

fn rect_of(annot: &lopdf::Dictionary) -> Vec<f32> {
    annot
        .get(b"Rect")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_float().unwrap())
        .collect()
}

fn is_3d(annot: &lopdf::Dictionary) -> bool {
    matches!(annot.get(b"Subtype").and_then(|s| s.as_name()), Ok(b"3D"))
}

#[test]
fn test_builder_places_assets_and_keeps_filling() {
    let dir = tempfile::tempdir().unwrap();
    let template = common::save(
        dir.path(),
        "template.pdf",
        common::template(
            2,
            &[
                FieldSpec::new("Part", [50, 100, 150, 160], 2),
                FieldSpec::new("Spare", [300, 300, 400, 400], 1),
                FieldSpec::new("Notes", [72, 700, 272, 720], 1),
            ],
        ),
    );
    let part = dir.path().join("bracket.u3d");
    std::fs::write(&part, b"U3D\0mesh").unwrap();
    let spare = dir.path().join("empty.prc");
    std::fs::write(&spare, b"").unwrap();

    let target = dir.path().join("assembly.pdf");
    let config = FillConfig::default().with_font_folder(dir.path().join("no-fonts"));
    let mut builder = PdfBuilder::open(&template, &target, config).unwrap();

    let report = builder
        .fill_fields(&[
            RecordField::new("Part", Some(part.to_string_lossy().into_owned()), FieldPolicy::optional().three_d()),
            RecordField::new("Spare", Some(spare.to_string_lossy().into_owned()), FieldPolicy::optional().three_d()),
        ])
        .unwrap();
    assert_eq!(report.count(|o| *o == FieldOutcome::Deferred), 2);
    assert_eq!(builder.pending_assets().len(), 2);

    let pass = builder.place_deferred_assets().unwrap();
    assert_eq!(pass.placed, vec![part.clone()]);
    assert_eq!(pass.skipped.len(), 1);
    assert!(matches!(&pass.skipped[0], Error::AssetPlacement { asset, .. } if *asset == spare));
    assert_eq!(builder.state(), SessionState::Reopened);
    assert!(builder.pending_assets().is_empty());
    assert_eq!(common::scratch_files(dir.path()).len(), 1);

    // The reopened document still accepts edits.
    builder
        .fill_fields(&[RecordField::new("Notes", Some("rev B".into()), FieldPolicy::required())])
        .unwrap();
    builder.save().unwrap();
    assert!(common::scratch_files(dir.path()).is_empty());

    let filled = AcroFormDocument::load(&target).unwrap();
    assert_eq!(filled.field_value("Notes").as_deref(), Some("rev B"));
    assert!(!filled.field_names().iter().any(|n| n == "Part" || n == "Spare"));

    let page_two: Vec<_> = common::page_annotations(filled.document(), 2)
        .into_iter()
        .filter(is_3d)
        .collect();
    assert_eq!(page_two.len(), 1);
    assert_eq!(rect_of(&page_two[0]), vec![50.0, 40.0, 150.0, 100.0]);
    assert!(page_two[0].has(b"3DD"));
    assert!(common::page_annotations(filled.document(), 1).iter().all(|a| !is_3d(a)));
}

#[test]
fn test_pass_appends_pages_up_to_the_target() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::save(dir.path(), "two_pages.pdf", common::template(2, &[]));
    let asset = dir.path().join("gear.prc");
    std::fs::write(&asset, b"PRC binary").unwrap();

    let pass = DeferredAssetPass::new(
        vec![DeferredAsset::new(Rect::new(10.0, 200.0, 100.0, 50.0), 5, &asset)],
        ThreeDDefaults::default(),
    );
    let report = pass.run(&path).unwrap();
    assert_eq!(report.pages_added, 3);
    assert_eq!(report.placed.len(), 1);

    let doc = Document::load(&path).unwrap();
    assert_eq!(doc.get_pages().len(), 5);
    let annots = common::page_annotations(&doc, 5);
    assert_eq!(annots.len(), 1);
    assert!(is_3d(&annots[0]));
    assert_eq!(rect_of(&annots[0]), vec![10.0, 150.0, 110.0, 200.0]);
}

#[test]
fn test_missing_asset_leaves_document_valid() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::save(dir.path(), "one_page.pdf", common::template(1, &[]));

    let pass = DeferredAssetPass::new(
        vec![DeferredAsset::new(Rect::new(0.0, 100.0, 50.0, 50.0), 1, dir.path().join("gone.u3d"))],
        ThreeDDefaults::default(),
    );
    let report = pass.run(&path).unwrap();
    assert!(report.placed.is_empty());
    assert_eq!(report.skipped.len(), 1);

    let doc = Document::load(&path).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
    assert!(common::page_annotations(&doc, 1).is_empty());
}
