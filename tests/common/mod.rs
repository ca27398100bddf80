//! Shared fixtures: AcroForm templates built in memory with lopdf.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lopdf::{dictionary, Document, Object, ObjectId, Stream};

/// A text field on the template.
pub struct FieldSpec {
    pub name: &'static str,
    /// `[x0, y0, x1, y1]`
    pub rect: [i64; 4],
    /// 1-based page
    pub page: usize,
}

impl FieldSpec {
    pub fn new(name: &'static str, rect: [i64; 4], page: usize) -> Self {
        Self { name, rect, page }
    }
}

/// `pages` Letter pages with one merged field/widget per spec.
pub fn template(pages: usize, fields: &[FieldSpec]) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut page_ids = Vec::new();
    for _ in 0..pages {
        let content = doc.add_object(Stream::new(dictionary! {}, b"0 0 1 rg 10 10 5 5 re f".to_vec()));
        page_ids.push(doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }));
    }

    let mut field_refs = Vec::new();
    for spec in fields {
        let page_id = page_ids[spec.page - 1];
        let field_id = doc.add_object(dictionary! {
            "FT" => "Tx",
            "T" => Object::string_literal(spec.name),
            "Type" => "Annot",
            "Subtype" => "Widget",
            "Rect" => spec.rect.iter().map(|v| Object::Integer(*v)).collect::<Vec<_>>(),
            "P" => page_id,
            "DA" => Object::string_literal("/Helv 0 Tf 0 g"),
        });
        add_annot(&mut doc, page_id, field_id);
        field_refs.push(Object::Reference(field_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
            "Count" => pages as i64,
        }),
    );
    let helv = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let form_id = doc.add_object(dictionary! {
        "Fields" => field_refs,
        "DA" => Object::string_literal("/Helv 0 Tf 0 g"),
        "DR" => dictionary! { "Font" => dictionary! { "Helv" => helv } },
    });
    let catalog = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
        "AcroForm" => form_id,
    });
    doc.trailer.set("Root", catalog);
    doc
}

fn add_annot(doc: &mut Document, page_id: ObjectId, annot: ObjectId) {
    let page = doc.get_object_mut(page_id).unwrap().as_dict_mut().unwrap();
    if !matches!(page.get(b"Annots"), Ok(Object::Array(_))) {
        page.set("Annots", Vec::<Object>::new());
    }
    page.get_mut(b"Annots")
        .unwrap()
        .as_array_mut()
        .unwrap()
        .push(Object::Reference(annot));
}

/// Write `doc` to `dir/name`.
pub fn save(dir: &Path, name: &str, mut doc: Document) -> PathBuf {
    let path = dir.join(name);
    doc.save(&path).unwrap();
    path
}

/// Names of files in `dir` starting with `temp_`.
pub fn scratch_files(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("temp_"))
        .collect()
}

/// Annotations on page `number` of `doc`, resolved.
pub fn page_annotations(doc: &Document, number: u32) -> Vec<lopdf::Dictionary> {
    let page_id = doc.get_pages()[&number];
    let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
    let Ok(annots) = page.get(b"Annots") else {
        return Vec::new();
    };
    let annots = match annots {
        Object::Reference(id) => doc.get_object(*id).unwrap().as_array().unwrap(),
        other => other.as_array().unwrap(),
    };
    annots
        .iter()
        .map(|a| doc.get_object(a.as_reference().unwrap()).unwrap().as_dict().unwrap().clone())
        .collect()
}

/// Decoded content of every stream on page `number`, concatenated.
pub fn page_content(doc: &Document, number: u32) -> String {
    let page_id = doc.get_pages()[&number];
    String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
}

/// Content operations on page `number` as `(operator, operands)`.
pub fn page_operations(doc: &Document, number: u32) -> Vec<lopdf::content::Operation> {
    let page_id = doc.get_pages()[&number];
    let bytes = doc.get_page_content(page_id).unwrap();
    lopdf::content::Content::decode(&bytes).unwrap().operations
}

/// Numeric operands of `op`.
pub fn numbers(op: &lopdf::content::Operation) -> Vec<f32> {
    op.operands.iter().filter_map(|o| o.as_float().ok()).collect()
}

/// Text shown by every `Tj` on page `number`.
pub fn shown_text(doc: &Document, number: u32) -> Vec<String> {
    page_operations(doc, number)
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| op.operands.first())
        .filter_map(|o| o.as_str().ok())
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        .collect()
}
