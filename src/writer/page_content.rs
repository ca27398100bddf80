//! Page-level plumbing over `lopdf`: resources, content streams, annotations
//! and blank pages.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::error::{Error, Result};

/// Letter, used when no page size can be inherited.
const DEFAULT_MEDIA_BOX: [i64; 4] = [0, 0, 612, 792];

/// Follow a reference to a dictionary, or take an inline one.
pub fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj {
        Object::Dictionary(dict) => Some(dict),
        Object::Reference(id) => doc.get_object(*id).ok().and_then(|o| o.as_dict().ok()),
        _ => None,
    }
}

/// Follow a reference to an array, or take an inline one.
pub fn resolve_array<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Vec<Object>> {
    match obj {
        Object::Array(items) => Some(items),
        Object::Reference(id) => doc.get_object(*id).ok().and_then(|o| o.as_array().ok()),
        _ => None,
    }
}

/// Integer or real as `f32`.
pub fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

/// The catalog dictionary.
pub fn catalog(doc: &Document) -> Result<&Dictionary> {
    let root = doc.trailer.get(b"Root")?;
    resolve_dict(doc, root).ok_or_else(|| Error::InvalidPdf("trailer has no catalog".into()))
}

/// Page object ids in page order.
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// 1-based page number of `page_id`.
pub fn page_number(doc: &Document, page_id: ObjectId) -> Option<u32> {
    doc.get_pages()
        .into_iter()
        .find(|(_, id)| *id == page_id)
        .map(|(number, _)| number)
}

/// Object id of page `number` (1-based).
pub fn page_id(doc: &Document, number: u32) -> Result<ObjectId> {
    doc.get_pages()
        .get(&number)
        .copied()
        .ok_or_else(|| Error::InvalidPdf(format!("page {} does not exist", number)))
}

/// Mutable access to the dictionary behind `obj`, following one reference.
pub(crate) fn dict_slot<'a>(doc: &'a mut Document, holder: ObjectId, key: &[u8]) -> Result<&'a mut Dictionary> {
    let target = match doc.get_object(holder)?.as_dict()?.get(key) {
        Ok(Object::Reference(id)) => Some(*id),
        Ok(Object::Dictionary(_)) => None,
        _ => {
            doc.get_object_mut(holder)?
                .as_dict_mut()?
                .set(key.to_vec(), Object::Dictionary(Dictionary::new()));
            None
        },
    };
    match target {
        Some(id) => Ok(doc.get_object_mut(id)?.as_dict_mut()?),
        None => Ok(doc.get_object_mut(holder)?.as_dict_mut()?.get_mut(key)?.as_dict_mut()?),
    }
}

/// Register `resource` as `/<category>/<name>` in the page's resources.
///
/// Inherited resources are copied onto the page first so the addition stays local.
pub fn add_page_resource(
    doc: &mut Document,
    page_id: ObjectId,
    category: &str,
    name: &str,
    resource: ObjectId,
) -> Result<()> {
    let has_own = doc.get_object(page_id)?.as_dict()?.has(b"Resources");
    if !has_own {
        let inherited = inherited_resources(doc, page_id).unwrap_or_default();
        doc.get_object_mut(page_id)?
            .as_dict_mut()?
            .set("Resources", Object::Dictionary(inherited));
    }

    let category_ref = {
        let resources = dict_slot(doc, page_id, b"Resources")?;
        match resources.get(category.as_bytes()) {
            Ok(Object::Reference(id)) => Some(*id),
            Ok(Object::Dictionary(_)) => None,
            _ => {
                resources.set(category, Object::Dictionary(Dictionary::new()));
                None
            },
        }
    };
    let entries = match category_ref {
        Some(id) => doc.get_object_mut(id)?.as_dict_mut()?,
        None => dict_slot(doc, page_id, b"Resources")?
            .get_mut(category.as_bytes())?
            .as_dict_mut()?,
    };
    entries.set(name, Object::Reference(resource));
    Ok(())
}

fn inherited_resources(doc: &Document, page_id: ObjectId) -> Option<Dictionary> {
    let mut current = doc.get_object(page_id).ok()?.as_dict().ok()?;
    loop {
        let parent = current.get(b"Parent").ok()?.as_reference().ok()?;
        current = doc.get_object(parent).ok()?.as_dict().ok()?;
        if let Ok(obj) = current.get(b"Resources") {
            return resolve_dict(doc, obj).cloned();
        }
    }
}

/// Append `operations` to the page content as a new stream.
///
/// With `isolate`, the existing content is first wrapped in `q`/`Q` so its
/// graphics state cannot leak into the appended stream.
pub fn append_content(doc: &mut Document, page_id: ObjectId, operations: Vec<Operation>, isolate: bool) -> Result<()> {
    let data = Content { operations }.encode()?;
    let stream_id = doc.add_object(Stream::new(dictionary! {}, data));

    let existing = doc.get_object_mut(page_id)?.as_dict_mut()?.remove(b"Contents");
    let mut contents = match existing {
        Some(Object::Reference(id)) => vec![Object::Reference(id)],
        Some(Object::Array(items)) => items,
        _ => Vec::new(),
    };

    if isolate && !contents.is_empty() {
        let save = doc.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
        let restore = doc.add_object(Stream::new(dictionary! {}, b"\nQ\n".to_vec()));
        contents.insert(0, Object::Reference(save));
        contents.push(Object::Reference(restore));
    }
    contents.push(Object::Reference(stream_id));

    doc.get_object_mut(page_id)?
        .as_dict_mut()?
        .set("Contents", Object::Array(contents));
    Ok(())
}

/// Add an annotation reference to the page's `/Annots`.
pub fn add_annotation(doc: &mut Document, page_id: ObjectId, annotation: ObjectId) -> Result<()> {
    let annots_ref = match doc.get_object(page_id)?.as_dict()?.get(b"Annots") {
        Ok(Object::Reference(id)) => Some(*id),
        _ => None,
    };

    let annots = match annots_ref {
        Some(id) => doc.get_object_mut(id)?.as_array_mut()?,
        None => {
            let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
            if !matches!(page.get(b"Annots"), Ok(Object::Array(_))) {
                page.set("Annots", Object::Array(Vec::new()));
            }
            page.get_mut(b"Annots")?.as_array_mut()?
        },
    };
    annots.push(Object::Reference(annotation));
    Ok(())
}

/// Remove an annotation reference from the page's `/Annots`.
///
/// Returns whether the page referenced it.
pub fn remove_annotation(doc: &mut Document, page_id: ObjectId, annotation: ObjectId) -> Result<bool> {
    remove_reference(doc, page_id, b"Annots", annotation)
}

/// Remove every reference to `target` from the array at `holder[key]`,
/// inline or indirect. Returns whether anything was removed.
pub fn remove_reference(doc: &mut Document, holder: ObjectId, key: &[u8], target: ObjectId) -> Result<bool> {
    let array_ref = match doc.get_object(holder)?.as_dict()?.get(key) {
        Ok(Object::Reference(id)) => Some(*id),
        Ok(Object::Array(_)) => None,
        _ => return Ok(false),
    };

    let items = match array_ref {
        Some(id) => doc.get_object_mut(id)?.as_array_mut()?,
        None => doc.get_object_mut(holder)?.as_dict_mut()?.get_mut(key)?.as_array_mut()?,
    };
    let before = items.len();
    items.retain(|obj| !matches!(obj, Object::Reference(id) if *id == target));
    Ok(items.len() != before)
}

/// Whether the page's `/Annots` references `annotation`.
pub fn page_has_annotation(doc: &Document, page_id: ObjectId, annotation: ObjectId) -> bool {
    doc.get_object(page_id)
        .ok()
        .and_then(|page| page.as_dict().ok())
        .and_then(|page| page.get(b"Annots").ok())
        .and_then(|annots| resolve_array(doc, annots))
        .is_some_and(|annots| {
            annots
                .iter()
                .any(|obj| matches!(obj, Object::Reference(id) if *id == annotation))
        })
}

/// Append an empty page sized like the current last page.
pub fn add_blank_page(doc: &mut Document) -> Result<ObjectId> {
    let pages_id = catalog(doc)?
        .get(b"Pages")?
        .as_reference()
        .map_err(|_| Error::InvalidPdf("catalog /Pages is not a reference".into()))?;

    let media_box = page_ids(doc)
        .last()
        .and_then(|id| doc.get_object(*id).ok())
        .and_then(|page| page.as_dict().ok())
        .and_then(|page| page.get(b"MediaBox").ok())
        .and_then(|mb| resolve_array(doc, mb))
        .cloned()
        .unwrap_or_else(|| DEFAULT_MEDIA_BOX.iter().map(|v| Object::Integer(*v)).collect());

    let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => media_box,
        "Resources" => dictionary! {},
        "Contents" => content_id,
    });

    let pages = doc.get_object_mut(pages_id)?.as_dict_mut()?;
    let count = pages.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
    pages.set("Count", count + 1);
    match pages.get_mut(b"Kids") {
        Ok(Object::Array(kids)) => {
            kids.push(Object::Reference(page_id));
        },
        _ => {
            pages.set("Kids", vec![Object::Reference(page_id)]);
        },
    }
    Ok(page_id)
}

/// `q` ... `Q` operations drawing `text` at a baseline.
pub fn text_operations(font_resource: &str, size: f32, rgb: [f32; 3], x: f32, baseline: f32, text: Vec<u8>) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![Object::Name(font_resource.as_bytes().to_vec()), size.into()]),
        Operation::new("rg", rgb.iter().map(|c| Object::Real(*c)).collect()),
        Operation::new("Td", vec![x.into(), baseline.into()]),
        Operation::new("Tj", vec![Object::string_literal(text)]),
        Operation::new("ET", vec![]),
        Operation::new("Q", vec![]),
    ]
}

/// `q` `cm` `Do` `Q` operations drawing an XObject.
pub fn xobject_operations(resource: &str, matrix: [f32; 6]) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new("cm", matrix.iter().map(|v| Object::Real(*v)).collect()),
        Operation::new("Do", vec![Object::Name(resource.as_bytes().to_vec())]),
        Operation::new("Q", vec![]),
    ]
}
