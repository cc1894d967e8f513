//! Page concatenation across documents.
//!
//! The merged document is built from the first source: every later source
//! has its objects imported under a shifted id range (so references never
//! collide), and the page tree is rebuilt with all page references in
//! source order.

use crate::error::PdfKitError;
use lopdf::{Document, Object, ObjectId};

/// Concatenate every page of every source, in order, into one PDF.
pub fn merge_documents(sources: &[Vec<u8>]) -> Result<Vec<u8>, PdfKitError> {
    let mut loaded = Vec::with_capacity(sources.len());
    for (i, bytes) in sources.iter().enumerate() {
        let doc = Document::load_mem(bytes).map_err(|e| {
            PdfKitError::ParseError(format!("document {}: {}", i + 1, e))
        })?;
        loaded.push(doc);
    }

    let mut iter = loaded.into_iter();
    let mut dest = iter
        .next()
        .ok_or_else(|| PdfKitError::OperationError("no documents to merge".into()))?;
    let mut page_refs = ordered_page_refs(&dest);

    for source in iter {
        let offset = dest.max_id;
        let source_pages = ordered_page_refs(&source);
        let source_max_id = source.max_id;

        for (id, object) in source.objects.into_iter() {
            dest.objects
                .insert((id.0 + offset, id.1), shift_references(object, offset));
        }

        page_refs.extend(
            source_pages
                .into_iter()
                .map(|(num, gen)| (num + offset, gen)),
        );

        dest.max_id = (source_max_id + offset).max(dest.max_id);
    }

    rebuild_page_tree(&mut dest, &page_refs)?;
    dest.compress();

    let mut buffer = Vec::new();
    dest.save_to(&mut buffer)
        .map_err(|e| PdfKitError::OperationError(format!("save failed: {}", e)))?;
    Ok(buffer)
}

/// Page object ids in page order.
fn ordered_page_refs(doc: &Document) -> Vec<ObjectId> {
    // get_pages keys by 1-based page number, so iteration is page order
    doc.get_pages().into_values().collect()
}

/// Recursively add `offset` to every object reference.
fn shift_references(object: Object, offset: u32) -> Object {
    match object {
        Object::Reference((num, gen)) => Object::Reference((num + offset, gen)),
        Object::Array(items) => Object::Array(
            items
                .into_iter()
                .map(|item| shift_references(item, offset))
                .collect(),
        ),
        Object::Dictionary(mut dict) => {
            for (_, value) in dict.iter_mut() {
                *value = shift_references(value.clone(), offset);
            }
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            for (_, value) in stream.dict.iter_mut() {
                *value = shift_references(value.clone(), offset);
            }
            Object::Stream(stream)
        }
        other => other,
    }
}

/// Point the destination's root Pages node at the combined page list.
fn rebuild_page_tree(doc: &mut Document, page_refs: &[ObjectId]) -> Result<(), PdfKitError> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(|root| root.as_reference())
        .map_err(|_| PdfKitError::OperationError("trailer has no Root reference".into()))?;

    let pages_id = doc
        .objects
        .get(&catalog_id)
        .ok_or_else(|| PdfKitError::OperationError("catalog object missing".into()))?
        .as_dict()
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(|pages| pages.as_reference())
        .map_err(|_| PdfKitError::OperationError("catalog has no Pages reference".into()))?;

    match doc.objects.get_mut(&pages_id) {
        Some(Object::Dictionary(pages_dict)) => {
            pages_dict.set(
                "Kids",
                Object::Array(page_refs.iter().map(|&id| Object::Reference(id)).collect()),
            );
            pages_dict.set("Count", Object::Integer(page_refs.len() as i64));
        }
        _ => {
            return Err(PdfKitError::OperationError(
                "root Pages node is not a dictionary".into(),
            ))
        }
    }

    // Imported pages still point at their old Pages parent, which no longer
    // anchors the tree; reparent them all onto the surviving root node.
    for kid in page_refs {
        if let Some(Object::Dictionary(page_dict)) = doc.objects.get_mut(kid) {
            page_dict.set("Parent", Object::Reference(pages_id));
        }
    }

    Ok(())
}
