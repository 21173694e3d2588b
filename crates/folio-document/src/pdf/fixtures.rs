// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Small in-memory PDFs for unit tests.

use lopdf::{Document, Object, ObjectId, Stream, dictionary};

/// A PDF with `page_count` empty pages.
///
/// Pages inherit a 600x800 MediaBox from the page tree, except page 2 which
/// carries its own 500x700 MediaBox and a CropBox inset by 10pt.
pub(crate) fn sample_pdf(page_count: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let kids: Vec<Object> = (0..page_count)
        .map(|index| {
            let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            };
            if index == 1 {
                page.set("MediaBox", vec![0.into(), 0.into(), 500.into(), 700.into()]);
                page.set("CropBox", vec![10.into(), 10.into(), 490.into(), 690.into()]);
            }
            Object::from(doc.add_object(page))
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
            "MediaBox" => vec![0.into(), 0.into(), 600.into(), 800.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("failed to save test PDF");
    buf
}
