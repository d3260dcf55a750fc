//! Synthetic PDFs for integration tests.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// How a page's lines are laid out in its content stream.
#[derive(Clone, Copy)]
pub enum Layout {
    /// One `Tj` per line, advancing with `T*`
    Lines,
    /// Each line split into one `Tj` per word on the same baseline
    Words,
}

/// Build a PDF with one page per entry, each line shown on its own baseline.
pub fn build_pdf(pages: &[&[&str]]) -> Vec<u8> {
    build_pdf_with_layout(pages, Layout::Lines)
}

pub fn build_pdf_with_layout(pages: &[&[&str]], layout: Layout) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in pages {
        let content = Content {
            operations: page_operations(lines, layout),
        };
        let encoded = content.encode().expect("content encodes");
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("document saves");
    buffer
}

fn page_operations(lines: &[&str], layout: Layout) -> Vec<Operation> {
    let mut ops = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 12.into()]),
        Operation::new("TL", vec![14.into()]),
        Operation::new("Td", vec![72.into(), 770.into()]),
    ];

    for (idx, line) in lines.iter().enumerate() {
        if idx > 0 {
            ops.push(Operation::new("T*", vec![]));
        }
        match layout {
            Layout::Lines => {
                ops.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
            }
            Layout::Words => {
                for (n, word) in line.split(' ').enumerate() {
                    let shown = if n == 0 {
                        word.to_string()
                    } else {
                        format!(" {}", word)
                    };
                    ops.push(Operation::new("Tj", vec![Object::string_literal(shown)]));
                }
            }
        }
    }

    ops.push(Operation::new("ET", vec![]));
    ops
}
