#![allow(dead_code)]

use std::io::{Cursor, Read};

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream};
use nominas_split::{SourceDocument, TextError, TextExtractor};

/// N-page PDF; page `i` (0-based) has MediaBox width `600 + i` so pages can
/// be told apart after splitting.
pub fn make_pdf(num_pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let mut page_ids = Vec::new();

    for i in 0..num_pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
                Operation::new("Td", vec![Object::Integer(100), Object::Integer(700)]),
                Operation::new(
                    "Tj",
                    vec![Object::String(format!("Page {}", i + 1).into_bytes(), lopdf::StringFormat::Literal)],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));
        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(600 + i as i64),
                    Object::Integer(792),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
        ]);
        page_ids.push(doc.add_object(page));
    }

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(num_pages as i64)),
        ("Kids", Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect())),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]);
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Source page indices recovered from the MediaBox widths of a split PDF.
pub fn source_indices(pdf: &[u8]) -> Vec<usize> {
    let doc = Document::load_mem(pdf).unwrap();
    doc.get_pages()
        .values()
        .map(|id| {
            let dict = doc.get_object(*id).unwrap().as_dict().unwrap();
            let media = dict.get(b"MediaBox").unwrap().as_array().unwrap();
            (media[2].as_i64().unwrap() - 600) as usize
        })
        .collect()
}

/// (name, bytes) of every entry, in archive order.
pub fn read_zip(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut out = Vec::new();
    for i in 0..archive.len() {
        let mut f = archive.by_index(i).unwrap();
        let name = f.name().to_string();
        let mut buf = Vec::new();
        f.read_to_end(&mut buf).unwrap();
        out.push((name, buf));
    }
    out
}

/// Serves fixed text per page; `None` simulates an extraction failure.
pub struct FixedText(pub Vec<Option<&'static str>>);

impl TextExtractor for FixedText {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn page_text(&self, _source: &SourceDocument, index: usize) -> Result<String, TextError> {
        match self.0.get(index).copied().flatten() {
            Some(t) => Ok(t.to_string()),
            None => Err(TextError::Lopdf(format!("no text for page {}", index + 1))),
        }
    }
}
