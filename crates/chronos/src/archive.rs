//! ZIP packaging for per-holder documents.

use std::io::{Cursor, Write};

use chronos_core::normalize::strip_diacritics;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::prelude::{f, Error};

/// Worker part of a file name when the worker number is unknown.
pub const NO_WORKER: &str = "sin-numero";

/// `<name> - <worker>.pdf`, with diacritics removed and anything other than
/// letters, digits, `_`, `-` and spaces dropped from the name.
pub fn worker_file_name(name: &str, worker: Option<i64>) -> String {
    let clean: String = strip_diacritics(name)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ' '))
        .collect();
    let clean = clean.split_whitespace().collect::<Vec<_>>().join(" ");
    let worker = worker
        .filter(|w| *w != 0)
        .map(|w| w.to_string())
        .unwrap_or_else(|| NO_WORKER.to_string());
    f!("{clean} - {worker}.pdf")
}

/// Give repeated names a numeric suffix so no entry is shadowed.
fn unique_name(taken: &mut Vec<String>, name: &str) -> String {
    let mut candidate = name.to_string();
    let mut n = 2;
    while taken.contains(&candidate) {
        candidate = match name.rsplit_once('.') {
            Some((stem, ext)) => f!("{stem} ({n}).{ext}"),
            None => f!("{name} ({n})"),
        };
        n += 1;
    }
    taken.push(candidate.clone());
    candidate
}

/// Pack named documents into one deflated ZIP archive.
pub fn zip_documents(documents: &[(String, Vec<u8>)]) -> Result<Vec<u8>, Error> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut taken = Vec::new();

    for (name, bytes) in documents {
        let name = unique_name(&mut taken, name);
        writer.start_file(name, options)?;
        writer
            .write_all(bytes)
            .map_err(|e| Error::Archive(e.to_string()))?;
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_worker_file_name() {
        assert_eq!(
            worker_file_name("PÉREZ LÓPEZ, José Ñ.", Some(809328)),
            "PEREZ LOPEZ Jose N - 809328.pdf"
        );
        assert_eq!(worker_file_name("Ana", None), "Ana - sin-numero.pdf");
        assert_eq!(worker_file_name("Ana", Some(0)), "Ana - sin-numero.pdf");
    }

    #[test]
    fn test_zip_documents_roundtrip_names() {
        let docs = vec![
            ("A - 1.pdf".to_string(), b"%PDF-one".to_vec()),
            ("A - 1.pdf".to_string(), b"%PDF-two".to_vec()),
            ("B - 2.pdf".to_string(), Vec::new()),
        ];
        let bytes = zip_documents(&docs).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 3);

        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(names, vec!["A - 1.pdf", "A - 1 (2).pdf", "B - 2.pdf"]);

        let mut content = String::new();
        archive
            .by_name("A - 1 (2).pdf")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "%PDF-two");
    }
}
