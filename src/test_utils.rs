//! Shared fixtures for unit tests.

use flate2::{Compression, write::GzEncoder};
use std::{fs, path::Path};

/// Index used throughout the tests: `a.Foo` and `a.Baz` share a body.
pub const SAMPLE_INDEX: &str = r#"{
    "a.Foo": {"full_name": "a.Foo", "path": "f1", "type": "class", "package": "a"},
    "a.Bar": {"full_name": "a.Bar", "path": "f2", "type": "interface", "package": "a"},
    "a.Baz": {"full_name": "a.Baz", "path": "f1", "type": "enum", "package": "a"}
}"#;

/// Build an in-memory `.tar.gz` holding `files`.
pub fn build_archive(files: &[(&str, &[u8])]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (path, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, *content).unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap()
}

/// Archive of the sample bundle; `tag` is written into every body.
pub fn sample_archive(tag: &str) -> Vec<u8> {
    let foo = format!("Foo docs {}", tag);
    let bar = format!("Bar docs {}", tag);
    build_archive(&[
        ("class_lookup.json", SAMPLE_INDEX.as_bytes()),
        ("f1", foo.as_bytes()),
        ("f2", bar.as_bytes()),
    ])
}

/// Materialize the sample bundle directly in `root`.
pub fn write_sample_store(root: &Path, tag: &str) {
    fs::create_dir_all(root).unwrap();
    fs::write(root.join("class_lookup.json"), SAMPLE_INDEX).unwrap();
    fs::write(root.join("f1"), format!("Foo docs {}", tag)).unwrap();
    fs::write(root.join("f2"), format!("Bar docs {}", tag)).unwrap();
}
