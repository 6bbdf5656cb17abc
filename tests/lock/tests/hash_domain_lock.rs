//! Hash domain governance lock tests.
//!
//! 1. The domain set has the expected size.
//! 2. Domain bytes are unique and null-terminated.
//! 3. Domains follow the `RETRO::*::V1\0` naming convention.
//! 4. No raw `RETRO::` literal appears in source outside `hash_domain.rs`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use retro_kernel::proof::hash_domain::HashDomain;

#[test]
fn domain_set_size() {
    assert_eq!(
        HashDomain::ALL.len(),
        5,
        "if you added a domain, update this count"
    );
}

#[test]
fn domains_unique_and_null_terminated() {
    let mut seen = BTreeSet::new();
    for domain in HashDomain::ALL {
        assert!(seen.insert(domain.as_bytes()), "duplicate bytes for {domain}");
        assert_eq!(domain.as_bytes().last(), Some(&0), "{domain}");
    }
}

#[test]
fn domains_follow_naming_convention() {
    for domain in HashDomain::ALL {
        let bytes = domain.as_bytes();
        let text = std::str::from_utf8(&bytes[..bytes.len() - 1]).unwrap();
        assert!(text.starts_with("RETRO::"), "{text}");
        assert!(text.ends_with("::V1"), "{text}");
        let middle = &text["RETRO::".len()..text.len() - "::V1".len()];
        assert!(
            middle.chars().all(|c| c.is_ascii_uppercase() || c == '_'),
            "{text}"
        );
    }
}

fn rust_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            rust_files(&path, out);
        } else if path.extension().is_some_and(|e| e == "rs") {
            out.push(path);
        }
    }
}

#[test]
fn no_raw_domain_literals_outside_registry() {
    let workspace = Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(Path::parent)
        .unwrap();
    let mut files = Vec::new();
    for krate in ["kernel/src", "search/src", "harness/src"] {
        rust_files(&workspace.join(krate), &mut files);
    }
    assert!(!files.is_empty());
    let needle = concat!("RETRO", "::");
    for file in files {
        if file.ends_with("hash_domain.rs") {
            continue;
        }
        let text = std::fs::read_to_string(&file).unwrap();
        assert!(
            !text.contains(needle),
            "{} contains a raw domain literal",
            file.display()
        );
    }
}
