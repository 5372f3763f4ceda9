use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, bail};
use atlas_rag::Document;
use tracing::{info, warn};

/// Page separator written by `pdftotext`.
const PAGE_BREAK: char = '\x0c';

/// Read extracted-text files into page documents.
///
/// Documents are identified by file name, or by the path as given when two
/// inputs share a file name.
pub fn load_documents(paths: &[impl AsRef<Path>]) -> anyhow::Result<Vec<Document>> {
    let paths: Vec<&Path> = paths.iter().map(AsRef::as_ref).collect();
    let ids = document_ids(&paths)?;

    let mut documents = Vec::new();
    for (path, id) in paths.into_iter().zip(ids) {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read document {}", path.display()))?;

        let pages = split_pages(&id, &text);
        if pages.is_empty() {
            warn!(document.id = %id, "document has no text, skipping");
            continue;
        }
        info!(document.id = %id, pages = pages.len(), "loaded document");
        documents.extend(pages.into_iter().map(|d| {
            d.with_metadata("path", path.display().to_string())
        }));
    }
    Ok(documents)
}

/// Source identifiers for `paths`, unique across the input set.
fn document_ids(paths: &[&Path]) -> anyhow::Result<Vec<String>> {
    let file_name = |path: &Path| {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    };

    let mut name_counts: HashMap<String, usize> = HashMap::new();
    for &path in paths {
        *name_counts.entry(file_name(path)).or_default() += 1;
    }

    let mut seen: HashMap<String, &Path> = HashMap::new();
    let mut ids = Vec::with_capacity(paths.len());
    for &path in paths {
        let name = file_name(path);
        let id = if name_counts[&name] > 1 { path.display().to_string() } else { name };
        if let Some(previous) = seen.insert(id.clone(), path) {
            bail!("document {} given more than once (also as {})", path.display(), previous.display());
        }
        ids.push(id);
    }
    Ok(ids)
}

/// Split `text` on form feeds into one document per non-empty page.
///
/// Pages are numbered from 1 in file order, so skipped blank pages leave gaps.
/// Text without any form feed becomes a single document with no page.
pub fn split_pages(id: &str, text: &str) -> Vec<Document> {
    if !text.contains(PAGE_BREAK) {
        if text.trim().is_empty() {
            return Vec::new();
        }
        return vec![Document::new(id, text)];
    }

    text.split(PAGE_BREAK)
        .enumerate()
        .filter(|(_, page)| !page.trim().is_empty())
        .map(|(i, page)| Document::new(id, page).with_page(i as u32 + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_feeds_become_numbered_pages() {
        let docs = split_pages("rapor.pdf", "Gelir tablosu\x0cBilanço\x0c\n \x0cNakit akışı");
        let pages: Vec<_> = docs.iter().map(|d| (d.page, d.text.as_str())).collect();
        assert_eq!(pages, [(Some(1), "Gelir tablosu"), (Some(2), "Bilanço"), (Some(4), "Nakit akışı")]);
        assert!(docs.iter().all(|d| d.id == "rapor.pdf"));
    }

    #[test]
    fn plain_text_is_one_unpaged_document() {
        let docs = split_pages("not.txt", "KDV oranı yüzde 20.");
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].page, None);
    }

    #[test]
    fn blank_text_yields_nothing() {
        assert!(split_pages("bos.txt", "  \n").is_empty());
        assert!(split_pages("bos.pdf", "\x0c \x0c").is_empty());
    }

    #[test]
    fn loads_files_and_reports_missing_ones() {
        let dir = std::env::temp_dir().join(format!("atlas-loader-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("kilavuz.txt");
        std::fs::write(&file, "Stok kartı\x0cBirim tanımı").unwrap();

        let docs = load_documents(&[&file]).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "kilavuz.txt");
        assert_eq!(docs[1].metadata["path"], file.display().to_string());

        let err = load_documents(&[dir.join("yok.txt")]).unwrap_err();
        assert!(err.to_string().contains("yok.txt"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn same_file_name_in_different_directories_gets_distinct_ids() {
        let ids = document_ids(&[
            Path::new("2023/rapor.txt"),
            Path::new("2024/rapor.txt"),
            Path::new("vergi.txt"),
        ])
        .unwrap();
        assert_eq!(ids, ["2023/rapor.txt", "2024/rapor.txt", "vergi.txt"]);
    }

    #[test]
    fn repeated_path_is_rejected() {
        let err = document_ids(&[Path::new("a/rapor.txt"), Path::new("a/rapor.txt")]).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn loaded_chunks_from_same_named_files_keep_separate_sources() {
        let dir = std::env::temp_dir().join(format!("atlas-loader-dup-{}", std::process::id()));
        let (first, second) = (dir.join("2023"), dir.join("2024"));
        std::fs::create_dir_all(&first).unwrap();
        std::fs::create_dir_all(&second).unwrap();
        std::fs::write(first.join("rapor.txt"), "Ciro 1.250.000 TL").unwrap();
        std::fs::write(second.join("rapor.txt"), "Ciro 1.487.500 TL").unwrap();

        let docs = load_documents(&[first.join("rapor.txt"), second.join("rapor.txt")]).unwrap();
        assert_eq!(docs.len(), 2);
        assert_ne!(docs[0].id, docs[1].id);
        assert!(docs[0].id.ends_with("rapor.txt") && docs[0].id.contains("2023"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
