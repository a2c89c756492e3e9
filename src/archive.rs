//! MSCZ package handler — reads compressed score (.mscz) archives.
//!
//! An .mscz file is a ZIP archive containing:
//!   - META-INF/container.xml  — declares the root score file path
//!   - <rootfile>.mscx         — the score itself
//!   - (optional) thumbnails, audio settings, style files, excerpts

use std::io::{Cursor, Read};
use zip::ZipArchive;

use crate::error::ReadError;

/// Extract the score XML from .mscz bytes.
pub fn extract_mscx_from_mscz(data: &[u8]) -> Result<String, ReadError> {
    let cursor = Cursor::new(data);
    let mut archive = ZipArchive::new(cursor)?;

    let root_file_path = find_root_file(&mut archive)?;

    let mut root_file = archive.by_name(&root_file_path)?;
    let mut xml = String::new();
    root_file.read_to_string(&mut xml).map_err(|source| ReadError::Io {
        path: root_file_path.clone(),
        source,
    })?;

    Ok(xml)
}

/// Path of the score inside the archive: the container's rootfile, or the
/// first `.mscx` entry when there is no container.
fn find_root_file(archive: &mut ZipArchive<Cursor<&[u8]>>) -> Result<String, ReadError> {
    let container_xml = match archive.by_name("META-INF/container.xml") {
        Ok(mut container_file) => {
            let mut xml = String::new();
            container_file
                .read_to_string(&mut xml)
                .map_err(|source| ReadError::Io {
                    path: "META-INF/container.xml".to_string(),
                    source,
                })?;
            Some(xml)
        }
        Err(_) => None,
    };

    if let Some(xml) = container_xml {
        let doc = roxmltree::Document::parse(&xml)?;
        let root_file = doc
            .descendants()
            .filter(|n| n.tag_name().name() == "rootfile")
            .filter_map(|n| n.attribute("full-path"))
            .find(|path| path.ends_with(".mscx"));
        return match root_file {
            Some(path) => Ok(path.to_string()),
            None => Err(ReadError::Container(
                "No score rootfile found in container.xml".to_string(),
            )),
        };
    }

    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names
        .iter()
        .find(|name| !name.starts_with("META-INF/") && name.ends_with(".mscx"))
        .cloned()
        .ok_or_else(|| ReadError::Container(format!("No score file found in archive. Files: {names:?}")))
}
