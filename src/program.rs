//! Directory traversal and package aggregation.

use std::fs;
use std::path::Path;

use goir_parser::parse_source;
use tracing::debug;
use walkdir::WalkDir;

use crate::collector::collect_file;
use crate::error::Error;
use crate::ir::{Data, File, Package};

fn is_go_source(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "go")
}

/// Collects every `.go` file under `root`, in file-name order per directory.
///
/// The first unreadable entry or unparsable file aborts the walk.
pub fn collect_dir(root: &Path) -> Result<Data, Error> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_go_source(entry.path()) {
            continue;
        }
        let path = entry.path();
        let src = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed = parse_source(&src).map_err(|failure| Error::Parse {
            path: path.to_path_buf(),
            rendered: failure.render(&src),
        })?;
        files.push(collect_file(&path.display().to_string(), &parsed));
    }
    Ok(aggregate(files))
}

/// Groups files by declared package name. Packages appear in the order their
/// first file was seen; files keep their input order.
pub fn aggregate(files: impl IntoIterator<Item = File>) -> Data {
    let mut packages: Vec<Package> = Vec::new();
    for file in files {
        match packages.iter_mut().find(|p| p.name == file.package) {
            Some(pkg) => pkg.files.push(file),
            None => {
                debug!(package = %file.package, "new package");
                packages.push(Package {
                    name: file.package.clone(),
                    files: vec![file],
                });
            }
        }
    }
    Data {
        output_base: String::new(),
        packages,
    }
}
