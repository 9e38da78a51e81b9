use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Relative paths are taken from `root`; absolute paths are kept as given.
pub fn resolve_output_path(root: &Path, out: &Path) -> PathBuf {
    if out.is_absolute() {
        out.to_path_buf()
    } else {
        root.join(out)
    }
}

/// Write `contents` to `path`, creating parent directories as needed.
///
/// The document goes to a sibling temporary file first and is renamed into
/// place, so an interrupted run leaves the previous feed untouched.
/// Returns the number of bytes written.
pub fn write_document(path: &Path, contents: &str) -> io::Result<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = temp_path_for(path);
    fs::write(&tmp_path, contents)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    Ok(contents.len())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("rss.xml"));
    name.push(".tmp");
    path.with_file_name(name)
}
