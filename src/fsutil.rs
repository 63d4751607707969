//! Filesystem glue: recursive copy, merge, and removal helpers.
//!
//! Thin wrappers around `std::fs` used by the host integration around the
//! diff engine (output pruning, asset staging). None of these participate in
//! fingerprinting.

use std::fs;
use std::io;
use std::path::Path;

/// Remove every path in `paths`, files and directory trees alike.
///
/// Paths that no longer exist are ignored; the first real error aborts.
pub fn remove_paths<P: AsRef<Path>>(paths: &[P]) -> io::Result<()> {
    for path in paths {
        let path = path.as_ref();
        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        };
        if metadata.is_dir() {
            fs::remove_dir_all(path)?;
        } else {
            fs::remove_file(path)?;
        }
        log::debug!("Removed {}", path.display());
    }
    Ok(())
}

/// Replace `dest` with a recursive copy of `src`.
///
/// Any prior content of `dest` is removed first.
pub fn copy_dir(src: &Path, dest: &Path) -> io::Result<()> {
    if dest.exists() {
        fs::remove_dir_all(dest)?;
    }
    fs::create_dir_all(dest)?;

    for child in fs::read_dir(src)? {
        let child = child?;
        let target = dest.join(child.file_name());
        if child.file_type()?.is_dir() {
            copy_dir(&child.path(), &target)?;
        } else {
            fs::copy(child.path(), &target)?;
        }
    }
    Ok(())
}

/// Overlay `src` onto `dest` recursively.
///
/// Files in `src` overwrite same-named files in `dest`; everything else in
/// `dest` is kept. A missing `src` is an error, a missing `dest` is created.
pub fn merge_dirs(src: &Path, dest: &Path) -> io::Result<()> {
    if !src.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Source directory {} does not exist", src.display()),
        ));
    }
    fs::create_dir_all(dest)?;

    for child in fs::read_dir(src)? {
        let child = child?;
        let target = dest.join(child.file_name());
        if child.file_type()?.is_dir() {
            merge_dirs(&child.path(), &target)?;
        } else {
            fs::copy(child.path(), &target)?;
        }
    }
    Ok(())
}
