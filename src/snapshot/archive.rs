// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tar and gzip helpers.
//!
//! ```text
//! pack_tar_gz(root, dest, prefix, skip)   walk root, entries named prefix/rel
//! unpack_tar_gz(archive, dest)            tar::Archive::unpack (no traversal)
//! unpack_tar(archive, dest, skip)         per-entry unpack_in with a filter
//! ```
//!
//! Symlinks are archived as links, never followed.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

/// Archives the tree under `root` into a gzip-compressed tarball.
///
/// `skip(path, is_dir)` receives paths relative to `root`; returning `true`
/// leaves the entry (and everything below a directory) out.
///
/// # Errors
///
/// Returns an I/O error if a file cannot be read or the archive written.
pub fn pack_tar_gz(
    root: &Path,
    dest: &Path,
    prefix: Option<&Path>,
    skip: &dyn Fn(&Path, bool) -> bool,
) -> io::Result<()> {
    let file = File::create(dest)?;
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);

    if let Some(prefix) = prefix {
        builder.append_dir(prefix, root)?;
    }
    append_tree(&mut builder, root, Path::new(""), prefix, skip)?;

    let encoder = builder.into_inner()?;
    encoder.finish()?;
    Ok(())
}

fn append_tree<W: io::Write>(
    builder: &mut tar::Builder<W>,
    root: &Path,
    rel_dir: &Path,
    prefix: Option<&Path>,
    skip: &dyn Fn(&Path, bool) -> bool,
) -> io::Result<()> {
    let mut entries = fs::read_dir(root.join(rel_dir))?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(fs::DirEntry::file_name);

    for entry in entries {
        let rel = rel_dir.join(entry.file_name());
        let file_type = entry.file_type()?;
        let is_dir = file_type.is_dir();
        if skip(&rel, is_dir) {
            continue;
        }

        let name = prefix.map_or_else(|| rel.clone(), |p| p.join(&rel));
        if is_dir {
            builder.append_dir(&name, entry.path())?;
            append_tree(builder, root, &rel, prefix, skip)?;
        } else {
            builder.append_path_with_name(entry.path(), &name)?;
        }
    }
    Ok(())
}

/// Extracts a gzip-compressed tarball over `dest`, overwriting files.
///
/// # Errors
///
/// Returns an I/O error if the archive is unreadable or an entry cannot be
/// written.
pub fn unpack_tar_gz(archive: &Path, dest: &Path) -> io::Result<()> {
    let file = File::open(archive)?;
    let mut archive = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
    archive.set_preserve_permissions(true);
    archive.set_overwrite(true);
    archive.unpack(dest)
}

/// Extracts a plain tarball into `dest`, leaving out entries for which
/// `skip(relative_path, is_dir)` is true (and everything below them).
///
/// # Errors
///
/// Returns an I/O error if the archive is unreadable or an entry cannot be
/// written.
pub fn unpack_tar(archive: &Path, dest: &Path, skip: &dyn Fn(&Path, bool) -> bool) -> io::Result<()> {
    let file = File::open(archive)?;
    let mut archive = tar::Archive::new(BufReader::new(file));
    let mut skipped_dirs: Vec<PathBuf> = Vec::new();

    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.into_owned();
        let entry_type = entry.header().entry_type();
        if entry_type.is_pax_global_extensions() {
            continue;
        }
        let is_dir = entry_type.is_dir();

        if skipped_dirs.iter().any(|dir| path.starts_with(dir)) {
            continue;
        }
        if skip(&path, is_dir) {
            if is_dir {
                skipped_dirs.push(path);
            }
            continue;
        }
        entry.unpack_in(dest)?;
    }
    Ok(())
}
