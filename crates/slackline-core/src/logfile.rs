//! Local log-file access: path confinement and tail reading.
//!
//! The two halves have deliberately separate failure domains. [`confine`]
//! decides whether a requested path may be touched at all and fails with
//! `PathViolation` before anything is opened; [`read_tail`] only ever
//! fails with `NotFound`/`AccessDenied` once the path has been cleared.

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

/// Files larger than this are read from the end instead of whole.
const LARGE_FILE_BYTES: u64 = 1024 * 1024;

/// Initial bytes-per-line estimate when seeking from the end.
const TAIL_CHUNK_ESTIMATE: u64 = 256;

// ─────────────────────────────────────────────
// Path confinement
// ─────────────────────────────────────────────

/// Resolve `requested` against an optional confinement root.
///
/// With a base directory set, both sides are brought to canonical,
/// symlink-resolved form and the request succeeds only if the resolved
/// path has the canonical base as a *component* prefix — `..` escapes
/// and sibling collisions like `/base-evil` are rejected the same way.
/// The `PathViolation` error names only the path as the caller supplied
/// it, so nothing about files outside the boundary leaks through error
/// text.
///
/// Without a base directory this is the identity function: confinement
/// is an explicit deployment opt-out, not something applied by default.
pub fn confine(requested: &str, base: Option<&Path>) -> Result<PathBuf> {
    let Some(base) = base else {
        return Ok(PathBuf::from(requested));
    };

    // A base that cannot be canonicalized cannot anchor a boundary
    // check, so nothing under it is reachable.
    let canonical_base = base
        .canonicalize()
        .map_err(|_| Error::PathViolation(requested.to_string()))?;

    let absolute = lexical_absolute(Path::new(requested))?;
    let resolved = resolve_symlinks(&absolute);
    debug!(requested, resolved = %resolved.display(), "resolved log path");

    if resolved.starts_with(&canonical_base) {
        Ok(resolved)
    } else {
        Err(Error::PathViolation(requested.to_string()))
    }
}

/// Absolutize and normalize `.` / `..` components without touching the
/// filesystem. `..` at the root clamps instead of escaping.
fn lexical_absolute(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| Error::AccessDenied(format!("current directory: {e}")))?;
        cwd.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(name) => out.push(name),
        }
    }
    Ok(out)
}

/// Symlink-resolve an already-absolute, lexically normalized path.
///
/// If the path itself does not exist yet, its deepest existing ancestor
/// is canonicalized and the remainder re-attached; the remainder holds
/// no `..` components, so it cannot re-escape.
fn resolve_symlinks(absolute: &Path) -> PathBuf {
    if let Ok(canonical) = absolute.canonicalize() {
        return canonical;
    }
    for ancestor in absolute.ancestors().skip(1) {
        if let Ok(canonical) = ancestor.canonicalize() {
            if let Ok(rest) = absolute.strip_prefix(ancestor) {
                return canonical.join(rest);
            }
        }
    }
    absolute.to_path_buf()
}

// ─────────────────────────────────────────────
// Tail reading
// ─────────────────────────────────────────────

/// Read the final `max_lines` logical lines of a file, in original
/// order. A file with fewer lines than requested comes back whole;
/// `max_lines == 0` is an empty string. Output is plain text — any
/// Slack-safe rendering is the caller's job.
///
/// This is a single-shot synchronous read with no coordination against
/// concurrent writers; an append racing the read may simply not appear.
pub fn read_tail(path: &Path, max_lines: usize) -> Result<String> {
    let display = path.display().to_string();

    let meta = std::fs::metadata(path).map_err(|e| map_io(e, &display))?;
    if !meta.is_file() {
        return Err(Error::NotFound(display));
    }
    if max_lines == 0 {
        return Ok(String::new());
    }

    let content = if meta.len() > LARGE_FILE_BYTES {
        read_end(path, meta.len(), max_lines, &display)?
    } else {
        let bytes = std::fs::read(path).map_err(|e| map_io(e, &display))?;
        String::from_utf8_lossy(&bytes).into_owned()
    };

    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    Ok(lines[start..].join("\n"))
}

/// Tail a large file by seeking near the end and widening the window
/// until enough whole lines are in view.
fn read_end(path: &Path, len: u64, max_lines: usize, display: &str) -> Result<String> {
    use std::io::{Read, Seek, SeekFrom};

    let mut file = std::fs::File::open(path).map_err(|e| map_io(e, display))?;
    let mut take = (max_lines as u64)
        .saturating_mul(TAIL_CHUNK_ESTIMATE)
        .clamp(TAIL_CHUNK_ESTIMATE, len);

    loop {
        file.seek(SeekFrom::Start(len - take))
            .map_err(|e| map_io(e, display))?;
        let mut buf = Vec::with_capacity(take as usize);
        (&mut file)
            .take(take)
            .read_to_end(&mut buf)
            .map_err(|e| map_io(e, display))?;
        let text = String::from_utf8_lossy(&buf);

        // Unless the window reaches the start of the file, the first
        // line in view is almost certainly partial — drop it.
        let whole = if take < len {
            match text.find('\n') {
                Some(idx) => &text[idx + 1..],
                None => "",
            }
        } else {
            &text[..]
        };

        if take == len || whole.lines().count() >= max_lines {
            return Ok(whole.to_string());
        }
        take = (take * 2).min(len);
    }
}

/// Map filesystem errors into the reader's failure domain.
fn map_io(err: std::io::Error, display: &str) -> Error {
    match err.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(display.to_string()),
        std::io::ErrorKind::PermissionDenied => Error::AccessDenied(display.to_string()),
        other => Error::AccessDenied(format!("{display}: {other}")),
    }
}
