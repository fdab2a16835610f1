//! Maps a parsed request onto the filesystem.
//!
//! Resolution is the security boundary: the request path is normalized
//! lexically and checked against the selected document root before any
//! filesystem call is made. Escaping paths never reach the metadata lookup.

use std::path::PathBuf;
use std::time::SystemTime;

use crate::http::request::Request;
use crate::site::registry::{FileKind, SiteRegistry};

/// A verified filesystem target for one request.
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    /// Absolute (root-joined) path on disk.
    pub fs_path: PathBuf,
    /// The request path as the client sent it, forward slashes.
    pub web_path: String,
    pub is_directory: bool,
    pub kind: FileKind,
    pub extension: Option<String>,
    /// Byte size from filesystem metadata.
    pub size: u64,
    pub modified: Option<SystemTime>,
    /// Provisional status, 200 on success. Conditional headers may
    /// downgrade it later.
    pub status: u16,
}

/// Resolves the request against the registry's host table and document
/// roots. Errors are the HTTP status to render: always 404 here, whether
/// the path escapes the root or simply does not exist.
pub async fn resolve(req: &Request, registry: &SiteRegistry) -> Result<ResolvedTarget, u16> {
    // A '?' surviving in the path means the target was malformed enough
    // that the query split could not take care of it. Reject before
    // touching the filesystem.
    if req.path.contains('?') {
        return Err(404);
    }

    let segments = normalize_path(&req.path).ok_or(404u16)?;

    let root = registry.root_for(req.host.as_deref());
    let mut fs_path = root.to_path_buf();
    for seg in &segments {
        fs_path.push(seg);
    }

    let meta = tokio::fs::metadata(&fs_path).await.map_err(|_| 404u16)?;

    let extension = extension_of(&fs_path);
    let kind = if meta.is_dir() {
        FileKind::Text
    } else {
        registry.classify(extension.as_deref())
    };

    Ok(ResolvedTarget {
        fs_path,
        web_path: req.path.clone(),
        is_directory: meta.is_dir(),
        kind,
        extension,
        size: meta.len(),
        modified: meta.modified().ok(),
        status: 200,
    })
}

/// Lexically normalizes a request path into plain segments.
///
/// `.` segments and empty segments (doubled slashes) are dropped, `..`
/// pops the previous segment. Popping past the start means the path tries
/// to leave the root, which returns `None`.
pub fn normalize_path(path: &str) -> Option<Vec<String>> {
    let mut segments: Vec<&str> = Vec::new();

    for seg in path.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }

    Some(segments.into_iter().map(|s| s.to_string()).collect())
}

pub fn extension_of(path: &std::path::Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().into_owned())
}
