//! Response strategy selection and assembly.
//!
//! `respond` is the whole pipeline after parsing: resolve the target,
//! apply the conditional headers, pick a strategy, render it. Every
//! failure along the way becomes an error response; nothing in here is
//! allowed to take the connection down.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::http::date;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::serve::{autoindex, cgi, error_page, static_file};
use crate::site::registry::{FileKind, SiteRegistry};
use crate::site::resolve::{self, ResolvedTarget};

/// How a resolved request gets rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Send the file itself, text or binary per its classification.
    StaticFile,
    /// Generate a listing for a directory without an index file.
    Directory,
    /// Run the interpreter and relay its output.
    Cgi(PathBuf),
    /// Render the status through the error page path.
    Error,
}

/// Final status paired with the strategy that renders it. Built fresh
/// for every request, never shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub status: u16,
    pub strategy: Strategy,
}

/// Turns one parsed request into the response to write, whatever
/// happened on the way.
pub async fn respond(req: &Request, registry: &SiteRegistry, peer: SocketAddr) -> Response {
    let mut target = match resolve::resolve(req, registry).await {
        Ok(target) => target,
        Err(status) => return error_response(req, registry, status).await,
    };

    apply_conditionals(req, &mut target);

    match target.status {
        200 => {}
        304 => return not_modified(req, registry),
        status => return error_response(req, registry, status).await,
    }

    if target.is_directory {
        substitute_index(&mut target, registry).await;
    }

    let Outcome { status, strategy } = select_strategy(&target, registry);
    tracing::debug!(
        path = %target.fs_path.display(),
        strategy = ?strategy,
        "Selected response strategy"
    );

    match strategy {
        Strategy::StaticFile => static_response(req, registry, &target).await,
        Strategy::Directory => directory_response(req, registry, &target).await,
        Strategy::Cgi(interpreter) => cgi_response(req, registry, &target, &interpreter, peer).await,
        Strategy::Error => error_response(req, registry, status).await,
    }
}

/// Applies If-Modified-Since and If-Unmodified-Since, in that order.
/// Either may downgrade the status; a value that does not parse as a
/// date is ignored.
fn apply_conditionals(req: &Request, target: &mut ResolvedTarget) {
    let Some(mtime) = target.modified else {
        return;
    };

    if let Some(value) = req.if_modified_since.as_deref() {
        if date::modified_since(value, mtime) == Some(false) {
            target.status = 304;
        }
    }
    if let Some(value) = req.if_unmodified_since.as_deref() {
        if date::unmodified_since(value, mtime) == Some(false) {
            target.status = 412;
        }
    }
}

/// Picks the strategy for a target whose status is already final and
/// whose index substitution has already happened.
pub fn select_strategy(target: &ResolvedTarget, registry: &SiteRegistry) -> Outcome {
    if target.status != 200 {
        return Outcome {
            status: target.status,
            strategy: Strategy::Error,
        };
    }

    if target.is_directory {
        return if registry.allow_index() {
            Outcome {
                status: 200,
                strategy: Strategy::Directory,
            }
        } else {
            Outcome {
                status: 404,
                strategy: Strategy::Error,
            }
        };
    }

    match &target.kind {
        FileKind::Script(interpreter) => Outcome {
            status: 200,
            strategy: Strategy::Cgi(interpreter.clone()),
        },
        FileKind::Binary | FileKind::Text => Outcome {
            status: 200,
            strategy: Strategy::StaticFile,
        },
    }
}

/// Replaces a directory target with the first configured index file
/// that exists inside it. The substituted file is classified by its own
/// extension, so an `index.html` serves as HTML.
async fn substitute_index(target: &mut ResolvedTarget, registry: &SiteRegistry) {
    for name in registry.index_files() {
        let candidate = target.fs_path.join(name);
        if let Ok(meta) = tokio::fs::metadata(&candidate).await {
            if meta.is_file() {
                target.extension = resolve::extension_of(&candidate);
                target.kind = registry.classify(target.extension.as_deref());
                target.size = meta.len();
                target.modified = meta.modified().ok();
                target.fs_path = candidate;
                target.is_directory = false;
                return;
            }
        }
    }
}

/// Sends a file with Content-Length taken from filesystem metadata, so
/// a HEAD response advertises the same size a GET would.
async fn static_response(req: &Request, registry: &SiteRegistry, target: &ResolvedTarget) -> Response {
    let binary = matches!(target.kind, FileKind::Binary);
    let fallback = if binary { "application/octet-stream" } else { "text/plain" };
    let content_type = target
        .extension
        .as_deref()
        .and_then(|ext| registry.mime_type(ext))
        .unwrap_or(fallback);

    let builder = Response::builder(&req.version, 200, registry.status_reason(200))
        .standard_headers(registry.server_name())
        .header("Content-Type", content_type)
        .header("Content-Length", target.size.to_string());

    if !req.method.wants_body() {
        return builder.without_body().build();
    }

    let contents = if binary {
        static_file::read_binary(&target.fs_path).await
    } else {
        static_file::read_text(&target.fs_path).await
    };

    match contents {
        Ok(body) => builder.body(body).build(),
        Err(e) => {
            tracing::warn!(
                path = %target.fs_path.display(),
                error = %e,
                "File read failed after resolution"
            );
            error_response(req, registry, 500).await
        }
    }
}

/// Auto-generated listing for a directory with no index file.
async fn directory_response(req: &Request, registry: &SiteRegistry, target: &ResolvedTarget) -> Response {
    let builder = Response::builder(&req.version, 200, registry.status_reason(200))
        .standard_headers(registry.server_name())
        .header("Content-Type", "text/html");

    if !req.method.wants_body() {
        return builder.without_body().build();
    }

    match autoindex::render(&target.fs_path, &target.web_path).await {
        Ok(listing) => builder.body(listing.into_bytes()).build(),
        Err(e) => {
            tracing::warn!(
                path = %target.fs_path.display(),
                error = %e,
                "Directory listing failed"
            );
            error_response(req, registry, 500).await
        }
    }
}

/// CGI responses stop short of terminating the header block: no
/// Content-Type, no blank line. The script owns both.
async fn cgi_response(
    req: &Request,
    registry: &SiteRegistry,
    target: &ResolvedTarget,
    interpreter: &Path,
    peer: SocketAddr,
) -> Response {
    let builder = Response::builder(&req.version, 200, registry.status_reason(200))
        .standard_headers(registry.server_name())
        .open_headers();

    if !req.method.wants_body() {
        return builder.without_body().build();
    }

    match cgi::invoke(interpreter, target, req, peer, registry).await {
        Ok(output) => builder.body(output).build(),
        Err(e) => {
            tracing::warn!(
                script = %target.fs_path.display(),
                error = %e,
                "CGI invocation failed"
            );
            error_response(req, registry, 500).await
        }
    }
}

/// 304 carries the standard header set and nothing else.
fn not_modified(req: &Request, registry: &SiteRegistry) -> Response {
    Response::builder(&req.version, 304, registry.status_reason(304))
        .standard_headers(registry.server_name())
        .without_body()
        .build()
}

/// Error page, with the body dropped again for HEAD requests.
async fn error_response(req: &Request, registry: &SiteRegistry, status: u16) -> Response {
    let mut response = error_page::render(registry, status, Some(&req.version)).await;
    if !req.method.wants_body() {
        response.include_body = false;
    }
    response
}
