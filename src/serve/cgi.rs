//! CGI script invocation.
//!
//! The configured interpreter runs as a child process with the CGI/1.1
//! variable set in its environment and the script path as its first
//! argument. Standard output is captured through a per-invocation pipe,
//! so concurrent scripts never step on each other. The captured bytes
//! go out verbatim; the script's own header block is never parsed here.

use std::net::SocketAddr;
use std::path::Path;
use std::process::Stdio;

use anyhow::Context;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::http::request::Request;
use crate::site::registry::SiteRegistry;
use crate::site::resolve::ResolvedTarget;

/// Runs the interpreter and returns its standard output.
///
/// A missing interpreter, a non-zero exit or empty output are all
/// errors; the engine turns them into a 500 rather than sending an
/// empty body.
pub async fn invoke(
    interpreter: &Path,
    target: &ResolvedTarget,
    req: &Request,
    peer: SocketAddr,
    registry: &SiteRegistry,
) -> anyhow::Result<Vec<u8>> {
    let mut command = Command::new(interpreter);
    command.arg(&target.fs_path);
    if !req.query.is_empty() {
        command.arg(&req.query);
    }

    command
        .env("SERVER_SOFTWARE", registry.server_name())
        .env("SERVER_PROTOCOL", &req.version)
        .env("SERVER_PORT", registry.port().to_string())
        .env("GATEWAY_INTERFACE", "CGI/1.1")
        .env("REDIRECT_STATUS", "200")
        .env("REQUEST_METHOD", req.method.as_str())
        .env("PATH_INFO", &target.web_path)
        .env("PATH_TRANSLATED", &target.fs_path)
        .env("QUERY_STRING", &req.query)
        .env("REMOTE_ADDR", peer.ip().to_string())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command
        .spawn()
        .with_context(|| format!("cannot run interpreter {}", interpreter.display()))?;

    // POST data goes to the script's stdin; dropping the handle closes
    // the pipe so the script sees end of input. A script may exit
    // without draining its stdin, which surfaces here as a broken pipe
    // once the buffer fills; its output still counts.
    if let Some(mut stdin) = child.stdin.take() {
        if let Some(body) = req.body.as_deref() {
            match stdin.write_all(body).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Err(e) => return Err(e).context("cannot write request body to script"),
            }
        }
    }

    let output = child
        .wait_with_output()
        .await
        .context("cannot collect script output")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("interpreter exited with {}: {}", output.status, stderr.trim());
    }
    if output.stdout.is_empty() {
        anyhow::bail!("interpreter produced no output");
    }

    Ok(output.stdout)
}
