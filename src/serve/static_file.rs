//! File reading for the two static transfer modes.

use std::path::Path;

use anyhow::Context;

/// Reads a file byte for byte, for extensions in the binary table.
pub async fn read_binary(path: &Path) -> anyhow::Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))
}

/// Line-oriented read for text files. Lines are re-joined with a bare
/// `\n` whatever the endings on disk were, so CRLF files are served the
/// same as LF files. The bytes are taken as they are; text names the
/// transfer mode, not an encoding, so legacy 8-bit files pass through.
pub async fn read_text(path: &Path) -> anyhow::Result<Vec<u8>> {
    let contents = tokio::fs::read(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;

    let mut body = Vec::with_capacity(contents.len());
    let mut lines = contents.split(|&b| b == b'\n').peekable();
    while let Some(line) = lines.next() {
        // A trailing newline on disk yields one final empty segment,
        // not an extra output line.
        if line.is_empty() && lines.peek().is_none() {
            break;
        }
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        body.extend_from_slice(line);
        body.push(b'\n');
    }

    Ok(body)
}
