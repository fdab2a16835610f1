//! Generated directory listings.
//!
//! A directory with no index file renders as a self-contained HTML page:
//! a title, then a two-column table of entry name and size. Entries come
//! out in filesystem enumeration order; directories get an empty size
//! cell. Each name links relative to the path the client requested.

use std::fmt::Write;
use std::path::Path;

use anyhow::Context;

pub async fn render(dir: &Path, web_path: &str) -> anyhow::Result<String> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("cannot list {}", dir.display()))?;

    let mut rows = String::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();

        let size = match entry.metadata().await {
            Ok(meta) if meta.is_file() => meta.len().to_string(),
            _ => String::new(),
        };

        // The root path already ends in a slash; everything else needs
        // one between the current path and the entry name.
        let href = if web_path == "/" {
            format!("/{name}")
        } else {
            format!("{web_path}/{name}")
        };

        let _ = writeln!(
            rows,
            "  <tr><td><a href=\"{href}\">{name}</a></td><td>{size}</td></tr>"
        );
    }

    let mut page = String::new();
    let _ = writeln!(page, "<html>\n<head>\n<title>Index of {web_path}</title>\n</head>");
    let _ = writeln!(page, "<body>\n<h1>Index of {web_path}</h1>");
    page.push_str("<table>\n  <tr><th>Name</th><th>Size</th></tr>\n");
    page.push_str(&rows);
    page.push_str("</table>\n</body>\n</html>\n");

    Ok(page)
}
