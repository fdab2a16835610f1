//! Extension tables, virtual hosts and server-wide settings.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::Config;

/// A named site selected by the client's Host header.
#[derive(Debug, Clone)]
pub struct VirtualHost {
    pub name: Option<String>,
    pub host: String,
    pub root: PathBuf,
}

/// Transfer classification for a resolved file.
///
/// Scripts carry their interpreter; an extension present in both the CGI
/// and binary tables classifies as a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileKind {
    Script(PathBuf),
    Binary,
    Text,
}

/// Read-only view of everything request handling needs to know about the
/// configured sites: host roots, extension tables, index files, error pages
/// and the identity the server presents on the wire.
#[derive(Debug, Clone)]
pub struct SiteRegistry {
    server_name: String,
    listen_addr: String,
    port: u16,
    default_root: PathBuf,
    index_files: Vec<String>,
    allow_index: bool,
    error_dir: Option<PathBuf>,
    idle_timeout: Duration,
    mime: HashMap<String, String>,
    binary: HashSet<String>,
    cgi: HashMap<String, PathBuf>,
    hosts: HashMap<String, VirtualHost>,
}

impl SiteRegistry {
    /// Builds the registry from a loaded configuration, layering config
    /// entries over the built-in MIME and binary tables.
    pub fn from_config(cfg: &Config) -> Self {
        let mut mime: HashMap<String, String> = BUILTIN_MIME_TYPES
            .iter()
            .map(|(ext, ty)| (ext.to_string(), ty.to_string()))
            .collect();
        for (ext, ty) in &cfg.mime_types {
            mime.insert(ext.clone(), ty.clone());
        }

        let mut binary: HashSet<String> =
            BUILTIN_BINARY_EXTENSIONS.iter().map(|e| e.to_string()).collect();
        for ext in &cfg.binary_extensions {
            binary.insert(ext.clone());
        }

        let hosts = cfg
            .virtual_hosts
            .iter()
            .map(|vh| {
                let key = vh.host.to_ascii_lowercase();
                let entry = VirtualHost {
                    name: vh.name.clone(),
                    host: vh.host.clone(),
                    root: vh.root.clone(),
                };
                (key, entry)
            })
            .collect();

        let port = cfg
            .listen_addr
            .rsplit_once(':')
            .and_then(|(_, p)| p.parse().ok())
            .unwrap_or(80);

        Self {
            server_name: cfg.server_name.clone(),
            listen_addr: cfg.listen_addr.clone(),
            port,
            default_root: cfg.web_root.clone(),
            index_files: cfg.index_files.clone(),
            allow_index: cfg.allow_index,
            error_dir: cfg.error_pages_dir.clone(),
            idle_timeout: Duration::from_secs(cfg.timeout_secs),
            mime,
            binary,
            cgi: cfg.cgi.clone(),
            hosts,
        }
    }

    /// Looks up a virtual host by the client's requested host name.
    /// Matching is case-insensitive; the port suffix, if any, must match
    /// the configured entry exactly.
    pub fn lookup_host(&self, name: &str) -> Option<&VirtualHost> {
        self.hosts.get(&name.to_ascii_lowercase())
    }

    /// Document root serving a request for the given host, falling back to
    /// the default web root for unknown hosts.
    pub fn root_for(&self, host: Option<&str>) -> &Path {
        host.and_then(|h| self.lookup_host(h))
            .map(|vh| vh.root.as_path())
            .unwrap_or(self.default_root.as_path())
    }

    pub fn mime_type(&self, ext: &str) -> Option<&str> {
        self.mime.get(ext).map(|s| s.as_str())
    }

    pub fn interpreter(&self, ext: &str) -> Option<&Path> {
        self.cgi.get(ext).map(|p| p.as_path())
    }

    pub fn is_binary_ext(&self, ext: &str) -> bool {
        self.binary.contains(ext)
    }

    /// Classifies a file extension into one of the three transfer kinds.
    pub fn classify(&self, ext: Option<&str>) -> FileKind {
        match ext {
            Some(ext) => {
                if let Some(interp) = self.cgi.get(ext) {
                    FileKind::Script(interp.clone())
                } else if self.binary.contains(ext) {
                    FileKind::Binary
                } else {
                    FileKind::Text
                }
            }
            None => FileKind::Text,
        }
    }

    pub fn index_files(&self) -> &[String] {
        &self.index_files
    }

    pub fn allow_index(&self) -> bool {
        self.allow_index
    }

    pub fn error_dir(&self) -> Option<&Path> {
        self.error_dir.as_deref()
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    pub fn listen_addr(&self) -> &str {
        &self.listen_addr
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Reason phrase for every status this server emits.
    pub fn status_reason(&self, code: u16) -> &'static str {
        match code {
            200 => "OK",
            301 => "Moved Permanently",
            302 => "Moved Temporarily",
            304 => "Not Modified",
            400 => "Bad Request",
            404 => "File Not Found",
            412 => "Precondition Failed",
            500 => "Internal Server Error",
            501 => "Not Implemented",
            _ => "Unknown",
        }
    }
}

/// Extensions served with a known Content-Type. Anything absent falls back
/// to `text/plain` or `application/octet-stream` depending on the binary
/// classification.
const BUILTIN_MIME_TYPES: &[(&str, &str)] = &[
    ("hqx", "application/mac-binhex40"),
    ("doc", "application/msword"),
    ("bin", "application/octet-stream"),
    ("dms", "application/octet-stream"),
    ("lha", "application/octet-stream"),
    ("lzh", "application/octet-stream"),
    ("exe", "application/octet-stream"),
    ("class", "application/octet-stream"),
    ("pdf", "application/pdf"),
    ("ai", "application/postscript"),
    ("eps", "application/postscript"),
    ("ps", "application/postscript"),
    ("smi", "application/smil"),
    ("smil", "application/smil"),
    ("mif", "application/vnd.mif"),
    ("asf", "application/vnd.ms-asf"),
    ("xls", "application/vnd.ms-excel"),
    ("ppt", "application/vnd.ms-powerpoint"),
    ("vcd", "application/x-cdlink"),
    ("Z", "application/x-compress"),
    ("cpio", "application/x-cpio"),
    ("csh", "application/x-csh"),
    ("dcr", "application/x-director"),
    ("dir", "application/x-director"),
    ("dxr", "application/x-director"),
    ("dvi", "application/x-dvi"),
    ("gtar", "application/x-gtar"),
    ("gz", "application/x-gzip"),
    ("js", "application/x-javascript"),
    ("latex", "application/x-latex"),
    ("sh", "application/x-sh"),
    ("shar", "application/x-shar"),
    ("swf", "application/x-shockwave-flash"),
    ("sit", "application/x-stuffit"),
    ("tar", "application/x-tar"),
    ("tcl", "application/x-tcl"),
    ("tex", "application/x-tex"),
    ("texinfo", "application/x-texinfo"),
    ("texi", "application/x-texinfo"),
    ("t", "application/x-troff"),
    ("tr", "application/x-troff"),
    ("roff", "application/x-troff"),
    ("man", "application/x-troff-man"),
    ("me", "application/x-troff-me"),
    ("ms", "application/x-troff-ms"),
    ("zip", "application/zip"),
    ("au", "audio/basic"),
    ("snd", "audio/basic"),
    ("mid", "audio/midi"),
    ("midi", "audio/midi"),
    ("kar", "audio/midi"),
    ("mpga", "audio/mpeg"),
    ("mp2", "audio/mpeg"),
    ("mp3", "audio/mpeg"),
    ("aif", "audio/x-aiff"),
    ("aiff", "audio/x-aiff"),
    ("aifc", "audio/x-aiff"),
    ("ram", "audio/x-pn-realaudio"),
    ("rm", "audio/x-pn-realaudio"),
    ("ra", "audio/x-realaudio"),
    ("wav", "audio/x-wav"),
    ("bmp", "image/bmp"),
    ("gif", "image/gif"),
    ("ief", "image/ief"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("jpe", "image/jpeg"),
    ("png", "image/png"),
    ("tiff", "image/tiff"),
    ("tif", "image/tiff"),
    ("ras", "image/x-cmu-raster"),
    ("pnm", "image/x-portable-anymap"),
    ("pbm", "image/x-portable-bitmap"),
    ("pgm", "image/x-portable-graymap"),
    ("ppm", "image/x-portable-pixmap"),
    ("rgb", "image/x-rgb"),
    ("xbm", "image/x-xbitmap"),
    ("xpm", "image/x-xpixmap"),
    ("xwd", "image/x-xwindowdump"),
    ("igs", "model/iges"),
    ("iges", "model/iges"),
    ("msh", "model/mesh"),
    ("mesh", "model/mesh"),
    ("silo", "model/mesh"),
    ("wrl", "model/vrml"),
    ("vrml", "model/vrml"),
    ("css", "text/css"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("asc", "text/plain"),
    ("txt", "text/plain"),
    ("rtx", "text/richtext"),
    ("rtf", "text/rtf"),
    ("sgml", "text/sgml"),
    ("sgm", "text/sgml"),
    ("tsv", "text/tab-separated-values"),
    ("xml", "text/xml"),
    ("mpeg", "video/mpeg"),
    ("mpg", "video/mpeg"),
    ("mpe", "video/mpeg"),
    ("qt", "video/quicktime"),
    ("mov", "video/quicktime"),
    ("avi", "video/x-msvideo"),
];

/// Extensions transferred byte for byte. Everything else is read as text.
const BUILTIN_BINARY_EXTENSIONS: &[&str] = &[
    "hqx", "doc", "bin", "dms", "lha", "lzh", "exe", "class", "pdf", "ai", "eps", "ps", "smi",
    "smil", "mif", "asf", "xls", "ppt", "vcd", "Z", "cpio", "csh", "dcr", "dir", "dxr", "dvi",
    "gtar", "gz", "js", "latex", "sh", "shar", "swf", "sit", "tar", "tcl", "tex", "texinfo",
    "texi", "t", "tr", "roff", "man", "me", "ms", "zip", "au", "snd", "mid", "midi", "kar",
    "mpga", "mp2", "mp3", "aif", "aiff", "aifc", "ram", "rm", "ra", "wav", "bmp", "gif", "ief",
    "jpeg", "jpg", "jpe", "png", "tiff", "tif", "ras", "pnm", "pbm", "pgm", "ppm", "rgb", "xbm",
    "xpm", "xwd", "igs", "iges", "msh", "mesh", "silo", "wrl", "vrml", "mpeg", "mpg", "mpe",
    "qt", "mov", "avi",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_wins_over_binary() {
        let mut cfg = Config::default();
        cfg.cgi.insert("gz".to_string(), PathBuf::from("/usr/bin/zcat"));
        let registry = SiteRegistry::from_config(&cfg);

        assert_eq!(
            registry.classify(Some("gz")),
            FileKind::Script(PathBuf::from("/usr/bin/zcat"))
        );
    }

    #[test]
    fn config_overrides_builtin_mime() {
        let mut cfg = Config::default();
        cfg.mime_types.insert("html".to_string(), "text/x-custom".to_string());
        let registry = SiteRegistry::from_config(&cfg);

        assert_eq!(registry.mime_type("html"), Some("text/x-custom"));
        assert_eq!(registry.mime_type("css"), Some("text/css"));
    }

    #[test]
    fn interpreter_and_binary_lookups() {
        let mut cfg = Config::default();
        cfg.cgi.insert("php".to_string(), PathBuf::from("/usr/bin/php-cgi"));
        let registry = SiteRegistry::from_config(&cfg);

        assert_eq!(registry.interpreter("php"), Some(Path::new("/usr/bin/php-cgi")));
        assert!(registry.interpreter("txt").is_none());
        assert!(registry.is_binary_ext("png"));
        assert!(!registry.is_binary_ext("txt"));
    }
}
