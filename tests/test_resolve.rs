use std::path::{Path, PathBuf};

use steward::config::{Config, VirtualHostConfig};
use steward::http::request::{Method, Request};
use steward::site::registry::{FileKind, SiteRegistry};
use steward::site::resolve::resolve;

fn registry_rooted_at(root: &Path) -> SiteRegistry {
    let mut cfg = Config::default();
    cfg.web_root = root.to_path_buf();
    SiteRegistry::from_config(&cfg)
}

#[tokio::test]
async fn test_resolve_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("hello.txt"), "hello\n").unwrap();
    let registry = registry_rooted_at(dir.path());

    let req = Request::builder(Method::Get, "/hello.txt").build();
    let target = resolve(&req, &registry).await.unwrap();

    assert_eq!(target.fs_path, dir.path().join("hello.txt"));
    assert_eq!(target.web_path, "/hello.txt");
    assert!(!target.is_directory);
    assert_eq!(target.kind, FileKind::Text);
    assert_eq!(target.extension.as_deref(), Some("txt"));
    assert_eq!(target.size, 6);
    assert!(target.modified.is_some());
    assert_eq!(target.status, 200);
}

#[tokio::test]
async fn test_resolve_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry_rooted_at(dir.path());

    let req = Request::builder(Method::Get, "/nope.html").build();
    assert_eq!(resolve(&req, &registry).await.unwrap_err(), 404);
}

#[tokio::test]
async fn test_resolve_rejects_traversal_out_of_root() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("webroot");
    std::fs::create_dir(&root).unwrap();
    // The file exists, one level above the root. Rejection must be
    // lexical, not a failed stat.
    std::fs::write(dir.path().join("secret.txt"), "secret").unwrap();
    let registry = registry_rooted_at(&root);

    let req = Request::builder(Method::Get, "/../secret.txt").build();
    assert_eq!(resolve(&req, &registry).await.unwrap_err(), 404);

    let req = Request::builder(Method::Get, "/a/../../secret.txt").build();
    assert_eq!(resolve(&req, &registry).await.unwrap_err(), 404);
}

#[tokio::test]
async fn test_resolve_allows_dotdot_inside_root() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    std::fs::write(dir.path().join("notes.txt"), "notes").unwrap();
    let registry = registry_rooted_at(dir.path());

    let req = Request::builder(Method::Get, "/sub/../notes.txt").build();
    let target = resolve(&req, &registry).await.unwrap();

    assert_eq!(target.fs_path, dir.path().join("notes.txt"));
}

#[tokio::test]
async fn test_resolve_marks_directories() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("docs")).unwrap();
    let registry = registry_rooted_at(dir.path());

    let req = Request::builder(Method::Get, "/docs").build();
    let target = resolve(&req, &registry).await.unwrap();

    assert!(target.is_directory);
    assert_eq!(target.kind, FileKind::Text);
}

#[tokio::test]
async fn test_resolve_selects_virtual_host_root() {
    let dir = tempfile::tempdir().unwrap();
    let default_root = dir.path().join("default");
    let files_root = dir.path().join("files");
    std::fs::create_dir(&default_root).unwrap();
    std::fs::create_dir(&files_root).unwrap();
    std::fs::write(default_root.join("f.txt"), "default").unwrap();
    std::fs::write(files_root.join("f.txt"), "files").unwrap();

    let mut cfg = Config::default();
    cfg.web_root = default_root.clone();
    cfg.virtual_hosts.push(VirtualHostConfig {
        name: Some("files".to_string()),
        host: "files.example.com".to_string(),
        root: files_root.clone(),
    });
    let registry = SiteRegistry::from_config(&cfg);

    let req = Request::builder(Method::Get, "/f.txt")
        .host("files.example.com")
        .build();
    let target = resolve(&req, &registry).await.unwrap();
    assert_eq!(target.fs_path, files_root.join("f.txt"));

    // Host matching ignores case.
    let req = Request::builder(Method::Get, "/f.txt")
        .host("FILES.Example.COM")
        .build();
    let target = resolve(&req, &registry).await.unwrap();
    assert_eq!(target.fs_path, files_root.join("f.txt"));

    // Unknown hosts fall back to the default root.
    let req = Request::builder(Method::Get, "/f.txt")
        .host("unknown.example.com")
        .build();
    let target = resolve(&req, &registry).await.unwrap();
    assert_eq!(target.fs_path, default_root.join("f.txt"));
}

#[tokio::test]
async fn test_resolve_classifies_scripts_over_binary() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("run.sh"), "echo hi\n").unwrap();

    // "sh" sits in the built-in binary table; the CGI entry must win.
    let mut cfg = Config::default();
    cfg.web_root = dir.path().to_path_buf();
    cfg.cgi.insert("sh".to_string(), PathBuf::from("/bin/sh"));
    let registry = SiteRegistry::from_config(&cfg);

    let req = Request::builder(Method::Get, "/run.sh").build();
    let target = resolve(&req, &registry).await.unwrap();
    assert_eq!(target.kind, FileKind::Script(PathBuf::from("/bin/sh")));

    // Without the CGI entry the same extension is plain binary.
    let registry = registry_rooted_at(dir.path());
    let target = resolve(&req, &registry).await.unwrap();
    assert_eq!(target.kind, FileKind::Binary);
}

#[tokio::test]
async fn test_resolve_classifies_binary_extensions() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("img.png"), [0u8, 159, 146, 150]).unwrap();
    let registry = registry_rooted_at(dir.path());

    let req = Request::builder(Method::Get, "/img.png").build();
    let target = resolve(&req, &registry).await.unwrap();

    assert_eq!(target.kind, FileKind::Binary);
    assert_eq!(target.size, 4);
}

#[tokio::test]
async fn test_resolve_rejects_question_mark_in_path() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry_rooted_at(dir.path());

    // The parser strips queries; a surviving '?' means a malformed target.
    let req = Request::builder(Method::Get, "/has?mark").build();
    assert_eq!(resolve(&req, &registry).await.unwrap_err(), 404);
}
