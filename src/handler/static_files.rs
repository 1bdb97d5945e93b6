//! Static file serving module
//!
//! Maps a request path to a file under the content root and builds the
//! response, falling back to the configured 404 page.

use crate::config::ContentConfig;
use crate::error::ServeError;
use crate::http::{self, Method, Response, Status, SERVER_NAME};
use crate::logger;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tokio::io::AsyncReadExt;

/// Content root plus the fallback page served for missing files
#[derive(Debug, Clone)]
pub struct ContentRoot {
    root: PathBuf,
    fallback: PathBuf,
    stat_path_quirk: bool,
}

impl ContentRoot {
    pub fn new(root: impl Into<PathBuf>, fallback_file: &str) -> Self {
        let root = root.into();
        let fallback = root.join(fallback_file);
        Self {
            root,
            fallback,
            stat_path_quirk: false,
        }
    }

    /// Look up `Last-Modified` at `<root>/<raw path>` instead of the opened file
    #[must_use]
    pub const fn with_stat_path_quirk(mut self, enabled: bool) -> Self {
        self.stat_path_quirk = enabled;
        self
    }

    pub fn from_config(cfg: &ContentConfig) -> Self {
        Self::new(&cfg.root, &cfg.fallback_file).with_stat_path_quirk(cfg.stat_path_quirk)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn fallback_path(&self) -> &Path {
        &self.fallback
    }
}

/// File contents and modification time
struct LoadedFile {
    data: Vec<u8>,
    modified: Option<SystemTime>,
}

/// Build the response for `method` on `path`
///
/// A missing target becomes a 404 carrying the fallback page. Only an
/// unreadable fallback page is an error.
pub async fn generate_response(
    method: Method,
    path: &str,
    content: &ContentRoot,
) -> Result<Response, ServeError> {
    let response = match load_file(content, path).await {
        Some(file) => build_file_response(file),
        None => build_not_found_response(content).await?,
    };

    if method.wants_body() {
        Ok(response)
    } else {
        Ok(response.without_body())
    }
}

fn build_file_response(file: LoadedFile) -> Response {
    let mut response =
        Response::new(Status::Okay).header("Content-length", file.data.len().to_string());
    if let Some(modified) = file.modified {
        response = response.header("Last-Modified", http::format_last_modified(modified));
    }
    response.header("Server", SERVER_NAME).body(file.data)
}

async fn build_not_found_response(content: &ContentRoot) -> Result<Response, ServeError> {
    let fallback = fs::read(&content.fallback)
        .await
        .map_err(|source| ServeError::FallbackMissing {
            path: content.fallback.clone(),
            source,
        })?;
    Ok(Response::status_only(Status::NotFound).body(fallback))
}

/// Read `<root>/<path without leading slash>`; `None` means "serve the 404"
async fn load_file(content: &ContentRoot, path: &str) -> Option<LoadedFile> {
    let name = path.strip_prefix('/').unwrap_or(path);

    if escapes_root(name) {
        logger::log_warning(&format!("Path traversal attempt blocked: {path}"));
        return None;
    }

    let file_path = content.root.join(name);
    let mut file = fs::File::open(&file_path).await.ok()?;
    let mut data = Vec::new();
    // Directories open fine on unix but fail here
    file.read_to_end(&mut data).await.ok()?;

    let modified = if content.stat_path_quirk {
        let raw = format!("{}/{path}", content.root.display());
        fs::metadata(raw).await.and_then(|m| m.modified())
    } else {
        file.metadata().await.and_then(|m| m.modified())
    };

    let modified = match modified {
        Ok(time) => Some(time),
        Err(e) => {
            logger::log_warning(&format!(
                "No modification time for '{}': {e}",
                file_path.display()
            ));
            None
        }
    };

    Some(LoadedFile { data, modified })
}

/// True when the relative name could resolve outside the content root
fn escapes_root(name: &str) -> bool {
    Path::new(name).components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestRoot;
    use std::time::{Duration, UNIX_EPOCH};

    #[tokio::test]
    async fn test_get_existing_file() {
        let root = TestRoot::new("get-existing");
        let resp = generate_response(Method::Get, "/index.html", &root.content())
            .await
            .unwrap();

        assert_eq!(resp.status(), Status::Okay);
        assert_eq!(resp.headers()[0], ("Content-length", "12".to_string()));
        assert_eq!(resp.headers()[1].0, "Last-Modified");
        assert_eq!(resp.headers()[2], ("Server", "cihttp".to_string()));
        assert_eq!(resp.body_bytes(), Some(&b"Hello World!"[..]));
    }

    #[tokio::test]
    async fn test_head_existing_file() {
        let root = TestRoot::new("head-existing");
        let get = generate_response(Method::Get, "/index.html", &root.content())
            .await
            .unwrap();
        let head = generate_response(Method::Head, "/index.html", &root.content())
            .await
            .unwrap();

        assert_eq!(head.head_text(), get.head_text());
        assert_eq!(head.body_bytes(), None);
    }

    #[tokio::test]
    async fn test_missing_file_serves_fallback() {
        let root = TestRoot::new("missing");
        let resp = generate_response(Method::Get, "/missing.html", &root.content())
            .await
            .unwrap();

        assert_eq!(resp.status(), Status::NotFound);
        assert_eq!(resp.head_text(), "HTTP/1.1 404 Not found\r\n");
        assert!(resp.headers().is_empty());
        assert_eq!(resp.body_bytes(), Some(&b"Not Found"[..]));

        let head = generate_response(Method::Head, "/missing.html", &root.content())
            .await
            .unwrap();
        assert_eq!(head.status(), Status::NotFound);
        assert_eq!(head.body_bytes(), None);
    }

    #[tokio::test]
    async fn test_missing_fallback_is_error() {
        let root = TestRoot::new("no-fallback");
        std::fs::remove_file(root.path().join("404.html")).unwrap();

        let err = generate_response(Method::Get, "/missing.html", &root.content())
            .await
            .unwrap_err();
        assert!(matches!(err, ServeError::FallbackMissing { .. }));

        // Existing files are still served
        let resp = generate_response(Method::Get, "/index.html", &root.content())
            .await
            .unwrap();
        assert_eq!(resp.status(), Status::Okay);
    }

    #[tokio::test]
    async fn test_last_modified_from_file() {
        let root = TestRoot::new("last-modified");
        root.set_modified("index.html", UNIX_EPOCH + Duration::from_secs(1_000_000_000));

        for quirk in [false, true] {
            let content = root.content().with_stat_path_quirk(quirk);
            let resp = generate_response(Method::Head, "/index.html", &content)
                .await
                .unwrap();
            assert_eq!(
                resp.headers()[1],
                (
                    "Last-Modified",
                    "Sunday, 09 September 2001 01:46:40 GMT".to_string()
                )
            );
        }
    }

    #[tokio::test]
    async fn test_nested_file() {
        let root = TestRoot::new("nested");
        root.write("docs/readme.txt", "nested");
        let resp = generate_response(Method::Get, "/docs/readme.txt", &root.content())
            .await
            .unwrap();
        assert_eq!(resp.status(), Status::Okay);
        assert_eq!(resp.body_bytes(), Some(&b"nested"[..]));
    }

    #[tokio::test]
    async fn test_directory_and_empty_path_are_not_found() {
        let root = TestRoot::new("directory");
        root.write("docs/readme.txt", "nested");
        for path in ["/", "", "/docs"] {
            let resp = generate_response(Method::Get, path, &root.content())
                .await
                .unwrap();
            assert_eq!(resp.status(), Status::NotFound, "path {path:?}");
        }
    }

    #[tokio::test]
    async fn test_traversal_blocked() {
        let root = TestRoot::new("traversal");
        for path in ["/../Cargo.toml", "/docs/../../x", "//etc/passwd"] {
            let resp = generate_response(Method::Get, path, &root.content())
                .await
                .unwrap();
            assert_eq!(resp.status(), Status::NotFound, "path {path:?}");
        }
    }

    #[test]
    fn test_escapes_root() {
        assert!(escapes_root("../x"));
        assert!(escapes_root("/etc/passwd"));
        assert!(!escapes_root("index.html"));
        assert!(!escapes_root("a/b/c.txt"));
        assert!(!escapes_root("a..b"));
    }
}
