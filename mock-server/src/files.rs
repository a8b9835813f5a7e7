//! A handler that serves files from a directory.
//!
//! # Design
//! Request paths are resolved segment by segment under the root; `..` is
//! refused outright (403) instead of being normalized. A request for a
//! directory, including `/`, serves that directory's `index.html`. Missing
//! files are a plain 404 with no body, and read failures surface as 500
//! through the `From<io::Error>` conversion on `HttpError`.

use std::fs;
use std::path::{Path, PathBuf};

use mockhttp_core::{HttpError, Request, Response, CONTENT_TYPE};
use tracing::debug;

use crate::error::ServerError;
use crate::file_type::FileType;
use crate::handler::Handler;

/// Value of the `server` header on every file server response.
pub const SERVER_NAME: &str = concat!("mockhttp/", env!("CARGO_PKG_VERSION"));

const INDEX_FILE: &str = "index.html";

#[derive(Debug, Clone)]
pub struct FileServer {
    root: PathBuf,
}

impl FileServer {
    /// Serve files below `root`, which must be an existing directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, ServerError> {
        let root = root.into();
        match fs::metadata(&root) {
            Ok(meta) if meta.is_dir() => Ok(Self { root }),
            Ok(_) => Err(ServerError::InvalidRoot {
                path: root,
                reason: "not a directory",
            }),
            Err(_) => Err(ServerError::InvalidRoot {
                path: root,
                reason: "does not exist",
            }),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a request path onto the file system.
    fn resolve(&self, request_path: &str) -> Result<PathBuf, HttpError> {
        let path = request_path.split(['?', '#']).next().unwrap_or_default();
        let mut resolved = self.root.clone();
        for segment in path.split('/') {
            match segment {
                "" | "." => {}
                ".." => return Err(HttpError::new(403, "path escapes the document root")),
                segment => resolved.push(segment),
            }
        }
        if resolved.is_dir() {
            resolved.push(INDEX_FILE);
        }
        Ok(resolved)
    }
}

impl Handler for FileServer {
    fn handle(&self, request: &Request, response: &mut Response) -> Result<(), HttpError> {
        response.set_header("server", SERVER_NAME);

        let path = self.resolve(request.path())?;
        if !path.is_file() {
            debug!(path = %path.display(), "file not found");
            response.set_status(404);
            return Ok(());
        }

        let bytes = fs::read(&path)?;
        response.set_status(200);
        response.set_header(CONTENT_TYPE, FileType::detect(&bytes).mime_type());
        response.set_body(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<html><body>home</body></html>").unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs").join("index.html"), "<html>docs</html>").unwrap();
        fs::write(dir.path().join("docs").join("notes.txt"), "plain notes").unwrap();
        dir
    }

    fn get(server: &FileServer, path: &str) -> Result<Response, HttpError> {
        let mut response = Response::new();
        server.handle(&Request::new("GET", path), &mut response)?;
        Ok(response)
    }

    #[test]
    fn root_must_exist() {
        let err = FileServer::new("/definitely/not/here").unwrap_err();
        assert!(matches!(err, ServerError::InvalidRoot { reason: "does not exist", .. }));
    }

    #[test]
    fn root_is_kept() {
        let dir = site();
        let server = FileServer::new(dir.path()).unwrap();
        assert_eq!(server.root(), dir.path());
    }

    #[test]
    fn root_must_be_a_directory() {
        let dir = site();
        let err = FileServer::new(dir.path().join("index.html")).unwrap_err();
        assert!(matches!(err, ServerError::InvalidRoot { reason: "not a directory", .. }));
    }

    #[test]
    fn slash_serves_index() {
        let dir = site();
        let server = FileServer::new(dir.path()).unwrap();
        let response = get(&server, "/").unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.header("content-type"), Some("text/html"));
        assert_eq!(response.header("server"), Some(SERVER_NAME));
        assert_eq!(response.body_text().as_deref(), Some("<html><body>home</body></html>"));
    }

    #[test]
    fn directory_serves_its_index() {
        let dir = site();
        let server = FileServer::new(dir.path()).unwrap();
        let response = get(&server, "/docs/").unwrap();
        assert_eq!(response.body_text().as_deref(), Some("<html>docs</html>"));
    }

    #[test]
    fn nested_file_with_query() {
        let dir = site();
        let server = FileServer::new(dir.path()).unwrap();
        let response = get(&server, "/docs/notes.txt?v=2").unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.header("content-type"), Some("text/plain"));
        assert_eq!(response.header("content-length"), Some("11"));
    }

    #[test]
    fn missing_file_is_404_without_body() {
        let dir = site();
        let server = FileServer::new(dir.path()).unwrap();
        let response = get(&server, "/nope.png").unwrap();
        assert_eq!(response.status(), 404);
        assert_eq!(response.reason_phrase(), "Not Found");
        assert_eq!(response.body(), None);
        assert_eq!(response.header("server"), Some(SERVER_NAME));
    }

    #[test]
    fn parent_segments_are_forbidden() {
        let dir = site();
        let server = FileServer::new(dir.path().join("docs")).unwrap();
        let err = get(&server, "/../index.html").unwrap_err();
        assert_eq!(err.status, 403);
    }
}
