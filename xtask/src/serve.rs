//! `serve-payloads`: development file server for payload volumes.
//!
//! Answers `GET`/`HEAD /get/?file_path=<path>` with the file's bytes as an
//! attachment and `Access-Control-Allow-Origin: *`, so a locally running
//! viewer can fetch volumes from disk. Paths are resolved against the
//! server root and may not leave it.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use niivue_vision::query::{unquote, QueryParams};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

/// Route serving files.
const GET_ROUTE: &str = "/get/";
/// Query parameter naming the file.
const FILE_PARAM: &str = "file_path";

/// What to answer a request with.
#[derive(Debug, PartialEq, Eq)]
enum Reply {
    /// Stream this file.
    File(PathBuf),
    /// CORS preflight.
    Preflight,
    /// Bodiless error status with a reason for the log.
    Status(u16, String),
}

/// Serve `root` on `addr` until the process is killed.
pub fn run(addr: &str, root: &Path) -> anyhow::Result<()> {
    let root = root
        .canonicalize()
        .with_context(|| format!("payload root {} not found", root.display()))?;
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to bind {addr}: {e}"))?;
    log::info!("serving {} on http://{addr}{GET_ROUTE}?{FILE_PARAM}=...", root.display());
    log::warn!("development server: no authentication, do not expose publicly");

    for request in server.incoming_requests() {
        let reply = resolve(request.method(), request.url(), &root);
        log::info!("{} {} -> {reply:?}", request.method(), request.url());
        if let Err(e) = respond(request, reply) {
            log::warn!("failed to send response: {e}");
        }
    }
    Ok(())
}

/// Decide the reply without touching the network.
fn resolve(method: &Method, url: &str, root: &Path) -> Reply {
    let path = url.split_once('?').map_or(url, |(path, _)| path);
    if path != GET_ROUTE {
        return Reply::Status(404, format!("no route {path}"));
    }
    match method {
        Method::Options => return Reply::Preflight,
        Method::Get | Method::Head => {}
        other => return Reply::Status(405, format!("method {other} not allowed")),
    }

    let params = QueryParams::from_href(url);
    let Some(raw) = params.get(FILE_PARAM) else {
        return Reply::Status(422, format!("missing {FILE_PARAM}"));
    };
    let requested = unquote(raw.trim()).trim();
    if requested.is_empty() {
        return Reply::Status(422, format!("empty {FILE_PARAM}"));
    }

    let Ok(resolved) = root.join(requested).canonicalize() else {
        return Reply::Status(404, format!("File not found: {requested}"));
    };
    if !resolved.starts_with(root) {
        return Reply::Status(403, format!("{requested} is outside the root"));
    }
    if !resolved.is_file() {
        return Reply::Status(404, format!("File not found: {requested}"));
    }
    Reply::File(resolved)
}

fn respond(request: Request, reply: Reply) -> std::io::Result<()> {
    match reply {
        Reply::File(path) => {
            let file = match File::open(&path) {
                Ok(file) => file,
                Err(e) => {
                    log::warn!("cannot open {}: {e}", path.display());
                    return request.respond(with_cors(Response::empty(500)));
                }
            };
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let mut response = with_cors(Response::from_file(file));
            for (field, value) in [
                ("Content-Type", "application/octet-stream".to_owned()),
                (
                    "Content-Disposition",
                    format!("attachment; filename={name}"),
                ),
            ] {
                if let Some(header) = header(field, &value) {
                    response.add_header(header);
                }
            }
            request.respond(response)
        }
        Reply::Preflight => {
            let mut response = with_cors(Response::empty(204));
            for (field, value) in [
                ("Access-Control-Allow-Methods", "GET, HEAD, OPTIONS"),
                ("Access-Control-Allow-Headers", "*"),
            ] {
                if let Some(header) = header(field, value) {
                    response.add_header(header);
                }
            }
            request.respond(response)
        }
        Reply::Status(code, reason) => {
            log::debug!("{code}: {reason}");
            request.respond(with_cors(Response::empty(StatusCode(code))))
        }
    }
}

fn with_cors<R: std::io::Read>(mut response: Response<R>) -> Response<R> {
    if let Some(header) = header("Access-Control-Allow-Origin", "*") {
        response.add_header(header);
    }
    response
}

fn header(field: &str, value: &str) -> Option<Header> {
    Header::from_bytes(field.as_bytes(), value.as_bytes()).ok()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    /// Fresh directory with `scan.nii` and `nested/b.nii`.
    fn fixture(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("vision-xtask-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("scan.nii"), b"nifti").unwrap();
        fs::write(dir.join("nested").join("b.nii"), b"nifti").unwrap();
        dir.canonicalize().unwrap()
    }

    #[test]
    fn serves_quoted_relative_path() {
        let root = fixture("quoted");
        let reply = resolve(&Method::Get, "/get/?file_path=%22scan.nii%22", &root);
        assert_eq!(reply, Reply::File(root.join("scan.nii")));

        let reply =
            resolve(&Method::Head, "/get/?file_path=' nested/b.nii '", &root);
        assert_eq!(reply, Reply::File(root.join("nested").join("b.nii")));
    }

    #[test]
    fn missing_file_is_404() {
        let root = fixture("missing");
        let reply = resolve(&Method::Get, "/get/?file_path=nope.nii", &root);
        assert!(matches!(reply, Reply::Status(404, _)));
        let reply = resolve(&Method::Get, "/get/?file_path=nested", &root);
        assert!(matches!(reply, Reply::Status(404, _)));
    }

    #[test]
    fn escaping_the_root_is_403() {
        let root = fixture("escape");
        let inner = root.join("nested");
        let reply = resolve(&Method::Get, "/get/?file_path=../scan.nii", &inner);
        assert!(matches!(reply, Reply::Status(403, _)));

        let absolute = format!("/get/?file_path={}", root.join("scan.nii").display());
        let reply = resolve(&Method::Get, &absolute, &inner);
        assert!(matches!(reply, Reply::Status(403, _)));
    }

    #[test]
    fn routing_and_methods() {
        let root = fixture("routing");
        assert_eq!(
            resolve(&Method::Options, "/get/?file_path=scan.nii", &root),
            Reply::Preflight
        );
        assert!(matches!(
            resolve(&Method::Post, "/get/?file_path=scan.nii", &root),
            Reply::Status(405, _)
        ));
        assert!(matches!(
            resolve(&Method::Get, "/other?file_path=scan.nii", &root),
            Reply::Status(404, _)
        ));
        assert!(matches!(
            resolve(&Method::Get, "/get/", &root),
            Reply::Status(422, _)
        ));
    }
}
