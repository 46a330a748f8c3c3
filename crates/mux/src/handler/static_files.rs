use crate::body::{ReqBody, ResponseBody};
use crate::handler::RequestHandler;
use crate::request::RequestContext;
use crate::responder::{status_response, with_content_type};
use async_trait::async_trait;
use futures::TryStreamExt;
use http::{HeaderValue, Response, StatusCode, header};
use http_body::Frame;
use http_body_util::StreamBody;
use mime::Mime;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

const INDEX_FILE: &str = "index.html";

/// Serves files below a base directory.
///
/// The file is named by the remainder a trailing wildcard captured, so the handler belongs on a
/// pattern like `GET /static/`. Paths leaving the base directory and missing files are answered
/// with 404, a directory is answered with its `index.html`.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    base_dir: PathBuf,
}

impl StaticFiles {
    pub fn new<P: Into<PathBuf>>(base_dir: P) -> Self {
        Self { base_dir: base_dir.into() }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        let mut path = self.base_dir.clone();
        for component in Path::new(url_path.trim_start_matches('/')).components() {
            match component {
                Component::Normal(name) => path.push(name),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(path)
    }

    async fn open(&self, url_path: &str) -> io::Result<StaticFile> {
        let mut path = self
            .map_path(url_path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "path leaves the base directory"))?;

        if tokio::fs::metadata(&path).await?.is_dir() {
            path.push(INDEX_FILE);
        }

        let file = File::open(&path).await?;
        let len = file.metadata().await?.len();
        Ok(StaticFile { file, len, content_type: content_type(&path) })
    }
}

struct StaticFile {
    file: File,
    len: u64,
    content_type: Mime,
}

impl StaticFile {
    /// Streams the file in chunks instead of reading it into memory.
    fn into_response(self) -> Response<ResponseBody> {
        let frames = ReaderStream::new(self.file).map_ok(Frame::data);
        let mut response = Response::new(ResponseBody::stream(StreamBody::new(frames)));
        response.headers_mut().insert(header::CONTENT_LENGTH, HeaderValue::from(self.len));
        with_content_type(response, &self.content_type)
    }
}

fn content_type(path: &Path) -> Mime {
    let extension = path.extension().and_then(|s| s.to_str()).unwrap_or_default().to_ascii_lowercase();
    match extension.as_str() {
        "html" | "htm" => mime::TEXT_HTML_UTF_8,
        "css" => mime::TEXT_CSS_UTF_8,
        "js" => mime::APPLICATION_JAVASCRIPT_UTF_8,
        "json" => mime::APPLICATION_JSON,
        "txt" => mime::TEXT_PLAIN_UTF_8,
        "csv" => mime::TEXT_CSV_UTF_8,
        "xml" => mime::TEXT_XML,
        "svg" => mime::IMAGE_SVG,
        "png" => mime::IMAGE_PNG,
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "gif" => mime::IMAGE_GIF,
        "bmp" => mime::IMAGE_BMP,
        "pdf" => mime::APPLICATION_PDF,
        "woff" => mime::FONT_WOFF,
        "woff2" => mime::FONT_WOFF2,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

#[async_trait]
impl RequestHandler for StaticFiles {
    async fn invoke(&self, req: RequestContext, _req_body: ReqBody) -> Response<ResponseBody> {
        let url_path = req.path_params().remainder().unwrap_or_default();

        match self.open(url_path).await {
            Ok(file) => file.into_response(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = url_path, "static file not found");
                status_response(StatusCode::NOT_FOUND)
            }
            Err(e) => {
                warn!(path = url_path, cause = %e, "can't read static file");
                status_response(StatusCode::NOT_FOUND)
            }
        }
    }
}
