//! Content classification: MIME type and content-encoding per key

use std::path::Path;

use crate::config::ValueSource;

/// MIME type for HTML documents; the only type that receives a charset suffix
pub const HTML_MIME: &str = "text/html";

/// Fallback when the extension is unknown
pub const DEFAULT_MIME: &str = "application/octet-stream";

/// Strategy decoupling the MIME lookup name from the destination key
pub trait MimeLookup: Send + Sync {
    fn lookup_name(&self, key: &str) -> String;
}

impl<F> MimeLookup for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn lookup_name(&self, key: &str) -> String {
        self(key)
    }
}

/// Resolved content metadata for a single key; never persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDescriptor {
    pub mime_type: String,
    pub content_encoding: Option<String>,
}

/// Classify a destination key.
///
/// The MIME type comes from the extension table, keyed on the lookup name
/// (the key itself unless an override strategy is configured). The charset
/// suffix applies to `text/html` only; other textual types are deliberately
/// left untouched.
pub fn classify(
    key: &str,
    lookup: Option<&dyn MimeLookup>,
    charset: Option<&str>,
    encoding: Option<&ValueSource<String>>,
) -> ContentDescriptor {
    let lookup_name = match lookup {
        Some(lookup) => lookup.lookup_name(key),
        None => key.to_string(),
    };

    let mut mime_type = mime_for_path(&lookup_name).to_string();
    if let Some(charset) = charset {
        if mime_type == HTML_MIME {
            mime_type = format!("{HTML_MIME};charset={charset}");
        }
    }

    let content_encoding = encoding.map(|source| source.resolve(key));

    ContentDescriptor {
        mime_type,
        content_encoding,
    }
}

/// Extension-based MIME lookup with an octet-stream fallback
pub fn mime_for_path(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    match ext.to_ascii_lowercase().as_str() {
        "html" | "htm" => HTML_MIME,
        "css" => "text/css",
        "js" | "mjs" => "application/javascript",
        "json" | "map" => "application/json",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "xml" => "application/xml",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "eot" => "application/vnd.ms-fontobject",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "wasm" => "application/wasm",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        _ => DEFAULT_MIME,
    }
}
