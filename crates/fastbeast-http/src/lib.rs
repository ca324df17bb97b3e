//! HTTP/1.x wire layer: the streaming request parser, the gathered-write
//! response serializer, and the content-type table.

pub mod mime;
pub mod parser;
pub mod serializer;

pub use parser::{ParseError, ParseStatus, RequestParser};
pub use serializer::{GatherSerializer, SerializedHead};

/// Upper bound on the request target. Longer targets are a fatal parse
/// error rather than a heap allocation.
pub const TARGET_CAPACITY: usize = 1024;

pub type Target = arrayvec::ArrayString<TARGET_CAPACITY>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
    Patch,
    /// Unrecognized method token. Carried through to dispatch, not an error.
    Unknown,
}

impl Verb {
    pub fn from_token(token: &[u8]) -> Verb {
        match token {
            b"GET" => Verb::Get,
            b"HEAD" => Verb::Head,
            b"POST" => Verb::Post,
            b"PUT" => Verb::Put,
            b"DELETE" => Verb::Delete,
            b"CONNECT" => Verb::Connect,
            b"OPTIONS" => Verb::Options,
            b"TRACE" => Verb::Trace,
            b"PATCH" => Verb::Patch,
            _ => Verb::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    Http10,
    Http11,
}

impl Version {
    pub fn minor(self) -> u8 {
        match self {
            Version::Http10 => 0,
            Version::Http11 => 1,
        }
    }
}

/// A request as the dispatcher sees it: only the request line and the
/// keep-alive determination survive parsing.
#[derive(Debug, Clone)]
pub struct Request {
    pub verb: Verb,
    pub target: Target,
    pub version: Version,
    pub keep_alive: bool,
}

/// Logical response head. Dispatchers construct it by value; the serializer
/// is its sole consumer.
#[derive(Debug, Clone, Copy)]
pub struct ResponseHead {
    pub status: u16,
    pub version: Version,
    pub keep_alive: bool,
    /// Complete `Content-Type` header line from the MIME table.
    pub content_type: &'static str,
    pub content_length: usize,
}

/// Obsolete reason phrase for the status line.
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        100 => "Continue",
        101 => "Switching Protocols",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        206 => "Partial Content",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        411 => "Length Required",
        413 => "Payload Too Large",
        414 => "URI Too Long",
        431 => "Request Header Fields Too Large",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        503 => "Service Unavailable",
        505 => "HTTP Version Not Supported",
        _ => "Unknown",
    }
}
