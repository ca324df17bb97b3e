//! Request dispatch: a switch on the verb and a target validity check.
//! `GET` serves a mapped file; everything else is a 400.

use crate::cache::{FileCache, MappedFile};
use fastbeast_http::{mime, Request, ResponseHead, Verb};
use std::rc::Rc;

const NOT_FOUND_BODY: &[u8] = b"File not found\r\n";
const BAD_METHOD_BODY: &[u8] = b"Invalid request-method\r\n";

pub enum ResponseBody {
    Static(&'static [u8]),
    /// Borrowed byte range of a cache mapping; the handle keeps the mapping
    /// alive across the write.
    File(Rc<MappedFile>),
}

impl ResponseBody {
    pub fn as_slice(&self) -> &[u8] {
        match self {
            ResponseBody::Static(bytes) => bytes,
            ResponseBody::File(file) => file.bytes(),
        }
    }
}

pub struct Response {
    pub head: ResponseHead,
    pub body: ResponseBody,
}

pub fn dispatch(request: &Request, cache: &mut FileCache) -> Response {
    match request.verb {
        Verb::Get => file_response(request, cache),
        _ => error_response(request, 400, BAD_METHOD_BODY),
    }
}

fn file_response(request: &Request, cache: &mut FileCache) -> Response {
    let target = request.target.as_str();
    // The only traversal guard: any `..` anywhere in the target rejects,
    // with no canonicalization (`/foo..bar` is rejected too).
    if target.is_empty() || !target.starts_with('/') || target.contains("..") {
        return error_response(request, 404, NOT_FOUND_BODY);
    }

    let Some(file) = cache.get(target) else {
        return error_response(request, 404, NOT_FOUND_BODY);
    };

    let head = ResponseHead {
        status: 200,
        version: request.version,
        keep_alive: request.keep_alive,
        content_type: mime::content_type_line(target),
        content_length: file.len(),
    };
    Response {
        head,
        body: ResponseBody::File(file),
    }
}

fn error_response(request: &Request, status: u16, body: &'static [u8]) -> Response {
    Response {
        head: ResponseHead {
            status,
            version: request.version,
            keep_alive: request.keep_alive,
            content_type: mime::DEFAULT_CONTENT_TYPE,
            content_length: body.len(),
        },
        body: ResponseBody::Static(body),
    }
}
