//! Streaming HTTP/1.x request-head parser. Only the request line and the
//! keep-alive determination are materialized; header fields are framed,
//! copied into the request arena as discardable nodes, and scanned solely
//! for `Connection` and body-framing headers.

use crate::{Request, Target, Verb, Version};
use fastbeast_mem::{ArenaFull, BumpArena};

/// Maximum size of the header block, request line included.
pub const HEADER_LIMIT: usize = 8 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    BadRequestLine,
    BadVersion,
    BadTarget,
    BadHeader,
    HeaderTooLarge,
    /// A body was announced; this server accepts none.
    BodyNotAllowed,
    OutOfArena,
}

impl From<ArenaFull> for ParseError {
    fn from(_: ArenaFull) -> Self {
        ParseError::OutOfArena
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            ParseError::BadRequestLine => "malformed request line",
            ParseError::BadVersion => "unsupported HTTP version",
            ParseError::BadTarget => "request target rejected",
            ParseError::BadHeader => "malformed header field",
            ParseError::HeaderTooLarge => "header block exceeds limit",
            ParseError::BodyNotAllowed => "request body not accepted",
            ParseError::OutOfArena => "request arena exhausted",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug)]
pub enum ParseStatus {
    /// The header block has not fully arrived; read more and poll again.
    Incomplete,
    /// A request was parsed; the first `consumed` bytes of the input belong
    /// to it and any remainder is the start of a pipelined successor.
    Complete { request: Request, consumed: usize },
}

pub struct RequestParser {
    // Resume point for the terminator scan across successive polls.
    scanned: usize,
}

impl RequestParser {
    pub fn new() -> Self {
        Self { scanned: 0 }
    }

    pub fn reset(&mut self) {
        self.scanned = 0;
    }

    /// Polls the filled prefix of the session buffer. A request becomes
    /// visible only once the full header block has parsed without error.
    pub fn poll(
        &mut self,
        buf: &[u8],
        arena: &mut BumpArena,
    ) -> Result<ParseStatus, ParseError> {
        match self.find_terminator(buf) {
            Some(header_end) => {
                if header_end + 4 > HEADER_LIMIT {
                    return Err(ParseError::HeaderTooLarge);
                }
                let request = parse_block(&buf[..header_end], arena)?;
                Ok(ParseStatus::Complete {
                    request,
                    consumed: header_end + 4,
                })
            }
            None => {
                if buf.len() >= HEADER_LIMIT {
                    return Err(ParseError::HeaderTooLarge);
                }
                Ok(ParseStatus::Incomplete)
            }
        }
    }

    fn find_terminator(&mut self, buf: &[u8]) -> Option<usize> {
        // Back up three bytes so a terminator split across reads is found.
        let start = self.scanned.saturating_sub(3);
        let end = buf.len().saturating_sub(3);
        for i in start..end {
            if &buf[i..i + 4] == b"\r\n\r\n" {
                self.scanned = i;
                return Some(i);
            }
        }
        self.scanned = buf.len();
        None
    }
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ConnectionHint {
    Unset,
    KeepAlive,
    Close,
}

fn parse_block(block: &[u8], arena: &mut BumpArena) -> Result<Request, ParseError> {
    let mut lines = CrlfLines { rest: block };
    let request_line = lines.next().ok_or(ParseError::BadRequestLine)?;
    let (verb, target, version) = parse_request_line(request_line)?;

    let mut connection = ConnectionHint::Unset;
    for line in lines {
        let colon = line
            .iter()
            .position(|&b| b == b':')
            .ok_or(ParseError::BadHeader)?;
        let name = &line[..colon];
        if name.is_empty() {
            return Err(ParseError::BadHeader);
        }
        let value = trim(&line[colon + 1..]);

        // Field nodes live in the arena only to bound per-request memory;
        // reset discards them all at once.
        arena.alloc_bytes(name)?;
        arena.alloc_bytes(value)?;

        if name.eq_ignore_ascii_case(b"connection") {
            for token in value.split(|&b| b == b',') {
                let token = trim(token);
                if token.eq_ignore_ascii_case(b"close") {
                    connection = ConnectionHint::Close;
                } else if token.eq_ignore_ascii_case(b"keep-alive")
                    && connection != ConnectionHint::Close
                {
                    connection = ConnectionHint::KeepAlive;
                }
            }
        } else if name.eq_ignore_ascii_case(b"content-length") {
            let length = parse_decimal(value).ok_or(ParseError::BadHeader)?;
            if length != 0 {
                return Err(ParseError::BodyNotAllowed);
            }
        } else if name.eq_ignore_ascii_case(b"transfer-encoding") {
            return Err(ParseError::BodyNotAllowed);
        }
    }

    // RFC 7230 §6.3: close wins; otherwise 1.1 defaults open and 1.0
    // requires an explicit keep-alive.
    let keep_alive = match connection {
        ConnectionHint::Close => false,
        ConnectionHint::KeepAlive => true,
        ConnectionHint::Unset => version == Version::Http11,
    };

    Ok(Request {
        verb,
        target,
        version,
        keep_alive,
    })
}

fn parse_request_line(line: &[u8]) -> Result<(Verb, Target, Version), ParseError> {
    let sp1 = line
        .iter()
        .position(|&b| b == b' ')
        .ok_or(ParseError::BadRequestLine)?;
    let method = &line[..sp1];
    if method.is_empty() {
        return Err(ParseError::BadRequestLine);
    }

    let rest = &line[sp1 + 1..];
    let sp2 = rest
        .iter()
        .position(|&b| b == b' ')
        .ok_or(ParseError::BadRequestLine)?;
    let target_bytes = &rest[..sp2];
    let version_bytes = &rest[sp2 + 1..];

    let version = match version_bytes {
        b"HTTP/1.1" => Version::Http11,
        b"HTTP/1.0" => Version::Http10,
        _ => return Err(ParseError::BadVersion),
    };

    if target_bytes.len() > crate::TARGET_CAPACITY {
        return Err(ParseError::BadTarget);
    }
    let target_str =
        std::str::from_utf8(target_bytes).map_err(|_| ParseError::BadTarget)?;
    let target = Target::from(target_str).map_err(|_| ParseError::BadTarget)?;

    Ok((Verb::from_token(method), target, version))
}

fn parse_decimal(value: &[u8]) -> Option<u64> {
    if value.is_empty() {
        return None;
    }
    let mut n: u64 = 0;
    for &b in value {
        if !b.is_ascii_digit() {
            return None;
        }
        n = n.checked_mul(10)?.checked_add(u64::from(b - b'0'))?;
    }
    Some(n)
}

fn trim(mut bytes: &[u8]) -> &[u8] {
    while let [b' ' | b'\t', rest @ ..] = bytes {
        bytes = rest;
    }
    while let [rest @ .., b' ' | b'\t'] = bytes {
        bytes = rest;
    }
    bytes
}

struct CrlfLines<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for CrlfLines<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        if self.rest.is_empty() {
            return None;
        }
        match self.rest.windows(2).position(|w| w == b"\r\n") {
            Some(pos) => {
                let line = &self.rest[..pos];
                self.rest = &self.rest[pos + 2..];
                Some(line)
            }
            None => {
                let line = self.rest;
                self.rest = &[];
                Some(line)
            }
        }
    }
}
