//! # Wire Layer Tests
//!
//! Validates the streaming request parser (verb mapping, version handling,
//! keep-alive derivation, limits, pipelining) and the gathered response
//! serializer (byte-exact head, short-write resumption, MIME table).

use fastbeast_http::parser::HEADER_LIMIT;
use fastbeast_http::serializer::{GatherSerializer, SerializedHead};
use fastbeast_http::{
    mime, ParseError, ParseStatus, RequestParser, Request, ResponseHead, Verb, Version,
};
use fastbeast_mem::BumpArena;
use std::io::IoSlice;

fn parse_one(raw: &[u8]) -> Result<(Request, usize), ParseError> {
    let mut arena = BumpArena::new();
    let mut parser = RequestParser::new();
    match parser.poll(raw, &mut arena)? {
        ParseStatus::Complete { request, consumed } => Ok((request, consumed)),
        ParseStatus::Incomplete => panic!("expected a complete request"),
    }
}

#[test]
fn parses_a_simple_get() {
    let raw = b"GET /index.html HTTP/1.1\r\nHost: x\r\n\r\n";
    let (request, consumed) = parse_one(raw).unwrap();

    assert_eq!(request.verb, Verb::Get);
    assert_eq!(request.target.as_str(), "/index.html");
    assert_eq!(request.version, Version::Http11);
    assert!(request.keep_alive);
    assert_eq!(consumed, raw.len());
}

#[test]
fn reports_incomplete_until_the_header_block_ends() {
    let raw = b"GET /index.html HTTP/1.1\r\nHost: x\r\n\r\n";
    let mut arena = BumpArena::new();
    let mut parser = RequestParser::new();

    // Feed the request a few bytes at a time; only the final poll completes.
    for end in 1..raw.len() {
        match parser.poll(&raw[..end], &mut arena).unwrap() {
            ParseStatus::Incomplete => {}
            ParseStatus::Complete { .. } => panic!("complete at {end} of {}", raw.len()),
        }
    }
    match parser.poll(raw, &mut arena).unwrap() {
        ParseStatus::Complete { consumed, .. } => assert_eq!(consumed, raw.len()),
        ParseStatus::Incomplete => panic!("full header block must complete"),
    }
}

#[test]
fn consumes_only_the_first_of_two_pipelined_requests() {
    let first = b"GET /a.txt HTTP/1.1\r\n\r\n";
    let mut raw = first.to_vec();
    raw.extend_from_slice(b"GET /b.txt HTTP/1.1\r\n\r\n");

    let (request, consumed) = parse_one(&raw).unwrap();
    assert_eq!(request.target.as_str(), "/a.txt");
    assert_eq!(consumed, first.len(), "second request stays in the buffer");
}

#[test]
fn unrecognized_method_tokens_map_to_unknown_without_error() {
    let (request, _) = parse_one(b"BREW /pot HTTP/1.1\r\n\r\n").unwrap();
    assert_eq!(request.verb, Verb::Unknown);

    let (request, _) = parse_one(b"POST /x HTTP/1.1\r\nContent-Length: 0\r\n\r\n").unwrap();
    assert_eq!(request.verb, Verb::Post);
}

#[test]
fn keep_alive_follows_version_and_connection_header() {
    // HTTP/1.1 defaults open.
    let (request, _) = parse_one(b"GET / HTTP/1.1\r\n\r\n").unwrap();
    assert!(request.keep_alive);

    // HTTP/1.1 with an explicit close.
    let (request, _) = parse_one(b"GET / HTTP/1.1\r\nConnection: close\r\n\r\n").unwrap();
    assert!(!request.keep_alive);

    // HTTP/1.0 defaults closed.
    let (request, _) = parse_one(b"GET / HTTP/1.0\r\n\r\n").unwrap();
    assert!(!request.keep_alive);

    // HTTP/1.0 with an explicit keep-alive.
    let (request, _) =
        parse_one(b"GET / HTTP/1.0\r\nConnection: keep-alive\r\n\r\n").unwrap();
    assert!(request.keep_alive);

    // Case-insensitive header name and token.
    let (request, _) = parse_one(b"GET / HTTP/1.1\r\nCONNECTION: Close\r\n\r\n").unwrap();
    assert!(!request.keep_alive);

    // Close wins over keep-alive in a token list.
    let (request, _) =
        parse_one(b"GET / HTTP/1.0\r\nConnection: keep-alive, close\r\n\r\n").unwrap();
    assert!(!request.keep_alive);
}

#[test]
fn rejects_versions_other_than_http_10_and_11() {
    assert_eq!(
        parse_one(b"GET / HTTP/2.0\r\n\r\n").unwrap_err(),
        ParseError::BadVersion
    );
    assert_eq!(
        parse_one(b"GET / SPDY/3\r\n\r\n").unwrap_err(),
        ParseError::BadVersion
    );
}

#[test]
fn rejects_malformed_request_lines_and_headers() {
    assert_eq!(
        parse_one(b"GET/index HTTP/1.1\r\n\r\n").unwrap_err(),
        ParseError::BadRequestLine,
        "a request line needs three tokens"
    );
    assert_eq!(
        parse_one(b"GET\r\n\r\n").unwrap_err(),
        ParseError::BadRequestLine
    );
    assert_eq!(parse_one(b"\r\n\r\n").unwrap_err(), ParseError::BadRequestLine);
    assert_eq!(
        parse_one(b"GET / HTTP/1.1\r\nNoColonHere\r\n\r\n").unwrap_err(),
        ParseError::BadHeader
    );
}

#[test]
fn rejects_announced_request_bodies() {
    assert_eq!(
        parse_one(b"POST /x HTTP/1.1\r\nContent-Length: 10\r\n\r\n").unwrap_err(),
        ParseError::BodyNotAllowed
    );
    assert_eq!(
        parse_one(b"GET / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n").unwrap_err(),
        ParseError::BodyNotAllowed
    );
    // A zero Content-Length is fine.
    assert!(parse_one(b"POST /x HTTP/1.1\r\nContent-Length: 0\r\n\r\n").is_ok());
}

#[test]
fn rejects_oversize_header_blocks() {
    let mut raw = b"GET / HTTP/1.1\r\n".to_vec();
    while raw.len() <= HEADER_LIMIT {
        raw.extend_from_slice(b"X-Filler: aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\r\n");
    }
    raw.extend_from_slice(b"\r\n");
    assert_eq!(parse_one(&raw).unwrap_err(), ParseError::HeaderTooLarge);
}

#[test]
fn rejects_oversize_targets() {
    let mut raw = b"GET /".to_vec();
    raw.extend(std::iter::repeat(b'a').take(2000));
    raw.extend_from_slice(b" HTTP/1.1\r\n\r\n");
    assert_eq!(parse_one(&raw).unwrap_err(), ParseError::BadTarget);
}

#[test]
fn header_fields_are_materialized_in_the_arena() {
    let mut arena = BumpArena::new();
    let mut parser = RequestParser::new();
    let raw = b"GET / HTTP/1.1\r\nHost: example\r\nAccept: */*\r\n\r\n";
    parser.poll(raw, &mut arena).unwrap();
    assert!(arena.used() > 0, "field nodes must land in the arena");

    arena.reset();
    assert_eq!(arena.used(), 0);
}

fn collect(serializer: &GatherSerializer<'_>) -> Vec<u8> {
    let mut slices = [IoSlice::new(&[]); 8];
    let iov = serializer.slices(&mut slices);
    let mut out = Vec::new();
    for slice in iov {
        out.extend_from_slice(slice);
    }
    out
}

#[test]
fn serializes_a_200_head_byte_exactly() {
    let head = ResponseHead {
        status: 200,
        version: Version::Http11,
        keep_alive: true,
        content_type: mime::content_type_line("/index.html"),
        content_length: 5,
    };
    let formatted = SerializedHead::format(&head);
    let serializer = GatherSerializer::new(&formatted, b"hello");

    let expected = b"HTTP/1.1 200 OK\r\n\
Server: FastBeast\r\n\
Content-Type: text/html\r\n\
Connection: keep-alive\r\n\
Content-Length: 5\r\n\r\n\
hello";
    assert_eq!(collect(&serializer), expected);
    assert_eq!(serializer.remaining(), expected.len());
}

#[test]
fn serializes_an_error_head_with_close_and_default_type() {
    let body: &[u8] = b"File not found\r\n";
    let head = ResponseHead {
        status: 404,
        version: Version::Http10,
        keep_alive: false,
        content_type: mime::DEFAULT_CONTENT_TYPE,
        content_length: body.len(),
    };
    let formatted = SerializedHead::format(&head);
    let serializer = GatherSerializer::new(&formatted, body);

    let expected = b"HTTP/1.0 404 Not Found\r\n\
Server: FastBeast\r\n\
Content-Type: application/text\r\n\
Connection: close\r\n\
Content-Length: 16\r\n\r\n\
File not found\r\n";
    assert_eq!(collect(&serializer), expected);
}

#[test]
fn consume_resumes_mid_slice_and_across_slices() {
    let head = ResponseHead {
        status: 200,
        version: Version::Http11,
        keep_alive: true,
        content_type: mime::content_type_line("/a.txt"),
        content_length: 4,
    };
    let formatted = SerializedHead::format(&head);
    let mut serializer = GatherSerializer::new(&formatted, b"body");
    let full = collect(&serializer);

    // Drain in awkward chunk sizes and reassemble.
    let mut reassembled = Vec::new();
    let mut written = 0usize;
    for chunk in [3usize, 1, 40, 7, usize::MAX] {
        if serializer.is_done() {
            break;
        }
        let rest = collect(&serializer);
        let take = chunk.min(rest.len());
        reassembled.extend_from_slice(&rest[..take]);
        serializer.consume(take);
        written += take;
        assert_eq!(serializer.remaining(), full.len() - written);
    }
    assert!(serializer.is_done());
    assert_eq!(reassembled, full);
}

#[test]
fn zero_length_bodies_complete() {
    let head = ResponseHead {
        status: 200,
        version: Version::Http11,
        keep_alive: true,
        content_type: mime::DEFAULT_CONTENT_TYPE,
        content_length: 0,
    };
    let formatted = SerializedHead::format(&head);
    let mut serializer = GatherSerializer::new(&formatted, b"");
    let full = collect(&serializer);
    assert!(full.ends_with(b"Content-Length: 0\r\n\r\n"));

    serializer.consume(full.len());
    assert!(serializer.is_done());
}

#[test]
fn mime_table_matches_extensions_case_insensitively() {
    assert_eq!(
        mime::content_type_line("/index.html"),
        "Content-Type: text/html\r\n"
    );
    assert_eq!(
        mime::content_type_line("/INDEX.HTML"),
        "Content-Type: text/html\r\n"
    );
    assert_eq!(
        mime::content_type_line("/style.css"),
        "Content-Type: text/css\r\n"
    );
    assert_eq!(
        mime::content_type_line("/img.svgz"),
        "Content-Type: image/svg+xml\r\n"
    );
    assert_eq!(
        mime::content_type_line("/pic.JpEg"),
        "Content-Type: image/jpeg\r\n"
    );
    assert_eq!(
        mime::content_type_line("/favicon.ico"),
        "Content-Type: image/vnd.microsoft.icon\r\n"
    );
}

#[test]
fn mime_falls_back_to_application_text() {
    assert_eq!(mime::content_type_line("/noext"), mime::DEFAULT_CONTENT_TYPE);
    assert_eq!(
        mime::content_type_line("/archive.tar.zst"),
        mime::DEFAULT_CONTENT_TYPE,
        "only the final extension is considered"
    );
    assert_eq!(mime::content_type_line("/odd."), mime::DEFAULT_CONTENT_TYPE);
}
