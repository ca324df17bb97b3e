//! Response serialization as a fixed sequence of byte slices handed to one
//! vectored socket write. The head's variable parts are formatted into
//! fixed-capacity scratch buffers; everything else is borrowed from static
//! tables or the mapped file, so serialization never heap-allocates.

use crate::{reason_phrase, ResponseHead};
use arrayvec::ArrayString;
use core::fmt::Write as _;
use std::io::IoSlice;

pub const SERVER_LINE: &str = "Server: FastBeast\r\n";
const KEEP_ALIVE_LINE: &str = "Connection: keep-alive\r\n";
const CLOSE_LINE: &str = "Connection: close\r\n";
const CONTENT_LENGTH_PREFIX: &str = "Content-Length: ";
const HEAD_TERMINATOR: &str = "\r\n\r\n";

/// Formatted head: owns the status line and content-length digits, borrows
/// the rest.
pub struct SerializedHead {
    status_line: ArrayString<64>,
    length_digits: ArrayString<20>,
    content_type: &'static str,
    connection: &'static str,
}

impl SerializedHead {
    pub fn format(head: &ResponseHead) -> Self {
        let mut status_line = ArrayString::new();
        // Capacity covers the longest reason phrase in the table.
        let _ = write!(
            status_line,
            "HTTP/1.{} {} {}\r\n",
            head.version.minor(),
            head.status,
            reason_phrase(head.status)
        );
        let mut length_digits = ArrayString::new();
        let _ = write!(length_digits, "{}", head.content_length);
        Self {
            status_line,
            length_digits,
            content_type: head.content_type,
            connection: if head.keep_alive {
                KEEP_ALIVE_LINE
            } else {
                CLOSE_LINE
            },
        }
    }

    pub fn status_line(&self) -> &str {
        &self.status_line
    }
}

/// The wire-format response as eight slices: status line, `Server`,
/// `Content-Type`, `Connection`, `Content-Length: `, digits, blank line,
/// body. `consume` advances past accepted bytes so a short write resumes
/// mid-slice.
pub struct GatherSerializer<'a> {
    parts: [&'a [u8]; 8],
    first: usize,
}

impl<'a> GatherSerializer<'a> {
    pub fn new(head: &'a SerializedHead, body: &'a [u8]) -> Self {
        Self {
            parts: [
                head.status_line.as_bytes(),
                SERVER_LINE.as_bytes(),
                head.content_type.as_bytes(),
                head.connection.as_bytes(),
                CONTENT_LENGTH_PREFIX.as_bytes(),
                head.length_digits.as_bytes(),
                HEAD_TERMINATOR.as_bytes(),
                body,
            ],
            first: 0,
        }
    }

    pub fn is_done(&self) -> bool {
        self.parts[self.first..].iter().all(|p| p.is_empty())
    }

    /// Bytes still to be written.
    pub fn remaining(&self) -> usize {
        self.parts[self.first..].iter().map(|p| p.len()).sum()
    }

    /// Gathers the unwritten slices into `out` for a vectored write.
    pub fn slices<'s>(&'s self, out: &'s mut [IoSlice<'a>; 8]) -> &'s [IoSlice<'a>] {
        let live = &self.parts[self.first..];
        for (slot, part) in out.iter_mut().zip(live) {
            *slot = IoSlice::new(part);
        }
        &out[..live.len()]
    }

    /// Drops `n` written bytes from the front of the sequence.
    pub fn consume(&mut self, mut n: usize) {
        while self.first < self.parts.len() {
            let part = self.parts[self.first];
            if n < part.len() {
                self.parts[self.first] = &part[n..];
                return;
            }
            n -= part.len();
            self.first += 1;
        }
        debug_assert_eq!(n, 0, "consumed past the end of the response");
    }
}
