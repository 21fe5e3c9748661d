//! Incremental SPARQL-JSON Decoding
//!
//! Finds the `results.bindings` array in a response body that arrives in
//! arbitrary chunks and yields each solution object as soon as its closing
//! brace has been received.
//!
//! ```text
//! {"head":{...},"results":{"bindings":[ {...}, {...}, ... ]},"metadata":{...}}
//!                                      ^ seek   ^ yield each complete object
//! ```
//!
//! Each row is scanned once: a partial row resumes where the previous chunk
//! left off, and bytes are dropped as soon as their row has been yielded.
//! Only the skeleton around the array (`head`, `boolean`, `metadata`) is kept
//! for [`BindingsDecoder::finish`].

use crate::TransportError;
use crate::messages::{Bindings, QueryMetadata};
use serde_json::Value;

const BINDINGS_KEY: &[u8] = b"\"bindings\"";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Looking for `"bindings": [`
    Seeking,
    /// Inside the bindings array, positioned before an element or separator
    InArray,
    /// The bindings array has been closed
    Done,
}

/// Progress through one solution object
#[derive(Debug, Clone, Copy)]
struct Scan {
    pos: usize,
    depth: usize,
    in_string: bool,
    escaped: bool,
}

impl Scan {
    fn at(pos: usize) -> Self {
        Self {
            pos,
            depth: 0,
            in_string: false,
            escaped: false,
        }
    }
}

/// Chunk-fed decoder for SPARQL-JSON result documents
#[derive(Debug)]
pub struct BindingsDecoder {
    buf: Vec<u8>,
    cursor: usize,
    state: State,
    scan: Option<Scan>,
    /// Body up to and including the `[` opening the bindings array
    head: Vec<u8>,
}

impl Default for BindingsDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingsDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            cursor: 0,
            state: State::Seeking,
            scan: None,
            head: Vec::new(),
        }
    }

    /// Feed the next chunk; returns every solution completed by it, in order
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<Bindings>, TransportError> {
        self.buf.extend_from_slice(chunk);
        let mut out = Vec::new();

        loop {
            match self.state {
                State::Seeking => {
                    if !self.seek_array() {
                        break;
                    }
                }
                State::InArray => {
                    if self.scan.is_none() {
                        let Some(pos) = self.skip_separators(self.cursor) else {
                            break;
                        };
                        match self.buf[pos] {
                            b']' => {
                                // The closing bracket starts the tail kept for `finish`
                                self.cursor = pos;
                                self.state = State::Done;
                                continue;
                            }
                            b'{' => {
                                self.cursor = pos;
                                self.scan = Some(Scan::at(pos));
                            }
                            other => {
                                return Err(TransportError::MalformedBody(format!(
                                    "unexpected byte '{}' in bindings array",
                                    other as char
                                )));
                            }
                        }
                    }
                    let Some(end) = self.advance_scan() else {
                        break;
                    };
                    let bindings: Bindings = serde_json::from_slice(&self.buf[self.cursor..end])
                        .map_err(|e| TransportError::MalformedBody(e.to_string()))?;
                    out.push(bindings);
                    self.cursor = end;
                    self.scan = None;
                }
                State::Done => break,
            }
        }

        self.compact();
        Ok(out)
    }

    /// Validate the response skeleton and extract its metadata object, if any.
    ///
    /// ASK responses (a `boolean` member, no bindings) are accepted.
    pub fn finish(self) -> Result<Option<QueryMetadata>, TransportError> {
        let Self {
            buf, state, head, ..
        } = self;
        let skeleton = match state {
            State::Seeking => buf,
            State::Done => {
                let mut skeleton = head;
                skeleton.extend_from_slice(&buf);
                skeleton
            }
            State::InArray => {
                return Err(TransportError::MalformedBody(
                    "response ended inside the bindings array".to_string(),
                ));
            }
        };

        let document: Value = serde_json::from_slice(&skeleton)
            .map_err(|e| TransportError::MalformedBody(e.to_string()))?;

        if state != State::Done && document.get("boolean").is_none() {
            return Err(TransportError::MalformedBody(
                "response has neither a bindings array nor a boolean".to_string(),
            ));
        }

        match document.get("metadata") {
            Some(Value::Object(map)) => Ok(Some(QueryMetadata(map.clone()))),
            _ => Ok(None),
        }
    }

    /// Advance past `"bindings" : [`. Returns false if more input is needed.
    fn seek_array(&mut self) -> bool {
        while let Some(offset) = find(&self.buf[self.cursor..], BINDINGS_KEY) {
            let key_end = self.cursor + offset + BINDINGS_KEY.len();
            let Some(colon) = skip_ws(&self.buf, key_end) else {
                self.cursor += offset;
                return false;
            };
            if self.buf[colon] != b':' {
                // The word appeared as a value (e.g. a variable name); keep looking
                self.cursor = key_end;
                continue;
            }
            let Some(open) = skip_ws(&self.buf, colon + 1) else {
                self.cursor += offset;
                return false;
            };
            if self.buf[open] != b'[' {
                self.cursor = key_end;
                continue;
            }
            self.head = self.buf[..=open].to_vec();
            self.cursor = open + 1;
            self.state = State::InArray;
            return true;
        }
        // Keep a tail that might hold a split key
        self.cursor = self.buf.len().saturating_sub(BINDINGS_KEY.len() - 1).max(self.cursor);
        false
    }

    /// Continue the current object scan; returns one past its closing brace
    fn advance_scan(&mut self) -> Option<usize> {
        let scan = self.scan.as_mut()?;
        while scan.pos < self.buf.len() {
            let b = self.buf[scan.pos];
            scan.pos += 1;
            if scan.in_string {
                if scan.escaped {
                    scan.escaped = false;
                } else if b == b'\\' {
                    scan.escaped = true;
                } else if b == b'"' {
                    scan.in_string = false;
                }
                continue;
            }
            match b {
                b'"' => scan.in_string = true,
                b'{' => scan.depth += 1,
                b'}' => {
                    scan.depth -= 1;
                    if scan.depth == 0 {
                        return Some(scan.pos);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Drop bytes already yielded; the skeleton before the array lives in `head`
    fn compact(&mut self) {
        if self.state == State::Seeking || self.cursor == 0 {
            return;
        }
        self.buf.drain(..self.cursor);
        if let Some(scan) = self.scan.as_mut() {
            scan.pos -= self.cursor;
        }
        self.cursor = 0;
    }

    fn skip_separators(&self, mut pos: usize) -> Option<usize> {
        while pos < self.buf.len() {
            match self.buf[pos] {
                b' ' | b'\n' | b'\r' | b'\t' | b',' => pos += 1,
                _ => return Some(pos),
            }
        }
        None
    }
}

fn skip_ws(buf: &[u8], mut pos: usize) -> Option<usize> {
    while pos < buf.len() {
        if !buf[pos].is_ascii_whitespace() {
            return Some(pos);
        }
        pos += 1;
    }
    None
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{"head":{"vars":["bindings","o"]},
        "results":{"bindings":[
            {"bindings":{"type":"literal","value":"a } tricky \" value"}},
            {"o":{"type":"uri","value":"http://ex.org/b"}}
        ]},
        "metadata":{"httpRequests":7}}"#;

    #[test]
    fn test_whole_body() {
        let mut decoder = BindingsDecoder::new();
        let rows = decoder.push(BODY.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["bindings"].value, "a } tricky \" value");
        assert_eq!(rows[1]["o"].value, "http://ex.org/b");

        let metadata = decoder.finish().unwrap().unwrap();
        assert_eq!(metadata.http_requests(), Some(7));
    }

    #[test]
    fn test_byte_by_byte_matches_whole_body() {
        let mut decoder = BindingsDecoder::new();
        let mut rows = Vec::new();
        for b in BODY.as_bytes() {
            rows.extend(decoder.push(std::slice::from_ref(b)).unwrap());
        }
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["o"].value, "http://ex.org/b");
        assert!(decoder.finish().unwrap().is_some());
    }

    #[test]
    fn test_rows_surface_before_body_completes() {
        let mut decoder = BindingsDecoder::new();
        let first = decoder
            .push(br#"{"head":{},"results":{"bindings":[{"s":{"type":"uri","value":"x"}},"#)
            .unwrap();
        assert_eq!(first.len(), 1);
        let second = decoder.push(br#"{"s":{"type":"uri","value":"y"}}]}}"#).unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(decoder.finish().unwrap(), None);
    }

    #[test]
    fn test_ask_response() {
        let mut decoder = BindingsDecoder::new();
        let rows = decoder.push(br#"{"head":{},"boolean":true}"#).unwrap();
        assert!(rows.is_empty());
        assert_eq!(decoder.finish().unwrap(), None);
    }

    #[test]
    fn test_truncated_body_fails() {
        let mut decoder = BindingsDecoder::new();
        let rows = decoder
            .push(br#"{"head":{},"results":{"bindings":[{"s":{"type":"uri","value":"x"}}"#)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert!(matches!(
            decoder.finish(),
            Err(TransportError::MalformedBody(_))
        ));
    }

    #[test]
    fn test_garbage_in_array() {
        let mut decoder = BindingsDecoder::new();
        let result = decoder.push(br#"{"results":{"bindings":[42]}}"#);
        assert!(matches!(result, Err(TransportError::MalformedBody(_))));
    }

    #[test]
    fn test_large_row_in_small_chunks() {
        let snapshot = "x".repeat(4 * 1024 * 1024);
        let body = format!(
            r#"{{"head":{{"vars":["s","_topology"]}},"results":{{"bindings":[{{"s":{{"type":"uri","value":"a"}},"_topology":{{"type":"literal","value":"{}"}}}},{{"s":{{"type":"uri","value":"b"}}}}]}},"metadata":{{"httpRequests":3}}}}"#,
            snapshot
        );

        let mut decoder = BindingsDecoder::new();
        let mut rows = Vec::new();
        for chunk in body.as_bytes().chunks(8 * 1024) {
            rows.extend(decoder.push(chunk).unwrap());
            // Nothing beyond the row in progress is held
            assert!(decoder.buf.len() <= 4 * 1024 * 1024 + 16 * 1024);
        }

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["_topology"].value.len(), snapshot.len());
        assert_eq!(rows[1]["s"].value, "b");
        assert!(decoder.buf.len() < 64);

        let metadata = decoder.finish().unwrap().unwrap();
        assert_eq!(metadata.http_requests(), Some(3));
    }

    #[test]
    fn test_metadata_before_results() {
        let mut decoder = BindingsDecoder::new();
        let rows = decoder
            .push(br#"{"metadata":{"httpRequests":2},"results":{"bindings":[{"s":{"type":"uri","value":"x"}}]}}"#)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(decoder.finish().unwrap().unwrap().http_requests(), Some(2));
    }
}
