// source.rs

use std::io::Read;

use bytes::{Bytes, BytesMut};

use crate::error::{Error, Result};
use crate::navigator::RequestKind;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Request {
    pub pid: i32,
    pub dev: u64,
    pub kind: RequestKind,
    pub payload: Bytes,
}

pub trait RequestSource {
    /// Blocks until the next request arrives. `Ok(None)` means no more will.
    fn next_request(&mut self) -> Result<Option<Request>>;
}

/// Reads newline-terminated requests of the form `<pid> <dev> <kind> [text]`.
///
/// The buffer starts at a single byte and doubles each time a whole request
/// doesn't fit yet.
pub struct LineSource<R> {
    reader: R,
    buf: BytesMut,
    eof: bool,
}

impl<R: Read> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, buf: BytesMut::with_capacity(1), eof: false }
    }

    fn take_line(&mut self) -> Option<BytesMut> {
        if let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            return Some(self.buf.split_to(pos + 1));
        }
        if self.eof && !self.buf.is_empty() {
            return Some(self.buf.split());
        }
        None
    }

    fn fill(&mut self) -> Result<()> {
        if self.buf.len() == self.buf.capacity() {
            let grow = self.buf.capacity().max(1);
            self.buf.reserve(grow);
            tracing::debug!(capacity = self.buf.capacity(), "grew request buffer");
        }
        let start = self.buf.len();
        self.buf.resize(self.buf.capacity(), 0);
        let read = loop {
            match self.reader.read(&mut self.buf[start..]) {
                Ok(n) => break Ok(n),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => break Err(e),
            }
        };
        match read {
            Ok(n) => {
                self.buf.truncate(start + n);
                if n == 0 {
                    self.eof = true;
                }
                Ok(())
            }
            Err(e) => {
                self.buf.truncate(start);
                Err(e.into())
            }
        }
    }
}

impl<R: Read> RequestSource for LineSource<R> {
    fn next_request(&mut self) -> Result<Option<Request>> {
        loop {
            if let Some(line) = self.take_line() {
                let line = match line.strip_suffix(b"\n") {
                    Some(rest) => rest.strip_suffix(b"\r").unwrap_or(rest),
                    None => &line[..],
                };
                if line.iter().all(u8::is_ascii_whitespace) {
                    tracing::debug!(len = line.len(), "skipping blank request line");
                    continue;
                }
                return parse_request(line).map(Some);
            }
            if self.eof {
                return Ok(None);
            }
            self.fill()?;
        }
    }
}

fn header_field<'a>(field: Option<&'a [u8]>, what: &str) -> Result<&'a str> {
    let field = field.ok_or_else(|| Error::MalformedRequest(format!("missing {}", what)))?;
    std::str::from_utf8(field).map_err(|_| {
        Error::MalformedRequest(format!("bad {} {:?}", what, String::from_utf8_lossy(field)))
    })
}

/// Parses one request line. Only the header has to be text; the payload is
/// kept byte for byte.
pub fn parse_request(line: &[u8]) -> Result<Request> {
    let mut fields = line.splitn(4, |&b| b == b' ');
    let pid = header_field(fields.next(), "pid")?;
    let pid = pid
        .parse::<i32>()
        .map_err(|_| Error::MalformedRequest(format!("bad pid {:?}", pid)))?;
    let dev = header_field(fields.next(), "device")?;
    let dev = dev
        .parse::<u64>()
        .map_err(|_| Error::MalformedRequest(format!("bad device {:?}", dev)))?;
    let kind = header_field(fields.next(), "request kind")?;
    let kind = match kind {
        "keep" => RequestKind::Record,
        "prev" => RequestKind::StepOlder,
        "next" => RequestKind::StepNewer,
        code => code
            .parse::<i32>()
            .map(RequestKind::from_code)
            .map_err(|_| Error::MalformedRequest(format!("bad request kind {:?}", code)))?,
    };
    let payload = Bytes::copy_from_slice(fields.next().unwrap_or_default());
    Ok(Request { pid, dev, kind, payload })
}
