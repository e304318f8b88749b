//! Input plumbing: encodings, delimiter resolution and the line source.
//!
//! All cursor input flows through [`LineSource`], which owns the underlying
//! reader, decodes it to UTF-8 via `encoding_rs_io` and hands out one physical
//! line at a time with the line terminator removed.
//!
//! - **Encoding**: labels resolved through `encoding_rs`, defaulting to UTF-8;
//!   byte-order marks are sniffed and stripped.
//! - **Delimiter**: an explicit delimiter wins, then the `.tsv` extension, then
//!   the list separator of the configured locale.
//! - **stdin/stdout**: the `-` path convention routes through standard streams.
//! - **Closing**: a [`CloseHandle`] lets the owner of the data close the
//!   source from outside the cursor; the next read then fails.

use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Read, Write},
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use encoding_rs::{Encoding, UTF_8};
use encoding_rs_io::DecodeReaderBytesBuilder;
use log::debug;

use crate::{
    error::{ImportError, ImportResult},
    locale::NumberLocale,
};

pub const TSV_DELIMITER: char = '\t';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> ImportResult<&'static Encoding> {
    match label {
        Some(value) => Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| ImportError::UnknownEncoding(value.to_string())),
        None => Ok(UTF_8),
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<char>, locale: &NumberLocale) -> char {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => TSV_DELIMITER,
        _ => locale.list_separator(),
    })
}

pub fn open_input(path: &Path) -> io::Result<Box<dyn Read>> {
    if is_dash(path) {
        Ok(Box::new(io::stdin().lock()))
    } else {
        Ok(Box::new(File::open(path)?))
    }
}

/// Buffered writer over `path`, or stdout when `path` is absent or `-`.
pub fn open_output(path: Option<&Path>) -> io::Result<Box<dyn Write>> {
    match path {
        Some(path) if !is_dash(path) => Ok(Box::new(BufWriter::new(File::create(path)?))),
        _ => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}

/// Shared flag that closes a [`LineSource`] from outside its owner.
#[derive(Debug, Clone, Default)]
pub struct CloseHandle {
    closed: Arc<AtomicBool>,
}

impl CloseHandle {
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

pub struct LineSource {
    reader: Option<Box<dyn BufRead>>,
    handle: CloseHandle,
    buffer: String,
    lines_read: usize,
}

impl LineSource {
    /// Wraps an already UTF-8 encoded buffered reader.
    pub fn from_buf_read<R>(reader: R) -> Self
    where
        R: BufRead + 'static,
    {
        Self {
            reader: Some(Box::new(reader)),
            handle: CloseHandle::default(),
            buffer: String::with_capacity(256),
            lines_read: 0,
        }
    }

    /// Wraps a byte reader, transcoding from `encoding` to UTF-8.
    pub fn decoding<R>(reader: R, encoding: &'static Encoding) -> Self
    where
        R: Read + 'static,
    {
        let decoder = DecodeReaderBytesBuilder::new()
            .encoding(Some(encoding))
            .strip_bom(true)
            .build(reader);
        Self::from_buf_read(BufReader::new(decoder))
    }

    pub fn open(path: &Path, encoding: &'static Encoding) -> io::Result<Self> {
        Ok(Self::decoding(open_input(path)?, encoding))
    }

    pub fn close_handle(&self) -> CloseHandle {
        self.handle.clone()
    }

    pub fn is_readable(&self) -> bool {
        self.reader.is_some() && !self.handle.is_closed()
    }

    /// Number of physical lines handed out so far.
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    /// Reads the next physical line without its terminator.
    ///
    /// Returns `Ok(None)` at end of input. The returned slice is valid until
    /// the next call.
    pub fn read_line(&mut self) -> ImportResult<Option<&str>> {
        if self.handle.is_closed() {
            self.reader = None;
        }
        let reader = self.reader.as_mut().ok_or(ImportError::ClosedStream)?;
        self.buffer.clear();
        if reader.read_line(&mut self.buffer)? == 0 {
            return Ok(None);
        }
        self.lines_read += 1;
        if self.buffer.ends_with('\n') {
            self.buffer.pop();
            if self.buffer.ends_with('\r') {
                self.buffer.pop();
            }
        }
        Ok(Some(self.buffer.as_str()))
    }

    /// Releases the underlying reader. Safe to call repeatedly.
    pub fn close(&mut self) {
        if self.reader.take().is_some() {
            debug!("Released line source after {} line(s)", self.lines_read);
        }
        self.handle.close();
    }
}
