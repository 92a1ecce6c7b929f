use std::io::{self, BufRead, ErrorKind};

use crate::error::Result;

/// A character-addressable input with a single character of push back.
///
/// This is the only capability the tokenizer needs from its source: pull the
/// next character, test for exhaustion, and put back one character it looked
/// at but does not own (line terminators during end-of-line soaking).
pub trait CharStream {
    /// Returns the next character, or `None` once the stream is exhausted.
    fn next_char(&mut self) -> Result<Option<char>>;

    /// Returns `true` when no further characters can be read.
    fn is_eof(&mut self) -> Result<bool>;

    /// Pushes `ch` back so the next call to `next_char` returns it again.
    ///
    /// Only one character of push back is held; a second `unget` before the
    /// next read replaces the first.
    fn unget(&mut self, ch: char);
}

impl<S: CharStream + ?Sized> CharStream for &mut S {
    fn next_char(&mut self) -> Result<Option<char>> {
        (**self).next_char()
    }

    fn is_eof(&mut self) -> Result<bool> {
        (**self).is_eof()
    }

    fn unget(&mut self, ch: char) {
        (**self).unget(ch)
    }
}

/// A [`CharStream`] decoding UTF-8 one scalar value at a time from any
/// buffered reader.
///
/// # Examples
///
/// ```
/// use typed_csv::core::stream::{CharReader, CharStream};
///
/// let mut stream = CharReader::from_text("né\n");
/// assert_eq!(stream.next_char().unwrap(), Some('n'));
/// assert_eq!(stream.next_char().unwrap(), Some('é'));
/// stream.unget('é');
/// assert_eq!(stream.next_char().unwrap(), Some('é'));
/// assert_eq!(stream.next_char().unwrap(), Some('\n'));
/// assert!(stream.is_eof().unwrap());
/// ```
pub struct CharReader<R> {
    inner: R,
    pushed_back: Option<char>,
}

impl<R: BufRead> CharReader<R> {
    pub fn new(inner: R) -> Self {
        CharReader {
            inner,
            pushed_back: None,
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        loop {
            let buf = match self.inner.fill_buf() {
                Ok(buf) => buf,
                Err(error) if error.kind() == ErrorKind::Interrupted => continue,
                Err(error) => return Err(error),
            };
            let Some(&byte) = buf.first() else {
                return Ok(None);
            };
            self.inner.consume(1);
            return Ok(Some(byte));
        }
    }
}

impl<'a> CharReader<&'a [u8]> {
    /// Creates a stream over in-memory text.
    pub fn from_text(text: &'a str) -> Self {
        CharReader::new(text.as_bytes())
    }
}

impl<R: BufRead> CharStream for CharReader<R> {
    fn next_char(&mut self) -> Result<Option<char>> {
        if let Some(ch) = self.pushed_back.take() {
            return Ok(Some(ch));
        }

        let Some(first) = self.next_byte()? else {
            return Ok(None);
        };
        let width = utf8_width(first).ok_or_else(invalid_utf8)?;

        let mut buf = [first, 0, 0, 0];
        for slot in buf.iter_mut().take(width).skip(1) {
            *slot = self.next_byte()?.ok_or_else(invalid_utf8)?;
        }

        let decoded = std::str::from_utf8(&buf[..width])
            .map_err(|error| io::Error::new(ErrorKind::InvalidData, error))?;
        Ok(decoded.chars().next())
    }

    fn is_eof(&mut self) -> Result<bool> {
        if self.pushed_back.is_some() {
            return Ok(false);
        }
        loop {
            match self.inner.fill_buf() {
                Ok(buf) => return Ok(buf.is_empty()),
                Err(error) if error.kind() == ErrorKind::Interrupted => continue,
                Err(error) => return Err(error.into()),
            }
        }
    }

    fn unget(&mut self, ch: char) {
        self.pushed_back = Some(ch);
    }
}

fn utf8_width(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

fn invalid_utf8() -> io::Error {
    io::Error::new(ErrorKind::InvalidData, "stream did not contain valid UTF-8")
}
