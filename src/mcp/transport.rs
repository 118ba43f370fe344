//! Newline-delimited message transport.
//!
//! MCP's stdio transport carries one UTF-8 JSON-RPC message per line: input
//! on stdin, output on stdout. Logs go to stderr and never share a stream
//! with protocol traffic.
//!
//! [`LineTransport`] works over any async reader and writer so the framing
//! can be exercised in tests; [`StdioTransport`] binds it to the process's
//! standard streams.

use std::io;
use std::string::FromUtf8Error;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Line framing over an async reader and writer.
pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
}

/// The transport used by the server binary.
pub type StdioTransport = LineTransport<BufReader<tokio::io::Stdin>, tokio::io::Stdout>;

impl StdioTransport {
    /// Binds the transport to stdin and stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Wraps a reader and writer.
    pub const fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Reads the next line without its terminator.
    ///
    /// Returns `None` at end of input. A line that is not valid UTF-8 is
    /// returned as an inner error so the caller can reject it and keep
    /// reading.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails.
    pub async fn read_line(&mut self) -> io::Result<Option<Result<String, FromUtf8Error>>> {
        let mut line = Vec::new();
        if self.reader.read_until(b'\n', &mut line).await? == 0 {
            return Ok(None);
        }
        strip_line_ending(&mut line);
        Ok(Some(String::from_utf8(line)))
    }

    /// Writes `message` followed by a newline and flushes.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub async fn write_line(&mut self, message: &str) -> io::Result<()> {
        debug_assert!(
            !message.contains('\n'),
            "messages must not contain embedded newlines"
        );

        self.writer.write_all(message.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await
    }

    /// Releases the writer, e.g. to inspect what was written.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn strip_line_ending(line: &mut Vec<u8>) {
    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stripped(bytes: &[u8]) -> Vec<u8> {
        let mut line = bytes.to_vec();
        strip_line_ending(&mut line);
        line
    }

    async fn next_text<R, W>(transport: &mut LineTransport<R, W>) -> Option<String>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        transport
            .read_line()
            .await
            .unwrap()
            .map(|line| line.expect("line is not UTF-8"))
    }

    #[test]
    fn strips_lf_and_crlf() {
        assert_eq!(stripped(b"{}\n"), b"{}");
        assert_eq!(stripped(b"{}\r\n"), b"{}");
        assert_eq!(stripped(b"{}"), b"{}");
        assert_eq!(stripped(b"{}\r"), b"{}\r");
    }

    #[tokio::test]
    async fn reads_lines_until_eof() {
        let input: &[u8] = b"first\r\nsecond\nlast";
        let mut transport = LineTransport::new(input, Vec::new());

        assert_eq!(next_text(&mut transport).await.as_deref(), Some("first"));
        assert_eq!(next_text(&mut transport).await.as_deref(), Some("second"));
        assert_eq!(next_text(&mut transport).await.as_deref(), Some("last"));
        assert_eq!(next_text(&mut transport).await, None);
    }

    #[tokio::test]
    async fn invalid_utf8_line_does_not_end_input() {
        let input: &[u8] = b"\xff\xfe junk\nnext\n";
        let mut transport = LineTransport::new(input, Vec::new());

        let first = transport.read_line().await.unwrap().unwrap();
        assert!(first.is_err());
        assert_eq!(next_text(&mut transport).await.as_deref(), Some("next"));
        assert_eq!(next_text(&mut transport).await, None);
    }

    #[tokio::test]
    async fn writes_newline_terminated_messages() {
        let mut transport = LineTransport::new(&b""[..], Vec::new());
        transport.write_line(r#"{"a":1}"#).await.unwrap();
        transport.write_line(r#"{"b":2}"#).await.unwrap();

        assert_eq!(transport.into_writer(), b"{\"a\":1}\n{\"b\":2}\n");
    }
}
