//! NDJSON line framing
//!
//! `LinesCodec` 위에 얹은 디코더. 너무 긴 줄이나 UTF-8이 아닌 줄은
//! 스트림을 끊지 않고 `Frame::Skipped`로 보고됩니다.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, LinesCodec, LinesCodecError};

/// 한 줄 최대 길이 (16 MiB)
pub const MAX_LINE_LENGTH: usize = 16 * 1024 * 1024;

/// 디코딩 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// 완성된 비어있지 않은 줄 (`\r` 제거됨)
    Line(String),
    /// 버려진 입력과 그 이유
    Skipped(String),
}

/// stdout 바이트 → NDJSON 줄
///
/// 빈 줄은 건너뜁니다. 끝나지 않은 마지막 조각은 EOF에서 `Skipped`가 됩니다.
#[derive(Debug)]
pub struct NdjsonCodec {
    lines: LinesCodec,
    max_length: usize,
}

impl NdjsonCodec {
    pub fn new() -> Self {
        Self::with_max_length(MAX_LINE_LENGTH)
    }

    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            lines: LinesCodec::new_with_max_length(max_length),
            max_length,
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

impl Default for NdjsonCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for NdjsonCodec {
    type Item = Frame;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, Self::Error> {
        loop {
            match self.lines.decode(src) {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => return Ok(Some(Frame::Line(line))),
                Ok(None) => return Ok(None),
                Err(LinesCodecError::MaxLineLengthExceeded) => {
                    return Ok(Some(Frame::Skipped(format!(
                        "line longer than {} bytes",
                        self.max_length
                    ))))
                }
                // 줄은 이미 소비됨 (UTF-8 아님)
                Err(LinesCodecError::Io(e)) => {
                    return Ok(Some(Frame::Skipped(format!("undecodable line: {}", e))))
                }
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, Self::Error> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        if src.is_empty() {
            return Ok(None);
        }
        let rest = src.split();
        Ok(Some(Frame::Skipped(format!(
            "unterminated output: {}",
            String::from_utf8_lossy(&rest)
        ))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use tokio_util::codec::FramedRead;

    fn line(s: &str) -> Frame {
        Frame::Line(s.to_string())
    }

    #[test]
    fn test_partial_lines_retained() {
        let mut codec = NdjsonCodec::new();
        let mut buf = BytesMut::from(&b"{\"id\":1,"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"\"result\":{}}\n{\"id\":2");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(line("{\"id\":1,\"result\":{}}")));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b",\"result\":{}}\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(line("{\"id\":2,\"result\":{}}")));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let mut codec = NdjsonCodec::new();
        let mut buf = BytesMut::from(&b"a\r\n\r\n   \nb\n"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(line("a")));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(line("b")));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_eof_reports_fragment() {
        let mut codec = NdjsonCodec::new();
        let mut buf = BytesMut::from(&b"x\ntrailing"[..]);
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), Some(line("x")));
        assert!(matches!(
            codec.decode_eof(&mut buf).unwrap(),
            Some(Frame::Skipped(reason)) if reason.contains("trailing")
        ));
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), None);
    }

    #[tokio::test]
    async fn test_stream_survives_oversized_and_invalid_lines() {
        let mut input = Vec::new();
        input.extend_from_slice(b"first\n");
        input.extend_from_slice(&[b'x'; 100]);
        input.extend_from_slice(b"\n");
        input.extend_from_slice(b"\xff\xfe\n");
        input.extend_from_slice(b"last\n");

        let frames: Vec<Frame> = FramedRead::new(&input[..], NdjsonCodec::with_max_length(32))
            .map(|f| f.unwrap())
            .collect()
            .await;

        let lines: Vec<&Frame> = frames.iter().filter(|f| matches!(f, Frame::Line(_))).collect();
        assert_eq!(lines, vec![&line("first"), &line("last")]);
        assert!(frames.iter().any(|f| matches!(f, Frame::Skipped(r) if r.contains("32 bytes"))));
        assert!(frames.iter().any(|f| matches!(f, Frame::Skipped(r) if r.contains("undecodable"))));
    }
}
