//! Client-side incremental parser for the NDJSON progress stream.
//!
//! The transport delivers arbitrary byte chunks; [`EventParser`]
//! accumulates them, emits every complete line as a decoded event, and
//! holds back the trailing fragment until a later chunk completes it.

use crate::protocol::ProgressEvent;

/// Accumulating line parser. One instance per stream.
#[derive(Debug, Default)]
pub struct EventParser {
    buf: Vec<u8>,
}

impl EventParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw chunk and return every event completed by it.
    ///
    /// Lines that fail to decode are logged and skipped; the read loop
    /// must keep going. The buffer is kept as raw bytes so a UTF-8
    /// sequence split across chunks reassembles correctly.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<ProgressEvent> {
        self.buf.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = &line[..line.len() - 1]; // strip the newline
            if line.is_empty() {
                continue;
            }
            match serde_json::from_slice::<ProgressEvent>(line) {
                Ok(event) => events.push(event),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        raw_line = %String::from_utf8_lossy(line),
                        "Skipping malformed progress line",
                    );
                }
            }
        }
        events
    }

    /// End of stream. Any residual partial line cannot be a complete,
    /// newline-terminated record and is discarded.
    pub fn finish(self) -> usize {
        if !self.buf.is_empty() {
            tracing::debug!(
                discarded_bytes = self.buf.len(),
                "Discarding partial line at end of stream",
            );
        }
        self.buf.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::encode_line;

    fn sample_lines() -> Vec<u8> {
        let events = [
            ProgressEvent::progress("upload", "stored source", 10),
            ProgressEvent::progress("extract", "6 frames", 40),
            ProgressEvent::frame_processed(1, 6),
            ProgressEvent::frame_processed(2, 6),
            ProgressEvent::error("classifier unreachable"),
        ];
        events
            .iter()
            .flat_map(|e| encode_line(e).unwrap().into_bytes())
            .collect()
    }

    fn tags(events: &[ProgressEvent]) -> Vec<&'static str> {
        events
            .iter()
            .map(|e| match e {
                ProgressEvent::Progress { .. } => "progress",
                ProgressEvent::FrameProcessed { .. } => "frameProcessed",
                ProgressEvent::Complete { .. } => "complete",
                ProgressEvent::Error { .. } => "error",
            })
            .collect()
    }

    #[test]
    fn whole_stream_in_one_chunk() {
        let mut parser = EventParser::new();
        let events = parser.push(&sample_lines());
        assert_eq!(
            tags(&events),
            vec!["progress", "progress", "frameProcessed", "frameProcessed", "error"]
        );
        assert_eq!(parser.finish(), 0);
    }

    #[test]
    fn any_single_split_point_parses_identically() {
        let bytes = sample_lines();
        let mut expected = EventParser::new();
        let expected = tags(&expected.push(&bytes));

        // Split the stream at every possible byte boundary and check the
        // reassembled event sequence is identical.
        for split in 0..=bytes.len() {
            let mut parser = EventParser::new();
            let mut events = parser.push(&bytes[..split]);
            events.extend(parser.push(&bytes[split..]));
            assert_eq!(tags(&events), expected, "diverged at split {split}");
            assert_eq!(parser.finish(), 0);
        }
    }

    #[test]
    fn byte_at_a_time_parses_identically() {
        let bytes = sample_lines();
        let mut parser = EventParser::new();
        let mut events = Vec::new();
        for b in &bytes {
            events.extend(parser.push(std::slice::from_ref(b)));
        }
        assert_eq!(events.len(), 5);
        assert_eq!(parser.finish(), 0);
    }

    #[test]
    fn trailing_fragment_is_held_back() {
        let mut parser = EventParser::new();
        let events = parser.push(b"{\"type\":\"progress\",\"step\":\"upload\"");
        assert!(events.is_empty());

        let events = parser.push(b",\"message\":\"m\",\"percent\":10}\n");
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn malformed_line_is_skipped_without_aborting() {
        let mut parser = EventParser::new();
        let mut stream = Vec::new();
        stream.extend_from_slice(b"this is not json\n");
        stream.extend_from_slice(
            encode_line(&ProgressEvent::frame_processed(1, 2))
                .unwrap()
                .as_bytes(),
        );
        let events = parser.push(&stream);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ProgressEvent::FrameProcessed { .. }));
    }

    #[test]
    fn residual_partial_line_is_discarded_at_end() {
        let mut parser = EventParser::new();
        let events = parser.push(b"{\"type\":\"error\",\"mess");
        assert!(events.is_empty());
        assert!(parser.finish() > 0);
    }

    #[test]
    fn empty_lines_are_ignored() {
        let mut parser = EventParser::new();
        let events = parser.push(b"\n\n");
        assert!(events.is_empty());
        assert_eq!(parser.finish(), 0);
    }

    #[test]
    fn multibyte_utf8_split_across_chunks() {
        let event = ProgressEvent::error("café ☕ fermé");
        let bytes = encode_line(&event).unwrap().into_bytes();

        // Split inside the multi-byte sequence.
        let mid = bytes
            .iter()
            .position(|&b| b >= 0x80)
            .expect("event should contain multi-byte UTF-8")
            + 1;
        let mut parser = EventParser::new();
        let mut events = parser.push(&bytes[..mid]);
        events.extend(parser.push(&bytes[mid..]));

        assert_eq!(events.len(), 1);
        match &events[0] {
            ProgressEvent::Error { message } => assert_eq!(message, "café ☕ fermé"),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
