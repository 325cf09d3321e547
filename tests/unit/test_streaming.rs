//! Unit tests for the streaming consumer
//!
//! Tests cover:
//! - Chunk decoding across split UTF-8 sequences
//! - Line splitting and reinsertion
//! - Frame classification and payload parsing
//! - Session behaviour: ordering, sentinel, keepalives, flush, retries

use teachassist::streaming::{
    classify, consume, try_parse, CancelToken, ChunkDecoder, Frame, LineSplitter, StreamSession,
    StreamState, TryParse,
};

fn frame(content: &str) -> String {
    format!(
        "data: {}\n",
        serde_json::json!({"choices": [{"delta": {"content": content}}]})
    )
}

fn run_chunks(chunks: &[&[u8]]) -> (String, Vec<String>) {
    let mut progress = Vec::new();
    let mut session = StreamSession::new(|t: &str| progress.push(t.to_string()));
    for chunk in chunks {
        session.feed(chunk);
    }
    let done = session.finish();
    (done.text, progress)
}

fn run_whole(body: &str) -> String {
    run_chunks(&[body.as_bytes()]).0
}

// ============================================================================
// Decoder Tests
// ============================================================================

mod decoder_tests {
    use super::*;

    #[test]
    fn test_ascii_passthrough() {
        let mut d = ChunkDecoder::new();
        assert_eq!(d.decode(b"data: x\n"), "data: x\n");
        assert_eq!(d.pending_len(), 0);
    }

    #[test]
    fn test_multibyte_split_held_back() {
        // "é" is C3 A9
        let mut d = ChunkDecoder::new();
        assert_eq!(d.decode(b"caf\xC3"), "caf");
        assert_eq!(d.pending_len(), 1);
        assert_eq!(d.decode(b"\xA9!"), "é!");
        assert_eq!(d.pending_len(), 0);
    }

    #[test]
    fn test_four_byte_split_three_ways() {
        let bytes = "🍎".as_bytes();
        let mut d = ChunkDecoder::new();
        assert_eq!(d.decode(&bytes[..1]), "");
        assert_eq!(d.decode(&bytes[1..3]), "");
        assert_eq!(d.decode(&bytes[3..]), "🍎");
    }

    #[test]
    fn test_invalid_bytes_replaced() {
        let mut d = ChunkDecoder::new();
        assert_eq!(d.decode(b"a\xFFb"), "a\u{FFFD}b");
    }

    #[test]
    fn test_finish_flushes_truncated_sequence() {
        let mut d = ChunkDecoder::new();
        d.decode(b"x\xE2\x82");
        assert_eq!(d.finish(), "\u{FFFD}");
        assert_eq!(d.finish(), "");
    }
}

// ============================================================================
// Splitter Tests
// ============================================================================

mod splitter_tests {
    use super::*;

    #[test]
    fn test_partial_line_stays_buffered() {
        let mut s = LineSplitter::new();
        s.push("data: a\ndata: b");
        assert_eq!(s.next_line().as_deref(), Some("data: a"));
        assert_eq!(s.next_line(), None);
        s.push("c\n");
        assert_eq!(s.next_line().as_deref(), Some("data: bc"));
        assert!(s.is_empty());
    }

    #[test]
    fn test_crlf_terminator() {
        let mut s = LineSplitter::new();
        s.push("data: a\r\n");
        assert_eq!(s.next_line().as_deref(), Some("data: a"));
    }

    #[test]
    fn test_push_front_restores_order() {
        let mut s = LineSplitter::new();
        s.push("second\n");
        s.push_front("first");
        assert_eq!(s.next_line().as_deref(), Some("first"));
        assert_eq!(s.next_line().as_deref(), Some("second"));
    }

    #[test]
    fn test_take_remaining_splits_and_drops_blank() {
        let mut s = LineSplitter::new();
        s.push("one\n\ntwo\r\nthree");
        assert_eq!(s.take_remaining(), vec!["one", "two", "three"]);
        assert!(s.is_empty());
        assert!(s.take_remaining().is_empty());
    }
}

// ============================================================================
// Parser Tests
// ============================================================================

mod parser_tests {
    use super::*;

    #[test]
    fn test_classify_kinds() {
        assert_eq!(classify(""), Frame::Skip);
        assert_eq!(classify("   "), Frame::Skip);
        assert_eq!(classify(": keepalive"), Frame::Skip);
        assert_eq!(classify("event: message"), Frame::Skip);
        assert_eq!(classify("data: [DONE]"), Frame::Done);
        assert_eq!(classify("data: {\"a\":1}"), Frame::Data("{\"a\":1}"));
        assert_eq!(classify("data:{}"), Frame::Data("{}"));
    }

    #[test]
    fn test_try_parse_delta() {
        match try_parse(r#"{"choices":[{"delta":{"content":"Hi"}}]}"#) {
            TryParse::Parsed(p) => assert_eq!(p.delta(), Some("Hi")),
            TryParse::Incomplete(e) => panic!("unexpected: {}", e),
        }
    }

    #[test]
    fn test_try_parse_without_content() {
        match try_parse(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#) {
            TryParse::Parsed(p) => assert_eq!(p.delta(), None),
            TryParse::Incomplete(e) => panic!("unexpected: {}", e),
        }
    }

    #[test]
    fn test_try_parse_finish_reason() {
        match try_parse(r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#) {
            TryParse::Parsed(p) => assert_eq!(p.finish_reason(), Some("stop")),
            TryParse::Incomplete(e) => panic!("unexpected: {}", e),
        }
    }

    #[test]
    fn test_try_parse_truncated() {
        assert!(matches!(
            try_parse(r#"{"choices":[{"delta":{"con"#),
            TryParse::Incomplete(_)
        ));
    }
}

// ============================================================================
// Session Tests
// ============================================================================

mod session_tests {
    use super::*;

    #[test]
    fn test_hello_in_three_chunks() {
        let a: &[u8] = br#"data: {"choices":[{"delta":{"content":"Hel"}}]}
"#;
        let b: &[u8] = br#"data: {"choices":[{"delta":{"content":"lo"}}]}
data: [DONE]
"#;
        let (text, progress) = run_chunks(&[a, b, b""]);
        assert_eq!(text, "Hello");
        assert_eq!(progress, vec!["Hel", "Hello"]);
    }

    #[test]
    fn test_truncated_payload_appended_once() {
        let a: &[u8] = br#"data: {"choices":[{"delta":{"con"#;
        let b: &[u8] = b"tent\":\"tinue\"}}]}\n";
        let (text, progress) = run_chunks(&[a, b]);
        assert_eq!(text, "tinue");
        assert_eq!(progress, vec!["tinue"]);
    }

    #[test]
    fn test_split_every_byte_matches_whole() {
        let body = format!(
            "{}: ping\n\n{}{}data: [DONE]\n",
            frame("Photo"),
            frame("synthesis "),
            frame("uses ☀️ light")
        );
        let whole = run_whole(&body);
        let bytes = body.as_bytes();
        let singles: Vec<&[u8]> = bytes.chunks(1).collect();
        let (split, _) = run_chunks(&singles);
        assert_eq!(split, whole);
        assert_eq!(whole, "Photosynthesis uses ☀️ light");
    }

    #[test]
    fn test_trailing_frames_after_sentinel_ignored() {
        let body = format!("{}data: [DONE]\n{}{}", frame("kept"), frame("late"), frame("later"));
        let mut session = StreamSession::new(|_: &str| {});
        session.feed(body.as_bytes());
        let done = session.finish();
        assert_eq!(done.text, "kept");
        assert!(done.stats.sentinel_seen);
    }

    #[test]
    fn test_sentinel_in_unterminated_tail() {
        let body = format!("{}data: [DONE]\n{}", frame("a"), frame("b").trim_end());
        assert_eq!(run_whole(&body), "a");
    }

    #[test]
    fn test_keepalives_never_parsed() {
        let body = format!(": keepalive\n   \n:\n{}", frame("x"));
        let mut session = StreamSession::new(|_: &str| {});
        session.feed(body.as_bytes());
        assert_eq!(session.stats().reinsertions, 0);
        assert_eq!(session.finish().text, "x");
    }

    #[test]
    fn test_empty_data_line_does_not_block() {
        let body = format!("data:\n{}", frame("x"));
        let mut session = StreamSession::new(|_: &str| {});
        session.feed(body.as_bytes());
        assert_eq!(session.text(), "x");
        assert_eq!(session.stats().reinsertions, 0);

        let done = session.finish();
        assert_eq!(done.stats.deltas, 1);
        assert_eq!(done.stats.dropped_frames, 0);
    }

    #[test]
    fn test_comment_that_looks_like_json_ignored() {
        let body = r#": {"choices":[{"delta":{"content":"no"}}]}
"#;
        assert_eq!(run_whole(body), "");
    }

    #[test]
    fn test_empty_delta_not_published() {
        let body = format!("{}{}", frame(""), frame("a"));
        let (text, progress) = run_chunks(&[body.as_bytes()]);
        assert_eq!(text, "a");
        assert_eq!(progress, vec!["a"]);
    }

    #[test]
    fn test_progress_is_growing_prefix() {
        let body = format!("{}{}{}", frame("one "), frame("two "), frame("three"));
        let (text, progress) = run_chunks(&[body.as_bytes()]);
        for pair in progress.windows(2) {
            assert!(pair[1].starts_with(&pair[0]));
        }
        assert_eq!(progress.last(), Some(&text));
    }

    #[test]
    fn test_flush_on_empty_buffer_is_noop() {
        let mut session = StreamSession::new(|_: &str| {});
        session.feed(frame("a").as_bytes());
        session.flush();
        let before = session.text().to_string();
        session.flush();
        assert_eq!(session.text(), before);
        assert_eq!(session.state(), StreamState::Done);
    }

    #[test]
    fn test_multibyte_split_inside_payload() {
        let body = frame("नमस्ते");
        let bytes = body.as_bytes();
        // Split inside the first Devanagari character's encoding.
        let cut = body.find('न').unwrap() + 1;
        let (text, _) = run_chunks(&[&bytes[..cut], &bytes[cut..]]);
        assert_eq!(text, "नमस्ते");
    }

    #[test]
    fn test_malformed_frame_dropped_at_end() {
        let body = format!("{}data: {{not json\n", frame("ok"));
        let mut session = StreamSession::new(|_: &str| {});
        session.feed(body.as_bytes());
        let done = session.finish();
        assert_eq!(done.text, "ok");
        assert_eq!(done.stats.dropped_frames, 1);
    }

    #[test]
    fn test_independent_sessions() {
        let mut a = StreamSession::new(|_: &str| {});
        let mut b = StreamSession::new(|_: &str| {});
        a.feed(br#"data: {"choices":[{"delta":{"content":"A"#);
        b.feed(frame("B").as_bytes());
        a.feed(b"\"}}]}\n");
        assert_eq!(a.finish().text, "A");
        assert_eq!(b.finish().text, "B");
    }
}

// ============================================================================
// Consume Tests
// ============================================================================

mod consume_tests {
    use super::*;

    #[tokio::test]
    async fn test_consume_reports_stats() {
        let chunks: Vec<Result<Vec<u8>, String>> = vec![
            Ok(br#"data: {"choices":[{"delta":{"content":"Hel"#.to_vec()),
            Ok(b"\"}}]}\n".to_vec()),
            Ok(format!("{}data: [DONE]\n", frame("lo")).into_bytes()),
        ];
        let done = consume(futures::stream::iter(chunks), &CancelToken::new(), |_: &str| {})
            .await
            .unwrap();
        assert_eq!(done.text, "Hello");
        assert_eq!(done.stats.chunks, 3);
        assert_eq!(done.stats.deltas, 2);
        // The cut line was never terminated, so it waited in the buffer
        assert_eq!(done.stats.reinsertions, 0);
        assert!(done.stats.sentinel_seen);
    }

    #[tokio::test]
    async fn test_consume_cancel_while_waiting() {
        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        let stream = futures::stream::pending::<Result<Vec<u8>, String>>();
        let handle = tokio::spawn(async move { consume(stream, &cancel, |_: &str| {}).await });
        tokio::task::yield_now().await;
        trigger.cancel();
        let result = handle.await.unwrap();
        assert!(matches!(
            result,
            Err(teachassist::errors::StreamError::Cancelled)
        ));
    }
}
