use net::{ChunkBuffer, DecodeError};

const RECORD: &[u8] = r#"{"user":{"name":"初音"},"text":"hi"}"#.as_bytes();

#[test]
fn every_split_yields_the_record_once() {
    for split in 0..=RECORD.len() {
        let mut buffer = ChunkBuffer::new();
        let (head, tail) = RECORD.split_at(split);
        let mut records: Vec<_> = buffer.append(head).map(Result::unwrap).collect();
        records.extend(buffer.append(tail).map(Result::unwrap));
        assert_eq!(records.len(), 1, "split at {split}");
        assert_eq!(records[0].as_bytes(), RECORD, "split at {split}");
        assert!(buffer.is_empty());
    }
}

#[test]
fn byte_at_a_time() {
    let mut buffer = ChunkBuffer::new();
    let mut records = Vec::new();
    for byte in RECORD {
        records.extend(buffer.append(&[*byte]).map(Result::unwrap));
    }
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].as_bytes(), RECORD);
}

#[test]
fn empty_chunks_never_yield() {
    let mut buffer = ChunkBuffer::new();
    assert_eq!(buffer.append(b"").count(), 0);
    assert_eq!(buffer.append(b"{\"text\":").count(), 0);
    assert_eq!(buffer.append(b"").count(), 0);
    assert_eq!(buffer.pending_len(), 8);
}

#[test]
fn keep_alive_newlines_are_dropped() {
    let mut buffer = ChunkBuffer::new();
    assert_eq!(buffer.append(b"\r\n\r\n").count(), 0);
    assert!(buffer.is_empty());
}

#[test]
fn many_records_in_one_chunk() {
    let mut buffer = ChunkBuffer::new();
    let chunk = b"{\"a\":1}\r\n{\"a\":2}{\"a\":3}\r\n{\"a\":";
    let records: Vec<_> = buffer.append(chunk).map(Result::unwrap).collect();
    let spans: Vec<&[u8]> = records.iter().map(|r| r.as_bytes()).collect();
    assert_eq!(spans, vec![&b"{\"a\":1}"[..], b"{\"a\":2}", b"{\"a\":3}"]);
    assert_eq!(buffer.pending_len(), 5);
}

#[test]
fn unread_records_are_kept() {
    let mut buffer = ChunkBuffer::new();
    let first = buffer.append(b"[1][2]").next().unwrap().unwrap();
    assert_eq!(first.as_bytes(), b"[1]");
    let rest: Vec<_> = buffer.records().map(Result::unwrap).collect();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].as_bytes(), b"[2]");
}

#[test]
fn trailing_number_waits_for_delimiter() {
    let mut buffer = ChunkBuffer::new();
    assert_eq!(buffer.append(b"12").count(), 0);
    let records: Vec<_> = buffer.append(b"3\n").map(Result::unwrap).collect();
    assert_eq!(records[0].as_bytes(), b"123");
}

#[test]
fn malformed_line_is_reported_and_skipped() {
    let mut buffer = ChunkBuffer::new();
    let results: Vec<_> = buffer.append(b"not json\r\n{\"text\":\"ok\"}").collect();
    assert_eq!(results.len(), 3);
    assert!(matches!(results[0], Err(DecodeError::MalformedSyntax(_))));
    assert!(matches!(results[1], Err(DecodeError::MalformedSyntax(_))));
    assert_eq!(results[2].as_ref().unwrap().as_bytes(), b"{\"text\":\"ok\"}");
    assert!(buffer.is_empty());
}

#[test]
fn garbage_glued_to_a_record_is_reported_at_once() {
    let mut buffer = ChunkBuffer::new();
    let results: Vec<_> = buffer
        .append(br#"not json{"user":{"name":"A"},"text":"hi"}"#)
        .collect();
    assert!(results[..results.len() - 1]
        .iter()
        .all(|r| matches!(r, Err(DecodeError::MalformedSyntax(_)))));
    assert_eq!(
        results.last().unwrap().as_ref().unwrap().as_bytes(),
        br#"{"user":{"name":"A"},"text":"hi"}"#
    );

    let next: Vec<_> = buffer.append(b"{\"text\":\"again\"}").map(Result::unwrap).collect();
    assert_eq!(next.len(), 1);
    assert!(buffer.is_empty());
}

#[test]
fn garbage_without_delimiter_is_not_held() {
    let mut buffer = ChunkBuffer::new();
    let results: Vec<_> = buffer.append(b"oops").collect();
    assert!(matches!(results[..], [Err(DecodeError::MalformedSyntax(_))]));
    assert!(buffer.is_empty());
}

#[test]
fn split_literal_waits_for_delimiter() {
    let mut buffer = ChunkBuffer::new();
    assert_eq!(buffer.append(b"nul").count(), 0);
    let results: Vec<_> = buffer.append(b"l\n[true]").map(Result::unwrap).collect();
    let spans: Vec<&[u8]> = results.iter().map(|r| r.as_bytes()).collect();
    assert_eq!(spans, vec![&b"null"[..], b"[true]"]);
}

#[test]
fn multi_line_record_survives_every_split() {
    let record: &[u8] = b"{\"user\":{\"name\":\"A\"},\n\"n\":-1.5e3,\"text\":\"hi\"}";
    for split in 0..=record.len() {
        let mut buffer = ChunkBuffer::new();
        let (head, tail) = record.split_at(split);
        let mut results: Vec<_> = buffer.append(head).collect();
        results.extend(buffer.append(tail));
        assert_eq!(results.len(), 1, "split at {split}");
        assert_eq!(results[0].as_ref().unwrap().as_bytes(), record, "split at {split}");
    }
}

#[test]
fn padded_record_keeps_inner_whitespace() {
    let record: &[u8] = b"{ \"user\" : { \"name\" : \"A\" } ,\r\n  \"text\" : \"a \\\" }\" }";
    let mut buffer = ChunkBuffer::new();
    let mut records = Vec::new();
    for byte in b"\r\n" {
        records.extend(buffer.append(&[*byte]).map(Result::unwrap));
    }
    for byte in record {
        records.extend(buffer.append(&[*byte]).map(Result::unwrap));
    }
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].as_bytes(), record);
}

#[test]
fn top_level_number_survives_every_split() {
    let stream: &[u8] = b"-1.5e3\n";
    for split in 0..=stream.len() {
        let mut buffer = ChunkBuffer::new();
        let (head, tail) = stream.split_at(split);
        let mut results: Vec<_> = buffer.append(head).collect();
        results.extend(buffer.append(tail));
        assert_eq!(results.len(), 1, "split at {split}");
        assert_eq!(results[0].as_ref().unwrap().as_bytes(), b"-1.5e3");
    }
}

#[test]
fn control_byte_in_string_resyncs() {
    let mut buffer = ChunkBuffer::new();
    let results: Vec<_> = buffer
        .append(b"{\"text\":\"cut\n{\"text\":\"ok\"}")
        .collect();
    assert_eq!(results.len(), 2);
    assert!(matches!(results[0], Err(DecodeError::MalformedSyntax(_))));
    assert_eq!(results[1].as_ref().unwrap().as_bytes(), b"{\"text\":\"ok\"}");
}

#[test]
fn balanced_but_invalid_record_is_dropped_alone() {
    let mut buffer = ChunkBuffer::new();
    let results: Vec<_> = buffer.append(b"{\"a\":1,,}{\"a\":2}").collect();
    assert!(matches!(results[0], Err(DecodeError::MalformedSyntax(_))));
    assert_eq!(results[1].as_ref().unwrap().as_bytes(), b"{\"a\":2}");
}

#[test]
fn steady_garbage_overflows() {
    let mut buffer = ChunkBuffer::with_max_pending(16);
    let first: Vec<_> = buffer.append(b"<html> ").collect();
    assert!(matches!(first[..], [Err(DecodeError::MalformedSyntax(_))]));
    let second: Vec<_> = buffer.append(b"<body>service ").collect();
    assert!(matches!(second[..], [Err(DecodeError::Overflow { limit: 16 })]));
}

#[test]
fn garbage_without_boundary_overflows() {
    let mut buffer = ChunkBuffer::with_max_pending(8);
    let results: Vec<_> = buffer.append(b"xxxxxxxxxxxx").collect();
    assert_eq!(results.len(), 1);
    match &results[0] {
        Err(err @ DecodeError::Overflow { limit: 8 }) => assert!(err.is_fatal()),
        other => panic!("unexpected {other:?}"),
    }
    assert!(buffer.is_empty());
}

#[test]
fn oversized_partial_record_overflows() {
    let mut buffer = ChunkBuffer::with_max_pending(16);
    assert_eq!(buffer.append(b"{\"text\":\"aaaa").count(), 0);
    let results: Vec<_> = buffer.append(b"aaaaaaaaaa").collect();
    assert!(matches!(results[..], [Err(DecodeError::Overflow { limit: 16 })]));
}

#[test]
fn large_record_in_tiny_chunks() {
    let text = "ミク".repeat(64 * 1024);
    let record = format!(r#"{{"user":{{"name":"A"}},"text":"{text}"}}"#).into_bytes();
    let mut buffer = ChunkBuffer::new();
    let mut records = Vec::new();
    for chunk in record.chunks(7) {
        records.extend(buffer.append(chunk).map(Result::unwrap));
    }
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].as_bytes(), &record[..]);
}
