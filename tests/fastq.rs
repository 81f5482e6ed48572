#[macro_use]
extern crate matches;
#[macro_use]
extern crate lazy_static;

#[macro_use]
mod common;

use common::{GUPPY_DESCS, GUPPY_FASTQ};
use plotrt::fastq::{Error, Reader};
use plotrt::policy::DoubleUntilLimited;
use plotrt::read;

const FASTQ: &[u8] = b"@id desc
ATGC
+
~~~~
@id2
ATGC
+
~~~~";

// try different initial capacities to exercise buffer growing
macro_rules! test_reader {
    ($fastq:expr, $reader:ident, $block:block) => {
        for cap in 3..80 {
            #[allow(unused_mut)]
            let mut $reader = Reader::with_capacity($fastq, cap);
            $block
        }
    };
}

#[test]
fn reader() {
    let expected = [(Ok("id"), &b"id desc"[..]), (Ok("id2"), &b"id2"[..])];
    for cap in 3..80 {
        let mut reader = Reader::with_capacity(FASTQ, cap);
        for (id, head) in &expected {
            let record = reader
                .next()
                .unwrap()
                .unwrap_or_else(|e| panic!("error at cap. {}: {}", cap, e));
            assert_eq!(record.id(), *id, "ID mismatch at cap. {}", cap);
            assert_eq!(record.head(), *head, "header mismatch at cap. {}", cap);
            assert_eq!(record.seq(), b"ATGC", "seq mismatch at cap. {}", cap);
            assert_eq!(record.qual(), b"~~~~", "qual mismatch at cap. {}", cap);
        }
        assert!(reader.next().is_none());
    }
}

#[test]
fn crlf() {
    let fq = &b"@id desc\r\nATGC\r\n+\r\n~~~~\r\n@id2\r\nAT\r\n+\r\n~~\r\n"[..];
    test_reader!(fq, reader, {
        let rec = reader.next().unwrap().unwrap();
        assert_eq!(rec.head(), b"id desc");
        assert_eq!(rec.qual(), b"~~~~");
        let rec = reader.next().unwrap().unwrap();
        assert_eq!(rec.head(), b"id2");
        assert_eq!(rec.seq(), b"AT");
        assert_eq!(rec.qual(), b"~~");
        assert!(reader.next().is_none());
    });
}

#[test]
fn id_ends_at_any_whitespace() {
    let fq = &b"@r0\tstart_time=2021-05-01T10:00:00Z\nA\n+\nI\n@r1  two spaces\nA\n+\nI\n"[..];
    test_reader!(fq, reader, {
        let rec = reader.next().unwrap().unwrap();
        assert_eq!(rec.id(), Ok("r0"));
        assert_eq!(rec.head(), b"r0\tstart_time=2021-05-01T10:00:00Z");
        assert_eq!(reader.next().unwrap().unwrap().id(), Ok("r1"));
        assert!(reader.next().is_none());
    });
}

#[test]
fn multiline() {
    let fq = &b"@id
SEQU
ENCE
+
II
@EI
III
@id2
AC
GT
+id2
IIII
"[..];
    test_reader!(fq, reader, {
        let rec = reader.next().unwrap().unwrap();
        assert_eq!(rec.id(), Ok("id"));
        assert_eq!(rec.seq(), b"SEQU\nENCE");
        assert_eq!(rec.qual(), b"II\n@EI\nIII");
        let rec = reader.next().unwrap().unwrap();
        assert_eq!(rec.id(), Ok("id2"));
        assert_eq!(rec.seq(), b"AC\nGT");
        assert_eq!(rec.qual(), b"IIII");
        assert!(reader.next().is_none());
    });
}

#[test]
fn multiline_line_numbers() {
    // the third record starts at line 11
    let fq = &b"@a\nAC\nGT\n+\nII\nII\n@b\nA\n+\nI\nb\nA\n+\nI\n"[..];
    test_reader!(fq, reader, {
        reader.next().unwrap().unwrap();
        reader.next().unwrap().unwrap();
        let err = reader.next().unwrap().err().expect("should be an error");
        assert_matches!(err, Error::InvalidStart { found: b'b', .. });
        assert_eq!(err.position().unwrap().line, 11);
    });
}

#[test]
fn multiline_qual_too_long() {
    let fq = &b"@id\nACGT\n+\nII\nIII\n"[..];
    test_reader!(fq, reader, {
        let err = reader.next().unwrap().err().expect("should be an error");
        assert_matches!(err, Error::UnequalLengths { seq: 4, qual: 5, .. });
        assert_eq!(err.position().unwrap().id.as_deref(), Some("id"));
    });
}

#[test]
fn empty_record() {
    let fq = &b"@id\n\n+\n\n@id2\nA\n+\nI"[..];
    test_reader!(fq, reader, {
        let rec = reader.next().unwrap().unwrap();
        assert_eq!(rec.seq(), b"");
        assert_eq!(rec.qual(), b"");
        assert_eq!(reader.next().unwrap().unwrap().id(), Ok("id2"));
        assert!(reader.next().is_none());
    });
}

#[test]
fn trailing_newlines() {
    let fq = &b"@id\nA\n+\nI\n\n\r\n\n\n\n"[..];
    test_reader!(fq, reader, {
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().is_none());
    });

    // empty lines between records
    let fq = &b"@id\nA\n+\nI\n\n@id2\nA\n+\nI\n"[..];
    test_reader!(fq, reader, {
        assert!(reader.next().unwrap().is_ok());
        let err = reader.next().unwrap().err().expect("should be an error");
        assert_matches!(err, Error::InvalidStart { found: b'\n', .. });
        assert_eq!(err.position().unwrap().line, 5);
    });
}

#[test]
fn empty() {
    test_reader!(&b""[..], reader, {
        assert!(reader.next().is_none());
    });
}

#[test]
fn invalid_start() {
    let fq = &b"@id1\nA\n+\nI\nid\nATGC\n+\nIIII"[..];
    test_reader!(fq, reader, {
        reader.next().unwrap().unwrap();
        let err = reader.next().unwrap().err().expect("should be an error");
        assert_matches!(err, Error::InvalidStart { found: b'i', .. });
        assert_eq!(err.position().unwrap().line, 5);
        assert!(err.position().unwrap().id.is_none());
        assert!(err.to_string().contains("expected '@' at record start but found 'i'"));
    });
}

#[test]
fn invalid_sep() {
    let fq = &b"@id\nATGC\n@id2\nATGC\n+\nIIII\n"[..];
    test_reader!(fq, reader, {
        let err = reader.next().unwrap().err().expect("should be an error");
        assert_matches!(err, Error::InvalidSep { found: b'@', .. });
        assert_eq!(err.position().unwrap().line, 3);
        assert_eq!(err.position().unwrap().id.as_deref(), Some("id"));
        assert!(reader.next().is_none());
    });
}

#[test]
fn unequal_lengths() {
    let fq = &b"@id desc\nATGC\n+\n~~\n"[..];
    test_reader!(fq, reader, {
        let err = reader.next().unwrap().err().expect("should be an error");
        assert_matches!(err, Error::UnequalLengths { seq: 4, qual: 2, .. });
        assert_eq!(err.position().unwrap().line, 1);
        assert_eq!(err.position().unwrap().id.as_deref(), Some("id"));
        assert!(err.to_string().contains("record 'id' at line 1"));
    });
}

#[test]
fn truncated() {
    let fq = &b"@id\nATGC\n+"[..];
    test_reader!(fq, reader, {
        let err = reader.next().unwrap().err().expect("should be an error");
        assert_matches!(err, Error::UnexpectedEnd { .. });
        assert_eq!(err.position().unwrap().line, 3);
        assert_eq!(err.position().unwrap().id.as_deref(), Some("id"));
    });

    let fq = &b"@id\nATGC\n+\n"[..];
    test_reader!(fq, reader, {
        let err = reader.next().unwrap().err().expect("should be an error");
        assert_matches!(err, Error::UnexpectedEnd { .. });
        assert_eq!(err.position().unwrap().line, 4);
    });

    let fq = &b"@id"[..];
    test_reader!(fq, reader, {
        let err = reader.next().unwrap().err().expect("should be an error");
        assert_matches!(err, Error::UnexpectedEnd { .. });
        assert!(err.position().unwrap().id.is_none());
    });
}

#[test]
fn none_after_err() {
    let mut reader = Reader::new(&b"@id\nATGC"[..]);
    assert!(reader.next().unwrap().is_err());
    assert!(reader.next().is_none());
}

#[test]
fn buffer_limit() {
    let seq = "A".repeat(200);
    let fq = format!("@id\n{}\n+\n{}\n", seq, seq);
    let mut reader = Reader::with_capacity(fq.as_bytes(), 4).set_policy(DoubleUntilLimited::new(8, 64));
    let err = reader.next().unwrap().err().expect("should be an error");
    assert_matches!(err, Error::BufferLimit);
    assert!(err.position().is_none());
}

#[test]
fn long_reads_grow_buffer() {
    let seq = "ACGT".repeat(50_000);
    let fq = format!("@long start_time=2021-05-01T09:00:00Z\n{}\n+\n{}\n@short\nA\n+\nI\n", seq, seq);
    let mut reader = Reader::with_capacity(fq.as_bytes(), 16);
    assert_eq!(reader.next().unwrap().unwrap().seq().len(), 200_000);
    assert_eq!(reader.next().unwrap().unwrap().id(), Ok("short"));
    assert!(reader.next().is_none());
}

#[test]
fn reads_from_guppy_headers() {
    let mut reader = Reader::with_capacity(&GUPPY_FASTQ[..], 32);
    let reads = read::read_all(&mut reader).unwrap();
    assert_eq!(reads.len(), GUPPY_DESCS.len());
    for (i, (read, desc)) in reads.iter().zip(GUPPY_DESCS.iter()).enumerate() {
        assert_eq!(read.id, format!("read{}", i));
        assert_eq!(read.desc, format!("read{} {}", i, desc));
        assert!(read.timestamp.is_none());
    }
}

#[test]
fn header_without_whitespace() {
    let mut reader = Reader::new(&b"@only_id\nA\n+\nI\n"[..]);
    let reads = read::read_all(&mut reader).unwrap();
    assert_eq!(reads[0].id, "only_id");
    assert_eq!(reads[0].desc, "only_id");
}

#[test]
fn read_invalid_utf8() {
    let mut reader = Reader::new(&b"@id\xff desc\xfe\nA\n+\nI\n"[..]);
    let reads = read::read_all(&mut reader).unwrap();
    assert_eq!(reads[0].id, "id\u{fffd}");
    assert_eq!(reads[0].desc, "id\u{fffd} desc\u{fffd}");
}
