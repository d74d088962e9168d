//! Tests for save file encoding, decoding and I/O.

use std::path::PathBuf;

use crate::annotation::{Rect, RectKind};
use crate::format::{FormatError, SaveRecord, decode, decode_header, read_save_file};
use crate::test_image::ScratchDir;
use crate::transform::ImageDimensions;

const EPSILON: f32 = 0.0001;

fn sample_rects() -> Vec<Rect> {
    vec![
        Rect::new(310.5, 88.0, 120.0, 64.0, RectKind::Primary),
        Rect::new(12.0, 40.25, 33.0, 33.0, RectKind::Secondary),
        Rect::new(0.1, 0.2, 1234.5678, 0.333, RectKind::Primary),
    ]
}

fn assert_rects_eq(actual: &[Rect], expected: &[Rect]) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert!((a.x - e.x).abs() < EPSILON, "x: {} vs {}", a.x, e.x);
        assert!((a.y - e.y).abs() < EPSILON, "y: {} vs {}", a.y, e.y);
        assert!((a.width - e.width).abs() < EPSILON);
        assert!((a.height - e.height).abs() < EPSILON);
        assert_eq!(a.kind, e.kind);
    }
}

#[test]
fn test_encode_layout() {
    let record = SaveRecord::new(
        PathBuf::from("birds").join("heron.jpg"),
        ImageDimensions::new(1920, 1080),
        vec![
            Rect::new(310.5, 88.0, 120.0, 64.0, RectKind::Primary),
            Rect::new(12.0, 40.25, 33.0, 33.0, RectKind::Secondary),
        ],
    );

    let text = record.to_text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "birds/heron.jpg",
            "1920,1080",
            "2",
            "310.5,88,120,64,0",
            "12,40.25,33,33,1",
        ]
    );
    assert!(text.ends_with('\n'));
}

#[test]
fn test_decode_of_encode_preserves_rects() {
    let rects = sample_rects();
    let text = SaveRecord::new("a/b.png", ImageDimensions::new(640, 480), rects.clone()).to_text();
    assert_rects_eq(&decode(&text).unwrap(), &rects);
}

#[test]
fn test_decode_empty_record() {
    let text = SaveRecord::new("a.png", ImageDimensions::new(10, 10), Vec::new()).to_text();
    assert!(decode(&text).unwrap().is_empty());
}

#[test]
fn test_decode_four_field_lines_as_primary() {
    let text = "x/y.jpg\n100,100\n2\n1.5,2,3,4\n10,20,30,40\n";
    let rects = decode(text).unwrap();
    assert_eq!(
        rects,
        vec![
            Rect::new(1.5, 2.0, 3.0, 4.0, RectKind::Primary),
            Rect::new(10.0, 20.0, 30.0, 40.0, RectKind::Primary),
        ]
    );
}

#[test]
fn test_decode_accepts_long_float_text_and_blank_lines() {
    let text = "y.jpg\r\n800,600\r\n1\r\n\r\n12.300000190734863,4.0,5.5,6.25\r\n\r\n";
    let rects = decode(text).unwrap();
    assert_eq!(rects.len(), 1);
    assert!((rects[0].x - 12.3).abs() < EPSILON);
}

#[test]
fn test_decode_skips_header_without_parsing_it() {
    // Header content is not validated by decode
    let text = "whatever\nnot,numbers\n???\n1,2,3,4,1\n";
    assert_eq!(
        decode(text).unwrap(),
        vec![Rect::new(1.0, 2.0, 3.0, 4.0, RectKind::Secondary)]
    );
}

#[test]
fn test_decode_malformed_line_fails_whole_load() {
    let text = "y.jpg\n10,10\n2\n1,2,3,4\n1,2,three,4\n";
    match decode(text) {
        Err(FormatError::Malformed { line, .. }) => assert_eq!(line, 5),
        other => panic!("expected malformed error, got {:?}", other),
    }
}

#[test]
fn test_decode_rejects_wrong_field_count() {
    let text = "y.jpg\n10,10\n1\n1,2,3\n";
    assert!(matches!(decode(text), Err(FormatError::Malformed { line: 4, .. })));

    let text = "y.jpg\n10,10\n1\n1,2,3,4,0,9\n";
    assert!(matches!(decode(text), Err(FormatError::Malformed { line: 4, .. })));
}

#[test]
fn test_decode_rejects_unknown_kind_and_negative_size() {
    assert!(decode("y\n1,1\n1\n1,2,3,4,5\n").is_err());
    assert!(decode("y\n1,1\n1\n1,2,-3,4\n").is_err());
    assert!(decode("y\n1,1\n1\n1,NaN,3,4\n").is_err());
}

#[test]
fn test_decode_truncated_header() {
    assert!(matches!(
        decode("only.jpg\n10,10\n"),
        Err(FormatError::Malformed { line: 3, .. })
    ));
    assert!(matches!(decode(""), Err(FormatError::Malformed { line: 1, .. })));
}

#[test]
fn test_decode_header() {
    let text = SaveRecord::new("x/y.jpg", ImageDimensions::new(1024, 768), sample_rects()).to_text();
    let header = decode_header(&text).unwrap();
    assert_eq!(header.image_path, PathBuf::from("x/y.jpg"));
    assert_eq!(header.dimensions, ImageDimensions::new(1024, 768));
    assert_eq!(header.count, 3);
}

#[test]
fn test_decode_header_rejects_bad_dimensions() {
    assert!(matches!(
        decode_header("y.jpg\n1024x768\n0\n"),
        Err(FormatError::Malformed { line: 2, .. })
    ));
    assert!(matches!(
        decode_header("y.jpg\n1024,768\nmany\n"),
        Err(FormatError::Malformed { line: 3, .. })
    ));
}

#[test]
fn test_write_creates_parents_and_reads_back() {
    let dir = ScratchDir::new("save_write");
    let save_path = dir.join("saves/deep/nested/shot.txt");
    let rects = sample_rects();

    SaveRecord::new("deep/nested/shot.jpg", ImageDimensions::new(300, 200), rects.clone())
        .write(&save_path)
        .unwrap();

    assert!(save_path.is_file());
    assert_rects_eq(&read_save_file(&save_path).unwrap(), &rects);
}

#[test]
fn test_write_overwrites_previous_save() {
    let dir = ScratchDir::new("save_overwrite");
    let save_path = dir.join("img.txt");
    let dims = ImageDimensions::new(50, 50);

    SaveRecord::new("img.png", dims, sample_rects()).write(&save_path).unwrap();
    SaveRecord::new("img.png", dims, Vec::new()).write(&save_path).unwrap();

    assert!(read_save_file(&save_path).unwrap().is_empty());
}

#[test]
fn test_read_missing_file_is_io_error() {
    let dir = ScratchDir::new("save_missing");
    let err = read_save_file(&dir.join("nope.txt")).unwrap_err();
    assert!(err.is_io());
}

#[test]
fn test_write_into_file_parent_is_io_error() {
    let dir = ScratchDir::new("save_blocked");
    dir.file("blocker", b"not a directory");
    let err = SaveRecord::new("a.png", ImageDimensions::new(1, 1), Vec::new())
        .write(&dir.join("blocker/a.txt"))
        .unwrap_err();
    assert!(err.is_io());
}
