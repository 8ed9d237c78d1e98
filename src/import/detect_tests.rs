#![allow(clippy::unwrap_used)]

use super::*;
use encoding_rs::{UTF_16LE, UTF_8, WINDOWS_1252};

fn latin1(s: &str) -> Vec<u8> {
    let (bytes, _, had_errors) = WINDOWS_1252.encode(s);
    assert!(!had_errors);
    bytes.into_owned()
}

// ── detect_encoding ───────────────────────────────────────────

#[test]
fn test_utf8_first_line_accepted() {
    let bytes = "Data;Descrição;Valor\n2025-05-10;Café;-4,50\n".as_bytes();
    let (encoding, skip) = detect_encoding(bytes, Some(UTF_8), &[WINDOWS_1252]).unwrap();
    assert_eq!(encoding, UTF_8);
    assert_eq!(skip, 0);
}

#[test]
fn test_falls_back_when_guess_cannot_decode() {
    let bytes = latin1("Data;Descrição;Valor\n2025-05-10;Café;-4,50\n");
    let (encoding, _) = detect_encoding(&bytes, Some(UTF_8), &[WINDOWS_1252, UTF_8]).unwrap();
    assert_eq!(encoding, WINDOWS_1252);
}

#[test]
fn test_fallback_order_is_respected() {
    let bytes = latin1("Descrição\n");
    let (encoding, _) = detect_encoding(&bytes, Some(UTF_8), &[UTF_8, WINDOWS_1252]).unwrap();
    assert_eq!(encoding, WINDOWS_1252);
}

#[test]
fn test_no_candidate_decodes() {
    let bytes = latin1("Descrição\n");
    assert!(detect_encoding(&bytes, Some(UTF_8), &[UTF_8]).is_none());
}

#[test]
fn test_only_first_line_is_checked() {
    let mut bytes = b"Data;Valor\n".to_vec();
    bytes.extend(latin1("2025-05-10;Caf\u{e9}\n"));
    let (encoding, _) = detect_encoding(&bytes, Some(UTF_8), &[]).unwrap();
    assert_eq!(encoding, UTF_8);
}

#[test]
fn test_bom_overrides_guess() {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice("Data,Valor\n".as_bytes());
    let (encoding, skip) = detect_encoding(&bytes, Some(WINDOWS_1252), &[]).unwrap();
    assert_eq!(encoding, UTF_8);
    assert_eq!(skip, 3);

    let utf16 = [0xFF, 0xFE, b'D', 0, b'a', 0];
    let (encoding, skip) = detect_encoding(&utf16, None, &[]).unwrap();
    assert_eq!(encoding, UTF_16LE);
    assert_eq!(skip, 2);
}

#[test]
fn test_detection_is_deterministic() {
    let bytes = latin1("Data;Histórico;Entrada;Saída\n2025-05-10;Pão de açúcar;0;45,00\n");
    let first = detect_encoding(&bytes, None, &[WINDOWS_1252, UTF_8]);
    let second = detect_encoding(&bytes, None, &[WINDOWS_1252, UTF_8]);
    assert_eq!(first, second);
    assert!(first.is_some());
}

#[test]
fn test_guess_plain_utf8() {
    let bytes = "Data;Descrição;Valor\n2025-05-10;Padaria São João;-12,50\n".as_bytes();
    assert_eq!(guess_encoding(bytes), UTF_8);
}

// ── detect_delimiter ──────────────────────────────────────────

#[test]
fn test_semicolon_detected() {
    assert_eq!(detect_delimiter("Data;Histórico;Valor", b";:\t"), b';');
}

#[test]
fn test_tab_detected() {
    assert_eq!(detect_delimiter("Date\tDescription\tAmount", b";:\t"), b'\t');
}

#[test]
fn test_candidate_order_wins() {
    assert_eq!(detect_delimiter("a:b;c", b";:\t"), b';');
    assert_eq!(detect_delimiter("a:b;c", b":;\t"), b':');
}

#[test]
fn test_defaults_to_comma() {
    assert_eq!(detect_delimiter("Date,Description,Amount", b";:\t"), b',');
    assert_eq!(detect_delimiter("", b";:\t"), b',');
}

// ── first_line ────────────────────────────────────────────────

#[test]
fn test_first_line_strips_crlf() {
    assert_eq!(first_line("a;b\r\nc;d\r\n"), "a;b");
    assert_eq!(first_line(""), "");
    assert_eq!(first_line_bytes(b"a;b\r\nc"), b"a;b");
    assert_eq!(first_line_bytes(b"single"), b"single");
}
