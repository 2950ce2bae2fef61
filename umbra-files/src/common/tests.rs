use crate::common::hash::{fnv1a, fnv1a_str};
use crate::common::tokenizer::{SeparatorSet, WordTokenizer};

#[test]
fn fnv1a_reference_values() {
    // Reference vectors of the 64 bit FNV-1a variant.
    assert_eq!(fnv1a(b""), 0xcbf29ce484222325);
    assert_eq!(fnv1a(b"a"), 0xaf63dc4c8601ec8c);
    assert_eq!(fnv1a_str("foobar"), 0x85944171f73967e8);
}

#[test]
fn words_span_lines() {
    let mut tokenizer = WordTokenizer::new(b"  v 1.0\t2.0\r\n  vn 3", SeparatorSet::WHITESPACE);
    let words: Vec<&[u8]> = std::iter::from_fn(|| tokenizer.next_word()).collect();
    assert_eq!(words, vec![&b"v"[..], b"1.0", b"2.0", b"vn", b"3"]);
    assert!(tokenizer.is_eof());
    assert_eq!(tokenizer.next_word(), None);
}

#[test]
fn words_bounded_by_line() {
    let mut tokenizer = WordTokenizer::new(b"f 1 2 3\nv 0", SeparatorSet::WHITESPACE);
    assert_eq!(tokenizer.next_word_on_line(), Some(&b"f"[..]));
    assert_eq!(tokenizer.next_word_on_line(), Some(&b"1"[..]));
    assert_eq!(tokenizer.next_word_on_line(), Some(&b"2"[..]));
    assert_eq!(tokenizer.next_word_on_line(), Some(&b"3"[..]));
    assert_eq!(tokenizer.next_word_on_line(), None);
    tokenizer.skip_line();
    assert_eq!(tokenizer.next_word_on_line(), Some(&b"v"[..]));
}

#[test]
fn custom_separators() {
    let mut tokenizer = WordTokenizer::new(b"1/2/3", SeparatorSet::new(b"/"));
    let words: Vec<&[u8]> = std::iter::from_fn(|| tokenizer.next_word()).collect();
    assert_eq!(words, vec![&b"1"[..], b"2", b"3"]);
}

#[test]
fn rest_of_line_is_trimmed() {
    let mut tokenizer = WordTokenizer::new(b"mtllib  my file.mtl \r\nnext", SeparatorSet::WHITESPACE);
    tokenizer.next_word_on_line();
    assert_eq!(tokenizer.rest_of_line(), b"my file.mtl");
    assert_eq!(tokenizer.next_word(), Some(&b"next"[..]));
}

#[test]
fn typed_values() -> Result<(), anyhow::Error> {
    let mut tokenizer = WordTokenizer::new(b"0.5 -2 x", SeparatorSet::WHITESPACE);
    assert_eq!(tokenizer.next_value::<f32>()?, 0.5);
    assert_eq!(tokenizer.next_value::<i64>()?, -2);
    assert!(tokenizer.next_value::<f32>().is_err());
    assert!(tokenizer.next_value::<f32>().is_err());
    Ok(())
}

#[test]
fn binary_reads_advance() -> Result<(), anyhow::Error> {
    let data = [0x42, 0x4d, 0x10, 0x00, 0x00, 0x00, 0xff, 0xff];
    let mut tokenizer = WordTokenizer::binary(&data);
    assert_eq!(tokenizer.read::<u16>()?, 0x4d42);
    assert_eq!(tokenizer.read::<u32>()?, 16);
    assert_eq!(tokenizer.position(), 6);
    assert_eq!(tokenizer.read::<i16>()?, -1);
    assert!(tokenizer.read::<u8>().is_err());
    assert_eq!(tokenizer.read_at::<u8>(1)?, 0x4d);
    assert!(tokenizer.seek(9).is_err());
    Ok(())
}
