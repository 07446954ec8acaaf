//! PDF value parser.
//!
//! Combines lexer tokens into complete values (arrays, dictionaries, indirect
//! references, ...) using recursive descent. [`parse_object`] is the nom-level
//! entry point; [`parse_value`] wraps it for callers that want a crate
//! [`Result`].

use crate::error::{Error, Result};
use crate::lexer::{Token, token};
use crate::object::{Dict, Object, ObjectRef};
use nom::IResult;

/// Decode escape sequences in PDF literal strings.
///
/// Supports `\n \r \t \b \f \( \) \\`, octal escapes `\ddd` (1-3 digits) and
/// line continuations (backslash followed by an end-of-line). Unknown escapes
/// keep the backslash.
///
/// ```
/// # use pdf_objmodel::parser::decode_literal_string_escapes;
/// assert_eq!(decode_literal_string_escapes(b"Section \\247 71.01"), b"Section \xa7 71.01");
/// ```
pub fn decode_literal_string_escapes(raw: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        if raw[i] != b'\\' || i + 1 >= raw.len() {
            result.push(raw[i]);
            i += 1;
            continue;
        }
        let escaped = raw[i + 1];
        i += 2;
        match escaped {
            b'n' => result.push(b'\n'),
            b'r' => result.push(b'\r'),
            b't' => result.push(b'\t'),
            b'b' => result.push(8),
            b'f' => result.push(12),
            b'(' | b')' | b'\\' => result.push(escaped),
            b'\n' => {},
            b'\r' => {
                if raw.get(i) == Some(&b'\n') {
                    i += 1;
                }
            },
            b'0'..=b'7' => {
                let mut octal = (escaped - b'0') as u32;
                let mut digits = 1;
                while digits < 3 {
                    match raw.get(i) {
                        Some(&d @ b'0'..=b'7') => {
                            octal = octal * 8 + (d - b'0') as u32;
                            i += 1;
                            digits += 1;
                        },
                        _ => break,
                    }
                }
                result.push((octal & 0xFF) as u8);
            },
            _ => {
                result.push(b'\\');
                i -= 1;
            },
        }
    }

    result
}

/// Decode a hex string to bytes.
///
/// Whitespace is ignored; an odd trailing digit is padded with 0.
///
/// ```
/// use pdf_objmodel::parser::decode_hex;
///
/// assert_eq!(decode_hex(b"48656C6C6F").unwrap(), b"Hello");
/// assert_eq!(decode_hex(b"7").unwrap(), vec![0x70]);
/// ```
pub fn decode_hex(hex_bytes: &[u8]) -> Result<Vec<u8>> {
    let digits: Vec<u8> = hex_bytes
        .iter()
        .filter(|c| !c.is_ascii_whitespace())
        .copied()
        .collect();

    digits
        .chunks(2)
        .map(|pair| {
            let high = hex_value(pair[0])?;
            let low = match pair.get(1) {
                Some(&c) => hex_value(c)?,
                None => 0,
            };
            Ok((high << 4) | low)
        })
        .collect()
}

fn hex_value(c: u8) -> Result<u8> {
    (c as char)
        .to_digit(16)
        .map(|d| d as u8)
        .ok_or_else(|| Error::ParseError {
            offset: 0,
            reason: format!("invalid hex digit '{}'", c as char),
        })
}

/// Parse a PDF value from input bytes.
///
/// Handles null, booleans, numbers, strings, names, arrays, dictionaries and
/// indirect references (`10 0 R`).
///
/// ```
/// use pdf_objmodel::object::Object;
/// use pdf_objmodel::parser::parse_object;
///
/// let (_, obj) = parse_object(b"[ 1 2 /Name ]").unwrap();
/// assert_eq!(obj.as_array().map(|a| a.len()), Some(3));
/// ```
pub fn parse_object(input: &[u8]) -> IResult<&[u8], Object> {
    let (input, tok) = token(input)?;

    match tok {
        Token::Null => Ok((input, Object::Null)),
        Token::True => Ok((input, Object::Boolean(true))),
        Token::False => Ok((input, Object::Boolean(false))),

        Token::Integer(i) => {
            // Could be the start of an indirect reference (obj_num gen R)
            if let Ok((input2, Token::Integer(gen))) = token(input) {
                if let Ok((input3, Token::R)) = token(input2) {
                    if let (Ok(id), Ok(gen)) = (u32::try_from(i), u16::try_from(gen)) {
                        return Ok((input3, Object::Reference(ObjectRef::new(id, gen))));
                    }
                }
            }
            Ok((input, Object::Integer(i)))
        },

        Token::Real(r) => Ok((input, Object::Real(r))),

        Token::LiteralString(bytes) => {
            Ok((input, Object::String(decode_literal_string_escapes(bytes))))
        },

        Token::HexString(hex_bytes) => match decode_hex(hex_bytes) {
            Ok(decoded) => Ok((input, Object::ByteString(decoded))),
            Err(_) => Err(nom::Err::Failure(nom::error::Error::new(
                input,
                nom::error::ErrorKind::HexDigit,
            ))),
        },

        Token::Name(name) => Ok((input, Object::Name(name))),

        Token::ArrayStart => parse_array(input),

        Token::DictStart => parse_dictionary(input),

        _ => Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Tag))),
    }
}

/// Parse a PDF array after its opening `[`.
fn parse_array(input: &[u8]) -> IResult<&[u8], Object> {
    let mut objects = Vec::new();
    let mut remaining = input;

    loop {
        if let Ok((rest, Token::ArrayEnd)) = token(remaining) {
            return Ok((rest, Object::Array(objects)));
        }
        let (rest, obj) = parse_object(remaining)?;
        objects.push(obj);
        remaining = rest;
    }
}

/// Parse a PDF dictionary after its opening `<<`.
///
/// Keys must be names; insertion order is kept.
fn parse_dictionary(input: &[u8]) -> IResult<&[u8], Object> {
    let mut dict = Dict::new();
    let mut remaining = input;

    loop {
        let (rest, tok) = token(remaining)?;
        match tok {
            Token::DictEnd => return Ok((rest, Object::Dictionary(dict))),
            Token::Name(key) => {
                let (rest, value) = parse_object(rest)?;
                dict.insert(key, value);
                remaining = rest;
            },
            _ => {
                return Err(nom::Err::Error(nom::error::Error::new(
                    remaining,
                    nom::error::ErrorKind::Tag,
                )));
            },
        }
    }
}

/// Parse the first value in `input`, reporting failures as [`Error::ParseError`].
///
/// Bytes after the value are ignored.
pub fn parse_value(input: &[u8]) -> Result<Object> {
    match parse_object(input) {
        Ok((_, obj)) => Ok(obj),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(Error::ParseError {
            offset: input.len() - e.input.len(),
            reason: format!("{:?}", e.code),
        }),
        Err(nom::Err::Incomplete(_)) => Err(Error::ParseError {
            offset: input.len(),
            reason: "incomplete input".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_primitives() {
        assert_eq!(parse_value(b"null").unwrap(), Object::Null);
        assert_eq!(parse_value(b"true").unwrap(), Object::Boolean(true));
        assert_eq!(parse_value(b"-123").unwrap(), Object::Integer(-123));
        assert_eq!(parse_value(b"2.5").unwrap(), Object::Real(2.5));
        assert_eq!(parse_value(b"/Type").unwrap(), Object::name("Type"));
    }

    #[test]
    fn test_parse_strings() {
        assert_eq!(parse_value(b"(Hello World)").unwrap(), Object::string("Hello World"));
        assert_eq!(parse_value(b"<48656C6C6F>").unwrap(), Object::ByteString(b"Hello".to_vec()));
    }

    #[test]
    fn test_escape_sequences() {
        assert_eq!(decode_literal_string_escapes(b"Line1\\nLine2"), b"Line1\nLine2");
        assert_eq!(decode_literal_string_escapes(b"\\(x\\)"), b"(x)");
        assert_eq!(decode_literal_string_escapes(b"a\\\nb"), b"ab");
        assert_eq!(decode_literal_string_escapes(b"\\101\\7"), b"A\x07");
        assert_eq!(decode_literal_string_escapes(b"\\q"), b"\\q");
    }

    #[test]
    fn test_parse_reference() {
        assert_eq!(parse_value(b"10 0 R").unwrap(), Object::Reference(ObjectRef::new(10, 0)));
    }

    #[test]
    fn test_integer_followed_by_integer_is_not_reference() {
        let (rest, obj) = parse_object(b"1 2 3").unwrap();
        assert_eq!(obj, Object::Integer(1));
        assert_eq!(rest, b" 2 3");
    }

    #[test]
    fn test_parse_array() {
        let obj = parse_value(b"[1 2]").unwrap();
        assert_eq!(obj, Object::Array(vec![Object::Integer(1), Object::Integer(2)]));
    }

    #[test]
    fn test_parse_nested() {
        let obj = parse_value(b"<< /Kids [ 3 0 R << /A 1 >> ] /Type /Pages >>").unwrap();
        let dict = obj.as_dict().unwrap();
        let keys: Vec<_> = dict.keys().cloned().collect();
        assert_eq!(keys, vec!["Kids", "Type"]);
        let kids = dict["Kids"].as_array().unwrap();
        assert_eq!(kids[0], Object::Reference(ObjectRef::new(3, 0)));
        assert_eq!(kids[1].as_dict().unwrap()["A"], Object::Integer(1));
    }

    #[test]
    fn test_unclosed_array_is_error() {
        assert!(parse_value(b"[1 2").is_err());
    }

    #[test]
    fn test_dictionary_key_must_be_name() {
        assert!(parse_value(b"<< 1 2 >>").is_err());
    }

    #[test]
    fn test_parse_error_offset() {
        match parse_value(b"   )") {
            Err(Error::ParseError { offset, .. }) => assert_eq!(offset, 3),
            other => panic!("expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_hex_invalid() {
        assert!(decode_hex(b"4Z").is_err());
    }
}
