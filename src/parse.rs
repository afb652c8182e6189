// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Loading Intcode programs from text or packed binary
//!
//! ```
//! use gravity_assist::parse::parse_ascii;
//! assert_eq!(parse_ascii("1,0,0,0,99\n").unwrap(), vec![1, 0, 0, 0, 99]);
//! assert!(parse_ascii("1,0,zero,0,99").is_err());
//! ```

use std::error::Error;
use std::fmt::{self, Display};
use std::num::ParseIntError;
use std::str::Utf8Error;

use clap::ValueEnum;

/// The format an Intcode program is stored in
#[derive(Debug, PartialEq, Eq, Clone, Copy, ValueEnum)]
pub enum CodeFormat {
    /// comma-separated ASCII-encoded decimal numbers
    #[value(alias("text"))]
    #[value(alias("aoc"))]
    Ascii,
    /// little-endian 64-bit integers
    #[cfg_attr(target_endian = "little", value(alias("binary-native")))]
    #[value(name("binary-little-endian"), alias("binle"))]
    LittleEndian,
    #[cfg_attr(target_endian = "big", value(alias("binary-native")))]
    #[value(name("binary-big-endian"), alias("binbe"))]
    /// big-endian 64-bit integers
    BigEndian,
}

impl CodeFormat {
    /// Parse `input` according to `self`
    ///
    /// # Errors
    ///
    /// See [`ParseError`].
    pub fn parse(self, input: &[u8]) -> Result<Vec<i64>, ParseError> {
        match self {
            CodeFormat::Ascii => parse_ascii(str::from_utf8(input)?),
            CodeFormat::LittleEndian => parse_binary(input, i64::from_le_bytes),
            CodeFormat::BigEndian => parse_binary(input, i64::from_be_bytes),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
/// An error that occured while loading a program
pub enum ParseError {
    /// Text input was not valid UTF-8
    NotUtf8(Utf8Error),
    /// A comma-separated token was not a valid [`i64`]
    BadToken {
        /// Which token, counting from 0
        index: usize,
        /// The token itself, with surrounding whitespace removed
        token: String,
        /// Why it couldn't be parsed
        source: ParseIntError,
    },
    /// Binary input ended partway through an int
    TrailingBytes(usize),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotUtf8(e) => write!(f, "input is not valid UTF-8: {e}"),
            Self::BadToken {
                index,
                token,
                source,
            } => write!(f, "could not parse int #{index} ({token:?}): {source}"),
            Self::TrailingBytes(n) => write!(f, "{n} extra bytes after the last full int"),
        }
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotUtf8(e) => Some(e),
            Self::BadToken { source, .. } => Some(source),
            Self::TrailingBytes(_) => None,
        }
    }
}

impl From<Utf8Error> for ParseError {
    fn from(err: Utf8Error) -> Self {
        Self::NotUtf8(err)
    }
}

/// Parse comma-separated decimal ints, ignoring whitespace around each one.
/// Input that is empty apart from whitespace is an empty program.
///
/// # Errors
///
/// Returns [`ParseError::BadToken`] for the first token that isn't an [`i64`].
pub fn parse_ascii(input: &str) -> Result<Vec<i64>, ParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Vec::new());
    }
    input
        .split(',')
        .map(str::trim)
        .enumerate()
        .map(|(index, token)| {
            token.parse::<i64>().map_err(|source| ParseError::BadToken {
                index,
                token: token.to_owned(),
                source,
            })
        })
        .collect()
}

/// Parse packed 8-byte ints, using `func` to convert each one
///
/// # Errors
///
/// Returns [`ParseError::TrailingBytes`] if `input`'s length isn't a multiple of 8.
pub fn parse_binary<F: Fn([u8; 8]) -> i64>(input: &[u8], func: F) -> Result<Vec<i64>, ParseError> {
    let (chunks, remainder) = input.as_chunks::<8>();
    if remainder.is_empty() {
        Ok(chunks.iter().copied().map(func).collect())
    } else {
        Err(ParseError::TrailingBytes(remainder.len()))
    }
}
