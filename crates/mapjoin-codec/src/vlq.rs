//! Base64 variable-length quantities.
//!
//! Each symbol of the 64-character alphabet carries six bits. Bit 5 (value
//! 32) is a continuation flag and bits 0-4 are payload, accumulated
//! little-endian with a 5-bit shift per symbol. The low bit of the
//! accumulated value is the sign.

use crate::error::{CodecError, CodecResult};

/// The 64-symbol alphabet, indexed by 6-bit value.
pub const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const CONTINUATION_BIT: u8 = 32;
const PAYLOAD_MASK: u64 = 31;
const SHIFT: u32 = 5;

/// Largest shift at which a 5-bit group still fits into a `u64`.
const MAX_SHIFT: u32 = 64 - SHIFT;

/// Reverse lookup: byte to 6-bit value, `None` for bytes outside the alphabet.
const fn build_lookup() -> [Option<u8>; 256] {
    let mut table = [None; 256];
    let mut i = 0;
    while i < ALPHABET.len() {
        table[ALPHABET[i] as usize] = Some(i as u8);
        i += 1;
    }
    table
}

static LOOKUP: [Option<u8>; 256] = build_lookup();

/// Map one byte to its 6-bit value.
#[inline]
pub fn symbol_value(byte: u8) -> Option<u8> {
    LOOKUP[byte as usize]
}

/// Append the VLQ encoding of `value` to `out`.
pub fn encode_vlq(value: i64, out: &mut String) {
    let mut num: u64 = if value < 0 {
        (value.unsigned_abs() << 1) | 1
    } else {
        (value as u64) << 1
    };
    loop {
        let mut digit = (num & PAYLOAD_MASK) as u8;
        num >>= SHIFT;
        if num > 0 {
            digit |= CONTINUATION_BIT;
        }
        out.push(ALPHABET[digit as usize] as char);
        if num == 0 {
            break;
        }
    }
}

/// Decode one VLQ value from `input` starting at `*pos`.
///
/// On success `*pos` points just past the final symbol of the value. A
/// separator (`,` or `;`) or end of input while the continuation flag is
/// still set is reported as [`CodecError::UnterminatedVlq`].
pub fn decode_vlq(input: &str, pos: &mut usize) -> CodecResult<i64> {
    let bytes = input.as_bytes();
    let start = *pos;
    let mut value: u64 = 0;
    let mut shift: u32 = 0;

    loop {
        let Some(&byte) = bytes.get(*pos) else {
            return Err(CodecError::UnterminatedVlq { offset: start });
        };
        let digit = match symbol_value(byte) {
            Some(d) => d,
            None if byte == b',' || byte == b';' => {
                return Err(CodecError::UnterminatedVlq { offset: start });
            }
            None => {
                let ch = input[*pos..].chars().next().unwrap_or(char::REPLACEMENT_CHARACTER);
                return Err(CodecError::InvalidCharacter { ch, offset: *pos });
            }
        };
        if shift > MAX_SHIFT {
            return Err(CodecError::VlqOverflow { offset: start });
        }
        value |= (u64::from(digit) & PAYLOAD_MASK) << shift;
        *pos += 1;

        if digit & CONTINUATION_BIT == 0 {
            break;
        }
        shift += SHIFT;
    }

    let negative = value & 1 == 1;
    let magnitude = (value >> 1) as i64;
    Ok(if negative { -magnitude } else { magnitude })
}
