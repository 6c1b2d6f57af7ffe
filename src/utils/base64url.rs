/// Base64URL encoding/decoding per RFC 4648
/// No padding, URL-safe alphabet; `=` is rejected like any other
/// out-of-alphabet byte.
use crate::error::{Error, Result};

const CHARSET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

const fn decode_table() -> [u8; 256] {
    let mut table = [0xff_u8; 256];
    let mut i = 0;
    while i < CHARSET.len() {
        table[CHARSET[i] as usize] = i as u8;
        i += 1;
    }
    table
}

const DECODE_TABLE: [u8; 256] = decode_table();

/// Encode bytes to a Base64URL string without padding
pub fn encode_bytes(input: &[u8]) -> String {
    let mut out = Vec::with_capacity(input.len().div_ceil(3) * 4);

    let mut chunks = input.chunks_exact(3);
    for chunk in &mut chunks {
        out.push(CHARSET[(chunk[0] >> 2) as usize]);
        out.push(CHARSET[(((chunk[0] & 0x03) << 4) | (chunk[1] >> 4)) as usize]);
        out.push(CHARSET[(((chunk[1] & 0x0f) << 2) | (chunk[2] >> 6)) as usize]);
        out.push(CHARSET[(chunk[2] & 0x3f) as usize]);
    }

    match *chunks.remainder() {
        [] => {}
        [b0] => {
            out.push(CHARSET[(b0 >> 2) as usize]);
            out.push(CHARSET[((b0 & 0x03) << 4) as usize]);
        }
        [b0, b1] => {
            out.push(CHARSET[(b0 >> 2) as usize]);
            out.push(CHARSET[(((b0 & 0x03) << 4) | (b1 >> 4)) as usize]);
            out.push(CHARSET[((b1 & 0x0f) << 2) as usize]);
        }
        _ => unreachable!("chunks_exact(3) remainder is at most 2 bytes"),
    }

    // The alphabet is pure ASCII
    String::from_utf8(out).expect("base64url output is ASCII")
}

/// Encode a string to Base64URL
pub fn encode(input: &str) -> String {
    encode_bytes(input.as_bytes())
}

/// Decode a Base64URL string to bytes
pub fn decode_bytes(input: &str) -> Result<Vec<u8>> {
    if input.is_empty() {
        return Ok(Vec::new());
    }
    // A single leftover character carries fewer than 8 bits and cannot
    // represent a byte.
    if input.len() % 4 == 1 {
        return Err(Error::InvalidBase64("truncated input".to_string()));
    }

    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() * 3 / 4);
    let mut vals = [0u8; 4];

    for chunk in bytes.chunks(4) {
        for (i, &c) in chunk.iter().enumerate() {
            let v = DECODE_TABLE[c as usize];
            if v == 0xff {
                return Err(Error::InvalidBase64(format!(
                    "invalid character {:?}",
                    c as char
                )));
            }
            vals[i] = v;
        }
        out.push((vals[0] << 2) | (vals[1] >> 4));
        if chunk.len() > 2 {
            out.push((vals[1] << 4) | (vals[2] >> 2));
        }
        if chunk.len() > 3 {
            out.push((vals[2] << 6) | vals[3]);
        }
    }

    Ok(out)
}

/// Decode a Base64URL string to a UTF-8 string
pub fn decode(input: &str) -> Result<String> {
    let bytes = decode_bytes(input)?;
    String::from_utf8(bytes).map_err(|e| Error::InvalidBase64(format!("invalid UTF-8: {e}")))
}
