//! Minimal NumPy `.npy` codec for two-dimensional float matrices.
//!
//! Reads little-endian `<f4` and `<f8` arrays in C order (format versions 1, 2
//! and 3) and writes `<f4` version 1.0 files, which is what the offline corpus
//! builder produces and what `numpy.load` reads back.

use crate::error::{RagError, Result};

const MAGIC: &[u8] = b"\x93NUMPY";
const HEADER_ALIGNMENT: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dtype {
    F32,
    F64,
}

impl Dtype {
    fn width(self) -> usize {
        match self {
            Dtype::F32 => 4,
            Dtype::F64 => 8,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Header {
    dtype: Dtype,
    rows: usize,
    cols: usize,
}

/// Decode a `.npy` byte buffer into row vectors.
///
/// # Errors
///
/// Returns [`RagError::NpyError`] for a bad magic string, an unsupported
/// dtype or layout, a shape that is not two-dimensional, or a payload whose
/// length disagrees with the shape.
pub fn decode_matrix(bytes: &[u8]) -> Result<Vec<Vec<f32>>> {
    if bytes.len() < MAGIC.len() + 2 || &bytes[..MAGIC.len()] != MAGIC {
        return Err(RagError::NpyError("missing NumPy magic string".into()));
    }
    let major = bytes[MAGIC.len()];
    let (header_len, header_start) = match major {
        1 => (read_u16(bytes, 8)? as usize, 10),
        2 | 3 => (read_u32(bytes, 8)? as usize, 12),
        other => return Err(RagError::NpyError(format!("unsupported format version {other}"))),
    };
    let data_start = header_start + header_len;
    let header_bytes = bytes
        .get(header_start..data_start)
        .ok_or_else(|| RagError::NpyError("truncated header".into()))?;
    let header_text = std::str::from_utf8(header_bytes)
        .map_err(|e| RagError::NpyError(format!("header is not valid text: {e}")))?;
    let header = parse_header(header_text)?;

    let payload = &bytes[data_start..];
    let expected = header
        .rows
        .checked_mul(header.cols)
        .and_then(|n| n.checked_mul(header.dtype.width()))
        .ok_or_else(|| RagError::NpyError("shape overflows".into()))?;
    if payload.len() != expected {
        return Err(RagError::NpyError(format!(
            "payload has {} bytes, shape ({}, {}) needs {expected}",
            payload.len(),
            header.rows,
            header.cols
        )));
    }

    let values: Vec<f32> = match header.dtype {
        Dtype::F32 => payload
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect(),
        Dtype::F64 => payload
            .chunks_exact(8)
            .map(|b| f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]) as f32)
            .collect(),
    };

    if header.cols == 0 {
        return Ok(vec![Vec::new(); header.rows]);
    }
    Ok(values.chunks(header.cols).map(<[f32]>::to_vec).collect())
}

/// Encode row vectors as a little-endian `<f4` `.npy` version 1.0 buffer.
///
/// # Errors
///
/// Returns [`RagError::NpyError`] if the rows do not share one length.
pub fn encode_matrix(rows: &[Vec<f32>]) -> Result<Vec<u8>> {
    let cols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|r| r.len() != cols) {
        return Err(RagError::NpyError("rows have differing lengths".into()));
    }

    let mut header =
        format!("{{'descr': '<f4', 'fortran_order': False, 'shape': ({}, {cols}), }}", rows.len());
    let unpadded = MAGIC.len() + 4 + header.len() + 1;
    let padding = (HEADER_ALIGNMENT - unpadded % HEADER_ALIGNMENT) % HEADER_ALIGNMENT;
    header.extend(std::iter::repeat_n(' ', padding));
    header.push('\n');

    let header_len = u16::try_from(header.len())
        .map_err(|_| RagError::NpyError("header too long for format 1.0".into()))?;

    let mut bytes = Vec::with_capacity(MAGIC.len() + 4 + header.len() + rows.len() * cols * 4);
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&[1, 0]);
    bytes.extend_from_slice(&header_len.to_le_bytes());
    bytes.extend_from_slice(header.as_bytes());
    for value in rows.iter().flatten() {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    Ok(bytes)
}

fn read_u16(bytes: &[u8], at: usize) -> Result<u16> {
    bytes
        .get(at..at + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .ok_or_else(|| RagError::NpyError("truncated header length".into()))
}

fn read_u32(bytes: &[u8], at: usize) -> Result<u32> {
    bytes
        .get(at..at + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| RagError::NpyError("truncated header length".into()))
}

/// Parse the Python-literal header dictionary.
fn parse_header(text: &str) -> Result<Header> {
    let descr = dict_value(text, "descr")?.split(',').next().unwrap_or_default().trim();
    let dtype = match descr.trim_matches(|c| c == '\'' || c == '"') {
        "<f4" => Dtype::F32,
        "<f8" => Dtype::F64,
        other => return Err(RagError::NpyError(format!("unsupported dtype {other}"))),
    };

    if dict_value(text, "fortran_order")?.starts_with("True") {
        return Err(RagError::NpyError("Fortran-ordered arrays are not supported".into()));
    }

    let shape = dict_value(text, "shape")?;
    let inner = shape
        .strip_prefix('(')
        .and_then(|s| s.split(')').next())
        .ok_or_else(|| RagError::NpyError(format!("malformed shape {shape}")))?;
    let dims = inner
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(|d| d.parse::<usize>().map_err(|e| RagError::NpyError(format!("bad dimension {d}: {e}"))))
        .collect::<Result<Vec<_>>>()?;

    let (rows, cols) = match dims.as_slice() {
        [rows, cols] => (*rows, *cols),
        [0] => (0, 0),
        _ => return Err(RagError::NpyError(format!("expected a 2-D array, got shape {shape}"))),
    };
    Ok(Header { dtype, rows, cols })
}

/// Return the raw text following `'key':` in the header dictionary.
fn dict_value<'a>(text: &'a str, key: &str) -> Result<&'a str> {
    let needle = format!("'{key}':");
    let start = text
        .find(&needle)
        .ok_or_else(|| RagError::NpyError(format!("header has no '{key}' entry")))?;
    Ok(text[start + needle.len()..].trim_start())
}
