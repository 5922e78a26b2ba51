//! Raw numeric-array files (NumPy `.npy`, format version 1.0) for stored grids.
//!
//! Only C-ordered `f8` arrays in the host byte order are written or accepted.
use crate::gridding::grid::{FieldGrid, GridError};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

type Result<T> = std::result::Result<T, GridError>;

const MAGIC: &[u8; 6] = b"\x93NUMPY";
const ALIGNMENT: usize = 64;

#[cfg(target_endian = "little")]
const DESCR: &str = "<f8";
#[cfg(target_endian = "big")]
const DESCR: &str = ">f8";

/// An array read back from a `.npy` file
#[derive(Debug, Clone, PartialEq)]
pub struct NpyArray {
    pub shape: Vec<usize>,
    pub data: Vec<f64>,
}

impl NpyArray {
    /// Rows of a 2-D array; `None` for any other rank
    pub fn rows(&self) -> Option<impl Iterator<Item = &[f64]>> {
        match self.shape.as_slice() {
            [_, cols] => Some(self.data.chunks((*cols).max(1))),
            _ => None,
        }
    }
}

/// Serializes a row-major `rows x cols` array into `.npy` bytes
pub fn to_npy_bytes(shape: (usize, usize), data: &[f64]) -> Result<Vec<u8>> {
    if shape.0 * shape.1 != data.len() {
        return Err(GridError::Format(format!(
            "shape ({}, {}) does not hold {} values",
            shape.0,
            shape.1,
            data.len()
        )));
    }

    let mut header = format!(
        "{{'descr': '{}', 'fortran_order': False, 'shape': ({}, {}), }}",
        DESCR, shape.0, shape.1
    );
    // magic + version + header length + header + newline must end on the alignment
    let unpadded = MAGIC.len() + 2 + 2 + header.len() + 1;
    header.push_str(&" ".repeat((ALIGNMENT - unpadded % ALIGNMENT) % ALIGNMENT));
    header.push('\n');

    let payload: &[u8] = bytemuck::cast_slice(data);
    let mut bytes = Vec::with_capacity(MAGIC.len() + 4 + header.len() + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&[1, 0]);
    bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
    bytes.extend_from_slice(header.as_bytes());
    bytes.extend_from_slice(payload);
    Ok(bytes)
}

/// Parses `.npy` bytes holding a C-ordered `f8` array in host byte order
pub fn from_npy_bytes(bytes: &[u8]) -> Result<NpyArray> {
    if bytes.len() < MAGIC.len() + 4 || &bytes[..MAGIC.len()] != MAGIC {
        return Err(GridError::Format("missing NPY magic string".to_string()));
    }

    let major = bytes[MAGIC.len()];
    let (header_len, header_start) = match major {
        1 => {
            let raw = [bytes[8], bytes[9]];
            (u16::from_le_bytes(raw) as usize, 10)
        }
        2 | 3 if bytes.len() >= 12 => {
            let raw = [bytes[8], bytes[9], bytes[10], bytes[11]];
            (u32::from_le_bytes(raw) as usize, 12)
        }
        _ => {
            return Err(GridError::Format(format!(
                "unsupported NPY version {major}"
            )))
        }
    };
    let data_start = header_start + header_len;
    if bytes.len() < data_start {
        return Err(GridError::Format("truncated NPY header".to_string()));
    }
    let header = std::str::from_utf8(&bytes[header_start..data_start])
        .map_err(|_| GridError::Format("NPY header is not valid text".to_string()))?;

    let descr = quoted_value(header, "descr")
        .ok_or_else(|| GridError::Format("NPY header has no descr".to_string()))?;
    if descr != DESCR {
        return Err(GridError::Format(format!(
            "expected dtype {DESCR}, found {descr}"
        )));
    }
    if !header.contains("'fortran_order': False") {
        return Err(GridError::Format(
            "Fortran-ordered arrays are not supported".to_string(),
        ));
    }
    let shape = shape_value(header)
        .ok_or_else(|| GridError::Format("NPY header has no readable shape".to_string()))?;

    let expected_bytes = shape
        .iter()
        .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
        .and_then(|count| count.checked_mul(std::mem::size_of::<f64>()))
        .ok_or_else(|| GridError::Format(format!("shape {shape:?} is too large")))?;
    let count = expected_bytes / std::mem::size_of::<f64>();
    let payload = &bytes[data_start..];
    if payload.len() != expected_bytes {
        return Err(GridError::Format(format!(
            "expected {} values, found {} bytes",
            count,
            payload.len()
        )));
    }
    let data = payload
        .chunks_exact(std::mem::size_of::<f64>())
        .map(|chunk| {
            bytemuck::try_pod_read_unaligned::<f64>(chunk)
                .map_err(|e| GridError::Format(format!("unreadable value: {e:?}")))
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok(NpyArray { shape, data })
}

fn quoted_value<'a>(header: &'a str, key: &str) -> Option<&'a str> {
    let start = header.find(&format!("'{key}':"))? + key.len() + 3;
    let rest = header[start..].trim_start();
    let rest = rest.strip_prefix('\'')?;
    let end = rest.find('\'')?;
    Some(&rest[..end])
}

fn shape_value(header: &str) -> Option<Vec<usize>> {
    let start = header.find("'shape':")?;
    let rest = &header[start..];
    let open = rest.find('(')?;
    let close = rest.find(')')?;
    rest[open + 1..close]
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<usize>().ok())
        .collect()
}

/// Writes a row-major `rows x cols` array to `path`
pub fn write_npy<P: AsRef<Path>>(path: P, shape: (usize, usize), data: &[f64]) -> Result<()> {
    let bytes = to_npy_bytes(shape, data)?;
    let mut file = File::create(path)?;
    file.write_all(&bytes)?;
    Ok(())
}

/// Writes the values of `grid` to `path`, one row per latitude
pub fn write_grid<P: AsRef<Path>>(path: P, grid: &FieldGrid) -> Result<()> {
    write_npy(path, grid.shape(), &grid.values)
}

pub fn read_npy<P: AsRef<Path>>(path: P) -> Result<NpyArray> {
    let mut bytes = vec![];
    File::open(path)?.read_to_end(&mut bytes)?;
    from_npy_bytes(&bytes)
}
