//! NumPy `.npy` files of two-dimensional `float64` arrays.
//!
//! Written files use format version 1.0, dtype `<f8` and C (row-major) order.

use crate::{Error, Result};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::{
  fs::File,
  io::{BufReader, BufWriter, Read, Write},
  path::Path,
};

const MAGIC: &[u8; 6] = b"\x93NUMPY";
/// Total header length (magic, version, length field and dict) is padded to this.
const HEADER_ALIGN: usize = 64;

pub fn write_npy(matrix: &na::DMatrix<f64>, path: impl AsRef<Path>) -> Result<()> {
  let path = path.as_ref();
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
  }
  let file = File::create(path).map_err(|e| Error::io(path, e))?;
  let mut writer = BufWriter::new(file);
  encode_npy(matrix, &mut writer).map_err(|e| Error::io(path, e))?;
  writer.flush().map_err(|e| Error::io(path, e))
}

pub fn encode_npy<W: Write>(matrix: &na::DMatrix<f64>, mut writer: W) -> std::io::Result<()> {
  let mut header = format!(
    "{{'descr': '<f8', 'fortran_order': False, 'shape': ({}, {}), }}",
    matrix.nrows(),
    matrix.ncols()
  );
  // magic + version + u16 length + dict + newline
  let unpadded = MAGIC.len() + 2 + 2 + header.len() + 1;
  let padding = (HEADER_ALIGN - unpadded % HEADER_ALIGN) % HEADER_ALIGN;
  header.extend(std::iter::repeat(' ').take(padding));
  header.push('\n');

  writer.write_all(MAGIC)?;
  writer.write_u8(1)?;
  writer.write_u8(0)?;
  writer.write_u16::<LittleEndian>(header.len() as u16)?;
  writer.write_all(header.as_bytes())?;

  for row in matrix.row_iter() {
    for &value in row.iter() {
      writer.write_f64::<LittleEndian>(value)?;
    }
  }
  Ok(())
}

pub fn read_npy(path: impl AsRef<Path>) -> Result<na::DMatrix<f64>> {
  let path = path.as_ref();
  let file = File::open(path).map_err(|e| Error::io(path, e))?;
  decode_npy(BufReader::new(file))
}

pub fn decode_npy<R: Read>(mut reader: R) -> Result<na::DMatrix<f64>> {
  let truncated = |e: std::io::Error| Error::Npy(format!("truncated file: {e}"));

  let mut magic = [0u8; 6];
  reader.read_exact(&mut magic).map_err(truncated)?;
  if &magic != MAGIC {
    return Err(Error::Npy("missing magic string".into()));
  }
  let major = reader.read_u8().map_err(truncated)?;
  let _minor = reader.read_u8().map_err(truncated)?;
  let header_len = match major {
    1 => reader.read_u16::<LittleEndian>().map_err(truncated)? as usize,
    2 | 3 => reader.read_u32::<LittleEndian>().map_err(truncated)? as usize,
    _ => return Err(Error::Npy(format!("unsupported format version {major}"))),
  };
  let mut header = vec![0u8; header_len];
  reader.read_exact(&mut header).map_err(truncated)?;
  let header =
    String::from_utf8(header).map_err(|_| Error::Npy("header is not valid text".into()))?;

  let descr = header_value(&header, "descr")?;
  if !matches!(descr, "'<f8'" | "'float64'") {
    return Err(Error::Npy(format!("unsupported dtype {descr}")));
  }
  let fortran_order = match header_value(&header, "fortran_order")? {
    "False" => false,
    "True" => true,
    other => return Err(Error::Npy(format!("invalid fortran_order {other}"))),
  };
  let (nrows, ncols) = parse_shape(header_value(&header, "shape")?)?;

  let mut data = vec![0.0; nrows * ncols];
  reader
    .read_f64_into::<LittleEndian>(&mut data)
    .map_err(truncated)?;

  let matrix = if fortran_order {
    na::DMatrix::from_vec(nrows, ncols, data)
  } else {
    na::DMatrix::from_row_slice(nrows, ncols, &data)
  };
  Ok(matrix)
}

/// The raw value of a key of the header dict.
fn header_value<'a>(header: &'a str, key: &str) -> Result<&'a str> {
  let pattern = format!("'{key}':");
  let start = header
    .find(&pattern)
    .map(|i| i + pattern.len())
    .ok_or_else(|| Error::Npy(format!("header lacks `{key}`")))?;
  let rest = header[start..].trim_start();
  let end = if rest.starts_with('(') {
    rest.find(')').map(|i| i + 1)
  } else {
    rest.find([',', '}'])
  }
  .ok_or_else(|| Error::Npy(format!("unterminated value of `{key}`")))?;
  Ok(rest[..end].trim())
}

fn parse_shape(shape: &str) -> Result<(usize, usize)> {
  let dims = shape
    .trim_start_matches('(')
    .trim_end_matches(')')
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(|s| {
      s.parse::<usize>()
        .map_err(|_| Error::Npy(format!("invalid shape {shape}")))
    })
    .collect::<Result<Vec<_>>>()?;
  match dims[..] {
    [nrows, ncols] => Ok((nrows, ncols)),
    _ => Err(Error::Npy(format!("expected a two-dimensional array, got shape {shape}"))),
  }
}
