//! Reading and writing of field data: DOLFIN XML functions and NumPy arrays.

pub mod function;
pub mod npy;

pub use function::{load_function, save_function};
pub use npy::{read_npy, write_npy};

use crate::{Error, Result};

use std::{path::Path, str::FromStr};

pub(crate) fn read_to_string(path: &Path) -> Result<String> {
  std::fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

pub(crate) fn parse_xml<'a>(text: &'a str, path: &Path) -> Result<roxmltree::Document<'a>> {
  roxmltree::Document::parse(text).map_err(|source| Error::Xml {
    path: path.to_path_buf(),
    source,
  })
}

/// Parses a mandatory attribute of an xml element.
pub(crate) fn attr<T: FromStr>(node: roxmltree::Node, name: &str, path: &Path) -> Result<T> {
  let raw = node.attribute(name).ok_or_else(|| {
    Error::format(
      path,
      format!("<{}> lacks attribute `{name}`", node.tag_name().name()),
    )
  })?;
  raw.trim().parse().map_err(|_| {
    Error::format(
      path,
      format!(
        "attribute `{name}` of <{}> has invalid value `{raw}`",
        node.tag_name().name()
      ),
    )
  })
}

/// Parses an optional attribute of an xml element.
pub(crate) fn opt_attr<T: FromStr>(
  node: roxmltree::Node,
  name: &str,
  path: &Path,
) -> Result<Option<T>> {
  match node.attribute(name) {
    Some(_) => attr(node, name, path).map(Some),
    None => Ok(None),
  }
}

pub(crate) fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
  }
  std::fs::write(path, contents).map_err(|e| Error::io(path, e))
}
