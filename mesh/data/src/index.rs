use crate::*;

/// Element type of index data.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexFormat {
  UnsignedByte,
  UnsignedShort,
  UnsignedInt,
}

impl IndexFormat {
  pub const fn byte_size(self) -> usize {
    match self {
      IndexFormat::UnsignedByte => 1,
      IndexFormat::UnsignedShort => 2,
      IndexFormat::UnsignedInt => 4,
    }
  }

  pub fn from_element_size(size: usize) -> Result<Self, LayoutError> {
    match size {
      1 => Ok(IndexFormat::UnsignedByte),
      2 => Ok(IndexFormat::UnsignedShort),
      4 => Ok(IndexFormat::UnsignedInt),
      size => Err(LayoutError::InvalidIndexElementSize(size)),
    }
  }
}

/// Compile-time association between a concrete integer type and its index
/// format.
pub trait IndexType: Pod {
  const FORMAT: IndexFormat;
}

impl IndexType for u8 {
  const FORMAT: IndexFormat = IndexFormat::UnsignedByte;
}
impl IndexType for u16 {
  const FORMAT: IndexFormat = IndexFormat::UnsignedShort;
}
impl IndexType for u32 {
  const FORMAT: IndexFormat = IndexFormat::UnsignedInt;
}

#[derive(Copy, Clone, Debug)]
pub(crate) enum IndexDataSource<'a> {
  View(&'a [u8]),
  Offset { offset: usize, count: usize },
}

/// Index element type paired with a type-erased view over the raw index
/// bytes. An empty descriptor (no element type) marks a non-indexed mesh.
#[derive(Copy, Clone, Debug)]
pub struct MeshIndexData<'a> {
  pub(crate) format: Option<IndexFormat>,
  pub(crate) source: IndexDataSource<'a>,
}

impl Default for MeshIndexData<'_> {
  fn default() -> Self {
    Self::none()
  }
}

impl<'a> MeshIndexData<'a> {
  /// The non-indexed marker.
  pub const fn none() -> Self {
    Self {
      format: None,
      source: IndexDataSource::View(&[]),
    }
  }

  /// Typed construction, the element type is inferred.
  pub fn new<T: IndexType>(indices: &'a [T]) -> Self {
    Self {
      format: Some(T::FORMAT),
      source: IndexDataSource::View(bytemuck::cast_slice(indices)),
    }
  }

  /// Type-erased construction with an explicit element type.
  pub fn from_bytes(format: IndexFormat, data: &'a [u8]) -> Result<Self, LayoutError> {
    if data.len() % format.byte_size() != 0 {
      return Err(LayoutError::IndexSizeMismatch {
        len: data.len(),
        format,
      });
    }
    Ok(Self {
      format: Some(format),
      source: IndexDataSource::View(data),
    })
  }

  /// Construction from a strided view with one element per row. The element
  /// dimension has to be contiguous and 1, 2 or 4 bytes, and the rows tightly
  /// packed.
  pub fn from_view(view: StridedBytes<'a>) -> Result<Self, LayoutError> {
    let format = IndexFormat::from_element_size(view.element_size())?;
    let data = view
      .as_contiguous()
      .ok_or(LayoutError::IndexViewNotContiguous)?;
    Ok(Self {
      format: Some(format),
      source: IndexDataSource::View(data),
    })
  }

  /// A range into index memory that is supplied later, at mesh construction.
  pub const fn offset_only(format: IndexFormat, offset: usize, count: usize) -> Self {
    Self {
      format: Some(format),
      source: IndexDataSource::Offset { offset, count },
    }
  }

  pub fn format(&self) -> Option<IndexFormat> {
    self.format
  }

  pub fn count(&self) -> usize {
    match (self.format, self.source) {
      (None, _) => 0,
      (Some(format), IndexDataSource::View(data)) => data.len() / format.byte_size(),
      (Some(_), IndexDataSource::Offset { count, .. }) => count,
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn typed_construction_infers_format() {
    let indices = [0u16, 1, 2];
    let data = MeshIndexData::new(&indices);
    assert_eq!(data.format(), Some(IndexFormat::UnsignedShort));
    assert_eq!(data.count(), 3);
  }

  #[test]
  fn byte_construction_validates_size() {
    let bytes = [0u8; 6];
    assert!(MeshIndexData::from_bytes(IndexFormat::UnsignedShort, &bytes).is_ok());
    assert_eq!(
      MeshIndexData::from_bytes(IndexFormat::UnsignedInt, &bytes).unwrap_err(),
      LayoutError::IndexSizeMismatch {
        len: 6,
        format: IndexFormat::UnsignedInt,
      }
    );
  }

  #[test]
  fn view_construction() {
    let bytes = [0u8; 8];
    let view = StridedBytes::new(&bytes, 2, 2, 4).unwrap();
    let data = MeshIndexData::from_view(view).unwrap();
    assert_eq!(data.format(), Some(IndexFormat::UnsignedShort));
    assert_eq!(data.count(), 4);

    let strided = StridedBytes::new(&bytes, 2, 4, 2).unwrap();
    assert_eq!(
      MeshIndexData::from_view(strided).unwrap_err(),
      LayoutError::IndexViewNotContiguous
    );
    let wrong_size = StridedBytes::new(&bytes, 3, 3, 2).unwrap();
    assert_eq!(
      MeshIndexData::from_view(wrong_size).unwrap_err(),
      LayoutError::InvalidIndexElementSize(3)
    );
  }

  #[test]
  fn none_is_not_indexed() {
    let data = MeshIndexData::none();
    assert_eq!(data.format(), None);
    assert_eq!(data.count(), 0);
  }
}
