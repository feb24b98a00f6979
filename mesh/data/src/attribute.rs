use crate::*;

#[derive(Copy, Clone, Debug)]
pub(crate) enum AttributeDataSource<'a> {
  /// Direct mode, a borrowed region starting at the first element. Proven to
  /// lie inside the mesh vertex buffer at container construction.
  View(&'a [u8]),
  /// Offset-only mode, a byte offset into vertex memory that is supplied
  /// later.
  Offset(usize),
  /// Spacing (or, via negative stride, deliberate aliasing) request for
  /// re-interleaving. Specifies no data of its own and is rejected by the
  /// mesh container.
  Padding,
}

/// Description of one named, typed, strided vertex attribute.
///
/// Either references its memory directly ([`MeshAttributeData::new`] and the
/// typed constructors) or carries a byte offset into vertex memory resolved
/// only once the descriptor is handed to a mesh container
/// ([`MeshAttributeData::offset_only`]).
#[derive(Copy, Clone, Debug)]
pub struct MeshAttributeData<'a> {
  pub(crate) semantic: Option<AttributeSemantic>,
  pub(crate) format: Option<VertexFormat>,
  /// 0 means a single (non-array) element.
  pub(crate) array_size: u16,
  pub(crate) stride: i16,
  pub(crate) count: u32,
  pub(crate) source: AttributeDataSource<'a>,
}

/// Byte span of one element: the whole vector times the array size. `None`
/// for implementation-specific formats, whose element size can't be queried.
pub(crate) fn element_span(format: VertexFormat, array_size: u16) -> Option<usize> {
  format
    .size()
    .ok()
    .map(|size| size * array_size.max(1) as usize)
}

fn validate(
  semantic: AttributeSemantic,
  format: VertexFormat,
  array_size: u16,
  stride: usize,
) -> Result<i16, LayoutError> {
  let stride_16 =
    i16::try_from(stride).map_err(|_| LayoutError::StrideOutOfRange(stride as isize))?;
  if stride == 0 {
    return Err(LayoutError::StrideOutOfRange(0));
  }
  if let Some(span) = element_span(format, array_size) {
    if stride < span {
      return Err(LayoutError::StrideTooSmall { stride, format });
    }
  }
  // array legality first, it is the more specific diagnosis for a builtin
  if array_size != 0 {
    if !semantic.is_custom() {
      return Err(LayoutError::BuiltinArray(semantic));
    }
    if format.is_implementation_specific() {
      return Err(LayoutError::ImplementationSpecificArray);
    }
  }
  if !semantic.is_format_compatible(format) {
    return Err(LayoutError::IncompatibleFormat { semantic, format });
  }
  Ok(stride_16)
}

fn checked_count(count: usize) -> Result<u32, LayoutError> {
  u32::try_from(count).map_err(|_| LayoutError::TooManyElements(count))
}

impl<'a> MeshAttributeData<'a> {
  /// Direct construction from a strided byte view. The view's element size
  /// has to match the format exactly (unless the format is
  /// implementation-specific, which bypasses all element size checks).
  pub fn new(
    semantic: AttributeSemantic,
    format: VertexFormat,
    view: StridedBytes<'a>,
  ) -> Result<Self, LayoutError> {
    Self::new_array(semantic, format, view, 0)
  }

  pub fn new_array(
    semantic: AttributeSemantic,
    format: VertexFormat,
    view: StridedBytes<'a>,
    array_size: u16,
  ) -> Result<Self, LayoutError> {
    if let Some(span) = element_span(format, array_size) {
      if view.element_size() != span {
        return Err(LayoutError::ElementSizeMismatch {
          expected: span,
          got: view.element_size(),
        });
      }
    }
    let stride = validate(semantic, format, array_size, view.stride())?;
    Ok(Self {
      semantic: Some(semantic),
      format: Some(format),
      array_size,
      stride,
      count: checked_count(view.count())?,
      source: AttributeDataSource::View(view.bytes()),
    })
  }

  /// Direct construction over tightly-or-loosely strided raw bytes, with the
  /// element size implied by the format.
  pub fn new_strided(
    semantic: AttributeSemantic,
    format: VertexFormat,
    data: &'a [u8],
    stride: usize,
    count: usize,
  ) -> Result<Self, LayoutError> {
    // implementation-specific elements are opaque, take the whole slot
    let span = element_span(format, 0).unwrap_or(stride);
    let view = StridedBytes::new(data, span, stride, count)?;
    Self::new(semantic, format, view)
  }

  /// Typed construction, the format is derived from the element type.
  pub fn from_typed<T: VertexType>(
    semantic: AttributeSemantic,
    data: &'a [T],
  ) -> Result<Self, LayoutError> {
    Self::new(semantic, T::FORMAT, StridedBytes::from_slice(data))
  }

  /// Typed array construction: consecutive groups of `array_size` elements
  /// form one array attribute value each.
  pub fn from_typed_array<T: VertexType>(
    semantic: AttributeSemantic,
    data: &'a [T],
    array_size: u16,
  ) -> Result<Self, LayoutError> {
    if array_size == 0 || data.len() % array_size as usize != 0 {
      return Err(LayoutError::ArraySizeDoesNotDivide {
        len: data.len(),
        array_size,
      });
    }
    let size = std::mem::size_of::<T>() * array_size as usize;
    let count = data.len() / array_size as usize;
    let view = StridedBytes::new(bytemuck::cast_slice(data), size, size, count)?;
    Self::new_array(semantic, T::FORMAT, view, array_size)
  }

  /// Offset-only construction: same validation as the direct modes, but the
  /// data is a byte offset into vertex memory supplied later.
  pub fn offset_only(
    semantic: AttributeSemantic,
    format: VertexFormat,
    offset: usize,
    count: u32,
    stride: usize,
    array_size: u16,
  ) -> Result<Self, LayoutError> {
    let stride = validate(semantic, format, array_size, stride)?;
    Ok(Self {
      semantic: Some(semantic),
      format: Some(format),
      array_size,
      stride,
      count,
      source: AttributeDataSource::Offset(offset),
    })
  }

  /// A padding marker for the combine/interleave collaborators. Negative
  /// strides alias the layout backwards.
  pub const fn padding(stride: i16) -> Self {
    Self {
      semantic: None,
      format: None,
      array_size: 0,
      stride,
      count: 0,
      source: AttributeDataSource::Padding,
    }
  }

  pub fn semantic(&self) -> Option<AttributeSemantic> {
    self.semantic
  }

  pub fn format(&self) -> Option<VertexFormat> {
    self.format
  }

  pub fn array_size(&self) -> u16 {
    self.array_size
  }

  pub fn stride(&self) -> i16 {
    self.stride
  }

  pub fn count(&self) -> u32 {
    self.count
  }

  pub fn is_offset_only(&self) -> bool {
    matches!(self.source, AttributeDataSource::Offset(_))
  }

  pub fn is_padding(&self) -> bool {
    matches!(self.source, AttributeDataSource::Padding)
  }

  /// The byte offset of an offset-only descriptor.
  pub fn offset(&self) -> Option<usize> {
    match self.source {
      AttributeDataSource::Offset(offset) => Some(offset),
      _ => None,
    }
  }

  pub(crate) fn stored_element_size(&self) -> usize {
    match self.format.and_then(|f| element_span(f, self.array_size)) {
      Some(span) => span,
      // opaque formats expose the whole slot
      None => self.stride.unsigned_abs() as usize,
    }
  }

  /// The strided view of a direct-mode descriptor. Fails for offset-only
  /// descriptors, those need [`MeshAttributeData::bytes_in`].
  pub fn bytes(&self) -> Result<StridedBytes<'a>, LayoutError> {
    match self.source {
      AttributeDataSource::View(data) => StridedBytes::new(
        data,
        self.stored_element_size(),
        self.stride.unsigned_abs() as usize,
        self.count as usize,
      ),
      AttributeDataSource::Offset(_) => Err(LayoutError::OffsetOnly),
      AttributeDataSource::Padding => Err(LayoutError::Padding),
    }
  }

  /// Resolves an offset-only descriptor against its external vertex memory.
  /// Fails for direct-mode descriptors, those already know their memory.
  pub fn bytes_in<'b>(&self, base: &'b [u8]) -> Result<StridedBytes<'b>, LayoutError> {
    match self.source {
      AttributeDataSource::Offset(offset) => {
        let element_size = self.stored_element_size();
        let stride = self.stride.unsigned_abs() as usize;
        let data = base.get(offset..).ok_or(LayoutError::ViewOutOfBounds {
          element_size,
          stride,
          count: self.count as usize,
          len: base.len(),
        })?;
        StridedBytes::new(data, element_size, stride, self.count as usize)
      }
      AttributeDataSource::View(_) => Err(LayoutError::NotOffsetOnly),
      AttributeDataSource::Padding => Err(LayoutError::Padding),
    }
  }
}
