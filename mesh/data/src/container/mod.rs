use crate::*;

mod convert;


bitflags! {
  /// Ownership and mutability of one mesh buffer.
  #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
  pub struct DataFlags: u8 {
    /// The mesh owns the buffer and frees it on drop.
    const OWNED = 1 << 0;
    /// The buffer may be written through the mutable accessors.
    const MUTABLE = 1 << 1;
  }
}

/// One contiguous byte buffer, either owned by the mesh or borrowed from the
/// caller. Borrowed memory imposes a lifetime obligation on the caller, the
/// mesh does not extend it; owned memory is always writable.
#[derive(Debug)]
pub enum BufferData<'a> {
  Owned(Vec<u8>),
  Borrowed(&'a [u8]),
  BorrowedMut(&'a mut [u8]),
}

impl Default for BufferData<'_> {
  fn default() -> Self {
    Self::empty()
  }
}

impl<'a> BufferData<'a> {
  /// The zero-length placeholder left behind by the release operations.
  pub const fn empty() -> Self {
    BufferData::Borrowed(&[])
  }

  pub fn as_slice(&self) -> &[u8] {
    match self {
      BufferData::Owned(data) => data,
      BufferData::Borrowed(data) => data,
      BufferData::BorrowedMut(data) => data,
    }
  }

  /// `None` when the buffer is an immutable borrow.
  pub fn as_mut_slice(&mut self) -> Option<&mut [u8]> {
    match self {
      BufferData::Owned(data) => Some(data),
      BufferData::Borrowed(_) => None,
      BufferData::BorrowedMut(data) => Some(data),
    }
  }

  pub fn len(&self) -> usize {
    self.as_slice().len()
  }

  pub fn is_empty(&self) -> bool {
    self.as_slice().is_empty()
  }

  pub fn flags(&self) -> DataFlags {
    match self {
      BufferData::Owned(_) => DataFlags::OWNED | DataFlags::MUTABLE,
      BufferData::Borrowed(_) => DataFlags::empty(),
      BufferData::BorrowedMut(_) => DataFlags::MUTABLE,
    }
  }
}

impl From<Vec<u8>> for BufferData<'_> {
  fn from(data: Vec<u8>) -> Self {
    BufferData::Owned(data)
  }
}

impl<'a> From<&'a [u8]> for BufferData<'a> {
  fn from(data: &'a [u8]) -> Self {
    BufferData::Borrowed(data)
  }
}

impl<'a> From<&'a mut [u8]> for BufferData<'a> {
  fn from(data: &'a mut [u8]) -> Self {
    BufferData::BorrowedMut(data)
  }
}

/// Attribute metadata after container validation: offset resolved, stride
/// positive, range proven contained in the vertex buffer.
#[derive(Copy, Clone, Debug)]
struct AttributeRecord {
  semantic: AttributeSemantic,
  format: VertexFormat,
  array_size: u16,
  offset: usize,
  stride: u16,
  count: u32,
  element_size: usize,
}

#[derive(Copy, Clone, Debug)]
struct IndexRecord {
  format: IndexFormat,
  offset: usize,
  count: usize,
}

pub const MOST_COMMON_ATTRIBUTE_COUNT: usize = 3;

/// The mesh container: one index buffer, one vertex buffer, an ordered
/// sequence of attributes referencing sub-ranges of the vertex buffer and an
/// optional index range.
///
/// Move-only by design, buffers may be large and their ownership stays
/// singular. All read accessors take `&self` and have no side effects, so a
/// fully constructed mesh can be shared read-only across threads; mutation
/// needs `&mut self` plus the MUTABLE flag on the touched buffer.
pub struct MeshData<'a> {
  primitive: PrimitiveTopology,
  index_data: BufferData<'a>,
  vertex_data: BufferData<'a>,
  index: Option<IndexRecord>,
  attributes: SmallVec<[AttributeRecord; MOST_COMMON_ATTRIBUTE_COUNT]>,
  vertex_count: u32,
  importer_state: Option<Arc<dyn Any + Send + Sync>>,
}

/// Byte offset of `region` inside `base`, provided the whole region is
/// contained. Works on pointer identity, not content.
fn region_offset(base: &[u8], region: &[u8]) -> Option<usize> {
  let offset = (region.as_ptr() as usize).checked_sub(base.as_ptr() as usize)?;
  (offset <= base.len() && region.len() <= base.len() - offset).then_some(offset)
}

impl<'a> MeshData<'a> {
  /// The one construction funnel: validates index containment, attribute
  /// containment, vertex count consistency and buffer/descriptor pairing.
  /// The convenience constructors below all end up here.
  pub fn new(
    primitive: PrimitiveTopology,
    index_data: BufferData<'a>,
    indices: MeshIndexData<'_>,
    vertex_data: BufferData<'a>,
    attributes: Vec<MeshAttributeData<'_>>,
  ) -> Result<Self, MeshError> {
    Self::new_impl(primitive, index_data, indices, vertex_data, attributes, None)
  }

  /// A mesh without index data.
  pub fn new_non_indexed(
    primitive: PrimitiveTopology,
    vertex_data: BufferData<'a>,
    attributes: Vec<MeshAttributeData<'_>>,
  ) -> Result<Self, MeshError> {
    Self::new_impl(
      primitive,
      BufferData::empty(),
      MeshIndexData::none(),
      vertex_data,
      attributes,
      None,
    )
  }

  /// An attribute-less indexed mesh. The vertex count can't be derived from
  /// anywhere, so it has to be passed explicitly.
  pub fn new_indexed_only(
    primitive: PrimitiveTopology,
    index_data: BufferData<'a>,
    indices: MeshIndexData<'_>,
    vertex_count: u32,
  ) -> Result<Self, MeshError> {
    Self::new_impl(
      primitive,
      index_data,
      indices,
      BufferData::empty(),
      Vec::new(),
      Some(vertex_count),
    )
  }

  /// A fully empty mesh with just a vertex count.
  pub fn from_vertex_count(
    primitive: PrimitiveTopology,
    vertex_count: u32,
  ) -> Result<Self, MeshError> {
    Self::new_impl(
      primitive,
      BufferData::empty(),
      MeshIndexData::none(),
      BufferData::empty(),
      Vec::new(),
      Some(vertex_count),
    )
  }

  fn new_impl(
    primitive: PrimitiveTopology,
    index_data: BufferData<'a>,
    indices: MeshIndexData<'_>,
    vertex_data: BufferData<'a>,
    attributes: Vec<MeshAttributeData<'_>>,
    explicit_vertex_count: Option<u32>,
  ) -> Result<Self, MeshError> {
    let index_buffer = index_data.as_slice();
    let index = match indices.format {
      None => {
        if !index_buffer.is_empty() {
          return Err(MeshError::IndexDataForNonIndexed);
        }
        None
      }
      Some(format) => {
        let size = format.byte_size();
        let (offset, count) = match indices.source {
          IndexDataSource::View(view) => {
            let guess = (view.as_ptr() as usize).wrapping_sub(index_buffer.as_ptr() as usize);
            let offset =
              region_offset(index_buffer, view).ok_or(MeshError::IndicesNotContained {
                offset: guess,
                end: guess.wrapping_add(view.len()),
                buffer_len: index_buffer.len(),
              })?;
            (offset, view.len() / size)
          }
          IndexDataSource::Offset { offset, count } => {
            let extent = required_len(size, size, count).unwrap_or(usize::MAX);
            if offset > index_buffer.len() || extent > index_buffer.len() - offset {
              return Err(MeshError::IndicesNotContained {
                offset,
                end: offset.saturating_add(extent),
                buffer_len: index_buffer.len(),
              });
            }
            (offset, count)
          }
        };
        Some(IndexRecord {
          format,
          offset,
          count,
        })
      }
    };

    let vertex_buffer = vertex_data.as_slice();
    let mut records = SmallVec::new();
    let mut expected_count = explicit_vertex_count;
    for (index, attribute) in attributes.iter().enumerate() {
      let (Some(semantic), Some(format)) = (attribute.semantic, attribute.format) else {
        return Err(MeshError::PaddingAttribute { index });
      };
      let element_size = attribute.stored_element_size();
      let stride = attribute.stride.unsigned_abs();
      let offset = match attribute.source {
        AttributeDataSource::View(region) => region_offset(vertex_buffer, region)
          .ok_or(MeshError::AttributeViewForeign { index })?,
        AttributeDataSource::Offset(offset) => offset,
        AttributeDataSource::Padding => return Err(MeshError::PaddingAttribute { index }),
      };
      let extent = required_len(element_size, stride as usize, attribute.count as usize)
        .unwrap_or(usize::MAX);
      if offset > vertex_buffer.len() || extent > vertex_buffer.len() - offset {
        return Err(MeshError::AttributeNotContained {
          index,
          begin: offset,
          end: offset.saturating_add(extent),
          buffer_len: vertex_buffer.len(),
        });
      }
      let expected = *expected_count.get_or_insert(attribute.count);
      if attribute.count != expected {
        return Err(MeshError::VertexCountMismatch {
          index,
          count: attribute.count,
          expected,
        });
      }
      records.push(AttributeRecord {
        semantic,
        format,
        array_size: attribute.array_size,
        offset,
        stride,
        count: attribute.count,
        element_size,
      });
    }

    let vertex_count = match expected_count {
      Some(count) => count,
      // attribute-less, no explicit count: only an indexed mesh can get away
      // with this, and its vertex count is reported as zero
      None => match index {
        Some(_) => 0,
        None => return Err(MeshError::UnknownVertexCount),
      },
    };

    if records.is_empty() && !vertex_buffer.is_empty() {
      return Err(MeshError::VertexDataForAttributeless);
    }

    Ok(Self {
      primitive,
      index_data,
      vertex_data,
      index,
      attributes: records,
      vertex_count,
      importer_state: None,
    })
  }

  /// Attaches an opaque producer-supplied back-reference.
  pub fn with_importer_state(mut self, state: Arc<dyn Any + Send + Sync>) -> Self {
    self.importer_state = Some(state);
    self
  }

  pub fn importer_state(&self) -> Option<&(dyn Any + Send + Sync)> {
    self.importer_state.as_deref()
  }

  pub fn primitive(&self) -> PrimitiveTopology {
    self.primitive
  }

  pub fn vertex_count(&self) -> u32 {
    self.vertex_count
  }

  pub fn is_indexed(&self) -> bool {
    self.index.is_some()
  }

  pub fn index_count(&self) -> Result<usize, MeshError> {
    Ok(self.index.ok_or(MeshError::NotIndexed)?.count)
  }

  pub fn index_format(&self) -> Result<IndexFormat, MeshError> {
    Ok(self.index.ok_or(MeshError::NotIndexed)?.format)
  }

  pub fn index_data_flags(&self) -> DataFlags {
    self.index_data.flags()
  }

  pub fn vertex_data_flags(&self) -> DataFlags {
    self.vertex_data.flags()
  }

  /// The whole index buffer, including bytes not covered by the index range.
  pub fn index_data(&self) -> &[u8] {
    self.index_data.as_slice()
  }

  /// The whole vertex buffer, including bytes not covered by any attribute.
  pub fn vertex_data(&self) -> &[u8] {
    self.vertex_data.as_slice()
  }

  pub fn mutable_index_data(&mut self) -> Result<&mut [u8], MeshError> {
    self
      .index_data
      .as_mut_slice()
      .ok_or(MeshError::IndexDataNotMutable)
  }

  pub fn mutable_vertex_data(&mut self) -> Result<&mut [u8], MeshError> {
    self
      .vertex_data
      .as_mut_slice()
      .ok_or(MeshError::VertexDataNotMutable)
  }

  // index access

  /// Untyped view of the index range, one row per index element.
  pub fn indices_bytes(&self) -> Result<StridedBytes<'_>, MeshError> {
    let index = self.index.ok_or(MeshError::NotIndexed)?;
    let size = index.format.byte_size();
    let data = &self.index_data.as_slice()[index.offset..index.offset + index.count * size];
    Ok(StridedBytes::new(data, size, size, index.count).map_err(LayoutError::from)?)
  }

  pub fn mutable_indices_bytes(&mut self) -> Result<StridedBytesMut<'_>, MeshError> {
    let index = self.index.ok_or(MeshError::NotIndexed)?;
    let size = index.format.byte_size();
    let data = self
      .index_data
      .as_mut_slice()
      .ok_or(MeshError::IndexDataNotMutable)?;
    let data = &mut data[index.offset..index.offset + index.count * size];
    Ok(StridedBytesMut::new(data, size, size, index.count).map_err(LayoutError::from)?)
  }

  pub fn indices<T: IndexType>(&self) -> Result<TypedView<'_, T>, MeshError> {
    let index = self.index.ok_or(MeshError::NotIndexed)?;
    if index.format != T::FORMAT {
      return Err(MeshError::WrongIndexType {
        requested: T::FORMAT,
        actual: index.format,
      });
    }
    Ok(TypedView::wrap(self.indices_bytes()?))
  }

  pub fn mutable_indices<T: IndexType>(&mut self) -> Result<TypedViewMut<'_, T>, MeshError> {
    let index = self.index.ok_or(MeshError::NotIndexed)?;
    if index.format != T::FORMAT {
      return Err(MeshError::WrongIndexType {
        requested: T::FORMAT,
        actual: index.format,
      });
    }
    Ok(TypedViewMut::wrap(self.mutable_indices_bytes()?))
  }

  // attribute lookup

  pub fn attribute_count(&self) -> usize {
    self.attributes.len()
  }

  pub fn attribute_count_of(&self, semantic: AttributeSemantic) -> usize {
    self
      .attributes
      .iter()
      .filter(|a| a.semantic == semantic)
      .count()
  }

  pub fn has_attribute(&self, semantic: AttributeSemantic) -> bool {
    self.attribute_count_of(semantic) != 0
  }

  /// Absolute index of the `occurrence`-th attribute of the given semantic.
  /// Attribute order is significant, a mesh may carry several attributes of
  /// one semantic.
  pub fn attribute_id(
    &self,
    semantic: AttributeSemantic,
    occurrence: usize,
  ) -> Result<usize, MeshError> {
    self
      .attributes
      .iter()
      .enumerate()
      .filter(|(_, a)| a.semantic == semantic)
      .nth(occurrence)
      .map(|(id, _)| id)
      .ok_or_else(|| MeshError::OccurrenceOutOfRange {
        semantic,
        occurrence,
        count: self.attribute_count_of(semantic),
      })
  }

  fn record(&self, id: usize) -> Result<&AttributeRecord, MeshError> {
    self.attributes.get(id).ok_or(MeshError::AttributeOutOfRange {
      id,
      count: self.attributes.len(),
    })
  }

  pub fn attribute_semantic(&self, id: usize) -> Result<AttributeSemantic, MeshError> {
    Ok(self.record(id)?.semantic)
  }

  pub fn attribute_format(&self, id: usize) -> Result<VertexFormat, MeshError> {
    Ok(self.record(id)?.format)
  }

  /// Byte offset of the attribute from the start of the vertex buffer. Stays
  /// valid (relative to the released buffer) even after the vertex data is
  /// released.
  pub fn attribute_offset(&self, id: usize) -> Result<usize, MeshError> {
    Ok(self.record(id)?.offset)
  }

  pub fn attribute_stride(&self, id: usize) -> Result<u16, MeshError> {
    Ok(self.record(id)?.stride)
  }

  pub fn attribute_array_size(&self, id: usize) -> Result<u16, MeshError> {
    Ok(self.record(id)?.array_size)
  }

  pub fn attribute_format_of(
    &self,
    semantic: AttributeSemantic,
    occurrence: usize,
  ) -> Result<VertexFormat, MeshError> {
    self.attribute_format(self.attribute_id(semantic, occurrence)?)
  }

  pub fn attribute_offset_of(
    &self,
    semantic: AttributeSemantic,
    occurrence: usize,
  ) -> Result<usize, MeshError> {
    self.attribute_offset(self.attribute_id(semantic, occurrence)?)
  }

  pub fn attribute_stride_of(
    &self,
    semantic: AttributeSemantic,
    occurrence: usize,
  ) -> Result<u16, MeshError> {
    self.attribute_stride(self.attribute_id(semantic, occurrence)?)
  }

  pub fn attribute_array_size_of(
    &self,
    semantic: AttributeSemantic,
    occurrence: usize,
  ) -> Result<u16, MeshError> {
    self.attribute_array_size(self.attribute_id(semantic, occurrence)?)
  }

  // attribute data access

  fn record_bytes(&self, record: &AttributeRecord) -> StridedBytes<'_> {
    let data = self
      .vertex_data
      .as_slice()
      .get(record.offset..)
      .unwrap_or(&[]);
    // the range was proven contained at construction; after a vertex data
    // release the reported count is zero and any region fits
    StridedBytes::new(
      data,
      record.element_size,
      record.stride as usize,
      self.vertex_count as usize,
    )
    .unwrap_or_else(|_| StridedBytes::from_slice::<u8>(&[]))
  }

  /// Untyped view, one row of element bytes per vertex. Works for any
  /// format; implementation-specific elements expose the whole stride-sized
  /// slot.
  pub fn attribute_bytes(&self, id: usize) -> Result<StridedBytes<'_>, MeshError> {
    Ok(self.record_bytes(self.record(id)?))
  }

  pub fn attribute_bytes_of(
    &self,
    semantic: AttributeSemantic,
    occurrence: usize,
  ) -> Result<StridedBytes<'_>, MeshError> {
    self.attribute_bytes(self.attribute_id(semantic, occurrence)?)
  }

  pub fn mutable_attribute_bytes(&mut self, id: usize) -> Result<StridedBytesMut<'_>, MeshError> {
    let record = *self.record(id)?;
    let count = self.vertex_count as usize;
    let data = self
      .vertex_data
      .as_mut_slice()
      .ok_or(MeshError::VertexDataNotMutable)?;
    let data = match data.get_mut(record.offset..) {
      Some(data) => data,
      None => &mut [],
    };
    Ok(
      StridedBytesMut::new(data, record.element_size, record.stride as usize, count)
        .map_err(LayoutError::from)?,
    )
  }

  fn check_typed<T: VertexType>(
    &self,
    id: usize,
    array: bool,
  ) -> Result<AttributeRecord, MeshError> {
    let record = *self.record(id)?;
    if let VertexFormat::ImplementationSpecific(payload) = record.format {
      return Err(FormatError::ImplementationSpecific(payload).into());
    }
    if !array && record.array_size != 0 {
      return Err(MeshError::UnexpectedArrayAttribute {
        id,
        array_size: record.array_size,
      });
    }
    if array && record.array_size == 0 {
      return Err(MeshError::NotArrayAttribute { id });
    }
    if !formats_bit_compatible(record.format, T::FORMAT) {
      return Err(MeshError::WrongAttributeType {
        id,
        stored: record.format,
        requested: T::FORMAT,
      });
    }
    Ok(record)
  }

  /// Typed view of a non-array attribute. `T` has to match the stored format
  /// up to normalization (the bit pattern is the same).
  pub fn attribute<T: VertexType>(&self, id: usize) -> Result<TypedView<'_, T>, MeshError> {
    let record = self.check_typed::<T>(id, false)?;
    Ok(TypedView::wrap(self.record_bytes(&record)))
  }

  pub fn attribute_of<T: VertexType>(
    &self,
    semantic: AttributeSemantic,
    occurrence: usize,
  ) -> Result<TypedView<'_, T>, MeshError> {
    self.attribute(self.attribute_id(semantic, occurrence)?)
  }

  pub fn mutable_attribute<T: VertexType>(
    &mut self,
    id: usize,
  ) -> Result<TypedViewMut<'_, T>, MeshError> {
    self.check_typed::<T>(id, false)?;
    Ok(TypedViewMut::wrap(self.mutable_attribute_bytes(id)?))
  }

  /// Typed view of an array attribute, with the array size as the second
  /// axis.
  pub fn attribute_array<T: VertexType>(
    &self,
    id: usize,
  ) -> Result<TypedArrayView<'_, T>, MeshError> {
    let record = self.check_typed::<T>(id, true)?;
    Ok(TypedArrayView::wrap(
      self.record_bytes(&record),
      record.array_size as usize,
    ))
  }

  pub fn mutable_attribute_array<T: VertexType>(
    &mut self,
    id: usize,
  ) -> Result<TypedArrayViewMut<'_, T>, MeshError> {
    let record = self.check_typed::<T>(id, true)?;
    let array_size = record.array_size as usize;
    Ok(TypedArrayViewMut::wrap(
      self.mutable_attribute_bytes(id)?,
      array_size,
    ))
  }

  /// The attribute descriptor resolved to a direct view into this mesh's
  /// vertex buffer, never offset-only. For passing to consumers that need
  /// actual memory.
  pub fn attribute_data(&self, id: usize) -> Result<MeshAttributeData<'_>, MeshError> {
    let record = self.record(id)?;
    Ok(MeshAttributeData {
      semantic: Some(record.semantic),
      format: Some(record.format),
      array_size: record.array_size,
      stride: record.stride as i16,
      count: self.vertex_count,
      source: AttributeDataSource::View(
        self
          .vertex_data
          .as_slice()
          .get(record.offset..)
          .unwrap_or(&[]),
      ),
    })
  }

  /// The attribute descriptor as stored: offset-only, with the original
  /// element count even after the vertex data was released.
  pub fn attribute_data_raw(&self, id: usize) -> Result<MeshAttributeData<'static>, MeshError> {
    let record = self.record(id)?;
    Ok(MeshAttributeData {
      semantic: Some(record.semantic),
      format: Some(record.format),
      array_size: record.array_size,
      stride: record.stride as i16,
      count: record.count,
      source: AttributeDataSource::Offset(record.offset),
    })
  }

  // storage lifecycle

  /// Transfers the index buffer out. The mesh becomes non-indexed; a
  /// zero-length placeholder keeps offset arithmetic against "start of index
  /// data" valid.
  pub fn release_index_data(&mut self) -> BufferData<'a> {
    self.index = None;
    std::mem::replace(&mut self.index_data, BufferData::empty())
  }

  /// Transfers the vertex buffer out. The reported vertex count (and with it
  /// every attribute's reported element count) drops to zero; the attribute
  /// metadata itself stays queryable with its original extents through
  /// [`MeshData::attribute_data_raw`].
  pub fn release_vertex_data(&mut self) -> BufferData<'a> {
    self.vertex_count = 0;
    std::mem::replace(&mut self.vertex_data, BufferData::empty())
  }

  /// Transfers the attribute metadata out as offset-only descriptors.
  pub fn release_attribute_data(&mut self) -> Vec<MeshAttributeData<'static>> {
    let records = std::mem::take(&mut self.attributes);
    records
      .iter()
      .map(|record| MeshAttributeData {
        semantic: Some(record.semantic),
        format: Some(record.format),
        array_size: record.array_size,
        stride: record.stride as i16,
        count: record.count,
        source: AttributeDataSource::Offset(record.offset),
      })
      .collect()
  }
}

impl std::fmt::Debug for MeshData<'_> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("MeshData")
      .field("primitive", &self.primitive)
      .field("vertex_count", &self.vertex_count)
      .field("index", &self.index)
      .field("attributes", &self.attributes)
      .field("index_data_flags", &self.index_data.flags())
      .field("vertex_data_flags", &self.vertex_data.flags())
      .finish()
  }
}
