//! Combines per-attribute indexed meshes into a single-index mesh.
//!
//! Formats like OBJ index positions, normals and texture coordinates
//! separately; GPUs want one index buffer. The combination treats each tuple
//! of per-mesh indices as one prospective vertex, keeps the first occurrence
//! of every distinct tuple and rewrites the index buffer to point at the
//! deduplicated, interleaved vertex data.

use std::collections::{hash_map::Entry, HashMap};

use mesh_data::{
  IndexFormat, MeshAttributeData, MeshData, MeshError, MeshIndexData, PrimitiveTopology,
};
use smallvec::SmallVec;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineError {
  #[error("no meshes to combine")]
  Empty,
  #[error("mesh {0} is not indexed")]
  NotIndexed(usize),
  #[error("mesh {index} has primitive {got:?}, expected {expected:?}")]
  PrimitiveMismatch {
    index: usize,
    expected: PrimitiveTopology,
    got: PrimitiveTopology,
  },
  #[error("mesh {index} has {got} indices, expected {expected}")]
  IndexCountMismatch {
    index: usize,
    expected: usize,
    got: usize,
  },
  #[error("index {index_value} of mesh {index} is out of range for {vertex_count} vertices")]
  IndexOutOfRange {
    index: usize,
    index_value: u32,
    vertex_count: u32,
  },
  #[error("extra layout entry {0} is not a padding marker")]
  NotPadding(usize),
  #[error("negative padding would alias the combined layout")]
  NegativePadding,
  #[error(transparent)]
  Mesh(#[from] MeshError),
}

/// Interleaved slot layout of one source attribute within the combined
/// vertex.
struct Slot {
  mesh: usize,
  id: usize,
  offset: usize,
  size: usize,
}

/// Combines meshes indexed independently of each other into one mesh with a
/// single index buffer. All attributes end up interleaved, tightly packed in
/// mesh and attribute order; the output indices are 32 bit.
///
/// Every input has to be indexed with the same index count and primitive.
/// Index tuples are deduplicated by first occurrence, so combining a single
/// mesh with itself is a way to remove duplicate vertices.
pub fn combine_indexed_attributes(
  meshes: &[&MeshData<'_>],
) -> Result<MeshData<'static>, CombineError> {
  combine_indexed_attributes_extra(meshes, &[])
}

/// Like [`combine_indexed_attributes`], but with extra padding markers
/// appended to the combined vertex layout. Each entry has to be a
/// [`MeshAttributeData::padding`] with a non-negative stride; its byte count
/// is zero-filled after the interleaved attributes, for alignment.
pub fn combine_indexed_attributes_extra(
  meshes: &[&MeshData<'_>],
  extra: &[MeshAttributeData<'_>],
) -> Result<MeshData<'static>, CombineError> {
  let first = *meshes.first().ok_or(CombineError::Empty)?;
  let primitive = first.primitive();
  let index_count = first.index_count().map_err(|_| CombineError::NotIndexed(0))?;

  let mut index_arrays = Vec::with_capacity(meshes.len());
  for (i, mesh) in meshes.iter().enumerate() {
    if !mesh.is_indexed() {
      return Err(CombineError::NotIndexed(i));
    }
    if mesh.primitive() != primitive {
      return Err(CombineError::PrimitiveMismatch {
        index: i,
        expected: primitive,
        got: mesh.primitive(),
      });
    }
    let count = mesh.index_count()?;
    if count != index_count {
      return Err(CombineError::IndexCountMismatch {
        index: i,
        expected: index_count,
        got: count,
      });
    }
    let indices = mesh.indices_as_array()?;
    if let Some(&stray) = indices.iter().find(|&&v| v >= mesh.vertex_count()) {
      return Err(CombineError::IndexOutOfRange {
        index: i,
        index_value: stray,
        vertex_count: mesh.vertex_count(),
      });
    }
    index_arrays.push(indices);
  }

  // combined vertex layout: all attributes of all meshes in order, tightly
  // packed, then the requested padding
  let mut slots: SmallVec<[Slot; 8]> = SmallVec::new();
  let mut stride = 0;
  for (mesh_index, mesh) in meshes.iter().enumerate() {
    for id in 0..mesh.attribute_count() {
      let size = mesh.attribute_bytes(id)?.element_size();
      slots.push(Slot {
        mesh: mesh_index,
        id,
        offset: stride,
        size,
      });
      stride += size;
    }
  }
  for (i, entry) in extra.iter().enumerate() {
    if !entry.is_padding() {
      return Err(CombineError::NotPadding(i));
    }
    if entry.stride() < 0 {
      return Err(CombineError::NegativePadding);
    }
    stride += entry.stride() as usize;
  }

  // first-occurrence dedup of per-mesh index tuples
  let mut seen: HashMap<SmallVec<[u32; 4]>, u32> = HashMap::with_capacity(index_count);
  let mut combined_indices: Vec<u32> = Vec::with_capacity(index_count);
  let mut unique_tuples: Vec<SmallVec<[u32; 4]>> = Vec::new();
  for i in 0..index_count {
    let tuple: SmallVec<[u32; 4]> = index_arrays.iter().map(|indices| indices[i]).collect();
    let combined = match seen.entry(tuple) {
      Entry::Occupied(entry) => *entry.get(),
      Entry::Vacant(entry) => {
        let next = unique_tuples.len() as u32;
        unique_tuples.push(entry.key().clone());
        entry.insert(next);
        next
      }
    };
    combined_indices.push(combined);
  }

  log::debug!(
    "combined {} meshes, {} indices, {} unique vertices",
    meshes.len(),
    index_count,
    unique_tuples.len()
  );

  // gather the source elements of every unique tuple into the interleaved
  // buffer; untouched padding bytes stay zero
  let mut vertex_data = vec![0u8; unique_tuples.len() * stride];
  for slot in &slots {
    let source = meshes[slot.mesh].attribute_bytes(slot.id)?;
    for (vertex, tuple) in unique_tuples.iter().enumerate() {
      let original = tuple[slot.mesh] as usize;
      let destination = vertex * stride + slot.offset;
      // every index was range-checked against its mesh's vertex count
      let element = source.get(original).ok_or(CombineError::IndexOutOfRange {
        index: slot.mesh,
        index_value: tuple[slot.mesh],
        vertex_count: meshes[slot.mesh].vertex_count(),
      })?;
      vertex_data[destination..destination + slot.size].copy_from_slice(element);
    }
  }

  let mut attributes = Vec::with_capacity(slots.len());
  for slot in &slots {
    let mesh = meshes[slot.mesh];
    attributes.push(
      MeshAttributeData::offset_only(
        mesh.attribute_semantic(slot.id)?,
        mesh.attribute_format(slot.id)?,
        slot.offset,
        unique_tuples.len() as u32,
        stride,
        mesh.attribute_array_size(slot.id)?,
      )
      .map_err(MeshError::from)?,
    );
  }

  let index_data: Vec<u8> = bytemuck::cast_slice(&combined_indices).to_vec();
  Ok(MeshData::new(
    primitive,
    index_data.into(),
    MeshIndexData::offset_only(IndexFormat::UnsignedInt, 0, combined_indices.len()),
    vertex_data.into(),
    attributes,
  )?)
}
