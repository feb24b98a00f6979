use crate::*;

use glam::{Vec2, Vec3, Vec4};

/// Decodes one stored element into float components, one per stored
/// component. Unsigned normalized formats map to [0, 1], signed normalized to
/// [-1, 1] with the most negative value clamped, unnormalized integers and
/// doubles cast.
fn decode_components(format: VertexFormat, bytes: &[u8], out: &mut [f32]) {
  // format is generic here, the layout queries can't fail
  let scalar = format.component_format().unwrap_or(VertexFormat::Float);
  let normalized = format.is_normalized().unwrap_or(false);
  let size = match scalar.size() {
    Ok(size) => size,
    Err(_) => return,
  };
  for (i, value) in out.iter_mut().enumerate() {
    let chunk = &bytes[i * size..(i + 1) * size];
    *value = match (scalar, normalized) {
      (VertexFormat::Float, _) => bytemuck::pod_read_unaligned::<f32>(chunk),
      (VertexFormat::Half, _) => bytemuck::pod_read_unaligned::<half::f16>(chunk).to_f32(),
      (VertexFormat::Double, _) => bytemuck::pod_read_unaligned::<f64>(chunk) as f32,
      (VertexFormat::UnsignedByte, true) => chunk[0] as f32 / u8::MAX as f32,
      (VertexFormat::UnsignedByte, false) => chunk[0] as f32,
      (VertexFormat::Byte, true) => (chunk[0] as i8 as f32 / i8::MAX as f32).max(-1.0),
      (VertexFormat::Byte, false) => chunk[0] as i8 as f32,
      (VertexFormat::UnsignedShort, true) => {
        bytemuck::pod_read_unaligned::<u16>(chunk) as f32 / u16::MAX as f32
      }
      (VertexFormat::UnsignedShort, false) => bytemuck::pod_read_unaligned::<u16>(chunk) as f32,
      (VertexFormat::Short, true) => {
        (bytemuck::pod_read_unaligned::<i16>(chunk) as f32 / i16::MAX as f32).max(-1.0)
      }
      (VertexFormat::Short, false) => bytemuck::pod_read_unaligned::<i16>(chunk) as f32,
      (VertexFormat::UnsignedInt, _) => bytemuck::pod_read_unaligned::<u32>(chunk) as f32,
      (VertexFormat::Int, _) => bytemuck::pod_read_unaligned::<i32>(chunk) as f32,
      _ => 0.0,
    };
  }
}

impl MeshData<'_> {
  /// Indices widened to 32 bit, independent of the stored index format.
  pub fn indices_as_array(&self) -> Result<Vec<u32>, MeshError> {
    let mut out = vec![0; self.index_count()?];
    self.indices_into(&mut out)?;
    Ok(out)
  }

  pub fn indices_into(&self, out: &mut [u32]) -> Result<(), MeshError> {
    let format = self.index_format()?;
    let view = self.indices_bytes()?;
    if out.len() != view.count() {
      return Err(MeshError::DestinationSize {
        expected: view.count(),
        got: out.len(),
      });
    }
    for (value, bytes) in out.iter_mut().zip(view.iter()) {
      *value = match format {
        IndexFormat::UnsignedByte => bytes[0] as u32,
        IndexFormat::UnsignedShort => bytemuck::pod_read_unaligned::<u16>(bytes) as u32,
        IndexFormat::UnsignedInt => bytemuck::pod_read_unaligned::<u32>(bytes),
      };
    }
    Ok(())
  }

  fn decode_into(
    &self,
    semantic: AttributeSemantic,
    occurrence: usize,
    component_count: usize,
    out: &mut [f32],
  ) -> Result<VertexFormat, MeshError> {
    let id = self.attribute_id(semantic, occurrence)?;
    let format = self.attribute_format(id)?;
    // array attributes are custom-only and builtin lookups can't reach them,
    // implementation-specific formats fail the component query below
    let stored_count = format.component_count()? as usize;
    let view = self.attribute_bytes(id)?;
    if out.len() != view.count() * component_count {
      return Err(MeshError::DestinationSize {
        expected: view.count() * component_count,
        got: out.len(),
      });
    }
    let copied = stored_count.min(component_count);
    for (row, bytes) in out.chunks_exact_mut(component_count).zip(view.iter()) {
      decode_components(format, bytes, &mut row[..copied]);
      row[copied..].fill(0.0);
    }
    Ok(format)
  }

  /// 2D positions as float vectors. 3D positions are truncated to two
  /// components.
  pub fn positions_2d_as_array(&self, occurrence: usize) -> Result<Vec<Vec2>, MeshError> {
    let mut out = vec![Vec2::ZERO; self.vertex_count() as usize];
    self.positions_2d_into(occurrence, &mut out)?;
    Ok(out)
  }

  pub fn positions_2d_into(&self, occurrence: usize, out: &mut [Vec2]) -> Result<(), MeshError> {
    self.decode_into(
      AttributeSemantic::Positions,
      occurrence,
      2,
      bytemuck::cast_slice_mut(out),
    )?;
    Ok(())
  }

  /// 3D positions as float vectors. 2D positions get a zero z component.
  pub fn positions_3d_as_array(&self, occurrence: usize) -> Result<Vec<Vec3>, MeshError> {
    let mut out = vec![Vec3::ZERO; self.vertex_count() as usize];
    self.positions_3d_into(occurrence, &mut out)?;
    Ok(out)
  }

  pub fn positions_3d_into(&self, occurrence: usize, out: &mut [Vec3]) -> Result<(), MeshError> {
    self.decode_into(
      AttributeSemantic::Positions,
      occurrence,
      3,
      bytemuck::cast_slice_mut(out),
    )?;
    Ok(())
  }

  pub fn normals_as_array(&self, occurrence: usize) -> Result<Vec<Vec3>, MeshError> {
    let mut out = vec![Vec3::ZERO; self.vertex_count() as usize];
    self.normals_into(occurrence, &mut out)?;
    Ok(out)
  }

  pub fn normals_into(&self, occurrence: usize, out: &mut [Vec3]) -> Result<(), MeshError> {
    self.decode_into(
      AttributeSemantic::Normals,
      occurrence,
      3,
      bytemuck::cast_slice_mut(out),
    )?;
    Ok(())
  }

  pub fn texture_coordinates_2d_as_array(
    &self,
    occurrence: usize,
  ) -> Result<Vec<Vec2>, MeshError> {
    let mut out = vec![Vec2::ZERO; self.vertex_count() as usize];
    self.texture_coordinates_2d_into(occurrence, &mut out)?;
    Ok(out)
  }

  pub fn texture_coordinates_2d_into(
    &self,
    occurrence: usize,
    out: &mut [Vec2],
  ) -> Result<(), MeshError> {
    self.decode_into(
      AttributeSemantic::TexCoords,
      occurrence,
      2,
      bytemuck::cast_slice_mut(out),
    )?;
    Ok(())
  }

  /// RGBA colors as float vectors. Three-component colors get an opaque
  /// alpha of one.
  pub fn colors_as_array(&self, occurrence: usize) -> Result<Vec<Vec4>, MeshError> {
    let mut out = vec![Vec4::ZERO; self.vertex_count() as usize];
    self.colors_into(occurrence, &mut out)?;
    Ok(out)
  }

  pub fn colors_into(&self, occurrence: usize, out: &mut [Vec4]) -> Result<(), MeshError> {
    let format = self.decode_into(
      AttributeSemantic::Colors,
      occurrence,
      4,
      bytemuck::cast_slice_mut(out),
    )?;
    if format.component_count()? == 3 {
      for color in out.iter_mut() {
        color.w = 1.0;
      }
    }
    Ok(())
  }
}
