use crate::*;

/// Compile-time association between a concrete element type and its vertex
/// format, so typed descriptor constructors and typed accessors don't need a
/// runtime format argument.
pub trait VertexType: Pod {
  const FORMAT: VertexFormat;
}

macro_rules! impl_vertex_type {
  ($($ty:ty => $format:ident,)+) => {
    $(impl VertexType for $ty {
      const FORMAT: VertexFormat = VertexFormat::$format;
    })+
  };
}

impl_vertex_type! {
  f32 => Float,
  half::f16 => Half,
  f64 => Double,
  u8 => UnsignedByte,
  i8 => Byte,
  u16 => UnsignedShort,
  i16 => Short,
  u32 => UnsignedInt,
  i32 => Int,
  [f32; 2] => Vector2,
  [f32; 3] => Vector3,
  [f32; 4] => Vector4,
  [half::f16; 2] => Vector2h,
  [half::f16; 3] => Vector3h,
  [half::f16; 4] => Vector4h,
  [f64; 2] => Vector2d,
  [f64; 3] => Vector3d,
  [f64; 4] => Vector4d,
  [u8; 2] => Vector2ub,
  [u8; 3] => Vector3ub,
  [u8; 4] => Vector4ub,
  [i8; 2] => Vector2b,
  [i8; 3] => Vector3b,
  [i8; 4] => Vector4b,
  [u16; 2] => Vector2us,
  [u16; 3] => Vector3us,
  [u16; 4] => Vector4us,
  [i16; 2] => Vector2s,
  [i16; 3] => Vector3s,
  [i16; 4] => Vector4s,
  [u32; 2] => Vector2ui,
  [u32; 3] => Vector3ui,
  [u32; 4] => Vector4ui,
  [i32; 2] => Vector2i,
  [i32; 3] => Vector3i,
  [i32; 4] => Vector4i,
  glam::Vec2 => Vector2,
  glam::Vec3 => Vector3,
  glam::Vec4 => Vector4,
  glam::UVec2 => Vector2ui,
  glam::UVec3 => Vector3ui,
  glam::UVec4 => Vector4ui,
  glam::IVec2 => Vector2i,
  glam::IVec3 => Vector3i,
  glam::IVec4 => Vector4i,
}

/// 8 bit RGB color, conventionally treated as normalized.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Color3ub(pub [u8; 3]);

/// 8 bit RGBA color, conventionally treated as normalized.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Color4ub(pub [u8; 4]);

/// 16 bit RGBA color, conventionally treated as normalized.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Color4us(pub [u16; 4]);

impl_vertex_type! {
  Color3ub => Vector3ubNormalized,
  Color4ub => Vector4ubNormalized,
  Color4us => Vector4usNormalized,
}

/// Whether two formats share the exact bit pattern, i.e. differ at most in
/// normalization. A typed view of `[u8; 2]` may look at `Vector2ub` and
/// `Vector2ubNormalized` alike.
pub(crate) fn formats_bit_compatible(a: VertexFormat, b: VertexFormat) -> bool {
  if a == b {
    return true;
  }
  match (
    a.component_format(),
    b.component_format(),
    a.component_count(),
    b.component_count(),
  ) {
    (Ok(ca), Ok(cb), Ok(na), Ok(nb)) => ca == cb && na == nb,
    _ => false,
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn format_deduction() {
    assert_eq!(<[f32; 3]>::FORMAT, VertexFormat::Vector3);
    assert_eq!(glam::Vec2::FORMAT, VertexFormat::Vector2);
    assert_eq!(half::f16::FORMAT, VertexFormat::Half);
    assert_eq!(Color4ub::FORMAT, VertexFormat::Vector4ubNormalized);
  }

  #[test]
  fn bit_compatibility_ignores_normalization_only() {
    assert!(formats_bit_compatible(
      VertexFormat::Vector2ub,
      VertexFormat::Vector2ubNormalized
    ));
    assert!(!formats_bit_compatible(
      VertexFormat::Vector2ub,
      VertexFormat::Vector2b
    ));
    assert!(!formats_bit_compatible(
      VertexFormat::Vector2ub,
      VertexFormat::Vector3ub
    ));
    assert!(!formats_bit_compatible(
      VertexFormat::Vector2ub,
      VertexFormat::ImplementationSpecific(1)
    ));
  }
}
