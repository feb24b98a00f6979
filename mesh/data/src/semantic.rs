use crate::*;

/// First raw value of the custom semantic range.
pub const CUSTOM_SEMANTIC_BASE: u16 = 0x8000;

/// Vertex attribute semantic name.
///
/// The builtin semantics are restricted to a fixed set of known-compatible
/// formats (see [`AttributeSemantic::is_format_compatible`]); a custom
/// semantic accepts any format and may be array-valued. Raw 16 bit values at
/// or above [`CUSTOM_SEMANTIC_BASE`] encode `Custom(value - base)`, so the
/// custom index encoding is invertible.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttributeSemantic {
  /// XY or XYZ vertex positions.
  Positions,

  /// XYZ vertex normals.
  Normals,

  /// UV texture coordinates.
  TexCoords,

  /// RGB or RGBA vertex color.
  Colors,

  Custom(u16),
}

impl AttributeSemantic {
  pub fn custom(index: u16) -> Result<Self, SemanticError> {
    if index >= CUSTOM_SEMANTIC_BASE {
      return Err(SemanticError::CustomIndexOutOfRange(index));
    }
    Ok(Self::Custom(index))
  }

  pub fn custom_index(self) -> Result<u16, SemanticError> {
    match self {
      Self::Custom(index) => Ok(index),
      _ => Err(SemanticError::NotCustom(self)),
    }
  }

  pub const fn is_custom(self) -> bool {
    matches!(self, Self::Custom(_))
  }

  pub const fn to_raw(self) -> u16 {
    match self {
      Self::Positions => 1,
      Self::Normals => 2,
      Self::TexCoords => 3,
      Self::Colors => 4,
      Self::Custom(index) => CUSTOM_SEMANTIC_BASE + index,
    }
  }

  pub fn from_raw(raw: u16) -> Result<Self, SemanticError> {
    match raw {
      1 => Ok(Self::Positions),
      2 => Ok(Self::Normals),
      3 => Ok(Self::TexCoords),
      4 => Ok(Self::Colors),
      raw if raw >= CUSTOM_SEMANTIC_BASE => Ok(Self::Custom(raw - CUSTOM_SEMANTIC_BASE)),
      raw => Err(SemanticError::InvalidRaw(raw)),
    }
  }

  /// The fixed builtin compatibility table. Custom semantics and
  /// implementation-specific formats bypass it entirely.
  pub fn is_format_compatible(self, format: VertexFormat) -> bool {
    if self.is_custom() || format.is_implementation_specific() {
      return true;
    }
    // generic formats always answer the layout queries
    let component = format.component_format().unwrap_or(format);
    let count = format.component_count().unwrap_or(0);
    let normalized = format.is_normalized().unwrap_or(false);

    use VertexFormat::*;
    match self {
      Self::Positions => {
        matches!(count, 2 | 3)
          && matches!(
            component,
            Float | Half | UnsignedByte | Byte | UnsignedShort | Short
          )
      }
      Self::Normals => {
        count == 3
          && (matches!(component, Float | Half)
            || (normalized && matches!(component, Byte | Short)))
      }
      Self::Colors => {
        matches!(count, 3 | 4)
          && (matches!(component, Float | Half)
            || (normalized && matches!(component, UnsignedByte | UnsignedShort)))
      }
      Self::TexCoords => {
        count == 2
          && matches!(
            component,
            Float | Half | UnsignedByte | Byte | UnsignedShort | Short
          )
      }
      Self::Custom(_) => true,
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn custom_encoding_is_invertible() {
    for index in [0u16, 1, 17, 0x7fff] {
      let semantic = AttributeSemantic::custom(index).unwrap();
      assert!(semantic.is_custom());
      assert_eq!(semantic.custom_index(), Ok(index));
      assert_eq!(
        AttributeSemantic::from_raw(semantic.to_raw()),
        Ok(semantic)
      );
    }
    assert_eq!(
      AttributeSemantic::custom(0x8000),
      Err(SemanticError::CustomIndexOutOfRange(0x8000))
    );
    assert!(!AttributeSemantic::Positions.is_custom());
    assert_eq!(
      AttributeSemantic::Normals.custom_index(),
      Err(SemanticError::NotCustom(AttributeSemantic::Normals))
    );
    assert_eq!(
      AttributeSemantic::from_raw(0),
      Err(SemanticError::InvalidRaw(0))
    );
    assert_eq!(
      AttributeSemantic::from_raw(5),
      Err(SemanticError::InvalidRaw(5))
    );
  }

  #[test]
  fn builtin_format_compatibility() {
    use AttributeSemantic::*;
    use VertexFormat as F;
    assert!(Positions.is_format_compatible(F::Vector3));
    assert!(Positions.is_format_compatible(F::Vector2h));
    assert!(Positions.is_format_compatible(F::Vector3sNormalized));
    assert!(Positions.is_format_compatible(F::Vector2ub));
    assert!(!Positions.is_format_compatible(F::Vector4));
    assert!(!Positions.is_format_compatible(F::Float));
    assert!(!Positions.is_format_compatible(F::Vector3d));

    assert!(Normals.is_format_compatible(F::Vector3));
    assert!(Normals.is_format_compatible(F::Vector3bNormalized));
    assert!(!Normals.is_format_compatible(F::Vector3b));
    assert!(!Normals.is_format_compatible(F::Vector3ubNormalized));
    assert!(!Normals.is_format_compatible(F::Vector2));

    assert!(Colors.is_format_compatible(F::Vector4));
    assert!(Colors.is_format_compatible(F::Vector3h));
    assert!(Colors.is_format_compatible(F::Vector4ubNormalized));
    assert!(!Colors.is_format_compatible(F::Vector4ub));
    assert!(!Colors.is_format_compatible(F::Vector4bNormalized));

    assert!(TexCoords.is_format_compatible(F::Vector2));
    assert!(TexCoords.is_format_compatible(F::Vector2usNormalized));
    assert!(!TexCoords.is_format_compatible(F::Vector3));

    // custom semantics and implementation-specific formats bypass the table
    assert!(Custom(0).is_format_compatible(F::Vector3d));
    assert!(Normals.is_format_compatible(F::ImplementationSpecific(7)));
  }
}
