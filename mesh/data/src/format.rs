use crate::*;

pub const IMPLEMENTATION_SPECIFIC_BIT: u32 = 0x8000_0000;

/// Scalar component of a vertex format.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Component {
  Float,
  Half,
  Double,
  UnsignedByte,
  Byte,
  UnsignedShort,
  Short,
  UnsignedInt,
  Int,
}

impl Component {
  const fn byte_size(self) -> usize {
    match self {
      Component::Float => 4,
      Component::Half => 2,
      Component::Double => 8,
      Component::UnsignedByte | Component::Byte => 1,
      Component::UnsignedShort | Component::Short => 2,
      Component::UnsignedInt | Component::Int => 4,
    }
  }

  /// Only the 8/16 bit integer components have a normalized counterpart.
  const fn has_normalized(self) -> bool {
    matches!(
      self,
      Component::UnsignedByte | Component::Byte | Component::UnsignedShort | Component::Short
    )
  }

  const fn scalar(self) -> VertexFormat {
    match self {
      Component::Float => VertexFormat::Float,
      Component::Half => VertexFormat::Half,
      Component::Double => VertexFormat::Double,
      Component::UnsignedByte => VertexFormat::UnsignedByte,
      Component::Byte => VertexFormat::Byte,
      Component::UnsignedShort => VertexFormat::UnsignedShort,
      Component::Short => VertexFormat::Short,
      Component::UnsignedInt => VertexFormat::UnsignedInt,
      Component::Int => VertexFormat::Int,
    }
  }

  /// Position of the (component, normalized) shape within one component-count
  /// block of the wire numbering. Normalized variants sit directly after their
  /// plain counterpart so one can be derived from the other arithmetically.
  const fn shape_index(self, normalized: bool) -> u32 {
    match (self, normalized) {
      (Component::Float, _) => 0,
      (Component::Half, _) => 1,
      (Component::Double, _) => 2,
      (Component::UnsignedByte, false) => 3,
      (Component::UnsignedByte, true) => 4,
      (Component::Byte, false) => 5,
      (Component::Byte, true) => 6,
      (Component::UnsignedShort, false) => 7,
      (Component::UnsignedShort, true) => 8,
      (Component::Short, false) => 9,
      (Component::Short, true) => 10,
      (Component::UnsignedInt, _) => 11,
      (Component::Int, _) => 12,
    }
  }
}

const SHAPES_PER_COUNT: u32 = 13;

macro_rules! vertex_formats {
  ($(($variant:ident, $component:ident, $count:literal, $normalized:literal),)+) => {
    /// Vertex attribute format.
    ///
    /// Suffix convention follows the usual GPU shorthand: no suffix is float,
    /// `h` half, `d` double, `ub`/`b` unsigned/signed byte, `us`/`s`
    /// unsigned/signed short, `ui`/`i` unsigned/signed int. `Normalized`
    /// integer variants map the full integer range affinely to [0, 1]
    /// (unsigned) or [-1, 1] (signed).
    ///
    /// The generic variants occupy the stable wire values `1..=52` exposed by
    /// [`VertexFormat::to_raw`]; value `0` is reserved invalid. The
    /// [`VertexFormat::ImplementationSpecific`] escape hatch carries an opaque
    /// externally-defined 31 bit payload under the top bit and fails all
    /// generic layout queries.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum VertexFormat {
      $($variant,)+
      ImplementationSpecific(u32),
    }

    const GENERIC_FORMATS: &[VertexFormat] = &[$(VertexFormat::$variant,)+];

    impl VertexFormat {
      const fn decompose(self) -> Option<(Component, u32, bool)> {
        match self {
          $(Self::$variant => Some((Component::$component, $count, $normalized)),)+
          Self::ImplementationSpecific(_) => None,
        }
      }

      /// The stable numeric identity of the format, for wire use.
      pub const fn to_raw(self) -> u32 {
        match self {
          $(Self::$variant =>
            ($count - 1) * SHAPES_PER_COUNT + Component::$component.shape_index($normalized) + 1,)+
          Self::ImplementationSpecific(v) => IMPLEMENTATION_SPECIFIC_BIT | v,
        }
      }
    }
  };
}

vertex_formats! {
  (Float, Float, 1, false),
  (Half, Half, 1, false),
  (Double, Double, 1, false),
  (UnsignedByte, UnsignedByte, 1, false),
  (UnsignedByteNormalized, UnsignedByte, 1, true),
  (Byte, Byte, 1, false),
  (ByteNormalized, Byte, 1, true),
  (UnsignedShort, UnsignedShort, 1, false),
  (UnsignedShortNormalized, UnsignedShort, 1, true),
  (Short, Short, 1, false),
  (ShortNormalized, Short, 1, true),
  (UnsignedInt, UnsignedInt, 1, false),
  (Int, Int, 1, false),
  (Vector2, Float, 2, false),
  (Vector2h, Half, 2, false),
  (Vector2d, Double, 2, false),
  (Vector2ub, UnsignedByte, 2, false),
  (Vector2ubNormalized, UnsignedByte, 2, true),
  (Vector2b, Byte, 2, false),
  (Vector2bNormalized, Byte, 2, true),
  (Vector2us, UnsignedShort, 2, false),
  (Vector2usNormalized, UnsignedShort, 2, true),
  (Vector2s, Short, 2, false),
  (Vector2sNormalized, Short, 2, true),
  (Vector2ui, UnsignedInt, 2, false),
  (Vector2i, Int, 2, false),
  (Vector3, Float, 3, false),
  (Vector3h, Half, 3, false),
  (Vector3d, Double, 3, false),
  (Vector3ub, UnsignedByte, 3, false),
  (Vector3ubNormalized, UnsignedByte, 3, true),
  (Vector3b, Byte, 3, false),
  (Vector3bNormalized, Byte, 3, true),
  (Vector3us, UnsignedShort, 3, false),
  (Vector3usNormalized, UnsignedShort, 3, true),
  (Vector3s, Short, 3, false),
  (Vector3sNormalized, Short, 3, true),
  (Vector3ui, UnsignedInt, 3, false),
  (Vector3i, Int, 3, false),
  (Vector4, Float, 4, false),
  (Vector4h, Half, 4, false),
  (Vector4d, Double, 4, false),
  (Vector4ub, UnsignedByte, 4, false),
  (Vector4ubNormalized, UnsignedByte, 4, true),
  (Vector4b, Byte, 4, false),
  (Vector4bNormalized, Byte, 4, true),
  (Vector4us, UnsignedShort, 4, false),
  (Vector4usNormalized, UnsignedShort, 4, true),
  (Vector4s, Short, 4, false),
  (Vector4sNormalized, Short, 4, true),
  (Vector4ui, UnsignedInt, 4, false),
  (Vector4i, Int, 4, false),
}

impl VertexFormat {
  fn parts(self) -> Result<(Component, u32, bool), FormatError> {
    match self.decompose() {
      Some(parts) => Ok(parts),
      None => Err(FormatError::ImplementationSpecific(
        self.to_raw() & !IMPLEMENTATION_SPECIFIC_BIT,
      )),
    }
  }

  /// Byte size of the whole (vector) element.
  pub fn size(self) -> Result<usize, FormatError> {
    let (component, count, _) = self.parts()?;
    Ok(component.byte_size() * count as usize)
  }

  pub fn component_count(self) -> Result<u32, FormatError> {
    Ok(self.parts()?.1)
  }

  /// Scalar base of the format with vector arity and normalization stripped,
  /// e.g. `Vector3bNormalized` gives `Byte`.
  pub fn component_format(self) -> Result<VertexFormat, FormatError> {
    Ok(self.parts()?.0.scalar())
  }

  /// Whether the integer range maps affinely to [0, 1] / [-1, 1]. Floating
  /// point formats are never normalized, even when conventionally
  /// range-limited.
  pub fn is_normalized(self) -> Result<bool, FormatError> {
    Ok(self.parts()?.2)
  }

  /// Builds a format with `count` components of `base`'s component type,
  /// normalized if requested. Inverse of the `component_format` /
  /// `component_count` / `is_normalized` triple.
  pub fn assemble(base: VertexFormat, count: u32, normalized: bool) -> Result<Self, FormatError> {
    let (component, _, _) = base.parts()?;
    if !(1..=4).contains(&count) {
      return Err(FormatError::InvalidComponentCount(count));
    }
    if normalized && !component.has_normalized() {
      return Err(FormatError::NoNormalizedVariant(component.scalar()));
    }
    Self::from_raw((count - 1) * SHAPES_PER_COUNT + component.shape_index(normalized) + 1)
  }

  /// Moves a caller-defined identifier into the format space under the top
  /// bit.
  pub fn implementation_specific(payload: u32) -> Result<Self, FormatError> {
    if payload & IMPLEMENTATION_SPECIFIC_BIT != 0 {
      return Err(FormatError::PayloadOutOfRange(payload));
    }
    Ok(Self::ImplementationSpecific(payload))
  }

  pub fn implementation_specific_payload(self) -> Result<u32, FormatError> {
    match self {
      Self::ImplementationSpecific(v) => Ok(v),
      _ => Err(FormatError::NotImplementationSpecific(self)),
    }
  }

  pub const fn is_implementation_specific(self) -> bool {
    matches!(self, Self::ImplementationSpecific(_))
  }

  pub fn from_raw(raw: u32) -> Result<Self, FormatError> {
    if raw & IMPLEMENTATION_SPECIFIC_BIT != 0 {
      return Ok(Self::ImplementationSpecific(raw & !IMPLEMENTATION_SPECIFIC_BIT));
    }
    match raw.checked_sub(1).and_then(|i| GENERIC_FORMATS.get(i as usize)) {
      Some(format) => Ok(*format),
      None => Err(FormatError::InvalidRaw(raw)),
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn wire_values_are_stable_and_invertible() {
    for (i, format) in GENERIC_FORMATS.iter().enumerate() {
      let raw = i as u32 + 1;
      assert_eq!(format.to_raw(), raw);
      assert_eq!(VertexFormat::from_raw(raw), Ok(*format));
    }
    assert_eq!(
      VertexFormat::from_raw(0),
      Err(FormatError::InvalidRaw(0))
    );
    assert_eq!(
      VertexFormat::from_raw(53),
      Err(FormatError::InvalidRaw(53))
    );
  }

  #[test]
  fn normalized_variant_is_adjacent() {
    for format in GENERIC_FORMATS {
      if format.is_normalized().unwrap() {
        let plain = VertexFormat::from_raw(format.to_raw() - 1).unwrap();
        assert_eq!(
          VertexFormat::assemble(
            plain,
            format.component_count().unwrap(),
            false
          )
          .unwrap(),
          plain
        );
      }
    }
  }

  #[test]
  fn assemble_roundtrip() {
    for format in GENERIC_FORMATS {
      assert_eq!(
        VertexFormat::assemble(
          format.component_format().unwrap(),
          format.component_count().unwrap(),
          format.is_normalized().unwrap()
        ),
        Ok(*format)
      );
    }
  }

  #[test]
  fn layout_queries() {
    assert_eq!(VertexFormat::Vector3ubNormalized.size(), Ok(3));
    assert_eq!(VertexFormat::Vector2d.size(), Ok(16));
    assert_eq!(VertexFormat::Vector4h.size(), Ok(8));
    assert_eq!(VertexFormat::Vector3ubNormalized.component_count(), Ok(3));
    assert_eq!(
      VertexFormat::Vector3bNormalized.component_format(),
      Ok(VertexFormat::Byte)
    );
    assert_eq!(VertexFormat::Vector2h.component_format(), Ok(VertexFormat::Half));
    assert_eq!(VertexFormat::Float.is_normalized(), Ok(false));
    assert_eq!(VertexFormat::Vector2sNormalized.is_normalized(), Ok(true));
  }

  #[test]
  fn assemble_failures() {
    assert_eq!(
      VertexFormat::assemble(VertexFormat::Float, 0, false),
      Err(FormatError::InvalidComponentCount(0))
    );
    assert_eq!(
      VertexFormat::assemble(VertexFormat::Float, 5, false),
      Err(FormatError::InvalidComponentCount(5))
    );
    assert_eq!(
      VertexFormat::assemble(VertexFormat::Vector2, 3, true),
      Err(FormatError::NoNormalizedVariant(VertexFormat::Float))
    );
    assert_eq!(
      VertexFormat::assemble(VertexFormat::Vector3ui, 2, true),
      Err(FormatError::NoNormalizedVariant(VertexFormat::UnsignedInt))
    );
    assert_eq!(
      VertexFormat::assemble(VertexFormat::ImplementationSpecific(3), 2, false),
      Err(FormatError::ImplementationSpecific(3))
    );
  }

  #[test]
  fn implementation_specific_wrapping() {
    let format = VertexFormat::implementation_specific(0x3abc).unwrap();
    assert!(format.is_implementation_specific());
    assert_eq!(format.implementation_specific_payload(), Ok(0x3abc));
    assert_eq!(format.to_raw(), 0x8000_3abc);
    assert_eq!(VertexFormat::from_raw(0x8000_3abc), Ok(format));

    assert_eq!(
      VertexFormat::implementation_specific(0x8000_0001),
      Err(FormatError::PayloadOutOfRange(0x8000_0001))
    );
    assert_eq!(
      VertexFormat::Vector3.implementation_specific_payload(),
      Err(FormatError::NotImplementationSpecific(VertexFormat::Vector3))
    );
    assert_eq!(
      format.size(),
      Err(FormatError::ImplementationSpecific(0x3abc))
    );
    assert_eq!(
      format.component_count(),
      Err(FormatError::ImplementationSpecific(0x3abc))
    );
  }

  #[test]
  fn serde_name_roundtrip() {
    let json = serde_json::to_string(&VertexFormat::Vector2ubNormalized).unwrap();
    assert_eq!(json, "\"Vector2ubNormalized\"");
    let back: VertexFormat = serde_json::from_str(&json).unwrap();
    assert_eq!(back, VertexFormat::Vector2ubNormalized);
  }
}
