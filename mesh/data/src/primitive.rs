use crate::*;

/// How consecutive (indexed) vertices assemble into primitives.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveTopology {
  PointList,
  LineList,
  LineStrip,
  #[default]
  TriangleList,
  TriangleStrip,
}
