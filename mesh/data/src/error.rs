use crate::*;

/// Failures of the pure vertex format queries.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
  #[error("0x{0:08x} is not a valid vertex format value")]
  InvalidRaw(u32),
  #[error("implementation-specific format 0x{0:x} has no generic layout")]
  ImplementationSpecific(u32),
  #[error("component count {0} is not in 1..=4")]
  InvalidComponentCount(u32),
  #[error("{0:?} components have no normalized variant")]
  NoNormalizedVariant(VertexFormat),
  #[error("payload 0x{0:08x} does not fit into 31 bits")]
  PayloadOutOfRange(u32),
  #[error("{0:?} is not implementation-specific")]
  NotImplementationSpecific(VertexFormat),
}

/// Failures of the attribute semantic encoding.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticError {
  #[error("custom semantic index {0} does not fit below the custom range size 32768")]
  CustomIndexOutOfRange(u16),
  #[error("{0:?} is not a custom semantic")]
  NotCustom(AttributeSemantic),
  #[error("0x{0:04x} is not a valid attribute semantic value")]
  InvalidRaw(u16),
}

/// Failures of view and descriptor construction, detected before any
/// container-level invariant is looked at.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
  #[error(
    "view of {count} elements of {element_size} bytes with stride {stride} \
     does not fit into {len} bytes"
  )]
  ViewOutOfBounds {
    element_size: usize,
    stride: usize,
    count: usize,
    len: usize,
  },
  #[error("stride {0} does not fit into 16 bits")]
  StrideOutOfRange(isize),
  #[error("stride {stride} is not large enough to contain {format:?}")]
  StrideTooSmall { stride: usize, format: VertexFormat },
  #[error("{format:?} is not a valid format for {semantic:?}")]
  IncompatibleFormat {
    semantic: AttributeSemantic,
    format: VertexFormat,
  },
  #[error("{0:?} can't be an array attribute")]
  BuiltinArray(AttributeSemantic),
  #[error("array attributes can't use an implementation-specific format")]
  ImplementationSpecificArray,
  #[error("element size {got} does not match {expected} expected by the format")]
  ElementSizeMismatch { expected: usize, got: usize },
  #[error("index view size {len} does not correspond to {format:?}")]
  IndexSizeMismatch { len: usize, format: IndexFormat },
  #[error("{0} is not a valid index element size")]
  InvalidIndexElementSize(usize),
  #[error("index element dimension is not contiguous")]
  IndexViewNotContiguous,
  #[error("attribute is offset-only, supply the base vertex data to resolve it")]
  OffsetOnly,
  #[error("attribute already references its vertex data directly")]
  NotOffsetOnly,
  #[error("padding attribute has no data")]
  Padding,
  #[error("{0} elements do not fit into a 32 bit element count")]
  TooManyElements(usize),
  #[error("{len} typed elements do not divide into arrays of {array_size}")]
  ArraySizeDoesNotDivide { len: usize, array_size: u16 },
  #[error(transparent)]
  Format(#[from] FormatError),
}

/// Failures of mesh container construction and access.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshError {
  #[error(transparent)]
  Layout(#[from] LayoutError),
  #[error(transparent)]
  Format(#[from] FormatError),
  #[error(
    "index range [{offset}..{end}] is not contained in the {buffer_len} byte \
     index buffer"
  )]
  IndicesNotContained {
    offset: usize,
    end: usize,
    buffer_len: usize,
  },
  #[error("index data passed for a non-indexed mesh")]
  IndexDataForNonIndexed,
  #[error("vertex data passed for an attribute-less mesh")]
  VertexDataForAttributeless,
  #[error(
    "attribute {index} byte range [{begin}..{end}] is not contained in the \
     {buffer_len} byte vertex buffer"
  )]
  AttributeNotContained {
    index: usize,
    begin: usize,
    end: usize,
    buffer_len: usize,
  },
  #[error("attribute {index} has {count} vertices but {expected} expected")]
  VertexCountMismatch {
    index: usize,
    count: u32,
    expected: u32,
  },
  #[error("attribute {index} is a padding marker and doesn't specify anything")]
  PaddingAttribute { index: usize },
  #[error("attribute view for {index} is not derived from the vertex buffer")]
  AttributeViewForeign { index: usize },
  #[error("attribute index {id} out of range for {count} attributes")]
  AttributeOutOfRange { id: usize, count: usize },
  #[error("occurrence {occurrence} out of range for {count} {semantic:?} attributes")]
  OccurrenceOutOfRange {
    semantic: AttributeSemantic,
    occurrence: usize,
    count: usize,
  },
  #[error("the mesh is not indexed")]
  NotIndexed,
  #[error("index data is not mutable")]
  IndexDataNotMutable,
  #[error("vertex data is not mutable")]
  VertexDataNotMutable,
  #[error("indices are {actual:?} but {requested:?} was requested")]
  WrongIndexType {
    requested: IndexFormat,
    actual: IndexFormat,
  },
  #[error("attribute {id} is {stored:?} but {requested:?} was requested")]
  WrongAttributeType {
    id: usize,
    stored: VertexFormat,
    requested: VertexFormat,
  },
  #[error("attribute {id} is an array of {array_size}, use the array accessor")]
  UnexpectedArrayAttribute { id: usize, array_size: u16 },
  #[error("attribute {id} is not an array attribute")]
  NotArrayAttribute { id: usize },
  #[error(
    "vertex count can't be determined: the mesh has no attributes, no \
     explicit vertex count and no indices"
  )]
  UnknownVertexCount,
  #[error("expected a destination with {expected} elements but got {got}")]
  DestinationSize { expected: usize, got: usize },
}
