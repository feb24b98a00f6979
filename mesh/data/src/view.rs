use crate::*;

/// Type-erased strided view over const bytes: `count` rows of `element_size`
/// contiguous bytes, rows `stride` bytes apart.
///
/// Rows may overlap (negative-padding aliasing is a legal layout), the
/// mutable counterpart [`StridedBytesMut`] forbids that.
#[derive(Copy, Clone, Debug)]
pub struct StridedBytes<'a> {
  data: &'a [u8],
  element_size: usize,
  stride: usize,
  count: usize,
}

pub(crate) fn required_len(element_size: usize, stride: usize, count: usize) -> Option<usize> {
  if count == 0 {
    return Some(0);
  }
  stride.checked_mul(count - 1)?.checked_add(element_size)
}

impl<'a> StridedBytes<'a> {
  pub fn new(
    data: &'a [u8],
    element_size: usize,
    stride: usize,
    count: usize,
  ) -> Result<Self, LayoutError> {
    let out_of_bounds = LayoutError::ViewOutOfBounds {
      element_size,
      stride,
      count,
      len: data.len(),
    };
    match required_len(element_size, stride, count) {
      Some(required) if required <= data.len() => Ok(Self {
        data,
        element_size,
        stride,
        count,
      }),
      _ => Err(out_of_bounds),
    }
  }

  pub fn from_slice<T: Pod>(slice: &'a [T]) -> Self {
    let element_size = std::mem::size_of::<T>();
    Self {
      data: bytemuck::cast_slice(slice),
      element_size,
      stride: element_size,
      count: slice.len(),
    }
  }

  pub fn element_size(&self) -> usize {
    self.element_size
  }

  pub fn stride(&self) -> usize {
    self.stride
  }

  pub fn count(&self) -> usize {
    self.count
  }

  pub fn is_empty(&self) -> bool {
    self.count == 0
  }

  pub fn is_contiguous(&self) -> bool {
    self.stride == self.element_size || self.count <= 1
  }

  /// The underlying bytes, from the first element to the end of the region
  /// the view was constructed over.
  pub fn bytes(&self) -> &'a [u8] {
    self.data
  }

  pub fn get(&self, index: usize) -> Option<&'a [u8]> {
    if index >= self.count {
      return None;
    }
    let begin = index * self.stride;
    Some(&self.data[begin..begin + self.element_size])
  }

  /// Unaligned typed read, interleaved data has no alignment guarantee.
  pub fn read<T: Pod>(&self, index: usize) -> Option<T> {
    debug_assert_eq!(std::mem::size_of::<T>(), self.element_size);
    self.get(index).map(bytemuck::pod_read_unaligned)
  }

  pub fn iter(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
    (0..self.count).map(|i| {
      let begin = i * self.stride;
      &self.data[begin..begin + self.element_size]
    })
  }

  pub fn as_contiguous(&self) -> Option<&'a [u8]> {
    self
      .is_contiguous()
      .then(|| &self.data[..self.count * self.element_size])
  }
}

/// Mutable counterpart of [`StridedBytes`]. Rows must not overlap, so the
/// stride has to cover at least one element.
#[derive(Debug)]
pub struct StridedBytesMut<'a> {
  data: &'a mut [u8],
  element_size: usize,
  stride: usize,
  count: usize,
}

impl<'a> StridedBytesMut<'a> {
  pub fn new(
    data: &'a mut [u8],
    element_size: usize,
    stride: usize,
    count: usize,
  ) -> Result<Self, LayoutError> {
    let out_of_bounds = LayoutError::ViewOutOfBounds {
      element_size,
      stride,
      count,
      len: data.len(),
    };
    if count > 1 && stride < element_size {
      return Err(out_of_bounds);
    }
    match required_len(element_size, stride, count) {
      Some(required) if required <= data.len() => Ok(Self {
        data,
        element_size,
        stride,
        count,
      }),
      _ => Err(out_of_bounds),
    }
  }

  pub fn element_size(&self) -> usize {
    self.element_size
  }

  pub fn stride(&self) -> usize {
    self.stride
  }

  pub fn count(&self) -> usize {
    self.count
  }

  pub fn get(&self, index: usize) -> Option<&[u8]> {
    if index >= self.count {
      return None;
    }
    let begin = index * self.stride;
    Some(&self.data[begin..begin + self.element_size])
  }

  pub fn get_mut(&mut self, index: usize) -> Option<&mut [u8]> {
    if index >= self.count {
      return None;
    }
    let begin = index * self.stride;
    Some(&mut self.data[begin..begin + self.element_size])
  }

  pub fn write(&mut self, index: usize, bytes: &[u8]) -> bool {
    match self.get_mut(index) {
      Some(slot) if slot.len() == bytes.len() => {
        slot.copy_from_slice(bytes);
        true
      }
      _ => false,
    }
  }

  pub fn write_pod<T: Pod>(&mut self, index: usize, value: T) -> bool {
    self.write(index, bytemuck::bytes_of(&value))
  }
}

/// Typed strided view, element type checked against the attribute format at
/// creation so every row reads as one `T`.
#[derive(Copy, Clone, Debug)]
pub struct TypedView<'a, T> {
  view: StridedBytes<'a>,
  _marker: PhantomData<T>,
}

impl<'a, T: Pod> TypedView<'a, T> {
  pub(crate) fn wrap(view: StridedBytes<'a>) -> Self {
    debug_assert_eq!(view.element_size(), std::mem::size_of::<T>());
    Self {
      view,
      _marker: PhantomData,
    }
  }

  pub fn len(&self) -> usize {
    self.view.count()
  }

  pub fn is_empty(&self) -> bool {
    self.view.is_empty()
  }

  pub fn get(&self, index: usize) -> Option<T> {
    self.view.read(index)
  }

  pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
    (0..self.len()).map(|i| self.view.read(i).unwrap_or_else(T::zeroed))
  }

  pub fn to_vec(&self) -> Vec<T> {
    self.iter().collect()
  }

  pub fn as_bytes(&self) -> StridedBytes<'a> {
    self.view
  }
}

#[derive(Debug)]
pub struct TypedViewMut<'a, T> {
  view: StridedBytesMut<'a>,
  _marker: PhantomData<T>,
}

impl<'a, T: Pod> TypedViewMut<'a, T> {
  pub(crate) fn wrap(view: StridedBytesMut<'a>) -> Self {
    debug_assert_eq!(view.element_size(), std::mem::size_of::<T>());
    Self {
      view,
      _marker: PhantomData,
    }
  }

  pub fn len(&self) -> usize {
    self.view.count()
  }

  pub fn is_empty(&self) -> bool {
    self.view.count() == 0
  }

  pub fn get(&self, index: usize) -> Option<T> {
    self.view.get(index).map(bytemuck::pod_read_unaligned)
  }

  pub fn set(&mut self, index: usize, value: T) -> bool {
    self.view.write_pod(index, value)
  }
}

/// Typed view over an array-valued attribute: `len()` vertices of
/// `array_size()` consecutive `T`s each.
#[derive(Copy, Clone, Debug)]
pub struct TypedArrayView<'a, T> {
  view: StridedBytes<'a>,
  array_size: usize,
  _marker: PhantomData<T>,
}

impl<'a, T: Pod> TypedArrayView<'a, T> {
  pub(crate) fn wrap(view: StridedBytes<'a>, array_size: usize) -> Self {
    debug_assert_eq!(
      view.element_size(),
      std::mem::size_of::<T>() * array_size
    );
    Self {
      view,
      array_size,
      _marker: PhantomData,
    }
  }

  pub fn len(&self) -> usize {
    self.view.count()
  }

  pub fn is_empty(&self) -> bool {
    self.view.is_empty()
  }

  pub fn array_size(&self) -> usize {
    self.array_size
  }

  pub fn get(&self, index: usize, element: usize) -> Option<T> {
    if element >= self.array_size {
      return None;
    }
    let row = self.view.get(index)?;
    let size = std::mem::size_of::<T>();
    Some(bytemuck::pod_read_unaligned(
      &row[element * size..(element + 1) * size],
    ))
  }

  pub fn row(&self, index: usize) -> Option<Vec<T>> {
    let row = self.view.get(index)?;
    let size = std::mem::size_of::<T>();
    Some(
      (0..self.array_size)
        .map(|e| bytemuck::pod_read_unaligned(&row[e * size..(e + 1) * size]))
        .collect(),
    )
  }
}

#[derive(Debug)]
pub struct TypedArrayViewMut<'a, T> {
  view: StridedBytesMut<'a>,
  array_size: usize,
  _marker: PhantomData<T>,
}

impl<'a, T: Pod> TypedArrayViewMut<'a, T> {
  pub(crate) fn wrap(view: StridedBytesMut<'a>, array_size: usize) -> Self {
    debug_assert_eq!(
      view.element_size(),
      std::mem::size_of::<T>() * array_size
    );
    Self {
      view,
      array_size,
      _marker: PhantomData,
    }
  }

  pub fn len(&self) -> usize {
    self.view.count()
  }

  pub fn is_empty(&self) -> bool {
    self.view.count() == 0
  }

  pub fn array_size(&self) -> usize {
    self.array_size
  }

  pub fn set(&mut self, index: usize, element: usize, value: T) -> bool {
    if element >= self.array_size {
      return false;
    }
    let size = std::mem::size_of::<T>();
    match self.view.get_mut(index) {
      Some(row) => {
        row[element * size..(element + 1) * size].copy_from_slice(bytemuck::bytes_of(&value));
        true
      }
      None => false,
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn strided_access() {
    // two interleaved u16 streams
    let data: Vec<u8> = vec![1, 0, 2, 0, 3, 0, 4, 0];
    let first = StridedBytes::new(&data, 2, 4, 2).unwrap();
    assert_eq!(first.read::<u16>(0), Some(1));
    assert_eq!(first.read::<u16>(1), Some(3));
    assert_eq!(first.read::<u16>(2), None);
    assert!(!first.is_contiguous());

    let second = StridedBytes::new(&data[2..], 2, 4, 2).unwrap();
    assert_eq!(second.read::<u16>(0), Some(2));
    assert_eq!(second.read::<u16>(1), Some(4));
  }

  #[test]
  fn bounds_are_validated() {
    let data = [0u8; 10];
    assert!(StridedBytes::new(&data, 4, 4, 2).is_ok());
    assert_eq!(
      StridedBytes::new(&data, 4, 4, 3).unwrap_err(),
      LayoutError::ViewOutOfBounds {
        element_size: 4,
        stride: 4,
        count: 3,
        len: 10,
      }
    );
    // empty views fit anywhere
    assert!(StridedBytes::new(&[], 16, 16, 0).is_ok());
  }

  #[test]
  fn mutable_views_reject_overlap() {
    let mut data = [0u8; 12];
    assert!(StridedBytesMut::new(&mut data, 4, 2, 3).is_err());
    let mut view = StridedBytesMut::new(&mut data, 4, 4, 3).unwrap();
    assert!(view.write_pod(2, 7.5f32));
    assert!(!view.write_pod(3, 0.0f32));
    assert_eq!(view.get(2).unwrap(), bytemuck::bytes_of(&7.5f32));
  }

  #[test]
  fn typed_wrapper() {
    let values = [0.5f32, 1.5, 2.5];
    let view = TypedView::<f32>::wrap(StridedBytes::from_slice(&values));
    assert_eq!(view.len(), 3);
    assert_eq!(view.get(1), Some(1.5));
    assert_eq!(view.to_vec(), values.to_vec());
  }
}
