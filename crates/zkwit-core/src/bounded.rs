//! Fixed-capacity container with an explicit logical length.
//!
//! Circuit arrays are statically sized, so variable-length data travels as a
//! padded backing store of exactly `capacity` elements plus a separate `len`.
//! Padding always comes from the caller's filler, never from leftover state.

use core::slice;

use crate::error::{Error, Result};

/// A capacity-bounded, order-preserving sequence.
///
/// Invariant: `len <= storage.len()` and `storage.len() > 0`. The backing
/// store is allocated once at construction and never grows.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BoundedVec<T> {
    storage: Box<[T]>,
    len: usize,
}

impl<T> BoundedVec<T> {
    /// Allocate `capacity` placeholders produced by `filler`; `len` starts at 0.
    ///
    /// # Errors
    /// [`Error::ZeroCapacity`] if `capacity == 0`.
    pub fn new<F: FnMut() -> T>(capacity: usize, mut filler: F) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        let storage: Box<[T]> = (0..capacity).map(|_| filler()).collect();
        Ok(Self { storage, len: 0 })
    }

    /// Fixed capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Logical length.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the logical length is zero.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Free slots left.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity() - self.len
    }

    fn reserve_check(&self, requested: usize) -> Result<()> {
        if requested > self.remaining() {
            return Err(Error::CapacityExceeded {
                capacity: self.capacity(),
                len: self.len,
                requested,
            });
        }
        Ok(())
    }

    /// Append one element.
    ///
    /// # Errors
    /// [`Error::CapacityExceeded`] when full; the container is unchanged.
    pub fn push(&mut self, value: T) -> Result<()> {
        self.reserve_check(1)?;
        self.storage[self.len] = value;
        self.len += 1;
        Ok(())
    }

    /// Append every element of an exact-size iterator, or none of them.
    ///
    /// # Errors
    /// [`Error::CapacityExceeded`] if the iterator does not fit.
    pub fn try_extend<I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let it = values.into_iter();
        self.reserve_check(it.len())?;
        for v in it {
            self.storage[self.len] = v;
            self.len += 1;
        }
        Ok(())
    }

    /// Logical prefix.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.storage[..self.len]
    }

    /// Full padded backing store (`capacity` entries).
    #[inline]
    #[must_use]
    pub fn storage(&self) -> &[T] {
        &self.storage
    }

    /// Element `i` of the logical prefix.
    #[inline]
    #[must_use]
    pub fn get(&self, i: usize) -> Option<&T> {
        self.as_slice().get(i)
    }

    /// Iterate the logical prefix.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Map every slot (padding included), keeping `len`.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> BoundedVec<U> {
        BoundedVec {
            storage: self.storage.into_vec().into_iter().map(f).collect(),
            len: self.len,
        }
    }

    /// Split into `(storage, len)`.
    #[must_use]
    pub fn into_parts(self) -> (Box<[T]>, usize) {
        (self.storage, self.len)
    }
}

impl<T: Clone> BoundedVec<T> {
    /// Append `values` in order, or nothing at all.
    ///
    /// # Errors
    /// [`Error::CapacityExceeded`] if `len + values.len() > capacity`.
    pub fn extend_from_slice(&mut self, values: &[T]) -> Result<()> {
        self.reserve_check(values.len())?;
        self.storage[self.len..self.len + values.len()].clone_from_slice(values);
        self.len += values.len();
        Ok(())
    }

    /// Build a container of `capacity` holding `values`.
    ///
    /// # Errors
    /// [`Error::ZeroCapacity`] or [`Error::CapacityExceeded`].
    pub fn from_slice<F: FnMut() -> T>(capacity: usize, values: &[T], filler: F) -> Result<Self> {
        let mut bv = Self::new(capacity, filler)?;
        bv.extend_from_slice(values)?;
        Ok(bv)
    }
}

impl<'a, T> IntoIterator for &'a BoundedVec<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(matches!(BoundedVec::<u8>::new(0, || 0), Err(Error::ZeroCapacity)));
    }

    #[test]
    fn pads_with_filler() {
        let mut bv = BoundedVec::new(5, || 9u8).unwrap();
        bv.extend_from_slice(&[1, 2]).unwrap();
        assert_eq!(bv.len(), 2);
        assert_eq!(bv.capacity(), 5);
        assert_eq!(bv.as_slice(), &[1, 2]);
        assert_eq!(bv.storage(), &[1, 2, 9, 9, 9]);
    }

    #[test]
    fn cumulative_overflow_rejected_on_the_overflowing_call() {
        let mut bv = BoundedVec::new(4, || 0u8).unwrap();
        bv.extend_from_slice(&[1, 2]).unwrap();
        bv.extend_from_slice(&[3]).unwrap();
        let err = bv.extend_from_slice(&[4, 5]).unwrap_err();
        assert!(matches!(
            err,
            Error::CapacityExceeded {
                capacity: 4,
                len: 3,
                requested: 2
            }
        ));
        assert_eq!(bv.as_slice(), &[1, 2, 3]);
        assert_eq!(bv.storage(), &[1, 2, 3, 0]);
        bv.push(4).unwrap();
        assert!(bv.push(5).is_err());
        assert_eq!(bv.len(), 4);
    }

    #[test]
    fn try_extend_is_atomic() {
        let mut bv = BoundedVec::new(3, || 0u32).unwrap();
        assert!(bv.try_extend(vec![1, 2, 3, 4]).is_err());
        assert!(bv.is_empty());
        bv.try_extend(vec![7, 8]).unwrap();
        assert_eq!(bv.iter().copied().collect::<Vec<_>>(), vec![7, 8]);
    }

    #[test]
    fn map_keeps_len_and_padding() {
        let bv = BoundedVec::from_slice(3, &[1u8], || 0).unwrap();
        let mapped = bv.map(u32::from);
        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped.storage(), &[1, 0, 0]);
    }
}
