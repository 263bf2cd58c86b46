//! Aligned allocation.
//!
//! [`AlignedBuffer`] is the fallible primitive: it reports an exhausted
//! allocator as an error instead of aborting, and frees its memory on drop.
//! Its capacity is padded to a whole number of vectors and zero-filled, so a
//! full-width load of the last partial vector never leaves the allocation.
//!
//! [`AlignedVec`] is the growable alternative from the `aligned-vec` crate,
//! aligned for every tier at once. It aborts on allocation failure like
//! `Vec`.

use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use aligned_vec::{AVec, ConstAlign};
use log::{trace, warn};

use crate::alignment::{alignment_bytes, lane_count};
use crate::error::{Result, SimdError};
use crate::simd::{SelectedTier, Tier};
use crate::types::{Element, MAX_ALIGNMENT};

/// Growable storage aligned to [`MAX_ALIGNMENT`], valid for aligned access on
/// every tier.
pub type AlignedVec<E> = AVec<E, ConstAlign<{ MAX_ALIGNMENT }>>;

/// Copy `values` into a new [`AlignedVec`].
pub fn aligned_vec_from<E: Element>(values: &[E]) -> AlignedVec<E> {
    AVec::from_slice(MAX_ALIGNMENT, values)
}

/// A heap buffer of `E` whose base address is aligned for tier `T`.
pub struct AlignedBuffer<E: Element, T: Tier = SelectedTier> {
    ptr: NonNull<E>,
    len: usize,
    capacity: usize,
    _tier: PhantomData<T>,
}

// SAFETY: the buffer uniquely owns its allocation, like `Box<[E]>`.
unsafe impl<E: Element, T: Tier> Send for AlignedBuffer<E, T> {}
unsafe impl<E: Element, T: Tier> Sync for AlignedBuffer<E, T> {}

impl<E: Element, T: Tier> AlignedBuffer<E, T> {
    /// Allocate `count` zeroed elements aligned to
    /// [`alignment_bytes::<T, E>()`](alignment_bytes).
    ///
    /// # Errors
    /// `InvalidArgument` if the padded byte size does not fit a `Layout`,
    /// `ResourceExhausted` if the system allocator returns null.
    pub fn allocate(count: usize) -> Result<Self> {
        let align = alignment_bytes::<T, E>();
        let lanes = lane_count::<T, E>();
        let capacity = count
            .max(1)
            .checked_next_multiple_of(lanes)
            .ok_or_else(|| SimdError::invalid_argument(format!("{} elements overflow usize", count)))?;
        let layout = Self::layout_for(capacity)?;

        // SAFETY: `layout` has a non-zero size.
        let raw = unsafe { alloc_zeroed(layout) } as *mut E;
        match NonNull::new(raw) {
            Some(ptr) => {
                trace!(
                    "allocated {} x {} ({} padded) aligned to {} bytes for {}",
                    count,
                    E::NAME,
                    capacity,
                    align,
                    T::KIND
                );
                Ok(Self {
                    ptr,
                    len: count,
                    capacity,
                    _tier: PhantomData,
                })
            }
            None => {
                warn!(
                    "aligned allocation of {} bytes ({}-byte alignment) failed",
                    layout.size(),
                    align
                );
                Err(SimdError::resource_exhausted(format!(
                    "cannot allocate {} {} elements aligned to {} bytes",
                    count,
                    E::NAME,
                    align
                )))
            }
        }
    }

    /// Allocate a buffer holding a copy of `values`.
    pub fn from_slice(values: &[E]) -> Result<Self> {
        let mut buf = Self::allocate(values.len())?;
        buf.copy_from_slice(values);
        Ok(buf)
    }

    fn layout_for(capacity: usize) -> Result<Layout> {
        let bytes = capacity.checked_mul(E::SIZE).ok_or_else(|| {
            SimdError::invalid_argument(format!("{} {} elements overflow usize", capacity, E::NAME))
        })?;
        Layout::from_size_align(bytes, alignment_bytes::<T, E>())
            .map_err(|e| SimdError::invalid_argument(format!("invalid layout for {} bytes: {}", bytes, e)))
    }

    /// Alignment of the base address in bytes.
    #[inline]
    pub fn alignment() -> usize {
        alignment_bytes::<T, E>()
    }

    /// Number of elements requested.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if zero elements were requested.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Elements actually allocated: `len` rounded up to whole vectors
    /// (at least one vector).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Aligned base pointer.
    #[inline]
    pub fn as_ptr(&self) -> *const E {
        self.ptr.as_ptr()
    }

    /// Aligned mutable base pointer.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut E {
        self.ptr.as_ptr()
    }

    /// The requested elements.
    #[inline]
    pub fn as_slice(&self) -> &[E] {
        // SAFETY: `len <= capacity` initialised (zeroed) elements.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// The requested elements, mutably.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [E] {
        // SAFETY: as above, and `&mut self` guarantees uniqueness.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Every allocated element including the zeroed padding, a whole number
    /// of vectors long.
    #[inline]
    pub fn padded(&self) -> &[E] {
        // SAFETY: all `capacity` elements were zero-initialised.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.capacity) }
    }

    /// Mutable view of [`padded`](Self::padded).
    #[inline]
    pub fn padded_mut(&mut self) -> &mut [E] {
        // SAFETY: as above.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.capacity) }
    }
}

impl<E: Element, T: Tier> Drop for AlignedBuffer<E, T> {
    fn drop(&mut self) {
        // The layout was valid at allocation time.
        if let Ok(layout) = Self::layout_for(self.capacity) {
            // SAFETY: allocated by `alloc_zeroed` with this same layout.
            unsafe { dealloc(self.ptr.as_ptr() as *mut u8, layout) }
        }
    }
}

impl<E: Element, T: Tier> Deref for AlignedBuffer<E, T> {
    type Target = [E];

    #[inline]
    fn deref(&self) -> &[E] {
        self.as_slice()
    }
}

impl<E: Element, T: Tier> DerefMut for AlignedBuffer<E, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [E] {
        self.as_mut_slice()
    }
}

impl<E: Element, T: Tier> fmt::Debug for AlignedBuffer<E, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("tier", &T::KIND)
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .field("data", &self.as_slice())
            .finish()
    }
}
