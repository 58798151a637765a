//! Byte region di bawah stencil
//!
//! Tiga state, tepat satu berlaku per view:
//! - Owned: dialokasikan stencil, dilepas saat drop
//! - Borrowed: memory eksternal, tidak pernah dilepas oleh stencil
//! - Empty: setelah di-move, tidak memegang apa-apa

use std::alloc::{self, Layout};
use std::marker::PhantomData;
use std::ptr::{self, NonNull};
use std::slice;

use tracing::trace;

use crate::config::FillPolicy;
use crate::error::StencilError;

/// Alignment region owned. Cukup untuk semua scalar primitif (termasuk u128).
pub const REGION_ALIGN: usize = 16;

/// State ownership region sebuah stencil
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Owned,
    Borrowed,
    Empty,
}

/// Region heap milik stencil.
///
/// Alokasi dan dealokasi memakai `Layout` yang sama.
pub(crate) struct OwnedRegion {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl OwnedRegion {
    pub(crate) fn allocate(len: usize, fill: FillPolicy) -> Result<Self, StencilError> {
        if len == 0 {
            return Err(StencilError::Allocation { size: 0 });
        }
        let layout = Layout::from_size_align(len, REGION_ALIGN)
            .map_err(|_| StencilError::Allocation { size: len })?;

        // SAFETY: layout size > 0
        let raw = unsafe {
            match fill {
                FillPolicy::Zeroed => alloc::alloc_zeroed(layout),
                FillPolicy::Pattern(_) => alloc::alloc(layout),
            }
        };
        let ptr = NonNull::new(raw).ok_or(StencilError::Allocation { size: len })?;

        if let FillPolicy::Pattern(byte) = fill {
            // SAFETY: ptr valid untuk `len` bytes, baru dialokasikan
            unsafe { ptr::write_bytes(ptr.as_ptr(), byte, len) };
        }

        trace!(size = len, "region allocated");
        Ok(Self { ptr, layout })
    }

    /// Alokasi baru berisi salinan `bytes`
    pub(crate) fn copy_of(bytes: &[u8]) -> Result<Self, StencilError> {
        let mut region = Self::allocate(bytes.len(), FillPolicy::Zeroed)?;
        region.as_mut_slice().copy_from_slice(bytes);
        Ok(region)
    }

    #[inline(always)]
    pub(crate) fn as_slice(&self) -> &[u8] {
        // SAFETY: region eksklusif milik kita, panjang = layout.size()
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.layout.size()) }
    }

    #[inline(always)]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: &mut self menjamin akses eksklusif
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.layout.size()) }
    }
}

impl Drop for OwnedRegion {
    fn drop(&mut self) {
        // SAFETY: ptr berasal dari alloc dengan layout yang sama, dilepas sekali
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) };
        trace!(size = self.layout.size(), "region released");
    }
}

/// Region yang dipegang stencil
pub(crate) enum Region<'a> {
    Owned(OwnedRegion),
    Borrowed {
        ptr: NonNull<u8>,
        len: usize,
        _marker: PhantomData<&'a mut [u8]>,
    },
    Empty,
}

impl<'a> Region<'a> {
    pub(crate) fn borrowed(buf: &'a mut [u8], len: usize) -> Self {
        debug_assert!(buf.len() >= len);
        Region::Borrowed {
            ptr: NonNull::from(buf).cast(),
            len,
            _marker: PhantomData,
        }
    }

    /// # Safety
    /// `ptr` harus valid untuk baca/tulis `len` bytes selama `'a`,
    /// dan tidak diakses lewat jalur lain selama itu.
    pub(crate) unsafe fn from_raw(ptr: NonNull<u8>, len: usize) -> Self {
        Region::Borrowed {
            ptr,
            len,
            _marker: PhantomData,
        }
    }

    pub(crate) fn ownership(&self) -> Ownership {
        match self {
            Region::Owned(_) => Ownership::Owned,
            Region::Borrowed { .. } => Ownership::Borrowed,
            Region::Empty => Ownership::Empty,
        }
    }

    pub(crate) fn as_slice(&self) -> Option<&[u8]> {
        match self {
            Region::Owned(owned) => Some(owned.as_slice()),
            // SAFETY: kontrak konstruksi borrowed menjamin validitas selama 'a
            Region::Borrowed { ptr, len, .. } => {
                Some(unsafe { slice::from_raw_parts(ptr.as_ptr(), *len) })
            }
            Region::Empty => None,
        }
    }

    pub(crate) fn as_mut_slice(&mut self) -> Option<&mut [u8]> {
        match self {
            Region::Owned(owned) => Some(owned.as_mut_slice()),
            // SAFETY: sama seperti `as_slice`, plus &mut self untuk eksklusivitas
            Region::Borrowed { ptr, len, .. } => {
                Some(unsafe { slice::from_raw_parts_mut(ptr.as_ptr(), *len) })
            }
            Region::Empty => None,
        }
    }
}
