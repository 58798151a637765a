//! Stencil: view bertipe di atas region seukuran footprint composite
//!
//! Akses field:
//! 1. Path di-resolve ke offset lewat tabel composite (tanpa traversal ulang)
//! 2. `size_of::<T>()` bytes di offset itu dibaca/ditulis sebagai `T`
//!
//! # Kontrak tipe
//! Dengan `AccessMode::Unchecked` tidak ada cek bahwa `T` sama dengan tipe
//! field. Caller bertanggung jawab memakai tipe yang konsisten antara
//! writer dan reader. Karena `T: Pod`, tipe yang salah hanya menghasilkan
//! nilai yang salah, bukan undefined behaviour. Yang selalu dicek: path
//! berakhir di scalar dan akses tidak melewati footprint.

use std::fmt;
use std::mem;
use std::ops::Range;
use std::ptr::NonNull;
use std::sync::Arc;

use tracing::{trace, warn};

use super::region::{OwnedRegion, Ownership, Region};
use crate::config::{AccessMode, StencilConfig};
use crate::error::{InvalidOperation, ResolutionError, Result, StencilError};
use crate::layout::{Composite, Field, FieldId, Scalar};

/// View bertipe atas satu record.
///
/// Copy hanya lewat `try_clone`/`assign_copy` (eksplisit dan bisa gagal).
/// Move eksplisit lewat `take`, yang meninggalkan view sumber kosong.
pub struct Stencil<'a> {
    layout: Arc<Composite>,
    config: StencilConfig,
    region: Region<'a>,
}

impl Stencil<'static> {
    /// Alokasi region baru seukuran footprint (owned)
    pub fn new(layout: Arc<Composite>) -> Result<Self> {
        Self::with_config(layout, StencilConfig::default())
    }

    pub fn with_config(layout: Arc<Composite>, config: StencilConfig) -> Result<Self> {
        let region = OwnedRegion::allocate(layout.footprint(), config.fill)?;
        Ok(Self {
            layout,
            config,
            region: Region::Owned(region),
        })
    }
}

impl<'a> Stencil<'a> {
    /// View atas buffer eksternal (borrowed, tidak pernah dilepas).
    ///
    /// Hanya `footprint` bytes pertama dari `buf` yang dipakai.
    pub fn borrowed(layout: Arc<Composite>, buf: &'a mut [u8]) -> Result<Self> {
        Self::borrowed_with_config(layout, buf, StencilConfig::default())
    }

    pub fn borrowed_with_config(
        layout: Arc<Composite>,
        buf: &'a mut [u8],
        config: StencilConfig,
    ) -> Result<Self> {
        let required = layout.footprint();
        if buf.len() < required {
            return Err(StencilError::RegionTooSmall {
                required,
                actual: buf.len(),
            });
        }
        Ok(Self {
            layout,
            config,
            region: Region::borrowed(buf, required),
        })
    }

    /// View atas pointer mentah (borrowed).
    ///
    /// # Safety
    /// `ptr` harus valid untuk baca dan tulis `layout.footprint()` bytes
    /// selama `'a`, dan tidak boleh diakses lewat jalur lain selama view
    /// dipakai. Stencil tidak pernah melepas memory ini.
    pub unsafe fn from_raw(layout: Arc<Composite>, ptr: *mut u8) -> Result<Self> {
        let ptr = NonNull::new(ptr).ok_or(InvalidOperation::NullPointer)?;
        let len = layout.footprint();
        Ok(Self {
            layout,
            config: StencilConfig::default(),
            region: Region::from_raw(ptr, len),
        })
    }

    pub(crate) fn from_owned(
        layout: Arc<Composite>,
        config: StencilConfig,
        region: OwnedRegion,
    ) -> Self {
        Self {
            layout,
            config,
            region: Region::Owned(region),
        }
    }

    #[inline(always)]
    pub fn layout(&self) -> &Arc<Composite> {
        &self.layout
    }

    #[inline(always)]
    pub fn config(&self) -> StencilConfig {
        self.config
    }

    #[inline(always)]
    pub fn footprint(&self) -> usize {
        self.layout.footprint()
    }

    #[inline(always)]
    pub fn ownership(&self) -> Ownership {
        self.region.ownership()
    }

    #[inline(always)]
    pub fn is_owned(&self) -> bool {
        self.ownership() == Ownership::Owned
    }

    #[inline(always)]
    pub fn is_borrowed(&self) -> bool {
        self.ownership() == Ownership::Borrowed
    }

    /// `true` setelah view di-move lewat `take`
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.ownership() == Ownership::Empty
    }

    /// Salinan independen dengan region owned baru.
    ///
    /// Seluruh footprint disalin apa adanya, tidak pernah berbagi storage.
    pub fn try_clone(&self) -> Result<Stencil<'static>> {
        let region = OwnedRegion::copy_of(self.as_bytes()?)?;
        Ok(Stencil::from_owned(self.layout.clone(), self.config, region))
    }

    /// Pindahkan region ke view baru; view ini menjadi kosong.
    ///
    /// View kosong aman di-drop atau di-assign ulang, tapi akses field
    /// mengembalikan `InvalidOperation::EmptyView`.
    pub fn take(&mut self) -> Stencil<'a> {
        trace!(composite = self.layout.name(), "stencil moved");
        Stencil {
            layout: self.layout.clone(),
            config: self.config,
            region: mem::replace(&mut self.region, Region::Empty),
        }
    }

    /// Move-assign dari `source`. Hanya boleh ke view kosong.
    ///
    /// Saat sukses `source` menjadi kosong. Saat gagal kedua view tidak berubah.
    pub fn assign(&mut self, source: &mut Stencil<'a>) -> Result<()> {
        self.ensure_assignable()?;
        *self = source.take();
        Ok(())
    }

    /// Copy-assign dari `source`. Hanya boleh ke view kosong.
    pub fn assign_copy(&mut self, source: &Stencil<'_>) -> Result<()> {
        self.ensure_assignable()?;
        let region = OwnedRegion::copy_of(source.as_bytes()?)?;
        *self = Stencil::from_owned(source.layout.clone(), source.config, region);
        Ok(())
    }

    /// Seluruh isi record (footprint bytes)
    pub fn as_bytes(&self) -> Result<&[u8]> {
        self.region
            .as_slice()
            .ok_or_else(|| InvalidOperation::EmptyView.into())
    }

    /// Baca field di `path` sebagai `T`
    pub fn get<T: Scalar>(&self, path: &[FieldId]) -> Result<T> {
        let range = self.locate::<T>(path)?;
        Ok(bytemuck::pod_read_unaligned(&self.as_bytes()?[range]))
    }

    /// Referensi ke field di dalam storage view (tanpa copy).
    ///
    /// Gagal dengan `Misaligned` jika alamat field tidak aligned untuk `T`.
    pub fn get_ref<T: Scalar>(&self, path: &[FieldId]) -> Result<&T> {
        let range = self.locate::<T>(path)?;
        let offset = range.start;
        bytemuck::try_from_bytes(&self.as_bytes()?[range]).map_err(|_| {
            StencilError::Misaligned {
                offset,
                align: mem::align_of::<T>(),
            }
        })
    }

    /// Tulis `value` ke field di `path`
    pub fn set<T: Scalar>(&mut self, path: &[FieldId], value: T) -> Result<()> {
        let range = self.locate::<T>(path)?;
        self.bytes_mut()?[range].copy_from_slice(bytemuck::bytes_of(&value));
        Ok(())
    }

    /// Baca lewat handle yang sudah di-resolve.
    ///
    /// Handle dari composite lain ditolak dengan `ForeignField`.
    #[inline(always)]
    pub fn read<T: Scalar>(&self, field: &Field<T>) -> Result<T> {
        let range = self.handle_range(field)?;
        Ok(bytemuck::pod_read_unaligned(&self.as_bytes()?[range]))
    }

    /// Tulis lewat handle yang sudah di-resolve
    #[inline(always)]
    pub fn write<T: Scalar>(&mut self, field: &Field<T>, value: T) -> Result<()> {
        let range = self.handle_range(field)?;
        self.bytes_mut()?[range].copy_from_slice(bytemuck::bytes_of(&value));
        Ok(())
    }

    pub(crate) fn bytes_mut(&mut self) -> Result<&mut [u8]> {
        self.region
            .as_mut_slice()
            .ok_or_else(|| InvalidOperation::EmptyView.into())
    }

    fn ensure_assignable(&self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            warn!(
                composite = self.layout.name(),
                "assignment onto a live stencil refused"
            );
            Err(InvalidOperation::AssignToLive.into())
        }
    }

    /// Resolve path ke range bytes untuk `T`
    fn locate<T: Scalar>(&self, path: &[FieldId]) -> Result<Range<usize>> {
        if self.is_empty() {
            return Err(InvalidOperation::EmptyView.into());
        }
        let slot = self.layout.resolve(path)?;
        if self.config.access == AccessMode::Checked {
            slot.check::<T>()?;
        }
        self.bounded(slot.offset(), mem::size_of::<T>())
    }

    #[inline(always)]
    fn handle_range<T: Scalar>(&self, field: &Field<T>) -> Result<Range<usize>> {
        if field.layout() != self.layout.identity() {
            warn!(
                composite = self.layout.name(),
                field = %field.id(),
                "handle from another composite refused"
            );
            return Err(StencilError::ForeignField {
                field: field.id(),
                composite: self.layout.name(),
            });
        }
        self.bounded(field.offset(), field.size())
    }

    #[inline(always)]
    fn bounded(&self, offset: usize, size: usize) -> Result<Range<usize>> {
        let footprint = self.footprint();
        match offset.checked_add(size) {
            Some(end) if end <= footprint => Ok(offset..end),
            _ => Err(ResolutionError::OutOfBounds {
                offset,
                size,
                footprint,
            }
            .into()),
        }
    }
}

impl fmt::Debug for Stencil<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stencil")
            .field("composite", &self.layout.name())
            .field("footprint", &self.footprint())
            .field("ownership", &self.ownership())
            .field("access", &self.config.access)
            .finish()
    }
}
