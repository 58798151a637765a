//! Hasil resolusi path: slot scalar dan handle bertipe

use std::fmt;
use std::marker::PhantomData;
use std::mem;

use super::field::{FieldId, Scalar, TypeTag};
use crate::error::StencilError;

/// Path yang sudah di-resolve ke field scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    field: FieldId,
    offset: usize,
    tag: TypeTag,
}

impl Slot {
    pub(crate) fn new(field: FieldId, offset: usize, tag: TypeTag) -> Self {
        Self { field, offset, tag }
    }

    /// Id field scalar terakhir (setelah seleksi composite satu field)
    #[inline(always)]
    pub fn field(&self) -> FieldId {
        self.field
    }

    #[inline(always)]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline(always)]
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    #[inline(always)]
    pub fn size(&self) -> usize {
        self.tag.size()
    }

    /// Cek bahwa slot menyimpan `T`
    pub fn check<T: Scalar>(&self) -> Result<(), StencilError> {
        if self.tag.is::<T>() {
            Ok(())
        } else {
            Err(StencilError::TypeMismatch {
                field: self.field,
                expected: self.tag.name(),
                found: TypeTag::of::<T>().name(),
            })
        }
    }
}

/// Handle bertipe ke field scalar.
///
/// Dibuat lewat `Composite::field`, yang sudah mengecek tipe. Akses lewat
/// handle tidak melakukan lookup path lagi, hanya cek identitas composite
/// dan batas footprint.
pub struct Field<T> {
    id: FieldId,
    offset: usize,
    layout: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Scalar> Field<T> {
    pub(crate) fn new(id: FieldId, offset: usize, layout: u64) -> Self {
        Self {
            id,
            offset,
            layout,
            _marker: PhantomData,
        }
    }

    #[inline(always)]
    pub fn id(&self) -> FieldId {
        self.id
    }

    #[inline(always)]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// `Composite::identity` tempat handle ini di-resolve
    #[inline(always)]
    pub fn layout(&self) -> u64 {
        self.layout
    }

    #[inline(always)]
    pub fn size(&self) -> usize {
        mem::size_of::<T>()
    }
}

// Manual impl: derive akan menuntut `T: Clone`
impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Field<T> {}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("id", &self.id)
            .field("offset", &self.offset)
            .field("layout", &self.layout)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}
