//! Field identity dan descriptor
//!
//! Setiap field punya `FieldId` unik dalam satu layout graph.
//! Id diberikan caller (enum, konstanta, atau `IdSequence`).

use std::any::{type_name, TypeId};
use std::fmt;
use std::mem;
use std::sync::Arc;

use bytemuck::Pod;

use super::composite::Composite;

/// Identifier unik sebuah field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(u32);

impl FieldId {
    #[inline(always)]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline(always)]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for FieldId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generator id monotonic per schema.
///
/// Pengganti counter global: setiap schema punya sequence sendiri,
/// id tidak pernah dipakai ulang.
#[derive(Debug, Default)]
pub struct IdSequence {
    next: u32,
}

impl IdSequence {
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Mulai dari id tertentu (mis. melanjutkan schema lain)
    pub const fn starting_at(first: u32) -> Self {
        Self { next: first }
    }

    /// Ambil id berikutnya
    ///
    /// # Panics
    /// Panic jika sequence habis (lebih dari `u32::MAX` field).
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> FieldId {
        self.try_next().expect("field id sequence exhausted")
    }

    /// Seperti `next`, tapi `None` jika sequence habis.
    ///
    /// Id `u32::MAX` tidak pernah diberikan.
    pub fn try_next(&mut self) -> Option<FieldId> {
        let id = FieldId(self.next);
        self.next = self.next.checked_add(1)?;
        Some(id)
    }

    /// Id yang akan diberikan berikutnya (tanpa mengkonsumsi)
    pub fn peek(&self) -> FieldId {
        FieldId(self.next)
    }
}

/// Tipe yang bisa disimpan sebagai scalar field.
///
/// Semua `Pod` otomatis memenuhi: setiap pola bit valid, jadi
/// reinterpretasi bytes tidak pernah undefined behaviour.
pub trait Scalar: Pod {}

impl<T: Pod> Scalar for T {}

/// Tag tipe runtime untuk scalar field
#[derive(Debug, Clone, Copy)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
    size: usize,
}

impl TypeTag {
    pub fn of<T: Scalar>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            size: mem::size_of::<T>(),
        }
    }

    #[inline(always)]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline(always)]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline(always)]
    pub fn is<T: Scalar>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

/// Jenis field: scalar dengan ukuran tetap, atau composite nested
#[derive(Debug, Clone)]
pub enum FieldKind {
    Scalar(TypeTag),
    Composite(Arc<Composite>),
}

/// Descriptor satu field dalam composite
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    id: FieldId,
    name: &'static str,
    kind: FieldKind,
}

impl FieldDescriptor {
    /// Field scalar bertipe `T` (ukuran = `size_of::<T>()`)
    pub fn scalar<T: Scalar>(id: FieldId, name: &'static str) -> Self {
        Self {
            id,
            name,
            kind: FieldKind::Scalar(TypeTag::of::<T>()),
        }
    }

    /// Field berisi composite lain (ukuran = footprint composite)
    pub fn nested(id: FieldId, name: &'static str, composite: Arc<Composite>) -> Self {
        Self {
            id,
            name,
            kind: FieldKind::Composite(composite),
        }
    }

    #[inline(always)]
    pub fn id(&self) -> FieldId {
        self.id
    }

    #[inline(always)]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline(always)]
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Ukuran field dalam bytes
    #[inline(always)]
    pub fn size(&self) -> usize {
        match &self.kind {
            FieldKind::Scalar(tag) => tag.size(),
            FieldKind::Composite(composite) => composite.footprint(),
        }
    }

    pub fn as_composite(&self) -> Option<&Arc<Composite>> {
        match &self.kind {
            FieldKind::Composite(composite) => Some(composite),
            FieldKind::Scalar(_) => None,
        }
    }

    pub fn type_tag(&self) -> Option<TypeTag> {
        match &self.kind {
            FieldKind::Scalar(tag) => Some(*tag),
            FieldKind::Composite(_) => None,
        }
    }
}
