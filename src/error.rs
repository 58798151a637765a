//! Error types untuk layout engine dan stencil.
//!
//! Semua kegagalan dikembalikan ke caller langsung, tidak ada retry
//! dan tidak ada error yang ditelan.

use std::io;

use thiserror::Error;

use crate::layout::FieldId;

/// Kegagalan saat mendefinisikan composite (sebelum buffer apapun ada).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// Composite tanpa field.
    #[error("composite `{0}` has no fields")]
    EmptyComposite(&'static str),

    /// Field id dipakai lebih dari sekali dalam satu layout graph.
    #[error("field id {0} is defined more than once in the layout graph")]
    DuplicateField(FieldId),

    /// Total footprint nol, record harus menempati minimal satu byte.
    #[error("composite `{0}` has a zero-byte footprint")]
    ZeroFootprint(&'static str),

    /// Jumlah ukuran field melebihi `usize`.
    #[error("footprint of composite `{0}` overflows usize")]
    FootprintOverflow(&'static str),
}

/// Kegagalan resolusi path ke offset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("field path is empty")]
    EmptyPath,

    /// Field tidak ada di composite pada level `depth` (0 = root).
    #[error("field {id} not found at depth {depth}")]
    UnknownField { id: FieldId, depth: usize },

    /// Path berakhir di composite padahal dibutuhkan scalar.
    #[error("field {id} is a composite, a scalar was required")]
    NotAScalar { id: FieldId },

    /// Path mencoba turun ke dalam field scalar.
    #[error("field {id} is a scalar and has no nested fields")]
    NotAComposite { id: FieldId },

    /// Akses `size` bytes di `offset` melewati footprint.
    #[error("access of {size} bytes at offset {offset} exceeds footprint {footprint}")]
    OutOfBounds {
        offset: usize,
        size: usize,
        footprint: usize,
    },
}

/// Operasi yang ditolak oleh state ownership stencil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidOperation {
    /// View sudah di-move (tidak memegang region).
    #[error("stencil is empty (moved-from)")]
    EmptyView,

    /// Assignment ke view yang masih memegang region.
    #[error("cannot assign onto a live stencil")]
    AssignToLive,

    #[error("borrowed region pointer is null")]
    NullPointer,
}

/// Error utama crate.
#[derive(Debug, Error)]
pub enum StencilError {
    #[error("definition error: {0}")]
    Definition(#[from] DefinitionError),

    #[error("resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    /// Alokasi region gagal (resource habis).
    #[error("failed to allocate a {size}-byte region")]
    Allocation { size: usize },

    /// Stream habis sebelum footprint terbaca penuh.
    #[error("short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid operation: {0}")]
    InvalidOperation(#[from] InvalidOperation),

    /// Region borrowed lebih kecil dari footprint.
    #[error("borrowed region of {actual} bytes is smaller than footprint {required}")]
    RegionTooSmall { required: usize, actual: usize },

    /// Alamat field tidak aligned untuk referensi `&T`.
    #[error("field at offset {offset} is not aligned to {align} bytes")]
    Misaligned { offset: usize, align: usize },

    /// Handle `Field<T>` di-resolve dari composite lain.
    #[error("handle for field {field} was not resolved against composite `{composite}`")]
    ForeignField {
        field: FieldId,
        composite: &'static str,
    },

    /// Hanya muncul pada `AccessMode::Checked` atau handle `Field<T>`.
    #[error("field {field} holds `{expected}`, accessed as `{found}`")]
    TypeMismatch {
        field: FieldId,
        expected: &'static str,
        found: &'static str,
    },
}

/// Result type untuk operasi stencil.
pub type Result<T> = std::result::Result<T, StencilError>;
