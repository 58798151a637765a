//! Layout engine: offset dan footprint record biner
//!
//! Prinsip desain:
//! - Packed: tidak ada padding, offset = jumlah ukuran field sebelumnya
//! - Precomputed: footprint dan offset dihitung sekali saat `define`
//! - Immutable: composite tidak berubah setelah didefinisikan

mod composite;
mod field;
mod resolve;

pub use composite::Composite;
pub use field::{FieldDescriptor, FieldId, FieldKind, IdSequence, Scalar, TypeTag};
pub use resolve::{Field, Slot};
