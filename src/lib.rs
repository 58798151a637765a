//! Stencil - fixed binary record layouts
//!
//! Arsitektur:
//! - Layout: composite dari field scalar dan nested, offset dihitung sekali
//! - Stencil: view bertipe atas region owned, borrowed, atau hasil stream
//! - Binary: native byte order, packed, tanpa header
//!
//! ```
//! use stencil::{Composite, FieldDescriptor, FieldId, Stencil};
//!
//! const X: FieldId = FieldId::new(0);
//! const Y: FieldId = FieldId::new(1);
//!
//! let point = Composite::define(
//!     "Point",
//!     vec![
//!         FieldDescriptor::scalar::<i32>(X, "x"),
//!         FieldDescriptor::scalar::<i32>(Y, "y"),
//!     ],
//! )?;
//!
//! let mut record = Stencil::new(point)?;
//! record.set(&[X], 10i32)?;
//! record.set(&[Y], 20i32)?;
//!
//! let mut out = Vec::new();
//! record.write_to(&mut out)?;
//! let copy = Stencil::from_reader(record.layout().clone(), &mut out.as_slice())?;
//! assert_eq!(copy.get::<i32>(&[Y])?, 20);
//! # Ok::<(), stencil::StencilError>(())
//! ```

pub mod config;
pub mod error;
pub mod layout;
pub mod stencil;

pub use config::{AccessMode, FillPolicy, StencilConfig};
pub use error::{DefinitionError, InvalidOperation, ResolutionError, Result, StencilError};
pub use layout::{
    Composite, Field, FieldDescriptor, FieldId, FieldKind, IdSequence, Scalar, Slot, TypeTag,
};
pub use stencil::{Ownership, Stencil, REGION_ALIGN};
