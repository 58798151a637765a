//! Composite: urutan field dengan offset yang dihitung sekali
//!
//! Layout (packed, tanpa padding):
//! ┌──────────────┬──────────────┬─────────────────────────┐
//! │ field 0      │ field 1      │ field 2 (composite)     │
//! │ @0           │ @size(0)     │ @size(0)+size(1)        │
//! └──────────────┴──────────────┴─────────────────────────┘
//!
//! Footprint, offset setiap field langsung, dan index `FieldId -> posisi`
//! di-cache saat `define`. Resolusi path hanya lookup tabel per level.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::debug;

use super::field::{FieldDescriptor, FieldId, FieldKind, Scalar};
use super::resolve::{Field, Slot};
use crate::error::{DefinitionError, ResolutionError, StencilError};

/// Sumber identitas composite, satu nilai per `define` yang sukses
static NEXT_IDENTITY: AtomicU64 = AtomicU64::new(1);

/// Composite immutable dengan layout yang sudah dihitung
#[derive(Debug)]
pub struct Composite {
    name: &'static str,
    fields: Vec<FieldDescriptor>,
    /// Offset field langsung relatif ke awal composite ini
    offsets: Vec<usize>,
    index: HashMap<FieldId, usize>,
    /// Semua id dalam graph (termasuk nested)
    graph_ids: HashSet<FieldId>,
    footprint: usize,
    /// Pengikat handle `Field<T>` ke composite ini
    identity: u64,
}

impl Composite {
    /// Definisikan composite baru dari daftar field berurutan.
    ///
    /// Gagal jika daftar kosong, footprint nol atau melebihi `usize`, atau
    /// ada id yang bentrok di mana saja dalam graph. Composite yang sama
    /// (`Arc` yang sama) boleh muncul berkali-kali, misalnya
    /// `Line { a: Point, b: Point }`.
    pub fn define(
        name: &'static str,
        fields: Vec<FieldDescriptor>,
    ) -> Result<Arc<Self>, DefinitionError> {
        if fields.is_empty() {
            return Err(DefinitionError::EmptyComposite(name));
        }

        let mut index = HashMap::with_capacity(fields.len());
        for (position, field) in fields.iter().enumerate() {
            if index.insert(field.id(), position).is_some() {
                return Err(DefinitionError::DuplicateField(field.id()));
            }
        }

        let graph_ids = collect_graph_ids(&fields)?;

        let mut offsets = Vec::with_capacity(fields.len());
        let mut footprint = 0usize;
        for field in &fields {
            offsets.push(footprint);
            footprint = footprint
                .checked_add(field.size())
                .ok_or(DefinitionError::FootprintOverflow(name))?;
        }

        if footprint == 0 {
            return Err(DefinitionError::ZeroFootprint(name));
        }

        debug!(
            composite = name,
            fields = fields.len(),
            footprint,
            "composite defined"
        );

        Ok(Arc::new(Self {
            name,
            fields,
            offsets,
            index,
            graph_ids,
            footprint,
            identity: NEXT_IDENTITY.fetch_add(1, Ordering::Relaxed),
        }))
    }

    #[inline(always)]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Total ukuran record dalam bytes (cached)
    #[inline(always)]
    pub fn footprint(&self) -> usize {
        self.footprint
    }

    /// Identitas unik composite ini dalam proses
    #[inline(always)]
    pub fn identity(&self) -> u64 {
        self.identity
    }

    /// Jumlah field langsung
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Selalu `false`: composite kosong ditolak saat `define`
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Offset field langsung ke-`position`
    pub fn field_offset(&self, position: usize) -> Option<usize> {
        self.offsets.get(position).copied()
    }

    /// Field langsung dengan id tertentu
    pub fn field_by_id(&self, id: FieldId) -> Option<&FieldDescriptor> {
        self.index.get(&id).map(|&position| &self.fields[position])
    }

    /// Apakah id ada di mana saja dalam graph composite ini
    pub fn contains(&self, id: FieldId) -> bool {
        self.graph_ids.contains(&id)
    }

    /// Satu-satunya field jika composite hanya berisi satu field.
    ///
    /// Composite satu field bisa dipakai seperti field biasa bertipe sama.
    pub fn sole_field(&self) -> Option<&FieldDescriptor> {
        match self.fields.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    #[inline(always)]
    pub fn first_field(&self) -> &FieldDescriptor {
        &self.fields[0]
    }

    #[inline(always)]
    pub fn last_field(&self) -> &FieldDescriptor {
        &self.fields[self.fields.len() - 1]
    }

    /// Offset field yang ditunjuk path, relatif ke awal composite ini.
    ///
    /// Path boleh berakhir di field composite (offset awal composite itu).
    pub fn offset(&self, path: &[FieldId]) -> Result<usize, ResolutionError> {
        self.walk(path).map(|(offset, _)| offset)
    }

    /// Resolusi path ke slot scalar.
    ///
    /// Jika path berakhir di composite satu field, resolusi lanjut ke
    /// field tunggal tersebut (offset-nya selalu 0).
    pub fn resolve(&self, path: &[FieldId]) -> Result<Slot, ResolutionError> {
        let (offset, mut field) = self.walk(path)?;
        loop {
            match field.kind() {
                FieldKind::Scalar(tag) => return Ok(Slot::new(field.id(), offset, *tag)),
                FieldKind::Composite(nested) => match nested.sole_field() {
                    Some(sole) => field = sole,
                    None => return Err(ResolutionError::NotAScalar { id: field.id() }),
                },
            }
        }
    }

    /// Handle bertipe untuk akses tanpa lookup berulang.
    ///
    /// Tipe `T` harus sama dengan tipe yang dideklarasikan field. Handle
    /// hanya diterima stencil di atas composite yang sama.
    pub fn field<T: Scalar>(&self, path: &[FieldId]) -> Result<Field<T>, StencilError> {
        let slot = self.resolve(path)?;
        slot.check::<T>()?;
        Ok(Field::new(slot.field(), slot.offset(), self.identity))
    }

    fn walk(&self, path: &[FieldId]) -> Result<(usize, &FieldDescriptor), ResolutionError> {
        let (&target, parents) = path.split_last().ok_or(ResolutionError::EmptyPath)?;

        let mut current = self;
        let mut total = 0usize;
        for (depth, &id) in parents.iter().enumerate() {
            let position = current.position(id, depth)?;
            total += current.offsets[position];
            current = current.fields[position]
                .as_composite()
                .map(Arc::as_ref)
                .ok_or(ResolutionError::NotAComposite { id })?;
        }

        let position = current.position(target, parents.len())?;
        Ok((
            total + current.offsets[position],
            &current.fields[position],
        ))
    }

    #[inline(always)]
    fn position(&self, id: FieldId, depth: usize) -> Result<usize, ResolutionError> {
        self.index
            .get(&id)
            .copied()
            .ok_or(ResolutionError::UnknownField { id, depth })
    }
}

/// Kumpulkan semua id dalam graph, setiap node composite dihitung sekali.
fn collect_graph_ids(fields: &[FieldDescriptor]) -> Result<HashSet<FieldId>, DefinitionError> {
    let mut ids = HashSet::new();
    for field in fields {
        if !ids.insert(field.id()) {
            return Err(DefinitionError::DuplicateField(field.id()));
        }
    }

    let mut visited: HashSet<*const Composite> = HashSet::new();
    let mut pending: Vec<&Composite> = fields
        .iter()
        .filter_map(|f| f.as_composite().map(Arc::as_ref))
        .collect();

    while let Some(node) = pending.pop() {
        if !visited.insert(node as *const Composite) {
            continue;
        }
        for field in &node.fields {
            if !ids.insert(field.id()) {
                return Err(DefinitionError::DuplicateField(field.id()));
            }
            if let Some(nested) = field.as_composite() {
                pending.push(Arc::as_ref(nested));
            }
        }
    }

    Ok(ids)
}

impl fmt::Display for Composite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({} bytes)", self.name, self.footprint)?;
        for (field, offset) in self.fields.iter().zip(&self.offsets) {
            let kind = match field.kind() {
                FieldKind::Scalar(tag) => tag.name(),
                FieldKind::Composite(nested) => nested.name(),
            };
            writeln!(
                f,
                "  @{:<4} {} [id {}]: {} ({} bytes)",
                offset,
                field.name(),
                field.id(),
                kind,
                field.size()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::IdSequence;

    fn point() -> Arc<Composite> {
        Composite::define(
            "Point",
            vec![
                FieldDescriptor::scalar::<i32>(FieldId::new(0), "x"),
                FieldDescriptor::scalar::<i32>(FieldId::new(1), "y"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_footprint_and_offsets() {
        let header = Composite::define(
            "Header",
            vec![
                FieldDescriptor::scalar::<u8>(FieldId::new(0), "tag"),
                FieldDescriptor::scalar::<u64>(FieldId::new(1), "sequence"),
                FieldDescriptor::scalar::<u16>(FieldId::new(2), "flags"),
            ],
        )
        .unwrap();

        assert_eq!(header.footprint(), 11);
        assert_eq!(header.offset(&[FieldId::new(0)]).unwrap(), 0);
        assert_eq!(header.offset(&[FieldId::new(1)]).unwrap(), 1);
        assert_eq!(header.offset(&[FieldId::new(2)]).unwrap(), 9);
        assert_eq!(header.field_offset(2), Some(9));
        assert_eq!(header.field_offset(3), None);
    }

    #[test]
    fn test_empty_composite_rejected() {
        let err = Composite::define("Empty", vec![]).unwrap_err();
        assert_eq!(err, DefinitionError::EmptyComposite("Empty"));
    }

    #[test]
    fn test_zero_footprint_rejected() {
        let err = Composite::define(
            "Unit",
            vec![FieldDescriptor::scalar::<()>(FieldId::new(0), "nothing")],
        )
        .unwrap_err();
        assert_eq!(err, DefinitionError::ZeroFootprint("Unit"));
    }

    #[test]
    fn test_footprint_overflow_rejected() {
        // Setiap level menggandakan footprint lewat Arc yang sama
        let mut current = Composite::define(
            "Page",
            vec![FieldDescriptor::scalar::<[u8; 4096]>(FieldId::new(0), "bytes")],
        )
        .unwrap();
        let mut ids = IdSequence::starting_at(1);

        let err = loop {
            let fields = vec![
                FieldDescriptor::nested(ids.next(), "a", current.clone()),
                FieldDescriptor::nested(ids.next(), "b", current.clone()),
            ];
            match Composite::define("Doubled", fields) {
                Ok(next) => {
                    assert_eq!(next.footprint(), current.footprint() * 2);
                    current = next;
                }
                Err(err) => break err,
            }
        };

        assert_eq!(err, DefinitionError::FootprintOverflow("Doubled"));
        assert_eq!(current.footprint(), 1usize << (usize::BITS - 1));
    }

    #[test]
    fn test_identity_distinct_per_define() {
        let (a, b) = (point(), point());
        assert_ne!(a.identity(), b.identity());
        assert_eq!(a.identity(), a.clone().identity());
    }

    #[test]
    fn test_duplicate_direct_ids() {
        let err = Composite::define(
            "Bad",
            vec![
                FieldDescriptor::scalar::<u32>(FieldId::new(7), "a"),
                FieldDescriptor::scalar::<u32>(FieldId::new(7), "b"),
            ],
        )
        .unwrap_err();
        assert_eq!(err, DefinitionError::DuplicateField(FieldId::new(7)));
    }

    #[test]
    fn test_duplicate_id_across_nesting() {
        // id 1 sudah dipakai `y` di dalam Point
        let err = Composite::define(
            "Bad",
            vec![
                FieldDescriptor::nested(FieldId::new(2), "p", point()),
                FieldDescriptor::scalar::<u8>(FieldId::new(1), "clash"),
            ],
        )
        .unwrap_err();
        assert_eq!(err, DefinitionError::DuplicateField(FieldId::new(1)));
    }

    #[test]
    fn test_distinct_composites_sharing_ids() {
        let err = Composite::define(
            "Bad",
            vec![
                FieldDescriptor::nested(FieldId::new(2), "a", point()),
                FieldDescriptor::nested(FieldId::new(3), "b", point()),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, DefinitionError::DuplicateField(_)));
    }

    #[test]
    fn test_shared_composite_reused() {
        let point = point();
        let line = Composite::define(
            "Line",
            vec![
                FieldDescriptor::nested(FieldId::new(2), "a", point.clone()),
                FieldDescriptor::nested(FieldId::new(3), "b", point.clone()),
            ],
        )
        .unwrap();

        // Line dipakai lagi bersama Point yang sama di level lain
        let shape = Composite::define(
            "Shape",
            vec![
                FieldDescriptor::nested(FieldId::new(4), "edge", line),
                FieldDescriptor::nested(FieldId::new(5), "origin", point),
            ],
        )
        .unwrap();
        assert_eq!(shape.footprint(), 24);
        assert!(shape.contains(FieldId::new(0)));
        assert!(shape.contains(FieldId::new(5)));
        assert!(!shape.contains(FieldId::new(6)));
    }

    #[test]
    fn test_resolution_errors() {
        let point = point();
        assert_eq!(point.offset(&[]), Err(ResolutionError::EmptyPath));
        assert_eq!(
            point.offset(&[FieldId::new(9)]),
            Err(ResolutionError::UnknownField {
                id: FieldId::new(9),
                depth: 0
            })
        );
        assert_eq!(
            point.offset(&[FieldId::new(0), FieldId::new(1)]),
            Err(ResolutionError::NotAComposite {
                id: FieldId::new(0)
            })
        );
    }

    #[test]
    fn test_resolve_requires_scalar() {
        let line = Composite::define(
            "Line",
            vec![
                FieldDescriptor::nested(FieldId::new(2), "a", point()),
                FieldDescriptor::scalar::<u8>(FieldId::new(3), "color"),
            ],
        )
        .unwrap();

        // offset ke composite boleh, resolve ke scalar tidak
        assert_eq!(line.offset(&[FieldId::new(2)]).unwrap(), 0);
        assert_eq!(
            line.resolve(&[FieldId::new(2)]).unwrap_err(),
            ResolutionError::NotAScalar {
                id: FieldId::new(2)
            }
        );
    }

    #[test]
    fn test_single_field_composite_acts_as_scalar() {
        let celsius = Composite::define(
            "Celsius",
            vec![FieldDescriptor::scalar::<f32>(FieldId::new(0), "value")],
        )
        .unwrap();
        let reading = Composite::define(
            "Reading",
            vec![
                FieldDescriptor::scalar::<u16>(FieldId::new(1), "sensor"),
                FieldDescriptor::nested(FieldId::new(2), "temperature", celsius.clone()),
            ],
        )
        .unwrap();

        assert_eq!(celsius.sole_field().map(|f| f.id()), Some(FieldId::new(0)));
        assert!(reading.sole_field().is_none());
        assert_eq!(reading.first_field().name(), "sensor");
        assert_eq!(reading.last_field().name(), "temperature");

        let slot = reading.resolve(&[FieldId::new(2)]).unwrap();
        assert_eq!(slot.offset(), 2);
        assert_eq!(slot.field(), FieldId::new(0));
        assert!(slot.tag().is::<f32>());
    }

    #[test]
    fn test_typed_handle() {
        let point = point();
        let y = point.field::<i32>(&[FieldId::new(1)]).unwrap();
        assert_eq!(y.offset(), 4);

        let err = point.field::<u32>(&[FieldId::new(1)]).unwrap_err();
        assert!(matches!(err, StencilError::TypeMismatch { .. }));
    }

    #[test]
    fn test_display() {
        let text = point().to_string();
        assert!(text.starts_with("Point (8 bytes)"));
        assert!(text.contains("y [id 1]: i32 (4 bytes)"));
    }
}
