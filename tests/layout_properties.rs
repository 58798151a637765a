//! Property-based tests untuk footprint, offset, dan round trip stream.

use std::sync::Arc;

use proptest::prelude::*;
use stencil::{Composite, FieldDescriptor, FieldId, IdSequence, Stencil};

/// Scalar dengan ukuran berbeda-beda, dipilih lewat index
fn scalar_field(kind: u8, id: FieldId) -> FieldDescriptor {
    match kind % 6 {
        0 => FieldDescriptor::scalar::<u8>(id, "u8"),
        1 => FieldDescriptor::scalar::<u16>(id, "u16"),
        2 => FieldDescriptor::scalar::<u32>(id, "u32"),
        3 => FieldDescriptor::scalar::<u64>(id, "u64"),
        4 => FieldDescriptor::scalar::<[u8; 3]>(id, "rgb"),
        _ => FieldDescriptor::scalar::<u128>(id, "u128"),
    }
}

fn flat(kinds: &[u8], ids: &mut IdSequence) -> Arc<Composite> {
    let fields = kinds.iter().map(|&k| scalar_field(k, ids.next())).collect();
    Composite::define("Flat", fields).unwrap()
}

proptest! {
    #[test]
    fn footprint_is_sum_of_sizes(kinds in prop::collection::vec(any::<u8>(), 1..32)) {
        let mut ids = IdSequence::new();
        let fields: Vec<FieldDescriptor> =
            kinds.iter().map(|&k| scalar_field(k, ids.next())).collect();
        let expected: usize = fields.iter().map(FieldDescriptor::size).sum();

        let composite = Composite::define("Flat", fields).unwrap();
        prop_assert_eq!(composite.footprint(), expected);
    }

    #[test]
    fn offset_is_prefix_sum(kinds in prop::collection::vec(any::<u8>(), 1..32)) {
        let composite = flat(&kinds, &mut IdSequence::new());

        let mut running = 0usize;
        for field in composite.fields() {
            prop_assert_eq!(composite.offset(&[field.id()]).unwrap(), running);
            running += field.size();
        }
        prop_assert_eq!(composite.offset(&[composite.first_field().id()]).unwrap(), 0);
    }

    #[test]
    fn nested_footprint_shifts_followers(
        before in prop::collection::vec(any::<u8>(), 0..8),
        inner in prop::collection::vec(any::<u8>(), 1..8),
        after in prop::collection::vec(any::<u8>(), 1..8),
    ) {
        let mut ids = IdSequence::new();
        let nested = flat(&inner, &mut ids);

        let mut fields: Vec<FieldDescriptor> =
            before.iter().map(|&k| scalar_field(k, ids.next())).collect();
        let preceding: usize = fields.iter().map(FieldDescriptor::size).sum();
        fields.push(FieldDescriptor::nested(ids.next(), "nested", nested.clone()));
        let follower = ids.next();
        fields.push(scalar_field(after[0], follower));

        let outer = Composite::define("Outer", fields).unwrap();
        prop_assert_eq!(outer.offset(&[follower]).unwrap(), preceding + nested.footprint());
    }

    #[test]
    fn stream_round_trip(
        kinds in prop::collection::vec(any::<u8>(), 1..16),
        seed in any::<u8>(),
    ) {
        let layout = flat(&kinds, &mut IdSequence::new());
        let mut record = Stencil::new(layout.clone()).unwrap();
        let image: Vec<u8> = (0..layout.footprint())
            .map(|i| seed.wrapping_add(i as u8))
            .collect();
        record.read_from(&mut image.as_slice()).unwrap();

        let mut stream = Vec::new();
        record.write_to(&mut stream).unwrap();
        prop_assert_eq!(stream.len(), layout.footprint());

        let loaded = Stencil::from_reader(layout, &mut stream.as_slice()).unwrap();
        prop_assert_eq!(loaded.as_bytes().unwrap(), image.as_slice());
    }
}
