// Licensed under the Apache-2.0 license

//! Property-based tests for the validator, the layout engine and the
//! generators.
//!
//! These tests use proptest to generate random register maps and verify that:
//! 1. Disjoint field sets are always accepted, overlapping ones always rejected
//! 2. Misaligned or duplicated register addresses are always rejected, naming
//!    the offending registers
//! 3. Registers and reserved spans tile the address space exactly
//! 4. Compilation and generation are deterministic

use proptest::prelude::*;
use regmap_generator::{
    compile, compile_with_config, generate, CompileError, FieldDesc, GlobalConfig, RegisterDesc,
    RegisterMapDesc, Slot, Target,
};
use std::collections::BTreeSet;

// =============================================================================
// STRATEGY GENERATORS
// =============================================================================

/// Fields that tile part of a 32-bit word without overlapping, in random
/// declaration order.
fn disjoint_fields() -> impl Strategy<Value = Vec<FieldDesc>> {
    prop::collection::vec((0u32..4, 1u32..=8), 1..8)
        .prop_map(|runs| {
            let mut fields = Vec::new();
            let mut next = 0;
            for (i, (gap, width)) in runs.into_iter().enumerate() {
                let lsb = next + gap;
                if lsb + width > 32 {
                    break;
                }
                fields.push(FieldDesc {
                    name: format!("F{i}"),
                    lsb,
                    width,
                    reset: (1 << width) - 1,
                    ..Default::default()
                });
                next = lsb + width;
            }
            fields
        })
        .prop_filter("at least one field", |f| !f.is_empty())
        .prop_shuffle()
}

/// A disjoint field set plus one extra field sharing a bit with an existing one.
fn overlapping_fields() -> impl Strategy<Value = Vec<FieldDesc>> {
    (disjoint_fields(), any::<prop::sample::Index>(), any::<u32>()).prop_map(
        |(mut fields, victim, bit)| {
            let victim = victim.get(&fields).clone();
            let lsb = victim.lsb + bit % victim.width;
            fields.push(FieldDesc {
                name: "INTRUDER".into(),
                lsb,
                width: 1,
                ..Default::default()
            });
            fields
        },
    )
}

fn single_register(fields: Vec<FieldDesc>) -> RegisterMapDesc {
    RegisterMapDesc {
        name: "regs".into(),
        base_address: 0,
        registers: vec![RegisterDesc {
            name: "REG".into(),
            address: 0,
            fields,
            ..Default::default()
        }],
    }
}

/// Registers at random distinct word slots above a random base, declared in
/// descending address order.
fn word_slot_map(
    widths: Vec<u32>,
    count: std::ops::Range<usize>,
) -> impl Strategy<Value = (RegisterMapDesc, u32)> {
    (
        prop::sample::select(widths),
        0u64..0x100,
        prop::collection::btree_set(0u64..64, count),
    )
        .prop_map(|(bits, base_words, slots): (u32, u64, BTreeSet<u64>)| {
            let bytes = u64::from(bits / 8);
            let base = base_words * bytes;
            let registers = slots
                .iter()
                .rev()
                .map(|slot| RegisterDesc {
                    name: format!("R{slot}"),
                    address: base + slot * bytes,
                    fields: vec![FieldDesc {
                        name: "V".into(),
                        ..Default::default()
                    }],
                    ..Default::default()
                })
                .collect();
            (
                RegisterMapDesc {
                    name: "sparse".into(),
                    base_address: base,
                    registers,
                },
                bits,
            )
        })
}

fn sparse_map() -> impl Strategy<Value = (RegisterMapDesc, u32)> {
    word_slot_map(vec![8, 16, 32, 64], 0..16)
}

/// A valid map where one random register is moved off its word boundary.
/// Yields the map, the word width and the moved register's name and address.
fn misaligned_map() -> impl Strategy<Value = (RegisterMapDesc, u32, String, u64)> {
    (
        word_slot_map(vec![16, 32, 64], 1..16),
        any::<prop::sample::Index>(),
        any::<u64>(),
    )
        .prop_map(|((mut desc, bits), victim, shift)| {
            let bytes = u64::from(bits / 8);
            let reg = victim.get_mut(&mut desc.registers);
            reg.address += 1 + shift % (bytes - 1);
            let (name, address) = (reg.name.clone(), reg.address);
            (desc, bits, name, address)
        })
}

/// A valid map plus a register `DUP`, declared last, at the address of a
/// random existing register. Yields the map, the word width and the name and
/// address of the register it duplicates.
fn duplicated_map() -> impl Strategy<Value = (RegisterMapDesc, u32, String, u64)> {
    (word_slot_map(vec![8, 16, 32, 64], 1..16), any::<prop::sample::Index>()).prop_map(
        |((mut desc, bits), victim)| {
            let original = victim.get(&desc.registers).clone();
            desc.registers.push(RegisterDesc {
                name: "DUP".into(),
                ..original.clone()
            });
            (desc, bits, original.name, original.address)
        },
    )
}

// =============================================================================
// VALIDATOR PROPERTIES
// =============================================================================

proptest! {
    /// Fields that share no bit are always accepted, in any declaration order
    #[test]
    fn disjoint_fields_are_accepted(fields in disjoint_fields()) {
        let map = compile(&single_register(fields.clone()));
        prop_assert!(map.is_ok(), "{:?}", map);
        let map = map.unwrap();
        let reg = &map.registers()[0];
        let union = reg.fields().iter().fold(0u64, |acc, f| {
            assert_eq!(acc & f.mask(), 0);
            acc | f.mask()
        });
        // every field resets to all ones, so the register reset is the union
        prop_assert_eq!(reg.reset(), union);
    }

    /// Adding a field that shares a bit with another is always rejected
    #[test]
    fn overlapping_fields_are_rejected(fields in overlapping_fields()) {
        match compile(&single_register(fields)) {
            Err(CompileError::Overlap { first, second, .. }) => {
                prop_assert!(first == "INTRUDER" || second == "INTRUDER");
            }
            other => prop_assert!(false, "expected overlap, got {:?}", other),
        }
    }
}

proptest! {
    /// Moving any register off its word boundary is reported for that register
    #[test]
    fn misaligned_addresses_are_rejected((desc, bits, name, address) in misaligned_map()) {
        let config = GlobalConfig::new().data_width(bits);
        match compile_with_config(&desc, &config) {
            Err(CompileError::MisalignedAddress { register, address: at, word_bytes }) => {
                prop_assert_eq!(register, name);
                prop_assert_eq!(at, address);
                prop_assert_eq!(word_bytes, u64::from(bits / 8));
            }
            other => prop_assert!(false, "expected misaligned address, got {:?}", other),
        }
    }

    /// Declaring a second register at an occupied address names both registers
    #[test]
    fn duplicate_addresses_are_rejected((desc, bits, name, address) in duplicated_map()) {
        let config = GlobalConfig::new().data_width(bits);
        prop_assert_eq!(
            compile_with_config(&desc, &config),
            Err(CompileError::DuplicateAddress {
                address,
                first: name,
                second: "DUP".into(),
            })
        );
    }
}

// =============================================================================
// LAYOUT PROPERTIES
// =============================================================================

proptest! {
    /// Registers and reserved spans cover every word from the base to the end
    /// of the last register exactly once
    #[test]
    fn slots_tile_the_address_space((desc, bits) in sparse_map()) {
        let config = GlobalConfig::new().data_width(bits);
        let map = compile_with_config(&desc, &config).unwrap();
        let word_bytes = map.word_width().bytes();

        let mut cursor = map.base_address();
        let mut prev_reserved = false;
        for slot in map.slots() {
            prop_assert_eq!(slot.address(), cursor);
            match slot {
                Slot::Register(_) => {
                    cursor += word_bytes;
                    prev_reserved = false;
                }
                Slot::Reserved(span) => {
                    prop_assert!(span.words > 0);
                    // spans are maximal
                    prop_assert!(!prev_reserved);
                    cursor = span.end_address(map.word_width());
                    prev_reserved = true;
                }
            }
        }
        prop_assert_eq!(cursor, map.end_address());
        prop_assert!(!prev_reserved);

        let registers: Vec<u64> = map.registers().iter().map(|r| r.address()).collect();
        let mut sorted = registers.clone();
        sorted.sort();
        prop_assert_eq!(registers, sorted);
    }
}

// =============================================================================
// DETERMINISM
// =============================================================================

proptest! {
    /// The same description always produces byte-identical output
    #[test]
    fn generation_is_deterministic((desc, bits) in sparse_map()) {
        let config = GlobalConfig::new().data_width(bits);
        let targets = [
            Target::CHeader { path: "regs.h".into(), prefix: None },
            Target::Rust { path: "regs.rs".into() },
            Target::Python { path: "regs.py".into() },
            Target::Json { path: "regs.json".into() },
            Target::Markdown {
                path: "regs.md".into(),
                title: "Register map".into(),
                print_conventions: true,
                print_images: true,
            },
        ];
        let first = compile_with_config(&desc, &config).unwrap();
        let second = compile_with_config(&desc, &config).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(generate(&first, &targets), generate(&second, &targets));
    }
}
