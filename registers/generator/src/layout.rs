// Licensed under the Apache-2.0 license

//! Address layout: finds the reserved spans between registers.

use crate::error::{CompileError, CompileResult};
use crate::model::{Register, WordWidth};

/// A run of unused words inside the register map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ReservedSpan {
    /// Absolute address of the first unused word.
    pub start_address: u64,
    /// Number of unused words.
    pub words: u64,
}

impl ReservedSpan {
    /// Address just past the span.
    pub fn end_address(&self, word: WordWidth) -> u64 {
        self.start_address + self.words * word.bytes()
    }
}

/// One entry of the contiguous register map description.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot<'a> {
    Register(&'a Register),
    Reserved(ReservedSpan),
}

impl Slot<'_> {
    pub fn address(&self) -> u64 {
        match self {
            Slot::Register(r) => r.address(),
            Slot::Reserved(s) => s.start_address,
        }
    }
}

/// Computes the spans that, together with `registers`, cover every word from
/// `base` to the end of the last register exactly once.
///
/// `registers` must be validated and sorted by address.
pub fn reserved_spans(
    base: u64,
    word: WordWidth,
    registers: &[Register],
) -> CompileResult<Vec<ReservedSpan>> {
    let word_bytes = word.bytes();
    let mut spans = Vec::new();
    let mut cursor = base;
    for r in registers {
        let gap = r
            .address()
            .checked_sub(cursor)
            .ok_or_else(|| CompileError::NegativeGap {
                register: r.name().to_string(),
                address: r.address(),
                cursor,
            })?;
        if gap > 0 {
            spans.push(ReservedSpan {
                start_address: cursor,
                words: gap / word_bytes,
            });
        }
        cursor = r.address() + word_bytes;
    }
    Ok(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NameCase;
    use crate::description::{FieldDesc, RegisterDesc};

    fn regs(addresses: &[u64]) -> Vec<Register> {
        addresses
            .iter()
            .enumerate()
            .map(|(i, &address)| {
                let desc = RegisterDesc {
                    name: format!("R{i}"),
                    address,
                    fields: vec![FieldDesc {
                        name: "F".into(),
                        ..Default::default()
                    }],
                    ..Default::default()
                };
                Register::from_desc(&desc, WordWidth::W32, NameCase::None).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_leading_span() {
        let spans = reserved_spans(0, WordWidth::W32, &regs(&[0x4])).unwrap();
        assert_eq!(
            spans,
            vec![ReservedSpan {
                start_address: 0,
                words: 1
            }]
        );
    }

    #[test]
    fn test_packed_registers_have_no_spans() {
        let spans = reserved_spans(0x100, WordWidth::W32, &regs(&[0x100, 0x104, 0x108])).unwrap();
        assert!(spans.is_empty());
    }

    #[test]
    fn test_interior_spans() {
        let spans = reserved_spans(0, WordWidth::W32, &regs(&[0x0, 0x4, 0x10, 0x20])).unwrap();
        assert_eq!(
            spans,
            vec![
                ReservedSpan {
                    start_address: 0x8,
                    words: 2
                },
                ReservedSpan {
                    start_address: 0x14,
                    words: 3
                },
            ]
        );
        assert_eq!(spans[1].end_address(WordWidth::W32), 0x20);
    }

    #[test]
    fn test_empty_map() {
        assert_eq!(reserved_spans(0x40, WordWidth::W32, &[]), Ok(vec![]));
    }

    #[test]
    fn test_negative_gap_is_reported() {
        let spans = reserved_spans(0, WordWidth::W32, &regs(&[0x8, 0x4]));
        assert_eq!(
            spans,
            Err(CompileError::NegativeGap {
                register: "R1".into(),
                address: 0x4,
                cursor: 0xc,
            })
        );
    }
}
