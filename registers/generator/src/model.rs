// Licensed under the Apache-2.0 license

//! The validated register map model.
//!
//! ```text
//! RegisterMap
//! ├── registers: Vec<Register>         # ascending address
//! │   └── fields: Vec<Field>           # declaration order
//! │       └── enum_values: Vec<EnumValue>
//! └── reserved: Vec<ReservedSpan>      # gaps, inserted by the layout engine
//! ```
//!
//! Values are built once by [`crate::compile`] and are immutable afterwards.
//! Bounds are checked with 128-bit intermediates so that a reset or enumerated
//! value can never silently overflow its field.

use crate::config::NameCase;
use crate::description::{EnumDesc, FieldDesc, RegisterDesc};
use crate::error::{NameKind, SchemaError};
use crate::layout::{ReservedSpan, Slot};
use crate::util::is_identifier;
use serde::Deserialize;
use std::fmt;
use std::ops::Range;

/// Storage word size of a register map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WordWidth(u32);

impl WordWidth {
    pub const W8: WordWidth = WordWidth(8);
    pub const W16: WordWidth = WordWidth(16);
    pub const W32: WordWidth = WordWidth(32);
    pub const W64: WordWidth = WordWidth(64);

    pub fn new(bits: u32) -> Result<Self, SchemaError> {
        match bits {
            8 | 16 | 32 | 64 => Ok(WordWidth(bits)),
            _ => Err(SchemaError::UnsupportedWordWidth { bits }),
        }
    }

    /// Width in bits.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Size of one word in bytes.
    pub fn bytes(self) -> u64 {
        u64::from(self.0 / 8)
    }
}

impl Default for WordWidth {
    fn default() -> Self {
        WordWidth::W32
    }
}

/// `((1 << width) - 1) << lsb`, computed without overflow for any field that
/// fits in a 64-bit word.
pub fn field_mask(width: u32, lsb: u32) -> u64 {
    if width == 0 {
        return 0;
    }
    (((1u128 << width) - 1) << lsb) as u64
}

/// Trims a description; line breaks are rejected.
fn single_line(kind: NameKind, name: &str, text: &str) -> Result<String, SchemaError> {
    let text = text.trim();
    if text.contains(['\n', '\r']) {
        return Err(SchemaError::MultiLineDescription {
            kind,
            name: name.to_string(),
        });
    }
    Ok(text.to_string())
}

fn fits_in(value: u64, width: u32) -> bool {
    u128::from(value) < (1u128 << width)
}

/// Software access mode of a field or register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub enum AccessMode {
    #[serde(rename = "ro", alias = "read-only")]
    ReadOnly,
    #[serde(rename = "wo", alias = "write-only")]
    WriteOnly,
    #[serde(rename = "rw", alias = "read-write")]
    ReadWrite,
}

impl AccessMode {
    pub fn can_read(self) -> bool {
        self != AccessMode::WriteOnly
    }

    pub fn can_write(self) -> bool {
        self != AccessMode::ReadOnly
    }

    /// Two-letter form (`ro`, `wo`, `rw`).
    pub fn short(self) -> &'static str {
        match self {
            AccessMode::ReadOnly => "ro",
            AccessMode::WriteOnly => "wo",
            AccessMode::ReadWrite => "rw",
        }
    }
}

impl Default for AccessMode {
    fn default() -> Self {
        AccessMode::ReadWrite
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccessMode::ReadOnly => "read-only",
            AccessMode::WriteOnly => "write-only",
            AccessMode::ReadWrite => "read-write",
        })
    }
}

/// Side effects attached to a field's access mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    SelfClear,
    Write1ToClear,
    Write1ToToggle,
    ReadToClear,
    ReadConst,
    ExternalUpdate,
    Memory,
}

impl Modifier {
    pub fn as_str(self) -> &'static str {
        match self {
            Modifier::SelfClear => "self_clear",
            Modifier::Write1ToClear => "write1_to_clear",
            Modifier::Write1ToToggle => "write1_to_toggle",
            Modifier::ReadToClear => "read_to_clear",
            Modifier::ReadConst => "read_const",
            Modifier::ExternalUpdate => "external_update",
            Modifier::Memory => "memory",
        }
    }

    /// Modifier sets (sorted) that may be combined with `access`.
    fn allowed(access: AccessMode) -> &'static [&'static [Modifier]] {
        use Modifier::*;
        match access {
            AccessMode::ReadWrite => &[
                &[],
                &[ExternalUpdate],
                &[Write1ToClear, ExternalUpdate],
                &[Write1ToToggle, ExternalUpdate],
                &[Memory],
            ],
            AccessMode::WriteOnly => &[&[], &[SelfClear], &[Memory]],
            AccessMode::ReadOnly => &[
                &[],
                &[ReadConst],
                &[ExternalUpdate],
                &[ReadToClear, ExternalUpdate],
                &[Memory],
            ],
        }
    }

    /// Returns true if the modifier set is supported for `access`.
    /// Order does not matter; repeated modifiers are never supported.
    pub fn is_supported(access: AccessMode, modifiers: &[Modifier]) -> bool {
        let mut sorted = modifiers.to_vec();
        sorted.sort();
        Self::allowed(access).iter().any(|set| *set == sorted.as_slice())
    }
}

/// A named value of a field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumValue {
    name: String,
    value: u64,
    description: String,
}

impl EnumValue {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// One named bit range inside a register.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    name: String,
    description: String,
    width: u32,
    lsb: u32,
    access: AccessMode,
    modifiers: Vec<Modifier>,
    reset: u64,
    enum_values: Vec<EnumValue>,
}

impl Field {
    /// Builds a field of register `register` from its description.
    pub fn from_desc(
        register: &str,
        desc: &FieldDesc,
        word: WordWidth,
        name_case: NameCase,
    ) -> Result<Self, SchemaError> {
        let name = name_case.apply(&desc.name);
        if !is_identifier(&name) {
            return Err(SchemaError::InvalidName {
                kind: NameKind::Field,
                name,
            });
        }
        let err_ctx = || (register.to_string(), name.clone());
        let description = single_line(
            NameKind::Field,
            &format!("{register}.{name}"),
            &desc.description,
        )?;

        if desc.width == 0 {
            let (register, field) = err_ctx();
            return Err(SchemaError::ZeroWidth { register, field });
        }
        if desc.width > word.bits() {
            let (register, field) = err_ctx();
            return Err(SchemaError::WidthTooLarge {
                register,
                field,
                width: desc.width,
                word_bits: word.bits(),
            });
        }
        if u64::from(desc.lsb) + u64::from(desc.width) > u64::from(word.bits()) {
            let (register, field) = err_ctx();
            return Err(SchemaError::FieldOutOfRange {
                register,
                field,
                lsb: desc.lsb,
                width: desc.width,
                word_bits: word.bits(),
            });
        }
        if !fits_in(desc.reset, desc.width) {
            let (register, field) = err_ctx();
            return Err(SchemaError::ResetOutOfRange {
                register,
                field,
                reset: desc.reset,
                width: desc.width,
            });
        }
        if !Modifier::is_supported(desc.access, &desc.modifiers) {
            let (register, field) = err_ctx();
            return Err(SchemaError::UnsupportedModifiers {
                register,
                field,
                access: desc.access,
                modifiers: desc.modifiers.clone(),
            });
        }

        let mut enum_values: Vec<EnumValue> = Vec::with_capacity(desc.enums.len());
        for e in &desc.enums {
            let value = Self::enum_from_desc(register, &name, desc.width, e, name_case)?;
            if enum_values.iter().any(|v| v.name == value.name) {
                let (register, field) = err_ctx();
                return Err(SchemaError::DuplicateEnumName {
                    register,
                    field,
                    name: value.name,
                });
            }
            if enum_values.iter().any(|v| v.value == value.value) {
                let (register, field) = err_ctx();
                return Err(SchemaError::DuplicateEnumValue {
                    register,
                    field,
                    value: value.value,
                });
            }
            enum_values.push(value);
        }

        Ok(Field {
            name,
            description,
            width: desc.width,
            lsb: desc.lsb,
            access: desc.access,
            modifiers: desc.modifiers.clone(),
            reset: desc.reset,
            enum_values,
        })
    }

    fn enum_from_desc(
        register: &str,
        field: &str,
        width: u32,
        desc: &EnumDesc,
        name_case: NameCase,
    ) -> Result<EnumValue, SchemaError> {
        let name = name_case.apply(&desc.name);
        if !is_identifier(&name) {
            return Err(SchemaError::InvalidName {
                kind: NameKind::Enum,
                name,
            });
        }
        let description = single_line(
            NameKind::Enum,
            &format!("{register}.{field}.{name}"),
            &desc.description,
        )?;
        if !fits_in(desc.value, width) {
            return Err(SchemaError::EnumOutOfRange {
                register: register.to_string(),
                field: field.to_string(),
                name,
                value: desc.value,
                width,
            });
        }
        Ok(EnumValue {
            name,
            value: desc.value,
            description,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn lsb(&self) -> u32 {
        self.lsb
    }

    /// Position of the most significant bit.
    pub fn msb(&self) -> u32 {
        self.lsb + self.width - 1
    }

    /// Bit positions occupied by the field.
    pub fn bits(&self) -> Range<u32> {
        self.lsb..self.lsb + self.width
    }

    pub fn access(&self) -> AccessMode {
        self.access
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// Reset value, right-aligned.
    pub fn reset(&self) -> u64 {
        self.reset
    }

    /// Bit mask selecting the field within its register word.
    pub fn mask(&self) -> u64 {
        field_mask(self.width, self.lsb)
    }

    pub fn enum_values(&self) -> &[EnumValue] {
        &self.enum_values
    }
}

/// A word-sized register at a fixed address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Register {
    name: String,
    description: String,
    address: u64,
    fields: Vec<Field>,
}

impl Register {
    /// Builds a register and its fields. Overlap and uniqueness checks are
    /// left to [`crate::validate`].
    pub fn from_desc(
        desc: &RegisterDesc,
        word: WordWidth,
        name_case: NameCase,
    ) -> Result<Self, SchemaError> {
        let name = name_case.apply(&desc.name);
        if !is_identifier(&name) {
            return Err(SchemaError::InvalidName {
                kind: NameKind::Register,
                name,
            });
        }
        let description = single_line(NameKind::Register, &name, &desc.description)?;
        if desc.fields.is_empty() {
            return Err(SchemaError::NoFields { register: name });
        }
        let fields = desc
            .fields
            .iter()
            .map(|f| Field::from_desc(&name, f, word, name_case))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Register {
            name,
            description,
            address: desc.address,
            fields,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Absolute address.
    pub fn address(&self) -> u64 {
        self.address
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Fields in ascending bit position.
    pub fn fields_by_lsb(&self) -> Vec<&Field> {
        let mut sorted: Vec<&Field> = self.fields.iter().collect();
        sorted.sort_by_key(|f| f.lsb);
        sorted
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// OR of every field's reset value shifted into place; uncovered bits are 0.
    pub fn reset(&self) -> u64 {
        self.fields
            .iter()
            .fold(0, |acc, f| acc | (f.reset << f.lsb))
    }

    /// Read-only if every field is read-only, write-only if every field is
    /// write-only, read-write otherwise.
    pub fn access(&self) -> AccessMode {
        if self.fields.iter().all(|f| f.access == AccessMode::ReadOnly) {
            AccessMode::ReadOnly
        } else if self.fields.iter().all(|f| f.access == AccessMode::WriteOnly) {
            AccessMode::WriteOnly
        } else {
            AccessMode::ReadWrite
        }
    }
}

/// A validated, laid-out register map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterMap {
    pub(crate) name: String,
    pub(crate) base_address: u64,
    pub(crate) word_width: WordWidth,
    pub(crate) registers: Vec<Register>,
    pub(crate) reserved: Vec<ReservedSpan>,
}

impl RegisterMap {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_address(&self) -> u64 {
        self.base_address
    }

    pub fn word_width(&self) -> WordWidth {
        self.word_width
    }

    /// Registers in ascending address order.
    pub fn registers(&self) -> &[Register] {
        &self.registers
    }

    pub fn register(&self, name: &str) -> Option<&Register> {
        self.registers.iter().find(|r| r.name == name)
    }

    /// Padding spans between `base_address` and the last register.
    pub fn reserved_spans(&self) -> &[ReservedSpan] {
        &self.reserved
    }

    /// First address past the last register, or the base for an empty map.
    pub fn end_address(&self) -> u64 {
        self.registers
            .last()
            .map(|r| r.address + self.word_width.bytes())
            .unwrap_or(self.base_address)
    }

    /// Registers and reserved spans merged in address order.
    pub fn slots(&self) -> Vec<Slot<'_>> {
        let mut slots = Vec::with_capacity(self.registers.len() + self.reserved.len());
        let mut spans = self.reserved.iter().peekable();
        for reg in &self.registers {
            while let Some(span) = spans.next_if(|s| s.start_address < reg.address) {
                slots.push(Slot::Reserved(*span));
            }
            slots.push(Slot::Register(reg));
        }
        slots.extend(spans.map(|s| Slot::Reserved(*s)));
        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, lsb: u32, width: u32) -> FieldDesc {
        FieldDesc {
            name: name.into(),
            lsb,
            width,
            ..Default::default()
        }
    }

    #[test]
    fn test_field_mask() {
        assert_eq!(field_mask(16, 0), 0xffff);
        assert_eq!(field_mask(1, 31), 0x8000_0000);
        assert_eq!(field_mask(32, 0), 0xffff_ffff);
        assert_eq!(field_mask(64, 0), u64::MAX);
        assert_eq!(field_mask(0, 4), 0);
    }

    #[test]
    fn test_word_width() {
        assert_eq!(WordWidth::new(32).unwrap().bytes(), 4);
        assert_eq!(WordWidth::new(8).unwrap().bits(), 8);
        assert_eq!(
            WordWidth::new(24),
            Err(SchemaError::UnsupportedWordWidth { bits: 24 })
        );
    }

    #[test]
    fn test_field_derived_values() {
        let f = Field::from_desc("CTRL", &field("EN", 4, 3), WordWidth::W32, NameCase::None)
            .unwrap();
        assert_eq!(f.msb(), 6);
        assert_eq!(f.bits(), 4..7);
        assert_eq!(f.mask(), 0x70);
    }

    #[test]
    fn test_field_schema_errors() {
        let w = WordWidth::W32;
        let n = NameCase::None;
        assert!(matches!(
            Field::from_desc("R", &field("F", 0, 0), w, n),
            Err(SchemaError::ZeroWidth { .. })
        ));
        assert!(matches!(
            Field::from_desc("R", &field("F", 0, 33), w, n),
            Err(SchemaError::WidthTooLarge { width: 33, .. })
        ));
        assert!(matches!(
            Field::from_desc("R", &field("F", 30, 4), w, n),
            Err(SchemaError::FieldOutOfRange { lsb: 30, width: 4, .. })
        ));
        let reset = FieldDesc {
            reset: 0x10,
            ..field("F", 0, 4)
        };
        assert!(matches!(
            Field::from_desc("R", &reset, w, n),
            Err(SchemaError::ResetOutOfRange { reset: 0x10, .. })
        ));
        assert!(matches!(
            Field::from_desc("R", &field("1F", 0, 4), w, n),
            Err(SchemaError::InvalidName { kind: NameKind::Field, .. })
        ));
    }

    #[test]
    fn test_full_width_reset_accepted() {
        let desc = FieldDesc {
            reset: 0xcafe_0666,
            ..field("UID", 0, 32)
        };
        let f = Field::from_desc("ID", &desc, WordWidth::W32, NameCase::None).unwrap();
        assert_eq!(f.reset(), 0xcafe_0666);
        assert_eq!(f.mask(), 0xffff_ffff);
    }

    #[test]
    fn test_enum_checks() {
        let enum_desc = |name: &str, value| EnumDesc {
            name: name.into(),
            value,
            description: String::new(),
        };
        let mut desc = field("BAUD", 0, 2);
        desc.enums = vec![enum_desc("B9600", 0), enum_desc("B115200", 4)];
        assert!(matches!(
            Field::from_desc("CTRL", &desc, WordWidth::W32, NameCase::None),
            Err(SchemaError::EnumOutOfRange { value: 4, width: 2, .. })
        ));

        desc.enums = vec![enum_desc("A", 1), enum_desc("B", 1)];
        assert!(matches!(
            Field::from_desc("CTRL", &desc, WordWidth::W32, NameCase::None),
            Err(SchemaError::DuplicateEnumValue { value: 1, .. })
        ));

        desc.enums = vec![enum_desc("A", 1), enum_desc("A", 2)];
        assert!(matches!(
            Field::from_desc("CTRL", &desc, WordWidth::W32, NameCase::None),
            Err(SchemaError::DuplicateEnumName { .. })
        ));
    }

    #[test]
    fn test_modifier_combinations() {
        use Modifier::*;
        assert!(Modifier::is_supported(AccessMode::ReadWrite, &[]));
        assert!(Modifier::is_supported(
            AccessMode::ReadWrite,
            &[ExternalUpdate, Write1ToClear]
        ));
        assert!(Modifier::is_supported(
            AccessMode::ReadOnly,
            &[ReadToClear, ExternalUpdate]
        ));
        assert!(Modifier::is_supported(AccessMode::WriteOnly, &[SelfClear]));
        assert!(!Modifier::is_supported(AccessMode::ReadOnly, &[SelfClear]));
        assert!(!Modifier::is_supported(AccessMode::ReadWrite, &[Write1ToClear]));
        assert!(!Modifier::is_supported(AccessMode::WriteOnly, &[Memory, Memory]));
    }

    #[test]
    fn test_register_reset_and_access() {
        let desc = RegisterDesc {
            name: "CTRL".into(),
            description: String::new(),
            address: 0x10,
            fields: vec![
                FieldDesc {
                    reset: 0x2,
                    access: AccessMode::ReadOnly,
                    ..field("A", 0, 2)
                },
                FieldDesc {
                    reset: 0x1,
                    access: AccessMode::ReadOnly,
                    ..field("B", 8, 1)
                },
            ],
        };
        let reg = Register::from_desc(&desc, WordWidth::W32, NameCase::None).unwrap();
        assert_eq!(reg.reset(), 0x102);
        assert_eq!(reg.access(), AccessMode::ReadOnly);

        let mut mixed = desc.clone();
        mixed.fields[1].access = AccessMode::WriteOnly;
        let reg = Register::from_desc(&mixed, WordWidth::W32, NameCase::None).unwrap();
        assert_eq!(reg.access(), AccessMode::ReadWrite);

        let mut wo = desc;
        for f in &mut wo.fields {
            f.access = AccessMode::WriteOnly;
        }
        let reg = Register::from_desc(&wo, WordWidth::W32, NameCase::None).unwrap();
        assert_eq!(reg.access(), AccessMode::WriteOnly);
    }

    #[test]
    fn test_register_without_fields() {
        let desc = RegisterDesc {
            name: "EMPTY".into(),
            description: String::new(),
            address: 0,
            fields: vec![],
        };
        assert_eq!(
            Register::from_desc(&desc, WordWidth::W32, NameCase::None),
            Err(SchemaError::NoFields {
                register: "EMPTY".into()
            })
        );
    }

    #[test]
    fn test_name_case_applied() {
        let desc = RegisterDesc {
            name: "ctrl".into(),
            description: String::new(),
            address: 0,
            fields: vec![field("en", 0, 1)],
        };
        let reg = Register::from_desc(&desc, WordWidth::W32, NameCase::Upper).unwrap();
        assert_eq!(reg.name(), "CTRL");
        assert_eq!(reg.fields()[0].name(), "EN");
    }

    #[test]
    fn test_descriptions_are_single_line() {
        let desc = RegisterDesc {
            name: "CTRL".into(),
            description: "Control\nint oops = 1;".into(),
            address: 0,
            fields: vec![field("EN", 0, 1)],
        };
        assert_eq!(
            Register::from_desc(&desc, WordWidth::W32, NameCase::None),
            Err(SchemaError::MultiLineDescription {
                kind: NameKind::Register,
                name: "CTRL".into()
            })
        );

        let desc = FieldDesc {
            description: "Enable\r\n".into(),
            ..field("EN", 0, 1)
        };
        // surrounding whitespace is trimmed before the check
        let f = Field::from_desc("CTRL", &desc, WordWidth::W32, NameCase::None).unwrap();
        assert_eq!(f.description(), "Enable");

        let mut desc = field("MODE", 0, 2);
        desc.enums = vec![EnumDesc {
            name: "FAST".into(),
            value: 1,
            description: "fast\r\"\"\" + 1".into(),
        }];
        assert_eq!(
            Field::from_desc("CTRL", &desc, WordWidth::W32, NameCase::None),
            Err(SchemaError::MultiLineDescription {
                kind: NameKind::Enum,
                name: "CTRL.MODE.FAST".into()
            })
        );
    }
}
