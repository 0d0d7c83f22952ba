// Licensed under the Apache-2.0 license

//! Error taxonomy for register map compilation.
//!
//! Every error is raised while building, validating or laying out the model.
//! Code generation only ever sees a validated [`crate::RegisterMap`] and has no
//! error path of its own.

use crate::model::{AccessMode, Modifier};
use thiserror::Error;

/// The kind of item a name belongs to, used in error messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameKind {
    Map,
    Register,
    Field,
    Enum,
}

impl std::fmt::Display for NameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            NameKind::Map => "register map",
            NameKind::Register => "register",
            NameKind::Field => "field",
            NameKind::Enum => "enumerated value",
        })
    }
}

/// Malformed field or register definition.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum SchemaError {
    #[error("unsupported word width {bits}; expected 8, 16, 32 or 64")]
    UnsupportedWordWidth { bits: u32 },

    #[error("{kind} name {name:?} is not an identifier (must start with a letter)")]
    InvalidName { kind: NameKind, name: String },

    #[error("{kind} {name}: description must be a single line")]
    MultiLineDescription { kind: NameKind, name: String },

    #[error("generated symbol {symbol} is claimed by both {first} and {second}")]
    SymbolClash {
        symbol: String,
        first: String,
        second: String,
    },

    #[error("register {register}: field {field} has zero width")]
    ZeroWidth { register: String, field: String },

    #[error("register {register}: field {field} width {width} exceeds the {word_bits}-bit word")]
    WidthTooLarge {
        register: String,
        field: String,
        width: u32,
        word_bits: u32,
    },

    #[error(
        "register {register}: field {field} bits [{lsb}..{end}) do not fit in the {word_bits}-bit word",
        end = range_end(.lsb, .width)
    )]
    FieldOutOfRange {
        register: String,
        field: String,
        lsb: u32,
        width: u32,
        word_bits: u32,
    },

    #[error("register {register}: field {field} reset value {reset:#x} does not fit in {width} bits")]
    ResetOutOfRange {
        register: String,
        field: String,
        reset: u64,
        width: u32,
    },

    #[error("register {register}: field {field} enumerated value {name} = {value:#x} does not fit in {width} bits")]
    EnumOutOfRange {
        register: String,
        field: String,
        name: String,
        value: u64,
        width: u32,
    },

    #[error("register {register}: field {field} declares enumerated value {name} more than once")]
    DuplicateEnumName {
        register: String,
        field: String,
        name: String,
    },

    #[error("register {register}: field {field} declares enumerated value {value:#x} more than once")]
    DuplicateEnumValue {
        register: String,
        field: String,
        value: u64,
    },

    #[error("register {register}: field {field} ({access}) does not support modifiers {modifiers:?}")]
    UnsupportedModifiers {
        register: String,
        field: String,
        access: AccessMode,
        modifiers: Vec<Modifier>,
    },

    #[error("register {register} declares field {field} more than once")]
    DuplicateFieldName { register: String, field: String },

    #[error("register {register} has no fields")]
    NoFields { register: String },

    #[error("register {name} is declared more than once")]
    DuplicateRegisterName { name: String },

    #[error("base address {base:#x} is not a multiple of the {word_bytes}-byte word")]
    MisalignedBase { base: u64, word_bytes: u64 },

    #[error("register {register} address {address:#x} is below the base address {base:#x}")]
    AddressBelowBase {
        register: String,
        address: u64,
        base: u64,
    },

    #[error("register {register} at {address:#x} extends past the end of the address space")]
    AddressOutOfRange { register: String, address: u64 },
}

/// A violation found while compiling one register map.
///
/// The first violation aborts the compilation of that unit.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum CompileError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(
        "register {register}: field {first} [{first_lsb}..{first_end}) overlaps field {second} [{second_lsb}..{second_end})",
        first_end = range_end(.first_lsb, .first_width),
        second_end = range_end(.second_lsb, .second_width)
    )]
    Overlap {
        register: String,
        first: String,
        first_lsb: u32,
        first_width: u32,
        second: String,
        second_lsb: u32,
        second_width: u32,
    },

    #[error("registers {first} and {second} are both declared at address {address:#x}")]
    DuplicateAddress {
        address: u64,
        first: String,
        second: String,
    },

    #[error("register {register} address {address:#x} is not a multiple of the {word_bytes}-byte word")]
    MisalignedAddress {
        register: String,
        address: u64,
        word_bytes: u64,
    },

    /// Internal consistency failure of the layout engine. Unreachable for
    /// register sets that passed validation.
    #[error("internal error: layout cursor {cursor:#x} is past register {register} at {address:#x}")]
    NegativeGap {
        register: String,
        address: u64,
        cursor: u64,
    },
}

fn range_end(lsb: &u32, width: &u32) -> u64 {
    u64::from(*lsb) + u64::from(*width)
}

/// Result type for register map compilation.
pub type CompileResult<T> = std::result::Result<T, CompileError>;
