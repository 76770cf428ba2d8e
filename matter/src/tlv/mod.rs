use std::fmt;

use num_derive::FromPrimitive;

/* Tag Types */
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TagType {
    Anonymous,
    Context(u8),
    CommonPrf16(u16),
    CommonPrf32(u32),
    ImplPrf16(u16),
    ImplPrf32(u32),
    FullQual48 { vendor_id: u16, profile: u16, tag: u16 },
    FullQual64 { vendor_id: u16, profile: u16, tag: u32 },
}

impl TagType {
    pub const fn context(tag: u8) -> Self {
        TagType::Context(tag)
    }

    /// Return the shortest common-profile tag that holds `tag`
    pub fn common_profile(tag: u32) -> Self {
        match u16::try_from(tag) {
            Ok(t) => TagType::CommonPrf16(t),
            Err(_) => TagType::CommonPrf32(tag),
        }
    }

    /// Return the shortest fully-qualified tag that holds `tag`
    pub fn fully_qualified(vendor_id: u16, profile: u16, tag: u32) -> Self {
        match u16::try_from(tag) {
            Ok(tag) => TagType::FullQual48 {
                vendor_id,
                profile,
                tag,
            },
            Err(_) => TagType::FullQual64 {
                vendor_id,
                profile,
                tag,
            },
        }
    }

    pub fn is_anonymous(&self) -> bool {
        *self == TagType::Anonymous
    }

    /// The tag control code and the tag bytes as a little-endian integer
    pub(crate) fn control_and_value(&self) -> (TagControl, u64) {
        match *self {
            TagType::Anonymous => (TagControl::Anonymous, 0),
            TagType::Context(v) => (TagControl::Context, v as u64),
            TagType::CommonPrf16(v) => (TagControl::CommonPrf16, v as u64),
            TagType::CommonPrf32(v) => (TagControl::CommonPrf32, v as u64),
            TagType::ImplPrf16(v) => (TagControl::ImplPrf16, v as u64),
            TagType::ImplPrf32(v) => (TagControl::ImplPrf32, v as u64),
            TagType::FullQual48 {
                vendor_id,
                profile,
                tag,
            } => (
                TagControl::FullQual48,
                vendor_id as u64 | (profile as u64) << 16 | (tag as u64) << 32,
            ),
            TagType::FullQual64 {
                vendor_id,
                profile,
                tag,
            } => (
                TagControl::FullQual64,
                vendor_id as u64 | (profile as u64) << 16 | (tag as u64) << 32,
            ),
        }
    }
}

impl Default for TagType {
    fn default() -> Self {
        TagType::Anonymous
    }
}

impl From<u8> for TagType {
    fn from(tag: u8) -> Self {
        TagType::Context(tag)
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TagType::Anonymous => Ok(()),
            TagType::Context(t) => write!(f, "{}", t),
            TagType::CommonPrf16(t) => write!(f, "Common({})", t),
            TagType::CommonPrf32(t) => write!(f, "Common({})", t),
            TagType::ImplPrf16(t) => write!(f, "Impl({})", t),
            TagType::ImplPrf32(t) => write!(f, "Impl({})", t),
            TagType::FullQual48 {
                vendor_id,
                profile,
                tag,
            } => write!(f, "0x{:04x}:0x{:04x}:{}", vendor_id, profile, tag),
            TagType::FullQual64 {
                vendor_id,
                profile,
                tag,
            } => write!(f, "0x{:04x}:0x{:04x}:{}", vendor_id, profile, tag),
        }
    }
}

pub const TAG_SHIFT_BITS: u8 = 5;
pub const TAG_MASK: u8 = 0xe0;
pub const TYPE_MASK: u8 = 0x1f;
pub const MAX_TAG_INDEX: usize = 8;

/// Containers may not nest deeper than this, on either the writing or the
/// reading side
pub const MAX_CONTAINER_DEPTH: usize = 32;

pub static TAG_SIZE_MAP: [usize; MAX_TAG_INDEX] = [
    0, // Anonymous
    1, // Context
    2, // CommonPrf16
    4, // CommonPrf32
    2, // ImplPrf16
    4, // ImplPrf32
    6, // FullQual48
    8, // FullQual64
];

/// The upper three bits of the control octet
#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive)]
pub(crate) enum TagControl {
    Anonymous = 0,
    Context = 1,
    CommonPrf16 = 2,
    CommonPrf32 = 3,
    ImplPrf16 = 4,
    ImplPrf32 = 5,
    FullQual48 = 6,
    FullQual64 = 7,
}

/// The lower five bits of the control octet
#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive)]
pub(crate) enum ValueType {
    S8 = 0,
    S16 = 1,
    S32 = 2,
    S64 = 3,
    U8 = 4,
    U16 = 5,
    U32 = 6,
    U64 = 7,
    False = 8,
    True = 9,
    F32 = 10,
    F64 = 11,
    Utf8l = 12,
    Utf16l = 13,
    Utf32l = 14,
    Utf64l = 15,
    Str8l = 16,
    Str16l = 17,
    Str32l = 18,
    Str64l = 19,
    Null = 20,
    Struct = 21,
    Array = 22,
    List = 23,
    EndCnt = 24,
}

pub(crate) const MAX_VALUE_INDEX: usize = 25;

/// The kind of an open container
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ContainerKind {
    Struct,
    Array,
    List,
}

pub(crate) type ContainerStack = heapless::Vec<ContainerKind, MAX_CONTAINER_DEPTH>;

mod reader;
mod traits;
mod value;
mod writer;

pub use matter_macro_derive::{FromTLV, ToTLV};
pub use reader::*;
pub use traits::*;
pub use value::*;
pub use writer::*;
