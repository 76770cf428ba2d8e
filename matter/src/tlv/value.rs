use super::{ContainerKind, ElementType, FromTLV, TLVReader, TLVWriter, TagType, ToTLV};
use crate::error::Error;

use log::error;
use std::fmt;

/// A dynamically typed TLV value
///
/// Structure and list members keep their tags and the order they were read
/// in. Integers keep their signedness, not their encoded width.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Signed(i64),
    Unsigned(u64),
    F32(f32),
    F64(f64),
    Utf8(String),
    Octets(Vec<u8>),
    Struct(Vec<(TagType, Value)>),
    Array(Vec<Value>),
    List(Vec<(TagType, Value)>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        *self == Value::Null
    }

    /// Look up a member of a structure or list by tag
    pub fn get(&self, tag: TagType) -> Option<&Value> {
        match self {
            Value::Struct(fields) | Value::List(fields) => {
                fields.iter().find(|(t, _)| *t == tag).map(|(_, v)| v)
            }
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::Unsigned(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Signed(v) => Some(v),
            _ => None,
        }
    }
}

/// Decode the next element, whatever its type, into a [`Value`]
///
/// Containers are decoded recursively; the reader ends up positioned after
/// the element.
pub fn to_any(tr: &mut TLVReader) -> Result<Value, Error> {
    let element = tr.peek_element()?;
    let tag = element.get_tag();

    if let Some(kind) = element.container_kind() {
        match kind {
            ContainerKind::Struct => tr.enter_struct(tag)?,
            ContainerKind::Array => tr.enter_array(tag)?,
            ContainerKind::List => tr.enter_list(tag)?,
        }
        let mut members = Vec::new();
        while !tr.is_end_of_container() {
            let member_tag = tr.peek_element()?.get_tag();
            members.push((member_tag, to_any(tr)?));
        }
        tr.exit_container()?;
        return Ok(match kind {
            ContainerKind::Struct => Value::Struct(members),
            ContainerKind::List => Value::List(members),
            ContainerKind::Array => Value::Array(members.into_iter().map(|(_, v)| v).collect()),
        });
    }

    let value = match element.get_element_type() {
        ElementType::S8(_) | ElementType::S16(_) | ElementType::S32(_) | ElementType::S64(_) => {
            Value::Signed(element.i64()?)
        }
        ElementType::U8(_) | ElementType::U16(_) | ElementType::U32(_) | ElementType::U64(_) => {
            Value::Unsigned(element.u64()?)
        }
        ElementType::False => Value::Bool(false),
        ElementType::True => Value::Bool(true),
        ElementType::F32(v) => Value::F32(v),
        ElementType::F64(v) => Value::F64(v),
        ElementType::Utf8l(_)
        | ElementType::Utf16l(_)
        | ElementType::Utf32l(_)
        | ElementType::Utf64l(_) => Value::Utf8(element.utf8()?.to_owned()),
        ElementType::Str8l(s)
        | ElementType::Str16l(s)
        | ElementType::Str32l(s)
        | ElementType::Str64l(s) => Value::Octets(s.to_vec()),
        ElementType::Null => Value::Null,
        ElementType::Struct | ElementType::Array | ElementType::List | ElementType::EndCnt => {
            error!("No element left in the container");
            return Err(Error::TLVNotFound);
        }
    };
    tr.skip_element()?;
    Ok(value)
}

impl ToTLV for Value {
    fn to_tlv(&self, tw: &mut TLVWriter, tag: TagType) -> Result<(), Error> {
        match self {
            Value::Null => tw.null(tag),
            Value::Bool(v) => tw.bool(tag, *v),
            Value::Signed(v) => tw.i64(tag, *v),
            Value::Unsigned(v) => tw.u64(tag, *v),
            Value::F32(v) => tw.f32(tag, *v),
            Value::F64(v) => tw.f64(tag, *v),
            Value::Utf8(s) => tw.utf8(tag, s),
            Value::Octets(s) => tw.str(tag, s),
            Value::Struct(fields) => {
                tw.start_struct(tag)?;
                for (t, v) in fields {
                    v.to_tlv(tw, *t)?;
                }
                tw.end_container()
            }
            Value::List(fields) => {
                tw.start_list(tag)?;
                for (t, v) in fields {
                    v.to_tlv(tw, *t)?;
                }
                tw.end_container()
            }
            Value::Array(entries) => {
                tw.start_array(tag)?;
                for v in entries {
                    v.to_tlv(tw, TagType::Anonymous)?;
                }
                tw.end_container()
            }
        }
    }
}

impl FromTLV<'_> for Value {
    fn from_tlv(tr: &mut TLVReader, tag: TagType) -> Result<Value, Error> {
        let element = tr.peek_element()?;
        if element.is_end_container() || element.get_tag() != tag {
            error!("Expected tag {:?}, found {:?}", tag, element.get_tag());
            return Err(Error::TLVNotFound);
        }
        to_any(tr)
    }
}

fn fmt_members(f: &mut fmt::Formatter<'_>, members: &[(TagType, Value)]) -> fmt::Result {
    for (i, (tag, value)) in members.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        if !tag.is_anonymous() {
            write!(f, "{}: ", tag)?;
        }
        write!(f, "{}", value)?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Signed(v) => write!(f, "{}", v),
            Value::Unsigned(v) => write!(f, "{}", v),
            Value::F32(v) => write!(f, "{:?}", v),
            Value::F64(v) => write!(f, "{:?}", v),
            Value::Utf8(s) => write!(f, "{:?}", s),
            Value::Octets(s) => {
                write!(f, "0x")?;
                for b in s {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
            Value::Struct(fields) => {
                write!(f, "{{")?;
                fmt_members(f, fields)?;
                write!(f, "}}")
            }
            Value::List(fields) => {
                write!(f, "[[")?;
                fmt_members(f, fields)?;
                write!(f, "]]")
            }
            Value::Array(entries) => {
                write!(f, "[")?;
                for (i, v) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
        }
    }
}
