use super::{
    ContainerKind, ContainerStack, TagControl, TagType, Value, ValueType, MAX_CONTAINER_DEPTH,
    MAX_VALUE_INDEX, TAG_MASK, TAG_SHIFT_BITS, TAG_SIZE_MAP, TYPE_MASK,
};
use crate::error::*;

use byteorder::{ByteOrder, LittleEndian};
use log::{error, info, warn};
use num_traits::FromPrimitive;
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ElementType<'a> {
    S8(i8),
    S16(i16),
    S32(i32),
    S64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    False,
    True,
    F32(f32),
    F64(f64),
    Utf8l(&'a [u8]),
    Utf16l(&'a [u8]),
    Utf32l(&'a [u8]),
    Utf64l(&'a [u8]),
    Str8l(&'a [u8]),
    Str16l(&'a [u8]),
    Str32l(&'a [u8]),
    Str64l(&'a [u8]),
    Null,
    Struct,
    Array,
    List,
    EndCnt,
}

// Extracts the value that starts at the beginning of the slice. The slice is
// guaranteed to hold at least VALUE_SIZE_MAP bytes for the type. Strings also
// consume their payload, that additional size is returned
type ExtractValue = for<'a> fn(&'a [u8]) -> Result<(usize, ElementType<'a>), Error>;

fn read_length_value(t: &[u8], len_size: usize) -> Result<(usize, &[u8]), Error> {
    let len = LittleEndian::read_uint(t, len_size);
    let data = usize::try_from(len)
        .ok()
        .and_then(|len| t[len_size..].get(..len))
        .ok_or_else(|| {
            error!("String of length {} overruns the buffer", len);
            Error::TruncatedPacket
        })?;
    Ok((data.len(), data))
}

static VALUE_EXTRACTOR: [ExtractValue; MAX_VALUE_INDEX] = [
    // S8   0
    { |t| Ok((0, ElementType::S8(t[0] as i8))) },
    // S16  1
    { |t| Ok((0, ElementType::S16(LittleEndian::read_i16(t)))) },
    // S32  2
    { |t| Ok((0, ElementType::S32(LittleEndian::read_i32(t)))) },
    // S64  3
    { |t| Ok((0, ElementType::S64(LittleEndian::read_i64(t)))) },
    // U8   4
    { |t| Ok((0, ElementType::U8(t[0]))) },
    // U16  5
    { |t| Ok((0, ElementType::U16(LittleEndian::read_u16(t)))) },
    // U32  6
    { |t| Ok((0, ElementType::U32(LittleEndian::read_u32(t)))) },
    // U64  7
    { |t| Ok((0, ElementType::U64(LittleEndian::read_u64(t)))) },
    // False 8
    { |_t| Ok((0, ElementType::False)) },
    // True 9
    { |_t| Ok((0, ElementType::True)) },
    // F32  10
    { |t| Ok((0, ElementType::F32(LittleEndian::read_f32(t)))) },
    // F64  11
    { |t| Ok((0, ElementType::F64(LittleEndian::read_f64(t)))) },
    // Utf8l 12
    { |t| read_length_value(t, 1).map(|(l, s)| (l, ElementType::Utf8l(s))) },
    // Utf16l  13
    { |t| read_length_value(t, 2).map(|(l, s)| (l, ElementType::Utf16l(s))) },
    // Utf32l 14
    { |t| read_length_value(t, 4).map(|(l, s)| (l, ElementType::Utf32l(s))) },
    // Utf64l 15
    { |t| read_length_value(t, 8).map(|(l, s)| (l, ElementType::Utf64l(s))) },
    // Str8l 16
    { |t| read_length_value(t, 1).map(|(l, s)| (l, ElementType::Str8l(s))) },
    // Str16l 17
    { |t| read_length_value(t, 2).map(|(l, s)| (l, ElementType::Str16l(s))) },
    // Str32l 18
    { |t| read_length_value(t, 4).map(|(l, s)| (l, ElementType::Str32l(s))) },
    // Str64l 19
    { |t| read_length_value(t, 8).map(|(l, s)| (l, ElementType::Str64l(s))) },
    // Null  20
    { |_t| Ok((0, ElementType::Null)) },
    // Struct 21
    { |_t| Ok((0, ElementType::Struct)) },
    // Array  22
    { |_t| Ok((0, ElementType::Array)) },
    // List  23
    { |_t| Ok((0, ElementType::List)) },
    // EndCnt  24
    { |_t| Ok((0, ElementType::EndCnt)) },
];

// The array indices here correspond to the numeric value of the Element Type
// as defined by Matter
static VALUE_SIZE_MAP: [usize; MAX_VALUE_INDEX] = [
    1, // S8   0
    2, // S16  1
    4, // S32  2
    8, // S64  3
    1, // U8   4
    2, // U16  5
    4, // U32  6
    8, // U64  7
    0, // False 8
    0, // True 9
    4, // F32  10
    8, // F64  11
    1, // Utf8l 12
    2, // Utf16l  13
    4, // Utf32l 14
    8, // Utf64l 15
    1, // Str8l 16
    2, // Str16l 17
    4, // Str32l 18
    8, // Str64l 19
    0, // Null  20
    0, // Struct 21
    0, // Array  22
    0, // List  23
    0, // EndCnt  24
];

fn read_tag(tag_control: TagControl, t: &[u8]) -> TagType {
    match tag_control {
        TagControl::Anonymous => TagType::Anonymous,
        TagControl::Context => TagType::Context(t[0]),
        TagControl::CommonPrf16 => TagType::CommonPrf16(LittleEndian::read_u16(t)),
        TagControl::CommonPrf32 => TagType::CommonPrf32(LittleEndian::read_u32(t)),
        TagControl::ImplPrf16 => TagType::ImplPrf16(LittleEndian::read_u16(t)),
        TagControl::ImplPrf32 => TagType::ImplPrf32(LittleEndian::read_u32(t)),
        TagControl::FullQual48 => TagType::FullQual48 {
            vendor_id: LittleEndian::read_u16(t),
            profile: LittleEndian::read_u16(&t[2..]),
            tag: LittleEndian::read_u16(&t[4..]),
        },
        TagControl::FullQual64 => TagType::FullQual64 {
            vendor_id: LittleEndian::read_u16(t),
            profile: LittleEndian::read_u16(&t[2..]),
            tag: LittleEndian::read_u32(&t[4..]),
        },
    }
}

/// Decode the element at the start of `buf`, returning it along with the
/// number of bytes it occupies (for containers, only the opening octets)
fn parse_element(buf: &[u8]) -> Result<(TLVElement<'_>, usize), Error> {
    let control = *buf.first().ok_or(Error::TruncatedPacket)?;
    let tag_control: TagControl =
        FromPrimitive::from_u8((control & TAG_MASK) >> TAG_SHIFT_BITS).ok_or(Error::InvalidData)?;
    let value_type: ValueType = FromPrimitive::from_u8(control & TYPE_MASK).ok_or_else(|| {
        error!("Invalid element type in control octet {:#04x}", control);
        Error::InvalidData
    })?;
    let mut offset = 1;

    /* Consume Tag */
    let tag_size = TAG_SIZE_MAP[tag_control as usize];
    if buf.len() < offset + tag_size {
        error!("Truncated tag {:?}", tag_control);
        return Err(Error::TruncatedPacket);
    }
    let tag_type = read_tag(tag_control, &buf[offset..]);
    offset += tag_size;

    /* Consume Value */
    let value_size = VALUE_SIZE_MAP[value_type as usize];
    if buf.len() < offset + value_size {
        error!("Truncated value {:?}", value_type);
        return Err(Error::TruncatedPacket);
    }
    let (extra_size, element_type) = (VALUE_EXTRACTOR[value_type as usize])(&buf[offset..])?;
    offset += value_size + extra_size;

    if element_type == ElementType::EndCnt && tag_type != TagType::Anonymous {
        error!("End of container carries a tag {:?}", tag_type);
        return Err(Error::InvalidData);
    }

    Ok((
        TLVElement {
            tag_type,
            element_type,
        },
        offset,
    ))
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TLVElement<'a> {
    tag_type: TagType,
    element_type: ElementType<'a>,
}

impl<'a> TLVElement<'a> {
    pub fn get_tag(&self) -> TagType {
        self.tag_type
    }

    pub fn get_element_type(&self) -> ElementType<'a> {
        self.element_type
    }

    pub fn container_kind(&self) -> Option<ContainerKind> {
        match self.element_type {
            ElementType::Struct => Some(ContainerKind::Struct),
            ElementType::Array => Some(ContainerKind::Array),
            ElementType::List => Some(ContainerKind::List),
            _ => None,
        }
    }

    pub fn is_container(&self) -> bool {
        self.container_kind().is_some()
    }

    pub fn is_end_container(&self) -> bool {
        self.element_type == ElementType::EndCnt
    }

    pub fn is_null(&self) -> bool {
        self.element_type == ElementType::Null
    }

    /// Any signed integer, whatever its encoded width
    pub fn i64(&self) -> Result<i64, Error> {
        match self.element_type {
            ElementType::S8(a) => Ok(a.into()),
            ElementType::S16(a) => Ok(a.into()),
            ElementType::S32(a) => Ok(a.into()),
            ElementType::S64(a) => Ok(a),
            _ => Err(Error::TLVTypeMismatch),
        }
    }

    /// Any unsigned integer, whatever its encoded width
    pub fn u64(&self) -> Result<u64, Error> {
        match self.element_type {
            ElementType::U8(a) => Ok(a.into()),
            ElementType::U16(a) => Ok(a.into()),
            ElementType::U32(a) => Ok(a.into()),
            ElementType::U64(a) => Ok(a),
            _ => Err(Error::TLVTypeMismatch),
        }
    }

    pub fn i8(&self) -> Result<i8, Error> {
        Ok(i8::try_from(self.i64()?)?)
    }

    pub fn i16(&self) -> Result<i16, Error> {
        Ok(i16::try_from(self.i64()?)?)
    }

    pub fn i32(&self) -> Result<i32, Error> {
        Ok(i32::try_from(self.i64()?)?)
    }

    pub fn u8(&self) -> Result<u8, Error> {
        Ok(u8::try_from(self.u64()?)?)
    }

    pub fn u16(&self) -> Result<u16, Error> {
        Ok(u16::try_from(self.u64()?)?)
    }

    pub fn u32(&self) -> Result<u32, Error> {
        Ok(u32::try_from(self.u64()?)?)
    }

    pub fn f32(&self) -> Result<f32, Error> {
        match self.element_type {
            ElementType::F32(a) => Ok(a),
            _ => Err(Error::TLVTypeMismatch),
        }
    }

    pub fn f64(&self) -> Result<f64, Error> {
        match self.element_type {
            ElementType::F64(a) => Ok(a),
            _ => Err(Error::TLVTypeMismatch),
        }
    }

    pub fn bool(&self) -> Result<bool, Error> {
        match self.element_type {
            ElementType::False => Ok(false),
            ElementType::True => Ok(true),
            _ => Err(Error::TLVTypeMismatch),
        }
    }

    pub fn null(&self) -> Result<(), Error> {
        match self.element_type {
            ElementType::Null => Ok(()),
            _ => Err(Error::TLVTypeMismatch),
        }
    }

    /// The payload of an octet string
    pub fn str(&self) -> Result<&'a [u8], Error> {
        match self.element_type {
            ElementType::Str8l(s)
            | ElementType::Str16l(s)
            | ElementType::Str32l(s)
            | ElementType::Str64l(s) => Ok(s),
            _ => Err(Error::TLVTypeMismatch),
        }
    }

    pub fn utf8(&self) -> Result<&'a str, Error> {
        match self.element_type {
            ElementType::Utf8l(s)
            | ElementType::Utf16l(s)
            | ElementType::Utf32l(s)
            | ElementType::Utf64l(s) => Ok(std::str::from_utf8(s)?),
            _ => Err(Error::TLVTypeMismatch),
        }
    }
}

impl<'a> fmt::Display for TLVElement<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag_type {
            TagType::Anonymous => (),
            _ => write!(f, "{}: ", self.tag_type)?,
        }
        match self.element_type {
            ElementType::Struct => write!(f, "{{"),
            ElementType::Array => write!(f, "["),
            ElementType::List => write!(f, "(["),
            ElementType::EndCnt => write!(f, ">"),
            ElementType::True => write!(f, "True"),
            ElementType::False => write!(f, "False"),
            ElementType::Null => write!(f, "Null"),
            ElementType::Utf8l(a)
            | ElementType::Utf16l(a)
            | ElementType::Utf32l(a)
            | ElementType::Utf64l(a) => match std::str::from_utf8(a) {
                Ok(s) => write!(f, "len[{}]\"{}\"", s.len(), s),
                Err(_) => write!(f, "len[{}]{:x?}", a.len(), a),
            },
            ElementType::Str8l(a)
            | ElementType::Str16l(a)
            | ElementType::Str32l(a)
            | ElementType::Str64l(a) => write!(f, "len[{}]{:x?}", a.len(), a),
            _ => write!(f, "{:?}", self.element_type),
        }
    }
}

/// A flat sequence of TLV elements
pub struct TLVList<'a> {
    buf: &'a [u8],
}

impl<'a> TLVList<'a> {
    pub fn new(buf: &'a [u8]) -> TLVList<'a> {
        TLVList { buf }
    }

    pub fn iter(&self) -> TLVListIterator<'a> {
        TLVListIterator {
            buf: self.buf,
            current: 0,
            failed: false,
        }
    }
}

// This is a TLV List iterator, it only iterates over the individual TLVs in a
// TLV list, end-of-container markers included. It stops after the first error
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TLVListIterator<'a> {
    buf: &'a [u8],
    current: usize,
    failed: bool,
}

impl<'a> Iterator for TLVListIterator<'a> {
    type Item = Result<TLVElement<'a>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.current >= self.buf.len() {
            return None;
        }
        let buf = self.buf;
        match parse_element(&buf[self.current..]) {
            Ok((element, size)) => {
                self.current += size;
                Some(Ok(element))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Render every element of `b` on its own line, indented by nesting level
///
/// Elements decoded before a failure stay in `out`.
pub fn write_tlv_list(b: &[u8], out: &mut String) -> Result<(), Error> {
    let mut depth = 0_usize;
    for element in TLVList::new(b).iter() {
        let e = element?;
        if e.is_end_container() {
            depth = depth.saturating_sub(1);
        }
        out.push_str(&format!("{:indent$}{}\n", "", e, indent = depth * 4));
        if e.is_container() {
            depth += 1;
        }
    }
    Ok(())
}

pub fn print_tlv_list(b: &[u8]) {
    info!("TLV list:");
    let mut out = String::new();
    let result = write_tlv_list(b, &mut out);
    for line in out.lines() {
        info!("{}", line);
    }
    if let Err(e) = result {
        error!("Decoding failed: {}", e);
    }
    info!("---------");
}

/// A streaming, strictly sequential TLV decoder
///
/// Elements are consumed in stream order. Lookahead is available through
/// [`TLVReader::peek_element`], [`TLVReader::is_next_tag`] and
/// [`TLVReader::is_null`]; every `get_*` call asserts the tag and type of the
/// next element before consuming it.
#[derive(Debug, Clone)]
pub struct TLVReader<'a> {
    buf: &'a [u8],
    current: usize,
    containers: ContainerStack,
}

impl<'a> TLVReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            current: 0,
            containers: ContainerStack::new(),
        }
    }

    /// Number of containers entered and not yet exited
    pub fn depth(&self) -> usize {
        self.containers.len()
    }

    pub fn current_container(&self) -> Option<ContainerKind> {
        self.containers.last().copied()
    }

    /// Offset of the next unread byte
    pub fn offset(&self) -> usize {
        self.current
    }

    fn peek(&self) -> Result<(TLVElement<'a>, usize), Error> {
        let buf = self.buf;
        if self.current >= buf.len() {
            if self.containers.is_empty() {
                return Err(Error::EndOfTLV);
            }
            error!("Stream ends with {} open container(s)", self.containers.len());
            return Err(Error::TruncatedPacket);
        }
        let (element, size) = parse_element(&buf[self.current..])?;
        if element.is_end_container() && self.containers.is_empty() {
            error!("End of container at offset {} with no open container", self.current);
            return Err(Error::NoContainer);
        }
        Ok((element, size))
    }

    pub fn peek_element(&self) -> Result<TLVElement<'a>, Error> {
        self.peek().map(|(element, _)| element)
    }

    pub fn is_next_tag(&self, tag: TagType) -> bool {
        matches!(self.peek(), Ok((e, _)) if !e.is_end_container() && e.get_tag() == tag)
    }

    pub fn is_null(&self) -> bool {
        matches!(self.peek(), Ok((e, _)) if e.is_null())
    }

    /// True when nothing is left at the current nesting level
    pub fn is_end_of_container(&self) -> bool {
        if self.containers.is_empty() {
            self.is_end_of_tlv()
        } else {
            matches!(self.peek(), Ok((e, _)) if e.is_end_container())
        }
    }

    pub fn is_end_of_tlv(&self) -> bool {
        self.current >= self.buf.len()
    }

    fn get_with<T, F>(&mut self, tag: TagType, f: F) -> Result<T, Error>
    where
        F: FnOnce(&TLVElement<'a>) -> Result<T, Error>,
    {
        let (element, size) = self.peek()?;
        if element.is_end_container() || element.get_tag() != tag {
            error!(
                "Expected tag {:?}, found {:?} with {:?}",
                tag,
                element.get_tag(),
                element.get_element_type()
            );
            return Err(Error::TLVNotFound);
        }
        let value = f(&element).map_err(|e| {
            error!(
                "Tag {:?}: cannot read {:?}: {}",
                tag,
                element.get_element_type(),
                e
            );
            e
        })?;
        self.current += size;
        Ok(value)
    }

    pub fn get_bool(&mut self, tag: TagType) -> Result<bool, Error> {
        self.get_with(tag, |e| e.bool())
    }

    pub fn get_i8(&mut self, tag: TagType) -> Result<i8, Error> {
        self.get_with(tag, |e| e.i8())
    }

    pub fn get_i16(&mut self, tag: TagType) -> Result<i16, Error> {
        self.get_with(tag, |e| e.i16())
    }

    pub fn get_i32(&mut self, tag: TagType) -> Result<i32, Error> {
        self.get_with(tag, |e| e.i32())
    }

    pub fn get_i64(&mut self, tag: TagType) -> Result<i64, Error> {
        self.get_with(tag, |e| e.i64())
    }

    pub fn get_u8(&mut self, tag: TagType) -> Result<u8, Error> {
        self.get_with(tag, |e| e.u8())
    }

    pub fn get_u16(&mut self, tag: TagType) -> Result<u16, Error> {
        self.get_with(tag, |e| e.u16())
    }

    pub fn get_u32(&mut self, tag: TagType) -> Result<u32, Error> {
        self.get_with(tag, |e| e.u32())
    }

    pub fn get_u64(&mut self, tag: TagType) -> Result<u64, Error> {
        self.get_with(tag, |e| e.u64())
    }

    pub fn get_f32(&mut self, tag: TagType) -> Result<f32, Error> {
        self.get_with(tag, |e| e.f32())
    }

    pub fn get_f64(&mut self, tag: TagType) -> Result<f64, Error> {
        self.get_with(tag, |e| e.f64())
    }

    pub fn get_utf8(&mut self, tag: TagType) -> Result<&'a str, Error> {
        self.get_with(tag, |e| e.utf8())
    }

    /// Read an octet string
    pub fn get_str(&mut self, tag: TagType) -> Result<&'a [u8], Error> {
        self.get_with(tag, |e| e.str())
    }

    pub fn get_null(&mut self, tag: TagType) -> Result<(), Error> {
        self.get_with(tag, |e| e.null())
    }

    fn enter(&mut self, tag: TagType, kind: ContainerKind) -> Result<(), Error> {
        if self.containers.is_full() {
            error!("Cannot enter {:?} at tag {:?}: nesting too deep", kind, tag);
            return Err(Error::NestingTooDeep);
        }
        self.get_with(tag, |e| {
            if e.container_kind() == Some(kind) {
                Ok(())
            } else {
                Err(Error::TLVTypeMismatch)
            }
        })?;
        self.containers
            .push(kind)
            .map_err(|_| Error::NestingTooDeep)
    }

    pub fn enter_struct(&mut self, tag: TagType) -> Result<(), Error> {
        self.enter(tag, ContainerKind::Struct)
    }

    pub fn enter_array(&mut self, tag: TagType) -> Result<(), Error> {
        self.enter(tag, ContainerKind::Array)
    }

    pub fn enter_list(&mut self, tag: TagType) -> Result<(), Error> {
        self.enter(tag, ContainerKind::List)
    }

    /// Leave the innermost container
    ///
    /// Elements of the container that were not read are skipped.
    pub fn exit_container(&mut self) -> Result<(), Error> {
        let kind = match self.containers.last() {
            Some(kind) => *kind,
            None => {
                error!("Exit container with no open container");
                return Err(Error::NoContainer);
            }
        };
        loop {
            let (element, size) = self.peek()?;
            if element.is_end_container() {
                self.current += size;
                self.containers.pop();
                return Ok(());
            }
            warn!("Skipping unread element {} in {:?}", element, kind);
            self.skip_element()?;
        }
    }

    /// Consume the next element, including all of its contents if it is a
    /// container
    pub fn skip_element(&mut self) -> Result<(), Error> {
        let (element, size) = self.peek()?;
        if element.is_end_container() {
            error!("Cannot skip an end of container, use exit_container()");
            return Err(Error::Invalid);
        }
        let buf = self.buf;
        let mut offset = self.current + size;
        if element.is_container() {
            let mut nest_level = 0_usize;
            loop {
                if offset >= buf.len() {
                    error!("Stream ends inside a skipped container");
                    return Err(Error::TruncatedPacket);
                }
                let (element, size) = parse_element(&buf[offset..])?;
                offset += size;
                if element.is_end_container() {
                    if nest_level == 0 {
                        break;
                    }
                    nest_level -= 1;
                } else if element.is_container() {
                    nest_level += 1;
                    if self.containers.len() + nest_level >= MAX_CONTAINER_DEPTH {
                        error!("Skipped container nests too deep");
                        return Err(Error::NestingTooDeep);
                    }
                }
            }
        }
        self.current = offset;
        Ok(())
    }

    /// Decode the next element, whatever it is, into a [`Value`] tree
    pub fn to_any(&mut self) -> Result<Value, Error> {
        super::to_any(self)
    }

    /// Verify that every container was exited and all bytes were consumed
    pub fn finish(&self) -> Result<(), Error> {
        if !self.containers.is_empty() {
            error!("{} container(s) not exited", self.containers.len());
            return Err(Error::UnclosedContainer);
        }
        if !self.is_end_of_tlv() {
            error!("{} trailing byte(s)", self.buf.len() - self.current);
            return Err(Error::InvalidData);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ElementType, TLVElement, TLVList, TLVReader};
    use crate::error::Error;
    use crate::tlv::{print_tlv_list, write_tlv_list, ContainerKind, TagType};

    #[test]
    fn test_short_length_tag() {
        // The 0x36 is an array with a tag, but we leave out the tag field
        let b = [0x15, 0x36];
        let mut tr = TLVReader::new(&b);
        tr.enter_struct(TagType::Anonymous).unwrap();
        assert_eq!(tr.peek_element(), Err(Error::TruncatedPacket));
    }

    #[test]
    fn test_invalid_value_type() {
        // 0x1f is not a valid element type
        let b = [0x15, 0x1f, 0x0];
        let mut tr = TLVReader::new(&b);
        tr.enter_struct(TagType::Anonymous).unwrap();
        assert_eq!(tr.peek_element(), Err(Error::InvalidData));
    }

    #[test]
    fn test_short_length_value_immediate() {
        // The 0x24 is a a tagged integer, here we leave out the integer value
        let b = [0x15, 0x24, 0x0];
        let mut tr = TLVReader::new(&b);
        tr.enter_struct(TagType::Anonymous).unwrap();
        assert_eq!(tr.get_u8(TagType::Context(0)), Err(Error::TruncatedPacket));
    }

    #[test]
    fn test_short_length_value_string() {
        // This is a tagged string, with tag 0 and length 0xb, but we only have
        // 4 bytes in the string
        let b = [0x15, 0x30, 0x00, 0x0b, 0x73, 0x6d, 0x61, 0x72];
        let mut tr = TLVReader::new(&b);
        tr.enter_struct(TagType::Anonymous).unwrap();
        assert_eq!(tr.get_str(TagType::Context(0)), Err(Error::TruncatedPacket));
    }

    #[test]
    fn test_valid_tag() {
        // The 0x36 is an array with a tag, here tag is 0
        let b = [0x15, 0x36, 0x0, 0x18, 0x18];
        let mut tr = TLVReader::new(&b);
        tr.enter_struct(TagType::Anonymous).unwrap();
        assert_eq!(
            tr.peek_element(),
            Ok(TLVElement {
                tag_type: TagType::Context(0),
                element_type: ElementType::Array,
            })
        );
        tr.enter_array(TagType::Context(0)).unwrap();
        assert!(tr.is_end_of_container());
        tr.exit_container().unwrap();
        tr.exit_container().unwrap();
        assert!(tr.is_end_of_tlv());
        tr.finish().unwrap();
    }

    #[test]
    fn test_struct_fields() {
        let b = [
            0x15, 0x24, 0x0, 0x2, 0x26, 0x2, 0x4e, 0x10, 0x02, 0x00, 0x30, 0x3, 0x04, 0x73, 0x6d,
            0x61, 0x72, 0x18,
        ];
        let mut tr = TLVReader::new(&b);
        tr.enter_struct(TagType::Anonymous).unwrap();
        assert_eq!(tr.current_container(), Some(ContainerKind::Struct));
        assert_eq!(tr.get_u8(TagType::Context(0)), Ok(2));
        assert!(!tr.is_next_tag(TagType::Context(1)));
        assert_eq!(tr.get_u32(TagType::Context(2)), Ok(135246));
        assert_eq!(tr.get_str(TagType::Context(3)), Ok(&b"smar"[..]));
        assert!(tr.is_end_of_container());
        tr.exit_container().unwrap();
        assert_eq!(tr.depth(), 0);
        assert!(tr.is_end_of_container());
        assert_eq!(tr.peek_element(), Err(Error::EndOfTLV));
    }

    #[test]
    fn test_tag_mismatch_does_not_consume() {
        let b = [0x24, 0x1, 0x5];
        let mut tr = TLVReader::new(&b);
        assert_eq!(tr.get_u8(TagType::Context(0)), Err(Error::TLVNotFound));
        assert_eq!(tr.get_bool(TagType::Context(1)), Err(Error::TLVTypeMismatch));
        assert_eq!(tr.offset(), 0);
        assert_eq!(tr.get_u8(TagType::Context(1)), Ok(5));
    }

    #[test]
    fn test_integer_widths() {
        // u8 5, u16 0x1234, i8 -1, u64 max
        let b = [
            0x24, 0x0, 0x5, 0x25, 0x1, 0x34, 0x12, 0x20, 0x2, 0xff, 0x27, 0x3, 0xff, 0xff, 0xff,
            0xff, 0xff, 0xff, 0xff, 0xff,
        ];
        let mut tr = TLVReader::new(&b);
        assert_eq!(tr.get_u64(TagType::Context(0)), Ok(5));
        assert_eq!(tr.get_u8(TagType::Context(1)), Err(Error::TLVTypeMismatch));
        assert_eq!(tr.get_u16(TagType::Context(1)), Ok(0x1234));
        assert_eq!(tr.get_u8(TagType::Context(2)), Err(Error::TLVTypeMismatch));
        assert_eq!(tr.get_i32(TagType::Context(2)), Ok(-1));
        assert_eq!(tr.get_u32(TagType::Context(3)), Err(Error::TLVTypeMismatch));
        assert_eq!(tr.get_u64(TagType::Context(3)), Ok(u64::MAX));
        tr.finish().unwrap();
    }

    #[test]
    fn test_null_lookahead() {
        let b = [0x34, 0x1, 0x24, 0x2, 0x5];
        let mut tr = TLVReader::new(&b);
        assert!(tr.is_next_tag(TagType::Context(1)));
        assert!(tr.is_null());
        assert_eq!(tr.get_u8(TagType::Context(1)), Err(Error::TLVTypeMismatch));
        tr.get_null(TagType::Context(1)).unwrap();
        assert!(!tr.is_null());
        assert_eq!(tr.get_u8(TagType::Context(2)), Ok(5));
    }

    #[test]
    fn test_exit_skips_unread() {
        // {0: [1, 2], 1: {0: true}, 2: "hi"}, 3: 7
        let b = [
            0x15, 0x36, 0x0, 0x04, 0x1, 0x04, 0x2, 0x18, 0x35, 0x1, 0x29, 0x0, 0x18, 0x2c, 0x2,
            0x2, 0x68, 0x69, 0x18, 0x24, 0x3, 0x7,
        ];
        let mut tr = TLVReader::new(&b);
        tr.enter_struct(TagType::Anonymous).unwrap();
        tr.enter_array(TagType::Context(0)).unwrap();
        assert_eq!(tr.get_u8(TagType::Anonymous), Ok(1));
        tr.exit_container().unwrap();
        tr.exit_container().unwrap();
        assert_eq!(tr.get_u8(TagType::Context(3)), Ok(7));
        tr.finish().unwrap();
    }

    #[test]
    fn test_skip_element() {
        let b = [
            0x15, 0x36, 0x0, 0x04, 0x1, 0x17, 0x18, 0x18, 0x2c, 0x1, 0x2, 0x68, 0x69, 0x18,
        ];
        let mut tr = TLVReader::new(&b);
        tr.enter_struct(TagType::Anonymous).unwrap();
        tr.skip_element().unwrap();
        assert_eq!(tr.get_utf8(TagType::Context(1)), Ok("hi"));
        assert_eq!(tr.skip_element(), Err(Error::Invalid));
        tr.exit_container().unwrap();
        assert_eq!(tr.skip_element(), Err(Error::EndOfTLV));
    }

    #[test]
    fn test_container_imbalance() {
        let b = [0x18];
        let mut tr = TLVReader::new(&b);
        assert_eq!(tr.peek_element(), Err(Error::NoContainer));
        assert_eq!(tr.exit_container(), Err(Error::NoContainer));

        let b = [0x15, 0x24, 0x0, 0x1];
        let mut tr = TLVReader::new(&b);
        tr.enter_struct(TagType::Anonymous).unwrap();
        assert_eq!(tr.get_u8(TagType::Context(0)), Ok(1));
        assert!(tr.is_end_of_tlv());
        assert!(!tr.is_end_of_container());
        assert_eq!(tr.finish(), Err(Error::UnclosedContainer));
        assert_eq!(tr.exit_container(), Err(Error::TruncatedPacket));
    }

    #[test]
    fn test_enter_wrong_kind() {
        let b = [0x16, 0x18];
        let mut tr = TLVReader::new(&b);
        assert_eq!(tr.enter_struct(TagType::Anonymous), Err(Error::TLVTypeMismatch));
        tr.enter_array(TagType::Anonymous).unwrap();
        tr.exit_container().unwrap();
    }

    #[test]
    fn test_profile_tags() {
        let b = [
            0x44, 0x02, 0x01, 1, 0xe4, 0xf1, 0xff, 0xed, 0xde, 0xed, 0xfe, 0x55, 0xaa, 2,
        ];
        let mut tr = TLVReader::new(&b);
        assert_eq!(tr.get_u8(TagType::CommonPrf16(0x0102)), Ok(1));
        assert_eq!(
            tr.get_u8(TagType::fully_qualified(0xfff1, 0xdeed, 0xaa55feed)),
            Ok(2)
        );
    }

    #[test]
    fn test_bad_utf8() {
        let b = [0x0c, 0x2, 0xc3, 0x28];
        let mut tr = TLVReader::new(&b);
        assert_eq!(tr.get_utf8(TagType::Anonymous), Err(Error::Utf8Fail));
    }

    #[test]
    fn test_list_iterator() {
        let b = [0x15, 0x24, 0x0, 0x2, 0x36, 0x1, 0x08, 0x18, 0x18];
        let elements: Vec<_> = TLVList::new(&b)
            .iter()
            .map(|e| e.unwrap().get_element_type())
            .collect();
        assert_eq!(
            elements,
            [
                ElementType::Struct,
                ElementType::U8(2),
                ElementType::Array,
                ElementType::False,
                ElementType::EndCnt,
                ElementType::EndCnt
            ]
        );
        print_tlv_list(&b);

        let b = [0x24, 0x0, 0x2, 0x1f];
        let mut iter = TLVList::new(&b).iter();
        assert!(iter.next().unwrap().is_ok());
        assert_eq!(iter.next(), Some(Err(Error::InvalidData)));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_write_tlv_list() {
        let b = [0x15, 0x24, 0x0, 0x2, 0x36, 0x1, 0x08, 0x18, 0x18];
        let mut out = String::new();
        write_tlv_list(&b, &mut out).unwrap();
        assert_eq!(out, "{\n    0: U8(2)\n    1: [\n        False\n    >\n>\n");

        // Output up to the bad element is kept
        let b = [0x24, 0x0, 0x2, 0x1f];
        let mut out = String::new();
        assert_eq!(write_tlv_list(&b, &mut out), Err(Error::InvalidData));
        assert_eq!(out, "0: U8(2)\n");
    }

    #[test]
    fn test_element_display() {
        let b = [0x2c, 0x1, 0x2, 0x68, 0x69, 0x35, 0x2, 0x30, 0x3, 0x1, 0xab];
        let display: Vec<String> = TLVList::new(&b)
            .iter()
            .map(|e| format!("{}", e.unwrap()))
            .collect();
        assert_eq!(display, ["1: len[2]\"hi\"", "2: {", "3: len[1][ab]"]);
    }
}
