use super::{
    ContainerKind, ContainerStack, TagType, ToTLV, ValueType, TAG_SHIFT_BITS, TAG_SIZE_MAP,
};
use crate::{error::*, utils::writebuf::WriteBuf};
use log::error;

/// A saved writer position, see [`TLVWriter::get_anchor`]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WriterAnchor {
    tail: usize,
    depth: usize,
}

pub struct TLVWriter<'a, 'b> {
    buf: &'b mut WriteBuf<'a>,
    containers: ContainerStack,
}

impl<'a, 'b> TLVWriter<'a, 'b> {
    pub fn new(buf: &'b mut WriteBuf<'a>) -> Self {
        TLVWriter {
            buf,
            containers: ContainerStack::new(),
        }
    }

    // Writes the control octet, the tag and then the value through `f`. If
    // anything does not fit, the buffer is left as it was
    fn put_element<F>(&mut self, tag_type: TagType, val_type: ValueType, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut WriteBuf<'a>) -> Result<(), Error>,
    {
        let (tag_id, tag_val) = tag_type.control_and_value();
        let tail = self.buf.get_tail();
        let buf = &mut *self.buf;
        let result = (|| {
            buf.le_u8(((tag_id as u8) << TAG_SHIFT_BITS) | (val_type as u8))?;
            buf.le_uint(TAG_SIZE_MAP[tag_id as usize], tag_val)?;
            f(buf)
        })();
        if result.is_err() {
            error!("No space for {:?} at tag {:?}", val_type, tag_type);
            self.buf.rewind_tail_to(tail);
        }
        result
    }

    fn put_control_tag(&mut self, tag_type: TagType, val_type: ValueType) -> Result<(), Error> {
        self.put_element(tag_type, val_type, |_| Ok(()))
    }

    pub fn i8(&mut self, tag_type: TagType, data: i8) -> Result<(), Error> {
        self.put_element(tag_type, ValueType::S8, |buf| buf.le_i8(data))
    }

    pub fn i16(&mut self, tag_type: TagType, data: i16) -> Result<(), Error> {
        if let Ok(data) = i8::try_from(data) {
            self.i8(tag_type, data)
        } else {
            self.put_element(tag_type, ValueType::S16, |buf| buf.le_i16(data))
        }
    }

    pub fn i32(&mut self, tag_type: TagType, data: i32) -> Result<(), Error> {
        if let Ok(data) = i16::try_from(data) {
            self.i16(tag_type, data)
        } else {
            self.put_element(tag_type, ValueType::S32, |buf| buf.le_i32(data))
        }
    }

    pub fn i64(&mut self, tag_type: TagType, data: i64) -> Result<(), Error> {
        if let Ok(data) = i32::try_from(data) {
            self.i32(tag_type, data)
        } else {
            self.put_element(tag_type, ValueType::S64, |buf| buf.le_i64(data))
        }
    }

    pub fn u8(&mut self, tag_type: TagType, data: u8) -> Result<(), Error> {
        self.put_element(tag_type, ValueType::U8, |buf| buf.le_u8(data))
    }

    pub fn u16(&mut self, tag_type: TagType, data: u16) -> Result<(), Error> {
        if let Ok(data) = u8::try_from(data) {
            self.u8(tag_type, data)
        } else {
            self.put_element(tag_type, ValueType::U16, |buf| buf.le_u16(data))
        }
    }

    pub fn u32(&mut self, tag_type: TagType, data: u32) -> Result<(), Error> {
        if let Ok(data) = u16::try_from(data) {
            self.u16(tag_type, data)
        } else {
            self.put_element(tag_type, ValueType::U32, |buf| buf.le_u32(data))
        }
    }

    pub fn u64(&mut self, tag_type: TagType, data: u64) -> Result<(), Error> {
        if let Ok(data) = u32::try_from(data) {
            self.u32(tag_type, data)
        } else {
            self.put_element(tag_type, ValueType::U64, |buf| buf.le_u64(data))
        }
    }

    pub fn f32(&mut self, tag_type: TagType, data: f32) -> Result<(), Error> {
        self.put_element(tag_type, ValueType::F32, |buf| buf.le_f32(data))
    }

    pub fn f64(&mut self, tag_type: TagType, data: f64) -> Result<(), Error> {
        self.put_element(tag_type, ValueType::F64, |buf| buf.le_f64(data))
    }

    /// Write an octet string, with the shortest length field that fits
    pub fn str(&mut self, tag_type: TagType, data: &[u8]) -> Result<(), Error> {
        let types = [
            ValueType::Str8l,
            ValueType::Str16l,
            ValueType::Str32l,
            ValueType::Str64l,
        ];
        self.put_length_value(tag_type, types, data)
    }

    /// Write a UTF-8 string, with the shortest length field that fits
    pub fn utf8(&mut self, tag_type: TagType, data: &str) -> Result<(), Error> {
        let types = [
            ValueType::Utf8l,
            ValueType::Utf16l,
            ValueType::Utf32l,
            ValueType::Utf64l,
        ];
        self.put_length_value(tag_type, types, data.as_bytes())
    }

    fn put_length_value(
        &mut self,
        tag_type: TagType,
        types: [ValueType; 4],
        data: &[u8],
    ) -> Result<(), Error> {
        let len = data.len() as u64;
        let (val_type, len_size) = if len <= u8::MAX as u64 {
            (types[0], 1)
        } else if len <= u16::MAX as u64 {
            (types[1], 2)
        } else if len <= u32::MAX as u64 {
            (types[2], 4)
        } else {
            (types[3], 8)
        };
        self.put_element(tag_type, val_type, |buf| {
            buf.le_uint(len_size, len)?;
            buf.copy_from_slice(data)
        })
    }

    pub fn null(&mut self, tag_type: TagType) -> Result<(), Error> {
        self.put_control_tag(tag_type, ValueType::Null)
    }

    pub fn bool(&mut self, tag_type: TagType, val: bool) -> Result<(), Error> {
        if val {
            self.put_control_tag(tag_type, ValueType::True)
        } else {
            self.put_control_tag(tag_type, ValueType::False)
        }
    }

    /// Write any encodable value under `tag_type`
    pub fn put<T: ToTLV + ?Sized>(&mut self, tag_type: TagType, value: &T) -> Result<(), Error> {
        value.to_tlv(self, tag_type)
    }

    fn start_container(&mut self, tag_type: TagType, kind: ContainerKind) -> Result<(), Error> {
        if self.containers.is_full() {
            error!("Cannot open {:?} at tag {:?}: nesting too deep", kind, tag_type);
            return Err(Error::NestingTooDeep);
        }
        let val_type = match kind {
            ContainerKind::Struct => ValueType::Struct,
            ContainerKind::Array => ValueType::Array,
            ContainerKind::List => ValueType::List,
        };
        self.put_control_tag(tag_type, val_type)?;
        self.containers
            .push(kind)
            .map_err(|_| Error::NestingTooDeep)
    }

    pub fn start_struct(&mut self, tag_type: TagType) -> Result<(), Error> {
        self.start_container(tag_type, ContainerKind::Struct)
    }

    pub fn start_array(&mut self, tag_type: TagType) -> Result<(), Error> {
        self.start_container(tag_type, ContainerKind::Array)
    }

    pub fn start_list(&mut self, tag_type: TagType) -> Result<(), Error> {
        self.start_container(tag_type, ContainerKind::List)
    }

    /// Close the innermost open container, whatever its kind
    pub fn end_container(&mut self) -> Result<(), Error> {
        if self.containers.is_empty() {
            error!("End of container with no open container");
            return Err(Error::NoContainer);
        }
        self.put_control_tag(TagType::Anonymous, ValueType::EndCnt)?;
        self.containers.pop();
        Ok(())
    }

    fn end_kind(&mut self, kind: ContainerKind) -> Result<(), Error> {
        match self.containers.last().copied() {
            Some(k) if k == kind => self.end_container(),
            Some(k) => {
                error!("Closing {:?}, but the open container is {:?}", kind, k);
                Err(Error::ContainerMismatch)
            }
            None => {
                error!("Closing {:?} with no open container", kind);
                Err(Error::NoContainer)
            }
        }
    }

    pub fn end_struct(&mut self) -> Result<(), Error> {
        self.end_kind(ContainerKind::Struct)
    }

    pub fn end_array(&mut self) -> Result<(), Error> {
        self.end_kind(ContainerKind::Array)
    }

    pub fn end_list(&mut self) -> Result<(), Error> {
        self.end_kind(ContainerKind::List)
    }

    /// Number of currently open containers
    pub fn depth(&self) -> usize {
        self.containers.len()
    }

    /// Return the encoded bytes, provided every container has been closed
    pub fn get_encoded(&self) -> Result<&[u8], Error> {
        if !self.containers.is_empty() {
            error!("{} container(s) still open", self.containers.len());
            return Err(Error::UnclosedContainer);
        }
        Ok(self.buf.as_borrow_slice())
    }

    pub fn get_tail(&self) -> usize {
        self.buf.get_tail()
    }

    pub fn get_anchor(&self) -> WriterAnchor {
        WriterAnchor {
            tail: self.buf.get_tail(),
            depth: self.containers.len(),
        }
    }

    /// Drop everything written after `anchor` was taken
    ///
    /// Containers opened after the anchor are forgotten. The anchor must have
    /// been taken at the current nesting level or an outer one.
    pub fn rewind_to(&mut self, anchor: WriterAnchor) {
        self.buf.rewind_tail_to(anchor.tail);
        self.containers.truncate(anchor.depth);
    }
}
