use crate::error::*;
use byteorder::{ByteOrder, LittleEndian};

/// A fixed-capacity, append-only output buffer
///
/// The tail can be saved with [`WriteBuf::get_tail`] and restored with
/// [`WriteBuf::rewind_tail_to`] to drop a partially written encoding.
#[derive(Debug)]
pub struct WriteBuf<'a> {
    buf: &'a mut [u8],
    end: usize,
}

impl<'a> WriteBuf<'a> {
    /// Writes are limited to the first `len` bytes of `buf`, or all of it if
    /// `len` is larger
    pub fn new(buf: &'a mut [u8], len: usize) -> WriteBuf<'a> {
        let len = len.min(buf.len());
        WriteBuf {
            buf: &mut buf[..len],
            end: 0,
        }
    }

    pub fn get_tail(&self) -> usize {
        self.end
    }

    pub fn rewind_tail_to(&mut self, new_end: usize) {
        if new_end <= self.end {
            self.end = new_end;
        }
    }

    pub fn as_borrow_slice(&self) -> &[u8] {
        &self.buf[..self.end]
    }

    pub fn as_slice(self) -> &'a [u8] {
        &self.buf[..self.end]
    }

    fn append_with<F>(&mut self, size: usize, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut [u8]),
    {
        if self.end + size <= self.buf.len() {
            f(&mut self.buf[self.end..self.end + size]);
            self.end += size;
            return Ok(());
        }
        Err(Error::NoSpace)
    }

    pub fn copy_from_slice(&mut self, src: &[u8]) -> Result<(), Error> {
        self.append_with(src.len(), |x| x.copy_from_slice(src))
    }

    pub fn le_i8(&mut self, data: i8) -> Result<(), Error> {
        self.le_u8(data as u8)
    }

    pub fn le_u8(&mut self, data: u8) -> Result<(), Error> {
        self.append_with(1, |x| x[0] = data)
    }

    pub fn le_u16(&mut self, data: u16) -> Result<(), Error> {
        self.append_with(2, |x| LittleEndian::write_u16(x, data))
    }

    pub fn le_i16(&mut self, data: i16) -> Result<(), Error> {
        self.append_with(2, |x| LittleEndian::write_i16(x, data))
    }

    pub fn le_u32(&mut self, data: u32) -> Result<(), Error> {
        self.append_with(4, |x| LittleEndian::write_u32(x, data))
    }

    pub fn le_i32(&mut self, data: i32) -> Result<(), Error> {
        self.append_with(4, |x| LittleEndian::write_i32(x, data))
    }

    pub fn le_u64(&mut self, data: u64) -> Result<(), Error> {
        self.append_with(8, |x| LittleEndian::write_u64(x, data))
    }

    pub fn le_i64(&mut self, data: i64) -> Result<(), Error> {
        self.append_with(8, |x| LittleEndian::write_i64(x, data))
    }

    pub fn le_f32(&mut self, data: f32) -> Result<(), Error> {
        self.append_with(4, |x| LittleEndian::write_f32(x, data))
    }

    pub fn le_f64(&mut self, data: f64) -> Result<(), Error> {
        self.append_with(8, |x| LittleEndian::write_f64(x, data))
    }

    pub fn le_uint(&mut self, nbytes: usize, data: u64) -> Result<(), Error> {
        if nbytes == 0 {
            return Ok(());
        }
        self.append_with(nbytes, |x| LittleEndian::write_uint(x, data, nbytes))
    }
}
