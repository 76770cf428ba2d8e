#![allow(dead_code)]

use matter_tlv::{
    error::Error,
    tlv::{TLVWriter, TagType, ToTLV},
    utils::writebuf::WriteBuf,
};

pub const MAX_ENCODED_LEN: usize = 2048;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Encode `value` under `tag` and return the bytes
pub fn encode<T: ToTLV + ?Sized>(value: &T, tag: TagType) -> Result<Vec<u8>, Error> {
    encode_with(|tw| value.to_tlv(tw, tag))
}

/// Run `f` against a fresh writer and return what it produced
pub fn encode_with<F>(f: F) -> Result<Vec<u8>, Error>
where
    F: FnOnce(&mut TLVWriter) -> Result<(), Error>,
{
    let mut buf = [0_u8; MAX_ENCODED_LEN];
    let buf_len = buf.len();
    let mut writebuf = WriteBuf::new(&mut buf, buf_len);
    let mut tw = TLVWriter::new(&mut writebuf);
    f(&mut tw)?;
    Ok(tw.get_encoded()?.to_vec())
}
