//! Native Rust encoder and decoder for the Matter TLV format
//!
//! [`tlv::TLVWriter`] emits elements into a caller supplied buffer,
//! [`tlv::TLVReader`] consumes them strictly in stream order and
//! [`tlv::to_any`] turns an element of unknown shape into a [`tlv::Value`].
//! Structures get their encode and decode code from the `ToTLV` and
//! `FromTLV` derive macros. The [`data_model`] module carries cluster event
//! payloads built on top of those.

pub mod data_model;
pub mod error;
pub mod tlv;
pub mod utils;
