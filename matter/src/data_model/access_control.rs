use num_derive::FromPrimitive;

use crate::error::*;
use crate::tlv::{FromTLV, Nullable, TLVArray, TLVReader, TLVWriter, TagType, ToTLV};
use log::error;

pub const ID: u32 = 0x001F;

#[derive(FromPrimitive, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Events {
    AccessControlEntryChanged = 0,
    AccessControlExtensionChanged = 1,
}

#[derive(ToTLV, FromTLV, Debug, Copy, Clone, PartialEq, Eq)]
#[tlvargs(datatype = "u8")]
pub enum ChangeTypeEnum {
    Changed = 0,
    Added = 1,
    Removed = 2,
}

#[derive(ToTLV, FromTLV, Debug, Copy, Clone, PartialEq, Eq)]
#[tlvargs(datatype = "u8")]
pub enum AccessControlEntryPrivilegeEnum {
    View = 1,
    ProxyView = 2,
    Operate = 3,
    Manage = 4,
    Administer = 5,
}

#[derive(ToTLV, FromTLV, Debug, Copy, Clone, PartialEq, Eq)]
#[tlvargs(datatype = "u8")]
pub enum AccessControlEntryAuthModeEnum {
    Pase = 1,
    Case = 2,
    Group = 3,
}

#[derive(ToTLV, FromTLV, Debug, Copy, Clone, PartialEq, Eq)]
pub struct AccessControlTargetStruct {
    pub cluster: Nullable<u32>,
    pub endpoint: Nullable<u16>,
    pub device_type: Nullable<u32>,
}

#[derive(ToTLV, FromTLV, Debug, Clone, PartialEq, Eq)]
#[tlvargs(start = 1)]
pub struct AccessControlEntryStruct {
    pub privilege: AccessControlEntryPrivilegeEnum,
    pub auth_mode: AccessControlEntryAuthModeEnum,
    pub subjects: Nullable<TLVArray<u64>>,
    pub targets: Nullable<TLVArray<AccessControlTargetStruct>>,
    #[tagval(0xFE)]
    pub fabric_index: u8,
}

#[derive(ToTLV, FromTLV, Debug, Clone, PartialEq, Eq)]
#[tlvargs(start = 1)]
pub struct AccessControlExtensionStruct {
    pub data: Vec<u8>,
    #[tagval(0xFE)]
    pub fabric_index: u8,
}

#[derive(ToTLV, FromTLV, Debug, Clone, PartialEq, Eq)]
#[tlvargs(start = 1)]
pub struct AccessControlEntryChangedEvent {
    pub admin_node_id: Nullable<u64>,
    pub admin_passcode_id: Nullable<u16>,
    pub change_type: ChangeTypeEnum,
    pub latest_value: Nullable<AccessControlEntryStruct>,
    #[tagval(0xFE)]
    pub fabric_index: u8,
}

#[derive(ToTLV, FromTLV, Debug, Clone, PartialEq, Eq)]
#[tlvargs(start = 1)]
pub struct AccessControlExtensionChangedEvent {
    pub admin_node_id: Nullable<u64>,
    pub admin_passcode_id: Nullable<u16>,
    pub change_type: ChangeTypeEnum,
    pub latest_value: Nullable<AccessControlExtensionStruct>,
    #[tagval(0xFE)]
    pub fabric_index: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    AccessControlEntryChanged(AccessControlEntryChangedEvent),
    AccessControlExtensionChanged(AccessControlExtensionChangedEvent),
}

/// Decode the TLV payload of an Access Control event
pub fn decode_event(event_id: u32, data: &[u8]) -> Result<Event, Error> {
    let mut tr = TLVReader::new(data);
    let event = match num_traits::FromPrimitive::from_u32(event_id) {
        Some(Events::AccessControlEntryChanged) => Event::AccessControlEntryChanged(
            FromTLV::from_tlv(&mut tr, TagType::Anonymous)?,
        ),
        Some(Events::AccessControlExtensionChanged) => Event::AccessControlExtensionChanged(
            FromTLV::from_tlv(&mut tr, TagType::Anonymous)?,
        ),
        None => {
            error!("Unknown Access Control event {}", event_id);
            return Err(Error::Invalid);
        }
    };
    tr.finish()?;
    Ok(event)
}
