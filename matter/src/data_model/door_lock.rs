use num_derive::FromPrimitive;

use crate::error::*;
use crate::tlv::{FromTLV, Nullable, OptNullable, TLVArray, TLVReader, TLVWriter, TagType, ToTLV};
use log::error;

pub const ID: u32 = 0x0101;

#[derive(FromPrimitive, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Events {
    DoorLockAlarm = 0,
    DoorStateChange = 1,
    LockOperation = 2,
    LockOperationError = 3,
    LockUserChange = 4,
}

#[derive(ToTLV, FromTLV, Debug, Copy, Clone, PartialEq, Eq)]
#[tlvargs(datatype = "u8")]
pub enum AlarmCodeEnum {
    LockJammed = 0,
    LockFactoryReset = 1,
    LockRadioPowerCycled = 3,
    WrongCodeEntryLimit = 4,
    FrontEsceutcheonRemoved = 5,
    DoorForcedOpen = 6,
    DoorAjar = 7,
    ForcedUser = 8,
}

#[derive(ToTLV, FromTLV, Debug, Copy, Clone, PartialEq, Eq)]
#[tlvargs(datatype = "u8")]
pub enum LockOperationTypeEnum {
    Lock = 0,
    Unlock = 1,
    NonAccessUserEvent = 2,
    ForcedUserEvent = 3,
    Unlatch = 4,
}

#[derive(ToTLV, FromTLV, Debug, Copy, Clone, PartialEq, Eq)]
#[tlvargs(datatype = "u8")]
pub enum OperationSourceEnum {
    Unspecified = 0,
    Manual = 1,
    ProprietaryRemote = 2,
    Keypad = 3,
    Auto = 4,
    Button = 5,
    Schedule = 6,
    Remote = 7,
    Rfid = 8,
    Biometric = 9,
    Aliro = 10,
}

#[derive(ToTLV, FromTLV, Debug, Copy, Clone, PartialEq, Eq)]
#[tlvargs(datatype = "u8")]
pub enum CredentialTypeEnum {
    ProgrammingPin = 0,
    Pin = 1,
    Rfid = 2,
    Fingerprint = 3,
    FingerVein = 4,
    Face = 5,
    AliroCredentialIssuerKey = 6,
    AliroEvictableEndpointKey = 7,
    AliroNonEvictableEndpointKey = 8,
}

#[derive(ToTLV, FromTLV, Debug, Copy, Clone, PartialEq, Eq)]
pub struct CredentialStruct {
    pub credential_type: CredentialTypeEnum,
    pub credential_index: u16,
}

#[derive(ToTLV, FromTLV, Debug, Copy, Clone, PartialEq, Eq)]
pub struct DoorLockAlarmEvent {
    pub alarm_code: AlarmCodeEnum,
}

#[derive(ToTLV, FromTLV, Debug, Clone, PartialEq, Eq)]
pub struct LockOperationEvent {
    pub lock_operation_type: LockOperationTypeEnum,
    pub operation_source: OperationSourceEnum,
    pub user_index: Nullable<u16>,
    pub fabric_index: Nullable<u8>,
    pub source_node: Nullable<u64>,
    // Optional, and null when present without credentials
    pub credentials: OptNullable<TLVArray<CredentialStruct>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    DoorLockAlarm(DoorLockAlarmEvent),
    LockOperation(LockOperationEvent),
}

/// Decode the TLV payload of a Door Lock event
pub fn decode_event(event_id: u32, data: &[u8]) -> Result<Event, Error> {
    let mut tr = TLVReader::new(data);
    let event = match num_traits::FromPrimitive::from_u32(event_id) {
        Some(Events::DoorLockAlarm) => {
            Event::DoorLockAlarm(FromTLV::from_tlv(&mut tr, TagType::Anonymous)?)
        }
        Some(Events::LockOperation) => {
            Event::LockOperation(FromTLV::from_tlv(&mut tr, TagType::Anonymous)?)
        }
        Some(e) => {
            error!("Door Lock event {:?} is not supported", e);
            return Err(Error::Invalid);
        }
        None => {
            error!("Unknown Door Lock event {}", event_id);
            return Err(Error::Invalid);
        }
    };
    tr.finish()?;
    Ok(event)
}
