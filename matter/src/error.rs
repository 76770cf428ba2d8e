use std::{fmt, num::TryFromIntError, str::Utf8Error};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    // Bad control octet, length or value in the stream
    InvalidData,
    TruncatedPacket,
    Utf8Fail,
    // Read attempted past the last top-level element
    EndOfTLV,
    NestingTooDeep,
    TLVNotFound,
    TLVTypeMismatch,
    Duplicate,
    NoContainer,
    ContainerMismatch,
    UnclosedContainer,
    NoSpace,
    Invalid,
}

/// The broad class an [`Error`] falls into
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    /// The bytes are not valid TLV
    MalformedStream,
    /// Valid TLV, but not the tag or type the caller expected
    SchemaMismatch,
    /// Container opens and closes do not pair up
    ContainerImbalance,
    Other,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidData
            | Error::TruncatedPacket
            | Error::Utf8Fail
            | Error::EndOfTLV
            | Error::NestingTooDeep => ErrorKind::MalformedStream,
            Error::TLVNotFound | Error::TLVTypeMismatch | Error::Duplicate => {
                ErrorKind::SchemaMismatch
            }
            Error::NoContainer | Error::ContainerMismatch | Error::UnclosedContainer => {
                ErrorKind::ContainerImbalance
            }
            Error::NoSpace | Error::Invalid => ErrorKind::Other,
        }
    }
}

impl From<Utf8Error> for Error {
    fn from(_e: Utf8Error) -> Self {
        Self::Utf8Fail
    }
}

impl From<TryFromIntError> for Error {
    fn from(_e: TryFromIntError) -> Self {
        // A value that doesn't fit the requested width
        Self::TLVTypeMismatch
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::TruncatedPacket.kind(), ErrorKind::MalformedStream);
        assert_eq!(Error::TLVTypeMismatch.kind(), ErrorKind::SchemaMismatch);
        assert_eq!(Error::TLVNotFound.kind(), ErrorKind::SchemaMismatch);
        assert_eq!(Error::UnclosedContainer.kind(), ErrorKind::ContainerImbalance);
        assert_eq!(Error::NoContainer.kind(), ErrorKind::ContainerImbalance);
        assert_eq!(Error::NoSpace.kind(), ErrorKind::Other);
    }

    #[test]
    fn test_conversions() {
        let r: Result<u8, Error> = u8::try_from(300_u16).map_err(Error::from);
        assert_eq!(r, Err(Error::TLVTypeMismatch));
        let bad = [0xc3_u8, 0x28];
        assert_eq!(
            std::str::from_utf8(&bad).map_err(Error::from),
            Err(Error::Utf8Fail)
        );
        assert_eq!(format!("{}", Error::EndOfTLV), "EndOfTLV");
    }
}
