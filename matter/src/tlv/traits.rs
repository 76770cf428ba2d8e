use super::{TLVReader, TLVWriter, TagType};
use crate::error::Error;
use core::slice::Iter;

pub trait FromTLV<'a> {
    fn from_tlv(tr: &mut TLVReader<'a>, tag: TagType) -> Result<Self, Error>
    where
        Self: Sized;

    // Only the optional wrappers define this
    fn tlv_not_found() -> Result<Self, Error>
    where
        Self: Sized,
    {
        Err(Error::TLVNotFound)
    }
}

macro_rules! fromtlv_for {
    ($($t:ident $getter:ident)*) => {
        $(
            impl<'a> FromTLV<'a> for $t {
                fn from_tlv(tr: &mut TLVReader<'a>, tag: TagType) -> Result<Self, Error> {
                    tr.$getter(tag)
                }
            }
        )*
    };
}

fromtlv_for!(
    i8 get_i8 i16 get_i16 i32 get_i32 i64 get_i64
    u8 get_u8 u16 get_u16 u32 get_u32 u64 get_u64
    f32 get_f32 f64 get_f64 bool get_bool
);

pub trait ToTLV {
    fn to_tlv(&self, tw: &mut TLVWriter, tag: TagType) -> Result<(), Error>;
}

macro_rules! totlv_for {
    ($($t:ident)*) => {
        $(
            impl ToTLV for $t {
                fn to_tlv(&self, tw: &mut TLVWriter, tag: TagType) -> Result<(), Error> {
                    tw.$t(tag, *self)
                }
            }
        )*
    };
}

// Generate ToTLV for standard data types
totlv_for!(i8 i16 i32 i64 u8 u16 u32 u64 f32 f64 bool);

impl<T: ToTLV + ?Sized> ToTLV for &T {
    fn to_tlv(&self, tw: &mut TLVWriter, tag: TagType) -> Result<(), Error> {
        (**self).to_tlv(tw, tag)
    }
}

// A few string flavours:
//
// - UtfStr, OctetStr, &str: borrow from the TLV buffer they were read from
// - String, Vec<u8>: owned copies

impl ToTLV for str {
    fn to_tlv(&self, tw: &mut TLVWriter, tag: TagType) -> Result<(), Error> {
        tw.utf8(tag, self)
    }
}

impl<'a> FromTLV<'a> for &'a str {
    fn from_tlv(tr: &mut TLVReader<'a>, tag: TagType) -> Result<Self, Error> {
        tr.get_utf8(tag)
    }
}

/// A borrowed UTF-8 string
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UtfStr<'a>(pub &'a str);

impl<'a> FromTLV<'a> for UtfStr<'a> {
    fn from_tlv(tr: &mut TLVReader<'a>, tag: TagType) -> Result<UtfStr<'a>, Error> {
        tr.get_utf8(tag).map(UtfStr)
    }
}

impl<'a> ToTLV for UtfStr<'a> {
    fn to_tlv(&self, tw: &mut TLVWriter, tag: TagType) -> Result<(), Error> {
        tw.utf8(tag, self.0)
    }
}

/// A borrowed octet string
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OctetStr<'a>(pub &'a [u8]);

impl<'a> FromTLV<'a> for OctetStr<'a> {
    fn from_tlv(tr: &mut TLVReader<'a>, tag: TagType) -> Result<OctetStr<'a>, Error> {
        tr.get_str(tag).map(OctetStr)
    }
}

impl<'a> ToTLV for OctetStr<'a> {
    fn to_tlv(&self, tw: &mut TLVWriter, tag: TagType) -> Result<(), Error> {
        tw.str(tag, self.0)
    }
}

/// Owned octet string
impl FromTLV<'_> for Vec<u8> {
    fn from_tlv(tr: &mut TLVReader, tag: TagType) -> Result<Vec<u8>, Error> {
        tr.get_str(tag).map(|x| x.to_owned())
    }
}

impl ToTLV for Vec<u8> {
    fn to_tlv(&self, tw: &mut TLVWriter, tag: TagType) -> Result<(), Error> {
        tw.str(tag, self.as_slice())
    }
}

/// Owned UTF-8 string
impl FromTLV<'_> for String {
    fn from_tlv(tr: &mut TLVReader, tag: TagType) -> Result<String, Error> {
        tr.get_utf8(tag).map(|x| x.to_owned())
    }
}

impl ToTLV for String {
    fn to_tlv(&self, tw: &mut TLVWriter, tag: TagType) -> Result<(), Error> {
        tw.utf8(tag, self)
    }
}

/// Applies to all the Option<> Processing
impl<'a, T: FromTLV<'a>> FromTLV<'a> for Option<T> {
    fn from_tlv(tr: &mut TLVReader<'a>, tag: TagType) -> Result<Option<T>, Error> {
        Ok(Some(T::from_tlv(tr, tag)?))
    }

    fn tlv_not_found() -> Result<Self, Error>
    where
        Self: Sized,
    {
        Ok(None)
    }
}

impl<T: ToTLV> ToTLV for Option<T> {
    fn to_tlv(&self, tw: &mut TLVWriter, tag: TagType) -> Result<(), Error> {
        match self {
            Some(s) => s.to_tlv(tw, tag),
            None => Ok(()),
        }
    }
}

/// Represent a nullable value
///
/// The value may be null or a valid value
/// Note: Null is different from absent. If the field may also be left out,
/// use [`OptNullable`] instead.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Nullable<T> {
    Null,
    NotNull(T),
}

impl<T> Nullable<T> {
    pub fn is_null(&self) -> bool {
        match self {
            Nullable::Null => true,
            Nullable::NotNull(_) => false,
        }
    }

    pub fn notnull(self) -> Option<T> {
        match self {
            Nullable::Null => None,
            Nullable::NotNull(t) => Some(t),
        }
    }
}

impl<T> From<Option<T>> for Nullable<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(t) => Nullable::NotNull(t),
            None => Nullable::Null,
        }
    }
}

impl<'a, T: FromTLV<'a>> FromTLV<'a> for Nullable<T> {
    fn from_tlv(tr: &mut TLVReader<'a>, tag: TagType) -> Result<Nullable<T>, Error> {
        if tr.is_null() {
            tr.get_null(tag)?;
            Ok(Nullable::Null)
        } else {
            Ok(Nullable::NotNull(T::from_tlv(tr, tag)?))
        }
    }
}

impl<T: ToTLV> ToTLV for Nullable<T> {
    fn to_tlv(&self, tw: &mut TLVWriter, tag: TagType) -> Result<(), Error> {
        match self {
            Nullable::Null => tw.null(tag),
            Nullable::NotNull(s) => s.to_tlv(tw, tag),
        }
    }
}

/// A field that may be left out, be explicitly null, or hold a value
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum OptNullable<T> {
    Absent,
    Null,
    Present(T),
}

impl<T> OptNullable<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, OptNullable::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, OptNullable::Null)
    }

    pub fn present(self) -> Option<T> {
        match self {
            OptNullable::Present(t) => Some(t),
            _ => None,
        }
    }
}

impl<T> Default for OptNullable<T> {
    fn default() -> Self {
        OptNullable::Absent
    }
}

impl<T> From<Option<Nullable<T>>> for OptNullable<T> {
    fn from(value: Option<Nullable<T>>) -> Self {
        match value {
            None => OptNullable::Absent,
            Some(Nullable::Null) => OptNullable::Null,
            Some(Nullable::NotNull(t)) => OptNullable::Present(t),
        }
    }
}

impl<'a, T: FromTLV<'a>> FromTLV<'a> for OptNullable<T> {
    fn from_tlv(tr: &mut TLVReader<'a>, tag: TagType) -> Result<Self, Error> {
        Ok(match Nullable::<T>::from_tlv(tr, tag)? {
            Nullable::Null => OptNullable::Null,
            Nullable::NotNull(t) => OptNullable::Present(t),
        })
    }

    fn tlv_not_found() -> Result<Self, Error> {
        Ok(OptNullable::Absent)
    }
}

impl<T: ToTLV> ToTLV for OptNullable<T> {
    fn to_tlv(&self, tw: &mut TLVWriter, tag: TagType) -> Result<(), Error> {
        match self {
            OptNullable::Absent => Ok(()),
            OptNullable::Null => tw.null(tag),
            OptNullable::Present(s) => s.to_tlv(tw, tag),
        }
    }
}

/// An owned TLV array
///
/// `Vec<u8>` already stands for an octet string, so arrays are wrapped in
/// this type.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct TLVArray<T>(pub Vec<T>);

impl<T> TLVArray<T> {
    pub fn new(entries: Vec<T>) -> Self {
        Self(entries)
    }

    pub fn iter(&self) -> Iter<T> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> From<Vec<T>> for TLVArray<T> {
    fn from(entries: Vec<T>) -> Self {
        Self(entries)
    }
}

impl<'a, T: FromTLV<'a>> FromTLV<'a> for TLVArray<T> {
    fn from_tlv(tr: &mut TLVReader<'a>, tag: TagType) -> Result<Self, Error> {
        tr.enter_array(tag)?;
        let mut vec = Vec::<T>::new();
        while !tr.is_end_of_container() {
            vec.push(T::from_tlv(tr, TagType::Anonymous)?);
        }
        tr.exit_container()?;
        Ok(Self(vec))
    }
}

impl<T: ToTLV> ToTLV for TLVArray<T> {
    fn to_tlv(&self, tw: &mut TLVWriter, tag_type: TagType) -> Result<(), Error> {
        tw.start_array(tag_type)?;
        for t in &self.0 {
            t.to_tlv(tw, TagType::Anonymous)?;
        }
        tw.end_container()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        FromTLV, Nullable, OctetStr, OptNullable, TLVArray, TLVReader, TLVWriter, TagType, ToTLV,
        UtfStr,
    };
    use crate::{error::Error, utils::writebuf::WriteBuf};
    use matter_macro_derive::{FromTLV, ToTLV};

    #[derive(ToTLV)]
    struct TestDerive {
        a: u16,
        b: u32,
    }

    #[test]
    fn test_derive_totlv() {
        let mut buf: [u8; 20] = [0; 20];
        let buf_len = buf.len();
        let mut writebuf = WriteBuf::new(&mut buf, buf_len);
        let mut tw = TLVWriter::new(&mut writebuf);

        let abc = TestDerive {
            a: 0x1010,
            b: 0x20202020,
        };
        abc.to_tlv(&mut tw, TagType::Anonymous).unwrap();
        assert_eq!(
            tw.get_encoded().unwrap(),
            [21, 37, 0, 0x10, 0x10, 38, 1, 0x20, 0x20, 0x20, 0x20, 24]
        );
    }

    #[derive(FromTLV, Debug, PartialEq)]
    struct TestDeriveSimple {
        a: u16,
        b: u32,
    }

    #[test]
    fn test_derive_fromtlv() {
        let b = [21, 37, 0, 10, 0, 38, 1, 20, 0, 0, 0, 24];
        let mut tr = TLVReader::new(&b);
        let test = TestDeriveSimple::from_tlv(&mut tr, TagType::Anonymous).unwrap();
        assert_eq!(test, TestDeriveSimple { a: 10, b: 20 });
        tr.finish().unwrap();
    }

    #[derive(FromTLV, ToTLV, Debug, PartialEq)]
    #[tlvargs(start = 1, datatype = "list")]
    struct TestDeriveList {
        a: u8,
        b: Option<u8>,
        c: u8,
    }

    #[test]
    fn test_derive_list_with_start() {
        let mut buf: [u8; 20] = [0; 20];
        let buf_len = buf.len();
        let mut writebuf = WriteBuf::new(&mut buf, buf_len);
        let mut tw = TLVWriter::new(&mut writebuf);

        let list = TestDeriveList { a: 1, b: None, c: 3 };
        list.to_tlv(&mut tw, TagType::Context(5)).unwrap();
        let encoded = tw.get_encoded().unwrap();
        assert_eq!(encoded, [0x37, 5, 0x24, 1, 1, 0x24, 3, 3, 0x18]);

        let mut tr = TLVReader::new(encoded);
        assert_eq!(
            TestDeriveList::from_tlv(&mut tr, TagType::Context(5)).unwrap(),
            list
        );
    }

    #[derive(FromTLV, ToTLV, Debug, PartialEq)]
    struct TestDeriveFabScoped {
        a: u16,
        #[tagval(0xFE)]
        fab_idx: u8,
    }

    #[test]
    fn test_derive_fab_scoped() {
        let mut buf: [u8; 20] = [0; 20];
        let buf_len = buf.len();
        let mut writebuf = WriteBuf::new(&mut buf, buf_len);
        let mut tw = TLVWriter::new(&mut writebuf);

        let s = TestDeriveFabScoped { a: 5, fab_idx: 2 };
        s.to_tlv(&mut tw, TagType::Anonymous).unwrap();
        let encoded = tw.get_encoded().unwrap();
        assert_eq!(encoded, [0x15, 0x24, 0, 5, 0x24, 0xfe, 2, 0x18]);

        let mut tr = TLVReader::new(encoded);
        assert_eq!(
            TestDeriveFabScoped::from_tlv(&mut tr, TagType::Anonymous).unwrap(),
            s
        );
    }

    #[derive(FromTLV, ToTLV, Debug, PartialEq)]
    struct TestDeriveOptional {
        required: u8,
        optional: Option<u16>,
        nullable: Nullable<u32>,
        opt_nullable: OptNullable<bool>,
    }

    #[test]
    fn test_derive_optional_nullable() {
        let mut buf: [u8; 30] = [0; 30];
        let buf_len = buf.len();
        let mut writebuf = WriteBuf::new(&mut buf, buf_len);
        let mut tw = TLVWriter::new(&mut writebuf);

        let s = TestDeriveOptional {
            required: 1,
            optional: None,
            nullable: Nullable::Null,
            opt_nullable: OptNullable::Null,
        };
        s.to_tlv(&mut tw, TagType::Anonymous).unwrap();
        let encoded = tw.get_encoded().unwrap();
        assert_eq!(encoded, [0x15, 0x24, 0, 1, 0x34, 2, 0x34, 3, 0x18]);

        let mut tr = TLVReader::new(encoded);
        assert_eq!(
            TestDeriveOptional::from_tlv(&mut tr, TagType::Anonymous).unwrap(),
            s
        );

        // Absent opt_nullable, present everything else
        let b = [0x15, 0x24, 0, 1, 0x24, 1, 7, 0x24, 2, 9, 0x18];
        let mut tr = TLVReader::new(&b);
        assert_eq!(
            TestDeriveOptional::from_tlv(&mut tr, TagType::Anonymous).unwrap(),
            TestDeriveOptional {
                required: 1,
                optional: Some(7),
                nullable: Nullable::NotNull(9),
                opt_nullable: OptNullable::Absent,
            }
        );

        // The required field is missing
        let b = [0x15, 0x24, 1, 7, 0x18];
        let mut tr = TLVReader::new(&b);
        assert_eq!(
            TestDeriveOptional::from_tlv(&mut tr, TagType::Anonymous),
            Err(Error::TLVNotFound)
        );
    }

    #[derive(FromTLV, Debug, PartialEq)]
    #[tlvargs(unordered)]
    struct TestDeriveUnordered {
        a: u8,
        b: Option<u8>,
        c: u8,
    }

    #[test]
    fn test_derive_unordered() {
        let b = [0x15, 0x24, 2, 3, 0x24, 9, 9, 0x24, 0, 1, 0x18];
        let mut tr = TLVReader::new(&b);
        assert_eq!(
            TestDeriveUnordered::from_tlv(&mut tr, TagType::Anonymous).unwrap(),
            TestDeriveUnordered { a: 1, b: None, c: 3 }
        );
        tr.finish().unwrap();

        let b = [0x15, 0x24, 0, 1, 0x24, 2, 3, 0x24, 0, 1, 0x18];
        let mut tr = TLVReader::new(&b);
        assert_eq!(
            TestDeriveUnordered::from_tlv(&mut tr, TagType::Anonymous),
            Err(Error::Duplicate)
        );
    }

    #[derive(FromTLV, ToTLV, Debug, PartialEq)]
    #[tlvargs(lifetime = "'a")]
    struct TestDeriveBorrowed<'a> {
        name: &'a str,
        data: OctetStr<'a>,
        label: UtfStr<'a>,
    }

    #[test]
    fn test_derive_borrowed() {
        let mut buf: [u8; 30] = [0; 30];
        let buf_len = buf.len();
        let mut writebuf = WriteBuf::new(&mut buf, buf_len);
        let mut tw = TLVWriter::new(&mut writebuf);

        let s = TestDeriveBorrowed {
            name: "abc",
            data: OctetStr(&[1, 2]),
            label: UtfStr("x"),
        };
        s.to_tlv(&mut tw, TagType::Anonymous).unwrap();
        let encoded = tw.get_encoded().unwrap();
        assert_eq!(
            encoded,
            [0x15, 0x2c, 0, 3, b'a', b'b', b'c', 0x30, 1, 2, 1, 2, 0x2c, 2, 1, b'x', 0x18]
        );
        let mut tr = TLVReader::new(encoded);
        assert_eq!(
            TestDeriveBorrowed::from_tlv(&mut tr, TagType::Anonymous).unwrap(),
            s
        );
    }

    #[derive(FromTLV, ToTLV, Debug, PartialEq)]
    enum TestDeriveEnum {
        ValueA(u32),
        ValueB(u32),
    }

    #[test]
    fn test_derive_enum() {
        let mut buf: [u8; 20] = [0; 20];
        let buf_len = buf.len();
        let mut writebuf = WriteBuf::new(&mut buf, buf_len);
        let mut tw = TLVWriter::new(&mut writebuf);

        TestDeriveEnum::ValueB(10)
            .to_tlv(&mut tw, TagType::Anonymous)
            .unwrap();
        let encoded = tw.get_encoded().unwrap();
        assert_eq!(encoded, [0x15, 0x24, 1, 10, 0x18]);

        let mut tr = TLVReader::new(encoded);
        assert_eq!(
            TestDeriveEnum::from_tlv(&mut tr, TagType::Anonymous).unwrap(),
            TestDeriveEnum::ValueB(10)
        );

        let b = [0x15, 0x24, 5, 10, 0x18];
        let mut tr = TLVReader::new(&b);
        assert_eq!(
            TestDeriveEnum::from_tlv(&mut tr, TagType::Anonymous),
            Err(Error::InvalidData)
        );
    }

    #[derive(FromTLV, ToTLV, Debug, PartialEq, Copy, Clone)]
    #[tlvargs(datatype = "u8")]
    enum TestDeriveCode {
        Off = 0,
        On = 1,
        Toggle = 7,
    }

    #[test]
    fn test_derive_fieldless_enum() {
        let mut buf: [u8; 20] = [0; 20];
        let buf_len = buf.len();
        let mut writebuf = WriteBuf::new(&mut buf, buf_len);
        let mut tw = TLVWriter::new(&mut writebuf);

        TestDeriveCode::Toggle
            .to_tlv(&mut tw, TagType::Context(3))
            .unwrap();
        let encoded = tw.get_encoded().unwrap();
        assert_eq!(encoded, [0x24, 3, 7]);

        let mut tr = TLVReader::new(encoded);
        assert_eq!(
            TestDeriveCode::from_tlv(&mut tr, TagType::Context(3)),
            Ok(TestDeriveCode::Toggle)
        );

        let b = [0x24, 3, 2];
        let mut tr = TLVReader::new(&b);
        assert_eq!(
            TestDeriveCode::from_tlv(&mut tr, TagType::Context(3)),
            Err(Error::InvalidData)
        );
        assert_ne!(TestDeriveCode::On, TestDeriveCode::Off);
    }

    #[test]
    fn test_derive_rewinds_on_error() {
        let mut buf: [u8; 8] = [0; 8];
        let buf_len = buf.len();
        let mut writebuf = WriteBuf::new(&mut buf, buf_len);
        let mut tw = TLVWriter::new(&mut writebuf);

        tw.start_array(TagType::Anonymous).unwrap();
        let abc = TestDerive {
            a: 0x1010,
            b: 0x20202020,
        };
        assert_eq!(abc.to_tlv(&mut tw, TagType::Anonymous), Err(Error::NoSpace));
        assert_eq!(tw.depth(), 1);
        assert_eq!(tw.get_tail(), 1);
        tw.end_container().unwrap();
        assert_eq!(tw.get_encoded().unwrap(), [0x16, 0x18]);
    }

    #[test]
    fn test_array_owned() {
        let mut buf: [u8; 20] = [0; 20];
        let buf_len = buf.len();
        let mut writebuf = WriteBuf::new(&mut buf, buf_len);
        let mut tw = TLVWriter::new(&mut writebuf);

        let arr = TLVArray::new(vec![1_u16, 300, 2]);
        tw.put(TagType::Context(1), &arr).unwrap();
        let encoded = tw.get_encoded().unwrap();
        assert_eq!(encoded, [0x36, 1, 0x04, 1, 0x05, 0x2c, 0x01, 0x04, 2, 0x18]);

        let mut tr = TLVReader::new(encoded);
        let decoded = TLVArray::<u16>::from_tlv(&mut tr, TagType::Context(1)).unwrap();
        assert_eq!(decoded, arr);
        assert_eq!(decoded.len(), 3);
    }

    #[test]
    fn test_opt_nullable_conversions() {
        assert!(OptNullable::<u8>::from(None).is_absent());
        assert!(OptNullable::<u8>::from(Some(Nullable::Null)).is_null());
        assert_eq!(
            OptNullable::from(Some(Nullable::NotNull(4_u8))).present(),
            Some(4)
        );
        assert_eq!(Nullable::from(Some(3_u8)), Nullable::NotNull(3));
        assert!(Nullable::<u8>::from(None).is_null());
    }
}
