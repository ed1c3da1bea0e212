//! Points in time.

use std::{ops, str};
use std::time::SystemTime;
use chrono::{
    DateTime, Datelike, LocalResult, TimeDelta, Timelike, TimeZone, Utc
};
use crate::der::{
    Choice2, Decoder, DecodeError, Primitive, PrimitiveContent, Tag, Values
};


//------------ Time ----------------------------------------------------------

/// A point in time with a resolution of a second.
///
/// Certificates use two encodings for time: UTCTime with a two-digit year
/// for the years 1950 to 2049 and GeneralizedTime with a four-digit year
/// for everything else. Both are always in UTC and without fractional
/// seconds.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Time(DateTime<Utc>);

impl Time {
    pub fn new(dt: DateTime<Utc>) -> Self {
        Time(dt)
    }

    pub fn now() -> Self {
        Self::new(Utc::now())
    }

    /// Creates a time value from its components.
    ///
    /// Returns `None` if the components don’t form a valid time.
    pub fn utc(
        year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32
    ) -> Option<Self> {
        match Utc.with_ymd_and_hms(year, month, day, hour, min, sec) {
            LocalResult::Single(dt) => Some(Time(dt)),
            _ => None
        }
    }

    /// Returns the time truncated to full seconds.
    ///
    /// This is the precision that survives encoding.
    pub fn truncated(self) -> Self {
        Time(self.0 - TimeDelta::nanoseconds(
            i64::from(self.0.nanosecond())
        ))
    }

    /// Takes a time value in either encoding.
    pub fn take_from(cons: &mut Decoder) -> Result<Self, DecodeError> {
        cons.take_value(|tag, prim| {
            match tag {
                Tag::UTC_TIME => {
                    // RFC 5280 requires the format YYMMDDHHMMSSZ
                    let year = read_two_char(prim)? as i32;
                    let year = if year >= 50 { year + 1900 }
                               else { year + 2000 };
                    Self::from_parts(year, prim)
                }
                Tag::GENERALIZED_TIME => {
                    // RFC 5280 requires the format YYYYMMDDHHMMSSZ
                    let year = read_four_char(prim)? as i32;
                    Self::from_parts(year, prim)
                }
                _ => Err(prim.malformed("malformed time value"))
            }
        })
    }

    fn from_parts(year: i32, prim: &mut Decoder) -> Result<Self, DecodeError> {
        let month = read_two_char(prim)?;
        let day = read_two_char(prim)?;
        let hour = read_two_char(prim)?;
        let min = read_two_char(prim)?;
        let sec = read_two_char(prim)?;
        if prim.take_octet()? != b'Z' {
            return Err(prim.malformed("malformed time value"))
        }
        Self::utc(year, month, day, hour, min, sec).ok_or_else(|| {
            prim.malformed("malformed time value")
        })
    }

    pub fn encode_utc_time(self) -> Primitive<UtcTime> {
        UtcTime(self).encode()
    }

    pub fn encode_generalized_time(self) -> Primitive<GeneralizedTime> {
        GeneralizedTime(self).encode()
    }

    /// Encodes the time in the encoding appropriate for its year.
    pub fn encode_varied(self) -> impl Values {
        if self.year() < 1950 || self.year() > 2049 {
            Choice2::Two(self.encode_generalized_time())
        }
        else {
            Choice2::One(self.encode_utc_time())
        }
    }
}


//--- Deref and AsRef

impl ops::Deref for Time {
    type Target = DateTime<Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<DateTime<Utc>> for Time {
    fn as_ref(&self) -> &DateTime<Utc> {
        &self.0
    }
}


//--- From

impl From<DateTime<Utc>> for Time {
    fn from(time: DateTime<Utc>) -> Self {
        Time(time)
    }
}

impl From<Time> for DateTime<Utc> {
    fn from(time: Time) -> Self {
        time.0
    }
}

impl From<SystemTime> for Time {
    fn from(time: SystemTime) -> Self {
        Time(time.into())
    }
}


//--- Add and Sub

impl ops::Add<TimeDelta> for Time {
    type Output = Self;

    fn add(self, duration: TimeDelta) -> Self::Output {
        Self::new(self.0 + duration)
    }
}

impl ops::Sub<TimeDelta> for Time {
    type Output = Self;

    fn sub(self, duration: TimeDelta) -> Self::Output {
        Self::new(self.0 - duration)
    }
}


fn read_two_char(prim: &mut Decoder) -> Result<u32, DecodeError> {
    let mut res = 0;
    for _ in 0..2 {
        res = res * 10 + read_digit(prim)?;
    }
    Ok(res)
}

fn read_four_char(prim: &mut Decoder) -> Result<u32, DecodeError> {
    let mut res = 0;
    for _ in 0..4 {
        res = res * 10 + read_digit(prim)?;
    }
    Ok(res)
}

fn read_digit(prim: &mut Decoder) -> Result<u32, DecodeError> {
    let ch = prim.take_octet()?;
    if ch.is_ascii_digit() {
        Ok(u32::from(ch - b'0'))
    }
    else {
        Err(prim.malformed("malformed time value"))
    }
}


//------------ UtcTime -------------------------------------------------------

pub struct UtcTime(Time);

impl PrimitiveContent for UtcTime {
    const TAG: Tag = Tag::UTC_TIME;

    fn encoded_len(&self) -> usize {
        13 // yyMMddhhmmssZ
    }

    fn write_encoded(&self, target: &mut Vec<u8>) {
        target.extend_from_slice(format!(
            "{:02}{:02}{:02}{:02}{:02}{:02}Z",
            self.0.year() % 100, self.0.month(), self.0.day(),
            self.0.hour(), self.0.minute(), self.0.second()
        ).as_bytes())
    }
}


//------------ GeneralizedTime -----------------------------------------------

pub struct GeneralizedTime(Time);

impl PrimitiveContent for GeneralizedTime {
    const TAG: Tag = Tag::GENERALIZED_TIME;

    fn encoded_len(&self) -> usize {
        15 // yyyyMMddhhmmssZ
    }

    fn write_encoded(&self, target: &mut Vec<u8>) {
        target.extend_from_slice(format!(
            "{:04}{:02}{:02}{:02}{:02}{:02}Z",
            self.0.year(), self.0.month(), self.0.day(),
            self.0.hour(), self.0.minute(), self.0.second()
        ).as_bytes())
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn decode(data: &'static [u8]) -> Result<Time, DecodeError> {
        Decoder::decode(data, Time::take_from)
    }

    #[test]
    fn utc_time_century() {
        assert_eq!(
            decode(b"\x17\x0d491231235959Z").unwrap(),
            Time::utc(2049, 12, 31, 23, 59, 59).unwrap()
        );
        assert_eq!(
            decode(b"\x17\x0d500101000000Z").unwrap(),
            Time::utc(1950, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn generalized_time() {
        let time = decode(b"\x18\x0f20510607224937Z").unwrap();
        assert_eq!(time, Time::utc(2051, 6, 7, 22, 49, 37).unwrap());
        assert_eq!(
            time.encode_varied().to_vec().unwrap(),
            b"\x18\x0f20510607224937Z"
        );
    }

    #[test]
    fn encode_varied() {
        let time = Time::utc(2026, 10, 16, 22, 49, 37).unwrap();
        assert_eq!(
            time.encode_varied().to_vec().unwrap(),
            b"\x17\x0d261016224937Z"
        );
        let time = Time::utc(1949, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            time.encode_varied().to_vec().unwrap(),
            b"\x18\x0f19490101000000Z"
        );
    }

    #[test]
    fn malformed() {
        assert!(decode(b"\x17\x0d261016224937X").is_err());
        assert!(decode(b"\x17\x0c2610162249Z").is_err());
        assert!(decode(b"\x17\x0d261316224937Z").is_err());
        assert!(decode(b"\x17\x0d26101622493+Z").is_err());
        assert!(decode(b"\x17\x0f261016224937.5Z").is_err());
        assert!(decode(b"\x04\x0d261016224937Z").is_err());
    }
}
