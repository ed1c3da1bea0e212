//! The validity period of a certificate.

use std::{error, fmt};
use chrono::TimeDelta;
use crate::asn1::Time;
use crate::der::{self, Decoder, DecodeError, Values};


//------------ Validity ------------------------------------------------------

/// The period a certificate is valid for.
///
/// ```txt
/// Validity ::= SEQUENCE {
///      notBefore      Time,
///      notAfter       Time }
/// ```
///
/// Both ends are inclusive. The start is never after the end.
#[derive(Clone, Debug, Copy, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Validity {
    not_before: Time,
    not_after: Time,
}

impl Validity {
    /// Creates a new validity from start and end.
    ///
    /// Fails if the start is after the end.
    pub fn new(
        not_before: Time, not_after: Time
    ) -> Result<Self, ValidityError> {
        if not_before > not_after {
            Err(ValidityError::Inverted)
        }
        else {
            Ok(Validity { not_before, not_after })
        }
    }

    /// Creates a validity starting now and lasting for `duration`.
    ///
    /// A negative duration results in a period ending now.
    pub fn from_duration(duration: TimeDelta) -> Self {
        let now = Time::now().truncated();
        let then = now + duration;
        if now < then {
            Validity { not_before: now, not_after: then }
        }
        else {
            Validity { not_before: then, not_after: now }
        }
    }

    pub fn not_before(self) -> Time {
        self.not_before
    }

    pub fn not_after(self) -> Time {
        self.not_after
    }

    /// Checks that `now` falls into the validity period.
    pub fn verify_at(self, now: Time) -> Result<(), ValidityError> {
        if now < self.not_before {
            Err(ValidityError::NotYetValid)
        }
        else if now > self.not_after {
            Err(ValidityError::Expired)
        }
        else {
            Ok(())
        }
    }

    /// Checks that the current time falls into the validity period.
    pub fn verify(self) -> Result<(), ValidityError> {
        self.verify_at(Time::now())
    }

    pub fn take_from(cons: &mut Decoder) -> Result<Self, DecodeError> {
        cons.take_sequence(|cons| {
            let not_before = Time::take_from(cons)?;
            let not_after = Time::take_from(cons)?;
            Validity::new(not_before, not_after).map_err(|_| {
                cons.malformed("notBefore after notAfter")
            })
        })
    }

    pub fn encode(self) -> impl Values {
        der::sequence((
            self.not_before.encode_varied(),
            self.not_after.encode_varied(),
        ))
    }
}


//------------ ValidityError -------------------------------------------------

/// A validity period is broken or a time is outside of it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidityError {
    /// The start of the period is after its end.
    Inverted,

    /// The time is before the start of the period.
    NotYetValid,

    /// The time is after the end of the period.
    Expired,
}

impl fmt::Display for ValidityError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            ValidityError::Inverted => "validity starts after it ends",
            ValidityError::NotYetValid => "not yet valid",
            ValidityError::Expired => "expired",
        })
    }
}

impl error::Error for ValidityError { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn time(year: i32) -> Time {
        Time::utc(year, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn ordering_enforced() {
        assert!(Validity::new(time(2020), time(2020)).is_ok());
        assert_eq!(
            Validity::new(time(2021), time(2020)),
            Err(ValidityError::Inverted)
        );

        let inverted = der::sequence((
            time(2021).encode_utc_time(),
            time(2020).encode_utc_time(),
        )).to_vec().unwrap();
        assert!(Decoder::decode(inverted, Validity::take_from).is_err());
    }

    #[test]
    fn encoding() {
        let validity = Validity::new(time(2020), time(2050)).unwrap();
        let data = validity.encode().to_vec().unwrap();
        assert_eq!(data[2], 0x17); // UTCTime
        assert_eq!(data[17], 0x18); // GeneralizedTime
        assert_eq!(
            Decoder::decode(data, Validity::take_from).unwrap(), validity
        );
    }

    #[test]
    fn verify_at() {
        let validity = Validity::new(time(2020), time(2030)).unwrap();
        assert!(validity.verify_at(time(2020)).is_ok());
        assert!(validity.verify_at(time(2030)).is_ok());
        assert_eq!(
            validity.verify_at(time(2019)), Err(ValidityError::NotYetValid)
        );
        assert_eq!(
            validity.verify_at(time(2031)), Err(ValidityError::Expired)
        );
    }

    #[test]
    fn from_duration() {
        let validity = Validity::from_duration(TimeDelta::days(-1));
        assert!(validity.not_before() < validity.not_after());
        assert!(Validity::from_duration(TimeDelta::days(1)).verify().is_ok());
    }
}
