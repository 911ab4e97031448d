//! Conversion of device time fields to [hifitime::Epoch].
//!
//! Devices report UTC as seconds since the Unix epoch plus a microsecond fraction.
use hifitime::{Duration, Epoch};

use crate::packets::{FormattedTime, SystemState, UnixTime};
use crate::{Error, Result};

/// Number of seconds between 1900 (the hifitime reference) and 1970
const UNIX_HIFIEPOCH_DELTA_SECS: u64 = 2_208_988_800;

/// Convert a Unix time and microsecond fraction into a UTC [Epoch].
///
/// # Errors
/// [Error::Timecode] if `microseconds` is not less than one second.
pub fn from_unix(seconds: u32, microseconds: u32) -> Result<Epoch> {
    if microseconds >= 1_000_000 {
        return Err(Error::Timecode(format!(
            "microseconds must be less than 1000000; got {microseconds}"
        )));
    }
    let dur = Duration::compose(
        0,
        0,
        0,
        0,
        // Add in delta to get to hifi epoch
        UNIX_HIFIEPOCH_DELTA_SECS + u64::from(seconds),
        0,
        u64::from(microseconds),
        0,
    );
    Ok(Epoch::from_utc_duration(dur))
}

impl UnixTime {
    /// # Errors
    /// [Error::Timecode] if the microsecond field is out of range.
    pub fn epoch(&self) -> Result<Epoch> {
        from_unix(self.unix_time_seconds, self.microseconds)
    }
}

impl SystemState {
    /// # Errors
    /// [Error::Timecode] if the microsecond field is out of range.
    pub fn epoch(&self) -> Result<Epoch> {
        from_unix(self.unix_time_seconds, self.microseconds)
    }
}

impl FormattedTime {
    /// # Errors
    /// [Error::Timecode] if the calendar fields do not form a valid UTC date and time.
    pub fn epoch(&self) -> Result<Epoch> {
        if self.microseconds >= 1_000_000 {
            return Err(Error::Timecode(format!(
                "microseconds must be less than 1000000; got {}",
                self.microseconds
            )));
        }
        Epoch::maybe_from_gregorian_utc(
            i32::from(self.year),
            self.month,
            self.month_day,
            self.hour,
            self.minute,
            self.second,
            self.microseconds * 1_000,
        )
        .map_err(|err| Error::Timecode(err.to_string()))
    }
}
