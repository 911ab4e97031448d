//! Typed packet codecs.
//!
//! Each packet kind is a plain struct (or an enum over its historical wire layouts)
//! implementing [Decode] and, for packets a host sends, [Encode]. All multi-byte fields
//! are little-endian at fixed offsets.
//!
//! [Packet] is the closed set of implemented codecs. [Packet::decode] selects the codec
//! with a single `match` on the frame id.

/// Declares a fieldless enum carried on the wire as an integer, along with conversions
/// to and from that integer. Unknown values fail with [DecodeError::InvalidValue].
macro_rules! value_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident: $repr:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize))]
        #[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
        #[repr($repr)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant = $value ),+
        }

        impl TryFrom<$repr> for $name {
            type Error = $crate::packets::DecodeError;

            fn try_from(value: $repr) -> std::result::Result<Self, Self::Error> {
                match value {
                    $( x if x == $name::$variant as $repr => Ok($name::$variant), )+
                    _ => Err($crate::packets::DecodeError::InvalidValue {
                        field: stringify!($name),
                        value: u32::from(value),
                    }),
                }
            }
        }

        impl From<$name> for $repr {
            fn from(value: $name) -> $repr {
                value as $repr
            }
        }
    };
}

mod configuration;
mod file_transfer;
mod id;
mod satellites;
mod state;
mod system;

use derive_more::From;

use crate::bytes::Reader;
use crate::framing::Frame;
use crate::Result;

pub use configuration::*;
pub use file_transfer::*;
pub use id::PacketId;
pub use satellites::*;
pub use state::*;
pub use system::*;

/// Reasons a frame cannot be decoded as a particular packet.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("expected packet id {expected}, got {actual}")]
    WrongId { expected: u8, actual: u8 },
    #[error("packet {id}: expected payload length in {expected:?}, got {actual}")]
    WrongLength {
        id: u8,
        expected: &'static [usize],
        actual: usize,
    },
    /// Variable length payload that is not a fixed head plus whole records.
    #[error("packet {id}: {actual} bytes is not a {head} byte head plus {element} byte records")]
    BadElementLength {
        id: u8,
        head: usize,
        element: usize,
        actual: usize,
    },
    /// A count or length field refers past the end of the payload.
    #[error("packet {id}: needed {needed} bytes but payload has {actual}")]
    Truncated { id: u8, needed: usize, actual: usize },
    #[error("invalid {field} value {value}")]
    InvalidValue { field: &'static str, value: u32 },
    #[error("no codec for packet id {id}")]
    Unsupported { id: u8 },
}

/// Identity shared by the decode and encode halves of a codec.
pub trait PacketKind {
    const ID: PacketId;
}

pub trait Decode: PacketKind + Sized {
    /// Decode a frame payload.
    ///
    /// # Errors
    /// If the frame id does not match [PacketKind::ID], if the payload length is not
    /// valid for this packet, or if an enumerated field holds an unknown value.
    fn decode(frame: &Frame) -> std::result::Result<Self, DecodeError>;
}

pub trait Encode: PacketKind {
    /// Encode into a complete frame.
    ///
    /// # Errors
    /// [crate::Error::PayloadTooLarge] if a variable length packet does not fit in a
    /// single frame.
    fn encode(&self) -> Result<Frame>;
}

fn check_id<P: PacketKind>(frame: &Frame) -> std::result::Result<(), DecodeError> {
    let expected = u8::from(P::ID);
    if frame.id() != expected {
        return Err(DecodeError::WrongId {
            expected,
            actual: frame.id(),
        });
    }
    Ok(())
}

/// Reader for a packet with one or more accepted fixed lengths.
pub(crate) fn fixed<'a, P: PacketKind>(
    frame: &'a Frame,
    lengths: &'static [usize],
) -> std::result::Result<Reader<'a>, DecodeError> {
    check_id::<P>(frame)?;
    let actual = frame.payload().len();
    if !lengths.contains(&actual) {
        return Err(DecodeError::WrongLength {
            id: frame.id(),
            expected: lengths,
            actual,
        });
    }
    Ok(Reader::new(frame.id(), frame.payload()))
}

/// Reader for a packet made of a fixed head followed by whole `element` sized records,
/// and the number of records.
pub(crate) fn records<'a, P: PacketKind>(
    frame: &'a Frame,
    head: usize,
    element: usize,
) -> std::result::Result<(Reader<'a>, usize), DecodeError> {
    check_id::<P>(frame)?;
    let actual = frame.payload().len();
    if actual < head || (actual - head) % element != 0 {
        return Err(DecodeError::BadElementLength {
            id: frame.id(),
            head,
            element,
            actual,
        });
    }
    Ok((
        Reader::new(frame.id(), frame.payload()),
        (actual - head) / element,
    ))
}

/// Combine flags into a word, flag `i` at bit `i`.
pub(crate) fn pack_flags(flags: &[bool]) -> u16 {
    flags
        .iter()
        .enumerate()
        .fold(0, |acc, (bit, set)| acc | (u16::from(*set) << bit))
}

/// All implemented packet codecs.
#[derive(Debug, Clone, PartialEq, From)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[non_exhaustive]
pub enum Packet {
    Acknowledge(Acknowledge),
    Request(Request),
    BootMode(BootMode),
    DeviceInformation(DeviceInformation),
    RestoreFactorySettings(RestoreFactorySettings),
    Reset(Reset),
    FileTransferAcknowledge(FileTransferAcknowledge),
    FileTransfer(FileTransfer),
    SystemState(SystemState),
    UnixTime(UnixTime),
    FormattedTime(FormattedTime),
    Status(Status),
    RawSensors(RawSensors),
    Satellites(Satellites),
    DetailedSatellites(DetailedSatellites),
    DcmOrientation(DcmOrientation),
    ExternalBodyVelocity(ExternalBodyVelocity),
    RawSatelliteData(RawSatelliteData),
    PacketTimerPeriod(PacketTimerPeriod),
    PacketsPeriod(PacketsPeriod),
    BaudRates(BaudRates),
    SensorRanges(SensorRanges),
    InstallationAlignment(InstallationAlignment),
    FilterOptions(FilterOptions),
    GpioConfiguration(GpioConfiguration),
    GpioOutputConfiguration(GpioOutputConfiguration),
}

impl Packet {
    /// Decode `frame` with the codec registered for its id.
    ///
    /// # Errors
    /// [DecodeError::Unsupported] if there is no codec for the frame id, otherwise any
    /// error from the selected codec.
    pub fn decode(frame: &Frame) -> std::result::Result<Packet, DecodeError> {
        let Ok(id) = PacketId::try_from(frame.id()) else {
            return Err(DecodeError::Unsupported { id: frame.id() });
        };
        let packet: Packet = match id {
            PacketId::Acknowledge => Acknowledge::decode(frame)?.into(),
            PacketId::Request => Request::decode(frame)?.into(),
            PacketId::BootMode => BootMode::decode(frame)?.into(),
            PacketId::DeviceInformation => DeviceInformation::decode(frame)?.into(),
            PacketId::RestoreFactorySettings => RestoreFactorySettings::decode(frame)?.into(),
            PacketId::Reset => Reset::decode(frame)?.into(),
            PacketId::FileTransferAcknowledge => FileTransferAcknowledge::decode(frame)?.into(),
            PacketId::FileTransfer => FileTransfer::decode(frame)?.into(),
            PacketId::SystemState => SystemState::decode(frame)?.into(),
            PacketId::UnixTime => UnixTime::decode(frame)?.into(),
            PacketId::FormattedTime => FormattedTime::decode(frame)?.into(),
            PacketId::Status => Status::decode(frame)?.into(),
            PacketId::RawSensors => RawSensors::decode(frame)?.into(),
            PacketId::Satellites => Satellites::decode(frame)?.into(),
            PacketId::DetailedSatellites => DetailedSatellites::decode(frame)?.into(),
            PacketId::DcmOrientation => DcmOrientation::decode(frame)?.into(),
            PacketId::ExternalBodyVelocity => ExternalBodyVelocity::decode(frame)?.into(),
            PacketId::RawSatelliteData => RawSatelliteData::decode(frame)?.into(),
            PacketId::PacketTimerPeriod => PacketTimerPeriod::decode(frame)?.into(),
            PacketId::PacketsPeriod => PacketsPeriod::decode(frame)?.into(),
            PacketId::BaudRates => BaudRates::decode(frame)?.into(),
            PacketId::SensorRanges => SensorRanges::decode(frame)?.into(),
            PacketId::InstallationAlignment => InstallationAlignment::decode(frame)?.into(),
            PacketId::FilterOptions => FilterOptions::decode(frame)?.into(),
            PacketId::GpioConfiguration => GpioConfiguration::decode(frame)?.into(),
            PacketId::GpioOutputConfiguration => GpioOutputConfiguration::decode(frame)?.into(),
            _ => return Err(DecodeError::Unsupported { id: frame.id() }),
        };
        Ok(packet)
    }

    /// Whether [Packet::decode] has a codec for `id`.
    #[must_use]
    pub fn is_supported(id: u8) -> bool {
        matches!(
            PacketId::try_from(id),
            Ok(PacketId::Acknowledge
                | PacketId::Request
                | PacketId::BootMode
                | PacketId::DeviceInformation
                | PacketId::RestoreFactorySettings
                | PacketId::Reset
                | PacketId::FileTransferAcknowledge
                | PacketId::FileTransfer
                | PacketId::SystemState
                | PacketId::UnixTime
                | PacketId::FormattedTime
                | PacketId::Status
                | PacketId::RawSensors
                | PacketId::Satellites
                | PacketId::DetailedSatellites
                | PacketId::DcmOrientation
                | PacketId::ExternalBodyVelocity
                | PacketId::RawSatelliteData
                | PacketId::PacketTimerPeriod
                | PacketId::PacketsPeriod
                | PacketId::BaudRates
                | PacketId::SensorRanges
                | PacketId::InstallationAlignment
                | PacketId::FilterOptions
                | PacketId::GpioConfiguration
                | PacketId::GpioOutputConfiguration)
        )
    }

    #[must_use]
    pub fn id(&self) -> PacketId {
        match self {
            Packet::Acknowledge(_) => Acknowledge::ID,
            Packet::Request(_) => Request::ID,
            Packet::BootMode(_) => BootMode::ID,
            Packet::DeviceInformation(_) => DeviceInformation::ID,
            Packet::RestoreFactorySettings(_) => RestoreFactorySettings::ID,
            Packet::Reset(_) => Reset::ID,
            Packet::FileTransferAcknowledge(_) => FileTransferAcknowledge::ID,
            Packet::FileTransfer(_) => FileTransfer::ID,
            Packet::SystemState(_) => SystemState::ID,
            Packet::UnixTime(_) => UnixTime::ID,
            Packet::FormattedTime(_) => FormattedTime::ID,
            Packet::Status(_) => Status::ID,
            Packet::RawSensors(_) => RawSensors::ID,
            Packet::Satellites(_) => Satellites::ID,
            Packet::DetailedSatellites(_) => DetailedSatellites::ID,
            Packet::DcmOrientation(_) => DcmOrientation::ID,
            Packet::ExternalBodyVelocity(_) => ExternalBodyVelocity::ID,
            Packet::RawSatelliteData(_) => RawSatelliteData::ID,
            Packet::PacketTimerPeriod(_) => PacketTimerPeriod::ID,
            Packet::PacketsPeriod(_) => PacketsPeriod::ID,
            Packet::BaudRates(_) => BaudRates::ID,
            Packet::SensorRanges(_) => SensorRanges::ID,
            Packet::InstallationAlignment(_) => InstallationAlignment::ID,
            Packet::FilterOptions(_) => FilterOptions::ID,
            Packet::GpioConfiguration(_) => GpioConfiguration::ID,
            Packet::GpioOutputConfiguration(_) => GpioOutputConfiguration::ID,
        }
    }
}
