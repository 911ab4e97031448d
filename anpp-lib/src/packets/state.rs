//! Navigation state packets sent by the device.
use super::{fixed, pack_flags, Decode, DecodeError, Encode, PacketId, PacketKind};
use crate::bytes::Writer;
use crate::framing::Frame;
use crate::Result;

/// Device health flags, one per bit of the system status word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SystemStatus {
    pub system_failure: bool,
    pub accelerometer_sensor_failure: bool,
    pub gyroscope_sensor_failure: bool,
    pub magnetometer_sensor_failure: bool,
    pub pressure_sensor_failure: bool,
    pub gnss_failure: bool,
    pub accelerometer_over_range: bool,
    pub gyroscope_over_range: bool,
    pub magnetometer_over_range: bool,
    pub pressure_over_range: bool,
    pub minimum_temperature_alarm: bool,
    pub maximum_temperature_alarm: bool,
    pub low_voltage_alarm: bool,
    pub high_voltage_alarm: bool,
    pub gnss_antenna_disconnected: bool,
    pub data_output_overflow_alarm: bool,
}

impl SystemStatus {
    #[must_use]
    pub fn unpack(raw: u16) -> Self {
        let bit = |n: u16| (raw & (1 << n)) != 0;
        SystemStatus {
            system_failure: bit(0),
            accelerometer_sensor_failure: bit(1),
            gyroscope_sensor_failure: bit(2),
            magnetometer_sensor_failure: bit(3),
            pressure_sensor_failure: bit(4),
            gnss_failure: bit(5),
            accelerometer_over_range: bit(6),
            gyroscope_over_range: bit(7),
            magnetometer_over_range: bit(8),
            pressure_over_range: bit(9),
            minimum_temperature_alarm: bit(10),
            maximum_temperature_alarm: bit(11),
            low_voltage_alarm: bit(12),
            high_voltage_alarm: bit(13),
            gnss_antenna_disconnected: bit(14),
            data_output_overflow_alarm: bit(15),
        }
    }

    #[must_use]
    pub fn pack(&self) -> u16 {
        pack_flags(&[
            self.system_failure,
            self.accelerometer_sensor_failure,
            self.gyroscope_sensor_failure,
            self.magnetometer_sensor_failure,
            self.pressure_sensor_failure,
            self.gnss_failure,
            self.accelerometer_over_range,
            self.gyroscope_over_range,
            self.magnetometer_over_range,
            self.pressure_over_range,
            self.minimum_temperature_alarm,
            self.maximum_temperature_alarm,
            self.low_voltage_alarm,
            self.high_voltage_alarm,
            self.gnss_antenna_disconnected,
            self.data_output_overflow_alarm,
        ])
    }

    /// Whether any failure or alarm flag is set.
    #[must_use]
    pub fn any(&self) -> bool {
        self.pack() != 0
    }
}

/// GNSS fix type, carried in bits 4..7 of the filter status word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GnssFixType {
    #[default]
    None,
    TwoD,
    ThreeD,
    Sbas,
    Differential,
    Omnistar,
    RtkFloat,
    RtkFixed,
}

impl GnssFixType {
    // All 8 values of the 3 bit field are defined.
    fn from_bits(bits: u16) -> Self {
        match bits & 0x7 {
            0 => GnssFixType::None,
            1 => GnssFixType::TwoD,
            2 => GnssFixType::ThreeD,
            3 => GnssFixType::Sbas,
            4 => GnssFixType::Differential,
            5 => GnssFixType::Omnistar,
            6 => GnssFixType::RtkFloat,
            _ => GnssFixType::RtkFixed,
        }
    }

    fn bits(self) -> u16 {
        self as u16
    }
}

/// Navigation filter state word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FilterStatus {
    pub orientation_filter_initialised: bool,
    pub ins_filter_initialised: bool,
    pub heading_initialised: bool,
    pub utc_time_initialised: bool,
    pub gnss_fix_type: GnssFixType,
    pub event1_flag: bool,
    pub event2_flag: bool,
    pub internal_gnss_enabled: bool,
    pub magnetic_heading_enabled: bool,
    pub velocity_heading_enabled: bool,
    pub atmospheric_altitude_enabled: bool,
    pub external_position_active: bool,
    pub external_velocity_active: bool,
    pub external_heading_active: bool,
}

impl FilterStatus {
    const FIX_TYPE_SHIFT: u16 = 4;

    #[must_use]
    pub fn unpack(raw: u16) -> Self {
        let bit = |n: u16| (raw & (1 << n)) != 0;
        FilterStatus {
            orientation_filter_initialised: bit(0),
            ins_filter_initialised: bit(1),
            heading_initialised: bit(2),
            utc_time_initialised: bit(3),
            gnss_fix_type: GnssFixType::from_bits(raw >> Self::FIX_TYPE_SHIFT),
            event1_flag: bit(7),
            event2_flag: bit(8),
            internal_gnss_enabled: bit(9),
            magnetic_heading_enabled: bit(10),
            velocity_heading_enabled: bit(11),
            atmospheric_altitude_enabled: bit(12),
            external_position_active: bit(13),
            external_velocity_active: bit(14),
            external_heading_active: bit(15),
        }
    }

    #[must_use]
    pub fn pack(&self) -> u16 {
        let low = pack_flags(&[
            self.orientation_filter_initialised,
            self.ins_filter_initialised,
            self.heading_initialised,
            self.utc_time_initialised,
        ]);
        let high = pack_flags(&[
            self.event1_flag,
            self.event2_flag,
            self.internal_gnss_enabled,
            self.magnetic_heading_enabled,
            self.velocity_heading_enabled,
            self.atmospheric_altitude_enabled,
            self.external_position_active,
            self.external_velocity_active,
            self.external_heading_active,
        ]);
        low | (self.gnss_fix_type.bits() << Self::FIX_TYPE_SHIFT) | (high << 7)
    }
}

/// Primary navigation output.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SystemState {
    pub system_status: SystemStatus,
    pub filter_status: FilterStatus,
    pub unix_time_seconds: u32,
    pub microseconds: u32,
    /// Radians
    pub latitude: f64,
    /// Radians
    pub longitude: f64,
    /// Meters
    pub height: f64,
    /// North, east, down; m/s
    pub velocity: [f32; 3],
    pub body_acceleration: [f32; 3],
    pub g_force: f32,
    /// Roll, pitch, heading; radians
    pub orientation: [f32; 3],
    pub angular_velocity: [f32; 3],
    /// Latitude, longitude, height standard deviation; meters
    pub standard_deviation: [f32; 3],
}

impl SystemState {
    pub const LEN: usize = 100;
}

impl PacketKind for SystemState {
    const ID: PacketId = PacketId::SystemState;
}

impl Decode for SystemState {
    fn decode(frame: &Frame) -> std::result::Result<Self, DecodeError> {
        let mut r = fixed::<Self>(frame, &[Self::LEN])?;
        Ok(SystemState {
            system_status: SystemStatus::unpack(r.u16()?),
            filter_status: FilterStatus::unpack(r.u16()?),
            unix_time_seconds: r.u32()?,
            microseconds: r.u32()?,
            latitude: r.f64()?,
            longitude: r.f64()?,
            height: r.f64()?,
            velocity: r.vec3()?,
            body_acceleration: r.vec3()?,
            g_force: r.f32()?,
            orientation: r.vec3()?,
            angular_velocity: r.vec3()?,
            standard_deviation: r.vec3()?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UnixTime {
    pub unix_time_seconds: u32,
    pub microseconds: u32,
}

impl UnixTime {
    pub const LEN: usize = 8;
}

impl PacketKind for UnixTime {
    const ID: PacketId = PacketId::UnixTime;
}

impl Decode for UnixTime {
    fn decode(frame: &Frame) -> std::result::Result<Self, DecodeError> {
        let mut r = fixed::<Self>(frame, &[Self::LEN])?;
        Ok(UnixTime {
            unix_time_seconds: r.u32()?,
            microseconds: r.u32()?,
        })
    }
}

/// UTC calendar time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FormattedTime {
    pub microseconds: u32,
    pub year: u16,
    pub year_day: u16,
    pub month: u8,
    pub month_day: u8,
    pub week_day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl FormattedTime {
    pub const LEN: usize = 14;
}

impl PacketKind for FormattedTime {
    const ID: PacketId = PacketId::FormattedTime;
}

impl Decode for FormattedTime {
    fn decode(frame: &Frame) -> std::result::Result<Self, DecodeError> {
        let mut r = fixed::<Self>(frame, &[Self::LEN])?;
        Ok(FormattedTime {
            microseconds: r.u32()?,
            year: r.u16()?,
            year_day: r.u16()?,
            month: r.u8()?,
            month_day: r.u8()?,
            week_day: r.u8()?,
            hour: r.u8()?,
            minute: r.u8()?,
            second: r.u8()?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Status {
    pub system_status: SystemStatus,
    pub filter_status: FilterStatus,
}

impl Status {
    pub const LEN: usize = 4;
}

impl PacketKind for Status {
    const ID: PacketId = PacketId::Status;
}

impl Decode for Status {
    fn decode(frame: &Frame) -> std::result::Result<Self, DecodeError> {
        let mut r = fixed::<Self>(frame, &[Self::LEN])?;
        Ok(Status {
            system_status: SystemStatus::unpack(r.u16()?),
            filter_status: FilterStatus::unpack(r.u16()?),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AirDataSensorStatus {
    pub absolute_pressure_valid: bool,
    pub differential_pressure_valid: bool,
    pub absolute_pressure_sensor_overrange: bool,
    pub differential_pressure_sensor_overrange: bool,
    pub absolute_pressure_sensor_failure: bool,
    pub differential_pressure_sensor_failure: bool,
    pub temperature_sensor_valid: bool,
    pub temperature_sensor_failure: bool,
}

impl AirDataSensorStatus {
    #[must_use]
    pub fn unpack(raw: u8) -> Self {
        let bit = |n: u8| (raw & (1 << n)) != 0;
        AirDataSensorStatus {
            absolute_pressure_valid: bit(0),
            differential_pressure_valid: bit(1),
            absolute_pressure_sensor_overrange: bit(2),
            differential_pressure_sensor_overrange: bit(3),
            absolute_pressure_sensor_failure: bit(4),
            differential_pressure_sensor_failure: bit(5),
            temperature_sensor_valid: bit(6),
            temperature_sensor_failure: bit(7),
        }
    }

    #[must_use]
    pub fn pack(&self) -> u8 {
        let raw = pack_flags(&[
            self.absolute_pressure_valid,
            self.differential_pressure_valid,
            self.absolute_pressure_sensor_overrange,
            self.differential_pressure_sensor_overrange,
            self.absolute_pressure_sensor_failure,
            self.differential_pressure_sensor_failure,
            self.temperature_sensor_valid,
            self.temperature_sensor_failure,
        ]);
        raw.to_le_bytes()[0]
    }
}

/// Raw sensor readings from an inertial unit.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ImuSensors {
    pub accelerometers: [f32; 3],
    pub gyroscopes: [f32; 3],
    pub magnetometers: [f32; 3],
    pub imu_temperature: f32,
    pub pressure: f32,
    pub pressure_temperature: f32,
}

/// Raw sensor readings from an air data unit.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AirDataSensors {
    pub absolute_pressure: f32,
    pub differential_pressure: f32,
    pub status: AirDataSensorStatus,
    pub temperature: f32,
}

/// Raw sensors packet. The layout depends on the kind of device and is selected by
/// the payload length.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RawSensors {
    Imu(ImuSensors),
    AirData(AirDataSensors),
}

impl RawSensors {
    pub const IMU_LEN: usize = 48;
    pub const AIR_DATA_LEN: usize = 13;
}

impl PacketKind for RawSensors {
    const ID: PacketId = PacketId::RawSensors;
}

impl Decode for RawSensors {
    fn decode(frame: &Frame) -> std::result::Result<Self, DecodeError> {
        let mut r = fixed::<Self>(frame, &[Self::IMU_LEN, Self::AIR_DATA_LEN])?;
        if frame.payload().len() == Self::AIR_DATA_LEN {
            return Ok(RawSensors::AirData(AirDataSensors {
                absolute_pressure: r.f32()?,
                differential_pressure: r.f32()?,
                status: AirDataSensorStatus::unpack(r.u8()?),
                temperature: r.f32()?,
            }));
        }
        Ok(RawSensors::Imu(ImuSensors {
            accelerometers: r.vec3()?,
            gyroscopes: r.vec3()?,
            magnetometers: r.vec3()?,
            imu_temperature: r.f32()?,
            pressure: r.f32()?,
            pressure_temperature: r.f32()?,
        }))
    }
}

/// Direction cosine matrix orientation.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DcmOrientation {
    pub matrix: [[f32; 3]; 3],
}

impl DcmOrientation {
    pub const LEN: usize = 36;
}

impl PacketKind for DcmOrientation {
    const ID: PacketId = PacketId::DcmOrientation;
}

impl Decode for DcmOrientation {
    fn decode(frame: &Frame) -> std::result::Result<Self, DecodeError> {
        let mut r = fixed::<Self>(frame, &[Self::LEN])?;
        Ok(DcmOrientation { matrix: r.mat3()? })
    }
}

/// Velocity aiding from an external sensor in the body frame.
///
/// Older firmware takes a single standard deviation for all axes; newer firmware takes
/// one per axis. The wire layout follows the variant.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ExternalBodyVelocity {
    Legacy {
        velocity: [f32; 3],
        standard_deviation: f32,
    },
    Extended {
        velocity: [f32; 3],
        standard_deviation: [f32; 3],
    },
}

impl ExternalBodyVelocity {
    pub const LEGACY_LEN: usize = 16;
    pub const EXTENDED_LEN: usize = 24;

    #[must_use]
    pub fn velocity(&self) -> [f32; 3] {
        match self {
            ExternalBodyVelocity::Legacy { velocity, .. }
            | ExternalBodyVelocity::Extended { velocity, .. } => *velocity,
        }
    }
}

impl PacketKind for ExternalBodyVelocity {
    const ID: PacketId = PacketId::ExternalBodyVelocity;
}

impl Decode for ExternalBodyVelocity {
    fn decode(frame: &Frame) -> std::result::Result<Self, DecodeError> {
        let mut r = fixed::<Self>(frame, &[Self::LEGACY_LEN, Self::EXTENDED_LEN])?;
        let velocity = r.vec3()?;
        if frame.payload().len() == Self::LEGACY_LEN {
            return Ok(ExternalBodyVelocity::Legacy {
                velocity,
                standard_deviation: r.f32()?,
            });
        }
        Ok(ExternalBodyVelocity::Extended {
            velocity,
            standard_deviation: r.vec3()?,
        })
    }
}

impl Encode for ExternalBodyVelocity {
    fn encode(&self) -> Result<Frame> {
        let mut w = Writer::with_capacity(Self::EXTENDED_LEN);
        match self {
            ExternalBodyVelocity::Legacy {
                velocity,
                standard_deviation,
            } => w.vec3(velocity).f32(*standard_deviation),
            ExternalBodyVelocity::Extended {
                velocity,
                standard_deviation,
            } => w.vec3(velocity).vec3(standard_deviation),
        };
        w.into_frame(Self::ID.into())
    }
}
