//! Device configuration packets.
//!
//! Every configuration packet is both read from and written to the device. The leading
//! `permanent` byte of a written packet selects whether the setting survives a reset.
use super::{fixed, records, Decode, DecodeError, Encode, PacketId, PacketKind};
use crate::bytes::{Reader, Writer};
use crate::framing::Frame;
use crate::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PacketTimerPeriod {
    pub permanent: bool,
    pub utc_synchronisation: bool,
    /// Base period for all packet periods, microseconds.
    pub period: u16,
}

impl PacketTimerPeriod {
    pub const LEN: usize = 4;
}

impl PacketKind for PacketTimerPeriod {
    const ID: PacketId = PacketId::PacketTimerPeriod;
}

impl Decode for PacketTimerPeriod {
    fn decode(frame: &Frame) -> std::result::Result<Self, DecodeError> {
        let mut r = fixed::<Self>(frame, &[Self::LEN])?;
        Ok(PacketTimerPeriod {
            permanent: r.bool()?,
            utc_synchronisation: r.bool()?,
            period: r.u16()?,
        })
    }
}

impl Encode for PacketTimerPeriod {
    fn encode(&self) -> Result<Frame> {
        let mut w = Writer::with_capacity(Self::LEN);
        w.bool(self.permanent)
            .bool(self.utc_synchronisation)
            .u16(self.period);
        w.into_frame(Self::ID.into())
    }
}

/// Output period of a single packet, in multiples of the packet timer period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PacketPeriod {
    /// Raw id, so periods for packets without a declared id survive a round trip.
    pub packet_id: u8,
    pub period: u32,
}

impl PacketPeriod {
    pub const LEN: usize = 5;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PacketsPeriod {
    pub permanent: bool,
    /// Stop every packet not listed in `periods`.
    pub clear_existing: bool,
    pub periods: Vec<PacketPeriod>,
}

impl PacketsPeriod {
    pub const HEAD_LEN: usize = 2;
}

impl PacketKind for PacketsPeriod {
    const ID: PacketId = PacketId::PacketsPeriod;
}

impl Decode for PacketsPeriod {
    fn decode(frame: &Frame) -> std::result::Result<Self, DecodeError> {
        let (mut r, count) = records::<Self>(frame, Self::HEAD_LEN, PacketPeriod::LEN)?;
        let permanent = r.bool()?;
        let clear_existing = r.bool()?;
        let mut periods = Vec::with_capacity(count);
        for _ in 0..count {
            periods.push(PacketPeriod {
                packet_id: r.u8()?,
                period: r.u32()?,
            });
        }
        Ok(PacketsPeriod {
            permanent,
            clear_existing,
            periods,
        })
    }
}

impl Encode for PacketsPeriod {
    fn encode(&self) -> Result<Frame> {
        let mut w = Writer::with_capacity(Self::HEAD_LEN + self.periods.len() * PacketPeriod::LEN);
        w.bool(self.permanent).bool(self.clear_existing);
        for period in &self.periods {
            w.u8(period.packet_id).u32(period.period);
        }
        w.into_frame(Self::ID.into())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BaudRates {
    pub permanent: bool,
    pub primary: u32,
    pub gpio_1_2: u32,
    pub auxiliary: u32,
}

impl BaudRates {
    pub const LEN: usize = 17;
}

impl PacketKind for BaudRates {
    const ID: PacketId = PacketId::BaudRates;
}

impl Decode for BaudRates {
    fn decode(frame: &Frame) -> std::result::Result<Self, DecodeError> {
        let mut r = fixed::<Self>(frame, &[Self::LEN])?;
        Ok(BaudRates {
            permanent: r.bool()?,
            primary: r.u32()?,
            gpio_1_2: r.u32()?,
            auxiliary: r.u32()?,
        })
    }
}

impl Encode for BaudRates {
    fn encode(&self) -> Result<Frame> {
        let mut w = Writer::with_capacity(Self::LEN);
        w.bool(self.permanent)
            .u32(self.primary)
            .u32(self.gpio_1_2)
            .u32(self.auxiliary)
            .zeros(4);
        w.into_frame(Self::ID.into())
    }
}

value_enum! {
    #[derive(Default)]
    pub enum AccelerometerRange: u8 {
        #[default]
        G2 = 0,
        G4 = 1,
        G16 = 2,
    }
}

value_enum! {
    #[derive(Default)]
    pub enum GyroscopeRange: u8 {
        #[default]
        Dps250 = 0,
        Dps500 = 1,
        Dps2000 = 2,
    }
}

value_enum! {
    #[derive(Default)]
    pub enum MagnetometerRange: u8 {
        #[default]
        G2 = 0,
        G4 = 1,
        G8 = 2,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SensorRanges {
    pub permanent: bool,
    pub accelerometer: AccelerometerRange,
    pub gyroscope: GyroscopeRange,
    pub magnetometer: MagnetometerRange,
}

impl SensorRanges {
    pub const LEN: usize = 4;
}

impl PacketKind for SensorRanges {
    const ID: PacketId = PacketId::SensorRanges;
}

impl Decode for SensorRanges {
    fn decode(frame: &Frame) -> std::result::Result<Self, DecodeError> {
        let mut r = fixed::<Self>(frame, &[Self::LEN])?;
        Ok(SensorRanges {
            permanent: r.bool()?,
            accelerometer: r.u8()?.try_into()?,
            gyroscope: r.u8()?.try_into()?,
            magnetometer: r.u8()?.try_into()?,
        })
    }
}

impl Encode for SensorRanges {
    fn encode(&self) -> Result<Frame> {
        let mut w = Writer::with_capacity(Self::LEN);
        w.bool(self.permanent)
            .u8(self.accelerometer.into())
            .u8(self.gyroscope.into())
            .u8(self.magnetometer.into());
        w.into_frame(Self::ID.into())
    }
}

/// Mounting of the unit and its peripherals relative to the vehicle body.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct InstallationAlignment {
    pub permanent: bool,
    pub alignment_dcm: [[f32; 3]; 3],
    /// X, Y, Z; meters
    pub gnss_antenna_offset: [f32; 3],
    pub odometer_offset: [f32; 3],
    pub external_data_offset: [f32; 3],
}

impl InstallationAlignment {
    pub const LEN: usize = 73;
}

impl PacketKind for InstallationAlignment {
    const ID: PacketId = PacketId::InstallationAlignment;
}

impl Decode for InstallationAlignment {
    fn decode(frame: &Frame) -> std::result::Result<Self, DecodeError> {
        let mut r = fixed::<Self>(frame, &[Self::LEN])?;
        Ok(InstallationAlignment {
            permanent: r.bool()?,
            alignment_dcm: r.mat3()?,
            gnss_antenna_offset: r.vec3()?,
            odometer_offset: r.vec3()?,
            external_data_offset: r.vec3()?,
        })
    }
}

impl Encode for InstallationAlignment {
    fn encode(&self) -> Result<Frame> {
        let mut w = Writer::with_capacity(Self::LEN);
        w.bool(self.permanent)
            .mat3(&self.alignment_dcm)
            .vec3(&self.gnss_antenna_offset)
            .vec3(&self.odometer_offset)
            .vec3(&self.external_data_offset);
        w.into_frame(Self::ID.into())
    }
}

value_enum! {
    #[derive(Default)]
    pub enum VehicleType: u8 {
        #[default]
        Unconstrained = 0,
        Bicycle = 1,
        Car = 2,
        Hovercraft = 3,
        Submarine = 4,
        Underwater3d = 5,
        FixedWingPlane = 6,
        Aircraft3d = 7,
        Human = 8,
        Boat = 9,
        LargeShip = 10,
        Stationary = 11,
        StuntPlane = 12,
        RaceCar = 13,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FilterOptions {
    pub permanent: bool,
    pub vehicle_type: VehicleType,
    pub internal_gnss_enabled: bool,
    pub magnetometers_enabled: bool,
    pub atmospheric_altitude_enabled: bool,
    pub velocity_heading_enabled: bool,
    pub reversing_detection_enabled: bool,
    pub motion_analysis_enabled: bool,
    pub automatic_magnetic_calibration_enabled: bool,
}

impl FilterOptions {
    pub const LEN: usize = 17;
}

impl PacketKind for FilterOptions {
    const ID: PacketId = PacketId::FilterOptions;
}

impl Decode for FilterOptions {
    fn decode(frame: &Frame) -> std::result::Result<Self, DecodeError> {
        let mut r = fixed::<Self>(frame, &[Self::LEN])?;
        Ok(FilterOptions {
            permanent: r.bool()?,
            vehicle_type: r.u8()?.try_into()?,
            internal_gnss_enabled: r.bool()?,
            magnetometers_enabled: r.bool()?,
            atmospheric_altitude_enabled: r.bool()?,
            velocity_heading_enabled: r.bool()?,
            reversing_detection_enabled: r.bool()?,
            motion_analysis_enabled: r.bool()?,
            automatic_magnetic_calibration_enabled: r.bool()?,
        })
    }
}

impl Encode for FilterOptions {
    fn encode(&self) -> Result<Frame> {
        let mut w = Writer::with_capacity(Self::LEN);
        w.bool(self.permanent)
            .u8(self.vehicle_type.into())
            .bool(self.internal_gnss_enabled)
            .bool(self.magnetometers_enabled)
            .bool(self.atmospheric_altitude_enabled)
            .bool(self.velocity_heading_enabled)
            .bool(self.reversing_detection_enabled)
            .bool(self.motion_analysis_enabled)
            .bool(self.automatic_magnetic_calibration_enabled)
            .zeros(8);
        w.into_frame(Self::ID.into())
    }
}

value_enum! {
    #[derive(Default)]
    pub enum Gpio1Function: u8 {
        #[default]
        Inactive = 0,
        PpsOutput = 1,
        GnssFixOutput = 2,
        OdometerInput = 3,
        ZeroVelocityInput = 4,
        PitotTubeInput = 5,
        NmeaOutput = 7,
        AnppOutput = 12,
        DisableMagnetometers = 13,
        DisableGnss = 14,
        DisablePressure = 15,
        SetZeroAlignment = 16,
        SystemStatePacketTrigger = 17,
        RawSensorsPacketTrigger = 18,
        PressureDepthSensor = 26,
        LeftWheelSpeedSensor = 27,
        RightWheelSpeedSensor = 28,
        PpsInput = 29,
        WheelSpeedSensor = 30,
        WheelEncoderPhaseA = 31,
        WheelEncoderPhaseB = 32,
        Event1Input = 33,
        Event2Input = 34,
        GnssReceiverPassthrough = 38,
        Tss1Output = 39,
        Simrad1000Output = 40,
        Simrad3000Output = 41,
        SerialPortPassthrough = 42,
        GimbalEncoderPhaseA = 43,
        GimbalEncoderPhaseB = 44,
        OdometerDirectionForwardLow = 45,
        OdometerDirectionForwardHigh = 46,
        ReverseAlignmentForwardLow = 53,
        ReverseAlignmentForwardHigh = 54,
        ZeroAngularVelocityInput = 55,
    }
}

value_enum! {
    #[derive(Default)]
    pub enum Gpio2Function: u8 {
        #[default]
        Inactive = 0,
        PpsOutput = 1,
        GnssFixOutput = 2,
        OdometerInput = 3,
        ZeroVelocityInput = 4,
        PitotTubeInput = 5,
        NmeaInput = 6,
        NovatelGnssInput = 8,
        TopconGnssInput = 9,
        AnppInput = 11,
        DisableMagnetometers = 13,
        DisableGnss = 14,
        DisablePressure = 15,
        SetZeroAlignment = 16,
        SystemStatePacketTrigger = 17,
        RawSensorsPacketTrigger = 18,
        RtcmCorrectionsInput = 19,
        TrimbleGnssInput = 20,
        UbloxGnssInput = 21,
        HemisphereGnssInput = 22,
        TeledyneDvlInput = 23,
        TritechUsblInput = 24,
        LinkquestDvlInput = 25,
        PressureDepthSensor = 26,
        LeftWheelSpeedSensor = 27,
        RightWheelSpeedSensor = 28,
        PpsInput = 29,
        WheelSpeedSensor = 30,
        WheelEncoderPhaseA = 31,
        WheelEncoderPhaseB = 32,
        Event1Input = 33,
        Event2Input = 34,
        LinkquestUsblInput = 35,
        GnssReceiverPassthrough = 38,
        SerialPortPassthrough = 42,
        GimbalEncoderPhaseA = 43,
        GimbalEncoderPhaseB = 44,
        OdometerDirectionForwardLow = 45,
        OdometerDirectionForwardHigh = 46,
        NortekDvlInput = 51,
        ReverseAlignmentForwardLow = 53,
        ReverseAlignmentForwardHigh = 54,
        ZeroAngularVelocityInput = 55,
    }
}

value_enum! {
    #[derive(Default)]
    pub enum AuxiliaryTxFunction: u8 {
        #[default]
        Inactive = 0,
        PpsOutput = 1,
        GnssFixOutput = 2,
        NmeaOutput = 7,
        AnppOutput = 12,
        GnssReceiverPassthrough = 38,
        Tss1Output = 39,
        Simrad1000Output = 40,
        Simrad3000Output = 41,
        SerialPortPassthrough = 42,
    }
}

value_enum! {
    #[derive(Default)]
    pub enum AuxiliaryRxFunction: u8 {
        #[default]
        Inactive = 0,
        OdometerInput = 3,
        ZeroVelocityInput = 4,
        PitotTubeInput = 5,
        NmeaInput = 6,
        NovatelGnssInput = 8,
        TopconGnssInput = 9,
        AnppInput = 11,
        DisableMagnetometers = 13,
        DisableGnss = 14,
        DisablePressure = 15,
        SetZeroAlignment = 16,
        SystemStatePacketTrigger = 17,
        RawSensorsPacketTrigger = 18,
        RtcmCorrectionsInput = 19,
        TrimbleGnssInput = 20,
        UbloxGnssInput = 21,
        HemisphereGnssInput = 22,
        TeledyneDvlInput = 23,
        TritechUsblInput = 24,
        LinkquestDvlInput = 25,
        PressureDepthSensor = 26,
        LeftWheelSpeedSensor = 27,
        RightWheelSpeedSensor = 28,
        PpsInput = 29,
        WheelSpeedSensor = 30,
        Event1Input = 33,
        Event2Input = 34,
        LinkquestUsblInput = 35,
        GnssReceiverPassthrough = 38,
        SerialPortPassthrough = 42,
        OdometerDirectionForwardLow = 45,
        OdometerDirectionForwardHigh = 46,
        NortekDvlInput = 51,
        ReverseAlignmentForwardLow = 53,
        ReverseAlignmentForwardHigh = 54,
        ZeroAngularVelocityInput = 55,
    }
}

value_enum! {
    #[derive(Default)]
    pub enum GpioVoltage: u8 {
        V5 = 0,
        V3_3 = 1,
        #[default]
        PowerDisabled = 2,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GpioConfiguration {
    pub permanent: bool,
    pub gpio1: Gpio1Function,
    pub gpio2: Gpio2Function,
    pub auxiliary_tx: AuxiliaryTxFunction,
    pub auxiliary_rx: AuxiliaryRxFunction,
    pub voltage: GpioVoltage,
}

impl GpioConfiguration {
    pub const LEN: usize = 13;
}

impl PacketKind for GpioConfiguration {
    const ID: PacketId = PacketId::GpioConfiguration;
}

impl Decode for GpioConfiguration {
    fn decode(frame: &Frame) -> std::result::Result<Self, DecodeError> {
        let mut r = fixed::<Self>(frame, &[Self::LEN])?;
        Ok(GpioConfiguration {
            permanent: r.bool()?,
            gpio1: r.u8()?.try_into()?,
            gpio2: r.u8()?.try_into()?,
            auxiliary_tx: r.u8()?.try_into()?,
            auxiliary_rx: r.u8()?.try_into()?,
            voltage: r.u8()?.try_into()?,
        })
    }
}

impl Encode for GpioConfiguration {
    fn encode(&self) -> Result<Frame> {
        let mut w = Writer::with_capacity(Self::LEN);
        w.bool(self.permanent)
            .u8(self.gpio1.into())
            .u8(self.gpio2.into())
            .u8(self.auxiliary_tx.into())
            .u8(self.auxiliary_rx.into())
            .u8(self.voltage.into())
            .zeros(7);
        w.into_frame(Self::ID.into())
    }
}

value_enum! {
    #[derive(Default)]
    pub enum GpioRate: u8 {
        #[default]
        Disabled = 0,
        Hz0_1 = 1,
        Hz0_2 = 2,
        Hz0_5 = 3,
        Hz1 = 4,
        Hz2 = 5,
        Hz5 = 6,
        Hz10 = 7,
        Hz25 = 8,
        Hz50 = 9,
    }
}

value_enum! {
    #[derive(Default)]
    pub enum NmeaFixBehaviour: u8 {
        #[default]
        Normal = 0,
        Always3d = 1,
    }
}

/// Output rate of one sentence on the GPIO and auxiliary ports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GpioOutputRate {
    pub gpio1: GpioRate,
    pub auxiliary: GpioRate,
}

impl GpioOutputRate {
    /// # Errors
    /// [DecodeError::InvalidValue] if either nibble is not a defined rate.
    pub fn unpack(raw: u16) -> std::result::Result<Self, DecodeError> {
        let [lo, _] = raw.to_le_bytes();
        Ok(GpioOutputRate {
            gpio1: (lo & 0x0f).try_into()?,
            auxiliary: (lo >> 4).try_into()?,
        })
    }

    #[must_use]
    pub fn pack(&self) -> u16 {
        u16::from(u8::from(self.gpio1)) | (u16::from(u8::from(self.auxiliary)) << 4)
    }
}

/// NMEA and other sentence output rates, in the order they appear on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GpioOutputSettings {
    pub permanent: bool,
    pub nmea_fix_behaviour: NmeaFixBehaviour,
    pub gpzda: GpioOutputRate,
    pub gpgga: GpioOutputRate,
    pub gpvtg: GpioOutputRate,
    pub gprmc: GpioOutputRate,
    pub gphdt: GpioOutputRate,
    pub gpgll: GpioOutputRate,
    pub pashr: GpioOutputRate,
    pub tss1: GpioOutputRate,
    pub simrad: GpioOutputRate,
    pub gprot: GpioOutputRate,
    pub gphev: GpioOutputRate,
    pub gpgsv: GpioOutputRate,
    pub pfecatt: GpioOutputRate,
    pub pfechve: GpioOutputRate,
}

impl GpioOutputSettings {
    fn read(r: &mut Reader<'_>) -> std::result::Result<Self, DecodeError> {
        let permanent = r.bool()?;
        let nmea_fix_behaviour = r.u8()?.try_into()?;
        let mut rate = || GpioOutputRate::unpack(r.u16()?);
        Ok(GpioOutputSettings {
            permanent,
            nmea_fix_behaviour,
            gpzda: rate()?,
            gpgga: rate()?,
            gpvtg: rate()?,
            gprmc: rate()?,
            gphdt: rate()?,
            gpgll: rate()?,
            pashr: rate()?,
            tss1: rate()?,
            simrad: rate()?,
            gprot: rate()?,
            gphev: rate()?,
            gpgsv: rate()?,
            pfecatt: rate()?,
            pfechve: rate()?,
        })
    }

    fn write(&self, w: &mut Writer) {
        w.bool(self.permanent).u8(self.nmea_fix_behaviour.into());
        for rate in [
            self.gpzda,
            self.gpgga,
            self.gpvtg,
            self.gprmc,
            self.gphdt,
            self.gpgll,
            self.pashr,
            self.tss1,
            self.simrad,
            self.gprot,
            self.gphev,
            self.gpgsv,
            self.pfecatt,
            self.pfechve,
        ] {
            w.u16(rate.pack());
        }
    }
}

/// GPIO output configuration. Firmware that supports GPGST output uses the extended
/// layout; the variant is chosen by payload length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GpioOutputConfiguration {
    Legacy(GpioOutputSettings),
    Extended {
        settings: GpioOutputSettings,
        gpgst: GpioOutputRate,
    },
}

impl GpioOutputConfiguration {
    pub const LEGACY_LEN: usize = 30;
    pub const EXTENDED_LEN: usize = 33;

    #[must_use]
    pub fn settings(&self) -> &GpioOutputSettings {
        match self {
            GpioOutputConfiguration::Legacy(settings)
            | GpioOutputConfiguration::Extended { settings, .. } => settings,
        }
    }
}

impl PacketKind for GpioOutputConfiguration {
    const ID: PacketId = PacketId::GpioOutputConfiguration;
}

impl Decode for GpioOutputConfiguration {
    fn decode(frame: &Frame) -> std::result::Result<Self, DecodeError> {
        let mut r = fixed::<Self>(frame, &[Self::LEGACY_LEN, Self::EXTENDED_LEN])?;
        let settings = GpioOutputSettings::read(&mut r)?;
        if frame.payload().len() == Self::LEGACY_LEN {
            return Ok(GpioOutputConfiguration::Legacy(settings));
        }
        Ok(GpioOutputConfiguration::Extended {
            settings,
            gpgst: GpioOutputRate::unpack(r.u16()?)?,
        })
    }
}

impl Encode for GpioOutputConfiguration {
    fn encode(&self) -> Result<Frame> {
        let mut w = Writer::with_capacity(Self::EXTENDED_LEN);
        self.settings().write(&mut w);
        if let GpioOutputConfiguration::Extended { gpgst, .. } = self {
            w.u16(gpgst.pack()).zeros(1);
        }
        w.into_frame(Self::ID.into())
    }
}
