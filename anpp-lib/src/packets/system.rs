//! System packets: acknowledgements, requests and device control.
use super::{fixed, records, Decode, DecodeError, Encode, PacketId, PacketKind};
use crate::bytes::Writer;
use crate::framing::Frame;
use crate::Result;

value_enum! {
    pub enum AcknowledgeResult: u8 {
        Success = 0,
        FailureCrc = 1,
        FailureLength = 2,
        FailureRange = 3,
        FailureFlash = 4,
        FailureNotReady = 5,
        FailureUnknownPacket = 6,
    }
}

/// Device response to a packet sent by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Acknowledge {
    /// Id of the packet being acknowledged. Kept raw since a device may acknowledge
    /// (with a failure) ids that are not declared.
    pub packet_id: u8,
    /// CRC of the packet being acknowledged.
    pub packet_crc: u16,
    pub result: AcknowledgeResult,
}

impl Acknowledge {
    pub const LEN: usize = 4;

    /// Whether this acknowledges `sent`, matching on both id and CRC.
    #[must_use]
    pub fn acknowledges(&self, sent: &Frame) -> bool {
        self.packet_id == sent.id() && self.packet_crc == sent.crc()
    }
}

impl PacketKind for Acknowledge {
    const ID: PacketId = PacketId::Acknowledge;
}

impl Decode for Acknowledge {
    fn decode(frame: &Frame) -> std::result::Result<Self, DecodeError> {
        let mut r = fixed::<Self>(frame, &[Self::LEN])?;
        Ok(Acknowledge {
            packet_id: r.u8()?,
            packet_crc: r.u16()?,
            result: r.u8()?.try_into()?,
        })
    }
}

/// Asks the device to send each listed packet once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Request {
    pub packets: Vec<PacketId>,
}

impl Request {
    pub fn new(packets: impl IntoIterator<Item = PacketId>) -> Self {
        Request {
            packets: packets.into_iter().collect(),
        }
    }
}

impl PacketKind for Request {
    const ID: PacketId = PacketId::Request;
}

impl Decode for Request {
    fn decode(frame: &Frame) -> std::result::Result<Self, DecodeError> {
        let (mut r, count) = records::<Self>(frame, 0, 1)?;
        let mut packets = Vec::with_capacity(count);
        for _ in 0..count {
            packets.push(r.u8()?.try_into()?);
        }
        Ok(Request { packets })
    }
}

impl Encode for Request {
    fn encode(&self) -> Result<Frame> {
        let mut w = Writer::with_capacity(self.packets.len());
        for id in &self.packets {
            w.u8((*id).into());
        }
        w.into_frame(Self::ID.into())
    }
}

value_enum! {
    #[derive(Default)]
    pub enum BootTarget: u8 {
        Bootloader = 0,
        #[default]
        MainProgram = 1,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BootMode {
    pub mode: BootTarget,
}

impl BootMode {
    pub const LEN: usize = 1;
}

impl PacketKind for BootMode {
    const ID: PacketId = PacketId::BootMode;
}

impl Decode for BootMode {
    fn decode(frame: &Frame) -> std::result::Result<Self, DecodeError> {
        let mut r = fixed::<Self>(frame, &[Self::LEN])?;
        Ok(BootMode {
            mode: r.u8()?.try_into()?,
        })
    }
}

impl Encode for BootMode {
    fn encode(&self) -> Result<Frame> {
        let mut w = Writer::with_capacity(Self::LEN);
        w.u8(self.mode.into());
        w.into_frame(Self::ID.into())
    }
}

value_enum! {
    pub enum DeviceId: u32 {
        Unknown = 0,
        Spatial = 1,
        Orientus = 3,
        SpatialFog = 4,
        SpatialDual = 5,
        ObdiiOdometer = 10,
        OrientusV3 = 11,
        Ilu = 12,
        AirDataUnit = 13,
        SpatialFogDual = 16,
        Motus = 17,
        GnssCompass = 18,
        Certus = 26,
        Aries = 27,
        BoreasD90 = 28,
        BoreasD90Fpga = 35,
        BoreasCoil = 36,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DeviceInformation {
    pub software_version: u32,
    pub device_id: DeviceId,
    pub hardware_revision: u32,
    pub serial_number: [u32; 3],
}

impl DeviceInformation {
    pub const LEN: usize = 24;
}

impl PacketKind for DeviceInformation {
    const ID: PacketId = PacketId::DeviceInformation;
}

impl Decode for DeviceInformation {
    fn decode(frame: &Frame) -> std::result::Result<Self, DecodeError> {
        let mut r = fixed::<Self>(frame, &[Self::LEN])?;
        Ok(DeviceInformation {
            software_version: r.u32()?,
            device_id: r.u32()?.try_into()?,
            hardware_revision: r.u32()?,
            serial_number: [r.u32()?, r.u32()?, r.u32()?],
        })
    }
}

/// Restores factory settings and resets the device. The payload is a fixed
/// verification word so it cannot be triggered by accident.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RestoreFactorySettings;

impl RestoreFactorySettings {
    pub const LEN: usize = 4;
    pub const VERIFICATION: u32 = 0x8542_9E1C;
}

impl PacketKind for RestoreFactorySettings {
    const ID: PacketId = PacketId::RestoreFactorySettings;
}

impl Decode for RestoreFactorySettings {
    fn decode(frame: &Frame) -> std::result::Result<Self, DecodeError> {
        let mut r = fixed::<Self>(frame, &[Self::LEN])?;
        let value = r.u32()?;
        if value != Self::VERIFICATION {
            return Err(DecodeError::InvalidValue {
                field: "verification",
                value,
            });
        }
        Ok(RestoreFactorySettings)
    }
}

impl Encode for RestoreFactorySettings {
    fn encode(&self) -> Result<Frame> {
        let mut w = Writer::with_capacity(Self::LEN);
        w.u32(Self::VERIFICATION);
        w.into_frame(Self::ID.into())
    }
}

value_enum! {
    #[derive(Default)]
    pub enum ResetVerification: u32 {
        #[default]
        HotStart = 0x2105_7A7E,
        ColdStart = 0x9A5D_38B7,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Reset {
    pub verification: ResetVerification,
}

impl Reset {
    pub const LEN: usize = 4;
}

impl PacketKind for Reset {
    const ID: PacketId = PacketId::Reset;
}

impl Decode for Reset {
    fn decode(frame: &Frame) -> std::result::Result<Self, DecodeError> {
        let mut r = fixed::<Self>(frame, &[Self::LEN])?;
        Ok(Reset {
            verification: r.u32()?.try_into()?,
        })
    }
}

impl Encode for Reset {
    fn encode(&self) -> Result<Frame> {
        let mut w = Writer::with_capacity(Self::LEN);
        w.u32(self.verification.into());
        w.into_frame(Self::ID.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("820004 7901 b8c08400", 184, 33984, AcknowledgeResult::Success)]
    #[test_case("a90004 ec67 b9c08401", 185, 33984, AcknowledgeResult::FailureCrc)]
    #[test_case("2a0004 6b67 baecc702", 186, 51180, AcknowledgeResult::FailureLength)]
    fn test_acknowledge_fixtures(dat: &str, packet_id: u8, packet_crc: u16, result: AcknowledgeResult) {
        let dat = hex::decode(dat.replace(' ', "")).unwrap();
        let frame = Frame::decode(&dat).expect("fixture to be a valid frame");
        let ack = Acknowledge::decode(&frame).unwrap();
        assert_eq!(
            ack,
            Acknowledge {
                packet_id,
                packet_crc,
                result
            }
        );
    }

    #[test]
    fn test_acknowledges_sent_frame() {
        let sent = Reset::default().encode().unwrap();
        let ack = Acknowledge {
            packet_id: sent.id(),
            packet_crc: sent.crc(),
            result: AcknowledgeResult::Success,
        };
        assert!(ack.acknowledges(&sent));
        assert!(!ack.acknowledges(&RestoreFactorySettings.encode().unwrap()));
    }

    #[test_case(3; "short")]
    #[test_case(5; "long")]
    fn test_acknowledge_length(len: usize) {
        let frame = Frame::new(0, vec![0u8; len]).unwrap();
        assert_eq!(
            Acknowledge::decode(&frame),
            Err(DecodeError::WrongLength {
                id: 0,
                expected: &[Acknowledge::LEN],
                actual: len
            })
        );
    }

    #[test]
    fn test_acknowledge_bad_result() {
        let frame = Frame::new(0, vec![0xb8, 0xc0, 0x84, 0x07]).unwrap();
        assert_eq!(
            Acknowledge::decode(&frame),
            Err(DecodeError::InvalidValue {
                field: "AcknowledgeResult",
                value: 7
            })
        );
    }

    #[test]
    fn test_request_single() {
        let frame = Request::new([PacketId::BootMode]).encode().unwrap();
        assert_eq!(frame.header(), &[0x8b, 0x01, 0x01, 0xb2, 0xc1]);
        assert_eq!(frame.payload(), &[0x02]);
    }

    #[test]
    fn test_request_multiple() {
        let request = Request::new([
            PacketId::BootMode,
            PacketId::DeviceInformation,
            PacketId::BaudRates,
        ]);
        let frame = request.encode().unwrap();
        assert_eq!(frame.header(), &[0x1a, 0x01, 0x03, 0xb2, 0x30]);
        assert_eq!(frame.payload(), &[0x02, 0x03, 0xb6]);
        assert_eq!(Request::decode(&frame).unwrap(), request);
    }

    #[test]
    fn test_request_undeclared_id() {
        let frame = Frame::new(1, vec![20, 12]).unwrap();
        assert!(matches!(
            Request::decode(&frame),
            Err(DecodeError::InvalidValue { value: 12, .. })
        ));
    }

    #[test]
    fn test_device_information() {
        let payload = hex::decode(concat!(
            "e8030000", // software version 1000
            "1a000000", // certus
            "05000000", // hardware revision
            "01000000", "02000000", "03000000",
        ))
        .unwrap();
        let frame = Frame::new(3, payload).unwrap();
        let info = DeviceInformation::decode(&frame).unwrap();
        assert_eq!(info.software_version, 1000);
        assert_eq!(info.device_id, DeviceId::Certus);
        assert_eq!(info.hardware_revision, 5);
        assert_eq!(info.serial_number, [1, 2, 3]);
    }

    #[test]
    fn test_reset_payloads() {
        let hot = Reset::default().encode().unwrap();
        assert_eq!(hot.payload(), &[0x7e, 0x7a, 0x05, 0x21]);
        let cold = Reset {
            verification: ResetVerification::ColdStart,
        };
        let frame = cold.encode().unwrap();
        assert_eq!(frame.payload(), &[0xb7, 0x38, 0x5d, 0x9a]);
        assert_eq!(Reset::decode(&frame).unwrap(), cold);

        let bogus = Frame::new(5, vec![0, 0, 0, 0]).unwrap();
        assert!(Reset::decode(&bogus).is_err());
    }

    #[test]
    fn test_restore_factory_settings() {
        let frame = RestoreFactorySettings.encode().unwrap();
        assert_eq!(frame.payload(), &[0x1c, 0x9e, 0x42, 0x85]);
        assert_eq!(RestoreFactorySettings::decode(&frame), Ok(RestoreFactorySettings));
    }

    #[test]
    fn test_boot_mode() {
        let frame = BootMode {
            mode: BootTarget::Bootloader,
        }
        .encode()
        .unwrap();
        assert_eq!(frame.payload(), &[0]);
        assert_eq!(BootMode::decode(&frame).unwrap().mode, BootTarget::Bootloader);
    }
}
