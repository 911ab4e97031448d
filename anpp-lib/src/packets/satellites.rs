//! GNSS satellite packets.
use super::{fixed, records, Decode, DecodeError, PacketId, PacketKind};
use crate::bytes::Reader;
use crate::framing::Frame;

value_enum! {
    pub enum SatelliteSystem: u8 {
        Unknown = 0,
        Gps = 1,
        Glonass = 2,
        Beidou = 3,
        Galileo = 4,
        Sbas = 5,
        Qzss = 6,
        Starfire = 7,
        Omnistar = 8,
    }
}

/// Satellite counts and dilution of precision.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Satellites {
    pub hdop: f32,
    pub vdop: f32,
    pub gps_satellites: u8,
    pub glonass_satellites: u8,
    pub beidou_satellites: u8,
    pub galileo_satellites: u8,
    pub sbas_satellites: u8,
}

impl Satellites {
    pub const LEN: usize = 13;

    #[must_use]
    pub fn total(&self) -> u32 {
        [
            self.gps_satellites,
            self.glonass_satellites,
            self.beidou_satellites,
            self.galileo_satellites,
            self.sbas_satellites,
        ]
        .iter()
        .map(|n| u32::from(*n))
        .sum()
    }
}

impl PacketKind for Satellites {
    const ID: PacketId = PacketId::Satellites;
}

impl Decode for Satellites {
    fn decode(frame: &Frame) -> std::result::Result<Self, DecodeError> {
        let mut r = fixed::<Self>(frame, &[Self::LEN])?;
        Ok(Satellites {
            hdop: r.f32()?,
            vdop: r.f32()?,
            gps_satellites: r.u8()?,
            glonass_satellites: r.u8()?,
            beidou_satellites: r.u8()?,
            galileo_satellites: r.u8()?,
            sbas_satellites: r.u8()?,
        })
    }
}

/// Signals being tracked for a satellite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SatelliteFrequencies {
    pub l1_ca: bool,
    pub l1_c: bool,
    pub l1_p: bool,
    pub l1_m: bool,
    pub l2_c: bool,
    pub l2_p: bool,
    pub l2_m: bool,
    pub l5: bool,
}

impl SatelliteFrequencies {
    #[must_use]
    pub fn unpack(raw: u8) -> Self {
        let bit = |n: u8| (raw & (1 << n)) != 0;
        SatelliteFrequencies {
            l1_ca: bit(0),
            l1_c: bit(1),
            l1_p: bit(2),
            l1_m: bit(3),
            l2_c: bit(4),
            l2_p: bit(5),
            l2_m: bit(6),
            l5: bit(7),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DetailedSatellite {
    pub system: SatelliteSystem,
    pub number: u8,
    pub frequencies: SatelliteFrequencies,
    /// Degrees
    pub elevation: u8,
    /// Degrees
    pub azimuth: u16,
    /// dB-Hz
    pub snr: u8,
}

impl DetailedSatellite {
    pub const LEN: usize = 7;

    fn read(r: &mut Reader<'_>) -> std::result::Result<Self, DecodeError> {
        Ok(DetailedSatellite {
            system: r.u8()?.try_into()?,
            number: r.u8()?,
            frequencies: SatelliteFrequencies::unpack(r.u8()?),
            elevation: r.u8()?,
            azimuth: r.u16()?,
            snr: r.u8()?,
        })
    }
}

/// One record per tracked satellite; the count follows from the payload length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DetailedSatellites {
    pub satellites: Vec<DetailedSatellite>,
}

impl PacketKind for DetailedSatellites {
    const ID: PacketId = PacketId::DetailedSatellites;
}

impl Decode for DetailedSatellites {
    fn decode(frame: &Frame) -> std::result::Result<Self, DecodeError> {
        let (mut r, count) = records::<Self>(frame, 0, DetailedSatellite::LEN)?;
        let satellites = (0..count)
            .map(|_| DetailedSatellite::read(&mut r))
            .collect::<std::result::Result<_, _>>()?;
        Ok(DetailedSatellites { satellites })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TrackingStatus {
    pub carrier_phase_valid: bool,
    pub carrier_phase_cycle_slip_detected: bool,
    pub carrier_phase_half_cycle_ambiguity: bool,
    pub pseudo_range_valid: bool,
    pub doppler_valid: bool,
    pub snr_valid: bool,
}

impl TrackingStatus {
    #[must_use]
    pub fn unpack(raw: u8) -> Self {
        let bit = |n: u8| (raw & (1 << n)) != 0;
        TrackingStatus {
            carrier_phase_valid: bit(0),
            carrier_phase_cycle_slip_detected: bit(1),
            carrier_phase_half_cycle_ambiguity: bit(2),
            pseudo_range_valid: bit(3),
            doppler_valid: bit(4),
            snr_valid: bit(5),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FrequencyInformation {
    /// Signal identifier. Its meaning depends on the satellite system, e.g. 1 is L1 C/A
    /// for GPS but E1 OS for Galileo.
    pub frequency: u8,
    pub tracking_status: TrackingStatus,
    /// Cycles
    pub carrier_phase: f64,
    /// Meters
    pub pseudo_range: f64,
    /// Hz
    pub doppler_frequency: f32,
    /// dB-Hz
    pub snr: f32,
}

impl FrequencyInformation {
    pub const LEN: usize = 26;

    fn read(r: &mut Reader<'_>) -> std::result::Result<Self, DecodeError> {
        Ok(FrequencyInformation {
            frequency: r.u8()?,
            tracking_status: TrackingStatus::unpack(r.u8()?),
            carrier_phase: r.f64()?,
            pseudo_range: r.f64()?,
            doppler_frequency: r.f32()?,
            snr: r.f32()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SatelliteData {
    pub system: SatelliteSystem,
    pub prn: u8,
    /// Degrees
    pub elevation: u8,
    /// Degrees
    pub azimuth: u16,
    pub frequencies: Vec<FrequencyInformation>,
}

impl SatelliteData {
    /// Fixed part preceding the frequency records.
    pub const HEAD_LEN: usize = 6;

    fn read(r: &mut Reader<'_>) -> std::result::Result<Self, DecodeError> {
        let system = r.u8()?.try_into()?;
        let prn = r.u8()?;
        let elevation = r.u8()?;
        let azimuth = r.u16()?;
        let count = usize::from(r.u8()?);
        // a bogus count fails before allocating
        r.require(count * FrequencyInformation::LEN)?;
        let mut frequencies = Vec::with_capacity(count);
        for _ in 0..count {
            frequencies.push(FrequencyInformation::read(r)?);
        }
        Ok(SatelliteData {
            system,
            prn,
            elevation,
            azimuth,
            frequencies,
        })
    }
}

/// Raw GNSS observations. Large epochs are split over several packets, see
/// `packet_number` and `total_packets`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RawSatelliteData {
    pub unix_time_seconds: u32,
    pub nanoseconds: u32,
    /// Nanoseconds
    pub receiver_clock_offset: i32,
    pub receiver_number: u8,
    pub packet_number: u8,
    pub total_packets: u8,
    pub satellites: Vec<SatelliteData>,
}

impl RawSatelliteData {
    pub const HEAD_LEN: usize = 16;
}

impl PacketKind for RawSatelliteData {
    const ID: PacketId = PacketId::RawSatelliteData;
}

impl Decode for RawSatelliteData {
    fn decode(frame: &Frame) -> std::result::Result<Self, DecodeError> {
        let (mut r, _) = records::<Self>(frame, Self::HEAD_LEN, 1)?;
        let unix_time_seconds = r.u32()?;
        let nanoseconds = r.u32()?;
        let receiver_clock_offset = r.i32()?;
        let receiver_number = r.u8()?;
        let packet_number = r.u8()?;
        let total_packets = r.u8()?;
        let count = usize::from(r.u8()?);

        let mut satellites = Vec::with_capacity(count.min(r.remaining() / SatelliteData::HEAD_LEN));
        for _ in 0..count {
            satellites.push(SatelliteData::read(&mut r)?);
        }
        if r.remaining() != 0 {
            let actual = frame.payload().len();
            return Err(DecodeError::BadElementLength {
                id: frame.id(),
                head: actual - r.remaining(),
                element: FrequencyInformation::LEN,
                actual,
            });
        }

        Ok(RawSatelliteData {
            unix_time_seconds,
            nanoseconds,
            receiver_clock_offset,
            receiver_number,
            packet_number,
            total_packets,
            satellites,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytes::Writer;
    use test_case::test_case;

    #[test]
    fn test_satellites() {
        let mut w = Writer::default();
        w.f32(0.8).f32(1.25).u8(9).u8(6).u8(0).u8(4).u8(2);
        let sats = Satellites::decode(&w.into_frame(30).unwrap()).unwrap();
        assert_eq!(sats.hdop, 0.8);
        assert_eq!(sats.vdop, 1.25);
        assert_eq!(sats.glonass_satellites, 6);
        assert_eq!(sats.total(), 21);
    }

    #[test]
    fn test_detailed_satellites() {
        let payload = hex::decode("01 0c 11 2d 0e01 2a 04 03 80 05 5a00 1f".replace(' ', "")).unwrap();
        let frame = Frame::new(31, payload).unwrap();
        let detailed = DetailedSatellites::decode(&frame).unwrap();
        assert_eq!(detailed.satellites.len(), 2);

        let first = &detailed.satellites[0];
        assert_eq!(first.system, SatelliteSystem::Gps);
        assert_eq!(first.number, 12);
        assert!(first.frequencies.l1_ca);
        assert!(first.frequencies.l2_c);
        assert!(!first.frequencies.l5);
        assert_eq!(first.elevation, 45);
        assert_eq!(first.azimuth, 270);
        assert_eq!(first.snr, 42);

        let second = &detailed.satellites[1];
        assert_eq!(second.system, SatelliteSystem::Galileo);
        assert!(second.frequencies.l5);
        assert_eq!(second.azimuth, 90);
    }

    #[test]
    fn test_detailed_satellites_empty() {
        let frame = Frame::new(31, Vec::new()).unwrap();
        assert!(DetailedSatellites::decode(&frame).unwrap().satellites.is_empty());
    }

    #[test_case(6)]
    #[test_case(8)]
    #[test_case(13)]
    fn test_detailed_satellites_partial_record(len: usize) {
        let frame = Frame::new(31, vec![1u8; len]).unwrap();
        assert_eq!(
            DetailedSatellites::decode(&frame),
            Err(DecodeError::BadElementLength {
                id: 31,
                head: 0,
                element: 7,
                actual: len
            })
        );
    }

    #[test]
    fn test_detailed_satellites_bad_system() {
        let frame = Frame::new(31, vec![9, 0, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(
            DetailedSatellites::decode(&frame),
            Err(DecodeError::InvalidValue {
                field: "SatelliteSystem",
                value: 9
            })
        );
    }

    fn raw_head(w: &mut Writer, satellites: u8) {
        w.u32(1_700_000_000)
            .u32(125)
            .bytes(&(-40i32).to_le_bytes())
            .u8(0)
            .u8(1)
            .u8(1)
            .u8(satellites);
    }

    fn frequency(w: &mut Writer, frequency: u8) {
        w.u8(frequency)
            .u8(0b11_1001)
            .bytes(&1.2e8f64.to_le_bytes())
            .bytes(&2.2e7f64.to_le_bytes())
            .f32(-1200.5)
            .f32(44.0);
    }

    #[test]
    fn test_raw_satellite_data() {
        let mut w = Writer::default();
        raw_head(&mut w, 2);
        w.u8(1).u8(5).u8(60).u16(180).u8(2);
        frequency(&mut w, 1);
        frequency(&mut w, 5);
        w.u8(4).u8(11).u8(10).u16(359).u8(0);
        let frame = w.into_frame(60).unwrap();
        assert_eq!(frame.length(), 16 + 6 + 2 * 26 + 6);

        let raw = RawSatelliteData::decode(&frame).unwrap();
        assert_eq!(raw.unix_time_seconds, 1_700_000_000);
        assert_eq!(raw.receiver_clock_offset, -40);
        assert_eq!(raw.satellites.len(), 2);

        let gps = &raw.satellites[0];
        assert_eq!(gps.system, SatelliteSystem::Gps);
        assert_eq!(gps.prn, 5);
        assert_eq!(gps.frequencies.len(), 2);
        assert_eq!(gps.frequencies[1].frequency, 5);
        let status = gps.frequencies[0].tracking_status;
        assert!(status.carrier_phase_valid);
        assert!(status.pseudo_range_valid);
        assert!(status.doppler_valid);
        assert!(status.snr_valid);
        assert!(!status.carrier_phase_cycle_slip_detected);
        assert_eq!(gps.frequencies[0].doppler_frequency, -1200.5);

        let galileo = &raw.satellites[1];
        assert_eq!(galileo.system, SatelliteSystem::Galileo);
        assert_eq!(galileo.azimuth, 359);
        assert!(galileo.frequencies.is_empty());
    }

    #[test]
    fn test_raw_satellite_data_count_past_end() {
        let mut w = Writer::default();
        raw_head(&mut w, 1);
        w.u8(1).u8(5).u8(60).u16(180).u8(3);
        frequency(&mut w, 1);
        let frame = w.into_frame(60).unwrap();
        assert_eq!(
            RawSatelliteData::decode(&frame),
            Err(DecodeError::Truncated {
                id: 60,
                needed: 16 + 6 + 3 * 26,
                actual: 16 + 6 + 26
            })
        );
    }

    #[test]
    fn test_raw_satellite_data_satellite_count_past_end() {
        let mut w = Writer::default();
        raw_head(&mut w, 2);
        w.u8(1).u8(5).u8(60).u16(180).u8(0);
        let frame = w.into_frame(60).unwrap();
        assert!(matches!(
            RawSatelliteData::decode(&frame),
            Err(DecodeError::Truncated { id: 60, .. })
        ));
    }

    #[test]
    fn test_raw_satellite_data_trailing_bytes() {
        let mut w = Writer::default();
        raw_head(&mut w, 0);
        w.zeros(3);
        let frame = w.into_frame(60).unwrap();
        assert_eq!(
            RawSatelliteData::decode(&frame),
            Err(DecodeError::BadElementLength {
                id: 60,
                head: 16,
                element: 26,
                actual: 19
            })
        );
    }

    #[test]
    fn test_raw_satellite_data_short_head() {
        let frame = Frame::new(60, vec![0u8; 15]).unwrap();
        assert!(matches!(
            RawSatelliteData::decode(&frame),
            Err(DecodeError::BadElementLength { actual: 15, .. })
        ));
    }
}
