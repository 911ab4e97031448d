use crc::{Crc, CRC_16_IBM_3740};

/// CRC-CCITT (poly 0x1021, seed 0xFFFF, unreflected, no final xor). The `crc` crate
/// builds the 256 entry lookup table at compile time.
const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// Compute the payload CRC16 carried in bytes 3 and 4 of a frame header.
///
/// The header itself is never included. An empty payload yields the seed, `0xFFFF`.
#[must_use]
pub fn crc16(dat: &[u8]) -> u16 {
    CRC16.checksum(dat)
}

/// Compute the header LRC over the 4 header bytes that follow it, i.e., id, length,
/// crc-low and crc-high.
///
/// The LRC is the two's complement of the byte sum, so the sum of all 5 header bytes
/// is always zero mod 256.
#[must_use]
pub fn header_lrc(fields: &[u8; 4]) -> u8 {
    let sum = fields.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    (sum ^ 0xff).wrapping_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(&[], 0xffff; "empty payload is the seed")]
    #[test_case(b"123456789", 0x29b1; "check value")]
    #[test_case(&[0x02], 0xc1b2; "single byte request")]
    #[test_case(&[0x02, 0x03, 0xb6], 0x30b2; "multi id request")]
    #[test_case(&[0xb8, 0xc0, 0x84, 0x00], 0x0179; "acknowledge payload")]
    fn test_crc16(dat: &[u8], expected: u16) {
        assert_eq!(crc16(dat), expected, "crc16({dat:02x?})");
    }

    #[test_case([0x01, 0x01, 0xb2, 0xc1], 0x8b)]
    #[test_case([0x01, 0x03, 0xb2, 0x30], 0x1a)]
    #[test_case([0x00, 0x04, 0x79, 0x01], 0x82)]
    #[test_case([0x00, 0x00, 0x00, 0x00], 0x00)]
    fn test_header_lrc(fields: [u8; 4], expected: u8) {
        assert_eq!(header_lrc(&fields), expected);
    }

    #[test]
    fn test_header_sums_to_zero() {
        for fields in [[0xffu8, 0xff, 0xff, 0xff], [20, 100, 0x12, 0x34], [1, 2, 3, 4]] {
            let lrc = header_lrc(&fields);
            let sum = fields.iter().fold(lrc, |acc, b| acc.wrapping_add(*b));
            assert_eq!(sum, 0, "fields={fields:?} lrc={lrc:#x}");
        }
    }
}
