//! # Status Code Packing
//!
//! Slot `index` of a list with width `w` occupies bits
//! `[index * w, index * w + w)` of the buffer, numbered MSB-first: bit 0 is
//! the most significant bit of byte 0. The code in a slot is read as an
//! unsigned big-endian integer over those bits.
//!
//! This is the ordering Bitstring Status List v1.0 prescribes (index 0 at
//! the left-most bit). Because `w` divides 8, no slot spans two bytes.

use bitvec::order::Msb0;
use bitvec::view::BitView;

use credstatus_core::StatusSize;

use crate::error::CodecError;

/// Bytes needed to hold `total_entries` slots of width `size`.
pub fn buffer_len(total_entries: u64, size: StatusSize) -> usize {
    let bits = total_entries.saturating_mul(u64::from(size.bits()));
    usize::try_from(bits.div_ceil(8)).unwrap_or(usize::MAX)
}

/// A zero-filled buffer for `total_entries` slots of width `size`.
pub fn zeroed(total_entries: u64, size: StatusSize) -> Vec<u8> {
    vec![0u8; buffer_len(total_entries, size)]
}

/// Read the code stored at `index`.
pub fn read_status(buffer: &[u8], index: u64, size: StatusSize) -> Result<u8, CodecError> {
    let start = slot_start(buffer.len(), index, size)?;
    let bits = buffer.view_bits::<Msb0>();
    let value = bits[start..start + usize::from(size.bits())]
        .iter()
        .by_vals()
        .fold(0u8, |acc, bit| (acc << 1) | u8::from(bit));
    Ok(value)
}

/// Write `value` into the slot at `index`, leaving every other slot intact.
pub fn write_status(
    buffer: &mut [u8],
    index: u64,
    size: StatusSize,
    value: u8,
) -> Result<(), CodecError> {
    if value > size.max_status() {
        return Err(CodecError::ValueTooWide {
            value,
            bits: size.bits(),
        });
    }
    let start = slot_start(buffer.len(), index, size)?;
    let width = size.bits();
    let bits = buffer.view_bits_mut::<Msb0>();
    for offset in 0..width {
        let bit = (value >> (width - 1 - offset)) & 1 == 1;
        bits.set(start + usize::from(offset), bit);
    }
    Ok(())
}

/// Bit offset of slot `index`, checked against the buffer length.
fn slot_start(buffer_len: usize, index: u64, size: StatusSize) -> Result<usize, CodecError> {
    let width = u64::from(size.bits());
    let capacity = (buffer_len as u64).saturating_mul(8) / width;
    if index >= capacity {
        return Err(CodecError::IndexOutOfRange { index, capacity });
    }
    usize::try_from(index * width).map_err(|_| CodecError::IndexOutOfRange { index, capacity })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SIZES: [StatusSize; 4] = [
        StatusSize::One,
        StatusSize::Two,
        StatusSize::Four,
        StatusSize::Eight,
    ];

    #[test]
    fn buffer_len_for_privacy_minimum() {
        assert_eq!(buffer_len(131_072, StatusSize::One), 16 * 1024);
        assert_eq!(buffer_len(131_072, StatusSize::Two), 32 * 1024);
        assert_eq!(buffer_len(131_072, StatusSize::Eight), 128 * 1024);
        assert_eq!(buffer_len(3, StatusSize::One), 1);
    }

    #[test]
    fn index_zero_is_leftmost_bit() {
        let mut buffer = vec![0u8; 2];
        write_status(&mut buffer, 0, StatusSize::One, 1).unwrap();
        assert_eq!(buffer, vec![0b1000_0000, 0]);
        write_status(&mut buffer, 9, StatusSize::One, 1).unwrap();
        assert_eq!(buffer, vec![0b1000_0000, 0b0100_0000]);
    }

    #[test]
    fn multi_bit_codes_are_msb_first() {
        let mut buffer = vec![0u8; 1];
        write_status(&mut buffer, 1, StatusSize::Two, 0b10).unwrap();
        assert_eq!(buffer[0], 0b0010_0000);
        write_status(&mut buffer, 1, StatusSize::Four, 0xA).unwrap();
        assert_eq!(buffer[0], 0b0010_1010);
        assert_eq!(read_status(&buffer, 1, StatusSize::Four).unwrap(), 0xA);
        assert_eq!(read_status(&buffer, 0, StatusSize::Four).unwrap(), 0x2);
    }

    #[test]
    fn every_index_round_trips_at_privacy_minimum() {
        for size in SIZES {
            let mut buffer = zeroed(131_072, size);
            let max = size.max_status();
            for index in 0..131_072u64 {
                let value = (index % (u64::from(max) + 1)) as u8;
                write_status(&mut buffer, index, size, value).unwrap();
            }
            for index in 0..131_072u64 {
                let expected = (index % (u64::from(max) + 1)) as u8;
                assert_eq!(read_status(&buffer, index, size).unwrap(), expected);
            }
        }
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut buffer = zeroed(16, StatusSize::Two);
        assert!(matches!(
            read_status(&buffer, 16, StatusSize::Two),
            Err(CodecError::IndexOutOfRange { index: 16, capacity: 16 })
        ));
        assert!(write_status(&mut buffer, 16, StatusSize::Two, 1).is_err());
    }

    #[test]
    fn too_wide_value_is_rejected() {
        let mut buffer = zeroed(8, StatusSize::Two);
        assert!(matches!(
            write_status(&mut buffer, 0, StatusSize::Two, 4),
            Err(CodecError::ValueTooWide { value: 4, bits: 2 })
        ));
        assert_eq!(buffer, zeroed(8, StatusSize::Two));
    }

    fn size_strategy() -> impl Strategy<Value = StatusSize> {
        prop::sample::select(SIZES.to_vec())
    }

    proptest! {
        #[test]
        fn write_touches_only_its_slot(
            size in size_strategy(),
            seed in prop::collection::vec(any::<u8>(), 64),
            index in 0u64..64,
            raw in any::<u8>(),
        ) {
            let mut buffer = seed.clone();
            let value = raw & size.max_status();
            write_status(&mut buffer, index, size, value).unwrap();
            prop_assert_eq!(read_status(&buffer, index, size).unwrap(), value);

            let capacity = 64 * 8 / u64::from(size.bits());
            for other in (0..capacity).filter(|i| *i != index) {
                prop_assert_eq!(
                    read_status(&buffer, other, size).unwrap(),
                    read_status(&seed, other, size).unwrap()
                );
            }
        }
    }
}
