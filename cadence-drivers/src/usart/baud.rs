//! Baud-rate register arithmetic
//!
//! The hardware divides the peripheral clock by a fractional divisor held as
//! a 12-bit mantissa and a 4-bit fraction. The computation keeps three
//! decimal digits of the quotient in fixed point, scales the remainder into
//! the fraction field, and folds any fraction overflow into the mantissa.

use cadence_hal::usart::Oversampling;

/// Compute the packed baud-rate register value (`mantissa << 4 | fraction`)
///
/// `clock_hz` is the peripheral bus clock feeding the channel. With 8x
/// oversampling the divisor granularity doubles, halving the mantissa range.
pub fn brr_value(clock_hz: u32, baudrate: u32, oversampling: Oversampling) -> u16 {
    let samples = 8 * (2 - oversampling.over8() as u64);
    let scaled = (clock_hz as u64 * 1000) / (baudrate as u64 * samples);
    let mut mantissa = scaled / 1000;
    let mut fraction = (scaled % 1000) * samples / 1000;
    if fraction > 0xF {
        mantissa += fraction >> 4;
        fraction &= 0xF;
    }
    ((mantissa << 4) | fraction) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn reference_fixture_9600_at_16mhz() {
        // 16 MHz / (16 * 9600) = 104.166..: mantissa 104, fraction 2
        assert_eq!(brr_value(16_000_000, 9600, Oversampling::By16), 0x682);
    }

    #[test]
    fn truncates_115200_at_16mhz() {
        // 8.680: mantissa 8, fraction floor(0.680 * 16) = 10
        assert_eq!(brr_value(16_000_000, 115_200, Oversampling::By16), 0x8A);
    }

    #[test]
    fn oversampling_by8_doubles_the_divisor() {
        // 16 MHz / (8 * 9600) = 208.333: mantissa 208, fraction 2
        assert_eq!(brr_value(16_000_000, 9600, Oversampling::By8), 0xD02);
    }

    proptest! {
        #[test]
        fn mantissa_is_the_integer_divisor(
            clock_hz in 8_000_000u32..=72_000_000,
            baudrate in 4800u32..=921_600,
            by8 in proptest::bool::ANY,
        ) {
            let oversampling = if by8 { Oversampling::By8 } else { Oversampling::By16 };
            let samples = 8 * (2 - oversampling.over8() as u64);
            let value = brr_value(clock_hz, baudrate, oversampling);
            prop_assert_eq!(
                (value >> 4) as u64,
                clock_hz as u64 / (baudrate as u64 * samples)
            );
        }

        #[test]
        fn fraction_stays_below_the_sample_count(
            clock_hz in 8_000_000u32..=72_000_000,
            baudrate in 4800u32..=921_600,
            by8 in proptest::bool::ANY,
        ) {
            let oversampling = if by8 { Oversampling::By8 } else { Oversampling::By16 };
            let samples = 8 * (2 - oversampling.over8() as u16);
            let value = brr_value(clock_hz, baudrate, oversampling);
            prop_assert!((value & 0xF) < samples);
        }
    }
}
