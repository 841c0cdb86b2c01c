//! CTCSS frequency table.
//!
//! The 38 standardized sub-audible squelch tones, ordered ascending.
//! The ordering is meaningful: it defines the next/previous semantics
//! of the selection cursor.

/// The CTCSS tone table in Hz, fixed at build time.
///
/// Indices 0..=37; strictly ascending, so "next" always means a higher
/// tone until the cursor wraps.
pub const CTCSS_TONES: [f32; 38] = [
    67.0, 69.3, 71.0, 71.9, 74.4, 77.0, 79.7, 82.5, 85.4, 88.5,
    91.5, 94.8, 97.4, 100.0, 103.5, 107.2, 110.9, 114.8, 118.8, 123.0,
    127.3, 131.8, 136.5, 141.3, 146.2, 151.4, 156.7, 159.8, 162.2, 165.5,
    167.9, 171.3, 173.8, 177.3, 179.9, 183.5, 186.2, 189.9,
];

/// Number of entries in the tone table.
pub const TONE_COUNT: usize = CTCSS_TONES.len();

/// Highest valid selection index.
pub const LAST_INDEX: usize = TONE_COUNT - 1;

/// Format a tone for display with exactly one fractional digit.
///
/// Locale-independent: whole-number tones still carry the digit
/// ("100.0", not "100").
pub fn format_tone(hz: f32) -> String {
    format!("{hz:.1}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_38_ascending_tones() {
        assert_eq!(TONE_COUNT, 38);
        for pair in CTCSS_TONES.windows(2) {
            assert!(pair[0] < pair[1], "table must be strictly ascending");
        }
    }

    #[test]
    fn known_anchor_entries() {
        assert_eq!(CTCSS_TONES[0], 67.0);
        assert_eq!(CTCSS_TONES[3], 71.9);
        assert_eq!(CTCSS_TONES[13], 100.0);
        assert_eq!(CTCSS_TONES[LAST_INDEX], 189.9);
    }

    #[test]
    fn formatting_always_one_decimal() {
        assert_eq!(format_tone(CTCSS_TONES[3]), "71.9");
        assert_eq!(format_tone(CTCSS_TONES[13]), "100.0");
        assert_eq!(format_tone(67.0), "67.0");
    }
}
