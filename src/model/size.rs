//! Human-readable byte sizes, matching the `zfs list` column style.

const UNITS: [&str; 6] = ["K", "M", "G", "T", "P", "E"];

/// Format a byte count the way `zfs list` does without `-p`.
///
/// Values under 1024 print as plain bytes (`512B`). Larger values use the
/// largest binary unit that keeps the mantissa under 1024, with up to three
/// significant digits (`1.50K`, `12.3M`, `456G`).
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes}B");
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let text = if value < 10.0 {
        format!("{value:.2}")
    } else if value < 100.0 {
        format!("{value:.1}")
    } else {
        format!("{value:.0}")
    };
    format!("{text}{}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_values_are_bytes() {
        assert_eq!(format_bytes(0), "0B");
        assert_eq!(format_bytes(1023), "1023B");
    }

    #[test]
    fn kibibytes_keep_three_significant_digits() {
        assert_eq!(format_bytes(1024), "1.00K");
        assert_eq!(format_bytes(1536), "1.50K");
        assert_eq!(format_bytes(20 * 1024), "20.0K");
        assert_eq!(format_bytes(200 * 1024), "200K");
    }

    #[test]
    fn larger_units() {
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00M");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.00G");
        assert_eq!(format_bytes(2 * 1024_u64.pow(4)), "2.00T");
    }
}
