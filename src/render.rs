//! Human-readable value formatting for check output

/// `55.0%`
pub fn percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// `21.5 °C`
pub fn celsius(value: f64) -> String {
    format!("{:.1} \u{b0}C", value)
}

/// `230.0 V`
pub fn volts(value: f64) -> String {
    format!("{:.1} V", value)
}

/// `12.5 W`
pub fn watts(value: f64) -> String {
    format!("{:.1} W", value)
}

/// Shortest binary-prefixed form, e.g. `34.3M`.
pub fn bytes(bytes: f64) -> String {
    let sizes = ["B", "K", "M", "G", "T"];
    let mut bytes = bytes;
    let mut reductions = 0;
    while reductions < sizes.len() - 1 && bytes > 1000.0 {
        bytes /= 1024.0;
        reductions += 1;
    }
    format!("{:.1}{}", bytes, sizes[reductions])
}

/// `34.3M/s`
pub fn bytes_per_second(rate: f64) -> String {
    format!("{}/s", bytes(rate))
}

/// Whole seconds below a minute, else a rough larger unit, e.g. `42 s`,
/// `3.5 min`, `2.0 d`.
pub fn seconds(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude < 60.0 {
        format!("{:.0} s", value)
    } else if magnitude < 3600.0 {
        format!("{:.1} min", value / 60.0)
    } else if magnitude < 86400.0 {
        format!("{:.1} h", value / 3600.0)
    } else {
        format!("{:.1} d", value / 86400.0)
    }
}

/// `62 days`
pub fn days(value: f64) -> String {
    format!("{:.0} days", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_produces_shortest() {
        let reprs = [
            (999.0, "999.0B"),
            (9_999.0, "9.8K"),
            (35_999_999.0, "34.3M"),
            (9_999_999_999.0, "9.3G"),
            (9_999_999_999_999.0, "9.1T"),
        ];
        for &(raw, repr) in reprs.iter() {
            assert_eq!(bytes(raw), repr);
        }
    }

    #[test]
    fn seconds_picks_a_unit() {
        assert_eq!(seconds(42.0), "42 s");
        assert_eq!(seconds(-42.4), "-42 s");
        assert_eq!(seconds(210.0), "3.5 min");
        assert_eq!(seconds(7200.0), "2.0 h");
        assert_eq!(seconds(172800.0), "2.0 d");
    }

    #[test]
    fn fixed_unit_helpers() {
        assert_eq!(percent(55.0), "55.0%");
        assert_eq!(celsius(21.5), "21.5 \u{b0}C");
        assert_eq!(watts(12.52), "12.5 W");
        assert_eq!(bytes_per_second(1024.0 * 1024.0 * 2.0), "2.0M/s");
    }
}
