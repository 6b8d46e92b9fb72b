//! Color math: hex RGB ⇄ HSV without external dependencies.
//!
//! Hue is in degrees (0.0–360.0), saturation and value in 0.0–1.0.

pub(crate) fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Wrap any hue (negative or past a full turn) into [0, 360).
pub(crate) fn wrap_hue(h: f64) -> f64 {
    ((h % 360.0) + 360.0) % 360.0
}

/// Normalize a hex string to six lowercase digits (no `#`).
///
/// Trims whitespace, strips a leading `#` and expands 3-digit shorthand.
/// Returns `None` unless the result is exactly six hex digits.
pub(crate) fn normalize_digits(hex: &str) -> Option<String> {
    let lowered = hex.trim().to_ascii_lowercase();
    let stripped = lowered.strip_prefix('#').unwrap_or(&lowered);
    let digits = if stripped.len() == 3 {
        let mut out = String::with_capacity(6);
        for c in stripped.chars() {
            out.push(c);
            out.push(c);
        }
        out
    } else {
        stripped.to_string()
    };
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(digits)
}

/// Parse a hex color into 0–255 channels.
pub(crate) fn hex_to_rgb8(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = normalize_digits(hex)?;
    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some((r, g, b))
}

/// RGB → HSV. Channels 0.0–1.0 in, hue in degrees out.
pub(crate) fn rgb_to_hsv(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let v = max;
    let s = if max == 0.0 { 0.0 } else { delta / max };

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        ((g - b) / delta).rem_euclid(6.0) * 60.0
    } else if max == g {
        ((b - r) / delta + 2.0) * 60.0
    } else {
        ((r - g) / delta + 4.0) * 60.0
    };

    (wrap_hue(h), s, v)
}

/// HSV → RGB. Hue in degrees (any range), saturation/value clamped to 0.0–1.0.
pub(crate) fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    let hue = wrap_hue(h);
    let saturation = clamp(s, 0.0, 1.0);
    let value = clamp(v, 0.0, 1.0);

    let chroma = value * saturation;
    let x = chroma * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let m = value - chroma;

    let (r1, g1, b1) = if hue < 60.0 {
        (chroma, x, 0.0)
    } else if hue < 120.0 {
        (x, chroma, 0.0)
    } else if hue < 180.0 {
        (0.0, chroma, x)
    } else if hue < 240.0 {
        (0.0, x, chroma)
    } else if hue < 300.0 {
        (x, 0.0, chroma)
    } else {
        (chroma, 0.0, x)
    };

    (r1 + m, g1 + m, b1 + m)
}

/// Scale a 0.0–1.0 channel to 0–255, rounding half away from zero.
pub(crate) fn to_channel(c: f64) -> u8 {
    clamp((c * 255.0).round(), 0.0, 255.0) as u8
}

pub(crate) fn format_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_hue_handles_negative_and_overflow() {
        assert_eq!(wrap_hue(-10.0), 350.0);
        assert_eq!(wrap_hue(720.0), 0.0);
        assert_eq!(wrap_hue(-1e-15), 0.0);
        assert_eq!(wrap_hue(359.5), 359.5);
    }

    #[test]
    fn normalize_digits_expands_and_rejects() {
        assert_eq!(normalize_digits("  #ABC ").as_deref(), Some("aabbcc"));
        assert_eq!(normalize_digits("FF8000").as_deref(), Some("ff8000"));
        assert_eq!(normalize_digits("#ff80"), None);
        assert_eq!(normalize_digits("#gg0000"), None);
        assert_eq!(normalize_digits(""), None);
        assert_eq!(normalize_digits("##abc"), None);
    }

    #[test]
    fn rgb_to_hsv_achromatic() {
        assert_eq!(rgb_to_hsv(0.0, 0.0, 0.0), (0.0, 0.0, 0.0));
        assert_eq!(rgb_to_hsv(1.0, 1.0, 1.0), (0.0, 0.0, 1.0));
    }

    #[test]
    fn hsv_to_rgb_sector_boundaries() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), (1.0, 0.0, 0.0));
        assert_eq!(hsv_to_rgb(120.0, 1.0, 1.0), (0.0, 1.0, 0.0));
        assert_eq!(hsv_to_rgb(240.0, 1.0, 1.0), (0.0, 0.0, 1.0));
        let (r, g, b) = hsv_to_rgb(60.0, 1.0, 1.0);
        assert_eq!((to_channel(r), to_channel(g), to_channel(b)), (255, 255, 0));
    }

    #[test]
    fn to_channel_clamps() {
        assert_eq!(to_channel(1.2), 255);
        assert_eq!(to_channel(-0.1), 0);
        assert_eq!(to_channel(0.5), 128);
    }
}
