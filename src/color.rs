//! Hex color ⇄ HSV conversion, the color model shared by every widget group.
//!
//! Hex values are the storage representation (`#rrggbb`, lowercase). HSV is
//! what the sliders edit: hue in degrees, saturation and value in 0.0–1.0.

use crate::math;

/// HSV color. Hue in [0, 360) degrees, saturation and value in 0.0–1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    /// Hue in degrees, `0.0 <= h < 360.0`.
    pub h: f64,
    /// Saturation, 0.0–1.0.
    pub s: f64,
    /// Value (brightness), 0.0–1.0.
    pub v: f64,
}

impl Hsv {
    pub fn new(h: f64, s: f64, v: f64) -> Self {
        Self {
            h: math::wrap_hue(h),
            s: math::clamp(s, 0.0, 1.0),
            v: math::clamp(v, 0.0, 1.0),
        }
    }

    /// Parse a hex color. See [`hex_to_hsv`].
    pub fn from_hex(hex: &str) -> Option<Self> {
        hex_to_hsv(hex)
    }

    /// Format as `#rrggbb`. See [`hsv_to_hex`].
    pub fn to_hex(&self) -> String {
        hsv_to_hex(self.h, self.s, self.v)
    }

    /// Hue rounded to whole degrees, as a slider displays it.
    pub fn hue_degrees(&self) -> i64 {
        self.h.round() as i64
    }

    /// Value scaled to 0–100, as the brightness slider displays it.
    pub fn brightness_percent(&self) -> i64 {
        (self.v * 100.0).round() as i64
    }
}

/// Convert a hex color to HSV.
///
/// Accepts `#rrggbb`, `rrggbb`, `#rgb` and `rgb` in any case, with
/// surrounding whitespace. Returns `None` for anything else.
pub fn hex_to_hsv(hex: &str) -> Option<Hsv> {
    let (r, g, b) = math::hex_to_rgb8(hex)?;
    let (h, s, v) = math::rgb_to_hsv(
        r as f64 / 255.0,
        g as f64 / 255.0,
        b as f64 / 255.0,
    );
    Some(Hsv { h, s, v })
}

/// Convert HSV to a lowercase `#rrggbb` string.
///
/// Hue may be any number of degrees (it is wrapped, negatives included);
/// saturation and value are clamped to 0.0–1.0.
pub fn hsv_to_hex(h: f64, s: f64, v: f64) -> String {
    let (r, g, b) = math::hsv_to_rgb(h, s, v);
    math::format_hex(
        math::to_channel(r),
        math::to_channel(g),
        math::to_channel(b),
    )
}

/// Canonical `#rrggbb` form of a hex color, or `None` if it is not one.
pub fn normalize_hex(hex: &str) -> Option<String> {
    math::normalize_digits(hex).map(|digits| format!("#{digits}"))
}

/// Case-insensitive comparison of two color strings as written.
pub fn hex_eq(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// 0–255 channels of a hex color.
pub fn hex_to_rgb8(hex: &str) -> Option<(u8, u8, u8)> {
    math::hex_to_rgb8(hex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn orange_converts_to_hue_thirty() {
        let hsv = hex_to_hsv("#ff8000").unwrap();
        assert!((hsv.h - 30.117).abs() < 0.01, "h = {}", hsv.h);
        assert!(approx(hsv.s, 1.0));
        assert!(approx(hsv.v, 1.0));
        assert_eq!(hsv.hue_degrees(), 30);
    }

    #[test]
    fn hue_change_keeps_saturation_and_value() {
        assert_eq!(hsv_to_hex(210.0, 1.0, 1.0), "#0080ff");
    }

    #[test]
    fn half_brightness_red() {
        assert_eq!(hsv_to_hex(0.0, 1.0, 0.5), "#800000");
    }

    #[test]
    fn shorthand_matches_long_form() {
        assert_eq!(hex_to_hsv("#abc"), hex_to_hsv("#aabbcc"));
        assert_eq!(normalize_hex("#ABC").as_deref(), Some("#aabbcc"));
        assert_eq!(normalize_hex(" 0F0 ").as_deref(), Some("#00ff00"));
    }

    #[test]
    fn achromatic_colors_have_zero_hue() {
        let black = hex_to_hsv("#000000").unwrap();
        assert_eq!(black.h, 0.0);
        assert_eq!(black.s, 0.0);
        assert_eq!(black.v, 0.0);

        let white = hex_to_hsv("#ffffff").unwrap();
        assert_eq!(white.h, 0.0);
        assert_eq!(white.s, 0.0);
        assert_eq!(white.v, 1.0);

        let gray = hex_to_hsv("#808080").unwrap();
        assert_eq!(gray.h, 0.0);
        assert!(!gray.v.is_nan());
    }

    #[test]
    fn negative_hue_wraps() {
        assert_eq!(hsv_to_hex(-10.0, 1.0, 1.0), hsv_to_hex(350.0, 1.0, 1.0));
        assert_eq!(hsv_to_hex(370.0, 1.0, 1.0), hsv_to_hex(10.0, 1.0, 1.0));
    }

    #[test]
    fn out_of_range_saturation_and_value_are_clamped() {
        assert_eq!(hsv_to_hex(0.0, 2.0, 1.5), "#ff0000");
        assert_eq!(hsv_to_hex(0.0, -1.0, -1.0), "#000000");
    }

    #[test]
    fn invalid_input_yields_none() {
        assert_eq!(hex_to_hsv(""), None);
        assert_eq!(hex_to_hsv("#12345"), None);
        assert_eq!(hex_to_hsv("#12345g"), None);
        assert_eq!(hex_to_hsv("rgb(1,2,3)"), None);
        assert_eq!(hex_to_hsv("#ff8000ff"), None);
    }

    #[test]
    fn hex_eq_ignores_case() {
        assert!(hex_eq("#FF8000", "#ff8000"));
        assert!(!hex_eq("#ff8000", "#ff8001"));
    }

    #[test]
    fn hsv_new_normalizes_components() {
        let hsv = Hsv::new(-90.0, 1.5, -0.5);
        assert_eq!(hsv, Hsv { h: 270.0, s: 1.0, v: 0.0 });
        assert_eq!(hsv.brightness_percent(), 0);
    }

    proptest! {
        #[test]
        fn hex_round_trip_within_one_per_channel(r in 0u8..=255, g in 0u8..=255, b in 0u8..=255) {
            let hex = format!("#{:02x}{:02x}{:02x}", r, g, b);
            let hsv = hex_to_hsv(&hex).unwrap();
            prop_assert!(hsv.h >= 0.0 && hsv.h < 360.0, "h = {}", hsv.h);
            let back = hex_to_rgb8(&hsv.to_hex()).unwrap();
            prop_assert!((back.0 as i16 - r as i16).abs() <= 1, "{} -> {}", hex, hsv.to_hex());
            prop_assert!((back.1 as i16 - g as i16).abs() <= 1, "{} -> {}", hex, hsv.to_hex());
            prop_assert!((back.2 as i16 - b as i16).abs() <= 1, "{} -> {}", hex, hsv.to_hex());
        }

        #[test]
        fn hsv_to_hex_always_parses(h in -720.0f64..720.0, s in -0.5f64..1.5, v in -0.5f64..1.5) {
            let hex = hsv_to_hex(h, s, v);
            prop_assert_eq!(hex.len(), 7);
            prop_assert!(hex_to_hsv(&hex).is_some());
        }
    }
}
