use serde::Serialize;
use crate::domain::models::reservation::BookingSource;

pub const FALLBACK_COLOR: &str = "#9E9E9E";

const MIN_LIGHTNESS: f64 = 30.0;
const MAX_LIGHTNESS: f64 = 78.0;
const MIN_SATURATION: f64 = 35.0;
const MAX_SATURATION: f64 = 95.0;

/// (lightness delta, saturation delta) in percentage points. Hue is never touched.
const VARIATIONS: [(f64, f64); 8] = [
    (10.0, 0.0),
    (-10.0, 0.0),
    (0.0, 15.0),
    (0.0, -15.0),
    (8.0, -10.0),
    (-8.0, 10.0),
    (15.0, 10.0),
    (-15.0, -10.0),
];

pub fn base_color(source: BookingSource) -> &'static str {
    match source {
        BookingSource::Airbnb => "#FF5A5F",
        BookingSource::Vrbo => "#0E8A9E",
        BookingSource::Website => "#2E7D32",
        BookingSource::BookingCom => "#1F5FBF",
        BookingSource::Expedia => "#F5B800",
    }
}

/// Display color for a channel, optionally varied per booking.
///
/// Unknown channels always get [`FALLBACK_COLOR`]. Without an id the channel's
/// base color is returned; with an id a hash of the id picks one of a fixed set
/// of lightness/saturation shifts, so the same id always yields the same color.
pub fn color_for(source: &str, reservation_id: Option<&str>) -> String {
    match source.parse::<BookingSource>() {
        Ok(channel) => color_for_source(channel, reservation_id),
        Err(_) => FALLBACK_COLOR.to_string(),
    }
}

pub fn color_for_source(source: BookingSource, reservation_id: Option<&str>) -> String {
    let base = base_color(source);
    let Some(id) = reservation_id else {
        return base.to_string();
    };

    let Some(rgb) = Rgb::from_hex(base) else {
        return base.to_string();
    };

    let (dl, ds) = VARIATIONS[(id_hash(id) & 0b111) as usize];
    let hsl = rgb.to_hsl();
    let varied = Hsl {
        h: hsl.h,
        s: (hsl.s + ds).clamp(MIN_SATURATION, MAX_SATURATION),
        l: (hsl.l + dl).clamp(MIN_LIGHTNESS, MAX_LIGHTNESS),
    };

    varied.to_rgb().to_hex()
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct LegendEntry {
    pub source: String,
    pub color: String,
}

pub fn legend() -> Vec<LegendEntry> {
    BookingSource::ALL.iter()
        .map(|s| LegendEntry { source: s.to_string(), color: base_color(*s).to_string() })
        .chain(std::iter::once(LegendEntry { source: "Other".to_string(), color: FALLBACK_COLOR.to_string() }))
        .collect()
}

/// 31-multiplier string hash over code points.
pub fn id_hash(id: &str) -> u32 {
    id.chars().fold(0u32, |hash, c| hash.wrapping_mul(31).wrapping_add(c as u32))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Hue in degrees, saturation and lightness in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Rgb {
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
        Some(Self { r: channel(0)?, g: channel(2)?, b: channel(4)? })
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    pub fn to_hsl(self) -> Hsl {
        let r = self.r as f64 / 255.0;
        let g = self.g as f64 / 255.0;
        let b = self.b as f64 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        if max == min {
            return Hsl { h: 0.0, s: 0.0, l: l * 100.0 };
        }

        let d = max - min;
        let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };

        Hsl { h: h * 60.0, s: s * 100.0, l: l * 100.0 }
    }
}

impl Hsl {
    pub fn to_rgb(self) -> Rgb {
        let s = self.s / 100.0;
        let l = self.l / 100.0;

        if s == 0.0 {
            let v = (l * 255.0).round() as u8;
            return Rgb { r: v, g: v, b: v };
        }

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let h = self.h / 360.0;

        let channel = |t: f64| {
            let t = t.rem_euclid(1.0);
            let v = if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 0.5 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            };
            (v * 255.0).round().clamp(0.0, 255.0) as u8
        };

        Rgb {
            r: channel(h + 1.0 / 3.0),
            g: channel(h),
            b: channel(h - 1.0 / 3.0),
        }
    }
}
