//! ICC Basic Numeric Types
//!
//! Fixed-point and calendar types shared by the header and tag codecs.
//! Encodings follow ICC.1/ICC.2; the textual forms are the ones the XML
//! document uses (decimal with 8 fractional digits for fixed point,
//! `YYYY-MM-DDThh:mm:ss` for timestamps).

use crate::xml::parse_u16_lossy;

/// s15Fixed16Number - 16.16 fixed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct S15Fixed16(pub i32);

impl S15Fixed16 {
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Encode a float, rounding to the nearest raw step.
    ///
    /// Rounding (not truncation) is what makes the 8-decimal textual form
    /// round-trip exactly: the text is within 5e-9 of the true value, well
    /// inside the half-step tolerance.
    pub fn from_f64(val: f64) -> Self {
        Self((val * 65536.0 + 0.5).floor() as i32)
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 65536.0
    }
}

/// ICC float16Number - IEEE 754 half precision, used for spectral wavelengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct F16Number(pub u16);

impl F16Number {
    pub fn from_f32(value: f32) -> Self {
        let bits = value.to_bits();
        let sign = ((bits >> 16) & 0x8000) as u16;
        let exp = ((bits >> 23) & 0xFF) as i32 - 127 + 15;
        let frac = bits & 0x007F_FFFF;

        if (bits & 0x7F80_0000) == 0x7F80_0000 {
            // inf / NaN
            let payload = if frac != 0 { 0x0200 } else { 0 };
            return Self(sign | 0x7C00 | payload);
        }
        if exp >= 0x1F {
            return Self(sign | 0x7C00);
        }
        if exp <= 0 {
            if exp < -10 {
                return Self(sign);
            }
            let m = frac | 0x0080_0000;
            return Self(sign | (m >> (14 - exp)) as u16);
        }
        Self(sign | ((exp as u16) << 10) | (frac >> 13) as u16)
    }

    pub fn to_f32(self) -> f32 {
        let sign = ((self.0 as u32) & 0x8000) << 16;
        let exp = ((self.0 >> 10) & 0x1F) as u32;
        let frac = (self.0 & 0x03FF) as u32;

        let bits = if exp == 0 {
            if frac == 0 {
                sign
            } else {
                // subnormal: renormalize into f32 range
                let mut frac = frac;
                let mut exp32 = 113u32;
                while frac & 0x0400 == 0 {
                    frac <<= 1;
                    exp32 -= 1;
                }
                sign | (exp32 << 23) | ((frac & 0x03FF) << 13)
            }
        } else if exp == 0x1F {
            sign | 0x7F80_0000 | (frac << 13)
        } else {
            sign | ((exp + 112) << 23) | (frac << 13)
        };
        f32::from_bits(bits)
    }
}

/// XYZNumber - three s15Fixed16 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct XyzNumber {
    pub x: S15Fixed16,
    pub y: S15Fixed16,
    pub z: S15Fixed16,
}

impl XyzNumber {
    pub fn from_f64(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: S15Fixed16::from_f64(x),
            y: S15Fixed16::from_f64(y),
            z: S15Fixed16::from_f64(z),
        }
    }
}

/// dateTimeNumber - ICC calendar timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateTimeNumber {
    pub year: u16,
    pub month: u16,
    pub day: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
}

impl DateTimeNumber {
    /// Textual form `YYYY-MM-DDThh:mm:ss`.
    pub fn to_text(&self) -> String {
        format!(
            "{}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }

    /// Parse the textual form. Unparseable text yields the zeroed
    /// timestamp, never an error.
    pub fn from_text(text: &str) -> Self {
        let mut parts = text.trim().split(['-', 'T', ':']);
        let mut next = || -> Option<u16> {
            let field = parts.next()?;
            if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            Some(parse_u16_lossy(field))
        };
        let fields = (|| Some([next()?, next()?, next()?, next()?, next()?, next()?]))();
        match fields {
            Some([year, month, day, hour, minute, second]) => Self {
                year,
                month,
                day,
                hour,
                minute,
                second,
            },
            None => Self::default(),
        }
    }
}

/// spectralRange - wavelength span with step count.
///
/// Rendered in the header only when `steps` is non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpectralRange {
    pub start: F16Number,
    pub end: F16Number,
    pub steps: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_s15fixed16_rounds() {
        let one = S15Fixed16::from_f64(1.0);
        assert_eq!(one.0, 65536);

        // D50 X printed to 8 decimals must decode to the original raw value
        let raw = S15Fixed16::from_raw(63190);
        let text = format!("{:.8}", raw.to_f64());
        let back = S15Fixed16::from_f64(text.parse::<f64>().unwrap());
        assert_eq!(back, raw);
    }

    #[test]
    fn test_f16_known_values() {
        assert_eq!(F16Number::from_f32(0.0).0, 0x0000);
        assert_eq!(F16Number::from_f32(1.0).0, 0x3C00);
        assert_eq!(F16Number::from_f32(0.5).0, 0x3800);
        assert_eq!(F16Number::from_f32(380.0).0, 0x5DF0);
        assert_eq!(F16Number::from_f32(-2.0).0, 0xC000);
    }

    #[test]
    fn test_f16_roundtrip() {
        for v in [0.0f32, 1.0, 0.5, 380.0, 730.0, -1.25, 65504.0] {
            let half = F16Number::from_f32(v);
            assert_eq!(half.to_f32(), v, "value {v}");
        }
    }

    #[test]
    fn test_f16_subnormal() {
        // smallest positive half subnormal is 2^-24
        let tiny = F16Number(0x0001);
        assert_eq!(tiny.to_f32(), 2.0f32.powi(-24));
        assert_eq!(F16Number::from_f32(tiny.to_f32()), tiny);
    }

    #[test]
    fn test_datetime_roundtrip() {
        let dt = DateTimeNumber {
            year: 2024,
            month: 5,
            day: 6,
            hour: 12,
            minute: 30,
            second: 45,
        };
        assert_eq!(dt.to_text(), "2024-05-06T12:30:45");
        assert_eq!(DateTimeNumber::from_text(&dt.to_text()), dt);
    }

    #[test]
    fn test_datetime_malformed_is_zero() {
        assert_eq!(DateTimeNumber::from_text(""), DateTimeNumber::default());
        assert_eq!(DateTimeNumber::from_text("yesterday"), DateTimeNumber::default());
        assert_eq!(DateTimeNumber::from_text("2024-05"), DateTimeNumber::default());
    }
}
