//! Declared text colours and their RGB resolution.
//!
//! PDF libraries report a span's colour in different encodings. Each encoding
//! is an explicit variant of [`DeclaredColor`] and resolves to an [`Rgb`]
//! triple through [`DeclaredColor::resolve`].

use serde::Serialize;
use thiserror::Error;

/// An 8-bit sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    /// Pure black.
    pub const BLACK: Self = Self([0, 0, 0]);
    /// Pure white.
    pub const WHITE: Self = Self([255, 255, 255]);

    /// Returns the colour as a lowercase `#rrggbb` string.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{}", hex::encode(self.0))
    }
}

impl From<image::Rgb<u8>> for Rgb {
    fn from(pixel: image::Rgb<u8>) -> Self {
        Self(pixel.0)
    }
}

/// Serialisable colour description: hex string plus channel triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorInfo {
    /// `#rrggbb`.
    pub hex: String,
    /// `[r, g, b]`, each 0-255.
    pub rgb: [u8; 3],
}

impl From<Rgb> for ColorInfo {
    fn from(color: Rgb) -> Self {
        Self {
            hex: color.to_hex(),
            rgb: color.0,
        }
    }
}

/// A colour value that could not be resolved.
#[derive(Debug, Error, PartialEq)]
pub enum ColorError {
    /// Packed integer wider than 24 bits.
    #[error("packed colour 0x{0:x} exceeds 0xffffff")]
    PackedOutOfRange(u32),

    /// Normalised channel outside `0.0..=1.0` or not finite.
    #[error("normalised colour channel {0} is outside 0.0..=1.0")]
    ChannelOutOfRange(f32),
}

/// A span's colour as declared by the PDF library.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeclaredColor {
    /// `0xRRGGBB` packed into the low 24 bits. Valid range: `0..=0xFF_FFFF`.
    Packed(u32),
    /// Channels as fractions. Each channel must lie in `0.0..=1.0`;
    /// the byte value is `round(channel * 255)`.
    Normalized([f32; 3]),
    /// Channels as bytes, `0..=255` each. Always valid.
    Bytes([u8; 3]),
}

impl DeclaredColor {
    /// Resolves the declared colour to 8-bit RGB.
    ///
    /// # Errors
    ///
    /// Returns an error when the value lies outside the variant's valid range.
    pub fn resolve(self) -> Result<Rgb, ColorError> {
        match self {
            Self::Packed(value) => {
                if value > 0x00FF_FFFF {
                    return Err(ColorError::PackedOutOfRange(value));
                }
                let [_, r, g, b] = value.to_be_bytes();
                Ok(Rgb([r, g, b]))
            }
            Self::Normalized(channels) => {
                let mut out = [0u8; 3];
                for (slot, channel) in out.iter_mut().zip(channels) {
                    if !(0.0..=1.0).contains(&channel) {
                        return Err(ColorError::ChannelOutOfRange(channel));
                    }
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    {
                        *slot = (channel * 255.0).round() as u8;
                    }
                }
                Ok(Rgb(out))
            }
            Self::Bytes(channels) => Ok(Rgb(channels)),
        }
    }
}
