//! Palette index remapping between the source editor and the engine palettes.

/// Bit-reordering applied to each source color byte.
///
/// The two variants target differently laid out engine palettes; both must
/// be reproduced exactly so existing palettes keep working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorTransform {
    /// `7 - (256 - raw) % 8 + ((256 - raw) / 8) * 8`, truncated to 8 bits.
    Animated,
    /// `(31 - raw / 8) * 8 + raw % 8`.
    Static,
}

impl ColorTransform {
    /// Map a raw source color byte to an engine palette index.
    pub fn apply(self, raw: u8) -> u8 {
        match self {
            ColorTransform::Animated => {
                let inverted = 256 - u32::from(raw);
                // raw == 0 lies outside the editor's 1..=255 range and wraps.
                (7 - inverted % 8 + (inverted / 8) * 8) as u8
            }
            ColorTransform::Static => (31 - raw / 8) * 8 + raw % 8,
        }
    }
}
