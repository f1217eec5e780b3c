//! Paint sources for glyph and decoration fills.

use std::hash::Hasher;

use crate::color::Color;
use crate::geometry::Point;

/// What a run of text is filled with. Gradients resolve through the glyph
/// alpha; linear stops are evenly spaced along the run.
#[derive(Clone, Debug, PartialEq)]
pub enum Brush {
    Solid(Color),
    LinearGradient(Vec<Color>),
    RadialGradient {
        colors: Vec<Color>,
        center: Point,
        radius: f32,
    },
}

impl Brush {
    /// Feeds the brush into `h` for structural cache keys. Colors pack to
    /// ARGB and floats hash bit-for-bit, so equal brushes hash equal.
    pub fn fingerprint<H: Hasher>(&self, h: &mut H) {
        match self {
            Brush::Solid(color) => {
                h.write_u8(1);
                h.write_u32(color.to_argb());
            }
            Brush::LinearGradient(colors) => {
                h.write_u8(2);
                h.write_usize(colors.len());
                for color in colors {
                    h.write_u32(color.to_argb());
                }
            }
            Brush::RadialGradient {
                colors,
                center,
                radius,
            } => {
                h.write_u8(3);
                h.write_usize(colors.len());
                for color in colors {
                    h.write_u32(color.to_argb());
                }
                h.write_u32(center.x.to_bits());
                h.write_u32(center.y.to_bits());
                h.write_u32(radius.to_bits());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(brush: &Brush) -> u64 {
        let mut h = DefaultHasher::new();
        brush.fingerprint(&mut h);
        h.finish()
    }

    #[test]
    fn variants_fingerprint_distinctly() {
        let solid = Brush::Solid(Color::BLACK);
        let linear = Brush::LinearGradient(vec![Color::BLACK]);
        let radial = Brush::RadialGradient {
            colors: vec![Color::BLACK],
            center: Point::ZERO,
            radius: 4.0,
        };
        assert_ne!(hash_of(&solid), hash_of(&linear));
        assert_ne!(hash_of(&linear), hash_of(&radial));
    }

    #[test]
    fn equal_brushes_fingerprint_equal() {
        let a = Brush::LinearGradient(vec![Color::BLACK, Color::WHITE]);
        let b = Brush::LinearGradient(vec![Color::BLACK, Color::WHITE]);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }
}
