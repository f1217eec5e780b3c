//! Typography data structures (font styles, weights)

/// Font style (normal, italic, oblique)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

impl FontStyle {
    /// Oblique renders with the italic face.
    #[inline]
    pub fn is_italic(self) -> bool {
        !matches!(self, FontStyle::Normal)
    }
}

/// Font weight (100-900)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FontWeight(pub u16);

impl FontWeight {
    pub const THIN: FontWeight = FontWeight(100);
    pub const EXTRA_LIGHT: FontWeight = FontWeight(200);
    pub const LIGHT: FontWeight = FontWeight(300);
    pub const NORMAL: FontWeight = FontWeight(400);
    pub const MEDIUM: FontWeight = FontWeight(500);
    pub const SEMI_BOLD: FontWeight = FontWeight(600);
    pub const BOLD: FontWeight = FontWeight(700);
    pub const EXTRA_BOLD: FontWeight = FontWeight(800);
    pub const BLACK: FontWeight = FontWeight(900);

    /// Weights of 500 and above render with the bold face.
    #[inline]
    pub fn is_bold(self) -> bool {
        self >= FontWeight::MEDIUM
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        FontWeight::NORMAL
    }
}

/// Resolved face index used by typeface caches: weight and slant collapse
/// into one of four concrete faces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum TypefaceStyle {
    #[default]
    Normal = 0,
    Bold = 1,
    Italic = 2,
    BoldItalic = 3,
}

impl TypefaceStyle {
    pub const COUNT: usize = 4;

    pub fn resolve(weight: FontWeight, style: FontStyle) -> Self {
        match (weight.is_bold(), style.is_italic()) {
            (true, true) => TypefaceStyle::BoldItalic,
            (true, false) => TypefaceStyle::Bold,
            (false, true) => TypefaceStyle::Italic,
            (false, false) => TypefaceStyle::Normal,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn medium_weight_resolves_bold_face() {
        assert_eq!(
            TypefaceStyle::resolve(FontWeight::MEDIUM, FontStyle::Normal),
            TypefaceStyle::Bold
        );
    }

    #[test]
    fn oblique_resolves_italic_face() {
        assert_eq!(
            TypefaceStyle::resolve(FontWeight::LIGHT, FontStyle::Oblique),
            TypefaceStyle::Italic
        );
    }
}
