//! Resolved character and paragraph formatting.

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `RRGGBB` with or without a leading `#`, or a color name.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let hex = value.strip_prefix('#').unwrap_or(value);
        if hex.len() == 6 && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            return Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?));
        }
        Self::named(value)
    }

    /// The OOXML highlight palette, matched case-insensitively.
    pub fn named(name: &str) -> Option<Self> {
        let color = match name.to_ascii_lowercase().as_str() {
            "black" => Self::BLACK,
            "white" => Self::WHITE,
            "blue" => Self::rgb(0x00, 0x00, 0xFF),
            "cyan" => Self::rgb(0x00, 0xFF, 0xFF),
            "green" => Self::rgb(0x00, 0xFF, 0x00),
            "magenta" => Self::rgb(0xFF, 0x00, 0xFF),
            "red" => Self::rgb(0xFF, 0x00, 0x00),
            "yellow" => Self::rgb(0xFF, 0xFF, 0x00),
            "darkblue" => Self::rgb(0x00, 0x00, 0x8B),
            "darkcyan" => Self::rgb(0x00, 0x8B, 0x8B),
            "darkgreen" => Self::rgb(0x00, 0x64, 0x00),
            "darkmagenta" => Self::rgb(0x8B, 0x00, 0x8B),
            "darkred" => Self::rgb(0x8B, 0x00, 0x00),
            "darkyellow" => Self::rgb(0x80, 0x80, 0x00),
            "darkgray" => Self::rgb(0xA9, 0xA9, 0xA9),
            "lightgray" => Self::rgb(0xD3, 0xD3, 0xD3),
            _ => return None,
        };
        Some(color)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnderlineStyle {
    Single,
    Double,
    Dotted,
    Dash,
    DotDash,
    DotDotDash,
}

impl UnderlineStyle {
    /// Maps a `w:u/@w:val`. Styles outside this set render without underline.
    pub fn from_ooxml(value: &str) -> Option<Self> {
        match value {
            "single" => Some(Self::Single),
            "double" => Some(Self::Double),
            "dotted" => Some(Self::Dotted),
            "dash" => Some(Self::Dash),
            "dotDash" => Some(Self::DotDash),
            "dotDotDash" => Some(Self::DotDotDash),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Underline {
    pub style: UnderlineStyle,
    /// `None` draws the underline in the text color.
    pub color: Option<Color>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaselineShift {
    #[default]
    Baseline,
    Subscript,
    Superscript,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextDirection {
    #[default]
    LeftToRight,
    RightToLeft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Right,
    Center,
    Justify,
}

impl Alignment {
    /// Maps a `w:jc/@w:val`, `None` for values that should leave alignment alone.
    pub fn from_ooxml(value: &str) -> Option<Self> {
        match value {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "center" => Some(Self::Center),
            "both" => Some(Self::Justify),
            _ => None,
        }
    }
}

/// Formatting resolved for a single run. `None` fields inherit from the surrounding text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunFormat {
    pub bold: bool,
    pub italic: bool,
    pub underline: Option<Underline>,
    pub strike: bool,
    pub baseline: BaselineShift,
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub font_family: Option<String>,
    /// Display size in points.
    pub font_size: Option<f32>,
    pub direction: TextDirection,
}
