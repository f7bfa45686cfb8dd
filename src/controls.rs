//! Live control state shared between the UI boundary and the renderer.
//!
//! [`Controls`] is the snapshot the frame tick reads once per frame: the
//! icosphere subdivision level, which shader program and shape are active,
//! and the tint color as a hex string. It is mutated only from the event
//! handler between frames; the core never writes it except to clamp the
//! subdivision level through its setter.
//!
//! Shader and shape selection are closed enums dispatched with `match`, so
//! a typo'd selection cannot exist at runtime.

use glam::Vec4;

use crate::mesh::MAX_SUBDIVISION_LEVEL;

/// The selectable shader programs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderKind {
    Lambert,
    Deform,
}

impl ShaderKind {
    /// Human-readable pipeline name.
    pub fn label(self) -> &'static str {
        match self {
            ShaderKind::Lambert => "Lambert",
            ShaderKind::Deform => "Deform",
        }
    }

    /// The next selection in cycling order.
    pub fn next(self) -> Self {
        match self {
            ShaderKind::Lambert => ShaderKind::Deform,
            ShaderKind::Deform => ShaderKind::Lambert,
        }
    }
}

/// The selectable shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Square,
    Icosphere,
    Cube,
}

impl ShapeKind {
    /// Human-readable shape name.
    pub fn label(self) -> &'static str {
        match self {
            ShapeKind::Square => "Square",
            ShapeKind::Icosphere => "Icosphere",
            ShapeKind::Cube => "Cube",
        }
    }

    /// The next selection in cycling order.
    pub fn next(self) -> Self {
        match self {
            ShapeKind::Square => ShapeKind::Icosphere,
            ShapeKind::Icosphere => ShapeKind::Cube,
            ShapeKind::Cube => ShapeKind::Square,
        }
    }
}

/// Mutable control snapshot.
///
/// The subdivision level is private so every write goes through the
/// clamping setter; the remaining fields are plain data the UI boundary
/// overwrites freely.
#[derive(Clone, Debug)]
pub struct Controls {
    tessellation: u32,
    /// Active shader program.
    pub shader: ShaderKind,
    /// Active shape.
    pub shape: ShapeKind,
    /// Tint color as a hex RGB string (e.g. `"#ffff00"`). Parsed
    /// defensively each time it changes; a malformed value leaves the
    /// previous valid color in effect.
    pub tint_color: String,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            tessellation: 1,
            shader: ShaderKind::Deform,
            shape: ShapeKind::Cube,
            tint_color: "#ffff00".to_string(),
        }
    }
}

impl Controls {
    /// The current icosphere subdivision level.
    pub fn tessellation(&self) -> u32 {
        self.tessellation
    }

    /// Sets the subdivision level, clamped to the supported range.
    ///
    /// Returns the level actually applied.
    pub fn set_tessellation(&mut self, level: u32) -> u32 {
        self.tessellation = level.min(MAX_SUBDIVISION_LEVEL);
        self.tessellation
    }
}

/// Parses a `#rrggbb` hex color (the `#` is optional) into an opaque RGBA
/// color.
///
/// Returns `None` for anything that is not exactly six hex digits, so a
/// malformed control value can be ignored instead of crashing the frame
/// loop.
pub fn parse_hex_color(text: &str) -> Option<Vec4> {
    let digits = text.strip_prefix('#').unwrap_or(text);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |range| u8::from_str_radix(&digits[range], 16).ok();
    let r = channel(0..2)?;
    let g = channel(2..4)?;
    let b = channel(4..6)?;

    Some(Vec4::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        1.0,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_yellow() {
        assert_eq!(
            parse_hex_color("#ffff00"),
            Some(Vec4::new(1.0, 1.0, 0.0, 1.0))
        );
    }

    #[test]
    fn hash_prefix_is_optional() {
        assert_eq!(parse_hex_color("00ff80"), parse_hex_color("#00ff80"));
        let c = parse_hex_color("00ff80").unwrap();
        assert!((c.y - 1.0).abs() < 1e-6);
        assert!((c.z - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(parse_hex_color(""), None);
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#gggggg"), None);
        assert_eq!(parse_hex_color("#ffff001"), None);
        assert_eq!(parse_hex_color("not a color"), None);
    }

    #[test]
    fn uppercase_digits_are_accepted() {
        assert_eq!(
            parse_hex_color("#FFFF00"),
            Some(Vec4::new(1.0, 1.0, 0.0, 1.0))
        );
    }

    #[test]
    fn tessellation_is_clamped() {
        let mut controls = Controls::default();
        assert_eq!(controls.set_tessellation(3), 3);
        assert_eq!(controls.set_tessellation(12), MAX_SUBDIVISION_LEVEL);
        assert_eq!(controls.tessellation(), MAX_SUBDIVISION_LEVEL);
    }

    #[test]
    fn selections_cycle_through_every_variant() {
        assert_eq!(ShaderKind::Lambert.next(), ShaderKind::Deform);
        assert_eq!(ShaderKind::Deform.next(), ShaderKind::Lambert);

        let mut shape = ShapeKind::Square;
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(shape);
            shape = shape.next();
        }
        assert_eq!(shape, ShapeKind::Square);
        assert_eq!(
            seen,
            vec![ShapeKind::Square, ShapeKind::Icosphere, ShapeKind::Cube]
        );
    }
}
