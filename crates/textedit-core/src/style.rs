//! Style table consulted by the renderer.
//!
//! Lookups are tiered: a `(major, minor)` override wins, then the major classification's
//! entry, then the normal style. Each field (fg, bg, font) falls back independently, so an
//! override that only sets a foreground keeps the background of its major.

use crate::lex::{Lex, LexMajor, LexMinor};
use bitflags::bitflags;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

impl Color {
    /// Create a color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Black.
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// White.
    pub const WHITE: Color = Color::rgb(255, 255, 255);
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Error returned when parsing a `#RRGGBB` color fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color '{0}', expected #RRGGBB")]
pub struct ParseColorError(pub String);

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(err)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(err());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

bitflags! {
    /// Font attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FontFlags: u8 {
        /// Bold weight.
        const BOLD = 1 << 0;
        /// Italic slant.
        const ITALIC = 1 << 1;
        /// Underline.
        const UNDERLINE = 1 << 2;
    }
}

/// A style table entry; unset fields fall back to the next tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StyleEntry {
    /// Foreground color.
    pub fg: Option<Color>,
    /// Background color.
    pub bg: Option<Color>,
    /// Font attributes.
    pub font: Option<FontFlags>,
}

impl StyleEntry {
    /// An entry that only sets the foreground.
    pub fn fg(color: Color) -> Self {
        Self {
            fg: Some(color),
            ..Self::default()
        }
    }

    /// Builder: set the background.
    pub fn with_bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    /// Builder: set font attributes.
    pub fn with_font(mut self, font: FontFlags) -> Self {
        self.font = Some(font);
        self
    }
}

/// A fully resolved style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleValue {
    /// Foreground color.
    pub fg: Color,
    /// Background color.
    pub bg: Color,
    /// Font attributes.
    pub font: FontFlags,
}

/// Non-lexical surfaces the renderer styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleItem {
    /// Selected text.
    Visual,
    /// The line holding the caret.
    CaretLine,
    /// Line number gutter.
    Number,
    /// Find match highlight.
    Highlight,
    /// Soft-wrap continuation marker.
    Wrap,
    /// Visible whitespace.
    Space,
}

/// Maps [`Lex`] classifications and [`StyleItem`]s to visual attributes.
#[derive(Debug, Clone)]
pub struct Style {
    normal: StyleValue,
    majors: HashMap<LexMajor, StyleEntry>,
    overrides: HashMap<Lex, StyleEntry>,
    items: HashMap<StyleItem, StyleEntry>,
}

impl Style {
    /// Create an empty table with the given normal style.
    pub fn new(normal: StyleValue) -> Self {
        Self {
            normal,
            majors: HashMap::new(),
            overrides: HashMap::new(),
            items: HashMap::new(),
        }
    }

    /// The normal (fallback) style.
    pub fn normal(&self) -> StyleValue {
        self.normal
    }

    /// Set the entry for a major classification.
    pub fn set_major(&mut self, major: LexMajor, entry: StyleEntry) {
        self.majors.insert(major, entry);
    }

    /// Set an override for a `(major, minor)` pair.
    pub fn set_override(&mut self, lex: Lex, entry: StyleEntry) {
        if lex.minor == LexMinor::None {
            self.set_major(lex.major, entry);
        } else {
            self.overrides.insert(lex, entry);
        }
    }

    /// Remove an override, restoring major-level fallback.
    pub fn clear_override(&mut self, lex: Lex) {
        self.overrides.remove(&lex);
    }

    /// Set the entry for a non-lexical item.
    pub fn set_item(&mut self, item: StyleItem, entry: StyleEntry) {
        self.items.insert(item, entry);
    }

    /// Resolve the style for `lex`.
    pub fn get(&self, lex: Lex) -> StyleValue {
        let tiers = [self.overrides.get(&lex), self.majors.get(&lex.major)];
        self.resolve(&tiers)
    }

    /// Resolve the style for a non-lexical item.
    pub fn get_item(&self, item: StyleItem) -> StyleValue {
        self.resolve(&[self.items.get(&item)])
    }

    fn resolve(&self, tiers: &[Option<&StyleEntry>]) -> StyleValue {
        let entries = || tiers.iter().flatten();
        StyleValue {
            fg: entries().find_map(|e| e.fg).unwrap_or(self.normal.fg),
            bg: entries().find_map(|e| e.bg).unwrap_or(self.normal.bg),
            font: entries().find_map(|e| e.font).unwrap_or(self.normal.font),
        }
    }
}

impl Default for Style {
    /// A light scheme loosely following classic vim colors.
    fn default() -> Self {
        let mut style = Style::new(StyleValue {
            fg: Color::BLACK,
            bg: Color::WHITE,
            font: FontFlags::empty(),
        });

        style.set_major(LexMajor::Comment, StyleEntry::fg(Color::rgb(0x00, 0x80, 0x00)));
        style.set_major(LexMajor::Constant, StyleEntry::fg(Color::rgb(0xA3, 0x15, 0x15)));
        style.set_major(LexMajor::Identifier, StyleEntry::fg(Color::rgb(0x00, 0x80, 0x80)));
        style.set_major(
            LexMajor::Statement,
            StyleEntry::fg(Color::rgb(0x00, 0x00, 0xFF)).with_font(FontFlags::BOLD),
        );
        style.set_major(LexMajor::Package, StyleEntry::fg(Color::rgb(0x80, 0x00, 0x80)));
        style.set_major(LexMajor::PreProc, StyleEntry::fg(Color::rgb(0x80, 0x40, 0x00)));
        style.set_major(LexMajor::Type, StyleEntry::fg(Color::rgb(0x2B, 0x91, 0xAF)));
        style.set_major(LexMajor::Special, StyleEntry::fg(Color::rgb(0x6A, 0x5A, 0xCD)));
        style.set_major(
            LexMajor::Error,
            StyleEntry::fg(Color::WHITE).with_bg(Color::rgb(0xFF, 0x00, 0x00)),
        );
        style.set_override(
            Lex::new(LexMajor::Constant, LexMinor::Number),
            StyleEntry::fg(Color::rgb(0x09, 0x86, 0x58)),
        );
        style.set_override(
            Lex::new(LexMajor::Comment, LexMinor::Doc),
            StyleEntry::default().with_font(FontFlags::ITALIC),
        );
        style.set_override(
            Lex::new(LexMajor::Special, LexMinor::Match),
            StyleEntry::default().with_bg(Color::rgb(0xFF, 0xFF, 0x00)),
        );

        style.set_item(
            StyleItem::Visual,
            StyleEntry::default().with_bg(Color::rgb(0xAD, 0xD6, 0xFF)),
        );
        style.set_item(
            StyleItem::CaretLine,
            StyleEntry::default().with_bg(Color::rgb(0xF5, 0xF5, 0xF5)),
        );
        style.set_item(StyleItem::Number, StyleEntry::fg(Color::rgb(0x80, 0x80, 0x80)));
        style.set_item(
            StyleItem::Highlight,
            StyleEntry::default().with_bg(Color::rgb(0xFF, 0xFF, 0x00)),
        );
        style.set_item(StyleItem::Wrap, StyleEntry::fg(Color::rgb(0xC0, 0xC0, 0xC0)));
        style.set_item(StyleItem::Space, StyleEntry::fg(Color::rgb(0xD0, 0xD0, 0xD0)));
        style
    }
}
