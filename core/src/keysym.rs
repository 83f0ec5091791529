//! X11 keysym names, values and conversions.
//!
//! A keysym is an opaque 32-bit identifier for a keyboard symbol. The value
//! space follows the X11 `keysymdef.h` convention: printable Latin-1
//! characters map to their own code point, function and modifier keys live
//! in the `0xff00` range, dead keys in the `0xfe50` range, and arbitrary
//! Unicode code points are encoded as `0x0100_0000 | codepoint`.
//!
//! The name table below covers the vocabulary Compose files actually use:
//! printable Latin-1, dead keys, `Multi_key`, modifiers, keypad and editing
//! keys. Anything else can be spelled with the `U<hex>` or `0x<hex>` forms.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// A 32-bit keyboard symbol identifier.
///
/// `Keysym::NO_SYMBOL` (the zero value) is a sentinel and never names a real
/// symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Keysym(u32);

/// First keysym of the Unicode range, `U+0100` encoded.
const UNICODE_MIN: u32 = 0x0100_0100;
/// Last keysym of the Unicode range, `U+10FFFF` encoded.
const UNICODE_MAX: u32 = 0x0110_ffff;
/// Offset between a Unicode code point and its keysym encoding.
const UNICODE_OFFSET: u32 = 0x0100_0000;

impl Keysym {
    pub const NO_SYMBOL: Keysym = Keysym(0);

    pub const MULTI_KEY: Keysym = Keysym(0xff20);
    pub const MODE_SWITCH: Keysym = Keysym(0xff7e);
    pub const NUM_LOCK: Keysym = Keysym(0xff7f);
    pub const SHIFT_L: Keysym = Keysym(0xffe1);
    pub const SHIFT_R: Keysym = Keysym(0xffe2);
    pub const CAPS_LOCK: Keysym = Keysym(0xffe5);
    pub const HYPER_R: Keysym = Keysym(0xffee);
    pub const ISO_LOCK: Keysym = Keysym(0xfe01);
    pub const ISO_LEVEL5_LOCK: Keysym = Keysym(0xfe13);
    pub const DEAD_GRAVE: Keysym = Keysym(0xfe50);
    pub const DEAD_ACUTE: Keysym = Keysym(0xfe51);
    pub const DEAD_TILDE: Keysym = Keysym(0xfe53);

    pub const fn new(raw: u32) -> Keysym {
        Keysym(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn is_no_symbol(self) -> bool {
        self.0 == 0
    }

    /// Look up a keysym by name.
    ///
    /// Accepts the canonical X11 names (`"dead_tilde"`, `"asciitilde"`,
    /// `"A"`), the Unicode form `U<hex>` (`"U2014"`), and the raw hex form
    /// `0x<hex>`. Lookups are case-sensitive. Returns `None` for anything
    /// unrecognized.
    pub fn from_name(name: &str) -> Option<Keysym> {
        if let Some(&raw) = name_table().get(name) {
            return Some(Keysym(raw));
        }

        if let Some(hex) = name.strip_prefix('U') {
            if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            let cp = u32::from_str_radix(hex, 16).ok()?;
            if cp < 0x20 || (cp > 0x7e && cp < 0xa0) || cp > 0x10_ffff {
                return None;
            }
            if cp < 0x100 {
                return Some(Keysym(cp));
            }
            return Some(Keysym(cp | UNICODE_OFFSET));
        }

        if let Some(hex) = name.strip_prefix("0x") {
            if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            // 0x0 is the NO_SYMBOL sentinel, not a nameable symbol.
            return u32::from_str_radix(hex, 16)
                .ok()
                .filter(|&raw| raw != 0)
                .map(Keysym);
        }

        None
    }

    /// The canonical name of this keysym, if it is in the name table.
    pub fn name(self) -> Option<&'static str> {
        reverse_table().get(&self.0).map(|s| s.as_str())
    }

    /// The keysym for a character, using the Latin-1 identity mapping where
    /// possible and the Unicode encoding otherwise.
    pub fn from_char(c: char) -> Option<Keysym> {
        let cp = c as u32;
        match cp {
            0x20..=0x7e | 0xa0..=0xff => Some(Keysym(cp)),
            0x08 => Some(Keysym(0xff08)),
            0x09 => Some(Keysym(0xff09)),
            0x0a => Some(Keysym(0xff0a)),
            0x0d => Some(Keysym(0xff0d)),
            0x1b => Some(Keysym(0xff1b)),
            0x7f => Some(Keysym(0xffff)),
            0x100..=0x10_ffff => Some(Keysym(cp | UNICODE_OFFSET)),
            _ => None,
        }
    }

    /// The character this keysym produces, if any.
    pub fn to_char(self) -> Option<char> {
        match self.0 {
            0x20..=0x7e | 0xa0..=0xff => char::from_u32(self.0),
            UNICODE_MIN..=UNICODE_MAX => char::from_u32(self.0 - UNICODE_OFFSET),
            // TTY keys carry their ASCII control codes.
            0xff08 => Some('\u{8}'),
            0xff09 => Some('\t'),
            0xff0a => Some('\n'),
            0xff0d => Some('\r'),
            0xff1b => Some('\u{1b}'),
            0xffff => Some('\u{7f}'),
            // Keypad.
            0xff80 => Some(' '),
            0xff89 => Some('\t'),
            0xff8d => Some('\r'),
            0xffaa => Some('*'),
            0xffab => Some('+'),
            0xffac => Some(','),
            0xffad => Some('-'),
            0xffae => Some('.'),
            0xffaf => Some('/'),
            0xffb0..=0xffb9 => char::from_u32(self.0 - 0xffb0 + u32::from(b'0')),
            0xffbd => Some('='),
            _ => None,
        }
    }

    /// UTF-8 text for this keysym, if it produces any.
    pub fn to_utf8(self) -> Option<String> {
        self.to_char().map(String::from)
    }

    /// Whether this keysym is a modifier key (Shift, Control, Lock keys,
    /// ISO level shifts, `Mode_switch`, `Num_Lock`).
    pub fn is_modifier(self) -> bool {
        (self >= Keysym::SHIFT_L && self <= Keysym::HYPER_R)
            || (self >= Keysym::ISO_LOCK && self <= Keysym::ISO_LEVEL5_LOCK)
            || self == Keysym::MODE_SWITCH
            || self == Keysym::NUM_LOCK
    }
}

impl fmt::Display for Keysym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None if (UNICODE_MIN..=UNICODE_MAX).contains(&self.0) => {
                write!(f, "U{:04X}", self.0 - UNICODE_OFFSET)
            }
            None => write!(f, "{:#x}", self.0),
        }
    }
}

/// Multi-character names. Single-character names (letters and digits) are
/// generated when the lookup maps are built.
#[rustfmt::skip]
static NAMES: &[(&str, u32)] = &[
    // Printable ASCII.
    ("space", 0x20), ("exclam", 0x21), ("quotedbl", 0x22), ("numbersign", 0x23),
    ("dollar", 0x24), ("percent", 0x25), ("ampersand", 0x26), ("apostrophe", 0x27),
    ("parenleft", 0x28), ("parenright", 0x29), ("asterisk", 0x2a), ("plus", 0x2b),
    ("comma", 0x2c), ("minus", 0x2d), ("period", 0x2e), ("slash", 0x2f),
    ("colon", 0x3a), ("semicolon", 0x3b), ("less", 0x3c), ("equal", 0x3d),
    ("greater", 0x3e), ("question", 0x3f), ("at", 0x40),
    ("bracketleft", 0x5b), ("backslash", 0x5c), ("bracketright", 0x5d),
    ("asciicircum", 0x5e), ("underscore", 0x5f), ("grave", 0x60),
    ("braceleft", 0x7b), ("bar", 0x7c), ("braceright", 0x7d), ("asciitilde", 0x7e),
    // Latin-1 supplement.
    ("nobreakspace", 0xa0), ("exclamdown", 0xa1), ("cent", 0xa2), ("sterling", 0xa3),
    ("currency", 0xa4), ("yen", 0xa5), ("brokenbar", 0xa6), ("section", 0xa7),
    ("diaeresis", 0xa8), ("copyright", 0xa9), ("ordfeminine", 0xaa),
    ("guillemotleft", 0xab), ("notsign", 0xac), ("hyphen", 0xad),
    ("registered", 0xae), ("macron", 0xaf), ("degree", 0xb0), ("plusminus", 0xb1),
    ("twosuperior", 0xb2), ("threesuperior", 0xb3), ("acute", 0xb4), ("mu", 0xb5),
    ("paragraph", 0xb6), ("periodcentered", 0xb7), ("cedilla", 0xb8),
    ("onesuperior", 0xb9), ("masculine", 0xba), ("guillemotright", 0xbb),
    ("onequarter", 0xbc), ("onehalf", 0xbd), ("threequarters", 0xbe),
    ("questiondown", 0xbf), ("Agrave", 0xc0), ("Aacute", 0xc1),
    ("Acircumflex", 0xc2), ("Atilde", 0xc3), ("Adiaeresis", 0xc4), ("Aring", 0xc5),
    ("AE", 0xc6), ("Ccedilla", 0xc7), ("Egrave", 0xc8), ("Eacute", 0xc9),
    ("Ecircumflex", 0xca), ("Ediaeresis", 0xcb), ("Igrave", 0xcc), ("Iacute", 0xcd),
    ("Icircumflex", 0xce), ("Idiaeresis", 0xcf), ("ETH", 0xd0), ("Ntilde", 0xd1),
    ("Ograve", 0xd2), ("Oacute", 0xd3), ("Ocircumflex", 0xd4), ("Otilde", 0xd5),
    ("Odiaeresis", 0xd6), ("multiply", 0xd7), ("Oslash", 0xd8), ("Ugrave", 0xd9),
    ("Uacute", 0xda), ("Ucircumflex", 0xdb), ("Udiaeresis", 0xdc), ("Yacute", 0xdd),
    ("THORN", 0xde), ("ssharp", 0xdf), ("agrave", 0xe0), ("aacute", 0xe1),
    ("acircumflex", 0xe2), ("atilde", 0xe3), ("adiaeresis", 0xe4), ("aring", 0xe5),
    ("ae", 0xe6), ("ccedilla", 0xe7), ("egrave", 0xe8), ("eacute", 0xe9),
    ("ecircumflex", 0xea), ("ediaeresis", 0xeb), ("igrave", 0xec), ("iacute", 0xed),
    ("icircumflex", 0xee), ("idiaeresis", 0xef), ("eth", 0xf0), ("ntilde", 0xf1),
    ("ograve", 0xf2), ("oacute", 0xf3), ("ocircumflex", 0xf4), ("otilde", 0xf5),
    ("odiaeresis", 0xf6), ("division", 0xf7), ("oslash", 0xf8), ("ugrave", 0xf9),
    ("uacute", 0xfa), ("ucircumflex", 0xfb), ("udiaeresis", 0xfc), ("yacute", 0xfd),
    ("thorn", 0xfe), ("ydiaeresis", 0xff),
    // Currency.
    ("EuroSign", 0x20ac),
    // TTY and editing keys.
    ("BackSpace", 0xff08), ("Tab", 0xff09), ("Linefeed", 0xff0a), ("Clear", 0xff0b),
    ("Return", 0xff0d), ("Pause", 0xff13), ("Scroll_Lock", 0xff14),
    ("Sys_Req", 0xff15), ("Escape", 0xff1b), ("Multi_key", 0xff20),
    ("Home", 0xff50), ("Left", 0xff51), ("Up", 0xff52), ("Right", 0xff53),
    ("Down", 0xff54), ("Prior", 0xff55), ("Next", 0xff56), ("End", 0xff57),
    ("Begin", 0xff58), ("Insert", 0xff63), ("Menu", 0xff67),
    ("Mode_switch", 0xff7e), ("Num_Lock", 0xff7f), ("Delete", 0xffff),
    // Keypad.
    ("KP_Space", 0xff80), ("KP_Tab", 0xff89), ("KP_Enter", 0xff8d),
    ("KP_Multiply", 0xffaa), ("KP_Add", 0xffab), ("KP_Separator", 0xffac),
    ("KP_Subtract", 0xffad), ("KP_Decimal", 0xffae), ("KP_Divide", 0xffaf),
    ("KP_0", 0xffb0), ("KP_1", 0xffb1), ("KP_2", 0xffb2), ("KP_3", 0xffb3),
    ("KP_4", 0xffb4), ("KP_5", 0xffb5), ("KP_6", 0xffb6), ("KP_7", 0xffb7),
    ("KP_8", 0xffb8), ("KP_9", 0xffb9), ("KP_Equal", 0xffbd),
    // Function keys.
    ("F1", 0xffbe), ("F2", 0xffbf), ("F3", 0xffc0), ("F4", 0xffc1),
    ("F5", 0xffc2), ("F6", 0xffc3), ("F7", 0xffc4), ("F8", 0xffc5),
    ("F9", 0xffc6), ("F10", 0xffc7), ("F11", 0xffc8), ("F12", 0xffc9),
    // Modifiers.
    ("Shift_L", 0xffe1), ("Shift_R", 0xffe2), ("Control_L", 0xffe3),
    ("Control_R", 0xffe4), ("Caps_Lock", 0xffe5), ("Shift_Lock", 0xffe6),
    ("Meta_L", 0xffe7), ("Meta_R", 0xffe8), ("Alt_L", 0xffe9), ("Alt_R", 0xffea),
    ("Super_L", 0xffeb), ("Super_R", 0xffec), ("Hyper_L", 0xffed),
    ("Hyper_R", 0xffee),
    ("ISO_Lock", 0xfe01), ("ISO_Level2_Latch", 0xfe02), ("ISO_Level3_Shift", 0xfe03),
    ("ISO_Level3_Latch", 0xfe04), ("ISO_Level3_Lock", 0xfe05),
    ("ISO_Level5_Shift", 0xfe11), ("ISO_Level5_Latch", 0xfe12),
    ("ISO_Level5_Lock", 0xfe13),
    // Dead keys.
    ("dead_grave", 0xfe50), ("dead_acute", 0xfe51), ("dead_circumflex", 0xfe52),
    ("dead_tilde", 0xfe53), ("dead_macron", 0xfe54), ("dead_breve", 0xfe55),
    ("dead_abovedot", 0xfe56), ("dead_diaeresis", 0xfe57), ("dead_abovering", 0xfe58),
    ("dead_doubleacute", 0xfe59), ("dead_caron", 0xfe5a), ("dead_cedilla", 0xfe5b),
    ("dead_ogonek", 0xfe5c), ("dead_iota", 0xfe5d), ("dead_voiced_sound", 0xfe5e),
    ("dead_semivoiced_sound", 0xfe5f), ("dead_belowdot", 0xfe60),
    ("dead_hook", 0xfe61), ("dead_horn", 0xfe62), ("dead_stroke", 0xfe63),
    ("dead_abovecomma", 0xfe64), ("dead_abovereversedcomma", 0xfe65),
    ("dead_doublegrave", 0xfe66), ("dead_belowring", 0xfe67),
    ("dead_belowmacron", 0xfe68), ("dead_belowcircumflex", 0xfe69),
    ("dead_belowtilde", 0xfe6a), ("dead_belowbreve", 0xfe6b),
    ("dead_belowdiaeresis", 0xfe6c), ("dead_invertedbreve", 0xfe6d),
    ("dead_belowcomma", 0xfe6e), ("dead_currency", 0xfe6f), ("dead_greek", 0xfe8c),
];

fn name_table() -> &'static HashMap<String, u32> {
    static TABLE: Lazy<HashMap<String, u32>> = Lazy::new(|| {
        let mut map = HashMap::with_capacity(NAMES.len() + 62);
        for &(name, value) in NAMES {
            map.insert(name.to_string(), value);
        }
        for c in ('0'..='9').chain('A'..='Z').chain('a'..='z') {
            map.insert(c.to_string(), c as u32);
        }
        map
    });
    &TABLE
}

fn reverse_table() -> &'static HashMap<u32, String> {
    static TABLE: Lazy<HashMap<u32, String>> = Lazy::new(|| {
        let mut map = HashMap::with_capacity(NAMES.len() + 62);
        for &(name, value) in NAMES {
            map.entry(value).or_insert_with(|| name.to_string());
        }
        for c in ('0'..='9').chain('A'..='Z').chain('a'..='z') {
            map.insert(c as u32, c.to_string());
        }
        map
    });
    &TABLE
}
