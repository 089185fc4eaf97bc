//! Key specification parsing (`"cmd+shift+Tab"`, `"Return"`, `"a"`).

use bitflags::bitflags;
use tracing::debug;

bitflags! {
    /// Host modifier set. `control` and `command` collapse onto COMMAND, which is
    /// the modifier the target desktop uses for shortcuts.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const COMMAND = 0b001;
        const SHIFT = 0b010;
        const OPTION = 0b100;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Modifiers::empty()
    }
}

pub const KEY_CODE_PAGE_UP: u16 = 116;
pub const KEY_CODE_PAGE_DOWN: u16 = 121;

const NAMED_KEYS: &[(&str, u16)] = &[
    ("Return", 36),
    ("Enter", 36),
    ("Tab", 48),
    ("Escape", 53),
    ("Delete", 51),
    ("BackSpace", 51),
    ("ForwardDelete", 117),
    ("Up", 126),
    ("Down", 125),
    ("Left", 123),
    ("Right", 124),
    ("Page_Up", KEY_CODE_PAGE_UP),
    ("Page_Down", KEY_CODE_PAGE_DOWN),
    ("Home", 115),
    ("End", 119),
    ("F1", 122),
    ("F2", 120),
    ("F3", 99),
    ("F4", 118),
    ("F5", 96),
    ("F6", 97),
    ("F7", 98),
    ("F8", 100),
    ("F9", 101),
    ("F10", 109),
    ("F11", 103),
    ("F12", 111),
];

/// Looks up a named key, ignoring ASCII case.
pub fn named_key_code(name: &str) -> Option<u16> {
    NAMED_KEYS
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
        .map(|(_, code)| *code)
}

/// What the trailing token of a key specification resolved to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyTarget {
    /// A named key sent as a virtual key code.
    Code(u16),
    /// Anything else, sent as a literal keystroke.
    Literal(String),
}

/// A parsed `key` action payload. `raw` is kept for logging.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeySpec {
    pub raw: String,
    pub modifiers: Modifiers,
    pub target: KeyTarget,
}

impl KeySpec {
    pub fn parse(raw: &str) -> Self {
        let (modifier_tokens, main) = split_combo(raw.trim());
        let mut modifiers = Modifiers::empty();
        for token in modifier_tokens {
            match token.to_ascii_lowercase().as_str() {
                "ctrl" | "control" | "cmd" | "command" => modifiers |= Modifiers::COMMAND,
                "shift" => modifiers |= Modifiers::SHIFT,
                "alt" | "option" => modifiers |= Modifiers::OPTION,
                other => debug!(modifier = other, "ignoring unrecognised modifier"),
            }
        }

        let target = match named_key_code(main) {
            Some(code) => KeyTarget::Code(code),
            None => KeyTarget::Literal(main.to_string()),
        };

        Self {
            raw: raw.to_string(),
            modifiers,
            target,
        }
    }
}

fn split_combo(raw: &str) -> (Vec<&str>, &str) {
    if raw == "+" {
        return (Vec::new(), "+");
    }
    if let Some(prefix) = raw.strip_suffix("++") {
        return (tokens(prefix), "+");
    }
    match raw.rsplit_once('+') {
        Some((prefix, main)) => (tokens(prefix), main.trim()),
        None => (Vec::new(), raw),
    }
}

fn tokens(prefix: &str) -> Vec<&str> {
    prefix
        .split('+')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect()
}
