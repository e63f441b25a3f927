//! Screen selection.
//!
//! The active screen is never stored directly. It is derived on every tick
//! from the completion flag and the current navigation token, which is the
//! address-fragment analogue: it can be bookmarked, passed on the command
//! line and walked back and forth through [`History`].
//!
//! ```text
//!   Calculator ──continue──► Confirm ──submit──► Success
//!       ▲                       │                  │
//!       └─────────back──────────┘          (sticky, terminal)
//! ```

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Calculator,
    Confirm,
    Success,
}

/// Recognized navigation tokens. Anything unrecognized reads as `Calculator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NavigationToken {
    #[default]
    Calculator,
    Confirm,
    Success,
}

impl NavigationToken {
    /// Parses a fragment, ignoring a leading `#`.
    pub fn parse(fragment: &str) -> Self {
        match fragment.strip_prefix('#').unwrap_or(fragment) {
            "confirm" => NavigationToken::Confirm,
            "success" => NavigationToken::Success,
            _ => NavigationToken::Calculator,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NavigationToken::Calculator => "",
            NavigationToken::Confirm => "confirm",
            NavigationToken::Success => "success",
        }
    }
}

impl From<&str> for NavigationToken {
    fn from(fragment: &str) -> Self {
        Self::parse(fragment)
    }
}

impl fmt::Display for NavigationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

/// Picks the screen for a render tick. A set completion flag wins over any
/// requested token.
pub fn resolve_screen(completed: bool, token: NavigationToken) -> Screen {
    if completed {
        return Screen::Success;
    }
    match token {
        NavigationToken::Confirm => Screen::Confirm,
        NavigationToken::Success => Screen::Success,
        NavigationToken::Calculator => Screen::Calculator,
    }
}

/// Browser-style history of navigation tokens.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<NavigationToken>,
    index: usize,
}

impl History {
    pub fn new(initial: NavigationToken) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
        }
    }

    pub fn current(&self) -> NavigationToken {
        self.entries[self.index]
    }

    /// Navigates to `token`, discarding any forward entries.
    pub fn push(&mut self, token: NavigationToken) {
        self.entries.truncate(self.index + 1);
        self.entries.push(token);
        self.index += 1;
    }

    /// Swaps the current entry without growing the history.
    pub fn replace(&mut self, token: NavigationToken) {
        self.entries[self.index] = token;
    }

    /// Steps back one entry. Returns false at the start of history.
    pub fn back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Steps forward one entry. Returns false at the end of history.
    pub fn forward(&mut self) -> bool {
        if self.index + 1 >= self.entries.len() {
            return false;
        }
        self.index += 1;
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
