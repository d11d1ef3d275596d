//! Color assignment for roster members.

/// Hands out color tokens for newly seen users.
pub trait Palette: Send {
    fn next_color(&mut self) -> String;
}

/// Cycles through a fixed list of tokens.
#[derive(Debug, Clone)]
pub struct RotatingPalette {
    tokens: Vec<String>,
    next: usize,
}

const DEFAULT_TOKENS: &[&str] = &[
    "red", "green", "yellow", "blue", "magenta", "cyan", "orange", "purple", "teal", "pink",
];

impl RotatingPalette {
    /// Palette over `tokens`. An empty list falls back to the default tokens.
    pub fn new(tokens: Vec<String>) -> Self {
        let tokens = if tokens.is_empty() {
            DEFAULT_TOKENS.iter().map(|t| (*t).to_string()).collect()
        } else {
            tokens
        };
        Self { tokens, next: 0 }
    }
}

impl Default for RotatingPalette {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Palette for RotatingPalette {
    fn next_color(&mut self) -> String {
        let token = self.tokens[self.next % self.tokens.len()].clone();
        self.next = (self.next + 1) % self.tokens.len();
        token
    }
}
