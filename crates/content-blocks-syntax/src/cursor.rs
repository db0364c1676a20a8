/// A cursor for byte-by-byte scanning of running text between tags.
#[derive(Clone)]
pub struct Cursor<'a> {
    /// The full source being scanned.
    pub s: &'a str,
    /// Current byte index into `s`.
    pub i: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a new cursor at byte `i` of `s`.
    pub fn new(s: &'a str, i: usize) -> Self {
        Self { s, i }
    }

    /// Returns true if at end of string.
    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    /// Peeks at the current byte without advancing.
    pub fn peek(&self) -> Option<u8> {
        self.peek_at(0)
    }

    /// Peeks `n` bytes ahead of the current position.
    pub fn peek_at(&self, n: usize) -> Option<u8> {
        self.s.as_bytes().get(self.i + n).copied()
    }

    /// Checks if the remaining input starts with the given byte pattern.
    pub fn starts_with(&self, pat: &[u8]) -> bool {
        self.s.as_bytes()[self.i.min(self.s.len())..].starts_with(pat)
    }

    /// True when the cursor sits on `<name` or `</name`, i.e. a real tag
    /// rather than a stray `<` in text.
    pub fn at_tag(&self) -> bool {
        match (self.peek(), self.peek_at(1)) {
            (Some(b'<'), Some(b'/')) => self.peek_at(2).is_some_and(|b| b.is_ascii_alphabetic()),
            (Some(b'<'), Some(next)) => next.is_ascii_alphabetic(),
            _ => false,
        }
    }

    /// Advances by one byte, returning the consumed byte.
    pub fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.i += 1;
        Some(b)
    }

    /// Moves to an absolute byte offset.
    pub fn jump(&mut self, to: usize) {
        self.i = to;
    }
}
