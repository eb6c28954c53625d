//! Packet tokens
//!
//! A token is a single signed counter. Its magnitude is the number of
//! processing steps the packet has completed, which doubles as the tick at
//! which it is next due. Its sign is the capture marker: once a token has
//! passed the surveillance node it stays negative for the rest of its
//! journey.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// One unit of traffic travelling from Start to End
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PacketToken(i64);

impl PacketToken {
    /// A fresh, uncaptured token with zero elapsed steps
    pub fn new() -> Self {
        Self(0)
    }

    /// Raw signed counter
    pub fn value(self) -> i64 {
        self.0
    }

    /// Number of processing steps completed
    pub fn steps(self) -> u64 {
        self.0.unsigned_abs()
    }

    /// Whether the token has been intercepted at least once
    pub fn is_captured(self) -> bool {
        self.0 < 0
    }

    /// A token is due on the tick matching its step count
    pub fn is_due(self, tick: u64) -> bool {
        self.steps() == tick
    }

    /// Advance one step, keeping the capture marker
    pub fn advance(&mut self) {
        if self.0 < 0 {
            self.0 -= 1;
        } else {
            self.0 += 1;
        }
    }

    /// Mark the token as intercepted.
    ///
    /// Returns `true` only the first time; a captured token is never counted
    /// twice. Must be called after [`advance`](Self::advance) so the counter
    /// is non-zero.
    pub fn capture(&mut self) -> bool {
        if self.0 > 0 {
            self.0 = -self.0;
            true
        } else {
            false
        }
    }
}

impl Display for PacketToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_token_is_due_at_zero() {
        let token = PacketToken::new();
        assert!(token.is_due(0));
        assert!(!token.is_due(1));
        assert!(!token.is_captured());
    }

    #[test]
    fn test_advance_keeps_sign() {
        let mut token = PacketToken::new();
        token.advance();
        assert_eq!(token.value(), 1);
        token.advance();
        assert_eq!(token.value(), 2);

        assert!(token.capture());
        assert_eq!(token.value(), -2);
        token.advance();
        assert_eq!(token.value(), -3);
        assert_eq!(token.steps(), 3);
        assert!(token.is_due(3));
    }

    #[test]
    fn test_capture_counts_once() {
        let mut token = PacketToken::new();
        token.advance();
        assert!(token.capture());
        token.advance();
        assert!(!token.capture());
        assert!(token.is_captured());
    }
}
