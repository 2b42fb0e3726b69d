//! Braille loading spinner.

use std::time::Duration;

/// Animation frames, in order.
pub const FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Time between frames.
pub const INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Spinner {
    frame: usize,
}

impl Spinner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step to the next frame, wrapping after the last.
    pub fn advance(&mut self) {
        self.frame = (self.frame + 1) % FRAMES.len();
    }

    pub fn current(&self) -> char {
        FRAMES[self.frame]
    }

    pub fn frame_index(&self) -> usize {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_wraps() {
        let mut spinner = Spinner::new();
        assert_eq!(spinner.current(), '⠋');
        for _ in 0..FRAMES.len() {
            spinner.advance();
        }
        assert_eq!(spinner.frame_index(), 0);
        spinner.advance();
        assert_eq!(spinner.current(), '⠙');
    }
}
