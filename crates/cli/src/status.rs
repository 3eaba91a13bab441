//! Single-line terminal status that overwrites itself.

use std::io::{self, Write};

/// Tracks what is currently drawn on the status line so the next update can
/// fully cover it.
#[derive(Debug, Default)]
pub struct StatusLine {
    /// Characters currently on the line; zero when nothing is drawn.
    drawn: usize,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.drawn > 0
    }

    /// Builds the bytes that replace the current line with `text`.
    pub fn frame(&mut self, text: &str) -> String {
        let width = text.chars().count();
        let padding = self.drawn.saturating_sub(width);
        self.drawn = width;
        format!("\r{}{}", text, " ".repeat(padding))
    }

    /// Redraws the line in place.
    pub fn update<W: Write>(&mut self, out: &mut W, text: &str) -> io::Result<()> {
        let frame = self.frame(text);
        out.write_all(frame.as_bytes())?;
        out.flush()
    }

    /// Ends the status line so regular output starts on a fresh line.
    pub fn finish<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if self.is_active() {
            self.drawn = 0;
            out.write_all(b"\n")?;
            out.flush()?;
        }
        Ok(())
    }

    /// Prints a full line, moving past the status line first.
    pub fn println<W: Write>(&mut self, out: &mut W, text: &str) -> io::Result<()> {
        self.finish(out)?;
        writeln!(out, "{}", text)?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_pads_over_longer_previous_text() {
        let mut line = StatusLine::new();
        assert_eq!(line.frame("12345"), "\r12345");
        assert_eq!(line.frame("ab"), "\rab   ");
        assert_eq!(line.frame("abcdef"), "\rabcdef");
    }

    #[test]
    fn test_finish_only_breaks_active_line() {
        let mut line = StatusLine::new();
        let mut out = Vec::new();

        line.finish(&mut out).unwrap();
        assert!(out.is_empty());

        line.update(&mut out, "[#1 50%]").unwrap();
        line.finish(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\r[#1 50%]\n");
        assert!(!line.is_active());
    }

    #[test]
    fn test_println_after_status() {
        let mut line = StatusLine::new();
        let mut out = Vec::new();

        line.update(&mut out, "progress").unwrap();
        line.println(&mut out, "Archiving...").unwrap();
        line.update(&mut out, "next").unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\rprogress\nArchiving...\n\rnext"
        );
    }
}
