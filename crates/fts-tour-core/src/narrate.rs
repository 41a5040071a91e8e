//! Console narration for the walkthroughs.

use crate::store::SearchResult;
use crate::Result;
use std::io::Write;

/// Writes the human-readable side of a walkthrough.
pub struct Narrator<W: Write> {
    out: W,
}

impl<W: Write> Narrator<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Top-level section heading.
    pub fn title(&mut self, text: &str) -> Result<()> {
        let rule = "=".repeat(text.chars().count());
        writeln!(self.out)?;
        writeln!(self.out, "{}", rule)?;
        writeln!(self.out, "{}", text.to_uppercase())?;
        writeln!(self.out, "{}", rule)?;
        Ok(())
    }

    pub fn subtitle(&mut self, text: &str) -> Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "--- {} ---", text)?;
        Ok(())
    }

    /// A short remark about the step being shown.
    pub fn explain(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, ">> {}", text)?;
        Ok(())
    }

    pub fn text(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{}", text.trim_matches('\n'))?;
        Ok(())
    }

    /// An SQL statement, indented so it stands out from prose.
    pub fn sql(&mut self, sql: &str) -> Result<()> {
        writeln!(self.out)?;
        for line in sql.trim().lines() {
            writeln!(self.out, "    {}", line)?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    /// Rows of a search result, or a note when there are none.
    pub fn rows(&mut self, result: &SearchResult) -> Result<()> {
        if result.rows.is_empty() {
            writeln!(self.out, "  (no rows)")?;
        }
        for row in &result.rows {
            writeln!(self.out, "  - {}", row)?;
        }
        writeln!(
            self.out,
            "  {} row(s) for [{}] in {:.3} ms",
            result.total_count, result.query, result.query_time_ms
        )?;
        Ok(())
    }

    pub fn done(&mut self) -> Result<()> {
        writeln!(self.out, "Done!")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
