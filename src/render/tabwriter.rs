// ABOUTME: Elastic-tabstop column aligner for table output.
// ABOUTME: Tab-terminated cells in consecutive lines form a column block padded to one width.

use unicode_width::UnicodeWidthStr;

/// Aligns tab-separated text into space-padded columns.
///
/// Every tab-terminated cell belongs to a column; a run of consecutive
/// lines that all have a cell in that column forms a block whose width is
/// `max(min_width, widest cell + padding)`. The last cell of a line is
/// never padded.
#[derive(Debug, Clone)]
pub struct TabWriter {
    min_width: usize,
    padding: usize,
    buffer: String,
}

impl Default for TabWriter {
    fn default() -> Self {
        Self::new(10, 3)
    }
}

impl TabWriter {
    pub fn new(min_width: usize, padding: usize) -> Self {
        Self {
            min_width,
            padding,
            buffer: String::new(),
        }
    }

    pub fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    /// Align everything written so far.
    pub fn finish(mut self) -> String {
        let text = std::mem::take(&mut self.buffer);
        let ends_with_newline = text.ends_with('\n');
        let body = text.strip_suffix('\n').unwrap_or(&text);
        if body.is_empty() && !ends_with_newline {
            return String::new();
        }

        let lines: Vec<Vec<&str>> = body.split('\n').map(|l| l.split('\t').collect()).collect();
        let mut out = String::with_capacity(text.len());
        let mut widths = Vec::new();
        self.format(&lines, &mut widths, 0, lines.len(), &mut out);
        if !ends_with_newline {
            out.pop();
        }
        out
    }

    fn format(
        &self,
        lines: &[Vec<&str>],
        widths: &mut Vec<usize>,
        mut line0: usize,
        line1: usize,
        out: &mut String,
    ) {
        let column = widths.len();
        let mut this = line0;
        while this < line1 {
            // Only lines with a terminated cell in this column open a block.
            if column + 1 >= lines[this].len() {
                this += 1;
                continue;
            }

            self.write_lines(lines, widths, line0, this, out);
            line0 = this;

            let mut width = self.min_width;
            while this < line1 && column + 1 < lines[this].len() {
                width = width.max(lines[this][column].width() + self.padding);
                this += 1;
            }

            widths.push(width);
            self.format(lines, widths, line0, this, out);
            widths.pop();
            line0 = this;
        }
        self.write_lines(lines, widths, line0, line1, out);
    }

    fn write_lines(
        &self,
        lines: &[Vec<&str>],
        widths: &[usize],
        line0: usize,
        line1: usize,
        out: &mut String,
    ) {
        for cells in &lines[line0..line1] {
            for (j, cell) in cells.iter().enumerate() {
                out.push_str(cell);
                if j + 1 < cells.len() {
                    let target = widths.get(j).copied().unwrap_or(0);
                    let fill = target.saturating_sub(cell.width());
                    out.extend(std::iter::repeat_n(' ', fill));
                }
            }
            out.push('\n');
        }
    }
}
