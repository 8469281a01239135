//! Parsing of Tesseract's TSV page output into scored text lines.
//!
//! Each TSV row is `level page block par line word left top width height conf text`.
//! Only word rows (level 5) with a non-negative confidence and non-blank text are
//! kept; they are grouped into lines by `(block, par, line)` in reading order.

use super::types::{Quad, WordResult};

const WORD_LEVEL: u32 = 5;
const COLUMNS: usize = 12;

#[derive(Debug, Clone, PartialEq)]
pub struct TsvWord {
    pub block: u32,
    pub par: u32,
    pub line: u32,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    /// Tesseract confidence, `0..=100`.
    pub conf: f32,
    pub text: String,
}

impl TsvWord {
    fn line_key(&self) -> (u32, u32, u32) {
        (self.block, self.par, self.line)
    }

    pub fn quad(&self) -> Quad {
        Quad::from_rect(self.left, self.top, self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub bbox: Quad,
    /// Mean word confidence scaled to `0..=1`.
    pub score: f32,
    pub words: Vec<WordResult>,
}

fn parse_row(row: &str) -> Option<TsvWord> {
    let cols: Vec<&str> = row.splitn(COLUMNS, '\t').collect();
    if cols.len() < COLUMNS {
        return None;
    }

    let level: u32 = cols[0].trim().parse().ok()?;
    if level != WORD_LEVEL {
        return None;
    }

    let conf: f32 = cols[10].trim().parse().ok()?;
    let text = cols[11].trim();
    if conf < 0.0 || text.is_empty() {
        return None;
    }

    Some(TsvWord {
        block: cols[2].trim().parse().ok()?,
        par: cols[3].trim().parse().ok()?,
        line: cols[4].trim().parse().ok()?,
        left: cols[6].trim().parse().ok()?,
        top: cols[7].trim().parse().ok()?,
        width: cols[8].trim().parse().ok()?,
        height: cols[9].trim().parse().ok()?,
        conf,
        text: text.to_string(),
    })
}

/// Word rows of a TSV page; headers and structural rows are skipped.
pub fn parse_words(tsv: &str) -> Vec<TsvWord> {
    tsv.lines().filter_map(parse_row).collect()
}

/// Group words into lines, preserving the order Tesseract emitted them in.
pub fn group_lines(words: Vec<TsvWord>) -> Vec<TextLine> {
    let mut grouped: Vec<((u32, u32, u32), Vec<TsvWord>)> = Vec::new();
    for word in words {
        let key = word.line_key();
        match grouped.last_mut() {
            Some((last_key, line)) if *last_key == key => line.push(word),
            _ => grouped.push((key, vec![word])),
        }
    }

    grouped
        .into_iter()
        .filter_map(|(_, words)| {
            let first = words.first()?.quad();
            let bbox = words.iter().skip(1).fold(first, |acc, w| acc.union(&w.quad()));
            let score = words.iter().map(|w| w.conf).sum::<f32>() / words.len() as f32 / 100.0;
            let text = words
                .iter()
                .map(|w| w.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            let words = words
                .iter()
                .map(|w| WordResult {
                    text: w.text.clone(),
                    score: w.conf / 100.0,
                    bbox: w.quad(),
                })
                .collect();

            Some(TextLine {
                text,
                bbox,
                score,
                words,
            })
        })
        .collect()
}

/// Mean word confidence of a page scaled to `0..=1`; zero when no words.
pub fn mean_confidence(words: &[TsvWord]) -> f32 {
    if words.is_empty() {
        return 0.0;
    }
    words.iter().map(|w| w.conf).sum::<f32>() / words.len() as f32 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t200\t100\t-1\t
2\t1\t1\t0\t0\t0\t10\t10\t180\t60\t-1\t
3\t1\t1\t1\t0\t0\t10\t10\t180\t60\t-1\t
4\t1\t1\t1\t1\t0\t10\t10\t120\t20\t-1\t
5\t1\t1\t1\t1\t1\t10\t10\t50\t20\t96.5\tHello
5\t1\t1\t1\t1\t2\t70\t12\t60\t18\t90.5\tworld
4\t1\t1\t1\t2\t0\t10\t50\t40\t20\t-1\t
5\t1\t1\t1\t2\t1\t10\t50\t40\t20\t80\tAB12
5\t1\t1\t1\t2\t2\t60\t50\t10\t20\t0\t ";

    #[test]
    fn test_parse_words_keeps_only_scored_words() {
        let words = parse_words(SAMPLE);
        assert_eq!(words.len(), 3);
        assert_eq!(words[0].text, "Hello");
        assert_eq!(words[0].conf, 96.5);
        assert_eq!(words[2].text, "AB12");
        assert_eq!(words[2].line, 2);
    }

    #[test]
    fn test_group_lines() {
        let lines = group_lines(parse_words(SAMPLE));
        assert_eq!(lines.len(), 2);

        assert_eq!(lines[0].text, "Hello world");
        assert_eq!(lines[0].bbox, Quad::from_rect(10.0, 10.0, 120.0, 20.0));
        assert!((lines[0].score - 0.935).abs() < 1e-4);
        assert_eq!(lines[0].words.len(), 2);
        assert_eq!(lines[0].words[1].text, "world");

        assert_eq!(lines[1].text, "AB12");
        assert!((lines[1].score - 0.8).abs() < 1e-4);
    }

    #[test]
    fn test_same_line_number_in_other_block_is_new_line() {
        let tsv = "5\t1\t1\t1\t1\t1\t0\t0\t10\t10\t90\tA\n5\t1\t2\t1\t1\t1\t0\t40\t10\t10\t90\tB";
        let lines = group_lines(parse_words(tsv));
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_malformed_rows_are_ignored() {
        let tsv = "5\t1\t1\n5\t1\tx\t1\t1\t1\t0\t0\t10\t10\t90\tA\nnot a row";
        assert!(parse_words(tsv).is_empty());
    }

    #[test]
    fn test_mean_confidence() {
        assert_eq!(mean_confidence(&[]), 0.0);
        let words = parse_words(SAMPLE);
        assert!((mean_confidence(&words) - 0.89).abs() < 1e-4);
    }
}
