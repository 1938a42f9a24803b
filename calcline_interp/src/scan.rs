//! Finds the annotated lines in a document.
//!
//! A line is annotated when, after skipping leading whitespace, it opens
//! with `#`, `//`, or a block comment (`/*`), and somewhere on the line
//! there is a `|` sigil. The substring after the first `|` is the
//! expression text for that line. Once a block comment is open, its
//! interior lines need no leading marker of their own — the sigil alone
//! is enough, matching the "code doesn't evaluate" guarantee for any `|`
//! that isn't inside a comment.

/// One line identified as carrying an expression to evaluate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotatedLine<'a> {
    /// Zero-based index of this line within the document.
    pub line_index: u32,
    /// The full, unmodified source line (no trailing newline).
    pub line_text: &'a str,
    /// The trimmed expression text found after the first `|`.
    pub expression: &'a str,
    /// Byte offset of `expression` within `line_text`, for translating
    /// expression-local diagnostic offsets back to full-line offsets.
    pub expression_offset: u32,
}

/// Walk `text` line by line, yielding every [`AnnotatedLine`].
///
/// A missing block-comment closer is not an error: the block is simply
/// treated as open through end-of-document, so scanning never loops.
pub fn scan(text: &str) -> Vec<AnnotatedLine<'_>> {
    let mut out = Vec::new();
    let mut in_block = false;

    for (line_index, line_text) in text.lines().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        let line_index = line_index as u32;
        let trimmed_start = line_text.len() - line_text.trim_start().len();
        let after_leading_space = &line_text[trimmed_start..];

        let opens_here = !in_block
            && (after_leading_space.starts_with('#')
                || after_leading_space.starts_with("//")
                || after_leading_space.starts_with("/*"));

        if after_leading_space.starts_with("/*") {
            in_block = true;
        }

        if in_block || opens_here {
            if let Some(pipe_pos) = line_text.find('|') {
                let expr_start = pipe_pos + 1;
                let raw = &line_text[expr_start..];
                let trimmed_len = raw.trim().len();
                let lead = raw.len() - raw.trim_start().len();
                let expression = &raw[lead..lead + trimmed_len];
                #[allow(clippy::cast_possible_truncation)]
                let expression_offset = (expr_start + lead) as u32;
                out.push(AnnotatedLine {
                    line_index,
                    line_text,
                    expression,
                    expression_offset,
                });
            }
        }

        if in_block && line_text.contains("*/") {
            in_block = false;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::scan;
    use pretty_assertions::assert_eq;

    #[test]
    fn hash_pipe_line_is_annotated() {
        let found = scan("#| 1 + 2\nconst x = 1;");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].expression, "1 + 2");
        assert_eq!(found[0].line_index, 0);
    }

    #[test]
    fn double_slash_pipe_line_is_annotated() {
        let found = scan("let y = 2;\n// | a = 5");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line_index, 1);
        assert_eq!(found[0].expression, "a = 5");
    }

    #[test]
    fn a_pipe_outside_a_comment_is_not_annotated() {
        let found = scan("let x = a | b;");
        assert!(found.is_empty());
    }

    #[test]
    fn a_block_comment_evaluates_every_piped_interior_line() {
        let found = scan("/* intro\n| 1 + 1\nsome text\n| 2 + 2\n*/\ncode();");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].expression, "1 + 1");
        assert_eq!(found[1].expression, "2 + 2");
    }

    #[test]
    fn a_block_comment_opening_line_can_itself_carry_a_pipe() {
        let found = scan("/* | 3 + 3 */");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].expression, "3 + 3");
    }

    #[test]
    fn an_unterminated_block_comment_does_not_loop_forever() {
        let found = scan("/* opens\n| 1 + 1\nnever closes");
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn expression_offset_points_at_the_trimmed_text() {
        let found = scan("#|   42  ");
        assert_eq!(found[0].expression, "42");
        let offset = found[0].expression_offset as usize;
        assert_eq!(&found[0].line_text[offset..offset + 2], "42");
    }
}
