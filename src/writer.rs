pub struct WriterOptions {
    pub line_break: String,
    pub indent: String,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions {
            line_break: "\n".to_string(),
            indent: "  ".to_string(),
        }
    }
}

/// Line-oriented writer for query text. The first line is written without
/// indentation so a rendered field can be placed after its parent's
/// indentation; no line break follows the last line.
pub struct QueryWriter<'a> {
    options: &'a WriterOptions,
    indent_level: usize,
    content: String
}

impl<'a> QueryWriter<'a> {
    pub fn new(options: &'a WriterOptions, depth: usize) -> QueryWriter<'a> {
        QueryWriter {
            options,
            indent_level: depth,
            content: String::new()
        }
    }

    fn indent(&mut self) {
        self.indent_level += 1;
    }

    fn deindent(&mut self) {
        debug_assert!(self.indent_level > 0, "cannot deindent, indent level is already 0");
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    pub fn line(&mut self, code: &str) {
        if !self.content.is_empty() {
            self.content.push_str(&self.options.line_break);
            self.content.push_str(&self.options.indent.repeat(self.indent_level));
        }
        self.content.push_str(code);
    }

    pub fn begin_indent(&mut self, code: &str) {
        self.line(code);
        self.indent();
    }

    pub fn end_indent(&mut self, code: &str) {
        self.deindent();
        self.line(code);
    }

    pub fn build_string(self) -> String {
        self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nests_relative_to_starting_depth() {
        let options = WriterOptions::default();
        let mut writer = QueryWriter::new(&options, 1);
        writer.begin_indent("a {");
        writer.line("b");
        writer.end_indent("}");
        assert_eq!(writer.build_string(), "a {\n    b\n  }");
    }

    #[test]
    fn honours_custom_line_break_and_indent() {
        let options = WriterOptions { line_break: "\r\n".to_string(), indent: "\t".to_string() };
        let mut writer = QueryWriter::new(&options, 0);
        writer.begin_indent("x {");
        writer.line("y");
        writer.end_indent("}");
        assert_eq!(writer.build_string(), "x {\r\n\ty\r\n}");
    }
}
