/// Turns a binary name such as `java.util.Map$Entry` into the dotted form
/// used in source text (`java.util.Map.Entry`).
pub fn source_name(qualified_name: &str) -> String {
    qualified_name.replace('$', ".")
}

/// The unqualified name of a type, keeping the enclosing type of nested
/// types (`java.util.Map$Entry` becomes `Map.Entry`).
pub fn simple_name(qualified_name: &str) -> String {
    let top = qualified_name.rsplit('.').next().unwrap_or(qualified_name);
    source_name(top)
}

/// Splits comment text into lines with the common leading indentation
/// removed, so the assembler can re-indent them to the current nesting level.
/// Leading and trailing blank lines are dropped.
pub fn comment_lines(text: &str) -> Vec<&str> {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !l.is_empty()).map_or(start, |i| i + 1);
    let lines = &lines[start..end];

    let margin = lines
        .iter()
        .filter(|l| !l.is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|l| l.get(margin..).unwrap_or_else(|| l.trim_start()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_name() {
        assert_eq!(simple_name("java.lang.String"), "String");
        assert_eq!(simple_name("Local"), "Local");
        assert_eq!(simple_name("a.b.Outer$Inner"), "Outer.Inner");
    }

    #[test]
    fn test_comment_lines_strip_common_margin() {
        let text = "\n    first\n      second\n\n    third\n";
        assert_eq!(comment_lines(text), vec!["first", "  second", "", "third"]);
    }

    #[test]
    fn test_comment_lines_empty() {
        assert!(comment_lines("").is_empty());
        assert!(comment_lines("\n  \n").is_empty());
    }
}
