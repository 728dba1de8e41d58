use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Response body of `/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<String>,
    #[serde(default)]
    pub limited: bool,
}

/// One structured match parsed from the wire format
/// `"<file_path>:<line_number>:<content>"`. Only the first two colons are
/// structural; content may contain further colons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResultLine {
    pub file_path: String,
    pub line_number: u64,
    pub content: String,
}

fn result_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([^:]+):(\d+):(.*)$").expect("valid result line regex"))
}

/// Parse a raw match line. Returns `None` for lines that do not carry a
/// colon-delimited numeric second field; callers keep those as raw-text
/// fallback rows with no file/line identity.
pub fn parse_result_line(line: &str) -> Option<SearchResultLine> {
    let caps = result_line_regex().captures(line)?;
    let line_number: u64 = caps[2].parse().ok()?;
    Some(SearchResultLine {
        file_path: caps[1].to_string(),
        line_number,
        content: caps[3].to_string(),
    })
}

/// One line of surrounding file context returned by `/file-content`.
/// Exactly one line in a response carries `is_match`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextLine {
    pub line_number: u64,
    pub content: String,
    #[serde(default)]
    pub is_match: bool,
}

/// Response body of `/file-content`. The file type is kept as the raw
/// server string so unknown types still show up in the badge; rendering
/// decisions go through [`FileContext::kind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContext {
    pub file_type: String,
    pub context: Vec<ContextLine>,
}

impl FileContext {
    pub fn kind(&self) -> FileKind {
        FileKind::from_name(&self.file_type)
    }

    /// Index of the originally matched line within `context`.
    pub fn match_index(&self) -> Option<usize> {
        self.context.iter().position(|line| line.is_match)
    }

    /// The context joined back into a single text block, as fed to the
    /// markdown renderer.
    pub fn joined_content(&self) -> String {
        let lines: Vec<&str> = self.context.iter().map(|l| l.content.as_str()).collect();
        lines.join("\n")
    }
}

/// File types the server reports for `/file-content` responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    C,
    Cpp,
    Python,
    Javascript,
    Html,
    Css,
    Json,
    Markdown,
    Text,
    Other,
}

impl FileKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "c" => FileKind::C,
            "cpp" => FileKind::Cpp,
            "python" => FileKind::Python,
            "javascript" => FileKind::Javascript,
            "html" => FileKind::Html,
            "css" => FileKind::Css,
            "json" => FileKind::Json,
            "markdown" => FileKind::Markdown,
            "text" => FileKind::Text,
            _ => FileKind::Other,
        }
    }

    /// Token handed to the syntax highlighter. Unknown types fall back to
    /// plain text.
    pub fn highlight_token(&self) -> Option<&'static str> {
        match self {
            FileKind::C => Some("c"),
            FileKind::Cpp => Some("cpp"),
            FileKind::Python => Some("py"),
            FileKind::Javascript => Some("js"),
            FileKind::Html => Some("html"),
            FileKind::Css => Some("css"),
            FileKind::Json => Some("json"),
            FileKind::Markdown => Some("md"),
            FileKind::Text | FileKind::Other => None,
        }
    }

    /// Call-hierarchy lookup is only offered for C/C++ context views.
    pub fn supports_call_hierarchy(&self) -> bool {
        matches!(self, FileKind::C | FileKind::Cpp)
    }
}

/// One node of the recursive caller tree returned by `/call-hierarchy`.
/// The tree arrives already depth-limited by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallHierarchyNode {
    pub caller_function: String,
    pub file_path: String,
    pub line_number: u64,
    #[serde(default)]
    pub is_recursive: bool,
    #[serde(default)]
    pub callers: Vec<CallHierarchyNode>,
}

/// Response body of `/call-hierarchy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallHierarchy {
    pub function_name: String,
    #[serde(default)]
    pub total_callers: u64,
    #[serde(default)]
    pub callers: Vec<CallHierarchyNode>,
}

impl CallHierarchy {
    /// Total number of nodes in the tree, counting the target function as
    /// the root.
    pub fn total_nodes(&self) -> usize {
        fn count(nodes: &[CallHierarchyNode]) -> usize {
            nodes.iter().map(|n| 1 + count(&n.callers)).sum()
        }
        1 + count(&self.callers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_result_line_recovers_fields() {
        let parsed = parse_result_line("src/main.c:42:int main(void) {").unwrap();
        assert_eq!(parsed.file_path, "src/main.c");
        assert_eq!(parsed.line_number, 42);
        assert_eq!(parsed.content, "int main(void) {");
    }

    #[test]
    fn test_parse_result_line_keeps_trailing_colons() {
        let parsed = parse_result_line("a.c:10:// TODO: fix this").unwrap();
        assert_eq!(parsed.file_path, "a.c");
        assert_eq!(parsed.line_number, 10);
        assert_eq!(parsed.content, "// TODO: fix this");
    }

    #[test]
    fn test_parse_result_line_empty_content() {
        let parsed = parse_result_line("b.c:3:").unwrap();
        assert_eq!(parsed.content, "");
    }

    #[test]
    fn test_parse_result_line_rejects_malformed() {
        assert!(parse_result_line("no separators here").is_none());
        assert!(parse_result_line("file.c:notanumber:content").is_none());
        assert!(parse_result_line(":12:missing path").is_none());
        assert!(parse_result_line("").is_none());
    }

    #[test]
    fn test_file_kind_mapping() {
        assert_eq!(FileKind::from_name("cpp"), FileKind::Cpp);
        assert_eq!(FileKind::from_name("markdown"), FileKind::Markdown);
        assert_eq!(FileKind::from_name("rust"), FileKind::Other);
        assert_eq!(FileKind::from_name("text").highlight_token(), None);
        assert_eq!(FileKind::from_name("python").highlight_token(), Some("py"));
    }

    #[test]
    fn test_call_hierarchy_only_for_c_family() {
        assert!(FileKind::C.supports_call_hierarchy());
        assert!(FileKind::Cpp.supports_call_hierarchy());
        assert!(!FileKind::Python.supports_call_hierarchy());
        assert!(!FileKind::Markdown.supports_call_hierarchy());
    }

    #[test]
    fn test_total_nodes_counts_recursively() {
        let leaf = CallHierarchyNode {
            caller_function: "leaf".into(),
            file_path: "a.c".into(),
            line_number: 1,
            is_recursive: false,
            callers: Vec::new(),
        };
        let mid = CallHierarchyNode {
            caller_function: "mid".into(),
            file_path: "b.c".into(),
            line_number: 2,
            is_recursive: false,
            callers: vec![leaf.clone(), leaf.clone()],
        };
        let hierarchy = CallHierarchy {
            function_name: "target".into(),
            total_callers: 2,
            callers: vec![mid, leaf],
        };
        // root + mid + 2 leaves under mid + 1 top-level leaf
        assert_eq!(hierarchy.total_nodes(), 5);
    }

    #[test]
    fn test_file_context_match_index() {
        let ctx = FileContext {
            file_type: "c".into(),
            context: vec![
                ContextLine {
                    line_number: 9,
                    content: "a".into(),
                    is_match: false,
                },
                ContextLine {
                    line_number: 10,
                    content: "b".into(),
                    is_match: true,
                },
                ContextLine {
                    line_number: 11,
                    content: "c".into(),
                    is_match: false,
                },
            ],
        };
        assert_eq!(ctx.match_index(), Some(1));
        assert_eq!(ctx.joined_content(), "a\nb\nc");
    }
}
