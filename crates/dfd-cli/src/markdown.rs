//! Markdown snippet extraction.
//!
//! A markdown host document declares diagrams in fenced blocks:
//!
//! ````text
//! ```data-flow-diagram out.svg
//! process P Process
//! ```
//! ````
//!
//! Each block becomes a named [`Snippet`]; its name is the output file name
//! without extension. Snippets whose output starts with `#` are
//! include-only and produce no output file of their own.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use dfd_core::error::{BuildError, Diagnostic, ErrorKind};
use dfd_core::model::Snippet;

use crate::stem;

static RX_SNIPPET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^```\s*data-flow-diagram\s+(?P<output>.*?)\s*^(?P<src>.*?)^\s*```")
        .expect("snippet pattern is valid")
});

/// Extract every data-flow-diagram block of a markdown document.
pub fn extract_snippets(text: &str) -> Vec<Snippet> {
    RX_SNIPPET
        .captures_iter(text)
        .map(|caps| {
            let whole = caps.get(0).expect("capture 0 always exists");
            let output = caps["output"].to_string();
            Snippet {
                text: caps["src"].to_string(),
                name: stem(&output),
                output,
                line_nr: text[..whole.start()].lines().count(),
            }
        })
        .collect()
}

/// Reject duplicate snippet names.
pub fn check_snippets_unicity(provenance: &str, snippets: &[Snippet]) -> Result<(), BuildError> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for snippet in snippets {
        *counts.entry(snippet.name.as_str()).or_insert(0) += 1;
    }
    let mut multiples: Vec<&str> = counts
        .iter()
        .filter(|&(_, &n)| n > 1)
        .map(|(&name, _)| name)
        .collect();
    if multiples.is_empty() {
        return Ok(());
    }
    multiples.sort();
    Err(Diagnostic::new(
        ErrorKind::Syntax,
        format!(
            "{provenance}: Snippets defined multiple times: {}",
            multiples.join(", ")
        ),
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MD_OK: &str = "
Some text
```data-flow-diagram diagram1.svg
body 1
```

Some more text
```
data-flow-diagram diagram2.svg
body 2
```

Yet more text

```ruby
Baby
```
";

    #[test]
    fn test_extract_snippets_finds_dfd_blocks() {
        // only data-flow-diagram blocks are extracted; unrelated blocks ignored
        let snippets = extract_snippets(MD_OK);
        assert_eq!(snippets.len(), 2);

        assert_eq!(snippets[0].name, "diagram1");
        assert_eq!(snippets[0].output, "diagram1.svg");
        assert_eq!(snippets[0].text, "body 1\n");
        assert_eq!(snippets[0].line_nr, 2);

        assert_eq!(snippets[1].name, "diagram2");
        assert_eq!(snippets[1].output, "diagram2.svg");
        assert_eq!(snippets[1].text, "body 2\n");
        assert_eq!(snippets[1].line_nr, 7);
    }

    #[test]
    fn test_extract_snippets_none() {
        assert!(extract_snippets("# Just a title\n\nplain text\n").is_empty());
    }

    #[test]
    fn test_unicity_ok() {
        let snippets = extract_snippets(MD_OK);
        assert!(check_snippets_unicity("<test.md>", &snippets).is_ok());
    }

    #[test]
    fn test_unicity_rejects_duplicates() {
        let md = "\
```data-flow-diagram d.svg
process P
```
```data-flow-diagram d.svg
process Q
```
";
        let snippets = extract_snippets(md);
        let err = check_snippets_unicity("<test.md>", &snippets).unwrap_err();
        assert!(err.to_string().contains("multiple times"));
        assert!(err.to_string().contains('d'));
    }
}
