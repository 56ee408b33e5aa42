//! Arrow-shorthand desugaring.
//!
//! A line of the form `SRC <op> DST [LABEL]`, where `<op>` is one of the
//! arrow shapes below, is rewritten to the canonical tab-separated keyword
//! form before keyword dispatch:
//!
//! ```text
//! P --> Q data      =>      flow<TAB>P<TAB>Q<TAB>data
//! ```
//!
//! A `?` suffix on the operator selects the relaxed keyword form.

use winnow::Parser;
use winnow::error::{ContextError, ErrMode};
use winnow::token::take_while;

use crate::parser::split_limit;

/// Rewrite a sugared connection line to keyword form, or return `None` when
/// the line is not sugar.
pub(crate) fn apply_syntactic_sugars(line: &str) -> Option<String> {
    let terms: Vec<&str> = line.split_whitespace().collect();
    if terms.len() < 3 {
        return None;
    }

    let verb = arrow_keyword(terms[1])?;

    // [SRC, OP, DST, LABEL?] with the label keeping its internal spacing
    let parts = split_limit(line, 3);
    let mut array: Vec<&str> = vec![&verb, &parts[0], &parts[2]];
    if parts.len() > 3 {
        array.push(&parts[3]);
    }
    Some(array.join("\t"))
}

/// Match a full operator token against a shape parser.
fn matches<'s, P>(op: &'s str, parser: P) -> bool
where
    P: Parser<&'s str, (), ErrMode<ContextError>>,
{
    let mut parser = parser;
    parser.parse(op).is_ok()
}

/// Map an arrow operator to its canonical connection keyword.
///
/// Two match chains, mirroring the resolution order of the shorthand rules:
/// a match in the second chain wins over one from the first.
fn arrow_keyword(op: &str) -> Option<String> {
    let (bare, relaxed) = match op.strip_suffix('?') {
        Some(stripped) => (stripped, true),
        None => (op, false),
    };

    let dashes = || take_while(1.., '-');
    let colons = || take_while(1.., ':');

    let mut verb = if matches(bare, (dashes(), '>').void()) {
        Some("flow")
    } else if matches(bare, ('<', dashes()).void()) {
        Some("flow.r")
    } else {
        None
    };

    if matches(bare, (dashes(), ">>").void()) {
        verb = Some("cflow");
    } else if matches(bare, ("<<", dashes()).void()) {
        verb = Some("cflow.r");
    } else if matches(bare, ('<', dashes(), '>').void()) {
        verb = Some("bflow");
    } else if matches(bare, take_while(2.., '-').void()) {
        verb = Some("uflow");
    } else if matches(bare, (colons(), '>').void()) {
        verb = Some("signal");
    } else if matches(bare, ('<', colons()).void()) {
        verb = Some("signal.r");
    } else if bare == ">" {
        verb = Some("constraint");
    } else if bare == "<" {
        verb = Some("constraint.r");
    }

    let verb = verb?;
    if relaxed {
        // constraints have no relaxed form
        if verb.starts_with("constraint") {
            return None;
        }
        Some(format!("{verb}?"))
    } else {
        Some(verb.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_sugar() {
        assert_eq!(
            apply_syntactic_sugars("P --> Q data").as_deref(),
            Some("flow\tP\tQ\tdata")
        );
        assert_eq!(
            apply_syntactic_sugars("P -> Q").as_deref(),
            Some("flow\tP\tQ")
        );
        assert_eq!(
            apply_syntactic_sugars("P <-- Q data").as_deref(),
            Some("flow.r\tP\tQ\tdata")
        );
    }

    #[test]
    fn test_cflow_sugar_wins_over_flow() {
        assert_eq!(
            apply_syntactic_sugars("P -->> Q").as_deref(),
            Some("cflow\tP\tQ")
        );
        assert_eq!(
            apply_syntactic_sugars("P <<-- Q").as_deref(),
            Some("cflow.r\tP\tQ")
        );
    }

    #[test]
    fn test_bflow_uflow_sugar() {
        assert_eq!(
            apply_syntactic_sugars("P <--> Q cfg").as_deref(),
            Some("bflow\tP\tQ\tcfg")
        );
        assert_eq!(
            apply_syntactic_sugars("P -- Q").as_deref(),
            Some("uflow\tP\tQ")
        );
    }

    #[test]
    fn test_signal_sugar() {
        assert_eq!(
            apply_syntactic_sugars("P ::> Q ev").as_deref(),
            Some("signal\tP\tQ\tev")
        );
        assert_eq!(
            apply_syntactic_sugars("P <:: Q").as_deref(),
            Some("signal.r\tP\tQ")
        );
    }

    #[test]
    fn test_constraint_sugar() {
        assert_eq!(
            apply_syntactic_sugars("P > Q").as_deref(),
            Some("constraint\tP\tQ")
        );
        assert_eq!(
            apply_syntactic_sugars("P < Q").as_deref(),
            Some("constraint.r\tP\tQ")
        );
        // no relaxed constraint form
        assert_eq!(apply_syntactic_sugars("P >? Q"), None);
    }

    #[test]
    fn test_relaxed_suffix() {
        assert_eq!(
            apply_syntactic_sugars("P -->? Q").as_deref(),
            Some("flow?\tP\tQ")
        );
        assert_eq!(
            apply_syntactic_sugars("P <--? Q lbl").as_deref(),
            Some("flow.r?\tP\tQ\tlbl")
        );
        assert_eq!(
            apply_syntactic_sugars("P --? Q").as_deref(),
            Some("uflow?\tP\tQ")
        );
    }

    #[test]
    fn test_label_keeps_internal_spacing() {
        assert_eq!(
            apply_syntactic_sugars("P --> Q more  data").as_deref(),
            Some("flow\tP\tQ\tmore  data")
        );
    }

    #[test]
    fn test_not_sugar() {
        assert_eq!(apply_syntactic_sugars("process P Proc"), None);
        assert_eq!(apply_syntactic_sugars("P Q"), None);
        assert_eq!(apply_syntactic_sugars("flow P Q data"), None);
    }
}
