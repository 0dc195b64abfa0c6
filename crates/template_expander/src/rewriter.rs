//! Run text rewriter

use crate::substitution::RuleSet;
use std::borrow::Cow;

/// Apply every rule to `text`, in order
///
/// Each rule replaces all non-overlapping matches in the text produced by
/// the previous rule. In a replacement `$1` or `${name}` insert a capture
/// group and `$$` a literal dollar sign; everything else, newlines
/// included, is copied as is. Returns the input borrowed when no rule
/// matched.
pub fn rewrite<'a>(text: &'a str, rules: &RuleSet) -> Cow<'a, str> {
    let mut current = Cow::Borrowed(text);
    for rule in rules {
        let replaced = match rule.regex().replace_all(&current, rule.replacement()) {
            Cow::Borrowed(_) => continue,
            Cow::Owned(replaced) => replaced,
        };
        current = Cow::Owned(replaced);
    }
    current
}
