//! Source checks on how taps are wired between `actions.rs`, `render.rs`
//! and the dispatcher in `terminal/mod.rs`.
//!
//! Phones have no keyboard, so every action the dispatcher understands must
//! have a target drawn for it, and every `[X]` key hint shown on screen must
//! sit inside a `push_clickable(..)` call rather than a plain `push(..)`.

use std::fs;
use std::path::Path;

fn read_src(rel: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("src").join(rel);
    let source = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    non_test_code(&source)
}

/// Source with the unit-test module and line comments removed.
fn non_test_code(source: &str) -> String {
    let body = source.split("#[cfg(test)]").next().unwrap_or("");
    body.lines()
        .filter(|l| !l.trim_start().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Names of the `pub const NAME: u16` action IDs.
fn action_names(source: &str) -> Vec<String> {
    source
        .lines()
        .filter_map(|l| l.trim().strip_prefix("pub const "))
        .filter_map(|rest| rest.split_once(':'))
        .filter(|(_, ty)| ty.trim_start().starts_with("u16"))
        .map(|(name, _)| name.trim().to_string())
        .collect()
}

/// `name` used as a whole identifier somewhere in `source`.
fn mentions(source: &str, name: &str) -> bool {
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_';
    source.match_indices(name).any(|(at, _)| {
        let before = source[..at].chars().next_back();
        let after = source[at + name.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}

/// Argument text of every call to `callee`, with the 1-based line it starts on.
/// Parentheses inside string literals are skipped, so multi-line calls with
/// styled spans come back whole.
fn call_arguments(source: &str, callee: &str) -> Vec<(usize, String)> {
    let mut calls = Vec::new();
    for (at, _) in source.match_indices(callee) {
        let open = at + callee.len();
        let mut depth = 1;
        let mut in_string = false;
        let mut escaped = false;
        let mut end = None;
        for (i, c) in source[open..].char_indices() {
            if in_string {
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match c {
                '"' => in_string = true,
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(open + i);
                        break;
                    }
                }
                _ => {}
            }
        }
        if let Some(end) = end {
            let line = source[..at].matches('\n').count() + 1;
            calls.push((line, source[open..end].to_string()));
        }
    }
    calls
}

/// A rendered key hint: `[M]`, `[1]`, or a formatted `[{}]`.
fn has_key_hint(text: &str) -> bool {
    if text.contains("[{}]") {
        return true;
    }
    text.as_bytes()
        .windows(3)
        .any(|w| w[0] == b'[' && w[1].is_ascii_alphanumeric() && w[2] == b']')
}

#[test]
fn every_action_has_a_drawn_target() {
    let actions = action_names(&read_src("terminal/actions.rs"));
    let render = read_src("terminal/render.rs");
    assert!(!actions.is_empty(), "no action IDs found in actions.rs");

    let missing: Vec<_> = actions.iter().filter(|a| !mentions(&render, a)).collect();
    assert!(
        missing.is_empty(),
        "actions with no tap target in render.rs: {missing:?}"
    );
}

#[test]
fn every_action_is_dispatched() {
    let actions = action_names(&read_src("terminal/actions.rs"));
    let dispatcher = read_src("terminal/mod.rs");

    let missing: Vec<_> = actions
        .iter()
        .filter(|a| !mentions(&dispatcher, a))
        .collect();
    assert!(
        missing.is_empty(),
        "actions drawn but never handled by TerminalApp: {missing:?}"
    );
}

#[test]
fn key_hints_are_tappable() {
    let render = read_src("terminal/render.rs");

    let plain: Vec<_> = call_arguments(&render, ".push(")
        .into_iter()
        .filter(|(_, args)| has_key_hint(args))
        .collect();
    assert!(
        plain.is_empty(),
        "key hints drawn through push() cannot be tapped, use push_clickable():\n{}",
        plain
            .iter()
            .map(|(line, args)| format!("  render.rs:{line}: {}", args.trim()))
            .collect::<Vec<_>>()
            .join("\n")
    );

    let clickable = call_arguments(&render, ".push_clickable(")
        .into_iter()
        .filter(|(_, args)| has_key_hint(args))
        .count();
    assert!(clickable >= 2, "expected the mine and shop hints to be clickable");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_u16_action_names_only() {
        let src = "pub const MINE: u16 = 0;\n// pub const OLD: u16 = 1;\npub const LABEL: &str = \"x\";\n  pub const TAB_SHOP: u16 = 12;";
        assert_eq!(action_names(&non_test_code(src)), ["MINE", "TAB_SHOP"]);
    }

    #[test]
    fn mentions_whole_identifiers() {
        assert!(mentions("add_click_target(area, MINE);", "MINE"));
        assert!(!mentions("MINE_ENERGY_COST", "MINE"));
        assert!(!mentions("TAB_MINER", "MINE"));
        assert!(mentions("BUY_ITEM_BASE + i as u16", "BUY_ITEM_BASE"));
    }

    #[test]
    fn call_arguments_span_lines_and_strings() {
        let src = "cl.push(Line::from(\"a)\"));\ncl.push_clickable(\n    Line::from(vec![\n        Span::raw(\" [M] \"),\n    ]),\n    MINE,\n);";
        let plain = call_arguments(src, ".push(");
        assert_eq!(plain.len(), 1);
        assert_eq!(plain[0], (1, "Line::from(\"a)\")".to_string()));

        let clickable = call_arguments(src, ".push_clickable(");
        assert_eq!(clickable.len(), 1);
        assert_eq!(clickable[0].0, 2);
        assert!(clickable[0].1.contains("[M]"));
        assert!(clickable[0].1.trim_end().ends_with("MINE,"));
    }

    #[test]
    fn key_hint_shapes() {
        assert!(has_key_hint("\" [M] \""));
        assert!(has_key_hint("format!(\" [{}] \", key)"));
        assert!(has_key_hint("[2]"));
        assert!(!has_key_hint("vec![Span::raw(\"x\")]"));
        assert!(!has_key_hint("[ok]"));
        assert!(!has_key_hint("SHOP"));
    }

    #[test]
    fn test_module_is_dropped() {
        let src = "fn a() {}\n#[cfg(test)]\nmod tests { const MINE: u16 = 0; }";
        assert!(!non_test_code(src).contains("MINE"));
    }
}
