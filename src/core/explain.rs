//! Plain-English and HTML pattern explanations.
//!
//! `Explainer` walks the AST bottom-up, producing one short clause per
//! node (`"the literal \"foo\""`, `"one or more of: a digit"`) and
//! composing children into a parent clause. `explain_prose` joins the
//! top-level clause into a sentence; `explain_html` wraps each clause in
//! a `<span>` tagged with its node kind so a caller can style it.

use crate::core::ast::*;

struct Explainer {
    html: bool,
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl Explainer {
    fn wrap(&self, class: &str, text: String) -> String {
        if self.html {
            format!("<span class=\"pcrelab-{}\">{}</span>", class, html_escape(&text))
        } else {
            text
        }
    }

    fn quote(&self, s: &str) -> String {
        if self.html {
            format!("\"{}\"", html_escape(s))
        } else {
            format!("\"{}\"", s)
        }
    }
}

fn char_type_description(letter: char) -> &'static str {
    match letter {
        'd' => "a digit",
        'D' => "a non-digit",
        'w' => "a word character",
        'W' => "a non-word character",
        's' => "whitespace",
        'S' => "non-whitespace",
        'h' => "horizontal whitespace",
        'H' => "non horizontal-whitespace",
        'v' => "vertical whitespace",
        'V' => "non vertical-whitespace",
        'R' => "any line ending",
        'X' => "a full grapheme cluster",
        'C' => "a single byte",
        'N' => "any character except newline",
        _ => "a special character class",
    }
}

fn quantifier_description(q: &Quantifier) -> String {
    let base = match (q.min, q.max) {
        (0, None) => "zero or more of".to_string(),
        (1, None) => "one or more of".to_string(),
        (0, Some(1)) => "an optional".to_string(),
        (n, None) => format!("{} or more of", n),
        (n, Some(m)) if n == m => format!("exactly {} of", n),
        (n, Some(m)) => format!("between {} and {} of", n, m),
    };
    let style = match q.style {
        QuantifierStyle::Greedy => "",
        QuantifierStyle::Lazy => " (lazy, shortest match first)",
        QuantifierStyle::Possessive => " (possessive, never gives back)",
    };
    format!("{}{}", base, style)
}

fn group_prefix(g: &Group) -> String {
    match g.kind {
        GroupKind::Capturing => "capturing group".to_string(),
        GroupKind::Named => format!(
            "capturing group named \"{}\"",
            g.name.as_deref().unwrap_or("")
        ),
        GroupKind::NonCapturing => "non-capturing group".to_string(),
        GroupKind::Atomic => "atomic group".to_string(),
        GroupKind::BranchReset => "branch-reset group".to_string(),
        GroupKind::LookaheadPositive => "positive lookahead".to_string(),
        GroupKind::LookaheadNegative => "negative lookahead".to_string(),
        GroupKind::LookbehindPositive => "positive lookbehind".to_string(),
        GroupKind::LookbehindNegative => "negative lookbehind".to_string(),
        GroupKind::InlineFlags => "inline flag modifier".to_string(),
        GroupKind::ScriptRun => "script run".to_string(),
        GroupKind::AtomicScriptRun => "atomic script run".to_string(),
    }
}

impl Visitor for Explainer {
    type Output = String;

    fn visit_regex(&mut self, n: &Regex) -> String {
        self.visit(&n.body)
    }

    fn visit_sequence(&mut self, n: &Sequence) -> String {
        if n.children.is_empty() {
            return self.wrap("sequence", "an empty match".to_string());
        }
        let parts: Vec<String> = n.children.iter().map(|c| self.visit(c)).collect();
        self.wrap("sequence", format!("the sequence: {}", parts.join(", then ")))
    }

    fn visit_alternation(&mut self, n: &Alternation) -> String {
        let parts: Vec<String> = n.branches.iter().map(|c| self.visit(c)).collect();
        self.wrap("alternation", format!("either {}", parts.join(", or ")))
    }

    fn visit_literal(&mut self, n: &Literal) -> String {
        self.wrap("literal", format!("the text {}", self.quote(&n.value)))
    }

    fn visit_char_literal(&mut self, n: &CharLiteral) -> String {
        self.wrap(
            "char-literal",
            format!("the character {}", self.quote(&n.raw)),
        )
    }

    fn visit_dot(&mut self, _n: &Dot) -> String {
        self.wrap("dot", "any character".to_string())
    }

    fn visit_anchor(&mut self, n: &Anchor) -> String {
        let text = match n.kind {
            AnchorKind::StartOfLine => "the start of the line",
            AnchorKind::EndOfLine => "the end of the line",
            AnchorKind::AbsoluteStart => "the absolute start of the subject",
            AnchorKind::AbsoluteEnd => "the absolute end of the subject",
            AnchorKind::EndBeforeFinalNewline => "the end of the subject (before a trailing newline)",
            AnchorKind::PreviousMatchEnd => "the end of the previous match",
        };
        self.wrap("anchor", text.to_string())
    }

    fn visit_assertion(&mut self, n: &Assertion) -> String {
        let text = match n.kind {
            AssertionKind::WordBoundary => "a word boundary",
            AssertionKind::NotWordBoundary => "a position that is not a word boundary",
        };
        self.wrap("assertion", text.to_string())
    }

    fn visit_keep(&mut self, _n: &Keep) -> String {
        self.wrap("keep", "a match-start reset point (\\K)".to_string())
    }

    fn visit_char_type(&mut self, n: &CharType) -> String {
        self.wrap("char-type", char_type_description(n.letter).to_string())
    }

    fn visit_unicode_prop(&mut self, n: &UnicodeProp) -> String {
        let text = if n.negated {
            format!("any character not in the Unicode property {}", n.name)
        } else {
            format!("a character with the Unicode property {}", n.name)
        };
        self.wrap("unicode-prop", text)
    }

    fn visit_char_class(&mut self, n: &CharClass) -> String {
        let inner = self.visit(&n.inner);
        let text = if n.negated {
            format!("any character except: {}", inner)
        } else {
            format!("one of: {}", inner)
        };
        self.wrap("char-class", text)
    }

    fn visit_range(&mut self, n: &Range) -> String {
        let start = self.visit(&n.start);
        let end = self.visit(&n.end);
        self.wrap("range", format!("a range from {} to {}", start, end))
    }

    fn visit_posix_class(&mut self, n: &PosixClass) -> String {
        let text = if n.negated {
            format!("not a POSIX [:{}:] character", n.name)
        } else {
            format!("a POSIX [:{}:] character", n.name)
        };
        self.wrap("posix-class", text)
    }

    fn visit_quantifier(&mut self, n: &Quantifier) -> String {
        let target = self.visit(&n.target);
        self.wrap(
            "quantifier",
            format!("{} {}", quantifier_description(n), target),
        )
    }

    fn visit_group(&mut self, n: &Group) -> String {
        let child = self.visit(&n.child);
        self.wrap("group", format!("{} containing: {}", group_prefix(n), child))
    }

    fn visit_backref(&mut self, n: &Backref) -> String {
        let text = if let Some(name) = &n.by_name {
            format!("whatever group \"{}\" captured", name)
        } else if let Some(idx) = n.by_index {
            format!("whatever group {} captured", idx)
        } else {
            "a backreference".to_string()
        };
        self.wrap("backref", text)
    }

    fn visit_subroutine(&mut self, n: &Subroutine) -> String {
        let text = if let Some(name) = &n.by_name {
            format!("a recursive call to group \"{}\"", name)
        } else if let Some(idx) = n.by_index {
            format!("a recursive call to group {}", idx)
        } else {
            "a recursive call".to_string()
        };
        self.wrap("subroutine", text)
    }

    fn visit_conditional(&mut self, n: &Conditional) -> String {
        let condition = self.visit(&n.condition);
        let then_branch = self.visit(&n.then_branch);
        let else_branch = self.visit(&n.else_branch);
        self.wrap(
            "conditional",
            format!(
                "if {} then {} otherwise {}",
                condition, then_branch, else_branch
            ),
        )
    }

    fn visit_callout(&mut self, n: &Callout) -> String {
        self.wrap("callout", format!("a callout ({})", n.text))
    }

    fn visit_pcre_verb(&mut self, n: &PcreVerb) -> String {
        self.wrap("verb", format!("the control verb (*{})", n.name))
    }

    fn visit_comment(&mut self, _n: &Comment) -> String {
        self.wrap("comment", "a comment (matches nothing)".to_string())
    }
}

/// Plain-English description of the whole pattern.
pub fn explain_prose(ast: &Node) -> String {
    let mut e = Explainer { html: false };
    let body = e.visit(ast);
    format!("Matches {}.", body)
}

/// HTML description, with each clause wrapped in a `<span class="pcrelab-...">`.
pub fn explain_html(ast: &Node) -> String {
    let mut e = Explainer { html: true };
    let body = e.visit(ast);
    format!("<p>Matches {}.</p>", body)
}
