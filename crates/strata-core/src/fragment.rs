//! SQL fragment trees.
//!
//! Compilers assemble [`Fragment`] values instead of concatenating strings,
//! so identifier quoting lives in exactly one place (`render`). A fragment
//! carries no argument values; those travel in a separate ordered list next
//! to the rendered text.

/// One node of a SQL text tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Verbatim SQL text.
    Lit(String),
    /// An identifier, quoted on render only when it is not a bare word.
    Ident(String),
    /// One `?` parameter placeholder.
    Placeholder,
    /// Concatenation of child fragments.
    Seq(Vec<Fragment>),
}

impl Fragment {
    /// Verbatim text fragment.
    #[must_use]
    pub fn lit(s: impl Into<String>) -> Self {
        Self::Lit(s.into())
    }

    /// Identifier fragment.
    #[must_use]
    pub fn ident(s: impl Into<String>) -> Self {
        Self::Ident(s.into())
    }

    /// Joins fragments with a separator literal.
    #[must_use]
    pub fn join(items: Vec<Fragment>, sep: &str) -> Self {
        let mut out = Vec::with_capacity(items.len() * 2);
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                out.push(Self::lit(sep));
            }
            out.push(item);
        }
        Self::Seq(out)
    }

    /// Wraps this fragment in parentheses.
    #[must_use]
    pub fn parens(self) -> Self {
        Self::Seq(vec![Self::lit("("), self, Self::lit(")")])
    }

    /// Renders the fragment to SQL text.
    ///
    /// `quote` is the dialect's identifier quote character; identifiers that
    /// are plain words (`[A-Za-z_][A-Za-z0-9_]*`) render unquoted.
    #[must_use]
    pub fn render(&self, quote: char) -> String {
        let mut out = String::new();
        self.render_into(&mut out, quote);
        out
    }

    fn render_into(&self, out: &mut String, quote: char) {
        match self {
            Self::Lit(s) => out.push_str(s),
            Self::Ident(name) => {
                if is_bare_word(name) {
                    out.push_str(name);
                } else {
                    out.push(quote);
                    // A quote character inside the name is doubled.
                    for c in name.chars() {
                        out.push(c);
                        if c == quote {
                            out.push(c);
                        }
                    }
                    out.push(quote);
                }
            }
            Self::Placeholder => out.push('?'),
            Self::Seq(items) => {
                for item in items {
                    item.render_into(out, quote);
                }
            }
        }
    }
}

/// Concatenation of column references with NULLs coalesced away, used
/// wherever a full-text expression covers several columns.
#[must_use]
pub fn coalesce_concat(columns: &[String]) -> String {
    let parts: Vec<String> = columns
        .iter()
        .map(|c| format!("COALESCE({c}, '')"))
        .collect();
    parts.join(" || ' ' || ")
}

fn is_bare_word(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
