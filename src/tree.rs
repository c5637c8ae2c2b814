//! Derivation trees record which alternative was chosen for every non-terminal.

use std::fmt::{Display, Formatter, Result as FmtResult};

use itertools::Itertools;

use crate::grammar::is_nonterminal;

/// A node of a derivation tree.
///
/// A node is either a non-terminal that still has to be expanded or a symbol
/// together with the children it was expanded into. A terminal is an
/// expanded node without children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DerivationTree {
    /// A non-terminal awaiting expansion
    Unexpanded(String),
    /// A realized symbol
    Expanded {
        /// A non-terminal or, if `children` is empty, terminal text
        symbol: String,
        /// The expansion of `symbol`, in order
        children: Vec<DerivationTree>,
    },
}

impl Default for DerivationTree {
    fn default() -> Self {
        Self::terminal("")
    }
}

impl DerivationTree {
    /// An unexpanded node for `symbol`.
    pub fn new<S: Into<String>>(symbol: S) -> Self {
        Self::Unexpanded(symbol.into())
    }

    /// A fully realized leaf.
    pub fn terminal<S: Into<String>>(text: S) -> Self {
        Self::Expanded {
            symbol: text.into(),
            children: Vec::new(),
        }
    }

    /// An inner node.
    pub fn expanded<S: Into<String>>(symbol: S, children: Vec<DerivationTree>) -> Self {
        Self::Expanded {
            symbol: symbol.into(),
            children,
        }
    }

    /// The symbol of this node.
    pub fn symbol(&self) -> &str {
        match self {
            Self::Unexpanded(symbol) | Self::Expanded { symbol, .. } => symbol,
        }
    }

    /// The children of this node, `None` if it is not expanded yet.
    pub fn children(&self) -> Option<&[DerivationTree]> {
        match self {
            Self::Unexpanded(_) => None,
            Self::Expanded { children, .. } => Some(children),
        }
    }

    /// Number of unexpanded non-terminals in this tree.
    pub fn possible_expansions(&self) -> usize {
        match self {
            Self::Unexpanded(_) => 1,
            Self::Expanded { children, .. } => children.iter().map(Self::possible_expansions).sum(),
        }
    }

    /// Whether any node of this tree is unexpanded.
    pub fn any_possible_expansions(&self) -> bool {
        match self {
            Self::Unexpanded(_) => true,
            Self::Expanded { children, .. } => children.iter().any(Self::any_possible_expansions),
        }
    }

    /// The output string with pending non-terminals shown as-is.
    /// Useful to follow the expansion step by step.
    pub fn all_terminals(&self) -> String {
        match self {
            Self::Unexpanded(symbol) => symbol.clone(),
            Self::Expanded { symbol, children } if children.is_empty() => symbol.clone(),
            Self::Expanded { children, .. } => children.iter().map(Self::all_terminals).join(""),
        }
    }

    /// The output string. Unexpanded non-terminals and non-terminals expanded
    /// into nothing contribute nothing.
    pub fn to_output_string(&self) -> String {
        let mut out = String::new();
        self.write_terminals(&mut out);
        out
    }

    fn write_terminals(&self, out: &mut String) {
        match self {
            Self::Unexpanded(_) => {},
            Self::Expanded { symbol, children } if children.is_empty() => {
                if !is_nonterminal(symbol) {
                    out.push_str(symbol);
                }
            },
            Self::Expanded { children, .. } => {
                for child in children {
                    child.write_terminals(out);
                }
            },
        }
    }

    /// Number of edges on the longest path from this node to a leaf.
    pub fn depth(&self) -> usize {
        match self {
            Self::Unexpanded(_) => 0,
            Self::Expanded { children, .. } => children.iter().map(|c| c.depth() + 1).max().unwrap_or(0),
        }
    }
}

impl Display for DerivationTree {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.to_output_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partial_tree() -> DerivationTree {
        DerivationTree::expanded("<start>", vec![
            DerivationTree::expanded("<expr>", vec![
                DerivationTree::new("<expr>"),
                DerivationTree::terminal(" + "),
                DerivationTree::new("<term>"),
            ]),
        ])
    }

    #[test]
    fn test_all_terminals() {
        assert_eq!(partial_tree().all_terminals(), "<expr> + <term>");
    }

    #[test]
    fn test_output_skips_unexpanded() {
        assert_eq!(partial_tree().to_output_string(), " + ");
        assert_eq!(DerivationTree::new("<start>").to_output_string(), "");
    }

    #[test]
    fn test_output_skips_childless_nonterminals() {
        let tree = DerivationTree::expanded("<start>", vec![
            DerivationTree::terminal("a"),
            DerivationTree::expanded("<b>", Vec::new()),
        ]);
        assert_eq!(tree.to_output_string(), "a");
        assert_eq!(tree.possible_expansions(), 0);
    }

    #[test]
    fn test_possible_expansions() {
        let tree = partial_tree();
        assert_eq!(tree.possible_expansions(), 2);
        assert!(tree.any_possible_expansions());

        let done = DerivationTree::expanded("<start>", vec![DerivationTree::terminal("1")]);
        assert_eq!(done.possible_expansions(), 0);
        assert!(!done.any_possible_expansions());
        assert_eq!(done.to_string(), "1");
    }

    #[test]
    fn test_depth() {
        assert_eq!(partial_tree().depth(), 2);
        assert_eq!(DerivationTree::terminal("a").depth(), 0);
    }
}
