use ahash::AHashMap;

use crate::{
    grammar::{Expansion, Symbol},
    tree::DerivationTree,
};

/// Turn an expansion into fresh tree nodes: non-terminals become unexpanded nodes,
/// terminal runs become leaves. The empty expansion yields a single empty leaf.
pub fn expansion_to_children(expansion: &Expansion) -> Vec<DerivationTree> {
    if expansion.string().is_empty() {
        return vec![DerivationTree::terminal("")];
    }

    expansion
        .symbols()
        .into_iter()
        .map(|symbol| match symbol {
            Symbol::NonTerminal(nonterm) => DerivationTree::new(nonterm),
            Symbol::Terminal(term) => DerivationTree::terminal(term),
        })
        .collect()
}

/// Memoizes [`expansion_to_children`] by expansion string.
///
/// Every lookup hands out its own copy, so callers may modify the result freely.
#[derive(Debug, Default)]
pub(crate) struct ChildrenCache {
    enabled: bool,
    cache: AHashMap<String, Vec<DerivationTree>>,
    invocations: usize,
    cached_invocations: usize,
}

impl ChildrenCache {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    pub(crate) fn children(&mut self, expansion: &Expansion) -> Vec<DerivationTree> {
        if !self.enabled {
            return expansion_to_children(expansion);
        }

        self.invocations += 1;

        if let Some(children) = self.cache.get(expansion.string()) {
            self.cached_invocations += 1;
            return children.clone();
        }

        let children = expansion_to_children(expansion);
        self.cache.insert(expansion.string().to_string(), children.clone());
        children
    }

    /// (lookups, lookups answered from the cache)
    pub(crate) fn stats(&self) -> (usize, usize) {
        (self.invocations, self.cached_invocations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expansion_to_children() {
        assert_eq!(
            expansion_to_children(&Expansion::new("<term> + <expr>")),
            vec![
                DerivationTree::new("<term>"),
                DerivationTree::terminal(" + "),
                DerivationTree::new("<expr>"),
            ],
        );
        assert_eq!(expansion_to_children(&Expansion::new("")), vec![DerivationTree::terminal("")]);
    }

    #[test]
    fn test_cached_copies_are_independent() {
        let mut cache = ChildrenCache::new(true);
        let expansion = Expansion::new("<a>b");

        let mut first = cache.children(&expansion);
        first[0] = DerivationTree::terminal("modified");

        let second = cache.children(&expansion);
        assert_eq!(second, vec![DerivationTree::new("<a>"), DerivationTree::terminal("b")]);
        assert_eq!(cache.stats(), (2, 1));
    }

    #[test]
    fn test_disabled_cache() {
        let mut cache = ChildrenCache::new(false);
        cache.children(&Expansion::new("a"));
        cache.children(&Expansion::new("a"));
        assert_eq!(cache.stats(), (0, 0));
    }
}
