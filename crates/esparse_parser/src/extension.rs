//! Syntax extensions.
//!
//! An extension is a [`SyntaxExtension`] whose methods are the parser's
//! extension points. The `plugins` option names the extensions to apply;
//! they are resolved once into an ordered chain when the parser is built.
//! The most recently applied extension is consulted first, and `flow` is
//! always applied last so it can override every other extension.
//!
//! Each hook receives a [`Chain`] pointing at the next link. Delegating is a
//! call to the matching `Parser::<hook>_from(next, ..)` method; the end of
//! the chain is the base grammar.

use crate::parser::{Marked, NodeStart, PResult, Parser};
use crate::plugins::{flow::FLOW, jsx::JSX};
use esparse_ast::{ImportKind, Node, NodeList, OptionalNode};
use esparse_core::collections::FxHashSet;
use tracing::{debug, warn};

/// Proposals that only unlock syntax and install no hooks.
pub const FEATURE_GATES: &[&str] = &[
    "decorators",
    "classProperties",
    "objectRestSpread",
    "functionBind",
    "doExpressions",
    "exportExtensions",
    "asyncGenerators",
    "functionSent",
    "classConstructorCall",
];

/// Names of syntax that is part of the ES2017 baseline. They are accepted
/// and always enabled.
pub const BASELINE_FEATURES: &[&str] = &["asyncFunctions", "exponentiationOperator", "trailingFunctionCommas"];

/// A position in the extension chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chain(usize);

impl Chain {
    /// The first link.
    pub const START: Chain = Chain(0);

    #[inline]
    fn next(self) -> Chain {
        Chain(self.0 + 1)
    }
}

/// A pluggable unit of grammar behaviour.
///
/// Every method has a default that hands the call to the next link, so an
/// extension only overrides the points it cares about.
#[allow(unused_variables)]
pub trait SyntaxExtension: Sync {
    fn name(&self) -> &'static str;

    /// Read a token starting with `ch`.
    fn read_token(&self, p: &mut Parser<'_>, next: Chain, ch: char) -> PResult<()> {
        p.read_token_from(next, ch)
    }

    /// Parse a primary expression.
    fn parse_expr_atom<'a>(&self, p: &mut Parser<'a>, next: Chain, track_defaults: bool) -> PResult<Marked<'a>> {
        p.parse_expr_atom_from(next, track_defaults)
    }

    /// Finish a statement that began with the expression `expr`.
    fn parse_expression_statement<'a>(
        &self,
        p: &mut Parser<'a>,
        next: Chain,
        start: NodeStart,
        expr: Node<'a>,
    ) -> PResult<Node<'a>> {
        p.parse_expression_statement_from(next, start, expr)
    }

    /// Decorate a binding target with an annotation. `is_param` is set for
    /// function parameters, which may also be marked optional.
    fn parse_binding_annotation<'a>(
        &self,
        p: &mut Parser<'a>,
        next: Chain,
        target: Node<'a>,
        is_param: bool,
    ) -> PResult<Node<'a>> {
        p.parse_binding_annotation_from(next, target, is_param)
    }

    /// An annotation after a function head or a class property key.
    fn parse_return_type<'a>(&self, p: &mut Parser<'a>, next: Chain) -> PResult<OptionalNode<'a>> {
        p.parse_return_type_from(next)
    }

    /// Type parameters after a function name, class name or method key.
    fn parse_type_parameters<'a>(&self, p: &mut Parser<'a>, next: Chain) -> PResult<OptionalNode<'a>> {
        p.parse_type_parameters_from(next)
    }

    /// Type arguments after a class heritage expression.
    fn parse_super_type_arguments<'a>(&self, p: &mut Parser<'a>, next: Chain) -> PResult<OptionalNode<'a>> {
        p.parse_super_type_arguments_from(next)
    }

    /// An `implements` clause of a class.
    fn parse_implements<'a>(&self, p: &mut Parser<'a>, next: Chain) -> PResult<NodeList<'a>> {
        p.parse_implements_from(next)
    }

    /// Post-process an item of a parenthesized list.
    fn parse_paren_item<'a>(
        &self,
        p: &mut Parser<'a>,
        next: Chain,
        node: Node<'a>,
        start: NodeStart,
    ) -> PResult<Node<'a>> {
        p.parse_paren_item_from(next, node, start)
    }

    /// A return type between a parameter list and `=>`.
    fn parse_arrow_return_type<'a>(&self, p: &mut Parser<'a>, next: Chain) -> PResult<OptionalNode<'a>> {
        p.parse_arrow_return_type_from(next)
    }

    /// A declaration after `export` that the base grammar does not know.
    fn parse_export_declaration<'a>(&self, p: &mut Parser<'a>, next: Chain) -> PResult<Option<Node<'a>>> {
        p.parse_export_declaration_from(next)
    }

    /// The kind of an import or export specifier list.
    fn parse_import_kind(&self, p: &mut Parser<'_>, next: Chain) -> PResult<ImportKind> {
        p.parse_import_kind_from(next)
    }

    /// Whether the class member whose key was just parsed is a property.
    fn is_class_property(&self, p: &Parser<'_>, next: Chain) -> bool {
        p.is_class_property_from(next)
    }
}

/// The resolved extension configuration of one parser.
pub struct ExtensionSet {
    features: FxHashSet<&'static str>,
    /// Consultation order: most recently applied first.
    chain: Vec<&'static dyn SyntaxExtension>,
}

impl ExtensionSet {
    /// Resolve plugin names. Unknown names are ignored.
    pub fn resolve(names: &[String]) -> Self {
        let mut features = FxHashSet::default();
        let mut applied: Vec<&'static dyn SyntaxExtension> = Vec::new();
        let mut flow = false;
        for name in names {
            let name = name.as_str();
            if let Some(gate) = FEATURE_GATES.iter().chain(BASELINE_FEATURES).find(|gate| **gate == name) {
                features.insert(*gate);
                continue;
            }
            match name {
                "flow" => flow = true,
                "jsx" => {
                    if !applied.iter().any(|ext| ext.name() == "jsx") {
                        applied.push(&JSX);
                    }
                }
                _ => warn!(plugin = name, "ignoring unknown parser plugin"),
            }
        }
        if flow {
            applied.push(&FLOW);
        }
        applied.reverse();
        if !names.is_empty() {
            debug!(
                extensions = ?applied.iter().map(|ext| ext.name()).collect::<Vec<_>>(),
                features = features.len(),
                "resolved parser plugins"
            );
        }
        Self { features, chain: applied }
    }

    /// Whether `name` is enabled, either as a feature gate or as an
    /// extension. Baseline names are always enabled.
    pub fn has(&self, name: &str) -> bool {
        BASELINE_FEATURES.contains(&name) || self.features.contains(name) || self.chain.iter().any(|ext| ext.name() == name)
    }

    #[inline]
    fn at(&self, link: Chain) -> Option<&'static dyn SyntaxExtension> {
        self.chain.get(link.0).copied()
    }

    /// Names of the hook-installing extensions, in consultation order.
    pub fn names(&self) -> Vec<&'static str> {
        self.chain.iter().map(|ext| ext.name()).collect()
    }
}

// ============================================================================
// Chain dispatch
// ============================================================================

impl<'a> Parser<'a> {
    pub fn read_token_from(&mut self, next: Chain, ch: char) -> PResult<()> {
        match self.extensions.at(next) {
            Some(ext) => ext.read_token(self, next.next(), ch),
            None => self.lexer.read_token(ch),
        }
    }

    pub fn parse_expr_atom_from(&mut self, next: Chain, track_defaults: bool) -> PResult<Marked<'a>> {
        match self.extensions.at(next) {
            Some(ext) => ext.parse_expr_atom(self, next.next(), track_defaults),
            None => self.base_parse_expr_atom(track_defaults),
        }
    }

    pub fn parse_expression_statement_from(&mut self, next: Chain, start: NodeStart, expr: Node<'a>) -> PResult<Node<'a>> {
        match self.extensions.at(next) {
            Some(ext) => ext.parse_expression_statement(self, next.next(), start, expr),
            None => self.base_parse_expression_statement(start, expr),
        }
    }

    pub fn parse_binding_annotation_from(&mut self, next: Chain, target: Node<'a>, is_param: bool) -> PResult<Node<'a>> {
        match self.extensions.at(next) {
            Some(ext) => ext.parse_binding_annotation(self, next.next(), target, is_param),
            None => Ok(target),
        }
    }

    pub fn parse_return_type_from(&mut self, next: Chain) -> PResult<OptionalNode<'a>> {
        match self.extensions.at(next) {
            Some(ext) => ext.parse_return_type(self, next.next()),
            None => Ok(None),
        }
    }

    pub fn parse_type_parameters_from(&mut self, next: Chain) -> PResult<OptionalNode<'a>> {
        match self.extensions.at(next) {
            Some(ext) => ext.parse_type_parameters(self, next.next()),
            None => Ok(None),
        }
    }

    pub fn parse_super_type_arguments_from(&mut self, next: Chain) -> PResult<OptionalNode<'a>> {
        match self.extensions.at(next) {
            Some(ext) => ext.parse_super_type_arguments(self, next.next()),
            None => Ok(None),
        }
    }

    pub fn parse_implements_from(&mut self, next: Chain) -> PResult<NodeList<'a>> {
        match self.extensions.at(next) {
            Some(ext) => ext.parse_implements(self, next.next()),
            None => Ok(&[]),
        }
    }

    pub fn parse_paren_item_from(&mut self, next: Chain, node: Node<'a>, start: NodeStart) -> PResult<Node<'a>> {
        match self.extensions.at(next) {
            Some(ext) => ext.parse_paren_item(self, next.next(), node, start),
            None => Ok(node),
        }
    }

    pub fn parse_arrow_return_type_from(&mut self, next: Chain) -> PResult<OptionalNode<'a>> {
        match self.extensions.at(next) {
            Some(ext) => ext.parse_arrow_return_type(self, next.next()),
            None => Ok(None),
        }
    }

    pub fn parse_export_declaration_from(&mut self, next: Chain) -> PResult<Option<Node<'a>>> {
        match self.extensions.at(next) {
            Some(ext) => ext.parse_export_declaration(self, next.next()),
            None => Ok(None),
        }
    }

    pub fn parse_import_kind_from(&mut self, next: Chain) -> PResult<ImportKind> {
        match self.extensions.at(next) {
            Some(ext) => ext.parse_import_kind(self, next.next()),
            None => Ok(ImportKind::Value),
        }
    }

    pub fn is_class_property_from(&self, next: Chain) -> bool {
        match self.extensions.at(next) {
            Some(ext) => ext.is_class_property(self, next.next()),
            None => self.base_is_class_property(),
        }
    }

    // Entry points used by the grammar.

    #[inline]
    pub fn parse_expr_atom(&mut self, track_defaults: bool) -> PResult<Marked<'a>> {
        self.parse_expr_atom_from(Chain::START, track_defaults)
    }

    #[inline]
    pub fn parse_binding_annotation(&mut self, target: Node<'a>, is_param: bool) -> PResult<Node<'a>> {
        self.parse_binding_annotation_from(Chain::START, target, is_param)
    }

    #[inline]
    pub fn parse_return_type(&mut self) -> PResult<OptionalNode<'a>> {
        self.parse_return_type_from(Chain::START)
    }

    #[inline]
    pub fn parse_type_parameters(&mut self) -> PResult<OptionalNode<'a>> {
        self.parse_type_parameters_from(Chain::START)
    }

    #[inline]
    pub fn parse_expression_statement(&mut self, start: NodeStart, expr: Node<'a>) -> PResult<Node<'a>> {
        self.parse_expression_statement_from(Chain::START, start, expr)
    }

    #[inline]
    pub fn parse_super_type_arguments(&mut self) -> PResult<OptionalNode<'a>> {
        self.parse_super_type_arguments_from(Chain::START)
    }

    #[inline]
    pub fn parse_implements(&mut self) -> PResult<NodeList<'a>> {
        self.parse_implements_from(Chain::START)
    }

    #[inline]
    pub fn parse_arrow_return_type(&mut self) -> PResult<OptionalNode<'a>> {
        self.parse_arrow_return_type_from(Chain::START)
    }

    #[inline]
    pub fn parse_export_declaration(&mut self) -> PResult<Option<Node<'a>>> {
        self.parse_export_declaration_from(Chain::START)
    }

    #[inline]
    pub fn parse_paren_item(&mut self, node: Node<'a>, start: NodeStart) -> PResult<Node<'a>> {
        self.parse_paren_item_from(Chain::START, node, start)
    }

    #[inline]
    pub fn parse_import_kind(&mut self) -> PResult<ImportKind> {
        self.parse_import_kind_from(Chain::START)
    }

    #[inline]
    pub fn is_class_property(&self) -> bool {
        self.is_class_property_from(Chain::START)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_flow_is_consulted_first() {
        let set = ExtensionSet::resolve(&names(&["flow", "jsx"]));
        assert_eq!(set.names(), vec!["flow", "jsx"]);
        let set = ExtensionSet::resolve(&names(&["jsx", "flow"]));
        assert_eq!(set.names(), vec!["flow", "jsx"]);
    }

    #[test]
    fn test_feature_gates_and_baseline() {
        let set = ExtensionSet::resolve(&names(&["decorators", "bogus"]));
        assert!(set.has("decorators"));
        assert!(!set.has("classProperties"));
        assert!(!set.has("bogus"));
        assert!(set.has("asyncFunctions"));
        assert!(set.names().is_empty());
    }

    #[test]
    fn test_duplicate_names_apply_once() {
        let set = ExtensionSet::resolve(&names(&["jsx", "jsx"]));
        assert_eq!(set.names(), vec!["jsx"]);
    }
}
