//! Comment attachment.
//!
//! Runs once the tree is complete. Every comment is assigned to the nodes
//! around it inside the innermost node that contains it: a group between two
//! siblings trails the earlier one and leads the later one, a group before
//! the first child leads it, a group after the last child trails it, and a
//! group inside a node without children is inner to that node.

use esparse_ast::visitor::children;
use esparse_ast::{Comment, Node};

/// Attach `comments`, sorted by offset, to the nodes of `root`.
pub fn attach_comments<'a>(root: &Node<'a>, comments: &'a [Comment<'a>]) {
    if comments.is_empty() {
        return;
    }
    attach_within(root, comments);
}

/// `comments` all lie within `node`.
fn attach_within<'a>(node: &Node<'a>, comments: &'a [Comment<'a>]) {
    if comments.is_empty() {
        return;
    }
    let kids = children(node);
    if kids.is_empty() {
        node.data.inner_comments.set(comments);
        return;
    }

    let mut rest = comments;
    let mut prev: Option<&'a Node<'a>> = None;
    for child in kids {
        let (before, tail) = rest.split_at(rest.partition_point(|c| c.end <= child.start()));
        if !before.is_empty() {
            child.data.leading_comments.set(before);
            if let Some(prev) = prev {
                prev.data.trailing_comments.set(before);
            }
        }
        let (inside, after) = tail.split_at(tail.partition_point(|c| c.start < child.end()));
        attach_within(child, inside);
        rest = after;
        prev = Some(child);
    }

    if let (Some(last), false) = (prev, rest.is_empty()) {
        last.data.trailing_comments.set(rest);
    }
}

#[cfg(test)]
mod tests {
    use crate::options::ParserOptions;
    use bumpalo::Bump;
    use esparse_ast::NodeKind;

    #[test]
    fn test_comment_between_statements_is_shared() {
        let arena = Bump::new();
        let file = crate::parse(&arena, "a; /* mid */ b;", &ParserOptions::default()).unwrap();
        let body = file.body();
        assert_eq!(body[0].data.trailing_comments.get().len(), 1);
        assert_eq!(body[1].data.leading_comments.get()[0].value, " mid ");
    }

    #[test]
    fn test_leading_and_trailing_at_the_edges() {
        let arena = Bump::new();
        let file = crate::parse(&arena, "// first\nx;\n// last", &ParserOptions::default()).unwrap();
        let stmt = &file.body()[0];
        assert_eq!(stmt.data.leading_comments.get()[0].value, " first");
        assert_eq!(stmt.data.trailing_comments.get()[0].value, " last");
        assert_eq!(file.comments.len(), 2);
    }

    #[test]
    fn test_empty_block_keeps_inner_comments() {
        let arena = Bump::new();
        let file = crate::parse(&arena, "function f() { /* nothing */ }", &ParserOptions::default()).unwrap();
        let NodeKind::FunctionDeclaration(function) = &file.body()[0].kind else {
            panic!("expected a function declaration");
        };
        assert_eq!(function.body.data.inner_comments.get()[0].value, " nothing ");
    }

    #[test]
    fn test_nested_comment_goes_to_the_innermost_node() {
        let arena = Bump::new();
        let file = crate::parse(&arena, "f(a, /* b */ b);", &ParserOptions::default()).unwrap();
        assert!(file.body()[0].data.leading_comments.get().is_empty());
        let NodeKind::ExpressionStatement { expression } = file.body()[0].kind else {
            panic!("expected an expression statement");
        };
        let NodeKind::CallExpression { arguments, .. } = expression.kind else {
            panic!("expected a call");
        };
        assert_eq!(arguments[1].data.leading_comments.get().len(), 1);
        assert_eq!(arguments[0].data.trailing_comments.get().len(), 1);
    }
}
