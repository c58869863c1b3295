//! Lexical contexts.
//!
//! The context stack decides whether `/` starts a regular expression and
//! whether `{` opens a block or an object literal. Frames are pushed and
//! popped by the token-completion hook in [`Lexer::update_context`].
//!
//! The stack is persistent: frames are shared between a lexer state and
//! its snapshots, so taking a snapshot does not copy it.
//!
//! [`Lexer::update_context`]: crate::Lexer

use std::rc::Rc;

/// A frame of the lexical context stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    BraceStatement,
    BraceExpression,
    TemplateQuasi,
    ParenStatement,
    ParenExpression,
    /// Inside a template literal; chunks are read by the template reader.
    Template,
    FunctionExpression,
    JsxOpenTag,
    JsxCloseTag,
    /// JSX children; whitespace is significant.
    JsxExpression,
}

impl Context {
    /// Whether the frame sits in expression position.
    #[inline]
    pub fn is_expr(self) -> bool {
        matches!(
            self,
            Context::BraceExpression
                | Context::TemplateQuasi
                | Context::ParenExpression
                | Context::Template
                | Context::FunctionExpression
                | Context::JsxExpression
        )
    }

    /// Whether whitespace and comments are token content in this frame.
    #[inline]
    pub fn preserve_space(self) -> bool {
        matches!(self, Context::Template | Context::JsxExpression)
    }

    /// The opening text of the frame.
    pub fn token(self) -> &'static str {
        match self {
            Context::BraceStatement | Context::BraceExpression => "{",
            Context::TemplateQuasi => "${",
            Context::ParenStatement | Context::ParenExpression => "(",
            Context::Template => "`",
            Context::FunctionExpression => "function",
            Context::JsxOpenTag => "<tag",
            Context::JsxCloseTag => "</tag",
            Context::JsxExpression => "<tag>...</tag>",
        }
    }
}

/// A persistent stack of context frames. Cloning shares every frame.
#[derive(Debug, Clone)]
pub struct ContextStack {
    top: Option<Rc<Frame>>,
    len: usize,
}

#[derive(Debug)]
struct Frame {
    context: Context,
    below: Option<Rc<Frame>>,
}

impl ContextStack {
    /// A stack holding only `root`.
    pub fn new(root: Context) -> Self {
        let mut stack = Self { top: None, len: 0 };
        stack.push(root);
        stack
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The innermost frame.
    #[inline]
    pub fn last(&self) -> Option<Context> {
        self.top.as_ref().map(|frame| frame.context)
    }

    pub fn push(&mut self, context: Context) {
        let below = self.top.take();
        self.top = Some(Rc::new(Frame { context, below }));
        self.len += 1;
    }

    pub fn pop(&mut self) -> Option<Context> {
        let frame = self.top.take()?;
        self.top = frame.below.clone();
        self.len -= 1;
        Some(frame.context)
    }

    /// Pop frames until at most `len` remain.
    pub fn truncate(&mut self, len: usize) {
        while self.len > len {
            self.pop();
        }
    }

    /// Frames from innermost to outermost.
    pub fn iter(&self) -> impl Iterator<Item = Context> + '_ {
        std::iter::successors(self.top.as_deref(), |frame| frame.below.as_deref()).map(|frame| frame.context)
    }
}

impl Drop for ContextStack {
    // Unlink frames one at a time so a deep stack does not recurse on drop.
    fn drop(&mut self) {
        let mut next = self.top.take();
        while let Some(frame) = next {
            next = match Rc::try_unwrap(frame) {
                Ok(mut frame) => frame.below.take(),
                Err(_) => None,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_push_pop() {
        let mut stack = ContextStack::new(Context::BraceStatement);
        stack.push(Context::ParenExpression);
        stack.push(Context::Template);
        assert_eq!(stack.len(), 3);
        assert_eq!(stack.last(), Some(Context::Template));
        assert_eq!(stack.pop(), Some(Context::Template));
        assert_eq!(stack.last(), Some(Context::ParenExpression));
        stack.truncate(1);
        assert_eq!(stack.iter().collect::<Vec<_>>(), vec![Context::BraceStatement]);
        assert_eq!(stack.pop(), Some(Context::BraceStatement));
        assert_eq!(stack.pop(), None);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_clone_shares_frames() {
        let mut stack = ContextStack::new(Context::BraceStatement);
        stack.push(Context::BraceExpression);
        let snapshot = stack.clone();
        assert!(matches!((&stack.top, &snapshot.top), (Some(a), Some(b)) if Rc::ptr_eq(a, b)));

        stack.pop();
        stack.push(Context::JsxOpenTag);
        assert_eq!(
            snapshot.iter().collect::<Vec<_>>(),
            vec![Context::BraceExpression, Context::BraceStatement]
        );
        assert_eq!(stack.iter().collect::<Vec<_>>(), vec![Context::JsxOpenTag, Context::BraceStatement]);
    }

    #[test]
    fn test_deep_stack_drops() {
        let mut stack = ContextStack::new(Context::BraceStatement);
        for _ in 0..1_000_000 {
            stack.push(Context::ParenExpression);
        }
        let snapshot = stack.clone();
        drop(stack);
        assert_eq!(snapshot.len(), 1_000_001);
    }

    #[test]
    fn test_context_properties() {
        assert!(!Context::BraceStatement.is_expr());
        assert!(Context::BraceExpression.is_expr());
        assert!(Context::Template.preserve_space());
        assert!(Context::JsxExpression.preserve_space());
        assert!(!Context::JsxCloseTag.preserve_space());
        assert_eq!(Context::TemplateQuasi.token(), "${");
    }
}
