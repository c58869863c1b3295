//! The token-type registry.
//!
//! Every punctuator, keyword and literal kind is a variant of [`TokenType`].
//! Static metadata (binary precedence, expression flags, keyword text) lives
//! in the const table [`TOKEN_TYPES`], indexed by discriminant. The table is
//! built at compile time and never mutated.

use serde::{Serialize, Serializer};

bitflags::bitflags! {
    /// Static properties of a token type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TokenFlags: u8 {
        const NONE              = 0;
        /// An expression may follow this token, so `/` starts a regex and
        /// `{` opens an object literal.
        const BEFORE_EXPR       = 1 << 0;
        /// This token can start an expression.
        const STARTS_EXPR       = 1 << 1;
        const RIGHT_ASSOCIATIVE = 1 << 2;
        const IS_LOOP           = 1 << 3;
        const IS_ASSIGN         = 1 << 4;
        const PREFIX            = 1 << 5;
        const POSTFIX           = 1 << 6;
    }
}

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TokenType {
    // ========================================================================
    // Literals
    // ========================================================================
    Num,
    Regexp,
    String,
    Name,
    Eof,

    // ========================================================================
    // Punctuation
    // ========================================================================
    BracketL,
    BracketR,
    BraceL,
    BraceR,
    /// `{|`, opening an exact object type.
    BraceBarL,
    /// `|}`.
    BraceBarR,
    ParenL,
    ParenR,
    Comma,
    Semi,
    Colon,
    DoubleColon,
    Dot,
    Question,
    Arrow,
    Template,
    Ellipsis,
    BackQuote,
    DollarBraceL,
    At,

    // ========================================================================
    // Operators
    // ========================================================================
    Eq,
    Assign,
    IncDec,
    Prefix,
    LogicalOr,
    LogicalAnd,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    Equality,
    Relational,
    BitShift,
    PlusMin,
    Modulo,
    Star,
    Slash,
    Exponent,

    // ========================================================================
    // Keywords
    // ========================================================================
    Break,
    Case,
    Catch,
    Continue,
    Debugger,
    Default,
    Do,
    Else,
    Finally,
    For,
    Function,
    If,
    Return,
    Switch,
    Throw,
    Try,
    Var,
    Let,
    Const,
    While,
    With,
    New,
    This,
    Super,
    Class,
    Extends,
    Export,
    Import,
    Yield,
    Null,
    True,
    False,
    In,
    Instanceof,
    Typeof,
    Void,
    Delete,

    // ========================================================================
    // JSX
    // ========================================================================
    JsxName,
    JsxText,
    JsxTagStart,
    JsxTagEnd,
}

/// Static metadata for one token type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTypeInfo {
    pub label: &'static str,
    pub keyword: Option<&'static str>,
    pub binop: Option<u8>,
    pub flags: TokenFlags,
}

const BE: TokenFlags = TokenFlags::BEFORE_EXPR;
const SE: TokenFlags = TokenFlags::STARTS_EXPR;
const BE_SE: TokenFlags = BE.union(SE);
const NO: TokenFlags = TokenFlags::NONE;

const fn tt(label: &'static str, flags: TokenFlags) -> TokenTypeInfo {
    TokenTypeInfo { label, keyword: None, binop: None, flags }
}

const fn binop(label: &'static str, prec: u8, flags: TokenFlags) -> TokenTypeInfo {
    TokenTypeInfo { label, keyword: None, binop: Some(prec), flags: flags.union(BE) }
}

const fn kw(name: &'static str, flags: TokenFlags) -> TokenTypeInfo {
    TokenTypeInfo { label: name, keyword: Some(name), binop: None, flags }
}

const fn kw_binop(name: &'static str, prec: u8) -> TokenTypeInfo {
    TokenTypeInfo { label: name, keyword: Some(name), binop: Some(prec), flags: BE }
}

/// Metadata table, indexed by `TokenType as usize`.
pub const TOKEN_TYPES: [TokenTypeInfo; TokenType::COUNT] = [
    // Literals
    tt("num", SE),
    tt("regexp", SE),
    tt("string", SE),
    tt("name", SE),
    tt("eof", NO),
    // Punctuation
    tt("[", BE_SE),
    tt("]", NO),
    tt("{", BE_SE),
    tt("}", NO),
    tt("{|", BE_SE),
    tt("|}", NO),
    tt("(", BE_SE),
    tt(")", NO),
    tt(",", BE),
    tt(";", BE),
    tt(":", BE),
    tt("::", BE),
    tt(".", NO),
    tt("?", BE),
    tt("=>", BE),
    tt("template", NO),
    tt("...", BE),
    tt("`", SE),
    tt("${", BE_SE),
    tt("@", NO),
    // Operators
    tt("=", BE.union(TokenFlags::IS_ASSIGN)),
    tt("_=", BE.union(TokenFlags::IS_ASSIGN)),
    tt("++/--", TokenFlags::PREFIX.union(TokenFlags::POSTFIX).union(SE)),
    tt("prefix", BE_SE.union(TokenFlags::PREFIX)),
    binop("||", 1, NO),
    binop("&&", 2, NO),
    binop("|", 3, NO),
    binop("^", 4, NO),
    binop("&", 5, NO),
    binop("==/!=", 6, NO),
    binop("</>", 7, NO),
    binop("<</>>", 8, NO),
    binop("+/-", 9, SE.union(TokenFlags::PREFIX)),
    binop("%", 10, NO),
    binop("*", 10, NO),
    binop("/", 10, NO),
    binop("**", 11, TokenFlags::RIGHT_ASSOCIATIVE),
    // Keywords
    kw("break", NO),
    kw("case", BE),
    kw("catch", NO),
    kw("continue", NO),
    kw("debugger", NO),
    kw("default", BE),
    kw("do", BE.union(TokenFlags::IS_LOOP)),
    kw("else", BE),
    kw("finally", NO),
    kw("for", TokenFlags::IS_LOOP),
    kw("function", SE),
    kw("if", NO),
    kw("return", BE),
    kw("switch", NO),
    kw("throw", BE),
    kw("try", NO),
    kw("var", NO),
    kw("let", NO),
    kw("const", NO),
    kw("while", TokenFlags::IS_LOOP),
    kw("with", NO),
    kw("new", BE_SE),
    kw("this", SE),
    kw("super", SE),
    kw("class", NO),
    kw("extends", BE),
    kw("export", NO),
    kw("import", NO),
    kw("yield", BE_SE),
    kw("null", SE),
    kw("true", SE),
    kw("false", SE),
    kw_binop("in", 7),
    kw_binop("instanceof", 7),
    kw("typeof", BE_SE.union(TokenFlags::PREFIX)),
    kw("void", BE_SE.union(TokenFlags::PREFIX)),
    kw("delete", BE_SE.union(TokenFlags::PREFIX)),
    // JSX
    tt("jsxName", NO),
    tt("jsxText", BE),
    tt("jsxTagStart", SE),
    tt("jsxTagEnd", NO),
];

impl TokenType {
    /// Number of token types.
    pub const COUNT: usize = TokenType::JsxTagEnd as usize + 1;

    /// Every token type, in discriminant order.
    pub const ALL: [TokenType; TokenType::COUNT] = [
        TokenType::Num, TokenType::Regexp, TokenType::String, TokenType::Name, TokenType::Eof,
        TokenType::BracketL, TokenType::BracketR, TokenType::BraceL, TokenType::BraceR,
        TokenType::BraceBarL, TokenType::BraceBarR, TokenType::ParenL, TokenType::ParenR,
        TokenType::Comma, TokenType::Semi, TokenType::Colon,
        TokenType::DoubleColon, TokenType::Dot, TokenType::Question, TokenType::Arrow,
        TokenType::Template, TokenType::Ellipsis, TokenType::BackQuote, TokenType::DollarBraceL,
        TokenType::At, TokenType::Eq, TokenType::Assign, TokenType::IncDec, TokenType::Prefix,
        TokenType::LogicalOr, TokenType::LogicalAnd, TokenType::BitwiseOr, TokenType::BitwiseXor,
        TokenType::BitwiseAnd, TokenType::Equality, TokenType::Relational, TokenType::BitShift,
        TokenType::PlusMin, TokenType::Modulo, TokenType::Star, TokenType::Slash,
        TokenType::Exponent, TokenType::Break, TokenType::Case, TokenType::Catch,
        TokenType::Continue, TokenType::Debugger, TokenType::Default, TokenType::Do,
        TokenType::Else, TokenType::Finally, TokenType::For, TokenType::Function, TokenType::If,
        TokenType::Return, TokenType::Switch, TokenType::Throw, TokenType::Try, TokenType::Var,
        TokenType::Let, TokenType::Const, TokenType::While, TokenType::With, TokenType::New,
        TokenType::This, TokenType::Super, TokenType::Class, TokenType::Extends,
        TokenType::Export, TokenType::Import, TokenType::Yield, TokenType::Null, TokenType::True,
        TokenType::False, TokenType::In, TokenType::Instanceof, TokenType::Typeof,
        TokenType::Void, TokenType::Delete, TokenType::JsxName, TokenType::JsxText,
        TokenType::JsxTagStart, TokenType::JsxTagEnd,
    ];

    #[inline]
    pub fn info(self) -> &'static TokenTypeInfo {
        &TOKEN_TYPES[self as usize]
    }

    #[inline]
    pub fn label(self) -> &'static str {
        self.info().label
    }

    /// Binary operator precedence, if this is a binary operator.
    #[inline]
    pub fn binop(self) -> Option<u8> {
        self.info().binop
    }

    /// Keyword text, if this is a keyword.
    #[inline]
    pub fn keyword(self) -> Option<&'static str> {
        self.info().keyword
    }

    #[inline]
    pub fn is_keyword(self) -> bool {
        self.info().keyword.is_some()
    }

    #[inline]
    pub fn before_expr(self) -> bool {
        self.info().flags.contains(TokenFlags::BEFORE_EXPR)
    }

    #[inline]
    pub fn starts_expr(self) -> bool {
        self.info().flags.contains(TokenFlags::STARTS_EXPR)
    }

    #[inline]
    pub fn right_associative(self) -> bool {
        self.info().flags.contains(TokenFlags::RIGHT_ASSOCIATIVE)
    }

    #[inline]
    pub fn is_loop(self) -> bool {
        self.info().flags.contains(TokenFlags::IS_LOOP)
    }

    #[inline]
    pub fn is_assign(self) -> bool {
        self.info().flags.contains(TokenFlags::IS_ASSIGN)
    }

    #[inline]
    pub fn prefix(self) -> bool {
        self.info().flags.contains(TokenFlags::PREFIX)
    }

    #[inline]
    pub fn postfix(self) -> bool {
        self.info().flags.contains(TokenFlags::POSTFIX)
    }

    /// Look up the keyword token type for a word.
    pub fn from_keyword(word: &str) -> Option<TokenType> {
        let tt = match word {
            "break" => TokenType::Break,
            "case" => TokenType::Case,
            "catch" => TokenType::Catch,
            "continue" => TokenType::Continue,
            "debugger" => TokenType::Debugger,
            "default" => TokenType::Default,
            "do" => TokenType::Do,
            "else" => TokenType::Else,
            "finally" => TokenType::Finally,
            "for" => TokenType::For,
            "function" => TokenType::Function,
            "if" => TokenType::If,
            "return" => TokenType::Return,
            "switch" => TokenType::Switch,
            "throw" => TokenType::Throw,
            "try" => TokenType::Try,
            "var" => TokenType::Var,
            "let" => TokenType::Let,
            "const" => TokenType::Const,
            "while" => TokenType::While,
            "with" => TokenType::With,
            "new" => TokenType::New,
            "this" => TokenType::This,
            "super" => TokenType::Super,
            "class" => TokenType::Class,
            "extends" => TokenType::Extends,
            "export" => TokenType::Export,
            "import" => TokenType::Import,
            "yield" => TokenType::Yield,
            "null" => TokenType::Null,
            "true" => TokenType::True,
            "false" => TokenType::False,
            "in" => TokenType::In,
            "instanceof" => TokenType::Instanceof,
            "typeof" => TokenType::Typeof,
            "void" => TokenType::Void,
            "delete" => TokenType::Delete,
            _ => return None,
        };
        Some(tt)
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for TokenType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Words reserved in strict mode code.
pub fn is_strict_reserved_word(word: &str) -> bool {
    matches!(
        word,
        "implements" | "interface" | "let" | "package" | "private" | "protected" | "public" | "static" | "yield"
    )
}

/// Words that cannot be bound in strict mode code.
pub fn is_strict_bind_reserved_word(word: &str) -> bool {
    matches!(word, "eval" | "arguments")
}

/// Words reserved in every mode.
pub fn is_reserved_word(word: &str) -> bool {
    matches!(word, "enum" | "await")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_indexed_by_discriminant() {
        for (i, tt) in TokenType::ALL.iter().enumerate() {
            assert_eq!(*tt as usize, i);
        }
        assert_eq!(TokenType::ALL.len(), TOKEN_TYPES.len());
    }

    #[test]
    fn test_keywords_round_trip() {
        for tt in TokenType::ALL {
            if let Some(word) = tt.keyword() {
                assert_eq!(TokenType::from_keyword(word), Some(tt));
                assert_eq!(tt.label(), word);
            }
        }
        assert_eq!(TokenType::from_keyword("async"), None);
        assert_eq!(TokenType::from_keyword("of"), None);
    }

    #[test]
    fn test_binary_precedence() {
        assert_eq!(TokenType::LogicalOr.binop(), Some(1));
        assert_eq!(TokenType::LogicalAnd.binop(), Some(2));
        assert_eq!(TokenType::PlusMin.binop(), Some(9));
        assert_eq!(TokenType::Star.binop(), Some(10));
        assert_eq!(TokenType::Exponent.binop(), Some(11));
        assert_eq!(TokenType::In.binop(), Some(7));
        assert_eq!(TokenType::Instanceof.binop(), TokenType::Relational.binop());
        assert!(TokenType::Exponent.right_associative());
        assert!(!TokenType::Star.right_associative());
        assert_eq!(TokenType::Comma.binop(), None);
    }

    #[test]
    fn test_expression_flags() {
        assert!(TokenType::ParenL.before_expr());
        assert!(!TokenType::ParenR.before_expr());
        assert!(TokenType::Return.before_expr());
        assert!(TokenType::Name.starts_expr());
        assert!(TokenType::IncDec.prefix() && TokenType::IncDec.postfix());
        assert!(TokenType::PlusMin.prefix());
        assert!(TokenType::Typeof.prefix());
        assert!(TokenType::Do.is_loop() && TokenType::For.is_loop() && TokenType::While.is_loop());
        assert!(TokenType::Eq.is_assign() && TokenType::Assign.is_assign());
        assert!(!TokenType::Equality.is_assign());
    }
}
