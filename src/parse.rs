//! Parser for the bundled reference grammar: a small expression language
//! with functions, `let`/`if`/`while`/`return` statements, doc comments,
//! and the full set of C-style binary operators. All binary operators are
//! left-associative, so `a + b + c` parses to a left-nested chain.

use thiserror::Error;

use crate::node::{NodeId, NodeKind, Op};
use crate::source::SourceRange;
use crate::tree::{SyntaxTree, TreeBuilder};

/// Parse failure. The parser is fail-fast: the first offending token stops
/// the parse.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("parse error at byte {offset}: {message}")]
pub struct ParseError {
    pub message: String,
    pub offset: usize,
}

pub(crate) fn parse(source: &str) -> Result<SyntaxTree, ParseError> {
    let tokens = Lexer::new(source).run()?;
    let parser = Parser {
        source,
        tokens,
        pos: 0,
        builder: TreeBuilder::new(),
    };
    parser.parse_file()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Name,
    Number,
    Str,
    DocComment,
    KwFn,
    KwLet,
    KwIf,
    KwElse,
    KwWhile,
    KwReturn,
    KwTrue,
    KwFalse,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semi,
    Assign,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Amp,
    AmpAmp,
    Pipe,
    PipePipe,
    Bang,
    Eof,
}

#[derive(Debug, Clone, Copy)]
struct Token {
    kind: TokenKind,
    range: SourceRange,
}

struct Lexer<'s> {
    source: &'s str,
    pos: usize,
}

impl<'s> Lexer<'s> {
    fn new(source: &'s str) -> Self {
        Lexer { source, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.source.as_bytes().get(self.pos).copied()
    }

    fn peek_second(&self) -> Option<u8> {
        self.source.as_bytes().get(self.pos + 1).copied()
    }

    fn rest(&self) -> &'s str {
        &self.source[self.pos..]
    }

    fn skip_to_line_end(&mut self) {
        while let Some(b) = self.peek() {
            if b == b'\n' {
                break;
            }
            self.pos += 1;
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                Some(b'/') if self.rest().starts_with("//") && !self.rest().starts_with("///") => {
                    self.skip_to_line_end();
                }
                _ => break,
            }
        }
    }

    fn run(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            let start = self.pos;
            let byte = match self.peek() {
                Some(byte) => byte,
                None => {
                    tokens.push(Token {
                        kind: TokenKind::Eof,
                        range: SourceRange::between(start, start),
                    });
                    return Ok(tokens);
                }
            };
            let kind = match byte {
                b'/' if self.rest().starts_with("///") => {
                    self.skip_to_line_end();
                    TokenKind::DocComment
                }
                b'0'..=b'9' => {
                    while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
                        self.pos += 1;
                    }
                    TokenKind::Number
                }
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                    while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
                        self.pos += 1;
                    }
                    keyword_or_name(&self.source[start..self.pos])
                }
                b'"' => {
                    self.pos += 1;
                    loop {
                        match self.peek() {
                            Some(b'"') => {
                                self.pos += 1;
                                break;
                            }
                            Some(b'\\') => self.pos += 2,
                            Some(_) => self.pos += 1,
                            None => {
                                return Err(ParseError {
                                    message: "unterminated string literal".to_string(),
                                    offset: start,
                                })
                            }
                        }
                    }
                    TokenKind::Str
                }
                b'&' if self.peek_second() == Some(b'&') => {
                    self.pos += 2;
                    TokenKind::AmpAmp
                }
                b'|' if self.peek_second() == Some(b'|') => {
                    self.pos += 2;
                    TokenKind::PipePipe
                }
                b'=' if self.peek_second() == Some(b'=') => {
                    self.pos += 2;
                    TokenKind::EqEq
                }
                b'!' if self.peek_second() == Some(b'=') => {
                    self.pos += 2;
                    TokenKind::NotEq
                }
                b'<' if self.peek_second() == Some(b'=') => {
                    self.pos += 2;
                    TokenKind::Le
                }
                b'>' if self.peek_second() == Some(b'=') => {
                    self.pos += 2;
                    TokenKind::Ge
                }
                _ => {
                    let kind = match byte {
                        b'(' => TokenKind::LParen,
                        b')' => TokenKind::RParen,
                        b'{' => TokenKind::LBrace,
                        b'}' => TokenKind::RBrace,
                        b',' => TokenKind::Comma,
                        b';' => TokenKind::Semi,
                        b'=' => TokenKind::Assign,
                        b'<' => TokenKind::Lt,
                        b'>' => TokenKind::Gt,
                        b'+' => TokenKind::Plus,
                        b'-' => TokenKind::Minus,
                        b'*' => TokenKind::Star,
                        b'/' => TokenKind::Slash,
                        b'%' => TokenKind::Percent,
                        b'^' => TokenKind::Caret,
                        b'&' => TokenKind::Amp,
                        b'|' => TokenKind::Pipe,
                        b'!' => TokenKind::Bang,
                        _ => {
                            let found: String = self.rest().chars().take(1).collect();
                            return Err(ParseError {
                                message: format!("unexpected character `{}`", found),
                                offset: start,
                            });
                        }
                    };
                    self.pos += 1;
                    kind
                }
            };
            tokens.push(Token {
                kind,
                range: SourceRange::between(start, self.pos),
            });
        }
    }
}

fn keyword_or_name(text: &str) -> TokenKind {
    match text {
        "fn" => TokenKind::KwFn,
        "let" => TokenKind::KwLet,
        "if" => TokenKind::KwIf,
        "else" => TokenKind::KwElse,
        "while" => TokenKind::KwWhile,
        "return" => TokenKind::KwReturn,
        "true" => TokenKind::KwTrue,
        "false" => TokenKind::KwFalse,
        _ => TokenKind::Name,
    }
}

fn infix_op(kind: TokenKind) -> Option<(Op, u8)> {
    match kind {
        TokenKind::PipePipe => Some((Op::Or, 1)),
        TokenKind::AmpAmp => Some((Op::And, 2)),
        TokenKind::Pipe => Some((Op::BitOr, 3)),
        TokenKind::Caret => Some((Op::BitXor, 4)),
        TokenKind::Amp => Some((Op::BitAnd, 5)),
        TokenKind::EqEq => Some((Op::Eq, 6)),
        TokenKind::NotEq => Some((Op::Ne, 6)),
        TokenKind::Lt => Some((Op::Lt, 7)),
        TokenKind::Le => Some((Op::Le, 7)),
        TokenKind::Gt => Some((Op::Gt, 7)),
        TokenKind::Ge => Some((Op::Ge, 7)),
        TokenKind::Plus => Some((Op::Add, 8)),
        TokenKind::Minus => Some((Op::Sub, 8)),
        TokenKind::Star => Some((Op::Mul, 9)),
        TokenKind::Slash => Some((Op::Div, 9)),
        TokenKind::Percent => Some((Op::Rem, 9)),
        _ => None,
    }
}

struct Parser<'s> {
    source: &'s str,
    tokens: Vec<Token>,
    pos: usize,
    builder: TreeBuilder,
}

impl<'s> Parser<'s> {
    fn current(&self) -> Token {
        self.tokens[self.pos]
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn bump(&mut self) -> Token {
        let token = self.current();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.at(kind) {
            Some(self.bump())
        } else {
            None
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, ParseError> {
        match self.eat(kind) {
            Some(token) => Ok(token),
            None => Err(self.error_here(&format!("expected {}", what))),
        }
    }

    fn error_here(&self, message: &str) -> ParseError {
        ParseError {
            message: message.to_string(),
            offset: self.current().range.offset,
        }
    }

    fn range_of(&self, id: NodeId) -> SourceRange {
        self.builder.range(id)
    }

    fn parse_file(mut self) -> Result<SyntaxTree, ParseError> {
        let mut items = Vec::new();
        while !self.at(TokenKind::Eof) {
            items.push(self.parse_item()?);
        }
        let range = SourceRange::between(0, self.source.len());
        let root = self.builder.node(NodeKind::SourceFile, range, items);
        Ok(self.builder.finish(root, self.source))
    }

    fn parse_item(&mut self) -> Result<NodeId, ParseError> {
        let mut docs = Vec::new();
        while let Some(token) = self.eat(TokenKind::DocComment) {
            docs.push(self.builder.node(NodeKind::DocComment, token.range, vec![]));
        }
        if self.at(TokenKind::KwFn) {
            self.parse_fn(docs)
        } else if docs.is_empty() {
            self.parse_stmt()
        } else {
            Err(self.error_here("expected `fn` after doc comment"))
        }
    }

    fn parse_fn(&mut self, docs: Vec<NodeId>) -> Result<NodeId, ParseError> {
        let fn_token = self.expect(TokenKind::KwFn, "`fn`")?;
        let name_token = self.expect(TokenKind::Name, "function name")?;
        let name = self.builder.node(NodeKind::Name, name_token.range, vec![]);
        self.expect(TokenKind::LParen, "`(`")?;
        let mut params = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                let param = self.expect(TokenKind::Name, "parameter name")?;
                params.push(self.builder.node(NodeKind::Name, param.range, vec![]));
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "`)`")?;
        let body = self.parse_block()?;

        // doc comments are part of the declaration's extent
        let start = docs
            .first()
            .map(|&doc| self.range_of(doc).offset)
            .unwrap_or(fn_token.range.offset);
        let end = self.range_of(body).end();
        let mut children = docs;
        children.push(name);
        children.extend(params);
        children.push(body);
        Ok(self
            .builder
            .node(NodeKind::FnDecl, SourceRange::between(start, end), children))
    }

    fn parse_block(&mut self) -> Result<NodeId, ParseError> {
        let open = self.expect(TokenKind::LBrace, "`{`")?;
        let mut stmts = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            stmts.push(self.parse_stmt()?);
        }
        let close = self.expect(TokenKind::RBrace, "`}`")?;
        Ok(self.builder.node(
            NodeKind::Block,
            SourceRange::between(open.range.offset, close.range.end()),
            stmts,
        ))
    }

    fn parse_stmt(&mut self) -> Result<NodeId, ParseError> {
        match self.current().kind {
            TokenKind::KwLet => {
                let kw = self.bump();
                let name_token = self.expect(TokenKind::Name, "binding name")?;
                let name = self.builder.node(NodeKind::Name, name_token.range, vec![]);
                self.expect(TokenKind::Assign, "`=`")?;
                let init = self.parse_expr()?;
                let semi = self.expect(TokenKind::Semi, "`;`")?;
                Ok(self.builder.node(
                    NodeKind::LetStmt,
                    SourceRange::between(kw.range.offset, semi.range.end()),
                    vec![name, init],
                ))
            }
            TokenKind::KwReturn => {
                let kw = self.bump();
                let mut children = Vec::new();
                if !self.at(TokenKind::Semi) {
                    children.push(self.parse_expr()?);
                }
                let semi = self.expect(TokenKind::Semi, "`;`")?;
                Ok(self.builder.node(
                    NodeKind::ReturnStmt,
                    SourceRange::between(kw.range.offset, semi.range.end()),
                    children,
                ))
            }
            TokenKind::KwIf => self.parse_if(),
            TokenKind::KwWhile => {
                let kw = self.bump();
                let cond = self.parse_expr()?;
                let body = self.parse_block()?;
                let range = SourceRange::between(kw.range.offset, self.range_of(body).end());
                Ok(self
                    .builder
                    .node(NodeKind::WhileStmt, range, vec![cond, body]))
            }
            TokenKind::LBrace => self.parse_block(),
            _ => {
                let expr = self.parse_expr()?;
                let semi = self.expect(TokenKind::Semi, "`;`")?;
                let range = SourceRange::between(self.range_of(expr).offset, semi.range.end());
                Ok(self.builder.node(NodeKind::ExprStmt, range, vec![expr]))
            }
        }
    }

    fn parse_if(&mut self) -> Result<NodeId, ParseError> {
        let kw = self.expect(TokenKind::KwIf, "`if`")?;
        let cond = self.parse_expr()?;
        let then = self.parse_block()?;
        let mut end = self.range_of(then).end();
        let mut children = vec![cond, then];
        if self.eat(TokenKind::KwElse).is_some() {
            let alt = if self.at(TokenKind::KwIf) {
                self.parse_if()?
            } else {
                self.parse_block()?
            };
            end = self.range_of(alt).end();
            children.push(alt);
        }
        Ok(self.builder.node(
            NodeKind::IfStmt,
            SourceRange::between(kw.range.offset, end),
            children,
        ))
    }

    fn parse_expr(&mut self) -> Result<NodeId, ParseError> {
        let lhs = self.parse_infix(0)?;
        if self.eat(TokenKind::Assign).is_some() {
            // right-associative: a = b = c
            let rhs = self.parse_expr()?;
            let range = SourceRange::between(self.range_of(lhs).offset, self.range_of(rhs).end());
            return Ok(self.builder.node(NodeKind::Assign, range, vec![lhs, rhs]));
        }
        Ok(lhs)
    }

    fn parse_infix(&mut self, min_power: u8) -> Result<NodeId, ParseError> {
        let mut lhs = self.parse_prefix()?;
        loop {
            let (op, power) = match infix_op(self.current().kind) {
                Some(found) => found,
                None => break,
            };
            if power < min_power {
                break;
            }
            self.bump();
            let rhs = self.parse_infix(power + 1)?;
            let range = SourceRange::between(self.range_of(lhs).offset, self.range_of(rhs).end());
            lhs = self
                .builder
                .operator_node(NodeKind::Infix, op, range, vec![lhs, rhs]);
        }
        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<NodeId, ParseError> {
        let op = match self.current().kind {
            TokenKind::Minus => Op::Neg,
            TokenKind::Bang => Op::Not,
            _ => return self.parse_postfix(),
        };
        let token = self.bump();
        let operand = self.parse_prefix()?;
        let range = SourceRange::between(token.range.offset, self.range_of(operand).end());
        Ok(self
            .builder
            .operator_node(NodeKind::Prefix, op, range, vec![operand]))
    }

    fn parse_postfix(&mut self) -> Result<NodeId, ParseError> {
        let mut expr = self.parse_primary()?;
        while self.eat(TokenKind::LParen).is_some() {
            let mut children = vec![expr];
            if !self.at(TokenKind::RParen) {
                loop {
                    children.push(self.parse_expr()?);
                    if self.eat(TokenKind::Comma).is_none() {
                        break;
                    }
                }
            }
            let close = self.expect(TokenKind::RParen, "`)`")?;
            let range =
                SourceRange::between(self.range_of(children[0]).offset, close.range.end());
            expr = self.builder.node(NodeKind::Call, range, children);
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<NodeId, ParseError> {
        let token = self.current();
        let kind = match token.kind {
            TokenKind::Name => NodeKind::Name,
            TokenKind::Number => NodeKind::NumberLit,
            TokenKind::Str => NodeKind::StringLit,
            TokenKind::KwTrue | TokenKind::KwFalse => NodeKind::BoolLit,
            TokenKind::LParen => {
                let open = self.bump();
                let inner = self.parse_expr()?;
                let close = self.expect(TokenKind::RParen, "`)`")?;
                return Ok(self.builder.node(
                    NodeKind::Paren,
                    SourceRange::between(open.range.offset, close.range.end()),
                    vec![inner],
                ));
            }
            _ => return Err(self.error_here("expected an expression")),
        };
        self.bump();
        Ok(self.builder.node(kind, token.range, vec![]))
    }
}
