#![forbid(unsafe_code)]

use crate::ast::*;
use indexmap::IndexMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("{source_name}:{line}: unexpected end of input")]
    Eof { source_name: String, line: u32 },
    #[error("{source_name}:{line}: expected {expected}, found {found:?}")]
    UnexpectedToken {
        source_name: String,
        line: u32,
        expected: &'static str,
        found: Token,
    },
    #[error("{source_name}:{line}: {message}")]
    Lex {
        source_name: String,
        line: u32,
        message: String,
    },
    #[error("read {path}: {message}")]
    Io { path: String, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Int(i64),
    Str(String),

    KwPackage,
    KwImport,
    KwType,
    KwRecord,
    KwSum,
    KwFn,
    KwConst,
    KwVal,
    KwVar,
    KwPrint,
    KwReturn,
    KwIf,
    KwElse,
    KwMatch,
    KwNew,
    KwMap,
    KwTrue,
    KwFalse,
    KwNull,

    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Lt,
    Gt,
    Colon,
    Comma,
    Dot,
    SafeDot,
    Assign,
    FatArrow,
    Question,
    Elvis,
    Plus,
    Minus,
    Star,
    Slash,

    Eof,
}

/// Parse a `.gly` file from disk.
pub fn parse_file(path: &Path) -> Result<Program, ParseError> {
    let src = fs::read_to_string(path).map_err(|e| ParseError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    parse_source(&path.display().to_string(), &src)
}

/// Parse an in-memory named source, e.g. inline code as `<inline>`.
pub fn parse_source(name: &str, src: &str) -> Result<Program, ParseError> {
    let mut parser = Parser::new(name, src)?;
    parser.parse_program()
}

#[derive(Debug, Clone)]
struct Spanned {
    token: Token,
    line: u32,
}

pub struct Parser {
    source_name: String,
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    pub fn new(source_name: &str, src: &str) -> Result<Self, ParseError> {
        let tokens = lex(source_name, src)?;
        Ok(Self {
            source_name: source_name.to_string(),
            tokens,
            pos: 0,
        })
    }

    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::default();

        if self.matches(&Token::KwPackage) {
            let name = self.parse_dotted_name()?;
            program.package = Some(PackageDecl { name });
        }
        while self.matches(&Token::KwImport) {
            let name = self.parse_dotted_name()?;
            program.imports.push(ImportDecl { name });
        }

        while !self.check(&Token::Eof) {
            if self.matches(&Token::KwType) {
                program.aliases.push(self.parse_alias()?);
            } else if self.matches(&Token::KwRecord) {
                program.records.push(self.parse_record()?);
            } else if self.matches(&Token::KwSum) {
                program.sum_types.push(self.parse_sum_type()?);
            } else if self.matches(&Token::KwFn) {
                program.functions.push(self.parse_function()?);
            } else {
                return Err(self.unexpected("declaration"));
            }
        }
        Ok(program)
    }

    fn parse_dotted_name(&mut self) -> Result<String, ParseError> {
        let mut name = self.expect_ident("name")?;
        while self.matches(&Token::Dot) {
            name.push('.');
            name.push_str(&self.expect_ident("name after '.'")?);
        }
        Ok(name)
    }

    fn parse_alias(&mut self) -> Result<TypeAliasDecl, ParseError> {
        let name = self.expect_ident("type alias name")?;
        self.expect(&Token::Assign, "'=' after alias name")?;
        let target_type = self.parse_type_name()?;
        Ok(TypeAliasDecl { name, target_type })
    }

    fn parse_record(&mut self) -> Result<RecordDecl, ParseError> {
        let name = self.expect_ident("record name")?;
        self.expect(&Token::LBrace, "'{' after record name")?;
        let mut fields = Vec::new();
        while !self.check(&Token::RBrace) {
            let mutability = if self.matches(&Token::KwVal) {
                FieldMutability::Val
            } else if self.matches(&Token::KwVar) {
                FieldMutability::Var
            } else {
                return Err(self.unexpected("'val' or 'var' field"));
            };
            let field_name = self.expect_ident("field name")?;
            self.expect(&Token::Colon, "':' after field name")?;
            let ty = self.parse_type_name()?;
            fields.push(RecordField {
                name: field_name,
                ty,
                mutability,
            });
            if !self.matches(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RBrace, "'}' to close record")?;
        Ok(RecordDecl { name, fields })
    }

    fn parse_sum_type(&mut self) -> Result<SumTypeDecl, ParseError> {
        let name = self.expect_ident("sum type name")?;
        self.expect(&Token::LBrace, "'{' after sum type name")?;
        let mut variants = Vec::new();
        while !self.check(&Token::RBrace) {
            let variant_name = self.expect_ident("variant name")?;
            let mut fields = Vec::new();
            if self.matches(&Token::LParen) {
                while !self.check(&Token::RParen) {
                    let field_name = self.expect_ident("variant field name")?;
                    self.expect(&Token::Colon, "':' after variant field name")?;
                    let ty = self.parse_type_name()?;
                    fields.push(VariantField {
                        name: field_name,
                        ty,
                    });
                    if !self.matches(&Token::Comma) {
                        break;
                    }
                }
                self.expect(&Token::RParen, "')' to close variant fields")?;
            }
            variants.push(VariantDecl {
                name: variant_name,
                fields,
            });
            if !self.matches(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RBrace, "'}' to close sum type")?;
        Ok(SumTypeDecl { name, variants })
    }

    fn parse_function(&mut self) -> Result<FunctionDecl, ParseError> {
        let name = self.expect_ident("function name")?;
        self.expect(&Token::LParen, "'(' after function name")?;
        let mut params = Vec::new();
        while !self.check(&Token::RParen) {
            let param_name = self.expect_ident("parameter name")?;
            self.expect(&Token::Colon, "':' after parameter name")?;
            let ty = self.parse_type_name()?;
            params.push(Param {
                name: param_name,
                ty,
            });
            if !self.matches(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RParen, "')' after parameters")?;
        let return_type = if self.check(&Token::LBrace) {
            "void".to_string()
        } else {
            self.parse_type_name()?
        };
        let body = self.parse_block()?;
        Ok(FunctionDecl {
            name,
            params,
            return_type,
            body,
        })
    }

    // type names are informational strings, rendered back canonically
    fn parse_type_name(&mut self) -> Result<String, ParseError> {
        let mut name = if self.matches(&Token::KwMap) {
            "map".to_string()
        } else {
            self.parse_dotted_name()?
        };
        if self.matches(&Token::Lt) {
            name.push('<');
            loop {
                name.push_str(&self.parse_type_name()?);
                if self.matches(&Token::Comma) {
                    name.push_str(", ");
                    continue;
                }
                break;
            }
            self.expect(&Token::Gt, "'>' to close type arguments")?;
            name.push('>');
        }
        if self.check(&Token::LBracket) && self.check_next(&Token::RBracket) {
            self.advance();
            self.advance();
            name.push_str("[]");
        }
        Ok(name)
    }

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        self.expect(&Token::LBrace, "'{' to start block")?;
        let mut statements = Vec::new();
        while !self.check(&Token::RBrace) {
            if self.check(&Token::Eof) {
                return Err(self.eof());
            }
            statements.push(self.parse_stmt()?);
        }
        self.advance();
        Ok(Block { statements })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let mutability = if self.matches(&Token::KwConst) {
            Some(DeclMutability::Const)
        } else if self.matches(&Token::KwVal) {
            Some(DeclMutability::Val)
        } else if self.matches(&Token::KwVar) {
            Some(DeclMutability::Var)
        } else {
            None
        };
        if let Some(mutability) = mutability {
            let name = self.expect_ident("variable name")?;
            let ty = if self.matches(&Token::Colon) {
                Some(self.parse_type_name()?)
            } else {
                None
            };
            self.expect(&Token::Assign, "'=' after variable name")?;
            let value = self.parse_expr()?;
            return Ok(Stmt::VarDecl(VarDecl {
                name,
                ty,
                mutability,
                value,
            }));
        }

        if self.matches(&Token::KwPrint) {
            return Ok(Stmt::Print(self.parse_expr()?));
        }

        if self.matches(&Token::KwReturn) {
            if self.check(&Token::RBrace) {
                return Ok(Stmt::Return(None));
            }
            return Ok(Stmt::Return(Some(self.parse_expr()?)));
        }

        // assignment target validity is the evaluator's concern
        let expr = self.parse_expr()?;
        if self.matches(&Token::Assign) {
            let value = self.parse_expr()?;
            return Ok(Stmt::Assign(AssignStmt {
                target: expr,
                value,
            }));
        }
        Ok(Stmt::Expr(expr))
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_ternary()
    }

    fn parse_ternary(&mut self) -> Result<Expr, ParseError> {
        let condition = self.parse_elvis()?;
        if self.matches(&Token::Question) {
            let if_true = self.parse_expr()?;
            self.expect(&Token::Colon, "':' in ternary expression")?;
            let if_false = self.parse_expr()?;
            return Ok(Expr::Ternary(TernaryExpr {
                condition: Box::new(condition),
                if_true: Box::new(if_true),
                if_false: Box::new(if_false),
            }));
        }
        Ok(condition)
    }

    fn parse_elvis(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_add()?;
        while self.matches(&Token::Elvis) {
            let right = self.parse_add()?;
            expr = Expr::Elvis(ElvisExpr {
                left: Box::new(expr),
                right: Box::new(right),
            });
        }
        Ok(expr)
    }

    fn parse_add(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_mul()?;
        loop {
            let op = if self.matches(&Token::Plus) {
                "+"
            } else if self.matches(&Token::Minus) {
                "-"
            } else {
                break;
            };
            let right = self.parse_mul()?;
            expr = Expr::Binary(BinaryExpr {
                op: op.to_string(),
                left: Box::new(expr),
                right: Box::new(right),
            });
        }
        Ok(expr)
    }

    fn parse_mul(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_postfix()?;
        loop {
            let op = if self.matches(&Token::Star) {
                "*"
            } else if self.matches(&Token::Slash) {
                "/"
            } else {
                break;
            };
            let right = self.parse_postfix()?;
            expr = Expr::Binary(BinaryExpr {
                op: op.to_string(),
                left: Box::new(expr),
                right: Box::new(right),
            });
        }
        Ok(expr)
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.matches(&Token::Dot) {
                let field = self.expect_ident("field name after '.'")?;
                expr = Expr::Field(FieldAccess {
                    target: Box::new(expr),
                    field,
                });
            } else if self.matches(&Token::SafeDot) {
                let field = self.expect_ident("field name after '?.'")?;
                expr = Expr::SafeField(FieldAccess {
                    target: Box::new(expr),
                    field,
                });
            } else if self.matches(&Token::LBracket) {
                let index = self.parse_expr()?;
                self.expect(&Token::RBracket, "']' to close index")?;
                expr = Expr::Index(IndexAccess {
                    target: Box::new(expr),
                    index: Box::new(index),
                });
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        if let Token::Int(v) = self.peek().clone() {
            self.advance();
            return Ok(Expr::Int(v));
        }
        if self.check(&Token::Minus) {
            if let Token::Int(v) = self.peek_next().clone() {
                self.advance();
                self.advance();
                return Ok(Expr::Int(v.wrapping_neg()));
            }
        }
        if let Token::Str(s) = self.peek().clone() {
            self.advance();
            return Ok(Expr::Str(s));
        }
        if self.matches(&Token::KwTrue) {
            return Ok(Expr::Bool(true));
        }
        if self.matches(&Token::KwFalse) {
            return Ok(Expr::Bool(false));
        }
        if self.matches(&Token::KwNull) {
            return Ok(Expr::Null);
        }
        if self.matches(&Token::KwIf) {
            return self.parse_if();
        }
        if self.matches(&Token::KwMatch) {
            return self.parse_match();
        }
        if self.matches(&Token::KwNew) {
            let element_type = self.parse_type_name()?;
            self.expect(&Token::LBracket, "'[' after array element type")?;
            let size = self.parse_expr()?;
            self.expect(&Token::RBracket, "']' to close array size")?;
            return Ok(Expr::ArrayAlloc(ArrayAlloc {
                element_type,
                size: Box::new(size),
            }));
        }
        if self.matches(&Token::KwMap) {
            return self.parse_map();
        }
        if self.matches(&Token::LParen) {
            let expr = self.parse_expr()?;
            self.expect(&Token::RParen, "')' to close expression")?;
            return Ok(expr);
        }

        if let Token::Ident(name) = self.peek().clone() {
            self.advance();
            if self.matches(&Token::LParen) {
                let mut arguments = Vec::new();
                while !self.check(&Token::RParen) {
                    arguments.push(self.parse_expr()?);
                    if !self.matches(&Token::Comma) {
                        break;
                    }
                }
                self.expect(&Token::RParen, "')' to close call")?;
                return Ok(Expr::Call(CallExpr {
                    callee: name,
                    arguments,
                }));
            }
            if self.check(&Token::LBrace) && self.looks_like_record_lit() {
                return self.parse_record_lit(name);
            }
            return Ok(Expr::Var(name));
        }

        Err(self.unexpected("expression"))
    }

    // `map<k, v>(cap)` allocates, `map<k, v>{...}` is a literal
    fn parse_map(&mut self) -> Result<Expr, ParseError> {
        self.expect(&Token::Lt, "'<' after map")?;
        let key_type = self.parse_type_name()?;
        self.expect(&Token::Comma, "',' between map key and value types")?;
        let value_type = self.parse_type_name()?;
        self.expect(&Token::Gt, "'>' to close map types")?;
        if self.matches(&Token::LParen) {
            let capacity = self.parse_expr()?;
            self.expect(&Token::RParen, "')' to close map capacity")?;
            return Ok(Expr::MapAlloc(MapAlloc {
                key_type,
                value_type,
                capacity: Box::new(capacity),
            }));
        }
        self.expect(&Token::LBrace, "'{' to open map literal")?;
        let mut entries = Vec::new();
        while !self.check(&Token::RBrace) {
            let key = self.parse_expr()?;
            self.expect(&Token::Colon, "':' after map key")?;
            let value = self.parse_expr()?;
            entries.push(MapEntry { key, value });
            if !self.matches(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RBrace, "'}' to close map literal")?;
        Ok(Expr::MapLit(MapLit {
            key_type,
            value_type,
            entries,
        }))
    }

    // `Ident {` opens a record literal only when the brace is followed by
    // `}` or by `field:` — otherwise the brace belongs to an enclosing block
    fn looks_like_record_lit(&self) -> bool {
        match self.tokens.get(self.pos + 1).map(|s| &s.token) {
            Some(Token::RBrace) => true,
            Some(Token::Ident(_)) => {
                matches!(self.tokens.get(self.pos + 2).map(|s| &s.token), Some(Token::Colon))
            }
            _ => false,
        }
    }

    fn parse_record_lit(&mut self, type_name: String) -> Result<Expr, ParseError> {
        self.expect(&Token::LBrace, "'{' to open record literal")?;
        let mut fields = IndexMap::new();
        while !self.check(&Token::RBrace) {
            let field = self.expect_ident("field name")?;
            self.expect(&Token::Colon, "':' after field name")?;
            let value = self.parse_expr()?;
            fields.insert(field, value);
            if !self.matches(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RBrace, "'}' to close record literal")?;
        Ok(Expr::RecordLit(RecordLit { type_name, fields }))
    }

    fn parse_if(&mut self) -> Result<Expr, ParseError> {
        let condition = self.parse_expr()?;
        let then_block = self.parse_block()?;
        let else_block = if self.matches(&Token::KwElse) {
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Expr::If(IfExpr {
            condition: Box::new(condition),
            then_block,
            else_block,
        }))
    }

    fn parse_match(&mut self) -> Result<Expr, ParseError> {
        let target = self.parse_expr()?;
        self.expect(&Token::LBrace, "'{' to open match")?;
        let mut cases = Vec::new();
        let mut else_expr = None;
        while !self.check(&Token::RBrace) {
            if self.matches(&Token::KwElse) {
                self.expect(&Token::FatArrow, "'=>' after else")?;
                else_expr = Some(Box::new(self.parse_expr()?));
                self.matches(&Token::Comma);
                break;
            }
            let pattern = self.parse_pattern()?;
            self.expect(&Token::FatArrow, "'=>' after pattern")?;
            let value = self.parse_expr()?;
            cases.push(MatchCase { pattern, value });
            if !self.matches(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RBrace, "'}' to close match")?;
        Ok(Expr::Match(MatchExpr {
            target: Box::new(target),
            cases,
            else_expr,
        }))
    }

    fn parse_pattern(&mut self) -> Result<Pattern, ParseError> {
        if let Token::Int(v) = self.peek().clone() {
            self.advance();
            return Ok(Pattern::Literal(Expr::Int(v)));
        }
        if self.check(&Token::Minus) {
            if let Token::Int(v) = self.peek_next().clone() {
                self.advance();
                self.advance();
                return Ok(Pattern::Literal(Expr::Int(v.wrapping_neg())));
            }
        }
        if let Token::Str(s) = self.peek().clone() {
            self.advance();
            return Ok(Pattern::Literal(Expr::Str(s)));
        }
        if self.matches(&Token::KwTrue) {
            return Ok(Pattern::Literal(Expr::Bool(true)));
        }
        if self.matches(&Token::KwFalse) {
            return Ok(Pattern::Literal(Expr::Bool(false)));
        }
        if self.matches(&Token::KwNull) {
            return Ok(Pattern::Literal(Expr::Null));
        }

        let name = self.expect_ident("pattern")?;
        if name == "_" {
            return Ok(Pattern::Wildcard);
        }
        if self.matches(&Token::LBrace) {
            let mut fields = Vec::new();
            while !self.check(&Token::RBrace) {
                let field = self.expect_ident("field name in record pattern")?;
                self.expect(&Token::Colon, "':' after field name")?;
                let pattern = self.parse_pattern()?;
                fields.push(RecordFieldPattern { field, pattern });
                if !self.matches(&Token::Comma) {
                    break;
                }
            }
            self.expect(&Token::RBrace, "'}' to close record pattern")?;
            return Ok(Pattern::Record(RecordPattern {
                type_name: name,
                fields,
            }));
        }
        if self.matches(&Token::Dot) {
            let variant = self.expect_ident("variant name")?;
            let mut fields = Vec::new();
            if self.matches(&Token::LParen) {
                while !self.check(&Token::RParen) {
                    fields.push(self.parse_pattern()?);
                    if !self.matches(&Token::Comma) {
                        break;
                    }
                }
                self.expect(&Token::RParen, "')' to close variant pattern")?;
            }
            return Ok(Pattern::Variant(VariantPattern {
                type_name: name,
                variant,
                fields,
            }));
        }
        Ok(Pattern::Var(name))
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos].token
    }

    fn peek_next(&self) -> &Token {
        self.tokens
            .get(self.pos + 1)
            .map(|s| &s.token)
            .unwrap_or(&Token::Eof)
    }

    fn check(&self, token: &Token) -> bool {
        self.peek() == token
    }

    fn check_next(&self, token: &Token) -> bool {
        self.peek_next() == token
    }

    fn matches(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            return true;
        }
        false
    }

    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn expect(&mut self, token: &Token, expected: &'static str) -> Result<(), ParseError> {
        if self.matches(token) {
            return Ok(());
        }
        Err(self.unexpected(expected))
    }

    fn expect_ident(&mut self, expected: &'static str) -> Result<String, ParseError> {
        if let Token::Ident(name) = self.peek().clone() {
            self.advance();
            return Ok(name);
        }
        Err(self.unexpected(expected))
    }

    fn line(&self) -> u32 {
        self.tokens[self.pos].line
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        if self.check(&Token::Eof) {
            return self.eof();
        }
        ParseError::UnexpectedToken {
            source_name: self.source_name.clone(),
            line: self.line(),
            expected,
            found: self.peek().clone(),
        }
    }

    fn eof(&self) -> ParseError {
        ParseError::Eof {
            source_name: self.source_name.clone(),
            line: self.line(),
        }
    }
}

fn keyword(ident: &str) -> Option<Token> {
    let token = match ident {
        "package" => Token::KwPackage,
        "import" => Token::KwImport,
        "type" => Token::KwType,
        "record" => Token::KwRecord,
        "sum" => Token::KwSum,
        "fn" => Token::KwFn,
        "const" => Token::KwConst,
        "val" => Token::KwVal,
        "var" => Token::KwVar,
        "print" => Token::KwPrint,
        "return" => Token::KwReturn,
        "if" => Token::KwIf,
        "else" => Token::KwElse,
        "match" => Token::KwMatch,
        "new" => Token::KwNew,
        "map" => Token::KwMap,
        "true" => Token::KwTrue,
        "false" => Token::KwFalse,
        "null" => Token::KwNull,
        _ => return None,
    };
    Some(token)
}

fn lex(source_name: &str, src: &str) -> Result<Vec<Spanned>, ParseError> {
    let mut tokens = Vec::new();
    let mut line: u32 = 1;
    let chars: Vec<char> = src.chars().collect();
    let mut i = 0;

    let lex_err = |line: u32, message: String| ParseError::Lex {
        source_name: source_name.to_string(),
        line,
        message,
    };

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\n' => {
                line += 1;
                i += 1;
            }
            ' ' | '\t' | '\r' | ';' => {
                i += 1;
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '0'..='9' => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value = text
                    .parse::<i64>()
                    .map_err(|_| lex_err(line, format!("invalid integer literal {text}")))?;
                tokens.push(Spanned {
                    token: Token::Int(value),
                    line,
                });
            }
            '"' => {
                i += 1;
                let mut text = String::new();
                loop {
                    match chars.get(i) {
                        None | Some('\n') => {
                            return Err(lex_err(line, "unterminated string literal".to_string()));
                        }
                        Some('"') => {
                            i += 1;
                            break;
                        }
                        Some('\\') => {
                            let escaped = match chars.get(i + 1) {
                                Some('n') => '\n',
                                Some('t') => '\t',
                                Some('"') => '"',
                                Some('\\') => '\\',
                                other => {
                                    return Err(lex_err(
                                        line,
                                        format!("invalid escape sequence {other:?}"),
                                    ));
                                }
                            };
                            text.push(escaped);
                            i += 2;
                        }
                        Some(&ch) => {
                            text.push(ch);
                            i += 1;
                        }
                    }
                }
                tokens.push(Spanned {
                    token: Token::Str(text),
                    line,
                });
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let token = keyword(&text).unwrap_or(Token::Ident(text));
                tokens.push(Spanned { token, line });
            }
            _ => {
                let (token, width) = match (c, chars.get(i + 1)) {
                    ('?', Some(':')) => (Token::Elvis, 2),
                    ('?', Some('.')) => (Token::SafeDot, 2),
                    ('=', Some('>')) => (Token::FatArrow, 2),
                    ('{', _) => (Token::LBrace, 1),
                    ('}', _) => (Token::RBrace, 1),
                    ('(', _) => (Token::LParen, 1),
                    (')', _) => (Token::RParen, 1),
                    ('[', _) => (Token::LBracket, 1),
                    (']', _) => (Token::RBracket, 1),
                    ('<', _) => (Token::Lt, 1),
                    ('>', _) => (Token::Gt, 1),
                    (':', _) => (Token::Colon, 1),
                    (',', _) => (Token::Comma, 1),
                    ('.', _) => (Token::Dot, 1),
                    ('=', _) => (Token::Assign, 1),
                    ('?', _) => (Token::Question, 1),
                    ('+', _) => (Token::Plus, 1),
                    ('-', _) => (Token::Minus, 1),
                    ('*', _) => (Token::Star, 1),
                    ('/', _) => (Token::Slash, 1),
                    _ => return Err(lex_err(line, format!("unexpected character {c:?}"))),
                };
                tokens.push(Spanned { token, line });
                i += width;
            }
        }
    }
    tokens.push(Spanned {
        token: Token::Eof,
        line,
    });
    Ok(tokens)
}
