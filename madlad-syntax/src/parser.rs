//! Tokens → syntax tree.
//!
//! Statements are separated by optional semicolons. After an error the
//! parser skips to the next statement boundary and keeps going, so one run
//! reports every independent mistake.

use crate::error::{ParseResult, ParserError, ParserErrorKind};
use crate::token::{Token, TokenKind};
use crate::utils::{binary_op, get_associativity, get_precedence, operator_id};
use madlad_core::ast::{
    AssertStmt, Binary, BindStmt, Call, Callee, ConvergeStmt, Expr, ExprKind, ExprStmt, ForStmt,
    FunctionDecl, IfStmt, ListExpr, Literal, Module, OptimizeStmt, PrintStmt, ReturnStmt, Stmt,
    StmtKind, Unary, VarRef, WhileStmt,
};
use madlad_core::ops::UnaryOp;

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    /// `tokens` must end with `Eof`
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    pub fn parse(&mut self) -> Result<Module, Vec<ParserError>> {
        let mut statements = Vec::new();
        let mut errors = Vec::new();

        while !self.at_end() {
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(error) => {
                    errors.push(error);
                    self.synchronize();
                }
            }
        }

        if errors.is_empty() {
            Ok(Module::new(statements))
        } else {
            Err(errors)
        }
    }

    fn current(&self) -> &TokenKind {
        self.tokens
            .get(self.position)
            .map_or(&TokenKind::Eof, |token| &token.kind)
    }

    fn peek_next(&self) -> &TokenKind {
        self.tokens
            .get(self.position + 1)
            .map_or(&TokenKind::Eof, |token| &token.kind)
    }

    fn at_end(&self) -> bool {
        *self.current() == TokenKind::Eof
    }

    fn consume(&mut self) {
        if !self.at_end() {
            self.position += 1;
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.current() == kind
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.consume();
            true
        } else {
            false
        }
    }

    fn error_here(&self, kind: ParserErrorKind) -> ParserError {
        let (line, column) = self
            .tokens
            .get(self.position)
            .or_else(|| self.tokens.last())
            .map_or((1, 1), |token| (token.line, token.column));
        ParserError::at(kind, line, column)
    }

    fn unexpected(&self, expected: impl Into<String>) -> ParserError {
        self.error_here(ParserErrorKind::UnexpectedToken {
            expected: expected.into(),
            found: self.current().to_string(),
        })
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<()> {
        if self.match_token(&kind) {
            Ok(())
        } else {
            Err(self.unexpected(kind.to_string()))
        }
    }

    fn expect_identifier(&mut self) -> ParseResult<String> {
        match self.current() {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.consume();
                Ok(name)
            }
            _ => Err(self.unexpected("an identifier")),
        }
    }

    /// Skip past the broken statement
    fn synchronize(&mut self) {
        self.consume();
        while !self.at_end() {
            if self.match_token(&TokenKind::Semicolon) {
                return;
            }
            if self.current().starts_statement() {
                return;
            }
            self.consume();
        }
    }

    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        let stmt = match self.current() {
            TokenKind::Define => {
                self.consume();
                self.parse_binding(true)?
            }
            TokenKind::Identifier(_) if *self.peek_next() == TokenKind::ColonEqual => {
                self.parse_binding(false)?
            }
            TokenKind::If => self.parse_if()?,
            TokenKind::While => self.parse_while()?,
            TokenKind::For => self.parse_for()?,
            TokenKind::Converge => self.parse_converge()?,
            TokenKind::Optimize => self.parse_optimize()?,
            TokenKind::Assert => self.parse_assert()?,
            TokenKind::Print => {
                self.consume();
                let value = self.parse_expression(0)?;
                Box::new(StmtKind::Print(PrintStmt { value }))
            }
            TokenKind::Fn => self.parse_function()?,
            TokenKind::Return => self.parse_return()?,
            _ => {
                let expression = self.parse_expression(0)?;
                Box::new(StmtKind::Expr(ExprStmt { expression }))
            }
        };
        self.match_token(&TokenKind::Semicolon);
        Ok(stmt)
    }

    fn parse_binding(&mut self, define: bool) -> ParseResult<Stmt> {
        let name = self.expect_identifier()?;
        self.expect(TokenKind::ColonEqual)?;
        let value = self.parse_expression(0)?;
        Ok(Box::new(StmtKind::Bind(BindStmt {
            name,
            value,
            define,
        })))
    }

    fn parse_block(&mut self) -> ParseResult<Vec<Stmt>> {
        self.expect(TokenKind::LeftCurly)?;
        let mut statements = Vec::new();
        while !self.check(&TokenKind::RightCurly) {
            if self.at_end() {
                return Err(self.unexpected(TokenKind::RightCurly.to_string()));
            }
            statements.push(self.parse_statement()?);
        }
        self.expect(TokenKind::RightCurly)?;
        Ok(statements)
    }

    fn parse_if(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::If)?;
        let condition = self.parse_expression(0)?;
        let then_body = self.parse_block()?;
        let else_body = if self.match_token(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                vec![self.parse_if()?]
            } else {
                self.parse_block()?
            }
        } else {
            Vec::new()
        };
        Ok(Box::new(StmtKind::If(IfStmt {
            condition,
            then_body,
            else_body,
        })))
    }

    fn parse_while(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::While)?;
        let condition = self.parse_expression(0)?;
        let body = self.parse_block()?;
        Ok(Box::new(StmtKind::While(WhileStmt { condition, body })))
    }

    /// `for i := 0; i < 3; i := i + 1 { ... }`
    fn parse_for(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::For)?;
        let init = self.parse_clause()?;
        self.expect(TokenKind::Semicolon)?;
        let condition = self.parse_expression(0)?;
        self.expect(TokenKind::Semicolon)?;
        let update = self.parse_clause()?;
        let body = self.parse_block()?;
        Ok(Box::new(StmtKind::For(ForStmt {
            init,
            condition,
            update,
            body,
        })))
    }

    /// Binding or bare expression in a `for` header
    fn parse_clause(&mut self) -> ParseResult<Stmt> {
        match self.current() {
            TokenKind::Define => {
                self.consume();
                self.parse_binding(true)
            }
            TokenKind::Identifier(_) if *self.peek_next() == TokenKind::ColonEqual => {
                self.parse_binding(false)
            }
            _ => {
                let expression = self.parse_expression(0)?;
                Ok(Box::new(StmtKind::Expr(ExprStmt { expression })))
            }
        }
    }

    /// `converge x with step limit 10`
    fn parse_converge(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::Converge)?;
        let target = self.expect_identifier()?;
        self.expect(TokenKind::With)?;
        let step = callee(self.expect_identifier()?);
        self.expect(TokenKind::Limit)?;
        let limit = match self.current() {
            TokenKind::Integer(n) => {
                u32::try_from(*n).map_err(|_| self.error_here(ParserErrorKind::InvalidLimit))?
            }
            _ => return Err(self.unexpected("an iteration limit")),
        };
        self.consume();
        Ok(Box::new(StmtKind::Converge(ConvergeStmt {
            target,
            step,
            limit,
        })))
    }

    /// `optimize best := select_min over a, b, c`
    fn parse_optimize(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::Optimize)?;
        let target = self.expect_identifier()?;
        self.expect(TokenKind::ColonEqual)?;
        let selector = self.expect_identifier()?;
        self.expect(TokenKind::Over)?;
        let mut candidates = vec![self.parse_expression(0)?];
        while self.match_token(&TokenKind::Comma) {
            candidates.push(self.parse_expression(0)?);
        }
        Ok(Box::new(StmtKind::Optimize(OptimizeStmt {
            target,
            selector,
            candidates,
        })))
    }

    fn parse_assert(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::Assert)?;
        let condition = self.parse_expression(0)?;
        let message = if self.match_token(&TokenKind::Comma) {
            match self.current() {
                TokenKind::Str(text) => {
                    let text = text.clone();
                    self.consume();
                    Some(text)
                }
                _ => return Err(self.unexpected("a message string")),
            }
        } else {
            None
        };
        Ok(Box::new(StmtKind::Assert(AssertStmt { condition, message })))
    }

    fn parse_function(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::Fn)?;
        let name = self.expect_identifier()?;
        self.expect(TokenKind::LeftParen)?;
        let mut params: Vec<String> = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            loop {
                if let TokenKind::Identifier(name) = self.current() {
                    if params.contains(name) {
                        let kind = ParserErrorKind::DuplicateParameter(name.clone());
                        return Err(self.error_here(kind));
                    }
                }
                params.push(self.expect_identifier()?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen)?;
        let body = self.parse_block()?;
        Ok(Box::new(StmtKind::Function(FunctionDecl { name, params, body })))
    }

    /// `return` takes no value when followed by `;`, `}` or the end of input
    fn parse_return(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::Return)?;
        let value = match self.current() {
            TokenKind::Semicolon | TokenKind::RightCurly | TokenKind::Eof => None,
            _ => Some(self.parse_expression(0)?),
        };
        Ok(Box::new(StmtKind::Return(ReturnStmt { value })))
    }

    /// Precedence climbing over binary operators
    fn parse_expression(&mut self, min_precedence: i32) -> ParseResult<Expr> {
        let mut left = self.parse_unary()?;

        loop {
            let kind = self.current().clone();
            let op_precedence = get_precedence(&kind);
            if op_precedence <= min_precedence {
                break;
            }
            let Some(op) = binary_op(&kind) else {
                break;
            };
            self.consume();

            let next_precedence = if get_associativity(&kind) {
                op_precedence
            } else {
                op_precedence - 1
            };
            let right = self.parse_expression(next_precedence)?;
            left = Box::new(ExprKind::Binary(Binary { left, op, right }));
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let op = match self.current() {
            // `-` directly on a literal is part of it, which makes i64::MIN writable
            TokenKind::Minus => {
                if let TokenKind::Integer(n) = *self.peek_next() {
                    self.consume();
                    let value = 0i64.checked_sub_unsigned(n).ok_or_else(|| {
                        self.error_here(ParserErrorKind::IntegerOverflow(format!("-{n}")))
                    })?;
                    self.consume();
                    return Ok(Box::new(ExprKind::Literal(Literal::Int(value))));
                }
                UnaryOp::Neg
            }
            TokenKind::Not => UnaryOp::Not,
            _ => return self.parse_primary(),
        };
        self.consume();
        let operand = self.parse_unary()?;
        Ok(Box::new(ExprKind::Unary(Unary { op, operand })))
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let expr = match self.current().clone() {
            TokenKind::Integer(n) => {
                let value = i64::try_from(n).map_err(|_| {
                    self.error_here(ParserErrorKind::IntegerOverflow(n.to_string()))
                })?;
                self.consume();
                ExprKind::Literal(Literal::Int(value))
            }
            TokenKind::True => {
                self.consume();
                ExprKind::Literal(Literal::Bool(true))
            }
            TokenKind::False => {
                self.consume();
                ExprKind::Literal(Literal::Bool(false))
            }
            TokenKind::Empty => {
                self.consume();
                ExprKind::Literal(Literal::Empty)
            }
            TokenKind::Symbol(name) | TokenKind::Str(name) => {
                self.consume();
                ExprKind::Literal(Literal::Sym(name))
            }
            TokenKind::State => {
                self.consume();
                ExprKind::State
            }
            TokenKind::LeftParen => {
                self.consume();
                let inner = self.parse_expression(0)?;
                self.expect(TokenKind::RightParen)?;
                return Ok(inner);
            }
            TokenKind::LeftBracket => {
                self.consume();
                let items = self.parse_arguments(TokenKind::RightBracket)?;
                ExprKind::List(ListExpr { items })
            }
            TokenKind::Identifier(name) => {
                self.consume();
                if self.match_token(&TokenKind::LeftParen) {
                    let args = self.parse_arguments(TokenKind::RightParen)?;
                    ExprKind::Call(Call {
                        callee: callee(name),
                        args,
                    })
                } else {
                    ExprKind::VarRef(VarRef { name })
                }
            }
            other => {
                return Err(self.error_here(ParserErrorKind::ExpectedExpression {
                    found: other.to_string(),
                }))
            }
        };
        Ok(Box::new(expr))
    }

    /// Comma-separated expressions up to and including `close`
    fn parse_arguments(&mut self, close: TokenKind) -> ParseResult<Vec<Expr>> {
        let mut items = Vec::new();
        if self.match_token(&close) {
            return Ok(items);
        }
        loop {
            items.push(self.parse_expression(0)?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(close)?;
        Ok(items)
    }
}

fn callee(name: String) -> Callee {
    match operator_id(&name) {
        Some(id) => Callee::OperatorId(id),
        None => Callee::Named(name),
    }
}
