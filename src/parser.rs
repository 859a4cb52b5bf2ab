//! Recursive-descent parser with panic-mode error recovery.

use std::rc::Rc;

use crate::ast::{Expr, FunctionDecl, Stmt};
use crate::ctx::Context;
use crate::diag::SyntaxError;
use crate::token::{Literal, Token, TokenKind};

const MAX_ARGS: usize = 255;

type ParseResult<T> = Result<T, SyntaxError>;

/// Turn a token sequence into a list of statements.
#[derive(Debug)]
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    ctx: Rc<Context>,
    errors: Vec<SyntaxError>,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>, ctx: Rc<Context>) -> Parser {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let line = tokens.last().map_or(1, |t| t.line);
            tokens.push(Token::new(TokenKind::Eof, ctx.symbol(""), None, line));
        }
        Parser {
            tokens,
            current: 0,
            ctx,
            errors: vec![],
        }
    }

    /// Parse all statements.
    ///
    /// A syntax error does not stop parsing: the parser skips to the next statement boundary
    /// and carries on, so every independent error is reported.  The program is returned only
    /// when no error was found.
    pub fn parse_program(mut self) -> Result<Vec<Stmt>, Vec<SyntaxError>> {
        let mut prg = vec![];
        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                prg.push(stmt);
            }
        }
        tracing::trace!(
            statements = prg.len(),
            errors = self.errors.len(),
            "parsed"
        );
        if self.errors.is_empty() {
            Ok(prg)
        } else {
            Err(self.errors)
        }
    }

    /// Parse a single expression followed by end of input.
    #[cfg(test)]
    fn parse_expression(mut self) -> Result<Expr, Vec<SyntaxError>> {
        let expr = self.expression().and_then(|e| {
            if self.is_at_end() {
                Ok(e)
            } else {
                Err(SyntaxError::at_token(self.peek(), "Expect end of expression."))
            }
        });
        match expr {
            Ok(e) if self.errors.is_empty() => Ok(e),
            Ok(_) => Err(self.errors),
            Err(e) => {
                self.errors.push(e);
                Err(self.errors)
            }
        }
    }

    /// Statement boundary where errors are caught.
    fn declaration(&mut self) -> Option<Stmt> {
        let stmt = if self.matches(&[TokenKind::Var]) {
            self.var_decl()
        } else if self.matches(&[TokenKind::Fun]) {
            self.fun_decl()
        } else {
            self.statement()
        };
        match stmt {
            Ok(stmt) => Some(stmt),
            Err(e) => {
                self.errors.push(e);
                self.synchronize();
                None
            }
        }
    }

    /// Parse variable declaration.
    /// Previous token is `var`.
    fn var_decl(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "Expect variable name.")?;
        let init = if self.matches(&[TokenKind::Equal]) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(
            TokenKind::Semicolon,
            "Expect ';' after variable declaration.",
        )?;
        Ok(Stmt::Var(name, init))
    }

    /// Parse function declaration.
    /// Previous token is `fun`.
    fn fun_decl(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "Expect function name.")?;
        self.consume(TokenKind::LeftParen, "Expect '(' after function name.")?;
        let mut params = vec![];
        if !self.check(TokenKind::RightParen) {
            loop {
                if params.len() >= MAX_ARGS {
                    let e = SyntaxError::at_token(self.peek(), "Can't have more than 255 parameters.");
                    self.errors.push(e);
                }
                params.push(self.consume(TokenKind::Identifier, "Expect parameter name.")?);
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expect ')' after parameters.")?;
        self.consume(TokenKind::LeftBrace, "Expect '{' before function body.")?;
        let body = self.block()?;
        Ok(Stmt::Function(Rc::new(FunctionDecl { name, params, body })))
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        match self.peek().kind {
            TokenKind::Print => {
                self.advance();
                let expr = self.expression()?;
                self.consume(TokenKind::Semicolon, "Expect ';' after value.")?;
                Ok(Stmt::Print(expr))
            }
            TokenKind::LeftBrace => {
                self.advance();
                Ok(Stmt::Block(self.block()?))
            }
            TokenKind::If => {
                self.advance();
                self.consume(TokenKind::LeftParen, "Expect '(' after 'if'.")?;
                let cond = self.expression()?;
                self.consume(TokenKind::RightParen, "Expect ')' after if condition.")?;
                let then_branch = Box::new(self.statement()?);
                let else_branch = if self.matches(&[TokenKind::Else]) {
                    Some(Box::new(self.statement()?))
                } else {
                    None
                };
                Ok(Stmt::If(cond, then_branch, else_branch))
            }
            TokenKind::While => {
                self.advance();
                self.consume(TokenKind::LeftParen, "Expect '(' after 'while'.")?;
                let cond = self.expression()?;
                self.consume(TokenKind::RightParen, "Expect ')' after condition.")?;
                let body = Box::new(self.statement()?);
                Ok(Stmt::While(cond, body))
            }
            TokenKind::For => {
                self.advance();
                self.for_stmt()
            }
            TokenKind::Return => {
                let keyword = self.advance();
                let value = if self.check(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.expression()?)
                };
                self.consume(TokenKind::Semicolon, "Expect ';' after return value.")?;
                Ok(Stmt::Return(keyword, value))
            }
            _ => self.expr_stmt(),
        }
    }

    fn expr_stmt(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression(expr))
    }

    /// `for` has no node of its own: it is rewritten as a `while` loop wrapped in blocks.
    fn for_stmt(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'for'.")?;
        let init = if self.matches(&[TokenKind::Semicolon]) {
            None
        } else if self.matches(&[TokenKind::Var]) {
            Some(self.var_decl()?)
        } else {
            Some(self.expr_stmt()?)
        };
        let cond = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after loop condition.")?;
        let incr = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;
        if let Some(incr) = incr {
            body = Stmt::Block(vec![body, Stmt::Expression(incr)]);
        }
        let cond = cond.unwrap_or(Expr::Literal(Literal::Bool(true)));
        body = Stmt::While(cond, Box::new(body));
        if let Some(init) = init {
            body = Stmt::Block(vec![init, body]);
        }
        Ok(body)
    }

    /// Parse the statements of a block.
    /// Previous token is `{`.
    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut stmts = vec![];
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                stmts.push(stmt);
            }
        }
        self.consume(TokenKind::RightBrace, "Expect '}' after block.")?;
        Ok(stmts)
    }

    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let lhs = self.or()?;
        if self.matches(&[TokenKind::Equal]) {
            let equals = self.previous().clone();
            let rhs = self.assignment()?;
            match lhs {
                Expr::Variable(_, name) => {
                    Ok(Expr::Assign(self.ctx.expr_id(), name, Box::new(rhs)))
                }
                other => {
                    // Reported but not raised: the statement is still well formed.
                    self.errors
                        .push(SyntaxError::at_token(&equals, "Invalid assignment target."));
                    Ok(other)
                }
            }
        } else {
            Ok(lhs)
        }
    }

    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and()?;
        while self.matches(&[TokenKind::Or]) {
            let op = self.previous().clone();
            let rhs = self.and()?;
            expr = Expr::Logical(Box::new(expr), op, Box::new(rhs));
        }
        Ok(expr)
    }

    fn and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;
        while self.matches(&[TokenKind::And]) {
            let op = self.previous().clone();
            let rhs = self.equality()?;
            expr = Expr::Logical(Box::new(expr), op, Box::new(rhs));
        }
        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        self.binary(
            &[TokenKind::EqualEqual, TokenKind::BangEqual],
            Self::comparison,
        )
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        self.binary(
            &[
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
            ],
            Self::term,
        )
    }

    fn term(&mut self) -> ParseResult<Expr> {
        self.binary(&[TokenKind::Plus, TokenKind::Minus], Self::factor)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        self.binary(&[TokenKind::Star, TokenKind::Slash], Self::unary)
    }

    /// Left-associative binary level: `operand (op operand)*`.
    fn binary(
        &mut self,
        ops: &[TokenKind],
        operand: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let mut expr = operand(self)?;
        while self.matches(ops) {
            let op = self.previous().clone();
            let rhs = operand(self)?;
            expr = Expr::Binary(Box::new(expr), op, Box::new(rhs));
        }
        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.matches(&[TokenKind::Bang, TokenKind::Minus]) {
            let op = self.previous().clone();
            Ok(Expr::Unary(op, Box::new(self.unary()?)))
        } else {
            self.call()
        }
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;
        while self.matches(&[TokenKind::LeftParen]) {
            let mut args = vec![];
            if !self.check(TokenKind::RightParen) {
                loop {
                    if args.len() >= MAX_ARGS {
                        let e =
                            SyntaxError::at_token(self.peek(), "Can't have more than 255 arguments.");
                        self.errors.push(e);
                    }
                    args.push(self.expression()?);
                    if !self.matches(&[TokenKind::Comma]) {
                        break;
                    }
                }
            }
            let paren = self.consume(TokenKind::RightParen, "Expect ')' after arguments.")?;
            expr = Expr::Call(Box::new(expr), args, paren);
        }
        Ok(expr)
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        let token = self.peek().clone();
        let expr = match token.kind {
            TokenKind::False => Expr::Literal(Literal::Bool(false)),
            TokenKind::True => Expr::Literal(Literal::Bool(true)),
            TokenKind::Nil => Expr::Literal(Literal::Nil),
            TokenKind::Number | TokenKind::String => {
                Expr::Literal(token.literal.clone().unwrap_or(Literal::Nil))
            }
            TokenKind::Identifier => Expr::Variable(self.ctx.expr_id(), token),
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume(TokenKind::RightParen, "Expect ')' after expression.")?;
                return Ok(Expr::Grouping(Box::new(expr)));
            }
            _ => return Err(SyntaxError::at_token(&token, "Expect expression.")),
        };
        self.advance();
        Ok(expr)
    }

    /// Discard tokens until the probable start of the next statement.
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }
            match self.peek().kind {
                TokenKind::Class
                | TokenKind::Fun
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn matches(&mut self, kinds: &[TokenKind]) -> bool {
        if kinds.iter().any(|&k| self.check(k)) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous().clone()
    }

    fn consume(&mut self, expected: TokenKind, message: &'static str) -> ParseResult<Token> {
        if self.check(expected) {
            Ok(self.advance())
        } else {
            Err(SyntaxError::at_token(self.peek(), message))
        }
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::Location;
    use crate::printer::{print_expr, print_program};
    use crate::scanner::Scanner;
    use pretty_assertions::assert_eq;

    fn parser(input: &str) -> Parser {
        let ctx = Context::new();
        let (tokens, errors) = Scanner::new(input, ctx.clone()).scan_tokens();
        assert!(errors.is_empty(), "scan errors: {:?}", errors);
        Parser::new(tokens, ctx)
    }

    fn parse_expr(input: &str) -> Result<String, Vec<SyntaxError>> {
        parser(input).parse_expression().map(|e| print_expr(&e))
    }

    fn parse_prg(input: &str) -> Result<String, Vec<SyntaxError>> {
        parser(input).parse_program().map(|p| print_program(&p))
    }

    fn messages(input: &str) -> Vec<String> {
        match parser(input).parse_program() {
            Ok(p) => panic!("unexpected success: {:?}", p),
            Err(errors) => errors.iter().map(|e| e.to_string()).collect(),
        }
    }

    #[test]
    fn literals() -> Result<(), Vec<SyntaxError>> {
        assert_eq!(parse_expr("42")?, "42");
        assert_eq!(parse_expr("true")?, "true");
        assert_eq!(parse_expr("nil")?, "nil");
        assert_eq!(parse_expr("\"hi\"")?, "\"hi\"");
        Ok(())
    }

    #[test]
    fn unary_operators_nest() -> Result<(), Vec<SyntaxError>> {
        assert_eq!(parse_expr("--42")?, "(-(-42))");
        assert_eq!(parse_expr("!!true")?, "(!(!true))");
        Ok(())
    }

    #[test]
    fn addition_is_left_associative() -> Result<(), Vec<SyntaxError>> {
        assert_eq!(parse_expr("1 + 2 - 3")?, "((1 + 2) - 3)");
        Ok(())
    }

    #[test]
    fn factors_have_precedence_over_terms() -> Result<(), Vec<SyntaxError>> {
        assert_eq!(parse_expr("1 + 2 * 3 / 4")?, "(1 + ((2 * 3) / 4))");
        Ok(())
    }

    #[test]
    fn grouping_overrides_precedence() -> Result<(), Vec<SyntaxError>> {
        assert_eq!(parse_expr("1 * (2 + 3)")?, "(1 * (2 + 3))");
        Ok(())
    }

    #[test]
    fn comparison_binds_tighter_than_equality() -> Result<(), Vec<SyntaxError>> {
        assert_eq!(parse_expr("1 < 2 == 3 >= 4")?, "((1 < 2) == (3 >= 4))");
        Ok(())
    }

    #[test]
    fn and_binds_tighter_than_or() -> Result<(), Vec<SyntaxError>> {
        assert_eq!(parse_expr("a or b and c")?, "(a or (b and c))");
        Ok(())
    }

    #[test]
    fn assignment_is_right_associative() -> Result<(), Vec<SyntaxError>> {
        assert_eq!(parse_expr("a = b = 1")?, "(a = (b = 1))");
        Ok(())
    }

    #[test]
    fn chained_calls() -> Result<(), Vec<SyntaxError>> {
        assert_eq!(parse_expr("f(1, 2)(x)()")?, "f(1, 2)(x)()");
        Ok(())
    }

    #[test]
    fn missing_right_paren() {
        match parse_expr("(1") {
            Err(errors) => assert_eq!(
                errors,
                vec![SyntaxError {
                    line: 1,
                    location: Location::End,
                    message: "Expect ')' after expression.",
                }]
            ),
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn bad_assignment_lhs_is_reported() {
        assert_eq!(
            messages("(a) = 1;"),
            vec!["[line 1] Error at '=': Invalid assignment target."]
        );
    }

    #[test]
    fn statements() -> Result<(), Vec<SyntaxError>> {
        assert_eq!(
            parse_prg("print 1 + 2; var a; var b = a; b = 3; { a; }")?,
            "print (1 + 2);\nvar a;\nvar b = a;\n(b = 3);\n{\n    a;\n}\n"
        );
        Ok(())
    }

    #[test]
    fn if_else_and_while() -> Result<(), Vec<SyntaxError>> {
        assert_eq!(
            parse_prg("if (a) print 1; else print 2; while (a) a = false;")?,
            "if (a) print 1; else print 2;\nwhile (a) (a = false);\n"
        );
        Ok(())
    }

    #[test]
    fn dangling_else_binds_to_nearest_if() -> Result<(), Vec<SyntaxError>> {
        assert_eq!(
            parse_prg("if (a) if (b) print 1; else print 2;")?,
            "if (a) if (b) print 1; else print 2;\n"
        );
        Ok(())
    }

    #[test]
    fn for_is_desugared_into_while() -> Result<(), Vec<SyntaxError>> {
        assert_eq!(
            parse_prg("for (var i = 0; i < 2; i = i + 1) print i;")?,
            "{\n    var i = 0;\n    while ((i < 2)) {\n        print i;\n        (i = (i + 1));\n    }\n}\n"
        );
        assert_eq!(parse_prg("for (;;) print 1;")?, "while (true) print 1;\n");
        Ok(())
    }

    #[test]
    fn function_declaration_and_return() -> Result<(), Vec<SyntaxError>> {
        assert_eq!(
            parse_prg("fun add(a, b) { return a + b; } fun nop() { return; }")?,
            "fun add(a, b) {\n    return (a + b);\n}\nfun nop() {\n    return;\n}\n"
        );
        Ok(())
    }

    #[test]
    fn empty_program() -> Result<(), Vec<SyntaxError>> {
        assert_eq!(parse_prg("")?, "");
        Ok(())
    }

    #[test]
    fn missing_semicolon_at_end() {
        assert_eq!(
            messages("print 1"),
            vec!["[line 1] Error at end: Expect ';' after value."]
        );
    }

    #[test]
    fn recovery_reports_each_bad_statement() {
        assert_eq!(
            messages("var = 1;\nprint 2;\nprint (3;\n"),
            vec![
                "[line 1] Error at '=': Expect variable name.",
                "[line 3] Error at ';': Expect ')' after expression.",
            ]
        );
    }

    #[test]
    fn recovery_stops_before_statement_keyword() {
        assert_eq!(
            messages("1 + ; var x = ; print x"),
            vec![
                "[line 1] Error at ';': Expect expression.",
                "[line 1] Error at ';': Expect expression.",
                "[line 1] Error at end: Expect ';' after value.",
            ]
        );
    }

    #[test]
    fn error_inside_block_does_not_lose_block_end() {
        assert_eq!(
            messages("{ var 1; } print 1;"),
            vec!["[line 1] Error at '1': Expect variable name."]
        );
    }

    #[test]
    fn function_errors() {
        assert_eq!(
            messages("fun (a) {}"),
            vec!["[line 1] Error at '(': Expect function name."]
        );
        assert_eq!(
            messages("fun f(a b) {}"),
            vec!["[line 1] Error at 'b': Expect ')' after parameters."]
        );
    }

    #[test]
    fn for_errors() {
        assert_eq!(
            messages("for x"),
            vec!["[line 1] Error at 'x': Expect '(' after 'for'."]
        );
        assert_eq!(
            messages("for (;1 2) print 1;"),
            vec!["[line 1] Error at '2': Expect ';' after loop condition."]
        );
        assert_eq!(
            messages("for (;; 1 print 1;"),
            vec!["[line 1] Error at 'print': Expect ')' after for clauses."]
        );
    }

    #[test]
    fn function_body_needs_braces() {
        assert_eq!(
            messages("fun f() print 1;"),
            vec!["[line 1] Error at 'print': Expect '{' before function body."]
        );
    }

    #[test]
    fn unclosed_block() {
        assert_eq!(
            messages("{ print 1;"),
            vec!["[line 1] Error at end: Expect '}' after block."]
        );
    }

    #[test]
    fn unclosed_call() {
        assert_eq!(
            messages("f(1, 2;"),
            vec!["[line 1] Error at ';': Expect ')' after arguments."]
        );
    }

    #[test]
    fn return_needs_semicolon() {
        assert_eq!(
            messages("fun f() { return 1 2; }"),
            vec!["[line 1] Error at '2': Expect ';' after return value."]
        );
    }

    #[test]
    fn too_many_parameters_does_not_stop_parsing() {
        let params = (0..256).map(|i| format!("p{}", i)).collect::<Vec<_>>().join(", ");
        assert_eq!(
            messages(&format!("fun f({}) {{}}\nvar = 1;", params)),
            vec![
                "[line 1] Error at 'p255': Can't have more than 255 parameters.",
                "[line 2] Error at '=': Expect variable name.",
            ]
        );
    }

    #[test]
    fn overflowing_literal_prints_back_stably() -> Result<(), Vec<SyntaxError>> {
        let printed = parse_expr(&"9".repeat(400))?;
        assert_eq!(parse_expr(&printed)?, printed);
        Ok(())
    }

    #[test]
    fn too_many_arguments() {
        let args = vec!["1"; 256].join(", ");
        assert_eq!(
            messages(&format!("f({});", args)),
            vec!["[line 1] Error at '1': Can't have more than 255 arguments."]
        );
    }
}
