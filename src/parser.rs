use std::{cell::RefCell, collections::VecDeque, mem::discriminant, rc::Rc};

use tracing::debug;

use crate::{
    ast::{
        Expression, ExprId, FunctionDecl, InfixOperator, Literal, LogicalOperator, Statement,
        UnaryOperator,
    },
    tokenizer::{LexicalError, Token, TokenType, Tokenizer},
};

const MAX_ARGUMENTS: usize = 255;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("syntax error on line {line}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
    /// Grammar rules that were active when the error was raised, outermost first.
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Lexical(#[from] LexicalError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}


#[derive(Debug, Clone, Default)]
struct ParseContext {
    stack: Rc<RefCell<Vec<&'static str>>>,
}

impl ParseContext {
    fn push(&self, name: &'static str) -> ParseContextGuard {
        self.stack.borrow_mut().push(name);
        ParseContextGuard::new(self.clone())
    }

    fn pop(&self) {
        self.stack.borrow_mut().pop();
    }

    fn reset(&self) {
        self.stack.borrow_mut().clear();
    }

    fn trail(&self) -> String {
        self.stack.borrow().join(" > ")
    }
}

struct ParseContextGuard {
    context: ParseContext,
}

impl ParseContextGuard {
    fn new(context: ParseContext) -> Self {
        Self { context }
    }
}

impl Drop for ParseContextGuard {
    fn drop(&mut self) {
        self.context.pop();
    }
}

/// Recursive-descent parser producing one statement per call.
///
/// Tokens are pulled from the tokenizer only when the grammar needs to look at
/// them and are kept in `tokens` until consumed.
pub struct Parser<I: Iterator<Item = char>> {
    tokenizer: Tokenizer<I>,
    tokens: VecDeque<Token>,
    pending: VecDeque<LexicalError>,
    context: ParseContext,
}

impl<'a> Parser<std::str::Chars<'a>> {
    pub fn from_source(source: &'a str) -> Self {
        Self::new(Tokenizer::from_source(source))
    }
}

impl<I: Iterator<Item = char>> Parser<I> {
    pub fn new(tokenizer: Tokenizer<I>) -> Self {
        Self {
            tokenizer,
            tokens: VecDeque::new(),
            pending: VecDeque::new(),
            context: ParseContext::default(),
        }
    }

    /// Parses the next statement, or [`Statement::End`] once the input is used up.
    ///
    /// After an error the parser skips ahead to the next statement boundary,
    /// so the following call starts on fresh ground.
    pub fn next_statement(&mut self) -> Result<Statement, ParseError> {
        if let Some(error) = self.pending.pop_front() {
            return Err(error.into());
        }

        self.context.reset();
        match self.program_statement() {
            Ok(statement) => Ok(statement),
            Err(error) => {
                debug!(%error, context = %self.context_of(&error), "synchronizing after parse error");
                self.synchronize();
                Err(error)
            }
        }
    }

    fn context_of(&self, error: &ParseError) -> String {
        match error {
            ParseError::Syntax(error) => error.context.clone(),
            ParseError::Lexical(_) => "scanner".to_string(),
        }
    }

    fn synchronize(&mut self) {
        loop {
            let boundary = self
                .peek()
                .map(|token| token.token_type.starts_statement() || token.token_type == TokenType::Eof);
            match boundary {
                Ok(true) => return,
                Ok(false) => {
                    self.tokens.pop_front();
                }
                Err(error) => self.pending.push_back(error),
            }
        }
    }

    fn program_statement(&mut self) -> Result<Statement, ParseError> {
        let _guard = self.context.push("program");
        if self.match_token(&TokenType::Eof)?.is_some() {
            return Ok(Statement::End);
        }
        self.declaration()
    }

    fn declaration(&mut self) -> Result<Statement, ParseError> {
        let _guard = self.context.push("declaration");
        if let Some(keyword) = self.match_token(&TokenType::Var)? {
            return self.var_declaration(keyword);
        }
        if let Some(keyword) = self.match_token(&TokenType::Fun)? {
            return self.function(keyword);
        }
        self.statement()
    }

    fn var_declaration(&mut self, keyword: Token) -> Result<Statement, ParseError> {
        let _guard = self.context.push("var_declaration");
        let name = self.match_identifier("expected identifier after 'var'")?;
        let initializer = match self.match_token(&TokenType::Equal)? {
            Some(_) => Some(self.expression()?),
            None => None,
        };
        self.consume(
            &TokenType::Semicolon,
            "expected ';' after variable declaration",
        )?;
        Ok(Statement::VarDeclaration {
            name: name.lexeme,
            initializer,
            line: keyword.line,
        })
    }

    fn function(&mut self, keyword: Token) -> Result<Statement, ParseError> {
        let _guard = self.context.push("function");
        let name = self.match_identifier("expected function name after 'fun'")?;
        self.consume(&TokenType::LeftParen, "expected '(' after function name")?;

        let mut params = Vec::new();
        if !self.check(&TokenType::RightParen)? {
            loop {
                if params.len() >= MAX_ARGUMENTS {
                    return Err(self.error_at_next("can't have more than 255 parameters")?);
                }
                params.push(self.match_identifier("expected parameter name")?.lexeme);
                if self.match_token(&TokenType::Comma)?.is_none() {
                    break;
                }
            }
        }
        self.consume(&TokenType::RightParen, "expected ')' after parameters")?;
        self.consume(&TokenType::LeftBrace, "expected '{' before function body")?;
        let body = self.block()?;

        Ok(Statement::FunctionDeclaration(Rc::new(FunctionDecl {
            name: name.lexeme,
            params,
            body,
            line: keyword.line,
        })))
    }

    fn statement(&mut self) -> Result<Statement, ParseError> {
        let _guard = self.context.push("statement");
        let token_type = self.peek()?.token_type.clone();
        match token_type {
            TokenType::Print => {
                let keyword = self.advance()?;
                self.print_statement(keyword)
            }
            TokenType::Assert => {
                let keyword = self.advance()?;
                self.assert_statement(keyword)
            }
            TokenType::Return => {
                let keyword = self.advance()?;
                self.return_statement(keyword)
            }
            TokenType::LeftBrace => {
                self.advance()?;
                Ok(Statement::Block(self.block()?))
            }
            TokenType::If => {
                self.advance()?;
                self.if_statement()
            }
            TokenType::While => {
                self.advance()?;
                self.while_statement()
            }
            TokenType::For => {
                self.advance()?;
                self.for_statement()
            }
            _ => self.expression_statement(),
        }
    }

    fn while_statement(&mut self) -> Result<Statement, ParseError> {
        let _guard = self.context.push("while_statement");
        self.consume(&TokenType::LeftParen, "expected '(' after 'while'")?;
        let condition = self.expression()?;
        self.consume(&TokenType::RightParen, "expected ')' after while condition")?;
        let body = self.statement()?;
        Ok(Statement::While(condition, Box::new(body)))
    }

    fn if_statement(&mut self) -> Result<Statement, ParseError> {
        let _guard = self.context.push("if_statement");
        self.consume(&TokenType::LeftParen, "expected '(' after 'if'")?;
        let condition = self.expression()?;
        self.consume(&TokenType::RightParen, "expected ')' after if condition")?;
        let then_branch = self.statement()?;
        let else_branch = match self.match_token(&TokenType::Else)? {
            Some(_) => Some(Box::new(self.statement()?)),
            None => None,
        };
        Ok(Statement::If(condition, Box::new(then_branch), else_branch))
    }

    /// `for` has no node of its own; it becomes a `while` inside a block.
    fn for_statement(&mut self) -> Result<Statement, ParseError> {
        let _guard = self.context.push("for_statement");
        self.consume(&TokenType::LeftParen, "expected '(' after 'for'")?;

        let initializer = if self.match_token(&TokenType::Semicolon)?.is_some() {
            None
        } else if let Some(keyword) = self.match_token(&TokenType::Var)? {
            Some(self.var_declaration(keyword)?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if self.check(&TokenType::Semicolon)? {
            Expression::Literal(Literal::Boolean(true))
        } else {
            self.expression()?
        };
        self.consume(&TokenType::Semicolon, "expected ';' after loop condition")?;

        let increment = if self.check(&TokenType::RightParen)? {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(&TokenType::RightParen, "expected ')' after for clauses")?;

        let mut body = self.statement()?;
        if let Some(increment) = increment {
            body = Statement::Block(vec![body, Statement::Expression(increment)]);
        }
        let mut desugared = Statement::While(condition, Box::new(body));
        if let Some(initializer) = initializer {
            desugared = Statement::Block(vec![initializer, desugared]);
        }
        Ok(desugared)
    }

    /// Statements up to the closing brace; the opening brace is already consumed.
    fn block(&mut self) -> Result<Vec<Statement>, ParseError> {
        let _guard = self.context.push("block");
        let mut statements = Vec::new();
        while !self.check(&TokenType::RightBrace)? && !self.check(&TokenType::Eof)? {
            statements.push(self.declaration()?);
        }
        self.consume(&TokenType::RightBrace, "expected '}' after block")?;
        Ok(statements)
    }

    fn print_statement(&mut self, keyword: Token) -> Result<Statement, ParseError> {
        let _guard = self.context.push("print_statement");
        let expression = self.expression()?;
        self.consume(&TokenType::Semicolon, "expected ';' after expression")?;
        Ok(Statement::Print {
            expression,
            line: keyword.line,
        })
    }

    fn assert_statement(&mut self, keyword: Token) -> Result<Statement, ParseError> {
        let _guard = self.context.push("assert_statement");
        let expression = self.expression()?;
        self.consume(&TokenType::Semicolon, "expected ';' after expression")?;
        Ok(Statement::Assert {
            expression,
            line: keyword.line,
        })
    }

    fn return_statement(&mut self, keyword: Token) -> Result<Statement, ParseError> {
        let _guard = self.context.push("return_statement");
        let value = if self.check(&TokenType::Semicolon)? {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(&TokenType::Semicolon, "expected ';' after return value")?;
        Ok(Statement::Return {
            value,
            line: keyword.line,
        })
    }

    fn expression_statement(&mut self) -> Result<Statement, ParseError> {
        let _guard = self.context.push("expression_statement");
        let expression = self.expression()?;
        self.consume(&TokenType::Semicolon, "expected ';' after expression")?;
        Ok(Statement::Expression(expression))
    }

    fn expression(&mut self) -> Result<Expression, ParseError> {
        let _guard = self.context.push("expression");
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expression, ParseError> {
        let _guard = self.context.push("assignment");
        let expr = self.logical_or()?;

        let Some(equals) = self.match_token(&TokenType::Equal)? else {
            return Ok(expr);
        };
        let value = self.assignment()?;

        match expr {
            Expression::Variable { id, name, line } => Ok(Expression::Assign {
                id,
                name,
                value: Box::new(value),
                line,
            }),
            _ => Err(self.error(equals.line, "invalid assignment target")),
        }
    }

    fn logical_or(&mut self) -> Result<Expression, ParseError> {
        let _guard = self.context.push("logical_or");
        self.logical(Self::logical_and, TokenType::Or, LogicalOperator::Or)
    }

    fn logical_and(&mut self) -> Result<Expression, ParseError> {
        let _guard = self.context.push("logical_and");
        self.logical(Self::equality, TokenType::And, LogicalOperator::And)
    }

    fn logical(
        &mut self,
        operand: fn(&mut Self) -> Result<Expression, ParseError>,
        token_type: TokenType,
        operator: LogicalOperator,
    ) -> Result<Expression, ParseError> {
        let mut expr = operand(self)?;
        while self.match_token(&token_type)?.is_some() {
            let right = operand(self)?;
            expr = Expression::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn binary(
        &mut self,
        operand: fn(&mut Self) -> Result<Expression, ParseError>,
        operator: fn(&TokenType) -> Option<InfixOperator>,
    ) -> Result<Expression, ParseError> {
        let mut expr = operand(self)?;

        loop {
            let next = self.peek()?;
            let Some(op) = operator(&next.token_type) else {
                break;
            };
            let line = self.advance()?.line;
            let right = operand(self)?;
            expr = Expression::Binary {
                left: Box::new(expr),
                operator: op,
                right: Box::new(right),
                line,
            };
        }

        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expression, ParseError> {
        let _guard = self.context.push("equality");
        self.binary(Self::comparison, |token_type| match token_type {
            TokenType::EqualEqual => Some(InfixOperator::Equal),
            TokenType::BangEqual => Some(InfixOperator::NotEqual),
            _ => None,
        })
    }

    fn comparison(&mut self) -> Result<Expression, ParseError> {
        let _guard = self.context.push("comparison");
        self.binary(Self::term, |token_type| match token_type {
            TokenType::Less => Some(InfixOperator::LessThan),
            TokenType::LessEqual => Some(InfixOperator::LessThanOrEqual),
            TokenType::Greater => Some(InfixOperator::GreaterThan),
            TokenType::GreaterEqual => Some(InfixOperator::GreaterThanOrEqual),
            _ => None,
        })
    }

    fn term(&mut self) -> Result<Expression, ParseError> {
        let _guard = self.context.push("term");
        self.binary(Self::factor, |token_type| match token_type {
            TokenType::Plus => Some(InfixOperator::Plus),
            TokenType::Minus => Some(InfixOperator::Minus),
            _ => None,
        })
    }

    fn factor(&mut self) -> Result<Expression, ParseError> {
        let _guard = self.context.push("factor");
        self.binary(Self::unary, |token_type| match token_type {
            TokenType::Star => Some(InfixOperator::Multiply),
            TokenType::Slash => Some(InfixOperator::Divide),
            _ => None,
        })
    }

    fn unary(&mut self) -> Result<Expression, ParseError> {
        let _guard = self.context.push("unary");

        let operator = match self.peek()?.token_type {
            TokenType::Minus => Some(UnaryOperator::Negate),
            TokenType::Bang => Some(UnaryOperator::Not),
            _ => None,
        };
        let Some(operator) = operator else {
            return self.call();
        };

        let line = self.advance()?.line;
        let right = self.unary()?;
        Ok(Expression::Unary {
            operator,
            right: Box::new(right),
            line,
        })
    }

    fn call(&mut self) -> Result<Expression, ParseError> {
        let _guard = self.context.push("call");
        let mut expr = self.primary()?;

        while self.match_token(&TokenType::LeftParen)?.is_some() {
            let mut arguments = Vec::new();
            if !self.check(&TokenType::RightParen)? {
                loop {
                    if arguments.len() >= MAX_ARGUMENTS {
                        return Err(self.error_at_next("can't have more than 255 arguments")?);
                    }
                    arguments.push(self.expression()?);
                    if self.match_token(&TokenType::Comma)?.is_none() {
                        break;
                    }
                }
            }
            let paren = self.consume(&TokenType::RightParen, "expected ')' after arguments")?;

            expr = Expression::Call {
                callee: Box::new(expr),
                arguments,
                line: paren.line,
            };
        }

        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expression, ParseError> {
        let _guard = self.context.push("primary");
        let token = self.peek()?.clone();

        let expr = match token.token_type {
            TokenType::Number(n) => Expression::Literal(Literal::Number(n)),
            TokenType::String(s) => Expression::Literal(Literal::String(s)),
            TokenType::True => Expression::Literal(Literal::Boolean(true)),
            TokenType::False => Expression::Literal(Literal::Boolean(false)),
            TokenType::Nil => Expression::Literal(Literal::Nil),
            TokenType::Identifier => Expression::Variable {
                id: self.next_id(),
                name: token.lexeme,
                line: token.line,
            },
            TokenType::LeftParen => {
                self.advance()?;
                let expr = self.expression()?;
                self.consume(&TokenType::RightParen, "expected ')' after expression")?;
                return Ok(Expression::Grouping(Box::new(expr)));
            }
            _ => return Err(self.error(token.line, "expected expression")),
        };

        self.advance()?;
        Ok(expr)
    }

    fn next_id(&mut self) -> ExprId {
        ExprId::fresh()
    }

    fn consume(&mut self, token_type: &TokenType, message: &str) -> Result<Token, ParseError> {
        if self.check(token_type)? {
            return self.advance();
        }
        Err(self.error_at_next(message)?)
    }

    fn match_identifier(&mut self, message: &str) -> Result<Token, ParseError> {
        self.consume(&TokenType::Identifier, message)
    }

    fn match_token(&mut self, token_type: &TokenType) -> Result<Option<Token>, ParseError> {
        if self.check(token_type)? {
            Ok(Some(self.advance()?))
        } else {
            Ok(None)
        }
    }

    /// Compares kinds only, so `Number(_)` matches any number.
    fn check(&mut self, token_type: &TokenType) -> Result<bool, ParseError> {
        let next = self.peek()?;
        Ok(discriminant(&next.token_type) == discriminant(token_type))
    }

    fn advance(&mut self) -> Result<Token, ParseError> {
        match self.tokens.pop_front() {
            Some(token) => Ok(token),
            None => Ok(self.tokenizer.next_token()?),
        }
    }

    fn peek(&mut self) -> Result<&Token, LexicalError> {
        self.peek_at(0)
    }

    fn peek_at(&mut self, offset: usize) -> Result<&Token, LexicalError> {
        while self.tokens.len() <= offset {
            let token = self.tokenizer.next_token()?;
            self.tokens.push_back(token);
        }
        Ok(&self.tokens[offset])
    }

    fn error(&self, line: usize, message: &str) -> ParseError {
        SyntaxError {
            line,
            message: message.to_string(),
            context: self.context.trail(),
        }
        .into()
    }

    fn error_at_next(&mut self, message: &str) -> Result<ParseError, ParseError> {
        let next = self.peek()?;
        let (line, location) = match next.token_type {
            TokenType::Eof => (next.line, "at end".to_string()),
            _ => (next.line, format!("at '{}'", next.lexeme)),
        };
        Ok(self.error(line, &format!("{message} ({location})")))
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn statements(source: &str) -> Vec<Statement> {
        let mut parser = Parser::from_source(source);
        let mut statements = Vec::new();
        loop {
            match parser.next_statement().expect("source should parse") {
                Statement::End => break,
                statement => statements.push(statement),
            }
        }
        statements
    }

    fn expression(source: &str) -> Expression {
        match statements(&format!("{source};")).remove(0) {
            Statement::Expression(expression) => expression,
            statement => panic!("expected an expression statement, got {statement:?}"),
        }
    }

    fn errors(source: &str) -> Vec<String> {
        let mut parser = Parser::from_source(source);
        let mut errors = Vec::new();
        loop {
            match parser.next_statement() {
                Ok(Statement::End) => break,
                Ok(_) => {}
                Err(error) => errors.push(error.to_string()),
            }
        }
        errors
    }

    #[test]
    fn test_binary_is_left_associative() {
        assert_eq!(expression("1 + 2 + 3").to_string(), "(+ (+ 1 2) 3)");
        assert_eq!(expression("8 / 4 * 2").to_string(), "(* (/ 8 4) 2)");
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            expression("-1 * (2 + 3) < 4 == !false").to_string(),
            "(== (< (* (- 1) (group (+ 2 3))) 4) (! false))"
        );
        assert_eq!(
            expression("a or b and c").to_string(),
            "(or a (and b c))"
        );
    }

    #[test]
    fn test_assignment_is_right_associative() {
        assert_eq!(expression("a = b = 1").to_string(), "(= a (= b 1))");
    }

    #[test]
    fn test_calls() {
        assert_eq!(expression("f(1, g(2))(3)").to_string(), "(call (call f 1 (call g 2)) 3)");
        assert_eq!(expression("f()").to_string(), "(call f)");
    }

    #[test]
    fn test_else_binds_to_nearest_if() {
        let parsed = statements("if (a) if (b) print 1; else print 2;");
        let [Statement::If(_, inner, None)] = parsed.as_slice() else {
            panic!("outer if should have no else branch: {parsed:?}");
        };
        assert!(matches!(inner.as_ref(), Statement::If(_, _, Some(_))));
    }

    #[test]
    fn test_for_desugars_to_while() {
        let parsed = statements("for (var i = 0; i < 3; i = i + 1) print i;");
        let [Statement::Block(outer)] = parsed.as_slice() else {
            panic!("for should become a block: {parsed:?}");
        };
        assert!(matches!(outer[0], Statement::VarDeclaration { .. }));
        let Statement::While(_, body) = &outer[1] else {
            panic!("second statement should be a while loop");
        };
        let Statement::Block(body) = body.as_ref() else {
            panic!("loop body should be a block");
        };
        assert!(matches!(body[0], Statement::Print { .. }));
        assert!(matches!(body[1], Statement::Expression(Expression::Assign { .. })));
    }

    #[test]
    fn test_function_declaration() {
        let parsed = statements("fun add(a, b) { return a + b; }");
        let [Statement::FunctionDeclaration(decl)] = parsed.as_slice() else {
            panic!("expected a function declaration: {parsed:?}");
        };
        assert_eq!(decl.name, "add");
        assert_eq!(decl.params, vec!["a".to_string(), "b".to_string()]);
        assert!(matches!(decl.body[0], Statement::Return { value: Some(_), .. }));
    }

    #[test]
    fn test_variable_ids_are_distinct() {
        let Expression::Binary { left, right, .. } = expression("x + x") else {
            panic!("expected a binary expression");
        };
        let (Expression::Variable { id: left, .. }, Expression::Variable { id: right, .. }) =
            (*left, *right)
        else {
            panic!("expected two variables");
        };
        assert_ne!(left, right);
    }

    #[test]
    fn test_variable_ids_differ_between_parsers() {
        let id = |source: &str| match expression(source) {
            Expression::Variable { id, .. } => id,
            other => panic!("expected a variable, got {other}"),
        };
        assert_ne!(id("x"), id("x"));
    }

    #[test]
    fn test_unclosed_paren() {
        assert_eq!(
            errors("(1 + 2"),
            vec!["syntax error on line 1: expected ')' after expression (at end)"]
        );
        assert_eq!(
            errors("(1 + 2;"),
            vec!["syntax error on line 1: expected ')' after expression (at ';')"]
        );
    }

    #[test]
    fn test_missing_expression() {
        assert_eq!(errors("("), vec!["syntax error on line 1: expected expression"]);
    }

    #[test]
    fn test_lexical_errors_surface_through_parser() {
        let errors = errors("(1 + 2%");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("unexpected character"), "{errors:?}");
    }

    #[test]
    fn test_one_error_per_broken_statement() {
        assert_eq!(
            errors("1 = 2; print;"),
            vec![
                "syntax error on line 1: invalid assignment target",
                "syntax error on line 1: expected expression",
            ]
        );
    }

    #[test]
    fn test_recovers_at_next_statement() {
        let mut parser = Parser::from_source("var = 1; print 2;");
        assert!(parser.next_statement().is_err());
        assert!(matches!(
            parser.next_statement(),
            Ok(Statement::Print { .. })
        ));
        assert_eq!(parser.next_statement(), Ok(Statement::End));
        assert_eq!(parser.next_statement(), Ok(Statement::End));
    }

    #[test]
    fn test_lexical_errors_while_synchronizing_are_kept() {
        let mut parser = Parser::from_source("1 + ; # @ print 1;");
        let first = parser.next_statement().unwrap_err();
        assert!(matches!(first, ParseError::Syntax(_)));
        assert!(matches!(parser.next_statement(), Err(ParseError::Lexical(_))));
        assert!(matches!(parser.next_statement(), Err(ParseError::Lexical(_))));
        assert!(matches!(parser.next_statement(), Ok(Statement::Print { .. })));
    }

    #[test]
    fn test_unterminated_block() {
        assert_eq!(
            errors("{ var x = 1;"),
            vec!["syntax error on line 1: expected '}' after block (at end)"]
        );
    }

    #[test]
    fn test_error_records_grammar_context() {
        let mut parser = Parser::from_source("print (1;");
        let Err(ParseError::Syntax(error)) = parser.next_statement() else {
            panic!("expected a syntax error");
        };
        assert!(error.context.starts_with("program > declaration > statement > print_statement"));
        assert!(error.context.ends_with("primary"));
    }
}
