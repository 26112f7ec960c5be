use crate::traits::Scalar;
use std::collections::HashMap;
use thiserror::Error;

/// Variable name to value map used when evaluating expressions.
pub type Bindings = HashMap<String, f64>;

/// Errors raised while parsing, compiling, or evaluating expressions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Unbound variable: {0}")]
    UnboundVariable(String),
    #[error("Unknown function: {0}")]
    UnknownFunction(String),
    #[error("Expected {expected} variable values, got {got}")]
    Arity { expected: usize, got: usize },
    #[error("Bytecode left the VM stack unbalanced")]
    MalformedBytecode,
}

/// OpCodes for the Stack-based Virtual Machine.
/// The VM operates on a stack of `Scalar` values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpCode {
    /// Pushes a constant `f64` value onto the stack.
    LoadConst(f64),
    /// Pushes the value of a variable (by index) onto the stack.
    /// Indices follow the order the variable names were handed to the `Compiler`.
    LoadVar(usize),
    /// Pops top two values (b, a), pushes (a + b).
    Add,
    /// Pops top two values (b, a), pushes (a - b).
    Sub,
    /// Pops top two values (b, a), pushes (a * b).
    Mul,
    /// Pops top two values (b, a), pushes (a / b).
    Div,
    /// Pops top two values (b, a), pushes (a ^ b).
    Pow,
    /// Pops top value (a), pushes -a.
    Neg,
    /// Pops top value (a), pushes f(a) for a built-in function.
    Call(Function),
}

/// Represents a compiled sequence of operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bytecode {
    pub ops: Vec<OpCode>,
}

impl Bytecode {
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }
}

/// Stack-based Virtual Machine for evaluating expressions.
///
/// The VM is stateless; `execute` takes all necessary context:
/// - `bytecode`: Instructions to run.
/// - `vars`: Variable values, indexed as resolved by the `Compiler`.
/// - `stack`: A mutable buffer for intermediate computations.
///
/// Returns `None` if the bytecode underflows the stack or leaves it unbalanced.
pub struct VM;

impl VM {
    pub fn execute<T: Scalar>(bytecode: &Bytecode, vars: &[T], stack: &mut Vec<T>) -> Option<T> {
        stack.clear();

        for op in &bytecode.ops {
            match *op {
                OpCode::LoadConst(val) => stack.push(T::from_f64(val)?),
                OpCode::LoadVar(idx) => stack.push(*vars.get(idx)?),
                OpCode::Add => {
                    let b = stack.pop()?;
                    let a = stack.pop()?;
                    stack.push(a + b);
                }
                OpCode::Sub => {
                    let b = stack.pop()?;
                    let a = stack.pop()?;
                    stack.push(a - b);
                }
                OpCode::Mul => {
                    let b = stack.pop()?;
                    let a = stack.pop()?;
                    stack.push(a * b);
                }
                OpCode::Div => {
                    let b = stack.pop()?;
                    let a = stack.pop()?;
                    stack.push(a / b);
                }
                OpCode::Pow => {
                    let b = stack.pop()?;
                    let a = stack.pop()?;
                    stack.push(a.powf(b));
                }
                OpCode::Neg => {
                    let a = stack.pop()?;
                    stack.push(-a);
                }
                OpCode::Call(function) => {
                    let a = stack.pop()?;
                    stack.push(function.apply(a));
                }
            }
        }

        let result = stack.pop()?;
        if stack.is_empty() {
            Some(result)
        } else {
            None
        }
    }
}

// --- AST ---

/// Built-in single-argument functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Exp,
    Ln,
    Sqrt,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sin" => Some(Function::Sin),
            "cos" => Some(Function::Cos),
            "tan" => Some(Function::Tan),
            "exp" => Some(Function::Exp),
            "ln" => Some(Function::Ln),
            "sqrt" => Some(Function::Sqrt),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Exp => "exp",
            Function::Ln => "ln",
            Function::Sqrt => "sqrt",
        }
    }

    pub fn apply<T: Scalar>(self, a: T) -> T {
        match self {
            Function::Sin => a.sin(),
            Function::Cos => a.cos(),
            Function::Tan => a.tan(),
            Function::Exp => a.exp(),
            Function::Ln => a.ln(),
            Function::Sqrt => a.sqrt(),
        }
    }
}

/// Expression tree over named real variables.
///
/// Trees are immutable values: differentiation and simplification build new trees
/// (see `symbolic`).
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Variable(String),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Call(Function, Box<Expr>),
}

/// Compiles an AST (`Expr`) into `Bytecode`.
/// Resolves variable names to indices.
pub struct Compiler {
    pub var_map: HashMap<String, usize>,
}

impl Compiler {
    pub fn new(var_names: &[String]) -> Self {
        let mut var_map = HashMap::new();
        for (i, name) in var_names.iter().enumerate() {
            var_map.insert(name.clone(), i);
        }
        Self { var_map }
    }

    pub fn compile(&self, expr: &Expr) -> Result<Bytecode, ExprError> {
        let mut ops = Vec::new();
        self.compile_recursive(expr, &mut ops)?;
        Ok(Bytecode { ops })
    }

    fn compile_recursive(&self, expr: &Expr, ops: &mut Vec<OpCode>) -> Result<(), ExprError> {
        match expr {
            Expr::Number(n) => ops.push(OpCode::LoadConst(*n)),
            Expr::Variable(name) => match self.var_map.get(name) {
                Some(&idx) => ops.push(OpCode::LoadVar(idx)),
                None => return Err(ExprError::UnboundVariable(name.clone())),
            },
            Expr::Add(left, right)
            | Expr::Sub(left, right)
            | Expr::Mul(left, right)
            | Expr::Div(left, right)
            | Expr::Pow(left, right) => {
                self.compile_recursive(left, ops)?;
                self.compile_recursive(right, ops)?;
                ops.push(match expr {
                    Expr::Add(..) => OpCode::Add,
                    Expr::Sub(..) => OpCode::Sub,
                    Expr::Mul(..) => OpCode::Mul,
                    Expr::Div(..) => OpCode::Div,
                    _ => OpCode::Pow,
                });
            }
            Expr::Neg(operand) => {
                self.compile_recursive(operand, ops)?;
                ops.push(OpCode::Neg);
            }
            Expr::Call(function, arg) => {
                self.compile_recursive(arg, ops)?;
                ops.push(OpCode::Call(*function));
            }
        }
        Ok(())
    }
}

/// An expression compiled against a fixed, ordered list of variable names.
///
/// Compilation fails on any variable missing from that list, so execution only needs
/// one value per name.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpr {
    bytecode: Bytecode,
    variables: Vec<String>,
}

impl CompiledExpr {
    pub fn new(expr: &Expr, variables: &[&str]) -> Result<Self, ExprError> {
        let variables: Vec<String> = variables.iter().map(|v| v.to_string()).collect();
        let bytecode = Compiler::new(&variables).compile(expr)?;
        Ok(Self {
            bytecode,
            variables,
        })
    }

    /// Compiles an expression of a single variable.
    pub fn univariate(expr: &Expr, variable: &str) -> Result<Self, ExprError> {
        Self::new(expr, &[variable])
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn bytecode(&self) -> &Bytecode {
        &self.bytecode
    }

    pub fn evaluate<T: Scalar>(&self, values: &[T]) -> Result<T, ExprError> {
        if values.len() != self.variables.len() {
            return Err(ExprError::Arity {
                expected: self.variables.len(),
                got: values.len(),
            });
        }
        let mut stack = Vec::with_capacity(self.bytecode.ops.len());
        VM::execute(&self.bytecode, values, &mut stack).ok_or(ExprError::MalformedBytecode)
    }
}

impl crate::traits::Integrand for CompiledExpr {
    /// Samples a univariate expression. Arity mismatches surface as NaN so they
    /// propagate through quadrature like any other non-finite sample.
    fn value(&self, x: f64) -> f64 {
        self.evaluate(&[x]).unwrap_or(f64::NAN)
    }
}

// --- Simple Parser ---

/// Parses a string expression into an AST.
///
/// Grammar, loosest binding first: `+ -`, `* /`, unary `-`, `^` (right associative),
/// then numbers, variables, `name(expr)` calls and parentheses.
pub fn parse(input: &str) -> Result<Expr, ExprError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_expression()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(ExprError::Parse(format!(
            "Unexpected trailing token {:?}",
            token
        ))),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Identifier(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c.is_ascii_digit() || c == '.' {
            let mut num_str = String::new();
            while let Some(&d) = chars.peek() {
                if d.is_ascii_digit() || d == '.' {
                    num_str.push(d);
                    chars.next();
                } else if (d == 'e' || d == 'E') && !num_str.is_empty() {
                    // Scientific notation: 1e-6, 2.5E3
                    num_str.push(d);
                    chars.next();
                    if let Some(&sign) = chars.peek() {
                        if sign == '+' || sign == '-' {
                            num_str.push(sign);
                            chars.next();
                        }
                    }
                } else {
                    break;
                }
            }
            let value = num_str
                .parse()
                .map_err(|_| ExprError::Parse(format!("Invalid number '{}'", num_str)))?;
            tokens.push(Token::Number(value));
        } else if c.is_alphabetic() || c == '_' {
            let mut ident = String::new();
            while let Some(&d) = chars.peek() {
                if d.is_alphanumeric() || d == '_' {
                    ident.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Identifier(ident));
        } else {
            let token = match c {
                '+' => Token::Plus,
                '-' => Token::Minus,
                '*' => Token::Star,
                '/' => Token::Slash,
                '^' => Token::Caret,
                '(' => Token::LParen,
                ')' => Token::RParen,
                other => {
                    return Err(ExprError::Parse(format!(
                        "Unexpected character '{}'",
                        other
                    )))
                }
            };
            tokens.push(token);
            chars.next();
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).cloned()
    }

    fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect_rparen(&mut self) -> Result<(), ExprError> {
        match self.consume() {
            Some(Token::RParen) => Ok(()),
            _ => Err(ExprError::Parse("Expected ')'".to_string())),
        }
    }

    fn parse_expression(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_term()?;

        while let Some(token) = self.peek() {
            match token {
                Token::Plus => {
                    self.consume();
                    let right = self.parse_term()?;
                    left = Expr::Add(Box::new(left), Box::new(right));
                }
                Token::Minus => {
                    self.consume();
                    let right = self.parse_term()?;
                    left = Expr::Sub(Box::new(left), Box::new(right));
                }
                _ => break,
            }
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_unary()?;

        while let Some(token) = self.peek() {
            match token {
                Token::Star => {
                    self.consume();
                    let right = self.parse_unary()?;
                    left = Expr::Mul(Box::new(left), Box::new(right));
                }
                Token::Slash => {
                    self.consume();
                    let right = self.parse_unary()?;
                    left = Expr::Div(Box::new(left), Box::new(right));
                }
                _ => break,
            }
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        if let Some(Token::Minus) = self.peek() {
            self.consume();
            let expr = self.parse_unary()?;
            return Ok(Expr::Neg(Box::new(expr)));
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<Expr, ExprError> {
        let base = self.parse_primary()?;
        if let Some(Token::Caret) = self.peek() {
            self.consume();
            // Right associative, and the exponent may carry its own sign: 2^-x
            let exponent = self.parse_unary()?;
            return Ok(Expr::Pow(Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        match self.consume() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Identifier(name)) => {
                if let Some(Token::LParen) = self.peek() {
                    self.consume(); // eat '('
                    let function = Function::from_name(&name)
                        .ok_or_else(|| ExprError::UnknownFunction(name.clone()))?;
                    let arg = self.parse_expression()?;
                    self.expect_rparen()?;
                    Ok(Expr::Call(function, Box::new(arg)))
                } else {
                    Ok(Expr::Variable(name))
                }
            }
            Some(Token::LParen) => {
                let expr = self.parse_expression()?;
                self.expect_rparen()?;
                Ok(expr)
            }
            Some(token) => Err(ExprError::Parse(format!("Unexpected token {:?}", token))),
            None => Err(ExprError::Parse("Unexpected end of input".to_string())),
        }
    }
}
