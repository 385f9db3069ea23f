use std::collections::HashMap;

use crate::ast::ast::{LeafKind, NodeKind};

/// Precedence of an operator; larger binds tighter.
pub type BindingPower = i32;

/// The end-of-expression guard and every non-operator node.
pub const END_BINDING_POWER: BindingPower = 0;

/// Effective left binding power of every subscript, whatever was registered.
pub const SUBSCRIPT_BINDING_POWER: BindingPower = 1000;

/// Spelling of explicit (and implicit) function application.
pub const APPLY: &str = "@";
pub const OPEN_PAREN: &str = "(";
pub const LAMBDA_ARROW: &str = "->";
pub const ARM_ARROW: &str = "=>";

/// Null denotation: how a symbol starts an expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Nud {
    Prefix { kind: NodeKind, rbp: BindingPower },
    Brackets { kind: NodeKind, close: &'static str },
    Nullary(LeafKind),
}

/// Left denotation: how a symbol continues an expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Led {
    Infix { kind: NodeKind, bp: BindingPower },
    InfixRight { kind: NodeKind, bp: BindingPower },
    Postfix { kind: NodeKind },
    /// Flattening list operator, `a, b, c` is one node with three children.
    List { kind: NodeKind, bp: BindingPower },
    Subscript { kind: NodeKind, close: &'static str },
    /// `THEN if COND else OTHERWISE`
    IfElse { kind: NodeKind, separator: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    pub spelling: String,
    pub lbp: BindingPower,
    pub nud: Option<Nud>,
    pub led: Option<Led>,
}

/// Registry of operator spellings and their parsing behaviour.
///
/// Built once before parsing and passed by reference to the lexer and the
/// parser. Registering a spelling again keeps the larger binding power.
#[derive(Debug, Clone, Default)]
pub struct OperatorTable {
    operators: HashMap<String, Operator>,
}

impl OperatorTable {
    pub fn new() -> Self {
        OperatorTable {
            operators: HashMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    pub fn get(&self, spelling: &str) -> Option<&Operator> {
        self.operators.get(spelling)
    }

    /// Left binding power of `spelling`, unknown spellings bind like the end guard.
    pub fn lbp(&self, spelling: &str) -> BindingPower {
        self.get(spelling)
            .map(|operator| operator.lbp)
            .unwrap_or(END_BINDING_POWER)
    }

    /// Every spelling, longest first so the lexer tries `==` before `=`.
    pub fn spellings_longest_first(&self) -> Vec<&str> {
        let mut spellings = self.operators.keys().map(String::as_str).collect::<Vec<&str>>();
        spellings.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        spellings
    }

    /// Registers `spelling` or raises its binding power to at least `lbp`.
    pub fn symbol(&mut self, spelling: &str, lbp: BindingPower) -> &mut Operator {
        let operator = self
            .operators
            .entry(spelling.to_string())
            .or_insert_with(|| Operator {
                spelling: spelling.to_string(),
                lbp,
                nud: None,
                led: None,
            });
        operator.lbp = operator.lbp.max(lbp);
        operator
    }

    pub fn prefix(&mut self, spelling: &str, rbp: BindingPower, kind: NodeKind) {
        self.symbol(spelling, END_BINDING_POWER).nud = Some(Nud::Prefix { kind, rbp });
    }

    pub fn infix(&mut self, spelling: &str, bp: BindingPower, kind: NodeKind) {
        self.symbol(spelling, bp).led = Some(Led::Infix { kind, bp });
    }

    pub fn infix_right(&mut self, spelling: &str, bp: BindingPower, kind: NodeKind) {
        self.symbol(spelling, bp).led = Some(Led::InfixRight { kind, bp });
    }

    pub fn postfix(&mut self, spelling: &str, bp: BindingPower, kind: NodeKind) {
        self.symbol(spelling, bp).led = Some(Led::Postfix { kind });
    }

    pub fn list(&mut self, spelling: &str, bp: BindingPower, kind: NodeKind) {
        self.symbol(spelling, bp).led = Some(Led::List { kind, bp });
    }

    /// A zero-arg keyword that parses to a leaf.
    pub fn nullary(&mut self, spelling: &str, kind: LeafKind) {
        self.symbol(spelling, END_BINDING_POWER).nud = Some(Nud::Nullary(kind));
    }

    pub fn brackets(&mut self, open: &str, close: &'static str, kind: NodeKind) {
        self.symbol(open, END_BINDING_POWER).nud = Some(Nud::Brackets { kind, close });
        self.symbol(close, END_BINDING_POWER);
    }

    /// Postfix subscription such as `array[1]`.
    ///
    /// `_bp` is accepted for symmetry with the other registrations but the
    /// effective binding power is always [`SUBSCRIPT_BINDING_POWER`].
    pub fn subscript(&mut self, open: &str, close: &'static str, _bp: BindingPower, kind: NodeKind) {
        self.symbol(open, SUBSCRIPT_BINDING_POWER).led = Some(Led::Subscript { kind, close });
        self.symbol(close, END_BINDING_POWER);
    }

    pub fn ifelse(&mut self, bp: BindingPower, kind: NodeKind) {
        self.symbol("if", bp).led = Some(Led::IfElse {
            kind,
            separator: "else",
        });
        self.symbol("else", END_BINDING_POWER);
    }
}

pub fn create_operator_table() -> OperatorTable {
    let mut table = OperatorTable::new();

    // Special
    table.prefix("p ", 0, NodeKind::Print);
    table.prefix("assert", 0, NodeKind::Assert);
    table.nullary("_", LeafKind::AlwaysTrue);
    table.nullary("return", LeafKind::Return);

    // Unary
    table.prefix("-", 100, NodeKind::Minus);
    table.prefix("+", 100, NodeKind::Plus);
    table.prefix("match", 1, NodeKind::Match);
    table.prefix(LAMBDA_ARROW, 1, NodeKind::Lambda0);
    table.postfix("!", 3, NodeKind::Call0);

    // Binary
    table.infix_right(" . ", 11, NodeKind::ComposeR);
    table.infix("$", 11, NodeKind::ComposeL);
    table.infix(LAMBDA_ARROW, 3, NodeKind::Lambda);
    table.infix(ARM_ARROW, 4, NodeKind::IfThen);
    table.infix_right("=", 2, NodeKind::Assign);
    table.infix_right(APPLY, 5, NodeKind::Call);
    table.infix_right("==", 10, NodeKind::Eq);
    table.infix("=~", 10, NodeKind::RegMatch);
    table.infix("<", 10, NodeKind::Less);
    table.infix(">", 10, NodeKind::More);
    table.infix("+", 20, NodeKind::Add);
    table.infix("-", 20, NodeKind::Sub);
    table.infix("*", 30, NodeKind::Mul);
    table.infix_right("^", 40, NodeKind::Pow);

    // Grouping
    table.brackets(OPEN_PAREN, ")", NodeKind::Parens);
    table.brackets("[", "]", NodeKind::Brackets);
    table.subscript("[", "]", -1000, NodeKind::Subscript);
    table.list(",", 5, NodeKind::Comma);
    table.ifelse(2, NodeKind::IfElse);

    table
}
