use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::ExprId;
use crate::interner::{Interner, Symbol};
use crate::token::TokenKind;

/// State shared by every stage of one interpreter session.
///
/// Holds the string interner, the keyword table and the expression id counter.  Ids must stay
/// unique across successive runs of a session because functions declared by an earlier run
/// keep their resolved variable references alive.
#[derive(Debug)]
pub struct Context {
    interner: RefCell<Interner>,
    keywords: HashMap<Symbol, TokenKind>,
    next_expr_id: Cell<u32>,
}

impl Context {
    /// Creates a new context.
    ///
    /// Returns a Rc because the context is shared between the scanner, the parser and the
    /// evaluator.
    pub fn new() -> Rc<Self> {
        let mut interner = Interner::new();

        let mut keywords = HashMap::new();
        for (name, kind) in KEYWORDS.iter().copied() {
            keywords.insert(interner.symbol(name), kind);
        }

        Rc::new(Context {
            interner: RefCell::new(interner),
            keywords,
            next_expr_id: Cell::new(0),
        })
    }

    /// Intern the given string if needed and return its associated symbol.
    pub fn symbol(&self, name: &str) -> Symbol {
        self.interner.borrow_mut().symbol(name)
    }

    /// Return the token kind associated with the given symbol if it is a keyword.
    pub fn keyword(&self, sym: &Symbol) -> Option<TokenKind> {
        self.keywords.get(sym).copied()
    }

    /// Allocate a fresh expression id.
    pub fn expr_id(&self) -> ExprId {
        let id = self.next_expr_id.get();
        self.next_expr_id.set(id + 1);
        ExprId(id)
    }
}

const KEYWORDS: [(&str, TokenKind); 16] = [
    ("and", TokenKind::And),
    ("class", TokenKind::Class),
    ("else", TokenKind::Else),
    ("false", TokenKind::False),
    ("for", TokenKind::For),
    ("fun", TokenKind::Fun),
    ("if", TokenKind::If),
    ("nil", TokenKind::Nil),
    ("or", TokenKind::Or),
    ("print", TokenKind::Print),
    ("return", TokenKind::Return),
    ("super", TokenKind::Super),
    ("this", TokenKind::This),
    ("true", TokenKind::True),
    ("var", TokenKind::Var),
    ("while", TokenKind::While),
];
