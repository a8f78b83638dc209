//! Selection expressions
//!
//! A small filter language over atoms, in the style molecular viewers use
//! for representation scoping. Category keywords pick whole residue classes,
//! field tests match per-atom annotations, and `and`/`or`/`not` with
//! parentheses combine them:
//!
//! ```
//! use molstage_core::SelectionExpr;
//!
//! let expr: SelectionExpr = "ligand and not hydrogen".parse().unwrap();
//! let ring: SelectionExpr = "resname LIG HEM or ion".parse().unwrap();
//! ```
//!
//! `not` binds tightest, then `and`, then `or`. Field tests (`resname`,
//! `name`, `element`, `chain`) take one or more arguments and match any of
//! them. Keywords are case-insensitive; arguments match case-insensitively
//! against the store's annotations.

use crate::category::Category;
use crate::error::SelectionParseError;
use crate::selection::Selection;
use crate::store::AtomStore;
use std::str::FromStr;

const BACKBONE_ATOMS: [&str; 5] = ["N", "CA", "C", "O", "OXT"];

/// Parsed selection expression tree.
#[derive(Clone, Debug, PartialEq)]
pub enum SelectionExpr {
    All,
    Empty,
    Category(Category),
    Hetero,
    Hydrogen,
    Backbone,
    Sidechain,
    ResName(Vec<String>),
    AtomName(Vec<String>),
    ElementSym(Vec<String>),
    Chain(Vec<String>),
    Not(Box<SelectionExpr>),
    And(Box<SelectionExpr>, Box<SelectionExpr>),
    Or(Box<SelectionExpr>, Box<SelectionExpr>),
}

impl SelectionExpr {
    /// Parse an expression. Errors carry the byte offset of the offending
    /// token.
    pub fn parse(input: &str) -> Result<SelectionExpr, SelectionParseError> {
        let mut parser = Parser::new(input);
        let expr = parser.parse_or()?;
        if let Some((offset, token)) = parser.peek() {
            return Err(SelectionParseError::new(
                format!("unexpected token '{token}'"),
                offset,
            ));
        }
        Ok(expr)
    }

    /// Evaluate against a store, yielding the matching atom indices.
    pub fn eval(&self, store: &AtomStore) -> Selection {
        match self {
            SelectionExpr::All => Selection::full(store.len()),
            SelectionExpr::Empty => Selection::empty(),
            SelectionExpr::Category(category) => {
                select_where(store, |i| store.categories()[i] == *category)
            }
            SelectionExpr::Hetero => select_where(store, |i| store.hetero_flags()[i]),
            SelectionExpr::Hydrogen => {
                select_where(store, |i| store.elements()[i] == pdbtbx::Element::H)
            }
            SelectionExpr::Backbone => select_where(store, |i| {
                store.categories()[i] == Category::Protein
                    && BACKBONE_ATOMS.contains(&store.atom_names()[i].as_str())
            }),
            SelectionExpr::Sidechain => select_where(store, |i| {
                store.categories()[i] == Category::Protein
                    && !BACKBONE_ATOMS.contains(&store.atom_names()[i].as_str())
            }),
            SelectionExpr::ResName(names) => {
                select_where(store, |i| names.contains(&store.res_names()[i]))
            }
            SelectionExpr::AtomName(names) => {
                select_where(store, |i| names.contains(&store.atom_names()[i]))
            }
            SelectionExpr::ElementSym(symbols) => select_where(store, |i| {
                let symbol = format!("{:?}", store.elements()[i]).to_ascii_uppercase();
                symbols.contains(&symbol)
            }),
            SelectionExpr::Chain(ids) => select_where(store, |i| {
                ids.contains(&store.chain_ids()[i].to_ascii_uppercase())
            }),
            SelectionExpr::Not(inner) => inner.eval(store).invert(store.len()),
            SelectionExpr::And(lhs, rhs) => &lhs.eval(store) & &rhs.eval(store),
            SelectionExpr::Or(lhs, rhs) => &lhs.eval(store) | &rhs.eval(store),
        }
    }
}

impl FromStr for SelectionExpr {
    type Err = SelectionParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        SelectionExpr::parse(input)
    }
}

fn select_where<F>(store: &AtomStore, predicate: F) -> Selection
where
    F: Fn(usize) -> bool,
{
    Selection::new((0..store.len()).filter(|&i| predicate(i)).collect())
}

struct Parser<'a> {
    tokens: Vec<(usize, &'a str)>,
    position: usize,
    input_len: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        let mut tokens = Vec::new();
        let mut offset = 0;
        for chunk in input.split_inclusive(|c: char| c.is_whitespace() || c == '(' || c == ')') {
            let trailing = chunk
                .chars()
                .last()
                .filter(|c| c.is_whitespace() || *c == '(' || *c == ')');
            let word = match trailing {
                Some(c) => &chunk[..chunk.len() - c.len_utf8()],
                None => chunk,
            };
            if !word.is_empty() {
                tokens.push((offset, word));
            }
            if let Some(c) = trailing {
                if !c.is_whitespace() {
                    let paren_offset = offset + chunk.len() - c.len_utf8();
                    tokens.push((paren_offset, &chunk[paren_offset - offset..]));
                }
            }
            offset += chunk.len();
        }
        Parser {
            tokens,
            position: 0,
            input_len: input.len(),
        }
    }

    fn peek(&self) -> Option<(usize, &'a str)> {
        self.tokens.get(self.position).copied()
    }

    fn advance(&mut self) -> Option<(usize, &'a str)> {
        let token = self.peek();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn parse_or(&mut self) -> Result<SelectionExpr, SelectionParseError> {
        let mut expr = self.parse_and()?;
        while let Some((_, token)) = self.peek() {
            if !token.eq_ignore_ascii_case("or") {
                break;
            }
            self.advance();
            let rhs = self.parse_and()?;
            expr = SelectionExpr::Or(Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<SelectionExpr, SelectionParseError> {
        let mut expr = self.parse_not()?;
        while let Some((_, token)) = self.peek() {
            if !token.eq_ignore_ascii_case("and") {
                break;
            }
            self.advance();
            let rhs = self.parse_not()?;
            expr = SelectionExpr::And(Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn parse_not(&mut self) -> Result<SelectionExpr, SelectionParseError> {
        if let Some((_, token)) = self.peek() {
            if token.eq_ignore_ascii_case("not") {
                self.advance();
                let inner = self.parse_not()?;
                return Ok(SelectionExpr::Not(Box::new(inner)));
            }
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<SelectionExpr, SelectionParseError> {
        let (offset, token) = self
            .advance()
            .ok_or_else(|| SelectionParseError::new("expected selection term", self.input_len))?;

        if token == "(" {
            let expr = self.parse_or()?;
            match self.advance() {
                Some((_, ")")) => return Ok(expr),
                Some((close_offset, other)) => {
                    return Err(SelectionParseError::new(
                        format!("expected ')', found '{other}'"),
                        close_offset,
                    ))
                }
                None => {
                    return Err(SelectionParseError::new("unclosed '('", self.input_len));
                }
            }
        }

        let keyword = token.to_ascii_lowercase();
        let expr = match keyword.as_str() {
            "all" | "*" => SelectionExpr::All,
            "none" => SelectionExpr::Empty,
            "protein" => SelectionExpr::Category(Category::Protein),
            "ligand" => SelectionExpr::Category(Category::Ligand),
            "water" => SelectionExpr::Category(Category::Water),
            "lipid" => SelectionExpr::Category(Category::Lipid),
            "ion" => SelectionExpr::Category(Category::Ion),
            "hetero" => SelectionExpr::Hetero,
            "hydrogen" => SelectionExpr::Hydrogen,
            "backbone" => SelectionExpr::Backbone,
            "sidechain" => SelectionExpr::Sidechain,
            "resname" => SelectionExpr::ResName(self.parse_arguments(offset, token)?),
            "name" => SelectionExpr::AtomName(self.parse_arguments(offset, token)?),
            "element" => SelectionExpr::ElementSym(self.parse_arguments(offset, token)?),
            "chain" => SelectionExpr::Chain(self.parse_arguments(offset, token)?),
            ")" => {
                return Err(SelectionParseError::new("unmatched ')'", offset));
            }
            _ => {
                return Err(SelectionParseError::new(
                    format!("unknown keyword '{token}'"),
                    offset,
                ));
            }
        };
        Ok(expr)
    }

    // One or more bare arguments, stopped by an operator, a paren or the end.
    fn parse_arguments(
        &mut self,
        keyword_offset: usize,
        keyword: &str,
    ) -> Result<Vec<String>, SelectionParseError> {
        let mut arguments = Vec::new();
        while let Some((_, token)) = self.peek() {
            if is_reserved(token) {
                break;
            }
            self.advance();
            arguments.push(token.to_ascii_uppercase());
        }
        if arguments.is_empty() {
            return Err(SelectionParseError::new(
                format!("'{keyword}' needs at least one argument"),
                keyword_offset,
            ));
        }
        Ok(arguments)
    }
}

fn is_reserved(token: &str) -> bool {
    matches!(
        token.to_ascii_lowercase().as_str(),
        "and"
            | "or"
            | "not"
            | "("
            | ")"
            | "all"
            | "*"
            | "none"
            | "protein"
            | "ligand"
            | "water"
            | "lipid"
            | "ion"
            | "hetero"
            | "hydrogen"
            | "backbone"
            | "sidechain"
            | "resname"
            | "name"
            | "element"
            | "chain"
    )
}
