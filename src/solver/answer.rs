// src/solver/answer.rs

//! Textual answer shapes exchanged with solvers.
//!
//! Grammar (whitespace is insignificant between tokens):
//! - argument list: `[a,b,c]`
//! - extension list: `[[a,b],[c]]`
//! - labeling: `[[in..],[out..],[undec..]]`
//! - labeling list: `[[[..],[..],[..]],...]`
//! - boolean: `YES` / `NO` (case-insensitive)
//!
//! Every parser returns `None` when the text does not have the expected
//! shape; callers treat that as an incorrect answer.

use std::collections::BTreeSet;

/// A set of argument names (an extension, or a set of accepted arguments).
pub type ArgumentSet = BTreeSet<String>;

/// Three-valued labeling of arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Labeling {
    pub accepted: ArgumentSet,
    pub rejected: ArgumentSet,
    pub undecided: ArgumentSet,
}

/// Sentinel a solver prints when no extension exists.
pub const NO_EXTENSION: &str = "NO";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Atom(String),
    List(Vec<Node>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    Comma,
    Atom(String),
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut atom = String::new();

    let flush = |atom: &mut String, tokens: &mut Vec<Token>| {
        if !atom.is_empty() {
            tokens.push(Token::Atom(std::mem::take(atom)));
        }
    };

    for c in text.chars() {
        match c {
            '[' | ']' | ',' => {
                flush(&mut atom, &mut tokens);
                tokens.push(match c {
                    '[' => Token::Open,
                    ']' => Token::Close,
                    _ => Token::Comma,
                });
            }
            c if c.is_whitespace() => flush(&mut atom, &mut tokens),
            c => atom.push(c),
        }
    }
    flush(&mut atom, &mut tokens);
    tokens
}

fn parse_tree(text: &str) -> Option<Node> {
    let tokens = tokenize(text);
    let mut pos = 0;
    let node = parse_node(&tokens, &mut pos)?;
    (pos == tokens.len()).then_some(node)
}

fn parse_node(tokens: &[Token], pos: &mut usize) -> Option<Node> {
    match tokens.get(*pos)? {
        Token::Atom(a) => {
            *pos += 1;
            Some(Node::Atom(a.clone()))
        }
        Token::Open => {
            *pos += 1;
            let mut items = Vec::new();
            if tokens.get(*pos) == Some(&Token::Close) {
                *pos += 1;
                return Some(Node::List(items));
            }
            loop {
                items.push(parse_node(tokens, pos)?);
                match tokens.get(*pos)? {
                    Token::Comma => *pos += 1,
                    Token::Close => {
                        *pos += 1;
                        return Some(Node::List(items));
                    }
                    _ => return None,
                }
            }
        }
        Token::Close | Token::Comma => None,
    }
}

fn as_argument_set(node: &Node) -> Option<ArgumentSet> {
    match node {
        Node::List(items) => items
            .iter()
            .map(|n| match n {
                Node::Atom(a) => Some(a.clone()),
                Node::List(_) => None,
            })
            .collect(),
        Node::Atom(_) => None,
    }
}

fn as_labeling(node: &Node) -> Option<Labeling> {
    match node {
        Node::List(parts) if parts.len() == 3 => Some(Labeling {
            accepted: as_argument_set(&parts[0])?,
            rejected: as_argument_set(&parts[1])?,
            undecided: as_argument_set(&parts[2])?,
        }),
        _ => None,
    }
}

fn as_list<T>(node: &Node, item: impl Fn(&Node) -> Option<T>) -> Option<Vec<T>> {
    match node {
        Node::List(items) => items.iter().map(item).collect(),
        Node::Atom(_) => None,
    }
}

pub fn parse_argument_list(text: &str) -> Option<ArgumentSet> {
    as_argument_set(&parse_tree(text)?)
}

pub fn parse_extension_list(text: &str) -> Option<BTreeSet<ArgumentSet>> {
    let items = as_list(&parse_tree(text)?, as_argument_set)?;
    Some(items.into_iter().collect())
}

pub fn parse_labeling(text: &str) -> Option<Labeling> {
    as_labeling(&parse_tree(text)?)
}

pub fn parse_labeling_list(text: &str) -> Option<BTreeSet<Labeling>> {
    let items = as_list(&parse_tree(text)?, as_labeling)?;
    Some(items.into_iter().collect())
}

pub fn parse_boolean(text: &str) -> Option<bool> {
    match text.trim().to_ascii_uppercase().as_str() {
        "YES" => Some(true),
        "NO" => Some(false),
        _ => None,
    }
}

/// True when the output is exactly the "no extension" sentinel.
pub fn is_no_extension(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case(NO_EXTENSION)
}

pub fn write_arguments(args: &ArgumentSet) -> String {
    let joined: Vec<&str> = args.iter().map(String::as_str).collect();
    format!("[{}]", joined.join(","))
}

pub fn write_labeling(labeling: &Labeling) -> String {
    format!(
        "[{},{},{}]",
        write_arguments(&labeling.accepted),
        write_arguments(&labeling.rejected),
        write_arguments(&labeling.undecided)
    )
}
