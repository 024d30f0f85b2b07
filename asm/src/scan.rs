//! Identifier scanning for symbol substitution.
//!
//! A word is a maximal run of `[A-Za-z0-9_]`; it is an identifier when it
//! does not start with a digit. Quoted string and character literals are
//! copied through untouched.

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => chars.all(is_word),
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Ident(&'a str),
    Other(&'a str),
}

fn tokens(text: &str) -> Vec<Token<'_>> {
    let bytes = text.as_bytes();
    let mut out = vec![];
    let mut i = 0;
    while i < bytes.len() {
        let start = i;
        let c = bytes[i] as char;
        if is_word(c) {
            while i < bytes.len() && is_word(bytes[i] as char) {
                i += 1;
            }
            let word = &text[start..i];
            if is_identifier(word) {
                out.push(Token::Ident(word));
            } else {
                out.push(Token::Other(word));
            }
        } else if c == '"' || c == '\'' {
            i += 1;
            while i < bytes.len() && bytes[i] as char != c {
                if bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            i = (i + 1).min(bytes.len());
            out.push(Token::Other(&text[start..i]));
        } else {
            // Advance one whole char so multi-byte text stays on boundaries.
            i += text[i..].chars().next().map_or(1, |c| c.len_utf8());
            out.push(Token::Other(&text[start..i]));
        }
    }
    out
}

/// Identifiers in `text`, in order of appearance.
pub fn identifiers(text: &str) -> Vec<&str> {
    tokens(text)
        .into_iter()
        .filter_map(|t| match t {
            Token::Ident(name) => Some(name),
            Token::Other(_) => None,
        })
        .collect()
}

pub fn contains_word(text: &str, name: &str) -> bool {
    identifiers(text).contains(&name)
}

/// Replace every identifier for which `lookup` returns a value.
pub fn replace_words<F>(text: &str, mut lookup: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    for token in tokens(text) {
        match token {
            Token::Ident(name) => match lookup(name) {
                Some(value) => out.push_str(&value),
                None => out.push_str(name),
            },
            Token::Other(s) => out.push_str(s),
        }
    }
    out
}

/// Replace `\name` where `name` is not followed by another word character.
pub fn replace_parameter(text: &str, name: &str, value: &str) -> String {
    let pattern = format!("\\{name}");
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(at) = rest.find(&pattern) {
        let after = &rest[at + pattern.len()..];
        out.push_str(&rest[..at]);
        if after.chars().next().is_some_and(is_word) {
            out.push_str(&pattern);
        } else {
            out.push_str(value);
        }
        rest = after;
    }
    out.push_str(rest);
    out
}
