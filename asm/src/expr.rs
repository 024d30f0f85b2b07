//! C-like integer expressions over 64-bit two's complement, and string
//! literals for data definitions.

use crate::{error::Error, scan};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Num(i64),
    Ident(String),
    Op(&'static str),
    Open,
    Close,
}

const OPS: [&str; 22] = [
    "||", "&&", "==", "!=", "<=", ">=", "<<", ">>", "|", "^", "&", "<", ">", "+", "-", "*", "/",
    "%", "~", "!", "(", ")",
];

fn parse_number(word: &str) -> Result<i64, Error> {
    let lower = word.to_ascii_lowercase();
    let parsed = if let Some(hex) = lower.strip_prefix("0x") {
        u64::from_str_radix(hex, 16)
    } else if let Some(bin) = lower.strip_prefix("0b") {
        u64::from_str_radix(bin, 2)
    } else if let Some(oct) = lower.strip_prefix("0o") {
        u64::from_str_radix(oct, 8)
    } else {
        lower.parse::<u64>()
    };
    parsed
        .map(|v| v as i64)
        .map_err(|_| Error::Syntax(format!("Invalid number '{word}'")))
}

/// One escape sequence after a backslash. Returns the value and the number
/// of chars consumed.
fn escape(chars: &[char]) -> Result<(u32, usize), Error> {
    let Some(&c) = chars.first() else {
        return Err(Error::Syntax("Unfinished escape sequence".to_string()));
    };
    let simple = match c {
        'a' => Some(0x07),
        'b' => Some(0x08),
        'f' => Some(0x0C),
        'n' => Some(0x0A),
        'r' => Some(0x0D),
        't' => Some(0x09),
        'v' => Some(0x0B),
        '\\' | '\'' | '"' | '?' => Some(c as u32),
        _ => None,
    };
    if let Some(v) = simple {
        return Ok((v, 1));
    }
    let (radix, skip, max) = match c {
        'x' => (16, 1, 2),
        '0'..='7' => (8, 0, 3),
        _ => return Err(Error::Syntax(format!("Unknown escape sequence '\\{c}'"))),
    };
    let digits: String = chars[skip..]
        .iter()
        .take(max)
        .take_while(|d| d.is_digit(radix))
        .collect();
    let value = u32::from_str_radix(&digits, radix)
        .map_err(|_| Error::Syntax(format!("Invalid escape sequence '\\{c}'")))?;
    Ok((value, skip + digits.len()))
}

/// Character values of a literal delimited by `quote`, starting right after
/// the opening quote. Returns the values and the index after the closing
/// quote.
fn literal(chars: &[char], quote: char) -> Result<(Vec<u32>, usize), Error> {
    let mut out = vec![];
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            c if c == quote => return Ok((out, i + 1)),
            '\\' => {
                let (value, used) = escape(&chars[i + 1..])?;
                out.push(value);
                i += used + 1;
            }
            c => {
                out.push(c as u32);
                i += 1;
            }
        }
    }
    Err(Error::Syntax(format!("Missing closing {quote}")))
}

fn tokenize(text: &str) -> Result<Vec<Token>, Error> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = vec![];
    let mut i = 0;
    'outer: while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c.is_ascii_alphanumeric() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            if scan::is_identifier(&word) {
                tokens.push(Token::Ident(word));
            } else {
                tokens.push(Token::Num(parse_number(&word)?));
            }
            continue;
        }
        if c == '\'' {
            let (values, used) = literal(&chars[i + 1..], '\'')?;
            match values[..] {
                [value] => tokens.push(Token::Num(value as i64)),
                _ => return Err(Error::Syntax("Character literal must hold one character".into())),
            }
            i += used + 1;
            continue;
        }
        for op in OPS {
            let len = op.len();
            if i + len <= chars.len() && chars[i..i + len].iter().copied().eq(op.chars()) {
                tokens.push(match op {
                    "(" => Token::Open,
                    ")" => Token::Close,
                    _ => Token::Op(op),
                });
                i += len;
                continue 'outer;
            }
        }
        return Err(Error::Syntax(format!("Unexpected character '{c}'")));
    }
    Ok(tokens)
}

// ----------------------------------------------------------------------------

/// Binary operators, lowest precedence first.
const LEVELS: [&[&str]; 10] = [
    &["||"],
    &["&&"],
    &["|"],
    &["^"],
    &["&"],
    &["==", "!="],
    &["<", "<=", ">", ">="],
    &["<<", ">>"],
    &["+", "-"],
    &["*", "/", "%"],
];

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn binary(&mut self, level: usize) -> Result<i64, Error> {
        if level == LEVELS.len() {
            return self.unary();
        }
        let mut lhs = self.binary(level + 1)?;
        while let Some(Token::Op(op)) = self.peek() {
            let op = *op;
            if !LEVELS[level].contains(&op) {
                break;
            }
            self.pos += 1;
            let rhs = self.binary(level + 1)?;
            lhs = apply(op, lhs, rhs)?;
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<i64, Error> {
        match self.next() {
            Some(Token::Op("-")) => Ok(self.unary()?.wrapping_neg()),
            Some(Token::Op("+")) => self.unary(),
            Some(Token::Op("~")) => Ok(!self.unary()?),
            Some(Token::Op("!")) => Ok((self.unary()? == 0) as i64),
            Some(Token::Num(v)) => Ok(v),
            Some(Token::Ident(name)) => Err(Error::UnknownSymbol(name)),
            Some(Token::Open) => {
                let v = self.binary(0)?;
                match self.next() {
                    Some(Token::Close) => Ok(v),
                    _ => Err(Error::Syntax("Missing closing parenthesis".to_string())),
                }
            }
            Some(Token::Op(op)) => Err(Error::Syntax(format!("Unexpected operator '{op}'"))),
            Some(Token::Close) => Err(Error::Syntax("Unexpected ')'".to_string())),
            None => Err(Error::Syntax("Unexpected end of expression".to_string())),
        }
    }
}

fn apply(op: &str, a: i64, b: i64) -> Result<i64, Error> {
    let v = match op {
        "||" => (a != 0 || b != 0) as i64,
        "&&" => (a != 0 && b != 0) as i64,
        "|" => a | b,
        "^" => a ^ b,
        "&" => a & b,
        "==" => (a == b) as i64,
        "!=" => (a != b) as i64,
        "<" => (a < b) as i64,
        "<=" => (a <= b) as i64,
        ">" => (a > b) as i64,
        ">=" => (a >= b) as i64,
        "<<" => a.wrapping_shl(b as u32),
        ">>" => a.wrapping_shr(b as u32),
        "+" => a.wrapping_add(b),
        "-" => a.wrapping_sub(b),
        "*" => a.wrapping_mul(b),
        "/" | "%" if b == 0 => return Err(Error::DivisionByZero),
        "/" => a.wrapping_div(b),
        "%" => a.wrapping_rem(b),
        _ => return Err(Error::Syntax(format!("Unknown operator '{op}'"))),
    };
    Ok(v)
}

/// Evaluate `text` as a 64-bit integer expression.
pub fn compile(text: &str) -> Result<i64, Error> {
    let tokens = tokenize(text)?;
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.binary(0)?;
    match parser.peek() {
        None => Ok(value),
        Some(token) => Err(Error::Syntax(format!("Unexpected token {token:?}"))),
    }
}

/// Whether `text` is a double-quoted string literal.
pub fn is_string_literal(text: &str) -> bool {
    let text = text.trim();
    text.len() >= 2 && text.starts_with('"') && text.ends_with('"')
}

/// Character values of a double-quoted string literal, escapes resolved.
/// The terminating zero is not included.
pub fn parse_string(text: &str) -> Result<Vec<u32>, Error> {
    let chars: Vec<char> = text.trim().chars().collect();
    if chars.first() != Some(&'"') {
        return Err(Error::Syntax("String literal must start with '\"'".to_string()));
    }
    let (values, used) = literal(&chars[1..], '"')?;
    if used + 1 != chars.len() {
        return Err(Error::Syntax("Trailing characters after string literal".to_string()));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! case {
        ($($text:expr => $value:expr,)*) => {
            $(assert_eq!(compile($text).unwrap(), $value, "{}", $text);)*
        };
    }

    #[test]
    fn test_compile() {
        case! {
            "4" => 4,
            "0x1F" => 31,
            "0b101" => 5,
            "0o17" => 15,
            "'A'" => 65,
            "'\\n'" => 10,
            "1 + 2 * 3" => 7,
            "(1 + 2) * 3" => 9,
            "-4 / 3" => -1,
            "-4 % 3" => -1,
            "1 << 4 | 1" => 17,
            "~0" => -1,
            "!5 || 3 > 2" => 1,
            "2 == 2 && 3 != 3" => 0,
            "6 & 3 ^ 1" => 3,
            "- - 5" => 5,
            "0xFFFFFFFFFFFFFFFF" => -1,
        }
    }

    #[test]
    fn test_errors() {
        assert!(matches!(compile("1 / 0"), Err(Error::DivisionByZero)));
        assert!(matches!(compile("3 % (2 - 2)"), Err(Error::DivisionByZero)));
        assert!(matches!(compile("L + 1"), Err(Error::UnknownSymbol(name)) if name == "L"));
        assert!(matches!(compile("(1 + 2"), Err(Error::Syntax(_))));
        assert!(matches!(compile("1 2"), Err(Error::Syntax(_))));
        assert!(matches!(compile(""), Err(Error::Syntax(_))));
        assert!(matches!(compile("0x"), Err(Error::Syntax(_))));
        assert_eq!(
            compile("1 $ 2").unwrap_err().to_string(),
            "Syntax Error: Unexpected character '$'"
        );
    }

    #[test]
    fn test_string() {
        assert!(is_string_literal("\"hi\""));
        assert!(!is_string_literal("'h'"));
        assert_eq!(parse_string("\"hi\"").unwrap(), vec![104, 105]);
        assert_eq!(parse_string("\"a\\tb\\\"\\x41\\101\"").unwrap(), vec![97, 9, 98, 34, 65, 65]);
        assert!(parse_string("\"open").is_err());
        assert!(parse_string("\"a\" b").is_err());
    }
}
