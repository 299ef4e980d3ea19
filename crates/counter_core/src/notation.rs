//! Notation normalizer: rewrites a raw post title into an evaluator-ready form.
//!
//! Titles arrive in whatever notation the poster felt like using. This module
//! only rewrites and classifies; evaluation happens in the resolver.

/// Superscript digits, indexed by the ASCII digit they stand for.
pub const SUPERSCRIPT_DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];

/// Subscript digits, indexed by the ASCII digit they stand for.
pub const SUBSCRIPT_DIGITS: [char; 10] = ['₀', '₁', '₂', '₃', '₄', '₅', '₆', '₇', '₈', '₉'];

const CHOOSE_TOKEN: &str = "choose";

/// Evaluator function that postfix `!` is rewritten into.
pub const FACTORIAL_FN: &str = "factorial";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalForm {
    /// Ready for the generic expression evaluator.
    PlainArithmetic(String),
    /// `n choose k`.
    Combinatorial { n: i64, k: i64 },
    /// `digits` written in `base`, e.g. `101₂`.
    BaseConversion { digits: String, base: u32 },
    Unrecognized,
}

/// Map a superscript digit to its ASCII digit.
pub fn superscript_digit(c: char) -> Option<char> {
    table_digit(&SUPERSCRIPT_DIGITS, c)
}

/// Map a subscript digit to its ASCII digit.
pub fn subscript_digit(c: char) -> Option<char> {
    table_digit(&SUBSCRIPT_DIGITS, c)
}

fn table_digit(table: &[char; 10], c: char) -> Option<char> {
    table
        .iter()
        .position(|&entry| entry == c)
        .and_then(|digit| char::from_digit(digit as u32, 10))
}

/// Classify `raw` and rewrite it into canonical form.
///
/// Whitespace is stripped and the Unicode minus made ASCII first. A `choose`
/// phrase wins over everything else, then a subscript base marker; only what
/// is left goes through the symbol, exponent, implicit product and factorial
/// rewrites.
pub fn normalize(raw: &str) -> CanonicalForm {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '\u{2212}' { '-' } else { c })
        .collect();

    if compact.to_lowercase().contains(CHOOSE_TOKEN) {
        return combinatorial(&compact);
    }
    if let Some(form) = base_conversion(&compact) {
        return form;
    }

    let substituted = substitute_symbols(&compact);
    let exponent = expand_superscript_exponent(&substituted);
    let expression = expand_factorials(&insert_implicit_products(&exponent));

    if expression.is_empty() || !expression.chars().all(is_arithmetic_char) {
        return CanonicalForm::Unrecognized;
    }
    CanonicalForm::PlainArithmetic(expression)
}

/// Rewrite the minus sign, multiplication and division symbols to ASCII.
pub fn substitute_symbols(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2212}' => '-',
            'x' | '×' | '⋅' => '*',
            '÷' => '/',
            other => other,
        })
        .collect()
}

/// Turn the first superscript run into a `^` exponent, e.g. `2³` into `2^3`.
pub fn expand_superscript_exponent(text: &str) -> String {
    let Some(start) = text.find(|c: char| superscript_digit(c).is_some()) else {
        return text.to_string();
    };

    let mut out = String::with_capacity(text.len() + 1);
    out.push_str(&text[..start]);
    out.push('^');

    let mut rest = text[start..].chars().peekable();
    while let Some(digit) = rest.peek().copied().and_then(superscript_digit) {
        out.push(digit);
        rest.next();
    }
    out.extend(rest);
    out
}

/// Make a product written by juxtaposition explicit: `2(3+4)` becomes
/// `2*(3+4)` and `(1+1)(2)` becomes `(1+1)*(2)`. A number that ends an
/// identifier (`log10(`) is a function call and is left alone.
pub fn insert_implicit_products(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    let mut in_identifier = false;
    let mut prev: Option<char> = None;

    for c in text.chars() {
        let after_number = prev.is_some_and(|p| p.is_ascii_digit() || p == '.') && !in_identifier;
        let after_group = prev == Some(')');
        if (c == '(' && (after_number || after_group))
            || (after_group && c.is_ascii_alphanumeric())
        {
            out.push('*');
        }

        in_identifier = if c.is_ascii_alphabetic() {
            true
        } else {
            in_identifier && c.is_ascii_digit()
        };
        out.push(c);
        prev = Some(c);
    }
    out
}

/// Rewrite every postfix `!` as a call, e.g. `3!+1` into `factorial(3)+1`
/// and `(1+2)!` into `factorial((1+2))`. A `!` with no operand in front of
/// it is left in place.
pub fn expand_factorials(text: &str) -> String {
    let mut out = text.to_string();
    while let Some(bang) = out.find('!') {
        let Some(start) = operand_start(&out[..bang]) else {
            break;
        };
        out = format!(
            "{}{}({}){}",
            &out[..start],
            FACTORIAL_FN,
            &out[start..bang],
            &out[bang + 1..]
        );
    }
    out
}

/// Byte offset where the operand ending at `before.len()` starts: a
/// parenthesized group with any function name in front of it, or a run of
/// number or identifier characters.
fn operand_start(before: &str) -> Option<usize> {
    let bytes = before.as_bytes();
    let mut idx = bytes.len();

    if bytes.last() == Some(&b')') {
        let mut depth = 0usize;
        loop {
            idx = idx.checked_sub(1)?;
            match bytes[idx] {
                b')' => depth += 1,
                b'(' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    while idx > 0 && (bytes[idx - 1].is_ascii_alphanumeric() || bytes[idx - 1] == b'.') {
        idx -= 1;
    }
    (idx < bytes.len()).then_some(idx)
}

fn is_arithmetic_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '*' | '/' | '^' | '%' | '(' | ')' | '.' | ',')
}

fn combinatorial(text: &str) -> CanonicalForm {
    let mut literals = integer_literals(text)
        .into_iter()
        .map(str::parse::<i64>);
    match (literals.next(), literals.next()) {
        (Some(Ok(n)), Some(Ok(k))) => CanonicalForm::Combinatorial { n, k },
        _ => CanonicalForm::Unrecognized,
    }
}

fn base_conversion(text: &str) -> Option<CanonicalForm> {
    let start = text.find(|c: char| subscript_digit(c).is_some())?;
    let base: String = text[start..].chars().map_while(subscript_digit).collect();

    Some(match base.parse::<u32>() {
        Ok(base) => CanonicalForm::BaseConversion {
            digits: text[..start].to_string(),
            base,
        },
        Err(_) => CanonicalForm::Unrecognized,
    })
}

/// Maximal ASCII digit runs. A `-` directly in front of a run is kept as its
/// sign unless it follows a letter or digit (so `10-choose-3` stays positive).
fn integer_literals(text: &str) -> Vec<&str> {
    let mut literals = Vec::new();
    let mut start: Option<usize> = None;

    for (idx, c) in text.char_indices() {
        match (c.is_ascii_digit(), start) {
            (true, None) => start = Some(signed_start(text, idx)),
            (false, Some(begin)) => {
                literals.push(&text[begin..idx]);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(begin) = start {
        literals.push(&text[begin..]);
    }
    literals
}

fn signed_start(text: &str, digit_idx: usize) -> usize {
    let before = &text[..digit_idx];
    match before.strip_suffix('-') {
        Some(prefix) if !prefix.chars().last().is_some_and(|c| c.is_alphanumeric()) => {
            digit_idx - 1
        }
        _ => digit_idx,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        expand_factorials, insert_implicit_products, integer_literals, subscript_digit,
        superscript_digit, SUBSCRIPT_DIGITS, SUPERSCRIPT_DIGITS,
    };

    #[test]
    fn digit_tables_cover_every_decimal_digit() {
        for (digit, (&sup, &sub)) in SUPERSCRIPT_DIGITS.iter().zip(&SUBSCRIPT_DIGITS).enumerate() {
            let expected = char::from_digit(digit as u32, 10);
            assert_eq!(superscript_digit(sup), expected);
            assert_eq!(subscript_digit(sub), expected);
        }
    }

    #[test]
    fn tables_do_not_cross_match() {
        assert_eq!(superscript_digit('₂'), None);
        assert_eq!(subscript_digit('²'), None);
        assert_eq!(superscript_digit('2'), None);
    }

    #[test]
    fn literals_keep_leading_sign_only_when_detached() {
        assert_eq!(integer_literals("-5choose2"), vec!["-5", "2"]);
        assert_eq!(integer_literals("10-choose-3"), vec!["10", "3"]);
        assert_eq!(integer_literals("(-7)choose(2)"), vec!["-7", "2"]);
    }

    #[test]
    fn juxtaposed_groups_become_products() {
        assert_eq!(insert_implicit_products("2(3+4)"), "2*(3+4)");
        assert_eq!(insert_implicit_products("(1+1)(2)"), "(1+1)*(2)");
        assert_eq!(insert_implicit_products("(2)3"), "(2)*3");
        assert_eq!(insert_implicit_products("sqrt(4)"), "sqrt(4)");
        assert_eq!(insert_implicit_products("log10(4)"), "log10(4)");
    }

    #[test]
    fn factorial_wraps_its_operand() {
        assert_eq!(expand_factorials("5"), "5");
        assert_eq!(expand_factorials("3!+114"), "factorial(3)+114");
        assert_eq!(expand_factorials("(1+2)!"), "factorial((1+2))");
        assert_eq!(expand_factorials("3!!"), "factorial(factorial(3))");
        assert_eq!(expand_factorials("sqrt(9)!"), "factorial(sqrt(9))");
        assert_eq!(expand_factorials("!5"), "!5");
        assert_eq!(expand_factorials("2)!"), "2)!");
    }
}
