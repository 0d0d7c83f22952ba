// Licensed under the Apache-2.0 license

//! Utility functions for name conversion and formatting.
//!
//! This module provides functions for converting between naming conventions
//! (snake_case, CamelCase), checking identifiers, and formatting values for
//! the different code generation backends.

/// Returns true if `name` starts with an ASCII letter and only contains ASCII
/// alphanumerics and underscores.
///
/// # Examples
/// ```
/// use regmap_generator::util::is_identifier;
/// assert!(is_identifier("CTRL_2"));
/// assert!(!is_identifier("2CTRL"));
/// assert!(!is_identifier("ctrl-reg"));
/// ```
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Converts a name to snake_case.
///
/// Handles various edge cases:
/// - Leading digits get underscore prefix
/// - Punctuation and whitespace become underscores
/// - CamelCase transitions get underscore separators
/// - Rust keywords get underscore suffix
///
/// # Examples
/// ```
/// use regmap_generator::util::snake_case;
/// assert_eq!(snake_case("MyRegister"), "my_register");
/// assert_eq!(snake_case("INT_STAT"), "int_stat");
/// ```
pub fn snake_case(name: &str) -> String {
    let mut result = String::new();
    if let Some(c) = name.chars().next() {
        if c.is_ascii_digit() {
            result.push('_');
        }
    }
    let mut prev = None;
    for c in name.chars() {
        if c.is_ascii_whitespace() || c.is_ascii_punctuation() {
            if prev != Some('_') {
                result.push('_');
            }
            prev = Some('_');
            continue;
        }
        if let Some(prev) = prev {
            if (prev.is_ascii_lowercase() || prev.is_ascii_digit()) && c.is_ascii_uppercase() {
                result.push('_');
            }
        }
        prev = Some(c);
        result.push(c.to_ascii_lowercase());
    }
    tweak_keywords(result.trim_end_matches('_')).to_string()
}

/// Converts a name to CamelCase (PascalCase).
///
/// # Examples
/// ```
/// use regmap_generator::util::camel_case;
/// assert_eq!(camel_case("my_register"), "MyRegister");
/// assert_eq!(camel_case("LPMODE"), "Lpmode");
/// ```
pub fn camel_case(name: &str) -> String {
    let mut result = String::new();
    if let Some(c) = name.chars().next() {
        if c.is_ascii_digit() {
            result.push('_');
        }
    }
    let mut upper_next = true;
    for c in name.chars() {
        if c.is_ascii_punctuation() || c.is_ascii_whitespace() {
            upper_next = true;
        } else {
            result.push(if upper_next {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            });
            upper_next = false;
        }
    }
    String::from(tweak_keywords(&result))
}

/// Appends underscore suffix to Rust keywords to avoid conflicts.
fn tweak_keywords(s: &str) -> &str {
    match s {
        "as" => "as_",
        "break" => "break_",
        "const" => "const_",
        "continue" => "continue_",
        "crate" => "crate_",
        "else" => "else_",
        "enum" => "enum_",
        "fn" => "fn_",
        "for" => "for_",
        "if" => "if_",
        "impl" => "impl_",
        "in" => "in_",
        "let" => "let_",
        "loop" => "loop_",
        "match" => "match_",
        "mod" => "mod_",
        "move" => "move_",
        "mut" => "mut_",
        "pub" => "pub_",
        "ref" => "ref_",
        "return" => "return_",
        "self" => "self_",
        "Self" => "Self_",
        "static" => "static_",
        "struct" => "struct_",
        "super" => "super_",
        "trait" => "trait_",
        "true" => "true_",
        "type" => "type_",
        "unsafe" => "unsafe_",
        "use" => "use_",
        "where" => "where_",
        "while" => "while_",
        "async" => "async_",
        "await" => "await_",
        "dyn" => "dyn_",
        "abstract" => "abstract_",
        "become" => "become_",
        "box" => "box_",
        "do" => "do_",
        "final" => "final_",
        "macro" => "macro_",
        "override" => "override_",
        "priv" => "priv_",
        "typeof" => "typeof_",
        "unsized" => "unsized_",
        "virtual" => "virtual_",
        "yield" => "yield_",
        s => s,
    }
}

/// Lower-cases a name for use as a Python attribute, suffixing keywords.
///
/// ```
/// use regmap_generator::util::python_ident;
/// assert_eq!(python_ident("FIFO"), "fifo");
/// assert_eq!(python_ident("IS"), "is_");
/// ```
pub fn python_ident(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    match lower.as_str() {
        "and" | "as" | "assert" | "async" | "await" | "break" | "class" | "continue" | "def"
        | "del" | "elif" | "else" | "except" | "finally" | "for" | "from" | "global" | "if"
        | "import" | "in" | "is" | "lambda" | "nonlocal" | "not" | "or" | "pass" | "raise"
        | "return" | "try" | "while" | "with" | "yield" => lower + "_",
        _ => lower,
    }
}

/// Formats an integer as a hex constant with underscores for readability.
///
/// Values <= 9 are formatted as decimal; larger values use hex with
/// underscore separators every 4 digits.
///
/// # Examples
/// ```
/// use regmap_generator::util::hex_const;
/// assert_eq!(hex_const(5), "5");
/// assert_eq!(hex_const(0x1234), "0x1234");
/// assert_eq!(hex_const(0x12345678), "0x1234_5678");
/// ```
pub fn hex_const(val: u64) -> String {
    if val > 9 {
        let mut x = String::new();
        for (i, c) in format!("{val:x}").chars().rev().enumerate() {
            if i % 4 == 0 && i != 0 {
                x.push('_');
            }
            x.push(c);
        }
        "0x".to_string() + &x.chars().rev().collect::<String>()
    } else {
        format!("{val}")
    }
}

/// Formats an integer as a plain lower-case hex literal (`0x0`, `0xff`).
pub fn hex_literal(val: u64) -> String {
    format!("{val:#x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("a"));
        assert!(is_identifier("Reg_0"));
        assert!(!is_identifier(""));
        // `_` prefixes are left to generated members
        assert!(!is_identifier("_reg"));
        assert!(!is_identifier("_1"));
        assert!(!is_identifier("reg.x"));
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("MyRegister"), "my_register");
        assert_eq!(snake_case("LPMODE"), "lpmode");
        // All-uppercase sequences stay lowercase without separators
        assert_eq!(snake_case("HTTPServer"), "httpserver");
        assert_eq!(snake_case("type"), "type_");
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("my_register"), "MyRegister");
        assert_eq!(camel_case("INTSTAT"), "Intstat");
        assert_eq!(camel_case("HTTP_SERVER"), "HttpServer");
    }

    #[test]
    fn test_hex_const() {
        assert_eq!(hex_const(0), "0");
        assert_eq!(hex_const(9), "9");
        assert_eq!(hex_const(10), "0xa");
        assert_eq!(hex_const(0x1234), "0x1234");
        assert_eq!(hex_const(0x12345678), "0x1234_5678");
    }

    #[test]
    fn test_hex_literal() {
        assert_eq!(hex_literal(0), "0x0");
        assert_eq!(hex_literal(0xcafe_0666), "0xcafe0666");
    }
}
