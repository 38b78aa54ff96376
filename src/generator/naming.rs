//! Identifier case conversion and Rust identifier hygiene.
//!
//! All functions here are pure: the same input always yields the same output,
//! which is what keeps generated code byte-for-byte reproducible.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

#[allow(clippy::expect_used)]
static CAMEL_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(.)([A-Z][a-z]+)").expect("valid camel word pattern"));

#[allow(clippy::expect_used)]
static LOWER_UPPER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("valid lower/upper boundary pattern"));

/// Convert `text` to snake_case.
///
/// A separator goes before every capitalized word that follows another
/// character and between a lowercase letter or digit and an uppercase letter.
///
/// ```
/// use asyncapi_wsgen::generator::to_snake_case;
/// assert_eq!(to_snake_case("GpioMessage"), "gpio_message");
/// assert_eq!(to_snake_case("HTTPServer"), "http_server");
/// ```
pub fn to_snake_case(text: &str) -> String {
    let words = CAMEL_WORD.replace_all(text, "${1}_${2}");
    LOWER_UPPER
        .replace_all(&words, "${1}_${2}")
        .to_lowercase()
}

/// Convert `text` to kebab-case (snake_case with `-` separators).
pub fn to_kebab_case(text: &str) -> String {
    to_snake_case(text).replace('_', "-")
}

/// Convert `text` to PascalCase.
///
/// The input is split on `-`, `_` and spaces, each piece is snake-cased, and
/// every resulting word is capitalized.
///
/// ```
/// use asyncapi_wsgen::generator::to_pascal_case;
/// assert_eq!(to_pascal_case("gpio-status"), "GpioStatus");
/// assert_eq!(to_pascal_case("Phobos GPIO Interface API"), "PhobosGpioInterfaceApi");
/// ```
pub fn to_pascal_case(text: &str) -> String {
    text.split(['-', '_', ' '])
        .flat_map(|segment| {
            to_snake_case(segment)
                .split('_')
                .map(capitalize)
                .collect::<Vec<_>>()
        })
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Constant name for an enum literal: uppercase with `-`, space and `.` as `_`.
pub fn enum_constant_name(value: &str) -> String {
    value.to_uppercase().replace(['-', ' ', '.'], "_")
}

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

// Keywords that cannot be written as raw identifiers.
const NON_RAW_KEYWORDS: &[&str] = &["crate", "self", "Self", "super", "_"];

/// Replace characters that cannot appear in an identifier with `_` and make
/// sure the result does not start with a digit.
pub fn sanitize_identifier(name: &str) -> String {
    let mut s: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if s.is_empty() {
        s.push('_');
    }
    if s.starts_with(|c: char| c.is_ascii_digit()) {
        s.insert(0, '_');
    }
    s
}

/// Turn `name` into something usable as a Rust identifier.
///
/// Keywords become raw identifiers (`type` → `r#type`); the few keywords that
/// cannot be raw get a trailing underscore.
pub fn rust_identifier(name: &str) -> String {
    let s = sanitize_identifier(name);
    if NON_RAW_KEYWORDS.contains(&s.as_str()) {
        format!("{s}_")
    } else if KEYWORDS.contains(&s.as_str()) {
        format!("r#{s}")
    } else {
        s
    }
}

/// Return `name`, or `name_1`, `name_2`, ... if already taken, and mark it taken.
pub fn unique_name(seen: &mut HashSet<String>, name: &str) -> String {
    if seen.insert(name.to_string()) {
        return name.to_string();
    }
    let mut counter = 1;
    loop {
        let candidate = format!("{name}_{counter}");
        if seen.insert(candidate.clone()) {
            tracing::debug!(name = %name, renamed = %candidate, "duplicate identifier renamed");
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("GpioMessage"), "gpio_message");
        assert_eq!(to_snake_case("gpioMessage"), "gpio_message");
        assert_eq!(to_snake_case("HTTPServer"), "http_server");
        assert_eq!(to_snake_case("getHTTPResponseCode"), "get_http_response_code");
        assert_eq!(to_snake_case("Sensor2Reading"), "sensor2_reading");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
        assert_eq!(to_snake_case(""), "");
    }

    #[test]
    fn test_to_kebab_case_is_snake_with_dashes() {
        for input in ["GpioMessage", "HTTPServer", "PhobosGpioInterfaceApi", "x"] {
            assert_eq!(to_kebab_case(input), to_snake_case(input).replace('_', "-"));
        }
        assert_eq!(to_kebab_case("PhobosGpioInterfaceApi"), "phobos-gpio-interface-api");
    }

    #[test]
    fn test_to_pascal_case() {
        assert_eq!(to_pascal_case("user_profile"), "UserProfile");
        assert_eq!(to_pascal_case("gpio-status"), "GpioStatus");
        assert_eq!(to_pascal_case("GpioMessage"), "GpioMessage");
        assert_eq!(to_pascal_case("GPIO"), "Gpio");
        assert_eq!(to_pascal_case("Phobos GPIO Interface API"), "PhobosGpioInterfaceApi");
        assert_eq!(to_pascal_case("__leading"), "Leading");
        assert_eq!(to_pascal_case(""), "");
    }

    #[test]
    fn test_pascal_is_capitalized_snake() {
        for input in ["GpioMessage", "sensorReadingV2", "HTTPServer", "device_state"] {
            let from_snake: String = to_snake_case(input)
                .split('_')
                .map(capitalize)
                .collect();
            assert_eq!(to_pascal_case(input), from_snake);
        }
    }

    #[test]
    fn test_case_conversion_is_deterministic() {
        for input in ["GpioMessage", "Phobos GPIO Interface API", "a-b_c d"] {
            assert_eq!(to_pascal_case(input), to_pascal_case(input));
            assert_eq!(to_snake_case(input), to_snake_case(input));
            assert_eq!(to_kebab_case(input), to_kebab_case(input));
        }
    }

    #[test]
    fn test_enum_constant_name() {
        assert_eq!(enum_constant_name("high"), "HIGH");
        assert_eq!(enum_constant_name("low"), "LOW");
        assert_eq!(enum_constant_name("pull-up"), "PULL_UP");
        assert_eq!(enum_constant_name("v1.2 beta"), "V1_2_BETA");
    }

    #[test]
    fn test_rust_identifier() {
        assert_eq!(rust_identifier("status"), "status");
        assert_eq!(rust_identifier("type"), "r#type");
        assert_eq!(rust_identifier("self"), "self_");
        assert_eq!(rust_identifier("x-rate"), "x_rate");
        assert_eq!(rust_identifier("1st"), "_1st");
        assert_eq!(rust_identifier(""), "__");
    }

    #[test]
    fn test_unique_name() {
        let mut seen = HashSet::new();
        assert_eq!(unique_name(&mut seen, "foo"), "foo");
        assert_eq!(unique_name(&mut seen, "foo"), "foo_1");
        assert_eq!(unique_name(&mut seen, "foo"), "foo_2");
        assert_eq!(unique_name(&mut seen, "bar"), "bar");
    }
}
