//! Text formatting used by the `number` and `sprintf` filters
//!
//! Copyright (c) 2025 Reshaper Team
//! Licensed under the Apache-2.0 license

use crate::{Error, Result, Value};
use regex::{Captures, Regex};
use std::sync::OnceLock;

const SPRINTF: &str = "sprintf";

/// Format `value` with fixed decimals and custom separators
///
/// Rounds half away from zero. A result that rounds to zero never carries a
/// minus sign.
pub fn number_format(value: f64, decimals: usize, decimal_separator: &str, thousands_separator: &str) -> String {
    let factor = 10f64.powi(decimals.min(i32::MAX as usize) as i32);
    let scaled = value * factor;
    let rounded = if scaled.is_finite() {
        scaled.round() / factor
    } else {
        value
    };

    let digits = format!("{:.*}", decimals, rounded.abs());
    let (integer, fraction) = match digits.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut out = String::with_capacity(digits.len() + 8);
    if rounded < 0.0 {
        out.push('-');
    }
    out.push_str(&group_thousands(integer, thousands_separator));
    if let Some(fraction) = fraction {
        out.push_str(decimal_separator);
        out.push_str(fraction);
    }
    out
}

fn group_thousands(integer: &str, separator: &str) -> String {
    if separator.is_empty() || integer.len() <= 3 || !integer.bytes().all(|b| b.is_ascii_digit()) {
        return integer.to_string();
    }

    let head = integer.len() % 3;
    let mut out = String::with_capacity(integer.len() + separator.len() * (integer.len() / 3));
    out.push_str(&integer[..head]);
    for (i, chunk) in integer.as_bytes()[head..].chunks(3).enumerate() {
        if head > 0 || i > 0 {
            out.push_str(separator);
        }
        // chunks of an ASCII digit string are valid UTF-8
        out.push_str(std::str::from_utf8(chunk).unwrap_or_default());
    }
    out
}

/// Parsed `%[argnum$][flags][width][.precision]conversion` directive
#[derive(Debug, Default)]
struct Directive {
    argnum: Option<usize>,
    left_justify: bool,
    plus_sign: bool,
    pad: char,
    width: usize,
    precision: Option<usize>,
    conversion: char,
}

impl Directive {
    fn from_captures(caps: &Captures<'_>) -> Self {
        let mut directive = Directive {
            argnum: caps.get(1).and_then(|m| m.as_str().parse().ok()),
            pad: ' ',
            width: caps.get(3).and_then(|m| m.as_str().parse().ok()).unwrap_or(0),
            precision: caps.get(4).and_then(|m| m.as_str().parse().ok()),
            conversion: caps
                .get(5)
                .and_then(|m| m.as_str().chars().next())
                .unwrap_or('s'),
            ..Default::default()
        };

        let mut flags = caps.get(2).map_or("", |m| m.as_str()).chars();
        while let Some(flag) = flags.next() {
            match flag {
                '-' => directive.left_justify = true,
                '+' => directive.plus_sign = true,
                '0' => directive.pad = '0',
                ' ' => directive.pad = ' ',
                '\'' => {
                    if let Some(pad) = flags.next() {
                        directive.pad = pad;
                    }
                }
                _ => {}
            }
        }
        directive
    }

    /// Lay out `sign` and `body` in the field width
    fn pad(&self, sign: &str, body: &str) -> String {
        let len = sign.chars().count() + body.chars().count();
        let fill = self.width.saturating_sub(len);
        let padding: String = std::iter::repeat(self.pad).take(fill).collect();

        if self.left_justify {
            format!("{}{}{}", sign, body, padding)
        } else if self.pad == '0' {
            format!("{}{}{}", sign, padding, body)
        } else {
            format!("{}{}{}", padding, sign, body)
        }
    }

    fn sign(&self, negative: bool) -> &'static str {
        if negative {
            "-"
        } else if self.plus_sign {
            "+"
        } else {
            ""
        }
    }
}

fn directive_pattern() -> &'static Regex {
    static DIRECTIVE: OnceLock<Regex> = OnceLock::new();
    DIRECTIVE.get_or_init(|| {
        Regex::new(r"%(?:([0-9]+)\$)?((?:[-+ 0]|'.)*)([0-9]+)?(?:\.([0-9]+))?([bcdeEfFgGosuxX%])")
            .expect("sprintf directive pattern is valid")
    })
}

/// printf-style formatting of a single value
///
/// Supports `%%` and the `b c d e E f F g G o s u x X` conversions with the
/// `-`, `+`, `0`, space and `'c` flags, width, precision and `1$` argument
/// numbering. Only one argument exists, so a second directive fails.
pub fn sprintf(format: &str, value: &Value) -> Result<String> {
    let mut out = String::with_capacity(format.len() + 16);
    let mut next_arg = 0usize;
    let mut last = 0usize;

    for caps in directive_pattern().captures_iter(format) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_literal(&mut out, &format[last..whole.start()])?;
        last = whole.end();

        let directive = Directive::from_captures(&caps);
        if directive.conversion == '%' {
            out.push('%');
            continue;
        }

        let index = match directive.argnum {
            Some(0) => {
                return Err(Error::filter(SPRINTF, "argument number must be greater than zero"));
            }
            Some(n) => n - 1,
            None => {
                next_arg += 1;
                next_arg - 1
            }
        };
        if index > 0 {
            return Err(Error::filter(
                SPRINTF,
                format!("{} arguments are required, 1 given", index + 1),
            ));
        }

        out.push_str(&render(&directive, value)?);
    }

    push_literal(&mut out, &format[last..])?;
    Ok(out)
}

fn push_literal(out: &mut String, literal: &str) -> Result<()> {
    if literal.contains('%') {
        return Err(Error::filter(SPRINTF, format!("unknown format specifier in '{}'", literal)));
    }
    out.push_str(literal);
    Ok(())
}

fn render(directive: &Directive, value: &Value) -> Result<String> {
    let rendered = match directive.conversion {
        's' => {
            let text = value
                .to_text()
                .ok_or_else(|| Error::filter(SPRINTF, format!("cannot format {} as text", value.kind())))?;
            let text = match directive.precision {
                Some(precision) => text.chars().take(precision).collect(),
                None => text,
            };
            directive.pad("", &text)
        }
        'd' => {
            let i = value.to_integer();
            directive.pad(directive.sign(i < 0), &i.unsigned_abs().to_string())
        }
        'u' => directive.pad("", &(value.to_integer() as u64).to_string()),
        'c' => char::from_u32(value.to_integer() as u32)
            .map(String::from)
            .unwrap_or_default(),
        'x' => directive.pad("", &format!("{:x}", value.to_integer() as u64)),
        'X' => directive.pad("", &format!("{:X}", value.to_integer() as u64)),
        'o' => directive.pad("", &format!("{:o}", value.to_integer() as u64)),
        'b' => directive.pad("", &format!("{:b}", value.to_integer() as u64)),
        'f' | 'F' => {
            let f = value.to_float();
            let precision = directive.precision.unwrap_or(6);
            directive.pad(directive.sign(f < 0.0), &format!("{:.*}", precision, f.abs()))
        }
        'e' | 'E' => {
            let f = value.to_float();
            let precision = directive.precision.unwrap_or(6);
            let body = exponential(f.abs(), precision, directive.conversion == 'E');
            directive.pad(directive.sign(f < 0.0), &body)
        }
        'g' | 'G' => {
            let f = value.to_float();
            let body = general(f.abs(), directive.precision.unwrap_or(6), directive.conversion == 'G');
            directive.pad(directive.sign(f < 0.0), &body)
        }
        other => {
            return Err(Error::filter(SPRINTF, format!("unknown format specifier '{}'", other)));
        }
    };
    Ok(rendered)
}

/// Scientific notation with an unpadded, always signed exponent (`1.5e+3`)
fn exponential(f: f64, precision: usize, upper: bool) -> String {
    let (mantissa, exponent) = split_exponent(f, precision);
    let e = if upper { 'E' } else { 'e' };
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{}{}{}{}", mantissa, e, sign, exponent.unsigned_abs())
}

fn split_exponent(f: f64, precision: usize) -> (String, i32) {
    let formatted = format!("{:.*e}", precision, f);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => (mantissa.to_string(), exponent.parse().unwrap_or(0)),
        None => (formatted, 0),
    }
}

/// Shortest of fixed and scientific notation, trailing zeros removed
fn general(f: f64, precision: usize, upper: bool) -> String {
    let precision = precision.max(1);
    if f == 0.0 || !f.is_finite() {
        return format!("{}", f);
    }

    let (_, exponent) = split_exponent(f, precision - 1);
    if exponent < -4 || exponent >= precision as i32 {
        let (mantissa, exponent) = split_exponent(f, precision - 1);
        let e = if upper { 'E' } else { 'e' };
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}{}{}{}", strip_zeros(&mantissa), e, sign, exponent.unsigned_abs())
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        strip_zeros(&format!("{:.*}", decimals, f)).to_string()
    }
}

fn strip_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}
