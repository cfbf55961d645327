//! Format-spec number formatting for templates
//!
//! Experiment configs are usually written by people used to `"{:.3g}"`, so the
//! `fmt` filter understands the common part of the format-spec
//! mini-language: `[[fill]align][sign][0][width][,|_][.precision][type]`
//! with types `d f F e E g G % s`.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormatSpec {
    pub fill: Option<char>,
    pub align: Option<char>,
    pub sign: Option<char>,
    pub zero: bool,
    pub width: usize,
    pub grouping: Option<char>,
    pub precision: Option<usize>,
    pub kind: Option<char>,
}

impl FormatSpec {
    pub fn parse(spec: &str) -> Result<Self, String> {
        let chars: Vec<char> = spec.chars().collect();
        let mut out = FormatSpec::default();
        let mut i = 0;

        let is_align = |c: char| matches!(c, '<' | '>' | '^' | '=');
        if chars.len() >= 2 && is_align(chars[1]) {
            out.fill = Some(chars[0]);
            out.align = Some(chars[1]);
            i = 2;
        } else if !chars.is_empty() && is_align(chars[0]) {
            out.align = Some(chars[0]);
            i = 1;
        }

        if let Some(&c) = chars.get(i) {
            if matches!(c, '+' | '-' | ' ') {
                out.sign = Some(c);
                i += 1;
            }
        }

        if chars.get(i) == Some(&'0') {
            out.zero = true;
            i += 1;
        }

        let start = i;
        while chars.get(i).is_some_and(|c| c.is_ascii_digit()) {
            i += 1;
        }
        if i > start {
            out.width =
                chars[start..i].iter().collect::<String>().parse().map_err(|_| bad(spec))?;
        }

        if let Some(&c) = chars.get(i) {
            if c == ',' || c == '_' {
                out.grouping = Some(c);
                i += 1;
            }
        }

        if chars.get(i) == Some(&'.') {
            i += 1;
            let start = i;
            while chars.get(i).is_some_and(|c| c.is_ascii_digit()) {
                i += 1;
            }
            if i == start {
                return Err(bad(spec));
            }
            out.precision =
                Some(chars[start..i].iter().collect::<String>().parse().map_err(|_| bad(spec))?);
        }

        if let Some(&c) = chars.get(i) {
            if !matches!(c, 'd' | 'f' | 'F' | 'e' | 'E' | 'g' | 'G' | '%' | 's') {
                return Err(bad(spec));
            }
            out.kind = Some(c);
            i += 1;
        }

        if i != chars.len() {
            return Err(bad(spec));
        }
        Ok(out)
    }
}

fn bad(spec: &str) -> String {
    format!("invalid format spec '{}'", spec)
}

/// Format `value` according to a format spec.
pub fn format_value(value: &Value, spec: &str) -> Result<String, String> {
    let spec = FormatSpec::parse(spec)?;
    match value {
        Value::Number(n) => {
            if let (Some(i), true) = (n.as_i64(), !n.is_f64()) {
                format_int(i128::from(i), &spec)
            } else if let (Some(u), true) = (n.as_u64(), !n.is_f64()) {
                format_int(i128::from(u), &spec)
            } else {
                format_float(n.as_f64().unwrap_or(f64::NAN), &spec)
            }
        }
        Value::String(s) => format_str(s, &spec),
        Value::Bool(b) => format_str(if *b { "True" } else { "False" }, &spec),
        Value::Null => format_str("None", &spec),
        other => format_str(&other.to_string(), &spec),
    }
}

fn format_str(s: &str, spec: &FormatSpec) -> Result<String, String> {
    if !matches!(spec.kind, None | Some('s')) {
        return Err(format!("format code '{}' is not valid for strings", spec.kind.unwrap_or(' ')));
    }
    let s = match spec.precision {
        Some(p) => s.chars().take(p).collect(),
        None => s.to_string(),
    };
    Ok(pad("", &s, spec, '<'))
}

fn format_int(i: i128, spec: &FormatSpec) -> Result<String, String> {
    match spec.kind {
        None | Some('d') => {
            if spec.precision.is_some() {
                return Err("precision not allowed in integer format specifier".to_string());
            }
            let digits = group(&i.unsigned_abs().to_string(), spec.grouping);
            Ok(pad(sign(i < 0, spec), &digits, spec, '>'))
        }
        Some('s') => Err("format code 's' is not valid for numbers".to_string()),
        _ => format_float(i as f64, spec),
    }
}

fn format_float(v: f64, spec: &FormatSpec) -> Result<String, String> {
    let negative = v.is_sign_negative() && !v.is_nan();
    let a = v.abs();

    let body = if !a.is_finite() {
        let s = if a.is_nan() { "nan" } else { "inf" };
        if matches!(spec.kind, Some('F' | 'E' | 'G')) {
            s.to_uppercase()
        } else {
            s.to_string()
        }
    } else {
        match spec.kind {
            Some('f' | 'F') => fixed(a, spec.precision.unwrap_or(6), spec.grouping),
            Some('e') => exponent(a, spec.precision.unwrap_or(6), false),
            Some('E') => exponent(a, spec.precision.unwrap_or(6), true),
            Some('g') => general(a, spec.precision.unwrap_or(6), false),
            Some('G') => general(a, spec.precision.unwrap_or(6), true),
            Some('%') => {
                format!("{}%", fixed(a * 100.0, spec.precision.unwrap_or(6), spec.grouping))
            }
            Some('d') => return Err("format code 'd' is not valid for floats".to_string()),
            Some('s') => return Err("format code 's' is not valid for numbers".to_string()),
            Some(c) => return Err(format!("unknown format code '{}'", c)),
            None => match spec.precision {
                Some(p) => shortest_general(a, p),
                None => repr(a),
            },
        }
    };
    Ok(pad(sign(negative, spec), &body, spec, '>'))
}

fn sign(negative: bool, spec: &FormatSpec) -> &'static str {
    match (negative, spec.sign) {
        (true, _) => "-",
        (false, Some('+')) => "+",
        (false, Some(' ')) => " ",
        _ => "",
    }
}

fn pad(sign: &str, body: &str, spec: &FormatSpec, default_align: char) -> String {
    let len = sign.chars().count() + body.chars().count();
    if len >= spec.width {
        return format!("{}{}", sign, body);
    }
    let n = spec.width - len;
    let (fill, align) = match (spec.fill, spec.align) {
        (Some(f), Some(a)) => (f, a),
        (None, Some(a)) => (if spec.zero { '0' } else { ' ' }, a),
        (_, None) if spec.zero => ('0', '='),
        _ => (' ', default_align),
    };
    let fill_str = |k: usize| fill.to_string().repeat(k);
    match align {
        '<' => format!("{}{}{}", sign, body, fill_str(n)),
        '^' => format!("{}{}{}{}", fill_str(n / 2), sign, body, fill_str(n - n / 2)),
        '=' => format!("{}{}{}", sign, fill_str(n), body),
        _ => format!("{}{}{}", fill_str(n), sign, body),
    }
}

fn group(digits: &str, sep: Option<char>) -> String {
    let Some(sep) = sep else {
        return digits.to_string();
    };
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(c);
    }
    out
}

fn fixed(a: f64, precision: usize, grouping: Option<char>) -> String {
    let s = format!("{:.*}", precision, a);
    match s.split_once('.') {
        Some((int, frac)) => format!("{}.{}", group(int, grouping), frac),
        None => group(&s, grouping),
    }
}

/// Split Rust's `{:e}` output into mantissa and exponent.
fn split_exp(s: &str) -> (&str, i32) {
    let (mantissa, exp) = s.split_once('e').unwrap_or((s, "0"));
    (mantissa, exp.parse().unwrap_or(0))
}

fn exp_suffixed(mantissa: &str, exp: i32, upper: bool) -> String {
    let e = if upper { 'E' } else { 'e' };
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{}{}{}{:02}", mantissa, e, sign, exp.abs())
}

fn exponent(a: f64, precision: usize, upper: bool) -> String {
    let s = format!("{:.*e}", precision, a);
    let (mantissa, exp) = split_exp(&s);
    exp_suffixed(mantissa, exp, upper)
}

fn strip_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// `g` presentation: significant digits, fixed or scientific by magnitude.
fn general(a: f64, precision: usize, upper: bool) -> String {
    let p = precision.max(1);
    if a == 0.0 {
        return "0".to_string();
    }
    let s = format!("{:.*e}", p - 1, a);
    let (mantissa, exp) = split_exp(&s);
    if exp >= -4 && (exp as i64) < p as i64 {
        let decimals = (p as i64 - 1 - exp as i64).max(0) as usize;
        strip_zeros(&format!("{:.*}", decimals, a)).to_string()
    } else {
        exp_suffixed(strip_zeros(mantissa), exp, upper)
    }
}

/// No type with a precision: like `g`, but fixed notation keeps a
/// fractional digit and scientific starts one exponent earlier.
fn shortest_general(a: f64, precision: usize) -> String {
    let p = precision.max(1);
    if a == 0.0 {
        return "0.0".to_string();
    }
    let s = format!("{:.*e}", p - 1, a);
    let (mantissa, exp) = split_exp(&s);
    if exp >= -4 && (exp as i64) < p as i64 - 1 {
        let decimals = (p as i64 - 1 - exp as i64).max(0) as usize;
        let body = strip_zeros(&format!("{:.*}", decimals, a)).to_string();
        if body.contains('.') {
            body
        } else {
            format!("{}.0", body)
        }
    } else {
        exp_suffixed(strip_zeros(mantissa), exp, false)
    }
}

/// Shortest round-trip representation, with at least two exponent digits.
pub fn repr(a: f64) -> String {
    if a == 0.0 {
        return "0.0".to_string();
    }
    let s = format!("{:e}", a);
    let (mantissa, exp) = split_exp(&s);
    if (-4..16).contains(&exp) {
        let plain = format!("{}", a);
        if plain.contains('.') {
            plain
        } else {
            format!("{}.0", plain)
        }
    } else {
        exp_suffixed(mantissa, exp, false)
    }
}

/// `n` significant figures (`{:.ng}`).
pub fn significant(v: f64, n: usize) -> String {
    let body = general(v.abs(), n, false);
    if v.is_sign_negative() && v != 0.0 {
        format!("-{}", body)
    } else {
        body
    }
}
