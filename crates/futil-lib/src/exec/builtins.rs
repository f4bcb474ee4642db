//! Builtin template functions.

use std::cmp::Ordering;
use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use rowan::TextRange;

use super::{ExecError, ExecErrorKind, ExecResult, Executor, Value};
use crate::template::ast::Operand;

pub(super) const NAMES: &[&str] = &[
    "and", "or", "not", "len", "index", "eq", "ne", "lt", "le", "gt", "ge", "print", "println",
    "printf", "date",
];

pub(super) fn call(
    exec: &Executor<'_>,
    name: &str,
    range: TextRange,
    args: &[Operand],
    dot: &Value,
    piped: Option<Value>,
) -> ExecResult<Value> {
    let call = Call { name, range };

    // `and`/`or` evaluate lazily and stop at the deciding argument.
    if name == "and" || name == "or" {
        let want = name == "or";
        let count = args.len() + usize::from(piped.is_some());
        if count == 0 {
            return Err(call.arg_count("at least 1", 0));
        }
        let mut last = Value::Nil;
        for arg in args {
            last = exec.operand(arg, dot)?.into_owned();
            if last.is_truthy() == want {
                return Ok(last);
            }
        }
        return Ok(piped.unwrap_or(last));
    }

    if !NAMES.contains(&name) {
        return Err(ExecError::new(
            ExecErrorKind::UndefinedFunction {
                name: name.to_string(),
            },
            range,
        ));
    }

    let mut values = exec.eval_args(args, dot)?;
    values.extend(piped);

    match name {
        "not" => {
            let [value] = call.exact::<1>(values)?;
            Ok(Value::Bool(!value.is_truthy()))
        }
        "len" => {
            let [value] = call.exact::<1>(values)?;
            len(&call, &value)
        }
        "index" => index(&call, values),
        "eq" => {
            let Some((first, rest)) = values.split_first().filter(|(_, rest)| !rest.is_empty())
            else {
                return Err(call.arg_count("at least 2", values.len()));
            };
            for other in rest {
                if equal(&call, first, other)? {
                    return Ok(Value::Bool(true));
                }
            }
            Ok(Value::Bool(false))
        }
        "ne" => {
            let [a, b] = call.exact::<2>(values)?;
            Ok(Value::Bool(!equal(&call, &a, &b)?))
        }
        "lt" | "le" | "gt" | "ge" => {
            let [a, b] = call.exact::<2>(values)?;
            let ordering = compare(&call, &a, &b)?;
            let result = match name {
                "lt" => ordering == Ordering::Less,
                "le" => ordering != Ordering::Greater,
                "gt" => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            };
            Ok(Value::Bool(result))
        }
        "print" => Ok(Value::Str(sprint(&values))),
        "println" => Ok(Value::Str(sprintln(&values))),
        "printf" => printf(&call, values),
        "date" => {
            let [format, time] = call.exact::<2>(values)?;
            date(&call, &format, &time)
        }
        _ => Err(ExecError::new(
            ExecErrorKind::UndefinedFunction {
                name: name.to_string(),
            },
            range,
        )),
    }
}

struct Call<'a> {
    name: &'a str,
    range: TextRange,
}

impl Call<'_> {
    fn error(&self, kind: ExecErrorKind) -> ExecError {
        ExecError::new(kind, self.range)
    }

    fn arg_count(&self, expected: &'static str, got: usize) -> ExecError {
        self.error(ExecErrorKind::ArgCount {
            name: self.name.to_string(),
            expected,
            got,
        })
    }

    fn arg_type(&self, expected: &'static str, got: &Value) -> ExecError {
        self.error(ExecErrorKind::ArgType {
            name: self.name.to_string(),
            expected,
            got: got.type_name(),
        })
    }

    fn bad_format(&self, reason: impl Into<String>) -> ExecError {
        self.error(ExecErrorKind::BadFormat {
            reason: reason.into(),
        })
    }

    fn exact<const N: usize>(&self, values: Vec<Value>) -> ExecResult<[Value; N]> {
        let got = values.len();
        values
            .try_into()
            .map_err(|_| self.arg_count(count_label(N), got))
    }
}

fn count_label(n: usize) -> &'static str {
    match n {
        1 => "1",
        2 => "2",
        _ => "more",
    }
}

fn len(call: &Call<'_>, value: &Value) -> ExecResult<Value> {
    let n = match value {
        Value::Str(s) => s.len(),
        Value::List(items) => items.len(),
        Value::Map(map) => map.len(),
        Value::Record(fields) => fields.len(),
        other => return Err(call.arg_type("string, list or map", other)),
    };
    Ok(Value::Int(n as i64))
}

fn index(call: &Call<'_>, values: Vec<Value>) -> ExecResult<Value> {
    let mut values = values.into_iter();
    let Some(mut item) = values.next() else {
        return Err(call.arg_count("at least 1", 0));
    };

    for key in values {
        item = match (item, key) {
            (Value::List(mut items), Value::Int(i)) => {
                let idx = usize::try_from(i)
                    .ok()
                    .filter(|&idx| idx < items.len())
                    .ok_or_else(|| call.error(ExecErrorKind::IndexOutOfRange { index: i }))?;
                items.swap_remove(idx)
            }
            (Value::Str(s), Value::Int(i)) => {
                let byte = usize::try_from(i)
                    .ok()
                    .and_then(|idx| s.as_bytes().get(idx).copied())
                    .ok_or_else(|| call.error(ExecErrorKind::IndexOutOfRange { index: i }))?;
                Value::Int(i64::from(byte))
            }
            (Value::Map(mut map), Value::Str(k)) => map.remove(&k).unwrap_or(Value::Nil),
            (Value::List(_) | Value::Str(_), other) => return Err(call.arg_type("int", &other)),
            (Value::Map(_), other) => return Err(call.arg_type("string", &other)),
            (other, _) => {
                return Err(call.error(ExecErrorKind::NotIndexable {
                    ty: other.type_name(),
                }));
            }
        };
    }
    Ok(item)
}

fn equal(call: &Call<'_>, a: &Value, b: &Value) -> ExecResult<bool> {
    match (a, b) {
        (Value::Nil, Value::Nil) => Ok(true),
        (Value::Nil, _) | (_, Value::Nil) => Ok(false),
        (Value::Bool(x), Value::Bool(y)) => Ok(x == y),
        (Value::Int(x), Value::Int(y)) => Ok(x == y),
        (Value::Str(x), Value::Str(y)) => Ok(x == y),
        (Value::Time(x), Value::Time(y)) => Ok(x == y),
        _ => Err(incomparable(call, a, b)),
    }
}

fn compare(call: &Call<'_>, a: &Value, b: &Value) -> ExecResult<Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(x.cmp(y)),
        (Value::Str(x), Value::Str(y)) => Ok(x.cmp(y)),
        (Value::Time(x), Value::Time(y)) => Ok(x.cmp(y)),
        _ => Err(incomparable(call, a, b)),
    }
}

fn incomparable(call: &Call<'_>, a: &Value, b: &Value) -> ExecError {
    call.error(ExecErrorKind::IncomparableTypes {
        left: a.type_name(),
        right: b.type_name(),
    })
}

/// Operands joined with a space when neither side is a string.
fn sprint(values: &[Value]) -> String {
    let mut out = String::new();
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            let prev_is_str = matches!(values[i - 1], Value::Str(_));
            if !prev_is_str && !matches!(value, Value::Str(_)) {
                out.push(' ');
            }
        }
        let _ = write!(out, "{value}");
    }
    out
}

fn sprintln(values: &[Value]) -> String {
    let mut out = values
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    out.push('\n');
    out
}

fn printf(call: &Call<'_>, values: Vec<Value>) -> ExecResult<Value> {
    let mut values = values.into_iter();
    let format = match values.next() {
        Some(Value::Str(format)) => format,
        Some(other) => return Err(call.arg_type("string", &other)),
        None => return Err(call.arg_count("at least 1", 0)),
    };

    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let Some(verb) = chars.next() else {
            return Err(call.bad_format("trailing `%`"));
        };
        if verb == '%' {
            out.push('%');
            continue;
        }
        let Some(arg) = values.next() else {
            return Err(call.bad_format(format!("missing argument for %{verb}")));
        };
        match (verb, &arg) {
            ('s' | 'v', value) => {
                let _ = write!(out, "{value}");
            }
            ('d', Value::Int(n)) => {
                let _ = write!(out, "{n}");
            }
            ('q', Value::Str(s)) => out.push_str(&quote(s)),
            ('d' | 'q', other) => {
                return Err(call.bad_format(format!(
                    "%{verb} applied to {}",
                    other.type_name()
                )));
            }
            (verb, _) => return Err(call.bad_format(format!("unknown verb %{verb}"))),
        }
    }

    let extra = values.count();
    if extra > 0 {
        return Err(call.bad_format(format!("{extra} extra argument(s)")));
    }
    Ok(Value::Str(out))
}

/// Double-quoted string with Go escapes.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{7}' => out.push_str("\\a"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\u{b}' => out.push_str("\\v"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn date(call: &Call<'_>, format: &Value, time: &Value) -> ExecResult<Value> {
    let Value::Str(format) = format else {
        return Err(call.arg_type("string", format));
    };
    let Value::Time(time) = time else {
        return Err(call.arg_type("time", time));
    };

    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(call.bad_format(format!("invalid date format `{format}`")));
    }
    Ok(Value::Str(
        time.format_with_items(items.into_iter()).to_string(),
    ))
}
