pub const PY_IMPORTS: &str = "import math\n";

/// Reads a line and returns it as an int, a float or the raw text, in that
/// order of preference.
pub const PY_INPUT: &str = r#"

def zedInput(prompt):
    text = input(prompt)
    try:
        return int(text)
    except ValueError:
        try:
            return float(text)
        except ValueError:
            return text
"#;

/// Compound assignment for every pairing of string and number operands.
/// Division or remainder by zero gives NaN.
pub const PY_ASSIGN: &str = r#"

def zedAssign(target, value, operator):
    if isinstance(target, str):
        if isinstance(value, str):
            if operator == '+':
                return target + value
            if operator == '-':
                return target.replace(value, '')
            if operator == '*':
                return value.join(target)
            if operator == '/':
                return target.replace(value, '', 1)
            if operator == '%':
                if len(value) == 0:
                    return math.nan
                return target[len(target) - len(target) % len(value):]
        else:
            count = int(value)
            if operator == '+':
                return target + ' ' * count
            if operator == '-':
                return target[:max(len(target) - count, 0)]
            if operator == '*':
                return target * count
            if operator == '/':
                if value == 0:
                    return math.nan
                return target[:int(len(target) / value)]
            if operator == '%':
                if count == 0:
                    return math.nan
                return target[len(target) - len(target) % count:]
        raise ValueError('unknown operator ' + operator)
    if isinstance(value, str):
        value = len(value)
    if operator == '+':
        return target + value
    if operator == '-':
        return target - value
    if operator == '*':
        return target * value
    if operator == '/':
        if value == 0:
            return math.nan
        return target / value
    if operator == '%':
        if value == 0:
            return math.nan
        return target % value
    raise ValueError('unknown operator ' + operator)
"#;

/// Module-level names the generated program relies on. A program named
/// after one of these would shadow it.
const RUNTIME_NAMES: [&str; 13] = [
    "print",
    "input",
    "int",
    "float",
    "str",
    "len",
    "max",
    "range",
    "isinstance",
    "math",
    "zedInput",
    "zedAssign",
    "ValueError",
];

const PYTHON_KEYWORDS: [&str; 35] = [
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

/// Program names become a Python function name. Reserved ones get a
/// trailing underscore.
pub fn python_function_name(name: &str) -> String {
    if PYTHON_KEYWORDS.contains(&name) || RUNTIME_NAMES.contains(&name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

/// Zed strings have no escapes, so only backslashes need doubling.
pub fn escape_python_string(value: &str) -> String {
    value.replace('\\', "\\\\")
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

const STEP_TOLERANCE: f64 = 1e-9;

/// Passes made by an inclusive `FOR` from `from` to `to` in steps of `by`.
/// `by` is never zero.
pub fn iteration_count(from: f64, to: f64, by: f64) -> u64 {
    let steps = ((to - from) / by + STEP_TOLERANCE).floor();
    if steps < 0.0 { 0 } else { steps as u64 + 1 }
}

/// Fewest decimals that reproduce `value`, capped at 15.
pub fn decimal_places(value: f64) -> i32 {
    (0..15)
        .find(|&places| {
            let scale = 10f64.powi(places);
            (value * scale).round() / scale == value
        })
        .unwrap_or(15)
}
