// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Macro definitions: `.macro`/`.endm` parameter lists, body capture, and
//! argument binding for an invocation. Body expansion itself is performed
//! by the macro input filter.

use std::collections::HashMap;
use std::rc::Rc;

use crate::core::cursor::LineCursor;
use crate::core::input_filter::BodyLine;
use crate::core::source_pos::SourcePos;

#[derive(Debug, Clone)]
pub struct MacroError {
    pub message: String,
    pub at: usize,
}

impl MacroError {
    pub fn new(message: impl Into<String>, at: usize) -> Self {
        Self {
            message: message.into(),
            at,
        }
    }
}

impl std::fmt::Display for MacroError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for MacroError {}

/// One macro parameter.
#[derive(Debug, Clone)]
pub struct MacroParam {
    pub name: String,
    pub default: Option<String>,
    pub required: bool,
    pub vararg: bool,
}

/// A defined macro: parameters, body, and its declaration site.
#[derive(Debug, Clone)]
pub struct MacroDef {
    pub params: Vec<MacroParam>,
    pub body: Rc<Vec<BodyLine>>,
    pub pos: SourcePos,
    /// Line at which the body content starts.
    pub content_line: u64,
}

pub type MacroMap = HashMap<String, MacroDef>;

/// Parse the parameter list of a `.macro` line, after the macro name.
///
/// Forms: `name`, `name=default`, `name:req`, `name:vararg`. A vararg
/// parameter must come last.
pub fn parse_macro_params(cur: &mut LineCursor<'_>) -> Result<Vec<MacroParam>, MacroError> {
    let mut params = Vec::new();
    loop {
        cur.skip_spaces();
        if cur.at_end() {
            break;
        }
        let Some(name) = cur.parse_name() else {
            return Err(MacroError::new("Expected macro parameter name", cur.pos));
        };
        let mut param = MacroParam {
            name: name.to_string(),
            default: None,
            required: false,
            vararg: false,
        };
        if cur.try_char(b'=') {
            param.default = Some(parse_param_value(cur));
        } else if cur.try_char(b':') {
            match cur.parse_name_lower().as_deref() {
                Some("req") => param.required = true,
                Some("vararg") => param.vararg = true,
                _ => {
                    return Err(MacroError::new(
                        "Expected 'req' or 'vararg' parameter qualifier",
                        cur.pos,
                    ))
                }
            }
        }
        if params.last().map(|p: &MacroParam| p.vararg).unwrap_or(false) {
            return Err(MacroError::new(
                "Vararg parameter must be the last parameter",
                cur.pos,
            ));
        }
        params.push(param);
        if !cur.try_char(b',') {
            cur.skip_spaces();
        }
    }
    Ok(params)
}

/// A single argument value: up to a comma at depth zero, quoted strings kept
/// without their quotes.
fn parse_param_value(cur: &mut LineCursor<'_>) -> String {
    cur.skip_spaces();
    let mut value = String::new();
    if cur.peek() == Some(b'"') {
        cur.bump();
        while let Some(c) = cur.peek() {
            if c == b'"' {
                cur.bump();
                break;
            }
            if c == b'\\' {
                cur.bump();
            }
            if let Some(c) = cur.peek() {
                value.push(c as char);
                cur.bump();
            }
        }
        return value;
    }
    let mut depth = 0usize;
    while let Some(c) = cur.peek() {
        match c {
            b',' | b' ' if depth == 0 => break,
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
        value.push(c as char);
        cur.bump();
    }
    value
}

/// Bind invocation arguments to a macro's parameters.
///
/// Arguments are positional, comma-separated; `name=value` sets a parameter
/// by name. A trailing vararg captures the comma-joined rest.
pub fn bind_macro_args(
    def: &MacroDef,
    cur: &mut LineCursor<'_>,
) -> Result<HashMap<String, String>, MacroError> {
    let mut bound: HashMap<String, String> = HashMap::new();
    let mut positional = 0usize;
    loop {
        cur.skip_spaces();
        if cur.at_end() {
            break;
        }
        // named form: name=value
        let mark = cur.pos;
        let mut named = false;
        if let Some(name) = cur.parse_name() {
            if cur.peek() == Some(b'=') && cur.peek_at(1) != Some(b'=') {
                cur.bump();
                if def.params.iter().any(|p| p.name == name) {
                    bound.insert(name.to_string(), parse_param_value(cur));
                    named = true;
                } else {
                    return Err(MacroError::new(
                        format!("Unknown macro parameter '{}'", name),
                        mark,
                    ));
                }
            }
        }
        if !named {
            cur.pos = mark;
            match def.params.get(positional) {
                Some(param) if param.vararg => {
                    // comma-joined tail
                    let mut tail = String::new();
                    loop {
                        let piece = parse_param_value(cur);
                        if !tail.is_empty() {
                            tail.push(',');
                        }
                        tail.push_str(&piece);
                        if !cur.try_char(b',') {
                            break;
                        }
                    }
                    bound.insert(param.name.clone(), tail);
                    positional += 1;
                    break;
                }
                Some(param) => {
                    bound.insert(param.name.clone(), parse_param_value(cur));
                    positional += 1;
                }
                None => {
                    return Err(MacroError::new("Too many macro arguments", cur.pos));
                }
            }
        }
        if !cur.try_char(b',') {
            cur.skip_spaces();
        }
    }
    // defaults and required checks
    for param in &def.params {
        if bound.contains_key(&param.name) {
            continue;
        }
        if param.required {
            return Err(MacroError::new(
                format!("Required macro argument '{}' not given", param.name),
                cur.pos,
            ));
        }
        bound.insert(
            param.name.clone(),
            param.default.clone().unwrap_or_default(),
        );
    }
    Ok(bound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def_with(params_text: &str) -> MacroDef {
        let mut cur = LineCursor::new(params_text, &[]);
        MacroDef {
            params: parse_macro_params(&mut cur).unwrap(),
            body: Rc::new(Vec::new()),
            pos: SourcePos::default(),
            content_line: 1,
        }
    }

    #[test]
    fn parses_parameter_forms() {
        let def = def_with("dst, src=s0, count:req, rest:vararg");
        assert_eq!(def.params.len(), 4);
        assert_eq!(def.params[1].default.as_deref(), Some("s0"));
        assert!(def.params[2].required);
        assert!(def.params[3].vararg);
    }

    #[test]
    fn vararg_must_be_last() {
        let mut cur = LineCursor::new("rest:vararg, tail", &[]);
        assert!(parse_macro_params(&mut cur).is_err());
    }

    #[test]
    fn binds_positional_and_defaults() {
        let def = def_with("dst, src=s9");
        let mut cur = LineCursor::new("v1", &[]);
        let bound = bind_macro_args(&def, &mut cur).unwrap();
        assert_eq!(bound["dst"], "v1");
        assert_eq!(bound["src"], "s9");
    }

    #[test]
    fn binds_named_argument() {
        let def = def_with("dst, src");
        let mut cur = LineCursor::new("src=v3, v0", &[]);
        let bound = bind_macro_args(&def, &mut cur).unwrap();
        assert_eq!(bound["src"], "v3");
        assert_eq!(bound["dst"], "v0");
    }

    #[test]
    fn missing_required_argument_fails() {
        let def = def_with("count:req");
        let mut cur = LineCursor::new("", &[]);
        assert!(bind_macro_args(&def, &mut cur).is_err());
    }

    #[test]
    fn vararg_captures_comma_joined_tail() {
        let def = def_with("first, rest:vararg");
        let mut cur = LineCursor::new("a, b, c, d", &[]);
        let bound = bind_macro_args(&def, &mut cur).unwrap();
        assert_eq!(bound["first"], "a");
        assert_eq!(bound["rest"], "b,c,d");
    }
}
