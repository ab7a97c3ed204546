//! Profile placeholder substitution.
//!
//! Placeholders look like `{{name}}` (inner whitespace allowed). A
//! placeholder with no matching profile variable is left as written.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::model::{Auth, Body, Headers};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_.\-]+)\s*\}\}").expect("placeholder pattern must compile")
});

/// Substitutes placeholders from a variable set.
#[derive(Debug, Clone, Copy)]
pub struct Substitutor<'a> {
    variables: &'a BTreeMap<String, String>,
}

impl<'a> Substitutor<'a> {
    pub fn new(variables: &'a BTreeMap<String, String>) -> Self {
        Self { variables }
    }

    pub fn apply<'s>(&self, text: &'s str) -> Cow<'s, str> {
        if self.variables.is_empty() {
            return Cow::Borrowed(text);
        }
        PLACEHOLDER.replace_all(text, |caps: &Captures<'_>| match self.variables.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
    }

    pub fn apply_in_place(&self, text: &mut String) {
        let replaced = match self.apply(text) {
            Cow::Owned(replaced) => replaced,
            Cow::Borrowed(_) => return,
        };
        *text = replaced;
    }

    pub fn apply_headers(&self, headers: &mut Headers) {
        for value in headers.values_mut() {
            self.apply_in_place(value);
        }
    }

    /// Substitutes inside text bodies and inside every string leaf of a
    /// structured body. Mapping keys are left alone.
    pub fn apply_body(&self, body: &mut Body) {
        match body {
            Body::Text(text) => self.apply_in_place(text),
            Body::Structured(value) => self.apply_value(value),
        }
    }

    pub fn apply_auth(&self, auth: &mut Auth) {
        if let Some(basic) = auth.basic.as_mut() {
            self.apply_in_place(&mut basic.username);
            if let Some(password) = basic.password.as_mut() {
                self.apply_in_place(password);
            }
        }
        if let Some(token) = auth.bearer.as_mut() {
            self.apply_in_place(token);
        }
    }

    fn apply_value(&self, value: &mut Value) {
        match value {
            Value::String(s) => self.apply_in_place(s),
            Value::Array(items) => items.iter_mut().for_each(|v| self.apply_value(v)),
            Value::Object(map) => map.values_mut().for_each(|v| self.apply_value(v)),
            _ => {}
        }
    }
}
