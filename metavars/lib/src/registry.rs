//! The function table placeholders are evaluated against.
//!
//! Functions are registered with an explicit arity and looked up by the
//! `(name, arity)` pair. Once built, a [`Registry`] is never mutated.

use std::collections::HashMap;
use std::fmt;

use crate::config::Clock;
use crate::error::{MetavarsError, Result};
use crate::functions;
use crate::node::Inline;

/// Number of arguments a placeholder function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Arity {
    Zero,
    One,
}

impl Arity {
    pub fn count(self) -> usize {
        match self {
            Arity::Zero => 0,
            Arity::One => 1,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Zero => write!(f, "no arguments"),
            Arity::One => write!(f, "1 argument"),
        }
    }
}

/// What a placeholder function hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionValue {
    /// Replaces the placeholder with bare text.
    PlainText(String),
    /// Replaces the placeholder with a tagged span around these inlines.
    RichContent(Vec<Inline>),
}

impl From<String> for FunctionValue {
    fn from(text: String) -> Self {
        FunctionValue::PlainText(text)
    }
}

impl From<&str> for FunctionValue {
    fn from(text: &str) -> Self {
        FunctionValue::PlainText(text.to_string())
    }
}

impl From<Vec<Inline>> for FunctionValue {
    fn from(inlines: Vec<Inline>) -> Self {
        FunctionValue::RichContent(inlines)
    }
}

pub type NullaryFn = Box<dyn Fn() -> Result<FunctionValue> + Send + Sync>;
pub type UnaryFn = Box<dyn Fn(&str) -> Result<FunctionValue> + Send + Sync>;

/// A registered callable; the variant fixes its arity.
pub enum Function {
    Nullary(NullaryFn),
    Unary(UnaryFn),
}

impl Function {
    pub fn arity(&self) -> Arity {
        match self {
            Function::Nullary(_) => Arity::Zero,
            Function::Unary(_) => Arity::One,
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Function").field(&self.arity()).finish()
    }
}

/// Immutable lookup table of placeholder functions.
#[derive(Debug, Default)]
pub struct Registry {
    functions: HashMap<(String, Arity), Function>,
}

impl Registry {
    /// Starts an empty registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// The built-in functions, `today/0` and `yearsSince/1`, reading time
    /// from `clock`.
    ///
    /// ## Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use metavars_lib::{Arity, Clock, Registry};
    ///
    /// let clock = Clock::fixed_date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    /// let registry = Registry::builtin(clock);
    /// assert!(registry.lookup("today", Arity::Zero).is_ok());
    /// assert!(registry.lookup("today", Arity::One).is_err());
    /// ```
    pub fn builtin(clock: Clock) -> Self {
        Self::builder().with_builtins(clock).build()
    }

    /// Finds the function registered under exactly `(name, arity)`.
    ///
    /// ## Errors
    ///
    /// Returns [`MetavarsError::UnknownFunction`] when no entry matches,
    /// including when `name` exists with a different arity.
    pub fn lookup(&self, name: &str, arity: Arity) -> Result<&Function> {
        self.functions
            .get(&(name.to_string(), arity))
            .ok_or_else(|| MetavarsError::UnknownFunction {
                name: name.to_string(),
                arity,
            })
    }

    /// Registered signatures as `name/arity`, sorted.
    pub fn signatures(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.functions.keys().collect();
        keys.sort();
        keys.into_iter()
            .map(|(name, arity)| format!("{name}/{}", arity.count()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// Collects registrations before freezing them into a [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    functions: HashMap<(String, Arity), Function>,
}

impl RegistryBuilder {
    /// Adds `today` and `yearsSince`.
    pub fn with_builtins(self, clock: Clock) -> Self {
        let years_clock = clock.clone();
        self.nullary("today", move || Ok(functions::today(&clock)))
            .unary("yearsSince", move |arg| {
                functions::years_since(&years_clock, arg)
            })
    }

    /// Registers a zero-argument function.
    pub fn nullary<F>(self, name: &str, f: F) -> Self
    where
        F: Fn() -> Result<FunctionValue> + Send + Sync + 'static,
    {
        self.insert(name, Function::Nullary(Box::new(f)))
    }

    /// Registers a one-argument function.
    pub fn unary<F>(self, name: &str, f: F) -> Self
    where
        F: Fn(&str) -> Result<FunctionValue> + Send + Sync + 'static,
    {
        self.insert(name, Function::Unary(Box::new(f)))
    }

    fn insert(mut self, name: &str, function: Function) -> Self {
        let key = (name.to_string(), function.arity());
        if self.functions.contains_key(&key) {
            tracing::warn!(name, arity = %key.1, "Function already registered; keeping the first");
        } else {
            self.functions.insert(key, function);
        }
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            functions: self.functions,
        }
    }
}
