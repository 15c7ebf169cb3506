//! Lexical environment of the tree-walking interpreter.

use crate::omega::Omega;
use std::collections::HashMap;

/// Stack of scopes; the last one is innermost
#[derive(Debug, Clone)]
pub struct Env {
    scopes: Vec<HashMap<String, Omega>>,
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

impl Env {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    /// Environment of a fresh function activation
    pub fn with_params(params: &[String], args: Vec<Omega>) -> Self {
        let scope = params.iter().cloned().zip(args).collect();
        Self {
            scopes: vec![scope],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn get(&self, name: &str) -> Option<&Omega> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn declare(&mut self, name: &str, value: Omega) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), value);
        }
    }

    /// Update the innermost visible `name`, or declare it in the current scope
    pub fn assign_or_declare(&mut self, name: &str, value: Omega) {
        match self
            .scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(name))
        {
            Some(slot) => *slot = value,
            None => self.declare(name, value),
        }
    }

    pub fn assign(&mut self, name: &str, value: Omega) -> bool {
        match self
            .scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(name))
        {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}
