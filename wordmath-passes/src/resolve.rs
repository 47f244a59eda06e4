//! Name resolution pass.

use std::collections::HashMap;

use crate::infer::{infer, NumKind};
use crate::naming::Naming;
use tracing::debug;
use wordmath_parser::ast::{builtin_arity, Node, Program, Statement, PI};
use wordmath_parser::visitor::{walk_node, Visitor};
use wordmath_source::Error;

/// Represents a name bound by a declaration statement or a parameter list.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    /// A top-level binding stored in a static field.
    Variable { field: String, kind: NumKind },
    /// A parameter of the enclosing function.
    Parameter { local: String },
    /// A user-declared function.
    Function { mangled: String, arity: usize },
}

/// What an identifier in value position refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueRef<'a> {
    Pi,
    /// A field or parameter, by its generated name.
    Bound(&'a str),
    /// Bound nowhere. The value is read from the user at runtime.
    Free,
}

/// What the name of an invocation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionRef<'a> {
    Builtin,
    /// A user-declared function, by its generated name.
    User(&'a str),
}

/// Maps names to symbols for one scope.
/// Function bodies get their own copy (see [`SymbolTable::enter_function`]) so nothing leaks outwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
    /// Number of bindings created so far per variable name.
    variable_generations: HashMap<String, usize>,
    function_generations: HashMap<String, usize>,
}

fn next_generation(generations: &mut HashMap<String, usize>, ident: &str) -> usize {
    let generation = generations.entry(ident.to_string()).or_insert(0);
    *generation += 1;
    *generation
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, ident: &str) -> Option<&Symbol> {
        self.symbols.get(ident)
    }

    pub fn contains(&self, ident: &str) -> bool {
        self.symbols.contains_key(ident)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Binds `ident` to a new field and returns the field name.
    /// Rebinding a name creates a new field; the previous one stays untouched.
    pub fn declare_variable(&mut self, ident: &str, kind: NumKind, naming: &Naming) -> String {
        let generation = next_generation(&mut self.variable_generations, ident);
        let field = naming.field(ident, generation);
        self.symbols.insert(
            ident.to_string(),
            Symbol::Variable {
                field: field.clone(),
                kind,
            },
        );
        field
    }

    /// Binds `ident` to a new user function and returns its generated name.
    pub fn declare_function(&mut self, ident: &str, arity: usize, naming: &Naming) -> String {
        let generation = next_generation(&mut self.function_generations, ident);
        let mangled = naming.function(ident, generation);
        self.symbols.insert(
            ident.to_string(),
            Symbol::Function {
                mangled: mangled.clone(),
                arity,
            },
        );
        mangled
    }

    /// Returns the scope of a function body: a copy of `self` with `params` bound as parameters.
    pub fn enter_function(&self, params: &[String], naming: &Naming) -> SymbolTable {
        let mut local = self.clone();
        for param in params {
            local.symbols.insert(
                param.clone(),
                Symbol::Parameter {
                    local: naming.parameter(param),
                },
            );
        }
        local
    }

    /// Classifies an identifier used as a value.
    pub fn lookup_value(&self, ident: &str, line: Option<usize>) -> Result<ValueRef<'_>, Error> {
        if ident == PI {
            return Ok(ValueRef::Pi);
        }
        match self.symbols.get(ident) {
            Some(Symbol::Variable { field, .. }) => Ok(ValueRef::Bound(field)),
            Some(Symbol::Parameter { local }) => Ok(ValueRef::Bound(local)),
            Some(Symbol::Function { .. }) => Err(Error::not_implemented(
                format!("using function `{}` as a value", ident),
                line,
            )),
            None => Ok(ValueRef::Free),
        }
    }

    /// Classifies the callee of an invocation with `argc` arguments and checks its arity.
    pub fn lookup_function(
        &self,
        ident: &str,
        argc: usize,
        line: Option<usize>,
    ) -> Result<FunctionRef<'_>, Error> {
        let (callee, expected) = match (builtin_arity(ident), self.symbols.get(ident)) {
            (Some(arity), _) => (FunctionRef::Builtin, arity),
            (None, Some(Symbol::Function { mangled, arity })) => (FunctionRef::User(mangled), *arity),
            (None, Some(_)) => {
                return Err(Error::not_implemented(
                    format!("calling `{}`, which is not a function", ident),
                    line,
                ))
            }
            (None, None) => {
                return Err(Error::UnknownFunction {
                    name: ident.to_string(),
                    line,
                })
            }
        };
        if argc != expected {
            return Err(Error::Arity {
                construct: ident.to_string(),
                expected,
                found: argc,
                line,
            });
        }
        Ok(callee)
    }
}

/// Name resolution pass.
/// Walks the program in order, binding names the same way code generation does, and collects
/// the free variables together with the first resolution error.
pub struct Resolver {
    naming: Naming,
    globals: SymbolTable,
    /// Scope of the function body being resolved.
    local: Option<SymbolTable>,
    free_variables: Vec<String>,
    /// Line of the statement being resolved.
    line: Option<usize>,
    error: Option<Error>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::with_naming(Naming::default())
    }

    pub fn with_naming(naming: Naming) -> Self {
        Self {
            naming,
            globals: SymbolTable::new(),
            local: None,
            free_variables: Vec::new(),
            line: None,
            error: None,
        }
    }

    /// Resolves every statement of `program`. Stops at the first error.
    pub fn resolve_program(&mut self, program: &Program) -> Result<(), Error> {
        self.visit_program(program);
        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Names that are bound nowhere and become input prompts, in first-use order.
    pub fn free_variables(&self) -> &[String] {
        &self.free_variables
    }

    /// The global scope after resolution.
    pub fn globals(&self) -> &SymbolTable {
        &self.globals
    }

    fn scope(&self) -> &SymbolTable {
        self.local.as_ref().unwrap_or(&self.globals)
    }

    fn report(&mut self, err: Error) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl<'ast> Visitor<'ast> for Resolver {
    fn visit_node(&mut self, node: &'ast Node) {
        walk_node(self, node);

        let is_free = match node {
            Node::Identifier(ident) => self
                .scope()
                .lookup_value(ident, self.line)
                .map(|value| value == ValueRef::Free),
            Node::Invocation { ident, args } => self
                .scope()
                .lookup_function(ident, args.len(), self.line)
                .map(|_| false),
            _ => Ok(false),
        };
        match (is_free, node) {
            (Ok(true), Node::Identifier(ident)) => {
                if !self.free_variables.contains(ident) {
                    debug!(line = ?self.line, "free variable `{}`", ident);
                    self.free_variables.push(ident.clone());
                }
            }
            (Ok(_), _) => {}
            (Err(err), _) => self.report(err),
        }
    }

    fn visit_statement(&mut self, stmt: &'ast Statement) {
        // Do not use default walking logic.
        if self.error.is_some() {
            return;
        }
        self.line = stmt.line;

        match &stmt.body {
            Node::Assignment { ident, expr } => {
                self.visit_node(expr);
                let kind = infer(expr, &self.globals);
                self.globals.declare_variable(ident, kind, &self.naming);
            }
            Node::FnDeclaration {
                ident,
                params,
                body,
            } => {
                self.local = Some(self.globals.enter_function(params, &self.naming));
                self.visit_node(body);
                self.local = None;
                // declared after the body: a function can't call itself
                self.globals
                    .declare_function(ident, params.len(), &self.naming);
            }
            body => self.visit_node(body),
        }
    }
}
