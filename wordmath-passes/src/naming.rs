//! Naming conventions for generated identifiers.

/// Prefixes keeping generated names clear of keywords and runtime helpers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Naming {
    pub variable_prefix: String,
    pub function_prefix: String,
    pub init_prefix: String,
}

impl Default for Naming {
    fn default() -> Self {
        Self {
            variable_prefix: "v_".to_string(),
            function_prefix: "f_".to_string(),
            init_prefix: "Init_".to_string(),
        }
    }
}

impl Naming {
    /// Name of the field holding the `generation`-th top-level binding of `ident` (1-based).
    pub fn field(&self, ident: &str, generation: usize) -> String {
        if generation <= 1 {
            format!("{}{}", self.variable_prefix, sanitize(ident))
        } else {
            format!("{}{}_{}", self.variable_prefix, sanitize(ident), generation)
        }
    }

    pub fn parameter(&self, ident: &str) -> String {
        format!("{}{}", self.variable_prefix, sanitize(ident))
    }

    pub fn function(&self, ident: &str, generation: usize) -> String {
        if generation <= 1 {
            format!("{}{}", self.function_prefix, sanitize(ident))
        } else {
            format!("{}{}_{}", self.function_prefix, sanitize(ident), generation)
        }
    }

    /// Name of the function computing the initial value of `field`.
    pub fn init(&self, field: &str) -> String {
        format!("{}{}", self.init_prefix, field)
    }
}

/// Keeps ASCII letters, digits and `_`. Every other character becomes `_uXXXX`.
///
/// # Example
/// ```
/// use wordmath_passes::naming::sanitize;
/// assert_eq!(sanitize("speed_2"), "speed_2");
/// assert_eq!(sanitize("Δx"), "_u0394x");
/// ```
pub fn sanitize(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    for c in ident.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else {
            out.push_str(&format!("_u{:04X}", c as u32));
        }
    }
    out
}
