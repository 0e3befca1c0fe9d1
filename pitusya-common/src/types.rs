//! Common types used throughout the compiler
//!
//! Identifier aliases for IR temporaries and blocks, plus the small
//! generators that hand them out.

/// Label identifier for basic blocks
pub type LabelId = u32;

/// Temporary (SSA value) identifier for IR
pub type TempId = u32;

/// Temporary variable generator for IR
#[derive(Debug, Clone, Default)]
pub struct TempGenerator {
    next_id: TempId,
}

impl TempGenerator {
    pub fn new() -> Self {
        Self { next_id: 0 }
    }

    /// Start numbering after the ids already taken (e.g. by parameters)
    pub fn starting_at(next_id: TempId) -> Self {
        Self { next_id }
    }

    /// Generate a new temporary variable ID
    pub fn new_temp(&mut self) -> TempId {
        let temp = self.next_id;
        self.next_id += 1;
        temp
    }
}

/// Hands out unique symbol names derived from a fixed stem.
///
/// The first name is the stem itself, later ones get a `.N` suffix
/// (`__anon_expr`, `__anon_expr.1`, ...).
#[derive(Debug, Clone)]
pub struct SymbolNameGenerator {
    stem: String,
    next_id: u32,
}

impl SymbolNameGenerator {
    pub fn new(stem: &str) -> Self {
        Self {
            stem: stem.to_string(),
            next_id: 0,
        }
    }

    /// Generate the next unique name
    pub fn next_name(&mut self) -> String {
        let name = if self.next_id == 0 {
            self.stem.clone()
        } else {
            format!("{}.{}", self.stem, self.next_id)
        };
        self.next_id += 1;
        name
    }

    /// Whether `name` belongs to the family this generator produces
    pub fn is_reserved(&self, name: &str) -> bool {
        name == self.stem
            || name
                .strip_prefix(self.stem.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_generator() {
        let mut gen = TempGenerator::new();

        assert_eq!(gen.new_temp(), 0);
        assert_eq!(gen.new_temp(), 1);
        assert_eq!(gen.new_temp(), 2);
    }

    #[test]
    fn test_temp_generator_after_params() {
        let mut gen = TempGenerator::starting_at(2);
        assert_eq!(gen.new_temp(), 2);
        assert_eq!(gen.new_temp(), 3);
    }

    #[test]
    fn test_symbol_name_generator() {
        let mut gen = SymbolNameGenerator::new("__anon_expr");

        assert_eq!(gen.next_name(), "__anon_expr");
        assert_eq!(gen.next_name(), "__anon_expr.1");
        assert_eq!(gen.next_name(), "__anon_expr.2");
    }

    #[test]
    fn test_reserved_names() {
        let gen = SymbolNameGenerator::new("__anon_expr");

        assert!(gen.is_reserved("__anon_expr"));
        assert!(gen.is_reserved("__anon_expr.7"));
        assert!(!gen.is_reserved("__anon_exprs"));
        assert!(!gen.is_reserved("main"));
    }
}
