//! Assembler symbol table: pre-seeded addresses, label bindings,
//! and RAM allocation for variables.

use phf::phf_map;
use std::collections::HashMap;

/// Addresses seeded before pass 1. `SP`..`THAT` intentionally alias
/// `R0`..`R4`.
pub static PREDEFINED: phf::Map<&'static str, u16> = phf_map! {
    "SP" => 0, "LCL" => 1, "ARG" => 2, "THIS" => 3, "THAT" => 4,
    "R0" => 0, "R1" => 1, "R2" => 2, "R3" => 3,
    "R4" => 4, "R5" => 5, "R6" => 6, "R7" => 7,
    "R8" => 8, "R9" => 9, "R10" => 10, "R11" => 11,
    "R12" => 12, "R13" => 13, "R14" => 14, "R15" => 15,
    "SCREEN" => 16384, "KBD" => 24576,
};

/// Bindings only grow; a bound symbol is never re-addressed.
pub struct SymbolTable {
    bindings: HashMap<String, u16>,
    next_variable: u16,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            bindings: HashMap::with_capacity(64),
            next_variable: 16,
        }
    }

    /// Bind a label to an instruction address during pass 1.
    /// Returns the label back on a duplicate declaration.
    pub fn bind_label(&mut self, label: String, address: u16) -> Result<(), String> {
        if PREDEFINED.contains_key(label.as_str()) || self.bindings.contains_key(&label) {
            return Err(label);
        }
        self.bindings.insert(label, address);
        Ok(())
    }

    /// Resolve a symbol during pass 2, allocating the next RAM slot
    /// (from 16 upward) the first time an unbound variable is seen.
    pub fn resolve(&mut self, symbol: &str) -> u16 {
        if let Some(&addr) = PREDEFINED.get(symbol) {
            return addr;
        }
        if let Some(&addr) = self.bindings.get(symbol) {
            return addr;
        }

        let addr = self.next_variable;
        self.bindings.insert(symbol.to_string(), addr);
        self.next_variable += 1;
        addr
    }

    pub fn get(&self, symbol: &str) -> Option<u16> {
        PREDEFINED
            .get(symbol)
            .copied()
            .or_else(|| self.bindings.get(symbol).copied())
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predefined_addresses() {
        let table = SymbolTable::new();
        assert_eq!(table.get("SP"), Some(0));
        assert_eq!(table.get("R0"), Some(0));
        assert_eq!(table.get("THAT"), Some(4));
        assert_eq!(table.get("SCREEN"), Some(16384));
        assert_eq!(table.get("KBD"), Some(24576));
    }

    #[test]
    fn test_label_binding_and_duplicates() {
        let mut table = SymbolTable::new();
        assert!(table.bind_label("LOOP".to_string(), 7).is_ok());
        assert_eq!(table.get("LOOP"), Some(7));
        assert_eq!(table.bind_label("LOOP".to_string(), 9), Err("LOOP".to_string()));
    }

    #[test]
    fn test_label_cannot_shadow_predefined() {
        let mut table = SymbolTable::new();
        assert!(table.bind_label("SCREEN".to_string(), 3).is_err());
    }

    #[test]
    fn test_variable_allocation_starts_at_16() {
        let mut table = SymbolTable::new();
        assert_eq!(table.resolve("i"), 16);
        assert_eq!(table.resolve("j"), 17);
        assert_eq!(table.resolve("i"), 16);
        assert_eq!(table.resolve("k"), 18);
    }

    #[test]
    fn test_resolve_prefers_bound_label() {
        let mut table = SymbolTable::new();
        table.bind_label("END".to_string(), 42).unwrap();
        assert_eq!(table.resolve("END"), 42);
    }
}
