// 📋 Program Entity - Enrollment offerings
// Each program has a base price and the equipment bundled into it.
// A student who already owns bundled equipment pays less (see pricing).

use crate::entities::equipment::{EquipmentCatalog, EquipmentItem};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: String,
    pub name: String,

    /// Price before any owned-equipment or promo discount
    pub base_price: f64,

    /// Equipment ids bundled with the program
    pub included_items: Vec<String>,
}

impl Program {
    pub fn new(id: &str, name: &str, base_price: f64, included_items: &[&str]) -> Self {
        Program {
            id: id.to_string(),
            name: name.to_string(),
            base_price,
            included_items: included_items.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Bundled equipment resolved against the catalog (unknown ids skipped)
    pub fn included_equipment<'a>(&self, catalog: &'a EquipmentCatalog) -> Vec<&'a EquipmentItem> {
        catalog.resolve(self.included_items.iter().map(String::as_str))
    }

    /// Owned copies of the bundled items, the equipment an enrollment is
    /// priced against. An id listed twice appears once.
    pub fn bundle(&self, catalog: &EquipmentCatalog) -> Vec<EquipmentItem> {
        let mut bundle: Vec<EquipmentItem> = Vec::new();
        for item in self.included_equipment(catalog) {
            if !bundle.iter().any(|b| b.id == item.id) {
                bundle.push(item.clone());
            }
        }
        bundle
    }

    pub fn includes(&self, item_id: &str) -> bool {
        self.included_items.iter().any(|id| id == item_id)
    }
}

// ============================================================================
// PROGRAM REGISTRY
// ============================================================================

pub struct ProgramRegistry {
    programs: Vec<Program>,
}

impl ProgramRegistry {
    pub fn new() -> Self {
        let mut registry = ProgramRegistry { programs: Vec::new() };
        registry.register_default_programs();
        registry
    }

    fn register_default_programs(&mut self) {
        self.register(Program::new(
            "kids",
            "Programa Infantil",
            1299.0,
            &["uniform", "belt", "gloves", "shoes", "membership"],
        ));
        self.register(Program::new(
            "adults",
            "Programa Adultos",
            1499.0,
            &["uniform", "belt", "gloves", "shin-guards", "membership"],
        ));
        self.register(Program::new(
            "weapons",
            "Armas Tradicionales",
            980.0,
            &["bo-staff", "membership"],
        ));
        self.register(Program::new("trial", "Clase Muestra", 330.0, &[]));
    }

    /// Register a program; replaces an existing program with the same id
    /// (compared the way `find_by_id` compares)
    pub fn register(&mut self, program: Program) {
        let id = program.id.trim();
        self.programs.retain(|p| !p.id.eq_ignore_ascii_case(id));
        self.programs.push(program);
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Program> {
        let id = id.trim();
        self.programs.iter().find(|p| p.id.eq_ignore_ascii_case(id))
    }

    pub fn all_programs(&self) -> &[Program] {
        &self.programs
    }

    pub fn count(&self) -> usize {
        self.programs.len()
    }
}

impl Default for ProgramRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_programs() {
        let registry = ProgramRegistry::new();

        assert_eq!(registry.count(), 4);
        assert_eq!(registry.find_by_id("kids").unwrap().base_price, 1299.0);
        assert_eq!(registry.find_by_id(" TRIAL ").unwrap().base_price, 330.0);
        assert!(registry.find_by_id("yoga").is_none());
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = ProgramRegistry::new();
        registry.register(Program::new("trial", "Clase Muestra", 0.0, &[]));

        assert_eq!(registry.count(), 4);
        assert_eq!(registry.find_by_id("trial").unwrap().base_price, 0.0);
    }

    #[test]
    fn test_register_replaces_ignoring_case() {
        let mut registry = ProgramRegistry::new();
        registry.register(Program::new("KIDS", "Programa Infantil 2", 1399.0, &[]));

        assert_eq!(registry.count(), 4);
        let kids = registry.find_by_id("kids").unwrap();
        assert_eq!(kids.base_price, 1399.0);
        assert_eq!(kids.name, "Programa Infantil 2");
    }

    #[test]
    fn test_bundle_is_owned_copy() {
        let catalog = EquipmentCatalog::new();
        let program = Program::new("x", "X", 100.0, &["shoes", "missing", "gloves", "shoes"]);

        let ids: Vec<String> = program.bundle(&catalog).into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["shoes".to_string(), "gloves".to_string()]);
    }

    #[test]
    fn test_included_equipment() {
        let catalog = EquipmentCatalog::new();
        let program = Program::new("x", "X", 100.0, &["gloves", "missing", "shoes"]);

        let names: Vec<&str> = program
            .included_equipment(&catalog)
            .iter()
            .map(|i| i.name.as_str())
            .collect();

        assert_eq!(names, vec!["Guantes", "Zapatos de entrenamiento"]);
        assert!(program.includes("missing"));
    }
}
