// 🛒 Equipment Cart - in-memory, single session
// Lines keep insertion order; one line per item id

use crate::entities::equipment::EquipmentItem;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub item_id: String,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
}

impl CartLine {
    pub fn line_total(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` units; merges with an existing line. Zero is a no-op.
    pub fn add(&mut self, item: &EquipmentItem, quantity: u32) {
        if quantity == 0 {
            return;
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.item_id == item.id) {
            line.quantity = line.quantity.saturating_add(quantity);
            return;
        }

        self.lines.push(CartLine {
            item_id: item.id.clone(),
            name: item.name.clone(),
            unit_price: item.price,
            quantity,
        });
    }

    /// Remove a line; returns it if present
    pub fn remove(&mut self, item_id: &str) -> Option<CartLine> {
        let pos = self.lines.iter().position(|l| l.item_id == item_id)?;
        Some(self.lines.remove(pos))
    }

    /// Overwrite a line's quantity (0 removes). Returns false for unknown ids.
    pub fn set_quantity(&mut self, item_id: &str, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(item_id).is_some();
        }

        match self.lines.iter_mut().find(|l| l.item_id == item_id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn subtotal(&self) -> f64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Total units across all lines
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::equipment::{EquipmentCatalog, ItemKind};

    #[test]
    fn test_add_merges_lines() {
        let catalog = EquipmentCatalog::new();
        let mut cart = Cart::new();

        cart.add(catalog.find_by_id("gloves").unwrap(), 1);
        cart.add(catalog.find_by_id("belt").unwrap(), 2);
        cart.add(catalog.find_by_id("gloves").unwrap(), 2);

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines()[0].quantity, 3);
        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.subtotal(), 3.0 * 250.0 + 2.0 * 120.0);
    }

    #[test]
    fn test_add_zero_is_noop() {
        let item = EquipmentItem::new("bo-staff", "Bo", 380.0, ItemKind::Weapon);
        let mut cart = Cart::new();
        cart.add(&item, 0);

        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_and_remove() {
        let catalog = EquipmentCatalog::new();
        let mut cart = Cart::new();
        cart.add(catalog.find_by_id("shoes").unwrap(), 1);
        cart.add(catalog.find_by_id("membership").unwrap(), 1);

        assert!(cart.set_quantity("shoes", 4));
        assert_eq!(cart.subtotal(), 4.0 * 250.0 + 500.0);

        assert!(cart.set_quantity("membership", 0));
        assert_eq!(cart.lines().len(), 1);
        assert!(!cart.set_quantity("headgear", 1));

        assert_eq!(cart.remove("shoes").unwrap().quantity, 4);
        assert!(cart.remove("shoes").is_none());
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), 0.0);
    }

    #[test]
    fn test_clear() {
        let catalog = EquipmentCatalog::new();
        let mut cart = Cart::new();
        cart.add(catalog.find_by_id("headgear").unwrap(), 1);
        cart.clear();

        assert_eq!(cart.item_count(), 0);
    }
}
