// 🥋 Equipment Entity - Immutable reference data
// Uniforms, protection and weapons a student can already own
//
// Loaded once at startup (built-in defaults or CSV), never mutated afterwards.
// Membership entries live in the same catalog but never count as a discount.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

// ============================================================================
// ITEM KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Gi, dobok, belts
    Uniform,

    /// Gloves, shin guards, headgear, mouthguards
    Protection,

    /// Training weapons (bo staff, escrima sticks)
    Weapon,

    /// Shoes, t-shirts, bags
    Apparel,

    /// Academy membership fee - never discount-eligible
    Membership,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Uniform => "Uniform",
            ItemKind::Protection => "Protection",
            ItemKind::Weapon => "Weapon",
            ItemKind::Apparel => "Apparel",
            ItemKind::Membership => "Membership",
        }
    }

    /// Parse the lowercase CSV spelling
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "uniform" => Some(ItemKind::Uniform),
            "protection" => Some(ItemKind::Protection),
            "weapon" => Some(ItemKind::Weapon),
            "apparel" => Some(ItemKind::Apparel),
            "membership" => Some(ItemKind::Membership),
            _ => None,
        }
    }
}

// ============================================================================
// EQUIPMENT ITEM
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentItem {
    /// Unique identifier ("gloves", "shoes", ...)
    pub id: String,

    /// Display name
    pub name: String,

    /// Unit price, never negative
    pub price: f64,

    pub kind: ItemKind,
}

impl EquipmentItem {
    pub fn new(id: &str, name: &str, price: f64, kind: ItemKind) -> Self {
        EquipmentItem {
            id: id.to_string(),
            name: name.to_string(),
            price,
            kind,
        }
    }

    /// Owning this item reduces the enrollment price
    pub fn is_discount_eligible(&self) -> bool {
        self.kind != ItemKind::Membership
    }
}

/// CSV row: id,name,price,kind
#[derive(Debug, Deserialize)]
struct EquipmentRow {
    id: String,
    name: String,
    price: f64,
    kind: String,
}

// ============================================================================
// EQUIPMENT CATALOG
// ============================================================================

/// Ordered catalog of every item the academy sells
#[derive(Debug, Clone)]
pub struct EquipmentCatalog {
    items: Vec<EquipmentItem>,
}

impl EquipmentCatalog {
    /// Create catalog with the academy's default items
    pub fn new() -> Self {
        let mut catalog = EquipmentCatalog { items: Vec::new() };
        catalog.register_default_items();
        catalog
    }

    /// Build a catalog from an explicit list (order preserved)
    pub fn from_items(items: Vec<EquipmentItem>) -> Result<Self> {
        let mut seen = HashSet::new();
        for item in &items {
            if item.price < 0.0 || !item.price.is_finite() {
                return Err(anyhow!("Invalid price {} for item '{}'", item.price, item.id));
            }
            if !seen.insert(item.id.clone()) {
                return Err(anyhow!("Duplicate equipment id: {}", item.id));
            }
        }
        Ok(EquipmentCatalog { items })
    }

    /// Load catalog from CSV with header `id,name,price,kind`
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut rdr = csv::Reader::from_path(path.as_ref())
            .with_context(|| format!("Failed to open catalog CSV: {:?}", path.as_ref()))?;

        let mut items = Vec::new();
        for (line, result) in rdr.deserialize().enumerate() {
            let row: EquipmentRow = result
                .with_context(|| format!("Failed to parse catalog row {}", line + 1))?;
            let kind = ItemKind::parse(&row.kind)
                .ok_or_else(|| anyhow!("Unknown item kind '{}' for '{}'", row.kind, row.id))?;
            items.push(EquipmentItem {
                id: row.id.trim().to_string(),
                name: row.name.trim().to_string(),
                price: row.price,
                kind,
            });
        }

        Self::from_items(items)
    }

    fn register_default_items(&mut self) {
        self.items = vec![
            EquipmentItem::new("uniform", "Uniforme oficial", 650.0, ItemKind::Uniform),
            EquipmentItem::new("belt", "Cinta", 120.0, ItemKind::Uniform),
            EquipmentItem::new("gloves", "Guantes", 250.0, ItemKind::Protection),
            EquipmentItem::new("shin-guards", "Espinilleras", 320.0, ItemKind::Protection),
            EquipmentItem::new("headgear", "Careta", 450.0, ItemKind::Protection),
            EquipmentItem::new("mouthguard", "Protector bucal", 90.0, ItemKind::Protection),
            EquipmentItem::new("shoes", "Zapatos de entrenamiento", 250.0, ItemKind::Apparel),
            EquipmentItem::new("bo-staff", "Bo", 380.0, ItemKind::Weapon),
            EquipmentItem::new("membership", "Membresía anual", 500.0, ItemKind::Membership),
        ];
    }

    /// Find item by id
    pub fn find_by_id(&self, id: &str) -> Option<&EquipmentItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// All items, in catalog order
    pub fn all_items(&self) -> &[EquipmentItem] {
        &self.items
    }

    /// Items whose ownership reduces the enrollment price
    pub fn discount_eligible(&self) -> Vec<&EquipmentItem> {
        self.items.iter().filter(|i| i.is_discount_eligible()).collect()
    }

    pub fn by_kind(&self, kind: ItemKind) -> Vec<&EquipmentItem> {
        self.items.iter().filter(|i| i.kind == kind).collect()
    }

    /// Resolve ids to items, skipping unknown ids
    pub fn resolve<'a, I>(&self, ids: I) -> Vec<&EquipmentItem>
    where
        I: IntoIterator<Item = &'a str>,
    {
        ids.into_iter().filter_map(|id| self.find_by_id(id)).collect()
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }
}

impl Default for EquipmentCatalog {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
