// 💰 Pricing - Enrollment quote computation
// Base price minus owned equipment minus promo code, floored at zero

use crate::entities::equipment::EquipmentItem;
use crate::promo::PromoCode;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Final amount due for an enrollment. Never negative.
///
/// Unknown ids in `owned_item_ids` are ignored. Membership items never
/// reduce the price even when owned.
pub fn compute_final_price(
    base_price: f64,
    owned_item_ids: &HashSet<String>,
    all_items: &[EquipmentItem],
    applied_code: Option<&PromoCode>,
) -> f64 {
    let owned_total = owned_discount_total(owned_item_ids, all_items);
    let code_discount = applied_code.map(|c| c.discount).unwrap_or(0.0);

    (base_price - owned_total - code_discount).max(0.0)
}

fn eligible_owned<'a>(
    owned_item_ids: &'a HashSet<String>,
    all_items: &'a [EquipmentItem],
) -> impl Iterator<Item = &'a EquipmentItem> {
    all_items
        .iter()
        .filter(|item| item.is_discount_eligible() && owned_item_ids.contains(&item.id))
}

fn owned_discount_total(owned_item_ids: &HashSet<String>, all_items: &[EquipmentItem]) -> f64 {
    eligible_owned(owned_item_ids, all_items).map(|i| i.price).sum()
}

// ============================================================================
// QUOTE
// ============================================================================

/// Transient input of a single pricing computation
#[derive(Debug, Clone, Default)]
pub struct EnrollmentQuote {
    pub base_price: f64,
    pub owned_item_ids: HashSet<String>,
    pub applied_code: Option<PromoCode>,
}

impl EnrollmentQuote {
    pub fn new(base_price: f64) -> Self {
        EnrollmentQuote {
            base_price,
            ..Default::default()
        }
    }

    pub fn with_owned<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.owned_item_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_code(mut self, code: PromoCode) -> Self {
        self.applied_code = Some(code);
        self
    }

    pub fn final_price(&self, all_items: &[EquipmentItem]) -> f64 {
        compute_final_price(
            self.base_price,
            &self.owned_item_ids,
            all_items,
            self.applied_code.as_ref(),
        )
    }

    pub fn breakdown(&self, all_items: &[EquipmentItem]) -> QuoteBreakdown {
        quote_breakdown(self, all_items)
    }
}

// ============================================================================
// BREAKDOWN
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiscountKind {
    OwnedItem,
    PromoCode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountLine {
    pub kind: DiscountKind,

    /// Equipment id or promo code
    pub reference: String,

    pub label: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteBreakdown {
    pub base_price: f64,
    pub discounts: Vec<DiscountLine>,
    pub applied_code: Option<String>,
    pub total_discount: f64,
    pub final_price: f64,
}

impl QuoteBreakdown {
    /// Discount lines exceeded the base price
    pub fn is_fully_covered(&self) -> bool {
        self.final_price == 0.0
    }

    pub fn summary(&self) -> String {
        format!(
            "Base: ${:.2}, Descuentos: ${:.2} ({} conceptos), Total: ${:.2}",
            self.base_price,
            self.total_discount,
            self.discounts.len(),
            self.final_price
        )
    }
}

/// Itemized version of [`compute_final_price`]
pub fn quote_breakdown(quote: &EnrollmentQuote, all_items: &[EquipmentItem]) -> QuoteBreakdown {
    let mut discounts: Vec<DiscountLine> = eligible_owned(&quote.owned_item_ids, all_items)
        .map(|item| DiscountLine {
            kind: DiscountKind::OwnedItem,
            reference: item.id.clone(),
            label: item.name.clone(),
            amount: item.price,
        })
        .collect();

    if let Some(code) = &quote.applied_code {
        discounts.push(DiscountLine {
            kind: DiscountKind::PromoCode,
            reference: code.code.clone(),
            label: code
                .description
                .clone()
                .unwrap_or_else(|| format!("Código {}", code.code)),
            amount: code.discount,
        });
    }

    let total_discount = discounts.iter().map(|d| d.amount).sum();

    QuoteBreakdown {
        base_price: quote.base_price,
        discounts,
        applied_code: quote.applied_code.as_ref().map(|c| c.code.clone()),
        total_discount,
        final_price: quote.final_price(all_items),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::equipment::{EquipmentCatalog, ItemKind};
    use crate::promo::PromoRegistry;
    use quickcheck_macros::quickcheck;

    fn owned(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_owned_items_and_code() {
        let catalog = EquipmentCatalog::new();
        let promos = PromoRegistry::new();
        let code = promos.lookup("AMAS-DESC100").unwrap();

        let price = compute_final_price(
            1299.0,
            &owned(&["gloves", "shoes"]),
            catalog.all_items(),
            Some(code),
        );

        assert_eq!(price, 699.0);
    }

    #[test]
    fn test_no_discounts() {
        let catalog = EquipmentCatalog::new();
        let price = compute_final_price(330.0, &HashSet::new(), catalog.all_items(), None);

        assert_eq!(price, 330.0);
    }

    #[test]
    fn test_clamped_at_zero() {
        let items = vec![EquipmentItem::new("bag", "Maleta", 150.0, ItemKind::Apparel)];
        let code = PromoCode::new("PRIMAVEZ", 80.0, true);

        let price = compute_final_price(100.0, &owned(&["bag"]), &items, Some(&code));

        assert_eq!(price, 0.0);
    }

    #[test]
    fn test_unknown_ids_ignored() {
        let catalog = EquipmentCatalog::new();
        let price = compute_final_price(
            1000.0,
            &owned(&["does-not-exist", "belt"]),
            catalog.all_items(),
            None,
        );

        assert_eq!(price, 880.0);
    }

    #[test]
    fn test_membership_never_discounts() {
        let catalog = EquipmentCatalog::new();
        let price = compute_final_price(1299.0, &owned(&["membership"]), catalog.all_items(), None);

        assert_eq!(price, 1299.0);
    }

    #[test]
    fn test_breakdown_itemized() {
        let catalog = EquipmentCatalog::new();
        let promos = PromoRegistry::new();
        let quote = EnrollmentQuote::new(1299.0)
            .with_owned(["shoes", "gloves", "membership"])
            .with_code(promos.lookup("amas-desc100").unwrap().clone());

        let breakdown = quote.breakdown(catalog.all_items());

        // Catalog order, then the code
        let refs: Vec<&str> = breakdown.discounts.iter().map(|d| d.reference.as_str()).collect();
        assert_eq!(refs, vec!["gloves", "shoes", "AMAS-DESC100"]);
        assert_eq!(breakdown.total_discount, 600.0);
        assert_eq!(breakdown.final_price, 699.0);
        assert_eq!(breakdown.applied_code.as_deref(), Some("AMAS-DESC100"));
        assert!(!breakdown.is_fully_covered());
    }

    #[test]
    fn test_breakdown_total_discount_may_exceed_base() {
        let catalog = EquipmentCatalog::new();
        let quote = EnrollmentQuote::new(300.0).with_owned(["uniform"]);
        let breakdown = quote.breakdown(catalog.all_items());

        assert_eq!(breakdown.total_discount, 650.0);
        assert_eq!(breakdown.final_price, 0.0);
        assert!(breakdown.is_fully_covered());
    }

    #[quickcheck]
    fn prop_discount_at_least_base_yields_zero(base: u16, extra: u16, split: u8) -> bool {
        let base = base as f64;
        let total = base + extra as f64;
        let item_part = (total * split as f64 / 255.0).floor();
        let code_part = total - item_part;

        let items = vec![EquipmentItem::new("x", "X", item_part, ItemKind::Protection)];
        let code = PromoCode::new("Q", code_part, true);

        compute_final_price(base, &owned(&["x"]), &items, Some(&code)) == 0.0
    }

    #[quickcheck]
    fn prop_never_negative_and_matches_breakdown(base: u16, prices: Vec<u16>, mask: Vec<bool>) -> bool {
        let items: Vec<EquipmentItem> = prices
            .iter()
            .enumerate()
            .map(|(i, p)| EquipmentItem::new(&format!("i{}", i), "item", *p as f64, ItemKind::Uniform))
            .collect();
        let owned_ids: HashSet<String> = items
            .iter()
            .zip(mask.iter())
            .filter(|(_, m)| **m)
            .map(|(i, _)| i.id.clone())
            .collect();

        let quote = EnrollmentQuote {
            base_price: base as f64,
            owned_item_ids: owned_ids.clone(),
            applied_code: None,
        };
        let price = compute_final_price(base as f64, &owned_ids, &items, None);

        price >= 0.0 && quote.breakdown(&items).final_price == price
    }
}
