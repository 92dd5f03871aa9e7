// 🏷️ Promotional Codes - Codes as Data
// Static registry of flat-amount discount codes

use anyhow::{anyhow, Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

// ============================================================================
// CODE ENTRY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromoCode {
    /// Normalized code (trimmed, uppercase)
    pub code: String,

    /// Flat amount subtracted from the enrollment price
    pub discount: f64,

    /// Inactive codes are recognized but rejected
    #[serde(default = "default_active")]
    pub active: bool,

    #[serde(default)]
    pub description: Option<String>,
}

fn default_active() -> bool {
    true
}

impl PromoCode {
    pub fn new(code: &str, discount: f64, active: bool) -> Self {
        PromoCode {
            code: normalize_code(code),
            discount,
            active,
            description: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Discount is finite and non-negative; an active code must discount something
    pub fn validate(&self) -> Result<()> {
        if normalize_code(&self.code).is_empty() {
            return Err(anyhow!("Promo code is empty"));
        }
        if !self.discount.is_finite() || self.discount < 0.0 {
            return Err(anyhow!(
                "Invalid discount {} for code '{}'",
                self.discount,
                self.code
            ));
        }
        if self.active && self.discount <= 0.0 {
            return Err(anyhow!(
                "Active code '{}' must have a discount greater than 0",
                self.code
            ));
        }
        Ok(())
    }
}

/// Trim surrounding whitespace and uppercase
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

// ============================================================================
// LOOKUP ERRORS
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PromoError {
    #[error("Promo code not found: {0}")]
    NotFound(String),

    #[error("Promo code is no longer active: {0}")]
    Inactive(String),
}

impl PromoError {
    /// Message shown to the user; both kinds read the same
    pub fn user_message(&self) -> &'static str {
        "El código promocional no es válido o ha expirado."
    }

    pub fn code(&self) -> &str {
        match self {
            PromoError::NotFound(code) | PromoError::Inactive(code) => code,
        }
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

#[derive(Debug, Clone)]
pub struct PromoRegistry {
    codes: HashMap<String, PromoCode>,
}

impl PromoRegistry {
    /// Registry with the academy's built-in codes
    pub fn new() -> Self {
        let mut registry = PromoRegistry::empty();
        registry.register_default_codes();
        registry
    }

    pub fn empty() -> Self {
        PromoRegistry {
            codes: HashMap::new(),
        }
    }

    fn register_default_codes(&mut self) {
        for code in default_codes() {
            self.insert(code);
        }
    }

    /// Load codes from a JSON array of entries
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read promo codes file: {:?}", path.as_ref()))?;

        let codes: Vec<PromoCode> =
            serde_json::from_str(&content).context("Failed to parse promo codes JSON")?;

        Self::from_codes(codes)
    }

    /// Build a registry from entries; rejects invalid entries and codes that
    /// collide after normalization
    pub fn from_codes(codes: Vec<PromoCode>) -> Result<Self> {
        let mut registry = PromoRegistry::empty();
        for code in codes {
            if registry.codes.contains_key(&normalize_code(&code.code)) {
                return Err(anyhow!("Duplicate promo code: {}", normalize_code(&code.code)));
            }
            registry.register(code)?;
        }
        Ok(registry)
    }

    /// Validate, then add or replace a code (key is normalized)
    pub fn register(&mut self, code: PromoCode) -> Result<()> {
        code.validate()?;
        self.insert(code);
        Ok(())
    }

    fn insert(&mut self, mut code: PromoCode) {
        code.code = normalize_code(&code.code);
        self.codes.insert(code.code.clone(), code);
    }

    /// Raw membership test, ignores the active flag
    pub fn get(&self, raw_input: &str) -> Option<&PromoCode> {
        self.codes.get(&normalize_code(raw_input))
    }

    pub fn lookup(&self, raw_input: &str) -> Result<&PromoCode, PromoError> {
        lookup_code(raw_input, self)
    }

    /// Active codes sorted by name
    pub fn active_codes(&self) -> Vec<&PromoCode> {
        let mut active: Vec<&PromoCode> = self.codes.values().filter(|c| c.active).collect();
        active.sort_by(|a, b| a.code.cmp(&b.code));
        active
    }

    pub fn count(&self) -> usize {
        self.codes.len()
    }
}

impl Default for PromoRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn default_codes() -> Vec<PromoCode> {
    vec![
        PromoCode::new("AMAS-DESC100", 100.0, true).with_description("Descuento de bienvenida"),
        PromoCode::new("PRIMAVEZ", 80.0, true).with_description("Primera inscripción"),
        PromoCode::new("HERMANOS150", 150.0, true).with_description("Inscripción de hermanos"),
        PromoCode::new("VERANO2024", 200.0, false).with_description("Campaña de verano 2024"),
        PromoCode::new("OPENHOUSE", 120.0, false),
    ]
}

/// Validate user input against the registry
pub fn lookup_code<'a>(raw_input: &str, registry: &'a PromoRegistry) -> Result<&'a PromoCode, PromoError> {
    let normalized = normalize_code(raw_input);

    match registry.codes.get(&normalized) {
        None => Err(PromoError::NotFound(normalized)),
        Some(entry) if !entry.active => Err(PromoError::Inactive(normalized)),
        Some(entry) => Ok(entry),
    }
}

// ============================================================================
// TESTS
// ============================================================================
