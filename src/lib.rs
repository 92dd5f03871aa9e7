// Academy Enrollment - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod config;
pub mod logging;
pub mod entities;   // Equipment + program reference data
pub mod promo;      // Promotional code registry
pub mod pricing;    // Quote computation
pub mod cart;       // In-memory equipment cart
pub mod enrollment; // Form validation + webhook payload
pub mod webhook;    // Webhook submission
pub mod catalogs;   // Startup loading of all reference data

// Re-export commonly used types
pub use config::Config;
pub use entities::{
    EquipmentCatalog, EquipmentItem, ItemKind,
    Program, ProgramRegistry,
};
pub use promo::{lookup_code, normalize_code, PromoCode, PromoError, PromoRegistry};
pub use pricing::{
    compute_final_price, quote_breakdown,
    DiscountKind, DiscountLine, EnrollmentQuote, QuoteBreakdown,
};
pub use cart::{Cart, CartLine};
pub use enrollment::{
    quote_for, EnrollmentError, EnrollmentForm, EnrollmentSubmission, FieldError,
};
pub use webhook::{SubmissionError, WebhookClient, RETRY_PROMPT};
pub use catalogs::Catalogs;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
