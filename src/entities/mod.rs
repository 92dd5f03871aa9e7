// Entity Models - reference data loaded at startup
//
// Equipment and programs are immutable once the catalogs are built.

pub mod equipment;
pub mod program;

pub use equipment::{EquipmentCatalog, EquipmentItem, ItemKind};
pub use program::{Program, ProgramRegistry};
