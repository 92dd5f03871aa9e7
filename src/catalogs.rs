// 📦 Reference data bundle
// Everything the pricing and enrollment paths read, built once at startup

use crate::config::Config;
use crate::entities::{EquipmentCatalog, ProgramRegistry};
use crate::promo::PromoRegistry;
use anyhow::Result;
use tracing::info;

pub struct Catalogs {
    pub equipment: EquipmentCatalog,
    pub programs: ProgramRegistry,
    pub promos: PromoRegistry,
}

impl Catalogs {
    /// Built-in defaults, replaced by files named in the config
    pub fn load(config: &Config) -> Result<Self> {
        let equipment = match &config.catalog_csv {
            Some(path) => {
                let catalog = EquipmentCatalog::from_csv(path)?;
                info!("Loaded {} equipment items from {:?}", catalog.count(), path);
                catalog
            }
            None => EquipmentCatalog::new(),
        };

        let promos = match &config.promo_json {
            Some(path) => {
                let registry = PromoRegistry::from_file(path)?;
                info!("Loaded {} promo codes from {:?}", registry.count(), path);
                registry
            }
            None => PromoRegistry::new(),
        };

        Ok(Catalogs {
            equipment,
            programs: ProgramRegistry::new(),
            promos,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_defaults() {
        let catalogs = Catalogs::load(&Config::default()).unwrap();
        assert_eq!(catalogs.equipment.count(), EquipmentCatalog::new().count());
        assert!(catalogs.promos.lookup("PRIMAVEZ").is_ok());
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("catalog.csv");
        let promo_path = dir.path().join("promos.json");
        std::fs::write(&csv_path, "id,name,price,kind\nbelt,Cinta,100,uniform\n").unwrap();
        std::fs::write(&promo_path, r#"[{"code": "dojo", "discount": 10}]"#).unwrap();

        let config = Config {
            catalog_csv: Some(csv_path),
            promo_json: Some(promo_path),
            ..Config::default()
        };
        let catalogs = Catalogs::load(&config).unwrap();

        assert_eq!(catalogs.equipment.count(), 1);
        assert!(catalogs.promos.lookup("PRIMAVEZ").is_err());
        assert_eq!(catalogs.promos.lookup("Dojo").unwrap().discount, 10.0);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let config = Config {
            catalog_csv: Some("/nonexistent/catalog.csv".into()),
            ..Config::default()
        };
        assert!(Catalogs::load(&config).is_err());
    }
}
