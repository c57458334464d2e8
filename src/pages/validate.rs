// src/pages/validate.rs

//! Configuration validation entry point.

use crate::error::Result;
use crate::models::{CollectionKind, Config};

/// Validate the loaded configuration and report what was checked.
pub fn run_validate(config: &Config) -> Result<()> {
    log::info!("Validating configuration...");

    if let Err(error) = config.validate() {
        log::error!("Config validation failed: {error}");
        return Err(error);
    }

    log::info!("✓ HTTP settings OK");
    log::info!("✓ Site settings OK (base: {})", config.site.base_url);
    for kind in CollectionKind::ALL {
        let profile = config.collections.profile(kind);
        log::info!(
            "✓ {kind}: endpoint '{}', {} per page, pickup {}",
            profile.endpoint,
            profile.items_per_page,
            profile.skip_count
        );
    }

    log::info!("All validations passed!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(run_validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_surfaces_bad_config() {
        let mut config = Config::default();
        config.collections.team.endpoint = String::new();
        assert!(run_validate(&config).is_err());
    }
}
