use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    domain::{AddonKind, BracketType, SizeClass},
    error::{CatalogError, PriceLookupFailure},
};

/// Static price table: size × bracket matrix plus flat add-on prices, in whole dollars.
///
/// The `own` bracket entry of each size doubles as that size's base price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceCatalog {
    sizes: BTreeMap<SizeClass, BTreeMap<BracketType, u32>>,
    addons: BTreeMap<AddonKind, u32>,
}

impl PriceCatalog {
    pub fn standard() -> Self {
        let matrix = [
            (SizeClass::UpTo55, [99, 139, 159]),
            (SizeClass::From56To75, [149, 189, 209]),
            (SizeClass::Over75, [189, 229, 249]),
        ];
        let sizes = matrix
            .into_iter()
            .map(|(size, [own, tilting, full_motion])| {
                let brackets = BTreeMap::from([
                    (BracketType::Own, own),
                    (BracketType::Tilting, tilting),
                    (BracketType::FullMotion, full_motion),
                ]);
                (size, brackets)
            })
            .collect();
        let addons = BTreeMap::from([
            (AddonKind::Concealment, 159),
            (AddonKind::CordCover, 39),
            (AddonKind::Soundbar, 49),
            (AddonKind::Hdmi, 15),
        ]);
        Self { sizes, addons }
    }

    pub fn from_parts(
        sizes: BTreeMap<SizeClass, BTreeMap<BracketType, u32>>,
        addons: BTreeMap<AddonKind, u32>,
    ) -> Self {
        Self { sizes, addons }
    }

    pub fn bracket_price(
        &self,
        size: SizeClass,
        bracket: BracketType,
    ) -> Result<u32, PriceLookupFailure> {
        self.sizes
            .get(&size)
            .and_then(|brackets| brackets.get(&bracket))
            .copied()
            .ok_or(PriceLookupFailure::Bracket { size, bracket })
    }

    pub fn base_price(&self, size: SizeClass) -> Result<u32, PriceLookupFailure> {
        self.bracket_price(size, BracketType::Own)
    }

    pub fn addon_price(&self, addon: AddonKind) -> Result<u32, PriceLookupFailure> {
        self.addons
            .get(&addon)
            .copied()
            .ok_or(PriceLookupFailure::Addon(addon))
    }

    /// Checks that every size prices every bracket and every add-on has a price.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut missing = Vec::new();
        for &size in SizeClass::ALL {
            for &bracket in BracketType::ALL {
                if let Err(failure) = self.bracket_price(size, bracket) {
                    missing.push(failure);
                }
            }
        }
        for &addon in AddonKind::ALL {
            if let Err(failure) = self.addon_price(addon) {
                missing.push(failure);
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(CatalogError { missing })
        }
    }
}

impl Default for PriceCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
