//! Catalogue des rotations : fait le pont entre les codes de rotation du
//! cursus et les capacités de garde qu'ils ouvrent.

use crate::model::{RoleCapability, Trainee};
use crate::scheduler::ScheduleError;
use anyhow::{bail, Result};
use std::collections::HashMap;
#[cfg(feature = "serde")]
use anyhow::Context;
#[cfg(feature = "serde")]
use std::path::Path;

/// Table code de rotation → capacités. Les codes sont normalisés en
/// majuscules à l'insertion comme à la résolution.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RotationCatalog {
    rotations: HashMap<String, RoleCapability>,
}

impl RotationCatalog {
    pub fn empty() -> Self {
        Self {
            rotations: HashMap::new(),
        }
    }

    /// Catalogue par défaut d'un service de médecine interne.
    pub fn builtin() -> Self {
        let mut cat = Self::empty();
        cat.insert("WARD", RoleCapability::full());
        cat.insert("ELECTIVE", RoleCapability::full());
        cat.insert(
            "ER",
            RoleCapability {
                allows_short: false,
                allows_long: true,
                flex_short: true,
                flex_long: false,
            },
        );
        cat.insert(
            "ICU",
            RoleCapability {
                allows_short: false,
                allows_long: false,
                flex_short: false,
                flex_long: true,
            },
        );
        cat.insert(
            "CLINIC",
            RoleCapability {
                allows_short: true,
                allows_long: false,
                flex_short: false,
                flex_long: true,
            },
        );
        // Les internes déjà en poste de nuit ne prennent aucune garde.
        cat.insert("NIGHT", RoleCapability::default());
        cat
    }

    pub fn insert<S: AsRef<str>>(&mut self, code: S, cap: RoleCapability) {
        self.rotations
            .insert(code.as_ref().trim().to_ascii_uppercase(), cap);
    }

    pub fn resolve(&self, code: &str) -> Option<RoleCapability> {
        self.rotations
            .get(&code.trim().to_ascii_uppercase())
            .copied()
    }

    /// Codes connus, triés pour un affichage stable.
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.rotations.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    pub fn len(&self) -> usize {
        self.rotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rotations.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if self.rotations.is_empty() {
            bail!("rotation catalog cannot be empty");
        }
        for code in self.rotations.keys() {
            if code.trim().is_empty() {
                bail!("rotation catalog contains an empty code");
            }
        }
        Ok(())
    }

    /// Remplit le vecteur de capacités d'un interne à partir de ses codes de
    /// rotation, indexés par mois académique (juillet = 0). Un code inconnu
    /// échoue immédiatement en nommant l'interne et le mois ; une liste de
    /// plus de douze codes est rejetée d'emblée.
    pub fn apply(&self, trainee: &mut Trainee, codes: &[&str]) -> Result<(), ScheduleError> {
        if codes.len() > 12 {
            return Err(ScheduleError::TooManyRotations {
                handle: trainee.handle.clone(),
                count: codes.len(),
            });
        }
        for (month, code) in codes.iter().enumerate() {
            if code.trim().is_empty() {
                continue;
            }
            match self.resolve(code) {
                Some(cap) => trainee.caps[month] = Some(cap),
                None => {
                    return Err(ScheduleError::UnknownRotation {
                        handle: trainee.handle.clone(),
                        month: month as u32,
                        rotation: code.trim().to_string(),
                    })
                }
            }
        }
        Ok(())
    }
}

impl Default for RotationCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(feature = "serde")]
pub fn load_catalog_from_file<P: AsRef<Path>>(path: P) -> Result<RotationCatalog> {
    let data = std::fs::read(&path)
        .with_context(|| format!("reading rotation catalog {}", path.as_ref().display()))?;
    let catalog: RotationCatalog =
        serde_json::from_slice(&data).with_context(|| "parsing rotation catalog")?;
    catalog.validate()?;
    Ok(catalog)
}

#[cfg(feature = "serde")]
pub fn export_catalog_json<P: AsRef<Path>>(path: P, catalog: &RotationCatalog) -> Result<()> {
    let json = serde_json::to_string_pretty(catalog)?;
    std::fs::write(path, json)?;
    Ok(())
}
