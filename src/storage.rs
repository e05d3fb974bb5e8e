use crate::model::Roster;
use anyhow::Context;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub trait Storage {
    /// Charge un roster depuis un support.
    fn load(&self) -> anyhow::Result<Roster>;
    /// Sauvegarde de manière atomique.
    fn save(&self, roster: &Roster) -> anyhow::Result<()>;
}

/// Persistance JSON sur disque : écriture dans un fichier temporaire puis
/// rename atomique, le roster n'est jamais tronqué par une interruption.
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Comme [`Storage::load`], mais un fichier absent donne un roster vide
    /// (premier lancement).
    pub fn load_or_default(&self) -> anyhow::Result<Roster> {
        match fs::read(&self.path) {
            Ok(data) => {
                let roster = serde_json::from_slice(&data)
                    .with_context(|| format!("parsing {}", self.path.display()))?;
                Ok(roster)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Roster::default()),
            Err(err) => {
                Err(err).with_context(|| format!("reading {}", self.path.display()))
            }
        }
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<Roster> {
        let data =
            fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let roster: Roster =
            serde_json::from_slice(&data).with_context(|| "parsing roster json")?;
        Ok(roster)
    }

    fn save(&self, roster: &Roster) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(roster)?;
        let mut tmp = NamedTempFile::new_in(self.path.parent().unwrap_or_else(|| Path::new(".")))
            .with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        Ok(())
    }
}
