use crate::model::Roster;
use anyhow::Context;
use fd_lock::RwLock as FileLock;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Issue d'un `Storage::commit`.
#[derive(Debug)]
pub enum Commit {
    Saved,
    /// Le stockage a avancé depuis `base` : rien n'est écrit, voici son contenu actuel.
    Stale(Box<Roster>),
}

pub trait Storage {
    /// Charge l'instantané complet (surveillantes, bâtiments, gardes, congés).
    fn load(&self) -> anyhow::Result<Roster>;
    /// Sauvegarde de manière atomique.
    fn save(&self, roster: &Roster) -> anyhow::Result<()>;

    /// Sauvegarde `next` seulement si la révision stockée est encore `base`.
    ///
    /// L'implémentation par défaut ne protège que contre les écritures séquentielles.
    fn commit(&self, base: u64, next: &Roster) -> anyhow::Result<Commit> {
        let current = self.load()?;
        if current.revision != base {
            return Ok(Commit::Stale(Box::new(current)));
        }
        self.save(next)?;
        Ok(Commit::Saved)
    }
}

pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fichier verrou partagé par tous les processus qui écrivent ce roster.
    pub fn lock_path(&self) -> PathBuf {
        let mut raw = self.path.clone().into_os_string();
        raw.push(".lock");
        PathBuf::from(raw)
    }

    /// Charge le roster, ou un roster vide si le fichier n'existe pas encore.
    pub fn load_or_default(&self) -> anyhow::Result<Roster> {
        if !self.path.exists() {
            return Ok(Roster::default());
        }
        self.load()
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<Roster> {
        let data =
            fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let roster: Roster = serde_json::from_slice(&data)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(roster)
    }

    fn save(&self, roster: &Roster) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(roster)?;
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        Ok(())
    }

    /// Relecture, comparaison et écriture sous verrou exclusif inter-processus.
    fn commit(&self, base: u64, next: &Roster) -> anyhow::Result<Commit> {
        let lock_path = self.lock_path();
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&lock_path)
            .with_context(|| format!("opening {}", lock_path.display()))?;
        let mut lock = FileLock::new(file);
        let _held = lock
            .write()
            .with_context(|| format!("locking {}", lock_path.display()))?;

        let current = self.load_or_default()?;
        if current.revision != base {
            return Ok(Commit::Stale(Box::new(current)));
        }
        self.save(next)?;
        Ok(Commit::Saved)
    }
}
