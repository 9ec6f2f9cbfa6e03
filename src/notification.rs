use crate::model::{Building, Floor, Shift, Supervisor};
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Message d'affectation prêt à être envoyé (mail, SMS, fichier...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Permet de customiser le rendu du message d'affectation.
pub trait AssignmentRenderer {
    fn render(
        &self,
        supervisor: &Supervisor,
        shift: &Shift,
        building: &Building,
        floor: &Floor,
    ) -> AssignmentMessage;
}

/// Gabarit texte simple, en anglais comme les mails existants.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextAssignment;

impl AssignmentRenderer for TextAssignment {
    fn render(
        &self,
        supervisor: &Supervisor,
        shift: &Shift,
        building: &Building,
        floor: &Floor,
    ) -> AssignmentMessage {
        let note = shift
            .note
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .map(|n| format!("Note: {n}\n"))
            .unwrap_or_default();
        let body = format!(
            "Dear {name},\n\nYou have been assigned a new shift:\nDate: {date}\nTime: {start} - {end}\nBuilding: Building {building}\nFloor: Floor {floor}\n{note}\nPlease make sure to arrive on time for your shift.\n",
            name = supervisor.name,
            date = shift.date.format("%A, %B %-d, %Y"),
            start = shift.start_time,
            end = shift.end_time,
            building = building.number,
            floor = floor.number,
        );
        AssignmentMessage {
            to: supervisor.email.clone(),
            subject: "Shift Assignment Notification".to_string(),
            body,
        }
    }
}

/// Destinataire des notifications d'affectation (au mieux, sans garantie).
pub trait Notifier {
    fn notify_shift_assigned(
        &self,
        supervisor: &Supervisor,
        shift: &Shift,
        building: &Building,
        floor: &Floor,
    ) -> Result<()>;
}

/// Ne fait rien.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify_shift_assigned(&self, _: &Supervisor, _: &Shift, _: &Building, _: &Floor) -> Result<()> {
        Ok(())
    }
}

/// Journalise le message rendu au lieu de l'envoyer.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier<R = TextAssignment> {
    renderer: R,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self {
            renderer: TextAssignment,
        }
    }
}

impl<R: AssignmentRenderer> Notifier for LogNotifier<R> {
    fn notify_shift_assigned(
        &self,
        supervisor: &Supervisor,
        shift: &Shift,
        building: &Building,
        floor: &Floor,
    ) -> Result<()> {
        let msg = self.renderer.render(supervisor, shift, building, floor);
        info!(to = %msg.to, subject = %msg.subject, shift = %shift.id, "shift assignment notification");
        debug!(body = %msg.body);
        Ok(())
    }
}

/// Écrit chaque message dans un fichier texte d'un dossier « boîte d'envoi ».
#[derive(Debug, Clone)]
pub struct OutboxNotifier<R = TextAssignment> {
    dir: PathBuf,
    renderer: R,
}

impl OutboxNotifier {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            dir: dir.into(),
            renderer: TextAssignment,
        }
    }
}

impl<R> OutboxNotifier<R> {
    pub fn with_renderer<P: Into<PathBuf>>(dir: P, renderer: R) -> Self {
        Self {
            dir: dir.into(),
            renderer,
        }
    }
}

impl<R: AssignmentRenderer> Notifier for OutboxNotifier<R> {
    fn notify_shift_assigned(
        &self,
        supervisor: &Supervisor,
        shift: &Shift,
        building: &Building,
        floor: &Floor,
    ) -> Result<()> {
        if supervisor.email.trim().is_empty() {
            info!(supervisor = %supervisor.name, "no email address, skipping notification");
            return Ok(());
        }
        let msg = self.renderer.render(supervisor, shift, building, floor);
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating {}", self.dir.display()))?;
        let path = self.dir.join(format!("{}-{}.txt", shift.date, shift.id));
        let content = format!("To: {}\nSubject: {}\n\n{}", msg.to, msg.subject, msg.body);
        fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

pub type SharedNotifier = Arc<dyn Notifier + Send + Sync>;

/// Envoi « fire-and-forget » : chaque notification part sur un thread détaché,
/// ses erreurs sont journalisées puis ignorées.
pub struct Dispatcher {
    notifier: SharedNotifier,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl Dispatcher {
    pub fn new(notifier: SharedNotifier) -> Self {
        Self {
            notifier,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn dispatch(&self, supervisor: Supervisor, shift: Shift, building: Building, floor: Floor) {
        let notifier = Arc::clone(&self.notifier);
        let spawned = thread::Builder::new()
            .name("garde-notify".into())
            .spawn(move || {
                if let Err(err) =
                    notifier.notify_shift_assigned(&supervisor, &shift, &building, &floor)
                {
                    let error = format!("{err:#}");
                    warn!(shift = %shift.id, %error, "shift assignment notification failed");
                }
            });
        match spawned {
            Ok(handle) => {
                let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
                pending.retain(|h| !h.is_finished());
                pending.push(handle);
            }
            Err(err) => warn!(error = %err, "could not spawn notification worker"),
        }
    }

    /// Attend la fin des envois en cours (sortie du CLI, tests).
    pub fn wait_idle(&self) {
        let handles =
            std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner));
        for handle in handles {
            if handle.join().is_err() {
                warn!("notification worker panicked");
            }
        }
    }
}
