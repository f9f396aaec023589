//! Contact sequences and their JSON persistence.
//!
//! A feed is an ordered list of contacts with a cursor. On disk it is a JSON
//! array of records:
//!
//! ```json
//! [{"shape": [0.11, 0.05], "pos": [0.0, 0.1, 0.0], "rpy": [0.0, 0.0, 0.0], "friction": 0.7}]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::contact::Contact;
use crate::contact_set::ContactSet;
use crate::error::{Error, Result};
use crate::pose::Pose;

/// Persisted form of a [`Contact`] (mode and pressure limit are not stored).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub shape: [f64; 2],
    pub pos: [f64; 3],
    pub rpy: [f64; 3],
    pub friction: f64,
}

impl From<&Contact> for ContactRecord {
    fn from(c: &Contact) -> Self {
        let (p, rpy) = (c.position(), c.rpy());
        Self {
            shape: [c.shape.0, c.shape.1],
            pos: [p.x, p.y, p.z],
            rpy: [rpy.x, rpy.y, rpy.z],
            friction: c.friction,
        }
    }
}

impl ContactRecord {
    /// Validated conversion; `index` is the position reported on error.
    pub fn to_contact(&self, index: usize) -> Result<Contact> {
        let invalid = |reason: String| Error::InvalidRecord { index, reason };
        let numbers = self
            .shape
            .iter()
            .chain(&self.pos)
            .chain(&self.rpy)
            .chain(std::iter::once(&self.friction));
        if let Some(x) = numbers.into_iter().find(|x| !x.is_finite()) {
            return Err(invalid(format!("non-finite value {x}")));
        }
        if self.shape[0] <= 0.0 || self.shape[1] <= 0.0 {
            return Err(invalid(format!("non-positive shape {:?}", self.shape)));
        }
        if self.friction < 0.0 {
            return Err(invalid(format!("negative friction {}", self.friction)));
        }
        let pose = Pose::from_rpy(Vector3::from(self.pos), Vector3::from(self.rpy));
        Ok(Contact::new(
            (self.shape[0], self.shape[1]),
            pose,
            self.friction,
        ))
    }
}

/// Ordered contacts with a cursor on the next one to hand out.
#[derive(Clone, Debug, Default)]
pub struct ContactFeed {
    contacts: Vec<Contact>,
    next_contact_id: usize,
    cyclic: bool,
    path: Option<PathBuf>,
}

impl ContactFeed {
    pub fn new(contacts: Vec<Contact>, cyclic: bool) -> Self {
        Self {
            contacts,
            next_contact_id: 0,
            cyclic,
            path: None,
        }
    }

    /// Read a feed from a JSON file; [`ContactFeed::save`] writes back there.
    pub fn load(path: impl AsRef<Path>, cyclic: bool) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let mut feed = Self::from_json(&text, cyclic)?;
        info!(path = %path.display(), contacts = feed.len(), "contact feed loaded");
        feed.path = Some(path.to_path_buf());
        Ok(feed)
    }

    pub fn from_json(text: &str, cyclic: bool) -> Result<Self> {
        let records: Vec<ContactRecord> = serde_json::from_str(text)?;
        let contacts = records
            .iter()
            .enumerate()
            .map(|(i, r)| r.to_contact(i))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(contacts, cyclic))
    }

    pub fn to_json(&self) -> Result<String> {
        let records: Vec<ContactRecord> = self.contacts.iter().map(ContactRecord::from).collect();
        Ok(serde_json::to_string_pretty(&records)?)
    }

    /// Write back to the file the feed was loaded from.
    pub fn save(&self) -> Result<()> {
        let path = self.path.as_deref().ok_or(Error::MissingPath)?;
        self.save_to(path)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        debug!(path = %path.display(), contacts = self.len(), "contact feed saved");
        Ok(())
    }

    #[inline]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    #[inline]
    pub fn is_cyclic(&self) -> bool {
        self.cyclic
    }

    #[inline]
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn first(&self) -> Option<&Contact> {
        self.contacts.first()
    }

    pub fn last(&self) -> Option<&Contact> {
        self.contacts.last()
    }

    /// Contact that [`ContactFeed::pop`] would return, without moving the
    /// cursor.
    pub fn next(&self) -> Option<&Contact> {
        self.cursor().map(|i| &self.contacts[i])
    }

    /// Hand out the contact under the cursor and advance. A cyclic feed wraps
    /// around; otherwise `None` once every contact has been handed out.
    pub fn pop(&mut self) -> Option<Contact> {
        let i = self.cursor()?;
        self.next_contact_id = i + 1;
        Some(self.contacts[i].clone())
    }

    fn cursor(&self) -> Option<usize> {
        if self.next_contact_id < self.contacts.len() {
            Some(self.next_contact_id)
        } else if self.cyclic && !self.contacts.is_empty() {
            Some(0)
        } else {
            None
        }
    }

    pub fn push(&mut self, contact: Contact) {
        self.contacts.push(contact);
    }

    /// Append a copy of the last contact moved by `offset`. No-op on an empty
    /// feed.
    pub fn duplicate_last_contact(&mut self, offset: &Vector3<f64>) -> Option<&Contact> {
        let mut copy = self.contacts.last()?.clone();
        copy.set_position(copy.position() + offset);
        self.contacts.push(copy);
        self.contacts.last()
    }

    pub fn to_contact_set(&self) -> ContactSet {
        ContactSet::new(self.contacts.clone())
    }
}
