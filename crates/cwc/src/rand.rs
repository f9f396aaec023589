//! Random stances.
//!
//! Model
//! - Contact centers uniform in a square of half-side `spread`, heights in
//!   `[0, max_height]`.
//! - Yaw uniform on `[-π, π)`, roll and pitch uniform in `[-max_tilt, max_tilt]`.
//! - Half-dimensions and friction uniform in their ranges.
//!
//! Callers own the RNG; seed a `StdRng` for reproducible draws.

use std::f64::consts::PI;

use nalgebra::Vector3;
use rand::Rng;

use crate::contact::Contact;
use crate::contact_set::ContactSet;
use crate::pose::Pose;

/// Sampler configuration.
#[derive(Clone, Copy, Debug)]
pub struct StanceCfg {
    pub nb_contacts: usize,
    pub spread: f64,
    pub max_height: f64,
    /// Roll/pitch bound [rad]. Zero gives flat contacts.
    pub max_tilt: f64,
    pub half_length: (f64, f64),
    pub half_width: (f64, f64),
    pub friction: (f64, f64),
}

impl Default for StanceCfg {
    fn default() -> Self {
        Self {
            nb_contacts: 2,
            spread: 0.4,
            max_height: 0.0,
            max_tilt: 0.0,
            half_length: (0.05, 0.15),
            half_width: (0.03, 0.08),
            friction: (0.5, 1.0),
        }
    }
}

fn uniform<R: Rng>(rng: &mut R, (lo, hi): (f64, f64)) -> f64 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

/// One random contact.
///
/// # Panics
/// If the shape or friction ranges allow invalid contacts.
pub fn draw_contact<R: Rng>(rng: &mut R, cfg: &StanceCfg) -> Contact {
    let position = Vector3::new(
        uniform(rng, (-cfg.spread, cfg.spread)),
        uniform(rng, (-cfg.spread, cfg.spread)),
        uniform(rng, (0.0, cfg.max_height)),
    );
    let rpy = Vector3::new(
        uniform(rng, (-cfg.max_tilt, cfg.max_tilt)),
        uniform(rng, (-cfg.max_tilt, cfg.max_tilt)),
        uniform(rng, (-PI, PI)),
    );
    let shape = (uniform(rng, cfg.half_length), uniform(rng, cfg.half_width));
    Contact::new(shape, Pose::from_rpy(position, rpy), uniform(rng, cfg.friction))
}

/// `cfg.nb_contacts` independent contacts.
pub fn draw_contact_set<R: Rng>(rng: &mut R, cfg: &StanceCfg) -> ContactSet {
    (0..cfg.nb_contacts).map(|_| draw_contact(rng, cfg)).collect()
}
