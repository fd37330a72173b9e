//! Moteur de tracé
//!
//! - config.rs     : paramètres (balayage, vue) + chargement
//! - trace.rs      : balayage y=f(x) / x=f(y) -> segments + points, cache par expression
//! - controleur.rs : zoom / déplacement / toucher sur la vue

pub mod config;
pub mod controleur;
pub mod trace;

#[cfg(test)]
mod tests_scientifiques;

pub use config::ConfigGrapheur;
