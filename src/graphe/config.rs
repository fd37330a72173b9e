//! Paramètres du traceur et de la vue (valeurs par défaut + surcharge optionnelle).
//!
//! Source : `config/grapheur.{toml,json,…}` (facultatif) puis variables
//! d’environnement `GRAPHEUR__ECHANTILLON__PAS=0.05`, etc.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ErreurConfig {
    #[error("lecture de la configuration: {0}")]
    Lecture(#[from] config::ConfigError),
    #[error("configuration invalide: {0}")]
    Invalide(String),
}

/// Densité du balayage et détection des discontinuités.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigEchantillon {
    pub debut: f64,
    pub fin: f64,
    pub pas: f64,
    /// Saut maximal (unités du domaine, axe dépendant) entre deux échantillons reliés.
    pub saut_max: f64,
}

impl Default for ConfigEchantillon {
    fn default() -> Self {
        Self {
            debut: -30.0,
            fin: 30.0,
            pas: 0.1,
            saut_max: 100.0,
        }
    }
}

impl ConfigEchantillon {
    /// Nombre d’échantillons du balayage (bornes incluses).
    pub fn nb_echantillons(&self) -> usize {
        ((self.fin - self.debut) / self.pas).round() as usize + 1
    }

    pub fn valider(&self) -> Result<(), ErreurConfig> {
        if !(self.pas.is_finite() && self.pas > 0.0) {
            return Err(ErreurConfig::Invalide(format!("pas {} (doit être > 0)", self.pas)));
        }
        if !(self.debut.is_finite() && self.fin.is_finite() && self.debut < self.fin) {
            return Err(ErreurConfig::Invalide(format!(
                "domaine [{}, {}] vide",
                self.debut, self.fin
            )));
        }
        // garde-fou : le tracé doit tenir dans une frame
        if self.nb_echantillons() > 100_000 {
            return Err(ErreurConfig::Invalide(format!(
                "{} échantillons (max 100000)",
                self.nb_echantillons()
            )));
        }
        if !(self.saut_max > 0.0) {
            return Err(ErreurConfig::Invalide("saut_max doit être > 0".into()));
        }
        Ok(())
    }

    /// `self` si valide, sinon les valeurs par défaut (avec un avertissement).
    pub fn ou_defaut(self) -> Self {
        match self.valider() {
            Ok(()) => self,
            Err(e) => {
                tracing::warn!("{e}; échantillonnage par défaut");
                Self::default()
            }
        }
    }
}

/// Grille, bornes du zoom et du déplacement, seuil du toucher.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigVue {
    pub nb_colonnes: u32,
    /// Taille d’un carreau (= une unité du domaine) en unités du canevas.
    pub taille_carreau: f64,
    pub echelle_min: f64,
    pub echelle_max: f64,
    pub echelle_initiale: f64,
    pub translation_initiale: [f64; 2],
    /// Distance maximale (unités du domaine) entre le toucher et le point retenu.
    pub seuil_toucher: f64,
    /// Marges supplémentaires du déplacement vers la gauche / le haut, par unité de zoom.
    pub marge_glissement: [f64; 2],
}

impl Default for ConfigVue {
    fn default() -> Self {
        Self {
            nb_colonnes: 34,
            taille_carreau: 34.0,
            echelle_min: 2.0,
            echelle_max: 3.0,
            echelle_initiale: 2.0,
            translation_initiale: [0.0, 0.0],
            seuil_toucher: 1.0,
            marge_glissement: [30.0 * 17.0, 30.0],
        }
    }
}

impl ConfigVue {
    /// Côté du canevas carré (colonnes × carreau).
    pub fn cote_canevas(&self) -> f64 {
        self.nb_colonnes as f64 * self.taille_carreau
    }

    pub fn valider(&self) -> Result<(), ErreurConfig> {
        if self.nb_colonnes == 0 || !(self.taille_carreau > 0.0) {
            return Err(ErreurConfig::Invalide("grille vide".into()));
        }
        // échelle < 1 : bornes du déplacement inversées
        if !(self.echelle_min >= 1.0 && self.echelle_min <= self.echelle_max) {
            return Err(ErreurConfig::Invalide(format!(
                "échelle [{}, {}] invalide",
                self.echelle_min, self.echelle_max
            )));
        }
        if !(self.seuil_toucher >= 0.0) {
            return Err(ErreurConfig::Invalide("seuil_toucher doit être ≥ 0".into()));
        }
        Ok(())
    }

    /// `self` si valide, sinon les valeurs par défaut (avec un avertissement).
    pub fn ou_defaut(self) -> Self {
        match self.valider() {
            Ok(()) => self,
            Err(e) => {
                tracing::warn!("{e}; vue par défaut");
                Self::default()
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigGrapheur {
    pub echantillon: ConfigEchantillon,
    pub vue: ConfigVue,
}

impl ConfigGrapheur {
    pub fn valider(&self) -> Result<(), ErreurConfig> {
        self.echantillon.valider()?;
        self.vue.valider()
    }

    /// Charge `config/grapheur` (facultatif) + environnement `GRAPHEUR__…`, puis valide.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn charger() -> Result<Self, ErreurConfig> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/grapheur").required(false))
            .add_source(config::Environment::with_prefix("GRAPHEUR").separator("__"))
            .build()?;

        let cfg: ConfigGrapheur = settings.try_deserialize()?;
        cfg.valider()?;
        tracing::debug!(?cfg, "configuration chargée");
        Ok(cfg)
    }

    /// Comme `charger`, avec repli sur les valeurs par défaut.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn charger_ou_defaut() -> Self {
        Self::charger().unwrap_or_else(|e| {
            tracing::warn!("{e}; valeurs par défaut utilisées");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defauts_valides() {
        let c = ConfigGrapheur::default();
        assert!(c.valider().is_ok());
        assert_eq!(c.echantillon.nb_echantillons(), 601);
        assert_eq!(c.vue.cote_canevas(), 1156.0);
    }

    #[test]
    fn pas_nul_refuse() {
        let mut c = ConfigGrapheur::default();
        c.echantillon.pas = 0.0;
        assert!(matches!(c.valider(), Err(ErreurConfig::Invalide(_))));
    }

    #[test]
    fn echelle_inversee_refusee() {
        let mut c = ConfigGrapheur::default();
        c.vue.echelle_min = 4.0;
        assert!(c.valider().is_err());
    }

    #[test]
    fn echelle_sous_un_refusee() {
        let mut c = ConfigGrapheur::default();
        c.vue.echelle_min = 0.5;
        assert!(c.valider().is_err());
    }

    #[test]
    fn repli_sur_les_defauts() {
        let mut e = ConfigEchantillon::default();
        e.pas = 0.0;
        assert_eq!(e.ou_defaut(), ConfigEchantillon::default());

        let mut v = ConfigVue::default();
        v.echelle_min = 4.0;
        assert_eq!(v.ou_defaut(), ConfigVue::default());

        let mut v = ConfigVue::default();
        v.echelle_max = 5.0;
        assert_eq!(v.ou_defaut().echelle_max, 5.0);
    }

    #[test]
    fn surcharge_partielle() {
        let c: ConfigGrapheur =
            serde_json::from_str(r#"{"echantillon":{"pas":0.5},"vue":{"echelle_max":5.0}}"#)
                .unwrap();
        assert_eq!(c.echantillon.pas, 0.5);
        assert_eq!(c.echantillon.debut, -30.0);
        assert_eq!(c.vue.echelle_max, 5.0);
        assert_eq!(c.vue.echelle_min, 2.0);
    }
}
