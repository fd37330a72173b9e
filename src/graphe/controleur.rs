//! Contrôleur de la vue graphique : zoom (pincement), déplacement (glissement),
//! toucher → point le plus proche + guides.
//!
//! Repères :
//! - canevas : carré `cote × cote`, origine du domaine au centre, 1 unité = `taille_carreau` ;
//! - vue     : canevas mis à l’échelle autour de son centre, puis translaté.
//!
//! `vue = centre + translation + echelle · (canevas − centre)`

use serde::Serialize;

use super::config::ConfigVue;
use super::trace::{PointCanevas, PointTrace};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TransformVue {
    pub translation_x: f64,
    pub translation_y: f64,
    pub echelle: f64,
}

/// `Repos → Actif{glissement?, pincement?} → Repos`.
/// Les bases sont capturées au début de chaque geste.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EtatGeste {
    Repos,
    Actif {
        glissement: Option<(f64, f64)>,
        pincement: Option<f64>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ResultatToucher {
    Touche(PointTrace),
    Manque,
    /// Toucher pendant un glissement : sans effet.
    Ignore,
}

/// Lignes pointillées d’un axe au point sélectionné (repère canevas).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Guides {
    /// De l’axe des abscisses au point.
    pub vertical: (PointCanevas, PointCanevas),
    /// De l’axe des ordonnées au point.
    pub horizontal: (PointCanevas, PointCanevas),
}

/// Point le plus proche de `(x, y)` (distance euclidienne, unités du domaine),
/// retenu seulement si la distance est ≤ `seuil`.
pub fn point_le_plus_proche(
    points: &[PointTrace],
    (x, y): (f64, f64),
    seuil: f64,
) -> Option<PointTrace> {
    let distance = |p: &PointTrace| (p.valeur_x - x).hypot(p.valeur_y - y);

    points
        .iter()
        .map(|p| (distance(p), p))
        .filter(|(d, _)| d.is_finite())
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .filter(|(d, _)| *d <= seuil)
        .map(|(_, p)| *p)
}

#[derive(Debug)]
pub struct ControleurVue {
    config: ConfigVue,
    transform: TransformVue,
    geste: EtatGeste,
    selection: Option<PointTrace>,
}

impl ControleurVue {
    /// Une config invalide (échelles inversées, grille vide…) est remplacée par les défauts.
    pub fn new(config: ConfigVue) -> Self {
        let config = config.ou_defaut();
        let mut c = Self {
            config,
            transform: TransformVue {
                translation_x: config.translation_initiale[0],
                translation_y: config.translation_initiale[1],
                echelle: config.echelle_initiale.clamp(config.echelle_min, config.echelle_max),
            },
            geste: EtatGeste::Repos,
            selection: None,
        };
        c.borner_translation();
        c
    }

    pub fn config(&self) -> &ConfigVue {
        &self.config
    }

    pub fn transform(&self) -> TransformVue {
        self.transform
    }

    pub fn geste(&self) -> EtatGeste {
        self.geste
    }

    pub fn selection(&self) -> Option<PointTrace> {
        self.selection
    }

    pub fn effacer_selection(&mut self) {
        self.selection = None;
    }

    /// Vue initiale, sélection effacée.
    pub fn reinitialiser(&mut self) {
        *self = Self::new(self.config);
    }

    /* ------------------------ gestes ------------------------ */

    fn retour_au_repos_si_fini(&mut self) {
        if let EtatGeste::Actif {
            glissement: None,
            pincement: None,
        } = self.geste
        {
            self.geste = EtatGeste::Repos;
        }
    }

    pub fn debut_pincement(&mut self) {
        let base = Some(self.transform.echelle);
        match &mut self.geste {
            EtatGeste::Actif { pincement, .. } => *pincement = base,
            EtatGeste::Repos => {
                self.geste = EtatGeste::Actif {
                    glissement: None,
                    pincement: base,
                }
            }
        }
    }

    /// `facteur` = rapport cumulé depuis le début du pincement.
    pub fn maj_pincement(&mut self, facteur: f64) {
        let EtatGeste::Actif {
            pincement: Some(base),
            ..
        } = self.geste
        else {
            return;
        };

        let brute = base * facteur;
        if brute.is_nan() {
            return;
        }
        self.transform.echelle = brute.clamp(self.config.echelle_min, self.config.echelle_max);
        self.borner_translation();
    }

    pub fn fin_pincement(&mut self) {
        if let EtatGeste::Actif { pincement, .. } = &mut self.geste {
            *pincement = None;
        }
        self.retour_au_repos_si_fini();
    }

    pub fn debut_glissement(&mut self) {
        let base = Some((self.transform.translation_x, self.transform.translation_y));
        match &mut self.geste {
            EtatGeste::Actif { glissement, .. } => *glissement = base,
            EtatGeste::Repos => {
                self.geste = EtatGeste::Actif {
                    glissement: base,
                    pincement: None,
                }
            }
        }
    }

    /// `(dx, dy)` = déplacement cumulé depuis le début du glissement (unités de vue).
    pub fn maj_glissement(&mut self, dx: f64, dy: f64) {
        let EtatGeste::Actif {
            glissement: Some((bx, by)),
            ..
        } = self.geste
        else {
            return;
        };
        if !(dx.is_finite() && dy.is_finite()) {
            return;
        }

        self.transform.translation_x = bx + dx;
        self.transform.translation_y = by + dy;
        self.borner_translation();
    }

    pub fn fin_glissement(&mut self) {
        if let EtatGeste::Actif { glissement, .. } = &mut self.geste {
            *glissement = None;
        }
        self.retour_au_repos_si_fini();
    }

    /// Interruption : retour au repos, la transformation déjà appliquée est conservée.
    pub fn annuler(&mut self) {
        self.geste = EtatGeste::Repos;
    }

    fn glissement_en_cours(&self) -> bool {
        matches!(
            self.geste,
            EtatGeste::Actif {
                glissement: Some(_),
                ..
            }
        )
    }

    /* ------------------------ bornes ------------------------ */

    /// Bornes `[min, max]` de la translation sur un axe, pour l’échelle courante.
    fn bornes(&self, dim: f64, marge: f64) -> (f64, f64) {
        let s = self.transform.echelle - 1.0;
        let max = dim / 2.0 * s;
        (-max - marge * s, max)
    }

    fn borner_translation(&mut self) {
        let cote = self.config.cote_canevas();
        let [mx, my] = self.config.marge_glissement;

        let (min_x, max_x) = self.bornes(cote, mx);
        let (min_y, max_y) = self.bornes(cote, my);

        self.transform.translation_x = self.transform.translation_x.clamp(min_x, max_x);
        self.transform.translation_y = self.transform.translation_y.clamp(min_y, max_y);
    }

    /* ------------------------ repères ------------------------ */

    /// Vue → domaine (transformation inverse).
    pub fn vue_vers_domaine(&self, vx: f64, vy: f64) -> (f64, f64) {
        let cote = self.config.cote_canevas();
        let TransformVue {
            translation_x: tx,
            translation_y: ty,
            echelle: s,
        } = self.transform;
        let k = s * self.config.taille_carreau;

        ((vx - cote / 2.0 - tx) / k, -(vy - cote / 2.0 - ty) / k)
    }

    /// Canevas → vue.
    pub fn canevas_vers_vue(&self, p: PointCanevas) -> PointCanevas {
        let centre = self.config.cote_canevas() / 2.0;
        let t = self.transform;
        PointCanevas {
            x: centre + t.translation_x + t.echelle * (p.x - centre),
            y: centre + t.translation_y + t.echelle * (p.y - centre),
        }
    }

    /* ------------------------ toucher ------------------------ */

    pub fn toucher(&mut self, vx: f64, vy: f64, points: &[PointTrace]) -> ResultatToucher {
        if self.glissement_en_cours() {
            return ResultatToucher::Ignore;
        }

        let domaine = self.vue_vers_domaine(vx, vy);
        self.selection = point_le_plus_proche(points, domaine, self.config.seuil_toucher);

        match self.selection {
            Some(p) => {
                tracing::debug!(x = p.valeur_x, y = p.valeur_y, "point sélectionné");
                ResultatToucher::Touche(p)
            }
            None => ResultatToucher::Manque,
        }
    }

    /// Guides de la sélection courante (repère canevas).
    pub fn guides(&self) -> Option<Guides> {
        let p = self.selection?;
        let centre = self.config.cote_canevas() / 2.0;
        let point = PointCanevas {
            x: p.canevas_x,
            y: p.canevas_y,
        };

        Some(Guides {
            vertical: (PointCanevas { x: p.canevas_x, y: centre }, point),
            horizontal: (PointCanevas { x: centre, y: p.canevas_y }, point),
        })
    }
}
