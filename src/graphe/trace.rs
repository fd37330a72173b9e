//! Traceur de courbes : balayage numérique de `y=f(x)` ou `x=f(y)` en segments
//! dessinables + liste plate des points (pour le toucher).
//!
//! Contrats :
//! - jamais d’erreur : une expression vide / non reconnue / inévaluable donne un tracé vide ;
//! - un échec d’évaluation (ou une valeur non finie) coupe le segment courant ;
//! - un saut de l’axe dépendant > `saut_max` coupe aussi (asymptotes “finies”) ;
//! - résultat mémorisé par expression normalisée, jamais recalculé.

use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;

use super::config::ConfigEchantillon;
use crate::noyau::eval::{Evaluateur, Liaisons};

/// Méthode du point fixe pour `x=f(y)` : y ← y + PAS·(x_cible − f(y)).
const INVERSE_PAS: f64 = 0.1;
const INVERSE_TOLERANCE: f64 = 0.01;
const INVERSE_ITERATIONS: usize = 50;

/// Retire les espaces et ramène `**` à `^` (clé de cache + détection du préfixe).
pub fn normaliser(expression: &str) -> String {
    let sans_espaces: String = expression.chars().filter(|c| !c.is_whitespace()).collect();
    sans_espaces.replace("**", "^")
}

/// Axe balayé.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Orientation {
    /// `y=f(x)` : on balaie x.
    FonctionDeX,
    /// `x=f(y)` : on balaie y (parabole couchée, etc.).
    FonctionDeY,
}

impl Orientation {
    /// Détecte le préfixe sur une expression normalisée ; renvoie le membre de droite.
    pub fn detecter(normalisee: &str) -> Option<(Orientation, &str)> {
        if let Some(reste) = normalisee.strip_prefix("y=") {
            return Some((Orientation::FonctionDeX, reste));
        }
        if let Some(reste) = normalisee.strip_prefix("x=") {
            return Some((Orientation::FonctionDeY, reste));
        }
        None
    }

    fn liaisons(self, v: f64) -> Liaisons {
        match self {
            Orientation::FonctionDeX => Liaisons::x(v),
            Orientation::FonctionDeY => Liaisons::y(v),
        }
    }

    /// (x, y) du domaine à partir de (variable balayée, valeur calculée).
    fn vers_xy(self, independante: f64, dependante: f64) -> (f64, f64) {
        match self {
            Orientation::FonctionDeX => (independante, dependante),
            Orientation::FonctionDeY => (dependante, independante),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PointCanevas {
    pub x: f64,
    pub y: f64,
}

/// Un échantillon valide : coordonnées canevas (dessin) et domaine (toucher).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PointTrace {
    pub canevas_x: f64,
    pub canevas_y: f64,
    /// Abscisse dans le domaine.
    pub valeur_x: f64,
    /// Ordonnée dans le domaine.
    pub valeur_y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum Instruction {
    DeplacerVers(PointCanevas),
    LigneVers(PointCanevas),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ResultatTrace {
    pub instructions: Vec<Instruction>,
    pub points: Vec<PointTrace>,
}

impl ResultatTrace {
    pub fn est_vide(&self) -> bool {
        self.points.is_empty()
    }

    pub fn nb_segments(&self) -> usize {
        self.instructions
            .iter()
            .filter(|i| matches!(i, Instruction::DeplacerVers(_)))
            .count()
    }

    /// Regroupe les instructions en polylignes continues.
    pub fn segments(&self) -> Vec<Vec<PointCanevas>> {
        let mut out: Vec<Vec<PointCanevas>> = Vec::new();
        for inst in &self.instructions {
            match *inst {
                Instruction::DeplacerVers(p) => out.push(vec![p]),
                Instruction::LigneVers(p) => {
                    if let Some(seg) = out.last_mut() {
                        seg.push(p);
                    }
                }
            }
        }
        out
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct CleTrace {
    expression: String,
    // bits f64 : largeur, hauteur, unité
    geometrie: [u64; 3],
}

/// Mémo des tracés d’une instance de traceur (non borné : une session voit peu d’expressions).
#[derive(Debug, Default)]
pub struct CacheTraces {
    entrees: HashMap<CleTrace, Rc<ResultatTrace>>,
}

#[cfg(test)]
impl CacheTraces {
    pub fn len(&self) -> usize {
        self.entrees.len()
    }
}

pub struct Traceur<E: Evaluateur> {
    evaluateur: E,
    config: ConfigEchantillon,
    cache: CacheTraces,
}

impl<E: Evaluateur> Traceur<E> {
    /// Une config invalide (pas nul, domaine vide…) est remplacée par les défauts.
    pub fn new(evaluateur: E, config: ConfigEchantillon) -> Self {
        Self {
            evaluateur,
            config: config.ou_defaut(),
            cache: CacheTraces::default(),
        }
    }

    #[cfg(test)]
    pub fn cache(&self) -> &CacheTraces {
        &self.cache
    }

    /// Trace `expression` sur un canevas `largeur × hauteur`, `unite` = taille d’une unité.
    pub fn echantillonner(
        &mut self,
        expression: &str,
        largeur: f64,
        hauteur: f64,
        unite: f64,
    ) -> Rc<ResultatTrace> {
        let cle = CleTrace {
            expression: normaliser(expression),
            geometrie: [largeur.to_bits(), hauteur.to_bits(), unite.to_bits()],
        };

        if let Some(r) = self.cache.entrees.get(&cle) {
            tracing::debug!(expression = %cle.expression, "tracé en cache");
            return Rc::clone(r);
        }

        let r = Rc::new(self.balayer(&cle.expression, largeur, hauteur, unite));
        tracing::debug!(
            expression = %cle.expression,
            points = r.points.len(),
            segments = r.nb_segments(),
            "tracé calculé"
        );
        self.cache.entrees.insert(cle, Rc::clone(&r));
        r
    }

    fn balayer(&self, normalisee: &str, largeur: f64, hauteur: f64, unite: f64) -> ResultatTrace {
        let mut out = ResultatTrace::default();

        let Some((orientation, membre)) = Orientation::detecter(normalisee) else {
            return out;
        };
        if membre.is_empty() {
            return out;
        }

        let cfg = &self.config;
        let mut precedente: Option<f64> = None;
        let mut en_cours = false;

        for i in 0..cfg.nb_echantillons() {
            let v = cfg.debut + i as f64 * cfg.pas;

            let dep = match self.evaluateur.evaluer(membre, orientation.liaisons(v)) {
                Ok(d) if d.is_finite() => d,
                _ => {
                    // trou : asymptote, domaine interdit, expression invalide
                    en_cours = false;
                    precedente = None;
                    continue;
                }
            };

            if let Some(p) = precedente {
                if (dep - p).abs() > cfg.saut_max {
                    tracing::trace!(v, dep, p, "discontinuité");
                    en_cours = false;
                }
            }

            let (x, y) = orientation.vers_xy(v, dep);
            let pc = PointCanevas {
                x: largeur / 2.0 + x * unite,
                y: hauteur / 2.0 - y * unite,
            };

            out.instructions.push(if en_cours {
                Instruction::LigneVers(pc)
            } else {
                Instruction::DeplacerVers(pc)
            });
            en_cours = true;

            out.points.push(PointTrace {
                canevas_x: pc.x,
                canevas_y: pc.y,
                valeur_x: x,
                valeur_y: y,
            });

            precedente = Some(dep);
        }

        out
    }

    /// Ordonnée de la courbe à l’abscisse `x` :
    /// évaluation directe pour `y=f(x)`, point fixe pour `x=f(y)`.
    pub fn ordonnee_en(&self, expression: &str, x: f64) -> Option<f64> {
        let n = normaliser(expression);
        let (orientation, membre) = Orientation::detecter(&n)?;

        match orientation {
            Orientation::FonctionDeX => self
                .evaluateur
                .evaluer(membre, Liaisons::x(x))
                .ok()
                .filter(|v| v.is_finite()),
            Orientation::FonctionDeY => self.inverse_approchee(membre, x),
        }
    }

    fn inverse_approchee(&self, membre: &str, x_cible: f64) -> Option<f64> {
        let mut y = 0.0;

        for _ in 0..INVERSE_ITERATIONS {
            let x = self.evaluateur.evaluer(membre, Liaisons::y(y)).ok()?;
            let ecart = x_cible - x;
            if ecart.abs() < INVERSE_TOLERANCE {
                return Some(y);
            }
            y += ecart * INVERSE_PAS;
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::eval::{ErreurEvaluation, EvaluateurQ};
    use approx::assert_relative_eq;
    use std::cell::Cell;

    const COTE: f64 = 1156.0;
    const UNITE: f64 = 34.0;

    fn traceur() -> Traceur<EvaluateurQ> {
        Traceur::new(EvaluateurQ::new(), ConfigEchantillon::default())
    }

    /// Évaluateur qui compte ses appels.
    struct Compteur<'a> {
        appels: &'a Cell<usize>,
    }

    impl Evaluateur for Compteur<'_> {
        fn evaluer(&self, _e: &str, l: Liaisons) -> Result<f64, ErreurEvaluation> {
            self.appels.set(self.appels.get() + 1);
            l.x.ok_or(ErreurEvaluation::VariableNonLiee("x".into()))
        }
    }

    #[test]
    fn droite_continue() {
        let mut t = traceur();
        let r = t.echantillonner("y=2x+3", COTE, COTE, UNITE);
        assert_eq!(r.points.len(), 601);
        assert_eq!(r.nb_segments(), 1);

        // x = 0 -> y = 3 : centre du canevas décalé de 3 unités vers le haut
        let p = r.points[300];
        assert_relative_eq!(p.valeur_x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(p.valeur_y, 3.0, epsilon = 1e-9);
        assert_relative_eq!(p.canevas_x, COTE / 2.0, epsilon = 1e-6);
        assert_relative_eq!(p.canevas_y, COTE / 2.0 - 3.0 * UNITE, epsilon = 1e-6);
    }

    #[test]
    fn inverse_au_moins_deux_segments() {
        let mut t = traceur();
        let r = t.echantillonner("y=1/x", COTE, COTE, UNITE);
        assert!(r.nb_segments() >= 2);
        assert!(r.segments().iter().all(|s| !s.is_empty()));
    }

    #[test]
    fn log_trou_sur_les_negatifs() {
        let mut t = traceur();
        let r = t.echantillonner("y=log(x)", COTE, COTE, UNITE);
        assert!(!r.est_vide());
        assert!(r.points.iter().all(|p| p.valeur_x > 0.0));
        assert_eq!(r.nb_segments(), 1);
    }

    /// Marche : 0 pour x < 0, 10 sinon (jamais d’échec d’évaluation).
    struct Marche;

    impl Evaluateur for Marche {
        fn evaluer(&self, _e: &str, l: Liaisons) -> Result<f64, ErreurEvaluation> {
            let x = l.x.ok_or(ErreurEvaluation::VariableNonLiee("x".into()))?;
            Ok(if x < 0.0 { 0.0 } else { 10.0 })
        }
    }

    #[test]
    fn saut_force_un_nouveau_segment() {
        let config = ConfigEchantillon {
            saut_max: 5.0,
            ..ConfigEchantillon::default()
        };
        let mut t = Traceur::new(Marche, config);
        let r = t.echantillonner("y=marche(x)", COTE, COTE, UNITE);
        assert_eq!(r.points.len(), 601);
        assert_eq!(r.nb_segments(), 2);

        // sous le seuil : une seule polyligne
        let mut t = Traceur::new(Marche, ConfigEchantillon::default());
        let r = t.echantillonner("y=marche(x)", COTE, COTE, UNITE);
        assert_eq!(r.nb_segments(), 1);
    }

    #[test]
    fn pas_nul_remplace_par_defaut() {
        let config = ConfigEchantillon {
            pas: 0.0,
            ..ConfigEchantillon::default()
        };
        let appels = Cell::new(0);
        let mut t = Traceur::new(Compteur { appels: &appels }, config);
        let r = t.echantillonner("y=x", COTE, COTE, UNITE);
        assert_eq!(r.points.len(), 601);
        assert_eq!(appels.get(), 601);
    }

    #[test]
    fn parabole_couchee() {
        let mut t = traceur();
        let r = t.echantillonner("x=y^2", COTE, COTE, UNITE);
        assert_eq!(r.nb_segments(), 1);
        // les deux branches : y négatifs et positifs pour un même x
        assert!(r.points.iter().any(|p| p.valeur_y < -1.0 && p.valeur_x > 0.0));
        assert!(r.points.iter().any(|p| p.valeur_y > 1.0 && p.valeur_x > 0.0));
        assert!(r.points.iter().all(|p| p.valeur_x >= 0.0));
    }

    #[test]
    fn deterministe_et_mis_en_cache() {
        let mut t = traceur();
        let a = t.echantillonner("y = x**2", COTE, COTE, UNITE);
        let b = t.echantillonner("y=x^2", COTE, COTE, UNITE);
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(t.cache().len(), 1);

        let mut t2 = traceur();
        let c = t2.echantillonner("y=x^2", COTE, COTE, UNITE);
        assert_eq!(*a, *c);
    }

    #[test]
    fn cache_evite_la_reevaluation() {
        let appels = Cell::new(0);
        let mut t = Traceur::new(Compteur { appels: &appels }, ConfigEchantillon::default());
        t.echantillonner("y=x", COTE, COTE, UNITE);
        assert_eq!(appels.get(), 601);
        t.echantillonner("y=x", COTE, COTE, UNITE);
        assert_eq!(appels.get(), 601);
    }

    #[test]
    fn entrees_sans_trace() {
        let mut t = traceur();
        for e in ["", "y=", "x^2+1", "2+2=4", "y=((x", "y=foo(x)"] {
            let r = t.echantillonner(e, COTE, COTE, UNITE);
            assert!(r.est_vide(), "{e:?}");
            assert_eq!(r.nb_segments(), 0, "{e:?}");
        }
    }

    #[test]
    fn ordonnee_directe_et_point_fixe() {
        let t = traceur();
        assert_relative_eq!(t.ordonnee_en("y=x^2", 3.0).unwrap(), 9.0);
        assert_eq!(t.ordonnee_en("y=log(x)", -1.0), None);

        // x = y^2 en x = 4 : la méthode converge vers la branche y = 2
        let y = t.ordonnee_en("x=y^2", 4.0).unwrap();
        assert!((y * y - 4.0).abs() < 0.05, "y = {y}");
    }
}
