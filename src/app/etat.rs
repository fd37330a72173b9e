//! src/app/etat.rs
//!
//! État UI + actions (sans dessin).
//!
//! Rôle : contenir l’état de l’atelier (entrée, classement, notation, démarche,
//! tracé courant, vue) et offrir les actions des boutons.
//!
//! Contrats :
//! - Une entrée invalide ne bloque rien : classement et notation sont toujours produits,
//!   le tracé est simplement vide et l’erreur d’analyse est affichée.
//! - Le tracé vient du cache du traceur (jamais recalculé pour une même expression).

use std::rc::Rc;

use crate::graphe::config::ConfigGrapheur;
use crate::graphe::controleur::{ControleurVue, ResultatToucher};
use crate::graphe::trace::{normaliser, Orientation, ResultatTrace, Traceur};
use crate::noyau::classement::{classer, Classement};
use crate::noyau::eval::{analyser_avec_demarche, EvaluateurQ};
use crate::noyau::notation::vers_notation;
use crate::noyau::reconnaissance::ReponseReconnaissance;

#[derive(Clone, Default, Debug)]
pub struct Demarche {
    pub jetons: String,
    pub rpn: String,
    pub forme: String,
    pub note: String,
}

pub struct AppGraphe {
    // --- entrée utilisateur ---
    pub entree: String,
    /// Réponse brute du service de reconnaissance (collée à la main).
    pub json_reponse: String,

    // --- sorties ---
    pub classement: Option<Classement>,
    pub notation: String,
    pub solutions: Vec<String>,
    pub erreur: String,

    // --- démarche (panneau d’explication) ---
    pub demarche: Demarche,

    // --- graphe ---
    pub trace: Rc<ResultatTrace>,
    pub expression_tracee: String,
    pub controleur: ControleurVue,
    /// Abscisse de la sonde “valeur en x”.
    pub sonde_x: f64,
    /// Cumuls des gestes en cours (unités de vue), remis à zéro au début de chaque geste.
    pub cumul_glissement: (f64, f64),
    pub cumul_pincement: f64,
    traceur: Traceur<EvaluateurQ>,

    // --- UX ---
    pub focus_entree: bool,
}

impl Default for AppGraphe {
    fn default() -> Self {
        Self::new(ConfigGrapheur::default())
    }
}

impl AppGraphe {
    pub fn new(config: ConfigGrapheur) -> Self {
        Self {
            entree: String::new(),
            json_reponse: String::new(),
            classement: None,
            notation: String::new(),
            solutions: Vec::new(),
            erreur: String::new(),
            demarche: Demarche::default(),
            trace: Rc::new(ResultatTrace::default()),
            expression_tracee: String::new(),
            controleur: ControleurVue::new(config.vue),
            sonde_x: 0.0,
            cumul_glissement: (0.0, 0.0),
            cumul_pincement: 1.0,
            traceur: Traceur::new(EvaluateurQ::new(), config.echantillon),
            focus_entree: true,
        }
    }

    /* ------------------------ Actions “boutons” ------------------------ */

    /// Remise à zéro totale (entrée + résultats + vue).
    pub fn reset_total(&mut self) {
        self.entree.clear();
        self.json_reponse.clear();
        self.clear_resultats();
        self.controleur.reinitialiser();
        self.sonde_x = 0.0;
    }

    /// Effacer seulement l’entrée.
    pub fn clear_entree(&mut self) {
        self.entree.clear();
        self.focus_entree = true;
    }

    /// Effacer résultats + erreur + démarche + tracé (sans toucher à l’entrée).
    pub fn clear_resultats(&mut self) {
        self.classement = None;
        self.notation.clear();
        self.solutions.clear();
        self.erreur.clear();
        self.demarche = Demarche::default();
        self.trace = Rc::new(ResultatTrace::default());
        self.expression_tracee.clear();
        self.controleur.effacer_selection();
        self.focus_entree = true;
    }

    /// Placer une erreur ; classement, notation et tracé restent affichés.
    pub fn set_erreur(&mut self, msg: impl Into<String>) {
        self.erreur = msg.into();
        self.demarche = Demarche::default();
        self.focus_entree = true;
    }

    /// Classe, met en notation, analyse et trace l’entrée courante.
    pub fn analyser(&mut self) {
        let s = self.entree.trim().to_string();
        if s.is_empty() {
            self.clear_resultats();
            self.set_erreur("Entrée vide");
            return;
        }

        self.solutions.clear();
        self.presenter(&s);
        self.tracer(&s);
    }

    /// Charge une réponse du service de reconnaissance : l’équation reconnue
    /// devient l’entrée, la solution isolée (si présente) est tracée.
    pub fn charger_reponse_json(&mut self) {
        let reponse = match ReponseReconnaissance::depuis_json(&self.json_reponse) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("réponse de reconnaissance illisible: {e}");
                self.set_erreur(format!("Réponse illisible : {e}"));
                return;
            }
        };

        self.entree = reponse.formatted_equation.clone();
        self.presenter(&reponse.formatted_equation);

        if let Some(c) = &self.classement {
            self.solutions = reponse.lignes_solution(c);
        }

        match reponse.expression_a_tracer() {
            Some(e) => self.tracer(&e),
            None => {
                self.trace = Rc::new(ResultatTrace::default());
                self.expression_tracee.clear();
                self.controleur.effacer_selection();
            }
        }
    }

    /// Toucher en coordonnées de vue.
    pub fn toucher(&mut self, vx: f64, vy: f64) -> ResultatToucher {
        let trace = Rc::clone(&self.trace);
        self.controleur.toucher(vx, vy, &trace.points)
    }

    /// Ordonnée de la courbe tracée à l’abscisse de la sonde.
    pub fn valeur_sonde(&self) -> Option<f64> {
        if self.expression_tracee.is_empty() {
            return None;
        }
        self.traceur.ordonnee_en(&self.expression_tracee, self.sonde_x)
    }

    /* ------------------------ interne ------------------------ */

    fn presenter(&mut self, s: &str) {
        self.erreur.clear();
        self.classement = Some(classer(s));
        self.notation = vers_notation(s);

        // Démarche : membre de droite d’une forme traçable, sinon l’expression entière
        let n = normaliser(s);
        let (cible, note) = match Orientation::detecter(&n) {
            Some((Orientation::FonctionDeX, membre)) => (membre.to_string(), "y = f(x)"),
            Some((Orientation::FonctionDeY, membre)) => (membre.to_string(), "x = f(y)"),
            None if !n.contains('=') => (n.clone(), "expression"),
            None => {
                self.demarche = Demarche {
                    note: "équation : non tracée".to_string(),
                    ..Demarche::default()
                };
                return;
            }
        };

        match analyser_avec_demarche(&cible) {
            Ok((_, d)) => {
                self.demarche = Demarche {
                    jetons: d.jetons,
                    rpn: d.rpn,
                    forme: d.forme,
                    note: note.to_string(),
                };
            }
            Err(e) => self.set_erreur(e.to_string()),
        }
    }

    fn tracer(&mut self, expression: &str) {
        let cfg = *self.controleur.config();
        let cote = cfg.cote_canevas();

        self.trace = self
            .traceur
            .echantillonner(expression, cote, cote, cfg.taille_carreau);
        self.expression_tracee = if self.trace.est_vide() {
            String::new()
        } else {
            expression.to_string()
        };
        self.controleur.effacer_selection();

        tracing::info!(
            expression,
            points = self.trace.points.len(),
            segments = self.trace.nb_segments(),
            "tracé"
        );
        self.focus_entree = true;
    }
}
