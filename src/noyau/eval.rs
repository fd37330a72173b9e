//! Noyau : évaluateur d’expressions (capacité injectée dans le traceur)
//!
//! tokenize -> produits implicites -> RPN -> Expr -> simplify (exact) -> f64
//!
//! Le traceur ne connaît que le trait `Evaluateur` : la grammaire supportée
//! reste un détail de cette implémentation.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;

use super::expr::Expr;
use super::jetons::{format_tokens, inserer_produits_implicites, tokenize};
use super::rpn::{from_rpn, to_rpn};

/// Échec d’une évaluation (par échantillon : jamais fatal pour un tracé).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErreurEvaluation {
    #[error("syntaxe: {0}")]
    Syntaxe(String),
    #[error("variable non liée: {0}")]
    VariableNonLiee(String),
    #[error("division par zéro")]
    DivisionParZero,
    #[error("hors domaine: {0}")]
    HorsDomaine(&'static str),
}

/// Valeurs des variables libres pour un appel (au plus une en pratique).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Liaisons {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl Liaisons {
    pub fn x(v: f64) -> Self {
        Self {
            x: Some(v),
            y: None,
        }
    }

    pub fn y(v: f64) -> Self {
        Self {
            x: None,
            y: Some(v),
        }
    }

    pub fn valeur(&self, name: &str) -> Option<f64> {
        match name {
            "x" => self.x,
            "y" => self.y,
            _ => None,
        }
    }
}

/// Capacité d’évaluation numérique : `evaluer("x^2", x=3) -> 9`.
pub trait Evaluateur {
    fn evaluer(&self, expression: &str, liaisons: Liaisons) -> Result<f64, ErreurEvaluation>;
}

/// Trace d’analyse (panneau “Démarche”).
#[derive(Default, Clone, Debug)]
pub struct DemarcheAnalyse {
    pub jetons: String,
    pub rpn: String,
    pub forme: String,
}

/// Analyse complète d’une expression (sans égalité) en AST simplifié.
pub fn analyser(expression: &str) -> Result<Expr, ErreurEvaluation> {
    analyser_avec_demarche(expression).map(|(e, _)| e)
}

/// Comme `analyser`, en gardant les étapes intermédiaires pour affichage.
pub fn analyser_avec_demarche(
    expression: &str,
) -> Result<(Expr, DemarcheAnalyse), ErreurEvaluation> {
    let s = expression.trim();
    if s.is_empty() {
        return Err(ErreurEvaluation::Syntaxe("entrée vide".into()));
    }

    // 1) Jetons (+ produits implicites)
    let jetons = inserer_produits_implicites(tokenize(s)?);

    // 2) RPN
    let rpn = to_rpn(&jetons)?;

    // 3) AST puis repliement exact
    let expr = from_rpn(&rpn)?.simplify();

    let demarche = DemarcheAnalyse {
        jetons: format_tokens(&jetons),
        rpn: format_tokens(&rpn),
        forme: expr.to_string(),
    };

    Ok((expr, demarche))
}

/// Évaluateur livré avec l’application.
///
/// Les analyses (réussies ou non) sont mémorisées par texte : un balayage de
/// plusieurs centaines d’échantillons n’analyse la formule qu’une fois.
#[derive(Default)]
pub struct EvaluateurQ {
    analyses: RefCell<HashMap<String, Result<Rc<Expr>, ErreurEvaluation>>>,
}

impl EvaluateurQ {
    pub fn new() -> Self {
        Self::default()
    }

    fn analyse(&self, expression: &str) -> Result<Rc<Expr>, ErreurEvaluation> {
        if let Some(r) = self.analyses.borrow().get(expression) {
            return r.clone();
        }

        let r = analyser(expression).map(Rc::new);
        self.analyses
            .borrow_mut()
            .insert(expression.to_string(), r.clone());
        r
    }
}

impl Evaluateur for EvaluateurQ {
    fn evaluer(&self, expression: &str, liaisons: Liaisons) -> Result<f64, ErreurEvaluation> {
        self.analyse(expression)?.evaluer(&liaisons)
    }
}
