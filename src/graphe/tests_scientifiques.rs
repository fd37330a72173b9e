//! Tests scientifiques (campagne) : invariants des tracés sur les courbes usuelles.
//!
//! But : vérifier la géométrie sans faire chauffer la machine.
//! - budget temps global
//! - domaine par défaut ([-30, 30], pas 0.1, 601 échantillons)
//!
//! Notes :
//! - l’échantillon central tombe exactement sur x = 0 : `1/x` et `log(x)` y échouent ;
//! - `tan` : les pôles ne tombent pas sur la grille, seuls les sauts > 100 coupent.

use std::time::{Duration, Instant};

use approx::assert_relative_eq;

use super::config::{ConfigEchantillon, ConfigVue};
use super::controleur::{ControleurVue, ResultatToucher};
use super::trace::{PointCanevas, ResultatTrace, Traceur};
use crate::noyau::eval::EvaluateurQ;

const COTE: f64 = 1156.0;
const UNITE: f64 = 34.0;

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

fn tracer(expr: &str) -> ResultatTrace {
    let mut t = Traceur::new(EvaluateurQ::new(), ConfigEchantillon::default());
    (*t.echantillonner(expr, COTE, COTE, UNITE)).clone()
}

fn assert_geometrie(r: &ResultatTrace, expr: &str) {
    for p in &r.points {
        assert_relative_eq!(p.canevas_x, COTE / 2.0 + p.valeur_x * UNITE, epsilon = 1e-6);
        assert_relative_eq!(p.canevas_y, COTE / 2.0 - p.valeur_y * UNITE, epsilon = 1e-6);
    }
    let total: usize = r.segments().iter().map(Vec::len).sum();
    assert_eq!(total, r.points.len(), "expr={expr:?}");
    assert!(r.nb_segments() <= r.points.len(), "expr={expr:?}");
}

/* ------------------------ Courbes proposées ------------------------ */

#[test]
fn sci_courbes_proposees() {
    let t0 = Instant::now();
    let max = Duration::from_millis(2_000);

    for expr in [
        "y = 2x + 3",
        "y = x^2 - 4",
        "y = sin(x)",
        "y = tan(x)",
        "y = e^x",
        "y = sqrt(x)",
        "y = log(x)",
        "x = y^2",
    ] {
        budget(t0, max);
        let r = tracer(expr);
        assert!(!r.est_vide(), "expr={expr:?}");
        assert_geometrie(&r, expr);
    }
}

#[test]
fn sci_sinus_borne_et_continu() {
    let r = tracer("y=sin(x)");
    assert_eq!(r.points.len(), 601);
    assert_eq!(r.nb_segments(), 1);
    assert!(r.points.iter().all(|p| p.valeur_y.abs() <= 1.0));
}

#[test]
fn sci_tangente_coupee() {
    let r = tracer("y=tan(x)");
    assert!(r.nb_segments() >= 2);
}

#[test]
fn sci_racine_demi_domaine() {
    let r = tracer("y=sqrt(x)");
    assert_eq!(r.nb_segments(), 1);
    assert!(r.points.iter().all(|p| p.valeur_x >= 0.0));
    // x ∈ [0, 30] : 301 échantillons
    assert_eq!(r.points.len(), 301);
}

#[test]
fn sci_exponentielle_positive() {
    let r = tracer("y=e^x");
    assert_eq!(r.points.len(), 601);
    assert!(r.points.iter().all(|p| p.valeur_y > 0.0));
    // au-delà de x ≈ 7, chaque pas dépasse le seuil de saut
    assert!(r.nb_segments() > 1);
}

#[test]
fn sci_inverse_symetrique() {
    let r = tracer("y=1/x");
    for p in &r.points {
        assert_relative_eq!(p.valeur_x * p.valeur_y, 1.0, epsilon = 1e-9);
    }
    assert!(r.nb_segments() >= 2);
}

/* ------------------------ Chaîne complète : tracé -> toucher ------------------------ */

#[test]
fn sci_toucher_sur_parabole() {
    let r = tracer("y=x^2");
    let mut c = ControleurVue::new(ConfigVue::default());

    // point de la courbe (2, 4) vu à travers la transformation courante
    let v = c.canevas_vers_vue(PointCanevas {
        x: COTE / 2.0 + 2.03 * UNITE,
        y: COTE / 2.0 - 4.1 * UNITE,
    });
    match c.toucher(v.x, v.y, &r.points) {
        ResultatToucher::Touche(p) => {
            assert_relative_eq!(p.valeur_x, 2.0, epsilon = 0.06);
            assert_relative_eq!(p.valeur_y, p.valeur_x * p.valeur_x, epsilon = 1e-9);
        }
        autre => panic!("attendu un point, obtenu {autre:?}"),
    }

    // loin de la courbe
    let v = c.canevas_vers_vue(PointCanevas {
        x: COTE / 2.0 + 5.0 * UNITE,
        y: COTE / 2.0 + 5.0 * UNITE,
    });
    assert_eq!(c.toucher(v.x, v.y, &r.points), ResultatToucher::Manque);
}
