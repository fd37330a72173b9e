//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler le pipeline sans brûler la machine.
//! - RNG déterministe (seed fixe) pour les expressions bien formées
//! - proptest pour les entrées arbitraires (classement, notation, évaluation, tracé)
//! - budget temps global
//! - erreurs acceptées : division par zéro, hors domaine (jamais de syntaxe sur une entrée générée)

use std::time::{Duration, Instant};

use proptest::prelude::*;

use super::classement::classer;
use super::eval::{ErreurEvaluation, Evaluateur, EvaluateurQ, Liaisons};
use super::notation::vers_notation;
use crate::graphe::config::ConfigEchantillon;
use crate::graphe::trace::Traceur;

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn coin(&mut self) -> bool {
        (self.next_u32() & 1) == 1
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

fn is_erreur_attendue(e: &ErreurEvaluation) -> bool {
    matches!(
        e,
        ErreurEvaluation::DivisionParZero | ErreurEvaluation::HorsDomaine(_)
    )
}

/* ------------------------ Génération d’expressions en x (bornée) ------------------------ */

fn gen_atom(rng: &mut Rng) -> String {
    match rng.pick(7) {
        0 => "x".to_string(),
        1 => format!("{}", rng.pick(10)),
        2 => format!("{}/{}", rng.pick(10), 1 + rng.pick(8)),
        3 => "pi".to_string(),
        4 => "e".to_string(),
        5 => format!("{}x", 1 + rng.pick(5)),
        _ => "(-x)".to_string(),
    }
}

fn gen_expr(rng: &mut Rng, depth: usize) -> String {
    if depth == 0 {
        return gen_atom(rng);
    }

    let a = gen_expr(rng, depth - 1);
    match rng.pick(10) {
        0 => gen_atom(rng),
        1 => format!("({a}+{})", gen_expr(rng, depth - 1)),
        2 => format!("({a}-{})", gen_expr(rng, depth - 1)),
        3 => format!("({a}*{})", gen_expr(rng, depth - 1)),
        4 => format!("({a}/{})", gen_expr(rng, depth - 1)),
        5 => format!("({a})^2"),
        6 => format!("sin({a})"),
        7 => format!("cos({a})"),
        8 => format!("sqrt({a})"),
        _ => {
            if rng.coin() {
                format!("log({a})")
            } else {
                format!("-{a}")
            }
        }
    }
}

/* ------------------------ Helper somme balancée anti pile ------------------------ */

fn somme_balancee(terme: &str, n: usize) -> String {
    let mut items: Vec<String> = (0..n).map(|_| terme.to_string()).collect();
    while items.len() > 1 {
        let mut next = Vec::new();
        let mut i = 0;
        while i < items.len() {
            if i + 1 < items.len() {
                next.push(format!("({}+{})", items[i], items[i + 1]));
                i += 2;
            } else {
                next.push(items[i].clone());
                i += 1;
            }
        }
        items = next;
    }
    items.pop().unwrap_or_else(|| "0".to_string())
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_determinisme_evaluation() {
    let t0 = Instant::now();
    let max = Duration::from_millis(500);

    let mut rng = Rng::new(0xC0FFEE_u64);

    let mut seen_ok = 0usize;
    let mut seen_err = 0usize;

    for i in 0..150 {
        budget(t0, max);

        let expr = gen_expr(&mut rng, 4);
        let x = (i as f64 - 75.0) / 7.0;

        let a = EvaluateurQ::new().evaluer(&expr, Liaisons::x(x));
        let b = EvaluateurQ::new().evaluer(&expr, Liaisons::x(x));

        match (a, b) {
            (Ok(va), Ok(vb)) => {
                assert_eq!(va.to_bits(), vb.to_bits(), "expr={expr:?}");
                seen_ok += 1;
            }
            (Err(ea), Err(eb)) => {
                assert_eq!(ea, eb);
                assert!(
                    is_erreur_attendue(&ea),
                    "erreur non attendue: expr={expr:?} err={ea}"
                );
                seen_err += 1;
            }
            (a, b) => panic!("non déterministe: expr={expr:?} {a:?} / {b:?}"),
        }
    }

    // On veut voir un mix des deux, sinon le fuzz ne “balaye” rien.
    assert!(seen_ok > 30, "trop peu de succès: {seen_ok}");
    assert!(seen_err > 0, "aucune erreur vue: fuzz trop “sage”");
}

#[test]
fn fuzz_safe_traces_deterministes() {
    let t0 = Instant::now();
    let max = Duration::from_millis(2_000);

    let mut rng = Rng::new(0xBADC0DE_u64);

    for _ in 0..20 {
        budget(t0, max);

        let expr = format!("y={}", gen_expr(&mut rng, 3));
        let mut t1 = Traceur::new(EvaluateurQ::new(), ConfigEchantillon::default());
        let mut t2 = Traceur::new(EvaluateurQ::new(), ConfigEchantillon::default());

        let a = t1.echantillonner(&expr, 1156.0, 1156.0, 34.0);
        let b = t2.echantillonner(&expr, 1156.0, 1156.0, 34.0);
        assert_eq!(*a, *b, "expr={expr:?}");
        assert!(a.points.iter().all(|p| p.valeur_y.is_finite()));
        assert!(a.points.len() <= 601);
    }
}

#[test]
fn fuzz_safe_somme_balancee_anti_pile() {
    let t0 = Instant::now();
    let max = Duration::from_millis(200);

    let expr = somme_balancee("1/2", 800);
    let v = EvaluateurQ::new()
        .evaluer(&expr, Liaisons::default())
        .unwrap_or_else(|e| panic!("err: {e}"));
    budget(t0, max);

    // 800*(1/2) = 400, replié exactement
    assert_eq!(v, 400.0);
}

#[test]
fn fuzz_safe_imbrication_lineaire_refusee() {
    let t0 = Instant::now();
    let max = Duration::from_millis(2_000);

    let negations = format!("y={}x", "-".repeat(10_000));
    let sinus = format!("y={}x{}", "sin(".repeat(5_000), ")".repeat(5_000));

    for expr in [negations, sinus] {
        budget(t0, max);

        let membre = &expr[2..];
        assert!(matches!(
            EvaluateurQ::new().evaluer(membre, Liaisons::x(1.0)),
            Err(ErreurEvaluation::Syntaxe(_))
        ));

        let mut t = Traceur::new(EvaluateurQ::new(), ConfigEchantillon::default());
        let r = t.echantillonner(&expr, 1156.0, 1156.0, 34.0);
        assert!(r.est_vide());
        assert_eq!(r.nb_segments(), 0);

        let _ = classer(&expr);
        let _ = vers_notation(&expr);
    }

    // sous la limite : toujours évaluable
    let v = EvaluateurQ::new()
        .evaluer(&format!("{}x", "-".repeat(200)), Liaisons::x(3.0))
        .unwrap_or_else(|e| panic!("err: {e}"));
    assert_eq!(v, 3.0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn classement_et_notation_jamais_en_panique(s in "\\PC{0,40}") {
        let c = classer(&s);
        let _ = c.libelle();
        let _ = c.consigne();
        let _ = vers_notation(&s);
    }

    #[test]
    fn evaluation_jamais_en_panique(s in "[xy0-9a-z+*/^()=. -]{0,30}", x in -50.0f64..50.0) {
        let _ = EvaluateurQ::new().evaluer(&s, Liaisons::x(x));
    }

    #[test]
    fn trace_arbitraire_sans_panique(s in "[xy]=[x0-9+*/^() -]{0,20}") {
        let mut t = Traceur::new(EvaluateurQ::new(), ConfigEchantillon::default());
        let r = t.echantillonner(&s, 1156.0, 1156.0, 34.0);
        prop_assert!(r.nb_segments() <= r.points.len());
    }
}
