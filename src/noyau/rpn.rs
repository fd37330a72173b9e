// src/noyau/rpn.rs
//
// Shunting-yard -> RPN -> AST
// Objectif:
// - Convertir une suite de Tok en RPN (postfix)
// - Puis reconstruire Expr
//
// Règles:
// - Ident(name):
//    - si name est une fonction connue => fonction unaire (postfixée en RPN)
//    - sinon => variable/atome (Expr::Var)
// - Moins unaire:
//    - si '-' arrive quand on n’attend PAS une valeur, il devient Tok::Neg
//    - Neg lie plus fort que * / mais moins que ^ : "-x^2" => "x 2 ^ neg", "2^-1" => "2 1 neg ^"
// - Plus unaire : ignoré.
//
// NOTE:
// - Les fonctions sont traitées comme des opérateurs “collés” à leur argument
//   et sont sorties après la parenthèse fermante.

use super::eval::ErreurEvaluation;
use super::expr::{Expr, Fonction};
use super::jetons::{est_fonction, Tok};

fn precedence(t: &Tok) -> i32 {
    match t {
        Tok::Plus | Tok::Minus => 1,
        Tok::Star | Tok::Slash => 2,
        Tok::Neg => 3,
        Tok::Caret => 4,
        _ => 0,
    }
}

fn is_right_associative(t: &Tok) -> bool {
    matches!(t, Tok::Caret)
}

fn invalide(msg: &str) -> ErreurEvaluation {
    ErreurEvaluation::Syntaxe(msg.to_string())
}

/// Convertit une suite de jetons en RPN (notation polonaise inversée).
///
/// Exemple:
///   tokens: [Ident("sin"), LPar, Ident("x"), Slash, Num(2), RPar]
///   rpn:    [Ident("x"), Num(2), Slash, Ident("sin")]
pub fn to_rpn(tokens: &[Tok]) -> Result<Vec<Tok>, ErreurEvaluation> {
    let mut out: Vec<Tok> = Vec::new();
    let mut ops: Vec<Tok> = Vec::new();

    // “valeur” = un atome ou une expression fermée.
    // Sert à détecter le moins unaire.
    let mut prev_was_value = false;

    for tok in tokens.iter().cloned() {
        match tok {
            Tok::Num(_) | Tok::Pi | Tok::E => {
                out.push(tok);
                prev_was_value = true;
            }

            Tok::Ident(name) => {
                if est_fonction(&name) {
                    // fonction : on la garde sur la pile (elle sortira après son argument)
                    ops.push(Tok::Ident(name));
                    prev_was_value = false;
                } else {
                    out.push(Tok::Ident(name));
                    prev_was_value = true;
                }
            }

            Tok::LPar => {
                ops.push(tok);
                prev_was_value = false;
            }

            Tok::RPar => {
                // dépile jusqu’à '('
                let mut ouverte = false;
                while let Some(top) = ops.pop() {
                    if matches!(top, Tok::LPar) {
                        ouverte = true;
                        break;
                    }
                    out.push(top);
                }
                if !ouverte {
                    return Err(invalide("parenthèse fermante sans ouvrante"));
                }

                // si une fonction est au sommet, on la sort aussi
                if let Some(Tok::Ident(name)) = ops.last() {
                    if est_fonction(name.as_str()) {
                        if let Some(f) = ops.pop() {
                            out.push(f);
                        }
                    }
                }

                prev_was_value = true;
            }

            Tok::Minus | Tok::Plus if !prev_was_value => {
                // opérateur préfixe : rien à dépiler
                if matches!(tok, Tok::Minus) {
                    ops.push(Tok::Neg);
                }
            }

            Tok::Plus | Tok::Minus | Tok::Star | Tok::Slash | Tok::Caret | Tok::Neg => {
                if !prev_was_value {
                    return Err(invalide("opérateur sans opérande gauche"));
                }

                // dépile tant que:
                // - on n'est pas bloqué par '('
                // - et on ne traverse pas une fonction (fonction reste collée à son argument)
                // - et la précédence/associativité exige de sortir l'opérateur du haut
                while let Some(top) = ops.last() {
                    if matches!(top, Tok::LPar) {
                        break;
                    }
                    if let Tok::Ident(name) = top {
                        if est_fonction(name.as_str()) {
                            break;
                        }
                    }

                    let p_top = precedence(top);
                    let p_tok = precedence(&tok);

                    let doit_pop = if is_right_associative(&tok) {
                        p_top > p_tok
                    } else {
                        p_top >= p_tok
                    };

                    if !doit_pop {
                        break;
                    }
                    if let Some(op) = ops.pop() {
                        out.push(op);
                    }
                }

                ops.push(tok);
                prev_was_value = false;
            }
        }
    }

    // vide la pile ops
    while let Some(op) = ops.pop() {
        if matches!(op, Tok::LPar) {
            return Err(invalide("parenthèses non fermées"));
        }
        out.push(op);
    }

    Ok(out)
}

/// Profondeur maximale de l’arbre construit (simplify/evaluer descendent récursivement).
const PROFONDEUR_MAX: usize = 256;

/// Construit une Expr à partir d’une RPN.
///
/// - Ident(name):
///     - si name est une fonction connue => fonction unaire
///     - sinon => variable : Expr::Var(name)
/// - Chaque nœud garde sa profondeur : au-delà de `PROFONDEUR_MAX`, erreur de syntaxe.
pub fn from_rpn(rpn: &[Tok]) -> Result<Expr, ErreurEvaluation> {
    let mut st: Vec<(Expr, usize)> = Vec::new();

    let noeud = |e: Expr, profondeur: usize| -> Result<(Expr, usize), ErreurEvaluation> {
        if profondeur > PROFONDEUR_MAX {
            return Err(invalide("imbrication trop profonde"));
        }
        Ok((e, profondeur))
    };

    for tok in rpn.iter().cloned() {
        match tok {
            Tok::Num(r) => st.push((Expr::Rat(r), 1)),
            Tok::Pi => st.push((Expr::Pi, 1)),
            Tok::E => st.push((Expr::E, 1)),

            Tok::Neg => {
                let (x, p) = st.pop().ok_or_else(|| invalide("expression invalide"))?;
                st.push(noeud(Expr::Neg(Box::new(x)), p + 1)?);
            }

            Tok::Plus | Tok::Minus | Tok::Star | Tok::Slash | Tok::Caret => {
                let (b, pb) = st.pop().ok_or_else(|| invalide("expression invalide"))?;
                let (a, pa) = st.pop().ok_or_else(|| invalide("expression invalide"))?;

                let (a, b) = (Box::new(a), Box::new(b));
                let e = match tok {
                    Tok::Plus => Expr::Add(a, b),
                    Tok::Minus => Expr::Sub(a, b),
                    Tok::Star => Expr::Mul(a, b),
                    Tok::Slash => Expr::Div(a, b),
                    _ => Expr::Pow(a, b),
                };

                st.push(noeud(e, pa.max(pb) + 1)?);
            }

            Tok::Ident(name) => match Fonction::depuis_nom(&name) {
                Some(f) => {
                    let (x, p) = st
                        .pop()
                        .ok_or_else(|| ErreurEvaluation::Syntaxe(format!("{name} sans argument")))?;
                    st.push(noeud(Expr::Fonction(f, Box::new(x)), p + 1)?);
                }
                None => st.push((Expr::Var(name), 1)),
            },

            Tok::LPar | Tok::RPar => return Err(invalide("parenthèse inattendue en RPN")),
        }
    }

    let (e, _) = st.pop().ok_or_else(|| invalide("expression vide"))?;
    if !st.is_empty() {
        return Err(invalide("expression invalide"));
    }
    Ok(e)
}
