//! Noyau : lecture et évaluation des expressions, classement, notation
//!
//! Organisation interne :
//! - jetons.rs         : tokenisation + produits implicites
//! - rpn.rs            : shunting-yard + construction Expr
//! - expr.rs           : AST à littéraux exacts + simplify + évaluation f64
//! - eval.rs           : pipeline complet + trait Evaluateur
//! - classement.rs     : type de problème + variable à isoler
//! - notation.rs       : réécriture typographique (LaTeX)
//! - reconnaissance.rs : réponse du service de reconnaissance

pub mod classement;
pub mod eval;
pub mod expr;
pub mod jetons;
pub mod notation;
pub mod reconnaissance;
pub mod rpn;

#[cfg(test)]
mod tests_fuzz_safe;
