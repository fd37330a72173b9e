// src/noyau/expr.rs
//
// AST numérique à littéraux exacts.
// - Rat : rationnel exact (littéraux, sous-arbres constants repliés)
// - Pi, E : constantes symboliques (repliées seulement au moment d’évaluer)
// - Var : variable libre (x ou y), liée à l’évaluation
//
// IMPORTANT (SAFE):
// - simplify() ne replie que ce qui est exact (Rat op Rat) et ne touche jamais à Var.
// - evaluer() passe en f64 au dernier moment et signale les domaines interdits.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use std::fmt;

use super::eval::{ErreurEvaluation, Liaisons};

/// Au-delà, on ne replie pas une puissance exacte (taille des entiers).
const EXPOSANT_EXACT_MAX: i64 = 64;
/// Taille (bits) maximale d’une puissance repliée exactement.
const BITS_EXACTS_MAX: u64 = 4096;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fonction {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sqrt,
    Ln,
    Log, // log naturel, comme le service de calcul d’origine
    Exp,
    Abs,
}

impl Fonction {
    pub fn depuis_nom(name: &str) -> Option<Self> {
        use Fonction::*;
        Some(match name {
            "sin" => Sin,
            "cos" => Cos,
            "tan" => Tan,
            "asin" => Asin,
            "acos" => Acos,
            "atan" => Atan,
            "sqrt" => Sqrt,
            "ln" => Ln,
            "log" => Log,
            "exp" => Exp,
            "abs" => Abs,
            _ => return None,
        })
    }

    pub fn nom(self) -> &'static str {
        use Fonction::*;
        match self {
            Sin => "sin",
            Cos => "cos",
            Tan => "tan",
            Asin => "asin",
            Acos => "acos",
            Atan => "atan",
            Sqrt => "sqrt",
            Ln => "ln",
            Log => "log",
            Exp => "exp",
            Abs => "abs",
        }
    }

    fn appliquer(self, v: f64) -> Result<f64, ErreurEvaluation> {
        use Fonction::*;
        let hors_domaine = || Err(ErreurEvaluation::HorsDomaine(self.nom()));

        match self {
            Sin => Ok(v.sin()),
            Cos => Ok(v.cos()),
            Tan => Ok(v.tan()),
            Asin | Acos if !(-1.0..=1.0).contains(&v) => hors_domaine(),
            Asin => Ok(v.asin()),
            Acos => Ok(v.acos()),
            Atan => Ok(v.atan()),
            Sqrt if v < 0.0 => hors_domaine(),
            Sqrt => Ok(v.sqrt()),
            Ln | Log if v <= 0.0 => hors_domaine(),
            Ln | Log => Ok(v.ln()),
            Exp => Ok(v.exp()),
            Abs => Ok(v.abs()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Rat(BigRational),
    Pi,
    E,

    Var(String),

    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),

    Fonction(Fonction, Box<Expr>),
}

impl Expr {
    /// Repliement exact des sous-arbres constants rationnels.
    /// Une division par zéro exacte reste symbolique : c’est evaluer() qui la signale.
    pub fn simplify(self) -> Expr {
        use Expr::*;

        match self {
            Rat(_) | Pi | E | Var(_) => self,

            Neg(x) => match x.simplify() {
                Rat(r) => Rat(-r),
                x => Neg(Box::new(x)),
            },

            Add(a, b) => match (a.simplify(), b.simplify()) {
                (Rat(x), Rat(y)) => Rat(x + y),
                (a, b) => Add(Box::new(a), Box::new(b)),
            },

            Sub(a, b) => match (a.simplify(), b.simplify()) {
                (Rat(x), Rat(y)) => Rat(x - y),
                (a, b) => Sub(Box::new(a), Box::new(b)),
            },

            Mul(a, b) => match (a.simplify(), b.simplify()) {
                (Rat(x), Rat(y)) => Rat(x * y),
                (a, b) => Mul(Box::new(a), Box::new(b)),
            },

            Div(a, b) => match (a.simplify(), b.simplify()) {
                (Rat(x), Rat(y)) if !y.is_zero() => Rat(x / y),
                (a, b) => Div(Box::new(a), Box::new(b)),
            },

            Pow(a, b) => match (a.simplify(), b.simplify()) {
                (Rat(base), Rat(exp)) => match exposant_entier(&exp) {
                    Some(n) if !(base.is_zero() && n < 0) && repliable(&base, n) => {
                        Rat(rational_pow_int(base, n))
                    }
                    _ => Pow(Box::new(Rat(base)), Box::new(Rat(exp))),
                },
                (a, b) => Pow(Box::new(a), Box::new(b)),
            },

            Fonction(f, x) => Fonction(f, Box::new(x.simplify())),
        }
    }

    /// Évaluation flottante avec les liaisons données.
    pub fn evaluer(&self, liaisons: &Liaisons) -> Result<f64, ErreurEvaluation> {
        use Expr::*;

        match self {
            Rat(r) => r
                .to_f64()
                .ok_or_else(|| ErreurEvaluation::Syntaxe("littéral non représentable".into())),
            Pi => Ok(std::f64::consts::PI),
            E => Ok(std::f64::consts::E),

            Var(name) => liaisons
                .valeur(name)
                .ok_or_else(|| ErreurEvaluation::VariableNonLiee(name.clone())),

            Neg(x) => Ok(-x.evaluer(liaisons)?),
            Add(a, b) => Ok(a.evaluer(liaisons)? + b.evaluer(liaisons)?),
            Sub(a, b) => Ok(a.evaluer(liaisons)? - b.evaluer(liaisons)?),
            Mul(a, b) => Ok(a.evaluer(liaisons)? * b.evaluer(liaisons)?),

            Div(a, b) => {
                let num = a.evaluer(liaisons)?;
                let den = b.evaluer(liaisons)?;
                if den == 0.0 {
                    return Err(ErreurEvaluation::DivisionParZero);
                }
                Ok(num / den)
            }

            Pow(a, b) => {
                let base = a.evaluer(liaisons)?;
                let exp = b.evaluer(liaisons)?;
                if base == 0.0 && exp < 0.0 {
                    return Err(ErreurEvaluation::DivisionParZero);
                }
                let v = base.powf(exp);
                // (-8)^(1/3) : pas de valeur réelle en f64
                if v.is_nan() && !base.is_nan() && !exp.is_nan() {
                    return Err(ErreurEvaluation::HorsDomaine("^"));
                }
                Ok(v)
            }

            Fonction(f, x) => f.appliquer(x.evaluer(liaisons)?),
        }
    }
}

fn exposant_entier(r: &BigRational) -> Option<i64> {
    if !r.denom().is_one() {
        return None;
    }
    let n = r.numer().to_i64()?;
    (n.abs() <= EXPOSANT_EXACT_MAX).then_some(n)
}

fn repliable(base: &BigRational, exp: i64) -> bool {
    let bits = base.numer().bits() + base.denom().bits();
    bits.saturating_mul(exp.unsigned_abs()) <= BITS_EXACTS_MAX
}

/// Puissance entière exacte (exponentiation rapide).
fn rational_pow_int(base: BigRational, exp: i64) -> BigRational {
    if exp == 0 {
        return BigRational::one();
    }
    if exp < 0 {
        let pos = rational_pow_int(base, -exp);
        return BigRational::one() / pos;
    }

    let mut e = exp as u64;
    let mut acc = BigRational::one();
    let mut b = base;

    while e > 0 {
        if (e & 1) == 1 {
            acc *= b.clone();
        }
        e >>= 1;
        if e > 0 {
            b *= b.clone();
        }
    }
    acc
}

/* ------------------------ Affichage (démarche) ------------------------ */

fn format_rat(r: &BigRational) -> String {
    let n = r.numer();
    let d = r.denom();
    if d.is_one() {
        format!("{n}")
    } else if n.is_negative() {
        format!("-{}/{d}", -n)
    } else {
        format!("{n}/{d}")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Expr::*;
        match self {
            Rat(r) => write!(f, "{}", format_rat(r)),
            Pi => write!(f, "π"),
            E => write!(f, "e"),
            Var(s) => write!(f, "{s}"),
            Neg(x) => write!(f, "-({x})"),
            Add(a, b) => write!(f, "({a}+{b})"),
            Sub(a, b) => write!(f, "({a}-{b})"),
            Mul(a, b) => write!(f, "({a}*{b})"),
            Div(a, b) => write!(f, "{a}/{b}"),
            Pow(a, b) => write!(f, "({a})^{b}"),
            Fonction(fun, x) => write!(f, "{}({x})", fun.nom()),
        }
    }
}
