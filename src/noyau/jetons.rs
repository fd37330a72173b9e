// src/noyau/jetons.rs

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};

use super::eval::ErreurEvaluation;

#[derive(Clone, Debug, PartialEq)]
pub enum Tok {
    Num(BigRational),
    Pi,
    E,

    // Fonctions + variables (tout ce qui n’est pas constante / opérateur / nombre)
    // NOTE: le parse (RPN->Expr) décidera si c’est une fonction (sin/log/...) ou une variable.
    Ident(String),

    Plus,
    Minus,
    Star,
    Slash,
    Caret, // ^ ou **

    // Moins unaire : jamais produit par tokenize(), seulement par to_rpn().
    Neg,

    LPar,
    RPar,
}

impl Tok {
    /// Jeton qui termine une valeur (nombre, constante, variable, parenthèse fermante).
    fn termine_valeur(&self) -> bool {
        match self {
            Tok::Num(_) | Tok::Pi | Tok::E | Tok::RPar => true,
            Tok::Ident(name) => !est_fonction(name),
            _ => false,
        }
    }

    /// Jeton qui ouvre une valeur (nombre, constante, identifiant, parenthèse ouvrante).
    fn ouvre_valeur(&self) -> bool {
        matches!(
            self,
            Tok::Num(_) | Tok::Pi | Tok::E | Tok::Ident(_) | Tok::LPar
        )
    }
}

/// Identificateurs reconnus comme fonctions (unaire).
pub fn est_fonction(name: &str) -> bool {
    matches!(
        name,
        "sin" | "cos" | "tan" | "asin" | "acos" | "atan" | "sqrt" | "ln" | "log" | "exp" | "abs"
    )
}

/// Tokenize une chaîne en jetons.
/// Supporte:
/// - entiers et décimaux (ex: 12, 0.25) -> rationnels exacts
/// - fractions littérales sans espaces (ex: 12/34) -> Num(12/34)
/// - opérateurs + - * / ^ et ** (puissance)
/// - parenthèses ( )
/// - π ou pi, e
/// - identifiants [a-zA-Z_][a-zA-Z0-9_]* (normalisés en minuscules)
/// - √ (équivaut à ident("sqrt"))
pub fn tokenize(s: &str) -> Result<Vec<Tok>, ErreurEvaluation> {
    let mut out = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i: usize = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        // Parenthèses
        if c == '(' {
            out.push(Tok::LPar);
            i += 1;
            continue;
        }
        if c == ')' {
            out.push(Tok::RPar);
            i += 1;
            continue;
        }

        // Opérateurs
        match c {
            '+' => {
                out.push(Tok::Plus);
                i += 1;
                continue;
            }
            '-' | '−' => {
                out.push(Tok::Minus);
                i += 1;
                continue;
            }
            '*' => {
                // ** = puissance (notation Python renvoyée par le service)
                if i + 1 < chars.len() && chars[i + 1] == '*' {
                    out.push(Tok::Caret);
                    i += 2;
                } else {
                    out.push(Tok::Star);
                    i += 1;
                }
                continue;
            }
            '×' | '·' => {
                out.push(Tok::Star);
                i += 1;
                continue;
            }
            '/' | '÷' => {
                out.push(Tok::Slash);
                i += 1;
                continue;
            }
            '^' => {
                out.push(Tok::Caret);
                i += 1;
                continue;
            }
            _ => {}
        }

        if c == 'π' {
            out.push(Tok::Pi);
            i += 1;
            continue;
        }

        // Racine carrée unicode : √  => ident("sqrt")
        if c == '√' {
            out.push(Tok::Ident("sqrt".to_string()));
            i += 1;
            continue;
        }

        // Identifiants ASCII : [a-zA-Z_][a-zA-Z0-9_]*
        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            i += 1;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            let w = word.to_lowercase();

            match w.as_str() {
                "pi" => out.push(Tok::Pi),
                "e" => out.push(Tok::E),
                _ => out.push(Tok::Ident(w)),
            }
            continue;
        }

        // Nombre : entier, décimal, ou fraction littérale a/b (sans espaces)
        if c.is_ascii_digit() || (c == '.' && i + 1 < chars.len() && chars[i + 1].is_ascii_digit())
        {
            let (n, d, fin) = lire_decimal(&chars, i)?;
            i = fin;

            let mut rat = BigRational::new(n.clone(), d.clone());

            // fraction immédiate: 12/34 (pas de parenthèses, pas d’espaces, entiers seulement)
            if d.is_one() && i < chars.len() && chars[i] == '/' {
                let start_d = i + 1;

                // si pas un chiffre après '/', c’est une division normale
                if start_d < chars.len() && chars[start_d].is_ascii_digit() {
                    let mut j = start_d;
                    while j < chars.len() && chars[j].is_ascii_digit() {
                        j += 1;
                    }
                    // 1/2.5 : on laisse la division au parseur
                    if j >= chars.len() || chars[j] != '.' {
                        let d_str: String = chars[start_d..j].iter().collect();
                        let den = BigInt::parse_bytes(d_str.as_bytes(), 10)
                            .ok_or_else(|| syntaxe("dénominateur invalide"))?;
                        if den.is_zero() {
                            return Err(ErreurEvaluation::DivisionParZero);
                        }
                        rat = BigRational::new(n, den);
                        i = j;
                    }
                }
            }

            out.push(Tok::Num(rat));
            continue;
        }

        return Err(syntaxe(format!("caractère inattendu: '{c}'")));
    }

    Ok(out)
}

/// Lit `123`, `1.25` ou `.5` à partir de `start`.
/// Retourne (numérateur, dénominateur 10^k, position après le nombre).
fn lire_decimal(chars: &[char], start: usize) -> Result<(BigInt, BigInt, usize), ErreurEvaluation> {
    let mut i = start;
    let mut chiffres = String::new();
    let mut decimales: u32 = 0;
    let mut vu_point = false;

    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_digit() {
            chiffres.push(c);
            if vu_point {
                decimales += 1;
            }
        } else if c == '.' && !vu_point {
            vu_point = true;
        } else {
            break;
        }
        i += 1;
    }

    if chiffres.is_empty() {
        return Err(syntaxe("nombre invalide"));
    }

    let n = BigInt::parse_bytes(chiffres.as_bytes(), 10).ok_or_else(|| syntaxe("nombre invalide"))?;
    let d = BigInt::from(10).pow(decimales);
    Ok((n, d, i))
}

/// Insère les produits implicites : `2x`, `3(x+1)`, `x(x+1)`, `(a)(b)`, `2pi`.
///
/// Une fonction suivie de sa parenthèse (`sin(`) n’est pas concernée :
/// un identifiant de fonction ne termine pas une valeur.
pub fn inserer_produits_implicites(tokens: Vec<Tok>) -> Vec<Tok> {
    let mut out: Vec<Tok> = Vec::with_capacity(tokens.len() * 2);

    for tok in tokens {
        if let Some(prev) = out.last() {
            if prev.termine_valeur() && tok.ouvre_valeur() {
                out.push(Tok::Star);
            }
        }
        out.push(tok);
    }

    out
}

fn syntaxe(msg: impl Into<String>) -> ErreurEvaluation {
    ErreurEvaluation::Syntaxe(msg.into())
}

/// Format utilitaire (debug/“démarche”) : liste de jetons en texte.
pub fn format_tokens(tokens: &[Tok]) -> String {
    fn format_rat(r: &BigRational) -> String {
        let n = r.numer();
        let d = r.denom();
        if d.is_one() {
            format!("{n}")
        } else {
            format!("{n}/{d}")
        }
    }

    let mut out = Vec::new();
    for t in tokens {
        let s = match t {
            Tok::Num(r) => format_rat(r),
            Tok::Pi => "π".to_string(),
            Tok::E => "e".to_string(),
            Tok::Ident(name) => name.clone(),

            Tok::Plus => "+".to_string(),
            Tok::Minus => "-".to_string(),
            Tok::Star => "*".to_string(),
            Tok::Slash => "/".to_string(),
            Tok::Caret => "^".to_string(),
            Tok::Neg => "neg".to_string(),

            Tok::LPar => "(".to_string(),
            Tok::RPar => ")".to_string(),
        };
        out.push(s);
    }
    out.join(" ")
}
