// src/noyau/classement.rs
//
// Classement pédagogique d’une expression brute : type de problème + variable à isoler.
//
// Règles ordonnées (la première qui s’applique gagne) :
// 1. "lim"                         -> limite (variable devant "to" / "\to")
// 2. lettre isolée ^n ou **n       -> équation de degré n
// 3. opérateur ET "="              -> équation (deux variables si x et y)
// 4. lettres sans "="              -> deux variables, ou "solve for a, b"
// 5. opérateurs seuls              -> calcul (liste des opérations)
// 6. sinon                         -> non reconnu
//
// L’ordre encode la précédence : une limite ou une équation de degré contient
// elle aussi des opérateurs et un "=".

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// Mots qui ne sont pas des variables (fonctions, constantes nommées).
const MOTS_RESERVES: &[&str] = &[
    "sin", "cos", "tan", "asin", "acos", "atan", "sqrt", "log", "ln", "exp", "abs", "pi",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Operation {
    Addition,
    Soustraction,
    Multiplication,
    Division,
}

impl Operation {
    /// Ordre fixe d’affichage.
    const TOUTES: [(char, Operation); 4] = [
        ('+', Operation::Addition),
        ('-', Operation::Soustraction),
        ('*', Operation::Multiplication),
        ('/', Operation::Division),
    ];
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Addition => "addition",
            Operation::Soustraction => "subtraction",
            Operation::Multiplication => "multiplication",
            Operation::Division => "division",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum TypeProbleme {
    Limite,
    /// Degré déjà mis en forme ("2nd", "5th", ou chiffres bruts au-delà).
    EquationDegre(String),
    Equation,
    DeuxVariables,
    ResoudrePour(Vec<char>),
    Calcul(Vec<Operation>),
    NonReconnu,
}

impl fmt::Display for TypeProbleme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeProbleme::Limite => f.write_str("limit problem"),
            TypeProbleme::EquationDegre(n) => write!(f, "solve the {n}-degree equation"),
            TypeProbleme::Equation => f.write_str("solve the equation"),
            TypeProbleme::DeuxVariables => f.write_str("two-variable equation"),
            TypeProbleme::ResoudrePour(lettres) => {
                let l: Vec<String> = lettres.iter().map(char::to_string).collect();
                write!(f, "solve for {}", l.join(", "))
            }
            TypeProbleme::Calcul(ops) => {
                let o: Vec<String> = ops.iter().map(Operation::to_string).collect();
                write!(f, "calculate {}", o.join(", "))
            }
            TypeProbleme::NonReconnu => f.write_str("unrecognized expression"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Classement {
    pub type_probleme: TypeProbleme,
    pub variable: Option<char>,
}

impl Classement {
    fn new(type_probleme: TypeProbleme, variable: Option<char>) -> Self {
        Self {
            type_probleme,
            variable,
        }
    }

    pub fn libelle(&self) -> String {
        self.type_probleme.to_string()
    }

    /// Variable à isoler, ou chaîne vide.
    pub fn variable_texte(&self) -> String {
        self.variable.map(String::from).unwrap_or_default()
    }

    /// Consigne affichée sous l’équation.
    pub fn consigne(&self) -> String {
        match (&self.variable, &self.type_probleme) {
            (Some(v), _) => format!("Solve for {v}"),
            (None, TypeProbleme::DeuxVariables) => "Simplify the expression".to_string(),
            (None, _) => "Calculate".to_string(),
        }
    }
}

/* ------------------------ Motifs (compilés une fois) ------------------------ */

fn motif(cell: &'static OnceLock<Regex>, src: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(src).expect("motif de classement invalide"))
}

/// `lim x \to 0`, `lim x to 0`, `lim x -> 0`
fn re_limite() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    motif(&RE, r"lim.*?([a-z])\s*(?:\\?to|->|→)")
}

/// Lettre seule suivie de `^n` ou `**n`.
fn re_degre() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    motif(&RE, r"(?:^|[^a-z])([a-z])(?:\^|\*\*)(\d+)")
}

/// Première lettre isolée (pas collée à une autre lettre).
fn re_lettre_isolee() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    motif(&RE, r"(?:^|[^a-z])([a-z])(?:[^a-z]|$)")
}

fn ordinal(degre: &str) -> String {
    match degre {
        "1" => "1st".to_string(),
        "2" => "2nd".to_string(),
        "3" => "3rd".to_string(),
        "4" => "4th".to_string(),
        "5" => "5th".to_string(),
        _ => degre.to_string(),
    }
}

/// Lettres distinctes, dans l’ordre d’apparition, hors fonctions nommées.
fn lettres_distinctes(e: &str) -> Vec<char> {
    let mut out: Vec<char> = Vec::new();
    let chars: Vec<char> = e.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        if !chars[i].is_ascii_lowercase() {
            i += 1;
            continue;
        }
        let start = i;
        while i < chars.len() && chars[i].is_ascii_lowercase() {
            i += 1;
        }
        let mot: String = chars[start..i].iter().collect();
        if MOTS_RESERVES.contains(&mot.as_str()) {
            continue;
        }
        for c in mot.chars() {
            if !out.contains(&c) {
                out.push(c);
            }
        }
    }

    out
}

fn premiere_capture(re: &Regex, e: &str) -> Option<char> {
    re.captures(e)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().chars().next())
}

/* ------------------------ API ------------------------ */

/// Classe une expression brute (insensible à la casse). N’échoue jamais.
pub fn classer(expression: &str) -> Classement {
    let e = expression.to_lowercase();
    let c = classer_minuscules(&e);
    tracing::debug!(expression, type_probleme = %c.type_probleme, variable = ?c.variable, "expression classée");
    c
}

fn classer_minuscules(e: &str) -> Classement {
    // 1) limite
    if e.contains("lim") {
        return Classement::new(TypeProbleme::Limite, premiere_capture(re_limite(), e));
    }

    // 2) équation de degré n
    if let Some(c) = re_degre().captures(e) {
        let lettre = c.get(1).and_then(|m| m.as_str().chars().next());
        let degre = c.get(2).map(|m| m.as_str()).unwrap_or_default();
        return Classement::new(TypeProbleme::EquationDegre(ordinal(degre)), lettre);
    }

    let a_operateur = e.contains(['+', '-', '*', '/']);
    let a_egal = e.contains('=');
    let lettres = lettres_distinctes(e);
    let deux_variables = lettres.contains(&'x') && lettres.contains(&'y');

    // 3) équation
    if a_operateur && a_egal {
        if deux_variables {
            return Classement::new(TypeProbleme::DeuxVariables, None);
        }
        let lettre = if lettres.is_empty() {
            None
        } else {
            premiere_capture(re_lettre_isolee(), e)
        };
        return Classement::new(TypeProbleme::Equation, lettre);
    }

    // 4) variables sans égalité ; une égalité sans opérateur entre x et y
    //    (y=sin(x), y=e^x…) reste une équation à deux variables
    if !lettres.is_empty() && (!a_egal || deux_variables) {
        if deux_variables {
            return Classement::new(TypeProbleme::DeuxVariables, None);
        }
        let premiere = lettres.first().copied();
        return Classement::new(TypeProbleme::ResoudrePour(lettres), premiere);
    }

    // 5) calcul pur
    if a_operateur && !a_egal {
        let ops: Vec<Operation> = Operation::TOUTES
            .iter()
            .filter(|(c, _)| e.contains(*c))
            .map(|(_, op)| *op)
            .collect();
        return Classement::new(TypeProbleme::Calcul(ops), None);
    }

    // 6) repli
    Classement::new(TypeProbleme::NonReconnu, None)
}
