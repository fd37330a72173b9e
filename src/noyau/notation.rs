// src/noyau/notation.rs
//
// Notation typographique (LaTeX) d’une expression brute.
// Pipeline de réécritures ORDONNÉES (pas un parseur) :
//   1. ** -> ^
//   2. minuscules
//   3. suppression des * (juxtaposition)
//   4. sqrt(E) -> \sqrt{E}
//   5. fractions : marqueurs d’ouverture sur les "/" isolés, puis fermeture a/b -> \frac{a}{b}
//   6. exposants entre accolades : a^b -> a^{b}
//   7. fonctions nommées et lim échappées : sin( -> \sin(, lim -> \lim
//
// L’ordre compte : ** doit devenir ^ avant l’étape 6, et les * doivent disparaître
// avant l’étape 5 pour ne pas couper une frontière de fraction.

use std::sync::OnceLock;

use regex::Regex;

const FONCTIONS_ECHAPPEES: [&str; 5] = ["sin(", "cos(", "tan(", "log(", "ln("];

fn motif(cell: &'static OnceLock<Regex>, src: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(src).expect("motif de notation invalide"))
}

fn re_racine() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    motif(&RE, r"sqrt\(([^)]+)\)")
}

fn re_fraction() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    motif(&RE, r"(\d+|\(.+?\))/(\d+|\(.+?\))")
}

fn re_exposant() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    motif(&RE, r"(\w+)\^(\w+)")
}

/// Convertit une expression brute en notation typographique. N’échoue jamais :
/// une entrée mal formée donne une sortie mal formée.
pub fn vers_notation(expression: &str) -> String {
    if expression.is_empty() {
        return String::new();
    }

    // 1) puissance
    let s = expression.replace("**", "^");

    // 2) minuscules
    let s = s.to_lowercase();

    // 3) multiplication implicite
    let s = s.replace('*', "");

    // 4) racines
    let s = re_racine().replace_all(&s, r"\sqrt{${1}}").into_owned();

    // 5a) ouverture des fractions isolées
    let s = ouvrir_fractions_isolees(&s);

    // 5b) fermeture des paires numérateur/dénominateur
    let s = re_fraction()
        .replace_all(&s, r"\frac{${1}}{${2}}")
        .into_owned();

    // 6) exposants
    let s = re_exposant().replace_all(&s, "${1}^{${2}}").into_owned();

    // 7) fonctions
    let mut s = s;
    for f in FONCTIONS_ECHAPPEES {
        s = s.replace(f, &format!("\\{f}"));
    }
    s.replace("lim", r"\lim")
}

/// Un "/" est isolé s’il n’est collé à aucun opérande :
/// ni précédé d’un alphanumérique ou de ')', ni suivi d’un alphanumérique ou de '('.
/// Il devient un marqueur `\frac{`.
fn ouvrir_fractions_isolees(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());

    for (i, &c) in chars.iter().enumerate() {
        if c != '/' {
            out.push(c);
            continue;
        }

        let colle_avant = i > 0 && {
            let p = chars[i - 1];
            p.is_ascii_alphanumeric() || p == ')'
        };
        let colle_apres = chars
            .get(i + 1)
            .is_some_and(|n| n.is_ascii_alphanumeric() || *n == '(');

        if colle_avant || colle_apres {
            out.push(c);
        } else {
            out.push_str(r"\frac{");
        }
    }

    out
}
