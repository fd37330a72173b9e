// src/noyau/reconnaissance.rs
//
// Réponse du service de reconnaissance (photo -> équation).
// Le noyau n’en consomme que deux chaînes : l’équation mise en forme et,
// si présente, la solution isolée (forme y=f(x) / x=f(y) à tracer).

use serde::Deserialize;

use super::classement::{Classement, TypeProbleme};
use super::notation::vers_notation;
use crate::graphe::trace::normaliser;

/// `solution` arrive sous trois formes : absente/null, une chaîne, ou une liste
/// (éléments éventuellement null).
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Solution {
    #[default]
    Aucune,
    Une(String),
    Plusieurs(Vec<Option<String>>),
}

impl Solution {
    fn lignes(&self) -> Vec<Option<&str>> {
        match self {
            Solution::Aucune => Vec::new(),
            Solution::Une(s) => vec![Some(s.as_str())],
            Solution::Plusieurs(v) => v.iter().map(|s| s.as_deref()).collect(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ReponseReconnaissance {
    pub formatted_equation: String,
    #[serde(default, deserialize_with = "solution_ou_null")]
    pub solution: Solution,
    // le service envoie parfois la clé mal orthographiée
    #[serde(default, alias = "isolated_solition")]
    pub isolated_solution: Option<String>,
}

fn solution_ou_null<'de, D>(d: D) -> Result<Solution, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Solution>::deserialize(d)?.unwrap_or_default())
}

impl ReponseReconnaissance {
    pub fn depuis_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn isolee(&self) -> Option<&str> {
        self.isolated_solution
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Chaîne à tracer : la solution isolée si elle existe, sinon l’équation
    /// elle-même quand elle a déjà la forme `y=…` / `x=…`.
    pub fn expression_a_tracer(&self) -> Option<String> {
        if let Some(s) = self.isolee() {
            return Some(s.to_string());
        }
        let n = normaliser(&self.formatted_equation);
        (n.starts_with("y=") || n.starts_with("x=")).then(|| self.formatted_equation.clone())
    }

    /// Lignes typographiques de la solution : `x = …`, `x_{1} = …`, `x_{2} = …`.
    pub fn lignes_solution(&self, classement: &Classement) -> Vec<String> {
        let lignes = self.solution.lignes();

        if classement.type_probleme == TypeProbleme::DeuxVariables || lignes.is_empty() {
            return self.isolee().map(vers_notation).into_iter().collect();
        }

        let plusieurs = lignes.len() > 1;
        lignes
            .into_iter()
            .enumerate()
            .map(|(i, s)| {
                let corps = s.map(vers_notation).unwrap_or_else(|| r"\text{No solution}".into());
                match classement.variable {
                    Some(v) if plusieurs => format!("{v}_{{{}}} = {corps}", i + 1),
                    Some(v) => format!("{v} = {corps}"),
                    None => corps,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::classement::classer;

    #[test]
    fn cle_mal_orthographiee() {
        let r = ReponseReconnaissance::depuis_json(
            r#"{"formatted_equation":"x+y=5","solution":[null],"isolated_solition":"y=5-x"}"#,
        )
        .unwrap();
        assert_eq!(r.isolated_solution.as_deref(), Some("y=5-x"));
        assert_eq!(r.solution, Solution::Plusieurs(vec![None]));
        assert_eq!(r.expression_a_tracer().as_deref(), Some("y=5-x"));
    }

    #[test]
    fn solution_absente_ou_chaine() {
        let r = ReponseReconnaissance::depuis_json(r#"{"formatted_equation":"2+2","solution":null}"#)
            .unwrap();
        assert_eq!(r.solution, Solution::Aucune);
        assert_eq!(r.expression_a_tracer(), None);

        let r = ReponseReconnaissance::depuis_json(r#"{"formatted_equation":"2+2","solution":"4"}"#)
            .unwrap();
        assert_eq!(r.solution, Solution::Une("4".into()));
    }

    #[test]
    fn equation_deja_tracable() {
        let r = ReponseReconnaissance::depuis_json(r#"{"formatted_equation":"y = x**2"}"#).unwrap();
        assert_eq!(r.expression_a_tracer().as_deref(), Some("y = x**2"));
    }

    #[test]
    fn lignes_indexees() {
        let r = ReponseReconnaissance::depuis_json(
            r#"{"formatted_equation":"x**2-4=0","solution":["2","-2"]}"#,
        )
        .unwrap();
        let c = classer(&r.formatted_equation);
        assert_eq!(r.lignes_solution(&c), vec!["x_{1} = 2", "x_{2} = -2"]);
    }

    #[test]
    fn ligne_unique_et_nulle() {
        let r = ReponseReconnaissance::depuis_json(
            r#"{"formatted_equation":"2*x+3=15","solution":["6"]}"#,
        )
        .unwrap();
        let c = classer(&r.formatted_equation);
        assert_eq!(r.lignes_solution(&c), vec!["x = 6"]);

        let r = ReponseReconnaissance::depuis_json(
            r#"{"formatted_equation":"2*x+3=15","solution":[null]}"#,
        )
        .unwrap();
        assert_eq!(r.lignes_solution(&c), vec![r"x = \text{No solution}"]);
    }

    #[test]
    fn deux_variables_affiche_isolee() {
        let r = ReponseReconnaissance::depuis_json(
            r#"{"formatted_equation":"x+y=5","solution":[],"isolated_solution":"y=5-x"}"#,
        )
        .unwrap();
        let c = classer(&r.formatted_equation);
        assert_eq!(r.lignes_solution(&c), vec!["y=5-x"]);
    }
}
