// src/app.rs
//
// Grapheur Q — module App (racine)
// --------------------------------
// Rôle:
// - Déclarer les sous-modules (etat.rs + vue.rs)
// - Ré-exporter AppGraphe (pour main.rs: use crate::app::AppGraphe;)
// - Fournir l’impl eframe::App (compatible NATIF + WEB)
//
// Important:
// - Enter est géré dans vue.rs (quand le champ a le focus).
// - Les gestes du graphe aussi (ils dépendent du rectangle alloué).

pub mod etat;
pub mod vue;

pub use etat::AppGraphe;

use eframe::egui;

impl eframe::App for AppGraphe {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ESC = effacer seulement l’entrée (comme bouton "C").
        let esc = ctx.input(|i| i.key_pressed(egui::Key::Escape));
        if esc {
            self.clear_entree();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.ui(ui);
        });
    }
}
