// src/app/vue.rs
//
// Vue (UI egui) — natif + web
// ---------------------------
// Objectifs :
// - Même AppGraphe (etat.rs) pour natif + wasm
// - Clavier : Enter analyse (quand le champ est focus)
// - Graphe : glisser = déplacer, pincer / ctrl+molette = zoomer, cliquer = toucher
// - Repère canevas fixe (cote × cote) ramené à la taille du widget
//
// Note :
// - PAS de Key::NumEnter (n’existe pas dans egui 0.33.x)

use eframe::egui;
use egui::{Color32, Pos2, Rect, Sense, Shape, Stroke};

use super::etat::AppGraphe;
use crate::graphe::controleur::EtatGeste;
use crate::graphe::trace::PointCanevas;

/// Courbes proposées (boutons).
const EXEMPLES: [&str; 8] = [
    "y = 2x + 3",
    "y = x^2 - 4",
    "y = sin(x)",
    "y = tan(x)",
    "y = e^x",
    "y = sqrt(x)",
    "y = log(x)",
    "x = y^2",
];

/// Côté maximal du graphe à l’écran (points egui).
const COTE_GRAPHE_MAX: f32 = 560.0;

const COULEUR_COURBE: Color32 = Color32::from_rgb(0x1f, 0x77, 0xb4);
const COULEUR_POINT: Color32 = Color32::from_rgb(0xd6, 0x27, 0x28);

impl AppGraphe {
    /// UI principale : à appeler depuis eframe::App::update(...)
    pub fn ui(&mut self, ui: &mut egui::Ui) {
        ui.spacing_mut().item_spacing = egui::vec2(6.0, 6.0);

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading("Grapheur Q");
                ui.add_space(6.0);

                self.ui_entree(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.ui_resultats(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.ui_graphe(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.ui_demarche(ui);
                self.ui_reconnaissance(ui);
            });
    }

    fn ui_entree(&mut self, ui: &mut egui::Ui) {
        ui.label("Expression :");

        let resp = ui.add(
            egui::TextEdit::singleline(&mut self.entree)
                .desired_width(ui.available_width())
                .hint_text("Ex: y = x^2 - 4, x = y^2, 2x + 3 = 15, lim x \\to 0 sin(x)/x")
                .id_source("entree_edit")
                .code_editor(),
        );

        if self.focus_entree {
            resp.request_focus();
            self.focus_entree = false;
        }

        let enter = ui.input(|i| i.key_pressed(egui::Key::Enter));
        if resp.has_focus() && enter {
            self.analyser();
        }

        ui.add_space(6.0);

        ui.horizontal(|ui| {
            self.bouton_action(ui, "Tracer", "Classe, met en forme et trace", Action::Analyser);
            self.bouton_action(ui, "C", "Efface seulement l’entrée", Action::ClearEntree);
            self.bouton_action(ui, "AC", "Remise à zéro totale", Action::ResetTotal);
        });

        ui.add_space(4.0);

        ui.horizontal_wrapped(|ui| {
            for e in EXEMPLES {
                if ui.button(e).clicked() {
                    self.entree = e.to_string();
                    self.analyser();
                }
            }
        });

        if !self.erreur.is_empty() {
            ui.add_space(6.0);
            ui.colored_label(ui.visuals().error_fg_color, &self.erreur);
        }
    }

    fn ui_resultats(&mut self, ui: &mut egui::Ui) {
        let (libelle, consigne) = match &self.classement {
            Some(c) => (c.libelle(), c.consigne()),
            None => (String::new(), String::new()),
        };

        ui.label("Type :");
        Self::champ_monospace(ui, "type_out", &libelle, 1);
        ui.label(consigne);

        ui.add_space(6.0);

        ui.label("Notation :");
        Self::champ_monospace(ui, "notation_out", &self.notation, 1);

        if !self.solutions.is_empty() {
            ui.add_space(6.0);
            ui.label("Solution :");
            Self::champ_monospace(ui, "solutions_out", &self.solutions.join("\n"), 1);
        }
    }

    /* ------------------------ Graphe ------------------------ */

    fn ui_graphe(&mut self, ui: &mut egui::Ui) {
        let cote = ui.available_width().min(COTE_GRAPHE_MAX);
        let (resp, painter) = ui.allocate_painter(egui::vec2(cote, cote), Sense::click_and_drag());
        let rect = resp.rect;

        let cfg = *self.controleur.config();
        // points egui par unité de vue
        let k = rect.width() as f64 / cfg.cote_canevas();

        self.gestes(ui, &resp, rect, k);

        let painter = painter.with_clip_rect(rect);
        painter.rect_filled(rect, 0.0, ui.visuals().extreme_bg_color);

        let vers_ecran = |p: PointCanevas| -> Pos2 {
            let v = self.controleur.canevas_vers_vue(p);
            Pos2::new(
                rect.min.x + (v.x * k) as f32,
                rect.min.y + (v.y * k) as f32,
            )
        };

        // grille + axes
        let c = cfg.cote_canevas();
        let grille = Stroke::new(0.5, ui.visuals().weak_text_color().gamma_multiply(0.4));
        let axes = Stroke::new(1.5, ui.visuals().text_color());
        for i in 0..=cfg.nb_colonnes {
            let t = i as f64 * cfg.taille_carreau;
            painter.line_segment(
                [vers_ecran(PointCanevas { x: t, y: 0.0 }), vers_ecran(PointCanevas { x: t, y: c })],
                grille,
            );
            painter.line_segment(
                [vers_ecran(PointCanevas { x: 0.0, y: t }), vers_ecran(PointCanevas { x: c, y: t })],
                grille,
            );
        }
        painter.line_segment(
            [
                vers_ecran(PointCanevas { x: c / 2.0, y: 0.0 }),
                vers_ecran(PointCanevas { x: c / 2.0, y: c }),
            ],
            axes,
        );
        painter.line_segment(
            [
                vers_ecran(PointCanevas { x: 0.0, y: c / 2.0 }),
                vers_ecran(PointCanevas { x: c, y: c / 2.0 }),
            ],
            axes,
        );

        // courbe
        let trait_courbe = Stroke::new(2.0, COULEUR_COURBE);
        for segment in self.trace.segments() {
            let pts: Vec<Pos2> = segment.into_iter().map(vers_ecran).collect();
            if pts.len() == 1 {
                painter.circle_filled(pts[0], 1.0, COULEUR_COURBE);
            } else {
                painter.add(Shape::line(pts, trait_courbe));
            }
        }

        // sélection + guides
        if let Some(g) = self.controleur.guides() {
            let guide = Stroke::new(1.0, COULEUR_POINT);
            for (a, b) in [g.vertical, g.horizontal] {
                painter.extend(Shape::dashed_line(
                    &[vers_ecran(a), vers_ecran(b)],
                    guide,
                    6.0,
                    4.0,
                ));
            }
            painter.circle_filled(vers_ecran(g.vertical.1), 4.0, COULEUR_POINT);
        }

        // lecture
        ui.horizontal(|ui| match self.controleur.selection() {
            Some(p) => {
                ui.monospace(format!("x: {:.2}  y: {:.2}", p.valeur_x, p.valeur_y));
            }
            None => {
                ui.weak("Toucher la courbe pour lire un point");
            }
        });

        let domaine = self.domaine_sonde();
        ui.horizontal(|ui| {
            ui.label("Valeur en x =");
            ui.add(
                egui::DragValue::new(&mut self.sonde_x)
                    .speed(0.1)
                    .range(domaine),
            );
            match self.valeur_sonde() {
                Some(y) => ui.monospace(format!("y = {y:.4}")),
                None => ui.monospace("indisponible"),
            };
        });
    }

    /// Abscisses visibles à l’échelle 1.
    fn domaine_sonde(&self) -> std::ops::RangeInclusive<f64> {
        let c = self.controleur.config();
        let demi = c.cote_canevas() / 2.0 / c.taille_carreau;
        -demi..=demi
    }

    /// Gestes egui -> contrôleur (unités de vue = points egui / k).
    fn gestes(&mut self, ui: &egui::Ui, resp: &egui::Response, rect: Rect, k: f64) {
        // glissement
        if resp.drag_started() {
            self.cumul_glissement = (0.0, 0.0);
            self.controleur.debut_glissement();
        }
        if resp.dragged() {
            let d = resp.drag_delta();
            self.cumul_glissement.0 += d.x as f64 / k;
            self.cumul_glissement.1 += d.y as f64 / k;
            let (dx, dy) = self.cumul_glissement;
            self.controleur.maj_glissement(dx, dy);
        }
        if resp.drag_stopped() {
            self.controleur.fin_glissement();
        }

        // pincement (tactile ou ctrl+molette), seulement au-dessus du graphe
        let zoom = if resp.hovered() {
            ui.input(|i| i.zoom_delta()) as f64
        } else {
            1.0
        };
        let pincement_actif = matches!(
            self.controleur.geste(),
            EtatGeste::Actif {
                pincement: Some(_),
                ..
            }
        );
        if zoom != 1.0 {
            if !pincement_actif {
                self.cumul_pincement = 1.0;
                self.controleur.debut_pincement();
            }
            self.cumul_pincement *= zoom;
            self.controleur.maj_pincement(self.cumul_pincement);
        } else if pincement_actif {
            self.controleur.fin_pincement();
        }

        // toucher
        if resp.clicked() {
            if let Some(pos) = resp.interact_pointer_pos() {
                let vx = (pos.x - rect.min.x) as f64 / k;
                let vy = (pos.y - rect.min.y) as f64 / k;
                self.toucher(vx, vy);
            }
        }

        // glissement interrompu sans fin reçue (pointeur sorti de la fenêtre…)
        let glissement_orphelin = matches!(
            self.controleur.geste(),
            EtatGeste::Actif {
                glissement: Some(_),
                ..
            }
        ) && !resp.dragged()
            && !resp.drag_stopped();
        if glissement_orphelin {
            self.controleur.annuler();
        }
    }

    /* ------------------------ Panneaux ------------------------ */

    fn ui_demarche(&mut self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new("Démarche")
            .default_open(false)
            .show(ui, |ui| {
                Self::champ_demarche(ui, "Forme", "demarche_note", &self.demarche.note);
                Self::champ_demarche(ui, "Jetons", "demarche_jetons", &self.demarche.jetons);
                Self::champ_demarche(ui, "RPN", "demarche_rpn", &self.demarche.rpn);
                Self::champ_demarche(ui, "Arbre", "demarche_forme", &self.demarche.forme);
            });
    }

    fn ui_reconnaissance(&mut self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new("Réponse de reconnaissance (JSON)")
            .default_open(false)
            .show(ui, |ui| {
                ui.add(
                    egui::TextEdit::multiline(&mut self.json_reponse)
                        .desired_width(ui.available_width())
                        .desired_rows(4)
                        .hint_text(r#"{"formatted_equation": "x+y=5", "isolated_solution": "y=5-x"}"#)
                        .code_editor(),
                );
                self.bouton_action(ui, "Charger", "Charge la réponse", Action::ChargerJson);
            });
    }

    fn champ_demarche(ui: &mut egui::Ui, titre: &str, id: &str, contenu: &str) {
        ui.add_space(4.0);
        ui.label(format!("{titre} :"));
        Self::champ_monospace(ui, id, contenu, 1);
    }

    fn champ_monospace(ui: &mut egui::Ui, id: &str, contenu: &str, rows: usize) {
        egui::Frame::group(ui.style())
            .fill(ui.visuals().extreme_bg_color)
            .show(ui, |ui| {
                ui.push_id(id, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.set_min_height(
                        rows as f32 * ui.text_style_height(&egui::TextStyle::Monospace),
                    );
                    ui.monospace(contenu);
                });
            });
    }

    fn bouton_action(&mut self, ui: &mut egui::Ui, label: &str, tip: &str, action: Action) {
        let resp = ui
            .add_sized([64.0, 30.0], egui::Button::new(label))
            .on_hover_text(tip);

        if resp.clicked() {
            match action {
                Action::Analyser => self.analyser(),
                Action::ClearEntree => self.clear_entree(),
                Action::ResetTotal => self.reset_total(),
                Action::ChargerJson => self.charger_reponse_json(),
            }
            self.focus_entree = true;
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Action {
    Analyser,
    ClearEntree,
    ResetTotal,
    ChargerJson,
}
