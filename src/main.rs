//! Ritual Studio RS - Main Application
//! Self-guided wellness ritual studio with egui GUI

mod animation;
mod audio;
mod config;
mod effects;
mod progress;
mod quiz;
mod session;
mod surface;

use audio::{AudioSystem, LoaderMessage, TrackInfo};
use config::AppConfig;
use eframe::egui;
use effects::{LungsEffect, ShieldEffect, TextDissolveEffect};
use progress::{HealingProgress, RITUAL_DAYS};
use quiz::{Quiz, MAX_ANSWER, MIN_ANSWER, QUESTIONS};
use session::{Cooldown, RitualSession, RELEASE_AFFIRMATION};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

/// Main application state
struct RitualStudioApp {
    config: AppConfig,
    progress: HealingProgress,
    audio_sys: AudioSystem,
    lungs: LungsEffect,
    shield: ShieldEffect,
    dissolve: TextDissolveEffect,
    session: RitualSession,
    quiz: Quiz,
    last_update: Instant,

    // UI state
    show_session: bool,
    show_diagnosis: bool,
    quiz_submitted: bool,
    release_text: String,
    release_affirmation_visible: bool,

    // Timers
    release_clear_timer: Cooldown,
    release_affirm_timer: Cooldown,
    shield_cooldown: Cooldown,

    // Track library state fed by the async loader
    track_info: HashMap<String, TrackInfo>,
    track_errors: HashMap<String, String>,
}

impl RitualStudioApp {
    fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Setup dark theme
        let mut visuals = egui::Visuals::dark();
        visuals.window_fill = egui::Color32::from_rgba_unmultiplied(15, 15, 25, 245);
        visuals.panel_fill = egui::Color32::from_rgba_unmultiplied(20, 20, 35, 240);
        cc.egui_ctx.set_visuals(visuals);

        let config = AppConfig::load_or_default("ritual-studio.json");
        let progress = HealingProgress::load(Path::new(&config.progress_path));

        let mut lungs = LungsEffect::new();
        lungs.set_healing_level(progress.healing_level());
        lungs.set_darkness(progress.darkness);

        let audio_sys = AudioSystem::new();
        // Probe the whole library up front, off the UI thread.
        for track in &config.audio.frequencies {
            audio_sys.request_load(&track.name, Path::new(&track.path));
        }
        audio_sys.request_load(
            &config.audio.ritual_track.name,
            Path::new(&config.audio.ritual_track.path),
        );

        Self {
            config,
            progress,
            audio_sys,
            lungs,
            shield: ShieldEffect::new(),
            dissolve: TextDissolveEffect::new(),
            session: RitualSession::new(),
            quiz: Quiz::default(),
            last_update: Instant::now(),
            show_session: false,
            show_diagnosis: false,
            quiz_submitted: false,
            release_text: String::new(),
            release_affirmation_visible: false,
            release_clear_timer: Cooldown::idle(),
            release_affirm_timer: Cooldown::idle(),
            shield_cooldown: Cooldown::idle(),
            track_info: HashMap::new(),
            track_errors: HashMap::new(),
        }
    }

    fn poll_audio_loader(&mut self) {
        for msg in self.audio_sys.poll_loader() {
            match msg {
                LoaderMessage::Loaded { name, info, .. } => {
                    log::info!("{name} ready ({:.0} s)", info.duration_secs);
                    self.track_info.insert(name, info);
                }
                LoaderMessage::Failed { name, error } => {
                    log::warn!("{name} unavailable: {error}");
                    self.track_errors.insert(name, error);
                }
            }
        }
    }

    fn play_track(&mut self, name: &str, path: &str) {
        if let Err(e) = self.audio_sys.play_looping(name, Path::new(path)) {
            // Absence of sound, not a failure of the ritual.
            log::warn!("nothing to play for {name}: {e}");
            self.track_errors.insert(name.to_string(), e.to_string());
        }
    }

    // ------------------------------------------------------------------
    // Daily ritual session
    // ------------------------------------------------------------------

    fn open_session(&mut self) {
        self.session.reset();
        self.show_session = true;
    }

    fn begin_or_resume_session(&mut self) {
        let ritual = self.config.audio.ritual_track.clone();
        if self.audio_sys.active_track() == Some(ritual.name.as_str()) {
            self.audio_sys.resume();
        } else {
            self.play_track(&ritual.name, &ritual.path);
        }
        if self.session.progress(&self.config.session) > 0.0 {
            self.session.resume();
        } else {
            self.session.start();
        }
    }

    fn pause_session(&mut self) {
        self.audio_sys.pause();
        self.session.pause();
    }

    fn close_session(&mut self) {
        self.session.reset();
        self.audio_sys.stop();
        self.show_session = false;
    }

    fn complete_session(&mut self) {
        self.audio_sys.pause();
        if let Some(day) = self.progress.mark_day_complete() {
            log::info!("day {day} of the journey complete");
        }
        if let Err(e) = self.progress.save(Path::new(&self.config.progress_path)) {
            log::warn!("failed to save progress: {e}");
        }
        self.lungs.set_healing_level(self.progress.healing_level());
    }

    // ------------------------------------------------------------------
    // Emotional release & shield
    // ------------------------------------------------------------------

    fn begin_release(&mut self) {
        if self.release_text.trim().is_empty() {
            return;
        }
        self.dissolve.dissolve(&self.config.dissolve);
        self.release_affirmation_visible = false;
        self.release_clear_timer
            .arm(self.config.session.release_clear_secs);
        self.release_affirm_timer
            .arm(self.config.session.release_affirmation_secs);
    }

    fn activate_shield(&mut self) {
        self.shield.start(&self.config.shield);
        self.shield_cooldown
            .arm(self.config.session.shield_cooldown_secs);
    }

    fn submit_quiz(&mut self) {
        let darkness = self.quiz.darkness();
        self.progress.set_darkness(darkness);
        if let Err(e) = self.progress.save(Path::new(&self.config.progress_path)) {
            log::warn!("failed to save progress: {e}");
        }
        self.lungs.set_darkness(darkness);
        self.quiz_submitted = true;
    }

    fn reset_quiz(&mut self) {
        self.quiz_submitted = false;
        self.quiz.reset();
    }
}

impl eframe::App for RitualStudioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_update).as_secs_f32();
        self.last_update = now;

        self.poll_audio_loader();

        // Session & release timers
        if self.session.tick(dt, &self.config.session) {
            self.complete_session();
        }
        if self.release_clear_timer.tick(dt) {
            self.release_text.clear();
        }
        if self.release_affirm_timer.tick(dt) {
            self.release_affirmation_visible = true;
        }
        self.shield_cooldown.tick(dt);

        // UI layout
        self.render_top_bar(ctx);
        self.render_journey_panel(ctx);
        let animating = self.render_ritual_space(ctx, dt);
        self.render_session_window(ctx);
        self.render_diagnosis_window(ctx);

        // One pending frame at most: repaint only while something moves.
        let timers_active = self.session.is_running()
            || self.shield_cooldown.is_active()
            || self.release_clear_timer.is_active()
            || self.release_affirm_timer.is_active();
        if animating || timers_active {
            ctx.request_repaint();
        }
    }
}

impl RitualStudioApp {
    fn render_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("🕊 Ritual Studio RS");
                ui.separator();
                ui.label(format!("Day {}/{}", self.progress.days.len(), RITUAL_DAYS));
                ui.separator();
                ui.label(format!("Darkness {:.2}", self.lungs.darkness()));
            });
        });
    }

    fn render_journey_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("journey_panel")
            .min_width(260.0)
            .show(ctx, |ui| {
                ui.add_space(6.0);
                ui.heading("21-Day Healing Journey");
                ui.add_space(4.0);
                self.draw_calendar(ui);

                ui.separator();
                ui.heading("Healing Frequencies");
                ui.add_space(4.0);
                for track in self.config.audio.frequencies.clone() {
                    ui.horizontal(|ui| {
                        ui.label(&track.name);
                        if let Some(info) = self.track_info.get(&track.name) {
                            ui.weak(format!("{:.0} s", info.duration_secs));
                        }
                        ui.with_layout(
                            egui::Layout::right_to_left(egui::Align::Center),
                            |ui| {
                                if let Some(err) = self.track_errors.get(&track.name) {
                                    ui.weak("unavailable").on_hover_text(err.clone());
                                } else if self.audio_sys.active_track()
                                    == Some(track.name.as_str())
                                {
                                    if ui.button("⏹ Stop").clicked() {
                                        self.audio_sys.stop();
                                    }
                                } else if ui.button("▶ Play").clicked() {
                                    self.play_track(&track.name, &track.path);
                                }
                            },
                        );
                    });
                }

                ui.separator();
                if ui.button("🌬 Begin Daily Ritual").clicked() {
                    self.open_session();
                }
                ui.add_space(4.0);
                if ui.button("🔮 Energetic Diagnosis").clicked() {
                    self.show_diagnosis = true;
                }
            });
    }

    fn draw_calendar(&self, ui: &mut egui::Ui) {
        egui::Grid::new("calendar").spacing([4.0, 4.0]).show(ui, |ui| {
            for day in 1..=RITUAL_DAYS {
                let done = self.progress.is_day_complete(day);
                let (rect, _) =
                    ui.allocate_exact_size(egui::Vec2::splat(30.0), egui::Sense::hover());
                let fill = if done {
                    effects::gold_fill(0.9)
                } else {
                    egui::Color32::from_rgb(30, 30, 45)
                };
                let text_color = if done {
                    egui::Color32::BLACK
                } else {
                    egui::Color32::GRAY
                };
                ui.painter().rect_filled(rect, 4.0, fill);
                ui.painter().text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    day.to_string(),
                    egui::FontId::proportional(12.0),
                    text_color,
                );
                if day % 7 == 0 {
                    ui.end_row();
                }
            }
        });
    }

    /// Central panel: lungs canvas on top, release and shield zones below.
    /// Returns true while any effect still wants frames.
    fn render_ritual_space(&mut self, ctx: &egui::Context, dt: f32) -> bool {
        let mut animating = false;
        egui::CentralPanel::default().show(ctx, |ui| {
            let avail = ui.available_size();
            let lungs_h = (avail.y - 250.0).max(140.0);

            let (lungs_rect, _) =
                ui.allocate_exact_size(egui::Vec2::new(avail.x, lungs_h), egui::Sense::hover());
            let painter = ui.painter_at(lungs_rect);
            painter.rect_filled(lungs_rect, 8.0, egui::Color32::from_rgb(12, 12, 22));
            animating |= self.lungs.frame(dt, &painter, lungs_rect, &self.config.lungs);
            if !self.lungs.is_active() {
                // First frame: the surface just adopted a real extent.
                self.lungs.start(&self.config.lungs);
                animating = true;
            }

            ui.add_space(8.0);
            ui.columns(2, |cols| {
                // Emotional release
                cols[0].label("Unspoken Words");
                cols[0].add(
                    egui::TextEdit::multiline(&mut self.release_text)
                        .desired_rows(3)
                        .desired_width(f32::INFINITY)
                        .hint_text("Write what weighs on you..."),
                );
                let can_release = !self.release_text.trim().is_empty()
                    && !self.release_affirm_timer.is_active();
                if cols[0]
                    .add_enabled(can_release, egui::Button::new("✨ Transmute & Release"))
                    .clicked()
                {
                    self.begin_release();
                }
                if self.release_affirmation_visible {
                    cols[0].label(
                        egui::RichText::new(RELEASE_AFFIRMATION)
                            .italics()
                            .color(effects::gold_fill(1.0)),
                    );
                }
                let (rect, _) = cols[0].allocate_exact_size(
                    egui::Vec2::new(cols[0].available_width(), 100.0),
                    egui::Sense::hover(),
                );
                let painter = cols[0].painter_at(rect);
                painter.rect_filled(rect, 8.0, egui::Color32::from_rgb(12, 12, 22));
                animating |= self.dissolve.frame(dt, &painter, rect, &self.config.dissolve);

                // Protective shield
                cols[1].label("Protective Shield");
                let shield_ready = !self.shield_cooldown.is_active();
                if cols[1]
                    .add_enabled(shield_ready, egui::Button::new("🛡 Activate Shield"))
                    .clicked()
                {
                    self.activate_shield();
                }
                let (rect, _) = cols[1].allocate_exact_size(
                    egui::Vec2::new(cols[1].available_width(), 160.0),
                    egui::Sense::hover(),
                );
                let painter = cols[1].painter_at(rect);
                painter.rect_filled(rect, 8.0, egui::Color32::from_rgb(12, 12, 22));
                animating |= self.shield.frame(dt, &painter, rect, &self.config.shield);
            });
        });
        animating
    }

    fn render_session_window(&mut self, ctx: &egui::Context) {
        if !self.show_session {
            return;
        }
        let mut open = true;
        egui::Window::new("Daily Ritual")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                let affirmation = if self.session.is_complete() {
                    "Daily ritual complete! Well done."
                } else if self.session.is_running() {
                    self.session.affirmation(&self.config.session)
                } else {
                    "Breathe deeply, then press play."
                };
                ui.label(egui::RichText::new(affirmation).italics().size(16.0));
                ui.add_space(8.0);

                let progress = self.session.progress(&self.config.session);
                ui.add(egui::ProgressBar::new(progress).show_percentage());
                ui.add_space(8.0);

                if self.session.is_complete() {
                    if ui.button("Close").clicked() {
                        self.close_session();
                    }
                } else if self.session.is_running() {
                    if ui.button("⏸ Pause").clicked() {
                        self.pause_session();
                    }
                } else if ui.button("▶ Play").clicked() {
                    self.begin_or_resume_session();
                }
            });
        if !open {
            self.close_session();
        }
    }

    fn render_diagnosis_window(&mut self, ctx: &egui::Context) {
        if !self.show_diagnosis {
            return;
        }
        let mut open = true;
        egui::Window::new("Energetic Diagnosis")
            .open(&mut open)
            .vscroll(true)
            .default_width(420.0)
            .show(ctx, |ui| {
                if !self.quiz_submitted {
                    ui.label("Answer each on a scale of 1 to 5.");
                    ui.add_space(6.0);
                    for (i, question) in QUESTIONS.iter().enumerate() {
                        ui.label(*question);
                        ui.add(egui::Slider::new(
                            &mut self.quiz.answers[i],
                            MIN_ANSWER..=MAX_ANSWER,
                        ));
                        ui.add_space(6.0);
                    }
                    if ui.button("Submit").clicked() {
                        self.submit_quiz();
                    }
                } else {
                    ui.label(self.quiz.result_text());
                    ui.add_space(8.0);
                    ui.weak(
                        "Your healing journey will now reflect this reading. \
                         You can retake the diagnosis anytime.",
                    );
                    ui.add_space(8.0);
                    if ui.button("Close").clicked() {
                        self.show_diagnosis = false;
                        self.reset_quiz();
                    }
                }
            });
        if !open {
            self.show_diagnosis = false;
            if self.quiz_submitted {
                self.reset_quiz();
            }
        }
    }
}

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_title("Ritual Studio RS")
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Ritual Studio RS",
        options,
        Box::new(|cc| Box::new(RitualStudioApp::new(cc))),
    )
}
