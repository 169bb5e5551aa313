// ui.rs - Controls and grid painter for the block-parallel engine

use std::time::{Duration, Instant};

use eframe::egui;
use egui::{Color32, Rect, Stroke, Vec2};
use conway_blocks::patterns;

use crate::GridViewer;

impl eframe::App for GridViewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Auto-update if running
        if self.is_running && self.last_update.elapsed() >= self.update_interval {
            self.update_generation();
            self.last_update = Instant::now();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Conway's Game of Life (Block Workers)");

            // Controls
            ui.horizontal(|ui| {
                let button_text = if self.is_running { "⏸ Pause" } else { "▶ Start" };
                let halted = self.engine.is_halted();
                if ui.add_enabled(!halted, egui::Button::new(button_text)).clicked() {
                    self.is_running = !self.is_running;
                    if self.is_running {
                        self.last_update = Instant::now();
                    }
                }

                if ui.add_enabled(!self.is_running && !halted, egui::Button::new("⏭ Step")).clicked() {
                    self.update_generation();
                }

                if ui.button("⟲ Reset").clicked() {
                    self.reset();
                }

                if ui.button("⏹ Clear").clicked() {
                    self.clear();
                }

                if ui.button("🎲 Random").clicked() {
                    self.apply_random_pattern();
                }

                ui.separator();

                // Pattern dropdown
                ui.label("Pattern:");
                egui::ComboBox::from_id_source("pattern_selector")
                    .selected_text(patterns::PATTERNS[self.selected_pattern].name)
                    .show_ui(ui, |ui| {
                        for (i, pattern) in patterns::PATTERNS.iter().enumerate() {
                            ui.selectable_value(&mut self.selected_pattern, i, pattern.name);
                        }
                    });

                if ui.button("Apply Pattern").clicked() {
                    self.apply_selected_pattern();
                }

                ui.separator();

                ui.label(format!("Generation: {}", self.frame.generation()));
            });

            ui.separator();

            // Speed control
            ui.horizontal(|ui| {
                ui.label("Speed:");
                let mut speed = 1000.0 / self.update_interval.as_millis().max(1) as f32;
                if ui.add(egui::Slider::new(&mut speed, 0.5..=60.0).suffix(" gen/sec")).changed() {
                    self.update_interval = Duration::from_millis((1000.0 / speed) as u64);
                }

                ui.separator();

                ui.label("Live:");
                ui.color_edit_button_srgba(&mut self.live_color);
                ui.label("Dead:");
                ui.color_edit_button_srgba(&mut self.dead_color);
                ui.checkbox(&mut self.show_blocks, "Block borders");
            });

            ui.separator();

            ui.label(format!(
                "{} x {} blocks of {} x {}, one worker thread each. Every block wraps onto itself.",
                self.layout.blocks_down(),
                self.layout.blocks_across(),
                self.layout.block_rows(),
                self.layout.block_cols(),
            ));
            ui.label("Click cells while paused to edit the seed; edits apply to every block.");

            if let Some(failure) = &self.failure {
                ui.colored_label(Color32::RED, format!("Engine halted: {failure}"));
            }

            ui.separator();

            // Fit the grid into what is left of the window
            let spacing = 0.5;
            let rows = self.layout.grid_rows();
            let cols = self.layout.grid_cols();
            let avail = ui.available_size();
            let box_size = ((avail.x / cols as f32).min(avail.y / rows as f32) - spacing).clamp(2.0, 15.0);

            let start_pos = ui.cursor().min;
            let total_size = Vec2::new(
                (box_size + spacing) * cols as f32 - spacing,
                (box_size + spacing) * rows as f32 - spacing,
            );

            let (response, painter) = ui.allocate_painter(total_size, egui::Sense::click());

            // Fill background
            painter.rect_filled(Rect::from_min_size(start_pos, total_size), 0.0, Color32::BLACK);

            let mut clicked = None;
            for row in 0..rows {
                for col in 0..cols {
                    let x = start_pos.x + col as f32 * (box_size + spacing);
                    let y = start_pos.y + row as f32 * (box_size + spacing);
                    let rect = Rect::from_min_size(egui::pos2(x, y), Vec2::splat(box_size));

                    let live = self.frame.get(row, col).is_some_and(|cell| cell.is_live());
                    let cell_color = if live { self.live_color } else { self.dead_color };
                    painter.rect_filled(rect, 1.0, cell_color);

                    if !self.is_running && response.clicked() {
                        if let Some(pos) = response.interact_pointer_pos() {
                            if rect.contains(pos) {
                                clicked = Some((row, col));
                            }
                        }
                    }
                }
            }

            if self.show_blocks {
                let step = box_size + spacing;
                for block in self.layout.blocks() {
                    let rect = Rect::from_min_size(
                        egui::pos2(
                            start_pos.x + block.col_offset as f32 * step,
                            start_pos.y + block.row_offset as f32 * step,
                        ),
                        Vec2::new(block.cols as f32 * step - spacing, block.rows as f32 * step - spacing),
                    );
                    painter.rect_stroke(rect, 0.0, Stroke::new(1.0, Color32::from_gray(140)));
                }
            }

            if let Some((row, col)) = clicked {
                self.toggle_cell(row, col);
            }

            ui.separator();

            // Statistics
            let total = self.frame.cells().len();
            let live_cells = self.frame.live_count();
            ui.horizontal(|ui| {
                ui.label(format!("Live cells: {}", live_cells));
                ui.label(format!("Dead cells: {}", total - live_cells));
                ui.label(format!("Population: {:.1}%", self.frame.population_ratio() * 100.0));
            });
        });

        // Request repaint if running to keep animation smooth
        if self.is_running {
            ctx.request_repaint();
        }
    }
}
