use eframe::egui;

use crate::session::Session;
use crate::state::WidgetEvent;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub session: Session,
    /// Last rejected selection or export failure, shown in the top bar.
    pub status_message: Option<String>,
}

impl DashboardApp {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            status_message: None,
        }
    }

    /// Apply queued widget events in order. Each event is validated and
    /// fully recomputed before the next.
    pub fn dispatch(&mut self, events: Vec<WidgetEvent>) {
        for event in events {
            match self.session.handle(event) {
                Ok(_) => self.status_message = None,
                Err(e) => self.status_message = Some(e.to_string()),
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut events = Vec::new();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.session, &mut self.status_message);
        });

        // ---- Left side panel: widgets ----
        egui::SidePanel::left("widget_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &self.session, &mut events);
            });

        // ---- Central panel: report ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::central_panel(ui, &self.session);
        });

        if !events.is_empty() {
            self.dispatch(events);
            ctx.request_repaint();
        }
    }
}
