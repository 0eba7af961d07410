//! Editor toolbar: active tool, text style and the Apply button

use eframe::egui;
use pdfedit_core::Rgb;

pub const MIN_FONT_SIZE: f32 = 8.0;
pub const MAX_FONT_SIZE: f32 = 72.0;
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Select,
    Text,
    Highlight,
    Signature,
}

impl Tool {
    pub const ALL: [Tool; 4] = [Tool::Select, Tool::Text, Tool::Highlight, Tool::Signature];

    pub fn label(self) -> &'static str {
        match self {
            Tool::Select => "Select",
            Tool::Text => "Text",
            Tool::Highlight => "Highlight",
            Tool::Signature => "Signature",
        }
    }

    /// Status line hint shown when the tool becomes active.
    pub fn hint(self) -> &'static str {
        match self {
            Tool::Select => "Select mode. Click pages or use arrow keys to navigate.",
            Tool::Text => "Text tool selected. Click on PDF to place text.",
            Tool::Highlight => "Highlight tool selected. Drag over the PDF to highlight an area.",
            Tool::Signature => "Signature tool selected. Select certificate and password.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    ToolChanged(Tool),
    Apply,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toolbar {
    tool: Tool,
    font_size: f32,
    color: [f32; 3],
    /// `#RRGGBB` field beside the colour button.
    hex_input: String,
}

impl Default for Toolbar {
    fn default() -> Self {
        Self {
            tool: Tool::Select,
            font_size: DEFAULT_FONT_SIZE,
            color: Rgb::BLACK.components(),
            hex_input: Rgb::BLACK.to_hex(),
        }
    }
}

impl Toolbar {
    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) -> bool {
        let changed = self.tool != tool;
        self.tool = tool;
        changed
    }

    pub fn font_size(&self) -> f32 {
        self.font_size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
    }

    pub fn set_font_size(&mut self, size: f32) {
        self.font_size = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
    }

    pub fn text_color(&self) -> Rgb {
        Rgb::from(self.color)
    }

    /// Take a typed `#RRGGBB` colour. Invalid input restores the field to
    /// the current colour and returns false.
    pub fn set_hex_color(&mut self, input: &str) -> bool {
        let parsed = Rgb::from_hex(input);
        if let Some(color) = parsed {
            self.color = color.components();
        }
        self.hex_input = self.text_color().to_hex();
        parsed.is_some()
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, has_pending_changes: bool) -> Option<ToolbarAction> {
        let mut action = None;

        ui.horizontal(|ui| {
            ui.label("Tool:");
            for tool in Tool::ALL {
                if ui.selectable_label(self.tool == tool, tool.label()).clicked() && self.set_tool(tool) {
                    action = Some(ToolbarAction::ToolChanged(tool));
                }
            }

            ui.separator();
            ui.label("Font size:");
            ui.add(
                egui::DragValue::new(&mut self.font_size)
                    .range(MIN_FONT_SIZE..=MAX_FONT_SIZE)
                    .speed(0.5),
            );
            ui.label("Color:");
            if ui.color_edit_button_rgb(&mut self.color).changed() {
                self.hex_input = self.text_color().to_hex();
            }
            let hex = ui.add(egui::TextEdit::singleline(&mut self.hex_input).desired_width(64.0));
            if hex.lost_focus() {
                let input = std::mem::take(&mut self.hex_input);
                self.set_hex_color(&input);
            }

            ui.separator();
            let apply = ui.add_enabled(has_pending_changes, egui::Button::new("Apply Changes"));
            if apply.clicked() {
                action = Some(ToolbarAction::Apply);
            }
        });

        action
    }
}
