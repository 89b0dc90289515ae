use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, RichText, Sense, Ui};

use startup_benchmark::data::aggregate::format_thousands;
use startup_benchmark::data::project::TreemapNode;
use startup_benchmark::state::AppState;

const TREEMAP_HEIGHT: f32 = 360.0;
const HEADER_HEIGHT: f32 = 16.0;

/// A placed node: where it goes and what it shows.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub rect: Rect,
    pub depth: usize,
    pub label: String,
    /// Industry the tile belongs to (for its colour).
    pub industry: String,
    pub value: f64,
}

/// Slice-and-dice layout: split horizontally at even depths and vertically
/// at odd ones, each child getting a share proportional to its value. Inner
/// nodes reserve a header strip for their label.
pub fn layout(root: &TreemapNode, rect: Rect) -> Vec<Tile> {
    let mut tiles = Vec::new();
    place_children(root, rect, 0, "", &mut tiles);
    tiles
}

fn place_children(node: &TreemapNode, rect: Rect, depth: usize, industry: &str, out: &mut Vec<Tile>) {
    let total: f64 = node.children.iter().map(|c| c.value.max(0.0)).sum();
    if total <= 0.0 {
        return;
    }

    let horizontal = depth % 2 == 0;
    let mut offset = 0.0f32;
    for child in &node.children {
        let share = (child.value.max(0.0) / total) as f32;
        if share <= 0.0 {
            continue;
        }
        let child_rect = if horizontal {
            let w = rect.width() * share;
            let r = Rect::from_min_size(
                Pos2::new(rect.min.x + offset, rect.min.y),
                egui::vec2(w, rect.height()),
            );
            offset += w;
            r
        } else {
            let h = rect.height() * share;
            let r = Rect::from_min_size(
                Pos2::new(rect.min.x, rect.min.y + offset),
                egui::vec2(rect.width(), h),
            );
            offset += h;
            r
        };

        let industry = if depth == 0 { child.label.as_str() } else { industry };
        out.push(Tile {
            rect: child_rect,
            depth,
            label: child.label.clone(),
            industry: industry.to_string(),
            value: child.value,
        });

        if !child.is_leaf() {
            let mut inner = child_rect.shrink(2.0);
            inner.min.y = (inner.min.y + HEADER_HEIGHT).min(inner.max.y);
            place_children(child, inner, depth + 1, industry, out);
        }
    }
}

/// Paint the industry → revenue model → company hierarchy.
pub fn treemap_chart(ui: &mut Ui, state: &AppState, root: &TreemapNode) {
    let (rect, response) = ui.allocate_exact_size(
        egui::vec2(ui.available_width(), TREEMAP_HEIGHT),
        Sense::hover(),
    );
    let painter = ui.painter_at(rect);
    let tiles = layout(root, rect);
    let hover_pos = response.hover_pos();
    let mut hovered: Option<&Tile> = None;

    for tile in &tiles {
        let base = state.industry_colors.color_for(&tile.industry);
        // Deeper levels fade so nesting stays readable.
        let fill = base.gamma_multiply(1.0 - 0.25 * tile.depth as f32);
        painter.rect_filled(tile.rect, 0.0, Color32::from_gray(30));
        painter.rect_filled(tile.rect.shrink(1.0), 2.0, fill);

        if tile.rect.width() > 40.0 && tile.rect.height() > 14.0 {
            painter.text(
                tile.rect.min + egui::vec2(4.0, 2.0),
                Align2::LEFT_TOP,
                &tile.label,
                FontId::proportional(12.0),
                Color32::BLACK,
            );
        }

        if hover_pos.is_some_and(|p| tile.rect.contains(p)) {
            // Later tiles are deeper, so the last hit is the most specific.
            hovered = Some(tile);
        }
    }

    if let Some(tile) = hovered {
        let text = format!("{}\nARR (USD): {}", tile.label, format_thousands(tile.value, 0));
        response.on_hover_text(text);
    }

    industry_legend(ui, state);
}

/// One swatch per industry, in the colours the tiles use.
fn industry_legend(ui: &mut Ui, state: &AppState) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (label, color) in state.industry_colors.legend_entries() {
            ui.label(RichText::new("■").color(color));
            ui.label(label);
            ui.add_space(8.0);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(label: &str, value: f64) -> TreemapNode {
        TreemapNode {
            label: label.into(),
            value,
            children: Vec::new(),
        }
    }

    #[test]
    fn shares_follow_values() {
        let root = TreemapNode {
            label: "All".into(),
            value: 4.0,
            children: vec![leaf("Edtech", 1.0), leaf("Fintech", 3.0)],
        };
        let tiles = layout(&root, Rect::from_min_size(Pos2::ZERO, egui::vec2(400.0, 100.0)));
        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles[0].rect.width(), 100.0);
        assert_eq!(tiles[1].rect.width(), 300.0);
        assert_eq!(tiles[1].rect.min.x, 100.0);
        assert_eq!(tiles[1].industry, "Fintech");
    }

    #[test]
    fn zero_total_places_nothing() {
        let root = TreemapNode {
            label: "All".into(),
            value: 0.0,
            children: vec![leaf("Edtech", 0.0)],
        };
        let tiles = layout(&root, Rect::from_min_size(Pos2::ZERO, egui::vec2(10.0, 10.0)));
        assert!(tiles.is_empty());
    }
}
