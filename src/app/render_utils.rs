use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    color.gamma_multiply(opacity.clamp(0.0, 1.0))
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + pan;

    let mut x = origin.x.rem_euclid(step);
    while x < rect.right() {
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70)),
        );
        x += step;
    }

    let mut y = origin.y.rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment(
            [Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70)),
        );
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

pub(super) fn lane_color(lane: usize, known_lanes: usize) -> Color32 {
    if lane >= known_lanes || known_lanes == 0 {
        return Color32::from_rgb(150, 150, 158);
    }

    let t = if known_lanes > 1 {
        lane as f32 / (known_lanes - 1) as f32
    } else {
        0.5
    };
    let r = (70.0 + (160.0 * t)) as u8;
    let g = (150.0 + (50.0 * (1.0 - (2.0 * t - 1.0).abs()))) as u8;
    let b = (225.0 - (165.0 * t)) as u8;
    Color32::from_rgb(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_and_world_coordinates_invert_each_other() {
        let rect = Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(200.0, 100.0));
        let pan = Vec2::new(12.0, -8.0);
        let world = Vec2::new(30.0, 5.0);
        let screen = world_to_screen(rect, pan, 1.5, world);
        let back = screen_to_world(rect, pan, 1.5, screen);
        assert!((back - world).length() < 1e-4);
    }

    #[test]
    fn opacity_fades_the_whole_color() {
        let base = Color32::from_rgb(200, 100, 50);
        assert_eq!(with_opacity(base, 1.0), base);
        let dimmed = with_opacity(base, 0.15);
        assert!((30..=45).contains(&dimmed.a()));
        assert!(dimmed.r() < base.r());
    }

    #[test]
    fn unknown_lanes_are_grey() {
        assert_eq!(lane_color(14, 14), Color32::from_rgb(150, 150, 158));
        assert_ne!(lane_color(0, 14), lane_color(13, 14));
    }
}
