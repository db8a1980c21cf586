use egui::Color32;

use crate::capture::StatusTone;

pub mod chart;
pub mod live;

pub(crate) const STATUS_GREEN: Color32 = Color32::from_rgb(0x2e, 0x7d, 0x32);
pub(crate) const STATUS_RED: Color32 = Color32::from_rgb(0xd3, 0x2f, 0x2f);
pub(crate) const ACCENT_BLUE: Color32 = Color32::from_rgb(0x0d, 0x6e, 0xfd);

pub(crate) fn status_color(tone: StatusTone) -> Color32 {
    match tone {
        StatusTone::Info => Color32::LIGHT_GRAY,
        StatusTone::Positive => STATUS_GREEN,
        StatusTone::Negative => STATUS_RED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tones_map_to_distinct_colors() {
        assert_eq!(status_color(StatusTone::Positive), STATUS_GREEN);
        assert_eq!(status_color(StatusTone::Negative), STATUS_RED);
        assert_ne!(
            status_color(StatusTone::Info),
            status_color(StatusTone::Positive)
        );
    }
}
