use iced::color;
use iced::theme::Palette;
use iced::{Color, Theme};

use facecontour_core::overlay::domain::face_status::FaceStatus;

use crate::platform;

/// Resolve the iced Theme from the OS appearance.
pub fn resolve_theme(dark: bool) -> Theme {
    let palette = if dark { dark_palette() } else { light_palette() };
    Theme::custom("Face Contour", palette)
}

pub fn system_is_dark() -> bool {
    platform::is_dark_mode()
}

/// Status line colour: success when a face is tracked, muted otherwise.
pub fn status_color(theme: &Theme, status: FaceStatus) -> Color {
    let palette = theme.extended_palette();
    match status {
        FaceStatus::Detected => palette.success.base.color,
        FaceStatus::NotDetected => Color {
            a: 0.7,
            ..palette.background.base.text
        },
    }
}

pub fn warning_color(theme: &Theme) -> Color {
    theme.extended_palette().danger.base.color
}

fn dark_palette() -> Palette {
    Palette {
        background: color!(0x1c, 0x1c, 0x1e),
        text: color!(0xcc, 0xcc, 0xcc),
        primary: color!(0x5e, 0x9f, 0xf5),
        success: color!(0x30, 0xd1, 0x58),
        warning: color!(0xff, 0xcc, 0x00),
        danger: color!(0xff, 0x45, 0x3a),
    }
}

fn light_palette() -> Palette {
    Palette {
        background: color!(0xf5, 0xf5, 0xf7),
        text: color!(0x1d, 0x1d, 0x1f),
        primary: color!(0x34, 0x78, 0xf6),
        success: color!(0x34, 0xc7, 0x59),
        warning: color!(0xff, 0x9f, 0x0a),
        danger: color!(0xff, 0x3b, 0x30),
    }
}
