//! Theme switching for the quest board.

use dioxus::prelude::*;

/// Available color schemes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    /// Deep navy with neon accents
    #[default]
    Midnight,
    /// Light background for bright rooms
    Daylight,
}

impl Theme {
    /// Returns the `data-theme` attribute value.
    pub fn css_value(&self) -> &'static str {
        match self {
            Theme::Midnight => "midnight",
            Theme::Daylight => "daylight",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Theme::Midnight => "Midnight",
            Theme::Daylight => "Daylight",
        }
    }

    /// The other theme.
    pub fn toggled(&self) -> Self {
        match self {
            Theme::Midnight => Theme::Daylight,
            Theme::Daylight => Theme::Midnight,
        }
    }
}

/// Global signal for the current theme.
pub static CURRENT_THEME: GlobalSignal<Theme> = GlobalSignal::new(Theme::default);

/// Root component that applies the current theme.
#[component]
pub fn ThemedRoot(children: Element) -> Element {
    let theme = *CURRENT_THEME.read();
    rsx! {
        div {
            class: "themed-root",
            "data-theme": "{theme.css_value()}",
            {children}
        }
    }
}

/// Header button flipping between themes.
#[component]
pub fn ThemeToggle() -> Element {
    let next = CURRENT_THEME.read().toggled();
    rsx! {
        button {
            class: "theme-toggle",
            title: "Switch to {next.display_name()}",
            onclick: move |_| {
                let next = CURRENT_THEME.read().toggled();
                *CURRENT_THEME.write() = next;
            },
            if next == Theme::Daylight { "☀️" } else { "🌙" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_round_trip() {
        assert_eq!(Theme::default().toggled(), Theme::Daylight);
        assert_eq!(Theme::Daylight.toggled(), Theme::Midnight);
        assert_eq!(Theme::Daylight.css_value(), "daylight");
    }
}
