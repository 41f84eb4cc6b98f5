use gloo::storage::{LocalStorage, Storage};
use minesweeper_core::Preferences;

/// Three-digit LCD text, clamped to `-99..=999`.
pub(crate) fn format_for_counter(num: i32) -> String {
    match num {
        ..-99 => "-99".to_string(),
        -99..0 => format!("-{:02}", -num),
        0..1000 => format!("{:03}", num),
        1000.. => "999".to_string(),
    }
}

/// Helper function to use JavaScript's Math.random
pub(crate) fn js_random_seed() -> u64 {
    use js_sys::Math::random;
    u64::from_be_bytes([
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
    ])
}

/// Preferences are stored as raw strings, not through gloo's JSON wrapping, so each key
/// stays readable on its own.
pub(crate) fn load_preferences() -> Preferences {
    let storage = LocalStorage::raw();
    Preferences::load(|key| match storage.get_item(key) {
        Ok(value) => value,
        Err(err) => {
            log::error!("could not read {}: {:?}", key, err);
            None
        }
    })
}

pub(crate) fn save_preferences(prefs: &Preferences) {
    let storage = LocalStorage::raw();
    for (key, value) in prefs.entries() {
        if let Err(err) = storage.set_item(key, &value) {
            log::error!("could not save {}: {:?}", key, err);
        }
    }
}

/// Zooms the whole page through a CSS variable on the root element.
pub(crate) fn apply_scale(scale: u16) {
    use gloo::utils::document;
    let Some(html) = document().document_element() else {
        log::error!("document has no root element");
        return;
    };
    let style = format!("--scale: {}", f32::from(scale) / 100.);
    log::debug!("scale: {}%", scale);
    if let Err(err) = html.set_attribute("style", &style) {
        log::error!("failed to set scale: {:?}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_is_three_wide_and_clamped() {
        assert_eq!(format_for_counter(0), "000");
        assert_eq!(format_for_counter(7), "007");
        assert_eq!(format_for_counter(999), "999");
        assert_eq!(format_for_counter(1234), "999");
        assert_eq!(format_for_counter(-3), "-03");
        assert_eq!(format_for_counter(-99), "-99");
        assert_eq!(format_for_counter(-500), "-99");
    }
}
