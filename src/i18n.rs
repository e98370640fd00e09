// src/i18n.rs
//
// Localization of the standard tour text elements.
// - Built-in dictionaries: en (default), ru
// - Optional override file: assets/i18n.json, format { "<lang>": { "key": "value" } }
// - Lookup: tr("key") / tr_with("key", [("name", "...")]) with {name} placeholders
//
// Language selection order: --lang CLI flag -> VTOUR_LANG env -> "lang" field
// of the tour config -> en.

use once_cell::sync::OnceCell;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::RwLock,
};

const FALLBACK_LANG: &str = "en";

const DICT_EN: &[(&str, &str)] = &[
    ("app.title", "Virtual tour"),
    ("waiter.loading", "Loading..."),
    ("photo.close", "Close"),
    ("tooltip.scene", "Scene name"),
    ("tooltip.fullscreen", "Switch fullscreen"),
    ("tooltip.version", "Powered by vtour"),
    ("tooltip.portal", "Go"),
    ("tooltip.photo", "Look closer"),
    ("tooltip.exit", "Exit"),
    ("exit.question", "Are you sure you want to close the tour?"),
    ("exit.yes", "Yes"),
    ("exit.no", "No"),
    ("scene.load_failed", "Failed to load the scene image"),
    ("file.filter.tours", "Tour files"),
];

const DICT_RU: &[(&str, &str)] = &[
    ("app.title", "Виртуальный тур"),
    ("waiter.loading", "Загрузка..."),
    ("photo.close", "Закрыть"),
    ("tooltip.scene", "Название сцены"),
    ("tooltip.fullscreen", "Переключить режим полного экрана"),
    ("tooltip.version", "Создано с использованием vtour"),
    ("tooltip.portal", "Перейти"),
    ("tooltip.photo", "Рассмотреть"),
    ("tooltip.exit", "Выйти"),
    ("exit.question", "Вы действительно хотите закончить виртуальный тур?"),
    ("exit.yes", "Да"),
    ("exit.no", "Нет"),
    ("scene.load_failed", "Не удалось загрузить изображение сцены"),
    ("file.filter.tours", "Файлы туров"),
];

struct I18n {
    map: HashMap<String, String>,
    fallback_map: HashMap<String, String>,
}

static I18N: OnceCell<RwLock<I18n>> = OnceCell::new();

fn builtin_dict(lang: &str) -> HashMap<String, String> {
    let table = match lang {
        "ru" => DICT_RU,
        _ => DICT_EN,
    };
    table
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Find assets/i18n.json next to the executable or in the working dir.
fn find_override_file() -> Option<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let p = dir.join("assets").join("i18n.json");
            if p.exists() {
                return Some(p);
            }
        }
    }

    let p = PathBuf::from("assets").join("i18n.json");
    if p.exists() {
        return Some(p);
    }

    None
}

fn load_override(path: &Path, lang: &str) -> Option<HashMap<String, String>> {
    let text = std::fs::read_to_string(path).ok()?;
    let all: HashMap<String, HashMap<String, String>> = serde_json::from_str(&text).ok()?;
    all.get(lang).cloned()
}

fn load_lang(lang: &str) -> HashMap<String, String> {
    let mut map = builtin_dict(lang);

    // file entries win over the built-in strings
    if let Some(path) = find_override_file() {
        if let Some(overrides) = load_override(&path, lang) {
            map.extend(overrides);
        }
    }

    map
}

/// Initialize global i18n. Safe to call multiple times; later calls overwrite
/// the current language maps.
pub fn init(lang: impl Into<String>) {
    let lang = lang.into();

    let map = load_lang(&lang);
    let fallback_map = if lang == FALLBACK_LANG {
        map.clone()
    } else {
        load_lang(FALLBACK_LANG)
    };

    let i = I18n { map, fallback_map };

    if let Some(lock) = I18N.get() {
        if let Ok(mut w) = lock.write() {
            *w = i;
        }
    } else {
        let _ = I18N.set(RwLock::new(i));
    }
}

fn get_locked() -> Option<std::sync::RwLockReadGuard<'static, I18n>> {
    I18N.get().and_then(|l| l.read().ok())
}

/// Get localized text by key. If key missing, returns the key itself.
pub fn tr(key: &str) -> String {
    let Some(i) = get_locked() else {
        return key.to_string();
    };

    if let Some(v) = i.map.get(key) {
        return v.clone();
    }
    if let Some(v) = i.fallback_map.get(key) {
        return v.clone();
    }
    key.to_string()
}

/// Get localized text and substitute `{name}` placeholders.
/// Any placeholder not provided is kept as-is.
pub fn tr_with(key: &str, args: &[(&str, String)]) -> String {
    let mut s = tr(key);
    for (k, v) in args {
        let placeholder = format!("{{{}}}", k);
        s = s.replace(&placeholder, v);
    }
    s
}

/// Choose language: `--lang <code>` CLI flag, then VTOUR_LANG, then the value
/// from the tour config.
pub fn resolve_lang(config_lang: &str) -> String {
    let mut it = std::env::args();
    while let Some(a) = it.next() {
        if a == "--lang" {
            if let Some(v) = it.next() {
                return v;
            }
        }
    }

    if let Ok(v) = std::env::var("VTOUR_LANG") {
        if !v.trim().is_empty() {
            return v;
        }
    }

    config_lang.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_dictionaries_cover_the_same_keys() {
        let en: Vec<_> = DICT_EN.iter().map(|(k, _)| *k).collect();
        let ru: Vec<_> = DICT_RU.iter().map(|(k, _)| *k).collect();
        assert_eq!(en, ru);
    }

    #[test]
    fn unknown_lang_falls_back_to_english() {
        let map = builtin_dict("de");
        assert_eq!(map.get("waiter.loading").unwrap(), "Loading...");
    }

    #[test]
    fn russian_dictionary_is_selected() {
        let map = builtin_dict("ru");
        assert_eq!(map.get("waiter.loading").unwrap(), "Загрузка...");
    }

    #[test]
    fn placeholder_substitution() {
        init("en");
        // missing key comes back verbatim, with placeholders substituted
        let s = tr_with("missing {what}", &[("what", "key".to_string())]);
        assert_eq!(s, "missing key");
    }
}
