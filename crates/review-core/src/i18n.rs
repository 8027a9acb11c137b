//! Message catalogs and the `Translate` seam used by every status builder.
//!
//! Lookup order is: active locale, then the fallback locale, then the raw key.
//! `{name}` placeholders in a template are replaced from the supplied params;
//! unknown placeholders are left as written.

use std::collections::HashMap;

/// Resolves a message key to a localized, interpolated string.
///
/// Implemented for [`Translator`] and for any
/// `Fn(&str, &[(&str, String)]) -> String` closure.
pub trait Translate: Send + Sync {
    fn translate(&self, key: &str, params: &[(&str, String)]) -> String;
}

impl<F> Translate for F
where
    F: Fn(&str, &[(&str, String)]) -> String + Send + Sync,
{
    fn translate(&self, key: &str, params: &[(&str, String)]) -> String {
        self(key, params)
    }
}

pub const DEFAULT_LOCALE: &str = "en";

const EN: &[(&str, &str)] = &[
    ("batch.preview.success", "Batch preview ready."),
    ("batch.preview.error", "Batch preview failed: {error}"),
    ("batch.execute.success", "Batch execution started."),
    (
        "batch.execute.queued",
        "Batch queued. You can undo for {seconds} seconds.",
    ),
    ("batch.execute.canceled", "Batch execution canceled."),
    ("batch.execute.error", "Batch execution failed: {error}"),
    ("batch.export.done", "Report exported as {format}."),
    ("purge.preview.ready", "Purge preview ready for {asset_id}."),
    ("purge.preview.error", "Purge preview failed: {error}"),
    ("purge.success", "Asset {asset_id} purged."),
    ("purge.error", "Purge failed: {error}"),
    ("report.ready", "Report ready for {batch_id}."),
    ("report.error", "Report error: {error}"),
    (
        "transport.retrying",
        "Request failed, retrying (attempt {attempt} of {max}).",
    ),
    ("timeline.queued", "Queued"),
    ("timeline.running", "Running"),
    ("timeline.done", "Done"),
    ("timeline.failed", "Failed"),
];

const DE: &[(&str, &str)] = &[
    ("batch.preview.success", "Batch-Vorschau bereit."),
    ("batch.preview.error", "Batch-Vorschau fehlgeschlagen: {error}"),
    ("batch.execute.success", "Batch-Ausführung gestartet."),
    (
        "batch.execute.queued",
        "Batch eingereiht. Rückgängig machen ist {seconds} Sekunden lang möglich.",
    ),
    ("batch.execute.canceled", "Batch-Ausführung abgebrochen."),
    ("batch.execute.error", "Batch-Ausführung fehlgeschlagen: {error}"),
    ("batch.export.done", "Bericht als {format} exportiert."),
    ("purge.preview.ready", "Löschvorschau für {asset_id} bereit."),
    ("purge.preview.error", "Löschvorschau fehlgeschlagen: {error}"),
    ("purge.success", "Asset {asset_id} gelöscht."),
    ("purge.error", "Löschen fehlgeschlagen: {error}"),
    ("report.ready", "Bericht für {batch_id} bereit."),
    ("report.error", "Berichtsfehler: {error}"),
    ("timeline.queued", "Eingereiht"),
    ("timeline.running", "Läuft"),
    ("timeline.done", "Fertig"),
    ("timeline.failed", "Fehlgeschlagen"),
];

// ---------------------------------------------------------------------------
// Translator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Translator {
    locale: String,
    fallback_locale: String,
    catalogs: HashMap<String, HashMap<String, String>>,
}

impl Translator {
    /// A translator with the built-in `en` and `de` catalogs.
    pub fn new(locale: impl Into<String>) -> Self {
        let mut translator = Self {
            locale: locale.into(),
            fallback_locale: DEFAULT_LOCALE.to_string(),
            catalogs: HashMap::new(),
        };
        translator.add_catalog("en", EN.iter().copied());
        translator.add_catalog("de", DE.iter().copied());
        translator
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn with_fallback(mut self, locale: impl Into<String>) -> Self {
        self.fallback_locale = locale.into();
        self
    }

    /// Merge entries into a locale's catalog, overriding existing keys.
    pub fn add_catalog<'a>(
        &mut self,
        locale: &str,
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) {
        let catalog = self.catalogs.entry(locale.to_string()).or_default();
        for (key, value) in entries {
            catalog.insert(key.to_string(), value.to_string());
        }
    }

    pub fn has_locale(&self, locale: &str) -> bool {
        self.catalogs.contains_key(locale)
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        [&self.locale, &self.fallback_locale]
            .into_iter()
            .find_map(|locale| self.catalogs.get(locale.as_str())?.get(key))
            .map(String::as_str)
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE)
    }
}

impl Translate for Translator {
    fn translate(&self, key: &str, params: &[(&str, String)]) -> String {
        match self.lookup(key) {
            Some(template) => interpolate(template, params),
            None => key.to_string(),
        }
    }
}

/// Replace `{name}` placeholders with matching params.
pub fn interpolate(template: &str, params: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (name, value) in params {
        out = out.replace(&format!("{{{name}}}"), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_params() {
        let t = Translator::default();
        let msg = t.translate("report.ready", &[("batch_id", "b-7".to_string())]);
        assert_eq!(msg, "Report ready for b-7.");
    }

    #[test]
    fn falls_back_to_default_locale() {
        let t = Translator::new("de");
        // `transport.retrying` only exists in the English catalog
        let msg = t.translate(
            "transport.retrying",
            &[("attempt", "2".into()), ("max", "3".into())],
        );
        assert_eq!(msg, "Request failed, retrying (attempt 2 of 3).");
    }

    #[test]
    fn unknown_locale_uses_fallback() {
        let t = Translator::new("fr");
        assert_eq!(t.translate("timeline.done", &[]), "Done");
    }

    #[test]
    fn missing_key_returns_raw_key() {
        let t = Translator::new("de");
        assert_eq!(t.translate("nope.missing", &[]), "nope.missing");
    }

    #[test]
    fn closures_translate() {
        let t = |key: &str, _: &[(&str, String)]| format!("<{key}>");
        assert_eq!(Translate::translate(&t, "a.b", &[]), "<a.b>");
    }

    #[test]
    fn add_catalog_overrides_entries() {
        let mut t = Translator::default();
        t.add_catalog("en", [("timeline.done", "Finished")]);
        assert_eq!(t.translate("timeline.done", &[]), "Finished");
    }
}
