//! Compiled template snapshots with TTL-driven reload.

use super::context::{CoverLetterSlots, ProfileSlots};
use super::filters;
use super::registry::{builtin_source, TemplateKind, TemplateRegistry, LAYOUTS};
use crate::config::TemplateConfig;
use crate::error::{Error, Result};
use crate::model::{CandidateProfile, CoverLetter, Subject};
use arc_swap::ArcSwap;
use minijinja::{AutoEscape, Environment};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// An immutable set of compiled templates.
struct Snapshot {
    env: Arc<Environment<'static>>,
    loaded_at: Instant,
}

impl Snapshot {
    fn build(config: &TemplateConfig) -> Result<Self> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.add_filter("plain", filters::plain);
        env.add_filter("lines", filters::lines);
        env.add_filter("paragraphs", filters::paragraphs);

        for &(name, source) in LAYOUTS {
            env.add_template(name, source)?;
        }

        let mut overridden = 0usize;
        for (_, id) in TemplateRegistry::all() {
            let override_source = match &config.template_dir {
                Some(dir) => read_override(dir, id)?,
                None => None,
            };
            match override_source {
                Some(source) => {
                    env.add_template_owned(id.to_string(), source)?;
                    overridden += 1;
                }
                None => {
                    let source = builtin_source(id)
                        .ok_or_else(|| Error::TemplateNotFound(id.to_string()))?;
                    env.add_template(id, source)?;
                }
            }
        }

        log::debug!("Compiled template snapshot ({overridden} overridden from disk)");
        Ok(Self {
            env: Arc::new(env),
            loaded_at: Instant::now(),
        })
    }

    /// Same templates, age reset.
    fn restamped(&self) -> Self {
        Self {
            env: Arc::clone(&self.env),
            loaded_at: Instant::now(),
        }
    }
}

/// Clears the reload flag when the rebuilding reader is done.
struct ReloadGuard<'a>(&'a AtomicBool);

impl Drop for ReloadGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Reads `<dir>/<id>.html` if present. `id` must already be allow-listed.
fn read_override(dir: &Path, id: &str) -> Result<Option<String>> {
    let path = dir.join(format!("{id}.html"));
    if !path.is_file() {
        return Ok(None);
    }
    log::debug!("Loading template override {}", path.display());
    Ok(Some(std::fs::read_to_string(&path)?))
}

/// Thread-safe template store.
///
/// Readers load the current snapshot without locking. When a snapshot is
/// older than the configured TTL the next reader rebuilds it and swaps the
/// whole set in at once; renders already in flight keep the snapshot they
/// started with. Only one reader rebuilds at a time; the others keep using
/// the expired snapshot meanwhile. If a rebuild fails the previous templates
/// stay in service for another full TTL before the next attempt.
pub struct TemplateStore {
    config: TemplateConfig,
    snapshot: ArcSwap<Snapshot>,
    reloading: AtomicBool,
    builds: AtomicUsize,
}

impl TemplateStore {
    /// Compiles every registered template.
    ///
    /// # Errors
    ///
    /// Fails if an override file cannot be read or a template does not
    /// compile.
    pub fn new(config: TemplateConfig) -> Result<Self> {
        let snapshot = Snapshot::build(&config)?;
        log::info!(
            "Template store ready: {} templates, ttl {:?}",
            TemplateRegistry::all().count(),
            config.ttl
        );
        Ok(Self {
            config,
            snapshot: ArcSwap::from_pointee(snapshot),
            reloading: AtomicBool::new(false),
            builds: AtomicUsize::new(1),
        })
    }

    /// Store using only the built-in templates.
    pub fn builtin() -> Result<Self> {
        Self::new(TemplateConfig::default())
    }

    /// The settings this store was built with.
    pub fn config(&self) -> &TemplateConfig {
        &self.config
    }

    /// Rebuilds the snapshot now, regardless of age.
    pub fn reload(&self) -> Result<()> {
        self.builds.fetch_add(1, Ordering::Relaxed);
        let snapshot = Snapshot::build(&self.config)?;
        self.snapshot.store(Arc::new(snapshot));
        log::info!("Template snapshot reloaded");
        Ok(())
    }

    /// Number of snapshot builds attempted, the initial one included.
    pub fn build_attempts(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    /// Time since the current snapshot was built.
    pub fn snapshot_age(&self) -> std::time::Duration {
        self.snapshot.load().loaded_at.elapsed()
    }

    fn current(&self) -> Arc<Snapshot> {
        let snapshot = self.snapshot.load_full();
        if snapshot.loaded_at.elapsed() < self.config.ttl {
            return snapshot;
        }
        if self
            .reloading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return snapshot;
        }
        let _guard = ReloadGuard(&self.reloading);

        match self.reload() {
            Ok(()) => self.snapshot.load_full(),
            Err(err) => {
                log::warn!("Template reload failed, keeping previous snapshot: {err}");
                let kept = Arc::new(snapshot.restamped());
                self.snapshot.store(Arc::clone(&kept));
                kept
            }
        }
    }

    /// Binds a profile onto a profile template.
    ///
    /// # Errors
    ///
    /// [`Error::TemplateNotFound`] if `id` is not a registered profile
    /// template; [`Error::Render`] if the engine fails.
    pub fn render_profile(&self, id: &str, profile: &CandidateProfile) -> Result<String> {
        let id = TemplateRegistry::resolve(TemplateKind::Profile, id)?;
        self.render_slots(id, ProfileSlots::from(profile))
    }

    /// Binds a cover letter onto a cover-letter template.
    ///
    /// Unset closing fields fall back to "Sincerely," and the header name.
    pub fn render_cover_letter(&self, id: &str, letter: &CoverLetter) -> Result<String> {
        let id = TemplateRegistry::resolve(TemplateKind::CoverLetter, id)?;
        self.render_slots(id, CoverLetterSlots::from(letter))
    }

    /// Renders whichever kind of subject is given.
    pub fn render(&self, id: &str, subject: &Subject) -> Result<String> {
        match subject {
            Subject::Profile(profile) => self.render_profile(id, profile),
            Subject::CoverLetter(letter) => self.render_cover_letter(id, letter),
        }
    }

    fn render_slots<S: Serialize>(&self, id: &'static str, slots: S) -> Result<String> {
        let snapshot = self.current();
        let template = snapshot.env.get_template(id)?;
        let markup = template.render(slots)?;
        log::debug!("Rendered template {id}: {} bytes", markup.len());
        Ok(markup)
    }
}

impl fmt::Debug for TemplateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateStore")
            .field("config", &self.config)
            .field("snapshot_age", &self.snapshot_age())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CoverLetterHeader, Education, Experience};
    use crate::render::check_well_formed;
    use std::time::Duration;

    fn profile() -> CandidateProfile {
        let mut profile = CandidateProfile::new("John Doe");
        profile.email = Some("john.doe@example.com".into());
        profile.phone = Some("555-0100".into());
        profile.summary = Some("<p>Backend engineer &amp; mentor</p>".into());
        profile.skills = vec!["Java".into(), "AWS".into()];
        profile.experience = vec![Experience::new(
            "Senior Engineer",
            "Tech <Corp>",
            "2020-Present",
            "Led development.<br>- Shipped v2.",
        )];
        profile.education = vec![Education::new("B.Sc.", "MIT", "2015")];
        profile.certifications = vec!["AWS SA".into()];
        profile
    }

    fn letter() -> CoverLetter {
        CoverLetter::new(
            CoverLetterHeader {
                name: "Sarah Johnson".into(),
                email: "sarah@example.com".into(),
                phone: "555-0100".into(),
                date: "March 3, 2025".into(),
            },
            vec!["I am <em>excited</em> to apply.".into(), "Thank you.".into()],
        )
    }

    #[test]
    fn test_every_profile_template_renders_well_formed() {
        let store = TemplateStore::builtin().unwrap();
        for id in TemplateRegistry::ids(TemplateKind::Profile) {
            let markup = store.render_profile(id, &profile()).unwrap();
            check_well_formed(&markup).unwrap_or_else(|e| panic!("{id}: {e}"));
            assert!(markup.contains("John Doe"), "{id}");
            assert!(markup.contains("Tech &lt;Corp&gt;"), "{id} must escape values");
            assert!(markup.contains("Shipped v2."), "{id}");
            assert!(!markup.contains("<br>"), "{id}");
        }
    }

    #[test]
    fn test_every_cover_letter_template_renders_well_formed() {
        let store = TemplateStore::builtin().unwrap();
        let letter = letter().with_defaults();
        for id in TemplateRegistry::ids(TemplateKind::CoverLetter) {
            let markup = store.render_cover_letter(id, &letter).unwrap();
            check_well_formed(&markup).unwrap_or_else(|e| panic!("{id}: {e}"));
            assert!(markup.contains("Dear Hiring Manager,"), "{id}");
            assert!(markup.contains("Hiring Team"), "{id}");
            assert!(markup.contains("I am excited to apply."), "{id}");
            assert!(markup.contains("Sincerely,"), "{id}");
        }
    }

    #[test]
    fn test_optional_sections_omitted() {
        let store = TemplateStore::builtin().unwrap();
        let markup = store
            .render_profile("profile_template", &CandidateProfile::new("Jane"))
            .unwrap();
        check_well_formed(&markup).unwrap();
        assert!(!markup.contains("Experience"));
        assert!(!markup.contains("Certifications"));
    }

    #[test]
    fn test_unknown_template() {
        let store = TemplateStore::builtin().unwrap();
        let err = store.render_profile("fancy_template", &profile()).unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound(_)));

        let err = store
            .render_cover_letter("profile_template", &letter())
            .unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound(_)));

        let err = store
            .render_cover_letter("cover_letter_base", &letter())
            .unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound(_)));
    }

    #[test]
    fn test_render_dispatches_on_subject() {
        let store = TemplateStore::builtin().unwrap();
        let subject = Subject::from(letter());
        assert!(store.render("cover_letter_expert_001", &subject).is_ok());
        assert!(store.render("profile_template", &subject).is_err());
    }

    #[test]
    fn test_directory_override_only_for_registered_ids() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("profile_template.html"),
            "<html><body><h1>Custom {{ name }}</h1></body></html>",
        )
        .unwrap();
        std::fs::write(dir.path().join("evil.html"), "<p>{{ name }}</p>").unwrap();

        let store =
            TemplateStore::new(TemplateConfig::new().with_template_dir(dir.path())).unwrap();
        let markup = store.render_profile("profile_template", &profile()).unwrap();
        assert_eq!(markup, "<html><body><h1>Custom John Doe</h1></body></html>");

        // ids without an override file keep their built-in source
        let modern = store
            .render_profile("modern_profile_template", &profile())
            .unwrap();
        assert!(modern.contains("John Doe"));

        assert!(matches!(
            store.render_profile("evil", &profile()),
            Err(Error::TemplateNotFound(_))
        ));
        assert!(matches!(
            store.render_profile("../evil", &profile()),
            Err(Error::TemplateNotFound(_))
        ));
    }

    #[test]
    fn test_ttl_expiry_swaps_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile_template.html");
        std::fs::write(&path, "<p>v1 {{ name }}</p>").unwrap();

        let config = TemplateConfig::new()
            .with_template_dir(dir.path())
            .with_ttl(Duration::ZERO);
        let store = TemplateStore::new(config).unwrap();
        assert_eq!(
            store.render_profile("profile_template", &profile()).unwrap(),
            "<p>v1 John Doe</p>"
        );

        std::fs::write(&path, "<p>v2 {{ name }}</p>").unwrap();
        assert_eq!(
            store.render_profile("profile_template", &profile()).unwrap(),
            "<p>v2 John Doe</p>"
        );
    }

    #[test]
    fn test_snapshot_kept_until_ttl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile_template.html");
        std::fs::write(&path, "<p>v1</p>").unwrap();

        let config = TemplateConfig::new()
            .with_template_dir(dir.path())
            .with_ttl(Duration::from_secs(3600));
        let store = TemplateStore::new(config).unwrap();

        std::fs::write(&path, "<p>v2</p>").unwrap();
        assert_eq!(
            store.render_profile("profile_template", &profile()).unwrap(),
            "<p>v1</p>"
        );

        store.reload().unwrap();
        assert_eq!(
            store.render_profile("profile_template", &profile()).unwrap(),
            "<p>v2</p>"
        );
    }

    #[test]
    fn test_failed_reload_keeps_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile_template.html");
        std::fs::write(&path, "<p>ok</p>").unwrap();

        let config = TemplateConfig::new()
            .with_template_dir(dir.path())
            .with_ttl(Duration::ZERO);
        let store = TemplateStore::new(config).unwrap();

        std::fs::write(&path, "<p>{% if %}</p>").unwrap();
        assert!(store.reload().is_err());
        assert_eq!(
            store.render_profile("profile_template", &profile()).unwrap(),
            "<p>ok</p>"
        );
    }

    #[test]
    fn test_failed_ttl_reload_waits_a_full_ttl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile_template.html");
        std::fs::write(&path, "<p>ok</p>").unwrap();

        let config = TemplateConfig::new()
            .with_template_dir(dir.path())
            .with_ttl(Duration::from_millis(300));
        let store = TemplateStore::new(config).unwrap();
        assert_eq!(store.build_attempts(), 1);

        std::fs::write(&path, "<p>{% if %}</p>").unwrap();
        std::thread::sleep(Duration::from_millis(350));

        for _ in 0..10 {
            assert_eq!(
                store.render_profile("profile_template", &profile()).unwrap(),
                "<p>ok</p>"
            );
        }
        assert_eq!(store.build_attempts(), 2);
    }

    #[test]
    fn test_one_reader_rebuilds_at_a_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile_template.html");
        std::fs::write(&path, "<p>v1</p>").unwrap();

        let config = TemplateConfig::new()
            .with_template_dir(dir.path())
            .with_ttl(Duration::ZERO);
        let store = TemplateStore::new(config).unwrap();
        std::fs::write(&path, "<p>v2</p>").unwrap();

        // Another reader is mid-rebuild: serve the expired snapshot.
        store.reloading.store(true, Ordering::Release);
        assert_eq!(
            store.render_profile("profile_template", &profile()).unwrap(),
            "<p>v1</p>"
        );
        assert_eq!(store.build_attempts(), 1);

        store.reloading.store(false, Ordering::Release);
        assert_eq!(
            store.render_profile("profile_template", &profile()).unwrap(),
            "<p>v2</p>"
        );
        assert_eq!(store.build_attempts(), 2);
        assert!(!store.reloading.load(Ordering::Acquire));
    }

    #[test]
    fn test_store_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TemplateStore>();
    }
}
