use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

use stagelog_ingest::apis::caveat::CaveatAdapter;
use stagelog_ingest::catalog::{CatalogStore, InMemoryCatalog, JsonFileCatalog};
use stagelog_ingest::common::types::{CategoryTag, DateSource, IntegrationResult};
use stagelog_ingest::normalize::FixedClock;
use stagelog_ingest::render::{DomSnapshot, FixtureRenderer, PageRenderer, RenderOptions};
use stagelog_ingest::{Pipeline, PipelineOptions, Result, ScraperError};

const LISTING_PAGE: &str = r#"
<html><body>
  <div class="show-banner">COMEDY. IMPROV.</div>
  <div class="event-card">
    <span>JUN 10</span> <span>8:00 PM</span>
    <h3>Storytelling Hour</h3>
    <a href="https://www.eventbrite.com/e/storytelling-hour">GET TICKETS</a>
  </div>
</body></html>
"#;

const LISTING_WITH_RESIDENCY: &str = r#"
<html><body>
  <div class="event-card">
    <span>JUN 12</span> <span>7:30 PM</span>
    <h3>Science Comedy Night</h3>
    <p>Researchers try stand-up</p>
  </div>
  <div class="show-card">
    <h3>Weekly Improv Jam</h3>
    <p>Every Tuesday, bring a friend</p>
  </div>
</body></html>
"#;

const LISTING_IN_WRAPPER: &str = r#"
<html><body>
  <section class="events-list">
    <div class="event-card">
      <span>JUN 10</span> <span>8:00 PM</span>
      <h3>Storytelling Hour</h3>
    </div>
    <div class="event-card">
      <span>JUN 12</span> <span>7:30 PM</span>
      <h3>Science Night</h3>
      <p>SOLD OUT</p>
    </div>
  </section>
</body></html>
"#;

fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap()))
}

fn pipeline(html: &str, store: Arc<dyn CatalogStore>) -> Pipeline {
    Pipeline::new(Arc::new(FixtureRenderer::new(html)), store).with_clock(fixed_clock())
}

struct TimingOutRenderer;

#[async_trait]
impl PageRenderer for TimingOutRenderer {
    fn name(&self) -> &'static str {
        "timing-out"
    }

    async fn render(&self, url: &str, options: &RenderOptions) -> Result<DomSnapshot> {
        Err(ScraperError::RenderTimeout {
            url: url.to_string(),
            timeout_ms: options.timeout_ms,
        })
    }
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn test_listing_page_yields_one_event() {
    let store = Arc::new(InMemoryCatalog::new());
    let pipeline = pipeline(LISTING_PAGE, store);
    let snapshot = DomSnapshot::new("https://caveat.nyc/", LISTING_PAGE);

    let events = pipeline.prepare_events(&CaveatAdapter::new(), &snapshot);

    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.title(), "Storytelling Hour");
    assert!(!event.draft.is_recurring);
    assert_eq!(event.draft.raw_date_fragment, "JUN 10");
    assert_eq!(event.draft.raw_time_fragment.as_deref(), Some("8:00 PM"));
    assert_eq!(
        event.draft.ticket_url.as_deref(),
        Some("https://www.eventbrite.com/e/storytelling-hour")
    );
    assert!(event.category_tags.contains(&CategoryTag::SpokenWord));
    assert_eq!(event.date_source, DateSource::Parsed);
    // 8 PM EDT
    assert_eq!(event.event_date, Utc.with_ymd_and_hms(2026, 6, 11, 0, 0, 0).unwrap());
}

#[tokio::test]
async fn test_full_run_creates_venue_and_performance() {
    let store = Arc::new(InMemoryCatalog::new());
    let pipeline = pipeline(LISTING_PAGE, store.clone());

    let report = pipeline.run(&CaveatAdapter::new(), "system").await;

    assert_eq!(
        report,
        IntegrationResult {
            venues_created: 1,
            performances_created: 1,
            performances_updated: 0,
            errors: vec![],
        }
    );
    let performances = store.performances();
    assert_eq!(performances.len(), 1);
    assert_eq!(performances[0].fields.title, "Storytelling Hour");
    assert_eq!(performances[0].fields.description, "Performance at Caveat");
    assert_eq!(performances[0].fields.performance_types, vec!["spoken-word"]);
}

#[tokio::test]
async fn test_rerun_against_same_catalog_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = dir.path().join("catalog.json");

    let first = pipeline(LISTING_PAGE, Arc::new(JsonFileCatalog::new(&catalog_path)))
        .run(&CaveatAdapter::new(), "system")
        .await;
    assert_eq!(first.venues_created, 1);
    assert_eq!(first.performances_created, 1);

    let second = pipeline(LISTING_PAGE, Arc::new(JsonFileCatalog::new(&catalog_path)))
        .run(&CaveatAdapter::new(), "system")
        .await;
    assert_eq!(second, IntegrationResult::default());
}

#[tokio::test]
async fn test_sold_out_flag_stays_with_its_own_card() {
    let store = Arc::new(InMemoryCatalog::new());
    let report = pipeline(LISTING_IN_WRAPPER, store.clone())
        .run(&CaveatAdapter::new(), "system")
        .await;

    assert_eq!(report.performances_created, 2);
    let sold_out: Vec<(String, bool)> = store
        .performances()
        .into_iter()
        .map(|p| (p.fields.title, p.fields.showings[0].sold_out))
        .collect();
    assert_eq!(
        sold_out,
        vec![
            ("Storytelling Hour".to_string(), false),
            ("Science Night".to_string(), true),
        ]
    );
}

#[tokio::test]
async fn test_render_failure_skips_catalog() {
    let store = Arc::new(InMemoryCatalog::new());
    let pipeline = Pipeline::new(Arc::new(TimingOutRenderer), store.clone());

    let report = pipeline.run(&CaveatAdapter::new(), "system").await;

    assert_eq!(report.venues_created, 0);
    assert_eq!(report.performances_created, 0);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("Render failed"));
    assert_eq!(store.venue_count(), 0);
}

#[tokio::test]
async fn test_recurring_shows_left_out_by_default() {
    let store = Arc::new(InMemoryCatalog::new());
    let report = pipeline(LISTING_WITH_RESIDENCY, store.clone())
        .run(&CaveatAdapter::new(), "system")
        .await;

    assert_eq!(report.performances_created, 1);
    assert_eq!(store.performances()[0].fields.title, "Science Comedy Night");
}

#[test]
fn test_recurring_shows_get_fallback_date_when_included() {
    let options = PipelineOptions {
        include_recurring: true,
        ..PipelineOptions::default()
    };
    let pipeline = pipeline(LISTING_WITH_RESIDENCY, Arc::new(InMemoryCatalog::new()))
        .with_options(options);
    let snapshot = DomSnapshot::new("https://caveat.nyc/", LISTING_WITH_RESIDENCY);

    let events = pipeline.prepare_events(&CaveatAdapter::new(), &snapshot);

    assert_eq!(events.len(), 2);
    let jam = events
        .iter()
        .find(|e| e.title() == "Weekly Improv Jam")
        .unwrap();
    assert!(jam.draft.is_recurring);
    assert!(jam.date_source.is_fallback());
    assert_eq!(jam.event_date, Utc.with_ymd_and_hms(2026, 5, 8, 12, 0, 0).unwrap());
    assert!(jam.category_tags.contains(&CategoryTag::Other));
}

#[tokio::test]
async fn test_logs_go_to_injected_sink() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .finish();

    let report = pipeline(LISTING_PAGE, Arc::new(InMemoryCatalog::new()))
        .with_log_sink(tracing::Dispatch::new(subscriber))
        .run(&CaveatAdapter::new(), "system")
        .await;

    assert_eq!(report.performances_created, 1);
    let output = logs.contents();
    assert!(output.contains("Starting pipeline for caveat"));
    assert!(output.contains("Created performance: Storytelling Hour"));
}
