//! Tests for snapshot publishing and debounced palette refreshes.
mod common;
use common::*;
use keyweave::catalog::{CatalogElement, SavedColor};
use keyweave::config::DebounceConfig;
use keyweave::propagation::Debouncer;
use keyweave::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn red() -> SavedColor {
    SavedColor {
        id: 1,
        coordinate: "10,20".to_string(),
        rgb: "255,0,0".to_string(),
        name: "Red".to_string(),
    }
}

#[test]
fn test_publisher_marks_form_dirty() {
    let form = Rc::new(RefCell::new(OperationForm::new("combo")));
    let mut canvas = Canvas::default();
    canvas.subscribe(Box::new(SnapshotPublisher::new(form.clone())));
    assert!(!form.borrow().is_dirty());

    let a = canvas.place(&template(key(65, "A")), None);
    assert!(form.borrow().is_dirty());
    assert_eq!(form.borrow().snapshot().nodes.len(), 1);

    form.borrow_mut().mark_saved(1);
    canvas.move_node(&a, Position::new(1.0, 2.0));
    assert!(form.borrow().is_dirty());
    assert_eq!(form.borrow().snapshot().nodes[0].position, Position::new(1.0, 2.0));
}

#[test]
fn test_publisher_counts_events() {
    struct Collect(Vec<usize>);
    impl SnapshotSink for Collect {
        fn publish(&mut self, snapshot: GraphSnapshot) {
            self.0.push(snapshot.nodes.len());
        }
    }

    let sink = Rc::new(RefCell::new(Collect(Vec::new())));
    let mut canvas = Canvas::default();
    canvas.subscribe(Box::new(SnapshotPublisher::new(sink.clone())));

    canvas.place(&template(key(65, "A")), None);
    canvas.place(&template(key(66, "B")), None);
    canvas.hydrate(GraphSnapshot::default());

    assert_eq!(sink.borrow().0, vec![1, 2, 0]);
}

#[test]
fn test_debouncer_trailing_edge() {
    let start = Instant::now();
    let mut debouncer = Debouncer::new(ms(100));
    assert!(!debouncer.take_due(start));

    debouncer.schedule(start);
    debouncer.schedule(start + ms(60));
    assert!(!debouncer.take_due(start + ms(100)));
    assert!(debouncer.is_pending());
    assert!(debouncer.take_due(start + ms(160)));
    assert!(!debouncer.is_pending());
    assert!(!debouncer.take_due(start + ms(500)));

    debouncer.schedule(start);
    debouncer.cancel();
    assert_eq!(debouncer.deadline(), None);
}

#[test]
fn test_refresher_uses_section_delays() {
    let start = Instant::now();
    let mut catalog = Catalog::new();
    let mut palette = Palette::new();
    palette.initialize(&catalog);
    let mut refresher = PaletteRefresher::new(&DebounceConfig::default());
    refresher.baseline(&catalog);

    catalog.set_elements(vec![CatalogElement {
        elements_code: 65,
        elements_key: "A".to_string(),
    }]);
    catalog.push_saved_color(red());
    refresher.observe(&catalog, start);
    assert!(refresher.is_pending(PaletteSection::Elements));
    assert!(refresher.is_pending(PaletteSection::Colors));
    assert!(!refresher.is_pending(PaletteSection::Skills));
    assert_eq!(refresher.next_deadline(), Some(start + ms(100)));

    let refreshed = refresher.poll(start + ms(100), &catalog, &mut palette);
    assert_eq!(refreshed, vec![PaletteSection::Colors]);
    assert_eq!(palette.section(PaletteSection::Colors).unwrap().len(), 2);
    assert!(palette.section(PaletteSection::Elements).unwrap().is_empty());

    assert!(refresher.poll(start + ms(399), &catalog, &mut palette).is_empty());
    let refreshed = refresher.poll(start + ms(400), &catalog, &mut palette);
    assert_eq!(refreshed, vec![PaletteSection::Elements]);
    assert_eq!(palette.section(PaletteSection::Elements).unwrap().len(), 1);
    assert_eq!(refresher.next_deadline(), None);
}

#[test]
fn test_repeated_changes_coalesce() {
    let start = Instant::now();
    let mut catalog = Catalog::new();
    let mut palette = Palette::new();
    palette.initialize(&catalog);
    let mut refresher = PaletteRefresher::new(&DebounceConfig::default());
    refresher.baseline(&catalog);

    catalog.push_saved_color(red());
    refresher.observe(&catalog, start);
    catalog.remove_saved_color(1);
    refresher.observe(&catalog, start + ms(80));

    assert!(refresher.poll(start + ms(100), &catalog, &mut palette).is_empty());
    let refreshed = refresher.poll(start + ms(180), &catalog, &mut palette);
    assert_eq!(refreshed, vec![PaletteSection::Colors]);
    // Only the color template is left.
    assert_eq!(palette.section(PaletteSection::Colors).unwrap().len(), 1);
}

#[test]
fn test_unchanged_catalog_schedules_nothing() {
    let start = Instant::now();
    let mut catalog = Catalog::new();
    catalog.push_saved_color(red());
    let mut refresher = PaletteRefresher::new(&DebounceConfig::default());
    refresher.baseline(&catalog);

    refresher.observe(&catalog, start);
    assert_eq!(refresher.next_deadline(), None);

    // Removing an unknown id does not move the revision.
    assert!(catalog.remove_saved_color(99).is_none());
    refresher.observe(&catalog, start);
    assert_eq!(refresher.next_deadline(), None);
}

#[test]
fn test_uninitialized_palette_is_not_refreshed() {
    let start = Instant::now();
    let mut catalog = Catalog::new();
    let mut palette = Palette::new();
    let mut refresher = PaletteRefresher::new(&DebounceConfig::default());

    catalog.push_saved_color(red());
    refresher.observe(&catalog, start);
    let refreshed = refresher.poll(start + ms(1000), &catalog, &mut palette);

    assert!(refreshed.is_empty());
    assert!(!palette.is_initialized(PaletteSection::Colors));
    assert!(!refresher.is_pending(PaletteSection::Colors));
}

#[test]
fn test_palette_templates_follow_catalog() {
    let mut catalog = Catalog::new();
    catalog.push_saved_color(red());
    let mut palette = Palette::new();
    palette.initialize(&catalog);

    let colors = palette.section(PaletteSection::Colors).unwrap();
    assert_eq!(colors[0].label(), "取色");
    assert_eq!(colors[1].label(), "Red");
    assert_eq!(colors[1].swatch().as_deref(), Some("#ff0000"));

    let time_events = palette.section(PaletteSection::TimeEvents).unwrap();
    assert_eq!(time_events.len(), 4);
    assert_eq!(catalog.revision(PaletteSection::TimeEvents), 0);
}
