use std::path::PathBuf;

use stampgrid_core::{
    search, BrowserConfig, Catalog, FileSource, LoadError, Minimap, Point, Rect, SearchState,
    Size, ViewportController,
};

fn temp_catalog(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("stampgrid-{}-{name}", std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn load_from_file_skips_bad_records() {
    let path = temp_catalog(
        "mixed.json",
        r#"{"records": [
            {"id": "A1", "year": "1935", "mainTopic": "Jubilee", "colour": "green"},
            {"id": "A2", "year": 1851, "main_topic": "Beaver", "imagePath": "img/a2.jpg"},
            "not an object",
            {"id": "A3", "mainTopic": "No year"},
            {"id": "A1", "year": 1960, "mainTopic": "Duplicate"}
        ]}"#,
    );
    let catalog = Catalog::load(&FileSource(path.clone())).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.skipped().len(), 3);
    let first = &catalog.all()[0];
    assert_eq!((first.id.as_str(), first.year), ("A2", 1851));
    assert_eq!(first.image_path, "img/a2.jpg");
    assert_eq!(catalog.find_by_id("A1").unwrap().color.as_deref(), Some("green"));
    assert_eq!(catalog.decades(), vec![1850, 1930]);
}

#[test]
fn missing_file_is_unreachable() {
    let source = FileSource(std::env::temp_dir().join("stampgrid-definitely-missing.json"));
    match Catalog::load(&source) {
        Err(LoadError::Unreachable { source_name, .. }) => {
            assert!(source_name.ends_with("stampgrid-definitely-missing.json"));
        }
        other => panic!("expected Unreachable, got {other:?}"),
    }
}

#[test]
fn document_without_list_is_malformed() {
    assert!(matches!(
        Catalog::from_json(r#"{"title": "nothing here"}"#),
        Err(LoadError::Malformed { .. })
    ));
    assert!(matches!(Catalog::from_json("{"), Err(LoadError::Json(_))));
}

#[test]
fn search_ranks_by_field_weight() {
    let catalog = Catalog::from_json(
        r#"{"stamps": [
            {"id": "1", "year": 1900, "mainTopic": "Harbour", "notes": "ship in background"},
            {"id": "2", "year": 1950, "mainTopic": "Ship"},
            {"id": "3", "year": 1960, "mainTopic": "Liner", "subTopic": "Ocean vessel"}
        ]}"#,
    )
    .unwrap();

    let hits = search(&catalog, "Ship");
    let ids: Vec<&str> = hits
        .iter()
        .map(|m| catalog.all()[m.index].id.as_str())
        .collect();
    // Exact topic, then a synonym in the sub topic, then a plain notes hit.
    assert_eq!(ids, ["2", "3", "1"]);

    let years = search(&catalog, "1950");
    assert_eq!(years.len(), 1);
    assert_eq!(catalog.all()[years[0].index].id, "2");
}

#[test]
fn search_state_drives_viewport_jumps() {
    let catalog = Catalog::sample();
    let mut state = SearchState::new();
    state.set_query(&catalog, "queen victoria");
    assert_eq!(state.matches().len(), 2);

    let config = BrowserConfig::default();
    let mut viewport = ViewportController::new(&config, Size::new(800.0, 600.0));
    // Pretend each record sits in its own row.
    let rect_of = |index: usize| Rect::new(0.0, index as f32 * 200.0, 120.0, 150.0);

    let target = rect_of(state.next().unwrap().index);
    viewport.jump_to(target);
    let centre = viewport.transform().logical_to_screen(target.center());
    assert!((centre.x - 400.0).abs() < 1e-3);
    assert!((centre.y - 300.0).abs() < 1e-3);
}

#[test]
fn minimap_tracks_viewport() {
    let config = BrowserConfig::default();
    let mut viewport = ViewportController::new(&config, Size::new(400.0, 300.0));
    let content = Rect::new(0.0, 0.0, 1_000.0, 10_000.0);
    let minimap = Minimap::new(content, Size::new(100.0, 200.0));

    let before = minimap.indicator(viewport.visible_logical_rect());
    viewport.pan(0.0, -3_000.0);
    let after = minimap.indicator(viewport.visible_logical_rect());
    assert!(after.y > before.y);

    // Clicking the panel centres the viewport on the matching logical point.
    let logical = minimap.panel_to_logical(Point::new(50.0, 100.0));
    viewport.center_on(logical);
    let visible = viewport.visible_logical_rect();
    assert!(visible.contains(logical));
}
