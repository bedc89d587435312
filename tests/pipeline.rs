use std::fs;
use std::path::{Path, PathBuf};

use justdial_scraper::snapshot::SnapshotSurface;
use justdial_scraper::{ListingRecord, Scraper, SearchConfig, SinkOutcome, Timings};

const FIXTURE: &str = include_str!("fixtures/results.html");

fn tmp_dir(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("jd_pipeline_{}", name));
    let _ = fs::remove_dir_all(&p);
    fs::create_dir_all(&p).unwrap();
    p
}

fn scraper(dir: &Path) -> Scraper {
    Scraper::new(
        SearchConfig::new("Wedding Planner", "Tirupati")
            .with_output_dir(dir)
            .with_timings(Timings::immediate()),
    )
}

#[test]
fn fixture_page_round_trip() {
    let dir = tmp_dir("fixture");
    let mut surface = SnapshotSurface::from_html(FIXTURE);
    let report = scraper(&dir).run(&mut surface).unwrap();

    let expected = dir.join("Wedding-Planners-at-tirupati.csv");
    assert_eq!(
        report.output,
        SinkOutcome::Written {
            path: expected.clone(),
            rows: 3
        }
    );
    assert!(report.scroll.stabilized);
    assert_eq!(report.scroll.scrolls, 1);

    let csv = fs::read_to_string(expected).unwrap();
    assert_eq!(
        csv,
        "Name,Phone,Rating,Address\n\
         Sri Balaji Events,08771234567,4.5,\"Tiruchanur Road, Tirupati\"\n\
         Lotus Decorators,Not Available,4.0,\"Air Bypass Road, Tirupati\"\n\
         Kalyan Mandapam & Caterers,Not Available,N/A,\"Renigunta, Tirupati\"\n"
    );
}

#[test]
fn duplicate_and_sentinel_names_are_dropped() {
    let dir = tmp_dir("dedup");
    let html = r#"<html><body>
        <div class="store"><h2>John Smith</h2>
          <a href="javascript:void(0)">Show Number</a>
          <a href="tel:04012345678">Call</a></div>
        <div class="store"><h2>John Smith</h2>
          <a href="javascript:void(0)">Show Number</a>
          <a href="tel:04087654321">Call</a></div>
        <div class="store"><h2>Average Ratings</h2></div>
    </body></html>"#;
    let mut surface = SnapshotSurface::from_html(html);
    let report = scraper(&dir).run(&mut surface).unwrap();

    assert_eq!(report.listings_found, 3);
    assert_eq!(
        report.records,
        vec![ListingRecord {
            name: "John Smith".into(),
            phone: "04012345678".into(),
            rating: "N/A".into(),
            address: "N/A".into(),
        }]
    );
    let csv = fs::read_to_string(dir.join("Wedding-Planners-at-tirupati.csv")).unwrap();
    assert_eq!(csv.lines().count(), 2);
    assert!(csv.contains("John Smith,04012345678"));
}

#[test]
fn no_candidates_means_no_file() {
    let dir = tmp_dir("empty");
    // listings wait passes on the section, which carries no name
    let mut surface =
        SnapshotSurface::from_html("<html><body><section><p>Sorry</p></section></body></html>");
    let report = scraper(&dir).run(&mut surface).unwrap();

    assert_eq!(report.output, SinkOutcome::Empty);
    assert!(report.records.is_empty());
    assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
}

#[test]
fn replay_from_saved_file() {
    let dir = tmp_dir("replay");
    let page = dir.join("page_source.html");
    fs::write(&page, FIXTURE).unwrap();

    let mut surface = SnapshotSurface::open(&page).unwrap();
    let report = scraper(&dir).run(&mut surface).unwrap();
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.records[0].name, "Sri Balaji Events");
}
