//! Export from one process, import from another, through a shared directory

use gml_exchange::{
    AppRegistry, Content, Delivery, ExportSettings, Exporter, FileStore, ImportHandler, KeyValueStore, QueryParams,
};
use serde_json::json;

#[test]
fn large_export_is_picked_up_once() {
    let dir = tempfile::tempdir().unwrap();
    let registry = AppRegistry::standard();
    let exporter = Exporter::new(&registry, ExportSettings::default());

    let riffs: Vec<f64> = (0..400).map(|i| 220.0 + i as f64).collect();
    let mut sender = FileStore::open(dir.path()).unwrap();
    let delivery = exporter
        .export_to_app(&json!({ "riffs": riffs, "author": "ana" }), "TriadGen", &mut sender)
        .unwrap();

    let Delivery::Storage { url, storage_key } = delivery else {
        panic!("expected storage delivery");
    };
    assert!(dir.path().join(format!("{storage_key}.json")).exists());

    let mut receiver = FileStore::open(dir.path()).unwrap();
    let mut handler = ImportHandler::new();
    assert_eq!(handler.detect(&QueryParams::parse(&url), &mut receiver), 1);
    assert_eq!(receiver.get(&storage_key).unwrap(), None);

    let record = &handler.records()[0];
    assert_eq!(record.target, "TriadGen");
    assert_eq!(record.data.metadata.author, "ana");
    assert!(matches!(&record.data.content, Content::RiffCollection { riffs } if riffs.as_array().map(Vec::len) == Some(400)));

    // second open of the same URL finds nothing
    assert_eq!(handler.detect(&QueryParams::parse(&url), &mut receiver), 0);
}

#[test]
fn small_export_travels_in_the_url() {
    let dir = tempfile::tempdir().unwrap();
    let registry = AppRegistry::standard();
    let exporter = Exporter::new(&registry, ExportSettings::default());
    let mut store = FileStore::open(dir.path()).unwrap();

    let delivery = exporter
        .export_to_app(&json!({ "quartet": { "parts": ["vn1", "vn2", "va", "vc"] } }), "QuartetEngine", &mut store)
        .unwrap();
    assert!(matches!(delivery, Delivery::UrlParams { .. }));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

    let mut handler = ImportHandler::new();
    assert_eq!(handler.detect(&QueryParams::parse(delivery.url()), &mut store), 1);
    assert_eq!(
        handler.records()[0].data.content,
        Content::QuartetScore { quartet: json!({ "parts": ["vn1", "vn2", "va", "vc"] }) }
    );
}
