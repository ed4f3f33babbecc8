//! Concurrency stress test: many traffic threads submitting overlapping
//! content must still yield exactly one output per distinct script.

use std::path::Path;

use script_sift::{Exchange, ScriptSift, SiftConfig};
use url::Url;

const DISTINCT_SCRIPTS: usize = 50;

fn script_exchange(url: &str, body: &[u8]) -> Exchange {
    Exchange {
        url: Url::parse(url).unwrap(),
        headers: vec![(
            "Content-Type".into(),
            "application/javascript".into(),
        )],
        body: body.to_vec(),
        declared_mime: Some("script".into()),
        inferred_mime: None,
    }
}

fn beautified_file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "js"))
        .count()
}

#[test]
fn concurrent_duplicate_submissions_produce_one_output_each() {
    let dir = tempfile::tempdir().unwrap();
    let config = SiftConfig {
        storage_path: dir.path().to_path_buf(),
        worker_pool_size: 4,
        queue_capacity: 512,
        ..Default::default()
    };
    let mut sift = ScriptSift::new(config).unwrap();

    // Every script is offered twice, from two different "pages", across
    // four submitting threads.
    std::thread::scope(|scope| {
        for thread in 0..4 {
            let sift = &sift;
            scope.spawn(move || {
                for i in 0..DISTINCT_SCRIPTS {
                    if i % 4 != thread && (i + 2) % 4 != thread {
                        continue;
                    }
                    let body = format!("var v{i}=1;handle(v{i});");
                    let url = format!("https://example.net/t{thread}/s{i}.js");
                    sift.process_exchange(&script_exchange(&url, body.as_bytes()));
                }
            });
        }
    });

    sift.shutdown();

    assert_eq!(beautified_file_count(dir.path()), DISTINCT_SCRIPTS);
    assert_eq!(sift.sink().len(), DISTINCT_SCRIPTS);
    assert!(sift
        .sink()
        .snapshot()
        .iter()
        .all(|record| record.status == script_sift::RecordStatus::Beautified));

    // Each output contains its own script and nothing from any other.
    for entry in std::fs::read_dir(dir.path()).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().is_none_or(|ext| ext != "js") {
            continue;
        }
        let contents = std::fs::read_to_string(&path).unwrap();
        let markers: Vec<_> = (0..DISTINCT_SCRIPTS)
            .filter(|i| contents.contains(&format!("var v{i}=")))
            .collect();
        assert_eq!(markers.len(), 1, "{} mixes scripts", path.display());
    }
}
