use anyhow::Result;
use std::fs;
use tempfile::TempDir;
use txt_audit::app::pipelines::{
    ClassifyPipeline, DiffPipeline, DomainMergePipeline, ExtractPipeline, TimeseriesPipeline, TimeseriesSource,
};
use txt_audit::core::snapshot::{parse_changeset, parse_snapshot};
use txt_audit::{AuditEngine, AuditError, Category, Classifier, IdentityKind, LocalStorage};

fn storage(temp_dir: &TempDir) -> LocalStorage {
    LocalStorage::new(temp_dir.path().to_str().unwrap().to_string())
}

fn classify(temp_dir: &TempDir, input: &str, output: &str) -> Result<String> {
    let pipeline = ClassifyPipeline::new(
        storage(temp_dir),
        Classifier::builtin()?,
        input.to_string(),
        output.to_string(),
    );
    Ok(AuditEngine::new(pipeline).run()?)
}

#[test]
fn test_classify_diff_timeseries_end_to_end() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();

    fs::write(
        dir.join("records-20171101.txt"),
        "a.com v=spf1 -all\n\
         b.com google-site-verification=xyz\n\
         c.com 3f9a2b\n\
         d.com gibberish1234==\n\
         e.com v=DKIM1; p=ABC=\n",
    )?;
    fs::write(
        dir.join("records-20171108.txt"),
        "a.com v=spf1 include:_spf.google.com -all\n\
         b.com google-site-verification=xyz\n\
         d.com gibberish1234==\n\
         e.com v=DKIM1; p=ABC=\n\
         f.com v=dmarc1; p=reject\n",
    )?;

    classify(&temp_dir, "records-20171101.txt", "activedns-20171101-class.json")?;
    classify(&temp_dir, "records-20171108.txt", "activedns-20171108-class.json")?;

    let first = parse_snapshot("first", &fs::read_to_string(dir.join("activedns-20171101-class.json"))?)?;
    for (label, count) in [("spf", 1), ("google-site-verification", 1), ("hexadecimal", 1), ("base64", 1), ("dkim", 1)] {
        assert_eq!(first.count(&Category::from(label)), count, "category {}", label);
    }

    let diff = DiffPipeline::new(
        storage(&temp_dir),
        "activedns-20171101-class.json".to_string(),
        "activedns-20171108-class.json".to_string(),
        "diff-20171101-20171108.json".to_string(),
    );
    AuditEngine::new(diff).run()?;

    let changes = parse_changeset("diff", &fs::read_to_string(dir.join("diff-20171101-20171108.json"))?)?;
    assert_eq!(changes.changed.count(&Category::from("spf")), 1);
    assert_eq!(
        changes.changed.get(&Category::from("spf")).unwrap().current(),
        ["a.com v=spf1 include:_spf.google.com -all"]
    );
    assert_eq!(changes.missing.count(&Category::from("hexadecimal")), 1);
    assert_eq!(changes.new.count(&Category::from("dmarc")), 1);
    assert!(changes.new.get(&Category::from("google-site-verification")).is_none());

    let timeseries = TimeseriesPipeline::new(
        storage(&temp_dir),
        vec![
            "activedns-20171108-class.json".to_string(),
            "activedns-20171101-class.json".to_string(),
        ],
        "series".to_string(),
    )
    .with_source(TimeseriesSource::Snapshots);
    AuditEngine::new(timeseries).run()?;

    let counts = fs::read_to_string(dir.join("series/counts.csv"))?;
    let mut lines = counts.lines();
    assert_eq!(lines.next(), Some("date,base64,dkim,google-site-verification,hexadecimal,spf,dmarc"));
    assert_eq!(lines.next(), Some("20171101,1,1,1,1,1,0"));
    assert_eq!(lines.next(), Some("20171108,1,1,1,0,1,1"));

    let merge = DomainMergePipeline::new(
        storage(&temp_dir),
        vec![
            "activedns-20171101-class.json".to_string(),
            "activedns-20171108-class.json".to_string(),
        ],
        "merged.json".to_string(),
    );
    AuditEngine::new(merge).run()?;
    let merged: serde_json::Value = serde_json::from_str(&fs::read_to_string(dir.join("merged.json"))?)?;
    assert_eq!(merged["c.com"]["hexadecimal"]["20171101"]["count"], 1);
    assert!(merged["c.com"]["hexadecimal"].get("20171108").is_none());

    Ok(())
}

#[test]
fn test_changeset_timeseries_from_diff_files() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();

    fs::write(dir.join("records-a.txt"), "a.com v=spf1 -all\n")?;
    fs::write(dir.join("records-b.txt"), "a.com v=spf1 -all\nb.com v=spf1 -all\n")?;
    fs::write(dir.join("records-c.txt"), "b.com v=spf1 -all\n")?;
    classify(&temp_dir, "records-a.txt", "snap-20171101.json")?;
    classify(&temp_dir, "records-b.txt", "snap-20171108.json")?;
    classify(&temp_dir, "records-c.txt", "snap-20171115.json")?;

    for (old, new) in [("20171101", "20171108"), ("20171108", "20171115")] {
        let diff = DiffPipeline::new(
            storage(&temp_dir),
            format!("snap-{}.json", old),
            format!("snap-{}.json", new),
            format!("diffs/diff-{}-{}.json", old, new),
        )
        .with_identity(IdentityKind::ExactOwner);
        AuditEngine::new(diff).run()?;
    }

    let timeseries = TimeseriesPipeline::new(
        storage(&temp_dir),
        vec![
            "diffs/diff-20171101-20171108.json".to_string(),
            "diffs/diff-20171108-20171115.json".to_string(),
        ],
        "series".to_string(),
    )
    .with_source(TimeseriesSource::Changesets);
    AuditEngine::new(timeseries).run()?;

    assert_eq!(
        fs::read_to_string(dir.join("series/new.csv"))?,
        "date,spf\n20171108,1\n20171115,0\n"
    );
    assert_eq!(
        fs::read_to_string(dir.join("series/missing.csv"))?,
        "date,spf\n20171108,0\n20171115,1\n"
    );
    Ok(())
}

#[test]
fn test_corrupt_snapshot_fails_the_diff() -> Result<()> {
    let temp_dir = TempDir::new()?;
    fs::write(temp_dir.path().join("old.json"), r#"{"spf": {"count": 3, "records": []}}"#)?;
    fs::write(temp_dir.path().join("new.json"), "{}\n")?;

    let diff = DiffPipeline::new(
        storage(&temp_dir),
        "old.json".to_string(),
        "new.json".to_string(),
        "diff.json".to_string(),
    );
    let err = AuditEngine::new(diff).run().unwrap_err();

    assert!(matches!(err, AuditError::CorruptSnapshot { .. }));
    assert_eq!(err.exit_code(), 4);
    assert!(!temp_dir.path().join("diff.json").exists());
    Ok(())
}

#[test]
fn test_undated_inputs_are_rejected() -> Result<()> {
    let temp_dir = TempDir::new()?;
    fs::write(temp_dir.path().join("latest.json"), "{}\n")?;
    fs::write(temp_dir.path().join("snap-20171101.json"), "{}\n")?;

    let timeseries = TimeseriesPipeline::new(
        storage(&temp_dir),
        vec!["snap-20171101.json".to_string(), "latest.json".to_string()],
        "series".to_string(),
    );
    let err = AuditEngine::new(timeseries).run().unwrap_err();
    assert!(matches!(err, AuditError::MissingDateLabel { .. }));
    Ok(())
}

#[test]
fn test_extract_then_classify() -> Result<()> {
    let temp_dir = TempDir::new()?;
    fs::write(
        temp_dir.path().join("capture.json"),
        concat!(
            r#"{"qname": "a.com.", "qtype": 16, "rdata": "\"v=spf1 -all\""}"#,
            "\n",
            r#"{"qname": "b.com.", "qtype": 1, "rdata": "192.0.2.1"}"#,
            "\n",
            "{broken\n",
            r#"{"qname": "c.com.", "qtype": 16, "rdata": "MS=ms1234"}"#,
            "\n",
        ),
    )?;

    let extract = ExtractPipeline::new(storage(&temp_dir), "capture.json".to_string(), "records.txt".to_string());
    AuditEngine::new(extract).run()?;
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("records.txt"))?,
        "a.com. \"v=spf1 -all\"\nc.com. MS=ms1234\n"
    );

    classify(&temp_dir, "records.txt", "snapshot.json")?;
    let snapshot = parse_snapshot("snapshot", &fs::read_to_string(temp_dir.path().join("snapshot.json"))?)?;
    assert_eq!(
        snapshot.get(&Category::from("spf")).unwrap().records(),
        ["a.com. v=spf1 -all"]
    );
    assert_eq!(snapshot.count(&Category::from("office365ms")), 1);
    Ok(())
}
