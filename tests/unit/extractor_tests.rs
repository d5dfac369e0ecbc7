/*!
 * Tests for language pack extraction and reference seeding
 */

use anyhow::Result;
use loctrans::database::ContentStore;
use loctrans::extractor::{ExtractionReport, Extractor};
use crate::common;

/// Duplicates across files are inserted once and malformed files are skipped
#[tokio::test]
async fn test_extractDir_withDuplicatesAndBrokenFile_shouldKeepGoing() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let (a, b, c) = (common::uid(1), common::uid(2), common::uid(3));

    common::create_language_file(temp_dir.path(), "one.xml", &[(a.as_str(), "Hello"), (b.as_str(), "World")])?;
    common::create_language_file(temp_dir.path(), "sub/two.xml", &[(b.as_str(), "World again"), (c.as_str(), "Sword")])?;
    common::create_test_file(temp_dir.path(), "broken.xml", "<contentList><content contentuid=\"x\">")?;

    let store = ContentStore::in_memory()?;
    let report = Extractor::new(store.clone()).extract_dir(temp_dir.path()).await?;

    assert_eq!(report.files_scanned, 3);
    assert_eq!(report.files_failed, 1);
    assert_eq!(report.inserted, 3);
    assert_eq!(report.skipped, 1);

    // First occurrence wins
    assert_eq!(store.get(&b).await?.unwrap().source_text, "World");
    assert_eq!(store.stats().await?.pending, 3);
    Ok(())
}

/// An unreadable directory entry counts as a failed file instead of aborting the scan
#[cfg(unix)]
#[tokio::test]
async fn test_extractDir_withDanglingLink_shouldSkipItAndKeepGoing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let id = common::uid(1);
    common::create_language_file(temp_dir.path(), "good.xml", &[(id.as_str(), "Hello")])?;
    std::os::unix::fs::symlink(temp_dir.path().join("missing.xml"), temp_dir.path().join("dangling.xml"))?;

    let store = ContentStore::in_memory()?;
    let report = Extractor::new(store.clone()).extract_dir(temp_dir.path()).await?;

    assert_eq!(report.inserted, 1);
    assert_eq!(report.files_failed, 1);
    assert!(store.exists(&id).await?);
    Ok(())
}

/// Invalid ids, missing ids and blank text are skipped
#[tokio::test]
async fn test_extractDir_withInvalidEntries_shouldSkipThem() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let good = common::uid(1);
    let short_id = "h123";

    common::create_test_file(
        temp_dir.path(),
        "mixed.xml",
        &format!(
            r#"<contentList>
  <content contentuid="{good}" version="1">Valid</content>
  <content contentuid="{short_id}" version="1">Bad id</content>
  <content version="1">No id</content>
  <content contentuid="{blank}" version="1">   </content>
</contentList>"#,
            good = good,
            short_id = short_id,
            blank = common::uid(2)
        ),
    )?;

    let store = ContentStore::in_memory()?;
    let report = Extractor::new(store.clone()).extract_dir(temp_dir.path()).await?;

    assert_eq!(report.inserted, 1);
    assert_eq!(report.skipped, 3);
    assert!(store.exists(&good).await?);
    assert!(!store.exists(short_id).await?);
    Ok(())
}

/// Running the same extraction twice changes nothing the second time
#[tokio::test]
async fn test_extractDir_twice_shouldBeIdempotent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let id = common::uid(1);
    common::create_language_file(temp_dir.path(), "one.xml", &[(id.as_str(), "Hello")])?;

    let store = ContentStore::in_memory()?;
    let extractor = Extractor::new(store.clone());

    assert_eq!(extractor.extract_dir(temp_dir.path()).await?.inserted, 1);
    let second = extractor.extract_dir(temp_dir.path()).await?;

    assert_eq!(second.inserted, 0);
    assert_eq!(second.skipped, 1);
    assert_eq!(store.stats().await?.total, 1);
    Ok(())
}

/// A missing directory yields an empty report
#[tokio::test]
async fn test_extractDir_withMissingDirectory_shouldReturnEmptyReport() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = ContentStore::in_memory()?;

    let report = Extractor::new(store).extract_dir(temp_dir.path().join("nope")).await?;

    assert_eq!(report, ExtractionReport::default());
    Ok(())
}

/// Seeding fills pending records, adds unknown ones and keeps existing translations
#[tokio::test]
async fn test_seedDir_shouldFillPendingAndKeepComplete() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (pending, done, unknown) = (common::uid(1), common::uid(2), common::uid(3));

    let store = ContentStore::in_memory()?;
    store.insert_if_new(pending.as_str(), "Hello").await?;
    store.insert_if_new(done.as_str(), "Sword").await?;
    store.set_translation(done.as_str(), "宝剑").await?;

    common::create_language_file(
        temp_dir.path(),
        "chinese.xml",
        &[(pending.as_str(), "你好"), (done.as_str(), "剑"), (unknown.as_str(), "盾")],
    )?;

    let report = Extractor::new(store.clone()).seed_dir(temp_dir.path()).await?;

    assert_eq!(report.inserted, 2);
    assert_eq!(report.skipped, 1);

    assert_eq!(store.get(&pending).await?.unwrap().translated_text.as_deref(), Some("你好"));
    assert_eq!(store.get(&done).await?.unwrap().translated_text.as_deref(), Some("宝剑"));
    let seeded = store.get(&unknown).await?.unwrap();
    assert_eq!(seeded.source_text, "盾");
    assert_eq!(seeded.translated_text.as_deref(), Some("盾"));
    assert_eq!(store.stats().await?.pending, 0);
    Ok(())
}
