/*!
 * Tests for the merged output file
 */

use anyhow::Result;
use std::fs;
use loctrans::database::ContentStore;
use loctrans::emitter;
use loctrans::extractor::parse_content_document;
use crate::common;

/// Output read back through the extractor yields the stored translations
#[tokio::test]
async fn test_write_thenParse_shouldYieldStoredTranslations() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = ContentStore::in_memory()?;

    let texts = [
        (common::uid(3), "Three", "三 & <b>"),
        (common::uid(1), "One", "一"),
        (common::uid(2), "Two", "二"),
    ];
    for (id, source, translation) in &texts {
        store.insert_if_new(id, source).await?;
        store.set_translation(id, translation).await?;
    }
    store.insert_if_new(&common::uid(4), "Pending").await?;

    let path = temp_dir.path().join("translated_content.xml");
    let written = emitter::write(&path, &store.list_complete().await?)?;
    assert_eq!(written, 3);

    let parsed = parse_content_document(&fs::read_to_string(&path)?)?;
    let pairs: Vec<(String, String)> = parsed
        .into_iter()
        .map(|entry| (entry.id.unwrap_or_default(), entry.text))
        .collect();

    assert_eq!(
        pairs,
        vec![
            (common::uid(1), "一".to_string()),
            (common::uid(2), "二".to_string()),
            (common::uid(3), "三 & <b>".to_string()),
        ]
    );
    Ok(())
}

/// Same store content gives byte-identical files
#[tokio::test]
async fn test_write_twice_shouldBeByteIdentical() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = ContentStore::in_memory()?;
    for i in 0..50 {
        let id = common::uid(50 - i);
        store.insert_if_new(&id, "source").await?;
        store.set_translation(&id, &format!("译文 {}", i)).await?;
    }

    let first = temp_dir.path().join("first.xml");
    let second = temp_dir.path().join("second.xml");
    emitter::write(&first, &store.list_complete().await?)?;
    emitter::write(&second, &store.list_complete().await?)?;

    assert_eq!(fs::read(&first)?, fs::read(&second)?);
    Ok(())
}
